//! # FIME CLI Application
//!
//! Terminal front end for the FIME plant calculation engine.
//!
//! ```text
//! fime_cli                 prompt for flow, population and turbidity
//! fime_cli design.json     read a design input record and run it
//! ```
//!
//! Prints a summary followed by a JSON run record (id, timestamp, input and
//! report). Nothing is written back to disk. Log verbosity comes
//! from `FIME_LOG` (`error`, `warn`, `info`, `debug`, `trace`; default `warn`).

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fime_core::design::{design_plant, DesignInput, DesignSettings, PlantDesignReport};
use fime_core::piping::PipeCompliance;
use fime_core::quality::WaterQualitySnapshot;
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// Logging
// ============================================================================

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let tag = match record.level() {
                Level::Error => "error",
                Level::Warn => "warn",
                Level::Info => "info",
                Level::Debug => "debug",
                Level::Trace => "trace",
            };
            eprintln!("[{} {}] {}", tag, record.target(), record.args());
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging() {
    let level = std::env::var("FIME_LOG")
        .ok()
        .and_then(|v| LevelFilter::from_str(v.trim()).ok())
        .unwrap_or(LevelFilter::Warn);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

// ============================================================================
// Prompts
// ============================================================================

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn prompt_input() -> DesignInput {
    let flow_lps = prompt_f64("Design flow (L/s) [1.0]: ", 1.0);
    let population = prompt_f64("Population served [800]: ", 800.0).max(0.0).round() as u32;
    let turbidity = prompt_f64("Raw water turbidity (NTU) [50.0]: ", 50.0);

    let mut input = DesignInput::new(flow_lps, population);
    input.quality = WaterQualitySnapshot::with_turbidity(turbidity);
    input
}

fn read_input(path: &str) -> Result<DesignInput, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;
    DesignInput::from_json(&text).map_err(|e| format!("[{}] {}", e.error_code(), e))
}

// ============================================================================
// Output
// ============================================================================

/// JSON document printed after the summary.
#[derive(Serialize)]
struct RunRecord<'a> {
    id: Uuid,
    generated_at: DateTime<Utc>,
    input: &'a DesignInput,
    report: &'a PlantDesignReport,
}

fn print_summary(report: &PlantDesignReport) {
    println!("═══════════════════════════════════════");
    println!("  FIME PLANT DESIGN");
    println!("═══════════════════════════════════════");
    println!();
    println!(
        "Flow:      {:.2} L/s ({:.2} m³/h)",
        report.flow.flow_lps, report.flow.flow_m3h
    );
    println!("Turbidity: {:.1} NTU", report.quality.turbidity_or_default());
    println!();

    println!("Units:");
    for memoria in report.memorias() {
        let verdict = if memoria.passes() { "OK" } else { "ALERTA" };
        let area = memoria
            .result("area_m2")
            .map(|a| format!("{:.2} m² per unit", a))
            .unwrap_or_default();
        println!("  {:<24} {:<7} {}", memoria.unit_name, verdict, area);
    }
    println!();

    println!("Treated water:");
    println!("  Turbidity:  {:.2} NTU", report.removal.turbidity_out);
    println!("  Coliforms:  {:.2} CFU/100 mL", report.removal.coliforms_out);
    println!();

    let pipe_note = |c: PipeCompliance| match c {
        PipeCompliance::Ok => "",
        PipeCompliance::LowVelocity => " (low velocity)",
        PipeCompliance::HighVelocity => " (HIGH VELOCITY)",
    };
    println!("Piping:");
    println!(
        "  Intake:     {} PVC {} at {:.2} m/s{}",
        report.intake_pipe.diameter_label,
        report.intake_pipe.pressure_class,
        report.intake_pipe.velocity_m_s,
        pipe_note(report.intake_pipe.compliance_check)
    );
    println!(
        "  Wash/drain: {} PVC {} at {:.2} m/s{}",
        report.wash_pipe.diameter_label,
        report.wash_pipe.pressure_class,
        report.wash_pipe.velocity_m_s,
        pipe_note(report.wash_pipe.compliance_check)
    );
    println!("  Valves:     {}", report.valves.len());
    println!();

    println!("Hydraulic profile:");
    for node in &report.profile {
        println!(
            "  {:<24} WL {:>8.2} m   hf {:>5.2} m   Σhf {:>5.2} m",
            node.name, node.water_level, node.head_loss, node.accumulated_loss
        );
    }
    println!("  Total head required: {:.2} m", report.total_head_m);
    println!();

    let alerts = report.alerts();
    if alerts.is_empty() {
        println!("Status: ✓ ALL CHECKS PASS");
    } else {
        println!("Status: ✗ {} ALERT(S)", alerts.len());
        for (source, check) in alerts {
            println!(
                "  {}: {} = {} {} (limit {})",
                source, check.check, check.value, check.unit, check.limit
            );
        }
    }
    println!();
}

fn run() -> Result<(), String> {
    let input = match std::env::args().nth(1) {
        Some(path) => read_input(&path)?,
        None => {
            println!("FIME Configurator - Multi-Stage Filtration Design");
            println!("=================================================");
            println!();
            prompt_input()
        }
    };

    if let Err(e) = input.validate() {
        log::warn!("design input did not validate: {}", e);
    }

    let report = design_plant(&input, &DesignSettings::default());
    print_summary(&report);

    let record = RunRecord {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        input: &input,
        report: &report,
    };
    let json = serde_json::to_string_pretty(&record).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
