//! # wasmv validator (wasmvd)
//!
//! Validates the function bodies and global initializers of a decoded
//! WebAssembly module without executing anything.
//!
//! ## Usage
//!
//! ```bash
//! wasmvd <module.json> [--config <toml>] [--collect-all] [--format text|json]
//! ```
//!
//! The module file is a JSON description of the module's types, imports,
//! globals and functions; bodies and initializers are arrays of instruction
//! mnemonics such as `"i32.const 5"` or `"br_table 0 1"`.
//!
//! The `--config` option reads validator limits and the failure policy from a
//! TOML file. `--collect-all` keeps validating after the first failing unit so
//! every failure is reported.
//!
//! The process exits with status 0 when the module is valid, 1 when it is
//! invalid and 2 when the input could not be read.

#![warn(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wasmv_validator::{FailurePolicy, Module, ModuleValidator, UnitFailure, ValidationReport, ValidatorConfig};

/// wasmv validator CLI arguments
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the JSON module description
    module: PathBuf,

    /// Validator configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report every failing unit instead of stopping at the first
    #[arg(long)]
    collect_all: bool,

    /// Override the operand stack limit
    #[arg(long, env = "WASMV_MAX_OPERAND_STACK")]
    max_operand_stack: Option<usize>,

    /// Override the control nesting limit
    #[arg(long, env = "WASMV_MAX_CONTROL_DEPTH")]
    max_control_depth: Option<usize>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log validation progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// How the verdict is printed
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One line per failure
    Text,
    /// A single JSON document
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("wasmvd: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Initialize the tracing system for logging
fn initialize_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let format = env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);

    match format.as_str() {
        "json" => subscriber.json().init(),
        "pretty" => subscriber.pretty().init(),
        _ => subscriber.compact().init(),
    }
}

/// Validate the module named by `args` and print the report.
///
/// Returns whether the module is valid.
fn run(args: &Args) -> Result<bool> {
    let config = build_config(args)?;
    let module = load_module(&args.module)?;

    let start = Instant::now();
    let report = ModuleValidator::new(config).validate(&module);
    info!(
        "Validated {} functions and {} globals in {:?}",
        module.functions.len(),
        module.globals.len(),
        start.elapsed()
    );

    let source = args.module.display().to_string();
    match args.format {
        OutputFormat::Text => print!("{}", render_text(&source, &report)),
        OutputFormat::Json => println!("{}", render_json(&source, &report)?),
    }
    Ok(report.is_valid())
}

/// Combine the configuration file with command-line overrides.
fn build_config(args: &Args) -> Result<ValidatorConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ValidatorConfig::default(),
    };
    if args.collect_all {
        config.failure_policy = FailurePolicy::CollectAll;
    }
    if let Some(limit) = args.max_operand_stack {
        config.max_operand_stack = limit;
    }
    if let Some(limit) = args.max_control_depth {
        config.max_control_depth = limit;
    }
    debug!("Validator configuration: {:?}", config);
    Ok(config)
}

/// Load a validator configuration from a TOML file
fn load_config(path: &Path) -> Result<ValidatorConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

fn parse_config(text: &str) -> Result<ValidatorConfig> {
    let config: ValidatorConfig = toml::from_str(text)?;
    if config.max_control_depth == 0 {
        warn!("max_control_depth = 0 rejects every function body");
    }
    Ok(config)
}

/// Load a JSON module description from disk
fn load_module(path: &Path) -> Result<Module> {
    debug!("Loading module description: {}", path.display());
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read module file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid module description {}", path.display()))
}

fn render_text(source: &str, report: &ValidationReport) -> String {
    if report.is_valid() {
        return format!("{source}: valid ({} units)\n", report.passed().len());
    }
    let mut out = String::new();
    for failure in report.failures() {
        out.push_str(&format!("{source}: {failure}\n"));
    }
    out.push_str(&format!(
        "{source}: invalid ({} failed, {} passed)\n",
        report.failures().len(),
        report.passed().len()
    ));
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    module:   &'a str,
    valid:    bool,
    passed:   usize,
    failures: Vec<JsonFailure>,
}

#[derive(Serialize)]
struct JsonFailure {
    unit:        String,
    kind:        Option<String>,
    category:    String,
    code:        u16,
    message:     &'static str,
    instruction: Option<usize>,
}

impl From<&UnitFailure> for JsonFailure {
    fn from(failure: &UnitFailure) -> Self {
        Self {
            unit:        failure.unit.to_string(),
            kind:        failure.error.kind().map(|kind| format!("{kind:?}")),
            category:    format!("{:?}", failure.error.category),
            code:        failure.error.code,
            message:     failure.error.message,
            instruction: failure.error.instr_index(),
        }
    }
}

fn render_json(source: &str, report: &ValidationReport) -> Result<String> {
    let json = JsonReport {
        module:   source,
        valid:    report.is_valid(),
        passed:   report.passed().len(),
        failures: report.failures().iter().map(JsonFailure::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
