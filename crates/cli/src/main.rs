mod config;
mod logging;

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use larder_core::{run_documents, PipelineOutcome, Severity};
use larder_report::{build_report, ReportOptions, ValidationReport};
use larder_storage::{load_export, DirectoryStore, RunArtifacts, RunManifest, RunStore};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use crate::config::{load_config, LarderConfig, Settings};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Severity threshold accepted by `--fail-on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeverityArg {
    Critical,
    High,
    Medium,
    Low,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => Severity::Critical,
            SeverityArg::High => Severity::High,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::Low => Severity::Low,
        }
    }
}

/// Recipe export validation and cleaning.
#[derive(Parser)]
#[command(
    name = "larder",
    version,
    about = "Validate and clean recipe document-store exports"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Configuration file (default: ./larder.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean an export and write tables, quarantine, report and manifest
    Run {
        /// Directory holding recipes.json, users.json and interactions.json
        export_dir: PathBuf,
        /// Output root (overrides output_dir from the config file)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate an export without writing anything
    Check {
        /// Directory holding recipes.json, users.json and interactions.json
        export_dir: PathBuf,
        /// Exit 1 when an issue at or above this severity exists
        #[arg(long, value_enum)]
        fail_on: Option<SeverityArg>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Run { export_dir, out } => {
            let settings = resolve_settings(&config, out, None, cli.output, cli.quiet);
            cmd_run(&export_dir, &settings, cli.output, cli.quiet);
        }
        Commands::Check {
            export_dir,
            fail_on,
        } => {
            let settings =
                resolve_settings(&config, None, fail_on.map(Into::into), cli.output, cli.quiet);
            cmd_check(&export_dir, &settings, cli.output, cli.quiet);
        }
    }
}

fn resolve_settings(
    config: &LarderConfig,
    out: Option<PathBuf>,
    fail_on: Option<Severity>,
    output: OutputFormat,
    quiet: bool,
) -> Settings {
    match config.resolve(out, fail_on) {
        Ok(s) => {
            debug!(settings = ?s, "resolved settings");
            s
        }
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Result of loading and running one export, before anything is written.
struct Validated {
    outcome: PipelineOutcome,
    report: ValidationReport,
    manifest: RunManifest,
}

fn validate_export(
    export_dir: &Path,
    settings: &Settings,
    output: OutputFormat,
    quiet: bool,
) -> Validated {
    let started = Instant::now();

    let snapshot = match load_export(export_dir) {
        Ok(s) => s,
        Err(e) => {
            report_error(&format!("error loading export: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let outcome = match run_documents(&snapshot.recipes, &snapshot.users, &snapshot.interactions)
    {
        Ok(o) => o,
        Err(e) => {
            report_error(&format!("malformed export: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let timestamp = match OffsetDateTime::now_utc().format(&Rfc3339) {
        Ok(t) => t,
        Err(e) => {
            report_error(
                &format!("internal error: could not format timestamp: {}", e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };

    let report = build_report(
        &outcome,
        &timestamp,
        &ReportOptions {
            example_limit: settings.example_limit,
        },
    );
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let manifest = RunManifest::new(&outcome, &timestamp, snapshot.fingerprint(), elapsed_ms);

    Validated {
        outcome,
        report,
        manifest,
    }
}

fn cmd_run(export_dir: &Path, settings: &Settings, output: OutputFormat, quiet: bool) {
    let validated = validate_export(export_dir, settings, output, quiet);

    let mut store = DirectoryStore::new(settings.output_dir.clone());
    let artifacts = RunArtifacts {
        accepted: &validated.outcome.accepted,
        quarantine: &validated.outcome.quarantine,
        report: &validated.report,
        manifest: &validated.manifest,
    };
    if let Err(e) = store.write_run(&artifacts) {
        report_error(&format!("error writing output: {}", e), output, quiet);
        process::exit(1);
    }

    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => print_run_summary(store.root(), &validated),
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "output_dir": store.root().display().to_string(),
                "health_score": validated.report.health_score,
                "severity_totals": validated.report.severity_totals,
                "manifest": validated.manifest,
            });
            print_json(&summary, output, quiet);
        }
    }
}

fn print_run_summary(root: &Path, validated: &Validated) {
    let m = &validated.manifest;
    println!("Wrote {}", root.display());
    println!(
        "  recipes:      {} accepted of {} read ({} duplicates)",
        m.accepted_recipes, m.recipes_read, m.duplicate_recipes
    );
    println!(
        "  ingredients:  {} accepted ({} cascaded)",
        m.accepted_ingredients, m.cascaded_ingredients
    );
    println!(
        "  steps:        {} accepted ({} cascaded)",
        m.accepted_steps, m.cascaded_steps
    );
    println!(
        "  interactions: {} accepted of {} read",
        m.accepted_interactions, m.interactions_read
    );
    println!("  quarantined:  {} entries", m.quarantined_entries);
    println!(
        "  health score: {:.2}%",
        validated.report.health_score * 100.0
    );
}

fn cmd_check(export_dir: &Path, settings: &Settings, output: OutputFormat, quiet: bool) {
    let validated = validate_export(export_dir, settings, output, quiet);
    let report = &validated.report;

    if !quiet {
        match output {
            OutputFormat::Text => print!("{}", report.to_markdown()),
            OutputFormat::Json => print_json(report, output, quiet),
        }
    }

    let failing = report.issues_at_or_above(settings.fail_on);
    if failing > 0 {
        report_error(
            &format!(
                "check failed: {} issue(s) at or above {}",
                failing, settings.fail_on
            ),
            output,
            quiet,
        );
        process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(value: &T, output: OutputFormat, quiet: bool) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            report_error(
                &format!("internal error: could not serialize output: {}", e),
                output,
                quiet,
            );
            process::exit(1);
        }
    }
}

/// Report an error message respecting output format and quiet flag.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
