//! Command-line interface for the `st-core` binary.
//!
//! `report`, `cycles` and `alarms` run the full pipeline and render one view
//! of its output; `export` writes the processed table as CSV; `config`
//! inspects threshold files.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use st_common::{Error, OutputFormat, Result};
use st_config::{load_thresholds, resolve_thresholds, threshold_schema, CONFIG_SCHEMA_VERSION};
use tracing::debug;

use crate::analysis::{OutlierConfig, OutlierMethod, TrendConfig};
use crate::exit_codes::ExitCode;
use crate::export::export_enriched;
use crate::input::load_inputs;
use crate::logging::LogFormat;
use crate::pipeline::Pipeline;
use crate::render::{key_value_csv, renderer_for, ReportView};
use crate::settings::{AnalysisSettings, DEFAULT_CYCLE_SIZE};

/// Satellite telemetry analysis and reporting.
#[derive(Parser, Debug)]
#[command(name = "st-core", version, about)]
pub struct Cli {
    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Human)]
    pub log_format: LogFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis and print the summary report
    Report(AnalyzeArgs),
    /// Run the full analysis and print one report per cycle
    Cycles(AnalyzeArgs),
    /// Run the full analysis and print every alarm
    Alarms(AnalyzeArgs),
    /// Run the full analysis and write the processed table as CSV
    Export(ExportArgs),
    /// Inspect threshold configuration
    Config(ConfigArgs),
}

/// Inputs and analysis knobs shared by the analysis commands.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// CSV files or directories of CSV files
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Threshold file (YAML, JSON or TOML)
    #[arg(long, value_name = "PATH")]
    pub thresholds: Option<PathBuf>,

    /// Rows per reporting cycle
    #[arg(long, default_value_t = DEFAULT_CYCLE_SIZE)]
    pub cycle_size: usize,

    /// Polynomial degree of the temperature trend fit
    #[arg(long, default_value_t = 2)]
    pub trend_degree: usize,

    /// Outlier detection rule
    #[arg(long, value_enum, default_value_t = OutlierMethod::Iqr)]
    pub outlier_method: OutlierMethod,

    /// Outlier threshold (IQR multiplier or z-score limit)
    #[arg(long)]
    pub outlier_threshold: Option<f64>,
}

impl AnalyzeArgs {
    pub fn settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            cycle_size: self.cycle_size,
            trend: TrendConfig {
                degree: self.trend_degree,
                ..TrendConfig::default()
            },
            outliers: OutlierConfig {
                method: self.outlier_method,
                threshold: self
                    .outlier_threshold
                    .unwrap_or_else(|| self.outlier_method.default_threshold()),
            },
            ..AnalysisSettings::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    /// Destination of the processed CSV
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective threshold configuration and where it came from
    Show {
        /// Threshold file (falls back to ST_THRESHOLDS, then built-in defaults)
        #[arg(long, value_name = "PATH")]
        thresholds: Option<PathBuf>,
    },
    /// Check that a threshold file loads and is consistent
    Validate {
        /// Threshold file to check
        path: PathBuf,
    },
    /// Print the JSON Schema of the threshold file
    Schema,
}

/// Run a parsed command line and return the process exit code.
pub fn run(cli: &Cli) -> ExitCode {
    let result = match &cli.command {
        Commands::Report(args) => run_analysis(cli, args, ReportView::Summary),
        Commands::Cycles(args) => run_analysis(cli, args, ReportView::Cycles),
        Commands::Alarms(args) => run_analysis(cli, args, ReportView::Alarms),
        Commands::Export(args) => run_export(cli, args),
        Commands::Config(args) => run_config(cli, &args.command),
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            report_error(cli.format, &err);
            ExitCode::from(&err)
        }
    }
}

fn run_analysis(cli: &Cli, args: &AnalyzeArgs, view: ReportView) -> Result<ExitCode> {
    let resolved = resolve_thresholds(args.thresholds.as_deref())?;
    let pipeline = Pipeline::new(args.settings(), &resolved.config)?;
    let raws = load_inputs(&args.inputs)?;
    let output = pipeline.run(&raws);
    let rendered = renderer_for(cli.format).render(&output, view)?;
    emit(cli.output.as_deref(), &rendered)?;
    Ok(ExitCode::for_alarm_count(output.alarms.len()))
}

fn run_export(cli: &Cli, args: &ExportArgs) -> Result<ExitCode> {
    let resolved = resolve_thresholds(args.analyze.thresholds.as_deref())?;
    let pipeline = Pipeline::new(args.analyze.settings(), &resolved.config)?;
    let raws = load_inputs(&args.analyze.inputs)?;
    let output = pipeline.run(&raws);
    export_enriched(&output.table, &args.out)?;

    let summary = serde_json::json!({
        "path": args.out.display().to_string(),
        "rows": output.table.len(),
        "alarms": output.alarms.len(),
    });
    let rendered = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
        OutputFormat::Text => format!(
            "Wrote {} rows to {}",
            output.table.len(),
            args.out.display()
        ),
        OutputFormat::Csv => key_value_csv(&summary)?,
    };
    emit(cli.output.as_deref(), &rendered)?;
    Ok(ExitCode::for_alarm_count(output.alarms.len()))
}

fn run_config(cli: &Cli, command: &ConfigCommands) -> Result<ExitCode> {
    let rendered = match command {
        ConfigCommands::Show { thresholds } => {
            let resolved = resolve_thresholds(thresholds.as_deref())?;
            let body = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "source": resolved.source,
                "thresholds": resolved.config,
            });
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&body)?,
                OutputFormat::Text => format!(
                    "Source: {}\n{}",
                    resolved.source,
                    serde_json::to_string_pretty(&resolved.config)?
                ),
                OutputFormat::Csv => key_value_csv(&body)?,
            }
        }
        ConfigCommands::Validate { path } => {
            load_thresholds(path)?;
            let body = serde_json::json!({
                "path": path.display().to_string(),
                "valid": true,
            });
            match cli.format {
                OutputFormat::Json => serde_json::to_string_pretty(&body)?,
                OutputFormat::Text => format!("{}: valid", path.display()),
                OutputFormat::Csv => key_value_csv(&body)?,
            }
        }
        ConfigCommands::Schema => serde_json::to_string_pretty(&threshold_schema())?,
    };
    emit(cli.output.as_deref(), &rendered)?;
    Ok(ExitCode::Clean)
}

fn emit(path: Option<&Path>, text: &str) -> Result<()> {
    let newline = if text.ends_with('\n') { "" } else { "\n" };
    match path {
        Some(path) => {
            std::fs::write(path, format!("{text}{newline}"))?;
            debug!(path = %path.display(), "report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{text}{newline}")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn report_error(format: OutputFormat, err: &Error) {
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "error": {
                    "code": err.code(),
                    "message": err.to_string(),
                }
            });
            eprintln!("{body}");
        }
        OutputFormat::Text | OutputFormat::Csv => eprintln!("error: {err}"),
    }
}
