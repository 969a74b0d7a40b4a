//! ShadowPersona CLI - Command-line interface for the ShadowPersona dataset tools
//!
//! Commands:
//! - generate: Write a raw synthetic engagement dataset
//! - pipeline: Generate, feature-engineer, and save a processed dataset
//! - derive: Feature-engineer an existing raw dataset
//! - describe: Summary statistics for a dataset
//! - dashboard: Dashboard views over a processed dataset
//! - doctor: Diagnose the environment and data files
//! - schema: Print the dataset column schema

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use shadowpersona::dashboard::{Dashboard, DashboardView, TraitFilter};
use shadowpersona::eda;
use shadowpersona::generator::{RecordCount, RecordGenerator};
use shadowpersona::pipeline::{derive_file, generate_raw_dataset, DataPipeline, PipelineConfig};
use shadowpersona::store::read_table;
use shadowpersona::types::{column_description, TraitLabel, DERIVED_COLUMNS, RAW_COLUMNS};
use shadowpersona::{PipelineError, PRODUCER_NAME, VERSION};

const DEFAULT_PROCESSED_PATH: &str = "data/shadowpersona_processed_data.csv";

/// ShadowPersona - Synthetic engagement data with simulated psychological traits
#[derive(Parser)]
#[command(name = "shadowpersona")]
#[command(version = VERSION)]
#[command(about = "Generate and explore synthetic user engagement data", long_about = None)]
struct Cli {
    /// Increase log verbosity (RUST_LOG overrides)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a raw dataset (no derived columns)
    Generate {
        /// Number of records to generate
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        records: Option<RecordCount>,

        /// Random seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pipeline configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the full generate → derive → save pipeline
    Pipeline {
        /// Number of records to generate
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        records: Option<RecordCount>,

        /// Random seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,

        /// Directory the processed dataset is written into
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Pipeline configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Feature-engineer an existing raw dataset
    Derive {
        /// Raw dataset path
        #[arg(short, long)]
        input: PathBuf,

        /// Processed dataset path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print summary statistics for a dataset
    Describe {
        /// Dataset path
        #[arg(short, long, default_value = DEFAULT_PROCESSED_PATH)]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dashboard views over a processed dataset
    Dashboard {
        /// Processed dataset path
        #[arg(short, long, default_value = DEFAULT_PROCESSED_PATH)]
        data: PathBuf,

        /// Show the profile of this user
        #[arg(long)]
        user: Option<String>,

        /// Restrict aggregate views to these traits (repeatable)
        #[arg(long = "trait")]
        traits: Vec<TraitLabel>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose environment and data files
    Doctor {
        /// Dataset to check
        #[arg(short, long, default_value = DEFAULT_PROCESSED_PATH)]
        data: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the dataset column schema
    Schema {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose > 0 { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ShadowCliError> {
    match cli.command {
        Commands::Generate {
            records,
            seed,
            output,
            config,
        } => {
            let config = load_config(config.as_deref(), records, seed, None)?;
            let output = output.unwrap_or_else(|| config.raw_output_path());
            cmd_generate(&config, &output)
        }

        Commands::Pipeline {
            records,
            seed,
            output_dir,
            config,
            json,
        } => {
            let config = load_config(config.as_deref(), records, seed, output_dir)?;
            cmd_pipeline(config, json)
        }

        Commands::Derive { input, output } => cmd_derive(&input, &output),

        Commands::Describe { input, json } => cmd_describe(&input, json),

        Commands::Dashboard {
            data,
            user,
            traits,
            json,
        } => cmd_dashboard(&data, user.as_deref(), traits, json),

        Commands::Doctor { data, json } => cmd_doctor(&data, json),

        Commands::Schema { json } => cmd_schema(json),
    }
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(
    path: Option<&Path>,
    records: Option<RecordCount>,
    seed: Option<u64>,
    output_dir: Option<PathBuf>,
) -> Result<PipelineConfig, ShadowCliError> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(records) = records {
        config.num_records = records;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }

    Ok(config)
}

fn cmd_generate(config: &PipelineConfig, output: &Path) -> Result<(), ShadowCliError> {
    let mut generator = RecordGenerator::new(&config.generator_config());
    let table = generate_raw_dataset(&mut generator, config.num_records, output)?;

    println!("Wrote {} records to {}", table.len(), output.display());
    Ok(())
}

fn cmd_pipeline(config: PipelineConfig, json: bool) -> Result<(), ShadowCliError> {
    let report = DataPipeline::new(config).run()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pipeline Report");
        println!("===============");
        println!("Flow:     {}", report.flow_name);
        println!("Run ID:   {}", report.run_id);
        println!("Records:  {}", report.records);
        println!("Columns:  {}", report.columns.len());
        println!("Output:   {}", report.output_path.display());
        if let Some(seed) = report.seed {
            println!("Seed:     {}", seed);
        }
        println!("\nStages:");
        for stage in &report.stages {
            println!("  {:<24} {:>10.2} ms", stage.name, stage.duration_ms);
        }
    }

    Ok(())
}

fn cmd_derive(input: &Path, output: &Path) -> Result<(), ShadowCliError> {
    let table = derive_file(input, output)?;
    println!(
        "Derived features for {} records; saved to {}",
        table.len(),
        output.display()
    );
    Ok(())
}

fn cmd_describe(input: &Path, json: bool) -> Result<(), ShadowCliError> {
    if !input.exists() {
        return Err(ShadowCliError::DataNotFound(input.to_path_buf()));
    }
    let table = read_table(input)?;
    let summaries = eda::describe(&table);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("{} records x {} columns", table.len(), table.columns().len());
        println!();
        print!("{}", eda::render_text(&summaries));
    }

    Ok(())
}

fn cmd_dashboard(
    data: &Path,
    user: Option<&str>,
    traits: Vec<TraitLabel>,
    json: bool,
) -> Result<(), ShadowCliError> {
    if !data.exists() {
        return Err(ShadowCliError::DataNotFound(data.to_path_buf()));
    }

    let dashboard = Dashboard::load(data)?;
    let filter = if traits.is_empty() {
        TraitFilter::All
    } else {
        TraitFilter::Only(traits)
    };
    let view = DashboardView::build(&dashboard, &filter, user);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", view.render_text());
    }

    Ok(())
}

fn cmd_doctor(data: &Path, json: bool) -> Result<(), ShadowCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("ShadowPersona version {}", VERSION),
    });

    if !data.exists() {
        checks.push(DoctorCheck {
            name: "data_file".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "{} does not exist; run 'shadowpersona pipeline' to create it",
                data.display()
            ),
        });
    } else {
        match read_table(data) {
            Ok(table) => {
                checks.push(DoctorCheck {
                    name: "data_file".to_string(),
                    status: CheckStatus::Ok,
                    message: format!("{} readable ({} records)", data.display(), table.len()),
                });
                checks.push(schema_check(&table));
            }
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "data_file".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read data file: {}", e),
                });
            }
        }
    }

    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (text output)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is redirected (consider --json)".to_string(),
        }
    };
    checks.push(stdout_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("ShadowPersona Doctor Report");
        println!("===========================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ShadowCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn schema_check(table: &shadowpersona::Table) -> DoctorCheck {
    let missing_raw = table.missing_columns(&RAW_COLUMNS);
    let missing_derived = table.missing_columns(&DERIVED_COLUMNS);

    if !missing_raw.is_empty() {
        DoctorCheck {
            name: "schema".to_string(),
            status: CheckStatus::Error,
            message: format!("Missing raw column(s): {}", missing_raw.join(", ")),
        }
    } else if !missing_derived.is_empty() {
        DoctorCheck {
            name: "schema".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Raw dataset only; missing derived column(s): {}",
                missing_derived.join(", ")
            ),
        }
    } else {
        DoctorCheck {
            name: "schema".to_string(),
            status: CheckStatus::Ok,
            message: format!("All {} columns present", RAW_COLUMNS.len() + DERIVED_COLUMNS.len()),
        }
    }
}

fn cmd_schema(json: bool) -> Result<(), ShadowCliError> {
    let columns = schema_columns();

    if json {
        println!("{}", serde_json::to_string_pretty(&columns)?);
    } else {
        println!("Dataset Schema");
        println!();
        for column in &columns {
            let origin = if column.derived { "derived" } else { "raw" };
            println!(
                "  {:<32} {:<8} {:<8} {}",
                column.name, column.kind, origin, column.description
            );
        }
    }

    Ok(())
}

fn schema_columns() -> Vec<SchemaColumn> {
    RAW_COLUMNS
        .iter()
        .map(|&name| (name, false))
        .chain(DERIVED_COLUMNS.iter().map(|&name| (name, true)))
        .map(|(name, derived)| {
            let (kind, description) = column_description(name).unwrap_or(("string", ""));
            SchemaColumn {
                name: name.to_string(),
                kind: kind.to_string(),
                derived,
                description: description.to_string(),
            }
        })
        .collect()
}

// Error types

#[derive(Debug)]
enum ShadowCliError {
    Pipeline(PipelineError),
    Json(serde_json::Error),
    DataNotFound(PathBuf),
    DoctorFailed,
}

impl From<PipelineError> for ShadowCliError {
    fn from(e: PipelineError) -> Self {
        ShadowCliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for ShadowCliError {
    fn from(e: serde_json::Error) -> Self {
        ShadowCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ShadowCliError> for CliError {
    fn from(e: ShadowCliError) -> Self {
        match e {
            ShadowCliError::Pipeline(e) => {
                let (code, hint) = match &e {
                    PipelineError::InvalidArgument(_) => {
                        ("INVALID_ARGUMENT", "Record counts must be non-negative integers")
                    }
                    PipelineError::SchemaViolation(_) => {
                        ("SCHEMA_VIOLATION", "Run 'shadowpersona schema' for the expected columns")
                    }
                    PipelineError::IoFailure { .. } => ("IO_ERROR", "Check file paths and permissions"),
                    PipelineError::ParseError(_) => ("PARSE_ERROR", "Check the delimited file format"),
                    PipelineError::JsonError(_) => ("JSON_ERROR", "Check the configuration file syntax"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            ShadowCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            ShadowCliError::DataNotFound(path) => CliError {
                code: "DATA_NOT_FOUND".to_string(),
                message: format!("Processed data not found at {}", path.display()),
                hint: Some("Run 'shadowpersona pipeline' first to generate it".to_string()),
            },
            ShadowCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(serde::Serialize)]
struct SchemaColumn {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    derived: bool,
    description: String,
}
