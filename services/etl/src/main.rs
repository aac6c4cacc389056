//! Restaurant listings ETL.
//!
//! Profiles the raw listings dump, cleans it into a CSV artifact, and loads
//! the artifact into S3 and a star-schema PostgreSQL warehouse.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{error, info, info_span, Instrument, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use etl_common::EtlError;
use etl_service::config::EtlConfig;
use etl_service::pipeline::{self, LoadFlags, ZoneSource};
use etl_service::report;

#[derive(Parser, Debug)]
#[command(name = "etl")]
#[command(about = "Restaurant listings ETL: profile, transform, load")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a diagnostic profile of the raw file
    Profile {
        /// Raw listings CSV (default: ETL_RAW_PATH)
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clean the raw file into the cleaned artifact
    Transform(TransformArgs),
    /// Upload the cleaned artifact and load the warehouse
    Load(LoadArgs),
    /// Transform, then load
    Run {
        #[command(flatten)]
        transform: TransformArgs,
        #[command(flatten)]
        load: LoadFlagArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct TransformArgs {
    /// Raw listings CSV (default: ETL_RAW_PATH)
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Cleaned artifact path (default: ETL_CLEANED_PATH)
    #[arg(long)]
    cleaned: Option<PathBuf>,

    /// YAML zone table extending the built-in one
    #[arg(long)]
    zones: Option<PathBuf>,

    /// Use the --zones file instead of the built-in table
    #[arg(long, requires = "zones")]
    replace_zones: bool,
}

#[derive(ClapArgs, Debug)]
struct LoadArgs {
    /// Cleaned artifact path (default: ETL_CLEANED_PATH)
    #[arg(long)]
    cleaned: Option<PathBuf>,

    #[command(flatten)]
    flags: LoadFlagArgs,
}

#[derive(ClapArgs, Debug)]
struct LoadFlagArgs {
    /// Empty the warehouse tables before loading
    #[arg(long)]
    truncate: bool,

    /// Skip the upload and load into an in-memory warehouse
    #[arg(long)]
    dry_run: bool,
}

impl From<&LoadFlagArgs> for LoadFlags {
    fn from(args: &LoadFlagArgs) -> Self {
        Self {
            truncate: args.truncate,
            dry_run: args.dry_run,
        }
    }
}

impl TransformArgs {
    fn zone_source(&self) -> ZoneSource<'_> {
        match (&self.zones, self.replace_zones) {
            (Some(path), true) => ZoneSource::Replace(path),
            (Some(path), false) => ZoneSource::Extend(path),
            (None, _) => ZoneSource::Builtin,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if let Err(e) = init_tracing(&args.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let run_id = Uuid::new_v4();
    let span = info_span!("etl", run_id = %run_id);

    match execute(args.command).instrument(span).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = match e.downcast_ref::<EtlError>() {
                Some(etl) => {
                    error!(run_id = %run_id, category = etl.category(), error = %etl, "ETL failed");
                    etl.exit_code()
                }
                None => {
                    error!(run_id = %run_id, error = %e, "ETL failed");
                    1
                }
            };
            eprintln!("error: {:#}", e);
            ExitCode::from(code as u8)
        }
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn execute(command: Command) -> Result<()> {
    let config = EtlConfig::from_env()?;
    info!(
        raw = %config.raw_path.display(),
        cleaned = %config.cleaned_path.display(),
        bucket = %config.storage.bucket,
        warehouse = %config.warehouse.display_target(),
        "Loaded configuration"
    );

    match command {
        Command::Profile { raw, json } => {
            let raw = raw.unwrap_or_else(|| config.raw_path.clone());
            let profile = pipeline::profile(&raw)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print!("{}", report::render_profile(&profile));
            }
        }
        Command::Transform(args) => {
            run_transform(&config, &args)?;
        }
        Command::Load(args) => {
            let cleaned = args.cleaned.unwrap_or_else(|| config.cleaned_path.clone());
            let load = pipeline::load(&config, &cleaned, (&args.flags).into()).await?;
            print!("{}", report::render_load(&load));
        }
        Command::Run { transform, load } => {
            let cleaned = run_transform(&config, &transform)?;
            let load = pipeline::load(&config, &cleaned, (&load).into()).await?;
            print!("{}", report::render_load(&load));
        }
    }

    Ok(())
}

/// Run the transform stage and print its summary, returning the artifact path.
fn run_transform(config: &EtlConfig, args: &TransformArgs) -> Result<PathBuf> {
    let raw = args.raw.clone().unwrap_or_else(|| config.raw_path.clone());
    let cleaned = args
        .cleaned
        .clone()
        .unwrap_or_else(|| config.cleaned_path.clone());

    let transform = pipeline::transform(&raw, &cleaned, args.zone_source())?;
    print!("{}", report::render_transform(&transform));
    Ok(cleaned)
}
