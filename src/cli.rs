use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use crate::cleaning::{self, CleanReport};
use crate::config::Config;
use crate::loader::{self, dto::LoadReport, ImportMode, LoadOptions};

/// Clean a scraped job-listing CSV and load it into MySQL for reporting
#[derive(Debug, Parser)]
#[command(name = "job-warehouse", version, about)]
pub struct Cli {
    /// Print the final report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize the raw CSV and write the cleaned CSV
    Clean(CleanArgs),
    /// Load the cleaned CSV into MySQL and rebuild the reporting views
    Load(LoadArgs),
    /// Clean, then load
    Run {
        #[command(flatten)]
        clean: CleanArgs,
        #[command(flatten)]
        load: LoadFlags,
    },
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Raw CSV to clean [default: RAW_CSV_PATH]
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Destination of the cleaned CSV, overwritten [default: CLEANED_CSV_PATH]
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Cleaned CSV to load [default: CLEANED_CSV_PATH]
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub flags: LoadFlags,
}

#[derive(Debug, Args)]
pub struct LoadFlags {
    /// When to replace the jobs table contents
    #[arg(long, value_enum, default_value_t = ImportMode::Always)]
    pub import: ImportMode,

    /// Roll back the whole replace on any failure instead of per batch
    #[arg(long)]
    pub single_transaction: bool,
}

#[derive(Debug, Default, Serialize)]
struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    clean: Option<CleanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load: Option<LoadReport>,
}

fn clean(args: &CleanArgs, config: &Config) -> anyhow::Result<CleanReport> {
    let input = args.input.as_ref().unwrap_or(&config.raw_csv_path);
    let output = args.output.as_ref().unwrap_or(&config.cleaned_csv_path);

    cleaning::clean_file(input, output)
        .with_context(|| format!("cleaning {} failed", input.display()))
}

async fn load(input: PathBuf, flags: &LoadFlags, config: &Config) -> anyhow::Result<LoadReport> {
    let options = LoadOptions {
        input,
        import: flags.import,
        single_transaction: flags.single_transaction,
    };

    let report = loader::run(config, &options)
        .await
        .with_context(|| format!("loading {} failed", options.input.display()))?;

    if report.views_failed() > 0 {
        warn!("Setup finished with some views missing");
    } else {
        info!("Setup completed successfully");
    }
    Ok(report)
}

/// Dispatch the parsed command
pub async fn run(cli: Cli, config: &Config) -> anyhow::Result<()> {
    let mut report = RunReport::default();

    match &cli.command {
        Command::Clean(args) => {
            report.clean = Some(clean(args, config)?);
        }
        Command::Load(args) => {
            let input = args
                .input
                .clone()
                .unwrap_or_else(|| config.cleaned_csv_path.clone());
            report.load = Some(load(input, &args.flags, config).await?);
        }
        Command::Run { clean: args, load: flags } => {
            let cleaned = clean(args, config)?;
            let input = cleaned.output.clone();
            report.clean = Some(cleaned);
            report.load = Some(load(input, flags, config).await?);
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{}", json);
    }
    Ok(())
}
