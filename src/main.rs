use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use soc_rr::{Pipeline, PipelineConfig};

/// Convert a soil carbon sheet into a response-ratio NetCDF file.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON config file; unset fields use the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input table (.xlsx, .csv or .parquet).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Sheet to read from a spreadsheet input.
    #[arg(long)]
    sheet: Option<String>,

    /// Output NetCDF path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Download the input from this URL first, unless already present.
    #[arg(long)]
    source_url: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(sheet) = args.sheet {
        config.sheet = sheet;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if args.source_url.is_some() {
        config.source_url = args.source_url;
    }

    let summary = Pipeline::new(config)
        .run()
        .context("converting soil carbon table")?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
