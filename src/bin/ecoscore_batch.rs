use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use ecoscore_api::{
    models::{BatchRowResult, ModelType},
    services::data_processor,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

fn parse_model_type(value: &str) -> Result<ModelType, String> {
    ModelType::parse(value).map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(
    name = "ecoscore-batch",
    about = "Score a CSV file offline with one of the sustainability models",
    version
)]
struct Cli {
    /// CSV file with a header row
    file: PathBuf,
    /// Model to run each row through: packaging, carbon, product or esg
    #[arg(short, long, value_parser = parse_model_type)]
    model: ModelType,
    /// Seed for the packaging and ESG noise, for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Pretty-print the JSON output"
    )]
    pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    model_type: ModelType,
    total_rows: usize,
    succeeded: usize,
    failed: usize,
    results: Vec<BatchRowResult>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let content = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let rows = data_processor::parse_csv(&content)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let model_type = cli.model;
    let results = data_processor::process_rows_for(model_type, &rows, &mut rng);
    let succeeded = results.iter().filter(|r| r.is_success()).count();

    let report = Report {
        model_type,
        total_rows: rows.len(),
        succeeded,
        failed: results.len() - succeeded,
        results,
    };
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", rendered);
    Ok(())
}
