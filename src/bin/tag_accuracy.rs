//! Scores one or more prediction logs with the position-independent
//! tag-frequency metric and writes one JSON report per input file.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "tag_accuracy",
    version,
    about = "Position-independent tag accuracy over persisted prediction logs"
)]
struct Args {
    /// Prediction logs to score
    #[arg(required = true)]
    logs: Vec<PathBuf>,

    /// Directory for the JSON reports; defaults to each log's own directory
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    for log in &args.logs {
        let records = fewner::read_log(log)
            .with_context(|| format!("could not parse the prediction log {}", log.display()))?;
        let accuracy = fewner::score_records(&records)
            .with_context(|| format!("could not score {}", log.display()))?;

        let stem = log
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("scores");
        let out_dir = args
            .out_dir
            .clone()
            .or_else(|| log.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        if !out_dir.as_os_str().is_empty() {
            fs::create_dir_all(&out_dir)?;
        }
        let report_path = out_dir.join(format!("{stem}_tag_accuracy.json"));
        fs::write(&report_path, accuracy.to_json()?)?;
        info!(
            log = %log.display(),
            including_o = accuracy.including_o,
            excluding_o = accuracy.excluding_o,
            report = %report_path.display(),
            "scored"
        );
    }
    Ok(())
}
