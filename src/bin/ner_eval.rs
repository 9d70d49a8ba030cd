//! Runs the few-shot NER evaluation over every language of a JSON manifest
//! and writes the prediction logs, decoded responses and score reports.

use anyhow::{Context, Result};
use clap::Parser;
use fewner::{
    CompletionClient, CompletionOptions, DivByZeroStrat, EvalConfigBuilder, LanguageSpec,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "ner_eval",
    version,
    about = "Few-shot NER evaluation of a causal language model over CoNLL datasets"
)]
struct Args {
    /// JSON manifest of the languages to evaluate: a list of
    /// {"language", "code", "path"} entries
    #[arg(long)]
    manifest: PathBuf,

    /// Directory receiving the per-language artifacts
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of sentences embedded in the prompt as exemplars
    #[arg(long, default_value_t = fewner::DEFAULT_FEW_SHOT_SIZE)]
    few_shot: usize,

    /// Number of sentences evaluated per language
    #[arg(long, default_value_t = fewner::DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Base URL of an OpenAI-compatible completion server
    #[arg(long, env = "FEWNER_BASE_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// Model name passed to the completion server
    #[arg(
        long,
        env = "FEWNER_MODEL",
        default_value = "meta-llama/Llama-2-7b-chat-hf"
    )]
    model: String,

    /// Completion budget per sentence
    #[arg(long, default_value_t = 1024)]
    max_tokens: u32,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.6)]
    temperature: f32,

    /// Whole-request timeout of one generation call, in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// What to do when a span metric divides by zero
    #[arg(long, default_value = "replaceby0")]
    zero_division: DivByZeroStrat,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let manifest = fs::read_to_string(&args.manifest)
        .with_context(|| format!("could not read the manifest {}", args.manifest.display()))?;
    let languages: Vec<LanguageSpec> = serde_json::from_str(&manifest)
        .context("the manifest is not a JSON list of {language, code, path} entries")?;

    let client = CompletionClient::new(CompletionOptions {
        base_url: args.base_url,
        model: args.model,
        max_tokens: args.max_tokens,
        temperature: args.temperature,
        timeout: Duration::from_secs(args.timeout_secs),
    })?;
    let config = EvalConfigBuilder::new(args.out_dir)
        .few_shot_size(args.few_shot)
        .sample_size(args.sample_size)
        .zero_division(args.zero_division)
        .build();

    let reporters = fewner::run(&client, &config, &languages)?;
    for (spec, reporter) in languages.iter().zip(&reporters) {
        println!("{}", spec.language);
        println!("{reporter}");
    }
    Ok(())
}
