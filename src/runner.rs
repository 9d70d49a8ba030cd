/*
This module drives the evaluation: one data-driven loop over the configured
languages, and within a language one sequential pass over the evaluation
sentences. The generator is an injected collaborator with run-scoped
lifetime; the loop owns every accumulator, and record order in the
prediction log always matches sentence order.
*/
use crate::align;
use crate::config::EvalConfig;
use crate::dataset::{self, DatasetError};
use crate::generate::{GenerateError, Generator};
use crate::metrics::{classification_report, MetricsError};
use crate::predlog::{LogWriter, PredictionRecord};
use crate::prompt;
use crate::reporter::{Reporter, ScoreReport};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// One evaluated language: its display name (used in the prompt), its short
/// code (used to derive artifact file names) and its CoNLL dataset path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageSpec {
    pub language: String,
    pub code: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("could not write an evaluation artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize the score report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Evaluates every configured language in order with the same generator.
/// Returns one reporter per language, in input order.
pub fn run<G: Generator>(
    generator: &G,
    config: &EvalConfig,
    languages: &[LanguageSpec],
) -> Result<Vec<Reporter>, EvalError> {
    fs::create_dir_all(&config.out_dir)?;
    let mut reporters = Vec::with_capacity(languages.len());
    for spec in languages {
        info!(language = %spec.language, path = %spec.path.display(), "evaluating");
        reporters.push(evaluate_language(generator, config, spec)?);
    }
    Ok(reporters)
}

/// Runs the evaluation loop for a single language: prompt each sampled
/// sentence, align the generated tags, persist the prediction log and the
/// decoded responses, then score the aligned corpus and write the JSON score
/// report. A generation failure aborts the loop and propagates.
pub fn evaluate_language<G: Generator>(
    generator: &G,
    config: &EvalConfig,
    spec: &LanguageSpec,
) -> Result<Reporter, EvalError> {
    let sentences = dataset::load_conll(&spec.path)?;
    let (exemplars, sample) =
        dataset::split_few_shot(sentences, config.few_shot_size, config.sample_size)?;
    let exemplar_pairs: Vec<(String, String)> = exemplars
        .iter()
        .map(|sentence| (sentence.text(), sentence.tag_line()))
        .collect();
    let instruction = prompt::instruction_prompt(&spec.language, &exemplar_pairs);

    fs::create_dir_all(&config.out_dir)?;
    let log_path = config
        .out_dir
        .join(format!("{}_predicted_vs_reference_tags.txt", spec.code));
    let mut log = LogWriter::new(BufWriter::new(File::create(&log_path)?));
    let responses_path = config
        .out_dir
        .join(format!("{}_decoded_responses.txt", spec.code));
    let mut responses = BufWriter::new(File::create(&responses_path)?);

    let mut predicted_corpus: Vec<Vec<String>> = Vec::with_capacity(sample.len());
    for (index, sentence) in sample.iter().enumerate() {
        let text = sentence.text();
        let cue = prompt::sentence_cue(&text);
        let full_prompt = format!("{instruction}{cue}");
        let completion = generator.generate(&full_prompt)?;
        // A causal decode yields prompt + continuation; reconstruct that
        // shape so the cue search sees the same text either way.
        let decoded = format!("{full_prompt}{completion}");
        writeln!(responses, "{decoded}\n")?;

        let candidates = align::extract_candidates(&decoded, &cue, prompt::STOP_MARKER);
        if candidates.is_empty() {
            warn!(
                language = %spec.language,
                index,
                "no tags found after the sentence cue; scoring an all-O prediction"
            );
        }
        let aligned = align::align_tags(&candidates, sentence.len());
        debug!(language = %spec.language, index, tags = aligned.len(), "aligned prediction");
        log.write_record(&PredictionRecord::new(
            text,
            aligned.clone(),
            sentence.tags().to_vec(),
        ))?;
        predicted_corpus.push(aligned);
    }
    log.flush()?;
    responses.flush()?;

    let reference: Vec<Vec<&str>> = sample
        .iter()
        .map(|sentence| sentence.tags().iter().map(String::as_str).collect())
        .collect();
    let predicted: Vec<Vec<&str>> = predicted_corpus
        .iter()
        .map(|tags| tags.iter().map(String::as_str).collect())
        .collect();
    let reporter = classification_report(&reference, &predicted, config.zero_division)?;
    if let Some(score) = ScoreReport::from_reporter(&reporter) {
        let score_path = config
            .out_dir
            .join(format!("{}_evaluation_scores.json", spec.code));
        fs::write(&score_path, score.to_json()?)?;
        info!(
            language = %spec.language,
            precision = score.precision,
            recall = score.recall,
            f1 = score.f1,
            "scores written"
        );
    }
    Ok(reporter)
}
