/*
This module contains the `EvalConfig` struct, which gathers the knobs of an
evaluation run, and its builder. The builder tracks whether the
division-by-zero strategy was set explicitly (left) or is still the default
(right).
*/
use crate::metrics::DivByZeroStrat;
use either::Either as LeftOrRight;
use std::fmt::{self, Display};
use std::path::PathBuf;

/// How many sentences become few-shot exemplars when not configured.
pub const DEFAULT_FEW_SHOT_SIZE: usize = 10;
/// How many sentences are evaluated per language when not configured.
pub const DEFAULT_SAMPLE_SIZE: usize = 300;

/// Parameters of one evaluation run, shared by every language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Number of sentences used as few-shot exemplars in the prompt.
    pub few_shot_size: usize,
    /// Number of sentences evaluated per language.
    pub sample_size: usize,
    /// Directory receiving the prediction logs, decoded responses and score
    /// reports.
    pub out_dir: PathBuf,
    /// What to do when a span metric divides by zero.
    pub zero_division: DivByZeroStrat,
}

impl EvalConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        EvalConfigBuilder::new(out_dir).build()
    }
}

impl Display for EvalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Few-shot exemplars: {}\nEvaluation sample size: {}\nOutput directory: {}\nStrategy when encountering a division by zero: {:?}",
            self.few_shot_size,
            self.sample_size,
            self.out_dir.display(),
            self.zero_division
        )
    }
}

/// This builder can be used to build and customize an `EvalConfig`
/// structure.
pub struct EvalConfigBuilder {
    few_shot_size: usize,
    sample_size: usize,
    out_dir: PathBuf,
    zero_division: LeftOrRight<DivByZeroStrat, DivByZeroStrat>,
}

impl EvalConfigBuilder {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        EvalConfigBuilder {
            few_shot_size: DEFAULT_FEW_SHOT_SIZE,
            sample_size: DEFAULT_SAMPLE_SIZE,
            out_dir: out_dir.into(),
            zero_division: LeftOrRight::Right(DivByZeroStrat::default()),
        }
    }

    pub fn few_shot_size(mut self, few_shot_size: usize) -> Self {
        self.few_shot_size = few_shot_size;
        self
    }

    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn zero_division(mut self, zero_division: DivByZeroStrat) -> Self {
        self.zero_division = LeftOrRight::Left(zero_division);
        self
    }

    pub fn build(self) -> EvalConfig {
        EvalConfig {
            few_shot_size: self.few_shot_size,
            sample_size: self.sample_size,
            out_dir: self.out_dir,
            zero_division: self.zero_division.into_inner(),
        }
    }
}
