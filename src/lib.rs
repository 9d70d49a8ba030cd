/*!
This library evaluates the few-shot named-entity tagging ability of a causal
language model across multiple languages. It loads CoNLL-style gold data,
builds a few-shot prompt per language, drives a black-box text generator one
sentence at a time, aligns the generated free text back onto a fixed-length
BIO tag sequence, and scores the aligned predictions two ways.

# BIO tagging
Every token of a sentence carries one tag: `B-X` marks the first token of an
entity of type `X`, `I-X` a following token of the same entity and `O` a
token outside of any entity. Chunking is lenient (conlleval-style): an
`I-X` with no preceding `B-X` still opens an entity.

# The two metrics
* The span metric treats a maximal run of `B-`/`I-` tags of one type as a
  single unit and counts a predicted entity as correct only when its token
  range and type both match a reference entity. Precision, recall, f-score
  and support are reported per class and as micro, macro and weighted
  overall averages.
* The tag-frequency metric compares the predicted and reference tags of each
  sentence as multisets, irrespective of position, and reports the hit
  ratios including and excluding the `O` tag. It is computed from the
  persisted prediction log, not from in-memory state, so it can be re-run
  later without touching the model.

# Alignment
Generated text is parsed by locating the sentence cue, taking everything up
to the first stop marker, rewriting every non-tag token to `O` and coercing
the result to the sentence length. Alignment never fails; a response the
model botched entirely scores as an all-`O` prediction.

# Example
```rust
use fewner::{align_tags, extract_candidates, STOP_MARKER};

let cue = "\nSentence: John went home\nSequence of BIO Tags:";
let decoded = format!("...prompt...{cue} B-OtherPER O XYZ ##### trailing noise");
let candidates = extract_candidates(&decoded, cue, STOP_MARKER);
assert_eq!(align_tags(&candidates, 3), vec!["B-OtherPER", "O", "O"]);
```
*/

pub mod align;
pub mod config;
pub mod dataset;
pub mod entity;
pub mod generate;
pub mod metrics;
pub mod predlog;
pub mod prompt;
pub mod reporter;
pub mod runner;
pub mod tagfreq;

// The public api starts here
pub use align::{align_tags, clean_tag, extract_candidates, OUTSIDE};

pub use config::{EvalConfig, EvalConfigBuilder, DEFAULT_FEW_SHOT_SIZE, DEFAULT_SAMPLE_SIZE};

pub use dataset::{load_conll, split_few_shot, DatasetError, Sentence, COMMENT_MARKER};

pub use entity::{entity_spans, Entity, ParseTagError};

pub use generate::{CompletionClient, CompletionOptions, GenerateError, Generator};

pub use metrics::{
    classification_report, DivByZeroStrat, DivisionByZeroError, MetricsError, ParseStratError,
};

pub use predlog::{
    read_log, read_records, LogWriter, PredLogError, PredictionRecord, PREDICTED_PREFIX,
    REFERENCE_PREFIX, SENTENCE_PREFIX,
};

pub use prompt::{instruction_prompt, sentence_cue, tag_vocabulary, ENTITY_CATALOG, STOP_MARKER};

pub use reporter::{Average, ClassMetrics, OverallAverage, Reporter, ScoreReport};

pub use runner::{evaluate_language, run, EvalError, LanguageSpec};

pub use tagfreq::{score_records, TagAccuracy, TagFreqError};
