/*
This module reads and writes the prediction log, the only persisted
interchange format of the pipeline. The log is a sequence of three-line
blocks, one per evaluated sentence:

    Sentence: <space-joined tokens>
    Predicted Tags: <space-joined tags>
    Reference Tags: <space-joined tags>

followed by a blank line. The evaluation loop writes it; the tag-frequency
scorer re-parses it later, without re-invoking the model.
*/
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

pub const SENTENCE_PREFIX: &str = "Sentence: ";
pub const PREDICTED_PREFIX: &str = "Predicted Tags: ";
pub const REFERENCE_PREFIX: &str = "Reference Tags: ";

/// One scored sentence: its surface text, the aligned predicted tags and the
/// gold reference tags. Created once per sentence and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord {
    pub sentence: String,
    pub predicted: Vec<String>,
    pub reference: Vec<String>,
}

impl PredictionRecord {
    pub fn new(sentence: String, predicted: Vec<String>, reference: Vec<String>) -> Self {
        PredictionRecord {
            sentence,
            predicted,
            reference,
        }
    }
}

/// Writes prediction records in the three-line block format.
pub struct LogWriter<W: Write> {
    inner: W,
}

impl<W: Write> LogWriter<W> {
    pub fn new(inner: W) -> Self {
        LogWriter { inner }
    }

    pub fn write_record(&mut self, record: &PredictionRecord) -> io::Result<()> {
        writeln!(self.inner, "{SENTENCE_PREFIX}{}", record.sentence)?;
        writeln!(self.inner, "{PREDICTED_PREFIX}{}", record.predicted.join(" "))?;
        writeln!(self.inner, "{REFERENCE_PREFIX}{}", record.reference.join(" "))?;
        writeln!(self.inner)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[derive(Debug, Error)]
pub enum PredLogError {
    #[error("could not read the prediction log: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: found a `Reference Tags:` line with no preceding `Predicted Tags:` line")]
    OrphanReference { line: usize },
}

/// Parses prediction records back out of a log. Lines are keyed on their
/// textual prefix; anything else (blank separators, stray output) is
/// ignored. A reference line closes the current record.
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<PredictionRecord>, PredLogError> {
    let mut records = Vec::new();
    let mut sentence: Option<String> = None;
    let mut predicted: Option<Vec<String>> = None;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(rest) = line.strip_prefix(SENTENCE_PREFIX) {
            sentence = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix(PREDICTED_PREFIX) {
            predicted = Some(rest.split_whitespace().map(str::to_string).collect());
        } else if let Some(rest) = line.strip_prefix(REFERENCE_PREFIX) {
            let reference: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            let predicted = predicted
                .take()
                .ok_or(PredLogError::OrphanReference { line: index + 1 })?;
            records.push(PredictionRecord {
                sentence: sentence.take().unwrap_or_default(),
                predicted,
                reference,
            });
        }
    }
    Ok(records)
}

/// Opens and parses a prediction log file.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<PredictionRecord>, PredLogError> {
    let file = File::open(path.as_ref())?;
    read_records(BufReader::new(file))
}
