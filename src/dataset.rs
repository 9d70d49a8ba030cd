/*
This module loads CoNLL-style annotated files. Each non-blank, non-comment
line holds whitespace-separated columns with the surface token first and the
BIO tag last; blank lines and comment lines separate sentences.
*/
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem::take;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lines starting with this marker separate sentences, like blank lines do.
pub const COMMENT_MARKER: &str = "# id";

/// One annotated sentence: a sequence of surface tokens with one gold tag per
/// token. The two sequences always have the same length and never change
/// after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    words: Vec<String>,
    tags: Vec<String>,
}

impl Sentence {
    pub(crate) fn new(words: Vec<String>, tags: Vec<String>) -> Self {
        debug_assert_eq!(words.len(), tags.len());
        Sentence { words, tags }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The space-joined surface form, as presented to the model.
    pub fn text(&self) -> String {
        self.words.join(" ")
    }

    /// The space-joined gold tags, as presented in few-shot exemplars.
    pub fn tag_line(&self) -> String {
        self.tags.join(" ")
    }
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: expected at least a token and a tag, found `{content}`", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("requested {requested} sentences but only {available} are available")]
    NotEnoughSentences { requested: usize, available: usize },
}

/// Loads every sentence of a CoNLL-style file. Sentences with zero tokens
/// (consecutive boundary lines) are dropped, and a sentence still pending at
/// the end of the file is flushed even without a trailing boundary line.
pub fn load_conll(path: impl AsRef<Path>) -> Result<Vec<Sentence>, DatasetError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut sentences = Vec::new();
    let mut words: Vec<String> = Vec::new();
    let mut tags: Vec<String> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            if !words.is_empty() {
                sentences.push(Sentence::new(take(&mut words), take(&mut tags)));
            }
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 2 {
            return Err(DatasetError::MalformedLine {
                path: path.to_path_buf(),
                line: index + 1,
                content: line.to_string(),
            });
        }
        words.push(columns[0].to_string());
        tags.push(columns[columns.len() - 1].to_string());
    }
    if !words.is_empty() {
        sentences.push(Sentence::new(words, tags));
    }
    Ok(sentences)
}

/// Splits a loaded dataset into a few-shot exemplar pool and an evaluation
/// sample: the first `few_shot` sentences become exemplars, the following
/// `sample` sentences the evaluation set. The two sets never overlap.
pub fn split_few_shot(
    sentences: Vec<Sentence>,
    few_shot: usize,
    sample: usize,
) -> Result<(Vec<Sentence>, Vec<Sentence>), DatasetError> {
    let requested = few_shot + sample;
    if sentences.len() < requested {
        return Err(DatasetError::NotEnoughSentences {
            requested,
            available: sentences.len(),
        });
    }
    let mut remaining = sentences.into_iter();
    let exemplars: Vec<Sentence> = remaining.by_ref().take(few_shot).collect();
    let evaluation: Vec<Sentence> = remaining.take(sample).collect();
    Ok((exemplars, evaluation))
}
