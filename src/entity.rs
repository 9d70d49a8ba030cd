/*
This module extracts entity spans from BIO tag sequences. The chunking rules
are the lenient (conlleval-style) ones: a span starts at a `B-` tag, at an
`I-` tag following `O`, or at a type change, and ends before a `B-` tag, an
`O` tag, or a type change. No sequence is ever rejected for being
ill-formed, only for containing a string that is not a BIO tag at all.
*/
use std::fmt::Display;
use thiserror::Error;

/// An entity is a named object found in a tag sequence. It covers the
/// half-open token range `[start, end)` and carries the entity type (such as
/// `PER`, `LOC` or `MusicalGRP`), borrowed from the tag it was parsed from.
#[derive(Debug, Hash, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Entity<'a> {
    pub start: usize,
    pub end: usize,
    pub tag: &'a str,
}

impl Display for Entity<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.tag, self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse `{0}` into a BIO tag")]
pub struct ParseTagError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    B,
    I,
    O,
}

/// Splits a tag into its prefix and its entity type. The type of the `O` tag
/// is the empty string.
fn parse_tag(tag: &str) -> Result<(Prefix, &str), ParseTagError> {
    if tag == "O" {
        return Ok((Prefix::O, ""));
    }
    match tag.split_once('-') {
        Some(("B", entity_type)) => Ok((Prefix::B, entity_type)),
        Some(("I", entity_type)) => Ok((Prefix::I, entity_type)),
        _ => Err(ParseTagError(tag.to_string())),
    }
}

/// Checks if a chunk ended between the previous and current tag.
fn end_of_chunk(prev: Prefix, prev_type: &str, curr: Prefix, curr_type: &str) -> bool {
    match (prev, curr) {
        (Prefix::B, Prefix::B)
        | (Prefix::B, Prefix::O)
        | (Prefix::I, Prefix::B)
        | (Prefix::I, Prefix::O) => true,
        (Prefix::O, _) => false,
        _ => prev_type != curr_type,
    }
}

/// Checks if a chunk started between the previous and current tag.
fn start_of_chunk(prev: Prefix, prev_type: &str, curr: Prefix, curr_type: &str) -> bool {
    match (prev, curr) {
        (_, Prefix::B) => true,
        (Prefix::O, Prefix::I) => true,
        (_, Prefix::O) => false,
        _ => prev_type != curr_type,
    }
}

/// Leniently retrieves the entity spans of a single tag sequence. A virtual
/// trailing `O` closes a chunk still open at the end of the sequence.
pub fn entity_spans<S: AsRef<str>>(sequence: &[S]) -> Result<Vec<Entity<'_>>, ParseTagError> {
    let mut spans = Vec::new();
    let mut prev_prefix = Prefix::O;
    let mut prev_type = "";
    let mut begin = 0;
    for index in 0..=sequence.len() {
        let (prefix, entity_type) = match sequence.get(index) {
            Some(tag) => parse_tag(tag.as_ref())?,
            None => (Prefix::O, ""),
        };
        if end_of_chunk(prev_prefix, prev_type, prefix, entity_type) {
            spans.push(Entity {
                start: begin,
                end: index,
                tag: prev_type,
            });
        }
        if start_of_chunk(prev_prefix, prev_type, prefix, entity_type) {
            begin = index;
        }
        prev_prefix = prefix;
        prev_type = entity_type;
    }
    Ok(spans)
}

/// Retrieves the entity spans of a whole corpus, with token indices offset
/// continuously across sentences so that equal `(start, end)` pairs always
/// refer to the same tokens.
pub(crate) fn corpus_spans<S: AsRef<str>>(
    corpus: &[Vec<S>],
) -> Result<Vec<Entity<'_>>, ParseTagError> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for sequence in corpus {
        for entity in entity_spans(sequence)? {
            spans.push(Entity {
                start: entity.start + offset,
                end: entity.end + offset,
                tag: entity.tag,
            });
        }
        offset += sequence.len();
    }
    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, QuickCheck};

    impl<'a> Entity<'a> {
        fn as_tuple(&self) -> (usize, usize, &'a str) {
            (self.start, self.end, self.tag)
        }
    }

    #[test]
    fn test_entity_spans() {
        let sequence = vec!["B-PER", "I-PER", "O", "B-LOC"];
        let actual: Vec<_> = entity_spans(&sequence)
            .unwrap()
            .iter()
            .map(Entity::as_tuple)
            .collect();
        let expected = vec![(0, 2, "PER"), (3, 4, "LOC")];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_entity_spans_inner_chunks() {
        let sequence = vec![
            "O", "O", "O", "B-MISC", "I-MISC", "I-MISC", "O", "B-PER", "I-PER",
        ];
        let actual: Vec<_> = entity_spans(&sequence)
            .unwrap()
            .iter()
            .map(Entity::as_tuple)
            .collect();
        let expected = vec![(3, 6, "MISC"), (7, 9, "PER")];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_inside_after_outside_starts_a_chunk() {
        // Lenient chunking accepts I-X with no preceding B-X.
        let sequence = vec!["O", "I-PER", "I-PER"];
        let actual: Vec<_> = entity_spans(&sequence)
            .unwrap()
            .iter()
            .map(Entity::as_tuple)
            .collect();
        assert_eq!(actual, vec![(1, 3, "PER")]);
    }

    #[test]
    fn test_type_change_splits_chunks() {
        let sequence = vec!["B-PER", "I-LOC"];
        let actual: Vec<_> = entity_spans(&sequence)
            .unwrap()
            .iter()
            .map(Entity::as_tuple)
            .collect();
        assert_eq!(actual, vec![(0, 1, "PER"), (1, 2, "LOC")]);
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let sequence = vec!["B-PER", "NOT-A-PREFIX", "O"];
        assert!(entity_spans(&sequence).is_err());
        let sequence = vec!["o"];
        assert!(entity_spans(&sequence).is_err());
    }

    #[test]
    fn test_corpus_spans_offsets() {
        let corpus = vec![vec!["B-PER", "I-PER", "O"], vec!["B-PER", "O"]];
        let actual: Vec<_> = corpus_spans(&corpus)
            .unwrap()
            .iter()
            .map(Entity::as_tuple)
            .collect();
        assert_eq!(actual, vec![(0, 2, "PER"), (3, 4, "PER")]);
    }

    #[derive(Debug, Clone)]
    enum TagToTest {
        BPer,
        IPer,
        BLoc,
        O,
    }

    impl TagToTest {
        fn as_str(&self) -> &'static str {
            match self {
                TagToTest::BPer => "B-PER",
                TagToTest::IPer => "I-PER",
                TagToTest::BLoc => "B-LOC",
                TagToTest::O => "O",
            }
        }
    }

    impl Arbitrary for TagToTest {
        fn arbitrary(g: &mut Gen) -> Self {
            g.choose(&[TagToTest::BPer, TagToTest::IPer, TagToTest::BLoc, TagToTest::O])
                .unwrap()
                .clone()
        }
    }

    #[test]
    fn test_propertie_spans_are_well_formed() {
        fn propertie_spans_are_well_formed(tags: Vec<TagToTest>) -> bool {
            let sequence: Vec<&str> = tags.iter().map(TagToTest::as_str).collect();
            let spans = entity_spans(&sequence).unwrap();
            let mut last_end = 0;
            for entity in &spans {
                let in_bounds = entity.start < entity.end && entity.end <= sequence.len();
                let ordered = entity.start >= last_end;
                let known_type = entity.tag == "PER" || entity.tag == "LOC";
                if !(in_bounds && ordered && known_type) {
                    return false;
                }
                last_end = entity.end;
            }
            true
        }
        let mut qc = QuickCheck::new().tests(2000);
        qc.quickcheck(propertie_spans_are_well_formed as fn(Vec<TagToTest>) -> bool)
    }
}
