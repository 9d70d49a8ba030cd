/*
This module turns the raw text generated by a language model back into a tag
sequence aligned with the queried sentence. The three steps are extraction
(locate the text between the sentence cue and the stop marker), cleaning
(rewrite anything that is not a BIO tag to `O`) and length coercion
(truncate or right-pad so the output always matches the sentence length).
None of the steps can fail: a response with no usable tags scores as an
all-`O` prediction.
*/

/// The outside-of-any-entity tag.
pub const OUTSIDE: &str = "O";

/// Whitespace-splits the part of the generated text that follows `cue` and
/// precedes the first `stop` marker after it (or the end of the text when the
/// marker is missing). Returns an empty vector when the cue is absent.
pub fn extract_candidates<'a>(decoded: &'a str, cue: &str, stop: &str) -> Vec<&'a str> {
    let Some(position) = decoded.find(cue) else {
        return Vec::new();
    };
    let after = &decoded[position + cue.len()..];
    let body = match after.find(stop) {
        Some(end) => &after[..end],
        None => after,
    };
    body.split_whitespace().collect()
}

/// Keeps a candidate that already is a BIO tag and rewrites everything else
/// to `O`. The rewrite is per-token: an `I-X` right after an `O` is kept
/// as-is, not repaired to `B-X`.
pub fn clean_tag(tag: &str) -> &str {
    if tag == OUTSIDE || tag.starts_with("B-") || tag.starts_with("I-") {
        tag
    } else {
        OUTSIDE
    }
}

/// Cleans the candidate tags and coerces them to exactly `len` elements,
/// truncating the excess or right-padding with `O`.
pub fn align_tags<S: AsRef<str>>(candidates: &[S], len: usize) -> Vec<String> {
    let mut aligned: Vec<String> = candidates
        .iter()
        .take(len)
        .map(|tag| clean_tag(tag.as_ref()).to_string())
        .collect();
    aligned.resize(len, OUTSIDE.to_string());
    aligned
}
