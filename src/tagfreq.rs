/*
This module computes the custom tag-frequency accuracies from a prediction
log. The metric is position-independent: a reference tag counts as a hit
when the predicted tag multiset of the same sentence still holds an unused
copy of it, wherever that copy sat in the sequence. Two ratios come out of
it, one counting the `O` tag and one ignoring it. This is not token
accuracy and must not be confused with it.
*/
use crate::align::OUTSIDE;
use crate::predlog::PredictionRecord;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two accuracy ratios of one scored prediction log. The key names are
/// part of the output contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagAccuracy {
    #[serde(rename = "Token Accuracy Score Including O")]
    pub including_o: f64,
    #[serde(rename = "Token Accuracy Score Excluding O")]
    pub excluding_o: f64,
}

impl TagAccuracy {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TagFreqError {
    /// The log holds no reference tokens at all, so neither ratio is defined.
    #[error("the prediction log contains no reference tokens")]
    NoTokens,
    /// Every reference token is `O`, so the excluding-O ratio is undefined.
    #[error("the prediction log contains no reference tokens outside the `O` class")]
    NoEntityTokens,
}

/// Scores a parsed prediction log. For each sentence, each reference tag in
/// order consumes one remaining copy of itself from the predicted multiset;
/// the ratios accumulate over all sentences. A zero denominator for either
/// ratio is an error, not a NaN.
pub fn score_records(records: &[PredictionRecord]) -> Result<TagAccuracy, TagFreqError> {
    let mut hits = 0usize;
    let mut entity_hits = 0usize;
    let mut total_tokens = 0usize;
    let mut entity_tokens = 0usize;
    for record in records {
        let mut remaining: AHashMap<&str, usize> = AHashMap::new();
        for tag in &record.predicted {
            *remaining.entry(tag.as_str()).or_insert(0) += 1;
        }
        for tag in &record.reference {
            if let Some(count) = remaining.get_mut(tag.as_str()) {
                if *count > 0 {
                    *count -= 1;
                    hits += 1;
                    if tag.as_str() != OUTSIDE {
                        entity_hits += 1;
                    }
                }
            }
            total_tokens += 1;
            if tag.as_str() != OUTSIDE {
                entity_tokens += 1;
            }
        }
    }
    if total_tokens == 0 {
        return Err(TagFreqError::NoTokens);
    }
    if entity_tokens == 0 {
        return Err(TagFreqError::NoEntityTokens);
    }
    Ok(TagAccuracy {
        including_o: hits as f64 / total_tokens as f64,
        excluding_o: entity_hits as f64 / entity_tokens as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(predicted: &[&str], reference: &[&str]) -> PredictionRecord {
        PredictionRecord::new(
            String::from("unused"),
            predicted.iter().map(|t| t.to_string()).collect(),
            reference.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn test_hits_are_position_independent() {
        // The entity tags sit at the wrong indices but still count.
        let records = vec![record(
            &["B-PER", "O", "O", "I-PER"],
            &["O", "B-PER", "I-PER", "O"],
        )];
        let accuracy = score_records(&records).unwrap();
        assert_eq!(accuracy.including_o, 1.0);
        assert_eq!(accuracy.excluding_o, 1.0);
    }

    #[test]
    fn test_all_outside_prediction_scenario() {
        // Reference [B-Person, O] against the multiset {O: 2}.
        let records = vec![record(&["O", "O"], &["B-Person", "O"])];
        let accuracy = score_records(&records).unwrap();
        assert_eq!(accuracy.including_o, 0.5);
        assert_eq!(accuracy.excluding_o, 0.0);
    }

    #[test]
    fn test_each_predicted_copy_is_consumed_once() {
        // One predicted B-PER cannot match two reference B-PER.
        let records = vec![record(&["B-PER", "O", "O"], &["B-PER", "B-PER", "O"])];
        let accuracy = score_records(&records).unwrap();
        assert_eq!(accuracy.including_o, 2.0 / 3.0);
        assert_eq!(accuracy.excluding_o, 0.5);
    }

    #[test]
    fn test_multisets_do_not_leak_across_sentences() {
        let records = vec![
            record(&["B-PER", "B-PER"], &["B-PER", "O"]),
            record(&["O", "O"], &["B-PER", "O"]),
        ];
        let accuracy = score_records(&records).unwrap();
        // Sentence one: B-PER hit + O miss. Sentence two: O hit, no B-PER left
        // to borrow from sentence one.
        assert_eq!(accuracy.including_o, 0.5);
        assert_eq!(accuracy.excluding_o, 0.5);
    }

    #[test]
    fn test_no_tokens_is_an_error() {
        assert_eq!(score_records(&[]), Err(TagFreqError::NoTokens));
        let empty = vec![record(&[], &[])];
        assert_eq!(score_records(&empty), Err(TagFreqError::NoTokens));
    }

    #[test]
    fn test_no_entity_tokens_is_an_error() {
        let records = vec![record(&["O", "O"], &["O", "O"]), record(&["O"], &["O"])];
        assert_eq!(score_records(&records), Err(TagFreqError::NoEntityTokens));
    }

    #[test]
    fn test_report_serializes_with_contract_keys() {
        let records = vec![record(&["B-PER", "O"], &["B-PER", "O"])];
        let accuracy = score_records(&records).unwrap();
        let json = accuracy.to_json().unwrap();
        assert!(json.contains("\"Token Accuracy Score Including O\": 1.0"));
        assert!(json.contains("\"Token Accuracy Score Excluding O\": 1.0"));
    }
}
