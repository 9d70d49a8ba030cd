/**
This module computes the span-level metrics (precision, recall, f-score,
support) of a ground-truth corpus and a predicted corpus of BIO tag
sequences. A predicted entity counts as a true positive only when its span
and type both match a reference entity.
*/
use crate::entity::{corpus_spans, ParseTagError};
use crate::reporter::{Average, ClassMetrics, OverallAverage, Reporter};
use ahash::{AHashMap, AHashSet};
use itertools::multizip;
use ndarray::{array, Array1, Zip};
use ndarray_stats::{errors::MultiInputError, SummaryStatisticsExt};
use num::Num;
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

/// How do we handle cases with a division by zero? Do we replace the result
/// by 0, by 1, or return an error? SeqEval replaces the result by 0, which is
/// the default here as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DivByZeroStrat {
    /// Returns 0 when the denominator is 0
    #[default]
    ReplaceBy0,
    /// Returns 1 when the denominator is 0
    ReplaceBy1,
    /// Returns an error
    ReturnError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse `{0}` into a division-by-zero strategy")]
pub struct ParseStratError(String);

impl FromStr for DivByZeroStrat {
    type Err = ParseStratError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby0" | "replacebyzero" | "0" => Ok(DivByZeroStrat::ReplaceBy0),
            "replaceby1" | "replacebyone" | "1" => Ok(DivByZeroStrat::ReplaceBy1),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParseStratError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("encountered a division by zero")]
pub struct DivisionByZeroError;

/// Enum error encompassing the failures that can happen when computing the
/// precision, recall, f-score and support.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("inconsistent lengths: `y_true` holds {0} elements, `y_pred` holds {1}")]
    InconsistentLength(usize, usize),
    #[error(transparent)]
    DivisionByZero(#[from] DivisionByZeroError),
    #[error(transparent)]
    InvalidTag(#[from] ParseTagError),
    #[error("could not average the per-class metrics: {0}")]
    Stats(#[from] MultiInputError),
    #[error("received an empty input for `{0}`")]
    EmptyInput(&'static str),
}

fn check_consistent_length<T>(y_true: &[Vec<T>], y_pred: &[Vec<T>]) -> Result<(), MetricsError> {
    if y_true.len() != y_pred.len() {
        return Err(MetricsError::InconsistentLength(y_true.len(), y_pred.len()));
    }
    for (true_sequence, pred_sequence) in y_true.iter().zip(y_pred) {
        if true_sequence.len() != pred_sequence.len() {
            return Err(MetricsError::InconsistentLength(
                true_sequence.len(),
                pred_sequence.len(),
            ));
        }
    }
    Ok(())
}

/// Per-class entity counts: the sorted class names along with, for each
/// class, the number of predicted spans, of exactly-matching spans and of
/// reference spans.
struct ClassCounts<'a> {
    names: Vec<&'a str>,
    pred_sum: Array1<usize>,
    tp_sum: Array1<usize>,
    true_sum: Array1<usize>,
}

fn class_counts<'a, S: AsRef<str>>(
    y_true: &'a [Vec<S>],
    y_pred: &'a [Vec<S>],
) -> Result<ClassCounts<'a>, MetricsError> {
    let mut spans_true: AHashMap<&str, AHashSet<(usize, usize)>> = AHashMap::new();
    for entity in corpus_spans(y_true)? {
        spans_true
            .entry(entity.tag)
            .or_default()
            .insert((entity.start, entity.end));
    }
    let mut spans_pred: AHashMap<&str, AHashSet<(usize, usize)>> = AHashMap::new();
    for entity in corpus_spans(y_pred)? {
        spans_pred
            .entry(entity.tag)
            .or_default()
            .insert((entity.start, entity.end));
    }
    let names: Vec<&str> = BTreeSet::from_iter(spans_true.keys().chain(spans_pred.keys()).copied())
        .into_iter()
        .collect();
    let pred_sum = Array1::from_iter(
        names
            .iter()
            .map(|name| spans_pred.get(name).map_or(0, |spans| spans.len())),
    );
    let true_sum = Array1::from_iter(
        names
            .iter()
            .map(|name| spans_true.get(name).map_or(0, |spans| spans.len())),
    );
    let tp_sum = Array1::from_iter(names.iter().map(|name| {
        match (spans_true.get(name), spans_pred.get(name)) {
            (Some(true_spans), Some(pred_spans)) => true_spans.intersection(pred_spans).count(),
            _ => 0,
        }
    }));
    Ok(ClassCounts {
        names,
        pred_sum,
        tp_sum,
        true_sum,
    })
}

fn prf_divide<I: Num + Copy>(
    numerator: Array1<I>,
    mut denominator: Array1<I>,
    zero_division: DivByZeroStrat,
) -> Result<Array1<I>, DivisionByZeroError> {
    let zero_mask = denominator.mapv(|d| if d == I::zero() { I::zero() } else { I::one() });
    let found_zero_in_denom = zero_mask.iter().any(|m| *m == I::zero());
    if found_zero_in_denom && matches!(zero_division, DivByZeroStrat::ReturnError) {
        return Err(DivisionByZeroError);
    }
    denominator.mapv_inplace(|d| if d == I::zero() { I::one() } else { d });
    let mut result = numerator / denominator;
    match zero_division {
        DivByZeroStrat::ReplaceBy0 => result = result * zero_mask,
        DivByZeroStrat::ReplaceBy1 => {
            Zip::from(&mut result).and(&zero_mask).for_each(|r, m| {
                if *m == I::zero() {
                    *r = I::one();
                }
            });
        }
        DivByZeroStrat::ReturnError => {}
    }
    Ok(result)
}

/// Computes the f-score of already-divided precision and recall arrays. A
/// class with `precision + recall == 0` gets an f-score of 0.
fn f_score_from(precision: &Array1<f32>, recall: &Array1<f32>) -> Array1<f32> {
    let mut denominator = precision + recall;
    denominator.mapv_inplace(|d| if d == 0.0 { 1.0 } else { d });
    (precision * recall).mapv(|x| 2.0 * x) / denominator
}

fn per_class_prf(
    counts: &ClassCounts<'_>,
    zero_division: DivByZeroStrat,
) -> Result<(Array1<f32>, Array1<f32>, Array1<f32>), DivisionByZeroError> {
    let tp = counts.tp_sum.mapv(|x| x as f32);
    let pred = counts.pred_sum.mapv(|x| x as f32);
    let support = counts.true_sum.mapv(|x| x as f32);
    let precision = prf_divide(tp.clone(), pred, zero_division)?;
    let recall = prf_divide(tp, support, zero_division)?;
    let f_score = f_score_from(&precision, &recall);
    Ok((precision, recall, f_score))
}

fn overall_prf(
    counts: &ClassCounts<'_>,
    per_class: (&Array1<f32>, &Array1<f32>, &Array1<f32>),
    average: OverallAverage,
    zero_division: DivByZeroStrat,
) -> Result<(f32, f32, f32, usize), MetricsError> {
    let support = counts.true_sum.sum();
    if counts.names.is_empty() {
        return match zero_division {
            DivByZeroStrat::ReturnError => Err(DivisionByZeroError.into()),
            _ => Ok((0.0, 0.0, 0.0, 0)),
        };
    }
    let (precision, recall, f_score) = per_class;
    match average {
        OverallAverage::Micro => {
            let tp = counts.tp_sum.sum() as f32;
            let micro_precision = prf_divide(
                array![tp],
                array![counts.pred_sum.sum() as f32],
                zero_division,
            )?[0];
            let micro_recall = prf_divide(array![tp], array![support as f32], zero_division)?[0];
            let micro_f = f_score_from(&array![micro_precision], &array![micro_recall])[0];
            Ok((micro_precision, micro_recall, micro_f, support))
        }
        OverallAverage::Macro => {
            let macro_precision = precision
                .mean()
                .ok_or(MetricsError::EmptyInput("precision"))?;
            let macro_recall = recall.mean().ok_or(MetricsError::EmptyInput("recall"))?;
            let macro_f = f_score.mean().ok_or(MetricsError::EmptyInput("f-score"))?;
            Ok((macro_precision, macro_recall, macro_f, support))
        }
        OverallAverage::Weighted => {
            let weights = counts.true_sum.mapv(|x| x as f32);
            if weights.sum() == 0.0 {
                return match zero_division {
                    DivByZeroStrat::ReturnError => Err(DivisionByZeroError.into()),
                    _ => Ok((0.0, 0.0, 0.0, 0)),
                };
            }
            let weighted_precision = precision.weighted_mean(&weights)?;
            let weighted_recall = recall.weighted_mean(&weights)?;
            let weighted_f = f_score.weighted_mean(&weights)?;
            Ok((weighted_precision, weighted_recall, weighted_f, support))
        }
    }
}

/// Main entrypoint of the span scorer. This function computes the precision,
/// recall, f-score and support of the true and predicted tag sequences. It
/// returns information about the individual classes and the micro, macro and
/// weighted overall averages. The returned structure can be used to
/// prettyprint the results or to extract a serializable score report.
///
/// * `y_true`: True tag sequences
/// * `y_pred`: Predicted tag sequences
/// * `zero_division`: What to do in case of a division by zero.
pub fn classification_report<S: AsRef<str>>(
    y_true: &[Vec<S>],
    y_pred: &[Vec<S>],
    zero_division: DivByZeroStrat,
) -> Result<Reporter, MetricsError> {
    if y_true.is_empty() {
        return Err(MetricsError::EmptyInput("y_true"));
    }
    if y_pred.is_empty() {
        return Err(MetricsError::EmptyInput("y_pred"));
    }
    check_consistent_length(y_true, y_pred)?;
    let counts = class_counts(y_true, y_pred)?;
    let (precision, recall, f_score) = per_class_prf(&counts, zero_division)?;
    let mut reporter = Reporter::default();
    for (name, class_precision, class_recall, class_f, class_support) in multizip((
        counts.names.iter(),
        precision.iter(),
        recall.iter(),
        f_score.iter(),
        counts.true_sum.iter(),
    )) {
        reporter.insert(ClassMetrics {
            class: String::from(*name),
            average: Average::None,
            precision: *class_precision,
            recall: *class_recall,
            fscore: *class_f,
            support: *class_support,
        });
    }
    for average in [
        OverallAverage::Micro,
        OverallAverage::Macro,
        OverallAverage::Weighted,
    ] {
        let (p, r, f, s) = overall_prf(
            &counts,
            (&precision, &recall, &f_score),
            average,
            zero_division,
        )?;
        reporter.insert(ClassMetrics::new_overall(average, p, r, f, s));
    }
    Ok(reporter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_classification_report_worked_example() {
        let y_true = vec![
            vec!["O", "O", "O", "B-MISC", "I-MISC", "I-MISC", "O"],
            vec!["B-PER", "I-PER", "O"],
        ];
        let y_pred = vec![
            vec!["O", "O", "B-MISC", "I-MISC", "I-MISC", "I-MISC", "O"],
            vec!["B-PER", "I-PER", "O"],
        ];
        let reporter = classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0).unwrap();

        let misc = reporter.class("MISC").unwrap();
        assert!(close(misc.precision, 0.0) && close(misc.recall, 0.0));
        assert_eq!(misc.support, 1);
        let per = reporter.class("PER").unwrap();
        assert!(close(per.precision, 1.0) && close(per.recall, 1.0) && close(per.fscore, 1.0));

        for average in [
            OverallAverage::Micro,
            OverallAverage::Macro,
            OverallAverage::Weighted,
        ] {
            let overall = reporter.overall(average).unwrap();
            assert!(close(overall.precision, 0.5), "{average} precision");
            assert!(close(overall.recall, 0.5), "{average} recall");
            assert!(close(overall.fscore, 0.5), "{average} f-score");
            assert_eq!(overall.support, 2);
        }
    }

    #[test]
    fn test_perfect_prediction_scores_one() {
        let y_true = vec![vec!["O", "B-PER", "I-PER", "O"]];
        let y_pred = vec![vec!["O", "B-PER", "I-PER", "O"]];
        let reporter = classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0).unwrap();
        let micro = reporter.overall(OverallAverage::Micro).unwrap();
        assert!(close(micro.precision, 1.0));
        assert!(close(micro.recall, 1.0));
        assert!(close(micro.fscore, 1.0));
    }

    #[test]
    fn test_no_entities_at_all() {
        let y_true = vec![vec!["O", "O"]];
        let y_pred = vec![vec!["O", "O"]];
        let reporter = classification_report(&y_true, &y_pred, DivByZeroStrat::ReplaceBy0).unwrap();
        let micro = reporter.overall(OverallAverage::Micro).unwrap();
        assert!(close(micro.precision, 0.0));
        assert_eq!(micro.support, 0);

        let error = classification_report(&y_true, &y_pred, DivByZeroStrat::ReturnError);
        assert!(matches!(error, Err(MetricsError::DivisionByZero(_))));
    }

    #[test]
    fn test_check_lengths() {
        let y_true = vec![vec!["O", "O"], vec!["O"]];
        let y_pred_short = vec![vec!["O", "O"]];
        assert!(matches!(
            classification_report(&y_true, &y_pred_short, DivByZeroStrat::ReplaceBy0),
            Err(MetricsError::InconsistentLength(2, 1))
        ));
        let y_pred_ragged = vec![vec!["O", "O"], vec!["O", "O"]];
        assert!(matches!(
            classification_report(&y_true, &y_pred_ragged, DivByZeroStrat::ReplaceBy0),
            Err(MetricsError::InconsistentLength(1, 2))
        ));
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let empty: Vec<Vec<&str>> = vec![];
        assert!(matches!(
            classification_report(&empty, &empty, DivByZeroStrat::ReplaceBy0),
            Err(MetricsError::EmptyInput("y_true"))
        ));
    }

    #[test]
    fn test_prf_divide_strategies() {
        let numerator = array![1.0_f32, 2.0];
        let denominator = array![0.0_f32, 4.0];
        let by_zero = prf_divide(
            numerator.clone(),
            denominator.clone(),
            DivByZeroStrat::ReplaceBy0,
        )
        .unwrap();
        assert_eq!(by_zero, array![0.0, 0.5]);
        let by_one = prf_divide(
            numerator.clone(),
            denominator.clone(),
            DivByZeroStrat::ReplaceBy1,
        )
        .unwrap();
        assert_eq!(by_one, array![1.0, 0.5]);
        assert_eq!(
            prf_divide(numerator, denominator, DivByZeroStrat::ReturnError),
            Err(DivisionByZeroError)
        );
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "ReplaceBy0".parse::<DivByZeroStrat>().unwrap(),
            DivByZeroStrat::ReplaceBy0
        );
        assert_eq!(
            "error".parse::<DivByZeroStrat>().unwrap(),
            DivByZeroStrat::ReturnError
        );
        assert!("bogus".parse::<DivByZeroStrat>().is_err());
    }
}
