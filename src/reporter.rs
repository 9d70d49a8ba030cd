/**
This module gives a few tools to prettyprint the metrics of every class and
the overall averages, and to serialize the per-language score report.
*/
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::Display;

/// The reporter holds the metrics of each class and the overall metrics. It
/// can be used to display the results as if they were collected into a
/// dataframe. The reporter is built by the `classification_report` function.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Reporter {
    classes: BTreeSet<ClassMetrics>,
}

impl Reporter {
    pub(crate) fn insert(&mut self, metrics: ClassMetrics) -> bool {
        self.classes.insert(metrics)
    }

    /// Returns the metrics of a single class, such as `"PER"`.
    pub fn class(&self, name: &str) -> Option<&ClassMetrics> {
        self.classes
            .iter()
            .find(|m| m.average == Average::None && m.class == name)
    }

    /// Returns one of the overall rows, such as `Overall_Micro`.
    pub fn overall(&self, average: OverallAverage) -> Option<&ClassMetrics> {
        let class = average.to_string();
        self.classes.iter().find(|m| m.class == class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassMetrics> {
        self.classes.iter()
    }
}

/// The Reporter struct acts as a dataframe when displayed. The overall rows
/// come first, followed by the individual classes in alphabetical order.
impl Display for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Class, Precision, Recall, Fscore, Support")?;
        for row in self.classes.iter().filter(|m| m.average != Average::None) {
            writeln!(f, "{}", row)?;
        }
        for row in self.classes.iter().filter(|m| m.average == Average::None) {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

/// Datastructure holding the metrics of a given class. Identity (equality and
/// ordering) is given by the class name and the average, not by the numeric
/// fields.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClassMetrics {
    /// The class, such as "PER", "HumanSettlement", or an overall row name
    pub class: String,
    /// The average used to compute this class' metrics
    pub average: Average,
    /// Precision metric
    pub precision: f32,
    /// Recall metric
    pub recall: f32,
    /// Fscore metric
    pub fscore: f32,
    /// Support metric
    pub support: usize,
}

impl ClassMetrics {
    pub(crate) fn new_overall(
        average: OverallAverage,
        precision: f32,
        recall: f32,
        fscore: f32,
        support: usize,
    ) -> Self {
        ClassMetrics {
            class: average.to_string(),
            average: average.into(),
            precision,
            recall,
            fscore,
            support,
        }
    }
}

impl PartialEq for ClassMetrics {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.average == other.average
    }
}
impl Eq for ClassMetrics {}

impl PartialOrd for ClassMetrics {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassMetrics {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.average.rank().cmp(&other.average.rank()) {
            Ordering::Equal => self.class.cmp(&other.class),
            ordering => ordering,
        }
    }
}

/// The ClassMetrics struct acts as a line in a dataframe when displayed.
impl Display for ClassMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.class, self.precision, self.recall, self.fscore, self.support
        )
    }
}

/// Enumeration of the different types of averaging supported by this crate.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum Average {
    None,
    Micro,
    Macro,
    Weighted,
}

impl Average {
    /// Ordering rank used during reporting, so that the rows with an average
    /// other than `None` sort before the per-class rows.
    fn rank(self) -> u8 {
        match self {
            Average::None => 3,
            Average::Micro => 0,
            Average::Macro => 1,
            Average::Weighted => 2,
        }
    }
}

impl Display for Average {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum OverallAverage {
    Micro,
    Macro,
    Weighted,
}

impl Display for OverallAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str_content = match self {
            Self::Micro => "Overall_Micro",
            Self::Macro => "Overall_Macro",
            Self::Weighted => "Overall_Weighted",
        };
        write!(f, "{}", str_content)
    }
}

impl From<OverallAverage> for Average {
    fn from(value: OverallAverage) -> Self {
        match value {
            OverallAverage::Micro => Average::Micro,
            OverallAverage::Macro => Average::Macro,
            OverallAverage::Weighted => Average::Weighted,
        }
    }
}

/// The serialized score report of one evaluated language: the micro-averaged
/// span precision, recall and F1. Written once per language at the end of a
/// run; the key names are part of the output contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
    #[serde(rename = "F1-Score")]
    pub f1: f64,
}

impl ScoreReport {
    /// Extracts the report from the `Overall_Micro` row of a `Reporter`.
    pub fn from_reporter(reporter: &Reporter) -> Option<Self> {
        let micro = reporter.overall(OverallAverage::Micro)?;
        Some(ScoreReport {
            precision: f64::from(micro.precision),
            recall: f64::from(micro.recall),
            f1: f64::from(micro.fscore),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reporter_with_rows() -> Reporter {
        let mut reporter = Reporter::default();
        reporter.insert(ClassMetrics {
            class: String::from("PER"),
            average: Average::None,
            precision: 1.0,
            recall: 0.5,
            fscore: 2.0 / 3.0,
            support: 2,
        });
        reporter.insert(ClassMetrics {
            class: String::from("LOC"),
            average: Average::None,
            precision: 0.0,
            recall: 0.0,
            fscore: 0.0,
            support: 1,
        });
        reporter.insert(ClassMetrics::new_overall(
            OverallAverage::Micro,
            0.5,
            0.5,
            0.5,
            3,
        ));
        reporter
    }

    #[test]
    fn test_display_orders_overalls_first() {
        let reporter = reporter_with_rows();
        let rendered = reporter.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Class, Precision, Recall, Fscore, Support");
        assert!(lines[1].starts_with("Overall_Micro"));
        assert!(lines[2].starts_with("LOC"));
        assert!(lines[3].starts_with("PER"));
    }

    #[test]
    fn test_lookup_by_class_and_overall() {
        let reporter = reporter_with_rows();
        assert_eq!(reporter.class("PER").unwrap().support, 2);
        assert!(reporter.class("Overall_Micro").is_none());
        assert_eq!(reporter.overall(OverallAverage::Micro).unwrap().support, 3);
        assert!(reporter.overall(OverallAverage::Macro).is_none());
    }

    #[test]
    fn test_score_report_json_keys() {
        let reporter = reporter_with_rows();
        let score = ScoreReport::from_reporter(&reporter).unwrap();
        let json = score.to_json().unwrap();
        assert!(json.contains("\"Precision\""));
        assert!(json.contains("\"Recall\""));
        assert!(json.contains("\"F1-Score\""));
        let parsed: ScoreReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, score);
    }
}
