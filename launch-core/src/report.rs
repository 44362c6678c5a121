//! Hold-out evaluation and table summaries.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::OutcomeCounts;

/// Seeded shuffle split. The test part has `ceil(n * test_fraction)` items and
/// both parts must end up non-empty.
pub fn train_test_split<T: Clone>(
    items: &[T],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(CoreError::invalid_input(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n = items.len();
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(CoreError::invalid_input(format!(
            "cannot split {n} examples with test fraction {test_fraction}"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let test = order[..n_test].iter().map(|&i| items[i].clone()).collect();
    let train = order[n_test..].iter().map(|&i| items[i].clone()).collect();
    Ok((train, test))
}

/// Precision/recall/F1 for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics for a binary success/failure classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub failure: ClassMetrics,
    pub success: ClassMetrics,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn class_metrics(truth: &[bool], predicted: &[bool], class: bool) -> ClassMetrics {
    let pairs = || truth.iter().zip(predicted);
    let tp = pairs().filter(|(t, p)| **t == class && **p == class).count();
    let predicted_pos = predicted.iter().filter(|&&p| p == class).count();
    let support = truth.iter().filter(|&&t| t == class).count();

    let precision = ratio(tp, predicted_pos);
    let recall = ratio(tp, support);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassMetrics {
        precision,
        recall,
        f1,
        support,
    }
}

impl ClassificationReport {
    /// Build a report from aligned truth and prediction slices. Undefined
    /// ratios (no predicted or no actual members of a class) score `0.0`.
    pub fn from_predictions(truth: &[bool], predicted: &[bool]) -> Result<Self> {
        if truth.len() != predicted.len() {
            return Err(CoreError::invalid_input(format!(
                "{} labels but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }
        if truth.is_empty() {
            return Err(CoreError::invalid_input("cannot score an empty test set"));
        }

        let correct = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
        let failure = class_metrics(truth, predicted, false);
        let success = class_metrics(truth, predicted, true);
        let total = truth.len() as f64;

        let macro_avg = ClassMetrics {
            precision: (failure.precision + success.precision) / 2.0,
            recall: (failure.recall + success.recall) / 2.0,
            f1: (failure.f1 + success.f1) / 2.0,
            support: truth.len(),
        };
        let weight = |f: fn(&ClassMetrics) -> f64| {
            (f(&failure) * failure.support as f64 + f(&success) * success.support as f64) / total
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
            support: truth.len(),
        };

        Ok(Self {
            accuracy: correct as f64 / total,
            failure,
            success,
            macro_avg,
            weighted_avg,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, m) in [("failure", &self.failure), ("success", &self.success)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (label, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

/// Shape, missing cells and outcome balance of a raw launch table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    /// Empty cells per column, in column order.
    pub missing: Vec<(String, usize)>,
    /// Present only when the table has a `success` column.
    pub outcomes: Option<OutcomeCounts>,
}

impl TableSummary {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(File::open(path.as_ref())?)
    }

    /// Summarize without schema validation, so broken tables can be inspected.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let success_col = columns.iter().position(|c| c == "success");

        let mut missing = vec![0usize; columns.len()];
        let mut outcomes = OutcomeCounts::default();
        let mut rows = 0;
        for row in rdr.records() {
            let row = row?;
            rows += 1;
            for (i, slot) in missing.iter_mut().enumerate() {
                if row.get(i).is_none_or(|v| v.trim().is_empty()) {
                    *slot += 1;
                }
            }
            if let Some(col) = success_col {
                match row.get(col).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
                    Some("true") | Some("1") | Some("1.0") => outcomes.success += 1,
                    Some("false") | Some("0") | Some("0.0") => outcomes.failure += 1,
                    _ => outcomes.unknown += 1,
                }
            }
        }

        Ok(Self {
            rows,
            missing: columns.iter().cloned().zip(missing).collect(),
            columns,
            outcomes: success_col.map(|_| outcomes),
        })
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shape: ({}, {})", self.rows, self.columns.len())?;
        writeln!(f, "Columns: {}", self.columns.join(", "))?;
        writeln!(f, "Missing values:")?;
        for (column, count) in &self.missing {
            writeln!(f, "  {column:<12} {count}")?;
        }
        if let Some(outcomes) = &self.outcomes {
            writeln!(f, "Outcomes:")?;
            writeln!(f, "  success      {}", outcomes.success)?;
            writeln!(f, "  failure      {}", outcomes.failure)?;
            writeln!(f, "  unknown      {}", outcomes.unknown)?;
        }
        Ok(())
    }
}
