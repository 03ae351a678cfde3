use crate::core::error::DataFormatError;
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};

/// Median of a slice of finite values; averages the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted: Vec<f64> = values.iter().copied().sorted_by(f64::total_cmp).collect();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Fills missing values with per-column medians learned from training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MedianImputer {
    medians: Vec<f64>,
}

impl MedianImputer {
    /// Learns one median per column. `columns` names the columns for error reporting and
    /// fixes the expected row width.
    ///
    /// Non-finite values are treated as missing.
    pub fn fit(rows: &[Vec<Option<f64>>], columns: &[String]) -> Result<Self, DataFormatError> {
        let medians = columns
            .iter()
            .enumerate()
            .map(|(j, column)| {
                let observed: Vec<f64> = rows
                    .iter()
                    .filter_map(|row| row.get(j).copied().flatten())
                    .filter(|value| value.is_finite())
                    .collect();
                median(&observed).ok_or_else(|| DataFormatError::NoObservedValues {
                    column: column.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { medians })
    }

    pub fn medians(&self) -> &[f64] {
        &self.medians
    }

    pub fn transform(&self, row: &[Option<f64>]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.medians.len());
        row.iter()
            .zip(&self.medians)
            .map(|(value, median)| match value {
                Some(v) if v.is_finite() => *v,
                _ => *median,
            })
            .collect()
    }
}

/// Zero-mean, unit-variance standardization fitted column by column.
///
/// Uses the population standard deviation. Columns with no spread keep a unit
/// scale, so they are only centered.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: DVector<f64>,
    scale: DVector<f64>,
}

impl StandardScaler {
    pub fn fit(data: &DMatrix<f64>) -> Self {
        let mean = DVector::from_iterator(data.ncols(), data.column_iter().map(|c| c.mean()));
        let scale = DVector::from_iterator(
            data.ncols(),
            data.column_iter().map(|c| {
                let std = c.variance().sqrt();
                if std.is_finite() && std > 10.0 * f64::EPSILON {
                    std
                } else {
                    1.0
                }
            }),
        );
        Self { mean, scale }
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &DVector<f64> {
        &self.scale
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, data: &DMatrix<f64>) -> DMatrix<f64> {
        let mut scaled = data.clone();
        for (j, mut column) in scaled.column_iter_mut().enumerate() {
            for value in column.iter_mut() {
                *value = (*value - self.mean[j]) / self.scale[j];
            }
        }
        scaled
    }

    pub fn transform_vector(&self, vector: &DVector<f64>) -> DVector<f64> {
        (vector - &self.mean).component_div(&self.scale)
    }

    pub fn inverse_transform_vector(&self, vector: &DVector<f64>) -> DVector<f64> {
        vector.component_mul(&self.scale) + &self.mean
    }
}

/// Maps string categories onto dense integer codes in sorted class order.
///
/// An optional fallback class absorbs labels that were never seen during fitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    fallback: Option<usize>,
}

impl LabelEncoder {
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: labels.into_iter().map(Into::into).sorted().dedup().collect(),
            fallback: None,
        }
    }

    /// Fits on `labels` plus `fallback`, which always becomes a class of its own.
    pub fn fit_with_fallback<I, S>(labels: I, fallback: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut encoder = Self::fit(
            labels
                .into_iter()
                .map(Into::into)
                .chain(std::iter::once(fallback.to_string())),
        );
        encoder.fallback = encoder.try_encode(fallback);
        encoder
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn try_encode(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .ok()
    }

    /// Encodes `label`, falling back to the fallback class for unseen labels.
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.try_encode(label).or(self.fallback)
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}
