//! # Regression Model
//!
//! The regression model is consumed through two small traits:
//!
//! - [`Trainer`] fits a model once on an encoded `(features, targets)` pair.
//! - [`Regressor`] is the trained artifact; prediction borrows it immutably and is
//!   deterministic for a given input.
//!
//! [`mlp::MlpTrainer`] is the default implementation: a dense feed-forward network
//! trained with Adam on mini-batches, with a held-out validation split and early
//! stopping that restores the best-seen weights.

pub mod mlp;
pub(crate) mod optimizer;

use crate::engine::progress::ProgressReporter;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrainingError {
    #[error("Training set is empty")]
    EmptyTrainingSet,
    #[error("Feature and target matrices disagree on sample count ({features} vs {targets})")]
    SampleCountMismatch { features: usize, targets: usize },
    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),
    #[error("Training diverged at epoch {epoch}: loss is no longer finite")]
    Diverged { epoch: usize },
}

pub trait Regressor {
    /// Predicts one target row per feature row.
    fn predict(&self, features: &DMatrix<f64>) -> DMatrix<f64>;

    fn input_dim(&self) -> usize;

    fn output_dim(&self) -> usize;

    fn predict_one(&self, features: &DVector<f64>) -> DVector<f64> {
        let batch = DMatrix::from_row_slice(1, features.len(), features.as_slice());
        self.predict(&batch).row(0).transpose()
    }
}

pub trait Trainer {
    type Model: Regressor;

    fn fit(
        &self,
        features: &DMatrix<f64>,
        targets: &DMatrix<f64>,
        reporter: &ProgressReporter,
    ) -> Result<Self::Model, TrainingError>;
}

/// Loss curves and early-stopping outcome of one training run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingHistory {
    pub train_losses: Vec<f64>,
    /// Empty when the dataset was too small to hold out a validation split.
    pub validation_losses: Vec<f64>,
    /// Zero-based epoch whose weights were kept.
    pub best_epoch: usize,
    pub best_loss: f64,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn epochs_run(&self) -> usize {
        self.train_losses.len()
    }
}

/// Mean squared error over all entries.
pub fn mean_squared_error(predictions: &DMatrix<f64>, targets: &DMatrix<f64>) -> f64 {
    let count = predictions.len();
    if count == 0 {
        return 0.0;
    }
    (predictions - targets).norm_squared() / count as f64
}
