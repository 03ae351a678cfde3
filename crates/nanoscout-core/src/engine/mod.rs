//! # Engine Module
//!
//! The stateful half of NanoScout: it trains the regression model on encoded data,
//! proposes novel compositions, and scores them against crystal-structure hypotheses.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Training, generation, and process-condition settings
//! - **Regression Model** ([`model`]) - The `Regressor`/`Trainer` seam and the MLP implementation
//! - **Composition Generator** ([`generator`]) - Unique random element subsets from the vocabulary
//! - **Material Property Estimator** ([`estimator`]) - Hypothesis scoring and ranking
//! - **Fitted Pipeline** ([`pipeline`]) - The immutable bundle of fitted transforms and model
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error aggregation
//!
//! ## Lifecycle
//!
//! A [`pipeline::FittedPipeline`] is produced by exactly one build step. All later
//! operations borrow it immutably, so nothing downstream can refit a transform or
//! retrain the model by accident.

pub mod config;
pub mod error;
pub mod estimator;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod progress;
