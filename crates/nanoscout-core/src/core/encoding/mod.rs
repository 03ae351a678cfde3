//! # Encoding Module
//!
//! Turns raw records into the fixed-width numeric vectors the regression model is
//! trained on, and turns model outputs back into physical quantities.
//!
//! ## Key Components
//!
//! - [`layout`] - The explicit, ordered slot layout of feature and target vectors
//! - [`transforms`] - Median imputation, standardization, and label encoding
//! - [`features`] - The feature encoder (fit once, then transform any record)
//! - [`targets`] - The target encoder and its inverse for prediction decoding
//!
//! ## Invariants
//!
//! Every transform is fitted exactly once, on the de-duplicated training records,
//! and is never refitted afterwards. Transform mode borrows the encoders immutably,
//! which is what guarantees that a synthetic record is encoded with precisely the
//! statistics the model was trained on.

pub mod features;
pub mod layout;
pub mod targets;
pub mod transforms;
