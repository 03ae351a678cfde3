//! # Data Models
//!
//! Plain value types shared by every layer of the library.
//!
//! - [`record`] - A single dataset row exactly as it was read, plus de-duplication
//! - [`composition`] - Canonical, order-independent element sets
//! - [`conductivity`] - The fixed ordinal conductivity scale and its decoded labels
//! - [`structure`] - The closed set of crystal-structure hypotheses used during exploration
//! - [`prediction`] - Immutable prediction records produced by the estimator

pub mod composition;
pub mod conductivity;
pub mod prediction;
pub mod record;
pub mod structure;
