//! # Dataset I/O
//!
//! Reading raw nanomaterial records from tabular storage. The encoders never touch
//! files directly; they only see the [`RawRecord`](crate::core::models::record::RawRecord)
//! values produced here.

pub mod dataset;
