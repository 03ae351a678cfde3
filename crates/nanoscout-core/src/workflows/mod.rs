//! # Workflows Module
//!
//! High-level entry points that run a complete NanoScout procedure from a dataset file
//! to a ranked list of predictions.
//!
//! - **Exploration Workflow** ([`explore`]) - Fit the pipeline, generate novel
//!   compositions, score them against every structure hypothesis, and rank the results.

pub mod explore;
