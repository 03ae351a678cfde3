//! # Core Module
//!
//! The fundamental building blocks of NanoScout: record and composition models, dataset
//! loading, the element vocabulary, and the encoders that turn raw records into the
//! numeric representation consumed by the regression model.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Raw records, compositions, structure hypotheses, predictions
//! - **Dataset I/O** ([`io`]) - Reading tabular records from CSV files
//! - **Element Vocabulary** ([`vocabulary`]) - The closed, sorted set of valid element symbols
//! - **Encoding** ([`encoding`]) - Feature layout, fitted transforms, feature and target encoders
//! - **Errors** ([`error`]) - Data format errors raised while interpreting a dataset
//!
//! Everything in this layer is either a plain value or a fitted transform that is
//! immutable after construction; nothing here owns a model or a random number generator.

pub mod encoding;
pub mod error;
pub mod io;
pub mod models;
pub mod vocabulary;
