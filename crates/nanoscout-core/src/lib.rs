//! # NanoScout Core Library
//!
//! A compact library for learning structure-property models of synthesized nanomaterials
//! and using them to explore element combinations that were never observed in the lab.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that the data-handling
//! invariants stay testable in isolation from the training and search logic.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`RawRecord`, `Composition`),
//!   dataset I/O, the element vocabulary, and the feature/target encoders together with
//!   the fitted transforms they own.
//!
//! - **[`engine`]: The Logic Core.** The regression model, the composition generator,
//!   the material property estimator, and the immutable [`engine::pipeline::FittedPipeline`]
//!   that ties the fitted transforms and the trained model together.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures such as
//!   [`workflows::explore::run`], which trains a pipeline from a dataset file and ranks
//!   freshly generated compositions.

pub mod core;
pub mod engine;
pub mod workflows;
