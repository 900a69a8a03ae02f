#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Parser, semantic passes, and emitter for the COMEHERE/capture-variable
//! source-to-source rewriter.
//!
//! The pipeline runs in a fixed order: parse into a lossless syntax tree,
//! normalize block shapes, extract goal-block descriptions, rewrite control
//! flow so every goal is reachable, rewrite capture-variable assignments,
//! and emit a preamble declaring the names the rewrite introduced. Each
//! stage is a module under [`passes`]; [`driver`] wires them together.

pub mod ast;
pub mod driver;
pub(crate) mod invariants;
pub mod model;
pub mod names;
pub mod passes;

pub use driver::{TransformOutput, transform};
pub use model::GoalBlock;

use thiserror::Error as ThisError;

/// Errors that abort the pipeline outright, as opposed to diagnostics
/// (malformed input, unsupported constructs) which are collected and
/// reported alongside a best-effort result.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("parser exhausted its execution fuel; input may be pathological or adversarial")]
    ExecFuelExhausted,

    #[error("parser recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("source contains a syntax error that prevents further processing")]
    UnparsableSource,

    #[error("goal block {0:?} could not be resolved after a prior rewrite")]
    GoalNotFound(String),
}

/// Result type threaded through every pass: the pass's output alongside
/// diagnostics accumulated along the way.
pub type PassResult<T> = Result<(T, comehere_core::Diagnostics), Error>;
