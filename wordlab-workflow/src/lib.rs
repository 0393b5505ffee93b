//! Experiment execution: drives the model × config × repetition sweep
//! through the provider gateway, publishes live progress and finalises
//! results.

pub mod error;
pub mod execution;
pub mod runner;

pub use error::RunnerError;
pub use runner::{ExperimentRunner, RunnerBuilder, RunnerSettings};
