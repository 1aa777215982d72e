//! Character n-gram gibberish detection library.
//!
//! This crate provides a Markov-chain based filter including:
//! - Character-level n-gram tokenization and counting
//! - Log-probability transition tables with optional smoothing
//! - Length-normalized scoring and threshold calibration
//! - Text generation by sampling the learned table
//!
//! The entry point is [`model::markov_model::MarkovModel`].

/// Core n-gram models, scoring, calibration and generation.
pub mod model;

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// I/O utilities (line loading, path helpers).
pub mod io;

pub use error::{Error, Result};
pub use model::calibrator::Calibration;
pub use model::config::{ModelConfig, ScoreForm, UnknownPolicy};
pub use model::markov_model::{Assessment, MarkovModel, ModelSummary};
