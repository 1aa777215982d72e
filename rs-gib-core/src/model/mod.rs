//! Top-level module for the Markov gibberish filter.
//!
//! This module provides:
//! - Character windowing (`tokenizer`)
//! - Transition counting and normalization (`counter`, `table`)
//! - Likelihood scoring (`scorer`) and threshold calibration (`calibrator`)
//! - Sampling from the learned table (`generator`)
//! - The model container tying them together (`markov_model`)

/// Lowercasing, padding and n-gram windowing over printable ASCII.
pub mod tokenizer;

/// Settings stored with a model: n-gram size, padding, smoothing,
/// unknown-transition policy and score form.
pub mod config;

/// Raw per-context transition counts.
///
/// Internal building block of `NGramCounter`. Not exposed publicly.
mod state;

/// Frequency counter turning training lines into a transition table.
pub mod counter;

/// Log-probability transition table, the persistent state of a model.
pub mod table;

/// Log-likelihood of a string under a transition table.
pub mod scorer;

/// Threshold derivation from positive and negative examples.
pub mod calibrator;

/// Weighted sampling of text from a transition table.
pub mod generator;

/// Character entropy diagnostic.
pub mod entropy;

/// Trained model container: train, score, classify, generate, persist.
pub mod markov_model;
