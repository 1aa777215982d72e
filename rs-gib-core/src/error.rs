use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while training, scoring, calibrating or persisting a model.
#[derive(Debug, Error)]
pub enum Error {
	/// The strict policy met a transition the table does not know.
	#[error("no probability for n-gram {ngram:?}")]
	UnscorableInput { ngram: String },

	/// One of the calibration sets produced no score at all.
	#[error("insufficient calibration data: {positives} positive and {negatives} negative lines scored")]
	InsufficientCalibrationData { positives: usize, negatives: usize },

	#[error("failed to read corpus {}", path.display())]
	CorpusReadFailure {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("n-gram size must be >= 2, got {0}")]
	InvalidNGramSize(usize),

	#[error("smoothing must be finite and >= 0, got {0}")]
	InvalidSmoothing(f64),

	#[error("unknown-transition penalty must be finite and <= 0, got {0}")]
	InvalidPenalty(f64),

	/// Raw log-probability sums cannot be compared across lengths.
	#[error("calibration requires a length-normalized score form")]
	LengthSensitiveScore,

	#[error("model has no threshold, calibrate it first")]
	Uncalibrated,

	#[error("n-gram mismatch: expected n={expected}, got n={found}")]
	NGramMismatch { expected: usize, found: usize },

	#[error("padding mismatch: expected padding={expected}, got padding={found}")]
	PaddingMismatch { expected: bool, found: bool },

	#[error("context mismatch: expected {expected:?}, got {found:?}")]
	ContextMismatch { expected: String, found: String },

	#[error("invalid model encoding")]
	Serialization(#[from] postcard::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
