use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default n-gram size.
pub const DEFAULT_NGRAM_SIZE: usize = 3;

/// Penalty applied by [`UnknownPolicy::Lenient`] when none is given: `ln(1e-6)`.
pub const DEFAULT_UNKNOWN_LOG_PROB: f64 = -13.815510557964274;

/// Calibration lines shorter than this (in characters) are skipped.
pub const DEFAULT_MIN_CALIBRATION_LEN: usize = 3;

/// What the scorer does with a transition missing from the table.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum UnknownPolicy {
	/// Abort scoring with [`Error::UnscorableInput`].
	Strict,
	/// Count the transition with a constant log-probability and continue.
	Lenient { log_prob: f64 },
}

/// How the summed log-probabilities of a string become its score.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreForm {
	/// Raw sum. Longer strings get lower scores.
	Sum,
	/// Sum divided by the number of transitions.
	Mean,
	/// `exp` of the mean, in `(0, 1]`.
	GeometricMean,
}

impl ScoreForm {
	/// Returns `true` if scores of strings with different lengths are comparable.
	pub fn is_length_normalized(self) -> bool {
		!matches!(self, ScoreForm::Sum)
	}

	/// Turns a log-probability sum over `transitions` transitions into a score.
	///
	/// Zero transitions are counted as one, so an empty sum yields the
	/// neutral value (`0` or `1` for the geometric form).
	pub fn apply(self, sum: f64, transitions: usize) -> f64 {
		let mean = sum / transitions.max(1) as f64;
		match self {
			ScoreForm::Sum => sum,
			ScoreForm::Mean => mean,
			ScoreForm::GeometricMean => mean.exp(),
		}
	}
}

/// Settings fixed at training time and stored with the model.
///
/// Keeping them inside the model guarantees the scoring path tokenizes
/// exactly like the training path did.
///
/// # Invariants
/// - `n >= 2`
/// - `smoothing` is finite and `>= 0`
/// - a lenient penalty is finite and `<= 0`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelConfig {
	/// Order of the model (number of characters in an n-gram).
	n: usize,

	/// Pseudo-count added to every transition of an observed context.
	smoothing: f64,

	/// Unknown-transition handling.
	unknown: UnknownPolicy,

	/// Pad lines with `n - 1` spaces on both ends.
	pub padding: bool,

	/// Score form used by `score`, `classify` and calibration.
	pub score_form: ScoreForm,

	/// Minimum trimmed length of a calibration line.
	pub min_calibration_len: usize,
}

impl ModelConfig {
	/// Creates a configuration for n-grams of size `n` with default settings.
	///
	/// # Errors
	/// Returns [`Error::InvalidNGramSize`] if `n < 2`.
	pub fn new(n: usize) -> Result<Self> {
		if n < 2 {
			return Err(Error::InvalidNGramSize(n));
		}
		Ok(Self { n, ..Self::default() })
	}

	pub fn n(&self) -> usize {
		self.n
	}

	pub fn smoothing(&self) -> f64 {
		self.smoothing
	}

	pub fn unknown_policy(&self) -> UnknownPolicy {
		self.unknown
	}

	/// Sets the smoothing pseudo-count.
	///
	/// # Errors
	/// Returns [`Error::InvalidSmoothing`] for negative or non finite values.
	pub fn set_smoothing(&mut self, smoothing: f64) -> Result<()> {
		if !smoothing.is_finite() || smoothing < 0.0 {
			return Err(Error::InvalidSmoothing(smoothing));
		}
		self.smoothing = smoothing;
		Ok(())
	}

	/// Sets the unknown-transition policy.
	///
	/// # Errors
	/// Returns [`Error::InvalidPenalty`] if a lenient penalty is positive or non finite.
	pub fn set_unknown_policy(&mut self, policy: UnknownPolicy) -> Result<()> {
		if let UnknownPolicy::Lenient { log_prob } = policy {
			if !log_prob.is_finite() || log_prob > 0.0 {
				return Err(Error::InvalidPenalty(log_prob));
			}
		}
		self.unknown = policy;
		Ok(())
	}

	/// Checks what the constructor and setters enforce, for a config that was
	/// decoded instead of built.
	pub(crate) fn validate(&self) -> Result<()> {
		let mut checked = Self::new(self.n)?;
		checked.set_smoothing(self.smoothing)?;
		checked.set_unknown_policy(self.unknown)
	}
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			n: DEFAULT_NGRAM_SIZE,
			smoothing: 0.0,
			unknown: UnknownPolicy::Strict,
			padding: true,
			score_form: ScoreForm::GeometricMean,
			min_calibration_len: DEFAULT_MIN_CALIBRATION_LEN,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_small_n() {
		assert!(matches!(ModelConfig::new(1), Err(Error::InvalidNGramSize(1))));
		assert!(matches!(ModelConfig::new(0), Err(Error::InvalidNGramSize(0))));
		assert_eq!(ModelConfig::new(2).unwrap().n(), 2);
	}

	#[test]
	fn validates_smoothing() {
		let mut config = ModelConfig::default();
		assert!(config.set_smoothing(-1.0).is_err());
		assert!(config.set_smoothing(f64::NAN).is_err());
		config.set_smoothing(0.5).unwrap();
		assert_eq!(config.smoothing(), 0.5);
	}

	#[test]
	fn validates_penalty() {
		let mut config = ModelConfig::default();
		assert!(config.set_unknown_policy(UnknownPolicy::Lenient { log_prob: 1.0 }).is_err());
		assert!(config.set_unknown_policy(UnknownPolicy::Lenient { log_prob: f64::NEG_INFINITY }).is_err());
		config.set_unknown_policy(UnknownPolicy::Lenient { log_prob: -5.0 }).unwrap();
		assert_eq!(config.unknown_policy(), UnknownPolicy::Lenient { log_prob: -5.0 });
	}

	#[test]
	fn neutral_value_for_zero_transitions() {
		assert_eq!(ScoreForm::Sum.apply(0.0, 0), 0.0);
		assert_eq!(ScoreForm::Mean.apply(0.0, 0), 0.0);
		assert_eq!(ScoreForm::GeometricMean.apply(0.0, 0), 1.0);
	}

	#[test]
	fn forms_normalize_by_length() {
		assert_eq!(ScoreForm::Sum.apply(-6.0, 3), -6.0);
		assert_eq!(ScoreForm::Mean.apply(-6.0, 3), -2.0);
		assert!((ScoreForm::GeometricMean.apply(-6.0, 3) - (-2.0f64).exp()).abs() < 1e-12);
		assert!(!ScoreForm::Sum.is_length_normalized());
		assert!(ScoreForm::Mean.is_length_normalized());
	}
}
