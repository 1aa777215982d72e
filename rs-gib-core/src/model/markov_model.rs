use std::fs;
use std::path::Path;

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::calibrator::{self, Calibration};
use super::config::ModelConfig;
use super::counter::NGramCounter;
use super::generator;
use super::scorer::{self, Likelihood};
use super::table::TransitionTable;
use crate::error::{Error, Result};
use crate::io::read_lines;

/// A trained gibberish filter.
///
/// This struct bundles:
/// - `config`: n-gram size, padding, smoothing, unknown policy and score form
/// - `table`: the log-probability transition table
/// - `threshold`: the decision boundary, unset until calibration
///
/// The model is immutable once trained, apart from threshold assignment, so a
/// calibrated model can be shared across readers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarkovModel {
	config: ModelConfig,
	table: TransitionTable,
	threshold: Option<f64>,
}

/// Short description of a model, for logs and status endpoints.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelSummary {
	pub n: usize,
	pub contexts: usize,
	pub transitions: usize,
	pub padding: bool,
	pub threshold: Option<f64>,
}

/// Score of one string and the verdict of the threshold, if any.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Assessment {
	pub likelihood: Likelihood,
	pub score: f64,
	/// `None` until the model is calibrated.
	pub good: Option<bool>,
}

impl MarkovModel {
	/// Trains an uncalibrated model from in-memory lines.
	pub fn train<I, S>(lines: I, config: ModelConfig) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut counter = NGramCounter::new(config.n(), config.padding)?;
		counter.add_sentences(lines);
		Ok(Self::from_counter(&counter, config))
	}

	/// Trains an uncalibrated model from one or more corpus files.
	///
	/// # Errors
	/// Any unreadable file aborts training with [`Error::CorpusReadFailure`];
	/// no partial model is returned.
	pub fn train_from_files<P: AsRef<Path>>(paths: &[P], config: ModelConfig) -> Result<Self> {
		let mut counter = NGramCounter::new(config.n(), config.padding)?;
		for path in paths {
			let lines = read_lines(path)?;
			debug!("read {} lines from {}", lines.len(), path.as_ref().display());
			let mut partial = NGramCounter::new(config.n(), config.padding)?;
			partial.add_sentences(&lines);
			counter.merge(&partial)?;
		}
		Ok(Self::from_counter(&counter, config))
	}

	fn from_counter(counter: &NGramCounter, config: ModelConfig) -> Self {
		let table = counter.to_table(config.smoothing());
		let model = Self { config, table, threshold: None };
		let summary = model.summary();
		info!(
			"trained {}-gram model: {} contexts, {} transitions",
			summary.n, summary.contexts, summary.transitions
		);
		model
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	pub fn table(&self) -> &TransitionTable {
		&self.table
	}

	pub fn n(&self) -> usize {
		self.config.n()
	}

	pub fn threshold(&self) -> Option<f64> {
		self.threshold
	}

	/// Overrides the decision threshold.
	pub fn set_threshold(&mut self, threshold: f64) {
		self.threshold = Some(threshold);
	}

	pub fn summary(&self) -> ModelSummary {
		ModelSummary {
			n: self.n(),
			contexts: self.table.len(),
			transitions: self.table.transition_count(),
			padding: self.config.padding,
			threshold: self.threshold,
		}
	}

	/// Log-likelihood details of `text`.
	pub fn likelihood(&self, text: &str) -> Result<Likelihood> {
		scorer::likelihood(text, &self.table, &self.config)
	}

	/// Scores `text` with the configured score form.
	pub fn score(&self, text: &str) -> Result<f64> {
		scorer::score(text, &self.table, &self.config)
	}

	/// Scores `text` and compares the score with the threshold.
	///
	/// Every verdict the model hands out goes through here, so a score equal
	/// to the threshold is gibberish everywhere.
	pub fn assess(&self, text: &str) -> Result<Assessment> {
		let likelihood = self.likelihood(text)?;
		let score = self.config.score_form.apply(likelihood.sum, likelihood.transitions);
		let good = self.threshold.map(|threshold| score > threshold);
		Ok(Assessment { likelihood, score, good })
	}

	/// Raw log-probability of `text` (sum over its transitions).
	///
	/// Length-sensitive: only compare values of strings of equal length.
	pub fn probability(&self, text: &str) -> Result<f64> {
		Ok(self.likelihood(text)?.sum)
	}

	/// Returns `true` if `text` looks like plausible language.
	///
	/// A string the model cannot score is gibberish.
	///
	/// # Errors
	/// Returns [`Error::Uncalibrated`] if the model has no threshold.
	pub fn classify(&self, text: &str) -> Result<bool> {
		if self.threshold.is_none() {
			return Err(Error::Uncalibrated);
		}
		match self.assess(text) {
			Ok(assessment) => Ok(assessment.good == Some(true)),
			Err(Error::UnscorableInput { .. }) => Ok(false),
			Err(e) => Err(e),
		}
	}

	/// Derives and stores the threshold from positive and negative examples.
	///
	/// # Errors
	/// - [`Error::LengthSensitiveScore`] if the score form is the raw sum
	/// - [`Error::InsufficientCalibrationData`] if a set yields no score
	pub fn calibrate<P, N>(&mut self, positives: P, negatives: N) -> Result<Calibration>
	where
		P: IntoIterator,
		P::Item: AsRef<str>,
		N: IntoIterator,
		N::Item: AsRef<str>,
	{
		if !self.config.score_form.is_length_normalized() {
			return Err(Error::LengthSensitiveScore);
		}
		let calibration = calibrator::calibrate(
			|line| self.score(line),
			positives,
			negatives,
			self.config.min_calibration_len,
		)?;
		self.threshold = Some(calibration.threshold);
		Ok(calibration)
	}

	/// Same as [`MarkovModel::calibrate`] with line files.
	pub fn calibrate_from_files<P, N>(&mut self, positives: P, negatives: N) -> Result<Calibration>
	where
		P: AsRef<Path>,
		N: AsRef<Path>,
	{
		let positives = read_lines(positives)?;
		let negatives = read_lines(negatives)?;
		self.calibrate(&positives, &negatives)
	}

	/// Generates up to `length` characters from the seed context.
	pub fn generate<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> String {
		match generator::seed_context(&self.table, &self.config, rng) {
			Some(seed) => generator::generate_from(&self.table, &seed, length, rng),
			None => String::new(),
		}
	}

	/// Generates up to `length` characters following `seed`.
	pub fn generate_from<R: Rng + ?Sized>(&self, seed: &str, length: usize, rng: &mut R) -> String {
		generator::generate_from(&self.table, seed, length, rng)
	}

	/// Serializes the model with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Decodes a model written by [`MarkovModel::to_bytes`].
	///
	/// # Errors
	/// - [`Error::Serialization`] if the bytes are not a model
	/// - [`Error::InvalidNGramSize`], [`Error::InvalidSmoothing`] or
	///   [`Error::InvalidPenalty`] if the stored config is out of range
	/// - [`Error::NGramMismatch`] if a table context does not fit the config size
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let model: Self = postcard::from_bytes(bytes)?;
		model.config.validate()?;

		let n = model.config.n();
		if model.table.n() != n {
			return Err(Error::NGramMismatch { expected: n, found: model.table.n() });
		}
		if let Some((context, _)) = model.table.iter().find(|(context, _)| context.chars().count() != n - 1) {
			return Err(Error::NGramMismatch { expected: n, found: context.chars().count() + 1 });
		}
		Ok(model)
	}

	/// Writes the serialized model to `path`.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		fs::write(&path, self.to_bytes()?)?;
		info!("model saved to {}", path.as_ref().display());
		Ok(())
	}

	/// Loads a model written by [`MarkovModel::save`].
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let bytes = fs::read(&path)?;
		let model = Self::from_bytes(&bytes)?;
		debug!("model loaded from {}", path.as_ref().display());
		Ok(model)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::config::{ScoreForm, UnknownPolicy};

	fn model() -> MarkovModel {
		MarkovModel::train(["the quick fox", "the lazy dog"], ModelConfig::new(2).unwrap()).unwrap()
	}

	#[test]
	fn classify_requires_threshold() {
		assert!(matches!(model().classify("the"), Err(Error::Uncalibrated)));
	}

	#[test]
	fn unscorable_is_gibberish() {
		let mut model = model();
		model.set_threshold(0.0);
		assert!(!model.classify("xqz").unwrap());
	}

	#[test]
	fn sum_form_cannot_calibrate() {
		let mut config = ModelConfig::new(2).unwrap();
		config.score_form = ScoreForm::Sum;
		let mut model = MarkovModel::train(["the quick fox"], config).unwrap();
		assert!(matches!(
			model.calibrate(["the quick"], ["xxxx"]),
			Err(Error::LengthSensitiveScore)
		));
		assert!(model.threshold().is_none());
	}

	#[test]
	fn probability_is_raw_sum() {
		let mut config = ModelConfig::new(2).unwrap();
		config.set_unknown_policy(UnknownPolicy::Lenient { log_prob: -10.0 }).unwrap();
		let model = MarkovModel::train(["the quick fox", "the lazy dog"], config).unwrap();
		assert_eq!(model.probability("xqz").unwrap(), -40.0);
		assert!((model.score("xqz").unwrap() - (-10.0f64).exp()).abs() < 1e-12);
	}

	#[test]
	fn bytes_round_trip() {
		let mut model = model();
		model.set_threshold(0.123456789);
		let restored = MarkovModel::from_bytes(&model.to_bytes().unwrap()).unwrap();
		assert_eq!(restored, model);
		assert_eq!(restored.threshold(), Some(0.123456789));
	}

	#[test]
	fn garbage_bytes_fail() {
		assert!(matches!(MarkovModel::from_bytes(&[0xff, 0xff, 0xff]), Err(Error::Serialization(_))));
	}

	#[test]
	fn assess_agrees_with_classify() {
		let mut model = model();
		assert_eq!(model.assess("the").unwrap().good, None);

		let score = model.score("the").unwrap();
		model.set_threshold(score);
		let assessment = model.assess("the").unwrap();
		assert_eq!(assessment.score, score);
		assert_eq!(assessment.good, Some(false));
		assert!(!model.classify("the").unwrap());

		model.set_threshold(score - 1e-9);
		assert_eq!(model.assess("the").unwrap().good, Some(true));
		assert!(model.classify("the").unwrap());
	}

	// config: n, smoothing (f64 LE), policy tag, padding, form tag, min length;
	// then table: n, row count; then threshold tag
	fn encoded(n: u8, smoothing: [u8; 8], table_n: u8, rows: &[u8]) -> Vec<u8> {
		let mut bytes = vec![n];
		bytes.extend(smoothing);
		bytes.extend([0, 1, 2, 3, table_n]);
		bytes.extend(rows);
		bytes.push(0);
		bytes
	}

	#[test]
	fn decoding_rejects_zero_ngram_size() {
		let bytes = encoded(0, [0; 8], 0, &[0]);
		assert!(matches!(MarkovModel::from_bytes(&bytes), Err(Error::InvalidNGramSize(0))));
	}

	#[test]
	fn decoding_checks_table_size() {
		let valid = encoded(2, [0; 8], 2, &[0]);
		assert_eq!(MarkovModel::from_bytes(&valid).unwrap().n(), 2);

		let bytes = encoded(2, [0; 8], 3, &[0]);
		assert!(matches!(
			MarkovModel::from_bytes(&bytes),
			Err(Error::NGramMismatch { expected: 2, found: 3 })
		));

		// one empty row under the two-char context "ab"
		let bytes = encoded(2, [0; 8], 2, &[1, 2, b'a', b'b', 0]);
		assert!(matches!(
			MarkovModel::from_bytes(&bytes),
			Err(Error::NGramMismatch { expected: 2, found: 3 })
		));
	}

	#[test]
	fn decoding_rejects_negative_smoothing() {
		let bytes = encoded(2, (-1.0f64).to_le_bytes(), 2, &[0]);
		assert!(matches!(MarkovModel::from_bytes(&bytes), Err(Error::InvalidSmoothing(_))));
	}

	#[test]
	fn summary_counts() {
		let summary = model().summary();
		assert_eq!(summary.n, 2);
		assert!(summary.contexts > 0);
		assert!(summary.transitions >= summary.contexts);
		assert_eq!(summary.threshold, None);
	}

	#[test]
	fn empty_table_generates_nothing() {
		let mut config = ModelConfig::new(3).unwrap();
		config.padding = false;
		let model = MarkovModel::train(Vec::<String>::new(), config).unwrap();
		let mut rng = rand::rng();
		assert_eq!(model.generate(10, &mut rng), "");
	}
}
