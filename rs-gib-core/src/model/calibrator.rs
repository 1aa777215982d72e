use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Outcome of a threshold calibration.
///
/// `overlap` counts calibration lines the derived threshold misclassifies:
/// positives scoring `<= threshold` plus negatives scoring `> threshold`.
/// It is zero whenever the two sets separate cleanly.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
	pub threshold: f64,
	/// Lowest score among positive lines.
	pub min_good: f64,
	/// Highest score among negative lines.
	pub max_bad: f64,
	pub positives: usize,
	pub negatives: usize,
	/// Lines ignored because too short or unscorable.
	pub skipped: usize,
	pub overlap: usize,
}

impl Calibration {
	/// Returns `true` if every scored positive beats every scored negative.
	pub fn is_separable(&self) -> bool {
		self.min_good > self.max_bad
	}
}

/// Derives the threshold halfway between the worst positive and the best negative.
///
/// Lines are trimmed first. Lines shorter than `min_len` characters and lines
/// `score` rejects with [`Error::UnscorableInput`] are skipped and counted.
///
/// # Errors
/// - [`Error::InsufficientCalibrationData`] if either set has no scored line
/// - any other error raised by `score`
pub fn calibrate<F, P, N>(score: F, positives: P, negatives: N, min_len: usize) -> Result<Calibration>
where
	F: Fn(&str) -> Result<f64>,
	P: IntoIterator,
	P::Item: AsRef<str>,
	N: IntoIterator,
	N::Item: AsRef<str>,
{
	let mut skipped = 0;
	let good = collect_scores(&score, positives, min_len, &mut skipped)?;
	let bad = collect_scores(&score, negatives, min_len, &mut skipped)?;

	if good.is_empty() || bad.is_empty() {
		return Err(Error::InsufficientCalibrationData {
			positives: good.len(),
			negatives: bad.len(),
		});
	}

	let min_good = good.iter().copied().fold(f64::INFINITY, f64::min);
	let max_bad = bad.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	let threshold = (min_good + max_bad) / 2.0;

	let overlap = good.iter().filter(|s| **s <= threshold).count()
		+ bad.iter().filter(|s| **s > threshold).count();

	let calibration = Calibration {
		threshold,
		min_good,
		max_bad,
		positives: good.len(),
		negatives: bad.len(),
		skipped,
		overlap,
	};

	if calibration.is_separable() {
		info!(
			"threshold {threshold} (min good {min_good}, max bad {max_bad}, {} positives, {} negatives, {skipped} skipped)",
			good.len(),
			bad.len()
		);
	} else {
		warn!(
			"calibration sets overlap: max bad {max_bad} >= min good {min_good}, {overlap} lines misclassified by threshold {threshold}"
		);
	}

	Ok(calibration)
}

fn collect_scores<F, I>(score: &F, lines: I, min_len: usize, skipped: &mut usize) -> Result<Vec<f64>>
where
	F: Fn(&str) -> Result<f64>,
	I: IntoIterator,
	I::Item: AsRef<str>,
{
	let mut scores = Vec::new();
	for line in lines {
		let line = line.as_ref().trim();
		if line.chars().count() < min_len {
			*skipped += 1;
			continue;
		}
		match score(line) {
			Ok(value) => scores.push(value),
			Err(Error::UnscorableInput { .. }) => *skipped += 1,
			Err(e) => return Err(e),
		}
	}
	Ok(scores)
}
