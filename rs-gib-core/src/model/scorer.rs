//! Likelihood of a string under a transition table.

use super::config::{ModelConfig, UnknownPolicy};
use super::table::TransitionTable;
use super::tokenizer;
use crate::error::{Error, Result};

/// Accumulated log-likelihood of one string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Likelihood {
	/// Sum of the log-probabilities of every transition.
	pub sum: f64,
	/// Number of transitions scored.
	pub transitions: usize,
	/// How many of them were missing from the table or held a non printable
	/// char, and got the lenient penalty.
	pub unknown: usize,
}

/// Walks every n-gram of `text` and sums its log-probability.
///
/// The text is tokenized with the same size and padding the table was
/// trained with. A text shorter than `n` lowercase chars (before padding) has
/// no transition and yields an empty sum.
///
/// A window holding a non printable char is never looked up. Under
/// [`UnknownPolicy::Lenient`] it costs the penalty like any unknown
/// transition. Under [`UnknownPolicy::Strict`] it is skipped, and a text
/// made only of such windows is unscorable.
///
/// With smoothing, a context never seen in training behaves as a row of
/// pure pseudo-counts: every next char has probability `1 / |alphabet|`.
///
/// # Errors
/// Under [`UnknownPolicy::Strict`], returns [`Error::UnscorableInput`] at the
/// first transition the table does not know, or when no window is scorable.
pub fn likelihood(text: &str, table: &TransitionTable, config: &ModelConfig) -> Result<Likelihood> {
	let n = config.n();
	let mut likelihood = Likelihood { sum: 0.0, transitions: 0, unknown: 0 };
	if tokenizer::normalize(text, n, false).len() < n {
		return Ok(likelihood);
	}

	let unseen_context = (config.smoothing() > 0.0).then(|| -(tokenizer::alphabet().count() as f64).ln());
	let mut first_excluded = None;
	for ngram in tokenizer::windows(text, n, config.padding) {
		let known = if tokenizer::is_scorable(&ngram) {
			tokenizer::split(&ngram).and_then(|(context, next)| match table.row(context) {
				Some(_) => table.log_prob(context, next),
				None => unseen_context,
			})
		} else {
			match config.unknown_policy() {
				UnknownPolicy::Strict => {
					first_excluded.get_or_insert(ngram);
					continue;
				}
				UnknownPolicy::Lenient { .. } => None,
			}
		};
		let log_prob = match (known, config.unknown_policy()) {
			(Some(log_prob), _) => log_prob,
			(None, UnknownPolicy::Lenient { log_prob }) => {
				likelihood.unknown += 1;
				log_prob
			}
			(None, UnknownPolicy::Strict) => return Err(Error::UnscorableInput { ngram }),
		};
		likelihood.sum += log_prob;
		likelihood.transitions += 1;
	}

	match first_excluded {
		Some(ngram) if likelihood.transitions == 0 => Err(Error::UnscorableInput { ngram }),
		_ => Ok(likelihood),
	}
}

/// Scores `text` with the score form of `config`.
pub fn score(text: &str, table: &TransitionTable, config: &ModelConfig) -> Result<f64> {
	let likelihood = likelihood(text, table, config)?;
	Ok(config.score_form.apply(likelihood.sum, likelihood.transitions))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::config::ScoreForm;
	use crate::model::counter::NGramCounter;

	fn setup(n: usize, policy: UnknownPolicy) -> (TransitionTable, ModelConfig) {
		let mut config = ModelConfig::new(n).unwrap();
		config.set_unknown_policy(policy).unwrap();
		let mut counter = NGramCounter::new(n, config.padding).unwrap();
		counter.add_sentences(["the quick fox", "the lazy dog"]);
		(counter.to_table(0.0), config)
	}

	#[test]
	fn strict_rejects_unknown_transition() {
		let (table, config) = setup(2, UnknownPolicy::Strict);
		assert!(score("the", &table, &config).is_ok());
		match score("xqz", &table, &config) {
			Err(Error::UnscorableInput { ngram }) => assert_eq!(ngram, " x"),
			other => panic!("expected unscorable input, got {other:?}"),
		}
	}

	#[test]
	fn lenient_penalizes_unknown_transition() {
		let (table, config) = setup(2, UnknownPolicy::Lenient { log_prob: -10.0 });
		let likelihood = likelihood("xqz", &table, &config).unwrap();
		// none of " x", "xq", "qz", "z " was learned
		assert_eq!(likelihood.transitions, 4);
		assert_eq!(likelihood.unknown, 4);
		assert_eq!(likelihood.sum, -40.0);
	}

	#[test]
	fn short_text_scores_neutral() {
		let (table, mut config) = setup(3, UnknownPolicy::Strict);
		assert_eq!(score("zq", &table, &config).unwrap(), 1.0);
		assert_eq!(score("", &table, &config).unwrap(), 1.0);
		config.score_form = ScoreForm::Mean;
		assert_eq!(score("zq", &table, &config).unwrap(), 0.0);
	}

	#[test]
	fn short_text_counts_lowercase_chars() {
		// 'İ' lowercases to two chars, so this is not a short string
		let (table, config) = setup(3, UnknownPolicy::Strict);
		assert_eq!(tokenizer::normalize("İa", 3, false).len(), 3);
		assert!(matches!(score("İa", &table, &config), Err(Error::UnscorableInput { .. })));
	}

	#[test]
	fn strict_rejects_text_without_scorable_window() {
		let (table, config) = setup(2, UnknownPolicy::Strict);
		match score("中文乱码éé", &table, &config) {
			Err(Error::UnscorableInput { ngram }) => assert_eq!(ngram, " 中"),
			other => panic!("expected unscorable input, got {other:?}"),
		}
	}

	#[test]
	fn strict_skips_excluded_windows_next_to_scorable_ones() {
		let (table, config) = setup(2, UnknownPolicy::Strict);
		let likelihood = likelihood("theé", &table, &config).unwrap();
		// " t", "th", "he" are scored, "eé" and "é " are not
		assert_eq!(likelihood.transitions, 3);
		assert_eq!(likelihood.unknown, 0);
	}

	#[test]
	fn lenient_penalizes_excluded_windows() {
		let (table, config) = setup(2, UnknownPolicy::Lenient { log_prob: -10.0 });
		let likelihood = likelihood("中文乱码", &table, &config).unwrap();
		assert_eq!(likelihood.transitions, 5);
		assert_eq!(likelihood.unknown, 5);
		assert_eq!(likelihood.sum, -50.0);
	}

	#[test]
	fn smoothing_covers_unseen_contexts() {
		let mut config = ModelConfig::new(2).unwrap();
		config.set_smoothing(1.0).unwrap();
		let mut counter = NGramCounter::new(2, config.padding).unwrap();
		counter.add_sentence("ab");
		let table = counter.to_table(config.smoothing());

		let likelihood = likelihood("zz", &table, &config).unwrap();
		let uniform = -(tokenizer::alphabet().count() as f64).ln();
		// " z" comes from the seeded " " row, "zz" and "z " from no row at all
		assert_eq!(likelihood.transitions, 3);
		assert_eq!(likelihood.unknown, 0);
		assert!((likelihood.sum - (table.log_prob(" ", 'z').unwrap() + 2.0 * uniform)).abs() < 1e-12);
	}

	#[test]
	fn scores_are_case_insensitive() {
		let (table, config) = setup(2, UnknownPolicy::Strict);
		assert_eq!(score("THE", &table, &config).unwrap(), score("the", &table, &config).unwrap());
	}

	#[test]
	fn geometric_mean_is_a_probability() {
		let (table, config) = setup(3, UnknownPolicy::Strict);
		let score = score("the lazy dog", &table, &config).unwrap();
		assert!(score > 0.0 && score <= 1.0);
	}
}
