use std::collections::BTreeMap;

use log::debug;

use super::state::State;
use super::table::TransitionTable;
use super::tokenizer;
use crate::error::{Error, Result};

/// Accumulates n-gram occurrences from training lines.
///
/// The `NGramCounter` stores one [`State`] per context of length `n-1`
/// and turns them into a [`TransitionTable`] once the corpus is consumed.
///
/// # Responsibilities
/// - Break lines into n-grams with the shared tokenizer
/// - Accumulate transition counts for each context
/// - Merge with another counter of the same order and padding
/// - Normalize counts into log-probabilities, with optional smoothing
///
/// # Invariants
/// - `n` is always >= 2
/// - Each state in `states` corresponds to a unique context of length `n-1`
#[derive(Clone, Debug)]
pub struct NGramCounter {
	/// The order of the model (number of characters in the n-gram)
	n: usize,

	/// Whether lines are padded before windowing
	padding: bool,

	/// Mapping from a context (length n-1) to its observed transitions
	states: BTreeMap<String, State>,
}

impl NGramCounter {
	/// Creates an empty counter of order `n`.
	///
	/// # Errors
	/// Returns [`Error::InvalidNGramSize`] if `n < 2`.
	pub fn new(n: usize, padding: bool) -> Result<Self> {
		if n < 2 {
			return Err(Error::InvalidNGramSize(n));
		}
		Ok(Self { n, padding, states: BTreeMap::new() })
	}

	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of distinct contexts seen so far.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Adds one training line to the counts.
	///
	/// The line is trimmed, then lowercased and padded by the tokenizer.
	/// Lines shorter than `n` after padding contribute nothing.
	pub fn add_sentence(&mut self, sentence: &str) {
		for ngram in tokenizer::ngrams(sentence.trim(), self.n, self.padding) {
			if let Some((context, next_char)) = tokenizer::split(&ngram) {
				self.states
					.entry(context.to_owned())
					.or_insert_with(|| State::new(context))
					.add_transition(next_char);
			}
		}
	}

	/// Adds every line of `lines`.
	pub fn add_sentences<I, S>(&mut self, lines: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for line in lines {
			self.add_sentence(line.as_ref());
		}
	}

	/// Merges another counter into this one.
	///
	/// # Errors
	/// Returns an error if the orders or the padding settings differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.n != other.n {
			return Err(Error::NGramMismatch { expected: self.n, found: other.n });
		}
		if self.padding != other.padding {
			return Err(Error::PaddingMismatch { expected: self.padding, found: other.padding });
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}

	/// Normalizes the counts into a [`TransitionTable`].
	///
	/// When `smoothing > 0`, every observed context first receives `smoothing`
	/// pseudo-occurrences of each character of [`tokenizer::alphabet`].
	/// Contexts without any observation are omitted.
	pub fn to_table(&self, smoothing: f64) -> TransitionTable {
		let mut rows = BTreeMap::new();
		for (context, state) in &self.states {
			let row = if smoothing > 0.0 {
				let mut smoothed = state.clone();
				smoothed.seed(tokenizer::alphabet(), smoothing);
				smoothed.log_probabilities()
			} else {
				state.log_probabilities()
			};

			match row {
				Some(row) => {
					rows.insert(context.clone(), row);
				}
				None => debug!("dropping context {context:?} with no observation"),
			}
		}
		TransitionTable::from_rows(self.n, rows)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_small_n() {
		assert!(matches!(NGramCounter::new(1, true), Err(Error::InvalidNGramSize(1))));
	}

	#[test]
	fn counts_contexts() {
		let mut counter = NGramCounter::new(2, false).unwrap();
		counter.add_sentence("abab");
		// contexts "a" and "b"
		assert_eq!(counter.len(), 2);

		let table = counter.to_table(0.0);
		assert_eq!(table.log_prob("a", 'b'), Some(0.0));
		assert_eq!(table.log_prob("b", 'a'), Some(0.0));
		assert_eq!(table.log_prob("a", 'a'), None);
	}

	#[test]
	fn lines_are_trimmed_and_lowercased() {
		let mut counter = NGramCounter::new(2, false).unwrap();
		counter.add_sentence("  AB  ");
		let table = counter.to_table(0.0);
		assert_eq!(table.len(), 1);
		assert_eq!(table.log_prob("a", 'b'), Some(0.0));
	}

	#[test]
	fn smoothing_fills_alphabet() {
		let mut counter = NGramCounter::new(2, false).unwrap();
		counter.add_sentence("ab");
		let table = counter.to_table(1.0);

		let row = table.row("a").unwrap();
		assert_eq!(row.len(), tokenizer::alphabet().count());
		assert!(table.log_prob("a", 'b').unwrap() > table.log_prob("a", 'z').unwrap());
		// "b" was never a context, smoothing does not invent it
		assert!(table.row("b").is_none());
	}

	#[test]
	fn merge_equals_joint_training() {
		let mut joint = NGramCounter::new(3, true).unwrap();
		joint.add_sentences(["the cat", "the dog"]);

		let mut a = NGramCounter::new(3, true).unwrap();
		a.add_sentence("the cat");
		let mut b = NGramCounter::new(3, true).unwrap();
		b.add_sentence("the dog");
		a.merge(&b).unwrap();

		assert_eq!(a.to_table(0.0), joint.to_table(0.0));
	}

	#[test]
	fn merge_checks_settings() {
		let mut a = NGramCounter::new(2, true).unwrap();
		assert!(matches!(
			a.merge(&NGramCounter::new(3, true).unwrap()),
			Err(Error::NGramMismatch { expected: 2, found: 3 })
		));
		assert!(matches!(
			a.merge(&NGramCounter::new(2, false).unwrap()),
			Err(Error::PaddingMismatch { .. })
		));
	}
}
