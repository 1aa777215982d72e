use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Raw transition counts observed after one context.
///
/// A `State` corresponds to a fixed (n-1)-character context (`key`) and stores
/// how often each next character followed it in the corpus.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each count is finite and `>= 0`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct State {
	/// Identifier of the state (n-1 character context).
	key: String,
	/// Outgoing transitions indexed by the next character.
	/// Counts are floats so smoothing pseudo-counts can be mixed in.
	/// Example: { 'e' => 42.0, 'a' => 3.0 }
	transitions: BTreeMap<char, f64>,
}

impl State {
	/// Creates a new empty state for the given context.
	pub fn new(key: &str) -> Self {
		Self {
			key: key.to_owned(),
			transitions: BTreeMap::new(),
		}
	}

	/// Records one occurrence of a transition toward `next_char`.
	pub fn add_transition(&mut self, next_char: char) {
		*self.transitions.entry(next_char).or_insert(0.0) += 1.0;
	}

	/// Adds `pseudo_count` to the transition toward every character of `alphabet`.
	pub fn seed<I: IntoIterator<Item = char>>(&mut self, alphabet: I, pseudo_count: f64) {
		for next_char in alphabet {
			*self.transitions.entry(next_char).or_insert(0.0) += pseudo_count;
		}
	}

	pub fn total(&self) -> f64 {
		self.transitions.values().sum()
	}

	/// Converts the counts into natural-log probabilities.
	///
	/// Returns `None` when the state holds no observation, so callers never
	/// divide by zero. Zero-count transitions are left out.
	pub fn log_probabilities(&self) -> Option<BTreeMap<char, f64>> {
		let total = self.total();
		if total <= 0.0 {
			return None;
		}
		Some(
			self.transitions
				.iter()
				.filter(|(_, count)| **count > 0.0)
				.map(|(next_char, count)| (*next_char, (count / total).ln()))
				.collect(),
		)
	}

	/// Merges another state into this one by summing counts.
	///
	/// # Errors
	/// Returns [`Error::ContextMismatch`] if the keys differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.key != other.key {
			return Err(Error::ContextMismatch {
				expected: self.key.clone(),
				found: other.key.clone(),
			});
		}

		for (next_char, count) in &other.transitions {
			*self.transitions.entry(*next_char).or_insert(0.0) += *count;
		}

		Ok(())
	}
}
