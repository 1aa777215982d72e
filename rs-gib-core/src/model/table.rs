use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Next-character distribution of one context, as natural-log probabilities.
pub type Transitions = BTreeMap<char, f64>;

/// Trained transition table: context → next character → log-probability.
///
/// # Invariants
/// - Every context has length `n - 1`
/// - Every row is non empty, its log-probabilities are `<= 0` and their
///   exponentials sum to `1` within floating tolerance
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TransitionTable {
	n: usize,
	rows: BTreeMap<String, Transitions>,
}

impl TransitionTable {
	pub(crate) fn from_rows(n: usize, rows: BTreeMap<String, Transitions>) -> Self {
		Self { n, rows }
	}

	/// Order of the n-grams the table was built from.
	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of contexts.
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Total number of stored transitions across all contexts.
	pub fn transition_count(&self) -> usize {
		self.rows.values().map(BTreeMap::len).sum()
	}

	/// Returns the distribution following `context`, if known.
	pub fn row(&self, context: &str) -> Option<&Transitions> {
		self.rows.get(context)
	}

	/// Returns `ln P(next | context)`, or `None` if the transition was never seen.
	pub fn log_prob(&self, context: &str, next: char) -> Option<f64> {
		self.rows.get(context)?.get(&next).copied()
	}

	/// Iterates over `(context, distribution)` pairs in context order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Transitions)> {
		self.rows.iter().map(|(context, row)| (context.as_str(), row))
	}
}
