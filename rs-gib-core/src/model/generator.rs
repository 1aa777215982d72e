use rand::Rng;
use rand::seq::IteratorRandom;

use super::config::ModelConfig;
use super::table::{TransitionTable, Transitions};
use super::tokenizer::PAD_CHAR;

/// Returns the context generation starts from.
///
/// With padding this is the line-start context (`n - 1` pad characters),
/// otherwise a context of the table picked with `rng`. Returns `None` for an
/// empty table.
pub fn seed_context<R: Rng + ?Sized>(table: &TransitionTable, config: &ModelConfig, rng: &mut R) -> Option<String> {
	if config.padding {
		return Some(std::iter::repeat_n(PAD_CHAR, config.n() - 1).collect());
	}
	table.iter().map(|(context, _)| context).choose(rng).map(str::to_owned)
}

/// Generates up to `length` characters starting from `seed`.
///
/// Each step draws the next character from the distribution of the current
/// context, then slides the context forward by one character. Stops early,
/// without error, when a context has no known transition.
///
/// # Notes
/// - The seed itself is not part of the output.
/// - Only the last `n - 1` characters of `seed` are used.
pub fn generate_from<R: Rng + ?Sized>(table: &TransitionTable, seed: &str, length: usize, rng: &mut R) -> String {
	let width = table.n() - 1;
	let mut context: Vec<char> = seed.chars().flat_map(char::to_lowercase).collect();
	if context.len() > width {
		context.drain(..context.len() - width);
	}

	let mut output = String::with_capacity(length);
	let mut key = String::with_capacity(width);
	for _ in 0..length {
		key.clear();
		key.extend(context.iter());
		let next_char = match table.row(&key).and_then(|row| sample(row, rng)) {
			Some(c) => c,
			None => break,
		};

		output.push(next_char);
		context.push(next_char);
		if context.len() > width {
			context.remove(0);
		}
	}
	output
}

/// Draws one character with probability `exp(log_prob)`.
///
/// This method performs:
/// - an O(n) scan over the transitions
/// - a cumulative subtraction to select a bucket
///
/// Returns `None` if the row is empty.
pub fn sample<R: Rng + ?Sized>(row: &Transitions, rng: &mut R) -> Option<char> {
	let mut r: f64 = rng.random();

	let mut fallback = None;
	for (next_char, log_prob) in row {
		let p = log_prob.exp();
		if r < p {
			return Some(*next_char);
		}
		r -= p;
		fallback = Some(*next_char);
	}

	// Rounding can leave `r` slightly above the last bucket.
	fallback
}
