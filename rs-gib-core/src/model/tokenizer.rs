//! Character windowing shared by the training and scoring paths.

use std::ops::RangeInclusive;

/// Characters accepted inside an n-gram (printable ASCII).
pub const PRINTABLE: RangeInclusive<char> = ' '..='~';

/// Character used to pad both ends of a line.
pub const PAD_CHAR: char = ' ';

/// Returns `true` if `c` may appear inside an n-gram.
pub fn is_printable(c: char) -> bool {
	PRINTABLE.contains(&c)
}

/// Every character an n-gram can hold once lowercased.
///
/// Upper-case letters are absent since normalization folds them.
pub fn alphabet() -> impl Iterator<Item = char> {
	PRINTABLE.filter(|c| !c.is_ascii_uppercase())
}

/// Lowercases `text` into a character vector.
///
/// When `padding` is set, `n - 1` [`PAD_CHAR`]s are added on both ends so that
/// word boundaries become ordinary transitions.
pub fn normalize(text: &str, n: usize, padding: bool) -> Vec<char> {
	let pad = if padding { n.saturating_sub(1) } else { 0 };
	let mut chars = Vec::with_capacity(text.len() + 2 * pad);
	chars.extend(std::iter::repeat_n(PAD_CHAR, pad));
	chars.extend(text.chars().flat_map(char::to_lowercase));
	chars.extend(std::iter::repeat_n(PAD_CHAR, pad));
	chars
}

/// Extracts every overlapping window of `text`, left to right, including
/// the ones [`is_scorable`] rejects.
pub fn windows(text: &str, n: usize, padding: bool) -> Vec<String> {
	let chars = normalize(text, n, padding);
	if n == 0 || chars.len() < n {
		return Vec::new();
	}

	chars.windows(n).map(|window| window.iter().collect()).collect()
}

/// Returns `true` if every char of `window` is printable.
pub fn is_scorable(window: &str) -> bool {
	window.chars().all(is_printable)
}

/// Extracts every overlapping n-gram of `text`, left to right.
///
/// # Notes
/// - Returns an empty vector when the normalized text is shorter than `n`.
/// - A window holding any non printable character is dropped as a whole.
pub fn ngrams(text: &str, n: usize, padding: bool) -> Vec<String> {
	windows(text, n, padding).into_iter().filter(|window| is_scorable(window)).collect()
}

/// Splits an n-gram into its context (first `n - 1` chars) and next character.
///
/// Returns `None` for an empty string.
pub fn split(ngram: &str) -> Option<(&str, char)> {
	let (index, next) = ngram.char_indices().next_back()?;
	Some((&ngram[..index], next))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ngrams_overlap_left_to_right() {
		assert_eq!(ngrams("abcd", 2, false), vec!["ab", "bc", "cd"]);
		assert_eq!(ngrams("abcd", 3, false), vec!["abc", "bcd"]);
	}

	#[test]
	fn ngrams_are_lowercased() {
		assert_eq!(ngrams("HeY", 2, false), vec!["he", "ey"]);
	}

	#[test]
	fn short_text_has_no_ngrams() {
		assert!(ngrams("ab", 3, false).is_empty());
		assert!(ngrams("", 2, false).is_empty());
	}

	#[test]
	fn padding_adds_boundary_windows() {
		assert_eq!(ngrams("ab", 2, true), vec![" a", "ab", "b "]);
		assert_eq!(ngrams("ab", 3, true), vec!["  a", " ab", "ab ", "b  "]);
	}

	#[test]
	fn non_printable_excludes_whole_window() {
		// 'é' poisons the two windows that contain it and nothing else.
		assert_eq!(ngrams("aébc", 2, false), vec!["bc"]);
		assert_eq!(ngrams("ab\tcd", 2, false), vec!["ab", "cd"]);
	}

	#[test]
	fn windows_keep_excluded_slots() {
		assert_eq!(windows("aébc", 2, false), vec!["aé", "éb", "bc"]);
		assert!(!windows("中文", 2, true).iter().any(|window| is_scorable(window)));
	}

	#[test]
	fn split_separates_context() {
		assert_eq!(split("abc"), Some(("ab", 'c')));
		assert_eq!(split("a"), Some(("", 'a')));
		assert_eq!(split(""), None);
	}

	#[test]
	fn alphabet_is_lowercase_printable() {
		let alphabet: Vec<char> = alphabet().collect();
		assert_eq!(alphabet.len(), 95 - 26);
		assert!(alphabet.contains(&' '));
		assert!(alphabet.contains(&'~'));
		assert!(!alphabet.contains(&'A'));
	}
}
