use std::collections::HashMap;

/// Shannon entropy of the character distribution of `text`, in bits per character.
///
/// Random tokens and hashes spread over many symbols and score high; natural
/// words repeat letters and score lower. Returns `0` for an empty string.
pub fn shannon_entropy(text: &str) -> f64 {
	let mut counts: HashMap<char, usize> = HashMap::new();
	let mut total = 0usize;
	for c in text.chars() {
		*counts.entry(c).or_insert(0) += 1;
		total += 1;
	}
	if total == 0 {
		return 0.0;
	}

	counts
		.values()
		.map(|count| {
			let freq = *count as f64 / total as f64;
			-freq * freq.log2()
		})
		.sum()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uniform_symbols() {
		assert_eq!(shannon_entropy(""), 0.0);
		assert_eq!(shannon_entropy("aaaa"), 0.0);
		assert!((shannon_entropy("abab") - 1.0).abs() < 1e-12);
		assert!((shannon_entropy("abcd") - 2.0).abs() < 1e-12);
	}

	#[test]
	fn hashes_beat_words() {
		assert!(shannon_entropy("9f86d081884c7d65") > shannon_entropy("mississippi"));
	}
}
