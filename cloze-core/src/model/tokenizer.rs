/// Characters deleted from text before splitting it into words.
///
/// They are removed, not replaced by a space: `"dog,cat"` becomes the single
/// token `"dogcat"`. Newlines need no entry since they already split words.
pub const STRIPPED_PUNCTUATION: [char; 3] = [',', '.', ';'];

/// Character ending a sentence in cloze text.
pub const SENTENCE_TERMINATOR: char = '.';

/// Splits a line into normalized word tokens.
///
/// Strips [`STRIPPED_PUNCTUATION`], splits on whitespace and lowercases every
/// token. Corpus lines and cloze sentences both go through this function so
/// that lookups between the two always agree.
pub fn tokenize(line: &str) -> Vec<String> {
	let cleaned: String = line
		.chars()
		.filter(|c| !STRIPPED_PUNCTUATION.contains(c))
		.collect();
	cleaned.split_whitespace().map(str::to_lowercase).collect()
}

/// Normalizes a single word the same way [`tokenize`] does.
///
/// Returns `None` when nothing is left, or when the input holds more than
/// one word once punctuation is gone.
pub fn normalize_word(word: &str) -> Option<String> {
	let mut tokens = tokenize(word);
	if tokens.len() == 1 { tokens.pop() } else { None }
}

/// Splits cloze text into tokenized sentences.
///
/// Sentences are delimited by periods only; sentences left empty are kept
/// so that positions stay aligned with the raw text, they simply hold no
/// gaps.
pub fn split_sentences(text: &str) -> Vec<Vec<String>> {
	text.split(SENTENCE_TERMINATOR).map(tokenize).collect()
}
