//! Unicode word-boundary matching of head-words against transcript text

use regex::Regex;

/// Matches one head-word (single token or multi-word phrase) against
/// transcript lines with Unicode-correct word-boundary semantics.
///
/// The compiled pattern requires each token to be delimited by non-letter
/// code points (or start/end of text), so macronised vowels count as letters
/// and can never act as a boundary. Matching is case-insensitive under full
/// Unicode case folding; macronless forms stay distinct from macronised ones.
#[derive(Debug, Clone)]
pub struct HeadwordMatcher {
    pattern: Regex,
}

impl HeadwordMatcher {
    /// Compile a matcher for the given head-word.
    ///
    /// Returns `None` when the head-word is empty after trimming.
    pub fn new(headword: &str) -> Option<Self> {
        let tokens: Vec<String> = headword
            .split_whitespace()
            .map(|t| regex::escape(&t.to_lowercase()))
            .collect();
        if tokens.is_empty() {
            return None;
        }

        // Tokens of a phrase may be separated by any run of non-letters;
        // the whole match must sit between non-letters (or text edges).
        let inner = tokens.join(r"\P{L}+");
        let pattern = Regex::new(&format!(r"(?i)(^|\P{{L}}){}(\P{{L}}|$)", inner)).ok()?;

        Some(Self { pattern })
    }

    /// Whether the head-word occurs in `text` under the boundary rule
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(&text.to_lowercase())
    }
}

/// One-shot convenience for invariant checks: compile and match in one call
pub fn headword_in_text(headword: &str, text: &str) -> bool {
    HeadwordMatcher::new(headword).is_some_and(|m| m.is_match(text))
}
