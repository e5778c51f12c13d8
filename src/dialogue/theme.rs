//! Theme extraction for steering the host away from repeated angles

use serde::{Deserialize, Serialize};

/// Words too common to say anything about a question's angle.
pub const STOP_WORDS: [&str; 11] = [
    "what", "why", "how", "the", "is", "in", "of", "to", "a", "and", "when",
];

const MAX_THEME_WORDS: usize = 3;

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.iter().any(|stop| stop.eq_ignore_ascii_case(word))
}

/// Reduce a question to a short keyword phrase.
///
/// Falls back to the untouched question when every word is a stop word.
pub fn extract_theme(question: &str) -> String {
    let keywords: Vec<&str> = question
        .split_whitespace()
        .map(|word| word.trim_matches(&['?', ',', '.'][..]))
        .filter(|word| !word.is_empty() && !is_stop_word(word))
        .take(MAX_THEME_WORDS)
        .collect();

    if keywords.is_empty() {
        question.to_string()
    } else {
        keywords.join(" ")
    }
}

/// Themes already covered, in the order they came up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoveredThemes {
    themes: Vec<String>,
}

impl CoveredThemes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a theme. Returns `false` when it was already present.
    pub fn insert(&mut self, theme: String) -> bool {
        if self.themes.contains(&theme) {
            return false;
        }
        self.themes.push(theme);
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.themes
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}
