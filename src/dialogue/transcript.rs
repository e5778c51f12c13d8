//! Transcript model and rendering

use serde::{Deserialize, Serialize};

/// One utterance in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Turn {
    /// Asked by the host
    Question(String),
    /// Given by the guest
    Answer(String),
}

impl Turn {
    pub fn text(&self) -> &str {
        match self {
            Self::Question(text) | Self::Answer(text) => text,
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self, Self::Question(_))
    }
}

/// Display names used when rendering turns as `Name: text` lines.
#[derive(Debug, Clone, Copy)]
pub struct Speakers<'a> {
    pub host: &'a str,
    pub guest: &'a str,
}

impl Speakers<'_> {
    pub fn label(&self, turn: &Turn) -> &str {
        match turn {
            Turn::Question(_) => self.host,
            Turn::Answer(_) => self.guest,
        }
    }

    fn render(&self, turns: &[Turn]) -> String {
        turns
            .iter()
            .map(|turn| format!("{}: {}", self.label(turn), turn.text()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Append-only record of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Text of the most recent question, if any was asked.
    pub fn last_question(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.is_question())
            .map(Turn::text)
    }

    /// The whole conversation, one `Name: text` line per turn.
    pub fn render(&self, speakers: Speakers<'_>) -> String {
        speakers.render(&self.turns)
    }
}

/// Render the last `limit` question/answer pairs as host context.
///
/// Returns an empty string when there is nothing to show; prompt builders
/// substitute their own placeholder for that.
pub fn build_history(turns: &[Turn], limit: usize, speakers: Speakers<'_>) -> String {
    let window = limit.saturating_mul(2).min(turns.len());
    speakers.render(&turns[turns.len() - window..])
}
