//! Dialogue module for banter
//!
//! Runs the host/guest loop, keeps the transcript and asks for the summary.

mod driver;
mod episode;
mod theme;
mod transcript;

pub use driver::{DialogueDriver, RunState};
pub use episode::Episode;
pub use theme::{extract_theme, CoveredThemes, STOP_WORDS};
pub use transcript::{build_history, Speakers, Transcript, Turn};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which model role a call was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Guest,
    Summarizer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Guest => "guest",
            Self::Summarizer => "summarizer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dialogue flavour
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Host sees history only; every utterance counts toward the turn cap
    Plain,
    /// Host also sees covered themes; only questions count toward the cap
    #[default]
    Themed,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Themed => "themed",
        }
    }

    /// Whether guest answers count toward the turn cap.
    pub fn counts_answers(&self) -> bool {
        matches!(self, Self::Plain)
    }

    /// Whether host questions are reduced to themes and fed back.
    pub fn tracks_themes(&self) -> bool {
        matches!(self, Self::Themed)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
