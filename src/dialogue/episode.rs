//! A finished run, ready for export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dialogue::theme::CoveredThemes;
use crate::dialogue::transcript::{Speakers, Transcript};
use crate::dialogue::Variant;

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Unique identifier (UUID)
    pub id: String,

    /// When the run started
    pub created_at: DateTime<Utc>,

    /// What was discussed
    pub topic: String,

    /// Dialogue flavour used
    pub variant: Variant,

    /// Host display name
    pub host: String,

    /// Guest display name
    pub guest: String,

    /// Every question and answer in order
    pub transcript: Transcript,

    /// Themes the host was told to avoid repeating
    pub themes: CoveredThemes,

    /// Closing takeaways
    pub summary: String,
}

impl Episode {
    pub fn speakers(&self) -> Speakers<'_> {
        Speakers {
            host: &self.host,
            guest: &self.guest,
        }
    }

    /// Short id used in console messages
    pub fn short_id(&self) -> &str {
        &self.id[..8]
    }
}
