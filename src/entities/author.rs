// Author Entity - the person a budget entry is attributed to
//
// Authors are created once and never mutated. Entries reference them by id.

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// AUTHOR ENTITY
// ============================================================================

/// Case-insensitive substring test used by the author-name filter.
/// Lowercasing is Unicode-aware; the filter is literal text, not a pattern.
pub fn fio_contains(fio: &str, filter: &str) -> bool {
    fio.to_lowercase().contains(&filter.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Stable identity assigned by storage
    pub id: i64,

    /// Full name
    pub fio: String,

    pub creation_time: DateTime<Utc>,
}

impl Author {
    /// Case-insensitive substring match against the full name
    ///
    /// Lowercasing is Unicode-aware, so Cyrillic names match too.
    pub fn matches_fio(&self, filter: &str) -> bool {
        fio_contains(&self.fio, filter)
    }

    pub fn summary(&self) -> AuthorSummary {
        AuthorSummary {
            fio: self.fio.clone(),
        }
    }
}

// ============================================================================
// REQUEST / RESPONSE SHAPES
// ============================================================================

/// Body of `POST /author/add`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub fio: String,
}

impl AuthorRecord {
    pub fn validate(&self) -> Result<()> {
        if self.fio.trim().is_empty() {
            return Err(Error::Validation("fio must not be blank".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRecordResponse {
    pub fio: String,

    /// ISO-8601 timestamp
    pub creation_time: String,
}

impl From<&Author> for AuthorRecordResponse {
    fn from(author: &Author) -> Self {
        Self {
            fio: author.fio.clone(),
            creation_time: author
                .creation_time
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Author as attached to stats items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub fio: String,
}
