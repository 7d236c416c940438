use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CopixError, Result};

/// Opaque entry identifier. Minted once per entry, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameId(Uuid);

impl NameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Reference to a locally stored picture (file path or URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single name in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub id: NameId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl NameEntry {
    /// Build a fresh entry. `name` must already be normalized.
    pub(crate) fn new(name: String, image: Option<ImageRef>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: NameId::new(),
            name,
            image,
            is_favorite: false,
            created_at,
        }
    }

    pub(crate) fn with_favorite(&self, is_favorite: bool) -> Self {
        Self {
            is_favorite,
            ..self.clone()
        }
    }

    pub(crate) fn with_name(&self, name: String) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    pub(crate) fn with_image(&self, image: ImageRef) -> Self {
        Self {
            image: Some(image),
            ..self.clone()
        }
    }
}

/// Trim a user-supplied name, rejecting empty and whitespace-only input.
pub fn normalize_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CopixError::InvalidInput);
    }
    Ok(trimmed.to_string())
}

/// Source of `created_at` timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
