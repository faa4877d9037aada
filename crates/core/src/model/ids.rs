use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing an identifier from a string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {reason}")]
pub struct IdError {
    kind: &'static str,
    reason: &'static str,
}

impl IdError {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

/// Shared validation for opaque string identifiers.
///
/// Identifiers are embedded in `#`-delimited record keys, so they can
/// never contain the delimiter.
fn validate(kind: &'static str, raw: &str) -> Result<String, IdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdError {
            kind,
            reason: "empty",
        });
    }
    if trimmed.contains('#') {
        return Err(IdError {
            kind,
            reason: "contains '#'",
        });
    }
    Ok(trimmed.to_string())
}

/// Identifier of a course in the public catalog.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    /// Creates a new `CourseId`.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the value is blank or contains `#`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
        validate("CourseId", value.as_ref()).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque identifier of a playable video (one lesson).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Creates a new `VideoId`.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the value is blank or contains `#`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
        validate("VideoId", value.as_ref()).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque user identifier handed over by the identity provider.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`.
    ///
    /// # Errors
    ///
    /// Returns `IdError` if the value is blank or contains `#`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, IdError> {
        validate("UserId", value.as_ref()).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CourseId({})", self.0)
    }
}

impl fmt::Debug for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VideoId({})", self.0)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

impl FromStr for CourseId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for VideoId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_id_trims_and_displays() {
        let id = CourseId::new("  rust-101 ").unwrap();
        assert_eq!(id.to_string(), "rust-101");
        assert_eq!(id.as_str(), "rust-101");
    }

    #[test]
    fn test_video_id_from_str() {
        let id: VideoId = "dQw4w9WgXcQ".parse().unwrap();
        assert_eq!(id, VideoId::new("dQw4w9WgXcQ").unwrap());
    }

    #[test]
    fn test_blank_id_is_rejected() {
        let err = "   ".parse::<UserId>().unwrap_err();
        assert_eq!(err.kind(), "UserId");
    }

    #[test]
    fn test_key_delimiter_is_rejected() {
        assert!(CourseId::new("a#b").is_err());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = CourseId::new("c1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"c1\"");
    }
}
