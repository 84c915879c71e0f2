use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FORMAT: &str = "%Y%m%d-%H:%M:%S";

/// A strftime pattern that has been checked to render without errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SuffixFormat(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuffixFormatError {
    #[error("Suffix format cannot be empty")]
    Empty,
    #[error("Invalid suffix format [{0}]")]
    Invalid(String),
}

impl SuffixFormat {
    pub fn new(pattern: impl Into<String>) -> Result<Self, SuffixFormatError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(SuffixFormatError::Empty);
        }
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(SuffixFormatError::Invalid(pattern));
        }
        Ok(Self(pattern))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render the boundary in its own (local) time zone.
    pub fn render<Tz>(&self, boundary: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        boundary.format(&self.0).to_string()
    }
}

impl Default for SuffixFormat {
    fn default() -> Self {
        Self(DEFAULT_FORMAT.to_string())
    }
}

impl std::str::FromStr for SuffixFormat {
    type Err = SuffixFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SuffixFormat {
    type Error = SuffixFormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SuffixFormat> for String {
    fn from(format: SuffixFormat) -> Self {
        format.0
    }
}

impl fmt::Display for SuffixFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_default_format_renders_boundary() {
        let boundary = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(SuffixFormat::default().render(&boundary), "20240310-00:00:00");
    }

    #[test]
    fn test_rejects_empty_and_broken_patterns() {
        assert_eq!(SuffixFormat::new(""), Err(SuffixFormatError::Empty));
        assert!(matches!(
            SuffixFormat::new("%Y-%"),
            Err(SuffixFormatError::Invalid(_))
        ));
    }

    #[test]
    fn test_custom_pattern() {
        let format = SuffixFormat::new("%Y-%m").unwrap();
        let boundary = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(format.render(&boundary), "2023-12");
    }
}
