//! Article status enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The publication status of an article.
///
/// Variants are ordered; `Live` and above are publicly visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ArticleStatus {
    /// Work in progress, never shown.
    Draft = 1,
    /// Finished but deliberately hidden.
    Hidden = 2,
    /// Awaiting approval by a publisher.
    Pending = 3,
    /// Publicly visible.
    Live = 4,
    /// Publicly visible and pinned.
    Sticky = 5,
}

impl Default for ArticleStatus {
    fn default() -> Self {
        Self::Live
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Hidden => write!(f, "hidden"),
            Self::Pending => write!(f, "pending"),
            Self::Live => write!(f, "live"),
            Self::Sticky => write!(f, "sticky"),
        }
    }
}

impl From<ArticleStatus> for u8 {
    fn from(status: ArticleStatus) -> Self {
        status as u8
    }
}

impl TryFrom<u8> for ArticleStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_code(i64::from(value)).ok_or_else(|| format!("invalid status code {value}"))
    }
}

impl ArticleStatus {
    /// All statuses in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Hidden,
        Self::Pending,
        Self::Live,
        Self::Sticky,
    ];

    /// Returns the status for a numeric code.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Draft),
            2 => Some(Self::Hidden),
            3 => Some(Self::Pending),
            4 => Some(Self::Live),
            5 => Some(Self::Sticky),
            _ => None,
        }
    }

    /// Parses a submitted form value.
    #[must_use]
    pub fn from_form(value: &str) -> Option<Self> {
        value.trim().parse::<i64>().ok().and_then(Self::from_code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns true if the status is publicly visible.
    #[must_use]
    pub fn is_public(self) -> bool {
        self >= Self::Live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(ArticleStatus::Draft < ArticleStatus::Hidden);
        assert!(ArticleStatus::Pending < ArticleStatus::Live);
        assert!(ArticleStatus::Live < ArticleStatus::Sticky);
    }

    #[test]
    fn test_status_is_public() {
        assert!(ArticleStatus::Live.is_public());
        assert!(ArticleStatus::Sticky.is_public());
        assert!(!ArticleStatus::Pending.is_public());
        assert!(!ArticleStatus::Draft.is_public());
    }

    #[test]
    fn test_status_from_form() {
        assert_eq!(ArticleStatus::from_form("4"), Some(ArticleStatus::Live));
        assert_eq!(ArticleStatus::from_form(" 1 "), Some(ArticleStatus::Draft));
        assert_eq!(ArticleStatus::from_form("9"), None);
        assert_eq!(ArticleStatus::from_form("live"), None);
    }

    #[test]
    fn test_status_serialize() {
        let json = serde_json::to_string(&ArticleStatus::Pending).unwrap();
        assert_eq!(json, "3");

        let parsed: ArticleStatus = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, ArticleStatus::Sticky);
        assert!(serde_json::from_str::<ArticleStatus>("0").is_err());
    }
}
