//! Site preferences consulted by the article editor.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Highest custom field number a site can configure.
pub const MAX_CUSTOM_FIELDS: u8 = 10;

/// Deployment stage of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStatus {
    /// Development; every diagnostic is surfaced.
    Debug,
    /// Staging; diagnostics surfaced, no outbound pings.
    Testing,
    /// Production.
    #[default]
    Live,
}

impl ProductionStatus {
    /// Returns true for the production stage.
    #[must_use]
    pub fn is_live(self) -> bool {
        self == Self::Live
    }
}

impl fmt::Display for ProductionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Testing => write!(f, "testing"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Site-wide preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Site name sent with pings.
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Public site URL, with trailing slash.
    #[serde(default = "default_site_url")]
    pub site_url: String,
    /// Site-wide secret salted into form tokens and draft checksums.
    #[serde(default)]
    pub blog_uid: String,
    /// Deployment stage.
    #[serde(default)]
    pub production_status: ProductionStatus,
    /// Default text filter id for new articles.
    #[serde(default = "default_text_filter")]
    pub use_textile: String,
    /// Whether the excerpt field is in use.
    #[serde(default = "default_true")]
    pub articles_use_excerpts: bool,
    /// Whether comments are enabled site-wide.
    #[serde(default = "default_true")]
    pub use_comments: bool,
    /// Whether new articles open for comments by default.
    #[serde(default)]
    pub comments_on_default: bool,
    /// Default comment invitation.
    #[serde(default = "default_invite")]
    pub comments_default_invite: String,
    /// Days after posting when comments close; zero never closes.
    #[serde(default)]
    pub comments_disabled_after: u32,
    /// Whether articles may override their section's form.
    #[serde(default = "default_true")]
    pub allow_form_override: bool,
    /// Section used when none or an unknown one is given.
    #[serde(default = "default_section")]
    pub default_section: String,
    /// Lower-case dashed slugs when true; squashed slugs otherwise.
    #[serde(default = "default_true")]
    pub permalink_title_format: bool,
    /// Site timezone offset from UTC in seconds.
    #[serde(default)]
    pub gmt_offset_seconds: i32,
    /// Number of entries in the recent-articles list.
    #[serde(default = "default_recent_count")]
    pub recent_articles_count: usize,
    /// Labels of active custom fields keyed by field number.
    #[serde(default)]
    pub custom_fields: BTreeMap<u8, String>,
    /// Ping endpoints notified when an article goes public.
    #[serde(default)]
    pub ping_endpoints: Vec<String>,
}

fn default_site_name() -> String {
    "My site".to_string()
}

fn default_site_url() -> String {
    "http://localhost/".to_string()
}

fn default_text_filter() -> String {
    crate::textfilter::CONVERT_LINEBREAKS.to_string()
}

fn default_true() -> bool {
    true
}

fn default_invite() -> String {
    "Comment".to_string()
}

fn default_section() -> String {
    "articles".to_string()
}

fn default_recent_count() -> usize {
    10
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            site_url: default_site_url(),
            blog_uid: String::new(),
            production_status: ProductionStatus::default(),
            use_textile: default_text_filter(),
            articles_use_excerpts: true,
            use_comments: true,
            comments_on_default: false,
            comments_default_invite: default_invite(),
            comments_disabled_after: 0,
            allow_form_override: true,
            default_section: default_section(),
            permalink_title_format: true,
            gmt_offset_seconds: 0,
            recent_articles_count: default_recent_count(),
            custom_fields: BTreeMap::new(),
            ping_endpoints: Vec::new(),
        }
    }
}

impl Preferences {
    /// Creates preferences with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses preferences from JSON; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let prefs: Self = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::Preferences(e.to_string()))?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// Loads preferences from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Preferences(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(num) = self
            .custom_fields
            .keys()
            .find(|n| **n == 0 || **n > MAX_CUSTOM_FIELDS)
        {
            return Err(ConfigurationError::Preferences(format!(
                "custom field number {num} out of range 1..={MAX_CUSTOM_FIELDS}"
            )));
        }
        Ok(())
    }

    /// Sets the site secret.
    #[must_use]
    pub fn with_blog_uid(mut self, uid: impl Into<String>) -> Self {
        self.blog_uid = uid.into();
        self
    }

    /// Sets the deployment stage.
    #[must_use]
    pub fn with_production_status(mut self, status: ProductionStatus) -> Self {
        self.production_status = status;
        self
    }

    /// Activates a custom field with a label.
    #[must_use]
    pub fn with_custom_field(mut self, num: u8, label: impl Into<String>) -> Self {
        self.custom_fields.insert(num, label.into());
        self
    }

    /// Sets whether excerpts are in use.
    #[must_use]
    pub fn with_excerpts(mut self, enabled: bool) -> Self {
        self.articles_use_excerpts = enabled;
        self
    }

    /// Sets whether comments are enabled.
    #[must_use]
    pub fn with_comments(mut self, enabled: bool) -> Self {
        self.use_comments = enabled;
        self
    }

    /// Sets the timezone offset.
    #[must_use]
    pub fn with_gmt_offset(mut self, seconds: i32) -> Self {
        self.gmt_offset_seconds = seconds;
        self
    }

    /// Adds a ping endpoint.
    #[must_use]
    pub fn with_ping_endpoint(mut self, url: impl Into<String>) -> Self {
        self.ping_endpoints.push(url.into());
        self
    }

    /// Returns the active custom field numbers in ascending order.
    pub fn active_custom_fields(&self) -> impl Iterator<Item = u8> + '_ {
        self.custom_fields
            .iter()
            .filter(|(_, label)| !label.is_empty())
            .map(|(num, _)| *num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_json() {
        let prefs = Preferences::from_json_str("{}").unwrap();
        assert_eq!(prefs.default_section, "articles");
        assert!(prefs.articles_use_excerpts);
        assert_eq!(prefs.production_status, ProductionStatus::Live);
        assert_eq!(prefs.recent_articles_count, 10);
    }

    #[test]
    fn test_custom_fields_from_json() {
        let prefs = Preferences::from_json_str(
            r#"{"custom_fields": {"1": "Mood", "2": "", "3": "Song"}, "production_status": "debug"}"#,
        )
        .unwrap();
        assert_eq!(prefs.active_custom_fields().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(prefs.production_status, ProductionStatus::Debug);
    }

    #[test]
    fn test_custom_field_out_of_range() {
        let err = Preferences::from_json_str(r#"{"custom_fields": {"11": "x"}}"#).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"site_name": "Example", "gmt_offset_seconds": 3600}}"#).unwrap();

        let prefs = Preferences::from_file(file.path()).unwrap();
        assert_eq!(prefs.site_name, "Example");
        assert_eq!(prefs.gmt_offset_seconds, 3600);
    }

    #[test]
    fn test_from_missing_file() {
        let err = Preferences::from_file("/nonexistent/prefs.json").unwrap_err();
        assert!(matches!(err, ConfigurationError::Preferences(_)));
    }
}
