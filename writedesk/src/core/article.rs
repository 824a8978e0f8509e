//! The persisted article record.

use super::ArticleStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An article row as stored.
///
/// Timestamps are Unix seconds (UTC). `id` is zero until storage assigns
/// one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Article {
    /// Storage-assigned identity.
    pub id: i64,
    /// Plain title as typed.
    pub title: String,
    /// Rendered title.
    pub title_html: String,
    /// Raw body source.
    pub body: String,
    /// Body rendered through `body_filter`.
    pub body_html: String,
    /// Raw excerpt source.
    pub excerpt: String,
    /// Excerpt rendered through `excerpt_filter`.
    pub excerpt_html: String,
    /// Text filter id for the body.
    pub body_filter: String,
    /// Text filter id for the excerpt.
    pub excerpt_filter: String,
    /// Article image reference.
    pub image: String,
    /// Normalized comma-separated keywords.
    pub keywords: String,
    /// Publication status.
    pub status: ArticleStatus,
    /// Section name.
    pub section: String,
    /// Primary category name.
    pub category1: String,
    /// Secondary category name.
    pub category2: String,
    /// Whether comments are open.
    pub annotate: bool,
    /// Comment invitation label.
    pub annotate_invite: String,
    /// Article form overriding the section default.
    pub override_form: String,
    /// URL slug.
    pub url_title: String,
    /// Posting time; may lie in the future.
    pub posted: i64,
    /// Expiry time, strictly after `posted` when set.
    pub expires: Option<i64>,
    /// Server-assigned time of the last successful write.
    pub last_modified: i64,
    /// Original author.
    pub author_id: String,
    /// User of the last successful write.
    pub last_modified_by: String,
    /// Values of active custom fields keyed by field number.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<u8, String>,
    /// Globally unique id used by feeds.
    pub uid: String,
    /// Feed timestamp.
    pub feed_time: i64,
}

impl Article {
    /// Returns the value of a custom field, empty if unset.
    #[must_use]
    pub fn custom_field(&self, num: u8) -> &str {
        self.custom_fields.get(&num).map_or("", String::as_str)
    }

    /// Returns true if the article is publicly visible.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.status.is_public()
    }
}
