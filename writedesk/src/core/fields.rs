//! Submitted form fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names of the fields the editor form submits.
pub mod names {
    /// Article id.
    pub const ID: &str = "ID";
    /// Title.
    pub const TITLE: &str = "Title";
    /// Body source.
    pub const BODY: &str = "Body";
    /// Excerpt source.
    pub const EXCERPT: &str = "Excerpt";
    /// Body text filter id.
    pub const BODY_FILTER: &str = "textile_body";
    /// Excerpt text filter id.
    pub const EXCERPT_FILTER: &str = "textile_excerpt";
    /// Article image.
    pub const IMAGE: &str = "Image";
    /// Keywords.
    pub const KEYWORDS: &str = "Keywords";
    /// Status code.
    pub const STATUS: &str = "Status";
    /// Section.
    pub const SECTION: &str = "Section";
    /// Primary category.
    pub const CATEGORY1: &str = "Category1";
    /// Secondary category.
    pub const CATEGORY2: &str = "Category2";
    /// Comments on/off.
    pub const ANNOTATE: &str = "Annotate";
    /// Comment invitation.
    pub const ANNOTATE_INVITE: &str = "AnnotateInvite";
    /// Use the current time as post time (new articles).
    pub const PUBLISH_NOW: &str = "publish_now";
    /// Reset the post time to now (existing articles).
    pub const RESET_TIME: &str = "reset_time";
    /// Author.
    pub const AUTHOR_ID: &str = "AuthorID";
    /// Echoed post timestamp.
    pub const S_POSTED: &str = "sPosted";
    /// Echoed last-modified fingerprint.
    pub const S_LAST_MOD: &str = "sLastMod";
    /// Echoed expiry timestamp.
    pub const S_EXPIRES: &str = "sExpires";
    /// User of the last modification.
    pub const LAST_MOD_ID: &str = "LastModID";
    /// Form override.
    pub const OVERRIDE_FORM: &str = "override_form";
    /// View the form was rendered in.
    pub const FROM_VIEW: &str = "from_view";
    /// Requested view.
    pub const VIEW: &str = "view";
    /// URL slug.
    pub const URL_TITLE: &str = "url_title";
    /// Requested step.
    pub const STEP: &str = "step";
    /// Save button.
    pub const SAVE: &str = "save";
    /// Publish button.
    pub const PUBLISH: &str = "publish";
    /// Draft blob echoed from preview/html views.
    pub const STORE: &str = "store";
    /// CSRF token.
    pub const TOKEN: &str = "_txp_token";
    /// Pane name for pane-state toggles.
    pub const PANE: &str = "pane";
    /// Pane visibility for pane-state toggles.
    pub const VISIBLE: &str = "visible";

    /// Post-time sub-fields.
    pub const POSTED_PARTS: [&str; 6] = ["year", "month", "day", "hour", "minute", "second"];
    /// Expiry-time sub-fields.
    pub const EXPIRES_PARTS: [&str; 6] = [
        "exp_year",
        "exp_month",
        "exp_day",
        "exp_hour",
        "exp_minute",
        "exp_second",
    ];

    /// Form field name of a custom field.
    #[must_use]
    pub fn custom(num: u8) -> String {
        format!("custom_{num}")
    }
}

const BASE_VARS: [&str; 24] = [
    names::ID,
    names::TITLE,
    names::BODY,
    names::EXCERPT,
    names::EXCERPT_FILTER,
    names::IMAGE,
    names::BODY_FILTER,
    names::KEYWORDS,
    names::STATUS,
    names::SECTION,
    names::CATEGORY1,
    names::CATEGORY2,
    names::ANNOTATE,
    names::ANNOTATE_INVITE,
    names::PUBLISH_NOW,
    names::RESET_TIME,
    names::AUTHOR_ID,
    names::S_POSTED,
    names::LAST_MOD_ID,
    names::S_LAST_MOD,
    names::OVERRIDE_FORM,
    names::FROM_VIEW,
    names::URL_TITLE,
    names::S_EXPIRES,
];

/// Returns every article field name the editor reads, including the
/// date sub-fields and one entry per active custom field.
#[must_use]
pub fn article_vars(custom_fields: impl IntoIterator<Item = u8>) -> Vec<String> {
    BASE_VARS
        .iter()
        .chain(names::POSTED_PARTS.iter())
        .chain(names::EXPIRES_PARTS.iter())
        .map(|s| (*s).to_string())
        .chain(custom_fields.into_iter().map(names::custom))
        .collect()
}

/// A set of submitted form fields.
///
/// Missing fields read as the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    /// Creates an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a field set from name/value pairs.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Sets a field, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Removes a field.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }

    /// Returns a field's value, or `""` when missing.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map_or("", String::as_str)
    }

    /// Returns a field's value when present.
    #[must_use]
    pub fn get_opt(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns true when the field is present and non-empty.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        !self.get(name).is_empty()
    }

    /// Returns true when the field is a checked checkbox.
    #[must_use]
    pub fn is_checked(&self, name: &str) -> bool {
        matches!(self.get(name), "1" | "true" | "on")
    }

    /// Parses a field as an integer.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).trim().parse().ok()
    }

    /// Keeps only the listed field names.
    #[must_use]
    pub fn retain_names(&self, allowed: &[String]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(k, _)| allowed.iter().any(|a| a == *k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    /// Iterates over all fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for FormFields {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_read_empty() {
        let fields = FormFields::new().with("Title", "Hello");
        assert_eq!(fields.get("Title"), "Hello");
        assert_eq!(fields.get("Body"), "");
        assert!(fields.get_opt("Body").is_none());
        assert!(!fields.is_set("Body"));
    }

    #[test]
    fn test_checkbox_and_numbers() {
        let fields = FormFields::from_pairs([("publish_now", "1"), ("ID", " 12 "), ("x", "abc")]);
        assert!(fields.is_checked("publish_now"));
        assert!(!fields.is_checked("reset_time"));
        assert_eq!(fields.get_i64("ID"), Some(12));
        assert_eq!(fields.get_i64("x"), None);
    }

    #[test]
    fn test_article_vars_includes_custom_fields() {
        let vars = article_vars([1, 3]);
        assert!(vars.contains(&"Title".to_string()));
        assert!(vars.contains(&"exp_second".to_string()));
        assert!(vars.contains(&"custom_1".to_string()));
        assert!(vars.contains(&"custom_3".to_string()));
        assert!(!vars.contains(&"custom_2".to_string()));
    }

    #[test]
    fn test_retain_names() {
        let fields = FormFields::from_pairs([("Title", "a"), ("evil", "b")]);
        let kept = fields.retain_names(&article_vars([]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.get("Title"), "a");
    }
}
