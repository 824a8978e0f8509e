//! The per-request state region producers read.

use crate::callbacks::CallbackRegistry;
use crate::config::Preferences;
use crate::core::{FormFields, Principal, Step};
use crate::i18n::Localizer;
use crate::store::{Catalog, RecentArticle};
use crate::textfilter::TextFilterSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which rendering of the article body the editor shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Editable form.
    #[default]
    Text,
    /// Generated HTML source.
    Html,
    /// Rendered preview.
    Preview,
}

impl View {
    /// Every view, in tab order.
    pub const ALL: [Self; 3] = [Self::Text, Self::Html, Self::Preview];

    /// The wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Html => "html",
            Self::Preview => "preview",
        }
    }

    /// Parses a wire name; unknown or empty names are `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "html" => Some(Self::Html),
            "preview" => Some(Self::Preview),
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article fields merged with request flags, computed once per render.
///
/// `fields` is keyed by form field name and always carries the echoed
/// timestamps `sPosted`, `sLastMod` and `sExpires` as decimal strings
/// (empty when unset).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Field values.
    pub fields: FormFields,
    /// Rendered body HTML.
    pub body_html: String,
    /// Rendered excerpt HTML.
    pub excerpt_html: String,
    /// The step being rendered.
    pub step: Option<Step>,
    /// The view shown.
    pub view: View,
    /// Closest earlier article.
    pub prev_id: Option<i64>,
    /// Closest later article.
    pub next_id: Option<i64>,
    /// Set when re-rendering after a concurrent-edit conflict.
    pub concurrent: bool,
    /// Encoded draft to carry through a view switch.
    pub draft: Option<String>,
}

impl ViewState {
    /// Returns a field value, empty when missing.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.fields.get(name)
    }

    /// Returns a field parsed as an integer.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.fields.get_i64(name)
    }

    /// Returns true when rendering the blank form for a new article.
    #[must_use]
    pub fn is_create(&self) -> bool {
        matches!(self.step, None | Some(Step::Create))
    }
}

/// Shared, read-only collaborators available to every producer.
#[derive(Clone, Copy)]
pub struct RenderEnv<'a> {
    /// Site preferences.
    pub prefs: &'a Preferences,
    /// Existing sections, categories and forms.
    pub catalog: &'a Catalog,
    /// Registered text filters.
    pub filters: &'a TextFilterSet,
    /// Plugin callbacks, for UI overrides.
    pub callbacks: &'a CallbackRegistry,
    /// Message lookup.
    pub l10n: &'a dyn Localizer,
    /// The acting user.
    pub principal: &'a Principal,
    /// Recently modified articles.
    pub recent: &'a [RecentArticle],
    /// Server time of the request.
    pub now: i64,
}

impl fmt::Debug for RenderEnv<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderEnv")
            .field("principal", &self.principal.name)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

impl RenderEnv<'_> {
    /// Localized text.
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.l10n.text(key, &[])
    }

    /// Runs `default` through the `article_ui` hook for `element`.
    #[must_use]
    pub fn pluggable_ui(&self, element: &str, default: &str, state: &ViewState) -> String {
        self.callbacks
            .pluggable_ui("article_ui", element, default, Some(&state.fields))
    }
}
