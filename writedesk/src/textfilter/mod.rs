//! Pluggable text filters that turn raw article text into HTML.
//!
//! The markup engine proper is an external collaborator; this module holds
//! the registry the editor consults plus two built-in filters.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Id of the filter that leaves text untouched.
pub const LEAVE_TEXT_UNTOUCHED: &str = "0";
/// Id conventionally used by an external rich-markup filter.
pub const USE_TEXTILE: &str = "1";
/// Id of the filter that converts line breaks.
pub const CONVERT_LINEBREAKS: &str = "2";

/// A text-to-HTML conversion.
pub trait TextFilter: Send + Sync {
    /// The id stored with the article.
    fn id(&self) -> &str;

    /// The display name.
    fn title(&self) -> &str;

    /// Converts raw text to HTML.
    fn filter(&self, text: &str) -> String;

    /// Markup help shown next to the editor; empty when there is none.
    fn help(&self) -> String {
        String::new()
    }
}

/// Passes text through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFilter;

impl TextFilter for RawFilter {
    fn id(&self) -> &str {
        LEAVE_TEXT_UNTOUCHED
    }

    fn title(&self) -> &str {
        "Leave text untouched"
    }

    fn filter(&self, text: &str) -> String {
        text.trim().to_string()
    }
}

/// Inserts `<br />` before every line break.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBreakFilter;

impl TextFilter for LineBreakFilter {
    fn id(&self) -> &str {
        CONVERT_LINEBREAKS
    }

    fn title(&self) -> &str {
        "Convert line breaks"
    }

    fn filter(&self, text: &str) -> String {
        let trimmed = text.trim();
        let mut out = String::with_capacity(trimmed.len() + 16);
        let mut chars = trimmed.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                    out.push_str("<br />\r\n");
                }
                '\r' | '\n' => {
                    out.push_str("<br />");
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
        out
    }

    fn help(&self) -> String {
        "<ul class=\"plain-list\"><li>Line breaks become &lt;br /&gt;.</li></ul>".to_string()
    }
}

/// The registered text filters, in registration order.
#[derive(Clone)]
pub struct TextFilterSet {
    filters: HashMap<String, Arc<dyn TextFilter>>,
    order: Vec<String>,
}

impl fmt::Debug for TextFilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFilterSet")
            .field("filters", &self.order)
            .finish()
    }
}

impl Default for TextFilterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFilterSet {
    /// Creates a set with the built-in filters.
    #[must_use]
    pub fn new() -> Self {
        let mut set = Self::empty();
        set.register(Arc::new(RawFilter));
        set.register(Arc::new(LineBreakFilter));
        set
    }

    /// Creates a set with no filters.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers a filter, replacing any filter with the same id.
    pub fn register(&mut self, filter: Arc<dyn TextFilter>) {
        let id = filter.id().to_string();
        if self.filters.insert(id.clone(), filter).is_none() {
            self.order.push(id);
        }
    }

    /// Returns true when a filter with this id is registered.
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.filters.contains_key(id)
    }

    /// Looks up a filter.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn TextFilter>> {
        self.filters.get(id).cloned()
    }

    /// Runs the filter `id` over `text`. Text under an unknown id is
    /// returned unchanged.
    #[must_use]
    pub fn filter(&self, id: &str, text: &str) -> String {
        self.filters
            .get(id)
            .map_or_else(|| text.to_string(), |f| f.filter(text))
    }

    /// Markup help for the filter `id`.
    #[must_use]
    pub fn help(&self, id: &str) -> String {
        self.filters.get(id).map(|f| f.help()).unwrap_or_default()
    }

    /// `(id, title)` pairs in registration order.
    #[must_use]
    pub fn options(&self) -> Vec<(String, String)> {
        self.order
            .iter()
            .filter_map(|id| {
                self.filters
                    .get(id)
                    .map(|f| (id.clone(), f.title().to_string()))
            })
            .collect()
    }

    /// Registered ids in registration order.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }
}
