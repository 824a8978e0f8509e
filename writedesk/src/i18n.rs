//! Message lookup for editor feedback and labels.
//!
//! Translations are an external concern; the editor only needs a
//! [`Localizer`] that maps a key plus placeholder values to display text.
//! [`EnglishLocalizer`] ships the default table.

use std::collections::HashMap;

/// Maps message keys to localized text.
pub trait Localizer: Send + Sync {
    /// Returns the text for `key`, or `None` when the key is unknown.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Returns the text for `key` with `{name}` placeholders substituted.
    ///
    /// Unknown keys are returned verbatim so that missing translations stay
    /// visible instead of disappearing.
    fn text(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.lookup(key).unwrap_or_else(|| key.to_string());
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

const ENGLISH: &[(&str, &str)] = &[
    ("article_posted", "Article posted."),
    ("article_saved_pending", "Article saved as Pending."),
    ("article_saved_hidden", "Article saved as Hidden."),
    ("article_saved_draft", "Article saved as Draft."),
    ("article_save_failed", "Article could not be saved."),
    ("article_expires_before_postdate", "Article expires before post date."),
    ("invalid_postdate", "Invalid post date."),
    ("invalid_expirydate", "Invalid expiry date."),
    ("concurrent_edit_by", "Article has been modified by {author} while you were editing it. Review and save again."),
    ("not_authorized", "You are not allowed to edit this article."),
    ("url_title_is_blank", "URL-only title is blank."),
    ("url_title_is_multiple", "Same URL-only title is used by {count} different articles."),
    ("invalid_status", "Invalid status."),
    ("unknown_choice", "Unknown choice."),
    ("unknown_section", "Unknown section."),
    ("unknown_category", "Unknown category."),
    ("unknown_form", "Unknown form."),
    ("unknown_textfilter", "Unknown text filter."),
    ("invalid_textfilter_body", "Invalid text filter for body."),
    ("invalid_textfilter_excerpt", "Invalid text filter for excerpt."),
    ("should_be_blank", "Value should be blank."),
    ("should_be_false", "Value should be off."),
    ("excerpt_not_blank", "Excerpts are disabled; excerpt must be blank."),
    ("invite_not_blank", "Comments are disabled; invitation must be blank."),
    ("comments_are_on", "Comments are disabled; comments must be off."),
    ("override_form_not_blank", "Form override is disabled; override form must be blank."),
    ("write", "Write"),
    ("title", "Title"),
    ("body", "Body"),
    ("excerpt", "Excerpt"),
    ("keywords", "Keywords"),
    ("url_title", "URL-only title"),
    ("article_image", "Article image"),
    ("article_markup", "Article markup"),
    ("excerpt_markup", "Excerpt markup"),
    ("override_default_form", "Override form"),
    ("section", "Section"),
    ("category1", "Category 1"),
    ("category2", "Category 2"),
    ("sort_display", "Sort and display"),
    ("status", "Status"),
    ("draft", "Draft"),
    ("hidden", "Hidden"),
    ("pending", "Pending"),
    ("live", "Live"),
    ("sticky", "Sticky"),
    ("comment_invitation", "Invitation"),
    ("comments_on", "On"),
    ("comments_off", "Off"),
    ("expired", "Expired"),
    ("timestamp", "Date and time"),
    ("date", "Date"),
    ("time", "Time"),
    ("set_to_now", "Set timestamp to now"),
    ("or_publish_at", "or publish at"),
    ("published_at", "Published at"),
    ("reset_time", "Reset time to now"),
    ("expires", "Expires"),
    ("posted_by", "Posted by"),
    ("modified_by", "Modified by"),
    ("prev", "Previous"),
    ("next", "Next"),
    ("view", "View"),
    ("text", "Text"),
    ("html", "HTML"),
    ("preview", "Preview"),
    ("view_text", "Edit text"),
    ("view_html", "View HTML"),
    ("view_preview", "Preview article"),
    ("untitled", "Untitled"),
    ("recent_articles", "Recent articles"),
    ("textfilter_help", "Text filter help"),
    ("custom", "Custom fields"),
    ("meta", "Meta"),
    ("advanced_options", "Advanced options"),
    ("date_settings", "Date settings"),
    ("comment_settings", "Comment settings"),
    ("create_new", "Create new"),
    ("publish", "Publish"),
    ("save", "Save"),
];

/// The built-in English message table.
#[derive(Debug, Clone)]
pub struct EnglishLocalizer {
    table: HashMap<&'static str, &'static str>,
}

impl EnglishLocalizer {
    /// Creates the English table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: ENGLISH.iter().copied().collect(),
        }
    }
}

impl Default for EnglishLocalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer for EnglishLocalizer {
    fn lookup(&self, key: &str) -> Option<String> {
        self.table.get(key).map(|s| (*s).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_substitution() {
        let l10n = EnglishLocalizer::new();
        assert_eq!(
            l10n.text("url_title_is_multiple", &[("count", "3")]),
            "Same URL-only title is used by 3 different articles."
        );
    }

    #[test]
    fn test_unknown_key_is_echoed() {
        let l10n = EnglishLocalizer::new();
        assert_eq!(l10n.text("no_such_key", &[]), "no_such_key");
    }

    #[test]
    fn test_expiry_message_wording() {
        let l10n = EnglishLocalizer::new();
        assert!(l10n
            .text("article_expires_before_postdate", &[])
            .contains("expires before post date"));
    }
}
