//! Lifecycle audit events.
//!
//! The editor reports every decision that changes or refuses to change an
//! article to an [`EventSink`]. Plugins observe the same moments through
//! the callback registry; sinks are for operators.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use serde_json::{json, Value};

/// Names of the audit events the editor emits.
pub mod kinds {
    /// A new article was inserted.
    pub const ARTICLE_POSTED: &str = "article.posted";
    /// An existing article was updated.
    pub const ARTICLE_SAVED: &str = "article.saved";
    /// A save lost the race against another writer.
    pub const ARTICLE_CONFLICT: &str = "article.conflict";
    /// Validation refused the submission.
    pub const ARTICLE_REJECTED: &str = "article.rejected";
    /// Storage failed the write.
    pub const ARTICLE_SAVE_FAILED: &str = "article.save_failed";
    /// The principal may not edit the article.
    pub const ARTICLE_DENIED: &str = "article.denied";
    /// A pane visibility preference was stored.
    pub const PANE_SAVED: &str = "pane.saved";
}

/// Builds the payload shared by article events.
#[must_use]
pub fn article_payload(article_id: i64, user: &str, step: &str) -> Value {
    json!({
        "article_id": article_id,
        "user": user,
        "step": step,
    })
}
