//! Test fixtures for editor scenarios.

use std::sync::Arc;

use crate::config::{Preferences, ProductionStatus};
use crate::core::{names, Article, ArticleStatus, FormFields, Principal, Privilege};
use crate::editor::{ArticleEditor, ArticleEditorBuilder};
use crate::errors::WriteDeskError;
use crate::events::CollectingEventSink;
use crate::security::form_token;
use crate::store::{Catalog, InMemoryArticleStore};
use crate::utils::{ManualClock, Timestamp};

/// 2024-06-15 12:00:00 UTC, the time every fixture clock starts at.
pub const FIXTURE_NOW: Timestamp = 1_718_452_800;

/// Secret the fixture site signs form tokens with.
pub const FIXTURE_BLOG_UID: &str = "fixture-blog-uid";

/// The catalog fixtures start with.
#[must_use]
pub fn fixture_catalog() -> Catalog {
    Catalog::new()
        .with_sections(["articles", "about"])
        .with_categories(["news", "tech"])
        .with_article_forms(["default", "lofi"])
}

/// A writer allowed to edit only their own articles.
#[must_use]
pub fn author(name: &str) -> Principal {
    Principal::new(name)
        .with_privileges([Privilege::Article, Privilege::EditOwn, Privilege::EditOwnPublished])
        .with_nonce(format!("nonce-{name}"))
}

/// A principal holding every privilege.
#[must_use]
pub fn publisher(name: &str) -> Principal {
    Principal::publisher(name).with_nonce(format!("nonce-{name}"))
}

/// A stored article owned by `author_id`, last modified an hour ago.
#[must_use]
pub fn sample_article(id: i64, author_id: &str, status: ArticleStatus) -> Article {
    let posted = FIXTURE_NOW - 3_600;
    Article {
        id,
        title: format!("Sample {id}"),
        title_html: format!("Sample {id}"),
        body: "Stored body".into(),
        body_html: "<p>Stored body</p>".into(),
        body_filter: "2".into(),
        excerpt_filter: "2".into(),
        status,
        section: "articles".into(),
        url_title: format!("sample-{id}"),
        posted,
        last_modified: posted,
        feed_time: posted - posted.rem_euclid(86_400),
        author_id: author_id.into(),
        last_modified_by: author_id.into(),
        uid: format!("uid{id}"),
        ..Article::default()
    }
}

/// Fields of a complete new-article submission posted at [`FIXTURE_NOW`].
#[must_use]
pub fn post_fields(title: &str, body: &str) -> FormFields {
    FormFields::new()
        .with(names::TITLE, title)
        .with(names::BODY, body)
        .with(names::STATUS, "4")
        .with(names::SECTION, "articles")
        .with(names::BODY_FILTER, "2")
        .with(names::EXCERPT_FILTER, "2")
        .with("year", "2024")
        .with("month", "06")
        .with("day", "15")
        .with("hour", "12")
        .with("minute", "00")
        .with("second", "00")
        .with(names::PUBLISH, "Publish")
}

/// Fields that save `article` unchanged apart from the given overrides.
#[must_use]
pub fn save_fields(article: &Article) -> FormFields {
    FormFields::new()
        .with(names::ID, article.id.to_string())
        .with(names::TITLE, article.title.as_str())
        .with(names::BODY, article.body.as_str())
        .with(names::STATUS, article.status.code().to_string())
        .with(names::SECTION, article.section.as_str())
        .with(names::BODY_FILTER, article.body_filter.as_str())
        .with(names::EXCERPT_FILTER, article.excerpt_filter.as_str())
        .with(names::URL_TITLE, article.url_title.as_str())
        .with(names::S_POSTED, article.posted.to_string())
        .with(names::S_LAST_MOD, article.last_modified.to_string())
        .with(names::AUTHOR_ID, article.author_id.as_str())
        .with(names::SAVE, "Save")
        .with("year", "2024")
        .with("month", "06")
        .with("day", "15")
        .with("hour", "11")
        .with("minute", "00")
        .with("second", "00")
}

/// A store, clock and event sink wired to one editor.
pub struct EditorFixture {
    /// Backing store.
    pub store: Arc<InMemoryArticleStore>,
    /// Clock shared with the editor.
    pub clock: Arc<ManualClock>,
    /// Collected audit events.
    pub events: Arc<CollectingEventSink>,
    /// Site preferences.
    pub prefs: Preferences,
}

impl Default for EditorFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorFixture {
    /// Creates a fixture over [`fixture_catalog`] on a live site.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryArticleStore::new(fixture_catalog())),
            clock: Arc::new(ManualClock::new(FIXTURE_NOW)),
            events: Arc::new(CollectingEventSink::new()),
            prefs: Preferences::default()
                .with_blog_uid(FIXTURE_BLOG_UID)
                .with_production_status(ProductionStatus::Live),
        }
    }

    /// Replaces the preferences, keeping the fixture secret.
    #[must_use]
    pub fn with_prefs(mut self, prefs: Preferences) -> Self {
        self.prefs = prefs.with_blog_uid(FIXTURE_BLOG_UID);
        self
    }

    /// Stores `article` and returns its id.
    pub fn seed(&self, article: Article) -> i64 {
        let id = article.id;
        self.store.seed(article);
        id
    }

    /// A builder with the fixture's store, clock, events and preferences.
    #[must_use]
    pub fn builder(&self) -> ArticleEditorBuilder {
        ArticleEditor::builder(self.store.clone())
            .with_clock(self.clock.clone())
            .with_events(self.events.clone())
            .with_prefs(self.prefs.clone())
    }

    /// Builds the editor with default collaborators.
    pub fn editor(&self) -> Result<ArticleEditor, WriteDeskError> {
        self.builder().build()
    }

    /// `fields` with a valid form token for `principal`.
    #[must_use]
    pub fn signed(&self, principal: &Principal, fields: FormFields) -> FormFields {
        fields.with(
            names::TOKEN,
            form_token(&principal.nonce, &self.prefs.blog_uid),
        )
    }
}
