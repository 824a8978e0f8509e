//! Persistence boundary for articles and the lookups the editor needs.
//!
//! The database layer is an external collaborator. [`ArticleStore`] is the
//! seam; [`InMemoryArticleStore`] backs tests and embedding.

mod memory;

pub use memory::InMemoryArticleStore;

use crate::core::Article;
use crate::errors::PersistenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Names of the rows that article fields reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Section names.
    pub sections: Vec<String>,
    /// Article category names.
    pub categories: Vec<String>,
    /// Article form names other than the default.
    pub article_forms: Vec<String>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds sections.
    #[must_use]
    pub fn with_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.extend(sections.into_iter().map(Into::into));
        self
    }

    /// Adds categories.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Adds article forms.
    #[must_use]
    pub fn with_article_forms<I, S>(mut self, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.article_forms.extend(forms.into_iter().map(Into::into));
        self
    }

    /// Returns true if the section exists.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s == name)
    }

    /// Returns true if the category exists.
    #[must_use]
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// Returns true if the article form exists.
    #[must_use]
    pub fn has_article_form(&self, name: &str) -> bool {
        self.article_forms.iter().any(|f| f == name)
    }
}

/// An entry of the recent-articles list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentArticle {
    /// Article id.
    pub id: i64,
    /// Plain title; may be empty.
    pub title: String,
}

/// Direction of a neighbour lookup by posting time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighbour {
    /// The closest article posted earlier.
    Prev,
    /// The closest article posted later.
    Next,
}

/// Fingerprint of a stored article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// The stored last-modified time.
    pub last_modified: i64,
    /// Who made that modification.
    pub last_modified_by: String,
}

/// Storage operations used by the editor.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Fetches an article by id.
    async fn fetch(&self, id: i64) -> Result<Option<Article>, PersistenceError>;

    /// Inserts a new article and returns its assigned id. The `id` of the
    /// argument is ignored.
    async fn insert(&self, article: Article) -> Result<i64, PersistenceError>;

    /// Overwrites an article if its stored `last_modified` still equals
    /// `expected_last_modified`. Returns false, writing nothing, when it
    /// does not.
    async fn update(
        &self,
        article: &Article,
        expected_last_modified: i64,
    ) -> Result<bool, PersistenceError>;

    /// Reads just the fingerprint of an article.
    async fn fingerprint(&self, id: i64) -> Result<Option<Fingerprint>, PersistenceError>;

    /// Counts articles using a URL title.
    async fn count_url_title(&self, url_title: &str) -> Result<usize, PersistenceError>;

    /// Lists the most recently modified articles.
    async fn recent(&self, limit: usize) -> Result<Vec<RecentArticle>, PersistenceError>;

    /// Finds the neighbouring article by posting time.
    async fn neighbour(
        &self,
        posted: i64,
        direction: Neighbour,
    ) -> Result<Option<i64>, PersistenceError>;

    /// Loads the referenced-row catalog.
    async fn catalog(&self) -> Result<Catalog, PersistenceError>;

    /// Updates the site-wide last-modified marker.
    async fn touch_site(&self, at: i64) -> Result<(), PersistenceError>;

    /// Stores a per-user pane visibility preference.
    async fn set_pane_visibility(
        &self,
        user: &str,
        pref: &str,
        visible: bool,
    ) -> Result<(), PersistenceError>;
}
