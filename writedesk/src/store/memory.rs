//! In-process article store.

use super::{ArticleStore, Catalog, Fingerprint, Neighbour, RecentArticle};
use crate::core::Article;
use crate::errors::PersistenceError;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

/// Articles held in memory, keyed by id.
///
/// The compare-and-write in [`ArticleStore::update`] happens under one
/// write lock, so two saves racing on the same fingerprint cannot both land.
pub struct InMemoryArticleStore {
    articles: RwLock<BTreeMap<i64, Article>>,
    next_id: AtomicI64,
    catalog: RwLock<Catalog>,
    pane_prefs: DashMap<(String, String), bool>,
    site_last_modified: AtomicI64,
    fail_writes: AtomicBool,
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl InMemoryArticleStore {
    /// Creates an empty store with the given catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            articles: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            catalog: RwLock::new(catalog),
            pane_prefs: DashMap::new(),
            site_last_modified: AtomicI64::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Stores an article as-is, keeping its id. Used to seed fixtures.
    pub fn seed(&self, article: Article) {
        let id = article.id;
        self.articles.write().insert(id, article);
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
    }

    /// Makes every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns a snapshot of a stored article.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<Article> {
        self.articles.read().get(&id).cloned()
    }

    /// Number of stored articles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.articles.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.articles.read().is_empty()
    }

    /// The site-wide last-modified marker; zero if never touched.
    #[must_use]
    pub fn site_last_modified(&self) -> i64 {
        self.site_last_modified.load(Ordering::SeqCst)
    }

    /// A stored pane preference.
    #[must_use]
    pub fn pane_visibility(&self, user: &str, pref: &str) -> Option<bool> {
        self.pane_prefs
            .get(&(user.to_string(), pref.to_string()))
            .map(|v| *v)
    }

    fn check_writable(&self, operation: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::new(operation, "writes disabled"));
        }
        Ok(())
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn fetch(&self, id: i64) -> Result<Option<Article>, PersistenceError> {
        Ok(self.get(id))
    }

    async fn insert(&self, mut article: Article) -> Result<i64, PersistenceError> {
        self.check_writable("insert")?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        article.id = id;
        self.articles.write().insert(id, article);
        Ok(id)
    }

    async fn update(
        &self,
        article: &Article,
        expected_last_modified: i64,
    ) -> Result<bool, PersistenceError> {
        self.check_writable("update")?;
        let mut articles = self.articles.write();
        let Some(stored) = articles.get_mut(&article.id) else {
            return Err(PersistenceError::new(
                "update",
                format!("article {} does not exist", article.id),
            ));
        };
        if stored.last_modified != expected_last_modified {
            return Ok(false);
        }
        *stored = article.clone();
        Ok(true)
    }

    async fn fingerprint(&self, id: i64) -> Result<Option<Fingerprint>, PersistenceError> {
        Ok(self.articles.read().get(&id).map(|a| Fingerprint {
            last_modified: a.last_modified,
            last_modified_by: a.last_modified_by.clone(),
        }))
    }

    async fn count_url_title(&self, url_title: &str) -> Result<usize, PersistenceError> {
        Ok(self
            .articles
            .read()
            .values()
            .filter(|a| a.url_title == url_title)
            .count())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RecentArticle>, PersistenceError> {
        let articles = self.articles.read();
        let mut rows: Vec<&Article> = articles.values().collect();
        rows.sort_by(|a, b| b.last_modified.cmp(&a.last_modified).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|a| RecentArticle {
                id: a.id,
                title: a.title.clone(),
            })
            .collect())
    }

    async fn neighbour(
        &self,
        posted: i64,
        direction: Neighbour,
    ) -> Result<Option<i64>, PersistenceError> {
        let articles = self.articles.read();
        let found = match direction {
            Neighbour::Prev => articles
                .values()
                .filter(|a| a.posted < posted)
                .max_by_key(|a| (a.posted, a.id)),
            Neighbour::Next => articles
                .values()
                .filter(|a| a.posted > posted)
                .min_by_key(|a| (a.posted, a.id)),
        };
        Ok(found.map(|a| a.id))
    }

    async fn catalog(&self) -> Result<Catalog, PersistenceError> {
        Ok(self.catalog.read().clone())
    }

    async fn touch_site(&self, at: i64) -> Result<(), PersistenceError> {
        self.check_writable("touch_site")?;
        self.site_last_modified.store(at, Ordering::SeqCst);
        Ok(())
    }

    async fn set_pane_visibility(
        &self,
        user: &str,
        pref: &str,
        visible: bool,
    ) -> Result<(), PersistenceError> {
        self.check_writable("set_pane_visibility")?;
        self.pane_prefs
            .insert((user.to_string(), pref.to_string()), visible);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(posted: i64, last_modified: i64, url_title: &str) -> Article {
        Article {
            posted,
            last_modified,
            url_title: url_title.to_string(),
            ..Article::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = InMemoryArticleStore::default();
        let a = store.insert(article(10, 10, "a")).await.unwrap();
        let b = store.insert(article(20, 20, "b")).await.unwrap();
        assert_eq!((a, b), (1, 2));
        assert_eq!(store.fetch(2).await.unwrap().unwrap().url_title, "b");
    }

    #[tokio::test]
    async fn test_update_compares_fingerprint() {
        let store = InMemoryArticleStore::default();
        let id = store.insert(article(10, 100, "a")).await.unwrap();

        let mut edited = store.get(id).unwrap();
        edited.title = "first".to_string();
        edited.last_modified = 200;
        assert!(store.update(&edited, 100).await.unwrap());

        let mut stale = store.get(id).unwrap();
        stale.title = "second".to_string();
        stale.last_modified = 300;
        assert!(!store.update(&stale, 100).await.unwrap());
        assert_eq!(store.get(id).unwrap().title, "first");
    }

    #[tokio::test]
    async fn test_update_missing_article_fails() {
        let store = InMemoryArticleStore::default();
        let ghost = Article {
            id: 99,
            ..Article::default()
        };
        assert!(store.update(&ghost, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let store = InMemoryArticleStore::default();
        store.fail_writes(true);
        let err = store.insert(Article::default()).await.unwrap_err();
        assert_eq!(err.operation, "insert");
    }

    #[tokio::test]
    async fn test_recent_and_neighbours() {
        let store = InMemoryArticleStore::default();
        let first = store.insert(article(100, 500, "a")).await.unwrap();
        store.insert(article(200, 300, "b")).await.unwrap();
        let third = store.insert(article(300, 400, "b")).await.unwrap();

        let recent: Vec<i64> = store.recent(2).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(recent, vec![first, third]);

        assert_eq!(store.neighbour(200, Neighbour::Prev).await.unwrap(), Some(first));
        assert_eq!(store.neighbour(200, Neighbour::Next).await.unwrap(), Some(third));
        assert_eq!(store.neighbour(300, Neighbour::Next).await.unwrap(), None);
        assert_eq!(store.count_url_title("b").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_pane_prefs_and_site_marker() {
        let store = InMemoryArticleStore::default();
        store
            .set_pane_visibility("ann", "pane_article_meta_visible", false)
            .await
            .unwrap();
        store.touch_site(42).await.unwrap();

        assert_eq!(store.pane_visibility("ann", "pane_article_meta_visible"), Some(false));
        assert_eq!(store.site_last_modified(), 42);
    }
}
