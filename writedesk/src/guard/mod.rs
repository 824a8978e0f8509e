//! Optimistic concurrency check for article updates.
//!
//! The client echoes the `last_modified` value it saw when the form was
//! rendered. A save is allowed only if that fingerprint still matches the
//! stored one; the write itself repeats the comparison (see
//! [`ArticleStore::update`]), so no lock is ever held between requests.

use crate::core::{Article, ArticleStatus, Principal, Privilege};
use crate::errors::{PersistenceError, WriteDeskError};
use crate::store::ArticleStore;
use crate::utils::Clock;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of [`ConcurrencyGuard::check_and_lock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The update may proceed and must stamp `fingerprint`.
    Allowed {
        /// The stored record as it was checked.
        current: Box<Article>,
        /// The new `last_modified` to write.
        fingerprint: i64,
    },
    /// Someone else saved since the client loaded the form.
    Conflict {
        /// Who made the intervening change.
        modified_by: String,
        /// The stored fingerprint.
        current_fingerprint: i64,
    },
    /// The principal may not edit this article.
    Denied {
        /// The privilege that would have allowed the edit.
        privilege: Privilege,
    },
}

/// Returns true if `principal` may update an article in its stored state.
///
/// The check runs against the stored status and author so that a crafted
/// status or author in the request cannot widen access.
#[must_use]
pub fn may_edit(principal: &Principal, stored: &Article) -> bool {
    may_edit_as(principal, stored.status, &stored.author_id)
}

/// [`may_edit`] for an article known only by status and author.
#[must_use]
pub fn may_edit_as(principal: &Principal, status: ArticleStatus, author_id: &str) -> bool {
    let own = author_id == principal.name;
    if status.is_public() {
        principal.has(Privilege::EditPublished) || (own && principal.has(Privilege::EditOwnPublished))
    } else {
        principal.has(Privilege::Edit) || (own && principal.has(Privilege::EditOwn))
    }
}

/// Compares client fingerprints with stored ones.
#[derive(Clone)]
pub struct ConcurrencyGuard {
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ConcurrencyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrencyGuard").finish_non_exhaustive()
    }
}

impl ConcurrencyGuard {
    /// Creates a guard stamping fingerprints from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// The fingerprint a successful write should stamp.
    ///
    /// Always strictly greater than `previous`, so two writes within the
    /// same second still yield distinct fingerprints.
    #[must_use]
    pub fn next_fingerprint(&self, previous: i64) -> i64 {
        self.clock.now().max(previous + 1)
    }

    /// Checks privilege and fingerprint for an update of `id`.
    pub async fn check_and_lock(
        &self,
        store: &dyn ArticleStore,
        id: i64,
        principal: &Principal,
        client_fingerprint: Option<i64>,
    ) -> Result<GuardOutcome, WriteDeskError> {
        let current = store
            .fetch(id)
            .await?
            .ok_or_else(|| WriteDeskError::not_found(id))?;

        if !may_edit(principal, &current) {
            let privilege = if current.status.is_public() {
                Privilege::EditPublished
            } else {
                Privilege::Edit
            };
            info!(article_id = id, user = %principal.name, %privilege, "Edit denied");
            return Ok(GuardOutcome::Denied { privilege });
        }

        if client_fingerprint != Some(current.last_modified) {
            debug!(
                article_id = id,
                client = ?client_fingerprint,
                stored = current.last_modified,
                "Fingerprint mismatch"
            );
            return Ok(GuardOutcome::Conflict {
                modified_by: current.last_modified_by.clone(),
                current_fingerprint: current.last_modified,
            });
        }

        let fingerprint = self.next_fingerprint(current.last_modified);
        Ok(GuardOutcome::Allowed {
            current: Box::new(current),
            fingerprint,
        })
    }

    /// Re-reads who modified `id` after a write lost the race.
    pub async fn conflict_after_write(
        &self,
        store: &dyn ArticleStore,
        id: i64,
    ) -> Result<GuardOutcome, PersistenceError> {
        let fp = store.fingerprint(id).await?;
        Ok(match fp {
            Some(fp) => GuardOutcome::Conflict {
                modified_by: fp.last_modified_by,
                current_fingerprint: fp.last_modified,
            },
            None => GuardOutcome::Conflict {
                modified_by: String::new(),
                current_fingerprint: 0,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArticleStatus;
    use crate::store::InMemoryArticleStore;
    use crate::utils::ManualClock;

    fn stored(status: ArticleStatus, author: &str) -> Article {
        Article {
            id: 1,
            status,
            author_id: author.to_string(),
            last_modified: 1000,
            last_modified_by: "bob".to_string(),
            ..Article::default()
        }
    }

    fn guard(now: i64) -> ConcurrencyGuard {
        ConcurrencyGuard::new(Arc::new(ManualClock::new(now)))
    }

    #[test]
    fn test_privilege_matrix() {
        let own_writer = Principal::new("ann").with_privilege(Privilege::EditOwn);
        let editor = Principal::new("eve").with_privilege(Privilege::Edit);
        let own_pub = Principal::new("ann").with_privilege(Privilege::EditOwnPublished);

        assert!(may_edit(&own_writer, &stored(ArticleStatus::Draft, "ann")));
        assert!(!may_edit(&own_writer, &stored(ArticleStatus::Draft, "bob")));
        assert!(!may_edit(&own_writer, &stored(ArticleStatus::Live, "ann")));
        assert!(may_edit(&editor, &stored(ArticleStatus::Pending, "bob")));
        assert!(!may_edit(&editor, &stored(ArticleStatus::Sticky, "bob")));
        assert!(may_edit(&own_pub, &stored(ArticleStatus::Live, "ann")));
    }

    #[tokio::test]
    async fn test_allowed_when_fingerprint_matches() {
        let store = InMemoryArticleStore::default();
        store.seed(stored(ArticleStatus::Draft, "ann"));
        let ann = Principal::new("ann").with_privilege(Privilege::EditOwn);

        let outcome = guard(5000)
            .check_and_lock(&store, 1, &ann, Some(1000))
            .await
            .unwrap();
        match outcome {
            GuardOutcome::Allowed { fingerprint, .. } => assert_eq!(fingerprint, 5000),
            other => panic!("expected Allowed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_conflict_names_last_modifier() {
        let store = InMemoryArticleStore::default();
        store.seed(stored(ArticleStatus::Draft, "ann"));
        let ann = Principal::publisher("ann");

        let outcome = guard(5000)
            .check_and_lock(&store, 1, &ann, Some(999))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            GuardOutcome::Conflict {
                modified_by: "bob".to_string(),
                current_fingerprint: 1000,
            }
        );
    }

    #[tokio::test]
    async fn test_denied_uses_stored_status() {
        let store = InMemoryArticleStore::default();
        store.seed(stored(ArticleStatus::Live, "ann"));
        let ann = Principal::new("ann").with_privilege(Privilege::EditOwn);

        let outcome = guard(5000)
            .check_and_lock(&store, 1, &ann, Some(1000))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            GuardOutcome::Denied {
                privilege: Privilege::EditPublished
            }
        );
    }

    #[tokio::test]
    async fn test_missing_article() {
        let store = InMemoryArticleStore::default();
        let err = guard(0)
            .check_and_lock(&store, 7, &Principal::publisher("a"), Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, WriteDeskError::NotFound { id: 7 }));
    }

    #[test]
    fn test_fingerprint_strictly_increases() {
        let g = guard(100);
        assert_eq!(g.next_fingerprint(50), 100);
        assert_eq!(g.next_fingerprint(100), 101);
        assert_eq!(g.next_fingerprint(500), 501);
    }
}
