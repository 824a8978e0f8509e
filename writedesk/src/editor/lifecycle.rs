//! The post and save protocols.

use super::normalize::{
    candidate, derive_url_title, expires_from_fields, posted_from_fields,
    should_rederive_url_title,
};
use super::{ArticleEditor, EditorRequest, Outcome};
use crate::callbacks::{CallbackArgs, Phase};
use crate::core::{names, Article, ArticleStatus, FormFields, Message, Principal, Privilege};
use crate::errors::{PersistenceError, WriteDeskError};
use crate::events::{article_payload, kinds};
use crate::guard::GuardOutcome;
use crate::notify::PublishNotice;
use crate::validator::{Constraint, ConstraintKind, ConstraintSet, ValidationContext, Verdict};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Post and expiry times resolved from a submission.
struct Times {
    posted: i64,
    expires: Option<i64>,
}

/// Status messages by status; the rest read "posted".
fn status_key(status: ArticleStatus) -> &'static str {
    match status {
        ArticleStatus::Pending => "article_saved_pending",
        ArticleStatus::Hidden => "article_saved_hidden",
        ArticleStatus::Draft => "article_saved_draft",
        ArticleStatus::Live | ArticleStatus::Sticky => "article_posted",
    }
}

/// Start of the UTC day containing `ts`.
fn feed_day(ts: i64) -> i64 {
    ts - ts.rem_euclid(86_400)
}

/// Downgrades a public status the principal may not set.
fn allowed_status(requested: ArticleStatus, principal: &Principal) -> ArticleStatus {
    if requested.is_public() && !principal.has(Privilege::Publish) {
        ArticleStatus::Pending
    } else {
        requested
    }
}

impl ArticleEditor {
    /// Resolves post and expiry times, or the message explaining why not.
    fn resolve_times(&self, fields: &FormFields, toggle: &str) -> Result<Times, Message> {
        let posted = if fields.is_checked(toggle) {
            self.clock.now()
        } else {
            posted_from_fields(fields, &self.prefs)
                .ok_or_else(|| Message::error(self.l10n.text("invalid_postdate", &[])))?
        };
        let expires = expires_from_fields(fields, &self.prefs)
            .map_err(|()| Message::error(self.l10n.text("invalid_expirydate", &[])))?;
        if let Some(expires) = expires {
            if expires <= posted {
                return Err(Message::error(
                    self.l10n.text("article_expires_before_postdate", &[]),
                ));
            }
        }
        Ok(Times { posted, expires })
    }

    /// The built-in constraint set for a submission.
    fn constraints(&self, fields: &FormFields) -> ConstraintSet {
        let prefs = &self.prefs;
        let mut set = ConstraintSet::new();
        let statuses = ArticleStatus::ALL
            .iter()
            .map(|s| s.code().to_string())
            .collect();
        set.insert(
            names::STATUS,
            Constraint::new(fields.get(names::STATUS), ConstraintKind::Choice(statuses))
                .with_message("invalid_status"),
        );
        set.insert(
            names::SECTION,
            Constraint::new(fields.get(names::SECTION), ConstraintKind::Section),
        );
        for name in [names::CATEGORY1, names::CATEGORY2] {
            set.insert(name, Constraint::new(fields.get(name), ConstraintKind::Category));
        }
        set.insert(
            names::BODY_FILTER,
            Constraint::new(fields.get(names::BODY_FILTER), ConstraintKind::TextFilter)
                .with_message("invalid_textfilter_body"),
        );
        set.insert(
            names::EXCERPT_FILTER,
            Constraint::new(fields.get(names::EXCERPT_FILTER), ConstraintKind::TextFilter)
                .with_message("invalid_textfilter_excerpt"),
        );
        if !prefs.articles_use_excerpts {
            set.insert(
                "excerpt_blank",
                Constraint::new(fields.get(names::EXCERPT), ConstraintKind::Blank)
                    .with_message("excerpt_not_blank"),
            );
        }
        if !prefs.use_comments {
            set.insert(
                "annotate_invite_blank",
                Constraint::new(fields.get(names::ANNOTATE_INVITE), ConstraintKind::Blank)
                    .with_message("invite_not_blank"),
            );
            set.insert(
                "annotate_false",
                Constraint::new(fields.get(names::ANNOTATE), ConstraintKind::False)
                    .with_message("comments_are_on"),
            );
        }
        let override_form = fields.get(names::OVERRIDE_FORM).trim();
        let override_constraint = if prefs.allow_form_override {
            Constraint::new(override_form, ConstraintKind::Form)
        } else {
            Constraint::new(override_form, ConstraintKind::Blank)
                .with_message("override_form_not_blank")
        };
        set.insert(names::OVERRIDE_FORM, override_constraint);
        set
    }

    async fn validate(&self, step: &str, fields: &FormFields) -> Result<Verdict, WriteDeskError> {
        let catalog = self.store.catalog().await?;
        let ctx = ValidationContext {
            catalog: &catalog,
            filters: &self.filters,
        };
        Ok(self.validator.validate_step(
            step,
            self.constraints(fields),
            fields,
            &self.callbacks,
            &ctx,
            self.l10n.as_ref(),
        )?)
    }

    /// Warns about a blank or shared URL title.
    async fn check_url_title(&self, url_title: &str) -> Result<Option<String>, WriteDeskError> {
        if url_title.is_empty() {
            return Ok(Some(self.l10n.text("url_title_is_blank", &[])));
        }
        let count = self.store.count_url_title(url_title).await?;
        if count > 1 {
            let count = count.to_string();
            return Ok(Some(
                self.l10n.text("url_title_is_multiple", &[("count", &count)]),
            ));
        }
        Ok(None)
    }

    fn status_message(&self, status: ArticleStatus, url_warning: Option<String>) -> Message {
        let text = self.l10n.text(status_key(status), &[]);
        match url_warning {
            Some(warning) => Message::warning(format!("{text} {warning}")),
            None => Message::success(text),
        }
    }

    async fn save_failed(&self, id: i64, user: &str, step: &str, err: &PersistenceError) -> Outcome {
        warn!(article_id = id, error = %err, "Article write failed");
        self.events
            .emit(kinds::ARTICLE_SAVE_FAILED, Some(article_payload(id, user, step)))
            .await;
        Outcome::failed(Message::error(self.l10n.text("article_save_failed", &[])))
    }

    /// Announces new public content when running live.
    async fn ping(&self, article_id: i64) {
        if !self.prefs.production_status.is_live() {
            debug!(article_id, "Skipping pings outside production");
            return;
        }
        self.callbacks
            .dispatch(&CallbackArgs::new("ping", ""), Phase::After);
        let notice = PublishNotice {
            site_name: self.prefs.site_name.clone(),
            site_url: self.prefs.site_url.clone(),
            article_id,
        };
        if let Err(err) = self.notifier.notify(&notice).await {
            warn!(article_id, error = %err, "Publish notification failed");
        }
    }

    /// Moves the site last-modified marker; a failure only costs caches.
    async fn touch_site(&self) {
        if let Err(err) = self.store.touch_site(self.clock.now()).await {
            warn!(error = %err, "Could not update site last-modified marker");
        }
    }

    /// Inserts a new article.
    pub(super) async fn post(&self, request: &EditorRequest) -> Result<Outcome, WriteDeskError> {
        let fields = &request.fields;
        let user = request.principal.name.as_str();

        if [names::TITLE, names::BODY, names::EXCERPT]
            .iter()
            .all(|n| fields.get(n).trim().is_empty())
        {
            debug!("Nothing to post");
            return Ok(Outcome::default());
        }

        let times = match self.resolve_times(fields, names::PUBLISH_NOW) {
            Ok(times) => times,
            Err(message) => return Ok(Outcome::failed(message)),
        };

        let now = self.clock.now();
        let mut article = Article {
            posted: times.posted,
            expires: times.expires,
            last_modified: times.posted.min(now),
            feed_time: feed_day(times.posted),
            author_id: user.to_string(),
            last_modified_by: user.to_string(),
            uid: Uuid::new_v4().simple().to_string(),
            ..candidate(fields, &self.prefs, &self.filters)
        };
        article.status = allowed_status(article.status, &request.principal);
        if article.url_title.is_empty() {
            article.url_title = derive_url_title(&self.callbacks, &self.prefs, &article.title);
        }

        let verdict = self.validate("publish", fields).await?;
        if !verdict.is_valid() {
            info!(user, failed = ?verdict.failed, "Post rejected");
            self.events
                .emit(kinds::ARTICLE_REJECTED, Some(article_payload(0, user, "publish")))
                .await;
            return Ok(Outcome::failed(Message::error(verdict.message)));
        }

        let status = article.status;
        let url_title = article.url_title.clone();
        let id = match self.store.insert(article).await {
            Ok(id) => id,
            Err(err) => return Ok(self.save_failed(0, user, "publish", &err).await),
        };
        info!(article_id = id, user, %status, "Article posted");

        if status.is_public() {
            self.ping(id).await;
            self.touch_site().await;
        }

        let mut posted_fields = fields.clone();
        posted_fields.set(names::ID, id.to_string());
        self.callbacks.dispatch(
            &CallbackArgs::new("article_posted", "").with_fields(&posted_fields),
            Phase::After,
        );
        self.events
            .emit(kinds::ARTICLE_POSTED, Some(article_payload(id, user, "publish")))
            .await;

        let warning = self.check_url_title(&url_title).await?;
        Ok(Outcome {
            message: self.status_message(status, warning),
            saved_id: Some(id),
            concurrent: false,
        })
    }

    fn conflict(&self, modified_by: &str) -> Outcome {
        Outcome {
            message: Message::warning(
                self.l10n
                    .text("concurrent_edit_by", &[("author", modified_by)]),
            ),
            saved_id: None,
            concurrent: true,
        }
    }

    /// Updates an existing article under the fingerprint check.
    pub(super) async fn save(&self, request: &EditorRequest) -> Result<Outcome, WriteDeskError> {
        let fields = &request.fields;
        let principal = &request.principal;
        let user = principal.name.as_str();
        let id = fields
            .get_i64(names::ID)
            .ok_or_else(|| WriteDeskError::not_found(0))?;

        let outcome = self
            .guard
            .check_and_lock(self.store.as_ref(), id, principal, fields.get_i64(names::S_LAST_MOD))
            .await?;
        let (stored, fingerprint) = match outcome {
            GuardOutcome::Allowed {
                current,
                fingerprint,
            } => (current, fingerprint),
            GuardOutcome::Conflict { modified_by, .. } => {
                info!(article_id = id, user, %modified_by, "Concurrent edit detected");
                self.events
                    .emit(kinds::ARTICLE_CONFLICT, Some(article_payload(id, user, "save")))
                    .await;
                return Ok(self.conflict(&modified_by));
            }
            GuardOutcome::Denied { privilege } => {
                self.events
                    .emit(kinds::ARTICLE_DENIED, Some(article_payload(id, user, "save")))
                    .await;
                debug!(article_id = id, %privilege, "Save denied");
                return Ok(Outcome::failed(Message::error(
                    self.l10n.text("not_authorized", &[]),
                )));
            }
        };

        let times = match self.resolve_times(fields, names::RESET_TIME) {
            Ok(times) => times,
            Err(message) => return Ok(Outcome::failed(message)),
        };

        let mut article = Article {
            id,
            posted: times.posted,
            expires: times.expires,
            last_modified: fingerprint,
            feed_time: feed_day(times.posted),
            author_id: stored.author_id.clone(),
            last_modified_by: user.to_string(),
            uid: stored.uid.clone(),
            ..candidate(fields, &self.prefs, &self.filters)
        };
        article.status = allowed_status(article.status, principal);

        let derived_from_stored = derive_url_title(&self.callbacks, &self.prefs, &stored.title);
        if should_rederive_url_title(
            &article.url_title,
            &article.title,
            &stored,
            &derived_from_stored,
        ) {
            article.url_title = derive_url_title(&self.callbacks, &self.prefs, &article.title);
        }

        let verdict = self.validate("save", fields).await?;
        if !verdict.is_valid() {
            info!(article_id = id, user, failed = ?verdict.failed, "Save rejected");
            self.events
                .emit(kinds::ARTICLE_REJECTED, Some(article_payload(id, user, "save")))
                .await;
            return Ok(Outcome::failed(Message::error(verdict.message)));
        }

        match self.store.update(&article, stored.last_modified).await {
            Ok(true) => {}
            Ok(false) => {
                let lost = self
                    .guard
                    .conflict_after_write(self.store.as_ref(), id)
                    .await?;
                let modified_by = match lost {
                    GuardOutcome::Conflict { modified_by, .. } => modified_by,
                    _ => String::new(),
                };
                info!(article_id = id, user, %modified_by, "Save lost the race");
                self.events
                    .emit(kinds::ARTICLE_CONFLICT, Some(article_payload(id, user, "save")))
                    .await;
                return Ok(self.conflict(&modified_by));
            }
            Err(err) => return Ok(self.save_failed(id, user, "save", &err).await),
        }
        info!(article_id = id, user, status = %article.status, "Article saved");

        let was_public = stored.status.is_public();
        let is_public = article.status.is_public();
        if !was_public && is_public {
            self.ping(id).await;
        }
        if was_public || is_public {
            self.touch_site().await;
        }

        self.callbacks.dispatch(
            &CallbackArgs::new("article_saved", "").with_fields(fields),
            Phase::After,
        );
        self.events
            .emit(kinds::ARTICLE_SAVED, Some(article_payload(id, user, "save")))
            .await;

        let warning = self.check_url_title(&article.url_title).await?;
        Ok(Outcome {
            message: self.status_message(article.status, warning),
            saved_id: Some(id),
            concurrent: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_keys() {
        assert_eq!(status_key(ArticleStatus::Draft), "article_saved_draft");
        assert_eq!(status_key(ArticleStatus::Sticky), "article_posted");
    }

    #[test]
    fn test_feed_day() {
        assert_eq!(feed_day(1_704_067_200 + 3_600), 1_704_067_200);
    }

    #[test]
    fn test_allowed_status() {
        let writer = Principal::new("w");
        assert_eq!(allowed_status(ArticleStatus::Live, &writer), ArticleStatus::Pending);
        assert_eq!(allowed_status(ArticleStatus::Draft, &writer), ArticleStatus::Draft);
        let publisher = Principal::publisher("p");
        assert_eq!(allowed_status(ArticleStatus::Sticky, &publisher), ArticleStatus::Sticky);
    }
}
