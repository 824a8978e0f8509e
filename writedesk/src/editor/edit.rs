//! Assembling the view state and rendering the editor.

use super::draft::DraftState;
use super::normalize::article_fields;
use super::regions::default_regions;
use super::{ArticleEditor, EditorRequest, EditorResponse, Outcome};
use crate::callbacks::{CallbackArgs, ExtensionData, Phase};
use crate::core::{article_vars, names, ArticleStatus, FormFields, Step};
use crate::errors::WriteDeskError;
use crate::partials::{RenderEnv, View, ViewState};
use crate::store::{Catalog, Neighbour};
use crate::utils::{compose_timestamp, compose_timestamp_with_defaults};
use tracing::debug;

/// Where the view state comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Stored(i64),
    Draft,
    Submitted,
}

impl ArticleEditor {
    /// Renders the editor after `step` produced `outcome`.
    pub(super) async fn edit(
        &self,
        request: &EditorRequest,
        step: Step,
        outcome: Outcome,
    ) -> Result<EditorResponse, WriteDeskError> {
        let incoming = &request.fields;
        let attempted_write = matches!(step, Step::Publish | Step::Save);

        let view = if attempted_write {
            View::Text
        } else {
            View::parse(incoming.get(names::VIEW)).unwrap_or_default()
        };
        let from_view = View::parse(incoming.get(names::FROM_VIEW));
        let from_draft = matches!(from_view, Some(View::Preview | View::Html));

        let (render_step, id) = match (outcome.saved_id, step) {
            (Some(id), _) => (Step::Edit, Some(id)),
            (None, Step::Publish | Step::Create) => (Step::Create, None),
            (None, _) => (Step::Edit, incoming.get_i64(names::ID)),
        };

        let source = match id {
            Some(id) if outcome.saved_id.is_some() => Source::Stored(id),
            Some(id)
                if render_step == Step::Edit
                    && view == View::Text
                    && !from_draft
                    && !outcome.concurrent
                    && !attempted_write =>
            {
                Source::Stored(id)
            }
            _ if from_draft => Source::Draft,
            _ => Source::Submitted,
        };
        debug!(step = %render_step, %view, ?source, "Assembling view state");

        let vars = article_vars(self.prefs.active_custom_fields());
        let catalog = self.store.catalog().await?;
        let mut state = ViewState {
            step: Some(render_step),
            view,
            concurrent: outcome.concurrent,
            ..ViewState::default()
        };

        if let Source::Stored(id) = source {
            let article = self
                .store
                .fetch(id)
                .await?
                .ok_or_else(|| WriteDeskError::not_found(id))?;
            state.fields = article_fields(&article);
            state.body_html = article.body_html;
            state.excerpt_html = article.excerpt_html;
        } else {
            let mut fields = if source == Source::Draft {
                DraftState::decode(incoming.get(names::STORE), &vars, &self.prefs.blog_uid)?
                    .into_fields()
            } else {
                incoming.retain_names(&vars)
            };
            if outcome.concurrent {
                if let Some(id) = id {
                    if let Some(fp) = self.store.fingerprint(id).await? {
                        fields.set(names::S_LAST_MOD, fp.last_modified.to_string());
                    }
                }
            }
            if render_step == Step::Create {
                self.apply_create_defaults(&mut fields);
            }
            self.complete_submitted(&mut fields);

            state.body_html = self
                .filters
                .filter(fields.get(names::BODY_FILTER), fields.get(names::BODY));
            state.excerpt_html = self
                .filters
                .filter(fields.get(names::EXCERPT_FILTER), fields.get(names::EXCERPT));
            state.draft = Some(
                DraftState::capture(&fields, &vars, &self.prefs.blog_uid)?.encode()?,
            );
            state.fields = fields;
        }

        if !catalog.has_section(state.get(names::SECTION)) {
            state
                .fields
                .set(names::SECTION, self.prefs.default_section.clone());
        }

        if render_step != Step::Create {
            if let Some(posted) = state.get_i64(names::S_POSTED) {
                state.prev_id = self.store.neighbour(posted, Neighbour::Prev).await?;
                state.next_id = self.store.neighbour(posted, Neighbour::Next).await?;
            }
        }

        self.render(request, &state, &catalog, outcome).await
    }

    /// Fills the fields of a blank form from preferences, then lets
    /// `article_ui` / `defaults` handlers amend them.
    fn apply_create_defaults(&self, fields: &mut FormFields) {
        let prefs = &self.prefs;
        let defaults = [
            (names::STATUS, ArticleStatus::Live.code().to_string()),
            (names::BODY_FILTER, prefs.use_textile.clone()),
            (names::EXCERPT_FILTER, prefs.use_textile.clone()),
            (names::SECTION, prefs.default_section.clone()),
            (
                names::ANNOTATE,
                if prefs.comments_on_default { "1" } else { "0" }.to_string(),
            ),
            (names::ANNOTATE_INVITE, prefs.comments_default_invite.clone()),
        ];
        for (name, value) in defaults {
            if !fields.is_set(name) {
                fields.set(name, value);
            }
        }
        self.callbacks.dispatch_ref(
            &CallbackArgs::new("article_ui", "defaults"),
            Phase::After,
            &mut ExtensionData::UiDefaults(fields),
        );
    }

    /// Repairs filter ids and recomputes the echoed timestamps from the
    /// date sub-fields of a submission.
    fn complete_submitted(&self, fields: &mut FormFields) {
        for name in [names::BODY_FILTER, names::EXCERPT_FILTER] {
            if !self.filters.has(fields.get(name)) {
                fields.set(name, self.prefs.use_textile.clone());
            }
        }

        let offset = self.prefs.gmt_offset_seconds;
        if !fields.get(names::EXPIRES_PARTS[0]).trim().is_empty() {
            let expires = compose_timestamp_with_defaults(
                names::EXPIRES_PARTS,
                names::EXPIRES_PARTS.map(|n| fields.get(n)),
                offset,
            );
            if let Ok(ts) = expires {
                fields.set(names::S_EXPIRES, ts.to_string());
            }
        }
        if !fields.get(names::POSTED_PARTS[0]).trim().is_empty() {
            let posted = compose_timestamp(
                names::POSTED_PARTS,
                names::POSTED_PARTS.map(|n| fields.get(n)),
                offset,
            );
            if let Ok(ts) = posted {
                fields.set(names::S_POSTED, ts.to_string());
            }
        }
    }

    async fn render(
        &self,
        request: &EditorRequest,
        state: &ViewState,
        catalog: &Catalog,
        outcome: Outcome,
    ) -> Result<EditorResponse, WriteDeskError> {
        let mut regions = default_regions(&self.prefs);
        self.callbacks.dispatch_ref(
            &CallbackArgs::new("article_ui", "partials_meta").with_fields(&state.fields),
            Phase::After,
            &mut ExtensionData::Regions(&mut regions),
        );

        let recent = self.store.recent(self.prefs.recent_articles_count).await?;
        let env = RenderEnv {
            prefs: &self.prefs,
            catalog,
            filters: &self.filters,
            callbacks: &self.callbacks,
            l10n: self.l10n.as_ref(),
            principal: &request.principal,
            recent: &recent,
            now: self.clock.now(),
        };

        if request.is_async {
            let script = self
                .renderer
                .refresh(&regions, state, &env, outcome.message)?;
            Ok(EditorResponse::Patch(script))
        } else {
            let page = self.renderer.page(
                self.layout.as_ref(),
                &regions,
                state,
                &env,
                &outcome.message,
            )?;
            Ok(EditorResponse::Page(page))
        }
    }
}
