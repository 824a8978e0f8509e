//! The article editor: step dispatch, save protocol and view assembly.
//!
//! One [`ArticleEditor`] is built at startup and shared by every request.
//! [`ArticleEditor::handle`] resolves the step, checks the form token,
//! runs the post or save protocol when asked to, and always ends by
//! rendering the editor, either as a full page or as a patch script.

mod draft;
mod edit;
mod lifecycle;
mod normalize;
mod page;
mod pane;
mod regions;


pub use draft::{DraftState, DRAFT_VERSION, MAX_DRAFT_BYTES};
pub use normalize::{derive_url_title, should_rederive_url_title};
pub use page::EditorLayout;
pub use pane::{xml_envelope, PANES};
pub use regions::{default_regions, wrap_region};

use crate::callbacks::CallbackRegistry;
use crate::config::Preferences;
use crate::core::{FormFields, Message, Principal, Privilege, Step};
use crate::errors::{AuthorizationError, ConfigurationError, WriteDeskError};
use crate::events::{EventSink, NoOpEventSink};
use crate::guard::ConcurrencyGuard;
use crate::i18n::{EnglishLocalizer, Localizer};
use crate::notify::{NoOpNotifier, PublishNotifier};
use crate::observability::{request_span, SpanTimer};
use crate::partials::{DocumentLayout, PartialRenderer, PatchScript};
use crate::security::Bouncer;
use crate::store::ArticleStore;
use crate::textfilter::TextFilterSet;
use crate::utils::{Clock, SystemClock};
use crate::validator::Validator;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, Instrument};

/// One submitted request.
#[derive(Debug, Clone)]
pub struct EditorRequest {
    /// The logged-in user.
    pub principal: Principal,
    /// Submitted form fields.
    pub fields: FormFields,
    /// Set for asynchronous round-trips that expect a patch script.
    pub is_async: bool,
}

impl EditorRequest {
    /// Creates a full-page request.
    #[must_use]
    pub fn new(principal: Principal, fields: FormFields) -> Self {
        Self {
            principal,
            fields,
            is_async: false,
        }
    }

    /// Marks the request as an asynchronous round-trip.
    #[must_use]
    pub fn asynchronous(mut self) -> Self {
        self.is_async = true;
        self
    }
}

/// What the editor answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorResponse {
    /// A complete HTML document.
    Page(String),
    /// DOM updates for an asynchronous round-trip.
    Patch(PatchScript),
    /// A pane-state status envelope.
    Xml(String),
}

impl EditorResponse {
    /// The response body as sent to the client.
    #[must_use]
    pub fn body(&self) -> String {
        match self {
            Self::Page(html) => html.clone(),
            Self::Patch(script) => script.to_javascript(),
            Self::Xml(xml) => xml.clone(),
        }
    }
}

/// Result of a post or save attempt, carried into the edit view.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outcome {
    /// Feedback for the user.
    pub message: Message,
    /// Id of the article that was written.
    pub saved_id: Option<i64>,
    /// Set when a concurrent edit was detected.
    pub concurrent: bool,
}

impl Outcome {
    fn failed(message: Message) -> Self {
        Self {
            message,
            ..Self::default()
        }
    }
}

/// The article editor.
pub struct ArticleEditor {
    store: Arc<dyn ArticleStore>,
    callbacks: Arc<CallbackRegistry>,
    validator: Arc<Validator>,
    filters: Arc<TextFilterSet>,
    prefs: Arc<Preferences>,
    clock: Arc<dyn Clock>,
    guard: ConcurrencyGuard,
    notifier: Arc<dyn PublishNotifier>,
    events: Arc<dyn EventSink>,
    l10n: Arc<dyn Localizer>,
    layout: Arc<dyn DocumentLayout>,
    bouncer: Bouncer,
    renderer: PartialRenderer,
}

impl fmt::Debug for ArticleEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleEditor")
            .field("callbacks", &self.callbacks.len())
            .field("filters", &self.filters)
            .field("production_status", &self.prefs.production_status)
            .finish_non_exhaustive()
    }
}

impl ArticleEditor {
    /// Starts building an editor over `store`.
    #[must_use]
    pub fn builder(store: Arc<dyn ArticleStore>) -> ArticleEditorBuilder {
        ArticleEditorBuilder::new(store)
    }

    /// Site preferences in use.
    #[must_use]
    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    /// Handles one request.
    ///
    /// # Errors
    ///
    /// Fails without side effects when the principal may not use the
    /// editor, the step is unknown or the form token is wrong. Configuration
    /// errors, storage read failures and tampered drafts abort the request.
    /// Validation failures, conflicts and failed writes are not errors; they
    /// come back as a message inside the rendered editor.
    pub async fn handle(&self, request: &EditorRequest) -> Result<EditorResponse, WriteDeskError> {
        let principal = &request.principal;
        if !principal.has(Privilege::Article) {
            info!(user = %principal.name, "Editor access denied");
            return Err(AuthorizationError::new(&principal.name, Privilege::Article.as_str()).into());
        }

        let step = Step::resolve(&request.fields).map_err(WriteDeskError::UnknownStep)?;
        self.bouncer
            .check(step, &request.fields, principal, &self.prefs.blog_uid)?;

        let span = request_span(
            step.as_str(),
            &principal.name,
            request.fields.get_i64(crate::core::names::ID),
        );
        async move {
            let timer = SpanTimer::start(step.as_str());
            let response = self.dispatch(request, step).await;
            debug!(elapsed_ms = timer.finish(), ok = response.is_ok(), "Request handled");
            response
        }
        .instrument(span)
        .await
    }

    /// Runs the step, then renders the editor.
    async fn dispatch(
        &self,
        request: &EditorRequest,
        step: Step,
    ) -> Result<EditorResponse, WriteDeskError> {
        match step {
            Step::Create | Step::Edit => self.edit(request, step, Outcome::default()).await,
            Step::Publish => {
                let outcome = self.post(request).await?;
                self.edit(request, step, outcome).await
            }
            Step::Save => {
                let outcome = self.save(request).await?;
                self.edit(request, step, outcome).await
            }
            Step::SavePaneState => self.save_pane_state(request).await,
        }
    }
}

/// Builder for [`ArticleEditor`].
pub struct ArticleEditorBuilder {
    store: Arc<dyn ArticleStore>,
    callbacks: Arc<CallbackRegistry>,
    validator: Arc<Validator>,
    filters: Arc<TextFilterSet>,
    prefs: Preferences,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn PublishNotifier>,
    events: Arc<dyn EventSink>,
    l10n: Arc<dyn Localizer>,
    layout: Arc<dyn DocumentLayout>,
}

impl fmt::Debug for ArticleEditorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleEditorBuilder")
            .field("prefs", &self.prefs)
            .finish_non_exhaustive()
    }
}

impl ArticleEditorBuilder {
    /// Creates a builder with default collaborators.
    #[must_use]
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self {
            store,
            callbacks: Arc::new(CallbackRegistry::new()),
            validator: Arc::new(Validator::new()),
            filters: Arc::new(TextFilterSet::new()),
            prefs: Preferences::default(),
            clock: Arc::new(SystemClock),
            notifier: Arc::new(NoOpNotifier),
            events: Arc::new(NoOpEventSink),
            l10n: Arc::new(EnglishLocalizer::new()),
            layout: Arc::new(EditorLayout),
        }
    }

    /// Sets the callback registry.
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: CallbackRegistry) -> Self {
        self.callbacks = Arc::new(callbacks);
        self
    }

    /// Sets the validator and its named constraint kinds.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Sets the text filters.
    #[must_use]
    pub fn with_filters(mut self, filters: TextFilterSet) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    /// Sets the site preferences.
    #[must_use]
    pub fn with_prefs(mut self, prefs: Preferences) -> Self {
        self.prefs = prefs;
        self
    }

    /// Sets the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the publish notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn PublishNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets the audit event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the message table.
    #[must_use]
    pub fn with_localizer(mut self, l10n: Arc<dyn Localizer>) -> Self {
        self.l10n = l10n;
        self
    }

    /// Sets the page layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Arc<dyn DocumentLayout>) -> Self {
        self.layout = layout;
        self
    }

    /// Builds the editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences are inconsistent or the default
    /// text filter is not registered.
    pub fn build(self) -> Result<ArticleEditor, WriteDeskError> {
        self.prefs.validate()?;
        if !self.filters.has(&self.prefs.use_textile) {
            return Err(ConfigurationError::Preferences(format!(
                "default text filter '{}' is not registered",
                self.prefs.use_textile
            ))
            .into());
        }
        Ok(ArticleEditor {
            guard: ConcurrencyGuard::new(Arc::clone(&self.clock)),
            store: self.store,
            callbacks: self.callbacks,
            validator: self.validator,
            filters: self.filters,
            prefs: Arc::new(self.prefs),
            clock: self.clock,
            notifier: self.notifier,
            events: self.events,
            l10n: self.l10n,
            layout: self.layout,
            bouncer: Bouncer::new(),
            renderer: PartialRenderer::new(),
        })
    }
}
