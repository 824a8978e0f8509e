//! # Writedesk
//!
//! The article editor of a content-management admin panel.
//!
//! Writedesk takes submitted form fields and drives one article through
//! its lifecycle:
//!
//! - **Step dispatch**: create, publish, edit, save and pane-state steps behind a form token
//! - **Validation**: named constraints over sections, categories, filters and forms
//! - **Concurrency guard**: fingerprint checks so a stale save never overwrites newer work
//! - **Partial rendering**: full pages or patch scripts built from one region table
//! - **Extension points**: callbacks that replace UI fragments, defaults and URL slugs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use writedesk::prelude::*;
//!
//! let store = Arc::new(InMemoryArticleStore::new(Catalog::new().with_sections(["articles"])));
//! let editor = ArticleEditor::builder(store)
//!     .with_prefs(Preferences::from_file("site.json")?)
//!     .build()?;
//!
//! let response = editor.handle(&EditorRequest::new(principal, fields)).await?;
//! println!("{}", response.body());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod callbacks;
pub mod config;
pub mod core;
pub mod editor;
pub mod errors;
pub mod events;
pub mod guard;
pub mod i18n;
pub mod notify;
pub mod observability;
pub mod partials;
pub mod security;
pub mod store;
pub mod testing;
pub mod textfilter;
pub mod utils;
pub mod validator;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::callbacks::{CallbackArgs, CallbackRegistry, ExtensionData, Handler, Phase};
    pub use crate::config::{Preferences, ProductionStatus};
    pub use crate::core::{
        Article, ArticleStatus, FormFields, Message, Principal, Privilege, Severity, Step,
    };
    pub use crate::editor::{ArticleEditor, ArticleEditorBuilder, EditorRequest, EditorResponse};
    pub use crate::errors::{WriteDeskError, ConfigurationError, PersistenceError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::guard::{ConcurrencyGuard, GuardOutcome};
    pub use crate::i18n::{EnglishLocalizer, Localizer};
    pub use crate::notify::{NoOpNotifier, PublishNotifier};
    pub use crate::partials::{PartialRenderer, PatchScript, View};
    pub use crate::store::{ArticleStore, Catalog, InMemoryArticleStore};
    pub use crate::textfilter::TextFilterSet;
    pub use crate::utils::{Clock, SystemClock, Timestamp};
    pub use crate::validator::{Constraint, ConstraintKind, ConstraintSet, Validator};
    pub use std::sync::Arc;
}
