//! Testing utilities for the article editor.
//!
//! This module provides:
//! - A fixture wiring store, clock and event sink to an editor
//! - Assertions over rendered responses and audit events
//! - Recording and failing notifiers

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_event_count, assert_message, assert_no_events, assert_page, assert_patch,
};
pub use fixtures::{
    author, fixture_catalog, post_fields, publisher, sample_article, save_fields,
    EditorFixture, FIXTURE_BLOG_UID, FIXTURE_NOW,
};
pub use mocks::{FailingNotifier, RecordingNotifier};
