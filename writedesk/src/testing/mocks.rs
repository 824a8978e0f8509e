//! Hand-written collaborators for editor tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::NotifyError;
use crate::notify::{PublishNotice, PublishNotifier};

/// A notifier that records every notice it is given.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<PublishNotice>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The notices received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<PublishNotice> {
        self.notices.lock().clone()
    }

    /// Number of notices received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.notices.lock().len()
    }
}

#[async_trait]
impl PublishNotifier for RecordingNotifier {
    async fn notify(&self, notice: &PublishNotice) -> Result<(), NotifyError> {
        self.notices.lock().push(notice.clone());
        Ok(())
    }
}

/// A notifier whose endpoint is always unreachable.
#[derive(Debug, Clone)]
pub struct FailingNotifier {
    endpoint: String,
}

impl FailingNotifier {
    /// Creates a notifier failing for `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PublishNotifier for FailingNotifier {
    async fn notify(&self, _notice: &PublishNotice) -> Result<(), NotifyError> {
        Err(NotifyError::new(&self.endpoint, "connection refused"))
    }
}
