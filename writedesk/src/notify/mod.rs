//! Notifications sent when an article becomes public.

#[cfg(feature = "ping")]
mod xmlrpc;

#[cfg(feature = "ping")]
pub use xmlrpc::XmlRpcPinger;

use crate::errors::NotifyError;
use async_trait::async_trait;

/// What a notifier announces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishNotice {
    /// Site name.
    pub site_name: String,
    /// Site URL.
    pub site_url: String,
    /// The article that went public.
    pub article_id: i64,
}

/// Sends update pings to external services.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PublishNotifier: Send + Sync {
    /// Announces that the site has new public content.
    async fn notify(&self, notice: &PublishNotice) -> Result<(), NotifyError>;
}

/// A notifier that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl PublishNotifier for NoOpNotifier {
    async fn notify(&self, _notice: &PublishNotice) -> Result<(), NotifyError> {
        Ok(())
    }
}
