//! `weblogUpdates.ping` over XML-RPC.

use super::{PublishNotice, PublishNotifier};
use crate::config::Preferences;
use crate::errors::NotifyError;
use crate::utils::escape_html;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Pings every configured endpoint concurrently.
#[derive(Debug, Clone)]
pub struct XmlRpcPinger {
    endpoints: Vec<String>,
    client: Client,
}

impl XmlRpcPinger {
    /// Creates a pinger for `endpoints`.
    #[must_use]
    pub fn new(endpoints: Vec<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { endpoints, client }
    }

    /// Creates a pinger for the site's configured endpoints.
    #[must_use]
    pub fn from_prefs(prefs: &Preferences) -> Self {
        Self::new(prefs.ping_endpoints.clone())
    }

    /// The endpoints pinged on each notice.
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Builds the XML-RPC request body.
    #[must_use]
    pub fn request_body(notice: &PublishNotice) -> String {
        format!(
            "<?xml version=\"1.0\"?>\
             <methodCall><methodName>weblogUpdates.ping</methodName><params>\
             <param><value><string>{}</string></value></param>\
             <param><value><string>{}</string></value></param>\
             </params></methodCall>",
            escape_html(&notice.site_name),
            escape_html(&notice.site_url)
        )
    }

    async fn ping(&self, endpoint: &str, body: String) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "text/xml")
            .body(body)
            .send()
            .await
            .map_err(|e| NotifyError::new(endpoint, e.to_string()))?;
        if !response.status().is_success() {
            return Err(NotifyError::new(endpoint, response.status().to_string()));
        }
        debug!(endpoint, "Ping delivered");
        Ok(())
    }
}

#[async_trait]
impl PublishNotifier for XmlRpcPinger {
    async fn notify(&self, notice: &PublishNotice) -> Result<(), NotifyError> {
        let body = Self::request_body(notice);
        let results = join_all(
            self.endpoints
                .iter()
                .map(|endpoint| self.ping(endpoint, body.clone())),
        )
        .await;

        let mut first_error = None;
        for err in results.into_iter().filter_map(Result::err) {
            warn!(endpoint = %err.endpoint, reason = %err.reason, "Ping failed");
            first_error.get_or_insert(err);
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_escapes_values() {
        let notice = PublishNotice {
            site_name: "Tom & Jerry".into(),
            site_url: "https://example.com/".into(),
            article_id: 3,
        };
        let body = XmlRpcPinger::request_body(&notice);
        assert!(body.contains("<methodName>weblogUpdates.ping</methodName>"));
        assert!(body.contains("<string>Tom &amp; Jerry</string>"));
        assert!(body.contains("<string>https://example.com/</string>"));
    }

    #[test]
    fn test_from_prefs_uses_configured_endpoints() {
        let prefs = Preferences::default()
            .with_ping_endpoint("http://rpc.pingomatic.com/")
            .with_ping_endpoint("http://rpc.example/");
        let pinger = XmlRpcPinger::from_prefs(&prefs);
        assert_eq!(
            pinger.endpoints(),
            ["http://rpc.pingomatic.com/", "http://rpc.example/"]
        );
        assert!(XmlRpcPinger::from_prefs(&Preferences::default())
            .endpoints()
            .is_empty());
    }

    #[tokio::test]
    async fn test_no_endpoints_is_ok() {
        let pinger = XmlRpcPinger::new(Vec::new());
        let notice = PublishNotice {
            site_name: "s".into(),
            site_url: "u".into(),
            article_id: 1,
        };
        assert!(pinger.notify(&notice).await.is_ok());
    }
}
