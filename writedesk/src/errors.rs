//! Error types for the writedesk editor.
//!
//! Validation failures and concurrent-edit conflicts are *not* errors: they
//! are ordinary outcomes folded into the next rendered view. The types here
//! cover the conditions that abort a request or that are caught at a call
//! site and converted into a user message.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for writedesk operations.
#[derive(Debug, Error)]
pub enum WriteDeskError {
    /// A programming or plugin defect was detected.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A storage operation failed.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// The acting principal lacks a required privilege.
    #[error("{0}")]
    Authorization(#[from] AuthorizationError),

    /// The request failed the CSRF check and was terminated.
    #[error("{0}")]
    Csrf(#[from] CsrfError),

    /// A client-echoed draft blob was rejected.
    #[error("{0}")]
    Draft(#[from] DraftError),

    /// A region producer failed while rendering.
    #[error("{0}")]
    Render(#[from] RenderError),

    /// The requested article does not exist.
    #[error("Article not found: {id}")]
    NotFound {
        /// The requested article id.
        id: i64,
    },

    /// The requested step is not known to the article event.
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WriteDeskError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Returns true when the error must halt the request rather than be
    /// reported inline.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

impl From<serde_json::Error> for WriteDeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Structured diagnostic attached to configuration errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorInfo {
    /// Error code (e.g., "CONFIG-001-SELECTOR").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("code".to_string(), serde_json::json!(self.code));
        map.insert("summary".to_string(), serde_json::json!(self.summary));
        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::json!(hint));
        }
        if !self.context.is_empty() {
            map.insert("context".to_string(), serde_json::json!(self.context));
        }
        map
    }
}

/// Raised for programming or plugin defects; always fatal.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// A volatile region has no DOM selector to patch.
    #[error("Empty selector for partial '{key}'")]
    EmptySelector {
        /// The region key.
        key: String,
    },

    /// A constraint references a kind the validator does not know.
    #[error("Unknown constraint kind '{kind}' for '{key}'")]
    UnknownConstraint {
        /// The constraint key.
        key: String,
        /// The unregistered kind name.
        kind: String,
    },

    /// The document layout referenced a region that is not registered.
    #[error("Missing partial '{key}'")]
    MissingRegion {
        /// The region key.
        key: String,
    },

    /// Preferences could not be loaded.
    #[error("Invalid preferences: {0}")]
    Preferences(String),
}

impl ConfigurationError {
    /// Creates an empty-selector error.
    #[must_use]
    pub fn empty_selector(key: impl Into<String>) -> Self {
        Self::EmptySelector { key: key.into() }
    }

    /// Creates an unknown-constraint error.
    #[must_use]
    pub fn unknown_constraint(key: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnknownConstraint {
            key: key.into(),
            kind: kind.into(),
        }
    }

    /// Returns structured diagnostics for this error.
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        match self {
            Self::EmptySelector { key } => {
                ErrorInfo::new("CONFIG-001-SELECTOR", self.to_string())
                    .with_fix_hint("Volatile and volatile-value partials need a DOM selector.")
                    .with_context_entry("partial", key)
            }
            Self::UnknownConstraint { key, kind } => {
                ErrorInfo::new("CONFIG-002-CONSTRAINT", self.to_string())
                    .with_fix_hint("Register the constraint kind on the validator at startup.")
                    .with_context_entry("constraint", key)
                    .with_context_entry("kind", kind)
            }
            Self::MissingRegion { key } => ErrorInfo::new("CONFIG-003-PARTIAL", self.to_string())
                .with_context_entry("partial", key),
            Self::Preferences(_) => ErrorInfo::new("CONFIG-004-PREFS", self.to_string()),
        }
    }
}

/// Raised when the storage layer fails a read or write.
#[derive(Debug, Clone, Error)]
#[error("Storage {operation} failed: {reason}")]
pub struct PersistenceError {
    /// The attempted operation (e.g., "insert", "update").
    pub operation: String,
    /// The underlying reason.
    pub reason: String,
}

impl PersistenceError {
    /// Creates a new persistence error.
    #[must_use]
    pub fn new(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Raised when the acting principal lacks a privilege.
#[derive(Debug, Clone, Error)]
#[error("User '{user}' lacks privilege '{privilege}'")]
pub struct AuthorizationError {
    /// The acting user.
    pub user: String,
    /// The missing privilege.
    pub privilege: String,
}

impl AuthorizationError {
    /// Creates a new authorization error.
    #[must_use]
    pub fn new(user: impl Into<String>, privilege: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            privilege: privilege.into(),
        }
    }
}

/// Raised when a state-mutating step arrives without a valid form token.
#[derive(Debug, Clone, Error)]
#[error("Bad token for event '{event}', step '{step}'")]
pub struct CsrfError {
    /// The event.
    pub event: String,
    /// The step.
    pub step: String,
}

impl CsrfError {
    /// Creates a new CSRF error.
    #[must_use]
    pub fn new(event: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            step: step.into(),
        }
    }
}

/// Errors decoding a client-echoed draft.
#[derive(Debug, Clone, Error)]
pub enum DraftError {
    /// The blob is not valid base64 or JSON.
    #[error("Malformed draft: {0}")]
    Malformed(String),

    /// The blob was produced by an unsupported schema version.
    #[error("Unsupported draft version {0}")]
    UnsupportedVersion(u32),

    /// The blob names a field the editor does not know.
    #[error("Unknown draft field '{0}'")]
    UnknownField(String),

    /// The blob exceeds the size limit.
    #[error("Draft too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Encoded size.
        size: usize,
        /// Maximum accepted size.
        limit: usize,
    },

    /// The checksum does not match the fields.
    #[error("Draft checksum mismatch")]
    ChecksumMismatch,
}

/// Errors raised by region producers.
#[derive(Debug, Clone, Error)]
#[error("Partial '{key}' failed: {reason}")]
pub struct RenderError {
    /// The region key.
    pub key: String,
    /// The failure reason.
    pub reason: String,
}

impl RenderError {
    /// Creates a new render error.
    #[must_use]
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by publish notifiers.
#[derive(Debug, Clone, Error)]
#[error("Ping to '{endpoint}' failed: {reason}")]
pub struct NotifyError {
    /// The endpoint.
    pub endpoint: String,
    /// The failure reason.
    pub reason: String,
}

impl NotifyError {
    /// Creates a new notify error.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_info_creation() {
        let info = ErrorInfo::new("TEST-001", "Test error")
            .with_fix_hint("Fix this by doing that")
            .with_context_entry("partial", "status");

        assert_eq!(info.code, "TEST-001");
        assert_eq!(info.fix_hint, Some("Fix this by doing that".to_string()));
        assert_eq!(info.context.get("partial"), Some(&"status".to_string()));
    }

    #[test]
    fn test_empty_selector_info() {
        let err = ConfigurationError::empty_selector("status");
        assert_eq!(err.to_string(), "Empty selector for partial 'status'");

        let dict = err.info().to_dict();
        assert_eq!(dict.get("code").unwrap(), "CONFIG-001-SELECTOR");
    }

    #[test]
    fn test_fatality() {
        let persistence: WriteDeskError = PersistenceError::new("update", "disk full").into();
        assert!(!persistence.is_fatal());

        let config: WriteDeskError = ConfigurationError::empty_selector("x").into();
        assert!(config.is_fatal());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CsrfError::new("article", "save").to_string(),
            "Bad token for event 'article', step 'save'"
        );
        assert_eq!(
            WriteDeskError::not_found(7).to_string(),
            "Article not found: 7"
        );
    }
}
