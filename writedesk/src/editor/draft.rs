//! Unsaved form state carried through the preview and HTML views.
//!
//! The blob is versioned JSON, base64-encoded, with a checksum salted by
//! the site secret. Only known article fields are accepted.

use crate::core::FormFields;
use crate::errors::DraftError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Current schema version.
pub const DRAFT_VERSION: u32 = 1;

/// Largest encoded blob accepted.
pub const MAX_DRAFT_BYTES: usize = 512 * 1024;

/// A draft as echoed by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftState {
    /// Schema version.
    pub version: u32,
    /// Field values keyed by form field name.
    pub fields: BTreeMap<String, String>,
    /// Hex SHA-256 over the fields and the site secret.
    pub checksum: String,
}

fn checksum(fields: &BTreeMap<String, String>, secret: &str) -> Result<String, DraftError> {
    let canonical =
        serde_json::to_string(fields).map_err(|e| DraftError::Malformed(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(secret.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

impl DraftState {
    /// Captures the `allowed` fields of `fields`.
    pub fn capture(
        fields: &FormFields,
        allowed: &[String],
        secret: &str,
    ) -> Result<Self, DraftError> {
        let fields = fields.retain_names(allowed).into_inner();
        let checksum = checksum(&fields, secret)?;
        Ok(Self {
            version: DRAFT_VERSION,
            fields,
            checksum,
        })
    }

    /// Encodes the draft for a hidden form field.
    pub fn encode(&self) -> Result<String, DraftError> {
        let json = serde_json::to_vec(self).map_err(|e| DraftError::Malformed(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    /// Decodes and verifies a blob.
    pub fn decode(blob: &str, allowed: &[String], secret: &str) -> Result<Self, DraftError> {
        if blob.len() > MAX_DRAFT_BYTES {
            return Err(DraftError::TooLarge {
                size: blob.len(),
                limit: MAX_DRAFT_BYTES,
            });
        }
        let bytes = STANDARD
            .decode(blob.trim())
            .map_err(|e| DraftError::Malformed(e.to_string()))?;
        let draft: Self =
            serde_json::from_slice(&bytes).map_err(|e| DraftError::Malformed(e.to_string()))?;

        if draft.version != DRAFT_VERSION {
            return Err(DraftError::UnsupportedVersion(draft.version));
        }
        if let Some(unknown) = draft.fields.keys().find(|k| !allowed.contains(k)) {
            return Err(DraftError::UnknownField(unknown.clone()));
        }
        if checksum(&draft.fields, secret)? != draft.checksum {
            return Err(DraftError::ChecksumMismatch);
        }
        Ok(draft)
    }

    /// The captured fields.
    #[must_use]
    pub fn into_fields(self) -> FormFields {
        FormFields::from(self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::article_vars;

    fn sample() -> FormFields {
        FormFields::new()
            .with("Title", "Draft title")
            .with("Body", "line one\nline two")
            .with("_txp_token", "dropped")
    }

    #[test]
    fn test_capture_and_decode() {
        let allowed = article_vars([1]);
        let blob = DraftState::capture(&sample(), &allowed, "secret")
            .unwrap()
            .encode()
            .unwrap();

        let fields = DraftState::decode(&blob, &allowed, "secret")
            .unwrap()
            .into_fields();
        assert_eq!(fields.get("Title"), "Draft title");
        assert_eq!(fields.get("Body"), "line one\nline two");
        assert!(fields.get_opt("_txp_token").is_none());
    }

    #[test]
    fn test_rejects_tampering() {
        let allowed = article_vars([]);
        let mut draft = DraftState::capture(&sample(), &allowed, "secret").unwrap();
        draft.fields.insert("Title".into(), "changed".into());
        let blob = draft.encode().unwrap();

        assert!(matches!(
            DraftState::decode(&blob, &allowed, "secret"),
            Err(DraftError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_rejects_wrong_secret_and_version() {
        let allowed = article_vars([]);
        let draft = DraftState::capture(&sample(), &allowed, "secret").unwrap();
        assert!(matches!(
            DraftState::decode(&draft.encode().unwrap(), &allowed, "other"),
            Err(DraftError::ChecksumMismatch)
        ));

        let old = DraftState {
            version: 0,
            ..draft
        };
        assert!(matches!(
            DraftState::decode(&old.encode().unwrap(), &allowed, "secret"),
            Err(DraftError::UnsupportedVersion(0))
        ));
    }

    #[test]
    fn test_rejects_unknown_field() {
        let mut fields = BTreeMap::new();
        fields.insert("Evil".to_string(), "x".to_string());
        let draft = DraftState {
            version: DRAFT_VERSION,
            checksum: checksum(&fields, "s").unwrap(),
            fields,
        };
        assert!(matches!(
            DraftState::decode(&draft.encode().unwrap(), &article_vars([]), "s"),
            Err(DraftError::UnknownField(ref name)) if name == "Evil"
        ));
    }

    #[test]
    fn test_rejects_garbage_and_oversize() {
        let allowed = article_vars([]);
        assert!(matches!(
            DraftState::decode("not base64!", &allowed, "s"),
            Err(DraftError::Malformed(_))
        ));
        let huge = "A".repeat(MAX_DRAFT_BYTES + 1);
        assert!(matches!(
            DraftState::decode(&huge, &allowed, "s"),
            Err(DraftError::TooLarge { .. })
        ));
    }
}
