//! Acting principals and their privileges.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A privilege consulted by the article editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Privilege {
    /// May open the article editor at all.
    #[serde(rename = "article")]
    Article,
    /// May set Live or Sticky status.
    #[serde(rename = "article.publish")]
    Publish,
    /// May edit any unpublished article.
    #[serde(rename = "article.edit")]
    Edit,
    /// May edit own unpublished articles.
    #[serde(rename = "article.edit.own")]
    EditOwn,
    /// May edit any published article.
    #[serde(rename = "article.edit.published")]
    EditPublished,
    /// May edit own published articles.
    #[serde(rename = "article.edit.own.published")]
    EditOwnPublished,
}

impl Privilege {
    /// Returns the dotted privilege name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Publish => "article.publish",
            Self::Edit => "article.edit",
            Self::EditOwn => "article.edit.own",
            Self::EditPublished => "article.edit.published",
            Self::EditOwnPublished => "article.edit.own.published",
        }
    }

    /// Every privilege; the set held by a site publisher.
    #[must_use]
    pub fn all() -> HashSet<Self> {
        [
            Self::Article,
            Self::Publish,
            Self::Edit,
            Self::EditOwn,
            Self::EditPublished,
            Self::EditOwnPublished,
        ]
        .into_iter()
        .collect()
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logged-in user acting on a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// The login name.
    pub name: String,
    /// Granted privileges.
    pub privileges: HashSet<Privilege>,
    /// The session nonce, rotated on login.
    pub nonce: String,
}

impl Principal {
    /// Creates a principal with a fresh nonce and no privileges.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privileges: HashSet::new(),
            nonce: generate_nonce(),
        }
    }

    /// Creates a principal holding every privilege.
    #[must_use]
    pub fn publisher(name: impl Into<String>) -> Self {
        Self::new(name).with_privileges(Privilege::all())
    }

    /// Grants a privilege.
    #[must_use]
    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privileges.insert(privilege);
        self
    }

    /// Grants several privileges.
    #[must_use]
    pub fn with_privileges(mut self, privileges: impl IntoIterator<Item = Privilege>) -> Self {
        self.privileges.extend(privileges);
        self
    }

    /// Sets the session nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = nonce.into();
        self
    }

    /// Returns true if the privilege is granted.
    #[must_use]
    pub fn has(&self, privilege: Privilege) -> bool {
        self.privileges.contains(&privilege)
    }
}

/// Generates a random 32-character hex nonce.
#[must_use]
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_names() {
        assert_eq!(Privilege::Publish.as_str(), "article.publish");
        assert_eq!(
            Privilege::EditOwnPublished.to_string(),
            "article.edit.own.published"
        );
    }

    #[test]
    fn test_principal_privileges() {
        let writer = Principal::new("ann").with_privilege(Privilege::EditOwn);
        assert!(writer.has(Privilege::EditOwn));
        assert!(!writer.has(Privilege::Publish));

        let publisher = Principal::publisher("bob");
        assert!(publisher.has(Privilege::Publish));
        assert!(publisher.has(Privilege::Article));
    }

    #[test]
    fn test_nonce_is_hex() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 32);
        assert!(nonce.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(nonce, generate_nonce());
    }
}
