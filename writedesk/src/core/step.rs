//! Steps of the article event.

use crate::core::{names, FormFields};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A step of the article editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Blank form for a new article.
    Create,
    /// First save of a new article.
    Publish,
    /// Form for an existing article.
    Edit,
    /// Update of an existing article.
    Save,
    /// Pane visibility toggle.
    SavePaneState,
}

impl Step {
    /// The wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Publish => "publish",
            Self::Edit => "edit",
            Self::Save => "save",
            Self::SavePaneState => "save_pane_state",
        }
    }

    /// Resolves the step of a request.
    ///
    /// A `save` button forces [`Step::Save`], a `publish` button forces
    /// [`Step::Publish`]; otherwise the `step` field is used, defaulting to
    /// `create` when empty. Returns the raw name when it is not a known
    /// step.
    pub fn resolve(fields: &FormFields) -> Result<Self, String> {
        if fields.is_set(names::SAVE) {
            return Ok(Self::Save);
        }
        if fields.is_set(names::PUBLISH) {
            return Ok(Self::Publish);
        }
        match fields.get(names::STEP) {
            "" => Ok(Self::Create),
            other => other.parse(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "publish" => Ok(Self::Publish),
            "edit" => Ok(Self::Edit),
            "save" => Ok(Self::Save),
            "save_pane_state" => Ok(Self::SavePaneState),
            other => Err(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_buttons_win() {
        let fields = FormFields::new().with("step", "edit").with("save", "Save");
        assert_eq!(Step::resolve(&fields), Ok(Step::Save));

        let fields = FormFields::new().with("publish", "Publish");
        assert_eq!(Step::resolve(&fields), Ok(Step::Publish));
    }

    #[test]
    fn test_resolve_defaults_to_create() {
        assert_eq!(Step::resolve(&FormFields::new()), Ok(Step::Create));
        assert_eq!(
            Step::resolve(&FormFields::new().with("step", "save_pane_state")),
            Ok(Step::SavePaneState)
        );
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(
            Step::resolve(&FormFields::new().with("step", "delete")),
            Err("delete".to_string())
        );
    }
}
