//! Patch scripts sent in answer to asynchronous requests.

use crate::core::Message;
use crate::utils::escape_js;
use serde::{Deserialize, Serialize};

/// What a patch instruction replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    /// The whole fragment at the selector.
    Replace,
    /// Only the value of the control at the selector.
    Value,
}

/// One DOM update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchInstruction {
    /// Target selector.
    pub selector: String,
    /// Replacement kind.
    pub kind: PatchKind,
    /// Unescaped replacement markup or value.
    pub payload: String,
}

impl PatchInstruction {
    /// Renders the instruction as a jQuery statement.
    #[must_use]
    pub fn to_javascript(&self) -> String {
        let method = match self.kind {
            PatchKind::Replace => "replaceWith",
            PatchKind::Value => "val",
        };
        format!(
            "$(\"{}\").{method}(\"{}\")",
            self.selector,
            escape_js(&self.payload)
        )
    }
}

/// An ordered list of DOM updates preceded by the feedback message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PatchScript {
    /// Message announced before the updates.
    pub announce: Message,
    /// Updates, in region registration order.
    pub instructions: Vec<PatchInstruction>,
}

impl PatchScript {
    /// Creates an empty script announcing `message`.
    #[must_use]
    pub fn new(announce: Message) -> Self {
        Self {
            announce,
            instructions: Vec::new(),
        }
    }

    /// Appends an instruction.
    pub fn push(&mut self, selector: impl Into<String>, kind: PatchKind, payload: impl Into<String>) {
        self.instructions.push(PatchInstruction {
            selector: selector.into(),
            kind,
            payload: payload.into(),
        });
    }

    /// Number of DOM updates, excluding the announcement.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if there are no DOM updates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Renders the script consumed by the client-side applier.
    #[must_use]
    pub fn to_javascript(&self) -> String {
        let announce = format!(
            "writedesk.announce(\"{}\", \"{}\")",
            escape_js(&self.announce.text),
            self.announce.severity
        );
        std::iter::once(announce)
            .chain(self.instructions.iter().map(PatchInstruction::to_javascript))
            .collect::<Vec<_>>()
            .join(";\n")
    }
}
