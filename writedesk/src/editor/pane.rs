//! Remembering which editor panes are expanded.

use super::{ArticleEditor, EditorRequest, EditorResponse};
use crate::core::names;
use crate::errors::WriteDeskError;
use crate::events::kinds;
use serde_json::json;
use tracing::{debug, warn};

/// Panes whose visibility is stored per user.
pub const PANES: [&str; 8] = [
    "textfilter_help",
    "advanced",
    "custom_field",
    "image",
    "meta",
    "recent",
    "comments",
    "dates",
];

/// The status envelope answered to a pane-state request.
#[must_use]
pub fn xml_envelope(status: &str) -> String {
    format!("<writedesk><http-status value='{status}' /></writedesk>")
}

fn pref_name(pane: &str) -> String {
    format!("pane_article_{pane}_visible")
}

impl ArticleEditor {
    /// Stores the visibility of one pane for the requesting user.
    pub(super) async fn save_pane_state(
        &self,
        request: &EditorRequest,
    ) -> Result<EditorResponse, WriteDeskError> {
        let pane = request.fields.get(names::PANE);
        if !PANES.contains(&pane) {
            warn!(pane, "Unknown pane");
            return Ok(EditorResponse::Xml(xml_envelope("400 Bad Request")));
        }

        let user = &request.principal.name;
        let visible = request.fields.get(names::VISIBLE) == "true";
        self.store
            .set_pane_visibility(user, &pref_name(pane), visible)
            .await?;
        debug!(user = %user, pane, visible, "Pane state saved");
        self.events
            .emit(
                kinds::PANE_SAVED,
                Some(json!({ "user": user, "pane": pane, "visible": visible })),
            )
            .await;
        Ok(EditorResponse::Xml(xml_envelope("200 OK")))
    }
}
