//! Plugin callback registry.
//!
//! Handlers are registered against an `(event, step, phase)` triple while
//! the process starts up. Once the registry is handed to the editor it is
//! shared behind an `Arc` and never mutated again.
//!
//! Three call styles share one table:
//! - [`CallbackRegistry::dispatch`] concatenates the text of every match;
//! - [`CallbackRegistry::dispatch_ref`] hands each match a mutable
//!   [`ExtensionData`] and collects their return values;
//! - [`CallbackRegistry::pluggable_ui`] lets handlers replace a UI fragment.

use crate::config::ProductionStatus;
use crate::core::FormFields;
use crate::partials::RegionRegistry;
use crate::validator::ConstraintSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which of the two slots of an `(event, step)` pair a handler occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Runs before the built-in behaviour; used by UI overrides.
    Before,
    /// Runs after the built-in behaviour.
    #[default]
    After,
}

/// Arguments passed to every handler.
#[derive(Debug, Clone, Copy)]
pub struct CallbackArgs<'a> {
    /// The event being dispatched.
    pub event: &'a str,
    /// The step, or element name for UI hooks.
    pub step: &'a str,
    /// Default markup, for UI hooks.
    pub default: Option<&'a str>,
    /// The article fields in play, when there are any.
    pub fields: Option<&'a FormFields>,
}

impl<'a> CallbackArgs<'a> {
    /// Creates arguments with no payload.
    #[must_use]
    pub fn new(event: &'a str, step: &'a str) -> Self {
        Self {
            event,
            step,
            default: None,
            fields: None,
        }
    }

    /// Attaches article fields.
    #[must_use]
    pub fn with_fields(mut self, fields: &'a FormFields) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Attaches default markup.
    #[must_use]
    pub fn with_default(mut self, default: &'a str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Caller-owned state that a by-reference handler may edit in place.
///
/// Each extension point passes exactly one variant; handlers must leave
/// the others alone.
pub enum ExtensionData<'a> {
    /// Validation constraints for the current step (`article_ui` /
    /// `validate_<step>`). Handlers may add, replace or remove entries.
    Constraints(&'a mut ConstraintSet),
    /// Field defaults for a new article (`article_ui` / `defaults`).
    UiDefaults(&'a mut FormFields),
    /// The region registry (`article_ui` / `partials_meta`).
    Regions(&'a mut RegionRegistry),
}

impl ExtensionData<'_> {
    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constraints(_) => "constraints",
            Self::UiDefaults(_) => "ui_defaults",
            Self::Regions(_) => "regions",
        }
    }
}

/// Handler returning text.
pub type TextHandler = Arc<dyn Fn(&CallbackArgs<'_>) -> String + Send + Sync>;

/// Handler that edits caller-owned data.
pub type RefHandler =
    Arc<dyn Fn(&CallbackArgs<'_>, &mut ExtensionData<'_>) -> serde_json::Value + Send + Sync>;

/// A registered handler.
#[derive(Clone)]
pub enum Handler {
    /// Participates in text dispatch and UI hooks.
    Text(TextHandler),
    /// Participates in by-reference dispatch only.
    ByRef(RefHandler),
}

impl Handler {
    /// Wraps a text closure.
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(&CallbackArgs<'_>) -> String + Send + Sync + 'static,
    {
        Self::Text(Arc::new(f))
    }

    /// Wraps a by-reference closure.
    pub fn by_ref<F>(f: F) -> Self
    where
        F: Fn(&CallbackArgs<'_>, &mut ExtensionData<'_>) -> serde_json::Value
            + Send
            + Sync
            + 'static,
    {
        Self::ByRef(Arc::new(f))
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Handler::Text"),
            Self::ByRef(_) => f.write_str("Handler::ByRef"),
        }
    }
}

#[derive(Debug, Clone)]
struct Registration {
    event: String,
    step: String,
    phase: Phase,
    handler: Handler,
}

impl Registration {
    fn matches(&self, event: &str, step: &str, phase: Phase) -> bool {
        self.event == event && (self.step.is_empty() || self.step == step) && self.phase == phase
    }
}

/// The process-wide callback table.
#[derive(Debug, Clone, Default)]
pub struct CallbackRegistry {
    registrations: Vec<Registration>,
    production_status: ProductionStatus,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deployment stage; unusable handlers are reported outside
    /// production.
    #[must_use]
    pub fn with_production_status(mut self, status: ProductionStatus) -> Self {
        self.production_status = status;
        self
    }

    /// Appends a handler. An empty `step` matches every step.
    ///
    /// Registrations are not de-duplicated.
    pub fn register(
        &mut self,
        event: impl Into<String>,
        step: impl Into<String>,
        phase: Phase,
        handler: Handler,
    ) {
        let registration = Registration {
            event: event.into(),
            step: step.into(),
            phase,
            handler,
        };
        debug!(
            event = %registration.event,
            step = %registration.step,
            phase = ?registration.phase,
            "Registered callback"
        );
        self.registrations.push(registration);
    }

    /// Registers a text handler on every step of `event`, after phase.
    pub fn on(
        &mut self,
        event: impl Into<String>,
        f: impl Fn(&CallbackArgs<'_>) -> String + Send + Sync + 'static,
    ) {
        self.register(event, "", Phase::After, Handler::text(f));
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn matching<'s>(
        &'s self,
        event: &'s str,
        step: &'s str,
        phase: Phase,
    ) -> impl Iterator<Item = &'s Handler> + 's {
        self.registrations
            .iter()
            .filter(move |r| r.matches(event, step, phase))
            .map(|r| &r.handler)
    }

    fn report_unusable(&self, args: &CallbackArgs<'_>, style: &str) {
        if !self.production_status.is_live() {
            warn!(
                event = args.event,
                step = args.step,
                style,
                "Skipping callback that cannot be invoked in this call style"
            );
        }
    }

    /// Invokes every matching text handler in registration order and
    /// concatenates their output.
    pub fn dispatch(&self, args: &CallbackArgs<'_>, phase: Phase) -> String {
        let mut out = String::new();
        for handler in self.matching(args.event, args.step, phase) {
            match handler {
                Handler::Text(f) => out.push_str(&f(args)),
                Handler::ByRef(_) => self.report_unusable(args, "text"),
            }
        }
        out
    }

    /// Invokes every matching handler with mutable access to `data` and
    /// collects their return values. Text handlers contribute their output
    /// as a JSON string.
    pub fn dispatch_ref(
        &self,
        args: &CallbackArgs<'_>,
        phase: Phase,
        data: &mut ExtensionData<'_>,
    ) -> Vec<serde_json::Value> {
        self.matching(args.event, args.step, phase)
            .map(|handler| match handler {
                Handler::ByRef(f) => f(args, data),
                Handler::Text(f) => serde_json::Value::String(f(args)),
            })
            .collect()
    }

    /// Renders a UI fragment, letting before-phase handlers of
    /// `(event, element)` replace `default`. When every handler returns
    /// empty text the default is used verbatim.
    pub fn pluggable_ui(
        &self,
        event: &str,
        element: &str,
        default: &str,
        fields: Option<&FormFields>,
    ) -> String {
        let args = CallbackArgs {
            event,
            step: element,
            default: Some(default),
            fields,
        };
        let ui = self.dispatch(&args, Phase::Before);
        if ui.is_empty() {
            default.to_string()
        } else {
            ui
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Constraint, ConstraintKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dispatch_concatenates_in_order() {
        let mut registry = CallbackRegistry::new();
        registry.on("article_saved", |_| "a".to_string());
        registry.on("article_saved", |_| "b".to_string());
        registry.on("article_posted", |_| "x".to_string());

        let out = registry.dispatch(&CallbackArgs::new("article_saved", ""), Phase::After);
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_step_and_phase_matching() {
        let mut registry = CallbackRegistry::new();
        registry.register("ev", "save", Phase::After, Handler::text(|_| "save".into()));
        registry.register("ev", "", Phase::After, Handler::text(|_| "any".into()));
        registry.register("ev", "save", Phase::Before, Handler::text(|_| "pre".into()));

        assert_eq!(
            registry.dispatch(&CallbackArgs::new("ev", "save"), Phase::After),
            "saveany"
        );
        assert_eq!(
            registry.dispatch(&CallbackArgs::new("ev", "edit"), Phase::After),
            "any"
        );
        assert_eq!(
            registry.dispatch(&CallbackArgs::new("ev", "save"), Phase::Before),
            "pre"
        );
    }

    #[test]
    fn test_no_deduplication() {
        let mut registry = CallbackRegistry::new();
        for _ in 0..2 {
            registry.on("ping", |_| "p".to_string());
        }
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.dispatch(&CallbackArgs::new("ping", ""), Phase::After), "pp");
    }

    #[test]
    fn test_by_ref_handler_skipped_in_text_dispatch() {
        let mut registry = CallbackRegistry::new().with_production_status(ProductionStatus::Debug);
        registry.register(
            "ev",
            "",
            Phase::After,
            Handler::by_ref(|_, _| serde_json::Value::Null),
        );
        registry.on("ev", |_| "ok".to_string());

        assert_eq!(registry.dispatch(&CallbackArgs::new("ev", ""), Phase::After), "ok");
    }

    #[test]
    fn test_dispatch_ref_mutates_constraints() {
        let mut registry = CallbackRegistry::new();
        registry.register(
            "article_ui",
            "validate_save",
            Phase::After,
            Handler::by_ref(|_, data| {
                if let ExtensionData::Constraints(set) = data {
                    set.insert(
                        "no_foo",
                        Constraint::new("foo", ConstraintKind::Blank).with_message("no_foo"),
                    );
                }
                serde_json::json!("added")
            }),
        );

        let mut set = ConstraintSet::new();
        let returns = registry.dispatch_ref(
            &CallbackArgs::new("article_ui", "validate_save"),
            Phase::After,
            &mut ExtensionData::Constraints(&mut set),
        );

        assert_eq!(returns, vec![serde_json::json!("added")]);
        assert!(set.get("no_foo").is_some());
    }

    #[test]
    fn test_pluggable_ui_default_and_override() {
        let mut registry = CallbackRegistry::new();
        assert_eq!(registry.pluggable_ui("article_ui", "title", "<p>t</p>", None), "<p>t</p>");

        registry.register(
            "article_ui",
            "title",
            Phase::Before,
            Handler::text(|args| format!("<div>{}</div>", args.default.unwrap_or(""))),
        );
        assert_eq!(
            registry.pluggable_ui("article_ui", "title", "<p>t</p>", None),
            "<div><p>t</p></div>"
        );
        assert_eq!(registry.pluggable_ui("article_ui", "body", "<p>b</p>", None), "<p>b</p>");
    }

    #[test]
    fn test_pluggable_ui_empty_override_keeps_default() {
        let mut registry = CallbackRegistry::new();
        registry.register("article_ui", "status", Phase::Before, Handler::text(|_| String::new()));
        assert_eq!(registry.pluggable_ui("article_ui", "status", "d", None), "d");
    }
}
