//! Named constraints evaluated against a candidate article.
//!
//! Every constraint runs; failures are collected and their localized
//! messages joined with `", "`. Ordinary failures are a [`Verdict`], not an
//! error. Only a constraint naming an unregistered kind is an error, since
//! that is a plugin defect.

use crate::callbacks::{CallbackArgs, CallbackRegistry, ExtensionData, Phase};
use crate::core::FormFields;
use crate::errors::ConfigurationError;
use crate::i18n::Localizer;
use crate::store::Catalog;
use crate::textfilter::TextFilterSet;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a constraint checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// The value is one of the listed choices.
    Choice(Vec<String>),
    /// The value names an existing section.
    Section,
    /// The value is blank or names an existing category.
    Category,
    /// The value is a registered text filter id.
    TextFilter,
    /// The value is blank.
    Blank,
    /// The value is blank, `0` or `false`.
    False,
    /// The value is blank or names an existing article form.
    Form,
    /// A kind registered on the [`Validator`] by name.
    Named(String),
}

impl ConstraintKind {
    fn default_message(&self) -> &str {
        match self {
            Self::Choice(_) => "unknown_choice",
            Self::Section => "unknown_section",
            Self::Category => "unknown_category",
            Self::TextFilter => "unknown_textfilter",
            Self::Blank => "should_be_blank",
            Self::False => "should_be_false",
            Self::Form => "unknown_form",
            Self::Named(name) => name,
        }
    }
}

/// A predicate over one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// The value under test.
    pub value: String,
    /// The check to apply.
    pub kind: ConstraintKind,
    /// Message key reported on failure; the kind's default when `None`.
    pub message: Option<String>,
}

impl Constraint {
    /// Creates a constraint with the kind's default message.
    #[must_use]
    pub fn new(value: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            value: value.into(),
            kind,
            message: None,
        }
    }

    /// Overrides the failure message key.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The message key reported on failure.
    #[must_use]
    pub fn message_key(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message())
    }
}

/// An ordered set of constraints keyed by name.
///
/// Inserting under an existing key replaces that constraint in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    entries: Vec<(String, Constraint)>,
}

impl ConstraintSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a constraint.
    pub fn insert(&mut self, key: impl Into<String>, constraint: Constraint) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = constraint;
        } else {
            self.entries.push((key, constraint));
        }
    }

    /// Removes a constraint.
    pub fn remove(&mut self, key: &str) -> Option<Constraint> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Looks up a constraint.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Constraint> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no constraints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lookups a constraint may consult.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Existing sections, categories and forms.
    pub catalog: &'a Catalog,
    /// Registered text filters.
    pub filters: &'a TextFilterSet,
}

/// A check registered under a name for [`ConstraintKind::Named`].
pub trait ConstraintCheck: Send + Sync {
    /// Returns true if `value` passes.
    fn check(&self, value: &str, ctx: &ValidationContext<'_>) -> bool;
}

impl<F> ConstraintCheck for F
where
    F: Fn(&str, &ValidationContext<'_>) -> bool + Send + Sync,
{
    fn check(&self, value: &str, ctx: &ValidationContext<'_>) -> bool {
        self(value, ctx)
    }
}

/// Outcome of a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Keys of the failed constraints, in evaluation order.
    pub failed: Vec<String>,
    /// Localized failure messages joined with `", "`; empty when valid.
    pub message: String,
}

impl Verdict {
    /// Returns true when every constraint passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Evaluates constraint sets.
#[derive(Clone, Default)]
pub struct Validator {
    named: HashMap<String, Arc<dyn ConstraintCheck>>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.named.keys().collect();
        names.sort();
        f.debug_struct("Validator").field("named", &names).finish()
    }
}

impl Validator {
    /// Creates a validator with only the built-in kinds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named constraint kind.
    pub fn register(&mut self, name: impl Into<String>, check: Arc<dyn ConstraintCheck>) {
        self.named.insert(name.into(), check);
    }

    fn passes(
        &self,
        key: &str,
        constraint: &Constraint,
        ctx: &ValidationContext<'_>,
    ) -> Result<bool, ConfigurationError> {
        let value = constraint.value.as_str();
        Ok(match &constraint.kind {
            ConstraintKind::Choice(choices) => choices.iter().any(|c| c == value),
            ConstraintKind::Section => ctx.catalog.has_section(value),
            ConstraintKind::Category => value.is_empty() || ctx.catalog.has_category(value),
            ConstraintKind::TextFilter => ctx.filters.has(value),
            ConstraintKind::Blank => value.is_empty(),
            ConstraintKind::False => matches!(value, "" | "0" | "false"),
            ConstraintKind::Form => value.is_empty() || ctx.catalog.has_article_form(value),
            ConstraintKind::Named(name) => self
                .named
                .get(name)
                .ok_or_else(|| ConfigurationError::unknown_constraint(key, name))?
                .check(value, ctx),
        })
    }

    /// Runs every constraint in `set`.
    pub fn validate(
        &self,
        set: &ConstraintSet,
        ctx: &ValidationContext<'_>,
        l10n: &dyn Localizer,
    ) -> Result<Verdict, ConfigurationError> {
        let mut failed = Vec::new();
        let mut messages = Vec::new();
        for (key, constraint) in set.iter() {
            if !self.passes(key, constraint, ctx)? {
                debug!(constraint = key, value = %constraint.value, "Constraint failed");
                failed.push(key.to_string());
                messages.push(l10n.text(constraint.message_key(), &[]));
            }
        }
        Ok(Verdict {
            failed,
            message: messages.join(", "),
        })
    }

    /// Lets `article_ui` / `validate_<step>` handlers amend `set`, then runs
    /// it.
    pub fn validate_step(
        &self,
        step: &str,
        mut set: ConstraintSet,
        fields: &FormFields,
        callbacks: &CallbackRegistry,
        ctx: &ValidationContext<'_>,
        l10n: &dyn Localizer,
    ) -> Result<Verdict, ConfigurationError> {
        let hook = format!("validate_{step}");
        callbacks.dispatch_ref(
            &CallbackArgs::new("article_ui", &hook).with_fields(fields),
            Phase::After,
            &mut ExtensionData::Constraints(&mut set),
        );
        self.validate(&set, ctx, l10n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Handler;
    use crate::i18n::EnglishLocalizer;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        Catalog::new()
            .with_sections(["articles", "about"])
            .with_categories(["news"])
            .with_article_forms(["single"])
    }

    #[test]
    fn test_all_pass() {
        let catalog = catalog();
        let filters = TextFilterSet::new();
        let ctx = ValidationContext {
            catalog: &catalog,
            filters: &filters,
        };
        let mut set = ConstraintSet::new();
        set.insert("Section", Constraint::new("about", ConstraintKind::Section));
        set.insert("Category1", Constraint::new("", ConstraintKind::Category));
        set.insert("Category2", Constraint::new("news", ConstraintKind::Category));
        set.insert("textile_body", Constraint::new("2", ConstraintKind::TextFilter));
        set.insert("override_form", Constraint::new("single", ConstraintKind::Form));
        set.insert("annotate_false", Constraint::new("0", ConstraintKind::False));

        let verdict = Validator::new()
            .validate(&set, &ctx, &EnglishLocalizer::new())
            .unwrap();
        assert!(verdict.is_valid());
        assert_eq!(verdict.message, "");
    }

    #[test]
    fn test_failures_collected_not_short_circuited() {
        let catalog = catalog();
        let filters = TextFilterSet::new();
        let ctx = ValidationContext {
            catalog: &catalog,
            filters: &filters,
        };
        let mut set = ConstraintSet::new();
        set.insert(
            "Status",
            Constraint::new("9", ConstraintKind::Choice(vec!["1".into(), "4".into()]))
                .with_message("invalid_status"),
        );
        set.insert("Section", Constraint::new("nowhere", ConstraintKind::Section));
        set.insert("Category1", Constraint::new("news", ConstraintKind::Category));

        let verdict = Validator::new()
            .validate(&set, &ctx, &EnglishLocalizer::new())
            .unwrap();
        assert_eq!(verdict.failed, vec!["Status".to_string(), "Section".to_string()]);
        assert_eq!(verdict.message, "Invalid status., Unknown section.");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut set = ConstraintSet::new();
        set.insert("a", Constraint::new("x", ConstraintKind::Blank));
        set.insert("b", Constraint::new("y", ConstraintKind::Blank));
        set.insert("a", Constraint::new("", ConstraintKind::Blank));

        let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(set.get("a").unwrap().value, "");
        assert!(set.remove("b").is_some());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_unknown_named_kind_is_configuration_error() {
        let catalog = catalog();
        let filters = TextFilterSet::new();
        let ctx = ValidationContext {
            catalog: &catalog,
            filters: &filters,
        };
        let mut set = ConstraintSet::new();
        set.insert("isbn", Constraint::new("123", ConstraintKind::Named("isbn".into())));

        let err = Validator::new()
            .validate(&set, &ctx, &EnglishLocalizer::new())
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownConstraint { .. }));
    }

    #[test]
    fn test_named_kind() {
        let catalog = catalog();
        let filters = TextFilterSet::new();
        let ctx = ValidationContext {
            catalog: &catalog,
            filters: &filters,
        };
        let mut validator = Validator::new();
        validator.register(
            "digits",
            Arc::new(|v: &str, _: &ValidationContext<'_>| v.chars().all(|c| c.is_ascii_digit())),
        );
        let mut set = ConstraintSet::new();
        set.insert("custom_1", Constraint::new("12a", ConstraintKind::Named("digits".into())));

        let verdict = validator
            .validate(&set, &ctx, &EnglishLocalizer::new())
            .unwrap();
        assert_eq!(verdict.message, "digits");
    }

    #[test]
    fn test_validate_step_lets_plugins_amend() {
        let catalog = catalog();
        let filters = TextFilterSet::new();
        let ctx = ValidationContext {
            catalog: &catalog,
            filters: &filters,
        };
        let mut callbacks = CallbackRegistry::new();
        callbacks.register(
            "article_ui",
            "validate_publish",
            Phase::After,
            Handler::by_ref(|args, data| {
                let title = args.fields.map(|f| f.get("Title").to_string()).unwrap_or_default();
                if let ExtensionData::Constraints(set) = data {
                    set.insert(
                        "title_blank",
                        Constraint::new(title, ConstraintKind::Blank).with_message("should_be_blank"),
                    );
                }
                serde_json::Value::Null
            }),
        );

        let fields = FormFields::new().with("Title", "Hello");
        let verdict = Validator::new()
            .validate_step(
                "publish",
                ConstraintSet::new(),
                &fields,
                &callbacks,
                &ctx,
                &EnglishLocalizer::new(),
            )
            .unwrap();
        assert_eq!(verdict.failed, vec!["title_blank".to_string()]);

        let verdict = Validator::new()
            .validate_step(
                "save",
                ConstraintSet::new(),
                &fields,
                &callbacks,
                &ctx,
                &EnglishLocalizer::new(),
            )
            .unwrap();
        assert!(verdict.is_valid());
    }
}
