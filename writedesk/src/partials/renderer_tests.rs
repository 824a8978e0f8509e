//! Tests for the partial renderer.

#[cfg(test)]
mod tests {
    use crate::callbacks::CallbackRegistry;
    use crate::config::Preferences;
    use crate::core::{FormFields, Message, Principal};
    use crate::errors::{ConfigurationError, RenderError, WriteDeskError};
    use crate::i18n::EnglishLocalizer;
    use crate::partials::{
        DocumentLayout, PartialRenderer, PatchKind, Region, RegionMode, RegionRegistry,
        RenderEnv, RenderState, RenderedRegions, ViewState,
    };
    use crate::store::Catalog;
    use crate::textfilter::TextFilterSet;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixture {
        prefs: Preferences,
        catalog: Catalog,
        filters: TextFilterSet,
        callbacks: CallbackRegistry,
        l10n: EnglishLocalizer,
        principal: Principal,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                prefs: Preferences::default(),
                catalog: Catalog::new(),
                filters: TextFilterSet::new(),
                callbacks: CallbackRegistry::new(),
                l10n: EnglishLocalizer::new(),
                principal: Principal::publisher("ann"),
            }
        }

        fn env(&self) -> RenderEnv<'_> {
            RenderEnv {
                prefs: &self.prefs,
                catalog: &self.catalog,
                filters: &self.filters,
                callbacks: &self.callbacks,
                l10n: &self.l10n,
                principal: &self.principal,
                recent: &[],
                now: 1_700_000_000,
            }
        }
    }

    fn state() -> ViewState {
        ViewState {
            fields: FormFields::new()
                .with("Title", "Hello")
                .with("sLastMod", "1700000000"),
            ..ViewState::default()
        }
    }

    fn echo(field: &'static str) -> impl Fn(&crate::partials::RegionInput<'_>) -> Result<String, RenderError> {
        move |input| Ok(input.state.get(field).to_string())
    }

    fn registry(static_runs: Arc<AtomicUsize>) -> RegionRegistry {
        let mut regions = RegionRegistry::new();
        regions.insert(Region::new(
            "sLastMod",
            RegionMode::VolatileValue,
            "[name=sLastMod]",
            echo("sLastMod"),
        ));
        regions.insert(Region::new("title", RegionMode::Static, "p.title", move |input| {
            static_runs.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<p class=\"title\">{}</p>", input.state.get("Title")))
        }));
        regions.insert(Region::new("author", RegionMode::Volatile, "p.author", |_| {
            Ok("<p class=\"author\">ann</p>".to_string())
        }));
        regions
    }

    struct Concat;

    impl DocumentLayout for Concat {
        fn assemble(
            &self,
            rendered: &RenderedRegions,
            _state: &ViewState,
            _env: &RenderEnv<'_>,
            message: &Message,
        ) -> Result<String, WriteDeskError> {
            Ok(format!(
                "{}|{}|{}|{}",
                message.text,
                rendered.get("title"),
                rendered.get("author"),
                rendered.get("sLastMod")
            ))
        }
    }

    #[test]
    fn test_refresh_patches_only_volatile_regions_in_order() {
        let fixture = Fixture::new();
        let static_runs = Arc::new(AtomicUsize::new(0));
        let regions = registry(static_runs.clone());

        let script = PartialRenderer::new()
            .refresh(&regions, &state(), &fixture.env(), Message::success("Saved"))
            .unwrap();

        assert_eq!(script.len(), 2);
        assert_eq!(script.instructions[0].selector, "[name=sLastMod]");
        assert_eq!(script.instructions[0].kind, PatchKind::Value);
        assert_eq!(script.instructions[0].payload, "1700000000");
        assert_eq!(script.instructions[1].selector, "p.author");
        assert_eq!(script.instructions[1].kind, PatchKind::Replace);
        assert_eq!(static_runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_initial_runs_every_producer() {
        let fixture = Fixture::new();
        let static_runs = Arc::new(AtomicUsize::new(0));
        let regions = registry(static_runs.clone());

        let rendered = PartialRenderer::new()
            .produce(RenderState::Initial, &regions, &state(), &fixture.env())
            .unwrap();
        assert_eq!(rendered.len(), 3);
        assert_eq!(static_runs.load(Ordering::SeqCst), 1);

        let page = PartialRenderer::new()
            .page(&Concat, &regions, &state(), &fixture.env(), &Message::none())
            .unwrap();
        assert_eq!(
            page,
            "|<p class=\"title\">Hello</p>|<p class=\"author\">ann</p>|1700000000"
        );
    }

    #[test]
    fn test_empty_selector_is_fatal_in_both_states() {
        let fixture = Fixture::new();
        let mut regions = RegionRegistry::new();
        regions.insert(Region::new("status", RegionMode::Volatile, "  ", |_| {
            Ok("never used".to_string())
        }));

        for render_state in [RenderState::Initial, RenderState::Refresh] {
            let err = PartialRenderer::new()
                .produce(render_state, &regions, &state(), &fixture.env())
                .unwrap_err();
            assert!(matches!(
                err,
                WriteDeskError::Configuration(ConfigurationError::EmptySelector { ref key }) if key == "status"
            ));
        }
    }

    #[test]
    fn test_static_region_may_omit_selector() {
        let fixture = Fixture::new();
        let mut regions = RegionRegistry::new();
        regions.insert(Region::new("help", RegionMode::Static, "", |_| Ok("h".to_string())));

        let script = PartialRenderer::new()
            .refresh(&regions, &state(), &fixture.env(), Message::none())
            .unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_producer_error_propagates() {
        let fixture = Fixture::new();
        let mut regions = RegionRegistry::new();
        regions.insert(Region::new("posted", RegionMode::Volatile, "#write-timestamp", |input| {
            Err(RenderError::new(input.key, "bad timestamp"))
        }));

        let err = PartialRenderer::new()
            .refresh(&regions, &state(), &fixture.env(), Message::none())
            .unwrap_err();
        assert!(matches!(err, WriteDeskError::Render(ref e) if e.key == "posted"));
    }

    #[test]
    fn test_render_region_embeds_another_region() {
        let fixture = Fixture::new();
        let mut regions = RegionRegistry::new();
        regions.insert(Region::new("inner", RegionMode::Static, "", |_| Ok("in".to_string())));
        regions.insert(Region::new("outer", RegionMode::Volatile, "#outer", |input| {
            Ok(format!("<div>{}</div>", input.render_region("inner")?))
        }));

        let script = PartialRenderer::new()
            .refresh(&regions, &state(), &fixture.env(), Message::none())
            .unwrap();
        assert_eq!(script.instructions[0].payload, "<div>in</div>");
    }

    #[test]
    fn test_registry_insert_replaces_in_place() {
        let mut regions = RegionRegistry::new();
        regions.insert(Region::new("a", RegionMode::Static, "", |_| Ok(String::new())));
        regions.insert(Region::new("b", RegionMode::Static, "", |_| Ok(String::new())));
        regions.insert(Region::new("a", RegionMode::Volatile, "#a", |_| Ok(String::new())));

        assert_eq!(regions.keys(), vec!["a", "b"]);
        assert_eq!(regions.get("a").unwrap().mode, RegionMode::Volatile);
        assert!(regions.remove("b").is_some());
        assert_eq!(regions.len(), 1);
    }
}
