//! The partial renderer state machine.

use super::{PatchKind, PatchScript, RegionInput, RegionMode, RegionRegistry, RenderEnv, ViewState};
use crate::core::Message;
use crate::errors::{ConfigurationError, WriteDeskError};
use std::collections::HashMap;
use tracing::{debug, error};

/// What a render must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    /// A full page.
    Initial,
    /// A patch script for an asynchronous round-trip.
    Refresh,
}

/// Producer output keyed by region key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedRegions {
    outputs: HashMap<String, String>,
}

impl RenderedRegions {
    /// Returns the output of a region, empty if it did not run.
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.outputs.get(key).map_or("", String::as_str)
    }

    /// Returns true if the region ran.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.outputs.contains_key(key)
    }

    /// Number of regions that ran.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Returns true if no region ran.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Interleaves rendered regions into a complete document.
pub trait DocumentLayout: Send + Sync {
    /// Assembles the page.
    fn assemble(
        &self,
        rendered: &RenderedRegions,
        state: &ViewState,
        env: &RenderEnv<'_>,
        message: &Message,
    ) -> Result<String, WriteDeskError>;
}

/// Runs region producers for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRenderer;

impl PartialRenderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Checks that every volatile region can be addressed.
    pub fn check_selectors(regions: &RegionRegistry) -> Result<(), ConfigurationError> {
        for region in regions.iter() {
            if region.mode.is_volatile() && region.selector.trim().is_empty() {
                error!(partial = %region.key, "Empty selector for volatile partial");
                return Err(ConfigurationError::empty_selector(&region.key));
            }
        }
        Ok(())
    }

    /// Runs the producers `state` needs: volatile producers always, static
    /// producers only for a full page. Producer errors are not caught.
    pub fn produce(
        &self,
        render_state: RenderState,
        regions: &RegionRegistry,
        state: &ViewState,
        env: &RenderEnv<'_>,
    ) -> Result<RenderedRegions, WriteDeskError> {
        Self::check_selectors(regions)?;

        let mut outputs = HashMap::with_capacity(regions.len());
        let passes: &[bool] = match render_state {
            RenderState::Initial => &[true, false],
            RenderState::Refresh => &[true],
        };
        for &volatile_pass in passes {
            for region in regions.iter().filter(|r| r.mode.is_volatile() == volatile_pass) {
                let input = RegionInput {
                    key: &region.key,
                    state,
                    env,
                    regions,
                };
                let html = (region.producer)(&input)?;
                outputs.insert(region.key.clone(), html);
            }
        }
        debug!(state = ?render_state, produced = outputs.len(), "Produced partials");
        Ok(RenderedRegions { outputs })
    }

    /// Builds the patch script for a refresh: one instruction per volatile
    /// region, in registration order.
    pub fn patch(
        &self,
        regions: &RegionRegistry,
        rendered: &RenderedRegions,
        announce: Message,
    ) -> Result<PatchScript, ConfigurationError> {
        Self::check_selectors(regions)?;
        let mut script = PatchScript::new(announce);
        for region in regions.iter() {
            let kind = match region.mode {
                RegionMode::Static => continue,
                RegionMode::Volatile => PatchKind::Replace,
                RegionMode::VolatileValue => PatchKind::Value,
            };
            script.push(region.selector.clone(), kind, rendered.get(&region.key));
        }
        Ok(script)
    }

    /// Renders a patch script for an asynchronous round-trip.
    pub fn refresh(
        &self,
        regions: &RegionRegistry,
        state: &ViewState,
        env: &RenderEnv<'_>,
        announce: Message,
    ) -> Result<PatchScript, WriteDeskError> {
        let rendered = self.produce(RenderState::Refresh, regions, state, env)?;
        Ok(self.patch(regions, &rendered, announce)?)
    }

    /// Renders the full page.
    pub fn page(
        &self,
        layout: &dyn DocumentLayout,
        regions: &RegionRegistry,
        state: &ViewState,
        env: &RenderEnv<'_>,
        message: &Message,
    ) -> Result<String, WriteDeskError> {
        let rendered = self.produce(RenderState::Initial, regions, state, env)?;
        layout.assemble(&rendered, state, env, message)
    }
}
