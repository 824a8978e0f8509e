//! Declarative partial rendering of the editor screen.
//!
//! Every region of the screen is registered with a render mode, the DOM
//! selector where it lives and a producer. A full page render runs every
//! producer and hands the fragments to a [`DocumentLayout`]; an
//! asynchronous round-trip runs only the volatile producers and emits a
//! [`PatchScript`].

mod patch;
mod renderer;
mod view_state;

#[cfg(test)]
mod renderer_tests;

pub use patch::{PatchInstruction, PatchKind, PatchScript};
pub use renderer::{DocumentLayout, PartialRenderer, RenderState, RenderedRegions};
pub use view_state::{RenderEnv, View, ViewState};

use crate::errors::RenderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a region takes part in rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionMode {
    /// Rendered on full page loads only.
    Static,
    /// Replaces the whole fragment at its selector.
    Volatile,
    /// Replaces only the value of the control at its selector.
    VolatileValue,
}

impl RegionMode {
    /// Returns true for the modes that take part in patches.
    #[must_use]
    pub fn is_volatile(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// What a producer sees.
#[derive(Clone, Copy)]
pub struct RegionInput<'a> {
    /// The key the producer is registered under.
    pub key: &'a str,
    /// The article view state.
    pub state: &'a ViewState,
    /// Shared collaborators.
    pub env: &'a RenderEnv<'a>,
    /// The region registry, for producers that embed another region.
    pub regions: &'a RegionRegistry,
}

impl RegionInput<'_> {
    /// Runs the producer registered under `key`.
    pub fn render_region(&self, key: &str) -> Result<String, RenderError> {
        let region = self
            .regions
            .get(key)
            .ok_or_else(|| RenderError::new(key, "no such partial"))?;
        (region.producer)(&RegionInput { key, ..*self })
    }
}

/// Turns view state into markup or a control value.
pub type Producer = Arc<dyn Fn(&RegionInput<'_>) -> Result<String, RenderError> + Send + Sync>;

/// A registered region.
#[derive(Clone)]
pub struct Region {
    /// Unique key.
    pub key: String,
    /// Render mode.
    pub mode: RegionMode,
    /// DOM selector of the region in the rendered page.
    pub selector: String,
    /// The producer.
    pub producer: Producer,
}

impl Region {
    /// Creates a region.
    pub fn new<F>(key: impl Into<String>, mode: RegionMode, selector: impl Into<String>, f: F) -> Self
    where
        F: Fn(&RegionInput<'_>) -> Result<String, RenderError> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            mode,
            selector: selector.into(),
            producer: Arc::new(f),
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("key", &self.key)
            .field("mode", &self.mode)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Ordered registry of regions, rebuilt for every request.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region, or replaces the one with the same key in place.
    pub fn insert(&mut self, region: Region) {
        if let Some(slot) = self.regions.iter_mut().find(|r| r.key == region.key) {
            *slot = region;
        } else {
            self.regions.push(region);
        }
    }

    /// Removes a region.
    pub fn remove(&mut self, key: &str) -> Option<Region> {
        let pos = self.regions.iter().position(|r| r.key == key)?;
        Some(self.regions.remove(pos))
    }

    /// Looks up a region.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.key == key)
    }

    /// Looks up a region for editing.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.key == key)
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Keys in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.key.as_str()).collect()
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns true if there are no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
