use std::collections::BTreeMap;

use glam::Vec3;
use road_beat::PulseRegistry;
use road_common::{ConfigError, SceneRng};
use road_plan::{Grid, PlacementRequest};

use crate::config::StreamConfig;
use crate::rows::RowContainer;

/// Errors raised while building a stream controller.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no placement strategy named {0:?}")]
    UnknownStrategy(String),
}

/// A placement callback failed for one cell.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("placement failed: {reason}")]
pub struct PlacementError {
    pub reason: String,
}

impl PlacementError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Everything a placement callback may read or touch for one cell.
pub struct PlacementContext<'a, T> {
    pub request: PlacementRequest,
    /// Cell position relative to its row.
    pub local: Vec3,
    /// Cell position in world space at the time of placement.
    pub world: Vec3,
    pub row: &'a mut RowContainer<T>,
    pub grid: &'a Grid,
    pub config: &'a StreamConfig,
    pub pulses: &'a mut PulseRegistry,
    pub rng: &'a mut SceneRng,
}

/// Builds domain content for occupied grid cells.
///
/// Called synchronously once per occupied cell while loading; must not
/// block. Content goes into `ctx.row`.
pub trait PlacementCallback<T> {
    fn place(&mut self, ctx: &mut PlacementContext<'_, T>) -> Result<(), PlacementError>;

    /// Called with each row as it is torn down.
    fn release(&mut self, _row: RowContainer<T>, _pulses: &mut PulseRegistry) {}
}

impl<T, F> PlacementCallback<T> for F
where
    F: FnMut(&mut PlacementContext<'_, T>) -> Result<(), PlacementError>,
{
    fn place(&mut self, ctx: &mut PlacementContext<'_, T>) -> Result<(), PlacementError> {
        self(ctx)
    }
}

type StrategyFactory<T> = Box<dyn Fn() -> Box<dyn PlacementCallback<T>>>;

/// Named placement strategies, injected into whatever builds controllers.
///
/// Each resolve creates a fresh callback so controllers never share state.
pub struct StrategyRegistry<T> {
    factories: BTreeMap<String, StrategyFactory<T>>,
}

impl<T> StrategyRegistry<T> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a strategy under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn PlacementCallback<T>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn resolve(&self, name: &str) -> Result<Box<dyn PlacementCallback<T>>, StreamError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| StreamError::UnknownStrategy(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl<T> Default for StrategyRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
