use glam::Vec3;
use road_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Per-tick work limits for the stream controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamBudget {
    /// Cursor cells visited per tick while loading.
    pub load_cells_per_tick: usize,
    /// Rows released per tick while unloading. `None` releases all at once.
    pub unload_rows_per_tick: Option<usize>,
}

impl Default for StreamBudget {
    fn default() -> Self {
        Self {
            load_cells_per_tick: 1,
            unload_rows_per_tick: None,
        }
    }
}

/// Streaming configuration: world placement, thresholds and budgets.
///
/// The observer travels towards -z. Thresholds are world z coordinates and
/// are crossed when the observer's z drops below them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Distance between neighbouring grid cells in world units.
    pub cell_size: f32,
    /// World position of grid cell (0, 0). Rows extend towards -z.
    pub origin: Vec3,
    /// Loading only progresses while the observer is below this line.
    /// `None` loads regardless of the observer.
    pub load_threshold: Option<f32>,
    /// Load threshold installed by an external start trigger.
    pub start_load_threshold: Option<f32>,
    /// Rows stop recycling once the observer is below this line.
    pub stop_follow_threshold: f32,
    /// Crossing this line tears the world down.
    pub unload_threshold: Option<f32>,
    /// Crossing this line raises a one-shot show-time notification.
    pub show_time_threshold: Option<f32>,
    pub budget: StreamBudget,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            cell_size: 5.0,
            origin: Vec3::ZERO,
            load_threshold: None,
            start_load_threshold: None,
            stop_follow_threshold: 0.0,
            unload_threshold: None,
            show_time_threshold: None,
            budget: StreamBudget::default(),
        }
    }
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::NonPositive { name: "cell_size" });
        }
        if self.budget.load_cells_per_tick == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "load_cells_per_tick",
                value: 0,
                min: 1,
            });
        }
        if self.budget.unload_rows_per_tick == Some(0) {
            return Err(ConfigError::InvalidDimension {
                name: "unload_rows_per_tick",
                value: 0,
                min: 1,
            });
        }
        Ok(())
    }
}
