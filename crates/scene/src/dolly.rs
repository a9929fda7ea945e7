use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Vertical speed while rising, in units per second.
const RISE_SPEED: f32 = 0.5;

/// Scripted observer path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DollyConfig {
    /// Position before the start trigger.
    pub start: Vec3,
    /// Travel speed towards -z in units per second.
    pub speed: f32,
    /// The dolly halts once it has passed this z.
    pub stop: f32,
    /// Past this z the dolly slowly rises. `None` never rises.
    pub rise: Option<f32>,
    /// Ceiling for the rise.
    pub rise_max: f32,
}

impl Default for DollyConfig {
    fn default() -> Self {
        Self {
            start: Vec3::new(0.0, 1.6, 50.0),
            speed: 5.0,
            stop: -100.0,
            rise: None,
            rise_max: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DollyState {
    Waiting,
    Moving,
    Done,
}

/// Moves the observer along the traversal axis at a constant speed.
#[derive(Debug, Clone)]
pub struct Dolly {
    config: DollyConfig,
    position: Vec3,
    state: DollyState,
}

impl Dolly {
    pub fn new(config: DollyConfig) -> Self {
        Self {
            position: config.start,
            config,
            state: DollyState::Waiting,
        }
    }

    pub fn start(&mut self) {
        if self.state == DollyState::Waiting {
            tracing::info!(z = self.position.z, speed = self.config.speed, "dolly started");
            self.state = DollyState::Moving;
        }
    }

    /// Advance by one frame and return the new position.
    pub fn tick(&mut self, dt: Duration) -> Vec3 {
        if self.state != DollyState::Moving {
            return self.position;
        }
        let secs = dt.as_secs_f32();
        let before = self.position;

        let mut step = Vec3::new(0.0, 0.0, -self.config.speed * secs);
        if self.config.rise.is_some_and(|r| before.z < r) && before.y < self.config.rise_max {
            step.y += RISE_SPEED * secs;
        }
        self.position += step;

        // The frame that crosses the stop line still moves.
        if before.z < self.config.stop {
            tracing::info!(z = self.position.z, "dolly stopped");
            self.state = DollyState::Done;
        }
        self.position
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn state(&self) -> DollyState {
        self.state
    }
}
