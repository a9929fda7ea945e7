use std::collections::BTreeSet;
use std::time::Duration;

use glam::Vec3;
use road_common::ConfigError;
use serde::{Deserialize, Serialize};

use crate::registry::{Pulse, PulseRegistry};

/// Beat clock configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeatConfig {
    /// Length of one pulse in milliseconds.
    pub pulse_period_ms: f64,
    /// The clock starts once the observer's z drops below this line.
    pub start_threshold: f32,
    /// Pulse indices that are also broadcast scene-wide.
    pub scene_pulses: Vec<u64>,
    /// Log every pulse with the observer position, for timing content to a song.
    pub log_pulses: bool,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            pulse_period_ms: 500.0,
            start_threshold: -50.0,
            scene_pulses: Vec::new(),
            log_pulses: false,
        }
    }
}

impl BeatConfig {
    /// Config with the pulse period derived from a tempo in beats per minute.
    pub fn from_bpm(bpm: f64) -> Self {
        Self {
            pulse_period_ms: 60_000.0 / bpm,
            ..Self::default()
        }
    }

    /// Validated pulse period.
    pub fn pulse_period(&self) -> Result<Duration, ConfigError> {
        let ms = self.pulse_period_ms;
        if !ms.is_finite() || ms <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "pulse_period_ms",
            });
        }
        Ok(Duration::from_secs_f64(ms / 1000.0))
    }
}

/// Frame-driven metronome.
///
/// Waits for the observer to cross `start_threshold`, then emits one pulse
/// per elapsed period. A long frame emits every missed pulse in order.
///
/// The observer only gates the start. Once running, the clock follows
/// frame time alone and keeps pulsing through observer outages, so music
/// and content stay in step.
#[derive(Debug, Clone)]
pub struct BeatClock {
    pulse_period: Duration,
    next_pulse_deadline: Duration,
    elapsed: Duration,
    pulse_index: u64,
    started: bool,
    start_threshold: f32,
    scene_pulses: BTreeSet<u64>,
    log_pulses: bool,
    observer_missing: bool,
}

impl BeatClock {
    pub fn new(config: &BeatConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            pulse_period: config.pulse_period()?,
            next_pulse_deadline: Duration::ZERO,
            elapsed: Duration::ZERO,
            pulse_index: 0,
            started: false,
            start_threshold: config.start_threshold,
            scene_pulses: config.scene_pulses.iter().copied().collect(),
            log_pulses: config.log_pulses,
            observer_missing: false,
        })
    }

    /// Start immediately, regardless of the observer. No-op once running.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.elapsed = Duration::ZERO;
        self.pulse_index = 0;
        self.next_pulse_deadline = Duration::ZERO;
        tracing::info!(period = ?self.pulse_period, "beat clock started");
    }

    /// Advance by one frame. Returns the pulses emitted, in order.
    pub fn tick(&mut self, dt: Duration, observer: Option<Vec3>, registry: &mut PulseRegistry) -> Vec<Pulse> {
        self.elapsed += dt;

        if !self.started {
            let Some(position) = observer else {
                if !self.observer_missing {
                    tracing::warn!("beat clock has no observer; waiting to start");
                    self.observer_missing = true;
                }
                return Vec::new();
            };
            self.observer_missing = false;
            if position.z < self.start_threshold {
                self.start();
            }
            return Vec::new();
        }

        let mut emitted = Vec::new();
        while self.elapsed > self.next_pulse_deadline {
            let pulse = Pulse {
                index: self.pulse_index,
                scene: self.scene_pulses.contains(&self.pulse_index),
            };
            let notified = registry.dispatch(&pulse);
            if self.log_pulses {
                tracing::info!(pulse = pulse.index, z = ?observer.map(|p| p.z), notified, "pulse");
            } else {
                tracing::debug!(pulse = pulse.index, notified, "pulse");
            }
            emitted.push(pulse);
            self.pulse_index += 1;
            self.next_pulse_deadline += self.pulse_period;
        }
        emitted
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Index of the next pulse to be emitted.
    pub fn pulse_index(&self) -> u64 {
        self.pulse_index
    }

    pub fn next_pulse_deadline(&self) -> Duration {
        self.next_pulse_deadline
    }

    pub fn pulse_period(&self) -> Duration {
        self.pulse_period
    }

    /// Time accumulated since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
