//! Shared building blocks for the road engine.
//!
//! # Invariants
//! - Weight strings are validated up front; a malformed string is a
//!   [`ConfigError`], never a silently degraded value.
//! - All randomness flows through an explicitly seeded [`SceneRng`].

mod error;
mod types;
pub mod weights;

pub use error::ConfigError;
pub use types::{ListenerId, SceneRng, seeded_rng};
pub use weights::{ChoicePool, MAX_TOTAL_WEIGHT, parse_probabilities, parse_weights, pick_one};

pub fn crate_info() -> &'static str {
    concat!("road-common v", env!("CARGO_PKG_VERSION"))
}
