//! Scene session: the explicit owner of everything a running scene shares.
//!
//! # Invariants
//! - All randomness in a session flows from one seeded RNG, so a scene file
//!   and seed always plan the same worlds.
//! - Within a frame, every stream ticks before the beat clock.
//! - A disposed world is removed from the session in the frame it disposes.

mod config;
mod dolly;
mod error;
mod session;

pub use config::{SceneConfig, WorldConfig};
pub use dolly::{Dolly, DollyConfig, DollyState};
pub use error::SceneError;
pub use session::{Session, TickReport};

pub fn crate_info() -> &'static str {
    concat!("road-scene v", env!("CARGO_PKG_VERSION"))
}
