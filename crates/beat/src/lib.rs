//! Beat clock: turns frame deltas into a contiguous stream of pulses.
//!
//! # Invariants
//! - No pulse is emitted before the clock has started.
//! - Pulse indices increase by exactly one per pulse, with no gaps, even
//!   when a single long frame spans several pulse periods.
//! - Listeners are held in an explicit registry keyed by pulse index; the
//!   clock never reaches into the content that registered them.

mod clock;
mod registry;

pub use clock::{BeatClock, BeatConfig};
pub use registry::{Pulse, PulseRegistry, Reaction};

pub fn crate_info() -> &'static str {
    concat!("road-beat v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("beat"));
    }
}
