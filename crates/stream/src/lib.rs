//! Streaming: materializes planned plot rows around a moving observer.
//!
//! # Invariants
//! - The loading cursor visits every grid cell exactly once, row-major.
//! - Rows recycle strictly in creation order, one per eligible tick, so the
//!   live row count never grows past the grid's row count.
//! - A failing placement leaves its cell empty and never stalls loading.
//! - A missing observer means no progress, never a crash.

mod config;
mod controller;
mod placement;
mod rows;

pub use config::{StreamBudget, StreamConfig};
pub use controller::{Cursor, StreamController, StreamEvent, StreamState, StreamStats};
pub use placement::{PlacementCallback, PlacementContext, PlacementError, StrategyRegistry, StreamError};
pub use rows::RowContainer;

pub fn crate_info() -> &'static str {
    concat!("road-stream v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("stream"));
    }
}
