//! Grid planning: lays out variable-size plots over a block grid.
//!
//! # Invariants
//! - Planning is a pure function of the config and the RNG draws.
//! - Larger plots are attempted before smaller ones within each block.
//! - A later plot is never centered on, or enclosed by, an earlier plot.
//!
//! # Workaround
//! Overlap avoidance is a greedy clearance heuristic. It reduces footprint
//! overlap but does not eliminate it; `strict_footprints` adds an occupancy
//! mask for callers that need hard exclusivity.

mod grid;
mod planner;

pub use grid::{Cell, Clearance, Grid, PlacementRequest};
pub use planner::{GridPlanner, PlannerConfig, plan};

pub fn crate_info() -> &'static str {
    concat!("road-plan v", env!("CARGO_PKG_VERSION"))
}
