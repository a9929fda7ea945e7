use rand::Rng;
use road_common::{ChoicePool, ConfigError, parse_probabilities, parse_weights};
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Planner configuration: block tiling plus plot size and height distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Columns (x cells) per block.
    pub block_cols: usize,
    /// Rows (z cells) per block.
    pub block_rows: usize,
    pub num_blocks_x: usize,
    pub num_blocks_z: usize,
    /// Empty cells between neighbouring blocks.
    pub gap_width: usize,
    pub max_plot_size: usize,
    /// Per-size placement probabilities, smallest size first.
    pub size_weights: String,
    pub max_height: usize,
    /// Integer weights for heights `1..=max_height`.
    pub height_weights: String,
    /// Reject any plot whose footprint would intersect an earlier footprint.
    pub strict_footprints: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            block_cols: 5,
            block_rows: 15,
            num_blocks_x: 1,
            num_blocks_z: 1,
            gap_width: 0,
            max_plot_size: 5,
            size_weights: "0.2 0.2 0.2 0.2 0.2".into(),
            max_height: 5,
            height_weights: "1 1 1 1 1".into(),
            strict_footprints: false,
        }
    }
}

impl PlannerConfig {
    /// Total columns across all blocks and gaps.
    pub fn total_cols(&self) -> usize {
        tiled_len(self.block_cols, self.num_blocks_x, self.gap_width)
    }

    /// Total rows across all blocks and gaps.
    pub fn total_rows(&self) -> usize {
        tiled_len(self.block_rows, self.num_blocks_z, self.gap_width)
    }
}

fn tiled_len(block: usize, count: usize, gap: usize) -> usize {
    block * count + gap * count.saturating_sub(1)
}

/// Half-open cell rectangle of one block.
#[derive(Debug, Clone, Copy)]
struct Block {
    rows: (usize, usize),
    cols: (usize, usize),
}

/// Validated planner, ready to lay out grids.
#[derive(Debug, Clone)]
pub struct GridPlanner {
    config: PlannerConfig,
    size_probabilities: Vec<f64>,
    heights: ChoicePool<u32>,
}

impl GridPlanner {
    /// Validate the config and parse its weight strings.
    pub fn new(config: PlannerConfig) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("block_cols", config.block_cols),
            ("block_rows", config.block_rows),
            ("num_blocks_x", config.num_blocks_x),
            ("num_blocks_z", config.num_blocks_z),
            ("max_plot_size", config.max_plot_size),
            ("max_height", config.max_height),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension { name, value, min: 1 });
            }
        }

        let size_probabilities = parse_probabilities(&config.size_weights)?;
        if size_probabilities.len() != config.max_plot_size {
            return Err(ConfigError::LengthMismatch {
                options: config.max_plot_size,
                weights: size_probabilities.len(),
            });
        }

        let height_options: Vec<u32> = (1..=config.max_height as u32).collect();
        let heights = ChoicePool::from_weights(height_options, &parse_weights(&config.height_weights)?)?;

        Ok(Self {
            config,
            size_probabilities,
            heights,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Lay out a fresh grid.
    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> Grid {
        let cfg = &self.config;
        let mut grid = Grid::new(cfg.total_rows(), cfg.total_cols());
        let mut claimed = cfg
            .strict_footprints
            .then(|| vec![false; grid.len()]);

        for block in self.blocks() {
            for size in (1..=cfg.max_plot_size).rev() {
                self.plan_size(&mut grid, claimed.as_deref_mut(), block, size, rng);
            }
        }

        tracing::debug!(
            rows = grid.rows(),
            cols = grid.cols(),
            plots = grid.occupied_count(),
            strict = cfg.strict_footprints,
            "grid planned"
        );
        grid
    }

    /// Block rectangles. `total_rows`/`total_cols` are derived from the
    /// same tiling, so every block fits the grid exactly.
    fn blocks(&self) -> Vec<Block> {
        let cfg = &self.config;
        let mut blocks = Vec::with_capacity(cfg.num_blocks_x * cfg.num_blocks_z);
        for bz in 0..cfg.num_blocks_z {
            let row_start = bz * (cfg.block_rows + cfg.gap_width);
            for bx in 0..cfg.num_blocks_x {
                let col_start = bx * (cfg.block_cols + cfg.gap_width);
                blocks.push(Block {
                    rows: (row_start, row_start + cfg.block_rows),
                    cols: (col_start, col_start + cfg.block_cols),
                });
            }
        }
        blocks
    }

    fn plan_size<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        mut claimed: Option<&mut [bool]>,
        block: Block,
        size: usize,
        rng: &mut R,
    ) {
        let border = size / 2;
        let dist = size as f32 / 2.0;
        let probability = self.size_probabilities[size - 1];

        for row in block.rows.0 + border..block.rows.1.saturating_sub(border) {
            for col in block.cols.0 + border..block.cols.1.saturating_sub(border) {
                let clearance = grid.cell_mut(row, col).clearance;
                if dist == clearance.x || dist == clearance.z {
                    continue;
                }
                if !(dist > clearance.x || dist > clearance.z) {
                    continue;
                }
                if rng.random::<f64>() >= probability {
                    continue;
                }
                if let Some(mask) = claimed.as_deref() {
                    if footprint_claimed(grid, mask, row, col, size) {
                        tracing::trace!(row, col, size, "strict mode rejected plot");
                        continue;
                    }
                }

                let height = *self.heights.sample(rng);
                let cell = grid.cell_mut(row, col);
                cell.width = size as u32;
                cell.height = height;
                tracing::trace!(row, col, size, height, "plot placed");

                record_clearance(grid, block, row, col, size, dist);
                if let Some(mask) = claimed.as_deref_mut() {
                    claim_footprint(grid, mask, row, col, size);
                }
            }
        }
    }
}

/// Plan a grid in one call.
pub fn plan<R: Rng + ?Sized>(config: PlannerConfig, rng: &mut R) -> Result<Grid, ConfigError> {
    Ok(GridPlanner::new(config)?.plan(rng))
}

/// Inclusive cell range within `reach` of `center`, clipped to `[lo, hi)`.
fn reach_range(center: usize, reach: usize, lo: usize, hi: usize) -> std::ops::RangeInclusive<usize> {
    center.saturating_sub(reach).max(lo)..=(center + reach).min(hi - 1)
}

fn record_clearance(grid: &mut Grid, block: Block, row: usize, col: usize, size: usize, dist: f32) {
    let reach = size - 1;
    for zi in reach_range(row, reach, block.rows.0, block.rows.1) {
        for xi in reach_range(col, reach, block.cols.0, block.cols.1) {
            let c = &mut grid.cell_mut(zi, xi).clearance;
            c.x = c.x.max(dist - col.abs_diff(xi) as f32);
            c.z = c.z.max(dist - row.abs_diff(zi) as f32);
        }
    }
}

fn footprint_claimed(grid: &Grid, mask: &[bool], row: usize, col: usize, size: usize) -> bool {
    let reach = size - 1;
    reach_range(row, reach, 0, grid.rows()).any(|zi| {
        reach_range(col, reach, 0, grid.cols()).any(|xi| mask[zi * grid.cols() + xi])
    })
}

fn claim_footprint(grid: &Grid, mask: &mut [bool], row: usize, col: usize, size: usize) {
    let reach = size - 1;
    for zi in reach_range(row, reach, 0, grid.rows()) {
        for xi in reach_range(col, reach, 0, grid.cols()) {
            mask[zi * grid.cols() + xi] = true;
        }
    }
}
