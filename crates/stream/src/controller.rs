use glam::Vec3;
use road_beat::PulseRegistry;
use road_common::{ConfigError, SceneRng};
use road_plan::{Grid, GridPlanner, PlannerConfig};

use crate::config::StreamConfig;
use crate::placement::{PlacementCallback, PlacementContext, StreamError};
use crate::rows::RowContainer;

/// Lifecycle state of a stream controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Loading,
    Streaming,
    Unloading,
    Disposed,
}

/// Loading scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub col: usize,
    pub row: usize,
}

/// Notifications raised by a controller, drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The external start trigger was received.
    Started,
    /// Every cell has been visited; rows now recycle.
    WorldLoaded,
    /// The observer crossed the show-time line.
    ShowTime,
    /// A row moved to the far end of the world.
    RowRecycled { row: usize, z: f32 },
    /// The observer crossed the unload line.
    Unloading,
    /// All rows are released; the controller ignores further ticks.
    Disposed,
}

/// Per-tick streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub cells_visited_this_tick: usize,
    pub plots_placed_this_tick: usize,
    pub placement_failures_this_tick: usize,
    pub rows_recycled_this_tick: usize,
    pub rows_released_this_tick: usize,
    pub live_rows: usize,
}

/// Streams one planned grid of plot rows around a moving observer.
///
/// Loading walks a cursor over the grid, a few cells per tick, creating row
/// containers on demand and handing occupied cells to the placement
/// callback. Once loaded, rows the observer has passed are moved to the far
/// end of the world, so traversal is unbounded while the row count is not.
pub struct StreamController<T> {
    name: String,
    config: StreamConfig,
    grid: Grid,
    callback: Box<dyn PlacementCallback<T>>,
    state: StreamState,
    cursor: Cursor,
    rows: Vec<RowContainer<T>>,
    recycle_index: usize,
    recycle_wraps: u64,
    recycle_line: f32,
    load_threshold: Option<f32>,
    cells_visited: usize,
    show_time_fired: bool,
    observer_missing: bool,
    events: Vec<StreamEvent>,
    stats: StreamStats,
}

impl<T> StreamController<T> {
    /// Plan a grid and build a controller around it.
    pub fn new(
        name: impl Into<String>,
        config: StreamConfig,
        planner: PlannerConfig,
        callback: Box<dyn PlacementCallback<T>>,
        rng: &mut SceneRng,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        let grid = GridPlanner::new(planner)?.plan(rng);
        Self::from_grid(name, config, grid, callback)
    }

    /// Build a controller around an already planned grid.
    pub fn from_grid(
        name: impl Into<String>,
        config: StreamConfig,
        grid: Grid,
        callback: Box<dyn PlacementCallback<T>>,
    ) -> Result<Self, StreamError> {
        config.validate()?;
        if grid.rows() > 0 && grid.cols() == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "grid_cols",
                value: 0,
                min: 1,
            }
            .into());
        }
        let name = name.into();
        let depth = grid.rows().saturating_sub(1) as f32 * config.cell_size;
        let recycle_line = config.origin.z - depth / 2.0;

        tracing::info!(
            world = %name,
            rows = grid.rows(),
            cols = grid.cols(),
            plots = grid.occupied_count(),
            start_z = config.origin.z,
            end_z = config.origin.z - depth,
            recycle_line,
            load_threshold = ?config.load_threshold,
            stop_follow = config.stop_follow_threshold,
            unload = ?config.unload_threshold,
            "stream controller created"
        );

        Ok(Self {
            name,
            load_threshold: config.load_threshold,
            config,
            grid,
            callback,
            state: StreamState::Loading,
            cursor: Cursor::default(),
            rows: Vec::new(),
            recycle_index: 0,
            recycle_wraps: 0,
            recycle_line,
            cells_visited: 0,
            show_time_fired: false,
            observer_missing: false,
            events: Vec::new(),
            stats: StreamStats::default(),
        })
    }

    /// External start trigger: installs the start load threshold.
    pub fn start(&mut self) {
        if self.state == StreamState::Disposed {
            return;
        }
        if self.state == StreamState::Loading {
            self.load_threshold = self.config.start_load_threshold;
        }
        tracing::info!(world = %self.name, load_threshold = ?self.load_threshold, "stream started");
        self.events.push(StreamEvent::Started);
    }

    /// Advance one frame using the observer's current position.
    pub fn tick(&mut self, observer: Option<Vec3>, pulses: &mut PulseRegistry, rng: &mut SceneRng) {
        let _span = tracing::info_span!("stream_tick", world = %self.name).entered();
        self.stats = StreamStats {
            live_rows: self.rows.len(),
            ..StreamStats::default()
        };

        match self.state {
            StreamState::Disposed => return,
            StreamState::Unloading => {
                self.unload_step(pulses);
                return;
            }
            StreamState::Loading | StreamState::Streaming => {}
        }

        let Some(position) = observer else {
            if !self.observer_missing {
                tracing::warn!(world = %self.name, "no observer position; streaming paused");
                self.observer_missing = true;
            }
            return;
        };
        if self.observer_missing {
            tracing::info!(world = %self.name, "observer found; streaming resumed");
            self.observer_missing = false;
        }
        let z = position.z;

        if !self.show_time_fired && self.config.show_time_threshold.is_some_and(|t| z < t) {
            self.show_time_fired = true;
            tracing::info!(world = %self.name, z, "show time");
            self.events.push(StreamEvent::ShowTime);
        }

        if self.config.unload_threshold.is_some_and(|t| z < t) {
            tracing::info!(world = %self.name, z, "unload threshold crossed");
            self.state = StreamState::Unloading;
            self.events.push(StreamEvent::Unloading);
            self.unload_step(pulses);
            return;
        }

        match self.state {
            StreamState::Loading => self.load_step(z, pulses, rng),
            StreamState::Streaming => self.recycle_step(z),
            StreamState::Unloading | StreamState::Disposed => {}
        }
    }

    fn load_step(&mut self, z: f32, pulses: &mut PulseRegistry, rng: &mut SceneRng) {
        if self.load_threshold.is_some_and(|t| z >= t) {
            return;
        }
        for _ in 0..self.config.budget.load_cells_per_tick {
            if self.cursor.row >= self.grid.rows() {
                break;
            }
            self.visit_cursor(pulses, rng);
        }
        self.stats.live_rows = self.rows.len();

        if self.cursor.row >= self.grid.rows() {
            tracing::info!(world = %self.name, cells = self.cells_visited, "world loaded");
            self.state = StreamState::Streaming;
            self.events.push(StreamEvent::WorldLoaded);
        }
    }

    fn visit_cursor(&mut self, pulses: &mut PulseRegistry, rng: &mut SceneRng) {
        let Cursor { row, col } = self.cursor;
        if col == 0 {
            let offset = self.config.origin - Vec3::Z * (row as f32 * self.config.cell_size);
            self.rows.push(RowContainer::new(row, offset));
        }

        if let Some(request) = self.grid.placement_at(row, col) {
            let local = Vec3::X * (col as f32 * self.config.cell_size);
            let container = &mut self.rows[row];
            let before = container.len();
            let mut ctx = PlacementContext {
                request,
                local,
                world: container.offset() + local,
                row: container,
                grid: &self.grid,
                config: &self.config,
                pulses,
                rng,
            };
            match self.callback.place(&mut ctx) {
                Ok(()) => {
                    tracing::trace!(row, col, width = request.width, height = request.height, "plot placed");
                    self.stats.plots_placed_this_tick += 1;
                }
                Err(err) => {
                    tracing::warn!(world = %self.name, row, col, error = %err, "placement failed; cell left empty");
                    ctx.row.truncate(before);
                    self.stats.placement_failures_this_tick += 1;
                }
            }
        }

        self.cells_visited += 1;
        self.stats.cells_visited_this_tick += 1;
        self.cursor.col += 1;
        if self.cursor.col == self.grid.cols() {
            self.cursor.col = 0;
            self.cursor.row += 1;
        }
    }

    fn recycle_step(&mut self, z: f32) {
        if !(z > self.config.stop_follow_threshold && z < self.recycle_line) {
            return;
        }
        let total = self.rows.len();
        if total == 0 {
            return;
        }

        let shift = Vec3::Z * (total as f32 * self.config.cell_size);
        let row = &mut self.rows[self.recycle_index];
        row.recycle(-shift);
        tracing::debug!(world = %self.name, row = row.index(), z = row.offset().z, "row recycled");
        self.events.push(StreamEvent::RowRecycled {
            row: row.index(),
            z: row.offset().z,
        });

        self.recycle_line -= self.config.cell_size;
        self.recycle_index = (self.recycle_index + 1) % total;
        if self.recycle_index == 0 {
            self.recycle_wraps += 1;
        }
        self.stats.rows_recycled_this_tick = 1;
    }

    fn unload_step(&mut self, pulses: &mut PulseRegistry) {
        let count = self
            .config
            .budget
            .unload_rows_per_tick
            .unwrap_or(self.rows.len())
            .min(self.rows.len());
        for row in self.rows.drain(..count) {
            self.callback.release(row, pulses);
        }
        self.stats.rows_released_this_tick = count;
        self.stats.live_rows = self.rows.len();
        tracing::debug!(world = %self.name, released = count, remaining = self.rows.len(), "rows released");

        if self.rows.is_empty() {
            tracing::info!(world = %self.name, "stream disposed");
            self.state = StreamState::Disposed;
            self.events.push(StreamEvent::Disposed);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == StreamState::Disposed
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Live rows in creation order.
    pub fn rows(&self) -> &[RowContainer<T>] {
        &self.rows
    }

    /// Index of the next row to recycle.
    pub fn recycle_index(&self) -> usize {
        self.recycle_index
    }

    /// How many times `recycle_index` has wrapped back to the first row.
    pub fn recycle_wraps(&self) -> u64 {
        self.recycle_wraps
    }

    /// World z the observer must pass before the next recycle.
    pub fn recycle_line(&self) -> f32 {
        self.recycle_line
    }

    pub fn load_threshold(&self) -> Option<f32> {
        self.load_threshold
    }

    /// Total cursor visits so far.
    pub fn cells_visited(&self) -> usize {
        self.cells_visited
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Read-only access to pending events.
    pub fn events(&self) -> &[StreamEvent] {
        &self.events
    }

    /// Drain and return pending events.
    pub fn drain_events(&mut self) -> Vec<StreamEvent> {
        std::mem::take(&mut self.events)
    }
}
