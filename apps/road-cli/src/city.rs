//! Demo placement strategy: a block of towers that flash on the beat.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use rand::Rng;
use road_beat::{Pulse, PulseRegistry, Reaction};
use road_common::{ChoicePool, ConfigError, ListenerId};
use road_stream::{PlacementCallback, PlacementContext, PlacementError, RowContainer, StrategyRegistry};

/// Pulses between two flashes of the same tower.
const FLASH_EVERY: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Neon,
    Steel,
    Glass,
}

/// One placed tower, positioned relative to its row.
#[derive(Debug, Clone)]
pub struct Tower {
    pub local: Vec3,
    pub footprint: f32,
    pub height: f32,
    pub palette: Palette,
    pub listener: ListenerId,
}

/// Counters shared by every tower of a run.
#[derive(Debug, Clone, Default)]
pub struct CityStats {
    pub flashes: Rc<Cell<u64>>,
    pub towers: Rc<Cell<u64>>,
}

#[derive(Clone)]
pub struct CityBuilder {
    palettes: ChoicePool<Palette>,
    stats: CityStats,
}

impl CityBuilder {
    pub fn new(palette_weights: &str, stats: CityStats) -> Result<Self, ConfigError> {
        Ok(Self {
            palettes: ChoicePool::new(vec![Palette::Neon, Palette::Steel, Palette::Glass], palette_weights)?,
            stats,
        })
    }
}

impl PlacementCallback<Tower> for CityBuilder {
    fn place(&mut self, ctx: &mut PlacementContext<'_, Tower>) -> Result<(), PlacementError> {
        let cell = ctx.config.cell_size;
        // A plot of width w spans 2w-1 cells; keep a margin to the neighbours.
        let footprint = (2 * ctx.request.width - 1) as f32 * cell * 0.8;
        let height = ctx.request.height as f32 * cell * ctx.rng.random_range(0.8..1.2);
        let palette = *self.palettes.sample(&mut *ctx.rng);

        let flashes = Rc::clone(&self.stats.flashes);
        let first = (ctx.request.row + ctx.request.col) as u64 % FLASH_EVERY;
        let listener = ctx.pulses.register(first, move |pulse: &Pulse| {
            flashes.set(flashes.get() + 1);
            Reaction::Rearm(pulse.index + FLASH_EVERY)
        });

        ctx.row.push(Tower {
            local: ctx.local,
            footprint,
            height,
            palette,
            listener,
        });
        self.stats.towers.set(self.stats.towers.get() + 1);
        Ok(())
    }

    fn release(&mut self, row: RowContainer<Tower>, pulses: &mut PulseRegistry) {
        for tower in row.into_items() {
            pulses.unregister(tower.listener);
        }
    }
}

/// Strategy registry used by the CLI.
pub fn strategies(stats: &CityStats) -> Result<StrategyRegistry<Tower>, ConfigError> {
    let city = CityBuilder::new("2 5 3", stats.clone())?;
    let mut registry = StrategyRegistry::new();
    registry.register("city", move || Box::new(city.clone()) as Box<dyn PlacementCallback<Tower>>);
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use road_common::seeded_rng;
    use road_plan::PlannerConfig;
    use road_stream::{StreamConfig, StreamController};

    #[test]
    fn towers_flash_and_unsubscribe() {
        let stats = CityStats::default();
        let registry = strategies(&stats).unwrap();
        let mut rng = seeded_rng(5);
        let mut ctrl = StreamController::new(
            "city",
            StreamConfig {
                unload_threshold: Some(-10.0),
                budget: road_stream::StreamBudget {
                    load_cells_per_tick: 75,
                    unload_rows_per_tick: None,
                },
                ..StreamConfig::default()
            },
            PlannerConfig::default(),
            registry.resolve("city").unwrap(),
            &mut rng,
        )
        .unwrap();
        let mut pulses = PulseRegistry::new();

        ctrl.tick(Some(Vec3::new(0.0, 1.6, 10.0)), &mut pulses, &mut rng);
        let towers = stats.towers.get() as usize;
        assert_eq!(towers, ctrl.grid().occupied_count());
        assert_eq!(pulses.len(), towers);

        for tower in ctrl.rows().iter().flat_map(|r| r.items()) {
            assert!(tower.height > 0.0);
            assert!(tower.footprint > 0.0);
        }

        for index in 0..FLASH_EVERY {
            pulses.dispatch(&Pulse { index, scene: false });
        }
        assert_eq!(stats.flashes.get() as usize, towers);

        ctrl.tick(Some(Vec3::new(0.0, 1.6, -11.0)), &mut pulses, &mut rng);
        assert!(ctrl.is_disposed());
        assert!(pulses.is_empty());
    }

    #[test]
    fn bad_palette_weights_are_rejected() {
        assert!(CityBuilder::new("1 2", CityStats::default()).is_err());
    }
}
