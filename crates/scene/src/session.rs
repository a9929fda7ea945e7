use std::time::Duration;

use glam::Vec3;
use road_beat::{BeatClock, Pulse, PulseRegistry};
use road_common::{SceneRng, seeded_rng};
use road_stream::{StrategyRegistry, StreamController, StreamError, StreamEvent};

use crate::config::SceneConfig;
use crate::dolly::Dolly;
use crate::error::SceneError;

/// What happened during one session frame.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub frame: u64,
    /// Stream notifications, tagged with the world that raised them.
    pub events: Vec<(String, StreamEvent)>,
    /// Pulses emitted this frame, in order.
    pub pulses: Vec<Pulse>,
    /// Worlds removed this frame after disposal.
    pub disposed: Vec<String>,
    pub live_rows: usize,
}

/// One running scene.
///
/// Owns everything that would otherwise be ambient state: the scene RNG,
/// the beat clock with its listener registry, and the stream controllers.
/// Content reaches these only through the references handed to placement
/// callbacks.
pub struct Session<T> {
    rng: SceneRng,
    clock: BeatClock,
    pulses: PulseRegistry,
    streams: Vec<StreamController<T>>,
    dolly: Option<Dolly>,
    frame: u64,
}

impl<T> Session<T> {
    /// Build every world in `config`, resolving strategies by name.
    pub fn new(config: &SceneConfig, strategies: &StrategyRegistry<T>) -> Result<Self, SceneError> {
        let _span = tracing::info_span!("session_new", seed = config.seed).entered();
        let mut rng = seeded_rng(config.seed);
        let clock = BeatClock::new(&config.beat)?;

        let mut streams = Vec::with_capacity(config.worlds.len());
        for world in &config.worlds {
            let wrap = |source: StreamError| SceneError::Stream {
                world: world.name.clone(),
                source,
            };
            let callback = strategies.resolve(&world.strategy).map_err(wrap)?;
            let controller = StreamController::new(
                world.name.clone(),
                world.stream.clone(),
                world.planner.clone(),
                callback,
                &mut rng,
            )
            .map_err(wrap)?;
            streams.push(controller);
        }

        tracing::info!(worlds = streams.len(), "session ready");
        Ok(Self {
            rng,
            clock,
            pulses: PulseRegistry::new(),
            streams,
            dolly: config.dolly.clone().map(Dolly::new),
            frame: 0,
        })
    }

    /// External start trigger, forwarded to every world and the dolly.
    pub fn start(&mut self) {
        for stream in &mut self.streams {
            stream.start();
        }
        if let Some(dolly) = &mut self.dolly {
            dolly.start();
        }
    }

    /// Advance one frame: streams first, then the beat clock.
    pub fn tick(&mut self, dt: Duration, observer: Option<Vec3>) -> TickReport {
        let _span = tracing::info_span!("session_tick", frame = self.frame).entered();
        let mut report = TickReport {
            frame: self.frame,
            ..TickReport::default()
        };

        for stream in &mut self.streams {
            stream.tick(observer, &mut self.pulses, &mut self.rng);
            let name = stream.name().to_string();
            report
                .events
                .extend(stream.drain_events().into_iter().map(|e| (name.clone(), e)));
        }

        let before = self.streams.len();
        let disposed = &mut report.disposed;
        self.streams.retain(|stream| {
            if stream.is_disposed() {
                disposed.push(stream.name().to_string());
                false
            } else {
                true
            }
        });
        if self.streams.len() != before {
            tracing::info!(removed = before - self.streams.len(), remaining = self.streams.len(), "worlds removed");
        }

        report.pulses = self.clock.tick(dt, observer, &mut self.pulses);
        report.live_rows = self.streams.iter().map(|s| s.rows().len()).sum();
        self.frame += 1;
        report
    }

    /// Advance the dolly, then tick with its position as the observer.
    ///
    /// Without a dolly the session ticks with no observer.
    pub fn advance(&mut self, dt: Duration) -> TickReport {
        let observer = self.dolly.as_mut().map(|d| d.tick(dt));
        self.tick(dt, observer)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Live worlds, in configuration order.
    pub fn streams(&self) -> &[StreamController<T>] {
        &self.streams
    }

    pub fn stream(&self, name: &str) -> Option<&StreamController<T>> {
        self.streams.iter().find(|s| s.name() == name)
    }

    pub fn clock(&self) -> &BeatClock {
        &self.clock
    }

    pub fn pulses(&self) -> &PulseRegistry {
        &self.pulses
    }

    pub fn pulses_mut(&mut self) -> &mut PulseRegistry {
        &mut self.pulses
    }

    pub fn dolly(&self) -> Option<&Dolly> {
        self.dolly.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::dolly::DollyConfig;
    use road_beat::Reaction;
    use road_common::ListenerId;
    use road_plan::PlannerConfig;
    use road_stream::{PlacementCallback, PlacementContext, PlacementError, RowContainer, StreamConfig};

    struct Blinker;

    impl PlacementCallback<ListenerId> for Blinker {
        fn place(&mut self, ctx: &mut PlacementContext<'_, ListenerId>) -> Result<(), PlacementError> {
            let period = ctx.request.height as u64;
            let id = ctx.pulses.register(ctx.request.col as u64, move |pulse: &Pulse| {
                Reaction::Rearm(pulse.index + period)
            });
            ctx.row.push(id);
            Ok(())
        }

        fn release(&mut self, row: RowContainer<ListenerId>, pulses: &mut PulseRegistry) {
            for id in row.into_items() {
                pulses.unregister(id);
            }
        }
    }

    fn strategies() -> StrategyRegistry<ListenerId> {
        let mut registry = StrategyRegistry::new();
        registry.register("blink", || Box::new(Blinker) as Box<dyn PlacementCallback<ListenerId>>);
        registry
    }

    fn world(name: &str) -> WorldConfig {
        WorldConfig {
            name: name.into(),
            strategy: "blink".into(),
            stream: StreamConfig {
                stop_follow_threshold: -150.0,
                unload_threshold: Some(-160.0),
                budget: road_stream::StreamBudget {
                    load_cells_per_tick: 25,
                    unload_rows_per_tick: None,
                },
                ..StreamConfig::default()
            },
            planner: PlannerConfig {
                size_weights: "1 0 0 0 0".into(),
                ..PlannerConfig::default()
            },
        }
    }

    fn scene() -> SceneConfig {
        SceneConfig {
            seed: 11,
            worlds: vec![world("a"), world("b")],
            dolly: Some(DollyConfig {
                start: Vec3::new(0.0, 1.6, 10.0),
                speed: 10.0,
                stop: -1000.0,
                ..DollyConfig::default()
            }),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn unknown_strategy_names_the_world() {
        let mut config = scene();
        config.worlds[1].strategy = "tunnel".into();
        let err = Session::new(&config, &strategies()).err().unwrap();
        match err {
            SceneError::Stream { world, .. } => assert_eq!(world, "b"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn invalid_beat_config_is_rejected() {
        let mut config = scene();
        config.beat.pulse_period_ms = 0.0;
        assert!(matches!(Session::new(&config, &strategies()), Err(SceneError::Config(_))));
    }

    #[test]
    fn same_seed_plans_same_worlds() {
        let mut config = scene();
        config.worlds[0].planner = PlannerConfig::default();
        let a = Session::new(&config, &strategies()).unwrap();
        let b = Session::new(&config, &strategies()).unwrap();
        assert_eq!(a.streams()[0].grid(), b.streams()[0].grid());
    }

    #[test]
    fn full_ride_loads_pulses_and_tears_down() {
        let mut session = Session::new(&scene(), &strategies()).unwrap();
        let frame = Duration::from_millis(100);

        // Nothing moves before the start trigger; loading is ungated.
        for _ in 0..3 {
            session.advance(frame);
        }
        assert_eq!(session.stream("a").unwrap().cells_visited(), 75);
        assert_eq!(session.pulses().len(), 150);
        assert!(!session.clock().is_started());

        session.start();
        let mut pulses = Vec::new();
        let mut disposed = Vec::new();
        let mut recycled = 0;
        while !session.streams().is_empty() {
            let report = session.advance(frame);
            pulses.extend(report.pulses.iter().map(|p| p.index));
            disposed.extend(report.disposed);
            recycled += report
                .events
                .iter()
                .filter(|(_, e)| matches!(e, StreamEvent::RowRecycled { .. }))
                .count();
            assert!(report.live_rows <= 30);
            assert!(session.frame() < 1000, "ride never finished");
        }

        assert_eq!(disposed, vec!["a".to_string(), "b".to_string()]);
        assert!(recycled > 0);
        assert!(session.clock().is_started());
        assert!(!pulses.is_empty());
        assert!(pulses.windows(2).all(|w| w[1] == w[0] + 1));
        assert!(session.pulses().is_empty());
    }

    #[test]
    fn missing_observer_only_stalls() {
        let mut config = scene();
        config.dolly = None;
        let mut session = Session::new(&config, &strategies()).unwrap();
        for _ in 0..5 {
            let report = session.advance(Duration::from_millis(16));
            assert!(report.pulses.is_empty());
        }
        assert_eq!(session.stream("a").unwrap().cells_visited(), 0);
        assert_eq!(session.frame(), 5);
    }
}
