//! Game Mode Controller
//!
//! Top-level mode machine. The spin phase lives inside the engine and is
//! nested in whichever mode is active; mode switches wait for the wheel to
//! stop.
//!
//! ```text
//!            ToggleTestMode               ToggleStatsView
//!   Test  <──────────────────> Normal <──────────────────> StatsView
//!                                │ ▲
//!                  RunSimulation │ │ batch done
//!                                ▼ │
//!                         SimulationRunning
//! ```

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use wf_core::{SegmentId, WfError, WfResult};
use wf_link::{DeviceCommand, DeviceLink, DeviceState, DeviceSynchronizer, SyncStats};
use wf_wheel::{
    SegmentTable, SpinEngine, SpinPhase, SpinResult, StatisticsSnapshot, StatisticsStore,
};

use crate::config::GameConfig;
use crate::event::{GameEvent, InputSource};

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Normal,
    /// Operator picks the terminal segment
    Test,
    /// Silent batch in progress
    SimulationRunning,
    /// Read-only statistics screen
    StatsView,
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Test => "Test",
            Self::SimulationRunning => "SimulationRunning",
            Self::StatsView => "StatsView",
        }
    }
}

/// Read-only per-frame view for renderers
#[derive(Debug, Clone)]
pub struct FrameView {
    pub mode: GameMode,
    /// Display angle in `[0, 360)`
    pub angle: f64,
    pub phase: SpinPhase,
    pub pointer_segment: SegmentId,
    pub device_state: DeviceState,
    pub device_connected: bool,
    /// Operator selection, only in test mode
    pub test_selection: Option<SegmentId>,
    pub last_result: Option<SpinResult>,
    /// Set on the frame a spin came to rest
    pub just_completed: bool,
    pub stats: Arc<StatisticsSnapshot>,
}

/// Owns the wheel, statistics and device link for one session
pub struct GameController {
    table: Arc<SegmentTable>,
    engine: SpinEngine,
    stats: StatisticsStore,
    sync: DeviceSynchronizer,
    rng: ChaCha8Rng,
    mode: GameMode,
    test_selection: SegmentId,
    last_result: Option<SpinResult>,
    just_completed: bool,
    /// Seconds left before the button goes back to idle
    hold_remaining: Option<f64>,
    result_hold_secs: f64,
    simulation_spins: usize,
    quit: bool,
}

impl GameController {
    pub fn new(config: &GameConfig, link: Box<dyn DeviceLink>) -> WfResult<Self> {
        config.validate()?;

        let table = Arc::new(config.build_table()?);
        let engine = SpinEngine::new(table.len(), config.spin_timing())?;
        let stats = StatisticsStore::new(&table, config.window_capacity)?;
        let sync = DeviceSynchronizer::new(link, &config.link);
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };

        log::info!(
            "[Game] Ready: {} segments, {:?} timing, seed {}",
            table.len(),
            engine.timing().profile,
            config
                .seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "random".to_string())
        );

        Ok(Self {
            table,
            engine,
            stats,
            sync,
            rng,
            mode: GameMode::Normal,
            test_selection: SegmentId(0),
            last_result: None,
            just_completed: false,
            hold_remaining: None,
            result_hold_secs: config.result_hold_secs,
            simulation_spins: config.simulation_spins,
            quit: false,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn table(&self) -> &Arc<SegmentTable> {
        &self.table
    }

    pub fn engine(&self) -> &SpinEngine {
        &self.engine
    }

    /// Shared statistics handle
    pub fn stats(&self) -> &StatisticsStore {
        &self.stats
    }

    pub fn sync_stats(&self) -> &SyncStats {
        self.sync.stats()
    }

    pub fn device_state(&self) -> DeviceState {
        self.sync.device_state()
    }

    pub fn test_selection(&self) -> SegmentId {
        self.test_selection
    }

    pub fn last_result(&self) -> Option<&SpinResult> {
        self.last_result.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_spinning(&self) -> bool {
        self.engine.is_spinning()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INPUT
    // ═══════════════════════════════════════════════════════════════════════

    /// Apply one input event
    pub fn handle_event(&mut self, event: GameEvent) {
        log::debug!("[Game] Event {:?} in {}", event, self.mode.name());
        let outcome = match event {
            GameEvent::TriggerSpin { source } => self.on_trigger(source),
            GameEvent::ToggleStatsView => self.toggle_stats_view(),
            GameEvent::ToggleTestMode => self.toggle_test_mode(),
            GameEvent::RunSimulation => self.run_simulation().map(|_| ()),
            GameEvent::SelectNextSegment => {
                let next = self.test_selection.next(self.table.len());
                self.select(next)
            }
            GameEvent::SelectPreviousSegment => {
                let previous = self.test_selection.previous(self.table.len());
                self.select(previous)
            }
            GameEvent::SelectSegment(id) => self.select(id),
            GameEvent::ResetStatistics => self.reset_statistics(),
            GameEvent::Quit => {
                log::info!("[Game] Quit requested");
                self.quit = true;
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {}
            Err(WfError::ReentrancyViolation(what)) => {
                log::debug!("[Game] Ignored {:?}: {} while spinning", event, what);
            }
            Err(e) => log::warn!("[Game] {:?} failed: {}", event, e),
        }
    }

    fn on_trigger(&mut self, source: InputSource) -> WfResult<()> {
        match (self.mode, source) {
            (GameMode::Normal, _) => self.try_start_spin(None).map(|_| ()),
            (GameMode::Test, InputSource::Local) => {
                self.try_start_spin(Some(self.test_selection)).map(|_| ())
            }
            (GameMode::Test, InputSource::Device) => {
                log::debug!("[Game] Device press ignored in test mode");
                Ok(())
            }
            (mode, _) => {
                log::debug!("[Game] Spin trigger ignored in {}", mode.name());
                Ok(())
            }
        }
    }

    /// Start a spin unless one is in flight. `forced` picks the terminal segment.
    pub fn try_start_spin(&mut self, forced: Option<SegmentId>) -> WfResult<SegmentId> {
        if self.engine.is_spinning() {
            return Err(WfError::ReentrancyViolation("spin"));
        }

        let segment = match forced {
            Some(segment) => {
                self.engine.start_forced(segment, &mut self.rng)?;
                segment
            }
            None => {
                let segment = self.table.weighted_pick(&mut self.rng);
                self.engine.start(segment, &mut self.rng)?;
                segment
            }
        };

        self.hold_remaining = None;
        self.sync.set_phase(DeviceCommand::SpinStart);
        Ok(segment)
    }

    fn toggle_stats_view(&mut self) -> WfResult<()> {
        if self.engine.is_spinning() {
            return Err(WfError::ReentrancyViolation("mode change"));
        }
        let next = match self.mode {
            GameMode::StatsView => GameMode::Normal,
            GameMode::Normal | GameMode::Test => GameMode::StatsView,
            GameMode::SimulationRunning => return Ok(()),
        };
        self.set_mode(next);
        Ok(())
    }

    fn toggle_test_mode(&mut self) -> WfResult<()> {
        if self.engine.is_spinning() {
            return Err(WfError::ReentrancyViolation("mode change"));
        }
        match self.mode {
            GameMode::Normal => {
                self.test_selection = self.engine.pointer_segment();
                self.set_mode(GameMode::Test);
            }
            GameMode::Test => self.set_mode(GameMode::Normal),
            other => log::debug!("[Game] Test mode unavailable from {}", other.name()),
        }
        Ok(())
    }

    fn select(&mut self, segment: SegmentId) -> WfResult<()> {
        if self.mode != GameMode::Test {
            log::debug!("[Game] Segment selection only in test mode");
            return Ok(());
        }
        if self.engine.is_spinning() {
            return Err(WfError::ReentrancyViolation("segment selection"));
        }
        self.table.segment(segment)?;
        self.engine.snap_to(segment)?;
        self.test_selection = segment;
        log::info!(
            "[Game] Test selection: {} ({})",
            segment,
            self.table.get(segment).map(|s| s.label.as_str()).unwrap_or("")
        );
        Ok(())
    }

    fn reset_statistics(&mut self) -> WfResult<()> {
        if self.engine.is_spinning() {
            return Err(WfError::ReentrancyViolation("statistics reset"));
        }
        if !matches!(self.mode, GameMode::Normal | GameMode::StatsView) {
            log::debug!("[Game] Statistics reset unavailable in {}", self.mode.name());
            return Ok(());
        }
        self.stats.reset();
        Ok(())
    }

    fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            log::info!("[Game] Mode {} → {}", self.mode.name(), mode.name());
            self.mode = mode;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SIMULATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Reset statistics and record a silent batch of spins. Returns spins recorded.
    pub fn run_simulation(&mut self) -> WfResult<usize> {
        if self.engine.is_spinning() {
            return Err(WfError::ReentrancyViolation("simulation"));
        }
        if self.mode != GameMode::Normal {
            log::debug!("[Game] Simulation only from Normal mode");
            return Ok(0);
        }

        self.set_mode(GameMode::SimulationRunning);
        let outcome = self.simulate_batch(self.simulation_spins);
        self.set_mode(GameMode::Normal);

        let recorded = outcome?;
        log::info!("[Game] Simulation complete: {} spins", recorded);
        Ok(recorded)
    }

    fn simulate_batch(&mut self, spins: usize) -> WfResult<usize> {
        self.stats.reset();
        let mut scratch = SpinEngine::new(self.table.len(), self.engine.timing().clone())?;

        let mut recorded = 0;
        for _ in 0..spins {
            let segment = self.table.weighted_pick(&mut self.rng);
            scratch.start(segment, &mut self.rng)?;
            if let Some(result) = scratch.fast_forward() {
                self.stats.record(result)?;
                recorded += 1;
            }
        }
        Ok(recorded)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // FRAME
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance one frame: device input, physics, result hold
    pub fn tick(&mut self, dt: f64) {
        for _press in self.sync.poll_input() {
            self.handle_event(GameEvent::device_spin());
        }

        let frame = self.engine.advance(dt);
        self.just_completed = false;
        if let Some(result) = frame.completed {
            self.on_spin_complete(result);
        }

        if let Some(remaining) = self.hold_remaining.as_mut() {
            *remaining -= dt.max(0.0);
            if *remaining <= 0.0 {
                self.hold_remaining = None;
                self.sync.set_phase(DeviceCommand::Idle);
            }
        }
    }

    fn on_spin_complete(&mut self, result: SpinResult) {
        let segment = result.segment;
        self.just_completed = true;
        self.last_result = Some(result.clone());
        self.hold_remaining = Some(self.result_hold_secs);

        if let Some(s) = self.table.get(segment) {
            log::info!("[Game] Result: {} ({})", s.label, segment);
        }

        if result.forced {
            log::debug!("[Game] Forced result not recorded");
        } else if let Err(e) = self.stats.record(result) {
            log::warn!("[Game] Could not record result: {}", e);
            self.sync.set_phase(DeviceCommand::Error);
            return;
        }

        self.sync.set_phase(DeviceCommand::SpinResult(segment));
    }

    /// Snapshot for the renderer
    pub fn view(&self) -> FrameView {
        FrameView {
            mode: self.mode,
            angle: self.engine.angle(),
            phase: self.engine.phase(),
            pointer_segment: self.engine.pointer_segment(),
            device_state: self.sync.device_state(),
            device_connected: self.sync.is_connected(),
            test_selection: (self.mode == GameMode::Test).then_some(self.test_selection),
            last_result: self.last_result.clone(),
            just_completed: self.just_completed,
            stats: self.stats.snapshot(),
        }
    }
}
