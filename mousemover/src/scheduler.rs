use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};

use crate::core::{ActivityTracker, Config, Decision, Displacement, PatternGenerator};
use crate::platform::{Clock, CursorPort, MonotonicClock};

/// Flags shared between the control context (writer) and the movement
/// thread (reader). Staleness of one tick is acceptable.
#[derive(Debug)]
pub struct RunState {
    paused: AtomicBool,
    running: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            running: AtomicBool::new(true),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Movement suppressed; activity was still sampled.
    Paused,
    /// Pointer recently moved or not still for long enough.
    Waiting(Decision),
    Moved(Displacement),
    /// Injection failed; pattern state advanced anyway.
    MoveFailed(Displacement),
    /// Position or screen bounds could not be read.
    PortUnavailable,
}

/// The tick loop body. Owns all per-movement state; runs on its own thread.
pub struct MovementLoop<P, C> {
    config: Config,
    run_state: Arc<RunState>,
    tracker: ActivityTracker,
    generator: PatternGenerator,
    cursor: P,
    clock: C,
}

impl<P: CursorPort, C: Clock> MovementLoop<P, C> {
    pub fn new(config: Config, run_state: Arc<RunState>, cursor: P, clock: C) -> Self {
        let tracker = ActivityTracker::new(config.idle_threshold(), clock.now());
        Self {
            config,
            run_state,
            tracker,
            generator: PatternGenerator::new(),
            cursor,
            clock,
        }
    }

    pub fn run(mut self) {
        tracing::info!(
            "Movement loop started ({})",
            self.config.status_line(self.run_state.is_paused())
        );

        while self.run_state.is_running() {
            let outcome = self.tick();
            tracing::trace!("Tick: {:?}", outcome);
            std::thread::sleep(self.config.tick_interval());
        }

        tracing::info!("Movement loop stopped");
    }

    pub fn tick(&mut self) -> TickOutcome {
        let position = match self.cursor.position() {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Failed to read pointer position: {}", e);
                return TickOutcome::PortUnavailable;
            }
        };

        let decision = self.tracker.sample(self.clock.now(), position);

        if self.run_state.is_paused() {
            return TickOutcome::Paused;
        }

        if decision != Decision::IdleReady {
            if decision == Decision::Active {
                tracing::debug!("User activity at ({}, {})", position.x, position.y);
            }
            return TickOutcome::Waiting(decision);
        }

        let bounds = match self.cursor.screen_bounds() {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read screen bounds: {}", e);
                return TickOutcome::PortUnavailable;
            }
        };

        let distance = self.config.distance() as i32;
        let displacement = self.generator.next_within(distance, position, bounds);

        let outcome = match self.cursor.move_by(displacement) {
            Ok(()) => {
                tracing::debug!(
                    "Moved pointer by ({}, {}) from ({}, {})",
                    displacement.dx,
                    displacement.dy,
                    position.x,
                    position.y
                );
                TickOutcome::Moved(displacement)
            }
            Err(e) => {
                tracing::warn!("Failed to move pointer: {}", e);
                TickOutcome::MoveFailed(displacement)
            }
        };

        // Our own movement becomes the new baseline.
        let expected = match outcome {
            TickOutcome::Moved(_) => position.offset(displacement),
            _ => position,
        };
        self.tracker.rebase(self.cursor.position().unwrap_or(expected));

        outcome
    }
}

/// Control-side handle to the movement thread.
pub struct Scheduler {
    config: Config,
    run_state: Arc<RunState>,
    worker: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn spawn<P>(config: Config, cursor: P) -> Result<Self>
    where
        P: CursorPort + Send + 'static,
    {
        Self::spawn_with_clock(config, cursor, MonotonicClock)
    }

    pub fn spawn_with_clock<P, C>(config: Config, cursor: P, clock: C) -> Result<Self>
    where
        P: CursorPort + Send + 'static,
        C: Clock + Send + 'static,
    {
        let run_state = Arc::new(RunState::new());
        let movement = MovementLoop::new(config, Arc::clone(&run_state), cursor, clock);

        let worker = std::thread::Builder::new()
            .name("mousemover-movement".to_string())
            .spawn(move || movement.run())
            .context("Failed to spawn movement thread")?;

        Ok(Self {
            config,
            run_state,
            worker: Some(worker),
        })
    }

    /// Handle without a movement thread.
    #[cfg(test)]
    pub fn detached(config: Config) -> Self {
        Self {
            config,
            run_state: Arc::new(RunState::new()),
            worker: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> SchedulerState {
        if !self.run_state.is_running() {
            SchedulerState::Stopped
        } else if self.run_state.is_paused() {
            SchedulerState::Paused
        } else {
            SchedulerState::Running
        }
    }

    pub fn is_paused(&self) -> bool {
        self.run_state.is_paused()
    }

    pub fn pause(&self) {
        self.run_state.set_paused(true);
    }

    pub fn resume(&self) {
        self.run_state.set_paused(false);
    }

    /// Returns the new paused state.
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.run_state.is_paused();
        self.run_state.set_paused(paused);
        paused
    }

    pub fn status_line(&self) -> String {
        self.config.status_line(self.is_paused())
    }

    /// Signals the movement thread and waits for it to exit. Worst-case
    /// latency is one tick interval. Calling again is a no-op.
    pub fn stop(&mut self) {
        self.run_state.stop();
        if let Some(worker) = self.worker.take() {
            tracing::info!("Waiting for movement loop to finish");
            if worker.join().is_err() {
                tracing::error!("Movement thread panicked");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CursorPosition, ScreenBounds};
    use crate::platform::mock::{ManualClock, MockCursor};
    use std::time::Duration;

    fn setup(
        config: Config,
    ) -> (
        MovementLoop<MockCursor, ManualClock>,
        MockCursor,
        ManualClock,
        Arc<RunState>,
    ) {
        let cursor = MockCursor::new();
        let clock = ManualClock::new();
        let run_state = Arc::new(RunState::new());
        let movement = MovementLoop::new(
            config,
            Arc::clone(&run_state),
            cursor.clone(),
            clock.clone(),
        );
        (movement, cursor, clock, run_state)
    }

    /// Ticks at the configured cadence until the first movement.
    fn tick_until_moved(
        movement: &mut MovementLoop<MockCursor, ManualClock>,
        clock: &ManualClock,
        interval: Duration,
    ) -> Displacement {
        for _ in 0..100 {
            if let TickOutcome::Moved(d) = movement.tick() {
                return d;
            }
            clock.advance(interval);
        }
        panic!("no movement after 100 ticks");
    }

    #[test]
    fn test_no_movement_until_idle_threshold() {
        let config = Config::new(5, 30, 5).unwrap();
        let (mut movement, cursor, clock, _) = setup(config);

        assert_eq!(movement.tick(), TickOutcome::Waiting(Decision::Active));
        for _ in 0..5 {
            clock.advance(config.tick_interval());
            assert_eq!(
                movement.tick(),
                TickOutcome::Waiting(Decision::IdleBelowThreshold)
            );
        }
        assert!(cursor.moves().is_empty());

        clock.advance(config.tick_interval());
        assert_eq!(movement.tick(), TickOutcome::Moved(Displacement::new(5, 0)));
        assert_eq!(cursor.moves(), vec![Displacement::new(5, 0)]);
    }

    #[test]
    fn test_own_movement_is_not_user_activity() {
        let config = Config::new(5, 30, 5).unwrap();
        let (mut movement, cursor, clock, _) = setup(config);
        tick_until_moved(&mut movement, &clock, config.tick_interval());

        // Next tick sees the injected position as baseline and keeps moving.
        clock.advance(config.tick_interval());
        assert_eq!(movement.tick(), TickOutcome::Moved(Displacement::new(0, 5)));
        clock.advance(config.tick_interval());
        assert_eq!(movement.tick(), TickOutcome::Moved(Displacement::new(5, 5)));
        assert_eq!(cursor.moves().len(), 3);
    }

    #[test]
    fn test_user_motion_restarts_wait() {
        let config = Config::new(5, 30, 5).unwrap();
        let (mut movement, cursor, clock, _) = setup(config);
        tick_until_moved(&mut movement, &clock, config.tick_interval());

        clock.advance(config.tick_interval());
        cursor.set_position(CursorPosition::new(200, 300));
        assert_eq!(movement.tick(), TickOutcome::Waiting(Decision::Active));

        for _ in 0..5 {
            clock.advance(config.tick_interval());
            assert!(matches!(movement.tick(), TickOutcome::Waiting(_)));
        }
        clock.advance(config.tick_interval());
        assert!(matches!(movement.tick(), TickOutcome::Moved(_)));
        assert_eq!(cursor.moves().len(), 2);
    }

    #[test]
    fn test_paused_never_moves() {
        let config = Config::new(1, 1, 5).unwrap();
        let (mut movement, cursor, clock, run_state) = setup(config);
        run_state.set_paused(true);

        for _ in 0..20 {
            assert_eq!(movement.tick(), TickOutcome::Paused);
            clock.advance(config.tick_interval());
        }
        assert!(cursor.moves().is_empty());

        run_state.set_paused(false);
        assert!(matches!(movement.tick(), TickOutcome::Moved(_)));
        assert_eq!(cursor.moves().len(), 1);
    }

    #[test]
    fn test_activity_tracked_while_paused() {
        let config = Config::new(5, 30, 5).unwrap();
        let (mut movement, cursor, clock, run_state) = setup(config);
        tick_until_moved(&mut movement, &clock, config.tick_interval());

        run_state.set_paused(true);
        clock.advance(config.tick_interval());
        cursor.set_position(CursorPosition::new(10, 400));
        assert_eq!(movement.tick(), TickOutcome::Paused);

        // The nudge seen while paused still counts after resuming.
        run_state.set_paused(false);
        clock.advance(config.tick_interval());
        assert_eq!(
            movement.tick(),
            TickOutcome::Waiting(Decision::IdleBelowThreshold)
        );
    }

    #[test]
    fn test_position_failure_skips_tick() {
        let config = Config::new(1, 1, 5).unwrap();
        let (mut movement, cursor, clock, _) = setup(config);
        movement.tick();
        clock.advance(config.tick_interval());

        cursor.fail_position(true);
        assert_eq!(movement.tick(), TickOutcome::PortUnavailable);
        assert!(cursor.moves().is_empty());

        cursor.fail_position(false);
        clock.advance(config.tick_interval());
        assert!(matches!(movement.tick(), TickOutcome::Moved(_)));
    }

    #[test]
    fn test_bounds_failure_skips_movement() {
        let config = Config::new(1, 1, 5).unwrap();
        let (mut movement, cursor, clock, _) = setup(config);
        movement.tick();
        clock.advance(config.tick_interval());

        cursor.fail_bounds(true);
        assert_eq!(movement.tick(), TickOutcome::PortUnavailable);
        assert!(cursor.moves().is_empty());
    }

    #[test]
    fn test_move_failure_is_not_retried() {
        let config = Config::new(1, 1, 5).unwrap();
        let (mut movement, cursor, clock, _) = setup(config);
        movement.tick();
        clock.advance(config.tick_interval());

        cursor.fail_move(true);
        assert_eq!(
            movement.tick(),
            TickOutcome::MoveFailed(Displacement::new(5, 0))
        );

        // Pattern moved on regardless; nothing is replayed.
        cursor.fail_move(false);
        clock.advance(config.tick_interval());
        assert_eq!(movement.tick(), TickOutcome::Moved(Displacement::new(0, 5)));
        assert_eq!(cursor.moves(), vec![Displacement::new(0, 5)]);
    }

    #[test]
    fn test_reflects_at_screen_edge() {
        let config = Config::new(1, 1, 5).unwrap();
        let cursor = MockCursor::at(CursorPosition::new(1908, 500))
            .with_bounds(ScreenBounds::new(1920, 1080));
        let clock = ManualClock::new();
        let mut movement = MovementLoop::new(
            config,
            Arc::new(RunState::new()),
            cursor.clone(),
            clock.clone(),
        );

        movement.tick();
        clock.advance(config.tick_interval());
        assert_eq!(
            movement.tick(),
            TickOutcome::Moved(Displacement::new(-5, 0))
        );
        assert_eq!(cursor.current(), CursorPosition::new(1903, 500));
    }

    #[test]
    fn test_state_transitions() {
        let mut scheduler = Scheduler::detached(Config::default());
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.pause();
        assert_eq!(scheduler.state(), SchedulerState::Paused);
        assert!(scheduler.is_paused());

        assert!(!scheduler.toggle_pause());
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        scheduler.resume();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_status_line_follows_pause() {
        let scheduler = Scheduler::detached(Config::new(3, 15, 10).unwrap());
        assert_eq!(scheduler.status_line(), "Active (Move: 3s, Wait: 15s)");
        scheduler.toggle_pause();
        assert_eq!(scheduler.status_line(), "Paused (Move: 3s, Wait: 15s)");
    }

    /// Polls until `done` holds, advancing the shared clock so the worker
    /// thread sees time pass between its ticks.
    fn wait_for(clock: &ManualClock, done: impl Fn() -> bool) {
        for _ in 0..500 {
            if done() {
                return;
            }
            clock.advance(Duration::from_secs(1));
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("worker made no progress");
    }

    #[test]
    fn test_stop_before_first_tick() {
        let config = Config::new(1, 1, 1).unwrap();
        let mut scheduler =
            Scheduler::spawn_with_clock(config, MockCursor::new(), ManualClock::new()).unwrap();

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.worker.is_none());
    }

    #[test]
    fn test_worker_moves_then_stops_mid_sleep() {
        let config = Config::new(1, 1, 1).unwrap();
        let cursor = MockCursor::new();
        let clock = ManualClock::new();
        let mut scheduler =
            Scheduler::spawn_with_clock(config, cursor.clone(), clock.clone()).unwrap();

        wait_for(&clock, || !cursor.moves().is_empty());
        assert_eq!(cursor.moves()[0], Displacement::new(1, 0));

        // The worker is now sleeping between ticks; stop waits for it.
        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.worker.is_none());

        let moves = cursor.moves().len();
        let reads = cursor.reads();
        clock.advance(Duration::from_secs(5));
        std::thread::sleep(config.tick_interval() + Duration::from_millis(200));
        assert_eq!(cursor.moves().len(), moves);
        assert_eq!(cursor.reads(), reads);
    }

    #[test]
    fn test_paused_worker_keeps_sampling() {
        let config = Config::new(1, 1, 1).unwrap();
        let cursor = MockCursor::new();
        let clock = ManualClock::new();
        let mut scheduler =
            Scheduler::spawn_with_clock(config, cursor.clone(), clock.clone()).unwrap();
        scheduler.pause();

        wait_for(&clock, || cursor.reads() >= 2);
        assert!(cursor.moves().is_empty());

        scheduler.stop();
    }
}
