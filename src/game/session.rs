//! Session controller: the only mutator of `GameState`.
//!
//! Time is a `Duration` since an arbitrary origin chosen by the caller. The
//! terminal front end feeds it wall-clock time; tests feed it whatever they
//! like. All timers live in one `Scheduler` and fire in deadline order from
//! `advance`.

use std::time::Duration;

use rand::Rng;
use rand::rngs::ThreadRng;

use super::config::{Difficulty, GameMode, GameSettings, MapSize};
use super::direction::Direction;
use super::engine::{GameEngine, StepResult};
use super::powerup::{self, SpawnOutcome, TimerEvent};
use super::scheduler::Scheduler;
use super::state::{GameState, PowerUpKind};
use crate::metrics::GameMetrics;
use crate::storage::HighScoreStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    Running,
    Paused,
    GameOver,
}

/// Read-only snapshot for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub phase: SessionPhase,
    pub score: u32,
    /// Ticks simulated in the current (or last) game
    pub steps: u32,
    pub high_score: u32,
    pub mode_label: &'static str,
    pub effect_labels: Vec<&'static str>,
    pub game_over: bool,
    /// Score of the game that just ended
    pub final_score: Option<u32>,
    /// Whether the game that just ended set a new high score
    pub new_high_score: bool,
    pub heading: Direction,
    pub play_time: Duration,
}

pub struct SessionController<S, R = ThreadRng> {
    engine: GameEngine<R>,
    store: S,
    /// Selection applied at the next start
    settings: GameSettings,
    state: GameState,
    phase: SessionPhase,
    scheduler: Scheduler<TimerEvent>,
    tick_generation: u64,
    pending_direction: Option<Direction>,
    high_score: u32,
    final_score: Option<u32>,
    new_high_score: bool,
    next_id: u64,
    now: Duration,
    metrics: GameMetrics,
}

impl<S: HighScoreStore> SessionController<S, ThreadRng> {
    pub fn new(settings: GameSettings, store: S) -> Self {
        Self::with_engine(settings, store, GameEngine::new())
    }
}

impl<S: HighScoreStore, R: Rng> SessionController<S, R> {
    pub fn with_engine(settings: GameSettings, store: S, mut engine: GameEngine<R>) -> Self {
        let high_score = store.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not load high score, starting from 0");
            0
        });
        let state = engine.reset(settings);

        Self {
            engine,
            store,
            settings,
            state,
            phase: SessionPhase::NotStarted,
            scheduler: Scheduler::new(),
            tick_generation: 0,
            pending_direction: None,
            high_score,
            final_score: None,
            new_high_score: false,
            next_id: 0,
            now: Duration::ZERO,
            metrics: GameMetrics::new(),
        }
    }

    // ---- command surface ----

    /// Start a new game with the current settings selection
    pub fn start(&mut self, now: Duration) {
        self.now = now;
        self.state = self.engine.reset(self.settings);
        self.scheduler.clear();
        self.pending_direction = None;
        self.final_score = None;
        self.new_high_score = false;
        self.phase = SessionPhase::Running;

        powerup::schedule_spawn(&mut self.scheduler, self.engine.rng_mut(), now);
        self.restart_tick_timer();
        self.metrics.on_game_start(now);

        tracing::info!(
            settings = %self.settings,
            interval_ms = self.state.tick_interval.as_millis() as u64,
            obstacles = self.state.obstacles.len(),
            "game started"
        );
    }

    pub fn restart(&mut self, now: Duration) {
        self.start(now);
    }

    /// Running ↔ Paused; ignored in any other phase.
    /// The tick timer keeps firing while paused and every tick is a no-op.
    pub fn toggle_pause(&mut self, now: Duration) {
        self.advance(now);
        match self.phase {
            SessionPhase::Running => {
                self.phase = SessionPhase::Paused;
                self.metrics.on_pause(self.now);
                tracing::info!(score = self.state.score, "paused");
            }
            SessionPhase::Paused => {
                self.phase = SessionPhase::Running;
                self.metrics.on_resume(self.now);
                tracing::info!("resumed");
            }
            SessionPhase::NotStarted | SessionPhase::GameOver => {}
        }
    }

    /// Queue a turn for the next tick.
    ///
    /// Only one turn is buffered per tick, and a turn that reverses or
    /// repeats the current heading is rejected without taking the slot.
    pub fn change_direction(&mut self, direction: Direction) -> bool {
        if self.phase != SessionPhase::Running || self.pending_direction.is_some() {
            return false;
        }
        let current = self.state.snake.direction;
        if direction == current || current.is_opposite(direction) {
            return false;
        }
        self.pending_direction = Some(direction);
        true
    }

    /// Abandon the current game (if any) and go back to the menu.
    /// An abandoned game does not update the high score.
    pub fn quit_to_menu(&mut self) {
        if self.phase == SessionPhase::Running {
            self.metrics.on_pause(self.now);
        }
        self.scheduler.clear();
        self.tick_generation += 1;
        self.pending_direction = None;
        self.phase = SessionPhase::NotStarted;
        tracing::info!("back to menu");
    }

    // ---- settings surface ----

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    /// Selection setters take effect at the next start
    pub fn select_mode(&mut self, mode: GameMode) {
        self.settings.mode = mode;
    }

    pub fn select_difficulty(&mut self, difficulty: Difficulty) {
        self.settings.difficulty = difficulty;
    }

    pub fn select_map_size(&mut self, map_size: MapSize) {
        self.settings.map_size = map_size;
    }

    pub fn cycle_mode(&mut self) {
        self.settings.mode = self.settings.mode.next();
    }

    pub fn cycle_difficulty(&mut self) {
        self.settings.difficulty = self.settings.difficulty.next();
    }

    pub fn cycle_map_size(&mut self) {
        self.settings.map_size = self.settings.map_size.next();
    }

    // ---- time ----

    /// Fire every timer due at or before `now`, each at its own deadline
    pub fn advance(&mut self, now: Duration) {
        while let Some(entry) = self.scheduler.pop_due(now) {
            self.now = entry.fire_at;
            self.handle_timer(entry.event);
        }
        self.now = self.now.max(now);
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    // ---- status surface ----

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            phase: self.phase,
            score: self.state.score,
            steps: self.state.steps,
            high_score: self.high_score,
            mode_label: self.state.settings.mode.label(),
            effect_labels: self.state.effect_labels(),
            game_over: self.phase == SessionPhase::GameOver,
            final_score: self.final_score,
            new_high_score: self.new_high_score,
            heading: self.pending_direction.unwrap_or(self.state.snake.direction),
            play_time: self.metrics.play_time(self.now),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access, for scripted scenarios and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ---- timer handlers ----

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Tick { generation } => {
                if generation != self.tick_generation {
                    return;
                }
                self.scheduler.schedule(
                    self.now + self.state.tick_interval,
                    TimerEvent::Tick { generation },
                );
                if self.phase == SessionPhase::Running {
                    self.tick();
                }
            }
            TimerEvent::SpawnPowerUp => self.spawn_power_up(),
            TimerEvent::ExpirePowerUp { id } => {
                if powerup::expire(&mut self.state, id) {
                    tracing::debug!(id, "power-up expired");
                    powerup::schedule_spawn(&mut self.scheduler, self.engine.rng_mut(), self.now);
                }
            }
            TimerEvent::EndEffect { id } => {
                if let Some(effect) = powerup::end_effect(&mut self.state, id) {
                    tracing::debug!(id, kind = ?effect.kind, "effect ended");
                    if matches!(effect.kind, PowerUpKind::SpeedUp | PowerUpKind::SlowDown) {
                        self.restart_tick_timer();
                    }
                }
            }
        }
    }

    fn tick(&mut self) {
        if let Some(direction) = self.pending_direction.take() {
            if !self.state.snake.direction.is_opposite(direction) {
                self.state.snake.direction = direction;
            }
        }

        let interval_before = self.state.tick_interval;
        let result = self.engine.step(&mut self.state);
        self.metrics.on_step(&result.info);

        if let Some(kind) = result.info.power_up {
            self.on_power_up_collected(kind);
        }

        if result.terminated {
            self.finish_game(&result);
        } else if self.state.tick_interval != interval_before {
            self.restart_tick_timer();
        }
    }

    fn on_power_up_collected(&mut self, kind: PowerUpKind) {
        let id = self.allocate_id();
        powerup::arm_effect(&mut self.state, &mut self.scheduler, kind, self.now, id);
        powerup::schedule_spawn(&mut self.scheduler, self.engine.rng_mut(), self.now);
        tracing::info!(kind = ?kind, score = self.state.score, "power-up collected");
    }

    fn spawn_power_up(&mut self) {
        if matches!(self.phase, SessionPhase::NotStarted | SessionPhase::GameOver) {
            return;
        }
        let id = self.allocate_id();
        let paused = self.phase == SessionPhase::Paused;
        let outcome = powerup::attempt_spawn(
            &mut self.state,
            &mut self.scheduler,
            self.engine.rng_mut(),
            self.now,
            paused,
            id,
        );
        if let SpawnOutcome::Spawned(power_up) = outcome {
            tracing::debug!(
                id,
                kind = ?power_up.kind,
                x = power_up.position.x,
                y = power_up.position.y,
                "power-up spawned"
            );
        }
    }

    fn finish_game(&mut self, result: &StepResult) {
        self.phase = SessionPhase::GameOver;
        self.scheduler.clear();
        self.tick_generation += 1;
        self.pending_direction = None;
        self.metrics.on_game_over(self.now);

        let score = self.state.score;
        self.final_score = Some(score);

        let stored = self.store.load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not read high score");
            self.high_score
        });
        if score > stored {
            if let Err(err) = self.store.save(score) {
                tracing::warn!(error = %err, score, "could not save high score");
            }
            self.high_score = score;
            self.new_high_score = true;
        } else {
            self.high_score = stored;
        }

        tracing::info!(
            score,
            high_score = self.high_score,
            collision = ?result.info.collision_type,
            "game over"
        );
    }

    fn restart_tick_timer(&mut self) {
        self.tick_generation += 1;
        self.scheduler.schedule(
            self.now + self.state.tick_interval,
            TimerEvent::Tick {
                generation: self.tick_generation,
            },
        );
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}
