//! Power-up lifecycle: spawn timing, placement, effects and their reversal.
//!
//! Functions here only touch `GameState` and the timer queue; the session
//! controller decides when they run.

use std::time::Duration;

use rand::Rng;

use super::engine;
use super::scheduler::Scheduler;
use super::state::{ActiveEffect, GameState, PowerUp, PowerUpKind};

/// Lower bound of the random delay before a spawn attempt
pub const SPAWN_DELAY_MIN: Duration = Duration::from_millis(5_000);
/// Upper bound (exclusive) of the random delay before a spawn attempt
pub const SPAWN_DELAY_MAX: Duration = Duration::from_millis(15_000);
/// Delay before retrying a spawn whose candidate cell was blocked
pub const SPAWN_RETRY_DELAY: Duration = Duration::from_millis(1_000);
/// How long an uncollected power-up stays on the board
pub const POWER_UP_LIFETIME: Duration = Duration::from_millis(8_000);

/// Cells removed by the shorten power-up
pub const SHORTEN_AMOUNT: usize = 3;
/// Shorten never takes the snake below this length
pub const SHORTEN_MIN_LENGTH: usize = 2;

/// Timers owned by a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Simulation step; stale generations are ignored
    Tick { generation: u64 },
    SpawnPowerUp,
    ExpirePowerUp { id: u64 },
    EndEffect { id: u64 },
}

/// Outcome of a spawn attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    Spawned(PowerUp),
    /// Candidate cell was blocked or the game was paused; retried shortly
    Retrying,
    /// Game over or a power-up is already live; the chain is left to others
    Skipped,
}

/// Draw a spawn delay uniformly from `[SPAWN_DELAY_MIN, SPAWN_DELAY_MAX)`
pub fn random_spawn_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    let min = SPAWN_DELAY_MIN.as_millis() as u64;
    let max = SPAWN_DELAY_MAX.as_millis() as u64;
    Duration::from_millis(rng.gen_range(min..max))
}

/// Schedule the next spawn attempt after a random delay
pub fn schedule_spawn<R: Rng + ?Sized>(
    scheduler: &mut Scheduler<TimerEvent>,
    rng: &mut R,
    now: Duration,
) {
    scheduler.schedule(now + random_spawn_delay(rng), TimerEvent::SpawnPowerUp);
}

/// Try to put a power-up of random kind on a random cell.
///
/// A single candidate cell is drawn; if it is blocked the attempt is retried
/// after `SPAWN_RETRY_DELAY`. A successful spawn arms its expiry timer.
pub fn attempt_spawn<R: Rng + ?Sized>(
    state: &mut GameState,
    scheduler: &mut Scheduler<TimerEvent>,
    rng: &mut R,
    now: Duration,
    paused: bool,
    id: u64,
) -> SpawnOutcome {
    if !state.is_alive || state.power_up.is_some() {
        return SpawnOutcome::Skipped;
    }
    if paused {
        scheduler.schedule(now + SPAWN_RETRY_DELAY, TimerEvent::SpawnPowerUp);
        return SpawnOutcome::Retrying;
    }

    let kind = PowerUpKind::random(rng);
    let tile_count = state.tile_count();
    let position = engine::random_cell(rng, tile_count);

    if state.blocks_power_up(position) {
        scheduler.schedule(now + SPAWN_RETRY_DELAY, TimerEvent::SpawnPowerUp);
        return SpawnOutcome::Retrying;
    }

    let power_up = PowerUp {
        id,
        kind,
        position,
        expires_at: now + POWER_UP_LIFETIME,
    };
    state.power_up = Some(power_up);
    scheduler.schedule(power_up.expires_at, TimerEvent::ExpirePowerUp { id });
    SpawnOutcome::Spawned(power_up)
}

/// Remove the power-up `id` if it is still on the board.
/// Returns true when it was removed and a new spawn should be scheduled.
pub fn expire(state: &mut GameState, id: u64) -> bool {
    match state.power_up {
        Some(power_up) if power_up.id == id => {
            state.power_up = None;
            true
        }
        _ => false,
    }
}

/// Apply the immediate part of a collected power-up.
/// Returns the number of tail cells removed (shorten only).
pub fn apply_immediate(state: &mut GameState, kind: PowerUpKind) -> usize {
    match kind {
        PowerUpKind::SpeedUp => {
            state.tick_interval /= 2;
            0
        }
        PowerUpKind::SlowDown => {
            state.tick_interval *= 2;
            0
        }
        PowerUpKind::DoubleScore => {
            state.double_score = true;
            0
        }
        PowerUpKind::GhostMode => {
            state.ghost_mode = true;
            0
        }
        PowerUpKind::Shorten => state.snake.shorten(SHORTEN_AMOUNT, SHORTEN_MIN_LENGTH),
    }
}

/// Record a timed effect and arm its end timer. Instantaneous kinds are ignored.
pub fn arm_effect(
    state: &mut GameState,
    scheduler: &mut Scheduler<TimerEvent>,
    kind: PowerUpKind,
    now: Duration,
    id: u64,
) -> Option<ActiveEffect> {
    let duration = kind.duration()?;
    let effect = ActiveEffect {
        id,
        kind,
        label: kind.label(),
        expires_at: now + duration,
    };
    state.active_effects.push(effect.clone());
    scheduler.schedule(effect.expires_at, TimerEvent::EndEffect { id });
    Some(effect)
}

/// Reverse and remove the effect `id`.
///
/// Each activation owns its timer, so an earlier activation of the same kind
/// ending also clears a flag a later activation set.
pub fn end_effect(state: &mut GameState, id: u64) -> Option<ActiveEffect> {
    let index = state.active_effects.iter().position(|e| e.id == id)?;
    let effect = state.active_effects.remove(index);

    match effect.kind {
        PowerUpKind::SpeedUp | PowerUpKind::SlowDown => {
            state.tick_interval = state.settings.base_interval();
        }
        PowerUpKind::DoubleScore => state.double_score = false,
        PowerUpKind::GhostMode => state.ghost_mode = false,
        PowerUpKind::Shorten => {}
    }
    Some(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GameSettings;
    use crate::game::direction::Direction;
    use crate::game::state::{Position, Snake};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn state() -> GameState {
        let snake = Snake::new(Position::new(10, 10), Direction::Right, 1);
        GameState::new(GameSettings::default(), snake, Some(Position::new(3, 3)))
    }

    #[test]
    fn test_spawn_delay_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let delay = random_spawn_delay(&mut rng);
            assert!(delay >= SPAWN_DELAY_MIN && delay < SPAWN_DELAY_MAX);
        }
    }

    #[test]
    fn test_spawn_places_power_up_and_arms_expiry() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut scheduler = Scheduler::new();
        let mut state = state();

        // Keep trying until the random cell is free; retries are scheduled each time
        let mut outcome = SpawnOutcome::Retrying;
        for _ in 0..50 {
            outcome = attempt_spawn(&mut state, &mut scheduler, &mut rng, ms(6_000), false, 1);
            if matches!(outcome, SpawnOutcome::Spawned(_)) {
                break;
            }
        }

        let SpawnOutcome::Spawned(power_up) = outcome else {
            panic!("power-up never spawned");
        };
        assert_eq!(state.power_up, Some(power_up));
        assert_eq!(power_up.expires_at, ms(14_000));
        assert!(!state.blocks_power_up(power_up.position));
        assert!(scheduler
            .iter()
            .any(|e| e.event == TimerEvent::ExpirePowerUp { id: 1 } && e.fire_at == ms(14_000)));
    }

    #[test]
    fn test_spawn_skipped_while_one_is_live() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut scheduler = Scheduler::new();
        let mut state = state();
        state.power_up = Some(PowerUp {
            id: 9,
            kind: PowerUpKind::Shorten,
            position: Position::new(1, 1),
            expires_at: ms(8_000),
        });

        let outcome = attempt_spawn(&mut state, &mut scheduler, &mut rng, ms(0), false, 10);

        assert_eq!(outcome, SpawnOutcome::Skipped);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_spawn_while_paused_retries() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut scheduler = Scheduler::new();
        let mut state = state();

        let outcome = attempt_spawn(&mut state, &mut scheduler, &mut rng, ms(7_000), true, 1);

        assert_eq!(outcome, SpawnOutcome::Retrying);
        assert!(state.power_up.is_none());
        assert_eq!(scheduler.next_deadline(), Some(ms(8_000)));
    }

    #[test]
    fn test_spawn_on_blocked_cell_retries() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut scheduler = Scheduler::new();
        let mut state = state();
        let head = state.snake.head();
        state.obstacles = (0..20)
            .flat_map(|y| (0..20).map(move |x| Position::new(x, y)))
            .filter(|pos| *pos != head)
            .collect();

        let outcome = attempt_spawn(&mut state, &mut scheduler, &mut rng, ms(6_000), false, 1);

        assert_eq!(outcome, SpawnOutcome::Retrying);
        assert!(state.power_up.is_none());
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_deadline(), Some(ms(7_000)));
        assert_eq!(scheduler.pop_due(ms(7_000)).unwrap().event, TimerEvent::SpawnPowerUp);
    }

    #[test]
    fn test_expire_only_matching_instance() {
        let mut state = state();
        state.power_up = Some(PowerUp {
            id: 2,
            kind: PowerUpKind::SpeedUp,
            position: Position::new(1, 1),
            expires_at: ms(8_000),
        });

        assert!(!expire(&mut state, 1));
        assert!(state.power_up.is_some());
        assert!(expire(&mut state, 2));
        assert!(state.power_up.is_none());
    }

    #[test]
    fn test_speed_effects_and_reversal() {
        let mut scheduler = Scheduler::new();
        let mut state = state();

        apply_immediate(&mut state, PowerUpKind::SpeedUp);
        assert_eq!(state.tick_interval, ms(75));
        arm_effect(&mut state, &mut scheduler, PowerUpKind::SpeedUp, ms(1_000), 1);
        assert_eq!(scheduler.next_deadline(), Some(ms(6_000)));

        apply_immediate(&mut state, PowerUpKind::SlowDown);
        assert_eq!(state.tick_interval, ms(150));
        arm_effect(&mut state, &mut scheduler, PowerUpKind::SlowDown, ms(2_000), 2);

        end_effect(&mut state, 1);
        assert_eq!(state.tick_interval, ms(150));
        assert_eq!(state.effect_labels(), vec!["Slow Down"]);
    }

    #[test]
    fn test_retriggered_effect_ends_with_first_timer() {
        let mut scheduler = Scheduler::new();
        let mut state = state();

        apply_immediate(&mut state, PowerUpKind::GhostMode);
        arm_effect(&mut state, &mut scheduler, PowerUpKind::GhostMode, ms(0), 1);
        apply_immediate(&mut state, PowerUpKind::GhostMode);
        arm_effect(&mut state, &mut scheduler, PowerUpKind::GhostMode, ms(3_000), 2);

        end_effect(&mut state, 1);
        assert!(!state.ghost_mode);
        assert_eq!(state.active_effects.len(), 1);

        // Second end is a no-op on the flag but removes the entry exactly once
        assert!(end_effect(&mut state, 2).is_some());
        assert!(end_effect(&mut state, 2).is_none());
    }

    #[test]
    fn test_shorten_is_instant() {
        let mut scheduler = Scheduler::new();
        let mut state = state();
        state.snake = Snake::new(Position::new(10, 10), Direction::Right, 5);

        assert_eq!(apply_immediate(&mut state, PowerUpKind::Shorten), 3);
        assert_eq!(state.snake.len(), 2);
        assert!(arm_effect(&mut state, &mut scheduler, PowerUpKind::Shorten, ms(0), 1).is_none());
        assert!(scheduler.is_empty());
        assert!(state.active_effects.is_empty());
    }

    #[test]
    fn test_double_score_lasts_ten_seconds() {
        let mut scheduler = Scheduler::new();
        let mut state = state();

        apply_immediate(&mut state, PowerUpKind::DoubleScore);
        let effect =
            arm_effect(&mut state, &mut scheduler, PowerUpKind::DoubleScore, ms(500), 4).unwrap();

        assert!(state.double_score);
        assert_eq!(effect.expires_at, ms(10_500));
        end_effect(&mut state, 4);
        assert!(!state.double_score);
    }
}
