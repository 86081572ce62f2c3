use rand::Rng;
use rand::rngs::ThreadRng;

use super::config::{GameMode, GameSettings, OBSTACLE_SAFE_DISTANCE};
use super::direction::Direction;
use super::powerup;
use super::state::{CollisionType, GameState, Position, PowerUpKind, Snake};

/// Random draws tried before falling back to scanning every cell
pub const MAX_PLACEMENT_ATTEMPTS: usize = 64;

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Power-up collected this step, its immediate effect already applied
    pub power_up: Option<PowerUpKind>,
    /// Tail segments removed by a shorten power-up
    pub shortened_by: usize,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    pub info: StepInfo,
}

/// Advances a `GameState` one tick at a time.
///
/// Generic over the random source so tests can drive it with a seeded rng.
pub struct GameEngine<R = ThreadRng> {
    rng: R,
}

impl GameEngine<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for GameEngine<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Build a fresh state for `settings`: single-cell snake in the centre
    /// heading right, obstacles (obstacle mode only), then food.
    pub fn reset(&mut self, settings: GameSettings) -> GameState {
        let start = start_cell(&settings);
        let snake = Snake::new(start, Direction::Right, 1);
        let mut state = GameState::new(settings, snake, None);

        if settings.mode == GameMode::Obstacle {
            self.generate_obstacles(&mut state);
        }
        self.respawn_food(&mut state);
        state
    }

    /// Execute one tick of the game
    pub fn step(&mut self, state: &mut GameState) -> StepResult {
        if !state.is_alive {
            return StepResult {
                terminated: true,
                info: StepInfo::default(),
            };
        }

        let mut info = StepInfo::default();
        let tile_count = state.tile_count();

        let mut new_head = state.snake.head().moved_in_direction(state.snake.direction);
        if state.settings.mode == GameMode::Borderless {
            new_head = new_head.wrapped(tile_count);
        }
        state.snake.body.insert(0, new_head);

        if state.food == Some(new_head) {
            info.ate_food = true;
            state.score += if state.double_score { 2 } else { 1 };
            self.respawn_food(state);
        } else {
            state.snake.body.pop();
        }

        if let Some(power_up) = state.power_up {
            if power_up.position == new_head {
                state.power_up = None;
                info.power_up = Some(power_up.kind);
                info.shortened_by = powerup::apply_immediate(state, power_up.kind);
            }
        }

        state.steps += 1;

        // Collisions are judged after food and power-ups have resolved
        if let Some(collision) = check_collision(state) {
            state.is_alive = false;
            state.collision = Some(collision);
            info.collision_type = Some(collision);
        }

        StepResult {
            terminated: !state.is_alive,
            info,
        }
    }

    /// Place food on a random free cell
    pub fn respawn_food(&mut self, state: &mut GameState) {
        let tile_count = state.tile_count();
        state.food = find_free_cell(&mut self.rng, tile_count, |pos| state.blocks_food(pos));
    }

    fn generate_obstacles(&mut self, state: &mut GameState) {
        let start = start_cell(&state.settings);
        let tile_count = state.tile_count();

        state.obstacles.clear();
        for _ in 0..state.settings.obstacle_count() {
            let candidate = find_free_cell(&mut self.rng, tile_count, |pos| {
                state.snake.occupies(pos)
                    || state.food == Some(pos)
                    || state.obstacles.contains(&pos)
                    || pos.chebyshev_distance(start) <= OBSTACLE_SAFE_DISTANCE
            });
            match candidate {
                Some(pos) => state.obstacles.push(pos),
                None => break,
            }
        }
    }
}

/// Where the snake starts for these settings
pub fn start_cell(settings: &GameSettings) -> Position {
    let centre = settings.tile_count() / 2;
    Position::new(centre, centre)
}

/// A uniformly random cell; may be occupied
pub fn random_cell<R: Rng + ?Sized>(rng: &mut R, tile_count: i32) -> Position {
    Position::new(rng.gen_range(0..tile_count), rng.gen_range(0..tile_count))
}

/// Find an unblocked cell.
///
/// Draws up to `MAX_PLACEMENT_ATTEMPTS` random cells, then scans the whole
/// grid and picks uniformly among the free ones. `None` means the grid is full.
pub fn find_free_cell<R, F>(rng: &mut R, tile_count: i32, blocked: F) -> Option<Position>
where
    R: Rng + ?Sized,
    F: Fn(Position) -> bool,
{
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = random_cell(rng, tile_count);
        if !blocked(pos) {
            return Some(pos);
        }
    }

    let free: Vec<Position> = (0..tile_count)
        .flat_map(|y| (0..tile_count).map(move |x| Position::new(x, y)))
        .filter(|pos| !blocked(*pos))
        .collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.gen_range(0..free.len())])
    }
}

fn check_collision(state: &GameState) -> Option<CollisionType> {
    let head = state.snake.head();

    if state.settings.mode != GameMode::Borderless && !state.is_in_bounds(head) {
        return Some(CollisionType::Wall);
    }

    if !state.ghost_mode && state.snake.collides_with_body(head) {
        return Some(CollisionType::SelfCollision);
    }

    if state.settings.mode == GameMode::Obstacle && state.is_obstacle(head) {
        return Some(CollisionType::Obstacle);
    }

    None
}
