use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::GameSettings;
use super::direction::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Wrap both coordinates into `[0, tile_count)`
    pub fn wrapped(&self, tile_count: i32) -> Self {
        Self {
            x: self.x.rem_euclid(tile_count),
            y: self.y.rem_euclid(tile_count),
        }
    }

    /// Chebyshev (king-move) distance
    pub fn chebyshev_distance(&self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let (dx, dy) = direction.delta();
        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_by(-dx, -dy));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Check if any segment, head included, occupies `pos`
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Drop up to `amount` tail segments without going below `min_len`.
    /// Returns how many segments were removed.
    pub fn shorten(&mut self, amount: usize, min_len: usize) -> usize {
        let removable = self.body.len().saturating_sub(min_len).min(amount);
        let keep = self.body.len() - removable;
        self.body.truncate(keep);
        removable
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Collectible power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    SpeedUp,
    SlowDown,
    DoubleScore,
    GhostMode,
    Shorten,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::SpeedUp,
        PowerUpKind::SlowDown,
        PowerUpKind::DoubleScore,
        PowerUpKind::GhostMode,
        PowerUpKind::Shorten,
    ];

    /// Pick a kind uniformly at random
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// How long the effect lasts; `None` for instantaneous effects
    pub fn duration(&self) -> Option<Duration> {
        match self {
            PowerUpKind::SpeedUp | PowerUpKind::SlowDown | PowerUpKind::GhostMode => {
                Some(Duration::from_millis(5_000))
            }
            PowerUpKind::DoubleScore => Some(Duration::from_millis(10_000)),
            PowerUpKind::Shorten => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedUp => "Speed Up",
            PowerUpKind::SlowDown => "Slow Down",
            PowerUpKind::DoubleScore => "Double Score",
            PowerUpKind::GhostMode => "Ghost",
            PowerUpKind::Shorten => "Shorten",
        }
    }
}

/// The single collectible power-up on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUp {
    pub id: u64,
    pub kind: PowerUpKind,
    pub position: Position,
    /// Session time at which it vanishes if not collected
    pub expires_at: Duration,
}

/// A timed effect currently in force
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEffect {
    pub id: u64,
    pub kind: PowerUpKind,
    pub label: &'static str,
    pub expires_at: Duration,
}

/// Type of collision that ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake hit an obstacle
    Obstacle,
}

/// Complete game state, owned by the session controller
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub settings: GameSettings,
    pub snake: Snake,
    /// `None` only when the snake covers every free cell
    pub food: Option<Position>,
    pub obstacles: Vec<Position>,
    pub power_up: Option<PowerUp>,
    pub active_effects: Vec<ActiveEffect>,
    pub tick_interval: Duration,
    pub double_score: bool,
    pub ghost_mode: bool,
    pub score: u32,
    pub steps: u32,
    pub is_alive: bool,
    pub collision: Option<CollisionType>,
}

impl GameState {
    /// Create a state with a snake and food but no obstacles or power-ups
    pub fn new(settings: GameSettings, snake: Snake, food: Option<Position>) -> Self {
        Self {
            settings,
            snake,
            food,
            obstacles: Vec::new(),
            power_up: None,
            active_effects: Vec::new(),
            tick_interval: settings.base_interval(),
            double_score: false,
            ghost_mode: false,
            score: 0,
            steps: 0,
            is_alive: true,
            collision: None,
        }
    }

    pub fn tile_count(&self) -> i32 {
        self.settings.tile_count()
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let n = self.tile_count();
        pos.x >= 0 && pos.x < n && pos.y >= 0 && pos.y < n
    }

    pub fn is_obstacle(&self, pos: Position) -> bool {
        self.obstacles.contains(&pos)
    }

    /// Cells food may not be placed on
    pub fn blocks_food(&self, pos: Position) -> bool {
        self.snake.occupies(pos) || self.is_obstacle(pos)
    }

    /// Cells a power-up may not be placed on
    pub fn blocks_power_up(&self, pos: Position) -> bool {
        self.blocks_food(pos) || self.food == Some(pos)
    }

    /// Labels of the effects in force, in activation order
    pub fn effect_labels(&self) -> Vec<&'static str> {
        self.active_effects.iter().map(|e| e.label).collect()
    }
}
