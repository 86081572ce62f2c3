//! Core game logic for Snake
//!
//! Everything here is free of terminal I/O: the session controller is driven
//! by explicit timestamps and draws nothing itself, so it can be exercised
//! directly from tests.

pub mod config;
pub mod direction;
pub mod engine;
pub mod powerup;
pub mod scheduler;
pub mod session;
pub mod state;

// Re-export commonly used types
pub use config::{CANVAS_SIZE, Difficulty, GameMode, GameSettings, MapSize};
pub use direction::Direction;
pub use engine::{GameEngine, StepInfo, StepResult};
pub use powerup::TimerEvent;
pub use scheduler::Scheduler;
pub use session::{SessionController, SessionPhase, SessionStatus};
pub use state::{
    ActiveEffect, CollisionType, GameState, Position, PowerUp, PowerUpKind, Snake,
};
