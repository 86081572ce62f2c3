//! Power Snake - terminal snake with game modes and timed power-ups
//!
//! This library provides:
//! - Core game logic and the session controller (game module)
//! - High score persistence (storage module)
//! - Per-game statistics on session time (metrics module)
//! - Board painting and TUI screens (render module)
//! - Keyboard mapping (input module)
//! - The interactive terminal front end (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;
