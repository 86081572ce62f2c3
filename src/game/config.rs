use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Side length of the square drawing surface, in pixels
pub const CANVAS_SIZE: f32 = 400.0;

/// Share of `tile_count` used as the number of obstacles in obstacle mode
pub const OBSTACLE_DENSITY: f32 = 0.15;

/// Obstacles keep a Chebyshev distance strictly greater than this from the start cell
pub const OBSTACLE_SAFE_DISTANCE: i32 = 3;

/// Board topology and hazards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Walls are fatal
    #[default]
    Classic,
    /// Leaving one edge re-enters from the opposite edge
    Borderless,
    /// Walls are fatal and fixed obstacles are scattered over the board
    Obstacle,
}

impl GameMode {
    pub fn label(&self) -> &'static str {
        match self {
            GameMode::Classic => "Classic",
            GameMode::Borderless => "Borderless",
            GameMode::Obstacle => "Obstacle",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            GameMode::Classic => GameMode::Borderless,
            GameMode::Borderless => GameMode::Obstacle,
            GameMode::Obstacle => GameMode::Classic,
        }
    }
}

/// Difficulty selects the base tick interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Time between ticks before any speed power-up is applied
    pub fn base_interval(&self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(200),
            Difficulty::Medium => Duration::from_millis(150),
            Difficulty::Hard => Duration::from_millis(100),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Map size selects the number of cells per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MapSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MapSize {
    pub fn tile_count(&self) -> i32 {
        match self {
            MapSize::Small => 15,
            MapSize::Medium => 20,
            MapSize::Large => 25,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MapSize::Small => "Small",
            MapSize::Medium => "Medium",
            MapSize::Large => "Large",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            MapSize::Small => MapSize::Medium,
            MapSize::Medium => MapSize::Large,
            MapSize::Large => MapSize::Small,
        }
    }
}

/// Settings snapshot applied at session start.
///
/// The session controller copies this when a game starts; later edits only
/// affect the next game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameSettings {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    pub map_size: MapSize,
}

impl GameSettings {
    pub fn new(mode: GameMode, difficulty: Difficulty, map_size: MapSize) -> Self {
        Self {
            mode,
            difficulty,
            map_size,
        }
    }

    /// Number of cells along each side of the board
    pub fn tile_count(&self) -> i32 {
        self.map_size.tile_count()
    }

    pub fn base_interval(&self) -> Duration {
        self.difficulty.base_interval()
    }

    /// Pixel size of one cell on the `CANVAS_SIZE` surface
    pub fn cell_size(&self) -> f32 {
        CANVAS_SIZE / self.tile_count() as f32
    }

    /// Obstacles generated at session start (zero outside obstacle mode)
    pub fn obstacle_count(&self) -> usize {
        match self.mode {
            GameMode::Obstacle => (self.tile_count() as f32 * OBSTACLE_DENSITY).floor() as usize,
            _ => 0,
        }
    }
}

impl fmt::Display for GameSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {}",
            self.mode.label(),
            self.difficulty.label(),
            self.map_size.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = GameSettings::default();
        assert_eq!(settings.mode, GameMode::Classic);
        assert_eq!(settings.tile_count(), 20);
        assert_eq!(settings.base_interval(), Duration::from_millis(150));
        assert_eq!(settings.cell_size(), 20.0);
    }

    #[test]
    fn test_difficulty_intervals() {
        assert_eq!(Difficulty::Easy.base_interval().as_millis(), 200);
        assert_eq!(Difficulty::Medium.base_interval().as_millis(), 150);
        assert_eq!(Difficulty::Hard.base_interval().as_millis(), 100);
    }

    #[test]
    fn test_obstacle_count_scales_with_map() {
        let mut settings = GameSettings::new(GameMode::Obstacle, Difficulty::Easy, MapSize::Small);
        assert_eq!(settings.obstacle_count(), 2);
        settings.map_size = MapSize::Medium;
        assert_eq!(settings.obstacle_count(), 3);
        settings.map_size = MapSize::Large;
        assert_eq!(settings.obstacle_count(), 3);

        settings.mode = GameMode::Classic;
        assert_eq!(settings.obstacle_count(), 0);
    }

    #[test]
    fn test_cycling_wraps_around() {
        assert_eq!(GameMode::Obstacle.next(), GameMode::Classic);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(MapSize::Large.next(), MapSize::Small);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = GameSettings::new(GameMode::Borderless, Difficulty::Hard, MapSize::Large);
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"borderless\""));

        let back: GameSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
