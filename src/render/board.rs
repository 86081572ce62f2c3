//! Paints a `GameState` onto a `Surface`.
//!
//! Each cell is drawn at `cell * cell_size` and is one pixel smaller than
//! the cell pitch, leaving a one-pixel grid gap.

use crate::game::{CANVAS_SIZE, GameMode, GameState, Position, PowerUpKind};

use super::surface::{Paint, PixelRect, Rgb, Surface};

pub const BACKGROUND: Rgb = Rgb::from_hex(0x34495e);
pub const OBSTACLE: Rgb = Rgb::from_hex(0x7f8c8d);
pub const SNAKE_HEAD: Rgb = Rgb::from_hex(0x2ecc71);
pub const SNAKE_BODY: Rgb = Rgb::from_hex(0x27ae60);
pub const FOOD: Rgb = Rgb::from_hex(0xe74c3c);
pub const BORDERLESS_FRAME: Rgb = Rgb::from_hex(0x3498db);

/// Snake opacity while ghost mode is active
pub const GHOST_ALPHA: f32 = 0.6;
pub const FRAME_WIDTH: f32 = 2.0;

pub fn power_up_color(kind: PowerUpKind) -> Rgb {
    match kind {
        PowerUpKind::SpeedUp => Rgb::from_hex(0x3498db),
        PowerUpKind::SlowDown => Rgb::from_hex(0xf1c40f),
        PowerUpKind::DoubleScore => Rgb::from_hex(0xf39c12),
        PowerUpKind::GhostMode => Rgb::from_hex(0x9b59b6),
        PowerUpKind::Shorten => Rgb::from_hex(0x2ecc71),
    }
}

/// Pixel rectangle of one cell
pub fn cell_rect(pos: Position, cell_size: f32) -> PixelRect {
    PixelRect::new(
        pos.x as f32 * cell_size,
        pos.y as f32 * cell_size,
        cell_size - 1.0,
        cell_size - 1.0,
    )
}

/// Draw the whole board. Reads `state`, writes only to `surface`.
pub fn paint<S: Surface + ?Sized>(state: &GameState, surface: &mut S) {
    let cell_size = state.settings.cell_size();
    let canvas = PixelRect::new(0.0, 0.0, CANVAS_SIZE, CANVAS_SIZE);

    surface.fill_rect(canvas, Paint::solid(BACKGROUND));

    if state.settings.mode == GameMode::Obstacle {
        for obstacle in &state.obstacles {
            surface.fill_rect(cell_rect(*obstacle, cell_size), Paint::solid(OBSTACLE));
        }
    }

    let alpha = if state.ghost_mode { GHOST_ALPHA } else { 1.0 };
    for (index, part) in state.snake.body.iter().enumerate() {
        let color = if index == 0 { SNAKE_HEAD } else { SNAKE_BODY };
        surface.fill_rect(cell_rect(*part, cell_size), Paint::translucent(color, alpha));
    }

    if let Some(food) = state.food {
        surface.fill_rect(cell_rect(food, cell_size), Paint::solid(FOOD));
    }

    if let Some(power_up) = state.power_up {
        surface.fill_rect(
            cell_rect(power_up.position, cell_size),
            Paint::solid(power_up_color(power_up.kind)),
        );
    }

    if state.settings.mode == GameMode::Borderless {
        surface.stroke_rect(canvas, Paint::solid(BORDERLESS_FRAME), FRAME_WIDTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Difficulty, Direction, GameSettings, MapSize, PowerUp, Snake};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Fill(PixelRect, Paint),
        Stroke(PixelRect, Paint, f32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Surface for Recorder {
        fn fill_rect(&mut self, rect: PixelRect, paint: Paint) {
            self.calls.push(Call::Fill(rect, paint));
        }

        fn stroke_rect(&mut self, rect: PixelRect, paint: Paint, line_width: f32) {
            self.calls.push(Call::Stroke(rect, paint, line_width));
        }
    }

    fn state(mode: GameMode) -> GameState {
        let settings = GameSettings::new(mode, Difficulty::Medium, MapSize::Medium);
        let snake = Snake::new(Position::new(10, 10), Direction::Right, 3);
        GameState::new(settings, snake, Some(Position::new(2, 3)))
    }

    #[test]
    fn test_cell_rect_leaves_gap() {
        let rect = cell_rect(Position::new(3, 4), 20.0);
        assert_eq!(rect, PixelRect::new(60.0, 80.0, 19.0, 19.0));
    }

    #[test]
    fn test_classic_draw_order() {
        let mut recorder = Recorder::default();
        paint(&state(GameMode::Classic), &mut recorder);

        // background, 3 snake cells, food
        assert_eq!(recorder.calls.len(), 5);
        assert_eq!(
            recorder.calls[0],
            Call::Fill(
                PixelRect::new(0.0, 0.0, CANVAS_SIZE, CANVAS_SIZE),
                Paint::solid(BACKGROUND)
            )
        );
        assert_eq!(
            recorder.calls[1],
            Call::Fill(PixelRect::new(200.0, 200.0, 19.0, 19.0), Paint::solid(SNAKE_HEAD))
        );
        assert_eq!(
            recorder.calls[2],
            Call::Fill(PixelRect::new(180.0, 200.0, 19.0, 19.0), Paint::solid(SNAKE_BODY))
        );
        assert_eq!(
            recorder.calls[4],
            Call::Fill(PixelRect::new(40.0, 60.0, 19.0, 19.0), Paint::solid(FOOD))
        );
    }

    #[test]
    fn test_ghost_snake_is_translucent() {
        let mut state = state(GameMode::Classic);
        state.ghost_mode = true;
        let mut recorder = Recorder::default();
        paint(&state, &mut recorder);

        for call in &recorder.calls[1..4] {
            let Call::Fill(_, paint) = call else {
                panic!("expected fill");
            };
            assert_eq!(paint.alpha, GHOST_ALPHA);
        }
    }

    #[test]
    fn test_obstacles_power_up_and_frame() {
        let mut obstacle_state = state(GameMode::Obstacle);
        obstacle_state.obstacles = vec![Position::new(0, 0)];
        obstacle_state.power_up = Some(PowerUp {
            id: 1,
            kind: PowerUpKind::GhostMode,
            position: Position::new(5, 5),
            expires_at: Duration::from_secs(8),
        });
        let mut recorder = Recorder::default();
        paint(&obstacle_state, &mut recorder);

        assert_eq!(
            recorder.calls[1],
            Call::Fill(PixelRect::new(0.0, 0.0, 19.0, 19.0), Paint::solid(OBSTACLE))
        );
        assert_eq!(
            recorder.calls.last(),
            Some(&Call::Fill(
                PixelRect::new(100.0, 100.0, 19.0, 19.0),
                Paint::solid(power_up_color(PowerUpKind::GhostMode))
            ))
        );
        assert!(!recorder.calls.iter().any(|c| matches!(c, Call::Stroke(..))));

        let mut recorder = Recorder::default();
        paint(&state(GameMode::Borderless), &mut recorder);
        assert_eq!(
            recorder.calls.last(),
            Some(&Call::Stroke(
                PixelRect::new(0.0, 0.0, CANVAS_SIZE, CANVAS_SIZE),
                Paint::solid(BORDERLESS_FRAME),
                FRAME_WIDTH
            ))
        );
    }

    #[test]
    fn test_obstacles_hidden_outside_obstacle_mode() {
        let mut classic = state(GameMode::Classic);
        classic.obstacles = vec![Position::new(0, 0)];
        let mut recorder = Recorder::default();
        paint(&classic, &mut recorder);

        assert!(!recorder
            .calls
            .iter()
            .any(|c| matches!(c, Call::Fill(_, paint) if paint.color == OBSTACLE)));
    }
}
