use rand::Rng;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use super::board;
use super::canvas::CellCanvas;
use crate::game::{GameSettings, SessionController, SessionPhase, SessionStatus};
use crate::storage::HighScoreStore;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<S: HighScoreStore, R: Rng>(
        &self,
        frame: &mut Frame,
        session: &SessionController<S, R>,
    ) {
        let status = session.status();
        if status.phase == SessionPhase::NotStarted {
            self.render_menu(frame, session.settings(), status.high_score);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Active effects
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let clock = session.metrics().format_time(session.now());
        frame.render_widget(self.render_stats(&status, clock), chunks[0]);

        let mut canvas = CellCanvas::new(session.state().tile_count());
        board::paint(session.state(), &mut canvas);
        let board_area = centered(
            chunks[1],
            canvas.tile_count() as u16 * 2 + 2,
            canvas.tile_count() as u16 + 2,
        );
        frame.render_widget(self.render_board(&canvas), board_area);

        match status.phase {
            SessionPhase::Paused => {
                let popup = centered(board_area, 28, 5);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_paused(), popup);
            }
            SessionPhase::GameOver => {
                let popup = centered(board_area, 36, 9);
                frame.render_widget(Clear, popup);
                frame.render_widget(self.render_game_over(&status), popup);
            }
            SessionPhase::Running | SessionPhase::NotStarted => {}
        }

        frame.render_widget(self.render_effects(&status), chunks[2]);
        frame.render_widget(self.render_controls(status.phase), chunks[3]);
    }

    fn render_board(&self, canvas: &CellCanvas) -> Paragraph<'static> {
        let border_color = canvas
            .frame()
            .map(|rgb| Color::Rgb(rgb.r, rgb.g, rgb.b))
            .unwrap_or(Color::White);
        let border_type = if canvas.frame().is_some() {
            BorderType::Thick
        } else {
            BorderType::Double
        };

        Paragraph::new(canvas.to_lines()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(Style::default().fg(border_color)),
        )
    }

    fn render_stats(&self, status: &SessionStatus, clock: String) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                status.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High: ", Style::default().fg(Color::Yellow)),
            Span::styled(status.high_score.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Steps: ", Style::default().fg(Color::Yellow)),
            Span::styled(status.steps.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Mode: ", Style::default().fg(Color::Yellow)),
            Span::styled(status.mode_label, Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(clock, Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled(
                status.heading.arrow().to_string(),
                Style::default().fg(Color::Cyan),
            ),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_effects(&self, status: &SessionStatus) -> Paragraph<'static> {
        let mut spans = vec![Span::styled("Effects: ", Style::default().fg(Color::Yellow))];
        if status.effect_labels.is_empty() {
            spans.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
        } else {
            spans.push(Span::styled(
                status.effect_labels.join(", "),
                Style::default().fg(Color::Magenta),
            ));
        }

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }

    fn render_paused(&self) -> Paragraph<'static> {
        let text = vec![
            Line::from(Span::styled(
                "PAUSED",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "P to resume, M for menu",
                Style::default().fg(Color::Gray),
            )),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
    }

    fn render_game_over(&self, status: &SessionStatus) -> Paragraph<'static> {
        let final_score = status.final_score.unwrap_or(status.score);
        let mut text = vec![
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    final_score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(status.high_score.to_string(), Style::default().fg(Color::White)),
            ]),
        ];
        if status.new_high_score {
            text.push(Line::from(Span::styled(
                "New high score!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "R",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "M",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" for menu", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_menu(&self, frame: &mut Frame, settings: GameSettings, high_score: u32) {
        let option = |key: &'static str, name: &'static str, value: &'static str| {
            Line::from(vec![
                Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {:<12}", name), Style::default().fg(Color::Gray)),
                Span::styled(
                    value,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        };

        let text = vec![
            Line::from(Span::styled(
                "S N A K E",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            option("1", "Mode", settings.mode.label()),
            option("2", "Difficulty", settings.difficulty.label()),
            option("3", "Map Size", settings.map_size.label()),
            Line::from(""),
            Line::from(vec![
                Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(high_score.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Enter", Style::default().fg(Color::Green)),
                Span::raw(" to start | "),
                Span::styled("Q", Style::default().fg(Color::Red)),
                Span::raw(" to quit"),
            ]),
        ];

        let area = centered(frame.area(), 40, text.len() as u16 + 2);
        let menu = Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Main Menu "),
        );
        frame.render_widget(menu, area);
    }

    fn render_controls(&self, phase: SessionPhase) -> Paragraph<'static> {
        let mut spans = vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("P", Style::default().fg(Color::Yellow)),
            Span::raw(" pause | "),
        ];
        if phase != SessionPhase::Running {
            spans.push(Span::styled("M", Style::default().fg(Color::Cyan)));
            spans.push(Span::raw(" menu | "));
        }
        spans.push(Span::styled("Q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" to quit"));

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width x height` rect centred in `area`, shrunk to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameEngine};
    use crate::storage::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Duration;

    fn session(high_score: u32) -> SessionController<MemoryStore, StdRng> {
        SessionController::with_engine(
            GameSettings::default(),
            MemoryStore::with_value(high_score),
            GameEngine::with_rng(StdRng::seed_from_u64(7)),
        )
    }

    fn draw(session: &SessionController<MemoryStore, StdRng>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let renderer = Renderer::new();
        terminal
            .draw(|frame| renderer.render(frame, session))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_menu_shows_settings_and_high_score() {
        let screen = draw(&session(42));
        assert!(screen.contains("Main Menu"));
        assert!(screen.contains("Classic"));
        assert!(screen.contains("Medium"));
        assert!(screen.contains("42"));
    }

    #[test]
    fn test_running_hud() {
        let mut session = session(5);
        session.start(Duration::ZERO);
        let screen = draw(&session);
        assert!(screen.contains("Score:"));
        assert!(screen.contains("High:"));
        assert!(screen.contains("Steps: 0"));
        assert!(screen.contains("Classic"));
        assert!(screen.contains("00:00"));
        assert!(screen.contains(Direction::Right.arrow()));
        assert!(screen.contains("none"));
    }

    #[test]
    fn test_pause_overlay() {
        let mut session = session(0);
        session.start(Duration::ZERO);
        session.toggle_pause(Duration::from_millis(10));
        assert!(draw(&session).contains("PAUSED"));
    }

    #[test]
    fn test_game_over_panel() {
        let mut session = session(0);
        session.start(Duration::ZERO);
        // Classic mode: heading right from the centre runs into the wall
        session.advance(Duration::from_secs(10));
        assert_eq!(session.phase(), SessionPhase::GameOver);

        let screen = draw(&session);
        assert!(screen.contains("GAME OVER"));
        assert!(screen.contains("Final Score:"));
    }
}
