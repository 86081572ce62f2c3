use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use rand::Rng;
use rand::rngs::ThreadRng;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, interval, sleep_until};

use crate::game::{GameSettings, SessionController, SessionPhase};
use crate::input::{InputHandler, KeyAction};
use crate::render::Renderer;
use crate::storage::HighScoreStore;

/// Interactive terminal front end around a `SessionController`.
///
/// Session time is wall-clock time since the mode was created.
pub struct HumanMode<S, R = ThreadRng> {
    session: SessionController<S, R>,
    renderer: Renderer,
    input_handler: InputHandler,
    origin: Instant,
    should_quit: bool,
}

impl<S: HighScoreStore> HumanMode<S, ThreadRng> {
    pub fn new(settings: GameSettings, store: S) -> Self {
        Self::with_session(SessionController::new(settings, store))
    }
}

impl<S: HighScoreStore, R: Rng> HumanMode<S, R> {
    pub fn with_session(session: SessionController<S, R>) -> Self {
        Self {
            session,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            origin: Instant::now(),
            should_quit: false,
        }
    }

    pub fn session(&self) -> &SessionController<S, R> {
        &self.session
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            let deadline = self.session.next_deadline().map(|at| self.origin + at);

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => {
                            return Err(err).context("Failed to read terminal event");
                        }
                        None => self.should_quit = true,
                    }
                }

                // Session timers
                _ = wait_until(deadline) => {
                    self.session.advance(self.elapsed());
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.session.advance(self.elapsed());
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.session);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        tracing::info!(
            high_score = self.session.high_score(),
            games_played = self.session.metrics().games_played,
            "exiting"
        );
        Ok(())
    }

    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            let action = self.input_handler.handle_key_event(key);
            let now = self.elapsed();
            self.apply(action, now);
        }
    }

    /// Route a key action to the session, honouring the current phase
    fn apply(&mut self, action: KeyAction, now: Duration) {
        let phase = self.session.phase();
        match action {
            KeyAction::Turn(direction) => {
                self.session.advance(now);
                self.session.change_direction(direction);
            }
            KeyAction::TogglePause => self.session.toggle_pause(now),
            KeyAction::Start => {
                if matches!(phase, SessionPhase::NotStarted | SessionPhase::GameOver) {
                    self.session.start(now);
                }
            }
            KeyAction::Restart => {
                if matches!(phase, SessionPhase::Paused | SessionPhase::GameOver) {
                    self.session.restart(now);
                }
            }
            KeyAction::Menu => {
                if matches!(phase, SessionPhase::Paused | SessionPhase::GameOver) {
                    self.session.quit_to_menu();
                }
            }
            KeyAction::CycleMode if phase == SessionPhase::NotStarted => {
                self.session.cycle_mode();
            }
            KeyAction::CycleDifficulty if phase == SessionPhase::NotStarted => {
                self.session.cycle_difficulty();
            }
            KeyAction::CycleMapSize if phase == SessionPhase::NotStarted => {
                self.session.cycle_map_size();
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::CycleMode
            | KeyAction::CycleDifficulty
            | KeyAction::CycleMapSize
            | KeyAction::None => {}
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Sleep until `deadline`, or forever when nothing is scheduled
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
