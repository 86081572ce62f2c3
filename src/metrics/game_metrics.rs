use std::time::Duration;

use crate::game::engine::StepInfo;

/// Per-process play statistics, measured on the session's virtual timeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameMetrics {
    /// Time spent running in finished segments of the current game
    played: Duration,
    /// Start of the segment currently running, if any
    running_since: Option<Duration>,
    pub games_played: u32,
    pub food_eaten: u32,
    pub power_ups_collected: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_game_start(&mut self, now: Duration) {
        self.played = Duration::ZERO;
        self.running_since = Some(now);
        self.food_eaten = 0;
        self.power_ups_collected = 0;
    }

    pub fn on_pause(&mut self, now: Duration) {
        if let Some(since) = self.running_since.take() {
            self.played += now.saturating_sub(since);
        }
    }

    pub fn on_resume(&mut self, now: Duration) {
        self.running_since.get_or_insert(now);
    }

    pub fn on_step(&mut self, info: &StepInfo) {
        if info.ate_food {
            self.food_eaten += 1;
        }
        if info.power_up.is_some() {
            self.power_ups_collected += 1;
        }
    }

    pub fn on_game_over(&mut self, now: Duration) {
        self.on_pause(now);
        self.games_played += 1;
    }

    /// Time spent unpaused in the current (or last) game
    pub fn play_time(&self, now: Duration) -> Duration {
        let running = self
            .running_since
            .map(|since| now.saturating_sub(since))
            .unwrap_or_default();
        self.played + running
    }

    pub fn format_time(&self, now: Duration) -> String {
        let total_secs = self.play_time(now).as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::PowerUpKind;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start(secs(0));
        assert_eq!(metrics.format_time(secs(125)), "02:05");
        assert_eq!(metrics.format_time(secs(0)), "00:00");
        assert_eq!(metrics.format_time(secs(3661)), "61:01");
    }

    #[test]
    fn test_pauses_are_not_counted() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start(secs(10));
        metrics.on_pause(secs(20));
        assert_eq!(metrics.play_time(secs(50)), secs(10));

        metrics.on_resume(secs(50));
        assert_eq!(metrics.play_time(secs(55)), secs(15));

        metrics.on_game_over(secs(60));
        assert_eq!(metrics.play_time(secs(100)), secs(20));
        assert_eq!(metrics.games_played, 1);
    }

    #[test]
    fn test_step_counters_reset_per_game() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start(secs(0));
        metrics.on_step(&StepInfo {
            ate_food: true,
            power_up: Some(PowerUpKind::GhostMode),
            ..Default::default()
        });
        metrics.on_step(&StepInfo::default());
        assert_eq!(metrics.food_eaten, 1);
        assert_eq!(metrics.power_ups_collected, 1);

        metrics.on_game_start(secs(5));
        assert_eq!(metrics.food_eaten, 0);
    }
}
