use std::time::Duration;

/// Per-session statistics shown in the header. Kept in memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct GameMetrics {
    /// Simulated time of the current round; paused time is not counted
    pub elapsed_time: Duration,
    pub best_score: u32,
    pub rounds_played: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            elapsed_time: Duration::ZERO,
            best_score: 0,
            rounds_played: 0,
        }
    }

    pub fn record_tick(&mut self, interval: Duration) {
        self.elapsed_time += interval;
    }

    pub fn on_round_start(&mut self) {
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_round_over(&mut self, final_score: u32) {
        self.rounds_played += 1;
        if final_score > self.best_score {
            self.best_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
