use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroStats {
    pub daily_count: u32,
    pub total_completed: u32,
    pub longest_streak: u32,
    pub current_streak: u32,
    #[serde(default)]
    pub last_completed_date: Option<DateTime<Utc>>,
}

impl PomodoroStats {
    /// Fold one completion at `now` into the counters.
    ///
    /// Streaks count consecutive calendar days: a completion the day after
    /// the previous one extends the streak, one on the same day leaves it,
    /// anything later restarts it at 1.
    pub fn record_completion(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        self.total_completed += 1;

        match self.last_completed_date.map(|d| d.date_naive()) {
            Some(last) if last == today => {
                self.daily_count += 1;
            }
            Some(last) if today.pred_opt() == Some(last) => {
                self.daily_count = 1;
                self.current_streak += 1;
                self.longest_streak = self.longest_streak.max(self.current_streak);
            }
            Some(_) => {
                self.daily_count = 1;
                self.current_streak = 1;
            }
            None => {
                self.daily_count = 1;
                self.current_streak = 1;
                self.longest_streak = 1;
            }
        }

        self.last_completed_date = Some(now);
    }
}
