use serde::{Deserialize, Serialize};

use super::{ClassPhase, ClassSession};

/// Aggregate class counters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassModeStats {
    pub total_sessions: u32,
    pub average_attention: f64,
    /// Sessions finished with zero distractions.
    pub total_distractions_avoided: u32,
    pub best_attention_score: u8,
    /// +1 per completed class, never reset.
    pub current_streak: u32,
    pub challenges_completed: u32,
}

impl ClassModeStats {
    /// Fold one completed session into the counters.
    pub fn record(&mut self, session: &ClassSession) {
        let score = session.evaluation.attention_score;
        self.total_sessions += 1;
        let n = f64::from(self.total_sessions);
        self.average_attention = (self.average_attention * (n - 1.0) + f64::from(score)) / n;
        self.best_attention_score = self.best_attention_score.max(score);
        if session.distraction_count == 0 {
            self.total_distractions_avoided += 1;
        }
        if session.evaluation.challenge_completed {
            self.challenges_completed += 1;
        }
        // TODO: day-gap reset like the pomodoro streak once the intended rule is settled
        self.current_streak += 1;
    }

    /// Rebuild the counters from archived sessions, ignoring anything not
    /// completed.
    pub fn from_history(history: &[ClassSession]) -> Self {
        let mut stats = Self::default();
        for s in history.iter().filter(|s| s.phase == ClassPhase::Completed) {
            stats.record(s);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_mode::{ClassEvaluation, MicroChallenge};
    use chrono::Utc;

    fn done(score: u8, distractions: u32, challenge: bool) -> ClassSession {
        let challenge_def = MicroChallenge {
            id: "c".into(),
            description: "d".into(),
            completed: false,
            points: 10,
        };
        let mut s = ClassSession::new("s", "c", challenge_def, 3, Utc::now());
        s.phase = ClassPhase::Completed;
        s.distraction_count = distractions;
        s.evaluation = ClassEvaluation {
            attention_score: score,
            challenge_completed: challenge,
            ..ClassEvaluation::default()
        };
        s
    }

    #[test]
    fn streaming_mean_matches_plain_mean() {
        let mut stats = ClassModeStats::default();
        for score in [6, 9, 3] {
            stats.record(&done(score, 1, false));
        }
        assert!((stats.average_attention - 6.0).abs() < 1e-9);
        assert_eq!(stats.best_attention_score, 9);
        assert_eq!(stats.current_streak, 3);
    }

    #[test]
    fn distraction_free_only_counts_zero() {
        let mut stats = ClassModeStats::default();
        stats.record(&done(5, 0, true));
        stats.record(&done(5, 1, false));
        assert_eq!(stats.total_distractions_avoided, 1);
        assert_eq!(stats.challenges_completed, 1);
    }

    #[test]
    fn from_history_skips_unfinished() {
        let mut unfinished = done(10, 0, true);
        unfinished.phase = ClassPhase::After;
        let stats = ClassModeStats::from_history(&[done(4, 0, false), unfinished]);
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.best_attention_score, 4);
    }
}
