use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// Lifetime usage counters, updated once per finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: u64,
    pub total_minutes: u64,
    pub best_score: u8,
    pub current_streak: u32,
    #[serde(default)]
    pub last_session_day: Option<String>,
}

impl SessionStats {
    /// Folds one finished session into the counters.
    pub fn record(&mut self, started_ms: u64, ended_ms: u64, best_score: u8) {
        let minutes = ended_ms.saturating_sub(started_ms) / 60_000;
        let today = keys::day_key(ended_ms);

        self.total_sessions += 1;
        self.total_minutes += minutes;
        self.best_score = self.best_score.max(best_score.min(100));
        self.current_streak = match self.last_session_day.as_deref() {
            Some(day) if day == today => self.current_streak.max(1),
            Some(day) if is_previous_day(day, &today) => self.current_streak + 1,
            _ => 1,
        };
        self.last_session_day = Some(today);
    }
}

fn is_previous_day(day: &str, today: &str) -> bool {
    let (Ok(day), Ok(today)) = (
        NaiveDate::parse_from_str(day, "%Y-%m-%d"),
        NaiveDate::parse_from_str(today, "%Y-%m-%d"),
    ) else {
        return false;
    };
    today.pred_opt() == Some(day)
}

impl Store {
    pub fn get_stats(&self) -> Result<SessionStats, StoreError> {
        Ok(Self::get_json(&self.stats, keys::STATS)?.unwrap_or_default())
    }

    pub fn has_stats(&self) -> Result<bool, StoreError> {
        Ok(self.stats.contains_key(keys::STATS.as_bytes())?)
    }

    pub fn save_stats(&self, stats: &SessionStats) -> Result<(), StoreError> {
        Self::put_json(&self.stats, keys::STATS, stats)
    }

    pub fn record_session(
        &self,
        started_ms: u64,
        ended_ms: u64,
        best_score: u8,
    ) -> Result<SessionStats, StoreError> {
        let mut stats = self.get_stats()?;
        stats.record(started_ms, ended_ms, best_score);
        self.save_stats(&stats)?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: u64 = 86_400_000;
    // 2024-03-02T00:00:00Z
    const MARCH_2: u64 = 1_709_337_600_000;

    #[test]
    fn first_session_starts_streak() {
        let store = Store::temporary().unwrap();
        let stats = store
            .record_session(MARCH_2, MARCH_2 + 25 * 60_000, 82)
            .unwrap();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.total_minutes, 25);
        assert_eq!(stats.best_score, 82);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.last_session_day.as_deref(), Some("2024-03-02"));
    }

    #[test]
    fn consecutive_days_extend_streak() {
        let mut stats = SessionStats::default();
        stats.record(MARCH_2, MARCH_2 + 60_000, 70);
        stats.record(MARCH_2 + 3_600_000, MARCH_2 + 3_660_000, 60);
        assert_eq!(stats.current_streak, 1);

        stats.record(MARCH_2 + DAY_MS, MARCH_2 + DAY_MS + 60_000, 90);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.best_score, 90);
        assert_eq!(stats.total_sessions, 3);
    }

    #[test]
    fn gap_resets_streak() {
        let mut stats = SessionStats::default();
        stats.record(MARCH_2, MARCH_2 + 60_000, 70);
        stats.record(MARCH_2 + DAY_MS, MARCH_2 + DAY_MS + 60_000, 70);
        stats.record(MARCH_2 + 3 * DAY_MS, MARCH_2 + 3 * DAY_MS + 60_000, 70);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn clock_going_backwards_counts_zero_minutes() {
        let mut stats = SessionStats::default();
        stats.record(MARCH_2 + 60_000, MARCH_2, 10);
        assert_eq!(stats.total_minutes, 0);
        assert_eq!(stats.total_sessions, 1);
    }
}
