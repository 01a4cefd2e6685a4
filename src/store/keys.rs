pub const SCHEMA_VERSION: &str = "_meta:version";
pub const SETTINGS: &str = "settings";
pub const STATS: &str = "stats";
pub const LAST_POSTURE: &str = "lastPostureData";

/// Day bucket (`YYYY-MM-DD`, UTC) used for streak tracking.
pub fn day_key(timestamp_ms: u64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(timestamp_ms as i64)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}
