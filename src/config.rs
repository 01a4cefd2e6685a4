use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::coach::VoiceKind;
use crate::logging::LogConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub worker: WorkerConfig,
    pub drift: DriftConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub drift_cron: String,
}

/// Tuning of the background random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftConfig {
    /// Largest absolute change applied by one drift tick.
    pub step: f64,
    /// Seconds of silence after a live push before drift resumes.
    pub live_timeout_secs: u64,
    pub wilting_threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            step: 5.0,
            live_timeout_secs: 15,
            wilting_threshold: 30.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the background monitor, e.g. `http://127.0.0.1:3000`.
    pub bridge_url: String,
    pub bridge_timeout_ms: u64,
    pub voice_enabled: bool,
    pub voice_type: VoiceKind,
    /// TTS program; when empty, utterances only go to the log.
    pub speech_command: Option<String>,
    pub health_tick_ms: u64,
    pub break_reminder_mins: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bridge_url: "http://127.0.0.1:3000".to_string(),
            bridge_timeout_ms: 2_000,
            voice_enabled: true,
            voice_type: VoiceKind::Female,
            speech_command: None,
            health_tick_ms: 1_000,
            break_reminder_mins: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let drift_defaults = DriftConfig::default();
        let session_defaults = SessionConfig::default();

        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/neuralstride.sled"),
            cors_origin: env_or("CORS_ORIGIN", "*"),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                drift_cron: env_or("DRIFT_CRON", "*/6 * * * * *"),
            },
            drift: DriftConfig {
                step: env_or_parse("DRIFT_STEP", drift_defaults.step).abs(),
                live_timeout_secs: env_or_parse(
                    "DRIFT_LIVE_TIMEOUT_SECS",
                    drift_defaults.live_timeout_secs,
                ),
                wilting_threshold: env_or_parse(
                    "WILTING_THRESHOLD",
                    drift_defaults.wilting_threshold,
                ),
            },
            session: SessionConfig {
                bridge_url: env_or("BRIDGE_URL", &session_defaults.bridge_url),
                bridge_timeout_ms: env_or_parse(
                    "BRIDGE_TIMEOUT_MS",
                    session_defaults.bridge_timeout_ms,
                ),
                voice_enabled: env_or_bool("VOICE_ENABLED", session_defaults.voice_enabled),
                voice_type: env_or_parse("VOICE_TYPE", session_defaults.voice_type),
                speech_command: env::var("SPEECH_COMMAND")
                    .ok()
                    .map(|raw| raw.trim().to_string())
                    .filter(|raw| !raw.is_empty()),
                health_tick_ms: env_or_parse("HEALTH_TICK_MS", session_defaults.health_tick_ms)
                    .max(1),
                break_reminder_mins: env_or_parse(
                    "BREAK_REMINDER_MINS",
                    session_defaults.break_reminder_mins,
                ),
            },
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_level: self.log_level.clone(),
            enable_file_logs: self.enable_file_logs,
            log_dir: self.log_dir.clone(),
            ..LogConfig::default()
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
