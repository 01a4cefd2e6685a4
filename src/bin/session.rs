//! Reads newline-delimited landmark frames on stdin, coaches the user, and
//! mirrors the session to the monitor service. Prints the summary as JSON.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use neuralstride::bridge::{HttpTransport, SessionBridge};
use neuralstride::clock::SystemClock;
use neuralstride::coach::{CommandSpeech, LogSpeech, SpeechBackend, VoiceCoach};
use neuralstride::config::Config;
use neuralstride::logging::{init_tracing, ConsoleTarget, LogConfig};
use neuralstride::session::runner::{self, RunnerConfig};
use neuralstride::session::PostureSession;
use tokio::io::BufReader;
use tokio::sync::broadcast;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    init_tracing(&LogConfig {
        file_prefix: "neuralstride-session".to_string(),
        console: ConsoleTarget::Stderr,
        ..config.log_config()
    });

    let session_cfg = &config.session;
    tracing::info!(bridge = %session_cfg.bridge_url, "Starting posture session");

    let speech: Arc<dyn SpeechBackend> = match &session_cfg.speech_command {
        Some(program) => Arc::new(CommandSpeech::new(program.clone())),
        None => Arc::new(LogSpeech),
    };
    let coach = VoiceCoach::new(speech, session_cfg.voice_enabled, session_cfg.voice_type);

    let transport = HttpTransport::new(
        &session_cfg.bridge_url,
        Duration::from_millis(session_cfg.bridge_timeout_ms),
    );
    let mut session = PostureSession::new(
        SessionBridge::new(transport),
        coach,
        Arc::new(SystemClock),
    );

    let runner_config = RunnerConfig {
        health_tick: Duration::from_millis(session_cfg.health_tick_ms.max(1)),
        break_every: (session_cfg.break_reminder_mins > 0)
            .then(|| Duration::from_secs(session_cfg.break_reminder_mins * 60)),
    };

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            let _ = shutdown_tx.send(());
        }
    });

    let input = BufReader::new(tokio::io::stdin());
    match runner::run(&mut session, input, runner_config, shutdown_rx).await {
        Ok(Some(summary)) => {
            match serde_json::to_string(&summary) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "Failed to encode session summary"),
            }
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Session aborted");
            ExitCode::FAILURE
        }
    }
}
