use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};

use crate::bridge::BridgeTransport;
use crate::coach::SpeechBackend;
use crate::posture::{Landmark, PoseSample};
use crate::session::{PostureSession, SessionSummary};

/// One line of detector output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FrameInput {
    DetectorError {
        #[serde(rename = "detectorError")]
        detector_error: String,
    },
    Frame {
        #[serde(rename = "timestampMs", default)]
        timestamp_ms: u64,
        /// `null` or missing when nobody is in the frame.
        #[serde(default)]
        landmarks: Option<Vec<Landmark>>,
    },
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("frame input error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    pub health_tick: Duration,
    /// `None` disables break reminders.
    pub break_every: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            health_tick: Duration::from_secs(1),
            break_every: Some(Duration::from_secs(30 * 60)),
        }
    }
}

/// Runs a whole session over newline-delimited JSON frames. The session
/// starts immediately and stops at end of input or on shutdown.
pub async fn run<R, T, S>(
    session: &mut PostureSession<T, S>,
    input: R,
    config: RunnerConfig,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<Option<SessionSummary>, RunnerError>
where
    R: AsyncBufRead + Unpin,
    T: BridgeTransport + 'static,
    S: SpeechBackend,
{
    let mut lines = input.lines();
    let mut rng = StdRng::from_entropy();

    let mut health = interval(config.health_tick);
    health.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut breaks = config.break_every.map(|every| {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });

    session.start().await;

    let result = loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => handle_line(session, &line).await,
                Ok(None) => {
                    tracing::info!("Frame input closed");
                    break Ok(());
                }
                Err(error) => break Err(RunnerError::from(error)),
            },
            _ = health.tick() => {
                if let Some(plant) = session.tick_health() {
                    tracing::trace!(health = plant.health, stage = ?plant.stage, "Plant tick");
                }
            }
            _ = next_tick(&mut breaks) => {
                session.remind_break(&mut rng);
            }
            _ = shutdown_rx.recv() => {
                tracing::info!("Shutdown requested, ending session");
                break Ok(());
            }
        }
    };

    let summary = session.stop().await;
    result.map(|()| summary)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn handle_line<T, S>(session: &mut PostureSession<T, S>, line: &str)
where
    T: BridgeTransport + 'static,
    S: SpeechBackend,
{
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match serde_json::from_str::<FrameInput>(line) {
        Ok(FrameInput::Frame {
            timestamp_ms,
            landmarks: Some(points),
        }) => match PoseSample::new(points, timestamp_ms) {
            Ok(sample) => {
                session.process_frame(Some(&sample)).await;
            }
            Err(error) => {
                tracing::debug!(error = %error, "Unusable sample, treating as absent");
                session.process_frame(None).await;
            }
        },
        Ok(FrameInput::Frame {
            landmarks: None, ..
        }) => {
            session.process_frame(None).await;
        }
        Ok(FrameInput::DetectorError { detector_error }) => {
            let advisory = session.report_detector_error(&detector_error);
            tracing::warn!(advisory, "Detector advisory");
        }
        Err(error) => {
            tracing::warn!(error = %error, "Skipping malformed frame line");
        }
    }
}
