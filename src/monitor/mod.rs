//! Background monitor: the authoritative session mirror, the drift walk and
//! the notices that go with them.
//!
//! Bridge and control handlers as well as the drift cron job all go through
//! [`MonitorContext`], which serialises mutations behind one `RwLock`.

pub mod drift;
pub mod mirror;
pub mod notify;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, RwLock};

use crate::bridge::PostureReport;
use crate::clock::{Clock, SystemClock};
use crate::config::DriftConfig;
use crate::store::operations::posture::PostureSnapshot;
use crate::store::Store;

pub use drift::DriftSimulator;
pub use mirror::{MirrorStatus, MirrorView, ScoreSource, SessionMirror};
pub use notify::{Notice, NoticeKind, Notifier, TracingNotifier};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Pushed to realtime subscribers after every mirror change and notice.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Mirror(MirrorView),
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disarmed,
    NotMonitoring,
    LiveFeed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftOutcome {
    Skipped(SkipReason),
    Drifted { score: f64, wilting_alert: bool },
}

struct MonitorState {
    mirror: SessionMirror,
    drift: DriftSimulator<StdRng>,
}

pub struct MonitorContext {
    state: RwLock<MonitorState>,
    config: DriftConfig,
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<MonitorEvent>,
}

impl MonitorContext {
    pub fn new(store: Arc<Store>, config: DriftConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(MonitorState {
                mirror: SessionMirror::default(),
                drift: DriftSimulator::new(StdRng::from_entropy(), config.step),
            }),
            config,
            store,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TracingNotifier),
            events,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        let drift = DriftSimulator::new(StdRng::seed_from_u64(seed), self.config.step);
        self.state.get_mut().drift = drift;
        self
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.events.subscribe()
    }

    pub async fn get_status(&self) -> MirrorStatus {
        self.state.read().await.mirror.status()
    }

    pub async fn view(&self) -> MirrorView {
        self.state.read().await.mirror.view()
    }

    pub async fn live_feed_active(&self) -> bool {
        let now = self.clock.now_ms();
        self.state
            .read()
            .await
            .mirror
            .live_feed_active(now, self.live_timeout_ms())
    }

    /// Live reading from a foreground session. Always wins over drift.
    pub async fn update_posture(&self, report: &PostureReport) {
        let now = self.clock.now_ms();
        let view = {
            let mut state = self.state.write().await;
            let mirror = &mut state.mirror;
            mirror.is_monitoring = true;
            mirror.source = ScoreSource::Live {
                last_update_ms: now,
            };
            mirror.set_score(report.posture_score);
            mirror.session_best = mirror.session_best.max(mirror.current_score);
            mirror.view()
        };

        let snapshot = PostureSnapshot {
            score: report.posture_score,
            angle: report.cervical_angle,
            detected: report.is_person_detected,
            timestamp: now,
        };
        if let Err(error) = self.store.save_last_posture(&snapshot) {
            tracing::warn!(error = %error, "Failed to persist last posture");
        }

        tracing::debug!(score = view.status.current_score, "Live posture update");
        self.publish(MonitorEvent::Mirror(view));
    }

    /// Foreground session started or stopped.
    pub async fn session_status(&self, is_active: bool) {
        let now = self.clock.now_ms();
        let (view, finished) = {
            let mut state = self.state.write().await;
            let mirror = &mut state.mirror;
            mirror.is_monitoring = is_active;
            let finished = if is_active {
                mirror.source = ScoreSource::Live {
                    last_update_ms: now,
                };
                mirror.session_started_ms = Some(now);
                mirror.session_best = 0.0;
                None
            } else {
                mirror.source = ScoreSource::Simulated;
                mirror
                    .session_started_ms
                    .take()
                    .map(|started| (started, mirror.session_best))
            };
            if is_active {
                mirror.refresh();
            } else {
                mirror.set_score(0.0);
            }
            (mirror.view(), finished)
        };

        if let Some((started, best)) = finished {
            let best = best.round().clamp(0.0, 100.0) as u8;
            match self.store.record_session(started, now, best) {
                Ok(stats) => tracing::info!(
                    total_sessions = stats.total_sessions,
                    streak = stats.current_streak,
                    "Session recorded"
                ),
                Err(error) => tracing::warn!(error = %error, "Failed to record session stats"),
            }
        }

        tracing::info!(is_active, "Session status");
        self.publish(MonitorEvent::Mirror(view));
    }

    pub async fn start_monitoring(&self) {
        let view = {
            let mut state = self.state.write().await;
            state.mirror.is_monitoring = true;
            state.mirror.drift_armed = true;
            state.mirror.refresh();
            state.mirror.view()
        };
        tracing::info!("Monitoring started");
        self.publish(MonitorEvent::Mirror(view));
        self.emit_notice(Notice::monitoring_started());
    }

    /// Disarms drift and shows the dormant plant; the score is kept.
    pub async fn stop_monitoring(&self) {
        let view = {
            let mut state = self.state.write().await;
            state.mirror.is_monitoring = false;
            state.mirror.drift_armed = false;
            state.mirror.refresh();
            state.mirror.view()
        };
        tracing::info!("Monitoring stopped");
        self.publish(MonitorEvent::Mirror(view));
    }

    pub async fn update_score(&self, score: f64) {
        let view = {
            let mut state = self.state.write().await;
            state.mirror.set_score(score);
            state.mirror.view()
        };
        self.publish(MonitorEvent::Mirror(view));
    }

    /// One step of the standalone simulation.
    pub async fn drift_tick(&self) -> DriftOutcome {
        let now = self.clock.now_ms();
        let (outcome, view) = {
            let mut state = self.state.write().await;
            let MonitorState { mirror, drift } = &mut *state;

            if !mirror.drift_armed {
                return DriftOutcome::Skipped(SkipReason::Disarmed);
            }
            if !mirror.is_monitoring {
                return DriftOutcome::Skipped(SkipReason::NotMonitoring);
            }
            if mirror.live_feed_active(now, self.live_timeout_ms()) {
                return DriftOutcome::Skipped(SkipReason::LiveFeed);
            }

            if matches!(mirror.source, ScoreSource::Live { .. }) {
                tracing::info!("Live feed silent, switching to simulated score");
            }
            mirror.source = ScoreSource::Simulated;
            let next = drift.perturb(mirror.current_score);
            mirror.set_score(next);
            let wilting_alert = mirror.take_wilting_alert(self.config.wilting_threshold);

            (
                DriftOutcome::Drifted {
                    score: mirror.current_score,
                    wilting_alert,
                },
                mirror.view(),
            )
        };

        self.publish(MonitorEvent::Mirror(view));
        if let DriftOutcome::Drifted {
            wilting_alert: true,
            ..
        } = outcome
        {
            if self.notifications_enabled() {
                self.emit_notice(Notice::wilting());
            } else {
                tracing::debug!("Wilting alert suppressed by preferences");
            }
        }
        outcome
    }

    fn live_timeout_ms(&self) -> u64 {
        self.config.live_timeout_secs.saturating_mul(1_000)
    }

    fn notifications_enabled(&self) -> bool {
        match self.store.get_settings() {
            Ok(settings) => settings.notifications,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to read settings, notifying anyway");
                true
            }
        }
    }

    fn emit_notice(&self, notice: Notice) {
        self.notifier.notify(&notice);
        self.publish(MonitorEvent::Notice(notice));
    }

    fn publish(&self, event: MonitorEvent) {
        // No subscribers is the normal case.
        let _ = self.events.send(event);
    }
}
