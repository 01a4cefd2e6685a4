//! Foreground posture session.
//!
//! Owns the per-frame pipeline (geometry, scoring, coaching), the plant
//! health simulation and the client side of the bridge. The session is driven
//! from the outside: `runner` feeds it detector frames and timer ticks from a
//! single `select!` loop, tests call the same methods directly.

pub mod runner;

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use crate::bridge::{BridgeTransport, PostureReport, SessionBridge};
use crate::clock::Clock;
use crate::coach::{
    break_reminder, encouragement, session_end_phrase, Cue, FeedbackStateMachine, SpeechBackend,
    VoiceCoach, SESSION_START_PHRASE,
};
use crate::plant::{HealthSimulator, PlantHealth};
use crate::posture::{analyze_sample, PoseSample, PostureMetrics};

/// What one analysed frame produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub metrics: PostureMetrics,
    pub cues: Vec<Cue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub duration_secs: u64,
    /// Mean score over frames with a person in view; 0 when there were none.
    pub average_score: f64,
    pub frames: u64,
    pub detected_frames: u64,
    pub plant: PlantHealth,
}

pub struct PostureSession<T, S> {
    bridge: SessionBridge<T>,
    coach: VoiceCoach<S>,
    feedback: FeedbackStateMachine,
    health: HealthSimulator,
    clock: Arc<dyn Clock>,
    is_monitoring: bool,
    latest: PostureMetrics,
    started_ms: u64,
    frames: u64,
    detected_frames: u64,
    score_total: u64,
    advisory: Option<String>,
}

impl<T: BridgeTransport + 'static, S: SpeechBackend> PostureSession<T, S> {
    pub fn new(bridge: SessionBridge<T>, coach: VoiceCoach<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            bridge,
            coach,
            feedback: FeedbackStateMachine::new(),
            health: HealthSimulator::default(),
            clock,
            is_monitoring: false,
            latest: PostureMetrics::ABSENT,
            started_ms: 0,
            frames: 0,
            detected_frames: 0,
            score_total: 0,
            advisory: None,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.is_monitoring
    }

    pub fn latest(&self) -> PostureMetrics {
        self.latest
    }

    pub fn plant(&self) -> PlantHealth {
        self.health.snapshot()
    }

    pub fn feedback(&self) -> &FeedbackStateMachine {
        &self.feedback
    }

    pub fn bridge(&self) -> &SessionBridge<T> {
        &self.bridge
    }

    pub fn coach(&self) -> &VoiceCoach<S> {
        &self.coach
    }

    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    /// Waits for queued bridge pushes to reach the background.
    pub async fn flush_bridge(&mut self) {
        self.bridge.flush().await;
    }

    /// Probes the background once. Later calls reuse the first answer.
    pub async fn connect(&mut self) -> bool {
        self.bridge.handshake().await
    }

    pub async fn start(&mut self) {
        if self.is_monitoring {
            return;
        }
        self.connect().await;

        self.is_monitoring = true;
        self.started_ms = self.clock.now_ms();
        self.frames = 0;
        self.detected_frames = 0;
        self.score_total = 0;
        self.latest = PostureMetrics::ABSENT;

        tracing::info!(bridge = ?self.bridge.availability(), "Session started");
        self.bridge.push_session_status(true).await;
        self.coach.say(SESSION_START_PHRASE);
    }

    /// Ends the session. Plant health is kept, coaching state is not.
    pub async fn stop(&mut self) -> Option<SessionSummary> {
        if !self.is_monitoring {
            return None;
        }
        self.is_monitoring = false;
        self.feedback.reset();

        let duration_ms = self.clock.now_ms().saturating_sub(self.started_ms);
        let average_score = if self.detected_frames == 0 {
            0.0
        } else {
            self.score_total as f64 / self.detected_frames as f64
        };
        let summary = SessionSummary {
            duration_secs: duration_ms / 1_000,
            average_score,
            frames: self.frames,
            detected_frames: self.detected_frames,
            plant: self.health.snapshot(),
        };

        self.bridge.push_session_status(false).await;
        self.bridge.flush().await;

        let mut closing = session_end_phrase(summary.duration_secs, average_score);
        if let Some(extra) = encouragement(average_score) {
            closing.push(' ');
            closing.push_str(extra);
        }
        self.coach.say(&closing);

        tracing::info!(
            duration_secs = summary.duration_secs,
            average_score,
            frames = summary.frames,
            "Session stopped"
        );
        Some(summary)
    }

    /// Analyses one detector frame. `None` means nobody was found; frames
    /// arriving while stopped are ignored.
    pub async fn process_frame(&mut self, sample: Option<&PoseSample>) -> Option<FrameOutcome> {
        if !self.is_monitoring {
            return None;
        }

        let metrics = analyze_sample(sample);
        self.latest = metrics;
        self.frames += 1;

        let cues = if metrics.is_person_detected {
            self.detected_frames += 1;
            self.score_total += u64::from(metrics.posture_score);
            let cues = self.feedback.evaluate(metrics.posture_score);
            for cue in &cues {
                self.coach.say(cue.phrase());
            }
            cues
        } else {
            Vec::new()
        };

        self.bridge.push_posture(PostureReport::from(&metrics));
        Some(FrameOutcome { metrics, cues })
    }

    /// Advances plant health by one tick. The plant only grows or wilts
    /// while a person is in view.
    pub fn tick_health(&mut self) -> Option<PlantHealth> {
        if !self.is_monitoring || !self.latest.is_person_detected {
            return None;
        }
        Some(self.health.tick(f64::from(self.latest.posture_score)))
    }

    pub fn remind_break<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&'static str> {
        if !self.is_monitoring {
            return None;
        }
        let text = break_reminder(rng);
        self.coach.say(text);
        Some(text)
    }

    /// Records a detector start-up failure. Only the first one is kept.
    pub fn report_detector_error(&mut self, message: &str) -> &str {
        if self.advisory.is_none() {
            tracing::error!(error = message, "Pose detector failed to initialize");
        }
        self.advisory
            .get_or_insert_with(|| format!("Failed to initialize pose detection: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::bridge::{Availability, BridgeError, BridgeMessage, BridgeReply, BridgeStatus};
    use crate::clock::ManualClock;
    use crate::coach::{SpeechError, VoiceKind, BREAK_REMINDERS};
    use crate::plant::INITIAL_HEALTH;
    use crate::posture::landmarks::{self, Landmark, LANDMARK_COUNT};

    #[derive(Default)]
    struct Spoken(Mutex<Vec<String>>);

    impl SpeechBackend for Spoken {
        fn cancel(&self) -> Result<(), SpeechError> {
            Ok(())
        }

        fn speak(&self, text: &str, _voice: VoiceKind) -> Result<(), SpeechError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Outbox(Mutex<Vec<BridgeMessage>>);

    impl BridgeTransport for Outbox {
        async fn send(&self, message: &BridgeMessage) -> Result<BridgeReply, BridgeError> {
            self.0.lock().unwrap().push(message.clone());
            let status = match message {
                BridgeMessage::Ping => BridgeStatus::Connected,
                BridgeMessage::UpdatePosture { .. } => BridgeStatus::Updated,
                BridgeMessage::SessionStatus { .. } => BridgeStatus::Received,
            };
            Ok(BridgeReply { status })
        }
    }

    struct Offline;

    impl BridgeTransport for Offline {
        async fn send(&self, _message: &BridgeMessage) -> Result<BridgeReply, BridgeError> {
            Err(BridgeError::Timeout)
        }
    }

    fn session_with<T: BridgeTransport + 'static>(
        transport: T,
        clock: Arc<ManualClock>,
    ) -> PostureSession<T, Spoken> {
        PostureSession::new(
            SessionBridge::new(transport),
            VoiceCoach::new(Spoken::default(), true, VoiceKind::Female),
            clock,
        )
    }

    /// Sample whose neck leans so that the cervical angle is `degrees`.
    fn sample_at(degrees: f64) -> PoseSample {
        let theta = degrees.to_radians();
        let shoulder = (0.5, 0.5);
        let hip = (0.5, 0.9);
        // shoulder->hip points straight down; rotate it by `degrees` for the ear.
        let ear = (shoulder.0 + 0.2 * theta.sin(), shoulder.1 + 0.2 * theta.cos());

        let mut points = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        for (left, right, (x, y)) in [
            (landmarks::LEFT_EAR, landmarks::RIGHT_EAR, ear),
            (landmarks::LEFT_SHOULDER, landmarks::RIGHT_SHOULDER, shoulder),
            (landmarks::LEFT_HIP, landmarks::RIGHT_HIP, hip),
        ] {
            points[left] = Landmark::new(x - 0.05, y);
            points[right] = Landmark::new(x + 0.05, y);
        }
        PoseSample::new(points, 0).unwrap()
    }

    #[tokio::test]
    async fn frames_are_ignored_until_started() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock);
        assert!(session.process_frame(Some(&sample_at(175.0))).await.is_none());
        assert!(session.tick_health().is_none());
        assert!(session.stop().await.is_none());
    }

    #[tokio::test]
    async fn start_handshakes_announces_and_pushes_status() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock);
        session.start().await;
        session.flush_bridge().await;

        assert!(session.is_monitoring());
        assert_eq!(session.bridge().availability(), Availability::Connected);
        let sent = session.bridge().transport().0.lock().unwrap().clone();
        assert_eq!(
            sent,
            vec![
                BridgeMessage::Ping,
                BridgeMessage::SessionStatus { is_active: true }
            ]
        );
        let spoken = session.coach().backend().0.lock().unwrap().clone();
        assert_eq!(spoken, vec![SESSION_START_PHRASE.to_string()]);
    }

    #[tokio::test]
    async fn frame_pipeline_scores_and_pushes() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock);
        session.start().await;

        let outcome = session.process_frame(Some(&sample_at(175.0))).await.unwrap();
        assert!(outcome.metrics.is_person_detected);
        assert_eq!(outcome.metrics.posture_score, 100);
        assert!((outcome.metrics.cervical_angle - 175.0).abs() < 0.11);
        assert!(outcome.cues.is_empty());

        let absent = session.process_frame(None).await.unwrap();
        assert_eq!(absent.metrics, PostureMetrics::ABSENT);

        session.flush_bridge().await;
        let sent = session.bridge().transport().0.lock().unwrap().clone();
        assert_eq!(sent.len(), 4);
        assert!(matches!(
            sent[3],
            BridgeMessage::UpdatePosture {
                data: PostureReport {
                    is_person_detected: false,
                    ..
                }
            }
        ));
    }

    #[tokio::test]
    async fn tier_drop_is_spoken_once() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock);
        session.start().await;

        session.process_frame(Some(&sample_at(175.0))).await;
        let outcome = session.process_frame(Some(&sample_at(140.0))).await.unwrap();
        assert_eq!(outcome.cues, vec![Cue::Declining]);
        let outcome = session.process_frame(Some(&sample_at(140.0))).await.unwrap();
        assert!(outcome.cues.is_empty());

        let spoken = session.coach().backend().0.lock().unwrap().clone();
        assert_eq!(spoken.last().map(String::as_str), Some(Cue::Declining.phrase()));
    }

    #[tokio::test]
    async fn absent_frames_do_not_touch_feedback_or_health() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock);
        session.start().await;

        session.process_frame(None).await;
        assert_eq!(session.feedback().previous_tier(), None);
        assert!(session.tick_health().is_none());
        assert_eq!(session.plant().health, INITIAL_HEALTH);

        session.process_frame(Some(&sample_at(175.0))).await;
        assert_eq!(session.tick_health().unwrap().health, INITIAL_HEALTH + 1.0);
    }

    #[tokio::test]
    async fn stop_summarises_and_resets_feedback() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock.clone());
        session.start().await;

        session.process_frame(Some(&sample_at(175.0))).await;
        session.process_frame(Some(&sample_at(150.0))).await;
        session.process_frame(None).await;
        session.tick_health();
        clock.advance_secs(125);

        let summary = session.stop().await.unwrap();
        assert_eq!(summary.duration_secs, 125);
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.detected_frames, 2);
        assert_eq!(summary.average_score, 75.0);
        assert_eq!(session.feedback().previous_tier(), None);
        assert_eq!(session.plant().health, summary.plant.health);

        let spoken = session.coach().backend().0.lock().unwrap().clone();
        let closing = spoken.last().unwrap();
        assert!(closing.contains("2 minutes"));
        assert!(closing.contains("score of 75"));
        assert!(closing.contains("Great job"));

        let sent = session.bridge().transport().0.lock().unwrap().clone();
        assert_eq!(
            sent.last(),
            Some(&BridgeMessage::SessionStatus { is_active: false })
        );
    }

    #[tokio::test]
    async fn offline_bridge_still_coaches() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Offline, clock);
        session.start().await;
        assert_eq!(session.bridge().availability(), Availability::Unavailable);

        let outcome = session.process_frame(Some(&sample_at(175.0))).await.unwrap();
        assert_eq!(outcome.metrics.posture_score, 100);
        assert!(session.stop().await.is_some());
    }

    #[tokio::test]
    async fn break_reminder_only_while_monitoring() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock);
        let mut rng = StdRng::seed_from_u64(3);
        assert!(session.remind_break(&mut rng).is_none());

        session.start().await;
        let text = session.remind_break(&mut rng).unwrap();
        assert!(BREAK_REMINDERS.contains(&text));
    }

    #[test]
    fn detector_advisory_is_kept_once() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(Outbox::default(), clock);
        let first = session.report_detector_error("no camera").to_string();
        session.report_detector_error("still no camera");
        assert_eq!(session.advisory(), Some(first.as_str()));
        assert!(first.contains("no camera"));
    }

    /// Answers the handshake at once, then takes half a second per push.
    struct SlowMonitor;

    impl BridgeTransport for SlowMonitor {
        async fn send(&self, message: &BridgeMessage) -> Result<BridgeReply, BridgeError> {
            if *message == BridgeMessage::Ping {
                return Ok(BridgeReply {
                    status: BridgeStatus::Connected,
                });
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(BridgeReply {
                status: BridgeStatus::Received,
            })
        }
    }

    #[tokio::test]
    async fn slow_monitor_does_not_stall_frames() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = session_with(SlowMonitor, clock);
        session.start().await;
        assert_eq!(session.bridge().availability(), Availability::Connected);

        let started = Instant::now();
        for _ in 0..4 {
            let outcome = session.process_frame(Some(&sample_at(175.0))).await.unwrap();
            assert_eq!(outcome.metrics.posture_score, 100);
        }
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(session.tick_health().is_some());
    }
}
