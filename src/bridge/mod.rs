//! Message shapes exchanged between a foreground session and the background
//! monitor, plus the background-side dispatch.
//!
//! Every message is a JSON object tagged by `action`:
//!
//! ```json
//! {"action": "updatePosture", "data": {"postureScore": 85, "cervicalAngle": 165.0, "isPersonDetected": true}}
//! ```

pub mod client;
pub mod http;

use serde::{Deserialize, Serialize};

use crate::monitor::{MirrorStatus, MonitorContext};
use crate::posture::PostureMetrics;

pub use client::{Availability, BridgeError, BridgeTransport, InProcessTransport, SessionBridge};
pub use http::HttpTransport;

/// One analysed frame as seen by the background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureReport {
    pub posture_score: f64,
    pub cervical_angle: f64,
    pub is_person_detected: bool,
}

impl From<&PostureMetrics> for PostureReport {
    fn from(metrics: &PostureMetrics) -> Self {
        Self {
            posture_score: f64::from(metrics.posture_score),
            cervical_angle: metrics.cervical_angle,
            is_person_detected: metrics.is_person_detected,
        }
    }
}

/// Foreground to background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BridgeMessage {
    Ping,
    UpdatePosture {
        data: PostureReport,
    },
    SessionStatus {
        #[serde(rename = "isActive")]
        is_active: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    Connected,
    Updated,
    Received,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeReply {
    pub status: BridgeStatus,
}

/// Queries and commands from display surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControlMessage {
    GetStatus,
    StartMonitoring,
    StopMonitoring,
    UpdateScore { score: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlReply {
    Status(MirrorStatus),
    Ack { success: bool },
}

impl ControlReply {
    fn ack() -> Self {
        ControlReply::Ack { success: true }
    }
}

pub async fn dispatch_bridge(monitor: &MonitorContext, message: BridgeMessage) -> BridgeReply {
    let status = match message {
        BridgeMessage::Ping => {
            tracing::debug!("Ping received");
            BridgeStatus::Connected
        }
        BridgeMessage::UpdatePosture { data } => {
            monitor.update_posture(&data).await;
            BridgeStatus::Updated
        }
        BridgeMessage::SessionStatus { is_active } => {
            monitor.session_status(is_active).await;
            BridgeStatus::Received
        }
    };
    BridgeReply { status }
}

pub async fn dispatch_control(monitor: &MonitorContext, message: ControlMessage) -> ControlReply {
    match message {
        ControlMessage::GetStatus => ControlReply::Status(monitor.get_status().await),
        ControlMessage::StartMonitoring => {
            monitor.start_monitoring().await;
            ControlReply::ack()
        }
        ControlMessage::StopMonitoring => {
            monitor.stop_monitoring().await;
            ControlReply::ack()
        }
        ControlMessage::UpdateScore { score } => {
            monitor.update_score(score).await;
            ControlReply::ack()
        }
    }
}
