use serde::Serialize;

/// A user-facing desktop notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    MonitoringStarted,
    Wilting,
}

impl Notice {
    pub fn monitoring_started() -> Self {
        Self {
            kind: NoticeKind::MonitoringStarted,
            title: "NeuralStride Started".to_string(),
            message: "Your posture plant is now monitoring".to_string(),
        }
    }

    pub fn wilting() -> Self {
        Self {
            kind: NoticeKind::Wilting,
            title: "Your Plant is Wilting".to_string(),
            message: "Your posture is poor. Sit up straight".to_string(),
        }
    }
}

/// Presentation surface for notices (desktop toast, tray, log).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::info!(
            kind = ?notice.kind,
            title = %notice.title,
            message = %notice.message,
            "Notification"
        );
    }
}
