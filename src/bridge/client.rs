use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::bridge::{dispatch_bridge, BridgeMessage, BridgeReply, BridgeStatus, PostureReport};
use crate::monitor::MonitorContext;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge transport error: {0}")]
    Transport(String),
    #[error("bridge request timed out")]
    Timeout,
    #[error("bridge returned status {0}")]
    Status(u16),
    #[error("unexpected bridge reply: {0}")]
    InvalidReply(String),
}

/// Delivers one message to the background and returns its reply.
pub trait BridgeTransport: Send + Sync {
    fn send(
        &self,
        message: &BridgeMessage,
    ) -> impl Future<Output = Result<BridgeReply, BridgeError>> + Send;
}

/// Calls straight into a monitor living in the same process.
#[derive(Clone)]
pub struct InProcessTransport {
    monitor: Arc<MonitorContext>,
}

impl InProcessTransport {
    pub fn new(monitor: Arc<MonitorContext>) -> Self {
        Self { monitor }
    }
}

impl BridgeTransport for InProcessTransport {
    async fn send(&self, message: &BridgeMessage) -> Result<BridgeReply, BridgeError> {
        Ok(dispatch_bridge(&self.monitor, message.clone()).await)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// No handshake attempted yet.
    Unknown,
    Connected,
    /// Sticky for the lifetime of this bridge.
    Unavailable,
}

/// Pushes waiting for delivery. A full queue drops posture readings.
const OUTBOX_CAPACITY: usize = 32;

/// Upper bound on how long `flush` waits for queued pushes.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(3);

/// Foreground side of the bridge: handshake once, then best-effort pushes.
///
/// Pushes go through a queue drained by a background task in send order, so
/// a slow or silent monitor never holds up the caller.
pub struct SessionBridge<T> {
    transport: Arc<T>,
    availability: Availability,
    outbox: Option<mpsc::Sender<BridgeMessage>>,
    delivery: Option<JoinHandle<()>>,
}

impl<T: BridgeTransport + 'static> SessionBridge<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            availability: Availability::Unknown,
            outbox: None,
            delivery: None,
        }
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    pub fn is_connected(&self) -> bool {
        self.availability == Availability::Connected
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pings the background. A failed handshake is never retried.
    pub async fn handshake(&mut self) -> bool {
        match self.availability {
            Availability::Connected => return true,
            Availability::Unavailable => return false,
            Availability::Unknown => {}
        }

        let outcome = match self.transport.send(&BridgeMessage::Ping).await {
            Ok(BridgeReply {
                status: BridgeStatus::Connected,
            }) => Ok(()),
            Ok(other) => Err(BridgeError::InvalidReply(format!("{:?}", other.status))),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(()) => {
                tracing::info!("Bridge connected");
                self.availability = Availability::Connected;
                true
            }
            Err(error) => {
                tracing::warn!(error = %error, "Bridge unavailable, live sync disabled");
                self.availability = Availability::Unavailable;
                false
            }
        }
    }

    /// Queues a live reading. Dropped when the queue is full.
    pub fn push_posture(&mut self, report: PostureReport) {
        let Some(outbox) = self.outbox() else {
            return;
        };
        match outbox.try_send(BridgeMessage::UpdatePosture { data: report }) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::debug!("Bridge queue full, posture push dropped")
            }
            Err(TrySendError::Closed(_)) => tracing::debug!("Bridge queue closed"),
        }
    }

    /// Queues a session start/stop. Waits for queue space, never for the reply.
    pub async fn push_session_status(&mut self, is_active: bool) {
        let Some(outbox) = self.outbox() else {
            return;
        };
        if outbox
            .send(BridgeMessage::SessionStatus { is_active })
            .await
            .is_err()
        {
            tracing::debug!("Bridge queue closed, session status dropped");
        }
    }

    /// Delivers whatever is queued, giving up after `FLUSH_TIMEOUT`. Later
    /// pushes start a fresh delivery task.
    pub async fn flush(&mut self) {
        self.outbox = None;
        let Some(mut delivery) = self.delivery.take() else {
            return;
        };
        if tokio::time::timeout(FLUSH_TIMEOUT, &mut delivery)
            .await
            .is_err()
        {
            tracing::warn!("Bridge flush timed out, pending pushes discarded");
            delivery.abort();
        }
    }

    fn outbox(&mut self) -> Option<mpsc::Sender<BridgeMessage>> {
        if !self.is_connected() {
            return None;
        }
        if self.outbox.is_none() {
            let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
            self.delivery = Some(tokio::spawn(deliver(self.transport.clone(), rx)));
            self.outbox = Some(tx);
        }
        self.outbox.clone()
    }
}

async fn deliver<T: BridgeTransport>(transport: Arc<T>, mut rx: mpsc::Receiver<BridgeMessage>) {
    while let Some(message) = rx.recv().await {
        if let Err(error) = transport.send(&message).await {
            tracing::debug!(error = %error, "Bridge push dropped");
        }
    }
}
