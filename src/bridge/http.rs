use std::time::Duration;

use crate::bridge::client::{BridgeError, BridgeTransport};
use crate::bridge::{BridgeMessage, BridgeReply};

pub const BRIDGE_PATH: &str = "/api/bridge";

/// Posts bridge messages to a monitor over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            endpoint: endpoint_for(base_url),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint_for(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), BRIDGE_PATH)
}

impl BridgeTransport for HttpTransport {
    async fn send(&self, message: &BridgeMessage) -> Result<BridgeReply, BridgeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(message)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::Status(status.as_u16()));
        }

        response
            .json::<BridgeReply>()
            .await
            .map_err(|e| BridgeError::InvalidReply(e.to_string()))
    }
}

fn map_reqwest_error(error: reqwest::Error) -> BridgeError {
    if error.is_timeout() {
        BridgeError::Timeout
    } else {
        BridgeError::Transport(error.to_string())
    }
}
