use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use crate::response::AppError;

/// JSON body whose rejections become `AppError` bodies. Bridge and control
/// payloads that name an unknown `action` fail here with `INVALID_REQUEST_BODY`.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(value)| JsonBody(value))
            .map_err(rejection_to_app_error)
    }
}

fn rejection_to_app_error(rejection: JsonRejection) -> AppError {
    tracing::debug!(error = %rejection, "Rejected request body");
    match rejection {
        JsonRejection::JsonDataError(e) => AppError::invalid_body(&e.body_text()),
        JsonRejection::JsonSyntaxError(_) => {
            AppError::invalid_body("Request body is not valid JSON")
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::invalid_body("Expected Content-Type: application/json")
        }
        JsonRejection::BytesRejection(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                code: "PAYLOAD_TOO_LARGE".to_string(),
                message: "Request body too large".to_string(),
                is_operational: true,
            }
        }
        _ => AppError::invalid_body("Invalid request body"),
    }
}

impl<T> std::ops::Deref for JsonBody<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    use super::*;
    use crate::bridge::BridgeMessage;
    use crate::response::INVALID_REQUEST_BODY;

    fn json_request(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_known_action() {
        let JsonBody(message) = JsonBody::<BridgeMessage>::from_request(
            json_request(r#"{"action":"ping"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(message, BridgeMessage::Ping);
    }

    #[tokio::test]
    async fn unknown_action_is_invalid_body() {
        let err = JsonBody::<BridgeMessage>::from_request(
            json_request(r#"{"action":"reboot"}"#),
            &(),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, INVALID_REQUEST_BODY);
    }

    #[tokio::test]
    async fn syntax_error_has_fixed_message() {
        let err = JsonBody::<BridgeMessage>::from_request(json_request("{"), &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.message, "Request body is not valid JSON");
    }
}
