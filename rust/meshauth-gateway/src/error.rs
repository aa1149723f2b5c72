use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use meshauth_core::error::PeerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayError {
    pub error: String,
}

/// The response sent whenever a request cannot be attributed to a peer or
/// the peer lacks the access a route requires. Rejected credentials all
/// produce the same body, whatever the reason they were rejected for.
#[derive(Debug)]
pub struct GatewayErrorResponse(pub StatusCode, pub GatewayError);

impl IntoResponse for GatewayErrorResponse {
    fn into_response(self) -> axum::response::Response {
        (self.0, Json(self.1)).into_response()
    }
}

impl From<PeerError> for GatewayErrorResponse {
    fn from(value: PeerError) -> Self {
        GatewayErrorResponse(
            StatusCode::from(&value),
            GatewayError {
                error: value.public_message(),
            },
        )
    }
}

impl From<StatusCode> for GatewayErrorResponse {
    fn from(value: StatusCode) -> Self {
        GatewayErrorResponse(
            value,
            GatewayError {
                error: value.to_string(),
            },
        )
    }
}
