use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub type Result<T, E = ServerTimingError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ServerTimingError {
    /// The metric name is not an HTTP token.
    #[error("invalid server timing metric name {name:?}")]
    InvalidName { name: String },

    /// The response headers were transmitted before finalization.
    #[error("server timing headers cannot be added: headers already sent")]
    AlreadySent,

    /// The duration is `NaN` or infinite.
    #[error("server timing metric {name:?} has a non-finite duration")]
    InvalidDuration { name: String },

    #[error("server timing fragment {fragment:?} is not a valid header value")]
    InvalidHeaderValue { fragment: String },

    /// The middleware is not installed on this route.
    #[error("server timing middleware is not attached to this request")]
    NotAttached,
}

impl IntoResponse for ServerTimingError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = serde_json::json!({
            "error":  self.to_string(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
