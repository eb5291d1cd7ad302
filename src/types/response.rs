use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Success envelope: `{success, data, message}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

/// 201 with the envelope, for endpoints that create a record.
pub struct Created<T: Serialize>(pub ApiResponse<T>);

impl<T: Serialize> Created<T> {
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self(ApiResponse::with_message(data, message))
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}
