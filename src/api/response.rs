//! Uniform success envelope for all endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success envelope: `{statusCode, message, data, success, status}`.
///
/// `status` is `"ok"`/`"fail"` by `statusCode < 400`; `success` is its
/// boolean mirror. Every handler returns one of these on the happy
/// path so clients see a single response shape.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: String,
    data: Option<T>,
    success: bool,
    status: &'static str,
}

impl<T: Serialize> ApiResponse<T> {
    /// Build an envelope around a payload.
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: Some(data),
            success: status.as_u16() < 400,
            status: if status.as_u16() < 400 { "ok" } else { "fail" },
        }
    }

    /// 200 OK envelope.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    /// 201 Created envelope.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }
}

impl ApiResponse<()> {
    /// Envelope with no payload (`data` serializes as `null`).
    #[must_use]
    pub fn message_only(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: None,
            success: status.as_u16() < 400,
            status: if status.as_u16() < 400 { "ok" } else { "fail" },
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shape_is_stable() {
        let response = ApiResponse::created("Event created successfully", json!({"eventId": "x"}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 201,
                "message": "Event created successfully",
                "data": {"eventId": "x"},
                "success": true,
                "status": "ok"
            })
        );
    }

    #[test]
    fn message_only_serializes_null_data() {
        let response = ApiResponse::message_only(StatusCode::OK, "Registration cancel successfully");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["data"], serde_json::Value::Null);
        assert_eq!(value["status"], "ok");
        assert_eq!(value["success"], true);
    }
}
