use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::code;
use crate::error::CodedError;
use crate::format;

/// User-facing error payload: code, display message, and the optional
/// documentation reference from the resolved coder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reference: String,
}

impl ErrorBody {
    pub fn from_error(err: &CodedError) -> Self {
        let coder = code::resolve(err);
        Self {
            code: coder.code(),
            message: format::display_message(err),
            reference: coder.reference().to_string(),
        }
    }
}

impl IntoResponse for CodedError {
    fn into_response(self) -> Response {
        let coder = code::resolve(&self);
        let status = StatusCode::from_u16(coder.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorBody::from_error(&self))).into_response()
    }
}
