use serde::Deserialize;
use thiserror::Error;

/// A request the API answered with a non-success status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("GreenInvoice returned HTTP {status}{}", describe(.code, .message.as_deref()))]
pub struct ApiError {
    pub status: u16,
    pub code: Option<i64>,
    pub message: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: Option<i64>,
    error_message: Option<String>,
}

impl ApiError {
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let body: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        ApiError {
            status,
            code: body.error_code,
            message: body.error_message,
        }
    }
}

fn describe(code: &Option<i64>, message: Option<&str>) -> String {
    match (*code, message) {
        (Some(code), Some(message)) => format!(": {message} (error {code})"),
        (None, Some(message)) => format!(": {message}"),
        (Some(code), None) => format!(" (error {code})"),
        (None, None) => String::new(),
    }
}
