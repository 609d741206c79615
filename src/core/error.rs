use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationInvalidArgument,

    AuthTokenRejected,

    ApiRequestFailed,
    HttpRequestFailed,

    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::AuthTokenRejected => "auth.token_rejected",

            ErrorCode::ApiRequestFailed => "api.request_failed",
            ErrorCode::HttpRequestFailed => "http.request_failed",

            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenRejectedDetails {
    pub status: u16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestFailedDetails {
    pub status: u16,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequestFailedDetails {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let problem = problem.into();
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::ValidationInvalidArgument, problem, details)
    }

    /// Status 203 means dev.azure.com served its sign-in page instead of the
    /// API response. The body is HTML, so it carries no usable message.
    pub fn auth_token_rejected(status: u16) -> Self {
        let details = serde_json::to_value(AuthTokenRejectedDetails { status })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::AuthTokenRejected,
            "It looks like the Access Token is invalid or expired.",
            details,
        )
    }

    pub fn api_request_failed(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let details = serde_json::to_value(ApiRequestFailedDetails {
            status,
            message: message.clone(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ApiRequestFailed,
            format!(
                "Something went wrong! Message given status code {}: {}",
                status, message
            ),
            details,
        )
    }

    pub fn http_request_failed(error: impl Into<String>) -> Self {
        let error = error.into();
        let details = serde_json::to_value(HttpRequestFailedDetails {
            error: error.clone(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::HttpRequestFailed,
            format!("HTTP request failed: {}", error),
            details,
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let error = error.into();
        let details = serde_json::to_value(InternalJsonErrorDetails {
            error: error.clone(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::InternalJsonError,
            format!("Invalid JSON: {}", error),
            details,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_token_rejected_message_is_fixed() {
        let err = Error::auth_token_rejected(203);
        assert_eq!(
            err.message,
            "It looks like the Access Token is invalid or expired."
        );
        assert_eq!(err.code.as_str(), "auth.token_rejected");
        assert_eq!(err.details["status"], 203);
    }

    #[test]
    fn api_request_failed_formats_status_and_message() {
        let err = Error::api_request_failed(404, "not found");
        assert_eq!(
            err.message,
            "Something went wrong! Message given status code 404: not found"
        );
        assert_eq!(err.details["status"], 404);
        assert_eq!(err.details["message"], "not found");
    }

    #[test]
    fn validation_error_carries_field_details() {
        let err = Error::validation_invalid_argument("connection_id", "must not be empty");
        assert_eq!(err.code, ErrorCode::ValidationInvalidArgument);
        assert_eq!(err.details["field"], "connection_id");
    }
}
