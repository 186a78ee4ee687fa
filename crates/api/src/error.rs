use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach the server: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("authentication required")]
    Unauthenticated,

    #[error("validation failed: {}", validation_text(.message, .details))]
    Validation {
        message: String,
        details: Vec<String>,
    },

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
}

fn validation_text(message: &str, details: &[String]) -> String {
    if details.is_empty() {
        message.to_owned()
    } else {
        details.join(", ")
    }
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Vec<Value>>,
}

impl ErrorBody {
    fn text(&self) -> Option<String> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    }

    fn details(&self) -> Vec<String> {
        self.details
            .iter()
            .flatten()
            .map(|detail| match detail {
                Value::String(text) => text.to_owned(),
                Value::Object(fields) => fields
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .unwrap_or_else(|| detail.to_string()),
                other => other.to_string(),
            })
            .collect()
    }
}

impl ApiError {
    /// Maps a non-success response onto the error taxonomy.
    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let body = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
        let text = body.text();

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthenticated,
            StatusCode::BAD_REQUEST => Self::Validation {
                message: text.unwrap_or_else(|| "Invalid data".to_owned()),
                details: body.details(),
            },
            StatusCode::FORBIDDEN => {
                Self::Forbidden(text.unwrap_or_else(|| "access denied".to_owned()))
            }
            StatusCode::NOT_FOUND => {
                Self::NotFound(text.unwrap_or_else(|| "resource not found".to_owned()))
            }
            _ => Self::Status {
                status: status.as_u16(),
                message: text.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_owned()
                }),
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated => Some(401),
            Self::Validation { .. } => Some(400),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Text suitable for a notice. `fallback` is used when the server gave
    /// nothing better.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Transport(_) => "Could not reach the server. Please try again.".to_owned(),
            Self::Unauthenticated => "Your session has expired. Please log in again.".to_owned(),
            Self::Validation { message, details } => {
                format!("Validation error: {}", validation_text(message, details))
            }
            Self::Forbidden(_) => "You do not have permission to perform this action.".to_owned(),
            Self::NotFound(_) => "The requested resource was not found.".to_owned(),
            Self::Status { status, message } if *status < 500 => message.to_owned(),
            _ => fallback.to_owned(),
        }
    }
}
