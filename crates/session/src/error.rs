use eventdesk_api::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("session storage: {0}")]
    Storage(#[from] std::io::Error),

    #[error("corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl SessionError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Api(err) if err.is_unauthenticated())
    }

    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::Api(ApiError::MalformedResponse(_)))
    }

    /// Text suitable for a notice.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => err.user_message(fallback),
            Self::NotAuthenticated => "You need to log in first.".to_owned(),
            Self::Storage(_) | Self::Corrupt(_) => fallback.to_owned(),
        }
    }
}
