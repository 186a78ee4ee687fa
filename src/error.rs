use eventdesk_api::ApiError;
use eventdesk_reservation::ExportError;
use eventdesk_session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    Invalid(#[from] eventdesk_shared::Error),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access denied, redirected to {0}")]
    Redirected(String),

    #[error("Nothing selected")]
    EmptySelection,
}

impl AppError {
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            Self::Api(err) => err.is_unauthenticated(),
            Self::Session(err) => err.is_unauthenticated(),
            _ => false,
        }
    }

    /// Whether the user has already been told about this failure.
    pub fn is_notified(&self) -> bool {
        matches!(
            self,
            Self::Api(_)
                | Self::Session(SessionError::Api(_) | SessionError::NotAuthenticated)
                | Self::Invalid(_)
                | Self::Redirected(_)
                | Self::EmptySelection
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
