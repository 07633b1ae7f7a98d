use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("NotFound: {0}")]
    NotFound(String),
    #[error("Corruption: {0}")]
    Corruption(String),
    #[error("NotSupported: {0}")]
    NotSupported(String),
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),
    #[error("InvalidState: {0}")]
    InvalidState(String),
    #[error("IOError: {0}")]
    IOError(String),
}

impl Error {
    pub fn not_found(msg: &str) -> Self {
        Self::NotFound(msg.to_owned())
    }

    pub fn corruption(msg: &str) -> Self {
        Self::Corruption(msg.to_owned())
    }

    pub fn not_supported(msg: &str) -> Self {
        Self::NotSupported(msg.to_owned())
    }

    pub fn invalid_argument(msg: &str) -> Self {
        Self::InvalidArgument(msg.to_owned())
    }

    pub fn invalid_state(msg: &str) -> Self {
        Self::InvalidState(msg.to_owned())
    }

    pub fn io_error(msg: &str) -> Self {
        Self::IOError(msg.to_owned())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption(_))
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::IOError(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
