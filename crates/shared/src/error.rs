#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::NotFound(target.into())
    }

    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network(reason.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Returns early with an [`Error::Validation`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Validation(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::Error::Validation(format!($err)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Validation(format!($fmt, $($arg)*)))
    };
}
