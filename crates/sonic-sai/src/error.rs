//! Errors returned by the SAI port wrappers.

use thiserror::Error;

/// Failure of a SAI call made on behalf of the flex-port path.
///
/// `Clone + PartialEq` so that callers can embed it in their own comparable
/// error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaiError {
    #[error("not supported: {feature}")]
    NotSupported { feature: String },

    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("not found: {item}")]
    NotFound { item: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl SaiError {
    pub fn not_supported(feature: impl Into<String>) -> Self {
        Self::NotSupported {
            feature: feature.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn not_found(item: impl Into<String>) -> Self {
        Self::NotFound { item: item.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result of a SAI call.
pub type SaiResult<T> = Result<T, SaiError>;
