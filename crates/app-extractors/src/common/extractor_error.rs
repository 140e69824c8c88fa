use thiserror::Error;

use super::{platform::Platform, url::QueryParamError};

pub type ExtractorResult<T> = Result<T, ExtractorError>;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("share url {0:?} does not match any configured source")]
    SourceNotConfigured(String),
    #[error("{platform} does not support {operation}")]
    UnsupportedOperation {
        platform: Platform,
        operation: &'static str,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("upstream fetch failed: {0}")]
    UpstreamFetchFailed(String),
    #[error("upstream response changed shape: {0}")]
    UpstreamShapeMismatch(String),
    #[error("{0}")]
    UpstreamReportedError(String),
}

/// Coarse classification of an [`ExtractorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller supplied something we cannot work with
    Input,
    /// The platform rejected the request or changed its format
    Upstream,
    /// The platform is not registered or has no support for the operation
    Configuration,
}

impl ExtractorError {
    pub fn invalid_argument<T: Into<String>>(reason: T) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub fn fetch_failed<T: Into<String>>(context: T) -> Self {
        Self::UpstreamFetchFailed(context.into())
    }

    pub fn shape_mismatch<T: Into<String>>(anchor: T) -> Self {
        Self::UpstreamShapeMismatch(anchor.into())
    }

    pub fn reported<T: Into<String>>(reason: T) -> Self {
        Self::UpstreamReportedError(reason.into())
    }

    #[must_use]
    pub const fn unsupported(platform: Platform, operation: &'static str) -> Self {
        Self::UnsupportedOperation {
            platform,
            operation,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::Input,
            Self::SourceNotConfigured(_) | Self::UnsupportedOperation { .. } => {
                ErrorKind::Configuration
            }
            Self::UpstreamFetchFailed(_)
            | Self::UpstreamShapeMismatch(_)
            | Self::UpstreamReportedError(_) => ErrorKind::Upstream,
        }
    }
}

impl From<QueryParamError> for ExtractorError {
    fn from(err: QueryParamError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
