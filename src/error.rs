//! Error types for haloconv

use thiserror::Error;

/// Result type alias using haloconv's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Lets callers tell apart bad input, an unusable device and a failed
/// dispatch without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input image could not be read or decoded
    Input,
    /// No usable accelerator, or device/queue creation failed
    Device,
    /// A queued unit of work failed after submission
    Execution,
    /// Caller passed invalid arguments or exceeded a backend limit
    Usage,
}

/// Errors that can occur in haloconv operations
#[derive(Error, Debug)]
pub enum Error {
    /// Source image could not be decoded
    #[error("Input error: {0}")]
    Input(String),

    /// Result image could not be encoded or written
    #[error("Output error: {0}")]
    Output(String),

    /// Accelerator initialization failed
    #[error("Device error: {0}")]
    Device(String),

    /// Failure raised by the runtime after work was enqueued
    #[error("Execution error: {0}")]
    Execution(String),

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Backend limitation - operation valid but exceeds backend capabilities
    #[error("{backend} limitation: {operation} - {reason}")]
    BackendLimitation {
        /// The backend that has the limitation
        backend: &'static str,
        /// The operation being attempted
        operation: &'static str,
        /// Description of the limitation
        reason: String,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a backend limitation error
    pub fn backend_limitation(
        backend: &'static str,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::BackendLimitation {
            backend,
            operation,
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Input(_) => ErrorKind::Input,
            Error::Device(_) => ErrorKind::Device,
            Error::Execution(_) | Error::Internal(_) => ErrorKind::Execution,
            Error::Output(_) | Error::InvalidArgument { .. } | Error::BackendLimitation { .. } => {
                ErrorKind::Usage
            }
        }
    }
}
