//! Domain error taxonomy.
//!
//! Every fallible operation in this crate reports one of five kinds of
//! failure. Business logic and repositories build these values; nothing in
//! this crate knows about transport status codes. The transport layer owns
//! the single conversion from [`Error`] to a wire status.
//!
//! ## Kinds
//! - `Validation`: the input has the wrong shape or value.
//! - `Conflict`: a uniqueness rule was violated (e.g. duplicate email).
//! - `Unauthorized`: missing, invalid or expired credentials, or a bad
//!   password.
//! - `NotFound`: the referenced entity does not exist.
//! - `Internal`: anything else. Carries the underlying cause for server-side
//!   logging; the cause is never part of [`Error::message`].

use std::borrow::Cow;

/// Fixed message reported to callers for every [`ErrorKind::Internal`] error.
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Boxed cause carried by [`Error::Internal`].
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The closed set of domain error kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Unauthorized,
    NotFound,
    Internal,
}

/// Unified error type for the records domain.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request was malformed or violated an input rule.
    #[error("{0}")]
    Validation(String),

    /// The request collides with existing state.
    #[error("{0}")]
    Conflict(String),

    /// The caller could not be authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// A referenced entity does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Storage, hashing, signing or any other unexpected failure.
    #[error("internal server error: {source}")]
    Internal {
        #[source]
        source: Cause,
    },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Builds a `NotFound` error whose message reads `"<resource> not found"`.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Wraps an unexpected failure. The cause is kept for logging only.
    pub fn internal(cause: impl Into<Cause>) -> Self {
        Self::Internal {
            source: cause.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// The message that may be shown to a caller.
    ///
    /// For `Internal` errors this is always [`INTERNAL_MESSAGE`], regardless
    /// of the wrapped cause.
    pub fn message(&self) -> Cow<'_, str> {
        match self {
            Self::Validation(message) | Self::Conflict(message) | Self::Unauthorized(message) => {
                Cow::Borrowed(message)
            }
            Self::NotFound { resource } => Cow::Owned(format!("{resource} not found")),
            Self::Internal { .. } => Cow::Borrowed(INTERNAL_MESSAGE),
        }
    }

    /// The wrapped cause of an `Internal` error.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Internal { source } => Some(source.as_ref()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
