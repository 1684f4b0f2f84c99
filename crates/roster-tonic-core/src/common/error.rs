//! Domain error to gRPC status translation.
//!
//! This is the only place a [`roster::Error`] becomes a [`Status`]. The
//! mapping is total and depends only on the error's kind and safe message:
//!
//! | kind           | code              | message                    |
//! |----------------|-------------------|----------------------------|
//! | `Validation`   | `InvalidArgument` | the validation message     |
//! | `Conflict`     | `AlreadyExists`   | the conflict message       |
//! | `Unauthorized` | `Unauthenticated` | the auth message           |
//! | `NotFound`     | `NotFound`        | `"<resource> not found"`   |
//! | `Internal`     | `Internal`        | `"internal server error"`  |
//! | anything else  | `Unknown`         | `"unknown error"`          |
//!
//! Internal causes never reach the status; logging them is the caller's job.

use roster::{Error, ErrorKind};
use tonic::{Code, Status};

/// Message reported for errors outside the domain taxonomy.
pub const UNKNOWN_MESSAGE: &str = "unknown error";

/// The status code each domain error kind maps to.
pub const fn status_code(kind: ErrorKind) -> Code {
    match kind {
        ErrorKind::Validation => Code::InvalidArgument,
        ErrorKind::Conflict => Code::AlreadyExists,
        ErrorKind::Unauthorized => Code::Unauthenticated,
        ErrorKind::NotFound => Code::NotFound,
        ErrorKind::Internal => Code::Internal,
    }
}

/// Translates a domain error.
pub fn to_status(err: &Error) -> Status {
    Status::new(status_code(err.kind()), err.message())
}

/// Translates any error, recognising domain errors by downcast.
pub fn translate(err: &(dyn std::error::Error + 'static)) -> Status {
    match err.downcast_ref::<Error>() {
        Some(err) => to_status(err),
        None => Status::unknown(UNKNOWN_MESSAGE),
    }
}

/// Owned conversion into a wire [`Status`].
pub trait IntoStatus {
    fn into_status(self) -> Status;
}

impl IntoStatus for Error {
    fn into_status(self) -> Status {
        to_status(&self)
    }
}
