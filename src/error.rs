//! Unified error type.

use std::fmt;

/// The error type returned by arbor's fallible operations.
///
/// Application-level outcomes (404, 500, …) are HTTP responses written
/// through the [`Context`](crate::Context), never `Error`s. This type
/// surfaces infrastructure failures: binding the listener or accepting a
/// connection. Setup-time configuration mistakes (invalid route paths, zero
/// handlers) panic at registration instead — they are programming errors,
/// not runtime conditions.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}
