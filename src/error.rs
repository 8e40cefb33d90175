//! Error types.
//!
//! Application-level failures (configuration, files, session lookup) are `anyhow` errors. The bill
//! store produces a `StoreError` instead, because the controller hands that exact value to the
//! diagnostics port, and callers need to be able to inspect and compare it.

use std::fmt::{self, Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The error produced by a `BillStore` when a draft creation or a bill update fails.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreError {
    /// The HTTP status code returned by the store, if the request got that far.
    status: Option<u16>,
    message: String,
}

impl StoreError {
    /// Creates an error that carries only a message, e.g. `StoreError::new("404")`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Creates an error for a response that came back with a non-success `status`.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => Display::fmt(&self.message, f),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// A persistence failure that the controller recovers from locally. These never reach the user
/// interface; they are reported to the `Diagnostics` port with the original error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The draft creation call (receipt upload) failed.
    Upload(StoreError),
    /// The bill update call failed.
    Update(StoreError),
    /// No bill store was wired into the controller.
    MissingStore,
}

impl Failure {
    /// The store error behind this failure, if there is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Failure::Upload(e) | Failure::Update(e) => Some(e),
            Failure::MissingStore => None,
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Upload(e) => write!(f, "Unable to upload the receipt: {e}"),
            Failure::Update(e) => write!(f, "Unable to update the bill: {e}"),
            Failure::MissingStore => f.write_str("Invalid store or missing bills property"),
        }
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Failure::Upload(e) | Failure::Update(e) => Some(e),
            Failure::MissingStore => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        assert_eq!(StoreError::new("404").to_string(), "404");
        assert_eq!(
            StoreError::with_status(500, "boom").to_string(),
            "boom (status 500)"
        );
    }

    #[test]
    fn test_failure_keeps_the_store_error() {
        let failure = Failure::Update(StoreError::new("500"));
        assert_eq!(failure.store_error(), Some(&StoreError::new("500")));
        assert_ne!(failure.store_error(), Some(&StoreError::new("404")));
        assert!(Failure::MissingStore.store_error().is_none());
    }
}
