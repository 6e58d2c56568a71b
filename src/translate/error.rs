use std::time::Duration;
use thiserror::Error;

/// Why a single endpoint attempt failed. Absorbed by the fallback loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error("transport failure at {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("{endpoint} responded with HTTP {status}")]
    Http { endpoint: String, status: u16 },
}

/// Failure of a whole dispatch call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no configured endpoint produced a translation ({attempts} attempted)")]
    AllEndpointsExhausted {
        attempts: usize,
        last: Option<AttemptError>,
    },

    #[error("malformed translation response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    #[error("translation did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("could not encode translation request: {0}")]
    Encode(String),
}
