//! Error type for the hh.ru API client.

use thiserror::Error;

/// Failures when talking to the job search API.
///
/// The only recoverable outcome callers care about is "no results", so the
/// variants just separate transport failures from non-success statuses for
/// logging.
#[derive(Debug, Error)]
pub enum HhError {
    /// The API answered with anything other than 200.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// DNS, connection, TLS or body decoding failure.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
