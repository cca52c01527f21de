use thiserror::Error;

use crate::batch::BatchArgsError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    /// Bad command line for `fetch`; reported together with the usage line.
    #[error("{0}")]
    Usage(#[from] BatchArgsError),
}
