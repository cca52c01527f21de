//! Error type for the Telegram Bot API client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    /// The Bot API answered `ok: false` or a non-success status.
    #[error("Telegram API error (status {status}): {description}")]
    ApiError { status: u16, description: String },

    /// Transport failure. The request URL is stripped because it embeds the
    /// bot token.
    #[error("network error: {0}")]
    NetworkError(reqwest::Error),
}

impl From<reqwest::Error> for TelegramError {
    fn from(e: reqwest::Error) -> Self {
        TelegramError::NetworkError(e.without_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = TelegramError::ApiError {
            status: 401,
            description: "Unauthorized".into(),
        };
        assert_eq!(
            err.to_string(),
            "Telegram API error (status 401): Unauthorized"
        );
    }

    #[tokio::test]
    async fn network_error_hides_token() {
        let err: TelegramError = reqwest::get("http://127.0.0.1:1/bot123:SECRET/getMe")
            .await
            .unwrap_err()
            .into();
        assert!(!err.to_string().contains("SECRET"));
    }
}
