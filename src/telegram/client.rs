use reqwest::Client;
use serde::de::DeserializeOwned;

use super::error::TelegramError;
use super::types::{ApiResponse, SendMessage, Update};

pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    /// Create a client for the Bot API at `base_url`, e.g. `https://api.telegram.org`.
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TelegramError> {
        let status = response.status();
        let body = response.json::<ApiResponse<T>>().await;

        match body {
            Ok(ApiResponse {
                ok: true,
                result: Some(result),
                ..
            }) if status.is_success() => Ok(result),
            Ok(envelope) => Err(TelegramError::ApiError {
                status: status.as_u16(),
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            }),
            Err(e) if !status.is_success() => Err(TelegramError::ApiError {
                status: status.as_u16(),
                description: e.without_url().to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Long-polls for new updates. `offset` acknowledges everything before it.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut params = vec![
            ("timeout", timeout_secs.to_string()),
            ("allowed_updates", r#"["message"]"#.to_string()),
        ];
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&params)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn send_message(&self, message: &SendMessage) -> Result<(), TelegramError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(message)
            .send()
            .await?;
        Self::decode::<serde_json::Value>(response).await?;
        Ok(())
    }
}
