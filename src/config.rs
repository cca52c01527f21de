//! Configuration loaded from `vacancy_bot.toml`.
//!
//! The [`AppConfig`] struct holds every tunable. Fields missing from the file
//! use defaults. The secrets (`TELEGRAM_BOT_TOKEN`, `DATABASE_URL`,
//! `POSTGRES_URL`) are normally supplied through the environment or a `.env`
//! file and take precedence over the file.

use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::error::AppError;

pub const CONFIG_FILE: &str = "vacancy_bot.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Telegram bot token. Required by `bot` only.
    #[serde(default)]
    pub telegram_token: String,

    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    /// Long-polling timeout passed to `getUpdates`.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    #[serde(default = "default_hh_api_url")]
    pub hh_api_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Connection string of the vacancies database. Required by `fetch` only.
    #[serde(default)]
    pub database_url: String,

    /// Maintenance connection used to create the vacancies database.
    #[serde(default = "default_admin_database_url")]
    pub admin_database_url: String,

    #[serde(default = "default_database_name")]
    pub database_name: String,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

fn default_hh_api_url() -> String {
    "https://api.hh.ru".to_string()
}

fn default_user_agent() -> String {
    concat!("vacancy-bot/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_admin_database_url() -> String {
    "postgresql://user:password@db:5432/postgres".to_string()
}

fn default_database_name() -> String {
    "vacancies_db".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            telegram_api_url: default_telegram_api_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
            hh_api_url: default_hh_api_url(),
            user_agent: default_user_agent(),
            database_url: String::new(),
            admin_database_url: default_admin_database_url(),
            database_name: default_database_name(),
        }
    }
}

impl AppConfig {
    /// Loads `vacancy_bot.toml` from the working directory, then applies the
    /// process environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(Path::new(CONFIG_FILE))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<AppConfig>(&contents)?)
    }

    /// Overrides secrets with non-empty values from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let targets = [
            ("TELEGRAM_BOT_TOKEN", &mut self.telegram_token),
            ("DATABASE_URL", &mut self.database_url),
            ("POSTGRES_URL", &mut self.admin_database_url),
        ];
        for (key, field) in targets {
            if let Some(value) = lookup(key)
                && !value.is_empty()
            {
                *field = value;
            }
        }
    }

    pub fn require_telegram_token(&self) -> Result<&str, AppError> {
        if self.telegram_token.is_empty() {
            return Err(AppError::Config("TELEGRAM_BOT_TOKEN is not set".into()));
        }
        Ok(&self.telegram_token)
    }

    pub fn require_database_url(&self) -> Result<&str, AppError> {
        if self.database_url.is_empty() {
            return Err(AppError::Config("DATABASE_URL is not set".into()));
        }
        Ok(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.poll_timeout_secs, 30);
        assert_eq!(config.hh_api_url, "https://api.hh.ru");
        assert_eq!(config.database_name, "vacancies_db");
        assert!(config.user_agent.starts_with("vacancy-bot/"));
        assert!(config.telegram_token.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            telegram_token = "123:abc"
            poll_timeout_secs = 10
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.telegram_token, "123:abc");
        assert_eq!(config.poll_timeout_secs, 10);
        assert_eq!(config.database_name, "vacancies_db");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_name = \"jobs\"\nuser_agent = \"test/1.0\"").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.database_name, "jobs");
        assert_eq!(config.user_agent, "test/1.0");
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.database_name, "vacancies_db");
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_timeout_secs = \"many\"").unwrap();
        assert!(AppConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn environment_overrides_secrets() {
        let env: HashMap<&str, &str> = [
            ("TELEGRAM_BOT_TOKEN", "env-token"),
            ("DATABASE_URL", "postgresql://app@localhost/vacancies_db"),
            ("POSTGRES_URL", ""),
        ]
        .into();

        let mut config = AppConfig {
            telegram_token: "file-token".into(),
            ..Default::default()
        };
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.telegram_token, "env-token");
        assert_eq!(config.database_url, "postgresql://app@localhost/vacancies_db");
        // Empty values do not override.
        assert_eq!(config.admin_database_url, default_admin_database_url());
    }

    #[test]
    fn required_secrets() {
        let config = AppConfig::default();
        assert!(config.require_telegram_token().is_err());
        assert!(config.require_database_url().is_err());

        let config = AppConfig {
            telegram_token: "t".into(),
            database_url: "postgresql://localhost/db".into(),
            ..Default::default()
        };
        assert_eq!(config.require_telegram_token().unwrap(), "t");
        assert_eq!(config.require_database_url().unwrap(), "postgresql://localhost/db");
    }
}
