use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::credentials::DEFAULT_TOKEN_TTL;
use crate::llm_client::DEFAULT_MODEL;

const DEFAULT_SKILLS_AUTH_URL: &str = "https://auth.emsicloud.com/connect/token";
const DEFAULT_SKILLS_EXTRACT_URL: &str =
    "https://emsiservices.com/skills/versions/latest/extract?language=en";
const DEFAULT_SKILLS_SCOPE: &str = "emsi_open";
const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_PREDICTION_BASE_URL: &str = "http://localhost:5000";

/// How the skills service is authenticated.
#[derive(Debug, Clone)]
pub enum SkillsAuth {
    /// Pre-issued token from `SKILLS_ACCESS_TOKEN`.
    Static(String),
    ClientCredentials {
        client_id: String,
        client_secret: String,
        scope: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if the skills service has no usable credentials.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub skills_auth: SkillsAuth,
    pub skills_auth_url: String,
    pub skills_extract_url: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub prediction_base_url: String,
    pub token_ttl: Duration,
    /// Client-wide request timeout. Unset means calls may wait forever.
    pub http_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let skills_auth = match var("SKILLS_ACCESS_TOKEN") {
            Some(token) => SkillsAuth::Static(token),
            None => match (var("SKILLS_CLIENT_ID"), var("SKILLS_CLIENT_SECRET")) {
                (Some(client_id), Some(client_secret)) => SkillsAuth::ClientCredentials {
                    client_id,
                    client_secret,
                    scope: or_default("SKILLS_SCOPE", DEFAULT_SKILLS_SCOPE),
                },
                _ => bail!(
                    "Either SKILLS_ACCESS_TOKEN or both SKILLS_CLIENT_ID and SKILLS_CLIENT_SECRET must be set"
                ),
            },
        };

        let token_ttl = match var("TOKEN_TTL_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .context("TOKEN_TTL_SECS must be a whole number of seconds")?,
            ),
            None => DEFAULT_TOKEN_TTL,
        };

        let http_timeout = var("HTTP_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>()
                    .map(Duration::from_secs)
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")
            })
            .transpose()?;

        Ok(Config {
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
            skills_auth,
            skills_auth_url: or_default("SKILLS_AUTH_URL", DEFAULT_SKILLS_AUTH_URL),
            skills_extract_url: or_default("SKILLS_EXTRACT_URL", DEFAULT_SKILLS_EXTRACT_URL),
            llm_base_url: or_default("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_model: or_default("LLM_MODEL", DEFAULT_MODEL),
            prediction_base_url: or_default("PREDICTION_BASE_URL", DEFAULT_PREDICTION_BASE_URL),
            token_ttl,
            http_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_client_credentials() {
        let config = config_from(&[("SKILLS_CLIENT_ID", "id"), ("SKILLS_CLIENT_SECRET", "secret")])
            .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl, Duration::from_secs(59 * 60));
        assert_eq!(config.llm_model, "mistral");
        assert!(config.http_timeout.is_none());
        match config.skills_auth {
            SkillsAuth::ClientCredentials { scope, .. } => assert_eq!(scope, "emsi_open"),
            SkillsAuth::Static(_) => panic!("expected client credentials"),
        }
    }

    #[test]
    fn test_static_token_wins() {
        let config = config_from(&[("SKILLS_ACCESS_TOKEN", "tok"), ("SKILLS_CLIENT_ID", "id")])
            .unwrap();
        assert!(matches!(config.skills_auth, SkillsAuth::Static(ref t) if t == "tok"));
    }

    #[test]
    fn test_missing_credentials_fail() {
        assert!(config_from(&[("SKILLS_CLIENT_ID", "id")]).is_err());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("SKILLS_ACCESS_TOKEN", "tok"),
            ("PORT", "9000"),
            ("TOKEN_TTL_SECS", "60"),
            ("HTTP_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.token_ttl, Duration::from_secs(60));
        assert_eq!(config.http_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_bad_port_fails() {
        assert!(config_from(&[("SKILLS_ACCESS_TOKEN", "tok"), ("PORT", "http")]).is_err());
    }
}
