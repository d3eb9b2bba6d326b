use std::fmt;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Base URL of the generative text service (Ollama-style API).
    pub llm_base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    /// Base URL of the external mail relay the Notifier talks to.
    pub notifier_url: String,
    /// Resume file extensions accepted when scanning a corpus directory.
    pub resume_extensions: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://shortlisted.db".to_string()),
            llm_base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "mistral".to_string()),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "all-minilm".to_string()),
            notifier_url: require_env("NOTIFIER_URL")?,
            resume_extensions: parse_extensions(
                &std::env::var("RESUME_EXTENSIONS").unwrap_or_else(|_| "pdf".to_string()),
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses a comma-separated extension list ("pdf, .txt" → ["pdf", "txt"]).
pub fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Opaque credential handed through to collaborators.
/// Never inspected by the pipeline; `Debug` redacts the value so it cannot
/// leak through logs or error messages.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the raw value. Call only at the collaborator boundary.
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([redacted])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("ldgz rslx uyoo ufml");
        let rendered = format!("{secret:?}");
        assert!(!rendered.contains("ldgz"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_secret_reveal_returns_raw_value() {
        let secret = Secret::new("app-password");
        assert_eq!(secret.reveal(), "app-password");
    }

    #[test]
    fn test_parse_extensions_normalizes_dots_and_case() {
        assert_eq!(parse_extensions("pdf, .TXT"), vec!["pdf", "txt"]);
    }

    #[test]
    fn test_parse_extensions_drops_empty_segments() {
        assert_eq!(parse_extensions("pdf,,"), vec!["pdf"]);
    }
}
