use anyhow::{Context, Result};
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Application configuration loaded from environment variables.
///
/// Only the database URL and port can fail startup. A missing Gemini key is
/// not an error: every AI-derived field falls back instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://herbarium.db?mode=rwc".to_string()),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Whether a configured Gemini key has an unexpected shape. The key itself
    /// is never logged.
    pub fn has_suspicious_key(&self) -> bool {
        self.gemini_api_key
            .as_deref()
            .is_some_and(|key| !looks_like_google_key(key))
    }

    /// Logs a warning for a malformed Gemini key. Call after the tracing
    /// subscriber is installed.
    pub fn warn_on_suspicious_key(&self) {
        if self.has_suspicious_key() {
            warn!(
                "GEMINI_API_KEY does not look like a Google API key (expected 'AIza' prefix and 39 characters)"
            );
        }
    }
}

/// Reads an env var, treating blank values the same as unset ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_google_key(key: &str) -> bool {
    key.starts_with("AIza") && key.len() == 39
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_key_shape() {
        assert!(looks_like_google_key(&format!("AIza{}", "x".repeat(35))));
        assert!(!looks_like_google_key("sk-not-a-google-key"));
        assert!(!looks_like_google_key("AIzaShort"));
    }

    fn config_with_key(key: Option<&str>) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            gemini_api_key: key.map(String::from),
            gemini_model: DEFAULT_MODEL.to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_suspicious_key_detection() {
        let good = format!("AIza{}", "x".repeat(35));
        assert!(!config_with_key(Some(&good)).has_suspicious_key());
        assert!(config_with_key(Some("sk-not-a-google-key")).has_suspicious_key());
        // A missing key is reported by main, not here.
        assert!(!config_with_key(None).has_suspicious_key());
    }
}
