use anyhow::{Context, Result};

const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Every field has a default; malformed numeric values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server-side Gemini key. Takes precedence over keys sent with requests.
    pub google_api_key: Option<String>,
    pub default_model: String,
    pub gemini_api_base: String,
    pub llm_timeout_secs: u64,
    pub max_upload_mb: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_api_key: optional_env("GOOGLE_API_KEY"),
            default_model: optional_env("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 300)?,
            max_upload_mb: parse_env("MAX_UPLOAD_MB", 20)?,
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults without reading the environment.
    pub fn for_tests() -> Self {
        Config {
            google_api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            llm_timeout_secs: 5,
            max_upload_mb: 20,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_reports_bad_numbers() {
        std::env::set_var("STATEMENT_API_TEST_PORT", "eighty");
        let err = parse_env::<u16>("STATEMENT_API_TEST_PORT", 8000).unwrap_err();
        assert!(err.to_string().contains("STATEMENT_API_TEST_PORT"));
        std::env::remove_var("STATEMENT_API_TEST_PORT");
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        std::env::set_var("STATEMENT_API_TEST_BLANK", "   ");
        assert_eq!(optional_env("STATEMENT_API_TEST_BLANK"), None);
        assert_eq!(parse_env::<u64>("STATEMENT_API_TEST_BLANK", 300).unwrap(), 300);
        std::env::remove_var("STATEMENT_API_TEST_BLANK");
    }
}
