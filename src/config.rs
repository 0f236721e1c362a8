use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment prefix for overrides, e.g. `SEHAT__API__BASE_URL`
const ENV_PREFIX: &str = "SEHAT";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub api: ApiConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the predictor service (e.g. "http://localhost:5000")
    pub base_url: String,
    pub predict_path: String,
    pub chat_path: String,
    pub health_path: String,
    /// Transport timeout; absent means wait for the service indefinitely
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// Recognition locale passed to the speech engine
    pub locale: String,
    /// Delay between replayed steps of a scripted transcript
    pub script_step_ms: u64,
}

impl Config {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    /// Built-in defaults only (no file, no environment)
    pub fn defaults() -> Result<Self> {
        Ok(Self::builder()?.build()?.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("service.name", "sehat-intake")?
            .set_default("api.base_url", "http://localhost:5000")?
            .set_default("api.predict_path", "/api/predict")?
            .set_default("api.chat_path", "/api/chat")?
            .set_default("api.health_path", "/api/health")?
            .set_default("speech.locale", "id-ID")?
            .set_default("speech.script_step_ms", 250)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults().unwrap();

        assert_eq!(cfg.service.name, "sehat-intake");
        assert_eq!(cfg.api.base_url, "http://localhost:5000");
        assert_eq!(cfg.api.predict_path, "/api/predict");
        assert_eq!(cfg.api.chat_path, "/api/chat");
        assert_eq!(cfg.api.timeout_secs, None);
        assert_eq!(cfg.speech.locale, "id-ID");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://predictor:8080\"\ntimeout_secs = 15\n\n[speech]\nlocale = \"en-US\""
        )
        .unwrap();

        let path = file.path().with_extension("");
        let path = path.to_str().unwrap();
        let cfg = Config::load(path).unwrap();

        assert_eq!(cfg.api.base_url, "http://predictor:8080");
        assert_eq!(cfg.api.timeout_secs, Some(15));
        assert_eq!(cfg.api.chat_path, "/api/chat");
        assert_eq!(cfg.speech.locale, "en-US");
    }

    #[test]
    fn test_missing_file_is_optional() {
        let cfg = Config::load("does/not/exist/sehat-intake").unwrap();
        assert_eq!(cfg.service.name, "sehat-intake");
    }
}
