//! Interview service configuration.
//!
//! Precedence (lowest first): built-in defaults, TOML file at `PARLEY_CONFIG`
//! (default `config/parley.toml`), `PARLEY__<SECTION>__<KEY>` environment
//! variables, then the legacy variables below.
//!
//! | Env | Maps to | Default |
//! |-----|---------|---------|
//! | AI_COMPLETION_MODEL | completion.model | gpt-3.5-turbo |
//! | LANGUAGE | language | en |
//! | OPENAI_API_KEY | completion.api_key (when unset) | none |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

fn default_api_url() -> String {
    OPENAI_API_BASE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    pub server: ServerConfig,
    pub completion: CompletionConfig,
    /// ISO-639-1 code the interviewer answers in; substituted into the system prompt.
    pub language: String,
    pub prompt: PromptConfig,
    pub notifier: NotifierConfig,
    pub stt: SttConfig,
    pub tts: TtsConfig,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            completion: CompletionConfig::default(),
            language: "en".to_string(),
            prompt: PromptConfig::default(),
            notifier: NotifierConfig::default(),
            stt: SttConfig::default(),
            tts: TtsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Built frontend served for every path the API does not own.
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            static_dir: "add-ons/parley-gateway/static".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    /// Upper bound on one completion call; the request fails when exceeded.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// GET endpoint returning `{"message": "..."}`. Unset => built-in interviewer prompt.
    pub url: Option<String>,
    pub timeout_secs: u64,
    /// Serve the built-in prompt (uncached) when the remote fetch fails.
    pub fallback_to_builtin: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
            fallback_to_builtin: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Webhook receiving `{timestamp, source, text}`. Unset disables event logging.
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
    /// Events waiting for delivery; new events are dropped once full.
    pub queue_capacity: usize,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 2,
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    pub api_url: String,
    /// Falls back to `completion.api_key`.
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: "whisper-1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub api_url: String,
    /// Falls back to `completion.api_key`.
    pub api_key: Option<String>,
    pub model: String,
    pub voice: String,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
        }
    }
}

impl InterviewConfig {
    /// Load from file and environment (see module docs for precedence).
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PARLEY_CONFIG").unwrap_or_else(|_| "config/parley.toml".to_string());
        let path = Path::new(&config_path);
        let builder = config::Config::builder();
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("PARLEY").separator("__"))
            .set_override_option("completion.model", env_opt_string("AI_COMPLETION_MODEL"))?
            .set_override_option("language", env_opt_string("LANGUAGE"))?
            .build()?;

        let mut cfg: Self = built.try_deserialize()?;
        if cfg.completion.api_key.is_none() {
            cfg.completion.api_key = env_opt_string("OPENAI_API_KEY");
        }
        Ok(cfg)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml(text: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion.timeout_secs)
    }

    pub fn stt_api_key(&self) -> Option<String> {
        non_blank(self.stt.api_key.clone()).or_else(|| non_blank(self.completion.api_key.clone()))
    }

    pub fn tts_api_key(&self) -> Option<String> {
        non_blank(self.tts.api_key.clone()).or_else(|| non_blank(self.completion.api_key.clone()))
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_opt_string(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}
