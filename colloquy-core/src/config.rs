//! Configuration types for Colloquy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::conversation::Persona;
use crate::error::{ColloquyError, Result};

/// Default chat-completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.together.xyz/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Default completion length
pub const DEFAULT_MAX_TOKENS: usize = 256;

/// Default ceiling on tokens retained in history
pub const DEFAULT_TOKEN_BUDGET: usize = 1000;

/// Environment variable holding the API credential when none is configured
pub const API_KEY_ENV: &str = "TOGETHER_API_KEY";

/// Main configuration for a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColloquyConfig {
    /// API key (prefer `TOGETHER_API_KEY`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the chat-completions API
    pub base_url: String,

    /// Model identifier, also used to pick the tokenizer encoding
    pub model: String,

    /// Literal system message; takes precedence over `persona`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,

    /// Persona to start with, by its snake_case name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,

    /// Maximum total tokens retained across the history
    pub token_budget: usize,

    /// Temperature used when a call does not supply one
    pub temperature: f32,

    /// Completion length used when a call does not supply one
    pub max_tokens: usize,

    /// History file; `None` keeps the conversation in memory only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Token counting backend
    pub tokenizer: TokenizerKind,
}

impl Default for ColloquyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_message: None,
            persona: None,
            token_budget: DEFAULT_TOKEN_BUDGET,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            history_file: None,
            tokenizer: TokenizerKind::default(),
        }
    }
}

/// Token counting backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// BPE encoding for the model, `cl100k_base` when the model is unknown
    #[default]
    Tiktoken,

    /// Byte-length approximation (4 bytes per token)
    Heuristic,
}

/// Builder for ColloquyConfig
pub struct ConfigBuilder {
    config: ColloquyConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: ColloquyConfig::default(),
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn system_message(mut self, message: impl Into<String>) -> Self {
        self.config.system_message = Some(message.into());
        self
    }

    pub fn persona(mut self, persona: Persona) -> Self {
        self.config.persona = Some(persona);
        self
    }

    pub fn token_budget(mut self, budget: usize) -> Self {
        self.config.token_budget = budget;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn history_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.history_file = Some(path.into());
        self
    }

    pub fn tokenizer(mut self, kind: TokenizerKind) -> Self {
        self.config.tokenizer = kind;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ColloquyConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ColloquyConfig {
    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load configuration from files and environment variables.
    ///
    /// Loads in this order, later sources overriding earlier ones:
    /// 1. Default configuration
    /// 2. `colloquy/colloquy.toml` in the user config directory
    /// 3. `colloquy.toml` in the working directory
    /// 4. The file named by `COLLOQUY_CONFIG_PATH`
    /// 5. `COLLOQUY_*` environment variables
    ///
    /// The API key falls back to `TOGETHER_API_KEY` when none of the above set it.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or fails validation.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new();

        if let Some(dir) = dirs::config_dir() {
            figment = figment.merge(Toml::file(dir.join("colloquy").join("colloquy.toml")));
        }

        figment = figment.merge(Toml::file("colloquy.toml"));

        if let Ok(path) = std::env::var("COLLOQUY_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let mut config: ColloquyConfig = figment
            .merge(Env::prefixed("COLLOQUY_"))
            .extract()
            .map_err(|e| {
                ColloquyError::Configuration(format!("Failed to load configuration: {}", e))
            })?;

        config.apply_env_fallbacks();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// `COLLOQUY_*` environment variables still override the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(ColloquyError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let mut config: ColloquyConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("COLLOQUY_"))
            .extract()
            .map_err(|e| {
                ColloquyError::Configuration(format!("Failed to load configuration file: {}", e))
            })?;

        config.apply_env_fallbacks();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_fallbacks(&mut self) {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            self.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.token_budget == 0 {
            return Err(ColloquyError::Configuration(
                "token_budget must be greater than zero".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ColloquyError::Configuration(
                "max_tokens must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ColloquyError::Configuration(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ColloquyError::Configuration(
                "model must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    /// Strip the caller's environment and point the user config dir into the jail
    fn isolate(jail: &mut Jail) {
        let home = jail.directory().to_path_buf();
        jail.clear_env();
        jail.set_env("HOME", home.display());
        jail.set_env("XDG_CONFIG_HOME", home.join("config").display());
    }

    #[test]
    fn test_defaults() {
        let config = ColloquyConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.max_tokens, 256);
        assert_eq!(config.token_budget, 1000);
        assert_eq!(config.tokenizer, TokenizerKind::Tiktoken);
        assert!(config.history_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ColloquyConfig::builder()
            .model("gpt-4o")
            .persona(Persona::AngryAssistant)
            .token_budget(200)
            .history_file("chat.json")
            .tokenizer(TokenizerKind::Heuristic)
            .build();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.persona, Some(Persona::AngryAssistant));
        assert_eq!(config.token_budget, 200);
        assert_eq!(config.history_file, Some(PathBuf::from("chat.json")));
        assert_eq!(config.tokenizer, TokenizerKind::Heuristic);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(ColloquyConfig::builder().token_budget(0).build().validate().is_err());
        assert!(ColloquyConfig::builder().max_tokens(0).build().validate().is_err());
        assert!(ColloquyConfig::builder().temperature(2.5).build().validate().is_err());
        assert!(ColloquyConfig::builder().model(" ").build().validate().is_err());
    }

    #[test]
    fn test_zero_temperature_is_valid() {
        assert!(ColloquyConfig::builder().temperature(0.0).build().validate().is_ok());
    }

    #[test]
    fn test_from_file_with_env_override() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(
                "custom.toml",
                r#"
                    model = "file-model"
                    token_budget = 300
                    tokenizer = "heuristic"
                    history_file = "history.json"
                "#,
            )?;
            jail.set_env("COLLOQUY_MODEL", "env-model");
            jail.set_env("TOGETHER_API_KEY", "from-together-env");

            let config = ColloquyConfig::from_file("custom.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.model, "env-model");
            assert_eq!(config.token_budget, 300);
            assert_eq!(config.tokenizer, TokenizerKind::Heuristic);
            assert_eq!(config.history_file, Some(PathBuf::from("history.json")));
            assert_eq!(config.api_key.as_deref(), Some("from-together-env"));
            assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
            Ok(())
        });
    }

    #[test]
    fn test_configured_key_wins_over_env() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("custom.toml", r#"api_key = "from-file""#)?;
            jail.set_env("TOGETHER_API_KEY", "from-together-env");

            let config = ColloquyConfig::from_file("custom.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.api_key.as_deref(), Some("from-file"));
            Ok(())
        });
    }

    #[test]
    fn test_load_from_working_directory() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("colloquy.toml", r#"persona = "thoughtful_assistant""#)?;
            jail.set_env("COLLOQUY_TOKEN_BUDGET", "750");

            let config = ColloquyConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.persona, Some(Persona::ThoughtfulAssistant));
            assert_eq!(config.token_budget, 750);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = ColloquyConfig::from_file("/definitely/not/here/colloquy.toml");
        assert!(matches!(result, Err(ColloquyError::Configuration(_))));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("bad.toml", "token_budget = \"lots\"")?;
            let result = ColloquyConfig::from_file("bad.toml");
            assert!(matches!(result, Err(ColloquyError::Configuration(_))));
            Ok(())
        });
    }

    #[test]
    fn test_unknown_persona_is_an_error() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file("colloquy.toml", r#"persona = "pirate""#)?;
            let result = ColloquyConfig::load();
            assert!(matches!(result, Err(ColloquyError::Configuration(_))));
            Ok(())
        });
    }

    #[test]
    fn test_persona_from_env() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.set_env("COLLOQUY_PERSONA", "angry_assistant");
            let config = ColloquyConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.persona, Some(Persona::AngryAssistant));
            Ok(())
        });
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_user_config_dir_layer() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_dir("config/colloquy")?;
            jail.create_file("config/colloquy/colloquy.toml", r#"model = "user-model""#)?;
            jail.create_file("colloquy.toml", "token_budget = 400")?;

            let config = ColloquyConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.model, "user-model");
            assert_eq!(config.token_budget, 400);
            Ok(())
        });
    }
}
