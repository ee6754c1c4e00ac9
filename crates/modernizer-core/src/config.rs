use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths;

const CONFIG_FILE_PATH: &str = "config.toml";

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature; the pipeline prompts are written for deterministic output
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn parse_bool_env(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: None,
            api_base: None,
            model: None,
            temperature: 0.0,
            max_output_tokens: None,
            http_proxy: String::new(),
            https_proxy: String::new(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Load `~/.cobol-modernizer/config.json`, falling back to `./config.toml`,
    /// then apply environment overrides. The API key is resolved separately by
    /// [`Config::resolve_api_key`].
    pub fn new() -> Self {
        let mut config = Self::load_from(&paths::config_json_path(), Path::new(CONFIG_FILE_PATH));
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load from the given JSON file, or the TOML file when the JSON one is missing or invalid.
    pub fn load_from(json_path: &Path, toml_path: &Path) -> Self {
        if json_path.exists() {
            match std::fs::read_to_string(json_path) {
                Ok(content) => match serde_json::from_str::<Config>(&content) {
                    Ok(config) => {
                        log::debug!("Loaded config from {}", json_path.display());
                        return config;
                    }
                    Err(e) => log::warn!("Failed to parse {}: {}", json_path.display(), e),
                },
                Err(e) => log::warn!("Failed to read {}: {}", json_path.display(), e),
            }
        }

        if toml_path.exists() {
            match std::fs::read_to_string(toml_path) {
                Ok(content) => match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        log::debug!("Loaded config from {}", toml_path.display());
                        return config;
                    }
                    Err(e) => log::warn!("Failed to parse {}: {}", toml_path.display(), e),
                },
                Err(e) => log::warn!("Failed to read {}: {}", toml_path.display(), e),
            }
        }

        Config::default()
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("LLM_PROVIDER") {
            self.provider = provider.trim().to_ascii_lowercase();
        }

        if let Some(api_base) = lookup("API_BASE") {
            self.api_base = Some(api_base);
        }
        if let Some(model) = lookup("MODEL") {
            self.model = Some(model);
        }
        if let Some(temperature) = lookup("LLM_TEMPERATURE") {
            match temperature.trim().parse::<f32>() {
                Ok(value) => self.temperature = value,
                Err(_) => log::warn!("Ignoring invalid LLM_TEMPERATURE: {}", temperature),
            }
        }
        if let Some(max_tokens) = lookup("LLM_MAX_OUTPUT_TOKENS") {
            match max_tokens.trim().parse::<u32>() {
                Ok(value) => self.max_output_tokens = Some(value),
                Err(_) => log::warn!("Ignoring invalid LLM_MAX_OUTPUT_TOKENS: {}", max_tokens),
            }
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(data_dir) = lookup("MODERNIZER_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(data_dir));
        }
        if let Some(no_proxy) = lookup("MODERNIZER_NO_PROXY") {
            if parse_bool_env(&no_proxy) {
                self.http_proxy.clear();
                self.https_proxy.clear();
            }
        }
    }

    /// Take the API key from `API_KEY` or the variable of the current provider.
    ///
    /// Call once the provider is final, so one vendor's key is never sent to another.
    pub fn resolve_api_key<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider_key_var = match self.provider.as_str() {
            "anthropic" => "ANTHROPIC_API_KEY",
            _ => "OPENAI_API_KEY",
        };
        if let Some(api_key) = lookup("API_KEY").or_else(|| lookup(provider_key_var)) {
            self.api_key = Some(api_key);
        }
    }

    /// Model to request, falling back to the pipeline default.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Root directory for sessions and exports.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::app_dir)
    }
}
