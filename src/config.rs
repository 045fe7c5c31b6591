use anyhow::{anyhow, Context, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Initial state of the AI toggle for new sessions.
    pub ai_enabled: bool,
    pub use_mock: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: 0.3,
            max_tokens: 50,
            ai_enabled: true,
            use_mock: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables, falling back to defaults
    /// when there is no config file. A file that exists but cannot be read or parsed
    /// is an error.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        // Environment variables override config file
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// The config file layer alone, or defaults when the file is absent.
    pub fn load_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Ok(Self::load_from_path(&config_path)?.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        }))
    }

    /// Applies environment overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.openai_api_key = Some(api_key);
        }
        if let Some(model) = lookup("OPENAI_MODEL_NAME").filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        if let Some(base) = lookup("OPENAI_BASE_URL").filter(|b| !b.trim().is_empty()) {
            self.api_base = base;
        }
        if lookup("AITERM_USE_MOCK").is_some() {
            self.use_mock = true;
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reads `path`, returning `None` only when the file does not exist.
    pub fn load_from_path(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded config from: {}", path.display());
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".aiterm"))
    }

    /// Set API key and save config
    pub fn set_api_key(&mut self, api_key: String) -> Result<()> {
        self.openai_api_key = Some(api_key);
        self.save()?;
        info!("API key saved to config file");
        Ok(())
    }

    pub fn get_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    pub fn is_mock_mode(&self) -> bool {
        self.use_mock
    }

    pub fn show_config_info() -> Result<()> {
        let config_path = Self::get_config_path()?;
        println!("Configuration file: {}", config_path.display());

        if config_path.exists() {
            println!("Status: Found");
        } else {
            println!("Status: Not found (using defaults)");
        }

        let config = Self::load()?;
        println!("API Key: {}", if config.get_api_key().is_some() { "Set" } else { "Not set" });
        println!("Model: {}", config.model);
        println!("Endpoint: {}", config.api_base);
        println!("AI mode at startup: {}", config.ai_enabled);
        println!("Mock mode: {}", config.use_mock);

        println!("\nTo set API key:");
        println!("  aiterm --set-api-key <your-key>");
        println!("\nOr set environment variable:");
        println!("  export OPENAI_API_KEY=<your-key>");

        Ok(())
    }
}
