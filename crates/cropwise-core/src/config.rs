use anyhow::{Context, Result};
use cropwise_conditions::{geocode, soil, weather, ClientSettings, RetryConfig};
use cropwise_match::DEFAULT_TOP_K;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable holding the Ambee API key
pub const AMBEE_API_KEY_ENV: &str = "AMBEE_API_KEY";
/// Environment variable holding the Google Maps API key
pub const GOOGLE_MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reference dataset settings
    #[serde(default)]
    pub data: DataConfig,

    /// Recommendation settings
    #[serde(default)]
    pub recommend: RecommendConfig,

    /// SoilGrids endpoint
    #[serde(default)]
    pub soil: SoilConfig,

    /// Ambee weather endpoint and key
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Google geocoding endpoint and key
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Timeouts and retries for every upstream call
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV of historical growing conditions
    pub reference_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            reference_path: PathBuf::from("Crop_recommendation.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// How many distinct crops to suggest
    pub top_k: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilConfig {
    pub api_url: String,
}

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            api_url: soil::SOILGRIDS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_url: String,

    /// Falls back to `AMBEE_API_KEY`; never written back to disk.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: weather::AMBEE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    pub api_url: String,

    /// Falls back to `GOOGLE_MAPS_API_KEY`; never written back to disk.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            api_url: geocode::GOOGLE_MAPS_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds (default: 15)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after a transient failure (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay in milliseconds, doubled per retry (default: 100)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    cropwise_conditions::retry::DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    cropwise_conditions::retry::DEFAULT_INITIAL_DELAY_MS
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl NetworkConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryConfig::new(
                self.max_retries,
                self.retry_delay_ms,
                cropwise_conditions::retry::DEFAULT_MAX_DELAY_MS,
            ),
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating a
    /// default file if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating a default file if missing.
    /// API keys left unset in the file are read from the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            config
        };

        config.apply_credentials(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails; warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Fill unset API keys from `lookup` (normally the process environment).
    pub fn apply_credentials(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.weather.api_key.is_none() {
            self.weather.api_key = lookup(AMBEE_API_KEY_ENV);
        }
        if self.geocode.api_key.is_none() {
            self.geocode.api_key = lookup(GOOGLE_MAPS_API_KEY_ENV);
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_url(&self.soil.api_url, "soil.api_url", &mut result);
        Self::validate_url(&self.weather.api_url, "weather.api_url", &mut result);
        Self::validate_url(&self.geocode.api_url, "geocode.api_url", &mut result);

        if self.recommend.top_k == 0 {
            result.add_error("recommend.top_k", "Must suggest at least one crop");
        }

        if self.network.timeout_secs == 0 {
            result.add_error("network.timeout_secs", "Timeout must be greater than 0");
        } else if self.network.timeout_secs > 300 {
            result.add_warning("network.timeout_secs", "Timeout is longer than 5 minutes");
        }

        if self.network.max_retries > 10 {
            result.add_warning("network.max_retries", "More than 10 retries per request");
        }

        let path = &self.data.reference_path;
        if !path.exists() {
            result.add_warning(
                "data.reference_path",
                format!("File does not exist: {}", path.display()),
            );
        } else if path.is_dir() {
            result.add_error(
                "data.reference_path",
                format!("Path is a directory: {}", path.display()),
            );
        }

        if !has_key(&self.weather.api_key) {
            result.add_warning(
                "weather.api_key",
                format!("Not set ({} unset) - weather lookups will fail", AMBEE_API_KEY_ENV),
            );
        }
        if !has_key(&self.geocode.api_key) {
            result.add_warning(
                "geocode.api_key",
                format!("Not set ({} unset) - address lookup unavailable", GOOGLE_MAPS_API_KEY_ENV),
            );
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`. API keys are never written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("cropwise");

        Ok(config_dir.join("config.toml"))
    }
}

fn has_key(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}
