use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Where the web application is served
    #[serde(default)]
    pub site: SiteConfig,
    /// Hosted backend used for accounts, recipes and photos
    #[serde(default)]
    pub backend: BackendConfig,
    /// Local preference storage
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Deployment location, used to build share links
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Scheme and host, e.g. "https://example.com"
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Path the app is served under, e.g. "/my-recipes/" on a project pages site
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            base_path: default_base_path(),
        }
    }
}

/// Connection settings for the hosted backend
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Project URL (can also be set via RECIPE_SHARE__BACKEND__URL)
    pub url: Option<String>,
    /// Public anon key sent with every request
    pub anon_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Storage bucket recipe photos are uploaded to
    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_secs: default_timeout(),
            photo_bucket: default_photo_bucket(),
        }
    }
}

/// Where theme preferences are persisted
#[derive(Debug, Deserialize, Clone)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_path")]
    pub path: PathBuf,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

// Default value functions
fn default_origin() -> String {
    "http://localhost:8080".to_string()
}

fn default_base_path() -> String {
    "/".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_photo_bucket() -> String {
    "recipe-images".to_string()
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("recipe-share-preferences.json")
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_SHARE__ prefix
    /// 2. recipe-share.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_SHARE__SITE__BASE_PATH
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from("recipe-share")
}

/// Same as [`load_config`] with an explicit config file name (extension
/// optional, the file may be missing).
pub fn load_config_from(file_name: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name(file_name).required(false))
        // Use double underscore for nested: RECIPE_SHARE__BACKEND__ANON_KEY
        .add_source(
            Environment::with_prefix("RECIPE_SHARE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
