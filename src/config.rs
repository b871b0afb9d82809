use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::core::search::{DEFAULT_KEYWORD, DEFAULT_RADIUS_M};
use crate::services::directions::DEFAULT_MAPBOX_URL;
use crate::services::places::DEFAULT_PLACES_URL;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub places: PlacesSettings,
    #[serde(default)]
    pub mapbox: MapboxSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

/// Verification of bearer tokens issued by the hosted auth service
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            audience: default_audience(),
        }
    }
}

fn default_audience() -> String { "authenticated".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSettings {
    #[serde(default = "default_places_endpoint")]
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for PlacesSettings {
    fn default() -> Self {
        Self {
            endpoint: default_places_endpoint(),
            api_key: None,
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_places_endpoint() -> String { DEFAULT_PLACES_URL.to_string() }
fn default_http_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct MapboxSettings {
    #[serde(default = "default_mapbox_endpoint")]
    pub endpoint: String,
    pub access_token: Option<String>,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for MapboxSettings {
    fn default() -> Self {
        Self {
            endpoint: default_mapbox_endpoint(),
            access_token: None,
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_mapbox_endpoint() -> String { DEFAULT_MAPBOX_URL.to_string() }

/// Which search backend serves `/gyms/search`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Store,
    Places,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_radius")]
    pub default_radius: u32,
    #[serde(default = "default_keyword")]
    pub default_keyword: String,
    #[serde(default = "default_location")]
    pub default_location: String,
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            default_radius: default_radius(),
            default_keyword: default_keyword(),
            default_location: default_location(),
            placeholder_image: default_placeholder_image(),
        }
    }
}

fn default_radius() -> u32 { DEFAULT_RADIUS_M }
fn default_keyword() -> String { DEFAULT_KEYWORD.to_string() }
fn default_location() -> String { "Tampa, FL".to_string() }
fn default_placeholder_image() -> String { "/images/gym-placeholder.jpg".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_session_capacity")]
    pub capacity: u64,
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            capacity: default_session_capacity(),
            ttl_secs: default_session_ttl(),
        }
    }
}

fn default_session_capacity() -> u64 { 10_000 }
fn default_session_ttl() -> u64 { 1800 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_ttl")]
    pub ttl_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_catalog_ttl(),
        }
    }
}

fn default_catalog_ttl() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default, config/local)
    /// 3. Environment variables (prefixed with GYMFINDER__)
    /// 4. Well-known provider variables (DATABASE_URL, GOOGLE_PLACES_API_KEY, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., GYMFINDER__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_provider_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("GYMFINDER")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Override config values from the variables the hosting providers document
fn apply_provider_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("database.url", "DATABASE_URL"),
        ("places.api_key", "GOOGLE_PLACES_API_KEY"),
        ("mapbox.access_token", "MAPBOX_TOKEN"),
        ("auth.jwt_secret", "SUPABASE_JWT_SECRET"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, var) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                "[database]\nurl = \"postgres://localhost/gyms\"\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.search.backend, BackendKind::Store);
        assert_eq!(settings.search.default_radius, 5000);
        assert_eq!(settings.search.default_keyword, "gym fitness");
        assert_eq!(settings.search.default_location, "Tampa, FL");
        assert_eq!(settings.auth.audience, "authenticated");
        assert_eq!(settings.session.ttl_secs, 1800);
        assert!(settings.places.api_key.is_none());
    }

    #[test]
    fn test_places_backend_parses() {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(
                "[database]\nurl = \"postgres://localhost/gyms\"\n[search]\nbackend = \"places\"\ndefault_radius = 8000\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.search.backend, BackendKind::Places);
        assert_eq!(settings.search.default_radius, 8000);
    }
}
