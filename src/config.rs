// src/config.rs

use crate::map::viewport::ViewportSettings;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const CONFIG_PATH_VAR: &str = "LISTINGS_MAP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Schema applied on startup.
    pub schema_path: PathBuf,
    /// Demo listings loaded into an empty database.
    pub seed_path: Option<PathBuf>,
    pub max_workers: usize,
    /// Listings per page on the map view.
    pub page_size: u32,
    pub map: MapSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            db_path: PathBuf::from("listings.sqlite3"),
            schema_path: PathBuf::from("sql/schema.sql"),
            seed_path: Some(PathBuf::from("sql/seed.sql")),
            max_workers: 8,
            page_size: 50,
            map: MapSettings::default(),
        }
    }
}

/// Browser map defaults plus the viewport fitting rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Where the map opens before any marker is placed (Riyadh).
    pub default_lat: f64,
    pub default_lng: f64,
    pub default_zoom: f64,
    pub tile_url: String,
    pub tile_attribution: String,
    #[serde(flatten)]
    pub viewport: ViewportSettings,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_lat: 24.7136,
            default_lng: 46.6753,
            default_zoom: 11.0,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_attribution: "&copy; OpenStreetMap contributors".to_string(),
            viewport: ViewportSettings::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file named by `LISTINGS_MAP_CONFIG`, then env vars.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        cfg.apply_env(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlays environment variables. `lookup` is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LISTINGS_MAP_ADDR") {
            self.bind_addr = parse_var("LISTINGS_MAP_ADDR", v)?;
        }
        if let Some(v) = lookup("LISTINGS_MAP_DB") {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("LISTINGS_MAP_SCHEMA") {
            self.schema_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("LISTINGS_MAP_SEED") {
            // Empty disables seeding.
            self.seed_path = (!v.trim().is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = lookup("LISTINGS_MAP_WORKERS") {
            self.max_workers = parse_var("LISTINGS_MAP_WORKERS", v)?;
        }
        if let Some(v) = lookup("LISTINGS_MAP_PAGE_SIZE") {
            self.page_size = parse_var("LISTINGS_MAP_PAGE_SIZE", v)?;
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { var, value })
}
