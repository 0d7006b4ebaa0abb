//! Configuration for afterapp

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::routes::RouteSource;

/// Name of the optional config file in the project root
pub const CONFIG_FILE: &str = "after.toml";

/// Deployment mode, resolved once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
    Test,
}

impl Mode {
    pub fn is_production(self) -> bool {
        self == Mode::Production
    }

    /// Extension of route files scanned in this mode
    pub fn route_extension(self) -> &'static str {
        match self {
            Mode::Production => "route",
            Mode::Development | Mode::Test => "rs",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Development => "development",
            Mode::Production => "production",
            Mode::Test => "test",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            "test" => Ok(Mode::Test),
            other => Err(Error::Config(format!("Unknown mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project root; every relative path below resolves against it
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub mode: Mode,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Namespace every discovered route is mounted under
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Overrides the mode-selected routes directory
    #[serde(default)]
    pub api_dir: Option<PathBuf>,

    /// Route sources scanned in development
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Compiled route tree scanned in production
    #[serde(default = "default_compiled_dir")]
    pub compiled_dir: PathBuf,

    /// Frontend build output served in production
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            mode: Mode::default(),
            port: default_port(),
            api_prefix: default_api_prefix(),
            api_dir: None,
            source_dir: default_source_dir(),
            compiled_dir: default_compiled_dir(),
            dist_dir: default_dist_dir(),
        }
    }
}

impl Config {
    /// Load config for a project root from `after.toml` and the process environment
    pub fn load(root: PathBuf) -> Result<Self> {
        Self::load_with(root, |key| std::env::var(key).ok())
    }

    /// Load config, reading environment variables through `lookup`
    pub fn load_with<F>(root: PathBuf, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = root.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };
        config.root = root;
        config.apply_env(lookup)?;
        config.api_prefix = normalize_prefix(&config.api_prefix)?;

        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("APP_ENV") {
            self.mode = mode.parse()?;
        }
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(prefix) = lookup("API_URL") {
            self.api_prefix = prefix;
        }
        if let Some(dir) = lookup("AFTER_API_DIR") {
            self.api_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup("AFTER_DIST_DIR") {
            self.dist_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Directory scanned for route files in the current mode
    pub fn routes_dir(&self) -> PathBuf {
        match &self.api_dir {
            Some(dir) => self.resolve(dir),
            None if self.mode.is_production() => self.resolve(&self.compiled_dir),
            None => self.resolve(&self.source_dir),
        }
    }

    pub fn route_extension(&self) -> &'static str {
        self.mode.route_extension()
    }

    pub fn route_source(&self) -> RouteSource {
        RouteSource {
            root: self.routes_dir(),
            extension: self.route_extension().to_string(),
            prefix: self.api_prefix.clone(),
        }
    }

    /// Path to the frontend build output
    pub fn dist_path(&self) -> PathBuf {
        self.resolve(&self.dist_dir)
    }

    /// Path to the single-page entry document
    pub fn index_path(&self) -> PathBuf {
        self.dist_path().join("index.html")
    }

    pub fn source_path(&self) -> PathBuf {
        self.resolve(&self.source_dir)
    }

    pub fn compiled_path(&self) -> PathBuf {
        self.resolve(&self.compiled_dir)
    }
}

fn normalize_prefix(prefix: &str) -> Result<String> {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() || !trimmed.starts_with('/') {
        return Err(Error::Config(format!(
            "API prefix must start with '/' and name a path: {:?}",
            prefix
        )));
    }
    Ok(trimmed.to_string())
}

// Default value functions

fn default_port() -> u16 {
    3000
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src/app/api")
}

fn default_compiled_dir() -> PathBuf {
    PathBuf::from("dist-server/app/api")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}
