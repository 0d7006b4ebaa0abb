//! Error types for afterapp

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error finding API files in {path}: {reason}")]
    Scan { path: PathBuf, reason: String },

    #[error("Invalid route path {path}: {reason}")]
    InvalidRoutePath { path: PathBuf, reason: String },

    #[error("Route module not found: {0}")]
    ModuleNotFound(String),

    #[error("Failed to import route module {id}: {reason}")]
    Import { id: String, reason: String },

    #[error("Route {endpoint} conflicts with {existing}")]
    RouteConflict { endpoint: String, existing: String },

    #[error("The build directory ({}) does not exist. Did you run the frontend build before starting the server?", .0.display())]
    BuildMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        Error::Scan {
            path,
            reason: err.to_string(),
        }
    }
}
