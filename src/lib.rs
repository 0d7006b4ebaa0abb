//! afterapp - full-stack app server with convention-based file routing for API modules

pub mod config;
pub mod error;

pub mod routes;
pub mod server;
pub mod app;
pub mod build;

pub use config::{Config, Mode};
pub use error::{Error, Result};
