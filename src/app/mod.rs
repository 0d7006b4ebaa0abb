//! Application route modules
//!
//! Every file under `src/app/api` is a route file. In development the loader
//! scans that directory and [`registry`] supplies the module behind each file,
//! keyed by its path relative to `src/app/api` without the extension.

use crate::routes::ModuleRegistry;

pub mod api {
    pub mod health;
    pub mod hello;
    pub mod todos;
    pub mod user;

    #[path = "user/[id].rs"]
    pub mod user_id;
}

/// Every route module compiled into this binary
pub fn registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .with("health", api::health::module)
        .with("hello", api::hello::module)
        .with("todos", api::todos::module)
        .with("user", api::user::module)
        .with("user/[id]", api::user_id::module)
}
