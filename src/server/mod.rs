//! HTTP server layer

mod routes;
pub mod handlers;

pub use handlers::ErrorResponse;
pub use routes::{create_app, into_app, load_routes};
