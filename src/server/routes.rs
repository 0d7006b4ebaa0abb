//! Application router assembly

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware, Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{catch_panic, Fallback, PanicPolicy, SpaService};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::routes::{load_api_routes, LoadReport, ModuleLoader, RouteTable};

/// Scan the configured routes directory into a fresh route table
pub async fn load_routes(
    config: &Config,
    loader: &dyn ModuleLoader,
) -> Result<(RouteTable, LoadReport)> {
    let mut table = RouteTable::new();
    let report = load_api_routes(&mut table, loader, &config.route_source()).await?;
    Ok((table, report))
}

/// Load API routes and build the full application router
pub async fn create_app(config: &Config, loader: &dyn ModuleLoader) -> Result<Router> {
    let (table, _) = load_routes(config, loader).await?;
    into_app(table, config)
}

/// Wrap a loaded route table with fallbacks, static serving and middleware
///
/// In production the frontend build directory must exist.
pub fn into_app(table: RouteTable, config: &Config) -> Result<Router> {
    let production = config.mode.is_production();

    let spa = if production {
        Some(spa_service(config)?)
    } else {
        None
    };

    let fallback = Fallback {
        api_prefix: config.api_prefix.clone(),
        spa,
    };
    let policy = PanicPolicy {
        api_prefix: config.api_prefix.clone(),
        production,
    };

    let mut router = table
        .into_router()
        .fallback(move |req: Request| fallback.handle(req))
        .layer(middleware::from_fn_with_state(policy, catch_panic));

    if production {
        router = router
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_XSS_PROTECTION,
                HeaderValue::from_static("1; mode=block"),
            ));
    }

    Ok(router.layer(TraceLayer::new_for_http()))
}

fn spa_service(config: &Config) -> Result<SpaService> {
    let dist = config.dist_path();
    tracing::info!("Serving static files from: {}", dist.display());

    if !dist.is_dir() {
        tracing::error!("The build directory ({}) does not exist", dist.display());
        return Err(Error::BuildMissing(dist));
    }

    Ok(ServeDir::new(&dist).not_found_service(ServeFile::new(config.index_path())))
}
