//! Integration tests for route loading and the assembled application router

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use afterapp::config::{Config, Mode};
use afterapp::routes::{BindingTarget, Export, LoadReport, ModuleRegistry, RouteModule};
use afterapp::server;
use afterapp::Error;

/// Temporary project root with a routes directory for the given mode
struct AppFixture {
    _temp_dir: TempDir,
    pub config: Config,
}

impl AppFixture {
    fn new(mode: Mode) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config {
            root: temp_dir.path().to_path_buf(),
            mode,
            ..Config::default()
        };
        std::fs::create_dir_all(config.routes_dir()).expect("Failed to create routes dir");

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Create a route file; `module_id` is the path without extension
    fn add_route(&self, module_id: &str) {
        let path = self
            .config
            .routes_dir()
            .join(format!("{}.{}", module_id, self.config.route_extension()));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    fn build_frontend(&self) {
        let dist = self.config.dist_path();
        std::fs::create_dir_all(dist.join("assets")).unwrap();
        std::fs::write(self.config.index_path(), "<!doctype html><div id=\"root\"></div>").unwrap();
        std::fs::write(dist.join("assets/app.js"), "console.log('app')").unwrap();
    }

    async fn app(&self, registry: &ModuleRegistry) -> Router {
        server::create_app(&self.config, registry)
            .await
            .expect("Failed to create app")
    }

    async fn load(&self, registry: &ModuleRegistry) -> (Vec<String>, LoadReport) {
        let (table, report) = server::load_routes(&self.config, registry)
            .await
            .expect("Failed to load routes");
        let bindings = table
            .bindings()
            .iter()
            .map(|b| format!("{} {}", b.target, b.endpoint))
            .collect();
        (bindings, report)
    }
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

async fn named(name: &'static str) -> String {
    name.to_string()
}

// ============================================================================
// Export conventions
// ============================================================================

mod export_tests {
    use super::*;

    #[tokio::test]
    async fn test_default_handler_answers_get_only() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.add_route("ping");
        fixture.add_route("other");

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = ModuleRegistry::new()
            .with("ping", move || {
                let counter = counter.clone();
                RouteModule::new().with_default(Export::handler(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        "pong"
                    }
                }))
            })
            .with("other", || RouteModule::new().with_default(Export::handler(|| named("other"))));

        let app = fixture.app(&registry).await;

        let res = send(&app, Method::GET, "/api/ping", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "pong");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let res = send(&app, Method::POST, "/api/ping", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let res = send(&app, Method::GET, "/api/other", None).await;
        assert_eq!(res.body, "other");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_method_map_binds_only_present_methods() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.add_route("items");

        let registry = ModuleRegistry::new().with("items", || {
            RouteModule::new().with_default(Export::object([
                ("get", Export::handler(|| named("list"))),
                ("delete", Export::handler(|| named("purge"))),
            ]))
        });
        let app = fixture.app(&registry).await;

        assert_eq!(send(&app, Method::GET, "/api/items", None).await.body, "list");
        assert_eq!(send(&app, Method::DELETE, "/api/items", None).await.body, "purge");

        let res = send(&app, Method::PUT, "/api/items", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(
            res.json(),
            json!({ "status": "error", "message": "Route PUT /api/items not found" })
        );
    }

    #[tokio::test]
    async fn test_bracket_segment_binds_path_param() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.add_route("user/[id]");

        let registry = ModuleRegistry::new().with("user/[id]", || {
            RouteModule::new().with_default(Export::handler(|Path(id): Path<String>| async move {
                format!("user {}", id)
            }))
        });

        let (bindings, _) = fixture.load(&registry).await;
        assert_eq!(bindings, vec!["GET /api/user/:id"]);

        let app = fixture.app(&registry).await;
        let res = send(&app, Method::GET, "/api/user/42", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "user 42");
    }

    #[tokio::test]
    async fn test_named_exports_and_sub_router() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.add_route("hello");
        fixture.add_route("admin");

        let registry = ModuleRegistry::new()
            .with("hello", || {
                RouteModule::new()
                    .with_export("GET", Export::handler(|| named("hi")))
                    .with_export("POST", Export::handler(|| named("created")))
            })
            .with("admin", || {
                let router = Router::new()
                    .route("/", get(|| named("dashboard")))
                    .route("/users/{name}", get(|Path(name): Path<String>| async move { name }));
                RouteModule::new().with_default(Export::router(router))
            });

        let (bindings, report) = fixture.load(&registry).await;
        assert_eq!(
            bindings,
            vec!["MOUNT /api/admin", "GET /api/hello", "POST /api/hello"]
        );
        assert_eq!(report.loaded.len(), 2);

        let app = fixture.app(&registry).await;
        assert_eq!(send(&app, Method::POST, "/api/hello", None).await.body, "created");
        assert_eq!(send(&app, Method::GET, "/api/admin", None).await.body, "dashboard");
        assert_eq!(
            send(&app, Method::GET, "/api/admin/users/ada", None).await.body,
            "ada"
        );
    }

    #[tokio::test]
    async fn test_unrecognized_module_warns_and_binds_nothing() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.add_route("settings");

        let registry = ModuleRegistry::new().with("settings", || {
            RouteModule::new().with_export("config", Export::value(json!({ "cache": true })))
        });

        let (bindings, report) = fixture.load(&registry).await;
        assert!(bindings.is_empty());
        assert_eq!(report.unrecognized.len(), 1);

        let app = fixture.app(&registry).await;
        let res = send(&app, Method::GET, "/api/settings", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.json()["status"], "error");
    }
}

// ============================================================================
// Load-time failures
// ============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_file_does_not_stop_others() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.add_route("broken");
        fixture.add_route("missing");
        fixture.add_route("hello");

        let mut registry = ModuleRegistry::new();
        registry
            .register_fallible("broken", || Err(Error::Other("cannot initialise".into())))
            .register("hello", || RouteModule::new().with_default(Export::handler(|| named("hi"))));

        let (bindings, report) = fixture.load(&registry).await;
        assert_eq!(bindings, vec!["GET /api/hello"]);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().any(|(_, reason)| reason.contains("cannot initialise")));
        assert!(report.failed.iter().any(|(_, reason)| reason.contains("missing")));

        let app = fixture.app(&registry).await;
        assert_eq!(send(&app, Method::GET, "/api/hello", None).await.body, "hi");
    }

    #[tokio::test]
    async fn test_conflicting_files_are_rejected_without_panicking() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.add_route("user/[id]");
        fixture.add_route("user/[slug]");

        let module = || RouteModule::new().with_default(Export::handler(|| named("user")));
        let registry = ModuleRegistry::new()
            .with("user/[id]", module)
            .with("user/[slug]", module);

        let (bindings, report) = fixture.load(&registry).await;
        assert_eq!(bindings.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].1.contains("conflicts"));
    }

    #[tokio::test]
    async fn test_missing_routes_directory_aborts() {
        let fixture = AppFixture::new(Mode::Development);
        std::fs::remove_dir_all(fixture.config.routes_dir()).unwrap();

        let result = server::create_app(&fixture.config, &ModuleRegistry::new()).await;
        assert!(matches!(result, Err(Error::Scan { .. })));
    }

    #[tokio::test]
    async fn test_production_without_build_fails() {
        let fixture = AppFixture::new(Mode::Production);
        fixture.add_route("hello");
        let registry =
            ModuleRegistry::new().with("hello", || RouteModule::new().with_default(Export::handler(|| named("hi"))));

        let result = server::create_app(&fixture.config, &registry).await;
        assert!(matches!(result, Err(Error::BuildMissing(path)) if path == fixture.config.dist_path()));
    }
}

// ============================================================================
// Run-time fallbacks
// ============================================================================

mod fallback_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_api_path_gets_json_404_every_time() {
        let fixture = AppFixture::new(Mode::Development);
        let app = fixture.app(&ModuleRegistry::new()).await;

        for _ in 0..2 {
            let res = send(&app, Method::GET, "/api/does-not-exist", None).await;
            assert_eq!(res.status, StatusCode::NOT_FOUND);
            assert_eq!(
                res.json(),
                json!({
                    "status": "error",
                    "message": "Route GET /api/does-not-exist not found"
                })
            );
        }
    }

    #[tokio::test]
    async fn test_production_serves_spa_entry_for_unknown_paths() {
        let fixture = AppFixture::new(Mode::Production);
        fixture.build_frontend();
        fixture.add_route("hello");
        let registry =
            ModuleRegistry::new().with("hello", || RouteModule::new().with_default(Export::handler(|| named("hi"))));
        let app = fixture.app(&registry).await;

        let res = send(&app, Method::GET, "/nonexistent", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(res.body.contains("<div id=\"root\">"));

        let res = send(&app, Method::GET, "/assets/app.js", None).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body, "console.log('app')");

        let res = send(&app, Method::GET, "/api/hello", None).await;
        assert_eq!(res.body, "hi");

        let res = send(&app, Method::GET, "/api/nope", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.json()["message"], "Route GET /api/nope not found");
    }

    #[tokio::test]
    async fn test_development_has_no_spa_fallback() {
        let fixture = AppFixture::new(Mode::Development);
        fixture.build_frontend();
        let app = fixture.app(&ModuleRegistry::new()).await;

        let res = send(&app, Method::GET, "/nonexistent", None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert!(!res.body.contains("root"));
    }

    #[tokio::test]
    async fn test_security_headers_only_in_production() {
        let registry =
            ModuleRegistry::new().with("hello", || RouteModule::new().with_default(Export::handler(|| named("hi"))));

        let production = AppFixture::new(Mode::Production);
        production.build_frontend();
        production.add_route("hello");
        let app = production.app(&registry).await;
        let res = send(&app, Method::GET, "/api/hello", None).await;
        assert_eq!(res.headers["x-content-type-options"], "nosniff");
        assert_eq!(res.headers["x-frame-options"], "DENY");
        assert_eq!(res.headers["x-xss-protection"], "1; mode=block");

        let development = AppFixture::new(Mode::Development);
        development.add_route("hello");
        let app = development.app(&registry).await;
        let res = send(&app, Method::GET, "/api/hello", None).await;
        assert!(res.headers.get("x-frame-options").is_none());
    }

    async fn explode() -> &'static str {
        panic!("database on fire")
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        let registry =
            ModuleRegistry::new().with("boom", || RouteModule::new().with_default(Export::handler(explode)));

        let development = AppFixture::new(Mode::Development);
        development.add_route("boom");
        let app = development.app(&registry).await;
        let res = send(&app, Method::GET, "/api/boom", None).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.json()["message"], "database on fire");

        let production = AppFixture::new(Mode::Production);
        production.build_frontend();
        production.add_route("boom");
        let app = production.app(&registry).await;
        let res = send(&app, Method::GET, "/api/boom", None).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            res.json(),
            json!({ "status": "error", "message": "Internal server error" })
        );
    }
}

#[test]
fn test_binding_target_display() {
    assert_eq!(BindingTarget::Method(Method::PATCH).to_string(), "PATCH");
    assert_eq!(BindingTarget::Mount.to_string(), "MOUNT");
}
