//! Route modules and their export shapes
//!
//! A [`RouteModule`] is what importing a route file yields: an optional
//! default export plus named exports. [`RouteModule::classify`] decides once,
//! in a fixed priority order, which convention the module follows.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{self, MethodFilter, MethodRouter};
use axum::Router;

/// Method names recognised in a default-exported method map, in binding order
pub const METHOD_KEYS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

/// Named exports recognised as per-method handlers, in binding order
pub const METHOD_EXPORTS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS", "HEAD"];

/// A type-erased axum handler that can be bound under any method
#[derive(Clone)]
pub struct RouteHandler(Arc<dyn Fn(MethodFilter) -> MethodRouter + Send + Sync>);

impl RouteHandler {
    pub fn new<H, T>(handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self(Arc::new(move |filter: MethodFilter| -> MethodRouter {
            routing::on(filter, handler.clone())
        }))
    }

    /// A method router that answers `method` with this handler
    pub fn bind(&self, method: &Method) -> MethodRouter {
        (self.0)(method_filter(method))
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RouteHandler")
    }
}

/// One exported value of a route module
#[derive(Clone)]
pub enum Export {
    Handler(RouteHandler),
    Object(BTreeMap<String, Export>),
    /// Something that can be mounted with its own methods and sub-paths
    Router(Router),
    /// Plain data; never bound
    Value(serde_json::Value),
}

impl Export {
    pub fn handler<H, T>(handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Export::Handler(RouteHandler::new(handler))
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Export)>,
        K: Into<String>,
    {
        Export::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn router(router: Router) -> Self {
        Export::Router(router)
    }

    pub fn value(value: serde_json::Value) -> Self {
        Export::Value(value)
    }

    fn as_handler(&self) -> Option<&RouteHandler> {
        match self {
            Export::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Handler(_) => f.write_str("Handler"),
            Export::Object(map) => f.debug_map().entries(map.iter()).finish(),
            Export::Router(_) => f.write_str("Router"),
            Export::Value(v) => write!(f, "Value({})", v),
        }
    }
}

/// The result of importing a route file
#[derive(Debug, Clone, Default)]
pub struct RouteModule {
    pub default: Option<Export>,
    pub named: BTreeMap<String, Export>,
}

impl RouteModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, export: Export) -> Self {
        self.default = Some(export);
        self
    }

    pub fn with_export(mut self, name: impl Into<String>, export: Export) -> Self {
        self.named.insert(name.into(), export);
        self
    }

    /// Decide which convention this module follows; first match wins
    pub fn classify(self) -> RouteKind {
        let RouteModule { default, named } = self;

        match default {
            Some(Export::Handler(handler)) => return RouteKind::SingleHandler(handler),
            Some(Export::Object(map)) => {
                let methods = collect_methods(&map, &METHOD_KEYS);
                if !methods.is_empty() {
                    return RouteKind::MethodMap(methods);
                }
            }
            Some(Export::Router(router)) => return RouteKind::SubRouter(router),
            Some(Export::Value(_)) | None => {}
        }

        let methods = collect_methods(&named, &METHOD_EXPORTS);
        if methods.is_empty() {
            RouteKind::Unrecognized
        } else {
            RouteKind::NamedExports(methods)
        }
    }
}

fn collect_methods(
    exports: &BTreeMap<String, Export>,
    names: &[&str],
) -> Vec<(Method, RouteHandler)> {
    names
        .iter()
        .filter_map(|name| {
            let handler = exports.get(*name)?.as_handler()?;
            let method = Method::from_bytes(name.to_ascii_uppercase().as_bytes()).ok()?;
            Some((method, handler.clone()))
        })
        .collect()
}

/// How a route module binds to its endpoint
#[derive(Debug)]
pub enum RouteKind {
    /// Default export is a handler; bound as GET
    SingleHandler(RouteHandler),
    /// Default export maps lower-case method names to handlers
    MethodMap(Vec<(Method, RouteHandler)>),
    /// Default export is a router nested at the endpoint
    SubRouter(Router),
    /// Upper-case method names exported by name
    NamedExports(Vec<(Method, RouteHandler)>),
    Unrecognized,
}

impl RouteKind {
    pub fn name(&self) -> &'static str {
        match self {
            RouteKind::SingleHandler(_) => "single handler",
            RouteKind::MethodMap(_) => "method map",
            RouteKind::SubRouter(_) => "sub-router",
            RouteKind::NamedExports(_) => "named exports",
            RouteKind::Unrecognized => "unrecognized",
        }
    }

    /// Methods this kind binds directly; empty for sub-routers
    pub fn methods(&self) -> Vec<Method> {
        match self {
            RouteKind::SingleHandler(_) => vec![Method::GET],
            RouteKind::MethodMap(methods) | RouteKind::NamedExports(methods) => {
                methods.iter().map(|(m, _)| m.clone()).collect()
            }
            RouteKind::SubRouter(_) | RouteKind::Unrecognized => Vec::new(),
        }
    }
}

fn method_filter(method: &Method) -> MethodFilter {
    match method.as_str() {
        "POST" => MethodFilter::POST,
        "PUT" => MethodFilter::PUT,
        "DELETE" => MethodFilter::DELETE,
        "PATCH" => MethodFilter::PATCH,
        "OPTIONS" => MethodFilter::OPTIONS,
        "HEAD" => MethodFilter::HEAD,
        _ => MethodFilter::GET,
    }
}
