//! The server's route table, filled by the loader during startup

use std::fmt;
use std::path::PathBuf;

use axum::http::Method;
use axum::routing::MethodRouter;
use axum::Router;

use super::discovery::{RouteFile, Segment};
use super::module::{RouteHandler, RouteKind};
use crate::error::{Error, Result};
use crate::server::handlers::api_not_found;

/// What a binding answers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingTarget {
    Method(Method),
    /// A sub-router claiming the endpoint and everything below it
    Mount,
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingTarget::Method(method) => f.write_str(method.as_str()),
            BindingTarget::Mount => f.write_str("MOUNT"),
        }
    }
}

/// An installed (method, path) → handler association
#[derive(Debug, Clone)]
pub struct Binding {
    pub target: BindingTarget,
    pub endpoint: String,
    /// Route file the binding came from, relative to the routes root
    pub source: PathBuf,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<7} {} ({})",
            self.target.to_string(),
            self.endpoint,
            self.source.display()
        )
    }
}

struct Claim {
    segments: Vec<Segment>,
    endpoint: String,
    mount: bool,
}

/// Owns the router under construction and every binding made into it
#[derive(Default)]
pub struct RouteTable {
    router: Router,
    bindings: Vec<Binding>,
    claims: Vec<Claim>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a classified module at the file's endpoint; returns the number of bindings made
    pub fn install(&mut self, file: &RouteFile, kind: RouteKind) -> Result<usize> {
        match kind {
            RouteKind::SingleHandler(handler) => {
                self.bind_methods(file, vec![(Method::GET, handler)])
            }
            RouteKind::MethodMap(methods) | RouteKind::NamedExports(methods) => {
                self.bind_methods(file, methods)
            }
            RouteKind::SubRouter(router) => self.mount(file, router),
            RouteKind::Unrecognized => Ok(0),
        }
    }

    fn bind_methods(&mut self, file: &RouteFile, methods: Vec<(Method, RouteHandler)>) -> Result<usize> {
        if methods.is_empty() {
            return Ok(0);
        }
        self.claim(file, false)?;

        let method_router = methods
            .iter()
            .fold(MethodRouter::new(), |acc, (method, handler)| {
                acc.merge(handler.bind(method))
            })
            .fallback(api_not_found);

        let router = std::mem::take(&mut self.router);
        self.router = router.route(&file.axum_path(), method_router);

        for (method, _) in &methods {
            self.record(file, BindingTarget::Method(method.clone()));
        }
        Ok(methods.len())
    }

    fn mount(&mut self, file: &RouteFile, sub_router: Router) -> Result<usize> {
        if file
            .segments
            .iter()
            .any(|s| matches!(s, Segment::CatchAll(_)))
        {
            return Err(Error::InvalidRoutePath {
                path: file.path.clone(),
                reason: "a sub-router cannot be mounted at a catch-all path".into(),
            });
        }
        self.claim(file, true)?;

        let router = std::mem::take(&mut self.router);
        self.router = router.nest(&file.axum_path(), sub_router);

        self.record(file, BindingTarget::Mount);
        Ok(1)
    }

    fn claim(&mut self, file: &RouteFile, mount: bool) -> Result<()> {
        if let Some(existing) = self
            .claims
            .iter()
            .find(|claim| conflicts(claim, &file.segments, mount))
        {
            return Err(Error::RouteConflict {
                endpoint: file.endpoint(),
                existing: existing.endpoint.clone(),
            });
        }

        self.claims.push(Claim {
            segments: file.segments.clone(),
            endpoint: file.endpoint(),
            mount,
        });
        Ok(())
    }

    fn record(&mut self, file: &RouteFile, target: BindingTarget) {
        self.bindings.push(Binding {
            target,
            endpoint: file.endpoint(),
            source: file.relative.clone(),
        });
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Whether a new route would be ambiguous with (or panic the router against) an existing claim
fn conflicts(existing: &Claim, segments: &[Segment], mount: bool) -> bool {
    for (a, b) in existing.segments.iter().zip(segments) {
        match (a, b) {
            (Segment::Static(x), Segment::Static(y)) if x == y => {}
            (Segment::Param(x), Segment::Param(y)) if x == y => {}
            (Segment::Static(_), Segment::Static(_)) => return false,
            // static segments take priority over captures
            (Segment::Static(_), _) | (_, Segment::Static(_)) => return false,
            // differently named captures at the same position
            _ => return true,
        }
    }

    match existing.segments.len().cmp(&segments.len()) {
        std::cmp::Ordering::Equal => true,
        std::cmp::Ordering::Less => existing.mount,
        std::cmp::Ordering::Greater => mount,
    }
}
