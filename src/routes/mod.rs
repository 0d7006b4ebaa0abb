//! File-based API routing

mod discovery;
mod loader;
mod module;
mod registry;
mod table;

pub use discovery::{discover, RouteFile, RouteSource, Segment};
pub use loader::{load_api_routes, LoadReport};
pub use module::{Export, RouteHandler, RouteKind, RouteModule, METHOD_EXPORTS, METHOD_KEYS};
pub use registry::{ModuleLoader, ModuleRegistry};
pub use table::{Binding, BindingTarget, RouteTable};
