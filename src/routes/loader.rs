//! Convention-based API route loading

use std::path::PathBuf;

use super::discovery::{discover, RouteFile, RouteSource};
use super::registry::ModuleLoader;
use super::table::RouteTable;
use super::module::RouteKind;
use crate::error::Result;

/// Outcome of one loading pass
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files that produced at least one binding
    pub loaded: Vec<PathBuf>,
    /// Files whose module matched no export convention
    pub unrecognized: Vec<PathBuf>,
    /// Files that failed to import or bind, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl LoadReport {
    pub fn discovered(&self) -> usize {
        self.loaded.len() + self.unrecognized.len() + self.failed.len()
    }
}

/// Discover route files under `source.root` and bind their handlers into `table`
///
/// Per-file failures are logged and skipped. Only a failure to enumerate the
/// routes directory is returned as an error.
pub async fn load_api_routes(
    table: &mut RouteTable,
    loader: &dyn ModuleLoader,
    source: &RouteSource,
) -> Result<LoadReport> {
    let files = discover(source).inspect_err(|e| {
        tracing::error!("Error finding API files: {}", e);
    })?;
    tracing::debug!(
        "Found {} route files in {}",
        files.len(),
        source.root.display()
    );

    let mut report = LoadReport::default();

    for path in files {
        let file = match RouteFile::from_path(source, &path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Error loading route {}: {}", path.display(), e);
                report.failed.push((path, e.to_string()));
                continue;
            }
        };
        let endpoint = file.endpoint();

        let kind = match loader.import(&file).await {
            Ok(module) => module.classify(),
            Err(e) => {
                tracing::error!("Error loading route {}: {}", endpoint, e);
                report.failed.push((path, e.to_string()));
                continue;
            }
        };

        if matches!(kind, RouteKind::Unrecognized) {
            tracing::warn!("No handlers found for {}", endpoint);
            report.unrecognized.push(path);
            continue;
        }

        let kind_name = kind.name();
        match table.install(&file, kind) {
            Ok(count) => {
                tracing::debug!("Loaded {} for {} ({} bindings)", kind_name, endpoint, count);
                report.loaded.push(path);
            }
            Err(e) => {
                tracing::error!("Error loading route {}: {}", endpoint, e);
                report.failed.push((path, e.to_string()));
            }
        }
    }

    tracing::info!(
        "Loaded {} of {} API route files",
        report.loaded.len(),
        report.discovered()
    );

    Ok(report)
}
