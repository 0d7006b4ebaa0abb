//! Emit the compiled route tree scanned in production
//!
//! Production has no source tree to scan, so `build` mirrors every route file
//! under the source routes directory into the compiled directory with the
//! production extension. The loader finds the same modules, at the same paths.

use std::path::PathBuf;

use crate::config::{Config, Mode};
use crate::error::{Error, Result};
use crate::routes::{discover, ModuleRegistry, RouteFile, RouteSource};

/// Write one compiled route file per source route file; returns the written paths
pub fn compile_routes(config: &Config, registry: &ModuleRegistry) -> Result<Vec<PathBuf>> {
    let source = RouteSource {
        root: config.source_path(),
        extension: Mode::Development.route_extension().to_string(),
        prefix: config.api_prefix.clone(),
    };
    let out_dir = config.compiled_path();
    let mut written = Vec::new();

    for path in discover(&source)? {
        let file = RouteFile::from_path(&source, &path)?;
        if !registry.contains(&file.module_id) {
            tracing::warn!(
                "No compiled module for {}; {} will fail to load",
                path.display(),
                file.endpoint()
            );
        }

        let target = out_dir
            .join(&file.relative)
            .with_extension(Mode::Production.route_extension());
        let parent = target
            .parent()
            .ok_or_else(|| Error::Other(format!("No parent directory for {}", target.display())))?;
        std::fs::create_dir_all(parent)?;
        std::fs::write(&target, format!("{}\n", file.module_id))?;

        tracing::debug!("Compiled {} -> {}", path.display(), target.display());
        written.push(target);
    }

    Ok(written)
}
