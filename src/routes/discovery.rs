//! Route file discovery and HTTP path derivation
//!
//! A route file's path relative to the routes root becomes its HTTP path:
//! `user/[id].rs` under `/api` is served at `/api/user/:id`.

use std::path::{Component, Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};

/// Where route files come from and how they are mounted
#[derive(Debug, Clone)]
pub struct RouteSource {
    /// Directory scanned recursively
    pub root: PathBuf,
    /// Extension (without the dot) a file must carry to be a route file
    pub extension: String,
    /// Namespace prefix, e.g. `/api`
    pub prefix: String,
}

/// One segment of a derived route path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    /// `[name]`
    Param(String),
    /// `[...name]`, only valid as the last segment
    CatchAll(String),
}

/// A discovered route file and the HTTP path derived from it
#[derive(Debug, Clone)]
pub struct RouteFile {
    /// Full path of the file
    pub path: PathBuf,
    /// Path relative to the routes root
    pub relative: PathBuf,
    /// Relative path without extension, `/`-separated (`user/[id]`)
    pub module_id: String,
    pub segments: Vec<Segment>,
    prefix: String,
}

impl RouteFile {
    /// Derive the descriptor for `path`, which must live under `source.root`
    pub fn from_path(source: &RouteSource, path: &Path) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidRoutePath {
            path: path.to_path_buf(),
            reason,
        };

        let relative = path
            .strip_prefix(&source.root)
            .map_err(|_| invalid("not under the routes root".into()))?
            .to_path_buf();

        let mut names = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name
                        .to_str()
                        .ok_or_else(|| invalid("path is not valid UTF-8".into()))?;
                    names.push(name.to_string());
                }
                _ => return Err(invalid("unexpected path component".into())),
            }
        }

        let suffix = format!(".{}", source.extension);
        let last = names
            .pop()
            .ok_or_else(|| invalid("empty relative path".into()))?;
        let stem = last
            .strip_suffix(&suffix)
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| invalid(format!("file name does not end with {}", suffix)))?;
        names.push(stem.to_string());

        let segments = names
            .iter()
            .map(|name| parse_segment(name))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(invalid)?;

        if let Some(pos) = segments
            .iter()
            .position(|s| matches!(s, Segment::CatchAll(_)))
        {
            if pos + 1 != segments.len() {
                return Err(invalid("catch-all segment must be last".into()));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            relative,
            module_id: names.join("/"),
            segments,
            prefix: source.prefix.clone(),
        })
    }

    /// Route path relative to the namespace, e.g. `/user/:id`
    pub fn route_path(&self) -> String {
        self.render(|segment| match segment {
            Segment::Static(s) => s.clone(),
            Segment::Param(name) => format!(":{}", name),
            Segment::CatchAll(name) => format!("*{}", name),
        })
    }

    /// Full HTTP path, e.g. `/api/user/:id`
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.prefix, self.route_path())
    }

    /// The endpoint in axum's capture syntax, e.g. `/api/user/{id}`
    pub fn axum_path(&self) -> String {
        let path = self.render(|segment| match segment {
            Segment::Static(s) => s.clone(),
            Segment::Param(name) => format!("{{{}}}", name),
            Segment::CatchAll(name) => format!("{{*{}}}", name),
        });
        format!("{}{}", self.prefix, path)
    }

    /// Endpoint with parameter names erased; two files with equal shapes collide
    pub fn shape(&self) -> String {
        let path = self.render(|segment| match segment {
            Segment::Static(s) => s.clone(),
            Segment::Param(_) => "{}".to_string(),
            Segment::CatchAll(_) => "{*}".to_string(),
        });
        format!("{}{}", self.prefix, path)
    }

    /// Names of the path parameters, in order
    pub fn params(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) | Segment::CatchAll(name) => Some(name.as_str()),
                Segment::Static(_) => None,
            })
            .collect()
    }

    fn render<F>(&self, f: F) -> String
    where
        F: Fn(&Segment) -> String,
    {
        self.segments.iter().fold(String::new(), |mut path, segment| {
            path.push('/');
            path.push_str(&f(segment));
            path
        })
    }
}

fn parse_segment(raw: &str) -> std::result::Result<Segment, String> {
    if let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let (name, catch_all) = match inner.strip_prefix("...") {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if !is_param_name(name) {
            return Err(format!("invalid parameter name {:?}", name));
        }
        return Ok(if catch_all {
            Segment::CatchAll(name.to_string())
        } else {
            Segment::Param(name.to_string())
        });
    }

    if raw.contains(['[', ']', '{', '}']) {
        return Err(format!(
            "segment {:?} mixes brackets with text; parameters must fill a whole segment",
            raw
        ));
    }
    if raw.starts_with([':', '*']) {
        return Err(format!("segment {:?} starts with a reserved character", raw));
    }
    Ok(Segment::Static(raw.to_string()))
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Recursively list route files under `source.root`, sorted by path
///
/// Any error while enumerating, including a missing root, fails the whole scan.
pub fn discover(source: &RouteSource) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(&source.root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) == Some(source.extension.as_str()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
