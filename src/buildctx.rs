//! Import path resolution against a Go-style build context.
//!
//! Mirrors the `go/build` "find only" lookup the original pipeline relied
//! on: an import path resolves to the first source root that contains it
//! as a directory. Roots default to `$GOPATH/src` entries plus
//! `$GOROOT/src`; tests inject their own roots.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    roots: Vec<PathBuf>,
}

impl BuildContext {
    /// Build context from `GOPATH` / `GOROOT`.
    pub fn from_env() -> Self {
        let mut roots = Vec::new();
        if let Ok(gopath) = std::env::var("GOPATH") {
            for entry in std::env::split_paths(&gopath) {
                if !entry.as_os_str().is_empty() {
                    roots.push(entry.join("src"));
                }
            }
        }
        if let Ok(goroot) = std::env::var("GOROOT") {
            if !goroot.is_empty() {
                roots.push(PathBuf::from(goroot).join("src"));
            }
        }
        Self { roots }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Resolves an import path to its source directory.
    pub fn import(&self, path: &str) -> Result<PathBuf, String> {
        if path.is_empty() {
            return Err("empty import path".to_string());
        }
        let rel = import_path_to_rel(path);
        for root in &self.roots {
            let dir = root.join(&rel);
            if dir.is_dir() {
                return Ok(dir);
            }
        }
        Err(format!("cannot find package {path:?} in any source root"))
    }
}

/// Strips the quotes of an import path literal as written (interpreted or
/// raw string). Import paths never contain escapes, so the body is taken
/// verbatim.
pub fn unquote(lit: &str) -> Option<&str> {
    let bytes = lit.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'`' && bytes[bytes.len() - 1] == b'`'))
    {
        Some(&lit[1..lit.len() - 1])
    } else {
        None
    }
}

/// Import paths always use forward slashes; convert for the host OS.
pub fn import_path_to_rel(path: &str) -> PathBuf {
    let mut rel = PathBuf::new();
    for part in path.split('/') {
        rel.push(part);
    }
    rel
}

/// Renders a filesystem-relative path back as a slash-separated import
/// path.
pub fn rel_to_import_path(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_against_injected_roots() {
        let tmp = std::env::temp_dir().join("trygo-buildctx-test");
        let dir = tmp.join("some").join("pkg");
        std::fs::create_dir_all(&dir).unwrap();

        let ctx = BuildContext::with_roots(vec![tmp.clone()]);
        assert_eq!(ctx.import("some/pkg").unwrap(), dir);
        assert!(ctx.import("missing/pkg").is_err());
    }
}
