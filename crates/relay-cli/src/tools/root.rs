//! Working-root containment

use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};

use super::ToolError;

/// The directory every tool call is confined to.
///
/// Canonicalized once at construction; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingRoot {
    path: PathBuf,
}

impl WorkingRoot {
    /// Canonicalize `path` and use it as the sandbox root. The directory must exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let canonical = path
            .canonicalize()
            .with_context(|| format!("Working directory {} is not accessible", path.display()))?;

        if !canonical.is_dir() {
            bail!("Working directory {} is not a directory", canonical.display());
        }

        Ok(Self { path: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve `relative` against the root and verify it stays inside.
    ///
    /// `..` and `.` are folded lexically, then the deepest existing ancestor is
    /// canonicalized so symlinks are followed. Containment is an ancestor check
    /// on path components, so `/work2` never passes for a root of `/work`.
    pub fn resolve(&self, relative: &str, action: &'static str) -> Result<PathBuf, ToolError> {
        let escape = || ToolError::OutOfSandbox {
            action,
            path: relative.to_string(),
        };

        let normalized = normalize(&self.path.join(relative));
        let resolved = canonicalize_lenient(&normalized).ok_or_else(escape)?;

        if resolved.starts_with(&self.path) {
            Ok(resolved)
        } else {
            tracing::warn!(path = relative, root = %self.path.display(), "Rejected path outside working root");
            Err(escape())
        }
    }
}

impl std::fmt::Display for WorkingRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the longest existing prefix and re-append the missing tail.
///
/// Returns `None` when an entry exists but cannot be canonicalized (a dangling
/// symlink), since its eventual target cannot be checked.
fn canonicalize_lenient(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut out = canonical;
            for name in missing.iter().rev() {
                out.push(name);
            }
            return Some(out);
        }

        if existing.symlink_metadata().is_ok() {
            return None;
        }

        missing.push(existing.file_name()?.to_os_string());
        existing = existing.parent()?;
    }
}
