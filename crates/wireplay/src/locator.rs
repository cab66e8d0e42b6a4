//! Fixture-directory computation. Pure path arithmetic, no I/O, never fails:
//! odd identifiers just produce odd-looking (but valid) paths.

use crate::scope::Scope;
use std::path::{Path, PathBuf};

/// Compute the fixture directory for `scope` under `parent_folder`.
///
/// An explicit non-empty `explicit_folder` always wins and ignores the scope
/// identifiers; otherwise the directory name is derived from the scope's
/// whitespace-stripped identifiers. Deterministic: the controller relies on
/// the same inputs yielding the same path at setup and cleanup.
pub fn locate(scope: &Scope, explicit_folder: Option<&str>, parent_folder: &Path) -> PathBuf {
    match explicit_folder {
        Some(folder) if !folder.is_empty() => parent_folder.join(folder),
        _ => parent_folder.join(scope.folder_component()),
    }
}
