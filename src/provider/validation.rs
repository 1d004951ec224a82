//! Path validation
//!
//! Security checks for virtual paths before they touch the real
//! filesystem. Every sandbox operation resolves through here.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Validate that a virtual path is safe (no directory traversal).
pub fn is_safe_path(path: &str) -> bool {
    !path.split(['/', '\\']).any(|part| part == "..")
}

/// Resolve a virtual path against the sandbox root.
///
/// Leading slashes are stripped (virtual paths are rooted at the sandbox),
/// traversal components are rejected as permission-denied.
pub fn resolve_virtual_path(root: &Path, virtual_path: &str) -> Result<PathBuf, StorageError> {
    let trimmed = virtual_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(StorageError::InvalidState("empty path".to_string()));
    }
    if !is_safe_path(trimmed) {
        return Err(StorageError::PermissionDenied(virtual_path.to_string()));
    }
    Ok(root.join(trimmed))
}

/// Resolve a virtual directory path; empty or "/" means the root itself.
pub fn resolve_virtual_dir(root: &Path, virtual_path: &str) -> Result<PathBuf, StorageError> {
    let trimmed = virtual_path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Ok(root.to_path_buf());
    }
    if !is_safe_path(trimmed) {
        return Err(StorageError::PermissionDenied(virtual_path.to_string()));
    }
    Ok(root.join(trimmed))
}

/// Join a directory's virtual path with a child name.
pub fn join_virtual(dir: &str, name: &str) -> String {
    let base = dir.trim_end_matches('/');
    if base.is_empty() {
        format!("/{}", name)
    } else if base.starts_with('/') {
        format!("{}/{}", base, name)
    } else {
        format!("/{}/{}", base, name)
    }
}
