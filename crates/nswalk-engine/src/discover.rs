//! Shared-object discovery for native engine backends.

use std::env;
use std::path::{Path, PathBuf};

use nswalk_core::{ErrorInfo, NsError};

/// Environment variable naming the engine install root.
pub const ENGINE_PATH_VAR: &str = "NSWALK_ENGINE_PATH";

/// Resolves the filesystem location of an engine shared object.
///
/// Resolution order: an absolute `spec` is used as-is; otherwise `spec` is
/// joined onto the [`ENGINE_PATH_VAR`] root when set, and finally onto the
/// directory containing the running executable. The resolved path must
/// exist; loading happens separately.
pub fn resolve_engine_path(spec: &Path) -> Result<PathBuf, NsError> {
    let candidate = if spec.is_absolute() {
        spec.to_path_buf()
    } else if let Some(root) = env::var_os(ENGINE_PATH_VAR) {
        PathBuf::from(root).join(spec)
    } else {
        install_dir()?.join(spec)
    };
    if !candidate.exists() {
        return Err(NsError::Engine(
            ErrorInfo::new("engine.not_found", "engine shared object not found")
                .with_context("path", candidate.display().to_string())
                .with_hint(format!(
                    "pass an absolute path or set {ENGINE_PATH_VAR} to the install root"
                )),
        ));
    }
    Ok(candidate)
}

fn install_dir() -> Result<PathBuf, NsError> {
    let exe = env::current_exe().map_err(|err| {
        NsError::Engine(ErrorInfo::new("engine.install_dir", err.to_string()))
    })?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        NsError::Engine(ErrorInfo::new(
            "engine.install_dir",
            "executable path has no parent directory",
        ))
    })
}
