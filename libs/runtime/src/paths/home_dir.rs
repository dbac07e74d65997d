use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user's home directory")]
    NoHome,
    #[error("failed to create home_dir '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the server home directory into an absolute path.
///
/// - `None` → `<user home>/<default_subdir>`
/// - `"~"` / `"~/x"` → expanded against the user's home
/// - relative paths → joined onto the current working directory
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let resolved = match configured {
        None => user_home()?.join(default_subdir),
        Some(raw) => expand(&raw)?,
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .map_err(|source| HomeDirError::Create {
                path: resolved.clone(),
                source,
            })?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute).map_err(|source| HomeDirError::Create {
            path: absolute.clone(),
            source,
        })?;
    }

    Ok(absolute)
}

fn expand(raw: &str) -> Result<PathBuf, HomeDirError> {
    let raw = raw.trim();
    if raw == "~" {
        return user_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn user_home() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    if let Some(appdata) = std::env::var_os("APPDATA") {
        return Ok(PathBuf::from(appdata));
    }
    dirs::home_dir().ok_or(HomeDirError::NoHome)
}
