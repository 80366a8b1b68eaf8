use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::SaveError;

/// Name for a downloaded photo: the URL's last path segment without its
/// query string, forced to end in `.png`.
pub fn download_filename(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or("");
    let segment = without_query.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return "image.png".to_string();
    }
    if segment.ends_with(".png") {
        segment.to_string()
    } else {
        format!("{segment}.png")
    }
}

/// Where a save will go, decided on the UI thread before any work starts.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveTarget {
    /// Write into this directory, avoiding name collisions.
    Directory(PathBuf),
    /// Exact path picked in a save dialog.
    File(PathBuf),
}

impl SaveTarget {
    pub fn choose(config: &AppConfig, suggested_name: &str) -> Result<Self, SaveError> {
        if !config.ask_save_location {
            return Ok(Self::Directory(config.resolved_download_dir()));
        }
        rfd::FileDialog::new()
            .set_directory(config.resolved_download_dir())
            .set_file_name(suggested_name)
            .add_filter("PNG image", &["png"])
            .save_file()
            .map(Self::File)
            .ok_or(SaveError::Cancelled)
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SaveError> {
        let path = match self {
            Self::Directory(dir) => {
                std::fs::create_dir_all(dir).map_err(|source| SaveError::Io {
                    path: dir.clone(),
                    source,
                })?;
                unique_path(dir, name)
            }
            Self::File(path) => path.clone(),
        };
        std::fs::write(&path, bytes).map_err(|source| SaveError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// `dir/name`, or `dir/stem (n).ext` with the first free `n`.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    let ext = as_path.extension().and_then(|e| e.to_str());
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
