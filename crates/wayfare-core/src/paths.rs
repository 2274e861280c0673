// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Application directory layout
//
// Resolved once at startup and passed explicitly into every component.
// No component discovers or rebuilds its own storage location per call.

use crate::types::AppError;
use std::fs;
use std::path::{Path, PathBuf};

/// The app-private directories every store and the materializer write under.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Durable data: the gallery table and materialized gallery images.
    pub data_dir: PathBuf,
    /// Cache: camera captures encoded on the fly.
    pub cache_dir: PathBuf,
    /// Configuration: settings and the auth session.
    pub config_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the platform directories for the installed application.
    pub fn discover() -> Result<Self, AppError> {
        let dirs = directories::ProjectDirs::from("com", "wayfare", "wayfare").ok_or_else(
            || AppError::Io("Could not determine application directories".to_string()),
        )?;

        Self::prepare(
            dirs.data_dir().to_path_buf(),
            dirs.cache_dir().to_path_buf(),
            dirs.config_dir().to_path_buf(),
        )
    }

    /// Root every directory under the given path. Used by tests and
    /// portable installs.
    pub fn rooted_at(root: &Path) -> Result<Self, AppError> {
        Self::prepare(root.join("data"), root.join("cache"), root.join("config"))
    }

    fn prepare(
        data_dir: PathBuf,
        cache_dir: PathBuf,
        config_dir: PathBuf,
    ) -> Result<Self, AppError> {
        for dir in [&data_dir, &cache_dir, &config_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| AppError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;
        }

        Ok(Self {
            data_dir,
            cache_dir,
            config_dir,
        })
    }

    /// Directory materialized gallery images are copied into.
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }

    /// The local image table file.
    pub fn gallery_file(&self) -> PathBuf {
        self.data_dir.join("gallery.json")
    }

    /// The settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// The persisted auth session file.
    pub fn session_file(&self) -> PathBuf {
        self.config_dir.join("session.json")
    }
}
