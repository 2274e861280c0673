// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// A travel destination stored in the remote `tempat_wisata` collection.
///
/// The wire field names (`nama`, `deskripsi`, `gambarUriString`, `gambarResId`)
/// are fixed by the existing backend and must not change. The `id` field is
/// generated client-side at creation time and is the only key deletion should
/// rely on; `delete_by_name` exists for the legacy bulk path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Unique record id, generated at creation. Older documents written
    /// before ids were introduced decode with an empty id.
    #[serde(default)]
    pub id: String,

    /// Destination name, non-empty when persisted.
    #[serde(rename = "nama")]
    pub name: String,

    /// Free-form description.
    #[serde(rename = "deskripsi")]
    pub description: String,

    /// Local file path or remote URI of the destination photo.
    #[serde(rename = "gambarUriString")]
    pub image_ref: Option<String>,

    /// Bundled fallback image id, used when no photo was uploaded.
    #[serde(rename = "gambarResId")]
    pub image_resource: Option<i64>,

    /// Creation time (UTC). Defaults on decode for legacy documents.
    #[serde(rename = "createdAt", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Destination {
    /// Create a new destination with a fresh unique id.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            image_ref,
            image_resource: None,
            created_at: Utc::now(),
        }
    }
}

/// One gallery photo persisted in the local image table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Auto-increment primary key, assigned by the store.
    pub id: i64,
    /// Absolute path of the materialized file.
    pub local_path: PathBuf,
    /// Insertion time (UTC).
    pub added_at: DateTime<Utc>,
}

/// An opaque handle to a user-picked image.
///
/// The picking UI itself (file chooser, camera) lives in the frontends;
/// the core only consumes the result.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A readable file the user selected from their device.
    File(PathBuf),
    /// Raw pixels from a camera capture, not yet on disk.
    Bitmap(image::DynamicImage),
}

/// Validated input for the add-destination flow.
#[derive(Debug, Clone)]
pub struct NewDestination {
    pub name: String,
    pub description: String,
    pub source: ImageSource,
}

impl NewDestination {
    /// Check the request before any side effect takes place.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name must not be empty".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation(
                "Description must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// The currently signed-in user, as returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("File I/O error: {0}")]
    Io(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    #[error("Remote listener error: {0}")]
    RemoteListen(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}
