// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Local image table
//
// The gallery is an append-mostly table of image records stored in a local
// JSON file. Live readers receive a full snapshot on every change.

use crate::types::{AppError, ImageRecord};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::watch;

/// File-based image table with live snapshot delivery.
///
/// One `ImageStore` is opened per process and shared via `Arc`; the
/// underlying file is never opened twice.
pub struct ImageStore {
    inner: RwLock<GalleryFile>,
    file_path: PathBuf,
    updates: watch::Sender<Vec<ImageRecord>>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct GalleryFile {
    /// Next auto-increment id to assign.
    next_id: i64,
    records: Vec<ImageRecord>,
}

impl Default for GalleryFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

impl ImageStore {
    /// Open the image table at the given file, loading from disk if available.
    ///
    /// A present but unreadable table is an error, not a silent reset.
    pub fn open(file_path: PathBuf) -> Result<Self, AppError> {
        let inner = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| AppError::Storage(format!("Failed to read image table: {}", e)))?;

            serde_json::from_str(&content)
                .map_err(|e| AppError::Storage(format!("Failed to parse image table: {}", e)))?
        } else {
            GalleryFile::default()
        };

        let (updates, _) = watch::channel(inner.records.clone());

        Ok(Self {
            inner: RwLock::new(inner),
            file_path,
            updates,
        })
    }

    /// Write the given table state to disk
    fn write_table(file_path: &Path, table: &GalleryFile) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(table).map_err(|e| {
            AppError::Serialization(format!("Failed to serialize image table: {}", e))
        })?;

        fs::write(file_path, content)
            .map_err(|e| AppError::Storage(format!("Failed to write image table: {}", e)))?;

        Ok(())
    }

    /// Append a new record for a materialized file and notify live readers.
    ///
    /// Memory never outruns the file: a failed write undoes the in-memory
    /// append, so snapshots, the file, and live readers stay in agreement.
    pub fn insert(&self, local_path: &Path) -> Result<ImageRecord, AppError> {
        let record = {
            let mut inner = self.inner.write().unwrap();
            let record = ImageRecord {
                id: inner.next_id,
                local_path: local_path.to_path_buf(),
                added_at: Utc::now(),
            };
            inner.next_id += 1;
            inner.records.push(record.clone());

            if let Err(e) = Self::write_table(&self.file_path, &inner) {
                inner.records.pop();
                inner.next_id -= 1;
                return Err(e);
            }
            record
        };

        self.notify();

        tracing::debug!(id = record.id, path = %record.local_path.display(), "image record inserted");
        Ok(record)
    }

    /// Remove a record by id. Used by the upload compensation path.
    pub fn remove(&self, id: i64) -> Result<(), AppError> {
        {
            let mut inner = self.inner.write().unwrap();
            let index = inner
                .records
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| AppError::Storage(format!("Image record not found: {}", id)))?;
            let removed = inner.records.remove(index);

            if let Err(e) = Self::write_table(&self.file_path, &inner) {
                inner.records.insert(index, removed);
                return Err(e);
            }
        }

        self.notify();
        Ok(())
    }

    fn notify(&self) {
        self.updates.send_replace(self.all_images());
    }

    /// Point-in-time snapshot of all records, insertion order.
    pub fn all_images(&self) -> Vec<ImageRecord> {
        self.inner.read().unwrap().records.clone()
    }

    /// Live read of the table.
    ///
    /// The receiver holds the current snapshot immediately and is notified
    /// with a fresh full snapshot after every insert or remove. Dropping the
    /// receiver ends delivery; nothing else keeps it alive.
    pub fn watch_images(&self) -> watch::Receiver<Vec<ImageRecord>> {
        self.updates.subscribe()
    }

    /// Number of records in the table.
    pub fn count(&self) -> usize {
        self.inner.read().unwrap().records.len()
    }
}
