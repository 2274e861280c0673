// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Local file materializer
//
// Copies or encodes a picked image into app-private storage and returns the
// resulting path. A returned path always names a file that exists.

use crate::paths::AppPaths;
use crate::types::{AppError, ImageSource};
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Materializes picked images into the app's own directories.
#[derive(Debug, Clone)]
pub struct Materializer {
    images_dir: PathBuf,
    cache_dir: PathBuf,
}

impl Materializer {
    pub fn new(paths: &AppPaths) -> Self {
        Self {
            images_dir: paths.images_dir(),
            cache_dir: paths.cache_dir.clone(),
        }
    }

    /// Materialize whatever the picker produced.
    pub async fn materialize(&self, source: &ImageSource) -> Result<PathBuf, AppError> {
        match source {
            ImageSource::File(path) => self.materialize_from_file(path).await,
            ImageSource::Bitmap(bitmap) => self.materialize_from_bitmap(bitmap).await,
        }
    }

    /// Copy a picked file into the images directory under a
    /// millisecond-timestamp name and return the new absolute path.
    ///
    /// A failed or partial copy removes the destination file before the
    /// error is returned; failed uploads must not leak local storage.
    pub async fn materialize_from_file(&self, source: &Path) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.images_dir)
            .await
            .map_err(|e| AppError::Io(format!("Failed to create images dir: {}", e)))?;

        let file_name = format!("image_{}.jpg", Utc::now().timestamp_millis());
        let destination = self.images_dir.join(file_name);

        match fs::copy(source, &destination).await {
            Ok(bytes) => {
                tracing::debug!(bytes, path = %destination.display(), "image materialized");
                Ok(destination)
            }
            Err(e) => {
                let _ = fs::remove_file(&destination).await;
                Err(AppError::Io(format!(
                    "Failed to copy {}: {}",
                    source.display(),
                    e
                )))
            }
        }
    }

    /// Encode captured pixels as a maximum-quality JPEG in the cache
    /// directory and return the new file's path.
    pub async fn materialize_from_bitmap(&self, bitmap: &DynamicImage) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|e| AppError::Io(format!("Failed to create cache dir: {}", e)))?;

        let destination = self.cache_dir.join(format!("{}.jpg", Uuid::new_v4()));

        // The encode is CPU-bound; keep it off the async path.
        let encode_result = {
            let bitmap = bitmap.clone();
            let path = destination.clone();
            tokio::task::spawn_blocking(move || -> Result<(), AppError> {
                let mut file = std::fs::File::create(&path)
                    .map_err(|e| AppError::Io(format!("Failed to create cache file: {}", e)))?;
                let encoder = JpegEncoder::new_with_quality(&mut file, 100);
                bitmap
                    .write_with_encoder(encoder)
                    .map_err(|e| AppError::Io(format!("JPEG encode failed: {}", e)))
            })
            .await
            .map_err(|e| AppError::Io(format!("Encode task failed: {}", e)))?
        };

        if let Err(e) = encode_result {
            let _ = fs::remove_file(&destination).await;
            return Err(e);
        }

        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn materializer(tmp: &tempfile::TempDir) -> Materializer {
        let paths = AppPaths::rooted_at(tmp.path()).unwrap();
        Materializer::new(&paths)
    }

    #[tokio::test]
    async fn test_file_source_is_copied_byte_for_byte() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("picked.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let path = materializer(&tmp)
            .materialize_from_file(&source)
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"jpeg bytes");
        assert!(path.starts_with(tmp.path().join("data/images")));
    }

    #[tokio::test]
    async fn test_missing_source_fails_without_leftovers() {
        let tmp = tempfile::tempdir().unwrap();
        let m = materializer(&tmp);

        let result = m
            .materialize_from_file(Path::new("/nonexistent/picked.jpg"))
            .await;

        assert!(matches!(result, Err(AppError::Io(_))));
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path().join("data/images"))
            .map(|d| d.collect())
            .unwrap_or_default();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_bitmap_is_encoded_into_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let bitmap = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([200, 80, 10])));

        let path = materializer(&tmp)
            .materialize_from_bitmap(&bitmap)
            .await
            .unwrap();

        assert!(path.exists());
        assert!(path.starts_with(tmp.path().join("cache")));

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }

    #[tokio::test]
    async fn test_materialize_dispatches_on_source() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("picked.jpg");
        std::fs::write(&source, b"x").unwrap();

        let path = materializer(&tmp)
            .materialize(&ImageSource::File(source))
            .await
            .unwrap();
        assert!(path.exists());
    }
}
