// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Destination upload orchestrator
//
// Sequences one add-destination operation: materialize the photo, record it
// in the local gallery, then write the destination document. On any step's
// failure the already-completed local steps are compensated in reverse
// order; failed uploads must not leak local storage.

use crate::gallery::ImageStore;
use crate::materializer::Materializer;
use crate::remote::{DestinationBackend, DestinationRepository};
use crate::types::{AppError, Destination, NewDestination};
use std::sync::Arc;
use tokio::sync::watch;

/// Where an in-flight upload currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Materializing,
    PersistingLocal,
    WritingRemote,
    Done,
    Failed,
}

/// Composes the materializer, the local image store, and the destination
/// repository into the add-destination flow.
///
/// Steps run strictly sequentially within one call. Concurrent calls are
/// not mutually excluded here; a frontend wanting at-most-one-in-flight
/// must disable its submit control itself.
pub struct UploadOrchestrator<B: DestinationBackend> {
    materializer: Materializer,
    images: Arc<ImageStore>,
    destinations: Arc<DestinationRepository<B>>,
    phase: watch::Sender<UploadPhase>,
}

impl<B: DestinationBackend> UploadOrchestrator<B> {
    pub fn new(
        materializer: Materializer,
        images: Arc<ImageStore>,
        destinations: Arc<DestinationRepository<B>>,
    ) -> Self {
        let (phase, _) = watch::channel(UploadPhase::Idle);

        Self {
            materializer,
            images,
            destinations,
            phase,
        }
    }

    /// Observe the phase of the in-flight upload, for progress UI.
    pub fn watch_phase(&self) -> watch::Receiver<UploadPhase> {
        self.phase.subscribe()
    }

    fn set_phase(&self, phase: UploadPhase) {
        self.phase.send_replace(phase);
    }

    /// Add a destination with a photo.
    ///
    /// Validation failures happen before any side effect. No step is
    /// retried; the caller decides whether to re-invoke the whole
    /// operation.
    pub async fn add_destination(&self, request: NewDestination) -> Result<Destination, AppError> {
        request.validate()?;

        self.set_phase(UploadPhase::Materializing);
        let local_path = match self.materializer.materialize(&request.source).await {
            Ok(path) => path,
            Err(e) => return self.fail(e),
        };

        self.set_phase(UploadPhase::PersistingLocal);
        let record = match self.images.insert(&local_path) {
            Ok(record) => record,
            Err(e) => {
                // Compensate: the materialized file is the only side effect so far.
                if let Err(cleanup) = tokio::fs::remove_file(&local_path).await {
                    tracing::warn!(path = %local_path.display(), "cleanup of materialized file failed: {}", cleanup);
                }
                return self.fail(e);
            }
        };

        self.set_phase(UploadPhase::WritingRemote);
        let destination = Destination::new(
            request.name,
            request.description,
            Some(local_path.to_string_lossy().into_owned()),
        );

        match self.destinations.add(destination).await {
            Ok(stored) => {
                self.set_phase(UploadPhase::Done);
                tracing::info!(id = %stored.id, name = %stored.name, "upload complete");
                Ok(stored)
            }
            Err(e) => {
                // Compensate newest-first: gallery record, then the file.
                if let Err(cleanup) = self.images.remove(record.id) {
                    tracing::warn!(id = record.id, "cleanup of image record failed: {}", cleanup);
                }
                if let Err(cleanup) = tokio::fs::remove_file(&local_path).await {
                    tracing::warn!(path = %local_path.display(), "cleanup of materialized file failed: {}", cleanup);
                }
                self.fail(e)
            }
        }
    }

    fn fail(&self, error: AppError) -> Result<Destination, AppError> {
        self.set_phase(UploadPhase::Failed);
        tracing::warn!("upload failed: {}", error);
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::AppPaths;
    use crate::remote::{MemoryBackend, RemoteError};
    use crate::types::ImageSource;
    use std::path::PathBuf;
    use std::time::Duration;

    struct Fixture {
        orchestrator: UploadOrchestrator<MemoryBackend>,
        images: Arc<ImageStore>,
        destinations: Arc<DestinationRepository<MemoryBackend>>,
        _tmp: tempfile::TempDir,
        picked: PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::rooted_at(tmp.path()).unwrap();

        let picked = tmp.path().join("picked.jpg");
        std::fs::write(&picked, b"jpeg bytes").unwrap();

        let images = Arc::new(ImageStore::open(paths.gallery_file()).unwrap());
        let destinations = Arc::new(DestinationRepository::new(
            MemoryBackend::new(),
            Duration::from_millis(10),
        ));
        let orchestrator = UploadOrchestrator::new(
            Materializer::new(&paths),
            images.clone(),
            destinations.clone(),
        );

        Fixture {
            orchestrator,
            images,
            destinations,
            _tmp: tmp,
            picked,
        }
    }

    fn request(fx: &Fixture, name: &str) -> NewDestination {
        NewDestination {
            name: name.to_string(),
            description: format!("about {}", name),
            source: ImageSource::File(fx.picked.clone()),
        }
    }

    #[tokio::test]
    async fn test_successful_add_persists_everywhere() {
        let fx = fixture();

        let stored = fx
            .orchestrator
            .add_destination(request(&fx, "Bromo"))
            .await
            .unwrap();

        // The destination references a file that exists...
        let image_ref = PathBuf::from(stored.image_ref.as_deref().unwrap());
        assert!(image_ref.exists());

        // ...the gallery has the matching record...
        let records = fx.images.all_images();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].local_path, image_ref);

        // ...and the remote set contains the document.
        let mut subscription = fx.destinations.subscribe();
        loop {
            if let Some(crate::remote::DestinationUpdate::Snapshot(documents)) =
                subscription.recv().await
            {
                if !documents.is_empty() {
                    assert_eq!(documents[0].id, stored.id);
                    break;
                }
            }
        }
        fx.destinations.shutdown();
    }

    #[tokio::test]
    async fn test_validation_failure_has_zero_side_effects() {
        let fx = fixture();

        let result = fx
            .orchestrator
            .add_destination(NewDestination {
                name: "  ".to_string(),
                description: "ghost town".to_string(),
                source: ImageSource::File(fx.picked.clone()),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(fx.images.count(), 0);
        let images_dir = fx._tmp.path().join("data/images");
        assert!(!images_dir.exists() || std::fs::read_dir(images_dir).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_materialize_failure_aborts_with_nothing_persisted() {
        let fx = fixture();

        let result = fx
            .orchestrator
            .add_destination(NewDestination {
                name: "Bromo".to_string(),
                description: "volcano sunrise".to_string(),
                source: ImageSource::File(PathBuf::from("/nonexistent/picked.jpg")),
            })
            .await;

        assert!(matches!(result, Err(AppError::Io(_))));
        assert_eq!(fx.images.count(), 0);
    }

    /// Backend that rejects every write.
    struct RejectingBackend;

    impl DestinationBackend for RejectingBackend {
        async fn list(&self) -> Result<Vec<Destination>, RemoteError> {
            Ok(Vec::new())
        }

        async fn add(&self, _: &Destination) -> Result<Destination, RemoteError> {
            Err(RemoteError::PermissionDenied("writes disabled".to_string()))
        }

        async fn delete(&self, _: &str) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_remote_write_failure_compensates_local_state() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::rooted_at(tmp.path()).unwrap();
        let picked = tmp.path().join("picked.jpg");
        std::fs::write(&picked, b"jpeg bytes").unwrap();

        let images = Arc::new(ImageStore::open(paths.gallery_file()).unwrap());
        let destinations = Arc::new(DestinationRepository::new(
            RejectingBackend,
            Duration::from_millis(10),
        ));
        let orchestrator =
            UploadOrchestrator::new(Materializer::new(&paths), images.clone(), destinations);

        let result = orchestrator
            .add_destination(NewDestination {
                name: "Bromo".to_string(),
                description: "volcano sunrise".to_string(),
                source: ImageSource::File(picked),
            })
            .await;

        assert!(matches!(result, Err(AppError::RemoteWrite(_))));

        // Both local steps were rolled back.
        assert_eq!(images.count(), 0);
        assert!(std::fs::read_dir(paths.images_dir())
            .unwrap()
            .next()
            .is_none());
    }

    #[tokio::test]
    async fn test_two_sequential_adds_reach_the_remote_set() {
        let fx = fixture();

        fx.orchestrator
            .add_destination(request(&fx, "Bromo"))
            .await
            .unwrap();
        fx.orchestrator
            .add_destination(request(&fx, "Ijen"))
            .await
            .unwrap();

        let mut subscription = fx.destinations.subscribe();
        loop {
            if let Some(crate::remote::DestinationUpdate::Snapshot(documents)) =
                subscription.recv().await
            {
                if documents.len() == 2 {
                    let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
                    assert_eq!(names, vec!["Bromo", "Ijen"]);
                    break;
                }
            }
        }
        fx.destinations.shutdown();
    }

    #[tokio::test]
    async fn test_phase_ends_done_on_success_and_failed_on_error() {
        let fx = fixture();
        let phase = fx.orchestrator.watch_phase();
        assert_eq!(*phase.borrow(), UploadPhase::Idle);

        fx.orchestrator
            .add_destination(request(&fx, "Bromo"))
            .await
            .unwrap();
        assert_eq!(*phase.borrow(), UploadPhase::Done);

        let _ = fx
            .orchestrator
            .add_destination(NewDestination {
                name: "Ijen".to_string(),
                description: "blue fire".to_string(),
                source: ImageSource::File(PathBuf::from("/nonexistent/picked.jpg")),
            })
            .await;
        assert_eq!(*phase.borrow(), UploadPhase::Failed);
    }
}
