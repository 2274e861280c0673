// SPDX-License-Identifier: AGPL-3.0
// Wayfare CLI - Application State

use std::sync::Arc;
use std::time::Duration;
use wayfare_core::{
    AppError, AppPaths, AuthClient, DestinationRepository, HttpBackend, ImageStore, Materializer,
    SessionStore, SettingsStore, UploadOrchestrator, UserSession,
};

/// Everything the subcommands need, initialized once at startup.
pub struct AppState {
    pub settings: SettingsStore,
    pub session: SessionStore,
    pub auth: AuthClient,
    pub images: Arc<ImageStore>,
    pub materializer: Materializer,
    pub destinations: Arc<DestinationRepository<HttpBackend>>,
    pub orchestrator: UploadOrchestrator<HttpBackend>,
}

impl AppState {
    /// Create new application state with all stores initialized
    pub fn new() -> Result<Self, AppError> {
        let paths = AppPaths::discover()?;
        let settings = SettingsStore::open(paths.settings_file())?;
        let session = SessionStore::open(paths.session_file())?;

        let config = settings.get();
        let auth = AuthClient::new(&config)?;
        let backend =
            HttpBackend::new(&config).map_err(|e| AppError::RemoteWrite(e.to_string()))?;

        let images = Arc::new(ImageStore::open(paths.gallery_file())?);
        let materializer = Materializer::new(&paths);
        let destinations = Arc::new(DestinationRepository::new(
            backend,
            Duration::from_millis(config.poll_interval_ms),
        ));
        let orchestrator =
            UploadOrchestrator::new(materializer.clone(), images.clone(), destinations.clone());

        Ok(Self {
            settings,
            session,
            auth,
            images,
            materializer,
            destinations,
            orchestrator,
        })
    }

    /// The signed-in user, or an error telling the caller to log in.
    pub fn require_session(&self) -> Result<UserSession, AppError> {
        self.session
            .current()
            .ok_or_else(|| AppError::Auth("Not signed in. Run `wayfare login` first.".to_string()))
    }
}
