// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Shared logic for all frontends
//
// This crate provides:
// - Destination, ImageRecord, and AppError types
// - SettingsStore for persistent settings
// - ImageStore, the local photo gallery with live reads
// - Materializer for copying picked images into app storage
// - DestinationRepository, the live remote destination collection
// - UploadOrchestrator sequencing one add-destination operation
// - AuthClient and SessionStore for the sign-in boundary
//
// Frontend-specific code lives in separate crates.

pub mod auth;
pub mod gallery;
pub mod materializer;
pub mod orchestrator;
pub mod paths;
pub mod remote;
pub mod settings;
pub mod types;

// Re-export commonly used items
pub use auth::{AuthClient, SessionStore};
pub use gallery::ImageStore;
pub use materializer::Materializer;
pub use orchestrator::{UploadOrchestrator, UploadPhase};
pub use paths::AppPaths;
pub use remote::{
    DestinationBackend, DestinationRepository, DestinationUpdate, HttpBackend, MemoryBackend,
    RemoteError, Subscription,
};
pub use settings::{AppSettings, SettingsStore};
pub use types::{AppError, Destination, ImageRecord, ImageSource, NewDestination, UserSession};
