// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Remote document-store seam
//
// The repository talks to the remote provider only through this trait.

use crate::types::Destination;
use std::future::Future;

/// Errors from the remote document provider
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Access to the remote destination collection.
///
/// Implementations must tolerate concurrent calls; the repository issues
/// listener polls and writes independently.
pub trait DestinationBackend: Send + Sync + 'static {
    /// Fetch the complete current set of documents, provider order.
    fn list(&self) -> impl Future<Output = Result<Vec<Destination>, RemoteError>> + Send;

    /// Write a new document and return it as stored.
    fn add(
        &self,
        destination: &Destination,
    ) -> impl Future<Output = Result<Destination, RemoteError>> + Send;

    /// Delete one document by its unique id.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
