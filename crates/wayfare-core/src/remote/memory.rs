// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - In-memory document backend
//
// Backend for tests and offline development. Holds documents in process
// memory with the same contract as the HTTP backend.

use crate::remote::backend::{DestinationBackend, RemoteError};
use crate::types::Destination;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryBackend {
    documents: RwLock<Vec<Destination>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-seeded collection.
    pub fn with_documents(documents: Vec<Destination>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }
}

impl DestinationBackend for MemoryBackend {
    async fn list(&self) -> Result<Vec<Destination>, RemoteError> {
        Ok(self.documents.read().unwrap().clone())
    }

    async fn add(&self, destination: &Destination) -> Result<Destination, RemoteError> {
        let mut documents = self.documents.write().unwrap();
        documents.push(destination.clone());
        Ok(destination.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        if id.is_empty() {
            return Err(RemoteError::Request(
                "Document id must not be empty".to_string(),
            ));
        }

        let mut documents = self.documents.write().unwrap();
        let original_len = documents.len();
        documents.retain(|d| d.id != id);

        if documents.len() == original_len {
            return Err(RemoteError::Request(format!("Document not found: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_then_list() {
        let backend = MemoryBackend::new();
        let destination = Destination::new("Bromo", "volcano sunrise", None);

        backend.add(&destination).await.unwrap();
        let documents = backend.list().await.unwrap();

        assert_eq!(documents, vec![destination]);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_fails() {
        let backend = MemoryBackend::new();
        assert!(backend.delete("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_empty_id_is_rejected() {
        // Documents written before ids were introduced decode with an
        // empty id; an empty-id delete must not match them.
        let legacy = Destination {
            id: String::new(),
            ..Destination::new("Bromo", "volcano sunrise", None)
        };
        let backend = MemoryBackend::with_documents(vec![legacy]);

        assert!(backend.delete("").await.is_err());
        assert_eq!(backend.list().await.unwrap().len(), 1);
    }
}
