// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - HTTP document-store backend
//
// Talks to the remote collection over a plain JSON REST surface:
//   GET    {base}/collections/{collection}/documents
//   POST   {base}/collections/{collection}/documents
//   DELETE {base}/collections/{collection}/documents/{id}

use crate::remote::backend::{DestinationBackend, RemoteError};
use crate::settings::AppSettings;
use crate::types::Destination;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub struct HttpBackend {
    http_client: Client,
    base_url: String,
    collection: String,
}

#[derive(Deserialize)]
struct DocumentList {
    documents: Vec<Destination>,
}

impl HttpBackend {
    pub fn new(settings: &AppSettings) -> Result<Self, RemoteError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(|e| RemoteError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            collection: settings.collection.clone(),
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/collections/{}/documents",
            self.base_url, self.collection
        )
    }

    fn map_send_error(err: reqwest::Error) -> RemoteError {
        if err.is_connect() {
            RemoteError::ConnectionRefused(err.to_string())
        } else if err.is_timeout() {
            RemoteError::Timeout(err.to_string())
        } else {
            RemoteError::Request(err.to_string())
        }
    }

    fn check_status(status: StatusCode) -> Result<(), RemoteError> {
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(RemoteError::PermissionDenied(format!(
                "Provider returned {}",
                status
            )))
        } else {
            Err(RemoteError::Request(format!(
                "Provider returned {}",
                status
            )))
        }
    }
}

impl DestinationBackend for HttpBackend {
    async fn list(&self) -> Result<Vec<Destination>, RemoteError> {
        let response = self
            .http_client
            .get(self.documents_url())
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check_status(response.status())?;

        let list: DocumentList = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("Failed to parse document list: {}", e)))?;

        Ok(list.documents)
    }

    async fn add(&self, destination: &Destination) -> Result<Destination, RemoteError> {
        let response = self
            .http_client
            .post(self.documents_url())
            .json(destination)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check_status(response.status())?;

        response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(format!("Failed to parse stored document: {}", e)))
    }

    async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        // An empty id would address the collection itself.
        if id.is_empty() {
            return Err(RemoteError::Request(
                "Document id must not be empty".to_string(),
            ));
        }

        let url = format!("{}/{}", self.documents_url(), id);

        let response = self
            .http_client
            .delete(&url)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        Self::check_status(response.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_url_strips_trailing_slash() {
        let settings = AppSettings {
            api_base_url: "http://destinations.example:9000/".to_string(),
            ..AppSettings::default()
        };

        let backend = HttpBackend::new(&settings).unwrap();
        assert_eq!(
            backend.documents_url(),
            "http://destinations.example:9000/collections/tempat_wisata/documents"
        );
    }

    #[tokio::test]
    async fn test_delete_empty_id_fails_before_any_request() {
        // An unroutable base URL proves no request is attempted.
        let settings = AppSettings {
            api_base_url: "http://0.0.0.0:1".to_string(),
            ..AppSettings::default()
        };
        let backend = HttpBackend::new(&settings).unwrap();

        assert!(matches!(
            backend.delete("").await,
            Err(RemoteError::Request(_))
        ));
    }
}
