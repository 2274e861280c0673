// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Authentication boundary
//
// The provider itself is external; the core only signs in with a
// credential pair and keeps the resulting session in a local JSON file.
// Startup reads that file to decide whether a user is already signed in.

use crate::settings::AppSettings;
use crate::types::{AppError, UserSession};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

/// HTTP client for the auth provider's sign-in endpoint.
pub struct AuthClient {
    http_client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    message: String,
}

impl AuthClient {
    pub fn new(settings: &AppSettings) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sign in with an email/password pair.
    ///
    /// Failures carry the provider's textual reason so the frontend can
    /// show it inline on the login form.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password must not be empty".to_string(),
            ));
        }

        let url = format!("{}/auth/sign_in", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&SignInRequest { email, password })
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Login failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let reason = response
                .json::<AuthErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("Provider returned {}", status));
            return Err(AppError::Auth(reason));
        }

        response
            .json::<UserSession>()
            .await
            .map_err(|e| AppError::Auth(format!("Invalid sign-in response: {}", e)))
    }
}

/// The persisted "current signed-in user, or none" check.
pub struct SessionStore {
    session: RwLock<Option<UserSession>>,
    file_path: PathBuf,
}

impl SessionStore {
    /// Open the session store at the given file, loading from disk if available
    pub fn open(file_path: PathBuf) -> Result<Self, AppError> {
        let session = if file_path.exists() {
            let content = fs::read_to_string(&file_path)
                .map_err(|e| AppError::Io(format!("Failed to read session: {}", e)))?;

            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse session, treating as signed out: {}", e);
                None
            })
        } else {
            None
        };

        Ok(Self {
            session: RwLock::new(session),
            file_path,
        })
    }

    /// The currently signed-in user, or none.
    pub fn current(&self) -> Option<UserSession> {
        self.session.read().unwrap().clone()
    }

    /// Record a fresh sign-in.
    pub fn store(&self, session: UserSession) -> Result<(), AppError> {
        {
            let mut current = self.session.write().unwrap();
            *current = Some(session);
        }
        self.persist()
    }

    /// Sign out.
    pub fn clear(&self) -> Result<(), AppError> {
        {
            let mut current = self.session.write().unwrap();
            *current = None;
        }
        self.persist()
    }

    fn persist(&self) -> Result<(), AppError> {
        let session = self.session.read().unwrap();

        let content = serde_json::to_string_pretty(&*session)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize session: {}", e)))?;

        fs::write(&self.file_path, content)
            .map_err(|e| AppError::Io(format!("Failed to write session: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_credentials_fail_before_any_request() {
        // An unroutable base URL proves no request is attempted.
        let settings = AppSettings {
            api_base_url: "http://0.0.0.0:1".to_string(),
            ..AppSettings::default()
        };
        let client = AuthClient::new(&settings).unwrap();

        let result = client.sign_in("", "secret").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = client.sign_in("user@example.com", "").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_session_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("session.json");

        let store = SessionStore::open(path.clone()).unwrap();
        assert!(store.current().is_none());

        let session = UserSession {
            user_id: "u-1".to_string(),
            email: "user@example.com".to_string(),
            id_token: "token".to_string(),
        };
        store.store(session.clone()).unwrap();

        let reopened = SessionStore::open(path).unwrap();
        assert_eq!(reopened.current(), Some(session));
    }

    #[test]
    fn test_clear_signs_out() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SessionStore::open(tmp.path().join("session.json")).unwrap();

        store
            .store(UserSession {
                user_id: "u-1".to_string(),
                email: "user@example.com".to_string(),
                id_token: "token".to_string(),
            })
            .unwrap();
        store.clear().unwrap();

        assert!(store.current().is_none());
    }
}
