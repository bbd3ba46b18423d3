//! In-memory identity provider for tests and offline development.

use crate::auth::AuthProvider;
use crate::error::AppResult;
use async_trait::async_trait;
use log::info;
use shared::{Credentials, Session};
use std::sync::Arc;
use tokio::sync::watch;

/// Fake identity provider: any credentials succeed, the owner id is derived
/// from the email local part.
#[derive(Clone)]
pub struct MemoryAuth {
    session_tx: Arc<watch::Sender<Option<Session>>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            session_tx: Arc::new(session_tx),
        }
    }

    /// Provider that starts already signed in as `owner_id`
    pub fn signed_in(owner_id: &str) -> Self {
        let auth = Self::new();
        auth.session_tx.send_replace(Some(Session {
            owner_id: owner_id.to_string(),
            email: None,
            access_token: format!("token-{}", owner_id),
        }));
        auth
    }

    /// Force-expire the session, as the real provider does on token expiry
    pub fn expire_session(&self) {
        self.session_tx.send_replace(None);
    }

    fn session_for(credentials: &Credentials) -> Session {
        let owner_id = credentials
            .email
            .split('@')
            .next()
            .unwrap_or(credentials.email.as_str())
            .to_string();
        Session {
            owner_id,
            email: Some(credentials.email.clone()),
            access_token: "memory-token".to_string(),
        }
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_session(&self) -> Option<Session> {
        self.session_tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> AppResult<Session> {
        let session = Self::session_for(credentials);
        info!("memory sign-in for {}", session.owner_id);
        self.session_tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> AppResult<Option<Session>> {
        // No confirmation step in the fake; sign-up behaves like sign-in
        self.sign_in_with_password(credentials).await.map(Some)
    }

    async fn sign_out(&self) -> AppResult<()> {
        self.session_tx.send_replace(None);
        Ok(())
    }
}
