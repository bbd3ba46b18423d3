//! Hosted identity provider client (GoTrue-style password auth).

use crate::auth::AuthProvider;
use crate::config::RemoteConfig;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use log::{error, info};
use serde::Deserialize;
use shared::{Credentials, Session};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

/// Token-grant response; `access_token` is absent when the provider requires
/// email confirmation before issuing a session.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
    /// Sign-up without auto-confirm returns the bare user at the top level
    id: Option<String>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        let access_token = self.access_token?;
        let user = self.user?;
        Some(Session {
            owner_id: user.id,
            email: user.email,
            access_token,
        })
    }
}

/// Identity client for the hosted auth endpoint
#[derive(Clone)]
pub struct RestAuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    session_tx: Arc<watch::Sender<Option<Session>>>,
}

impl RestAuthClient {
    pub fn new(config: &RemoteConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let (session_tx, _) = watch::channel(None);
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            session_tx: Arc::new(session_tx),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn token_request(&self, url: String, credentials: &Credentials) -> AppResult<TokenResponse> {
        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("auth request failed with status {}: {}", status, body);
            return Err(AppError::store(format!(
                "auth request failed with status {}",
                status
            )));
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}

#[async_trait]
impl AuthProvider for RestAuthClient {
    async fn current_session(&self) -> Option<Session> {
        self.session_tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> AppResult<Session> {
        let url = format!("{}?grant_type=password", self.auth_url("token"));
        let token = self.token_request(url, credentials).await?;
        let session = token
            .into_session()
            .ok_or_else(|| AppError::store("sign-in response carried no session"))?;

        info!("signed in as {}", session.owner_id);
        self.session_tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> AppResult<Option<Session>> {
        let token = self.token_request(self.auth_url("signup"), credentials).await?;
        let pending_user = token.id.clone();
        let session = token.into_session();
        match &session {
            Some(session) => {
                self.session_tx.send_replace(Some(session.clone()));
            }
            None => {
                info!(
                    "sign-up created user {}, awaiting email confirmation",
                    pending_user.as_deref().unwrap_or("<unknown>")
                );
            }
        }
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let session = self.current_session().await;
        if let Some(session) = session {
            let response = self
                .client
                .post(self.auth_url("logout"))
                .header("apikey", &self.api_key)
                .bearer_auth(&session.access_token)
                .send()
                .await?;
            if !response.status().is_success() {
                // Session is cleared locally regardless; the token may simply
                // have expired server-side already
                error!("logout returned status {}", response.status());
            }
        }
        self.session_tx.send_replace(None);
        Ok(())
    }
}
