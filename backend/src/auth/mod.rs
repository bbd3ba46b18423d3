//! # Identity Module
//!
//! Boundary with the identity collaborator. The core only needs "current
//! user id, or none" plus the session lifecycle; sign-in/sign-up/sign-out are
//! pass-throughs with no business logic here.

pub mod memory;
pub mod rest;

use crate::error::AppResult;
use async_trait::async_trait;
use shared::{Credentials, Session};
use tokio::sync::watch;

pub use memory::MemoryAuth;
pub use rest::RestAuthClient;

/// Interface for the identity provider
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The active session, or `None` when signed out or expired
    async fn current_session(&self) -> Option<Session>;

    /// Watch channel that fires on login, logout, and session expiry. The
    /// consumer is responsible for redirecting to an unauthenticated view
    /// when the value becomes `None`.
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;

    /// Password sign-in pass-through; establishes the session on success
    async fn sign_in_with_password(&self, credentials: &Credentials) -> AppResult<Session>;

    /// Sign-up pass-through. Returns `None` when the provider requires email
    /// confirmation before a session exists.
    async fn sign_up(&self, credentials: &Credentials) -> AppResult<Option<Session>>;

    /// Ends the session; observers see the session become `None`
    async fn sign_out(&self) -> AppResult<()>;
}
