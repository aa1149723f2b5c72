use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    authority::TokenLookup,
    data::{AccessToken, AdminTokenData, ServiceMetadata, SessionId, UserId, UserProfile, UserSesData},
};

/// A session record as held by the session store. Whoever issued the
/// session decided whether it belongs to a plain user or an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionRecord {
    User(UserSesData),
    Admin(AdminTokenData),
}

/// Backing store for live sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up the session with the given id; `None` if it does not exist or
    /// has ended
    async fn find_session(&self, session_id: &SessionId) -> Result<Option<SessionRecord>>;
}

/// Backing store for issued [AccessToken]s. A token that has been revoked
/// must no longer be returned.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Find the token whose digest selected by `lookup` equals the digest it
    /// carries
    async fn find_token(&self, lookup: &TokenLookup) -> Result<Option<AccessToken>>;
}

/// Backing store for user profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>>;
}

/// The registry of services participating in the mesh, keyed by name
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    async fn find_service(&self, name: &str) -> Result<Option<ServiceMetadata>>;
}
