use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    authority::{KeyHasher, Sha256Hasher, TokenLookup},
    data::{AccessToken, IssuedKeys, ServiceMetadata, SessionId, UserId, UserProfile},
    resolver::{PeerResolver, ProfileStore, ServiceRegistry, SessionRecord, SessionStore, TokenStore},
};

#[derive(Default)]
struct Records {
    sessions: HashMap<SessionId, SessionRecord>,
    tokens: Vec<AccessToken>,
    profiles: HashMap<UserId, UserProfile>,
    services: HashMap<String, ServiceMetadata>,
}

/// A single in-memory backing for every identity store and the service
/// registry. Every lookup can be slowed down by a fixed delay to exercise
/// timeouts.
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    records: Arc<RwLock<Records>>,
    delay: Option<Duration>,
}

impl MemoryIdentityStore {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// A [PeerResolver] whose stores and registry are all backed by this store
    pub fn resolver(&self) -> PeerResolver {
        let store = Arc::new(self.clone());
        PeerResolver::new(store.clone(), store.clone(), store.clone(), store)
    }

    pub async fn insert_session(&self, session_id: &str, record: SessionRecord) {
        self.records
            .write()
            .await
            .sessions
            .insert(SessionId::from(session_id), record);
    }

    pub async fn end_session(&self, session_id: &str) {
        self.records
            .write()
            .await
            .sessions
            .remove(&SessionId::from(session_id));
    }

    pub async fn insert_token(&self, token: AccessToken) {
        self.records.write().await.tokens.push(token);
    }

    /// Revoke every token whose combined digest matches `token`'s
    pub async fn revoke_token(&self, token: &AccessToken) {
        self.records
            .write()
            .await
            .tokens
            .retain(|stored| stored.combined_digest != token.combined_digest);
    }

    pub async fn insert_profile(&self, profile: UserProfile) {
        self.records
            .write()
            .await
            .profiles
            .insert(profile.user_id.clone(), profile);
    }

    pub async fn register_service(&self, metadata: ServiceMetadata) {
        self.records
            .write()
            .await
            .services
            .insert(metadata.name.clone(), metadata);
    }

    /// Issue a SHA-256 token for `owner`, store it along with a profile for
    /// the owner, and hand back the plaintext keys
    pub async fn issue_token(&self, owner: &str, rights: &[&str]) -> (AccessToken, IssuedKeys) {
        self.issue_token_with(owner, rights, &Sha256Hasher).await
    }

    pub async fn issue_token_with<H: KeyHasher>(
        &self,
        owner: &str,
        rights: &[&str],
        hasher: &H,
    ) -> (AccessToken, IssuedKeys) {
        let owner = UserId::from(owner);
        let (token, keys) = AccessToken::issue(
            &owner,
            None,
            rights.iter().map(|right| right.to_string()),
            hasher,
        );

        self.insert_profile(UserProfile {
            user_id: owner.clone(),
            first_name: format!("{owner}-first"),
            last_name: format!("{owner}-last"),
        })
        .await;
        self.insert_token(token.clone()).await;

        (token, keys)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SessionStore for MemoryIdentityStore {
    async fn find_session(&self, session_id: &SessionId) -> Result<Option<SessionRecord>> {
        self.pause().await;
        Ok(self.records.read().await.sessions.get(session_id).cloned())
    }
}

#[async_trait]
impl TokenStore for MemoryIdentityStore {
    async fn find_token(&self, lookup: &TokenLookup) -> Result<Option<AccessToken>> {
        self.pause().await;
        let records = self.records.read().await;

        Ok(records
            .tokens
            .iter()
            .find(|token| match lookup {
                TokenLookup::Combined(digest) => token.combined_digest == *digest,
                TokenLookup::Read(digest) => token.read_digest == *digest,
                TokenLookup::Write(digest) => token.write_digest == *digest,
            })
            .cloned())
    }
}

#[async_trait]
impl ProfileStore for MemoryIdentityStore {
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        self.pause().await;
        Ok(self.records.read().await.profiles.get(user_id).cloned())
    }
}

#[async_trait]
impl ServiceRegistry for MemoryIdentityStore {
    async fn find_service(&self, name: &str) -> Result<Option<ServiceMetadata>> {
        self.pause().await;
        Ok(self.records.read().await.services.get(name).cloned())
    }
}
