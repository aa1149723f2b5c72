use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use subtle::ConstantTimeEq;
use tracing::instrument;

use crate::{
    authority::{verify_lookup, Credential, KeyHasher, PresentedKeys, Sha256Hasher},
    data::{Peer, SessionId, UserTokenData, UserUatData},
    error::PeerError,
    resolver::{ProfileStore, ServiceRegistry, SessionRecord, SessionStore, TokenStore},
};

/// How long any single external lookup may take before resolution gives up
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on each store or registry call made while resolving
    pub lookup_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

/// Turns the credentials presented on an inbound request into a [Peer].
///
/// Resolution either yields a completely assembled [Peer] or an error; there
/// is no anonymous fallback. Store calls are the only suspension points, and
/// each is bounded by [ResolverConfig::lookup_timeout]. A timed out lookup is
/// reported, not retried. Nothing is cached between calls, so revoking a
/// token or ending a session takes effect on the next request.
#[derive(Clone)]
pub struct PeerResolver {
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenStore>,
    profiles: Arc<dyn ProfileStore>,
    services: Arc<dyn ServiceRegistry>,
    hasher: Arc<dyn KeyHasher>,
    config: ResolverConfig,
}

impl PeerResolver {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenStore>,
        profiles: Arc<dyn ProfileStore>,
        services: Arc<dyn ServiceRegistry>,
    ) -> Self {
        PeerResolver {
            sessions,
            tokens,
            profiles,
            services,
            hasher: Arc::new(Sha256Hasher),
            config: ResolverConfig::default(),
        }
    }

    /// Use a different digest primitive; it must be the one the token store's
    /// records were issued with
    pub fn with_hasher(mut self, hasher: Arc<dyn KeyHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn hasher(&self) -> &dyn KeyHasher {
        self.hasher.as_ref()
    }

    /// Resolve a raw bearer credential (`ses__…` or `uat__…`)
    #[instrument(level = "debug", skip_all)]
    pub async fn resolve(&self, raw_credential: &str) -> Result<Peer, PeerError> {
        let credential = Credential::from_str(raw_credential).map_err(|error| {
            debug!("Rejecting credential: {}", error);
            error
        })?;

        self.resolve_credential(&credential).await
    }

    pub async fn resolve_credential(&self, credential: &Credential) -> Result<Peer, PeerError> {
        let outcome = match credential {
            Credential::Session(session_id) => self.resolve_session(session_id).await,
            Credential::Capability(keys) => self.resolve_capability(keys).await,
        };

        if let Err(error) = &outcome {
            log_failure(error);
        }

        outcome
    }

    async fn resolve_session(&self, session_id: &SessionId) -> Result<Peer, PeerError> {
        let record = self
            .lookup("session store", self.sessions.find_session(session_id))
            .await?
            .ok_or(PeerError::UnknownSession)?;

        Ok(match record {
            SessionRecord::Admin(data) => Peer::Admin(data),
            SessionRecord::User(data) => Peer::User(UserTokenData::Session(data)),
        })
    }

    async fn resolve_capability(&self, keys: &PresentedKeys) -> Result<Peer, PeerError> {
        let lookup = keys.lookup(self.hasher());
        let token = self
            .lookup("token store", self.tokens.find_token(&lookup))
            .await?;

        let mode = verify_lookup(token.as_ref(), keys, self.hasher())?;

        // A verified mode implies the lookup produced a token
        let token = token.ok_or(PeerError::UnknownToken)?;

        let profile = self
            .lookup("profile store", self.profiles.find_profile(&token.owner))
            .await?
            .ok_or_else(|| {
                PeerError::UnresolvedIdentity(format!(
                    "Owner {} of a verified access token has no profile",
                    token.owner
                ))
            })?;

        if profile.user_id != token.owner {
            return Err(PeerError::UnresolvedIdentity(format!(
                "Profile store answered for {} when asked for {}",
                profile.user_id, token.owner
            )));
        }

        Ok(Peer::User(UserTokenData::Capability(UserUatData {
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            mode,
            token,
        })))
    }

    /// Resolve the calling service from the name and signature it stamped
    /// on its request
    #[instrument(level = "debug", skip(self, signature))]
    pub async fn resolve_service(&self, name: &str, signature: &str) -> Result<Peer, PeerError> {
        if name.is_empty() || signature.is_empty() {
            return Err(PeerError::MalformedCredential("Missing service name or signature"));
        }

        let registered = self
            .lookup("service registry", self.services.find_service(name))
            .await?;

        let outcome = match registered {
            Some(metadata)
                if bool::from(
                    metadata
                        .signature
                        .as_bytes()
                        .ct_eq(signature.as_bytes()),
                ) =>
            {
                Ok(Peer::Service(metadata))
            }
            _ => Err(PeerError::UnknownService),
        };

        if let Err(error) = &outcome {
            log_failure(error);
        }

        outcome
    }

    async fn lookup<T, F>(&self, collaborator: &'static str, lookup: F) -> Result<T, PeerError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.config.lookup_timeout, lookup).await {
            Ok(result) => result.map_err(PeerError::Other),
            Err(_) => Err(PeerError::IdentityResolutionTimeout(collaborator)),
        }
    }
}

fn log_failure(error: &PeerError) {
    match error {
        PeerError::UnresolvedIdentity(_) => error!("Identity integrity fault: {}", error),
        PeerError::IdentityResolutionTimeout(_) => warn!("{}", error),
        PeerError::Other(_) => error!("Identity resolution failed: {:?}", error),
        _ => debug!("{}", error),
    }
}
