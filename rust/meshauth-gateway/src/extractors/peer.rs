use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use meshauth_core::{
    api::headers::{ServiceName, ServiceSignature},
    authority::AccessMode,
    data::{Peer, RoleSemantics, ScopedRole},
    error::PeerError,
    resolver::PeerResolver,
};

use crate::error::GatewayErrorResponse;

/// The resolved [Peer] behind a request.
///
/// A request authenticates either with an `Authorization: Bearer` credential
/// (`ses__…` or `uat__…`) or, for service-to-service calls, with the
/// `service-name` and `service-signature` headers. The bearer credential
/// wins when both are present. A request that cannot be attributed to a
/// peer is rejected before the handler runs; there is no anonymous peer.
#[derive(Debug, Clone)]
pub struct PeerAuthority(pub Peer);

impl PeerAuthority {
    pub fn peer(&self) -> &Peer {
        &self.0
    }

    /// Succeeds if the peer's access for this request covers `required`
    pub fn try_authorize(&self, required: AccessMode) -> Result<&Peer, GatewayErrorResponse> {
        if self.0.allows(required) {
            Ok(&self.0)
        } else {
            debug!("Peer lacks {} access", required);
            Err(StatusCode::FORBIDDEN.into())
        }
    }

    /// Succeeds if the peer is an administrator holding a role that satisfies
    /// `required` under the host's `semantics`
    pub fn try_authorize_admin<R: RoleSemantics + ?Sized>(
        &self,
        required: &ScopedRole,
        semantics: &R,
    ) -> Result<&Peer, GatewayErrorResponse> {
        match &self.0 {
            Peer::Admin(data) if data.has_role(required, semantics) => Ok(&self.0),
            _ => {
                debug!("Peer lacks role {}", required);
                Err(StatusCode::FORBIDDEN.into())
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PeerAuthority
where
    Arc<PeerResolver>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = GatewayErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let resolver = Arc::<PeerResolver>::from_ref(state);

        let bearer = parts
            .headers
            .typed_try_get::<Authorization<Bearer>>()
            .map_err(|_| PeerError::MalformedCredential("Unreadable authorization header"))?;

        if let Some(Authorization(bearer)) = bearer {
            return Ok(PeerAuthority(resolver.resolve(bearer.token()).await?));
        }

        let name = parts
            .headers
            .typed_try_get::<ServiceName>()
            .map_err(|_| PeerError::MalformedCredential("Unreadable service name header"))?;
        let signature = parts
            .headers
            .typed_try_get::<ServiceSignature>()
            .map_err(|_| PeerError::MalformedCredential("Unreadable service signature header"))?;

        match (name, signature) {
            (Some(ServiceName(name)), Some(ServiceSignature(signature))) => Ok(PeerAuthority(
                resolver.resolve_service(&name, &signature).await?,
            )),
            _ => Err(PeerError::MalformedCredential("Missing credential").into()),
        }
    }
}
