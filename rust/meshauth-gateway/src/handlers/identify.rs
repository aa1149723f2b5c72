use axum::Json;
use meshauth_core::{
    authority::AccessMode,
    data::{Peer, PeerType, UserId, UserTokenData},
};
use serde::{Deserialize, Serialize};

use crate::extractors::PeerAuthority;

/// What the gateway resolved the caller to. Secrets carried by the peer
/// (service signatures, token digests) are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyResponse {
    #[serde(rename = "type")]
    pub peer_type: PeerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub mode: AccessMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rights: Vec<String>,
}

impl From<&Peer> for IdentifyResponse {
    fn from(peer: &Peer) -> Self {
        let service = match peer {
            Peer::Service(metadata) => Some(metadata.name.clone()),
            _ => None,
        };
        let rights = match peer {
            Peer::User(UserTokenData::Capability(data)) => {
                data.token.rights.iter().cloned().collect()
            }
            _ => Vec::new(),
        };

        IdentifyResponse {
            peer_type: peer.peer_type(),
            user_id: peer.user_id().cloned(),
            service,
            mode: peer.effective_mode(),
            rights,
        }
    }
}

pub async fn identify_route(authority: PeerAuthority) -> Json<IdentifyResponse> {
    debug!("Invoking identify route...");

    Json(IdentifyResponse::from(authority.peer()))
}
