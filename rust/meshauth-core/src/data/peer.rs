use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    authority::AccessMode,
    data::{AccessToken, RoleSemantics, ScopedRole, ServiceMetadata, UserId},
};

/// The kind of caller a [Peer] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerType {
    Service,
    User,
    Admin,
}

impl Display for PeerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PeerType::Service => "service",
            PeerType::User => "user",
            PeerType::Admin => "admin",
        })
    }
}

/// The resolved identity of whoever made the current request.
///
/// A [Peer] is assembled fresh for every request and is never persisted.
/// Its serialized form carries the discriminant in a `type` field and the
/// variant payload in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Peer {
    /// Another mesh participant, identified by its name and signature
    Service(ServiceMetadata),
    /// An end user, authenticated by session or by capability token
    User(UserTokenData),
    /// A session-authenticated administrator
    Admin(AdminTokenData),
}

impl Peer {
    pub fn peer_type(&self) -> PeerType {
        match self {
            Peer::Service(_) => PeerType::Service,
            Peer::User(_) => PeerType::User,
            Peer::Admin(_) => PeerType::Admin,
        }
    }

    /// The user behind the request, if the peer is not a service
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Peer::Service(_) => None,
            Peer::User(data) => Some(data.user_id()),
            Peer::Admin(data) => Some(&data.user_id),
        }
    }

    /// The access this peer holds for the current request. Only a capability
    /// token bounds trust; services and session holders are fully trusted.
    pub fn effective_mode(&self) -> AccessMode {
        match self {
            Peer::User(UserTokenData::Capability(data)) => data.mode,
            Peer::User(UserTokenData::Session(_)) | Peer::Service(_) | Peer::Admin(_) => {
                AccessMode::Both
            }
        }
    }

    pub fn allows(&self, required: AccessMode) -> bool {
        self.effective_mode().enables(required)
    }
}

/// How a user peer authenticated; the `method` field decides which shape the
/// payload takes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum UserTokenData {
    #[serde(rename = "ses")]
    Session(UserSesData),
    #[serde(rename = "uat")]
    Capability(UserUatData),
}

impl UserTokenData {
    pub fn user_id(&self) -> &UserId {
        match self {
            UserTokenData::Session(data) => &data.user_id,
            UserTokenData::Capability(data) => &data.user_id,
        }
    }
}

/// A user holding a live session; fully trusted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSesData {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
}

/// A user who presented capability token key material. Trust is bounded by
/// `mode`, which was computed for this request only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUatData {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub mode: AccessMode,
    pub token: AccessToken,
}

impl UserUatData {
    pub fn has_right(&self, right: &str) -> bool {
        self.token.has_right(right)
    }
}

/// A session-authenticated administrator and the roles attached to them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTokenData {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<ScopedRole>,
}

impl AdminTokenData {
    pub fn has_role<R: RoleSemantics + ?Sized>(&self, required: &ScopedRole, semantics: &R) -> bool {
        self.roles
            .iter()
            .any(|held| semantics.satisfies(held, required))
    }
}

/// The profile fields of a user as held by the profile store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use crate::authority::{AccessMode, Sha256Hasher};
    use crate::data::{
        AccessToken, AdminTokenData, ExactRoleSemantics, ScopedRole, ServiceMetadata, UserId,
        UserSesData, UserUatData,
    };

    use super::{Peer, PeerType, UserTokenData};

    fn capability_peer(mode: AccessMode) -> Peer {
        let (token, _) = AccessToken::issue(
            &UserId::from("u-1"),
            None,
            vec!["tickets:read".to_owned()],
            &Sha256Hasher,
        );

        Peer::User(UserTokenData::Capability(UserUatData {
            user_id: UserId::from("u-1"),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            mode,
            token,
        }))
    }

    #[test]
    fn it_serializes_a_peer_as_a_tagged_variant() -> Result<()> {
        let peer = Peer::User(UserTokenData::Session(UserSesData {
            user_id: UserId::from("u-1"),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }));

        assert_eq!(
            serde_json::to_value(&peer)?,
            json!({
                "type": "user",
                "data": {
                    "method": "ses",
                    "userId": "u-1",
                    "firstName": "Ada",
                    "lastName": "Lovelace"
                }
            })
        );

        let decoded: Peer = serde_json::from_value(serde_json::to_value(&peer)?)?;
        assert_eq!(decoded, peer);

        Ok(())
    }

    #[test]
    fn it_tags_capability_peers_with_their_mode() -> Result<()> {
        let value = serde_json::to_value(capability_peer(AccessMode::Read))?;

        assert_eq!(value["data"]["method"], "uat");
        assert_eq!(value["data"]["mode"], "read");

        Ok(())
    }

    #[test]
    fn it_bounds_only_capability_peers_by_mode() {
        let read_only = capability_peer(AccessMode::Read);

        assert_eq!(read_only.peer_type(), PeerType::User);
        assert!(read_only.allows(AccessMode::Read));
        assert!(!read_only.allows(AccessMode::Write));

        let service = Peer::Service(ServiceMetadata {
            name: "wallets".into(),
            signature: "sig".into(),
            host: "localhost".into(),
            port: 8080,
        });

        assert_eq!(service.user_id(), None);
        assert!(service.allows(AccessMode::Both));
    }

    #[test]
    fn it_checks_admin_roles_with_the_host_semantics() {
        let admin = AdminTokenData {
            user_id: UserId::from("a-1"),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            roles: vec![ScopedRole::new("operator", "tickets")],
        };

        assert!(admin.has_role(&ScopedRole::new("operator", "tickets"), &ExactRoleSemantics));
        assert!(!admin.has_role(&ScopedRole::new("operator", "wallets"), &ExactRoleSemantics));

        let peer = Peer::Admin(admin);
        assert_eq!(peer.user_id().map(|id| id.as_str()), Some("a-1"));
    }
}
