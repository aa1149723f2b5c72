use std::{fmt::Display, str::FromStr};

use zeroize::Zeroizing;

use crate::{
    authority::{KeyDigest, KeyHasher},
    data::SessionId,
    error::PeerError,
};

/// Prefix of credentials that refer to a session held by the session store
pub const SESSION_TOKEN_PREFIX: &str = "ses__";

/// Prefix of credentials that carry split-capability key material
pub const UAT_TOKEN_PREFIX: &str = "uat__";

/// Separates the read part from the write part of a `uat__` credential.
/// Issued keys are base64url encoded, an alphabet that never contains it.
pub const KEY_SEPARATOR: char = '#';

/// A raw bearer credential, classified by its prefix.
///
/// Parsing never consults any store; it only decides which verification path
/// a credential belongs to and strips the prefix. Anything that is not
/// recognizably one of the two shapes is rejected outright rather than
/// retried against the other path.
#[derive(Debug, Clone)]
pub enum Credential {
    /// `ses__<session id>`: resolved by looking the session up
    Session(SessionId),
    /// `uat__<read>#<write>`: resolved by verifying the presented keys
    /// against a stored access token
    Capability(PresentedKeys),
}

impl FromStr for Credential {
    type Err = PeerError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if let Some(session_id) = raw.strip_prefix(SESSION_TOKEN_PREFIX) {
            if session_id.is_empty() {
                return Err(PeerError::MalformedCredential("Missing session id"));
            }
            return Ok(Credential::Session(SessionId::from(session_id)));
        }

        if let Some(key_material) = raw.strip_prefix(UAT_TOKEN_PREFIX) {
            return Ok(Credential::Capability(PresentedKeys::from_str(key_material)?));
        }

        Err(PeerError::MalformedCredential("Unrecognized credential prefix"))
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Session(session_id) => write!(f, "{SESSION_TOKEN_PREFIX}{session_id}"),
            Credential::Capability(keys) => write!(
                f,
                "{UAT_TOKEN_PREFIX}{}{KEY_SEPARATOR}{}",
                keys.read.as_str(),
                keys.write.as_str()
            ),
        }
    }
}

/// The read part and write part of a capability credential, as presented by
/// the caller. Either part may be empty, but never both. The key material is
/// wiped from memory on drop and never printed.
#[derive(Clone)]
pub struct PresentedKeys {
    read: Zeroizing<String>,
    write: Zeroizing<String>,
}

impl PresentedKeys {
    pub fn new(read: &str, write: &str) -> Result<Self, PeerError> {
        if read.is_empty() && write.is_empty() {
            return Err(PeerError::MalformedCredential("Missing key material"));
        }
        if read.contains(KEY_SEPARATOR) || write.contains(KEY_SEPARATOR) {
            return Err(PeerError::MalformedCredential("Ambiguous key separator"));
        }

        Ok(PresentedKeys {
            read: Zeroizing::new(read.to_owned()),
            write: Zeroizing::new(write.to_owned()),
        })
    }

    pub fn read(&self) -> &str {
        &self.read
    }

    pub fn write(&self) -> &str {
        &self.write
    }

    /// The store query that selects the token these keys claim to unlock.
    /// Records are addressed by the same digest the verifier checks: the
    /// combined digest when both parts are present, otherwise the digest of
    /// whichever part was presented.
    pub fn lookup<H: KeyHasher + ?Sized>(&self, hasher: &H) -> TokenLookup {
        match (self.read.is_empty(), self.write.is_empty()) {
            (false, false) => {
                TokenLookup::Combined(hasher.digest_pair(self.read.as_bytes(), self.write.as_bytes()))
            }
            (false, true) => TokenLookup::Read(hasher.digest(self.read.as_bytes())),
            _ => TokenLookup::Write(hasher.digest(self.write.as_bytes())),
        }
    }
}

impl FromStr for PresentedKeys {
    type Err = PeerError;

    fn from_str(key_material: &str) -> Result<Self, Self::Err> {
        let (read, write) = key_material
            .split_once(KEY_SEPARATOR)
            .ok_or(PeerError::MalformedCredential("Missing key separator"))?;

        PresentedKeys::new(read, write)
    }
}

impl std::fmt::Debug for PresentedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentedKeys")
            .field("read", &(!self.read.is_empty()))
            .field("write", &(!self.write.is_empty()))
            .finish()
    }
}

/// How a token store should find the record a capability credential refers
/// to; each variant carries the digest of the presented key material
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLookup {
    /// Match against the combined digest
    Combined(KeyDigest),
    /// Match against the read digest
    Read(KeyDigest),
    /// Match against the write digest
    Write(KeyDigest),
}

impl TokenLookup {
    pub fn digest(&self) -> &KeyDigest {
        match self {
            TokenLookup::Combined(digest)
            | TokenLookup::Read(digest)
            | TokenLookup::Write(digest) => digest,
        }
    }
}
