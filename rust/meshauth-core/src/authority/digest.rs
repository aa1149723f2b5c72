use std::fmt::{Debug, Display};

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A fixed-length fingerprint of secret key material. The length depends on
/// the [KeyHasher] that produced it.
///
/// Equality is evaluated in constant time relative to the digest content, so
/// a [KeyDigest] may be compared against attacker-influenced input without
/// leaking how many leading bytes matched.
#[derive(Clone)]
pub struct KeyDigest(Vec<u8>);

impl KeyDigest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(value: &str) -> anyhow::Result<Self> {
        Ok(KeyDigest(hex::decode(value)?))
    }
}

impl From<Vec<u8>> for KeyDigest {
    fn from(value: Vec<u8>) -> Self {
        KeyDigest(value)
    }
}

impl PartialEq for KeyDigest {
    fn eq(&self, other: &Self) -> bool {
        // NOTE: slices of different lengths compare unequal without
        // inspecting content
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for KeyDigest {}

impl Debug for KeyDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("KeyDigest").field(&self.to_hex()).finish()
    }
}

impl Display for KeyDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for KeyDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for KeyDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        KeyDigest::from_hex(&value).map_err(D::Error::custom)
    }
}

/// The one-way digest function used to fingerprint read and write keys.
/// Implementations must be deterministic, collision-resistant and free of
/// side effects; the same implementation must be used at issuance and at
/// verification.
pub trait KeyHasher: Send + Sync {
    /// Digest an arbitrary byte sequence.
    fn digest(&self, input: &[u8]) -> KeyDigest;

    /// Digest the concatenation `read || write`. The order is fixed; a token
    /// issued with the combined digest of `(r, w)` can only be unlocked by
    /// presenting `r` and `w` in their respective positions.
    fn digest_pair(&self, read: &[u8], write: &[u8]) -> KeyDigest {
        let mut joined = Zeroizing::new(Vec::with_capacity(read.len() + write.len()));
        joined.extend_from_slice(read);
        joined.extend_from_slice(write);
        self.digest(&joined)
    }
}

/// SHA-256, the reference digest for issued capability tokens
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl KeyHasher for Sha256Hasher {
    fn digest(&self, input: &[u8]) -> KeyDigest {
        KeyDigest(Sha256::digest(input).to_vec())
    }
}

/// SHA-512, for deployments that prefer a wider fingerprint
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha512Hasher;

impl KeyHasher for Sha512Hasher {
    fn digest(&self, input: &[u8]) -> KeyDigest {
        KeyDigest(Sha512::digest(input).to_vec())
    }
}
