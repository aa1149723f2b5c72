use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::authority::{KeyDigest, KeyHasher, KEY_SEPARATOR, UAT_TOKEN_PREFIX};
use crate::data::UserId;

/// Number of random bytes drawn for each half of an issued key pair
pub const ISSUED_KEY_LENGTH: usize = 32;

/// An issued split-capability grant, as held by the token store.
///
/// The record stores three digests that are each computed from their own
/// input: the read key, the write key, and the read key concatenated with the
/// write key. Plaintext keys are handed to the bearer once at issuance and
/// never persisted, so a leaked record reveals nothing that can be presented.
/// Revoking a grant means deleting its record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    /// Digest of the read key; presenting the read key alone grants read mode
    #[serde(rename = "read")]
    pub read_digest: KeyDigest,
    /// Digest of the write key; presenting the write key alone grants write mode
    #[serde(rename = "write")]
    pub write_digest: KeyDigest,
    /// Digest of `read key || write key`; presenting both grants both modes
    #[serde(rename = "hash")]
    pub combined_digest: KeyDigest,
    pub owner: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub rights: BTreeSet<String>,
    #[serde(alias = "insertedAt")]
    pub created_at: u64,
    pub updated_at: u64,
}

impl AccessToken {
    /// Issue a new grant for `owner`. A fresh read key and write key are drawn
    /// from the thread-local CSPRNG; the returned [IssuedKeys] is the only
    /// copy of them and must be delivered to the bearer out of band.
    pub fn issue<H, I>(
        owner: &UserId,
        label: Option<String>,
        rights: I,
        hasher: &H,
    ) -> (AccessToken, IssuedKeys)
    where
        H: KeyHasher + ?Sized,
        I: IntoIterator<Item = String>,
    {
        let keys = IssuedKeys {
            read: generate_key(),
            write: generate_key(),
        };

        let token = AccessToken::from_keys(owner, label, rights, &keys.read, &keys.write, hasher);

        debug!("Issued access token for {}", owner);

        (token, keys)
    }

    /// Build the record for an externally generated key pair
    pub fn from_keys<H, I>(
        owner: &UserId,
        label: Option<String>,
        rights: I,
        read_key: &str,
        write_key: &str,
        hasher: &H,
    ) -> AccessToken
    where
        H: KeyHasher + ?Sized,
        I: IntoIterator<Item = String>,
    {
        let now = now_millis();

        AccessToken {
            read_digest: hasher.digest(read_key.as_bytes()),
            write_digest: hasher.digest(write_key.as_bytes()),
            combined_digest: hasher.digest_pair(read_key.as_bytes(), write_key.as_bytes()),
            owner: owner.clone(),
            label,
            rights: rights.into_iter().collect(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_right(&self, right: &str) -> bool {
        self.rights.contains(right)
    }
}

/// The plaintext key pair behind a freshly issued [AccessToken]. Both keys
/// are wiped from memory when this value is dropped.
pub struct IssuedKeys {
    read: Zeroizing<String>,
    write: Zeroizing<String>,
}

impl IssuedKeys {
    pub fn read_key(&self) -> &str {
        &self.read
    }

    pub fn write_key(&self) -> &str {
        &self.write
    }

    /// Bearer credential granting read mode
    pub fn read_credential(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("{UAT_TOKEN_PREFIX}{}{KEY_SEPARATOR}", *self.read))
    }

    /// Bearer credential granting write mode
    pub fn write_credential(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("{UAT_TOKEN_PREFIX}{KEY_SEPARATOR}{}", *self.write))
    }

    /// Bearer credential granting both modes
    pub fn full_credential(&self) -> Zeroizing<String> {
        Zeroizing::new(format!(
            "{UAT_TOKEN_PREFIX}{}{KEY_SEPARATOR}{}",
            *self.read, *self.write
        ))
    }
}

impl std::fmt::Debug for IssuedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedKeys").finish_non_exhaustive()
    }
}

fn generate_key() -> Zeroizing<String> {
    let mut bytes = Zeroizing::new([0u8; ISSUED_KEY_LENGTH]);
    rand::thread_rng().fill_bytes(bytes.as_mut());
    Zeroizing::new(URL_SAFE_NO_PAD.encode(bytes.as_ref()))
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
