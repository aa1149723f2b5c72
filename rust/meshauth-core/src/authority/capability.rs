use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    authority::{KeyHasher, PresentedKeys},
    data::AccessToken,
    error::PeerError,
};

/// The access level a capability credential was found to grant for the
/// current request. It is derived from which key parts were presented, so
/// the same issued token can yield a different [AccessMode] per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
    Both,
}

impl AccessMode {
    pub fn can_read(&self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::Both)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::Both)
    }

    /// True if this mode grants at least everything `required` grants
    pub fn enables(&self, required: AccessMode) -> bool {
        match required {
            AccessMode::Read => self.can_read(),
            AccessMode::Write => self.can_write(),
            AccessMode::Both => *self == AccessMode::Both,
        }
    }
}

impl Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Both => "both",
        })
    }
}

/// Derive the [AccessMode] that `presented` unlocks on `token`.
///
/// The most specific grant is checked first. When both parts are presented
/// only the combined digest is consulted: a read key paired with a wrong write
/// key is rejected instead of degrading to read mode. All digest comparisons
/// run in constant time.
///
/// The verifier does no I/O; finding `token` is the caller's job, and a
/// missing record is reported through [verify_lookup] as
/// [PeerError::UnknownToken].
pub fn verify<H: KeyHasher + ?Sized>(
    token: &AccessToken,
    presented: &PresentedKeys,
    hasher: &H,
) -> Result<AccessMode, PeerError> {
    let read = presented.read().as_bytes();
    let write = presented.write().as_bytes();

    let (expected, actual, mode) = match (read.is_empty(), write.is_empty()) {
        (false, false) => (
            &token.combined_digest,
            hasher.digest_pair(read, write),
            AccessMode::Both,
        ),
        (false, true) => (&token.read_digest, hasher.digest(read), AccessMode::Read),
        (true, false) => (&token.write_digest, hasher.digest(write), AccessMode::Write),
        (true, true) => return Err(PeerError::MalformedCredential("Missing key material")),
    };

    if *expected == actual {
        Ok(mode)
    } else {
        trace!("Presented {} key material did not match", mode);
        Err(PeerError::InvalidCredential)
    }
}

/// As [verify], for the result of a token store lookup
pub fn verify_lookup<H: KeyHasher + ?Sized>(
    token: Option<&AccessToken>,
    presented: &PresentedKeys,
    hasher: &H,
) -> Result<AccessMode, PeerError> {
    match token {
        Some(token) => verify(token, presented, hasher),
        None => Err(PeerError::UnknownToken),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;

    use crate::authority::{KeyHasher, PresentedKeys, Sha256Hasher, Sha512Hasher};
    use crate::data::{AccessToken, UserId};
    use crate::error::PeerError;

    use super::{verify, verify_lookup, AccessMode};

    fn token_for<H: KeyHasher>(read: &str, write: &str, hasher: &H) -> AccessToken {
        AccessToken::from_keys(
            &UserId::from("owner"),
            None,
            Vec::<String>::new(),
            read,
            write,
            hasher,
        )
    }

    fn keys(read: &str, write: &str) -> PresentedKeys {
        PresentedKeys::new(read, write).unwrap()
    }

    #[test]
    fn it_grants_read_mode_for_the_read_key_alone() -> Result<()> {
        let token = token_for("r0", "w0", &Sha256Hasher);

        assert_eq!(verify(&token, &keys("r0", ""), &Sha256Hasher)?, AccessMode::Read);

        Ok(())
    }

    #[test]
    fn it_grants_write_mode_for_the_write_key_alone() -> Result<()> {
        let token = token_for("r0", "w0", &Sha256Hasher);

        assert_eq!(verify(&token, &keys("", "w0"), &Sha256Hasher)?, AccessMode::Write);

        Ok(())
    }

    #[test]
    fn it_grants_both_modes_for_the_combined_keys() -> Result<()> {
        let token = token_for("r0", "w0", &Sha256Hasher);

        assert_eq!(verify(&token, &keys("r0", "w0"), &Sha256Hasher)?, AccessMode::Both);

        Ok(())
    }

    #[test]
    fn it_prefers_the_combined_grant_even_when_each_part_also_matches() -> Result<()> {
        let hasher = Sha256Hasher;
        let mut token = token_for("r0", "w0", &hasher);

        // Each half individually satisfies its own digest as well
        token.read_digest = hasher.digest(b"r0");
        token.write_digest = hasher.digest(b"w0");

        assert_eq!(verify(&token, &keys("r0", "w0"), &hasher)?, AccessMode::Both);

        Ok(())
    }

    #[test]
    fn it_does_not_downgrade_a_valid_read_key_paired_with_a_wrong_write_key() {
        let token = token_for("r0", "w0", &Sha256Hasher);

        assert!(matches!(
            verify(&token, &keys("r0", "guessed"), &Sha256Hasher),
            Err(PeerError::InvalidCredential)
        ));
        assert!(matches!(
            verify(&token, &keys("guessed", "w0"), &Sha256Hasher),
            Err(PeerError::InvalidCredential)
        ));
    }

    #[test]
    fn it_does_not_accept_the_write_key_in_the_read_position() {
        let token = token_for("r0", "w0", &Sha256Hasher);

        assert!(verify(&token, &keys("w0", ""), &Sha256Hasher).is_err());
        assert!(verify(&token, &keys("", "r0"), &Sha256Hasher).is_err());
        assert!(verify(&token, &keys("w0", "r0"), &Sha256Hasher).is_err());
    }

    #[test]
    fn it_rejects_any_single_bit_mutation_of_a_presented_key() {
        let read_key = "dGhpcyBpcyB0aGUgcmVhZCBrZXk";
        let write_key = "dGhpcyBpcyB0aGUgd3JpdGUga2V5";
        let hasher = Sha256Hasher;
        let token = token_for(read_key, write_key, &hasher);

        for (index, _) in read_key.char_indices() {
            for bit in 0..7 {
                let mut mutated = read_key.as_bytes().to_vec();
                mutated[index] ^= 1 << bit;
                let Ok(mutated) = String::from_utf8(mutated) else {
                    continue;
                };
                if mutated.contains('#') {
                    continue;
                }

                assert!(verify(&token, &keys(&mutated, ""), &hasher).is_err());
                assert!(verify(&token, &keys(&mutated, write_key), &hasher).is_err());
            }
        }

        for (index, _) in write_key.char_indices() {
            for bit in 0..7 {
                let mut mutated = write_key.as_bytes().to_vec();
                mutated[index] ^= 1 << bit;
                let Ok(mutated) = String::from_utf8(mutated) else {
                    continue;
                };
                if mutated.contains('#') {
                    continue;
                }

                assert!(verify(&token, &keys("", &mutated), &hasher).is_err());
                assert!(verify(&token, &keys(read_key, &mutated), &hasher).is_err());
            }
        }
    }

    #[test]
    fn it_reports_a_missing_token_as_unknown() {
        assert!(matches!(
            verify_lookup(None, &keys("r0", ""), &Sha256Hasher),
            Err(PeerError::UnknownToken)
        ));
    }

    #[test]
    fn it_round_trips_issued_keys_through_every_mode() -> Result<()> {
        fn round_trip<H: KeyHasher>(hasher: &H) -> Result<()> {
            let (token, issued) = AccessToken::issue(
                &UserId::from("owner"),
                Some("round trip".into()),
                vec!["tickets:create".to_owned()],
                hasher,
            );

            let r0 = issued.read_key();
            let w0 = issued.write_key();

            assert_eq!(verify(&token, &keys(r0, ""), hasher)?, AccessMode::Read);
            assert_eq!(verify(&token, &keys("", w0), hasher)?, AccessMode::Write);
            assert_eq!(verify(&token, &keys(r0, w0), hasher)?, AccessMode::Both);

            Ok(())
        }

        round_trip(&Sha256Hasher)?;
        round_trip(&Sha512Hasher)?;

        Ok(())
    }

    #[test]
    fn it_rejects_keys_digested_with_a_different_primitive() {
        let token = token_for("r0", "w0", &Sha256Hasher);

        assert!(verify(&token, &keys("r0", ""), &Sha512Hasher).is_err());
    }

    #[tokio::test]
    async fn it_verifies_the_same_token_concurrently_without_interference() -> Result<()> {
        let (token, issued) = AccessToken::issue(
            &UserId::from("owner"),
            None,
            Vec::<String>::new(),
            &Sha256Hasher,
        );
        let token = Arc::new(token);
        let presented = keys(issued.read_key(), issued.write_key());

        let tasks = (0..100).map(|_| {
            let token = token.clone();
            let presented = presented.clone();
            tokio::spawn(async move { verify(&token, &presented, &Sha256Hasher) })
        });

        for outcome in futures::future::join_all(tasks).await {
            assert_eq!(outcome??, AccessMode::Both);
        }

        Ok(())
    }

    #[test]
    fn it_orders_modes_by_what_they_enable() {
        assert!(AccessMode::Both.enables(AccessMode::Read));
        assert!(AccessMode::Both.enables(AccessMode::Write));
        assert!(!AccessMode::Read.enables(AccessMode::Write));
        assert!(!AccessMode::Write.enables(AccessMode::Read));
        assert!(!AccessMode::Read.enables(AccessMode::Both));
        assert_eq!(serde_json::to_string(&AccessMode::Both).unwrap(), "\"both\"");
    }
}
