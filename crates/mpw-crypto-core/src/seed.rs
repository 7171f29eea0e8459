//! Site seed derivation: HMAC-SHA-256 keyed with the master key.
//!
//! The message is, in order:
//!
//! ```text
//! scope ‖ be32(len(site_name)) ‖ site_name ‖ be32(counter) [‖ be32(len(context)) ‖ context]
//! ```
//!
//! Lengths are measured under the version's site-name rule. No trimming or
//! case folding is applied: `Example.com` and `example.com ` are different
//! sites.

use ring::hmac;
use zeroize::Zeroizing;

use crate::algorithm::AlgorithmVersion;
use crate::error::CoreError;
use crate::memory::SecretBytes;
use crate::stretch::MasterKey;
use crate::template::ResultType;

/// Site seed length in bytes (HMAC-SHA-256 output).
pub const SITE_SEED_LEN: usize = 32;

/// What a derived result is used for. Each purpose has its own scope, so
/// a password, a login name and a security answer for the same site never
/// share a seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// Site password.
    Authentication,
    /// Site login name.
    Identification,
    /// Security-question answer.
    Recovery,
}

impl KeyPurpose {
    /// The result type a new site uses for this purpose.
    #[must_use]
    pub const fn default_result_type(self) -> ResultType {
        match self {
            Self::Authentication => ResultType::Long,
            Self::Identification => ResultType::Name,
            Self::Recovery => ResultType::Phrase,
        }
    }
}

/// Per-site secret seed. Zeroed on drop.
#[derive(Debug)]
pub struct SiteSeed {
    bytes: SecretBytes<SITE_SEED_LEN>,
}

impl SiteSeed {
    /// Expose the seed bytes to the encoder.
    #[must_use]
    pub const fn expose(&self) -> &[u8; SITE_SEED_LEN] {
        self.bytes.expose()
    }
}

/// Derive the seed for one site, purpose and counter.
///
/// An empty `context` is treated as absent.
///
/// # Errors
///
/// - [`CoreError::InvalidCounter`] if `counter` is 0
/// - [`CoreError::KeyVersionMismatch`] if `master_key` was stretched under
///   a different version
/// - [`CoreError::InputTooLong`] if a text length does not fit 32 bits
pub fn derive_site_seed(
    master_key: &MasterKey,
    purpose: KeyPurpose,
    site_name: &str,
    counter: u32,
    context: Option<&str>,
    version: AlgorithmVersion,
) -> Result<SiteSeed, CoreError> {
    if counter == 0 {
        return Err(CoreError::InvalidCounter);
    }
    if master_key.version() != version {
        return Err(CoreError::KeyVersionMismatch {
            key: master_key.version(),
            requested: version,
        });
    }

    let scope = version.scope(purpose);
    let length_rule = version.site_name_length();

    let mut message = Zeroizing::new(Vec::with_capacity(
        scope.len().saturating_add(site_name.len()).saturating_add(16),
    ));
    message.extend_from_slice(scope.as_bytes());
    length_rule.push_prefixed(&mut message, site_name)?;
    message.extend_from_slice(&counter.to_be_bytes());
    if let Some(context) = context.filter(|c| !c.is_empty()) {
        length_rule.push_prefixed(&mut message, context)?;
    }

    Ok(SiteSeed {
        bytes: keyed_digest(master_key.expose(), &message),
    })
}

/// HMAC-SHA-256 of `message` under `key`, copied into secret memory.
///
/// `ring` does not zeroize the `hmac::Key` (its inner and outer digest
/// states are derived from `key`) or the returned `Tag`; both are dropped
/// here without being wiped.
pub(crate) fn keyed_digest(key: &[u8], message: &[u8]) -> SecretBytes<SITE_SEED_LEN> {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    let tag = hmac::sign(&key, message);
    let mut bytes = SecretBytes::new([0u8; SITE_SEED_LEN]);
    bytes.expose_mut().copy_from_slice(tag.as_ref());
    bytes
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stretch::MASTER_KEY_LEN;

    fn test_key(version: AlgorithmVersion) -> MasterKey {
        MasterKey::new(SecretBytes::new([0x11; MASTER_KEY_LEN]), version)
    }

    fn seed(site: &str, counter: u32, context: Option<&str>, version: AlgorithmVersion) -> [u8; 32] {
        *derive_site_seed(
            &test_key(version),
            KeyPurpose::Authentication,
            site,
            counter,
            context,
            version,
        )
        .unwrap()
        .expose()
    }

    #[test]
    fn counter_zero_is_rejected() {
        let err = derive_site_seed(
            &test_key(AlgorithmVersion::V3),
            KeyPurpose::Authentication,
            "example.com",
            0,
            None,
            AlgorithmVersion::V3,
        )
        .unwrap_err();
        assert_eq!(err, CoreError::InvalidCounter);
    }

    #[test]
    fn mismatched_key_version_is_rejected() {
        let err = derive_site_seed(
            &test_key(AlgorithmVersion::V2),
            KeyPurpose::Authentication,
            "example.com",
            1,
            None,
            AlgorithmVersion::V3,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::KeyVersionMismatch {
                key: AlgorithmVersion::V2,
                requested: AlgorithmVersion::V3,
            }
        );
    }

    #[test]
    fn seed_matches_manual_hmac() {
        let mut message = b"com.lyndir.masterpassword".to_vec();
        message.extend_from_slice(&[0, 0, 0, 11]);
        message.extend_from_slice(b"example.com");
        message.extend_from_slice(&[0, 0, 0, 1]);
        let expected = hmac::sign(
            &hmac::Key::new(hmac::HMAC_SHA256, &[0x11; MASTER_KEY_LEN]),
            &message,
        );
        assert_eq!(
            &seed("example.com", 1, None, AlgorithmVersion::V3)[..],
            expected.as_ref()
        );
    }

    #[test]
    fn counter_changes_seed() {
        let v = AlgorithmVersion::V3;
        assert_ne!(seed("example.com", 1, None, v), seed("example.com", 2, None, v));
    }

    #[test]
    fn site_name_is_not_trimmed_or_folded() {
        let v = AlgorithmVersion::V3;
        let base = seed("example.com", 1, None, v);
        assert_ne!(base, seed("Example.com", 1, None, v));
        assert_ne!(base, seed("example.com ", 1, None, v));
    }

    #[test]
    fn context_changes_seed_and_empty_context_is_absent() {
        let v = AlgorithmVersion::V3;
        let base = seed("example.com", 1, None, v);
        assert_ne!(base, seed("example.com", 1, Some("question"), v));
        assert_eq!(base, seed("example.com", 1, Some(""), v));
    }

    #[test]
    fn purposes_use_distinct_scopes() {
        let v = AlgorithmVersion::V3;
        let key = test_key(v);
        let derive = |purpose| {
            *derive_site_seed(&key, purpose, "example.com", 1, None, v)
                .unwrap()
                .expose()
        };
        let auth = derive(KeyPurpose::Authentication);
        let login = derive(KeyPurpose::Identification);
        let answer = derive(KeyPurpose::Recovery);
        assert_ne!(auth, login);
        assert_ne!(auth, answer);
        assert_ne!(login, answer);
    }

    #[test]
    fn non_ascii_site_name_differs_between_v1_and_v2() {
        // Same key bytes; only the site-name length rule differs.
        let v1 = seed("ñandú.example", 1, None, AlgorithmVersion::V1);
        let v2 = seed("ñandú.example", 1, None, AlgorithmVersion::V2);
        assert_ne!(v1, v2);
        let ascii_v1 = seed("example.com", 1, None, AlgorithmVersion::V1);
        let ascii_v2 = seed("example.com", 1, None, AlgorithmVersion::V2);
        assert_eq!(ascii_v1, ascii_v2);
    }

    #[test]
    fn default_result_types_per_purpose() {
        assert_eq!(KeyPurpose::Authentication.default_result_type(), ResultType::Long);
        assert_eq!(KeyPurpose::Identification.default_result_type(), ResultType::Name);
        assert_eq!(KeyPurpose::Recovery.default_result_type(), ResultType::Phrase);
    }
}
