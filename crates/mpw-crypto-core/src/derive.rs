//! Site result entry points: master key + site parameters → text.
//!
//! These compose [`derive_site_seed`] and [`encode`]. The seed lives only
//! for the duration of one call and is zeroed when it drops, on success
//! and on every error path.

use crate::algorithm::AlgorithmVersion;
use crate::encode::encode;
use crate::error::CoreError;
use crate::seed::{derive_site_seed, KeyPurpose};
use crate::stretch::MasterKey;
use crate::template::ResultType;

/// Derive a result for any purpose.
///
/// # Errors
///
/// - [`CoreError::InvalidCounter`] if `counter` is 0
/// - [`CoreError::UnsupportedResultType`] for stateful result types
/// - [`CoreError::KeyVersionMismatch`] if `master_key` belongs to another
///   version
pub fn derive_site_result(
    master_key: &MasterKey,
    site_name: &str,
    counter: u32,
    purpose: KeyPurpose,
    context: Option<&str>,
    result_type: ResultType,
    version: AlgorithmVersion,
) -> Result<String, CoreError> {
    let seed = derive_site_seed(master_key, purpose, site_name, counter, context, version)?;
    encode(&seed, result_type, version)
}

/// Derive a site password.
///
/// # Errors
///
/// See [`derive_site_result`].
pub fn derive_password(
    master_key: &MasterKey,
    site_name: &str,
    counter: u32,
    result_type: ResultType,
    context: Option<&str>,
    version: AlgorithmVersion,
) -> Result<String, CoreError> {
    derive_site_result(
        master_key,
        site_name,
        counter,
        KeyPurpose::Authentication,
        context,
        result_type,
        version,
    )
}

/// Derive a site login name.
///
/// # Errors
///
/// See [`derive_site_result`].
pub fn derive_login(
    master_key: &MasterKey,
    site_name: &str,
    counter: u32,
    result_type: ResultType,
    version: AlgorithmVersion,
) -> Result<String, CoreError> {
    derive_site_result(
        master_key,
        site_name,
        counter,
        KeyPurpose::Identification,
        None,
        result_type,
        version,
    )
}

/// Derive a security-question answer. `keyword` is the question's most
/// significant word; `None` gives the site-wide answer.
///
/// # Errors
///
/// See [`derive_site_result`].
pub fn derive_answer(
    master_key: &MasterKey,
    site_name: &str,
    counter: u32,
    result_type: ResultType,
    keyword: Option<&str>,
    version: AlgorithmVersion,
) -> Result<String, CoreError> {
    derive_site_result(
        master_key,
        site_name,
        counter,
        KeyPurpose::Recovery,
        keyword,
        result_type,
        version,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SecretBytes;
    use crate::stretch::MASTER_KEY_LEN;

    fn key() -> MasterKey {
        MasterKey::new(SecretBytes::new([0x42; MASTER_KEY_LEN]), AlgorithmVersion::V3)
    }

    #[test]
    fn password_is_deterministic() {
        let v = AlgorithmVersion::V3;
        let a = derive_password(&key(), "example.com", 1, ResultType::Long, None, v).unwrap();
        let b = derive_password(&key(), "example.com", 1, ResultType::Long, None, v).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn login_and_password_differ() {
        let v = AlgorithmVersion::V3;
        let password = derive_password(&key(), "example.com", 1, ResultType::Name, None, v).unwrap();
        let login = derive_login(&key(), "example.com", 1, ResultType::Name, v).unwrap();
        assert_ne!(password, login);
    }

    #[test]
    fn answer_keyword_changes_answer() {
        let v = AlgorithmVersion::V3;
        let site_wide = derive_answer(&key(), "example.com", 1, ResultType::Phrase, None, v).unwrap();
        let keyed =
            derive_answer(&key(), "example.com", 1, ResultType::Phrase, Some("mother"), v).unwrap();
        assert_ne!(site_wide, keyed);
    }

    #[test]
    fn counter_zero_fails_before_encoding() {
        let err = derive_password(
            &key(),
            "example.com",
            0,
            ResultType::StoredPersonal,
            None,
            AlgorithmVersion::V3,
        )
        .unwrap_err();
        assert_eq!(err, CoreError::InvalidCounter);
    }

    #[test]
    fn stored_type_is_unsupported() {
        let err = derive_password(
            &key(),
            "example.com",
            1,
            ResultType::StoredPersonal,
            None,
            AlgorithmVersion::V3,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedResultType { .. }));
    }
}
