//! scrypt password stretching: (user name, master password) → master key.
//!
//! The salt is the version's namespace, followed by the user name's length
//! as a big-endian `u32` (measured under the version's rule), followed by
//! the user name's UTF-8 bytes. Work parameters are the version's frozen
//! [`StretchParams`](crate::algorithm::StretchParams).
//!
//! Stretching takes on the order of a second by design. Run it off any
//! latency-sensitive thread; [`derive_master_key_cancellable`] lets a caller
//! abandon the result.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use ring::digest;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::algorithm::AlgorithmVersion;
use crate::error::CoreError;
use crate::memory::SecretBytes;

/// Master key length in bytes (512 bits).
pub const MASTER_KEY_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A stretched master key, bound to the version it was derived under.
///
/// Zeroed on drop. `Debug` shows only the version.
pub struct MasterKey {
    bytes: SecretBytes<MASTER_KEY_LEN>,
    version: AlgorithmVersion,
}

impl MasterKey {
    pub(crate) fn new(bytes: SecretBytes<MASTER_KEY_LEN>, version: AlgorithmVersion) -> Self {
        Self { bytes, version }
    }

    /// The algorithm version this key was stretched under.
    #[must_use]
    pub const fn version(&self) -> AlgorithmVersion {
        self.version
    }

    /// Expose the raw key bytes. Use only as HMAC key material.
    #[must_use]
    pub const fn expose(&self) -> &[u8; MASTER_KEY_LEN] {
        self.bytes.expose()
    }

    /// Upper-case hex SHA-256 of the key.
    ///
    /// Not secret: callers store it to recognise a mistyped master password
    /// without storing anything that derives passwords.
    #[must_use]
    pub fn key_id(&self) -> String {
        let hash = digest::digest(&digest::SHA256, self.bytes.expose());
        data_encoding::HEXUPPER.encode(hash.as_ref())
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey({}, ***)", self.version)
    }
}

// ---------------------------------------------------------------------------
// Stretching
// ---------------------------------------------------------------------------

/// Stretch a user name and master password into a [`MasterKey`].
///
/// Any user name and password are accepted, including empty ones.
///
/// # Errors
///
/// Returns [`CoreError::Stretch`] if scrypt rejects the frozen parameters
/// or fails to allocate, and [`CoreError::InputTooLong`] if the user name's
/// length does not fit the 32-bit prefix.
pub fn derive_master_key(
    user_name: &str,
    master_password: &SecretString,
    version: AlgorithmVersion,
) -> Result<MasterKey, CoreError> {
    let salt = master_key_salt(user_name, version)?;
    let params = version.stretch_params();

    let scrypt_params = scrypt::Params::new(params.log_n, params.r, params.p, params.key_len)
        .map_err(|e| CoreError::Stretch(format!("invalid scrypt params: {e}")))?;

    let started = Instant::now();
    // scrypt writes straight into the zeroize-on-drop buffer, which is wiped
    // if it fails. A later move of `SecretBytes` may still leave a stale
    // copy in a dead stack slot; zeroize cannot reach those.
    let mut output = SecretBytes::new([0u8; MASTER_KEY_LEN]);
    scrypt::scrypt(
        master_password.expose_secret().as_bytes(),
        &salt,
        &scrypt_params,
        output.expose_mut(),
    )
    .map_err(|e| CoreError::Stretch(format!("scrypt derivation failed: {e}")))?;

    tracing::debug!(
        %version,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "master key stretched"
    );

    Ok(MasterKey::new(output, version))
}

/// [`derive_master_key`], abandoning the result if `cancel` is set.
///
/// The flag is checked before stretching starts and after it finishes; a
/// key produced after cancellation is dropped (and zeroed) unseen.
///
/// # Errors
///
/// Returns [`CoreError::Cancelled`] if `cancel` was set, otherwise whatever
/// [`derive_master_key`] returns.
pub fn derive_master_key_cancellable(
    user_name: &str,
    master_password: &SecretString,
    version: AlgorithmVersion,
    cancel: &AtomicBool,
) -> Result<MasterKey, CoreError> {
    if cancel.load(Ordering::Acquire) {
        return Err(CoreError::Cancelled);
    }
    let key = derive_master_key(user_name, master_password, version)?;
    if cancel.load(Ordering::Acquire) {
        tracing::debug!(%version, "master key discarded after cancellation");
        return Err(CoreError::Cancelled);
    }
    Ok(key)
}

/// `namespace ‖ be32(len(user_name)) ‖ user_name`.
fn master_key_salt(
    user_name: &str,
    version: AlgorithmVersion,
) -> Result<Zeroizing<Vec<u8>>, CoreError> {
    let namespace = version.namespace();
    let mut salt = Zeroizing::new(Vec::with_capacity(
        namespace.len().saturating_add(4).saturating_add(user_name.len()),
    ));
    salt.extend_from_slice(namespace.as_bytes());
    version
        .user_name_length()
        .push_prefixed(&mut salt, user_name)?;
    Ok(salt)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
