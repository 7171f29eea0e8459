//! Frozen algorithm versions.
//!
//! Every constant that differs between versions lives in exactly one
//! [`VersionConstants`] bundle here: the stretch parameters, scope strings,
//! how text lengths are measured, how seed bytes are read, the template
//! catalog, and what stepping into the version requires from a migration.
//!
//! # Append-only
//!
//! A released bundle is never edited. Changing any field silently changes
//! every password derived under that version; a behavioural fix ships as a
//! new variant instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::seed::KeyPurpose;
use crate::template::{Catalog, ResultType, Template, CATALOG_V0};

// ---------------------------------------------------------------------------
// Per-version rules
// ---------------------------------------------------------------------------

/// How the length prefix of a text field is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextLength {
    /// Number of Unicode scalar values.
    Characters,
    /// Number of UTF-8 bytes.
    Bytes,
}

impl TextLength {
    /// Measure `text` under this rule.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InputTooLong`] if the length does not fit a `u32`.
    pub fn measure(self, text: &str) -> Result<u32, CoreError> {
        let len = match self {
            Self::Characters => text.chars().count(),
            Self::Bytes => text.len(),
        };
        u32::try_from(len).map_err(|_| CoreError::InputTooLong(text.len()))
    }

    /// Append a big-endian `u32` length followed by the UTF-8 bytes of `text`.
    pub(crate) fn push_prefixed(self, buf: &mut Vec<u8>, text: &str) -> Result<(), CoreError> {
        buf.extend_from_slice(&self.measure(text)?.to_be_bytes());
        buf.extend_from_slice(text.as_bytes());
        Ok(())
    }
}

/// How a seed byte becomes a table index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedByteRule {
    /// The byte is sign-extended to 16 bits and byte-swapped:
    /// `(b << 8) | (0xFF if b >= 0x80 else 0x00)`.
    SwappedWord,
    /// The byte is used as is.
    Byte,
}

impl SeedByteRule {
    /// The index value of `byte` under this rule.
    #[must_use]
    pub const fn index(self, byte: u8) -> usize {
        match self {
            Self::SwappedWord => {
                let low = if byte & 0x80 == 0 { 0x00 } else { 0xFF };
                u16::from_be_bytes([byte, low]) as usize
            }
            Self::Byte => byte as usize,
        }
    }
}

/// What a template-class site must satisfy to step into a version without
/// the user's explicit consent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationGate {
    /// Nothing migrates into this version.
    Unreachable,
    /// Every generated result changes; consent is always required.
    AlwaysConsent,
    /// Results change iff the site name is not one byte per character.
    SiteNameEncoding,
    /// Results change iff the user name is not one byte per character.
    UserNameEncoding,
}

/// scrypt work parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StretchParams {
    /// log2 of the CPU/memory cost `N`.
    pub log_n: u8,
    /// Block size `r`.
    pub r: u32,
    /// Parallelism `p`.
    pub p: u32,
    /// Output length in bytes.
    pub key_len: usize,
}

/// The scope string of each key purpose.
#[derive(Clone, Copy, Debug)]
struct Scopes {
    authentication: &'static str,
    identification: &'static str,
    recovery: &'static str,
}

/// Everything one released version pins.
struct VersionConstants {
    namespace: &'static str,
    scopes: Scopes,
    stretch: StretchParams,
    user_name_length: TextLength,
    site_name_length: TextLength,
    seed_bytes: SeedByteRule,
    catalog: &'static Catalog,
    gate: MigrationGate,
}

const NAMESPACE: &str = "com.lyndir.masterpassword";

const SCOPES: Scopes = Scopes {
    authentication: "com.lyndir.masterpassword",
    identification: "com.lyndir.masterpassword.login",
    recovery: "com.lyndir.masterpassword.answer",
};

/// N = 32768, r = 8, p = 2, 64-byte key.
const STRETCH: StretchParams = StretchParams {
    log_n: 15,
    r: 8,
    p: 2,
    key_len: 64,
};

const V0: VersionConstants = VersionConstants {
    namespace: NAMESPACE,
    scopes: SCOPES,
    stretch: STRETCH,
    user_name_length: TextLength::Characters,
    site_name_length: TextLength::Characters,
    seed_bytes: SeedByteRule::SwappedWord,
    catalog: &CATALOG_V0,
    gate: MigrationGate::Unreachable,
};

const V1: VersionConstants = VersionConstants {
    namespace: NAMESPACE,
    scopes: SCOPES,
    stretch: STRETCH,
    user_name_length: TextLength::Characters,
    site_name_length: TextLength::Characters,
    seed_bytes: SeedByteRule::Byte,
    catalog: &CATALOG_V0,
    gate: MigrationGate::AlwaysConsent,
};

const V2: VersionConstants = VersionConstants {
    namespace: NAMESPACE,
    scopes: SCOPES,
    stretch: STRETCH,
    user_name_length: TextLength::Characters,
    site_name_length: TextLength::Bytes,
    seed_bytes: SeedByteRule::Byte,
    catalog: &CATALOG_V0,
    gate: MigrationGate::SiteNameEncoding,
};

const V3: VersionConstants = VersionConstants {
    namespace: NAMESPACE,
    scopes: SCOPES,
    stretch: STRETCH,
    user_name_length: TextLength::Bytes,
    site_name_length: TextLength::Bytes,
    seed_bytes: SeedByteRule::Byte,
    catalog: &CATALOG_V0,
    gate: MigrationGate::UserNameEncoding,
};

// ---------------------------------------------------------------------------
// AlgorithmVersion
// ---------------------------------------------------------------------------

/// A frozen derivation algorithm. Ordered: `V0 < V1 < V2 < V3`.
///
/// Persisted as its number (`0`..=`3`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum AlgorithmVersion {
    /// The original algorithm.
    V0,
    /// Reads seed bytes as bytes instead of swapped 16-bit words.
    V1,
    /// Measures site names in UTF-8 bytes.
    V2,
    /// Measures user names in UTF-8 bytes.
    V3,
}

impl AlgorithmVersion {
    /// Every released version, oldest first.
    pub const ALL: [Self; 4] = [Self::V0, Self::V1, Self::V2, Self::V3];

    /// The newest released version; the terminal state of migration.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V3
    }

    /// The stored version number.
    #[must_use]
    pub const fn number(self) -> u32 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }

    /// Look up a stored version number.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownVersion`] for numbers with no released
    /// algorithm.
    pub const fn from_number(number: u32) -> Result<Self, CoreError> {
        match number {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            other => Err(CoreError::UnknownVersion(other)),
        }
    }

    /// The version one step newer, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::V0 => Some(Self::V1),
            Self::V1 => Some(Self::V2),
            Self::V2 => Some(Self::V3),
            Self::V3 => None,
        }
    }

    /// Returns `true` if a record at `self` may step directly to `other`.
    #[must_use]
    pub fn compatible_with(self, other: Self) -> bool {
        self.next() == Some(other)
    }

    const fn constants(self) -> &'static VersionConstants {
        match self {
            Self::V0 => &V0,
            Self::V1 => &V1,
            Self::V2 => &V2,
            Self::V3 => &V3,
        }
    }

    /// Product namespace prefixed to the stretch salt.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        self.constants().namespace
    }

    /// scrypt parameters.
    #[must_use]
    pub const fn stretch_params(self) -> StretchParams {
        self.constants().stretch
    }

    /// Scope string for a key purpose.
    #[must_use]
    pub const fn scope(self, purpose: KeyPurpose) -> &'static str {
        let scopes = &self.constants().scopes;
        match purpose {
            KeyPurpose::Authentication => scopes.authentication,
            KeyPurpose::Identification => scopes.identification,
            KeyPurpose::Recovery => scopes.recovery,
        }
    }

    /// Length rule for the user name in the stretch salt.
    #[must_use]
    pub const fn user_name_length(self) -> TextLength {
        self.constants().user_name_length
    }

    /// Length rule for the site name and context in the seed message.
    #[must_use]
    pub const fn site_name_length(self) -> TextLength {
        self.constants().site_name_length
    }

    /// How seed bytes index templates and alphabets.
    #[must_use]
    pub const fn seed_byte_rule(self) -> SeedByteRule {
        self.constants().seed_bytes
    }

    /// What stepping into this version requires.
    #[must_use]
    pub const fn migration_gate(self) -> MigrationGate {
        self.constants().gate
    }

    /// The template list for `result_type`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedResultType`] for stateful types.
    pub fn templates(self, result_type: ResultType) -> Result<&'static [Template], CoreError> {
        self.constants()
            .catalog
            .templates(result_type)
            .filter(|templates| !templates.is_empty())
            .ok_or(CoreError::UnsupportedResultType {
                result_type,
                version: self,
            })
    }

    /// Returns `true` if a template-class site would need the user's consent
    /// to step into this version.
    ///
    /// On top of the version's own gate, a user name that is not one byte
    /// per character needs consent at every reachable step. The test
    /// compares the character count against the UTF-8 byte length.
    /// Stateful result types never need consent because nothing about them
    /// is derived.
    #[must_use]
    pub fn entry_requires_consent(
        self,
        result_type: ResultType,
        site_name: &str,
        user_name: &str,
    ) -> bool {
        if !result_type.is_generated() {
            return false;
        }
        match self.migration_gate() {
            MigrationGate::Unreachable => false,
            MigrationGate::AlwaysConsent => true,
            MigrationGate::SiteNameEncoding => {
                !is_single_byte_per_char(site_name) || !is_single_byte_per_char(user_name)
            }
            MigrationGate::UserNameEncoding => !is_single_byte_per_char(user_name),
        }
    }
}

fn is_single_byte_per_char(text: &str) -> bool {
    text.chars().count() == text.len()
}

impl Default for AlgorithmVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for AlgorithmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

impl From<AlgorithmVersion> for u32 {
    fn from(version: AlgorithmVersion) -> Self {
        version.number()
    }
}

impl TryFrom<u32> for AlgorithmVersion {
    type Error = CoreError;

    fn try_from(number: u32) -> Result<Self, Self::Error> {
        Self::from_number(number)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
