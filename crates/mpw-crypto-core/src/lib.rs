//! `mpw-crypto-core`: deterministic site password derivation.
//!
//! The same user name, master password and site parameters reproduce the
//! same result under a given [`AlgorithmVersion`], on every platform and in
//! every release. Nothing is stored or cached here.
//!
//! ```text
//! derive_master_key ──► MasterKey ──► derive_site_seed ──► SiteSeed ──► encode ──► text
//!        (scrypt)                        (HMAC-SHA-256)                 (templates)
//! ```
//!
//! This crate is the audit target: zero I/O, zero async.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod algorithm;
pub mod template;

pub mod stretch;
pub mod seed;
pub mod encode;

pub mod derive;

pub mod identicon;

pub use algorithm::{AlgorithmVersion, MigrationGate, SeedByteRule, StretchParams, TextLength};
pub use derive::{derive_answer, derive_login, derive_password, derive_site_result};
pub use encode::encode;
pub use error::CoreError;
pub use identicon::{identicon, Identicon, IdenticonColor, IdenticonPart, IDENTICON_LEN};
pub use memory::{LockedRegion, SecretBytes};
pub use seed::{derive_site_seed, KeyPurpose, SiteSeed, SITE_SEED_LEN};
pub use stretch::{derive_master_key, derive_master_key_cancellable, MasterKey, MASTER_KEY_LEN};
pub use template::{CharacterClass, ResultType, ResultTypeClass, Template};

pub use secrecy::SecretString;
