//! Site records: the per-site metadata a platform layer persists.
//!
//! A record holds no secret material. Its algorithm version and migration
//! flag change only through [`MigrationEngine`](crate::migration::MigrationEngine).

use mpw_crypto_core::{AlgorithmVersion, ResultType};
use serde::{Deserialize, Serialize};

/// Counter a new site starts at.
pub const INITIAL_COUNTER: u32 = 1;

/// Stored metadata for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    site_name: String,
    algorithm_version: AlgorithmVersion,
    result_type: ResultType,
    #[serde(default = "default_counter")]
    counter: u32,
    #[serde(default)]
    requires_explicit_migration: bool,
}

const fn default_counter() -> u32 {
    INITIAL_COUNTER
}

impl SiteRecord {
    /// A new record at [`INITIAL_COUNTER`] with no pending migration.
    #[must_use]
    pub fn new(
        site_name: impl Into<String>,
        result_type: ResultType,
        algorithm_version: AlgorithmVersion,
    ) -> Self {
        Self {
            site_name: site_name.into(),
            algorithm_version,
            result_type,
            counter: INITIAL_COUNTER,
            requires_explicit_migration: false,
        }
    }

    /// Same record with a different counter. A counter of 0 is stored as is
    /// and rejected by the core at derivation time.
    #[must_use]
    pub const fn with_counter(mut self, counter: u32) -> Self {
        self.counter = counter;
        self
    }

    /// The site name, exactly as entered.
    #[must_use]
    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// The algorithm version results are currently derived with.
    #[must_use]
    pub const fn algorithm_version(&self) -> AlgorithmVersion {
        self.algorithm_version
    }

    /// The result type.
    #[must_use]
    pub const fn result_type(&self) -> ResultType {
        self.result_type
    }

    /// The site counter.
    #[must_use]
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// `true` after an automatic migration was refused; the caller should
    /// ask the user before migrating with consent.
    #[must_use]
    pub const fn requires_explicit_migration(&self) -> bool {
        self.requires_explicit_migration
    }

    pub(crate) fn advance_to(&mut self, version: AlgorithmVersion) {
        self.algorithm_version = version;
        self.requires_explicit_migration = false;
    }

    pub(crate) fn flag_explicit_migration(&mut self) {
        self.requires_explicit_migration = true;
    }
}
