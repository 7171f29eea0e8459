//! `mpw-sites`: site records, version migration and user preferences.
//!
//! Everything here is non-secret metadata around [`mpw_crypto_core`].
//! Deriving a site's result takes its record's version, counter and result
//! type; migrating the record is the only way its version changes.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod migration;
pub mod preferences;
pub mod record;

pub use migration::{migrate_site_record, MigrationEngine, MigrationOutcome};
pub use preferences::UserPreferences;
pub use record::{SiteRecord, INITIAL_COUNTER};
