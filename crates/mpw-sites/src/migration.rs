//! Moving site records to newer algorithm versions.
//!
//! Migration is one adjacent step at a time (V → V+1). A step that would
//! change a generated result for this record needs the user's explicit
//! consent; without it the record is left at its version and flagged with
//! [`SiteRecord::requires_explicit_migration`]. Stored result types never
//! need consent because their text does not come from the algorithm.

use mpw_crypto_core::AlgorithmVersion;

use crate::record::SiteRecord;

/// What a migration attempt did to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The record moved from `from` to `to`.
    Migrated {
        from: AlgorithmVersion,
        to: AlgorithmVersion,
    },
    /// The step would change the record's result and consent was not given.
    /// The record is flagged; calling again with consent lets it through.
    Refused,
    /// The requested version is not reachable from the record's version.
    NoMigration,
    /// The record is already at the engine's latest version.
    AlreadyLatest,
}

impl MigrationOutcome {
    /// `true` when the record's version changed.
    #[must_use]
    pub const fn is_migrated(self) -> bool {
        matches!(self, Self::Migrated { .. })
    }
}

/// Applies version migrations to site records.
///
/// The engine's latest version is normally [`AlgorithmVersion::latest`];
/// [`MigrationEngine::with_latest`] caps it lower, e.g. while a newer
/// version is still being rolled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationEngine {
    latest: AlgorithmVersion,
}

impl Default for MigrationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationEngine {
    /// Engine migrating up to [`AlgorithmVersion::latest`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AlgorithmVersion::latest(),
        }
    }

    /// Engine migrating no further than `latest`.
    #[must_use]
    pub const fn with_latest(latest: AlgorithmVersion) -> Self {
        Self { latest }
    }

    /// The version records are migrated towards.
    #[must_use]
    pub const fn latest(&self) -> AlgorithmVersion {
        self.latest
    }

    /// Try to move `record` one version forward.
    ///
    /// `user_name` is the identity's user name; it only feeds the consent
    /// check and is never logged.
    pub fn try_migrate(
        &self,
        record: &mut SiteRecord,
        user_name: &str,
        explicit_consent: bool,
    ) -> MigrationOutcome {
        if record.algorithm_version() >= self.latest {
            return MigrationOutcome::AlreadyLatest;
        }
        match record.algorithm_version().next() {
            Some(candidate) => self.try_migrate_to(record, user_name, candidate, explicit_consent),
            None => MigrationOutcome::AlreadyLatest,
        }
    }

    /// Try to move `record` to `candidate`, which must be the version
    /// directly after the record's own.
    pub fn try_migrate_to(
        &self,
        record: &mut SiteRecord,
        user_name: &str,
        candidate: AlgorithmVersion,
        explicit_consent: bool,
    ) -> MigrationOutcome {
        let from = record.algorithm_version();
        if from >= self.latest {
            return MigrationOutcome::AlreadyLatest;
        }
        if candidate > self.latest || !from.compatible_with(candidate) {
            tracing::debug!(%from, %candidate, "no migration path");
            return MigrationOutcome::NoMigration;
        }

        if !explicit_consent
            && candidate.entry_requires_consent(record.result_type(), record.site_name(), user_name)
        {
            record.flag_explicit_migration();
            tracing::info!(%from, to = %candidate, "site migration needs explicit consent");
            return MigrationOutcome::Refused;
        }

        record.advance_to(candidate);
        tracing::info!(%from, to = %candidate, "site migrated");
        MigrationOutcome::Migrated {
            from,
            to: candidate,
        }
    }

    /// Step `record` forward until it reaches the latest version or a step
    /// is refused.
    ///
    /// Returns [`MigrationOutcome::Migrated`] spanning every step taken when
    /// the record reached the latest version, [`MigrationOutcome::Refused`]
    /// when a step stopped it (earlier steps stay applied) and
    /// [`MigrationOutcome::AlreadyLatest`] when there was nothing to do.
    pub fn migrate_to_latest(
        &self,
        record: &mut SiteRecord,
        user_name: &str,
        explicit_consent: bool,
    ) -> MigrationOutcome {
        let from = record.algorithm_version();
        loop {
            let outcome = self.try_migrate(record, user_name, explicit_consent);
            if outcome.is_migrated() {
                continue;
            }
            return match outcome {
                MigrationOutcome::AlreadyLatest if record.algorithm_version() > from => {
                    MigrationOutcome::Migrated {
                        from,
                        to: record.algorithm_version(),
                    }
                }
                other => other,
            };
        }
    }
}

/// Migrate `record` as far as it can go with the default engine.
pub fn migrate_site_record(
    record: &mut SiteRecord,
    user_name: &str,
    explicit_consent: bool,
) -> MigrationOutcome {
    MigrationEngine::new().migrate_to_latest(record, user_name, explicit_consent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpw_crypto_core::ResultType;

    use mpw_crypto_core::AlgorithmVersion::{V0, V1, V2, V3};

    fn record(version: AlgorithmVersion) -> SiteRecord {
        SiteRecord::new("example.com", ResultType::Long, version)
    }

    #[test]
    fn one_step_with_consent() {
        let engine = MigrationEngine::new();
        let mut r = record(V1);
        let outcome = engine.try_migrate(&mut r, "user", true);
        assert_eq!(outcome, MigrationOutcome::Migrated { from: V1, to: V2 });
        assert_eq!(r.algorithm_version(), V2);
    }

    #[test]
    fn v0_to_v1_always_needs_consent_for_templates() {
        let engine = MigrationEngine::new();
        let mut r = record(V0);
        let outcome = engine.try_migrate(&mut r, "user", false);
        assert_eq!(outcome, MigrationOutcome::Refused);
        assert_eq!(r.algorithm_version(), V0);
        assert!(r.requires_explicit_migration());
    }

    #[test]
    fn ascii_names_migrate_silently_past_v1() {
        let engine = MigrationEngine::new();
        let mut r = record(V1);
        assert!(engine.try_migrate(&mut r, "user", false).is_migrated());
        assert!(engine.try_migrate(&mut r, "user", false).is_migrated());
        assert_eq!(r.algorithm_version(), V3);
    }

    #[test]
    fn non_ascii_user_name_gates_v3() {
        let engine = MigrationEngine::new();
        let mut r = record(V2);
        let outcome = engine.try_migrate(&mut r, "Zoë", false);
        assert_eq!(outcome, MigrationOutcome::Refused);
        assert!(r.requires_explicit_migration());

        let outcome = engine.try_migrate(&mut r, "Zoë", true);
        assert_eq!(outcome, MigrationOutcome::Migrated { from: V2, to: V3 });
        assert!(!r.requires_explicit_migration());
    }

    #[test]
    fn non_ascii_site_name_gates_v2() {
        let engine = MigrationEngine::new();
        let mut r = SiteRecord::new("ñandú.example", ResultType::Long, V1);
        let outcome = engine.try_migrate(&mut r, "user", false);
        assert_eq!(outcome, MigrationOutcome::Refused);
    }

    #[test]
    fn stored_types_never_need_consent() {
        let engine = MigrationEngine::new();
        let mut r = SiteRecord::new("ñandú.example", ResultType::StoredPersonal, V0);
        let outcome = engine.migrate_to_latest(&mut r, "Zoë", false);
        assert_eq!(outcome, MigrationOutcome::Migrated { from: V0, to: V3 });
    }

    #[test]
    fn skipping_a_version_is_no_migration() {
        let engine = MigrationEngine::new();
        let mut r = record(V0);
        assert_eq!(engine.try_migrate_to(&mut r, "user", V2, true), MigrationOutcome::NoMigration);
        assert_eq!(engine.try_migrate_to(&mut r, "user", V0, true), MigrationOutcome::NoMigration);
        assert_eq!(r.algorithm_version(), V0);
        assert!(!r.requires_explicit_migration());
    }

    #[test]
    fn latest_is_idempotent() {
        let engine = MigrationEngine::new();
        let mut r = record(V3);
        let before = r.clone();
        assert_eq!(engine.try_migrate(&mut r, "user", true), MigrationOutcome::AlreadyLatest);
        assert_eq!(engine.migrate_to_latest(&mut r, "user", true), MigrationOutcome::AlreadyLatest);
        assert_eq!(r, before);
    }

    #[test]
    fn capped_engine_stops_early() {
        let engine = MigrationEngine::with_latest(V2);
        let mut r = record(V1);
        let outcome = engine.migrate_to_latest(&mut r, "user", true);
        assert_eq!(outcome, MigrationOutcome::Migrated { from: V1, to: V2 });
        assert_eq!(engine.try_migrate(&mut r, "user", true), MigrationOutcome::AlreadyLatest);
        assert_eq!(engine.try_migrate_to(&mut r, "user", V3, true), MigrationOutcome::AlreadyLatest);
    }

    #[test]
    fn non_ascii_user_name_gates_every_step() {
        let engine = MigrationEngine::new();
        let mut r = record(V1);
        let outcome = engine.try_migrate(&mut r, "Zoë", false);
        assert_eq!(outcome, MigrationOutcome::Refused);
        assert_eq!(r.algorithm_version(), V1);
    }

    #[test]
    fn migrate_site_record_reports_refusal() {
        let mut r = SiteRecord::new("ñandú.example", ResultType::Long, V1);
        let outcome = migrate_site_record(&mut r, "user", false);
        assert_eq!(outcome, MigrationOutcome::Refused);
        assert_eq!(r.algorithm_version(), V1);
        assert!(r.requires_explicit_migration());

        let outcome = migrate_site_record(&mut r, "user", true);
        assert_eq!(outcome, MigrationOutcome::Migrated { from: V1, to: V3 });
        assert!(!r.requires_explicit_migration());
    }
}
