#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Migration combined with real derivation: a consented step changes the
//! derived password, a refused one leaves it as it was.

use mpw_crypto_core::{
    derive_master_key, derive_password, AlgorithmVersion, ResultType, SecretString,
};
use mpw_sites::{
    migrate_site_record, MigrationEngine, MigrationOutcome, SiteRecord, UserPreferences,
};

fn password_for(user_name: &str, record: &SiteRecord) -> String {
    let version = record.algorithm_version();
    let key =
        derive_master_key(user_name, &SecretString::from("banana".to_owned()), version).unwrap();
    derive_password(
        &key,
        record.site_name(),
        record.counter(),
        record.result_type(),
        None,
        version,
    )
    .unwrap()
}

#[test]
fn refused_migration_keeps_the_password() {
    let mut record = SiteRecord::new("example.com", ResultType::Long, AlgorithmVersion::V2);
    let before = password_for("Zoë", &record);
    assert_eq!(before, "Hunb6#ZojeGaxr");

    let outcome = MigrationEngine::new().try_migrate(&mut record, "Zoë", false);
    assert_eq!(outcome, MigrationOutcome::Refused);
    assert!(record.requires_explicit_migration());
    assert_eq!(password_for("Zoë", &record), before);
}

#[test]
fn consented_migration_changes_the_password() {
    let mut record = SiteRecord::new("example.com", ResultType::Long, AlgorithmVersion::V2);
    let outcome = MigrationEngine::new().try_migrate(&mut record, "Zoë", true);
    assert_eq!(
        outcome,
        MigrationOutcome::Migrated {
            from: AlgorithmVersion::V2,
            to: AlgorithmVersion::V3
        }
    );
    assert!(!record.requires_explicit_migration());
    assert_eq!(password_for("Zoë", &record), "Xonr5,FoydCodi");
}

#[test]
fn silent_migration_keeps_ascii_passwords() {
    // V1 → V3 only changes how multi-byte names are measured.
    let mut record = SiteRecord::new("example.com", ResultType::Long, AlgorithmVersion::V1);
    let before = password_for("robot", &record);
    let outcome = migrate_site_record(&mut record, "robot", false);
    assert_eq!(
        outcome,
        MigrationOutcome::Migrated {
            from: AlgorithmVersion::V1,
            to: AlgorithmVersion::V3
        }
    );
    assert_eq!(password_for("robot", &record), before);
}

#[test]
fn records_from_preferences_are_already_latest() {
    let prefs = UserPreferences::default();
    let mut record = prefs.new_site_record("example.com");
    assert_eq!(
        migrate_site_record(&mut record, "robot", false),
        MigrationOutcome::AlreadyLatest
    );
    assert_eq!(password_for("robot", &record), "JoziHaczXopd6!");
}

#[test]
fn migrated_record_survives_serialization() {
    let mut record = SiteRecord::new("ñandú.example", ResultType::Long, AlgorithmVersion::V1);
    assert!(matches!(
        migrate_site_record(&mut record, "robot", false),
        MigrationOutcome::Refused
    ));
    let json = serde_json::to_string(&record).unwrap();
    let restored: SiteRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, record);
    assert!(restored.requires_explicit_migration());
    assert_eq!(restored.algorithm_version(), AlgorithmVersion::V1);
}
