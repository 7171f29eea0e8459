//! Per-user defaults, stored as plain JSON next to the site records.
//!
//! Nothing here is sensitive: no secrets and no user name. The file is
//! readable before the master password is entered, so new sites can be
//! set up with the user's preferred result types straight away.

use std::fs;
use std::path::Path;

use mpw_crypto_core::{AlgorithmVersion, ResultType};
use serde::{Deserialize, Serialize};

use crate::record::{SiteRecord, INITIAL_COUNTER};

/// Defaults applied to new sites.
///
/// Persisted to `{data_dir}/preferences.json`. Every field has a default,
/// so partial files load cleanly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Result type for new site passwords.
    #[serde(default = "default_result_type")]
    pub default_result_type: ResultType,

    /// Result type for generated login names.
    #[serde(default = "default_login_type")]
    pub default_login_type: ResultType,

    /// Result type for security answers.
    #[serde(default = "default_answer_type")]
    pub default_answer_type: ResultType,

    /// Counter new sites start at.
    #[serde(default = "default_counter")]
    pub default_counter: u32,

    /// Version new sites are created under.
    #[serde(default)]
    pub algorithm_version: AlgorithmVersion,

    /// Whether to hide the identicon next to the user name.
    #[serde(default)]
    pub hide_identicon: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_result_type: default_result_type(),
            default_login_type: default_login_type(),
            default_answer_type: default_answer_type(),
            default_counter: default_counter(),
            algorithm_version: AlgorithmVersion::latest(),
            hide_identicon: false,
        }
    }
}

const fn default_result_type() -> ResultType {
    ResultType::Long
}
const fn default_login_type() -> ResultType {
    ResultType::Name
}
const fn default_answer_type() -> ResultType {
    ResultType::Phrase
}
const fn default_counter() -> u32 {
    INITIAL_COUNTER
}

// ── File I/O ───────────────────────────────────────────────────────

const PREFERENCES_FILE: &str = "preferences.json";

impl UserPreferences {
    /// Load preferences from `{data_dir}/preferences.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing or does not
    /// parse.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(PREFERENCES_FILE);
        fs::read_to_string(&path).map_or_else(
            |_| Self::default(),
            |contents| {
                serde_json::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!("preferences file unreadable, using defaults: {e}");
                    Self::default()
                })
            },
        )
    }

    /// Persist preferences to `{data_dir}/preferences.json`.
    ///
    /// Writes to a temporary file and renames it into place.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the directory does not exist or the
    /// file system rejects the write or rename.
    pub fn save(&self, data_dir: &Path) -> std::io::Result<()> {
        let path = data_dir.join(PREFERENCES_FILE);
        let tmp = data_dir.join(".preferences.json.tmp");

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(&tmp, &json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// A new site record using these defaults.
    #[must_use]
    pub fn new_site_record(&self, site_name: impl Into<String>) -> SiteRecord {
        SiteRecord::new(site_name, self.default_result_type, self.algorithm_version)
            .with_counter(self.default_counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_values_are_correct() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.default_result_type, ResultType::Long);
        assert_eq!(prefs.default_login_type, ResultType::Name);
        assert_eq!(prefs.default_answer_type, ResultType::Phrase);
        assert_eq!(prefs.default_counter, 1);
        assert_eq!(prefs.algorithm_version, AlgorithmVersion::latest());
        assert!(!prefs.hide_identicon);
    }

    #[test]
    fn load_returns_default_on_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(UserPreferences::load(dir.path()), UserPreferences::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let prefs = UserPreferences {
            default_result_type: ResultType::Maximum,
            algorithm_version: AlgorithmVersion::V2,
            hide_identicon: true,
            ..UserPreferences::default()
        };
        prefs.save(dir.path()).unwrap();
        assert_eq!(UserPreferences::load(dir.path()), prefs);
    }

    #[test]
    fn load_recovers_from_corrupt_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), "{ not json ]").unwrap();
        assert_eq!(UserPreferences::load(dir.path()), UserPreferences::default());
    }

    #[test]
    fn load_rejects_unknown_version_as_corrupt() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PREFERENCES_FILE), r#"{"algorithmVersion":9}"#).unwrap();
        assert_eq!(UserPreferences::load(dir.path()), UserPreferences::default());
    }

    #[test]
    fn load_handles_partial_json_with_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PREFERENCES_FILE),
            r#"{"defaultResultType":"pin","algorithmVersion":1}"#,
        )
        .unwrap();
        let prefs = UserPreferences::load(dir.path());
        assert_eq!(prefs.default_result_type, ResultType::Pin);
        assert_eq!(prefs.algorithm_version, AlgorithmVersion::V1);
        assert_eq!(prefs.default_login_type, ResultType::Name);
        assert_eq!(prefs.default_counter, 1);
    }

    #[test]
    fn save_is_atomic_via_tmp_file() {
        let dir = TempDir::new().unwrap();
        UserPreferences::default().save(dir.path()).unwrap();
        assert!(!dir.path().join(".preferences.json.tmp").exists());
        assert!(dir.path().join(PREFERENCES_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn save_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        UserPreferences::default().save(dir.path()).unwrap();
        let mode = fs::metadata(dir.path().join(PREFERENCES_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn new_site_record_uses_defaults() {
        let prefs = UserPreferences {
            default_result_type: ResultType::Basic,
            default_counter: 4,
            algorithm_version: AlgorithmVersion::V1,
            ..UserPreferences::default()
        };
        let record = prefs.new_site_record("example.com");
        assert_eq!(record.site_name(), "example.com");
        assert_eq!(record.result_type(), ResultType::Basic);
        assert_eq!(record.counter(), 4);
        assert_eq!(record.algorithm_version(), AlgorithmVersion::V1);
        assert!(!record.requires_explicit_migration());
    }
}
