//! Redb-backed settings.
//!
//! One table of string settings. Every write is its own transaction, so the
//! stored mode survives a crash between selection and broadcast.

use std::{path::Path, sync::Arc};

use redb::{Database, TableDefinition};
use tandem_core::{SettingsStore, StoreError};

/// Table: settings
/// Key: setting name
/// Value: setting value as written
const SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings");

/// Durable settings store.
///
/// Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbSettings {
    db: Arc<Database>,
}

impl RedbSettings {
    /// Open or create a database at `path` and make sure the settings table
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        let txn = db.begin_write().map_err(io)?;
        {
            let _ = txn.open_table(SETTINGS).map_err(io)?;
        }
        txn.commit().map_err(io)?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl SettingsStore for RedbSettings {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(SETTINGS).map_err(io)?;
        let value = table.get(key).map_err(io)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(io)?;
        {
            let mut table = txn.open_table(SETTINGS).map_err(io)?;
            table.insert(key, value).map_err(io)?;
        }
        txn.commit().map_err(io)?;
        Ok(())
    }
}

#[allow(clippy::needless_pass_by_value)]
fn io(error: impl std::error::Error) -> StoreError {
    StoreError::Io(error.to_string())
}

#[cfg(test)]
mod tests {
    use tandem_core::{CURRENT_MODE_KEY, ModeStore};
    use tandem_proto::Mode;

    use super::*;

    #[test]
    fn missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RedbSettings::open(dir.path().join("settings.redb")).unwrap();

        assert_eq!(settings.get(CURRENT_MODE_KEY).unwrap(), None);
    }

    #[test]
    fn mode_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.redb");

        {
            let modes = ModeStore::new(Arc::new(RedbSettings::open(&path).unwrap()));
            modes.register_defaults().unwrap();
            assert_eq!(modes.current(), Mode::Undefined);
            modes.set(Mode::Secondary).unwrap();
        }

        let reopened = RedbSettings::open(&path).unwrap();
        assert_eq!(reopened.get(CURRENT_MODE_KEY).unwrap().as_deref(), Some("secondary"));

        // Defaults never overwrite a stored value
        let modes = ModeStore::new(Arc::new(reopened));
        modes.register_defaults().unwrap();
        assert_eq!(modes.current(), Mode::Secondary);
    }

    #[test]
    fn last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let settings = RedbSettings::open(dir.path().join("settings.redb")).unwrap();

        settings.set("k", "first").unwrap();
        settings.set("k", "second").unwrap();

        assert_eq!(settings.get("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn unopenable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RedbSettings::open(dir.path().join("missing").join("settings.redb"));

        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
