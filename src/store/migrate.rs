use crate::store::keys;
use crate::store::operations::settings::Settings;
use crate::store::operations::stats::SessionStats;
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![("001_seed_defaults", m001_seed_defaults)]
}

/// Applies every migration newer than the stored schema version.
///
/// Migrations must be idempotent: a crash between a migration and its
/// `set_version` re-runs it on the next start. The version is persisted after
/// each step and never moves backwards.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(keys::SCHEMA_VERSION.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Migration {
                version: 0,
                message: format!("schema version has {} bytes, expected 4", raw.len()),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .meta
        .insert(keys::SCHEMA_VERSION.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_seed_defaults(store: &Store) -> Result<(), StoreError> {
    if !store.has_settings()? {
        store.save_settings(&Settings::default())?;
    }
    if !store.has_stats()? {
        store.save_stats(&SessionStats::default())?;
    }
    Ok(())
}
