//! Schema migrations for the requests document.
//!
//! Each step upgrades exactly one version. Steps are idempotent, so a
//! document that already has the newer shape passes through unchanged.

use crate::error::MigrationError;
use crate::requests::{CURRENT_VERSION, RequestsConfig};

/// Upgrades `config` to [`CURRENT_VERSION`], one step at a time.
///
/// Returns the migrated document and whether any step ran.
///
/// # Errors
///
/// Returns [`MigrationError::UnknownVersion`] when the stored version is
/// newer than this build understands. Nothing is applied in that case.
pub fn migrate(mut config: RequestsConfig) -> Result<(RequestsConfig, bool), MigrationError> {
    if config.version > CURRENT_VERSION {
        return Err(MigrationError::UnknownVersion {
            found: config.version,
            current: CURRENT_VERSION,
        });
    }

    let migrated = config.version < CURRENT_VERSION;
    while config.version < CURRENT_VERSION {
        config = migrate_from_version(config)?;
    }
    Ok((config, migrated))
}

/// Applies the single step that leaves `config.version` one higher.
///
/// # Errors
///
/// Returns [`MigrationError::UnknownVersion`] for versions with no step.
pub fn migrate_from_version(mut config: RequestsConfig) -> Result<RequestsConfig, MigrationError> {
    match config.version {
        // Legacy files predate the version field; the layout is otherwise v1.
        0 => {}
        1 => initialize_root_order(&mut config),
        found => {
            return Err(MigrationError::UnknownVersion {
                found,
                current: CURRENT_VERSION,
            });
        }
    }
    config.version += 1;
    Ok(config)
}

fn initialize_root_order(config: &mut RequestsConfig) {
    if !config.root_order.is_empty() {
        return;
    }
    config.root_order = config
        .ordered_roots()
        .into_iter()
        .map(ToString::to_string)
        .collect();
}
