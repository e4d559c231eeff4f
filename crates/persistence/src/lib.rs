//! Save persistence.
//!
//! A save is the whole [`WorldState`] as JSON. It can live in a directory of
//! files ([`FileStore`]), in memory ([`MemoryStore`]) or in a SQLite slot
//! table. Loading always runs the same path: adopt a legacy key if needed,
//! lift old shapes with [`upgrade_value`], decode, then hydrate.

mod error;
pub mod sqlite;
pub mod store;
pub mod upgrade;

pub use error::PersistError;
pub use sqlite::{create_save, default_sqlite_url, init_db, read_world, write_world};
pub use store::{adopt_legacy, FileStore, MemoryStore, SaveStore, LEGACY_KEYS, SAVE_KEY};
pub use upgrade::upgrade_value;

use sim_core::world::SCHEMA_VERSION;
use sim_core::WorldState;
use tracing::info;

/// Serialize a world for storage.
pub fn encode_world(world: &WorldState) -> Result<String, PersistError> {
    Ok(serde_json::to_string(world)?)
}

/// Parse a save of any known vintage into a repaired world.
pub fn decode_world(json: &str) -> Result<WorldState, PersistError> {
    let raw: serde_json::Value = serde_json::from_str(json)?;
    let version = raw
        .get("schemaVersion")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(1);
    if version > u64::from(SCHEMA_VERSION) {
        return Err(PersistError::FutureSchema(u32::try_from(version).unwrap_or(u32::MAX)));
    }
    let mut world: WorldState = serde_json::from_value(upgrade_value(raw))?;
    sim_runtime::hydrate(&mut world);
    Ok(world)
}

/// Load the current save, adopting a legacy one first if that is all
/// there is. `None` means there is nothing to load.
pub fn load_world(store: &mut dyn SaveStore) -> Result<Option<WorldState>, PersistError> {
    if let Some(from) = adopt_legacy(store)? {
        info!(from = %from, "legacy save promoted");
    }
    let Some(blob) = store.get(SAVE_KEY)? else {
        return Ok(None);
    };
    let world = decode_world(&blob)?;
    info!(week = world.week, brand = %world.user_brand, "save loaded");
    Ok(Some(world))
}

pub fn save_world(store: &mut dyn SaveStore, world: &WorldState) -> Result<(), PersistError> {
    store.put(SAVE_KEY, &encode_world(world)?)?;
    info!(week = world.week, "save written");
    Ok(())
}
