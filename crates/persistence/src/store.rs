//! Key/value save stores.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::PersistError;

/// The one key a current save lives under.
pub const SAVE_KEY: &str = "ringside_save_v2";

/// Keys older builds wrote saves under.
pub const LEGACY_KEYS: [&str; 8] = [
    "ringside_save_v1",
    "wwf_sim_state_v1",
    "wwf_state",
    "wwe_manager_2001",
    "wwe_2001_sim",
    "wwe_save",
    "game_state",
    "state",
];

/// Minimal string blob store the save lifecycle runs on.
pub trait SaveStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
    fn keys(&self) -> Result<Vec<String>, PersistError>;
}

fn looks_like_save(key: &str) -> bool {
    if LEGACY_KEYS.contains(&key) {
        return true;
    }
    let k = key.to_ascii_lowercase();
    ["wwe", "wwf", "save", "state", "ringside"].iter().any(|p| k.contains(p))
}

/// When the primary key is missing, copy the largest save-looking blob to it
/// and delete the other candidates so the choice never flips later.
/// Returns the adopted key.
pub fn adopt_legacy(store: &mut dyn SaveStore) -> Result<Option<String>, PersistError> {
    if store.get(SAVE_KEY)?.is_some() {
        return Ok(None);
    }
    let candidates: Vec<String> = store.keys()?.into_iter().filter(|k| looks_like_save(k)).collect();
    let mut best: Option<(String, String)> = None;
    for key in &candidates {
        let Some(blob) = store.get(key)? else { continue };
        if best.as_ref().map_or(true, |(_, b)| blob.len() > b.len()) {
            best = Some((key.clone(), blob));
        }
    }
    let Some((key, blob)) = best else {
        return Ok(None);
    };
    store.put(SAVE_KEY, &blob)?;
    for k in &candidates {
        store.remove(k)?;
    }
    info!(from = %key, bytes = blob.len(), "adopted legacy save");
    Ok(Some(key))
}

/// In-memory store, handy for tests and for embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    blobs: BTreeMap<String, String>,
}

impl SaveStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.blobs.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, PersistError> {
        Ok(self.blobs.keys().cloned().collect())
    }
}

/// One `<key>.json` file per key inside a directory. Writes go to a temp
/// file first and are renamed into place.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, PersistError> {
        let ok = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
            && !key.starts_with('.');
        if !ok {
            return Err(PersistError::BadKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SaveStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path(key)?;
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path(key)?;
        let tmp = path.with_extension("json.tmp");
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(value.as_bytes())?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "save written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path(key)?) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, PersistError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            if let Some(key) = name.to_str().and_then(|n| n.strip_suffix(".json")) {
                out.push(key.to_string());
            }
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn largest_legacy_blob_wins() {
        let mut s = MemoryStore::default();
        s.put("wwe_save", "{\"week\":3}").unwrap();
        s.put("wwf_state", "{\"week\":12,\"roster\":[]}").unwrap();
        s.put("settings", "{}").unwrap();

        assert_eq!(adopt_legacy(&mut s).unwrap(), Some("wwf_state".to_string()));
        assert_eq!(s.get(SAVE_KEY).unwrap().as_deref(), Some("{\"week\":12,\"roster\":[]}"));
        assert_eq!(s.keys().unwrap(), vec![SAVE_KEY.to_string(), "settings".to_string()]);

        assert_eq!(adopt_legacy(&mut s).unwrap(), None);
    }

    #[test]
    fn adoption_ignores_key_order() {
        let mut s = MemoryStore::default();
        let big = "{\"week\":40,\"roster\":[1,2,3]}";
        s.put("game_state", big).unwrap();
        s.put("state", "{}").unwrap();
        s.put("wwe_2001_sim", "{\"week\":1}").unwrap();

        assert_eq!(adopt_legacy(&mut s).unwrap(), Some("game_state".to_string()));
        assert_eq!(s.get(SAVE_KEY).unwrap().as_deref(), Some(big));
        assert_eq!(s.keys().unwrap(), vec![SAVE_KEY.to_string()]);
    }

    #[test]
    fn nothing_to_adopt() {
        let mut s = MemoryStore::default();
        s.put("settings", "{}").unwrap();
        assert_eq!(adopt_legacy(&mut s).unwrap(), None);
        assert!(s.get(SAVE_KEY).unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStore::open(dir.path().join("saves")).unwrap();
        assert!(s.get(SAVE_KEY).unwrap().is_none());
        s.put(SAVE_KEY, "{}").unwrap();
        s.put("wwe_save", "{\"a\":1}").unwrap();
        assert_eq!(s.keys().unwrap(), vec![SAVE_KEY.to_string(), "wwe_save".to_string()]);
        s.remove("wwe_save").unwrap();
        s.remove("wwe_save").unwrap();
        assert_eq!(s.get(SAVE_KEY).unwrap().as_deref(), Some("{}"));
        assert!(!s.dir().join(format!("{SAVE_KEY}.json.tmp")).exists());
    }

    #[test]
    fn file_store_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let s = FileStore::open(dir.path()).unwrap();
        assert!(matches!(s.get("../etc/passwd"), Err(PersistError::BadKey(_))));
        assert!(matches!(s.get(""), Err(PersistError::BadKey(_))));
    }

    proptest! {
        #[test]
        fn legacy_detection_is_case_insensitive(prefix in "[a-z]{0,4}", upper in any::<bool>()) {
            let key = format!("{prefix}_Save");
            let key = if upper { key.to_uppercase() } else { key };
            prop_assert!(looks_like_save(&key));
        }
    }
}
