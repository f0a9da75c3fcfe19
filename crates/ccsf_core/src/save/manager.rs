use super::bundle::{export_file_name, state_from_modules, Bundle};
use super::error::SaveError;
use crate::state::{first_run_init, init::DEFAULT_FIRST_RUN_SEED, FirstRunReport, GameState};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, rename, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const LOCAL_SAVE_FILE: &str = "state.json";
pub const SEED_MANIFEST_FILE: &str = "manifest.json";

/// `manifest.json` of a modular seed directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedManifest {
    pub files: Vec<String>,
}

/// Where a booted document came from.
#[derive(Debug, Clone, PartialEq)]
pub enum BootSource {
    Local,
    Bundle(PathBuf),
    Seed(FirstRunReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Booted {
    pub state: GameState,
    pub source: BootSource,
}

/// Local save slot rooted at one directory.
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn local_path(&self) -> PathBuf {
        self.dir.join(LOCAL_SAVE_FILE)
    }

    pub fn local_exists(&self) -> bool {
        self.local_path().exists()
    }

    /// Persist the whole document (temp file, fsync, rename).
    pub fn save_local(&self, state: &GameState) -> Result<(), SaveError> {
        let data = state.to_json_pretty()?;
        write_atomic(&self.local_path(), data.as_bytes())?;
        log::info!("Game saved to {}", self.local_path().display());
        Ok(())
    }

    /// `Ok(None)` when there is no save, or the save has no `meta.season`.
    pub fn load_local(&self) -> Result<Option<GameState>, SaveError> {
        let path = self.local_path();
        if !path.exists() {
            return Ok(None);
        }

        let state = GameState::from_json(&fs::read_to_string(&path)?)?;
        if state.meta().season.is_none() {
            log::warn!("Local save {} has no meta.season, ignoring it", path.display());
            return Ok(None);
        }

        log::info!("Game loaded from {}", path.display());
        Ok(Some(state))
    }

    pub fn clear_local(&self) -> Result<(), SaveError> {
        let path = self.local_path();
        if path.exists() {
            fs::remove_file(&path)?;
            log::info!("Deleted local save {}", path.display());
        }
        Ok(())
    }

    /// Write `state` as a checksummed bundle into `out_dir`.
    pub fn export_bundle(state: &GameState, out_dir: &Path) -> Result<PathBuf, SaveError> {
        let bundle = Bundle::from_state(state)?;
        let path = out_dir.join(export_file_name(state));
        write_atomic(&path, serde_json::to_string_pretty(&bundle)?.as_bytes())?;
        log::info!("Exported bundle {}", path.display());
        Ok(path)
    }

    pub fn import_bundle(path: &Path) -> Result<GameState, SaveError> {
        let value = read_json(path)?;
        let state = Bundle::from_value(value)?.into_state()?;
        log::info!("Imported bundle {}", path.display());
        Ok(state)
    }

    /// Assemble a document from a modular seed directory.
    pub fn load_seed_dir(dir: &Path) -> Result<GameState, SaveError> {
        let manifest: SeedManifest =
            serde_json::from_value(read_json(&dir.join(SEED_MANIFEST_FILE))?)?;

        let mut modules = Map::new();
        for file in &manifest.files {
            let name = file.strip_suffix(".json").unwrap_or(file);
            modules.insert(name.to_string(), read_json(&dir.join(file))?);
        }

        let state = state_from_modules(modules)?;
        log::info!("Loaded seed from {} ({} module files)", dir.display(), manifest.files.len());
        Ok(state)
    }

    /// Local save, then `bundle`, then the seed directory. A seeded game gets
    /// first-run initialisation and is saved locally straight away.
    pub fn boot(&self, bundle: Option<&Path>, seed_dir: &Path) -> Result<Booted, SaveError> {
        match self.load_local() {
            Ok(Some(state)) => return Ok(Booted { state, source: BootSource::Local }),
            Ok(None) => {}
            Err(e) if e.is_recoverable() => log::warn!("Local save unusable: {e}"),
            Err(e) => return Err(e),
        }

        if let Some(path) = bundle {
            match Self::import_bundle(path) {
                Ok(state) => {
                    return Ok(Booted { state, source: BootSource::Bundle(path.to_path_buf()) })
                }
                Err(e) => {
                    log::warn!("Bundle {} unusable, falling back to seed: {e}", path.display())
                }
            }
        }

        let mut state = Self::load_seed_dir(seed_dir)?;
        let report = first_run_init(&mut state, DEFAULT_FIRST_RUN_SEED);
        self.save_local(&state)?;
        Ok(Booted { state, source: BootSource::Seed(report) })
    }
}

fn read_json(path: &Path) -> Result<Value, SaveError> {
    if !path.exists() {
        return Err(SaveError::FileNotFound { path: path.display().to_string() });
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Atomic save: write to temp file, then rename
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.flush()?;
        file.sync_all()?;
    }
    rename(&temp_path, path)?;

    log::debug!("Wrote {} bytes to {:?}", data.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn seeded_state() -> GameState {
        GameState::from_value(json!({
            "meta": {"season": 2025, "timeline": "preseason", "last_completed_round": 0},
            "teams": [{"team_id": "rbr", "team_name": "Red Bull", "drivers": ["ver"]}],
            "drivers": [{"driver_id": "ver", "name": "Max Verstappen", "team": "rbr"}],
            "rumours": [{"rumour_id": 1, "status": "pending"}],
            "stats": {"race_results": [], "boardroom_drama": []}
        }))
        .unwrap()
    }

    fn write_seed(dir: &Path) {
        let doc = seeded_state().into_value();
        let modules = [
            ("metadata", &doc["meta"]),
            ("teams", &doc["teams"]),
            ("drivers", &doc["drivers"]),
            ("rumours", &doc["rumours"]),
            ("stats", &doc["stats"]),
        ];
        let mut files = Vec::new();
        for (name, value) in modules {
            let file = format!("{name}.json");
            fs::write(dir.join(&file), serde_json::to_string(value).unwrap()).unwrap();
            files.push(file);
        }
        fs::write(dir.join("manifest.json"), json!({ "files": files }).to_string()).unwrap();
    }

    #[test]
    fn test_local_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SaveStore::new(temp_dir.path().join("saves"));

        assert_eq!(store.load_local().unwrap(), None);
        store.save_local(&seeded_state()).unwrap();
        assert_eq!(store.load_local().unwrap(), Some(seeded_state()));

        // Temp file should not exist
        assert!(!store.local_path().with_extension("tmp").exists());

        store.clear_local().unwrap();
        assert!(!store.local_exists());
    }

    #[test]
    fn test_local_save_without_season_is_no_save() {
        let temp_dir = TempDir::new().unwrap();
        let store = SaveStore::new(temp_dir.path());
        fs::write(store.local_path(), r#"{"meta": {"timeline": "preseason"}}"#).unwrap();
        assert_eq!(store.load_local().unwrap(), None);
    }

    #[test]
    fn test_export_import_bundle() {
        let temp_dir = TempDir::new().unwrap();
        let path = SaveStore::export_bundle(&seeded_state(), temp_dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "ccsf_2025_preseason.ccsf.json");
        assert_eq!(SaveStore::import_bundle(&path).unwrap(), seeded_state());
    }

    #[test]
    fn test_export_rejects_broken_references() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = seeded_state();
        state.as_value_mut()["drivers"][0]["team"] = json!("ghost");
        let err = SaveStore::export_bundle(&state, temp_dir.path()).unwrap_err();
        assert!(matches!(err, SaveError::Integrity(ref issues) if issues.len() == 1));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_seed_dir_loads_modules() {
        let temp_dir = TempDir::new().unwrap();
        write_seed(temp_dir.path());
        let state = SaveStore::load_seed_dir(temp_dir.path()).unwrap();
        assert_eq!(state.meta().season, Some(2025));
        assert_eq!(state.roster().teams.len(), 1);
    }

    #[test]
    fn test_seed_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("manifest.json"), r#"{"files": ["metadata.json"]}"#).unwrap();
        let err = SaveStore::load_seed_dir(temp_dir.path()).unwrap_err();
        assert!(matches!(err, SaveError::FileNotFound { .. }));
    }

    #[test]
    fn test_boot_order() {
        let temp_dir = TempDir::new().unwrap();
        let seed_dir = temp_dir.path().join("seed");
        fs::create_dir_all(&seed_dir).unwrap();
        write_seed(&seed_dir);
        let store = SaveStore::new(temp_dir.path().join("saves"));

        // Unreadable bundle falls through to the seed
        let missing = temp_dir.path().join("nope.ccsf.json");
        let first = store.boot(Some(&missing), &seed_dir).unwrap();
        assert!(matches!(first.source, BootSource::Seed(_)));
        assert_eq!(first.state.pointer("/meta/selected_team"), Some(&Value::Null));
        assert_eq!(first.state.pointer("/stats/boardroom_drama/0/type"), Some(&json!("mail")));
        assert!(store.local_exists());

        // Second boot resumes the local save
        let second = store.boot(None, &seed_dir).unwrap();
        assert_eq!(second.source, BootSource::Local);
        assert_eq!(second.state, first.state);

        // With no local save, a valid bundle wins over the seed
        store.clear_local().unwrap();
        let bundle = SaveStore::export_bundle(&seeded_state(), temp_dir.path()).unwrap();
        let third = store.boot(Some(&bundle), &seed_dir).unwrap();
        assert_eq!(third.source, BootSource::Bundle(bundle));
        assert_eq!(third.state, seeded_state());
    }
}
