// ============================================================
// Layer 6 - Config Store
// ============================================================
// Reads and writes HredConfig as pretty-printed JSON.
//
// Example file:
//   {
//     "vocab_size": 10000,
//     "output_vocab_size": 10000,
//     "encoder_hidden": 256,
//     ...
//   }
//
// Fields left out of the file take their default values.
// Every load is validated, so a bad file fails here with a
// readable message instead of deep inside a tensor op.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::domain::hparams::HredConfig;
use crate::domain::traits::ConfigSource;

/// A single JSON config file on disk.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for JsonConfigStore {
    fn load(&self) -> Result<HredConfig> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read config from '{}'", self.path.display()))?;

        let cfg: HredConfig = serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a valid model config", self.path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config in '{}'", self.path.display()))?;

        tracing::info!("Loaded model config from '{}'", self.path.display());
        Ok(cfg)
    }

    fn save(&self, cfg: &HredConfig) -> Result<()> {
        cfg.validate().context("Refusing to save an invalid config")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Cannot write config to '{}'", self.path.display()))?;

        tracing::info!("Saved model config to '{}'", self.path.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir   = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("nested").join("hred.json"));
        let cfg   = HredConfig { vocab_size: 321, max_length: 7, ..HredConfig::default() };

        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn test_missing_file_mentions_path() {
        let dir   = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("absent.json"));
        let err   = store.load().unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "n_layers": 0 }"#).unwrap();

        let err = JsonConfigStore::new(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("n_layers"));
    }

    #[test]
    fn test_save_rejects_invalid_values() {
        let dir   = TempDir::new().unwrap();
        let store = JsonConfigStore::new(dir.path().join("x.json"));
        let cfg   = HredConfig { dropout: 2.0, ..HredConfig::default() };
        assert!(store.save(&cfg).is_err());
        assert!(!store.path().exists());
    }
}
