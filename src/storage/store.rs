//! A filesystem backed donation registry
//!
//! The [`Store`] ties a root directory to its [`Config`] and the in-memory
//! [`Registry`]. State lives in `<root>/.donations/`: the configuration in
//! `config.toml` and the registry snapshot in the configured snapshot file.

use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::{
    domain::{Config, Registry},
    storage::{Snapshot, SnapshotError},
};

/// Name of the metadata directory under the store root.
pub const META_DIR: &str = ".donations";

/// A registry loaded from, and saved to, a directory.
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    config: Config,
    registry: Registry,
}

impl Store {
    /// Opens the store rooted at `root`.
    ///
    /// A missing or unreadable config falls back to the defaults. A missing
    /// snapshot yields an empty registry, as does a snapshot that cannot be
    /// parsed or restored; the latter is logged and will be overwritten by
    /// the next [`Store::flush`].
    #[must_use]
    #[instrument]
    pub fn open(root: PathBuf) -> Self {
        let config = load_config(&root);
        let path = snapshot_path(&root, &config);

        let registry = if path.exists() {
            match Snapshot::load(&path).and_then(Snapshot::restore) {
                Ok(registry) => registry,
                Err(e) => {
                    tracing::warn!("Discarding unusable snapshot: {e}");
                    Registry::new()
                }
            }
        } else {
            tracing::debug!("No snapshot at {}, starting empty", path.display());
            Registry::new()
        };

        Self {
            root,
            config,
            registry,
        }
    }

    /// The directory this store was opened in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The store's configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the registry snapshot.
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        snapshot_path(&self.root, &self.config)
    }

    /// Read access to the registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Write access to the registry. Changes are kept in memory until the
    /// next [`Store::flush`].
    pub const fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Writes the registry to its snapshot file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Write`] if the metadata directory or the
    /// snapshot cannot be written.
    #[instrument(skip(self))]
    pub fn flush(&self) -> Result<(), SnapshotError> {
        let path = self.snapshot_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SnapshotError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Snapshot::capture(&self.registry).save(&path)
    }

    /// Flushes the registry, then resets it to empty.
    ///
    /// # Errors
    ///
    /// Returns the flush error, if any. The registry is only reset once the
    /// snapshot has been written.
    pub fn shutdown(&mut self) -> Result<(), SnapshotError> {
        self.flush()?;
        self.registry.reset();
        tracing::info!("Registry saved and reset");
        Ok(())
    }
}

fn config_path(root: &Path) -> PathBuf {
    root.join(META_DIR).join("config.toml")
}

fn snapshot_path(root: &Path, config: &Config) -> PathBuf {
    root.join(META_DIR).join(config.snapshot_file())
}

fn load_config(root: &Path) -> Config {
    Config::load(&config_path(root)).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Creates the metadata directory and a default `config.toml` under `root`.
///
/// # Errors
///
/// Returns an error message if the store is already initialised or if the
/// directory or config file cannot be created.
pub fn init(root: &Path) -> Result<PathBuf, String> {
    let meta = root.join(META_DIR);
    if meta.exists() {
        return Err(format!(
            "Registry already initialized (found existing {META_DIR} directory)"
        ));
    }
    std::fs::create_dir_all(&meta)
        .map_err(|e| format!("Failed to create {META_DIR} directory: {e}"))?;

    let path = config_path(root);
    Config::default().save(&path)?;
    Ok(path)
}
