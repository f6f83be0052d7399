use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use donation_registry::storage;
use tracing::instrument;

use super::{open_store, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Path to the recipients file
    path: PathBuf,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let mut store = open_store(root)?;
        let header = store.config().csv_header.clone();
        let summary =
            storage::import_recipients(store.registry_mut(), BufReader::new(file), &header)?;
        store.flush()?;

        println!(
            "{}",
            format!(
                "Imported recipients from {}: {} created, {} updated",
                self.path.display(),
                summary.created,
                summary.updated
            )
            .success()
        );
        Ok(())
    }
}
