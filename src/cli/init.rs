use std::path::Path;

use donation_registry::storage;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = storage::init(root).map_err(anyhow::Error::msg)?;

        println!(
            "{}",
            format!("Initialized donation registry in {}", root.display()).success()
        );
        println!("  Created: {}", config_path.display());
        println!();
        println!("Next steps:");
        println!("  donreg user add <ID> --name <NAME> --email <EMAIL> --phone <PHONE> --class <CLASS>");
        println!("  donreg item add <ID> <DESCRIPTION> --quantity <N> --tags <TAGS>");

        Ok(())
    }
}
