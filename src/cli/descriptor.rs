use std::path::PathBuf;

use donation_registry::Description;
use tracing::instrument;

use super::{open_store, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: DescriptorCommand,
}

#[derive(Debug, clap::Parser)]
enum DescriptorCommand {
    /// Register a descriptor ahead of any donor items
    Add {
        /// The item description
        description: Description,
    },

    /// List every descriptor with its donor total
    List,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = open_store(root)?;

        match self.command {
            DescriptorCommand::Add { description } => {
                let descriptor = store.registry_mut().add_descriptor(description)?;
                println!("{}", format!("Added descriptor: {descriptor}").success());
                store.flush()?;
            }
            DescriptorCommand::List => {
                let registry = store.registry();
                let mut descriptors = registry.descriptors().peekable();
                if descriptors.peek().is_none() {
                    println!("{}", "No descriptors registered yet.".dim());
                }
                for descriptor in descriptors {
                    println!("{descriptor}");
                }
            }
        }

        Ok(())
    }
}
