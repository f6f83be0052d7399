use std::path::PathBuf;

use donation_registry::{Description, ItemId, Tags, UserId};
use tracing::instrument;

use super::{open_store, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Debug, clap::Parser)]
enum ItemCommand {
    /// Register an item a donor offers or a recipient needs
    ///
    /// Registering the same description and tags again adds to the existing
    /// item's quantity.
    Add(Add),

    /// Show one of a user's items
    Show(Owned),

    /// Change an item's quantity or tags
    Update(Update),

    /// Remove an item
    Remove(Owned),
}

impl Command {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self.command {
            ItemCommand::Add(command) => command.run(root),
            ItemCommand::Show(command) => command.show(root),
            ItemCommand::Update(command) => command.run(root),
            ItemCommand::Remove(command) => command.remove(root),
        }
    }
}

#[derive(Debug, clap::Parser)]
struct Add {
    /// The owning user's id
    user: UserId,

    /// What the item is (matched case-insensitively)
    description: Description,

    /// How many units
    #[arg(long, short, default_value_t = 1)]
    quantity: u32,

    /// Comma-separated tags, in order of importance
    #[arg(long, short, default_value = "")]
    tags: String,
}

impl Add {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = open_store(root)?;
        let id = store.registry_mut().register_item(
            &self.user,
            self.description,
            self.quantity,
            Tags::parse(&self.tags),
        )?;
        let item = store.registry().item(id, &self.user)?;
        println!("{}", format!("Registered item {item}").success());
        store.flush()?;
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
struct Owned {
    /// The item id
    item: ItemId,

    /// The owning user's id
    #[arg(long, short)]
    user: UserId,
}

impl Owned {
    #[instrument(level = "debug", skip(self))]
    fn show(self, root: PathBuf) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let item = store.registry().item(self.item, &self.user)?;
        println!("{item}");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    fn remove(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = open_store(root)?;
        let item = store.registry_mut().remove_item(self.item, &self.user)?;
        store.flush()?;
        println!("{}", format!("Removed item {item}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
struct Update {
    #[command(flatten)]
    target: Owned,

    /// New quantity (must be positive; use `item remove` to delete)
    #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: Option<u32>,

    /// New comma-separated tags
    #[arg(long, short)]
    tags: Option<String>,
}

impl Update {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let tags = self.tags.as_deref().map(Tags::parse).unwrap_or_default();
        let mut store = open_store(root)?;
        let item = store.registry_mut().update_item(
            self.target.item,
            &self.target.user,
            self.quantity.unwrap_or(0),
            tags,
        )?;
        println!("{}", format!("Updated item {item}").success());
        store.flush()?;
        Ok(())
    }
}
