use std::path::PathBuf;

use donation_registry::{ContactUpdate, NewUser, Role, User, UserId};
use tracing::instrument;

use super::{open_store, prompt_to_proceed, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Debug, clap::Parser)]
enum UserCommand {
    /// Register a donor or recipient
    Add(Add),

    /// Show a user and the items they offer or need
    Show(Show),

    /// Find users by exact name
    Find(Find),

    /// Change a user's name, email or phone
    Update(Update),

    /// Remove a user and all of their items
    Remove(Remove),
}

impl Command {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self.command {
            UserCommand::Add(command) => command.run(root),
            UserCommand::Show(command) => command.run(root),
            UserCommand::Find(command) => command.run(root),
            UserCommand::Update(command) => command.run(root),
            UserCommand::Remove(command) => command.run(root),
        }
    }
}

#[derive(Debug, clap::Parser)]
struct Add {
    /// Unique user id (for example a tax number)
    id: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Contact email
    #[arg(long)]
    email: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// User class (individual, church, ngo, company, ...)
    #[arg(long)]
    class: String,

    /// Whether the user offers items (donor) or needs them (recipient)
    #[arg(long, default_value = "donor")]
    role: Role,
}

impl Add {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let user = NewUser::new(
            &self.id,
            &self.name,
            &self.email,
            &self.phone,
            &self.class,
            self.role,
        )?;

        let mut store = open_store(root)?;
        let id = store.registry_mut().add_user(user)?.id().clone();
        store.flush()?;

        println!("{}", format!("Added {}: {id}", self.role).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
struct Show {
    /// The user id
    id: UserId,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let user = store.registry().user(&self.id)?;
        print_user(user);
        Ok(())
    }
}

fn print_user(user: &User) {
    println!("{}", user.to_string().heading());
    let label = if user.is_donor() { "Offers" } else { "Needs" };
    let mut items = user.items().peekable();
    if items.peek().is_none() {
        println!("  {}", format!("{label}: nothing").dim());
        return;
    }
    println!("  {label}:");
    for item in items {
        println!("    {item}");
    }
}

#[derive(Debug, clap::Parser)]
struct Find {
    /// The exact name to look for
    name: String,
}

impl Find {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let users = store.registry().users_named(&self.name)?;
        if users.is_empty() {
            println!("{}", format!("No users named '{}'", self.name.trim()).dim());
        }
        for user in users {
            println!("{user}");
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
struct Update {
    /// The user id
    id: UserId,

    /// New display name
    #[arg(long)]
    name: Option<String>,

    /// New contact email
    #[arg(long)]
    email: Option<String>,

    /// New contact phone number
    #[arg(long)]
    phone: Option<String>,
}

impl Update {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let update = ContactUpdate::new(
            self.name.as_deref(),
            self.email.as_deref(),
            self.phone.as_deref(),
        );

        let mut store = open_store(root)?;
        if update.is_empty() {
            // still validates the id
            store.registry().user(&self.id)?;
            println!("{}", "Nothing to update".dim());
            return Ok(());
        }

        let user = store.registry_mut().update_user(&self.id, update)?;
        println!("{}", format!("Updated {user}").success());
        store.flush()?;
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
struct Remove {
    /// The user id
    id: UserId,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Remove {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = open_store(root)?;
        let user = store.registry().user(&self.id)?;

        if !self.yes {
            let count = user.items().count();
            println!("{user}");
            prompt_to_proceed(&format!("Remove this user and their {count} item(s)?"))?;
        }

        let removed = store.registry_mut().remove_user(&self.id)?;
        store.flush()?;

        println!("{}", format!("Removed {}: {}", removed.role(), removed.id()).success());
        Ok(())
    }
}
