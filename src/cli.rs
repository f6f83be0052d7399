use std::path::PathBuf;

mod descriptor;
mod exchange;
mod import;
mod init;
mod item;
mod list;
mod status;
mod terminal;
mod user;

use clap::ArgAction;
use donation_registry::{Store, storage};
use status::Status;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the registry
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or(Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show registry totals (default)
    Status(Status),

    /// Initialize a new registry in the root directory
    Init(init::Command),

    /// Manage donors and recipients
    User(user::Command),

    /// Import recipients from a comma-separated file
    ///
    /// Existing ids get their name, email and phone refreshed; new ids are
    /// created as recipients.
    Import(import::Command),

    /// Manage item descriptors
    Descriptor(descriptor::Command),

    /// Manage the items a user offers or needs
    Item(item::Command),

    /// List offered items, needed items or completed donations
    List(list::Command),

    /// Search offered items by description
    Search(list::Search),

    /// Rank offered items against a recipient's need
    Match(exchange::Match),

    /// Donate an offered item to a recipient's need
    Donate(exchange::Donate),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root),
            Self::Init(command) => command.run(&root),
            Self::User(command) => command.run(root),
            Self::Import(command) => command.run(root),
            Self::Descriptor(command) => command.run(root),
            Self::Item(command) => command.run(root),
            Self::List(command) => command.run(root),
            Self::Search(command) => command.run(root),
            Self::Match(command) => command.run(root),
            Self::Donate(command) => command.run(root),
        }
    }
}

/// Opens the store at `root`, failing if it has not been initialized.
fn open_store(root: PathBuf) -> anyhow::Result<Store> {
    if !root.join(storage::META_DIR).is_dir() {
        anyhow::bail!(
            "No registry found in {} (run 'donreg init' first)",
            root.display()
        );
    }
    Ok(Store::open(root))
}

/// Asks for confirmation, exiting with status 130 if it is not given.
fn prompt_to_proceed(prompt: &str) -> anyhow::Result<()> {
    let proceed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    if !proceed {
        println!("Cancelled");
        std::process::exit(130);
    }
    Ok(())
}
