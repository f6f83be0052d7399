use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use donation_registry::{ItemId, UserId};
use tracing::instrument;

use super::{list::print_candidates, open_store, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Match {
    /// The recipient's id
    recipient: UserId,

    /// The id of the needed item
    item: ItemId,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl Match {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let candidates = store.registry().match_need(&self.recipient, self.item)?;
        print_candidates(&candidates, self.json)
    }
}

#[derive(Debug, clap::Parser)]
pub struct Donate {
    /// The id of the recipient's needed item
    needed: ItemId,

    /// The id of the donor's offered item
    donated: ItemId,

    /// Date of the donation, in the configured date format (defaults to today)
    #[arg(long, short)]
    date: Option<String>,
}

impl Donate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = open_store(root)?;
        let date_format = store.config().date_format().to_string();

        let date = match &self.date {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), &date_format)
                .with_context(|| format!("invalid date '{raw}' (expected {date_format})"))?,
            None => chrono::Local::now().date_naive(),
        };

        let donation = store
            .registry_mut()
            .donate(self.needed, self.donated, date)?;
        store.flush()?;

        println!("{}", donation.display(&date_format).to_string().success());
        Ok(())
    }
}
