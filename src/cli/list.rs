use std::path::PathBuf;

use donation_registry::{Candidate, Donation, Listing, Party};
use serde::Serialize;
use tracing::instrument;

use super::{
    open_store,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ListCommand,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Clone, Copy, clap::Parser)]
enum ListCommand {
    /// Items offered by donors, largest quantity first
    Offers,

    /// Items needed by recipients, in registration order
    Needs,

    /// Completed donations, oldest first
    Donations,
}

#[derive(Debug, Serialize)]
struct UserRow<'a> {
    id: &'a str,
    name: &'a str,
}

impl<'a> From<&'a Party> for UserRow<'a> {
    fn from(party: &'a Party) -> Self {
        Self {
            id: party.id.as_str(),
            name: &party.name,
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    id: u64,
    description: &'a str,
    quantity: u32,
    tags: Vec<&'a str>,
    owner: UserRow<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<u32>,
}

impl<'a> ItemRow<'a> {
    fn new(listing: Listing<'a>, score: Option<u32>) -> Self {
        Self {
            id: listing.item.id().get(),
            description: listing.item.description().as_str(),
            quantity: listing.item.quantity(),
            tags: listing.item.tags().iter().collect(),
            owner: UserRow {
                id: listing.owner.id().as_str(),
                name: listing.owner.name(),
            },
            score,
        }
    }
}

#[derive(Debug, Serialize)]
struct DonationRow<'a> {
    date: String,
    description: &'a str,
    quantity: u32,
    donor: UserRow<'a>,
    recipient: UserRow<'a>,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let registry = store.registry();

        match self.command {
            ListCommand::Offers => print_listings(&registry.donor_items(), self.json, "offers"),
            ListCommand::Needs => print_listings(&registry.needed_items(), self.json, "needs"),
            ListCommand::Donations => print_donations(
                registry.donations(),
                store.config().date_format(),
                self.json,
            ),
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Search {
    /// Text to look for in offered item descriptions (case-insensitive)
    query: String,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl Search {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let found = store.registry().search_donor_items(&self.query)?;
        print_listings(&found, self.json, "matching offers")
    }
}

/// Prints item listings as a table or JSON.
pub fn print_listings(listings: &[Listing<'_>], json: bool, what: &str) -> anyhow::Result<()> {
    if json {
        let rows: Vec<_> = listings.iter().map(|l| ItemRow::new(*l, None)).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if listings.is_empty() {
        println!("{}", format!("No {what}.").dim());
        return Ok(());
    }

    if is_narrow() {
        for listing in listings {
            println!("{}", listing.item);
            let owner = format!("owner: {}/{}", listing.owner.name(), listing.owner.id());
            println!("  {}", owner.dim());
        }
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:>6}  {:<24} {:>8}  {:<24} {}",
            "ID", "Description", "Quantity", "Tags", "Owner"
        )
        .heading()
    );
    for listing in listings {
        let item = listing.item;
        println!(
            "{:>6}  {:<24} {:>8}  {:<24} {}/{}",
            item.id().get(),
            item.description().as_str(),
            item.quantity(),
            item.tags().joined(),
            listing.owner.name(),
            listing.owner.id()
        );
    }
    Ok(())
}

fn print_donations(donations: &[Donation], date_format: &str, json: bool) -> anyhow::Result<()> {
    if json {
        let rows: Vec<_> = donations
            .iter()
            .map(|donation| DonationRow {
                date: donation.date().format(date_format).to_string(),
                description: donation.description().as_str(),
                quantity: donation.quantity(),
                donor: UserRow::from(donation.donor()),
                recipient: UserRow::from(donation.recipient()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if donations.is_empty() {
        println!("{}", "No donations recorded yet.".dim());
    }
    for donation in donations {
        println!("{}", donation.display(date_format));
    }
    Ok(())
}

/// Renders ranked candidates as a table or JSON.
pub fn print_candidates(candidates: &[Candidate<'_>], json: bool) -> anyhow::Result<()> {
    if json {
        let rows: Vec<_> = candidates
            .iter()
            .map(|candidate| {
                let listing = Listing {
                    item: candidate.item,
                    owner: candidate.donor,
                };
                ItemRow::new(listing, Some(candidate.score))
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if candidates.is_empty() {
        println!("{}", "No offered items match this need.".dim());
        return Ok(());
    }

    for candidate in candidates {
        println!(
            "{} {} {}",
            format!("[{:>3}]", candidate.score).info(),
            candidate.item,
            format!("from {}/{}", candidate.donor.name(), candidate.donor.id()).dim()
        );
    }
    Ok(())
}
