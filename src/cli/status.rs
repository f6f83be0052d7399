use std::path::PathBuf;

use clap::Parser;
use donation_registry::{Registry, Role};
use tracing::instrument;

use super::{
    open_store,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show user, item and donation totals")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Default)]
struct Totals {
    donors: usize,
    recipients: usize,
    offered_items: usize,
    offered_units: u64,
    needed_items: usize,
    needed_units: u64,
    descriptors: usize,
    donations: usize,
}

impl Totals {
    fn of(registry: &Registry) -> Self {
        let mut totals = Self::default();
        for user in registry.users() {
            let items = user.items().count();
            let units: u64 = user.items().map(|item| u64::from(item.quantity())).sum();
            match user.role() {
                Role::Donor => {
                    totals.donors += 1;
                    totals.offered_items += items;
                    totals.offered_units += units;
                }
                Role::Recipient => {
                    totals.recipients += 1;
                    totals.needed_items += items;
                    totals.needed_units += units;
                }
            }
        }
        totals.descriptors = registry.descriptors().count();
        totals.donations = registry.donations().len();
        totals
    }
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = open_store(root)?;
        let totals = Totals::of(store.registry());

        match self.output {
            OutputFormat::Json => Self::output_json(&totals)?,
            OutputFormat::Table => Self::output_table(&totals),
        }
        Ok(())
    }

    fn output_json(totals: &Totals) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "users": {
                "donors": totals.donors,
                "recipients": totals.recipients,
            },
            "offered": {
                "items": totals.offered_items,
                "units": totals.offered_units,
            },
            "needed": {
                "items": totals.needed_items,
                "units": totals.needed_units,
            },
            "descriptors": totals.descriptors,
            "donations": totals.donations,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(totals: &Totals) {
        if totals.donors + totals.recipients == 0 {
            println!("No users registered yet. Add one with 'donreg user add'.");
            return;
        }

        println!("{}", "Registry".heading());
        println!("{}", "────────".dim());

        if is_narrow() {
            println!("Donors: {}", totals.donors);
            println!("Recipients: {}", totals.recipients);
            println!("Offered: {} ({} units)", totals.offered_items, totals.offered_units);
            println!("Needed: {} ({} units)", totals.needed_items, totals.needed_units);
        } else {
            println!("{:<12} {:>6} {:>8} {:>8}", "", "Users", "Items", "Units");
            println!(
                "{:<12} {:>6} {:>8} {:>8}",
                "Donors", totals.donors, totals.offered_items, totals.offered_units
            );
            println!(
                "{:<12} {:>6} {:>8} {:>8}",
                "Recipients", totals.recipients, totals.needed_items, totals.needed_units
            );
        }

        println!();
        println!("Descriptors: {}", totals.descriptors.to_string().info());
        if totals.donations == 0 {
            println!("Donations: {}", "0".dim());
        } else {
            println!("Donations: {}", totals.donations.to_string().success());
        }
    }
}
