use std::fmt;

use chrono::NaiveDate;
use tracing::instrument;

use crate::domain::{Description, Error, ItemId, Registry, Role, Tags, User, UserId};

/// A reference to one side of a donation, as it was when the donation was
/// recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    /// The user's id.
    pub id: UserId,
    /// The user's name at the time of the donation.
    pub name: String,
}

impl From<&User> for Party {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().clone(),
            name: user.name().to_string(),
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.id)
    }
}

/// An immutable record of a completed donation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Donation {
    pub(crate) date: NaiveDate,
    pub(crate) description: Description,
    pub(crate) quantity: u32,
    pub(crate) donor: Party,
    pub(crate) recipient: Party,
}

impl Donation {
    pub(crate) const fn new(
        date: NaiveDate,
        description: Description,
        quantity: u32,
        donor: Party,
        recipient: Party,
    ) -> Self {
        Self {
            date,
            description,
            quantity,
            donor,
            recipient,
        }
    }

    /// When the donation took place.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Description of the donated item.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Units transferred.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The giving side.
    #[must_use]
    pub const fn donor(&self) -> &Party {
        &self.donor
    }

    /// The receiving side.
    #[must_use]
    pub const fn recipient(&self) -> &Party {
        &self.recipient
    }

    /// The key the ledger is ordered by: date, then description.
    #[must_use]
    pub const fn ordering_key(&self) -> (NaiveDate, &Description) {
        (self.date, &self.description)
    }

    /// Returns a displayable representation using the given `chrono` date
    /// format.
    #[must_use]
    pub const fn display<'a>(&'a self, date_format: &'a str) -> FormattedDonation<'a> {
        FormattedDonation {
            donation: self,
            date_format,
        }
    }
}

impl fmt::Display for Donation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.display("%Y-%m-%d"), f)
    }
}

/// A [`Donation`] formatted with a specific date format.
///
/// Returned by [`Donation::display`].
#[derive(Debug, Clone, Copy)]
pub struct FormattedDonation<'a> {
    donation: &'a Donation,
    date_format: &'a str,
}

impl fmt::Display for FormattedDonation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.donation;
        write!(
            f,
            "{} - donor: {}, item: {}, quantity: {}, recipient: {}",
            d.date.format(self.date_format),
            d.donor,
            d.description,
            d.quantity,
            d.recipient
        )
    }
}

impl Registry {
    /// Transfers units from a donor item to a recipient's needed item.
    ///
    /// The transferred quantity is the smaller of the two item quantities.
    /// Each side is then updated in place, or removed if nothing remains, and
    /// the donation is added to the ledger.
    ///
    /// Every precondition is checked before anything changes.
    ///
    /// # Errors
    ///
    /// - [`Error::ItemNotFound`] if either item id is unknown.
    /// - [`Error::WrongRole`] if the donated item is not owned by a donor, or
    ///   the needed item is not owned by a recipient.
    /// - [`Error::DescriptionMismatch`] if the descriptions differ.
    #[instrument(skip(self))]
    pub fn donate(
        &mut self,
        needed_id: ItemId,
        donated_id: ItemId,
        date: NaiveDate,
    ) -> Result<Donation, Error> {
        let recipient = self
            .owner_of(needed_id)
            .ok_or(Error::ItemNotFound(needed_id))?;
        let donor = self
            .owner_of(donated_id)
            .ok_or(Error::ItemNotFound(donated_id))?;

        if donor.role() != Role::Donor {
            return Err(Error::WrongRole {
                user: donor.id().clone(),
                expected: Role::Donor,
            });
        }
        if recipient.role() != Role::Recipient {
            return Err(Error::WrongRole {
                user: recipient.id().clone(),
                expected: Role::Recipient,
            });
        }

        let needed = recipient.item(needed_id).ok_or(Error::ItemNotFound(needed_id))?;
        let donated = donor.item(donated_id).ok_or(Error::ItemNotFound(donated_id))?;

        if needed.description() != donated.description() {
            return Err(Error::DescriptionMismatch {
                needed: needed.description().clone(),
                donated: donated.description().clone(),
            });
        }

        let quantity = needed.quantity().min(donated.quantity());
        let donation = Donation::new(
            date,
            donated.description().clone(),
            quantity,
            Party::from(donor),
            Party::from(recipient),
        );
        let donated_left = donated.quantity() - quantity;
        let needed_left = needed.quantity() - quantity;

        self.settle(donated_id, &donation.donor.id, donated_left)?;
        self.settle(needed_id, &donation.recipient.id, needed_left)?;

        let at = self
            .ledger
            .partition_point(|entry| entry.ordering_key() <= donation.ordering_key());
        self.ledger.insert(at, donation.clone());

        tracing::info!(
            "Donated {quantity} x '{}' from {} to {}",
            donation.description,
            donation.donor.id,
            donation.recipient.id
        );
        Ok(donation)
    }

    /// Leaves `remaining` units on an item, removing it when none are left.
    fn settle(&mut self, item_id: ItemId, owner: &UserId, remaining: u32) -> Result<(), Error> {
        if remaining > 0 {
            self.update_item(item_id, owner, remaining, Tags::default())?;
        } else {
            self.remove_item(item_id, owner)?;
        }
        Ok(())
    }
}
