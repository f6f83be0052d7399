//! Versioned JSON snapshots of a [`Registry`].
//!
//! A [`Snapshot`] is a plain serializable copy of every user (with their
//! items, in registration order), every descriptor, the donation ledger and
//! the next item id. Restoring a snapshot checks it hangs together before a
//! [`Registry`] is rebuilt from it.

use std::{
    collections::{BTreeMap, HashSet},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Description, Descriptor, Donation, Item, ItemId, NewUser, Party, Registry, Role, Tags, User,
    UserId, validate,
};

/// Errors raised while reading, writing or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Read {
        /// Path of the snapshot.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The snapshot file could not be written.
    #[error("failed to write snapshot {}: {source}", .path.display())]
    Write {
        /// Path of the snapshot.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The snapshot is not valid JSON, or not a snapshot.
    #[error("failed to parse snapshot {}: {source}", .path.display())]
    Parse {
        /// Path of the snapshot.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The snapshot parsed but its contents are inconsistent.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// A record in the snapshot failed validation.
    #[error("invalid snapshot record: {0}")]
    Invalid(#[from] crate::domain::Error),
}

/// A serializable copy of a registry's complete state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Snapshot {
    users: Vec<UserRecord>,
    descriptors: Vec<DescriptorRecord>,
    donations: Vec<DonationRecord>,
    next_item_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    phone: String,
    class: String,
    role: String,
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ItemRecord {
    id: u64,
    description: String,
    quantity: u32,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DescriptorRecord {
    description: String,
    quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PartyRecord {
    id: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct DonationRecord {
    date: NaiveDate,
    description: String,
    quantity: u32,
    donor: PartyRecord,
    recipient: PartyRecord,
}

impl Snapshot {
    /// Copies the state of a registry.
    #[must_use]
    pub fn capture(registry: &Registry) -> Self {
        Self {
            users: registry.users().map(UserRecord::from).collect(),
            descriptors: registry
                .descriptors()
                .map(|descriptor| DescriptorRecord {
                    description: descriptor.description().to_string(),
                    quantity: descriptor.quantity(),
                })
                .collect(),
            donations: registry
                .donations()
                .iter()
                .map(DonationRecord::from)
                .collect(),
            next_item_id: registry.next_item_id().get(),
        }
    }

    /// Rebuilds a registry from the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Invalid`] if any record holds a blank or
    /// unparseable value, or [`SnapshotError::Corrupt`] if:
    ///
    /// - two users share an id
    /// - two items share an id, or an item id is not below the next item id
    /// - a descriptor appears twice
    /// - a descriptor total disagrees with the donor items it aggregates
    pub fn restore(self) -> Result<Registry, SnapshotError> {
        let mut users = IndexMap::with_capacity(self.users.len());
        let mut item_ids = HashSet::new();

        for record in self.users {
            let user = record.into_user(self.next_item_id, &mut item_ids)?;
            let key = user.id().as_str().to_string();
            if users.contains_key(&key) {
                return Err(SnapshotError::Corrupt(format!("duplicate user id '{key}'")));
            }
            users.insert(key, user);
        }

        let mut descriptors = BTreeMap::new();
        for record in self.descriptors {
            let description = Description::new(&record.description)?;
            if descriptors.contains_key(&description) {
                return Err(SnapshotError::Corrupt(format!(
                    "duplicate descriptor '{description}'"
                )));
            }
            descriptors.insert(
                description.clone(),
                Descriptor::with_quantity(description, record.quantity),
            );
        }
        check_descriptor_totals(&users, &descriptors)?;

        let ledger = self
            .donations
            .into_iter()
            .map(DonationRecord::into_donation)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Registry::from_parts(
            users,
            descriptors,
            ledger,
            self.next_item_id,
        ))
    }

    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Read`] if the file cannot be read, or
    /// [`SnapshotError::Parse`] if it is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the snapshot to a JSON file.
    ///
    /// The content is written to a temporary file in the same directory and
    /// then renamed over `path`, so a reader never sees a partial snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Write`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let write_error = |source: io::Error| SnapshotError::Write {
            path: path.to_path_buf(),
            source,
        };
        let content = serde_json::to_string_pretty(self)
            .map_err(io::Error::from)
            .map_err(write_error)?;

        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
        file.write_all(content.as_bytes()).map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(path).map_err(|e| write_error(e.error))?;

        tracing::debug!("Wrote snapshot to {}", path.display());
        Ok(())
    }
}

fn check_descriptor_totals(
    users: &IndexMap<String, User>,
    descriptors: &BTreeMap<Description, Descriptor>,
) -> Result<(), SnapshotError> {
    let mut sums: BTreeMap<&Description, u64> = BTreeMap::new();
    for item in users
        .values()
        .filter(|user| user.is_donor())
        .flat_map(User::items)
    {
        *sums.entry(item.description()).or_default() += u64::from(item.quantity());
    }

    for (description, sum) in &sums {
        let recorded = descriptors.get(*description).map(Descriptor::quantity);
        if recorded != Some(*sum) {
            return Err(SnapshotError::Corrupt(format!(
                "descriptor '{description}' records {}, donor items hold {sum}",
                recorded.unwrap_or(0)
            )));
        }
    }
    for descriptor in descriptors.values() {
        if descriptor.quantity() > 0 && !sums.contains_key(descriptor.description()) {
            return Err(SnapshotError::Corrupt(format!(
                "descriptor '{}' records {} with no donor items",
                descriptor.description(),
                descriptor.quantity()
            )));
        }
    }
    Ok(())
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            name: user.name().to_string(),
            email: user.email().to_string(),
            phone: user.phone().to_string(),
            class: user.class().to_string(),
            role: user.role().to_string(),
            items: user
                .items()
                .map(|item| ItemRecord {
                    id: item.id().get(),
                    description: item.description().to_string(),
                    quantity: item.quantity(),
                    tags: item.tags().iter().map(String::from).collect(),
                })
                .collect(),
        }
    }
}

impl UserRecord {
    fn into_user(
        self,
        next_item_id: u64,
        seen: &mut HashSet<u64>,
    ) -> Result<User, SnapshotError> {
        let role: Role = self.role.parse()?;
        let mut user = NewUser::new(
            &self.id,
            &self.name,
            &self.email,
            &self.phone,
            &self.class,
            role,
        )?
        .into_user();

        for record in self.items {
            if record.id >= next_item_id {
                return Err(SnapshotError::Corrupt(format!(
                    "item id {} is not below the next item id {next_item_id}",
                    record.id
                )));
            }
            if !seen.insert(record.id) {
                return Err(SnapshotError::Corrupt(format!(
                    "duplicate item id {}",
                    record.id
                )));
            }
            let id = ItemId::new(record.id);
            let item = Item::new(
                id,
                Description::new(&record.description)?,
                validate::positive("quantity", record.quantity)?,
                Tags::new(record.tags),
            );
            user.items.insert(id, item);
        }
        Ok(user)
    }
}

impl From<&Party> for PartyRecord {
    fn from(party: &Party) -> Self {
        Self {
            id: party.id.to_string(),
            name: party.name.clone(),
        }
    }
}

impl PartyRecord {
    fn into_party(self) -> Result<Party, SnapshotError> {
        Ok(Party {
            id: UserId::new(&self.id)?,
            name: self.name,
        })
    }
}

impl From<&Donation> for DonationRecord {
    fn from(donation: &Donation) -> Self {
        Self {
            date: donation.date(),
            description: donation.description().to_string(),
            quantity: donation.quantity(),
            donor: PartyRecord::from(donation.donor()),
            recipient: PartyRecord::from(donation.recipient()),
        }
    }
}

impl DonationRecord {
    fn into_donation(self) -> Result<Donation, SnapshotError> {
        Ok(Donation::new(
            self.date,
            Description::new(&self.description)?,
            self.quantity,
            self.donor.into_party()?,
            self.recipient.into_party()?,
        ))
    }
}

/// The serialized versions of the snapshot.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        users: Vec<UserRecord>,
        #[serde(default)]
        descriptors: Vec<DescriptorRecord>,
        #[serde(default)]
        donations: Vec<DonationRecord>,
        #[serde(default)]
        next_item_id: u64,
    },
}

impl From<Versions> for Snapshot {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                users,
                descriptors,
                donations,
                next_item_id,
            } => Self {
                users,
                descriptors,
                donations,
                next_item_id,
            },
        }
    }
}

impl From<Snapshot> for Versions {
    fn from(snapshot: Snapshot) -> Self {
        Self::V1 {
            users: snapshot.users,
            descriptors: snapshot.descriptors,
            donations: snapshot.donations,
            next_item_id: snapshot.next_item_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContactUpdate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn populated() -> Registry {
        let mut registry = Registry::new();
        let d = registry
            .add_user(NewUser::new("d1", "Ana", "ana@x", "555", "individual", Role::Donor).unwrap())
            .unwrap()
            .id()
            .clone();
        let r = registry
            .add_user(NewUser::new("r1", "Lar", "lar@x", "123", "ngo", Role::Recipient).unwrap())
            .unwrap()
            .id()
            .clone();
        registry
            .add_descriptor(Description::new("brinquedo").unwrap())
            .unwrap();
        let sofa = Description::new("sofa").unwrap();
        let mesa = Description::new("mesa").unwrap();
        let offer = registry
            .register_item(&d, sofa.clone(), 5, Tags::parse("azul,couro"))
            .unwrap();
        registry
            .register_item(&d, mesa.clone(), 2, Tags::default())
            .unwrap();
        let need = registry
            .register_item(&r, sofa, 2, Tags::parse("azul"))
            .unwrap();
        let mesa_need = registry.register_item(&r, mesa, 1, Tags::default()).unwrap();
        let mesa_offer = registry
            .donor_items()
            .iter()
            .find(|l| l.item.description().as_str() == "mesa")
            .unwrap()
            .item
            .id();
        registry.donate(need, offer, day(3)).unwrap();
        registry.donate(mesa_need, mesa_offer, day(1)).unwrap();
        registry
            .update_user(&d, ContactUpdate::new(Some("Ana Maria"), None, None))
            .unwrap();
        registry
    }

    #[test]
    fn restore_reproduces_captured_registry() {
        let registry = populated();
        let restored = Snapshot::capture(&registry).restore().unwrap();
        assert_eq!(restored, registry);
        assert_eq!(restored.next_item_id(), registry.next_item_id());
    }

    #[test]
    fn save_then_load_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("registry.json");
        let registry = populated();

        Snapshot::capture(&registry).save(&path).unwrap();
        let restored = Snapshot::load(&path).unwrap().restore().unwrap();

        assert_eq!(restored, registry);
        let dates: Vec<_> = restored.donations().iter().map(Donation::date).collect();
        assert_eq!(dates, [day(1), day(3)]);
    }

    #[test]
    fn save_replaces_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("registry.json");
        std::fs::write(&path, "stale").unwrap();

        Snapshot::capture(&Registry::new()).save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"_version\": \"1\""));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn load_reports_parse_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("registry.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Snapshot::load(&path).unwrap_err(),
            SnapshotError::Parse { .. }
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            Snapshot::load(&tmp.path().join("absent.json")).unwrap_err(),
            SnapshotError::Read { .. }
        ));
    }

    #[test]
    fn restore_rejects_tampered_descriptor_total() {
        let mut snapshot = Snapshot::capture(&populated());
        for descriptor in &mut snapshot.descriptors {
            if descriptor.description == "sofa" {
                descriptor.quantity += 1;
            }
        }
        assert!(matches!(
            snapshot.restore().unwrap_err(),
            SnapshotError::Corrupt(_)
        ));
    }

    #[test]
    fn restore_rejects_item_ids_at_or_above_counter() {
        let mut snapshot = Snapshot::capture(&populated());
        snapshot.next_item_id = 1;
        assert!(matches!(
            snapshot.restore().unwrap_err(),
            SnapshotError::Corrupt(_)
        ));
    }

    #[test]
    fn restore_rejects_duplicate_users() {
        let mut snapshot = Snapshot::capture(&populated());
        let mut copy = snapshot.users[1].clone();
        copy.items.clear();
        snapshot.users.push(copy);
        assert!(matches!(
            snapshot.restore().unwrap_err(),
            SnapshotError::Corrupt(_)
        ));
    }

    #[test]
    fn restore_rejects_invalid_records() {
        let mut snapshot = Snapshot::capture(&populated());
        snapshot.users[0].class = "guild".to_string();
        assert!(matches!(
            snapshot.restore().unwrap_err(),
            SnapshotError::Invalid(_)
        ));
    }
}
