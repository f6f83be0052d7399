//! Donation Registry
//!
//! Tracks donors, recipients and the items they offer or need, keeps the
//! per-description donation totals in step with every inventory change, and
//! ranks donor items against a recipient's need.

pub mod domain;
pub use domain::{
    Candidate, Config, ContactUpdate, Description, Descriptor, Donation, Error, ErrorKind, Item,
    ItemId, Listing, NewUser, Party, Registry, Role, Tags, User, UserClass, UserId,
};

/// Filesystem persistence and bulk import for the registry.
pub mod storage;
pub use storage::{ImportSummary, Snapshot, SnapshotError, Store};
