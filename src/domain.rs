//! Domain models for the donation registry.
//!
//! This module contains the core types: items, descriptors, users, the
//! donation ledger, the [`Registry`] that owns them, and the matching engine
//! that ranks donor inventory against a recipient's need.

mod config;
pub use config::Config;

mod descriptor;
pub use descriptor::Descriptor;

/// Donation ledger entries and the executor that records them.
pub mod donation;
pub use donation::{Donation, Party};

mod error;
pub use error::{Error, ErrorKind};

/// Inventory items, their identifiers, descriptions and tags.
pub mod item;
pub use item::{Description, Item, ItemId, Tags};

/// Scoring and ranking of donor items against a need.
pub mod matcher;
pub use matcher::Candidate;

mod registry;
pub use registry::{Listing, Registry};

/// Users, their roles and contact details.
pub mod user;
pub use user::{ContactUpdate, NewUser, Role, User, UserClass, UserId};

/// Input validation applied before any registry mutation.
pub mod validate;
