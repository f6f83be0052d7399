use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use non_empty_string::NonEmptyString;

use crate::domain::{Error, Item, ItemId, validate};

/// Externally supplied user identifier.
///
/// Immutable once a user has been created with it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UserId(NonEmptyString);

impl UserId {
    /// Validates a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the identifier is blank.
    pub fn new(raw: &str) -> Result<Self, Error> {
        validate::non_blank("user id", raw).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Whether a user offers items or needs them.
///
/// Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Offers items. Donor items feed the descriptor totals.
    Donor,
    /// Needs items. Recipient items are the needs that get matched.
    Recipient,
}

impl Role {
    /// Lower-case name used in output and snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Recipient => "recipient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "donor" => Ok(Self::Donor),
            "recipient" => Ok(Self::Recipient),
            other => Err(Error::InvalidInput {
                field: "role",
                reason: format!("unknown role '{other}'"),
            }),
        }
    }
}

/// The kind of organisation or person behind a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserClass {
    /// A private individual.
    Individual,
    /// A church or religious organisation.
    Church,
    /// A municipal public body.
    MunicipalAgency,
    /// A state public body.
    StateAgency,
    /// A federal public body.
    FederalAgency,
    /// A non-governmental organisation.
    Ngo,
    /// A community association.
    Association,
    /// A company.
    Company,
}

impl UserClass {
    const ALL: [Self; 8] = [
        Self::Individual,
        Self::Church,
        Self::MunicipalAgency,
        Self::StateAgency,
        Self::FederalAgency,
        Self::Ngo,
        Self::Association,
        Self::Company,
    ];

    /// Canonical snake-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Church => "church",
            Self::MunicipalAgency => "municipal_agency",
            Self::StateAgency => "state_agency",
            Self::FederalAgency => "federal_agency",
            Self::Ngo => "ngo",
            Self::Association => "association",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserClass {
    type Err = Error;

    /// Parses a class name case-insensitively, accepting `-` or `_` as the
    /// word separator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == normalised)
            .ok_or_else(|| Error::InvalidInput {
                field: "class",
                reason: format!("unknown class '{}'", s.trim()),
            })
    }
}

/// A registered donor or recipient.
///
/// Owns its items in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub(crate) id: UserId,
    pub(crate) name: NonEmptyString,
    pub(crate) email: NonEmptyString,
    pub(crate) phone: NonEmptyString,
    pub(crate) class: UserClass,
    pub(crate) role: Role,
    pub(crate) items: IndexMap<ItemId, Item>,
}

impl User {
    /// The user's identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Contact email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Contact phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// The user's class.
    #[must_use]
    pub const fn class(&self) -> UserClass {
        self.class
    }

    /// Donor or recipient.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` for donors.
    #[must_use]
    pub fn is_donor(&self) -> bool {
        self.role == Role::Donor
    }

    /// The user's items, in the order they were registered.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Looks up one of the user's items.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub(crate) fn apply(&mut self, update: ContactUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{}, {}, {}, class: {}, role: {}",
            self.name, self.id, self.email, self.phone, self.class, self.role
        )
    }
}

/// Validated fields for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub(crate) id: UserId,
    pub(crate) name: NonEmptyString,
    pub(crate) email: NonEmptyString,
    pub(crate) phone: NonEmptyString,
    pub(crate) class: UserClass,
    pub(crate) role: Role,
}

impl NewUser {
    /// Validates raw user fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any field is blank or the class is
    /// not recognised.
    pub fn new(
        id: &str,
        name: &str,
        email: &str,
        phone: &str,
        class: &str,
        role: Role,
    ) -> Result<Self, Error> {
        Ok(Self {
            id: UserId::new(id)?,
            name: validate::non_blank("name", name)?,
            email: validate::non_blank("email", email)?,
            phone: validate::non_blank("phone", phone)?,
            class: class.parse()?,
            role,
        })
    }

    /// The identifier the user will be created with.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    pub(crate) fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            class: self.class,
            role: self.role,
            items: IndexMap::new(),
        }
    }
}

/// Changes to a user's mutable contact fields.
///
/// Absent or blank fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactUpdate {
    pub(crate) name: Option<NonEmptyString>,
    pub(crate) email: Option<NonEmptyString>,
    pub(crate) phone: Option<NonEmptyString>,
}

impl ContactUpdate {
    /// Builds an update, discarding blank values.
    #[must_use]
    pub fn new(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> Self {
        Self {
            name: validate::optional(name),
            email: validate::optional(email),
            phone: validate::optional(phone),
        }
    }

    /// Returns `true` if the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}
