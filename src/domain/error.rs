use thiserror::Error;

use crate::domain::{Description, ItemId, Role, UserId};

/// Errors raised by registry operations.
///
/// All of these are detected before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required field was blank, a quantity was not positive, or a value
    /// could not be parsed.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The operation only applies to users with a different role.
    #[error("user {user} is not a {expected}")]
    WrongRole {
        /// The user the operation was attempted on.
        user: UserId,
        /// The role the operation requires.
        expected: Role,
    },

    /// No user has the given id.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No item has the given id (or it is not owned by the given user).
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// A user with the given id already exists.
    #[error("user already exists: {0}")]
    DuplicateUser(UserId),

    /// A descriptor with the given description already exists.
    #[error("descriptor already exists: {0}")]
    DuplicateDescriptor(Description),

    /// A donation was attempted between items with different descriptions.
    #[error("items have different descriptions: needed '{needed}', donated '{donated}'")]
    DescriptionMismatch {
        /// Description of the needed item.
        needed: Description,
        /// Description of the donated item.
        donated: Description,
    },
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input; nothing was looked up or changed.
    InvalidInput,
    /// An id did not resolve.
    NotFound,
    /// A creation clashed with existing state.
    Conflict,
    /// A donation between unrelated items.
    DescriptionMismatch,
}

impl Error {
    /// Returns the broad category this error falls into.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::WrongRole { .. } => ErrorKind::InvalidInput,
            Self::UserNotFound(_) | Self::ItemNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateUser(_) | Self::DuplicateDescriptor(_) => ErrorKind::Conflict,
            Self::DescriptionMismatch { .. } => ErrorKind::DescriptionMismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(Error::UserNotFound(id.clone()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::ItemNotFound(ItemId::new(4)).kind(), ErrorKind::NotFound);
        assert_eq!(Error::DuplicateUser(id.clone()).kind(), ErrorKind::Conflict);
        assert_eq!(
            Error::WrongRole {
                user: id,
                expected: Role::Recipient
            }
            .kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn mismatch_formats_both_descriptions() {
        let err = Error::DescriptionMismatch {
            needed: Description::new("Sofa").unwrap(),
            donated: Description::new("cadeira").unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "items have different descriptions: needed 'sofa', donated 'cadeira'"
        );
    }
}
