use std::fmt;

use crate::domain::Description;

/// Aggregate quantity pledged by all donors for one description.
///
/// The registry keeps this equal to the sum of the quantities of every donor
/// item with the same description. Recipient items never contribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    description: Description,
    quantity: u64,
}

impl Descriptor {
    pub(crate) const fn new(description: Description) -> Self {
        Self::with_quantity(description, 0)
    }

    pub(crate) const fn with_quantity(description: Description, quantity: u64) -> Self {
        Self {
            description,
            quantity,
        }
    }

    /// The description this descriptor aggregates.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Total units pledged by donors.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Applies a signed change to the aggregate.
    ///
    /// # Panics
    ///
    /// Panics if the total would drop below zero. That can only happen when a
    /// donor item change was not paired with its descriptor adjustment.
    pub(crate) fn apply(&mut self, delta: i64) {
        self.quantity = self.quantity.checked_add_signed(delta).unwrap_or_else(|| {
            panic!(
                "descriptor '{}' would go negative ({} {delta:+})",
                self.description, self.quantity
            )
        });
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.quantity, self.description)
    }
}
