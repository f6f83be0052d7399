//! Field-level checks shared by the validated domain constructors.
//!
//! Every check here runs before the registry is touched, so an operation that
//! fails validation never leaves partial state behind.

use non_empty_string::NonEmptyString;

use crate::domain::Error;

/// Rejects blank values, returning the trimmed string.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `value` is empty or whitespace only.
pub fn non_blank(field: &'static str, value: &str) -> Result<NonEmptyString, Error> {
    NonEmptyString::new(value.trim().to_string()).map_err(|_| Error::InvalidInput {
        field,
        reason: "must not be blank".to_string(),
    })
}

/// Rejects blank values, passing `None` through unchanged.
///
/// Used for optional update fields where "absent" and "blank" both mean
/// "leave as is" at the call site, but a value that is present must be usable.
#[must_use]
pub fn optional(value: Option<&str>) -> Option<NonEmptyString> {
    value.and_then(|v| NonEmptyString::new(v.trim().to_string()).ok())
}

/// Rejects quantities that are not strictly positive.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `quantity` is zero.
pub fn positive(field: &'static str, quantity: u32) -> Result<u32, Error> {
    if quantity == 0 {
        return Err(Error::InvalidInput {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(quantity)
}
