//! Bulk import of recipients from comma-separated text.
//!
//! Each record is a single line of five fields: id, name, email, phone and
//! class. The configured header line is skipped wherever it appears, as are
//! blank lines. The whole input is parsed and validated before the registry
//! is touched, so a bad record leaves the registry unchanged.

use std::io::{self, BufRead};

use tracing::instrument;

use crate::domain::{ContactUpdate, Error, NewUser, Registry, Role};

/// Errors raised while importing recipients.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The input could not be read.
    #[error("failed to read recipients: {0}")]
    Io(#[from] io::Error),

    /// A line did not have the expected number of fields.
    #[error("line {line}: expected 5 fields, found {found}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// How many fields the line had.
        found: usize,
    },

    /// A line had the right shape but a field failed validation.
    #[error("line {line}: {source}")]
    Invalid {
        /// One-based line number.
        line: usize,
        /// The validation failure.
        source: Error,
    },
}

/// A validated recipient line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientRecord {
    /// One-based line number the record was read from.
    pub line: usize,
    /// The recipient described by the line.
    pub user: NewUser,
}

/// Counts of what an import did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Recipients that did not exist before.
    pub created: usize,
    /// Existing users whose contact details were refreshed.
    pub updated: usize,
}

/// Parses and validates every recipient line in `reader`.
///
/// # Errors
///
/// Returns the first [`ImportError`] encountered. No records are returned
/// unless every line is valid.
pub fn parse_recipients<R: BufRead>(
    reader: R,
    header: &str,
) -> Result<Vec<RecipientRecord>, ImportError> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line == header.trim() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        let [id, name, email, phone, class] = fields.as_slice() else {
            return Err(ImportError::Malformed {
                line: line_number,
                found: fields.len(),
            });
        };

        let user = NewUser::new(id, name, email, phone, class, Role::Recipient).map_err(
            |source| ImportError::Invalid {
                line: line_number,
                source,
            },
        )?;
        records.push(RecipientRecord {
            line: line_number,
            user,
        });
    }

    Ok(records)
}

/// Imports recipients into the registry.
///
/// A record whose id is already registered refreshes that user's name, email
/// and phone; its class is ignored. Any other record creates a recipient.
///
/// # Errors
///
/// Returns an [`ImportError`] if any line fails to parse. In that case the
/// registry is left untouched.
#[instrument(skip(registry, reader))]
pub fn import_recipients<R: BufRead>(
    registry: &mut Registry,
    reader: R,
    header: &str,
) -> Result<ImportSummary, ImportError> {
    let records = parse_recipients(reader, header)?;
    let mut summary = ImportSummary::default();

    for RecipientRecord { line, user } in records {
        let invalid = |source: Error| ImportError::Invalid { line, source };
        if registry.contains_user(user.id()) {
            let id = user.id().clone();
            let update = ContactUpdate {
                name: Some(user.name),
                email: Some(user.email),
                phone: Some(user.phone),
            };
            registry.update_user(&id, update).map_err(invalid)?;
            summary.updated += 1;
        } else {
            registry.add_user(user).map_err(invalid)?;
            summary.created += 1;
        }
    }

    tracing::info!(
        "Imported recipients: {} created, {} updated",
        summary.created,
        summary.updated
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Description, Tags, UserClass, UserId};

    const HEADER: &str = "id,name,email,phone,class";

    fn id(raw: &str) -> UserId {
        UserId::new(raw).unwrap()
    }

    #[test]
    fn creates_new_recipients_and_skips_header_and_blank_lines() {
        let input = "id,name,email,phone,class\n\
                     84473712044,Lar Esperanca,lar@x,8333,ngo\n\
                     \n\
                     32719454000103,Igreja Central,ig@x,8344,church\n";
        let mut registry = Registry::new();

        let summary = import_recipients(&mut registry, input.as_bytes(), HEADER).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                created: 2,
                updated: 0
            }
        );
        let user = registry.user(&id("32719454000103")).unwrap();
        assert_eq!(user.role(), Role::Recipient);
        assert_eq!(user.class(), UserClass::Church);
        let ids: Vec<_> = registry.users().map(|u| u.id().as_str()).collect();
        assert_eq!(ids, ["84473712044", "32719454000103"]);
    }

    #[test]
    fn existing_users_get_contact_details_refreshed() {
        let mut registry = Registry::new();
        let existing = NewUser::new("r1", "Old", "old@x", "1", "ngo", Role::Recipient).unwrap();
        registry.add_user(existing).unwrap();
        let item = registry
            .register_item(&id("r1"), Description::new("mesa").unwrap(), 2, Tags::default())
            .unwrap();

        let summary =
            import_recipients(&mut registry, "r1,New,new@x,2,company\n".as_bytes(), HEADER)
                .unwrap();

        assert_eq!(summary.updated, 1);
        let user = registry.user(&id("r1")).unwrap();
        assert_eq!(user.name(), "New");
        assert_eq!(user.email(), "new@x");
        assert_eq!(user.phone(), "2");
        assert_eq!(user.class(), UserClass::Ngo);
        assert!(user.item(item).is_some());
    }

    #[test]
    fn malformed_line_aborts_before_any_change() {
        let input = "r1,Lar,lar@x,1,ngo\nr2,Broken,b@x\n";
        let mut registry = Registry::new();

        let err = import_recipients(&mut registry, input.as_bytes(), HEADER).unwrap_err();

        assert!(matches!(err, ImportError::Malformed { line: 2, found: 3 }));
        assert_eq!(registry, Registry::new());
    }

    #[test]
    fn invalid_field_reports_its_line() {
        let input = "\nr1,Lar,lar@x,1,guild\n";
        let err = parse_recipients(input.as_bytes(), HEADER).unwrap_err();
        assert!(matches!(err, ImportError::Invalid { line: 2, .. }));
    }

    #[test]
    fn custom_header_is_honoured() {
        let input = "id,nome,E-mail,celular,classe\nr1,Lar,lar@x,1,ngo\n";
        let records = parse_recipients(input.as_bytes(), "id,nome,E-mail,celular,classe").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 2);
    }
}
