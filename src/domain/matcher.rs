//! Ranking donor inventory against a recipient's need.
//!
//! A candidate is any donor item with the same description as the need. Each
//! candidate is scored on description and tag similarity and the candidates
//! are returned best first. Matching never changes registry state.

use tracing::instrument;

use crate::domain::{Error, Item, ItemId, Registry, Role, User, UserId};

/// Points for a case-insensitive description match.
pub const DESCRIPTION_POINTS: u32 = 20;

/// Points per tag, awarded once for containment and once for position.
pub const TAG_POINTS: u32 = 5;

/// A scored donor item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Similarity score; higher is better.
    pub score: u32,
    /// The donor item.
    pub item: &'a Item,
    /// The donor offering it.
    pub donor: &'a User,
}

/// Scores how well `candidate` satisfies `needed`.
///
/// Starting from zero:
/// - [`DESCRIPTION_POINTS`] if the descriptions match, ignoring case;
/// - [`TAG_POINTS`] for each needed tag found anywhere in the candidate's tags
///   (case-sensitive);
/// - [`TAG_POINTS`] for each position where both tag lists hold the same tag,
///   ignoring case, up to the length of the shorter list.
#[must_use]
pub fn score(needed: &Item, candidate: &Item) -> u32 {
    let mut points = 0;

    if same_ignoring_case(needed.description().as_str(), candidate.description().as_str()) {
        points += DESCRIPTION_POINTS;
    }

    let needed_tags = needed.tags();
    let candidate_tags = candidate.tags();

    let contained = needed_tags
        .iter()
        .filter(|tag| candidate_tags.contains(tag))
        .count();

    let positional = needed_tags
        .iter()
        .zip(candidate_tags.iter())
        .filter(|(a, b)| same_ignoring_case(a, b))
        .count();

    points + TAG_POINTS * count(contained + positional)
}

fn same_ignoring_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl Registry {
    /// Ranks every donor item with the same description as a recipient's
    /// need, best score first.
    ///
    /// Equal scores keep discovery order: donors in registry order, then each
    /// donor's items in registration order.
    ///
    /// # Errors
    ///
    /// - [`Error::UserNotFound`] if the recipient does not exist.
    /// - [`Error::WrongRole`] if the user is not a recipient.
    /// - [`Error::ItemNotFound`] if the recipient does not own the item.
    #[instrument(skip(self))]
    pub fn match_need(
        &self,
        recipient_id: &UserId,
        needed_id: ItemId,
    ) -> Result<Vec<Candidate<'_>>, Error> {
        let recipient = self.user(recipient_id)?;
        if recipient.role() != Role::Recipient {
            return Err(Error::WrongRole {
                user: recipient_id.clone(),
                expected: Role::Recipient,
            });
        }
        let needed = recipient
            .item(needed_id)
            .ok_or(Error::ItemNotFound(needed_id))?;

        let mut candidates: Vec<_> = self
            .listings(Role::Donor)
            .filter(|listing| listing.item.description() == needed.description())
            .map(|listing| Candidate {
                score: score(needed, listing.item),
                item: listing.item,
                donor: listing.owner,
            })
            .collect();

        // stable: ties stay in discovery order
        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        tracing::debug!("{} candidates for item {needed_id}", candidates.len());
        Ok(candidates)
    }
}
