use std::{fmt, str::FromStr};

use crate::domain::{Error, validate};

/// Registry-scoped item identifier.
///
/// Allocated from a monotonic counter and never reused, even after the item
/// it named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl ItemId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|e: std::num::ParseIntError| Error::InvalidInput {
                field: "item id",
                reason: e.to_string(),
            })
    }
}

/// A case-normalised item description.
///
/// Descriptions are trimmed and lower-cased on construction, so two
/// descriptions compare equal exactly when they name the same kind of item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Description(String);

impl Description {
    /// Normalises and validates a raw description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the description is blank.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let value = validate::non_blank("description", raw)?;
        Ok(Self(value.as_str().to_lowercase()))
    }

    /// Returns the normalised description.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring test used by description search.
    #[must_use]
    pub fn contains(&self, query: &str) -> bool {
        self.0.contains(&query.to_lowercase())
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Description {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// An ordered list of free-form tags.
///
/// Tags are written as a comma-delimited string. Whitespace around each tag
/// is trimmed and empty segments are dropped; order is significant for
/// matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Builds a tag list from already-split tags.
    #[must_use]
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            tags.into_iter()
                .map(Into::into)
                .map(|tag: String| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
        )
    }

    /// Parses a comma-delimited tag string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Returns `true` if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the tags in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if `tag` appears anywhere in the list (case-sensitive).
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Returns the tags joined back into comma-delimited form.
    #[must_use]
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// A quantity of something offered by a donor or needed by a recipient.
///
/// Items are owned by exactly one user. An item whose quantity reaches zero
/// is removed from the registry rather than retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub(crate) id: ItemId,
    pub(crate) description: Description,
    pub(crate) quantity: u32,
    pub(crate) tags: Tags,
}

impl Item {
    pub(crate) const fn new(id: ItemId, description: Description, quantity: u32, tags: Tags) -> Self {
        Self {
            id,
            description,
            quantity,
            tags,
        }
    }

    /// The item's registry-wide identifier.
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// The normalised description.
    #[must_use]
    pub const fn description(&self) -> &Description {
        &self.description
    }

    /// Units currently offered or needed.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The item's tags, in order.
    #[must_use]
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}, tags: {}, quantity: {}",
            self.id, self.description, self.tags, self.quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_normalised() {
        let d = Description::new("  Cadeira de Rodas ").unwrap();
        assert_eq!(d.as_str(), "cadeira de rodas");
        assert_eq!(d, Description::new("CADEIRA DE RODAS").unwrap());
    }

    #[test]
    fn blank_description_is_rejected() {
        assert!(Description::new("   ").is_err());
    }

    #[test]
    fn description_search_ignores_case() {
        let d = Description::new("Livro infantil").unwrap();
        assert!(d.contains("LIVRO"));
        assert!(!d.contains("sofa"));
    }

    #[test]
    fn tags_parse_trims_and_drops_empty_segments() {
        let tags = Tags::parse(" azul, couro,,");
        assert_eq!(tags.iter().collect::<Vec<_>>(), ["azul", "couro"]);
        assert_eq!(tags.joined(), "azul,couro");
        assert!(Tags::parse("").is_empty());
    }

    #[test]
    fn tags_contains_is_case_sensitive() {
        let tags = Tags::parse("Azul");
        assert!(tags.contains("Azul"));
        assert!(!tags.contains("azul"));
    }

    #[test]
    fn item_display() {
        let item = Item::new(
            ItemId::new(7),
            Description::new("sofa").unwrap(),
            2,
            Tags::parse("azul,couro"),
        );
        assert_eq!(item.to_string(), "7 - sofa, tags: [azul, couro], quantity: 2");
    }

    #[test]
    fn item_id_parse() {
        assert_eq!("12".parse::<ItemId>().unwrap(), ItemId::new(12));
        assert!("x".parse::<ItemId>().is_err());
    }
}
