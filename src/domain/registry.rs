//! In-memory donation registry.
//!
//! The [`Registry`] knows nothing about the filesystem. It owns every user,
//! every descriptor and the donation ledger, and keeps them consistent with
//! each other on every mutation.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::instrument;

use crate::domain::{
    ContactUpdate, Description, Descriptor, Donation, Error, Item, ItemId, NewUser, Role, Tags,
    User, UserId, validate,
};

/// An in-memory registry of users, descriptors and completed donations.
///
/// State is held as:
/// - Users: `IndexMap<String, User>` keyed by user id, in insertion order.
///   Each user owns its items.
/// - Descriptors: `BTreeMap<Description, Descriptor>`, iterated in key order.
/// - Ledger: `Vec<Donation>`, kept sorted by [`Donation::ordering_key`].
/// - The next item id, a counter that only moves forward.
///
/// The descriptor total for a description is always the sum of the quantities
/// of all donor items with that description. Every path that changes a donor
/// item's quantity goes through a single internal helper to keep that true.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registry {
    users: IndexMap<String, User>,
    descriptors: BTreeMap<Description, Descriptor>,
    pub(crate) ledger: Vec<Donation>,
    next_item_id: u64,
}

/// A borrowed item together with the user that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing<'a> {
    /// The item.
    pub item: &'a Item,
    /// Its owner.
    pub owner: &'a User,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards all state, returning the registry to its freshly created
    /// condition. The item id counter restarts from zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The id the next newly registered item will receive.
    #[must_use]
    pub const fn next_item_id(&self) -> ItemId {
        ItemId::new(self.next_item_id)
    }

    // --- users -------------------------------------------------------------

    /// Adds a donor or recipient.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateUser`] if the id is already taken.
    #[instrument(skip(self, user), fields(id = %user.id()))]
    pub fn add_user(&mut self, user: NewUser) -> Result<&User, Error> {
        if self.users.contains_key(user.id().as_str()) {
            return Err(Error::DuplicateUser(user.id().clone()));
        }

        let user = user.into_user();
        tracing::info!("Added {}: {}", user.role(), user.id());
        let key = user.id().as_str().to_string();
        Ok(&*self.users.entry(key).or_insert(user))
    }

    /// Looks up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no user has that id.
    pub fn user(&self, id: &UserId) -> Result<&User, Error> {
        self.users
            .get(id.as_str())
            .ok_or_else(|| Error::UserNotFound(id.clone()))
    }

    /// Returns `true` if a user with the given id exists.
    #[must_use]
    pub fn contains_user(&self, id: &UserId) -> bool {
        self.users.contains_key(id.as_str())
    }

    /// Iterates over all users in insertion order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// All users with exactly the given name, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is blank.
    pub fn users_named(&self, name: &str) -> Result<Vec<&User>, Error> {
        let name = validate::non_blank("name", name)?;
        Ok(self
            .users
            .values()
            .filter(|user| user.name() == name.as_str())
            .collect())
    }

    /// Updates a user's name, email or phone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no user has that id.
    #[instrument(skip(self, update))]
    pub fn update_user(&mut self, id: &UserId, update: ContactUpdate) -> Result<&User, Error> {
        let user = self
            .users
            .get_mut(id.as_str())
            .ok_or_else(|| Error::UserNotFound(id.clone()))?;
        user.apply(update);
        Ok(&*user)
    }

    /// Removes a user and every item they own.
    ///
    /// Items are removed one at a time through [`Registry::remove_item`], so
    /// descriptor totals are adjusted exactly as for a standalone removal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] if no user has that id.
    #[instrument(skip(self))]
    pub fn remove_user(&mut self, id: &UserId) -> Result<User, Error> {
        let item_ids: Vec<ItemId> = self.user(id)?.items.keys().copied().collect();
        for item_id in item_ids {
            self.remove_item(item_id, id)?;
        }

        let user = self
            .users
            .shift_remove(id.as_str())
            .ok_or_else(|| Error::UserNotFound(id.clone()))?;
        tracing::info!("Removed {}: {}", user.role(), user.id());
        Ok(user)
    }

    // --- descriptors -------------------------------------------------------

    /// Pre-registers a descriptor with a total of zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDescriptor`] if it already exists.
    #[instrument(skip(self))]
    pub fn add_descriptor(&mut self, description: Description) -> Result<&Descriptor, Error> {
        if self.descriptors.contains_key(&description) {
            return Err(Error::DuplicateDescriptor(description));
        }
        tracing::info!("Added descriptor: {description}");
        Ok(&*self
            .descriptors
            .entry(description.clone())
            .or_insert_with(|| Descriptor::new(description)))
    }

    /// Looks up the descriptor for a description.
    #[must_use]
    pub fn descriptor(&self, description: &Description) -> Option<&Descriptor> {
        self.descriptors.get(description)
    }

    /// All descriptors, in description order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values()
    }

    // --- items -------------------------------------------------------------

    /// Registers an item offered or needed by a user.
    ///
    /// If the user already holds an item with the same description and tags,
    /// its quantity grows by `quantity` and its id is returned. Otherwise a
    /// new item is created with a fresh id. Donor items are added to the
    /// descriptor total for their description, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `quantity` is zero, or
    /// [`Error::UserNotFound`] if the user does not exist.
    #[instrument(skip(self, tags))]
    pub fn register_item(
        &mut self,
        user_id: &UserId,
        description: Description,
        quantity: u32,
        tags: Tags,
    ) -> Result<ItemId, Error> {
        let quantity = validate::positive("quantity", quantity)?;
        let existing = self
            .user(user_id)?
            .items()
            .find(|item| item.description == description && item.tags == tags)
            .map(|item| (item.id, item.quantity));

        if let Some((id, current)) = existing {
            let total = current.checked_add(quantity).ok_or_else(|| {
                Error::InvalidInput {
                    field: "quantity",
                    reason: "total quantity overflows".to_string(),
                }
            })?;
            self.write_quantity(user_id, id, total)?;
            tracing::info!("Increased item {id} to {total}");
            return Ok(id);
        }

        let id = ItemId::new(self.next_item_id);
        self.next_item_id += 1;

        self.user_mut(user_id)?
            .items
            .insert(id, Item::new(id, description, 0, tags));
        self.write_quantity(user_id, id, quantity)?;

        tracing::info!("Registered item {id} for {user_id}");
        Ok(id)
    }

    /// Looks up an item owned by the given user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] or [`Error::ItemNotFound`].
    pub fn item(&self, item_id: ItemId, user_id: &UserId) -> Result<&Item, Error> {
        self.user(user_id)?
            .item(item_id)
            .ok_or(Error::ItemNotFound(item_id))
    }

    /// Updates an item's quantity and/or tags.
    ///
    /// A `quantity` of zero leaves the quantity unchanged; removal is
    /// [`Registry::remove_item`]. Empty `tags` leave the tags unchanged. A
    /// donor's descriptor total moves by exactly the quantity difference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] or [`Error::ItemNotFound`].
    #[instrument(skip(self, tags))]
    pub fn update_item(
        &mut self,
        item_id: ItemId,
        user_id: &UserId,
        quantity: u32,
        tags: Tags,
    ) -> Result<&Item, Error> {
        self.item(item_id, user_id)?;

        if quantity > 0 {
            self.write_quantity(user_id, item_id, quantity)?;
        }

        let item = self.item_mut(item_id, user_id)?;
        if !tags.is_empty() {
            item.tags = tags;
        }
        Ok(&*item)
    }

    /// Removes an item, deducting its full quantity from the descriptor total
    /// if the owner is a donor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserNotFound`] or [`Error::ItemNotFound`].
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, item_id: ItemId, user_id: &UserId) -> Result<Item, Error> {
        let removed = self.item(item_id, user_id)?.clone();
        self.write_quantity(user_id, item_id, 0)?;
        tracing::info!("Removed item {item_id} from {user_id}");
        Ok(removed)
    }

    /// Finds the user owning an item by scanning every user's items.
    #[must_use]
    pub fn owner_of(&self, item_id: ItemId) -> Option<&User> {
        self.users
            .values()
            .find(|user| user.items.contains_key(&item_id))
    }

    // --- listings ----------------------------------------------------------

    /// All donor items, largest quantity first; equal quantities in item id
    /// order.
    #[must_use]
    pub fn donor_items(&self) -> Vec<Listing<'_>> {
        let mut listings: Vec<_> = self.listings(Role::Donor).collect();
        listings.sort_by(|a, b| {
            b.item
                .quantity
                .cmp(&a.item.quantity)
                .then(a.item.id.cmp(&b.item.id))
        });
        listings
    }

    /// All recipient (needed) items in item id order.
    #[must_use]
    pub fn needed_items(&self) -> Vec<Listing<'_>> {
        let mut listings: Vec<_> = self.listings(Role::Recipient).collect();
        listings.sort_by_key(|listing| listing.item.id);
        listings
    }

    /// Donor items whose description contains `query`, case-insensitively,
    /// ordered by description then item id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the query is blank.
    pub fn search_donor_items(&self, query: &str) -> Result<Vec<Listing<'_>>, Error> {
        let query = validate::non_blank("query", query)?;
        let mut listings: Vec<_> = self
            .listings(Role::Donor)
            .filter(|listing| listing.item.description.contains(query.as_str()))
            .collect();
        listings.sort_by(|a, b| {
            a.item
                .description
                .cmp(&b.item.description)
                .then(a.item.id.cmp(&b.item.id))
        });
        Ok(listings)
    }

    /// The donation ledger, ordered by date then description.
    #[must_use]
    pub fn donations(&self) -> &[Donation] {
        &self.ledger
    }

    pub(crate) fn listings(&self, role: Role) -> impl Iterator<Item = Listing<'_>> {
        self.users
            .values()
            .filter(move |user| user.role == role)
            .flat_map(|owner| owner.items().map(move |item| Listing { item, owner }))
    }
}

impl Registry {
    fn user_mut(&mut self, id: &UserId) -> Result<&mut User, Error> {
        self.users
            .get_mut(id.as_str())
            .ok_or_else(|| Error::UserNotFound(id.clone()))
    }

    fn item_mut(&mut self, item_id: ItemId, user_id: &UserId) -> Result<&mut Item, Error> {
        self.user_mut(user_id)?
            .items
            .get_mut(&item_id)
            .ok_or(Error::ItemNotFound(item_id))
    }

    /// Sets an item's quantity and applies the matching descriptor delta.
    ///
    /// This is the only place donor item quantities change. A quantity of
    /// zero removes the item. Returns the signed change applied.
    pub(crate) fn write_quantity(
        &mut self,
        user_id: &UserId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<i64, Error> {
        let user = self
            .users
            .get_mut(user_id.as_str())
            .ok_or_else(|| Error::UserNotFound(user_id.clone()))?;
        let role = user.role;
        let item = user
            .items
            .get_mut(&item_id)
            .ok_or(Error::ItemNotFound(item_id))?;

        let delta = i64::from(quantity) - i64::from(item.quantity);
        if role == Role::Donor && delta != 0 {
            self.descriptors
                .entry(item.description.clone())
                .or_insert_with(|| Descriptor::new(item.description.clone()))
                .apply(delta);
            tracing::debug!("Descriptor '{}' adjusted by {delta:+}", item.description);
        }

        if quantity == 0 {
            user.items.shift_remove(&item_id);
        } else {
            item.quantity = quantity;
        }
        Ok(delta)
    }

    /// Rebuilds a registry from previously captured parts.
    ///
    /// The caller is responsible for checking the parts are consistent; see
    /// [`crate::storage::Snapshot::restore`].
    pub(crate) fn from_parts(
        users: IndexMap<String, User>,
        descriptors: BTreeMap<Description, Descriptor>,
        mut ledger: Vec<Donation>,
        next_item_id: u64,
    ) -> Self {
        ledger.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        Self {
            users,
            descriptors,
            ledger,
            next_item_id,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::UserClass;

    pub(crate) fn donor(registry: &mut Registry, id: &str) -> UserId {
        let user = NewUser::new(id, id, "d@example.com", "555", "individual", Role::Donor).unwrap();
        registry.add_user(user).unwrap().id().clone()
    }

    pub(crate) fn recipient(registry: &mut Registry, id: &str) -> UserId {
        let user = NewUser::new(id, id, "r@example.com", "555", "ngo", Role::Recipient).unwrap();
        registry.add_user(user).unwrap().id().clone()
    }

    pub(crate) fn desc(s: &str) -> Description {
        Description::new(s).unwrap()
    }

    /// Checks descriptor totals against a fresh sum over donor items.
    pub(crate) fn assert_descriptors_consistent(registry: &Registry) {
        let mut sums: BTreeMap<Description, u64> = BTreeMap::new();
        for listing in registry.listings(Role::Donor) {
            *sums.entry(listing.item.description.clone()).or_default() +=
                u64::from(listing.item.quantity);
        }
        for (description, sum) in &sums {
            let descriptor = registry
                .descriptor(description)
                .unwrap_or_else(|| panic!("missing descriptor for {description}"));
            assert_eq!(descriptor.quantity(), *sum, "descriptor {description}");
        }
        for descriptor in registry.descriptors() {
            let expected = sums.get(descriptor.description()).copied().unwrap_or(0);
            assert_eq!(descriptor.quantity(), expected, "descriptor {descriptor}");
        }
    }

    #[test]
    fn duplicate_user_is_rejected() {
        let mut registry = Registry::new();
        donor(&mut registry, "d1");
        let again = NewUser::new("d1", "x", "x", "x", "church", Role::Recipient).unwrap();
        assert_eq!(
            registry.add_user(again).unwrap_err(),
            Error::DuplicateUser(UserId::new("d1").unwrap())
        );
    }

    #[test]
    fn users_keep_insertion_order() {
        let mut registry = Registry::new();
        donor(&mut registry, "zeta");
        recipient(&mut registry, "alpha");
        donor(&mut registry, "mid");
        let ids: Vec<_> = registry.users().map(|u| u.id().as_str()).collect();
        assert_eq!(ids, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn users_named_matches_exactly() {
        let mut registry = Registry::new();
        donor(&mut registry, "ana");
        donor(&mut registry, "bia");
        let found = registry.users_named("ana").unwrap();
        assert_eq!(found.len(), 1);
        assert!(registry.users_named("an").unwrap().is_empty());
        assert!(registry.users_named(" ").is_err());
    }

    #[test]
    fn update_user_changes_contact_fields() {
        let mut registry = Registry::new();
        let id = donor(&mut registry, "d1");
        let user = registry
            .update_user(&id, ContactUpdate::new(None, Some("new@x"), Some("")))
            .unwrap();
        assert_eq!(user.email(), "new@x");
        assert_eq!(user.phone(), "555");
        assert_eq!(user.class(), UserClass::Individual);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let mut registry = Registry::new();
        let ghost = UserId::new("ghost").unwrap();
        assert_eq!(
            registry
                .register_item(&ghost, desc("sofa"), 1, Tags::default())
                .unwrap_err(),
            Error::UserNotFound(ghost.clone())
        );
        assert!(registry.remove_user(&ghost).is_err());
    }

    #[test]
    fn zero_quantity_registration_is_rejected_without_mutation() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let err = registry
            .register_item(&d, desc("sofa"), 0, Tags::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { field: "quantity", .. }));
        assert_eq!(registry.next_item_id(), ItemId::new(0));
        assert!(registry.descriptor(&desc("sofa")).is_none());
    }

    #[test]
    fn register_creates_descriptor_for_donor_only() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let r = recipient(&mut registry, "r1");

        registry
            .register_item(&r, desc("Sofa"), 4, Tags::default())
            .unwrap();
        assert!(registry.descriptor(&desc("sofa")).is_none());

        registry
            .register_item(&d, desc("SOFA"), 3, Tags::default())
            .unwrap();
        assert_eq!(registry.descriptor(&desc("sofa")).unwrap().quantity(), 3);
        assert_descriptors_consistent(&registry);
    }

    #[test]
    fn registering_same_item_twice_accumulates() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let tags = Tags::parse("azul,couro");

        let first = registry
            .register_item(&d, desc("sofa"), 2, tags.clone())
            .unwrap();
        let second = registry
            .register_item(&d, desc("Sofa"), 5, tags)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(registry.item(first, &d).unwrap().quantity(), 7);
        assert_eq!(registry.user(&d).unwrap().items().count(), 1);
        assert_eq!(registry.descriptor(&desc("sofa")).unwrap().quantity(), 7);
        assert_eq!(registry.next_item_id(), ItemId::new(1));
    }

    #[test]
    fn different_tags_create_distinct_items() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let a = registry
            .register_item(&d, desc("sofa"), 2, Tags::parse("azul"))
            .unwrap();
        let b = registry
            .register_item(&d, desc("sofa"), 1, Tags::parse("verde"))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.descriptor(&desc("sofa")).unwrap().quantity(), 3);
        assert_descriptors_consistent(&registry);
    }

    #[test]
    fn update_adjusts_descriptor_by_delta() {
        let mut registry = Registry::new();
        let d1 = donor(&mut registry, "d1");
        let d2 = donor(&mut registry, "d2");
        let a = registry
            .register_item(&d1, desc("livro"), 10, Tags::default())
            .unwrap();
        registry
            .register_item(&d2, desc("livro"), 5, Tags::default())
            .unwrap();

        registry.update_item(a, &d1, 4, Tags::default()).unwrap();
        assert_eq!(registry.descriptor(&desc("livro")).unwrap().quantity(), 9);
        assert_descriptors_consistent(&registry);

        registry.update_item(a, &d1, 12, Tags::default()).unwrap();
        assert_eq!(registry.descriptor(&desc("livro")).unwrap().quantity(), 17);
        assert_descriptors_consistent(&registry);
    }

    #[test]
    fn update_with_zero_quantity_and_no_tags_changes_nothing() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let id = registry
            .register_item(&d, desc("livro"), 3, Tags::parse("novo"))
            .unwrap();
        let item = registry.update_item(id, &d, 0, Tags::default()).unwrap();
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.tags(), &Tags::parse("novo"));
    }

    #[test]
    fn update_replaces_tags() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let id = registry
            .register_item(&d, desc("livro"), 3, Tags::parse("novo"))
            .unwrap();
        let item = registry
            .update_item(id, &d, 0, Tags::parse("usado,capa dura"))
            .unwrap();
        assert_eq!(item.tags().joined(), "usado,capa dura");
    }

    #[test]
    fn update_of_item_owned_by_someone_else_is_not_found() {
        let mut registry = Registry::new();
        let d1 = donor(&mut registry, "d1");
        let d2 = donor(&mut registry, "d2");
        let id = registry
            .register_item(&d1, desc("livro"), 3, Tags::default())
            .unwrap();
        assert_eq!(
            registry.update_item(id, &d2, 1, Tags::default()).unwrap_err(),
            Error::ItemNotFound(id)
        );
    }

    #[test]
    fn recipient_updates_never_touch_descriptors() {
        let mut registry = Registry::new();
        let r = recipient(&mut registry, "r1");
        registry.add_descriptor(desc("livro")).unwrap();
        let id = registry
            .register_item(&r, desc("livro"), 3, Tags::default())
            .unwrap();
        registry.update_item(id, &r, 9, Tags::default()).unwrap();
        registry.remove_item(id, &r).unwrap();
        assert_eq!(registry.descriptor(&desc("livro")).unwrap().quantity(), 0);
    }

    #[test]
    fn remove_item_deducts_full_quantity() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let a = registry
            .register_item(&d, desc("mesa"), 6, Tags::default())
            .unwrap();
        registry
            .register_item(&d, desc("mesa"), 2, Tags::parse("madeira"))
            .unwrap();

        let removed = registry.remove_item(a, &d).unwrap();
        assert_eq!(removed.quantity(), 6);
        assert_eq!(registry.descriptor(&desc("mesa")).unwrap().quantity(), 2);
        assert!(registry.item(a, &d).is_err());
        assert_descriptors_consistent(&registry);
    }

    #[test]
    fn removed_item_ids_are_not_reused() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let a = registry
            .register_item(&d, desc("mesa"), 1, Tags::default())
            .unwrap();
        registry.remove_item(a, &d).unwrap();
        let b = registry
            .register_item(&d, desc("mesa"), 1, Tags::default())
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn remove_user_cascades_items() {
        let mut registry = Registry::new();
        let d1 = donor(&mut registry, "d1");
        let d2 = donor(&mut registry, "d2");
        registry
            .register_item(&d1, desc("mesa"), 4, Tags::default())
            .unwrap();
        registry
            .register_item(&d1, desc("cadeira"), 2, Tags::default())
            .unwrap();
        registry
            .register_item(&d2, desc("mesa"), 1, Tags::default())
            .unwrap();

        let removed = registry.remove_user(&d1).unwrap();
        assert_eq!(removed.items().count(), 0);
        assert_eq!(registry.descriptor(&desc("mesa")).unwrap().quantity(), 1);
        assert_eq!(registry.descriptor(&desc("cadeira")).unwrap().quantity(), 0);
        assert_eq!(registry.user(&d1).unwrap_err(), Error::UserNotFound(d1));
        assert_descriptors_consistent(&registry);
    }

    #[test]
    fn duplicate_descriptor_is_rejected() {
        let mut registry = Registry::new();
        registry.add_descriptor(desc("Mesa")).unwrap();
        assert_eq!(
            registry.add_descriptor(desc("mesa")).unwrap_err(),
            Error::DuplicateDescriptor(desc("mesa"))
        );
    }

    #[test]
    fn descriptors_iterate_in_key_order() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        for name in ["mesa", "cadeira", "livro"] {
            registry
                .register_item(&d, desc(name), 1, Tags::default())
                .unwrap();
        }
        let keys: Vec<_> = registry
            .descriptors()
            .map(|d| d.description().as_str())
            .collect();
        assert_eq!(keys, ["cadeira", "livro", "mesa"]);
    }

    #[test]
    fn donor_items_sort_by_quantity_then_id() {
        let mut registry = Registry::new();
        let d1 = donor(&mut registry, "d1");
        let d2 = donor(&mut registry, "d2");
        let r = recipient(&mut registry, "r1");
        let a = registry
            .register_item(&d1, desc("mesa"), 2, Tags::default())
            .unwrap();
        let b = registry
            .register_item(&d2, desc("livro"), 9, Tags::default())
            .unwrap();
        let c = registry
            .register_item(&d1, desc("sofa"), 2, Tags::default())
            .unwrap();
        registry
            .register_item(&r, desc("cama"), 50, Tags::default())
            .unwrap();

        let ids: Vec<_> = registry.donor_items().iter().map(|l| l.item.id()).collect();
        assert_eq!(ids, [b, a, c]);
    }

    #[test]
    fn needed_items_sort_by_id() {
        let mut registry = Registry::new();
        let r1 = recipient(&mut registry, "r1");
        let r2 = recipient(&mut registry, "r2");
        let a = registry
            .register_item(&r2, desc("mesa"), 1, Tags::default())
            .unwrap();
        let b = registry
            .register_item(&r1, desc("livro"), 1, Tags::default())
            .unwrap();
        let listings = registry.needed_items();
        let ids: Vec<_> = listings.iter().map(|l| l.item.id()).collect();
        assert_eq!(ids, [a, b]);
        assert_eq!(listings[0].owner.id(), &r2);
    }

    #[test]
    fn search_is_case_insensitive_and_sorted_by_description() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let r = recipient(&mut registry, "r1");
        registry
            .register_item(&d, desc("livro de receitas"), 1, Tags::default())
            .unwrap();
        registry
            .register_item(&d, desc("estante de livros"), 1, Tags::default())
            .unwrap();
        registry
            .register_item(&d, desc("mesa"), 1, Tags::default())
            .unwrap();
        registry
            .register_item(&r, desc("livro"), 1, Tags::default())
            .unwrap();

        let found: Vec<_> = registry
            .search_donor_items("LIVRO")
            .unwrap()
            .iter()
            .map(|l| l.item.description().as_str())
            .collect();
        assert_eq!(found, ["estante de livros", "livro de receitas"]);
    }

    #[test]
    fn owner_of_scans_all_users() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        let r = recipient(&mut registry, "r1");
        let need = registry
            .register_item(&r, desc("mesa"), 1, Tags::default())
            .unwrap();
        registry
            .register_item(&d, desc("mesa"), 1, Tags::default())
            .unwrap();
        assert_eq!(registry.owner_of(need).unwrap().id(), &r);
        assert!(registry.owner_of(ItemId::new(99)).is_none());
    }

    #[test]
    fn reset_clears_everything() {
        let mut registry = Registry::new();
        let d = donor(&mut registry, "d1");
        registry
            .register_item(&d, desc("mesa"), 1, Tags::default())
            .unwrap();
        registry.reset();
        assert_eq!(registry, Registry::new());
        assert_eq!(registry.next_item_id(), ItemId::new(0));
    }
}
