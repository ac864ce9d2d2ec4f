//! core::catalog
//!
//! The ingredient catalog: the canonical registry of ingredient identities.
//!
//! The catalog tracks *what an ingredient is* (id, name, unit), never how
//! much of it is on hand; quantities live in [`crate::core::stock`].
//!
//! # Id assignment
//!
//! Ids come from an auto-incrementing counter starting at 1. Removing an
//! ingredient never releases its id for reuse, so a stale id held elsewhere
//! (a stock entry, a recipe requirement) can only ever dangle, never alias a
//! different ingredient.
//!
//! # Referential integrity
//!
//! [`IngredientCatalog::remove`] performs no dependency checks. The command
//! layer ([`crate::app`]) verifies that no stock entry and no recipe
//! requirement references the id before removing; the catalog only supplies
//! the existence queries those checks need.

use serde::{Deserialize, Serialize};

use super::types::IngredientId;

/// An ingredient identity: id, display name, and measurement unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    /// Unit the quantity is measured in ("g", "ml", "un", ...). Free-form.
    pub unit: String,
}

/// Registry of ingredient identities.
///
/// Storage is a growable sequence compacted on removal; order among the
/// remaining entries carries no meaning.
#[derive(Debug, Clone)]
pub struct IngredientCatalog {
    items: Vec<Ingredient>,
    next_id: u32,
}

impl Default for IngredientCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl IngredientCatalog {
    /// Create an empty catalog. The first registered id is 1.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a new ingredient and return its freshly assigned id.
    pub fn register(&mut self, name: impl Into<String>, unit: impl Into<String>) -> IngredientId {
        let id = IngredientId::new(self.next_id);
        self.next_id += 1;
        self.items.push(Ingredient {
            id,
            name: name.into(),
            unit: unit.into(),
        });
        id
    }

    /// Re-insert an ingredient with a known id (load path).
    ///
    /// The id counter advances past the restored id so later registrations
    /// cannot collide with ids read from a data file.
    pub fn restore(&mut self, id: IngredientId, name: impl Into<String>, unit: impl Into<String>) {
        self.items.push(Ingredient {
            id,
            name: name.into(),
            unit: unit.into(),
        });
        if id.as_u32() >= self.next_id {
            self.next_id = id.as_u32() + 1;
        }
    }

    /// Look up an ingredient by id.
    pub fn find(&self, id: IngredientId) -> Option<&Ingredient> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Look up an ingredient id by exact name match.
    pub fn find_by_name(&self, name: &str) -> Option<IngredientId> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.id)
    }

    /// Whether the id is registered.
    pub fn contains(&self, id: IngredientId) -> bool {
        self.find(id).is_some()
    }

    /// The display name for an id, if registered.
    pub fn name_of(&self, id: IngredientId) -> Option<&str> {
        self.find(id).map(|item| item.name.as_str())
    }

    /// The unit for an id, if registered.
    pub fn unit_of(&self, id: IngredientId) -> Option<&str> {
        self.find(id).map(|item| item.unit.as_str())
    }

    /// Edit an ingredient in place. `None` keeps the existing value.
    ///
    /// Returns `false` if the id is not registered.
    pub fn edit(&mut self, id: IngredientId, name: Option<&str>, unit: Option<&str>) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        if let Some(name) = name {
            item.name = name.to_string();
        }
        if let Some(unit) = unit {
            item.unit = unit.to_string();
        }
        true
    }

    /// Remove an ingredient by id, compacting storage.
    ///
    /// Returns `false` if the id is not registered. The id is never reused.
    pub fn remove(&mut self, id: IngredientId) -> bool {
        match self.items.iter().position(|item| item.id == id) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Iterate the registered ingredients.
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_sequential_ids_from_one() {
        let mut catalog = IngredientCatalog::new();
        assert_eq!(catalog.register("Flour", "g").as_u32(), 1);
        assert_eq!(catalog.register("Sugar", "g").as_u32(), 2);
        assert_eq!(catalog.register("Milk", "ml").as_u32(), 3);
    }

    #[test]
    fn removed_ids_are_never_reused() {
        let mut catalog = IngredientCatalog::new();
        let flour = catalog.register("Flour", "g");
        let sugar = catalog.register("Sugar", "g");

        assert!(catalog.remove(flour));
        let salt = catalog.register("Salt", "g");

        assert_eq!(salt.as_u32(), 3);
        assert!(catalog.find(flour).is_none());
        assert!(catalog.find(sugar).is_some());
    }

    #[test]
    fn remove_of_unknown_id_fails() {
        let mut catalog = IngredientCatalog::new();
        assert!(!catalog.remove(IngredientId::new(9)));
    }

    #[test]
    fn find_by_name_is_exact() {
        let mut catalog = IngredientCatalog::new();
        let id = catalog.register("Flour", "g");
        assert_eq!(catalog.find_by_name("Flour"), Some(id));
        assert_eq!(catalog.find_by_name("flour"), None);
    }

    #[test]
    fn edit_keeps_fields_when_none() {
        let mut catalog = IngredientCatalog::new();
        let id = catalog.register("Flour", "g");

        assert!(catalog.edit(id, Some("Whole wheat flour"), None));
        let item = catalog.find(id).unwrap();
        assert_eq!(item.name, "Whole wheat flour");
        assert_eq!(item.unit, "g");

        assert!(!catalog.edit(IngredientId::new(99), Some("x"), None));
    }

    #[test]
    fn restore_advances_the_id_counter() {
        let mut catalog = IngredientCatalog::new();
        catalog.restore(IngredientId::new(7), "Flour", "g");
        assert_eq!(catalog.register("Sugar", "g").as_u32(), 8);
    }
}
