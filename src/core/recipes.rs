//! core::recipes
//!
//! The recipe book: recipes and their ordered ingredient requirements.
//!
//! # Requirement ordering
//!
//! A recipe's requirement list is ordered, and the order matters: the
//! fulfillment engine iterates it front to back, so list position determines
//! which ingredient is reported first on insufficiency. New requirements are
//! inserted at the *front* (most recently added is tried first); adding an
//! ingredient that is already required overwrites its quantity in place
//! without moving it. The update is associative in effect even though the
//! container is a list: at most one requirement per ingredient id.
//!
//! # Referential integrity
//!
//! [`RecipeBook::remove`] performs no dependency checks; the command layer
//! refuses to remove a recipe while a pending order references it, using
//! [`crate::core::orders::OrderQueue::references`].

use serde::{Deserialize, Serialize};

use super::types::{IngredientId, RecipeId};

/// One requirement line: the quantity of an ingredient needed for one unit
/// of the recipe. Quantity is always `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub ingredient: IngredientId,
    pub quantity: f64,
}

/// A recipe: identity, preparation instructions, and the ordered requirement
/// list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub instructions: String,
    pub requirements: Vec<Requirement>,
}

impl Recipe {
    /// Look up the requirement for an ingredient, if present.
    pub fn requirement(&self, ingredient: IngredientId) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|req| req.ingredient == ingredient)
    }

    /// Whether this recipe requires the ingredient.
    pub fn requires(&self, ingredient: IngredientId) -> bool {
        self.requirement(ingredient).is_some()
    }
}

/// Registry of recipes with auto-incrementing, never-reused ids.
#[derive(Debug, Clone)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
    next_id: u32,
}

impl Default for RecipeBook {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeBook {
    /// Create an empty recipe book. The first registered id is 1.
    pub fn new() -> Self {
        Self {
            recipes: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a new recipe (with no requirements yet) and return its id.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> RecipeId {
        let id = RecipeId::new(self.next_id);
        self.next_id += 1;
        self.recipes.push(Recipe {
            id,
            name: name.into(),
            instructions: instructions.into(),
            requirements: Vec::new(),
        });
        id
    }

    /// Re-insert a recipe with a known id (load path), advancing the id
    /// counter past it.
    pub fn restore(
        &mut self,
        id: RecipeId,
        name: impl Into<String>,
        instructions: impl Into<String>,
    ) {
        self.recipes.push(Recipe {
            id,
            name: name.into(),
            instructions: instructions.into(),
            requirements: Vec::new(),
        });
        if id.as_u32() >= self.next_id {
            self.next_id = id.as_u32() + 1;
        }
    }

    /// Look up a recipe by id.
    pub fn find(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    /// Whether the id is registered.
    pub fn contains(&self, id: RecipeId) -> bool {
        self.find(id).is_some()
    }

    /// Remove a recipe by id, compacting storage. Its requirements go with
    /// it. Returns `false` if the id is not registered.
    pub fn remove(&mut self, id: RecipeId) -> bool {
        match self.recipes.iter().position(|recipe| recipe.id == id) {
            Some(idx) => {
                self.recipes.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Rename a recipe. Returns `false` if the id is not registered.
    pub fn edit_name(&mut self, id: RecipeId, name: &str) -> bool {
        match self.find_mut(id) {
            Some(recipe) => {
                recipe.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Replace a recipe's preparation instructions. Returns `false` if the
    /// id is not registered.
    pub fn edit_instructions(&mut self, id: RecipeId, instructions: &str) -> bool {
        match self.find_mut(id) {
            Some(recipe) => {
                recipe.instructions = instructions.to_string();
                true
            }
            None => false,
        }
    }

    /// Add or update a requirement on a recipe.
    ///
    /// If the ingredient is already required, its quantity is overwritten in
    /// place (no duplicate, position unchanged); otherwise the requirement is
    /// inserted at the front of the list. Returns `false` if the recipe is
    /// not registered.
    pub fn upsert_requirement(
        &mut self,
        recipe: RecipeId,
        ingredient: IngredientId,
        quantity: f64,
    ) -> bool {
        let Some(recipe) = self.find_mut(recipe) else {
            return false;
        };
        match recipe
            .requirements
            .iter_mut()
            .find(|req| req.ingredient == ingredient)
        {
            Some(req) => req.quantity = quantity,
            None => recipe.requirements.insert(
                0,
                Requirement {
                    ingredient,
                    quantity,
                },
            ),
        }
        true
    }

    /// Append a requirement at the back of the list (load path).
    ///
    /// Data files store requirements in iteration order, so loading must
    /// append rather than front-insert to preserve the saved order.
    pub fn push_requirement(
        &mut self,
        recipe: RecipeId,
        ingredient: IngredientId,
        quantity: f64,
    ) -> bool {
        match self.find_mut(recipe) {
            Some(recipe) => {
                recipe.requirements.push(Requirement {
                    ingredient,
                    quantity,
                });
                true
            }
            None => false,
        }
    }

    /// Remove a requirement from a recipe. Returns `false` if the recipe is
    /// not registered or does not require the ingredient.
    pub fn remove_requirement(&mut self, recipe: RecipeId, ingredient: IngredientId) -> bool {
        let Some(recipe) = self.find_mut(recipe) else {
            return false;
        };
        match recipe
            .requirements
            .iter()
            .position(|req| req.ingredient == ingredient)
        {
            Some(idx) => {
                recipe.requirements.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether any recipe requires the ingredient (referential scan for
    /// catalog deletion checks).
    pub fn uses_ingredient(&self, ingredient: IngredientId) -> bool {
        self.recipes
            .iter()
            .any(|recipe| recipe.requires(ingredient))
    }

    /// Iterate the registered recipes.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    fn find_mut(&mut self, id: RecipeId) -> Option<&mut Recipe> {
        self.recipes.iter_mut().find(|recipe| recipe.id == id)
    }
}
