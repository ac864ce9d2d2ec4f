//! Application context and the command layer.
//!
//! [`App`] is the explicit context object: it owns the four registries, is
//! constructed once at startup, and is passed `&mut` into every command
//! handler. There are no process-wide globals.
//!
//! The registries themselves enforce only their local invariants; the
//! cross-registry rules live here, shared by both front ends:
//!
//! - an ingredient cannot leave the catalog while stock tracks it or a
//!   recipe requires it
//! - a recipe cannot be removed while a pending order references it
//! - stock deposits require a cataloged ingredient and a non-negative amount
//! - orders require an existing recipe with at least one requirement; stock
//!   is deliberately not checked at enqueue time (that is the fulfillment
//!   engine's job)

use thiserror::Error;

use crate::core::catalog::IngredientCatalog;
use crate::core::orders::OrderQueue;
use crate::core::recipes::RecipeBook;
use crate::core::stock::StockLedger;
use crate::core::types::{IngredientId, OrderId, RecipeId};
use crate::engine::{self, Attempt};

/// Errors from the command layer.
///
/// Validation errors and referential-integrity violations both land here;
/// none of them mutate any state. Transactional insufficiency is *not* an
/// error: it is an expected [`crate::engine::Outcome::Failed`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("ingredient {0} is not in the catalog")]
    IngredientNotFound(IngredientId),

    #[error("recipe {0} was not found")]
    RecipeNotFound(RecipeId),

    #[error("order {0} was not found")]
    OrderNotFound(OrderId),

    #[error("ingredient {0} has no stock entry")]
    StockEntryNotFound(IngredientId),

    #[error("recipe {recipe} has no requirement for ingredient {ingredient}")]
    RequirementNotFound {
        recipe: RecipeId,
        ingredient: IngredientId,
    },

    #[error("ingredient {0} is still tracked in stock; remove the stock entry first")]
    IngredientInStock(IngredientId),

    #[error("ingredient {0} is referenced by a recipe; remove it from recipes first")]
    IngredientInRecipe(IngredientId),

    #[error("recipe {0} has pending orders; cancel them first")]
    RecipeHasPendingOrders(RecipeId),

    #[error("recipe {0} has no requirements; add ingredients before ordering")]
    RecipeHasNoRequirements(RecipeId),

    #[error("quantity must be non-negative")]
    NegativeQuantity,

    #[error("requirement quantity must be positive")]
    NonPositiveQuantity,
}

/// The application context: all registries, one writer.
#[derive(Debug, Default)]
pub struct App {
    pub catalog: IngredientCatalog,
    pub stock: StockLedger,
    pub recipes: RecipeBook,
    pub orders: OrderQueue,
}

impl App {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    // --- catalog ---------------------------------------------------------

    /// Register a new ingredient.
    pub fn add_ingredient(&mut self, name: &str, unit: &str) -> IngredientId {
        self.catalog.register(name, unit)
    }

    /// Edit an ingredient's name and/or unit. `None` keeps the old value.
    pub fn edit_ingredient(
        &mut self,
        id: IngredientId,
        name: Option<&str>,
        unit: Option<&str>,
    ) -> Result<(), AppError> {
        if self.catalog.edit(id, name, unit) {
            Ok(())
        } else {
            Err(AppError::IngredientNotFound(id))
        }
    }

    /// Remove an ingredient from the catalog.
    ///
    /// Blocked while a stock entry or any recipe requirement references the
    /// id; the stock check runs first so its message takes precedence.
    pub fn remove_ingredient(&mut self, id: IngredientId) -> Result<(), AppError> {
        if !self.catalog.contains(id) {
            return Err(AppError::IngredientNotFound(id));
        }
        if self.stock.contains(id) {
            return Err(AppError::IngredientInStock(id));
        }
        if self.recipes.uses_ingredient(id) {
            return Err(AppError::IngredientInRecipe(id));
        }
        self.catalog.remove(id);
        Ok(())
    }

    // --- stock -----------------------------------------------------------

    /// Deposit stock for a cataloged ingredient.
    pub fn deposit_stock(&mut self, id: IngredientId, quantity: f64) -> Result<(), AppError> {
        if quantity < 0.0 {
            return Err(AppError::NegativeQuantity);
        }
        if !self.catalog.contains(id) {
            return Err(AppError::IngredientNotFound(id));
        }
        self.stock.deposit(id, quantity);
        Ok(())
    }

    /// Manual stock withdrawal (spoilage, corrections). Returns `false` on
    /// insufficiency or a missing entry, exactly like the ledger primitive.
    pub fn withdraw_stock(&mut self, id: IngredientId, quantity: f64) -> bool {
        self.stock.withdraw(id, quantity)
    }

    /// Stop tracking an ingredient's stock entirely.
    pub fn remove_stock_entry(&mut self, id: IngredientId) -> Result<(), AppError> {
        if self.stock.remove_entry(id) {
            Ok(())
        } else {
            Err(AppError::StockEntryNotFound(id))
        }
    }

    // --- recipes ---------------------------------------------------------

    /// Register a new recipe with no requirements.
    pub fn add_recipe(&mut self, name: &str, instructions: &str) -> RecipeId {
        self.recipes.register(name, instructions)
    }

    /// Rename a recipe.
    pub fn edit_recipe_name(&mut self, id: RecipeId, name: &str) -> Result<(), AppError> {
        if self.recipes.edit_name(id, name) {
            Ok(())
        } else {
            Err(AppError::RecipeNotFound(id))
        }
    }

    /// Replace a recipe's preparation instructions.
    pub fn edit_recipe_instructions(
        &mut self,
        id: RecipeId,
        instructions: &str,
    ) -> Result<(), AppError> {
        if self.recipes.edit_instructions(id, instructions) {
            Ok(())
        } else {
            Err(AppError::RecipeNotFound(id))
        }
    }

    /// Remove a recipe. Blocked while any pending order references it.
    pub fn remove_recipe(&mut self, id: RecipeId) -> Result<(), AppError> {
        if !self.recipes.contains(id) {
            return Err(AppError::RecipeNotFound(id));
        }
        if self.orders.references(id) {
            return Err(AppError::RecipeHasPendingOrders(id));
        }
        self.recipes.remove(id);
        Ok(())
    }

    /// Add or update a requirement on a recipe.
    pub fn add_requirement(
        &mut self,
        recipe: RecipeId,
        ingredient: IngredientId,
        quantity: f64,
    ) -> Result<(), AppError> {
        if quantity <= 0.0 {
            return Err(AppError::NonPositiveQuantity);
        }
        if self.recipes.upsert_requirement(recipe, ingredient, quantity) {
            Ok(())
        } else {
            Err(AppError::RecipeNotFound(recipe))
        }
    }

    /// Remove a requirement from a recipe.
    pub fn remove_requirement(
        &mut self,
        recipe: RecipeId,
        ingredient: IngredientId,
    ) -> Result<(), AppError> {
        if !self.recipes.contains(recipe) {
            return Err(AppError::RecipeNotFound(recipe));
        }
        if self.recipes.remove_requirement(recipe, ingredient) {
            Ok(())
        } else {
            Err(AppError::RequirementNotFound { recipe, ingredient })
        }
    }

    // --- orders ----------------------------------------------------------

    /// Enqueue an order for a recipe.
    ///
    /// The recipe must exist and have at least one requirement. Stock is not
    /// checked here: the real check happens at processing time, inside the
    /// transaction.
    pub fn place_order(&mut self, recipe: RecipeId) -> Result<OrderId, AppError> {
        let Some(found) = self.recipes.find(recipe) else {
            return Err(AppError::RecipeNotFound(recipe));
        };
        if found.requirements.is_empty() {
            return Err(AppError::RecipeHasNoRequirements(recipe));
        }
        Ok(self.orders.enqueue(recipe))
    }

    /// Cancel a pending order by id.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<(), AppError> {
        if self.orders.remove(id) {
            Ok(())
        } else {
            Err(AppError::OrderNotFound(id))
        }
    }

    /// Run one fulfillment attempt against the head of the queue.
    pub fn process_next(&mut self) -> Attempt {
        engine::process_next(
            &self.catalog,
            &self.recipes,
            &mut self.stock,
            &mut self.orders,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_cake() -> (App, IngredientId, RecipeId) {
        let mut app = App::new();
        let flour = app.add_ingredient("Flour", "g");
        let cake = app.add_recipe("Cake", "Mix and bake.");
        app.add_requirement(cake, flour, 200.0).unwrap();
        (app, flour, cake)
    }

    #[test]
    fn deposit_requires_cataloged_ingredient() {
        let mut app = App::new();
        let err = app.deposit_stock(IngredientId::new(1), 10.0).unwrap_err();
        assert_eq!(err, AppError::IngredientNotFound(IngredientId::new(1)));
        assert!(app.stock.is_empty());
    }

    #[test]
    fn deposit_rejects_negative_amounts() {
        let (mut app, flour, _) = app_with_cake();
        assert_eq!(
            app.deposit_stock(flour, -1.0),
            Err(AppError::NegativeQuantity)
        );
    }

    #[test]
    fn ingredient_removal_is_blocked_by_stock_then_recipes() {
        let (mut app, flour, cake) = app_with_cake();
        app.deposit_stock(flour, 10.0).unwrap();

        assert_eq!(
            app.remove_ingredient(flour),
            Err(AppError::IngredientInStock(flour))
        );

        app.remove_stock_entry(flour).unwrap();
        assert_eq!(
            app.remove_ingredient(flour),
            Err(AppError::IngredientInRecipe(flour))
        );

        app.remove_requirement(cake, flour).unwrap();
        assert!(app.remove_ingredient(flour).is_ok());
    }

    #[test]
    fn recipe_removal_is_blocked_by_pending_orders() {
        let (mut app, _, cake) = app_with_cake();
        let order = app.place_order(cake).unwrap();

        assert_eq!(
            app.remove_recipe(cake),
            Err(AppError::RecipeHasPendingOrders(cake))
        );

        app.cancel_order(order).unwrap();
        assert!(app.remove_recipe(cake).is_ok());
    }

    #[test]
    fn orders_require_a_recipe_with_requirements() {
        let mut app = App::new();
        assert_eq!(
            app.place_order(RecipeId::new(1)),
            Err(AppError::RecipeNotFound(RecipeId::new(1)))
        );

        let bare = app.add_recipe("Water", "Pour.");
        assert_eq!(
            app.place_order(bare),
            Err(AppError::RecipeHasNoRequirements(bare))
        );
    }

    #[test]
    fn orders_do_not_check_stock_at_enqueue_time() {
        let (mut app, _, cake) = app_with_cake();
        // No stock at all: enqueue still succeeds.
        let order = app.place_order(cake).unwrap();
        assert_eq!(order.as_u32(), 1);
        assert_eq!(app.orders.len(), 1);
    }

    #[test]
    fn requirement_validation() {
        let (mut app, flour, cake) = app_with_cake();
        assert_eq!(
            app.add_requirement(cake, flour, 0.0),
            Err(AppError::NonPositiveQuantity)
        );
        assert_eq!(
            app.add_requirement(RecipeId::new(9), flour, 1.0),
            Err(AppError::RecipeNotFound(RecipeId::new(9)))
        );
        assert_eq!(
            app.remove_requirement(cake, IngredientId::new(9)),
            Err(AppError::RequirementNotFound {
                recipe: cake,
                ingredient: IngredientId::new(9)
            })
        );
    }
}
