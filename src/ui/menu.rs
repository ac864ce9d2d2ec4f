//! ui::menu
//!
//! The interactive terminal front end: a numbered menu over the same
//! command layer the dashboard bridge uses, so every referential-integrity
//! rule applies identically in both front ends.
//!
//! All registries are saved once, on exit; the bridge saves per command.

use std::io::{self, BufRead, Write};

use crate::app::App;
use crate::core::types::{IngredientId, OrderId, RecipeId};
use crate::engine::Outcome;
use crate::store::{self, DataPaths};
use crate::ui::output;

/// Run the menu loop until the user exits, then save all registries.
pub fn run(app: &mut App, paths: &DataPaths) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        println!();
        println!("========================================");
        println!("       SHARED KITCHEN MANAGEMENT");
        println!("========================================");
        println!("1. Ingredient catalog");
        println!("2. Stock");
        println!("3. Recipe book");
        println!("4. Order queue");
        println!("0. Save and exit");
        let Some(choice) = prompt(&mut lines, "Choice: ")? else {
            break;
        };
        match choice.trim() {
            "1" => catalog_menu(app, &mut lines)?,
            "2" => stock_menu(app, &mut lines)?,
            "3" => recipe_menu(app, &mut lines)?,
            "4" => order_menu(app, &mut lines)?,
            "0" => break,
            _ => println!("Invalid option."),
        }
    }

    if let Err(e) = store::save_app(app, paths) {
        output::error(e);
    }
    Ok(())
}

fn catalog_menu(app: &mut App, lines: &mut Lines) -> io::Result<()> {
    loop {
        println!();
        println!("--- INGREDIENT CATALOG ---");
        println!("1. List ingredients");
        println!("2. Register ingredient");
        println!("3. Edit ingredient");
        println!("4. Remove ingredient");
        println!("0. Back");
        let Some(choice) = prompt(lines, "Option: ")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => list_catalog(app),
            "2" => {
                let Some(name) = prompt(lines, "Ingredient name: ")? else {
                    return Ok(());
                };
                let Some(unit) = prompt(lines, "Unit (g, ml, un, ...): ")? else {
                    return Ok(());
                };
                let id = app.add_ingredient(name.trim(), unit.trim());
                println!("Registered with id {}.", id);
            }
            "3" => {
                let Some(id) = prompt_id::<IngredientId>(lines, "Ingredient id to edit: ")? else {
                    continue;
                };
                let Some(name) = prompt(lines, "New name (enter to keep): ")? else {
                    return Ok(());
                };
                let Some(unit) = prompt(lines, "New unit (enter to keep): ")? else {
                    return Ok(());
                };
                let name = non_empty(&name);
                let unit = non_empty(&unit);
                match app.edit_ingredient(id, name, unit) {
                    Ok(()) => println!("Updated."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "4" => {
                let Some(id) = prompt_id::<IngredientId>(lines, "Ingredient id to remove: ")?
                else {
                    continue;
                };
                match app.remove_ingredient(id) {
                    Ok(()) => println!("Removed."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "0" => return Ok(()),
            _ => println!("Invalid option."),
        }
    }
}

fn stock_menu(app: &mut App, lines: &mut Lines) -> io::Result<()> {
    loop {
        println!();
        println!("--- STOCK ---");
        println!("1. Show current stock");
        println!("2. Deposit (purchase/restock)");
        println!("3. Manual withdrawal");
        println!("4. Stop tracking an ingredient");
        println!("0. Back");
        let Some(choice) = prompt(lines, "Option: ")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => list_stock(app),
            "2" => {
                list_catalog(app);
                let Some(id) = prompt_id::<IngredientId>(lines, "Ingredient id: ")? else {
                    continue;
                };
                let Some(qty) = prompt_qty(lines, "Quantity to add: ")? else {
                    continue;
                };
                match app.deposit_stock(id, qty) {
                    Ok(()) => println!("Stock updated."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "3" => {
                list_stock(app);
                let Some(id) = prompt_id::<IngredientId>(lines, "Ingredient id: ")? else {
                    continue;
                };
                let Some(qty) = prompt_qty(lines, "Quantity to withdraw: ")? else {
                    continue;
                };
                if app.withdraw_stock(id, qty) {
                    println!("Withdrawal done.");
                } else {
                    println!("Failed: insufficient quantity or no such entry.");
                }
            }
            "4" => {
                let Some(id) = prompt_id::<IngredientId>(lines, "Ingredient id: ")? else {
                    continue;
                };
                match app.remove_stock_entry(id) {
                    Ok(()) => println!("Entry removed."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "0" => return Ok(()),
            _ => println!("Invalid option."),
        }
    }
}

fn recipe_menu(app: &mut App, lines: &mut Lines) -> io::Result<()> {
    loop {
        println!();
        println!("--- RECIPE BOOK ---");
        println!("1. List recipes");
        println!("2. Create recipe");
        println!("3. Edit recipe");
        println!("4. Add ingredient to a recipe");
        println!("5. Remove ingredient from a recipe");
        println!("6. Remove recipe");
        println!("0. Back");
        let Some(choice) = prompt(lines, "Option: ")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => list_recipes(app),
            "2" => {
                let Some(name) = prompt(lines, "Recipe name: ")? else {
                    return Ok(());
                };
                let Some(instructions) = prompt(lines, "Instructions: ")? else {
                    return Ok(());
                };
                let id = app.add_recipe(name.trim(), instructions.trim());
                println!("Recipe created with id {} (now add ingredients to it).", id);
            }
            "3" => {
                let Some(recipe) = prompt_id::<RecipeId>(lines, "Recipe id to edit: ")? else {
                    continue;
                };
                let Some(name) = prompt(lines, "New name (enter to keep): ")? else {
                    return Ok(());
                };
                let Some(instructions) = prompt(lines, "New instructions (enter to keep): ")?
                else {
                    return Ok(());
                };
                let mut result = Ok(());
                if let Some(name) = non_empty(&name) {
                    result = app.edit_recipe_name(recipe, name);
                }
                if result.is_ok() {
                    if let Some(instructions) = non_empty(&instructions) {
                        result = app.edit_recipe_instructions(recipe, instructions);
                    }
                }
                match result {
                    Ok(()) => println!("Updated."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "4" => {
                list_recipes(app);
                let Some(recipe) = prompt_id::<RecipeId>(lines, "Recipe id: ")? else {
                    continue;
                };
                list_catalog(app);
                let Some(ingredient) = prompt_id::<IngredientId>(lines, "Ingredient id: ")?
                else {
                    continue;
                };
                let Some(qty) = prompt_qty(lines, "Quantity needed: ")? else {
                    continue;
                };
                match app.add_requirement(recipe, ingredient, qty) {
                    Ok(()) => println!("Ingredient added to the recipe."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "5" => {
                let Some(recipe) = prompt_id::<RecipeId>(lines, "Recipe id: ")? else {
                    continue;
                };
                let Some(ingredient) = prompt_id::<IngredientId>(lines, "Ingredient id: ")?
                else {
                    continue;
                };
                match app.remove_requirement(recipe, ingredient) {
                    Ok(()) => println!("Ingredient removed from the recipe."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "6" => {
                let Some(recipe) = prompt_id::<RecipeId>(lines, "Recipe id to remove: ")? else {
                    continue;
                };
                match app.remove_recipe(recipe) {
                    Ok(()) => println!("Recipe deleted."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "0" => return Ok(()),
            _ => println!("Invalid option."),
        }
    }
}

fn order_menu(app: &mut App, lines: &mut Lines) -> io::Result<()> {
    loop {
        println!();
        println!("--- ORDER QUEUE / PRODUCTION ---");
        println!("1. List pending orders");
        println!("2. New order (enqueue)");
        println!("3. Cancel an order");
        println!("4. Process next order (cook)");
        println!("0. Back");
        let Some(choice) = prompt(lines, "Option: ")? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => list_orders(app),
            "2" => {
                list_recipes(app);
                let Some(recipe) = prompt_id::<RecipeId>(lines, "Recipe id for the order: ")?
                else {
                    continue;
                };
                match app.place_order(recipe) {
                    Ok(id) => println!("Order #{} added to the queue.", id),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "3" => {
                list_orders(app);
                let Some(order) = prompt_id::<OrderId>(lines, "Order id to cancel: ")? else {
                    continue;
                };
                match app.cancel_order(order) {
                    Ok(()) => println!("Order cancelled."),
                    Err(e) => println!("{}.", capitalized(e)),
                }
            }
            "4" => report_attempt(app),
            "0" => return Ok(()),
            _ => println!("Invalid option."),
        }
    }
}

fn report_attempt(app: &mut App) {
    let attempt = app.process_next();
    match attempt.outcome {
        Outcome::Success { order, recipe, .. } => {
            let name = app.recipes.find(recipe).map_or("?", |r| r.name.as_str());
            println!("Order #{} ({}) processed successfully!", order, name);
        }
        Outcome::Failed {
            order,
            ingredient,
            ref name,
            needed,
            available,
            ..
        } => {
            println!(
                "Insufficient stock for order #{}: {} (id {}) needs {:.2}, {:.2} available.",
                order,
                name.as_deref().unwrap_or("unknown ingredient"),
                ingredient,
                needed,
                available
            );
            println!("All withdrawals were rolled back; the order stays queued.");
        }
        Outcome::Discarded { order, recipe } => {
            println!(
                "Order #{} referenced deleted recipe {} and was discarded.",
                order, recipe
            );
        }
        Outcome::EmptyQueue => println!("Order queue is empty."),
    }
}

// --- listings ------------------------------------------------------------

fn list_catalog(app: &App) {
    println!();
    println!("--- INGREDIENT CATALOG ({} items) ---", app.catalog.len());
    for item in app.catalog.iter() {
        println!("[id {}] {} ({})", item.id, item.name, item.unit);
    }
}

fn list_stock(app: &App) {
    println!();
    println!("--- CURRENT STOCK ({} entries) ---", app.stock.len());
    for entry in app.stock.iter() {
        // The entry may outlive its catalog ingredient.
        let name = app.catalog.name_of(entry.ingredient).unwrap_or("unknown");
        let unit = app.catalog.unit_of(entry.ingredient).unwrap_or("");
        println!(
            "  [id {}] {}: {:.2} {}",
            entry.ingredient, name, entry.quantity, unit
        );
    }
}

fn list_recipes(app: &App) {
    println!();
    println!("--- RECIPE BOOK ({} recipes) ---", app.recipes.len());
    for recipe in app.recipes.iter() {
        println!("[id {}] {}", recipe.id, recipe.name);
        println!("  Instructions: {}", recipe.instructions);
        if recipe.requirements.is_empty() {
            println!("  (no ingredients registered)");
            continue;
        }
        for req in &recipe.requirements {
            let name = app.catalog.name_of(req.ingredient).unwrap_or("unknown");
            let unit = app.catalog.unit_of(req.ingredient).unwrap_or("");
            println!(
                "  - [id {}] {}: {:.2} {}",
                req.ingredient, name, req.quantity, unit
            );
        }
    }
}

fn list_orders(app: &App) {
    println!();
    println!("--- ORDER QUEUE ({} pending) ---", app.orders.len());
    for order in app.orders.iter() {
        let name = app
            .recipes
            .find(order.recipe)
            .map_or("[recipe removed]", |r| r.name.as_str());
        println!("Order #{}: {}", order.id, name);
    }
}

// --- input helpers -------------------------------------------------------

type Lines = io::Lines<io::StdinLock<'static>>;

/// Print a prompt and read one line; `None` on end of input.
fn prompt(lines: &mut Lines, message: &str) -> io::Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?)),
        None => Ok(None),
    }
}

/// Prompt for an id; reports a parse failure and returns `None`.
fn prompt_id<T: std::str::FromStr>(lines: &mut Lines, message: &str) -> io::Result<Option<T>> {
    let Some(line) = prompt(lines, message)? else {
        return Ok(None);
    };
    match line.trim().parse::<T>() {
        Ok(id) => Ok(Some(id)),
        Err(_) => {
            println!("Not a valid id.");
            Ok(None)
        }
    }
}

/// Prompt for a quantity; reports a parse failure and returns `None`.
fn prompt_qty(lines: &mut Lines, message: &str) -> io::Result<Option<f64>> {
    let Some(line) = prompt(lines, message)? else {
        return Ok(None);
    };
    match line.trim().parse::<f64>() {
        Ok(qty) => Ok(Some(qty)),
        Err(_) => {
            println!("Not a valid quantity.");
            Ok(None)
        }
    }
}

fn non_empty(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Error messages start lowercase for composition; sentences start upper.
fn capitalized(err: impl std::fmt::Display) -> String {
    let text = err.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => text,
    }
}
