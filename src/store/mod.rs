//! store
//!
//! Flat-file persistence for the registries.
//!
//! # Formats
//!
//! One record per line, `;`-delimited, one file per registry:
//!
//! - `ingredients.txt`: `id;name;unit`
//! - `stock.txt`: `ingredientId;quantity` (two decimal places)
//! - `recipes.txt`: a `[R];id;name;instructions` header followed by zero or
//!   more `[I];ingredientId;quantity` requirement lines until the next `[R]`
//! - `orders.txt`: one recipe id per line, in queue order
//!
//! # Semantics
//!
//! Saves are synchronous whole-file rewrites; there is no partial
//! persistence. On load, ids embedded in the file override freshly
//! generated ids and each registry's counter is advanced past the maximum
//! id seen. A missing file is a fresh start, not an error. Malformed lines
//! are skipped. Orders referencing unknown recipes are dropped at load
//! time (the lazy-discard path would drop them on first processing anyway).
//!
//! Requirement lines are written in iteration order and loaded by
//! appending, so a save/load round trip preserves the order the
//! fulfillment engine sees.
//!
//! Persistence failures are reported, never fatal: callers log the error
//! and continue with in-memory state.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::app::App;
use crate::core::catalog::IngredientCatalog;
use crate::core::orders::OrderQueue;
use crate::core::recipes::RecipeBook;
use crate::core::stock::StockLedger;
use crate::core::types::{IngredientId, RecipeId};

pub const INGREDIENTS_FILE: &str = "ingredients.txt";
pub const STOCK_FILE: &str = "stock.txt";
pub const RECIPES_FILE: &str = "recipes.txt";
pub const ORDERS_FILE: &str = "orders.txt";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Locations of the data files inside one data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    dir: PathBuf,
}

impl DataPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ingredients(&self) -> PathBuf {
        self.dir.join(INGREDIENTS_FILE)
    }

    pub fn stock(&self) -> PathBuf {
        self.dir.join(STOCK_FILE)
    }

    pub fn recipes(&self) -> PathBuf {
        self.dir.join(RECIPES_FILE)
    }

    pub fn orders(&self) -> PathBuf {
        self.dir.join(ORDERS_FILE)
    }
}

// --- catalog -------------------------------------------------------------

/// Write the catalog as `id;name;unit` lines.
pub fn save_catalog(catalog: &IngredientCatalog, paths: &DataPaths) -> Result<(), StoreError> {
    let mut out = String::new();
    for item in catalog.iter() {
        out.push_str(&format!("{};{};{}\n", item.id, item.name, item.unit));
    }
    write_file(&paths.ingredients(), &out)
}

/// Load the catalog, keeping file ids and advancing the id counter.
pub fn load_catalog(catalog: &mut IngredientCatalog, paths: &DataPaths) -> Result<(), StoreError> {
    let Some(text) = read_file(&paths.ingredients())? else {
        return Ok(());
    };
    for line in lines(&text) {
        let mut parts = line.splitn(3, ';');
        let (Some(id), Some(name), Some(unit)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let Ok(id) = id.parse::<IngredientId>() else {
            continue;
        };
        catalog.restore(id, name, unit);
    }
    Ok(())
}

// --- stock ---------------------------------------------------------------

/// Write the ledger as `ingredientId;quantity` lines.
pub fn save_stock(stock: &StockLedger, paths: &DataPaths) -> Result<(), StoreError> {
    let mut out = String::new();
    for entry in stock.iter() {
        out.push_str(&format!("{};{:.2}\n", entry.ingredient, entry.quantity));
    }
    write_file(&paths.stock(), &out)
}

/// Load the ledger.
pub fn load_stock(stock: &mut StockLedger, paths: &DataPaths) -> Result<(), StoreError> {
    let Some(text) = read_file(&paths.stock())? else {
        return Ok(());
    };
    for line in lines(&text) {
        let Some((id, qty)) = line.split_once(';') else {
            continue;
        };
        let (Ok(id), Ok(qty)) = (id.parse::<IngredientId>(), qty.trim().parse::<f64>()) else {
            continue;
        };
        if qty >= 0.0 {
            stock.deposit(id, qty);
        }
    }
    Ok(())
}

// --- recipes -------------------------------------------------------------

/// Write the recipe book as `[R]` headers with `[I]` requirement lines.
pub fn save_recipes(recipes: &RecipeBook, paths: &DataPaths) -> Result<(), StoreError> {
    let mut out = String::new();
    for recipe in recipes.iter() {
        out.push_str(&format!(
            "[R];{};{};{}\n",
            recipe.id, recipe.name, recipe.instructions
        ));
        for req in &recipe.requirements {
            out.push_str(&format!("[I];{};{:.2}\n", req.ingredient, req.quantity));
        }
    }
    write_file(&paths.recipes(), &out)
}

/// Load the recipe book, keeping file ids and requirement order.
pub fn load_recipes(recipes: &mut RecipeBook, paths: &DataPaths) -> Result<(), StoreError> {
    let Some(text) = read_file(&paths.recipes())? else {
        return Ok(());
    };
    // Requirement lines attach to the most recent [R] header.
    let mut current: Option<RecipeId> = None;
    for line in lines(&text) {
        if let Some(rest) = line.strip_prefix("[R];") {
            let mut parts = rest.splitn(3, ';');
            let (Some(id), Some(name)) = (parts.next(), parts.next()) else {
                current = None;
                continue;
            };
            let Ok(id) = id.parse::<RecipeId>() else {
                current = None;
                continue;
            };
            let instructions = parts.next().unwrap_or("");
            recipes.restore(id, name, instructions);
            current = Some(id);
        } else if let Some(rest) = line.strip_prefix("[I];") {
            let Some(recipe) = current else {
                continue;
            };
            let Some((id, qty)) = rest.split_once(';') else {
                continue;
            };
            let (Ok(id), Ok(qty)) = (id.parse::<IngredientId>(), qty.trim().parse::<f64>()) else {
                continue;
            };
            recipes.push_requirement(recipe, id, qty);
        }
    }
    Ok(())
}

// --- orders --------------------------------------------------------------

/// Write the queue as one recipe id per line, head first.
pub fn save_orders(orders: &OrderQueue, paths: &DataPaths) -> Result<(), StoreError> {
    let mut out = String::new();
    for order in orders.iter() {
        out.push_str(&format!("{}\n", order.recipe));
    }
    write_file(&paths.orders(), &out)
}

/// Load the queue, enqueueing in file order with fresh order ids.
///
/// Orders whose recipe no longer exists are dropped here rather than left
/// for the engine's lazy discard.
pub fn load_orders(
    orders: &mut OrderQueue,
    recipes: &RecipeBook,
    paths: &DataPaths,
) -> Result<(), StoreError> {
    let Some(text) = read_file(&paths.orders())? else {
        return Ok(());
    };
    for line in lines(&text) {
        let Ok(recipe) = line.parse::<RecipeId>() else {
            continue;
        };
        if recipes.contains(recipe) {
            orders.enqueue(recipe);
        }
    }
    Ok(())
}

// --- whole-context helpers ----------------------------------------------

/// Load every registry, collecting (not aborting on) per-file errors.
///
/// Always returns a usable `App`; a file that failed to load leaves its
/// registry empty and contributes an error for the caller to report.
pub fn load_app(paths: &DataPaths) -> (App, Vec<StoreError>) {
    let mut app = App::new();
    let mut errors = Vec::new();

    if let Err(e) = load_catalog(&mut app.catalog, paths) {
        errors.push(e);
    }
    if let Err(e) = load_stock(&mut app.stock, paths) {
        errors.push(e);
    }
    if let Err(e) = load_recipes(&mut app.recipes, paths) {
        errors.push(e);
    }
    if let Err(e) = load_orders(&mut app.orders, &app.recipes, paths) {
        errors.push(e);
    }

    (app, errors)
}

/// Save every registry, stopping at the first failure.
pub fn save_app(app: &App, paths: &DataPaths) -> Result<(), StoreError> {
    save_catalog(&app.catalog, paths)?;
    save_stock(&app.stock, paths)?;
    save_recipes(&app.recipes, paths)?;
    save_orders(&app.orders, paths)
}

// --- file helpers --------------------------------------------------------

/// Read a whole file; `Ok(None)` when it does not exist yet.
fn read_file(path: &Path) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Whole-file rewrite, creating the data directory if needed.
fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
