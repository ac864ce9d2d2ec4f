//! bridge
//!
//! Line-protocol front end for external dashboards.
//!
//! # Protocol
//!
//! One command per stdin line, one JSON document per stdout line. The
//! command vocabulary and response keys are kept exactly as the dashboards
//! already speak them, Portuguese names included (`pilha_ops`, `falhou`,
//! `necessario`, `disponivel`, `id_pedido`, ...). Error *messages* are
//! human-facing text and are English.
//!
//! Stdout carries nothing but responses. Diagnostics go to stderr so a
//! frontend reading stdout never sees a non-JSON line.
//!
//! # Persistence
//!
//! Every mutating command saves the registry it touched before responding,
//! mirroring the save-per-command discipline of the interactive menu's
//! save-on-exit. A save failure is reported on stderr and the session
//! continues with in-memory state.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use thiserror::Error;

use crate::app::App;
use crate::core::types::{IngredientId, OrderId, RecipeId};
use crate::engine::{OpKind, Outcome, StockOp};
use crate::store::{self, DataPaths, StoreError};
use crate::ui::output::{self, Verbosity};

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GetAll,
    AddIngredient { name: String, unit: String },
    RemoveIngredient(IngredientId),
    Deposit { ingredient: IngredientId, quantity: f64 },
    RemoveStockEntry(IngredientId),
    AddRecipe { name: String, instructions: String },
    RemoveRecipe(RecipeId),
    AddRequirement { recipe: RecipeId, ingredient: IngredientId, quantity: f64 },
    PlaceOrder(RecipeId),
    CancelOrder(OrderId),
    ProcessNext,
    Quit,
}

/// A line that could not be parsed into a [`Request`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid arguments, expected: {0}")]
    BadArguments(&'static str),
}

/// Parse one trimmed, non-empty input line.
pub fn parse_line(line: &str) -> Result<Request, ParseError> {
    let (command, args) = match line.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (line, ""),
    };

    match command {
        "GET_ALL" => Ok(Request::GetAll),
        "QUIT" => Ok(Request::Quit),
        "PROCESSAR_PEDIDO" => Ok(Request::ProcessNext),
        "ADD_CATALOGO" => {
            let (name, unit) = piped(args).ok_or(ParseError::BadArguments("name|unit"))?;
            Ok(Request::AddIngredient { name, unit })
        }
        "DEL_CATALOGO" => Ok(Request::RemoveIngredient(id(args)?)),
        "ADD_ESTOQUE" => {
            let mut parts = args.split_whitespace();
            let (Some(ingredient), Some(quantity), None) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(ParseError::BadArguments("id quantity"));
            };
            let (Ok(ingredient), Ok(quantity)) =
                (ingredient.parse::<IngredientId>(), quantity.parse::<f64>())
            else {
                return Err(ParseError::BadArguments("id quantity"));
            };
            Ok(Request::Deposit { ingredient, quantity })
        }
        "DEL_ESTOQUE" => Ok(Request::RemoveStockEntry(id(args)?)),
        "ADD_RECEITA" => {
            let (name, instructions) =
                piped(args).ok_or(ParseError::BadArguments("name|instructions"))?;
            Ok(Request::AddRecipe { name, instructions })
        }
        "DEL_RECEITA" => Ok(Request::RemoveRecipe(id(args)?)),
        "ADD_ING_RECEITA" => {
            let mut parts = args.split_whitespace();
            let (Some(recipe), Some(ingredient), Some(quantity), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(ParseError::BadArguments("recipeId ingredientId quantity"));
            };
            let (Ok(recipe), Ok(ingredient), Ok(quantity)) = (
                recipe.parse::<RecipeId>(),
                ingredient.parse::<IngredientId>(),
                quantity.parse::<f64>(),
            ) else {
                return Err(ParseError::BadArguments("recipeId ingredientId quantity"));
            };
            Ok(Request::AddRequirement { recipe, ingredient, quantity })
        }
        "ADD_PEDIDO" => Ok(Request::PlaceOrder(id(args)?)),
        "DEL_PEDIDO" => Ok(Request::CancelOrder(id(args)?)),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

/// `name|rest`, both sides trimmed. Only the first pipe splits, so
/// instructions may themselves contain pipes.
fn piped(args: &str) -> Option<(String, String)> {
    let (left, right) = args.split_once('|')?;
    Some((left.trim().to_string(), right.trim().to_string()))
}

fn id<T: std::str::FromStr>(args: &str) -> Result<T, ParseError> {
    args.trim()
        .parse::<T>()
        .map_err(|_| ParseError::BadArguments("id"))
}

/// The bridge session: one [`App`] driven by a command stream.
pub struct Bridge {
    app: App,
    paths: DataPaths,
    verbosity: Verbosity,
}

impl Bridge {
    pub fn new(app: App, paths: DataPaths, verbosity: Verbosity) -> Self {
        Self {
            app,
            paths,
            verbosity,
        }
    }

    /// The context, for inspection after the session ends.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Drive the session until `QUIT` or end of input.
    ///
    /// Every input line produces exactly one output line, except blank
    /// lines (skipped) and `QUIT` (terminates silently). Responses are
    /// flushed per line; frontends block on them.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            output::debug(format_args!("recv: {}", line), self.verbosity);

            let response = match parse_line(line) {
                Ok(Request::Quit) => break,
                Ok(request) => self.handle(request),
                Err(e) => fail(e),
            };
            serde_json::to_writer(&mut out, &response)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
        Ok(())
    }

    /// Execute one command and build its response document.
    fn handle(&mut self, request: Request) -> Value {
        match request {
            Request::GetAll => self.snapshot(),
            Request::AddIngredient { name, unit } => {
                let id = self.app.add_ingredient(&name, &unit);
                self.persist(store::save_catalog(&self.app.catalog, &self.paths));
                json!({ "ok": true, "id": id })
            }
            Request::RemoveIngredient(id) => match self.app.remove_ingredient(id) {
                Ok(()) => {
                    self.persist(store::save_catalog(&self.app.catalog, &self.paths));
                    ok()
                }
                Err(e) => fail(e),
            },
            Request::Deposit { ingredient, quantity } => {
                match self.app.deposit_stock(ingredient, quantity) {
                    Ok(()) => {
                        self.persist(store::save_stock(&self.app.stock, &self.paths));
                        ok()
                    }
                    Err(e) => fail(e),
                }
            }
            Request::RemoveStockEntry(id) => match self.app.remove_stock_entry(id) {
                Ok(()) => {
                    self.persist(store::save_stock(&self.app.stock, &self.paths));
                    ok()
                }
                Err(e) => fail(e),
            },
            Request::AddRecipe { name, instructions } => {
                let id = self.app.add_recipe(&name, &instructions);
                self.persist(store::save_recipes(&self.app.recipes, &self.paths));
                json!({ "ok": true, "id": id })
            }
            Request::RemoveRecipe(id) => match self.app.remove_recipe(id) {
                Ok(()) => {
                    self.persist(store::save_recipes(&self.app.recipes, &self.paths));
                    ok()
                }
                Err(e) => fail(e),
            },
            Request::AddRequirement { recipe, ingredient, quantity } => {
                match self.app.add_requirement(recipe, ingredient, quantity) {
                    Ok(()) => {
                        self.persist(store::save_recipes(&self.app.recipes, &self.paths));
                        ok()
                    }
                    Err(e) => fail(e),
                }
            }
            Request::PlaceOrder(recipe) => match self.app.place_order(recipe) {
                Ok(id) => {
                    self.persist(store::save_orders(&self.app.orders, &self.paths));
                    json!({ "ok": true, "id": id })
                }
                Err(e) => fail(e),
            },
            Request::CancelOrder(id) => match self.app.cancel_order(id) {
                Ok(()) => {
                    self.persist(store::save_orders(&self.app.orders, &self.paths));
                    ok()
                }
                Err(e) => fail(e),
            },
            Request::ProcessNext => self.process(),
            Request::Quit => unreachable!("QUIT is handled by the serve loop"),
        }
    }

    /// Run one fulfillment attempt and render it on the wire.
    fn process(&mut self) -> Value {
        let attempt = self.app.process_next();
        output::debug(
            format_args!(
                "attempt {} at {}: ledger {} -> {}",
                attempt.op_id,
                attempt.started_at.to_rfc3339(),
                attempt.fingerprint_before,
                attempt.fingerprint_after
            ),
            self.verbosity,
        );

        match attempt.outcome {
            Outcome::EmptyQueue => fail("order queue is empty"),
            Outcome::Discarded { .. } => {
                self.persist(store::save_orders(&self.app.orders, &self.paths));
                json!({
                    "ok": false,
                    "error": "order referenced a removed recipe and was discarded",
                    "discarded": true,
                })
            }
            Outcome::Failed {
                ingredient,
                ref name,
                needed,
                available,
                ref log,
                ..
            } => {
                // Rollback restored the ledger, so there is nothing to save.
                json!({
                    "ok": false,
                    "error": format!(
                        "insufficient stock for: {}",
                        name.as_deref().unwrap_or("???")
                    ),
                    "rollback": true,
                    "falhou": {
                        "id": ingredient,
                        "nome": name.as_deref().unwrap_or(""),
                        "necessario": needed,
                        "disponivel": available,
                    },
                    "pilha_ops": self.render_log(log),
                })
            }
            Outcome::Success { ref log, .. } => {
                self.persist(store::save_stock(&self.app.stock, &self.paths));
                self.persist(store::save_orders(&self.app.orders, &self.paths));
                json!({ "ok": true, "pilha_ops": self.render_log(log) })
            }
        }
    }

    fn render_log(&self, log: &[StockOp]) -> Value {
        let ops: Vec<Value> = log
            .iter()
            .map(|op| {
                json!({
                    "op": match op.kind {
                        OpKind::Withdraw => "PUSH",
                        OpKind::Restore => "POP_ROLLBACK",
                    },
                    "id": op.ingredient,
                    "nome": self.app.catalog.name_of(op.ingredient).unwrap_or(""),
                    "qtd": op.quantity,
                })
            })
            .collect();
        Value::Array(ops)
    }

    /// Full state dump for `GET_ALL`.
    fn snapshot(&self) -> Value {
        let catalog: Vec<Value> = self
            .app
            .catalog
            .iter()
            .map(|item| json!({ "id": item.id, "name": item.name, "unit": item.unit }))
            .collect();

        let inventory: Vec<Value> = self
            .app
            .stock
            .iter()
            .map(|entry| {
                json!({ "id_ingrediente": entry.ingredient, "quantity": entry.quantity })
            })
            .collect();

        let recipes: Vec<Value> = self
            .app
            .recipes
            .iter()
            .map(|recipe| {
                let ingredients: Vec<Value> = recipe
                    .requirements
                    .iter()
                    .map(|req| json!({ "id": req.ingredient, "qtd": req.quantity }))
                    .collect();
                json!({
                    "id": recipe.id,
                    "name": recipe.name,
                    "preparo": recipe.instructions,
                    "ingredients": ingredients,
                })
            })
            .collect();

        let orders: Vec<Value> = self
            .app
            .orders
            .iter()
            .map(|order| {
                json!({
                    "id_pedido": order.id,
                    "id_receita": order.recipe,
                    "nome_receita": self
                        .app
                        .recipes
                        .find(order.recipe)
                        .map(|r| r.name.as_str())
                        .unwrap_or("[recipe removed]"),
                })
            })
            .collect();

        json!({
            "catalog": catalog,
            "inventory": inventory,
            "recipes": recipes,
            "orders": orders,
        })
    }

    fn persist(&self, result: Result<(), StoreError>) {
        if let Err(e) = result {
            output::error(e);
        }
    }
}

/// Run a bridge session over the process's stdin and stdout.
pub fn run(app: App, paths: DataPaths, verbosity: Verbosity) -> io::Result<App> {
    let mut bridge = Bridge::new(app, paths, verbosity);
    let stdin = io::stdin();
    let stdout = io::stdout();
    bridge.serve(stdin.lock(), stdout.lock())?;
    Ok(bridge.app)
}

fn ok() -> Value {
    json!({ "ok": true })
}

fn fail(message: impl ToString) -> Value {
    json!({ "ok": false, "error": message.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_the_full_vocabulary() {
        assert_eq!(parse_line("GET_ALL"), Ok(Request::GetAll));
        assert_eq!(parse_line("QUIT"), Ok(Request::Quit));
        assert_eq!(parse_line("PROCESSAR_PEDIDO"), Ok(Request::ProcessNext));
        assert_eq!(
            parse_line("ADD_CATALOGO Farinha de Trigo|g"),
            Ok(Request::AddIngredient {
                name: "Farinha de Trigo".into(),
                unit: "g".into(),
            })
        );
        assert_eq!(
            parse_line("ADD_ESTOQUE 2 350.5"),
            Ok(Request::Deposit {
                ingredient: IngredientId::new(2),
                quantity: 350.5,
            })
        );
        assert_eq!(
            parse_line("ADD_ING_RECEITA 1 2 30"),
            Ok(Request::AddRequirement {
                recipe: RecipeId::new(1),
                ingredient: IngredientId::new(2),
                quantity: 30.0,
            })
        );
        assert_eq!(
            parse_line("DEL_PEDIDO 7"),
            Ok(Request::CancelOrder(OrderId::new(7)))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(
            parse_line("TURN_LEFT"),
            Err(ParseError::UnknownCommand("TURN_LEFT".into()))
        );
        assert_eq!(
            parse_line("ADD_CATALOGO just-a-name"),
            Err(ParseError::BadArguments("name|unit"))
        );
        assert_eq!(
            parse_line("DEL_CATALOGO abc"),
            Err(ParseError::BadArguments("id"))
        );
        assert_eq!(
            parse_line("ADD_ESTOQUE 1"),
            Err(ParseError::BadArguments("id quantity"))
        );
    }

    fn bridge() -> (Bridge, TempDir) {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        (Bridge::new(App::new(), paths, Verbosity::Quiet), dir)
    }

    #[test]
    fn add_ingredient_responds_with_the_new_id() {
        let (mut bridge, _dir) = bridge();
        let response = bridge.handle(Request::AddIngredient {
            name: "Flour".into(),
            unit: "g".into(),
        });
        assert_eq!(response, json!({ "ok": true, "id": 1 }));
    }

    #[test]
    fn referential_failures_carry_the_app_error_message() {
        let (mut bridge, _dir) = bridge();
        let response = bridge.handle(Request::RemoveIngredient(IngredientId::new(3)));
        assert_eq!(response["ok"], json!(false));
        assert_eq!(
            response["error"],
            json!("ingredient 3 is not in the catalog")
        );
    }

    #[test]
    fn failed_processing_reports_rollback_on_the_wire() {
        let (mut bridge, _dir) = bridge();
        bridge.handle(Request::AddIngredient { name: "Flour".into(), unit: "g".into() });
        bridge.handle(Request::AddIngredient { name: "Sugar".into(), unit: "g".into() });
        bridge.handle(Request::AddRecipe { name: "Cake".into(), instructions: "Bake.".into() });
        // Sugar first, flour front-inserted so it is withdrawn first.
        bridge.handle(Request::AddRequirement {
            recipe: RecipeId::new(1),
            ingredient: IngredientId::new(2),
            quantity: 100.0,
        });
        bridge.handle(Request::AddRequirement {
            recipe: RecipeId::new(1),
            ingredient: IngredientId::new(1),
            quantity: 200.0,
        });
        bridge.handle(Request::Deposit {
            ingredient: IngredientId::new(1),
            quantity: 500.0,
        });
        bridge.handle(Request::PlaceOrder(RecipeId::new(1)));

        let response = bridge.handle(Request::ProcessNext);

        assert_eq!(response["ok"], json!(false));
        assert_eq!(response["rollback"], json!(true));
        assert_eq!(response["falhou"]["id"], json!(2));
        assert_eq!(response["falhou"]["nome"], json!("Sugar"));
        assert_eq!(response["falhou"]["necessario"], json!(100.0));
        assert_eq!(response["falhou"]["disponivel"], json!(0.0));

        let ops = response["pilha_ops"].as_array().unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0]["op"], json!("PUSH"));
        assert_eq!(ops[1]["op"], json!("POP_ROLLBACK"));
        assert_eq!(ops[1]["id"], json!(1));

        // Ledger restored, order still queued.
        assert_eq!(
            bridge.app().stock.quantity(IngredientId::new(1)),
            Some(500.0)
        );
        assert_eq!(bridge.app().orders.len(), 1);
    }

    #[test]
    fn snapshot_includes_all_four_registries() {
        let (mut bridge, _dir) = bridge();
        bridge.handle(Request::AddIngredient { name: "Flour".into(), unit: "g".into() });
        bridge.handle(Request::Deposit {
            ingredient: IngredientId::new(1),
            quantity: 250.0,
        });
        bridge.handle(Request::AddRecipe { name: "Bread".into(), instructions: "Knead.".into() });
        bridge.handle(Request::AddRequirement {
            recipe: RecipeId::new(1),
            ingredient: IngredientId::new(1),
            quantity: 50.0,
        });
        bridge.handle(Request::PlaceOrder(RecipeId::new(1)));

        let snapshot = bridge.handle(Request::GetAll);
        assert_eq!(snapshot["catalog"][0]["name"], json!("Flour"));
        assert_eq!(snapshot["inventory"][0]["id_ingrediente"], json!(1));
        assert_eq!(snapshot["recipes"][0]["ingredients"][0]["qtd"], json!(50.0));
        assert_eq!(snapshot["orders"][0]["nome_receita"], json!("Bread"));
    }

    #[test]
    fn serve_answers_line_for_line_and_stops_at_quit() {
        let (mut bridge, _dir) = bridge();
        let script = "ADD_CATALOGO Flour|g\n\nGET_ALL\nQUIT\nADD_CATALOGO Sugar|g\n";
        let mut out = Vec::new();

        bridge.serve(script.as_bytes(), &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        // Blank line skipped, nothing after QUIT.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], json!({ "ok": true, "id": 1 }));
        assert_eq!(lines[1]["catalog"][0]["unit"], json!("g"));
    }

    #[test]
    fn mutating_commands_save_their_registry() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let mut bridge = Bridge::new(App::new(), paths.clone(), Verbosity::Quiet);

        bridge.handle(Request::AddIngredient { name: "Salt".into(), unit: "g".into() });

        let saved = std::fs::read_to_string(paths.ingredients()).unwrap();
        assert_eq!(saved, "1;Salt;g\n");
    }
}
