//! Command-line surface of the `RestaurantManager` binary.
//!
//! Each [`Action`] is one user gesture of the manager window: submitting a
//! form, editing a cell, deleting a selection, exporting, or
//! double-clicking an image. The same actions are accepted line by line by
//! the interactive [`shell`](crate::shell).

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::app::{EditOutcome, ExportOutcome, HandlerError, RestaurantApp};
use crate::config::Overrides;
use crate::export::{ExportFormat, ExportTarget};
use crate::grid::{GridKind, Selection};
use crate::models::{DishForm, OrderForm};

/// Restaurant menu and order manager.
///
/// Runs a single action against the restaurant database, or an interactive
/// session when no subcommand is given.
#[derive(Debug, Parser)]
#[command(name = "RestaurantManager", version)]
pub struct Cli {
    /// Database backend to use.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `restaurant.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// TOML config file [default: restaurant.toml when present]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `menu_ui=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend.clone(),
            database: self.db.clone(),
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Action(Action),

    /// Read actions from stdin, one per line.
    Shell,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Action {
    /// Add a dish to the menu.
    AddDish {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        price: String,
        #[arg(long, default_value = "")]
        image: String,
    },

    /// Place an order for a dish on the menu.
    AddOrder {
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        table: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        quantity: String,
        /// Exact dish name as listed on the menu.
        #[arg(long, default_value = "")]
        dish: String,
        #[arg(long, default_value = "")]
        requests: String,
    },

    /// Print one or both grids.
    List {
        #[arg(value_enum, default_value_t = ListTarget::All)]
        grid: ListTarget,
    },

    /// Change the text of one grid cell.
    Edit {
        #[arg(value_enum)]
        grid: GridKind,
        row: usize,
        column: usize,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Delete selected rows. Orders win when both grids are selected.
    Delete {
        /// Comma-separated row numbers of the orders grid.
        #[arg(long, value_delimiter = ',')]
        orders: Vec<usize>,
        /// Comma-separated row numbers of the menu grid.
        #[arg(long, value_delimiter = ',')]
        menu: Vec<usize>,
    },

    /// Save both grids to files. Both destinations are required.
    Export {
        #[arg(long)]
        menu_file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        menu_format: ExportFormat,
        #[arg(long)]
        orders_file: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        orders_format: ExportFormat,
    },

    /// List dish names starting with a prefix, ignoring case.
    Complete {
        #[arg(default_value = "")]
        prefix: String,
    },

    /// Open the image of a grid row with the default application.
    OpenImage {
        #[arg(value_enum)]
        grid: GridKind,
        row: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListTarget {
    All,
    Menu,
    Orders,
}

/// Runs one action and prints its result to stdout.
pub async fn run_action(app: &mut RestaurantApp, action: Action) -> Result<(), HandlerError> {
    match action {
        Action::AddDish { name, price, image } => {
            app.dish_form = DishForm {
                name,
                price,
                image_path: image,
            };
            let dish = app.add_dish().await?;
            println!("Added dish {} '{}' at {}", dish.id, dish.name, dish.price);
        }
        Action::AddOrder {
            table,
            quantity,
            dish,
            requests,
        } => {
            app.order_form = OrderForm {
                table_number: table,
                quantity,
                dish_name: dish,
                special_requests: requests,
            };
            let order = app.add_order().await?;
            println!(
                "Added order {} for table {}: {} x dish {}",
                order.id, order.table_number, order.quantity, order.dish_id
            );
        }
        Action::List { grid } => {
            if grid != ListTarget::Orders {
                print!("{}", app.menu_grid());
            }
            if grid != ListTarget::Menu {
                print!("{}", app.order_grid());
            }
        }
        Action::Edit {
            grid,
            row,
            column,
            value,
        } => match app.edit_cell(grid, row, column, &value).await? {
            EditOutcome::Written => println!("Updated {} row {row}", grid.title()),
            EditOutcome::Ignored => println!("Nothing to store for {} row {row}", grid.title()),
        },
        Action::Delete { orders, menu } => {
            let selection = Selection {
                orders: orders.into_iter().collect::<BTreeSet<_>>(),
                menu: menu.into_iter().collect::<BTreeSet<_>>(),
            };
            match selection.target() {
                Some((kind, _)) => {
                    let deleted = app.delete_selected(&selection).await?;
                    println!("Deleted {deleted} {} row(s)", kind.title());
                }
                None => println!("No rows selected"),
            }
        }
        Action::Export {
            menu_file,
            menu_format,
            orders_file,
            orders_format,
        } => {
            let menu = menu_file.map(|path| ExportTarget {
                path,
                format: menu_format,
            });
            let orders = orders_file.map(|path| ExportTarget {
                path,
                format: orders_format,
            });
            match app.export(menu.as_ref(), orders.as_ref())? {
                ExportOutcome::Written { menu, orders } => println!(
                    "Exported menu to {} and orders to {}",
                    menu.display(),
                    orders.display()
                ),
                ExportOutcome::Skipped => {
                    println!("Export skipped: give both --menu-file and --orders-file")
                }
            }
        }
        Action::Complete { prefix } => {
            for name in app.completions(&prefix) {
                println!("{name}");
            }
        }
        Action::OpenImage { grid, row } => match app.open_image(grid, row)? {
            Some(path) => println!("Opened {}", path.display()),
            None => println!("No image for {} row {row}", grid.title()),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    fn action(args: &[&str]) -> Action {
        let cli = Cli::try_parse_from(std::iter::once("RestaurantManager").chain(args.iter().copied()))
            .expect("arguments should parse");
        match cli.command {
            Some(Command::Action(action)) => action,
            other => panic!("expected an action, got {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["RestaurantManager", "--db", ":memory:"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.overrides().database.as_deref(), Some(":memory:"));
    }

    #[test]
    fn negative_numbers_reach_validation() {
        assert_eq!(
            action(&["add-dish", "--name", "Soup", "--price", "-3", "--image", "soup.png"]),
            Action::AddDish {
                name: "Soup".to_string(),
                price: "-3".to_string(),
                image: "soup.png".to_string(),
            }
        );
        assert_eq!(
            action(&["edit", "orders", "0", "3", "-1"]),
            Action::Edit {
                grid: GridKind::Orders,
                row: 0,
                column: 3,
                value: "-1".to_string(),
            }
        );
    }

    #[test]
    fn delete_accepts_comma_separated_rows() {
        assert_eq!(
            action(&["delete", "--orders", "2,0,1"]),
            Action::Delete {
                orders: vec![2, 0, 1],
                menu: vec![],
            }
        );
    }

    #[test]
    fn export_formats_default_to_csv() {
        assert_eq!(
            action(&["export", "--menu-file", "menu", "--orders-file", "orders", "--orders-format", "text"]),
            Action::Export {
                menu_file: Some(PathBuf::from("menu")),
                menu_format: ExportFormat::Csv,
                orders_file: Some(PathBuf::from("orders")),
                orders_format: ExportFormat::Text,
            }
        );
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["RestaurantManager", "list", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
