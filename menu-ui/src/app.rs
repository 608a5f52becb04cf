//! The restaurant presenter.
//!
//! [`RestaurantApp`] owns the store handle, the two grids, the add-dish and
//! add-order forms and the dish-name completion list. Every user action is a
//! method taking `&mut self`, so exactly one action runs at a time.

use std::io;
use std::path::{Path, PathBuf};

use menu_core::db::RepositoryRegistry;
use menu_core::validation::{self, ValidationError};
use menu_core::{
    CellEdit, Dish, DishField, FieldUpdate, MenuColumn, MenuRepository, NewOrder, Order,
    OrderField, RepositoryError,
};
use menu_db_sqlite::SqliteRepositoryFactory;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::export::{self, ExportError, ExportTarget};
use crate::grid::{self, Grid, GridError, GridKind, Selection};
use crate::models::{DishForm, OrderForm};
use crate::opener;

/// Why a user action did not complete. None of these are fatal: the store
/// handle stays usable and the next action runs normally.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no dish named '{0}' on the menu")]
    DishNotFound(String),

    #[error("image file '{0}' does not exist")]
    ImageNotFound(String),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("cannot open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The new value was stored.
    Written,
    /// Nothing to store: signals were blocked or the column is derived.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A destination was missing, so neither file was written.
    Skipped,
    Written { menu: PathBuf, orders: PathBuf },
}

fn order_cell_text(field: &OrderField) -> String {
    match field {
        OrderField::OrderId(n)
        | OrderField::TableNumber(n)
        | OrderField::DishId(n)
        | OrderField::Quantity(n) => n.to_string(),
        OrderField::SpecialRequests(text) => text.clone(),
    }
}

fn dish_cell_text(field: &DishField) -> String {
    match field {
        DishField::DishId(id) => id.to_string(),
        DishField::Name(name) => name.clone(),
        DishField::Price(price) => grid::price_text(*price),
        DishField::ImagePath(path) => path.clone().unwrap_or_default(),
    }
}

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub struct RestaurantApp {
    repo: Box<dyn MenuRepository>,
    menu_grid: Grid,
    order_grid: Grid,
    dish_names: Vec<String>,
    pub dish_form: DishForm,
    pub order_form: OrderForm,
}

impl RestaurantApp {
    /// Builds the presenter around an open store and fills both grids.
    pub async fn load(repo: Box<dyn MenuRepository>) -> Result<Self, HandlerError> {
        let mut app = Self {
            repo,
            menu_grid: Grid::new(GridKind::Menu),
            order_grid: Grid::new(GridKind::Orders),
            dish_names: Vec::new(),
            dish_form: DishForm::default(),
            order_form: OrderForm::default(),
        };
        app.refresh_completions().await?;
        app.refresh_menu_grid().await?;
        app.refresh_order_grid().await?;
        Ok(app)
    }

    pub fn repository(&self) -> &dyn MenuRepository {
        self.repo.as_ref()
    }

    pub fn menu_grid(&self) -> &Grid {
        &self.menu_grid
    }

    pub fn order_grid(&self) -> &Grid {
        &self.order_grid
    }

    pub fn grid(&self, kind: GridKind) -> &Grid {
        match kind {
            GridKind::Menu => &self.menu_grid,
            GridKind::Orders => &self.order_grid,
        }
    }

    fn grid_mut(&mut self, kind: GridKind) -> &mut Grid {
        match kind {
            GridKind::Menu => &mut self.menu_grid,
            GridKind::Orders => &mut self.order_grid,
        }
    }

    pub async fn refresh_menu_grid(&mut self) -> Result<(), HandlerError> {
        let dishes = self.repo.list_dishes().await?;
        debug!(rows = dishes.len(), "refreshed menu grid");
        self.menu_grid = Grid::menu(&dishes);
        Ok(())
    }

    pub async fn refresh_order_grid(&mut self) -> Result<(), HandlerError> {
        let orders = self.repo.list_orders().await?;
        debug!(rows = orders.len(), "refreshed orders grid");
        self.order_grid = Grid::orders(&orders);
        Ok(())
    }

    pub async fn refresh_completions(&mut self) -> Result<(), HandlerError> {
        self.dish_names = self.repo.list_dish_names().await?;
        Ok(())
    }

    /// Dish names starting with `prefix`, ignoring case.
    pub fn completions(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_lowercase();
        self.dish_names
            .iter()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .map(String::as_str)
            .collect()
    }

    /// Stores the add-dish form as a new menu entry.
    ///
    /// On success the form is cleared and the completion list and both grids
    /// are reloaded. On a validation error nothing is written and the form
    /// keeps its text.
    pub async fn add_dish(&mut self) -> Result<Dish, HandlerError> {
        let new_dish = self.dish_form.validate_for_submit()?;
        let dish = self.repo.insert_dish(new_dish).await?;
        info!(dish_id = dish.id, name = %dish.name, price = %dish.price, "dish added");

        self.dish_form.clear();
        self.refresh_completions().await?;
        self.refresh_menu_grid().await?;
        self.refresh_order_grid().await?;
        Ok(dish)
    }

    /// Stores the add-order form as a new order.
    ///
    /// The dish name must match a menu entry exactly. A quantity or table
    /// number that is not a non-negative integer clears that field and
    /// aborts without writing.
    pub async fn add_order(&mut self) -> Result<Order, HandlerError> {
        let input = self.order_form.required_fields()?;

        let dish = match self.repo.find_dish_by_name(&input.dish_name).await {
            Ok(dish) => dish,
            Err(RepositoryError::NotFound) => {
                warn!(dish = %input.dish_name, "order rejected: dish not on the menu");
                return Err(HandlerError::DishNotFound(input.dish_name));
            }
            Err(e) => return Err(e.into()),
        };

        let quantity = match validation::parse_non_negative_int("quantity", &input.quantity) {
            Ok(quantity) => quantity,
            Err(e) => {
                self.order_form.quantity.clear();
                return Err(e.into());
            }
        };
        let table_number =
            match validation::parse_non_negative_int("table number", &input.table_number) {
                Ok(table_number) => table_number,
                Err(e) => {
                    self.order_form.table_number.clear();
                    return Err(e.into());
                }
            };

        let order = self
            .repo
            .insert_order(NewOrder {
                table_number,
                dish_id: dish.id,
                quantity,
                special_requests: input.special_requests,
            })
            .await?;
        info!(
            order_id = order.id,
            table = order.table_number,
            dish_id = order.dish_id,
            quantity = order.quantity,
            "order added"
        );

        self.order_form.clear();
        self.refresh_order_grid().await?;
        Ok(order)
    }

    /// A user edit of one grid cell.
    pub async fn edit_cell(
        &mut self,
        kind: GridKind,
        row: usize,
        column: usize,
        text: &str,
    ) -> Result<EditOutcome, HandlerError> {
        match self.grid_mut(kind).set_text(row, column, text)? {
            Some(edit) => self.apply_cell_edit(row, edit).await,
            None => Ok(EditOutcome::Ignored),
        }
    }

    /// Validates `edit` and writes it back to the store. A written cell then
    /// shows the stored form of the value (`12.5` becomes `12.50`).
    ///
    /// A rejected order cell is cleared. A rejected menu cell is restored to
    /// the stored value, except an image path naming no file, which is
    /// cleared. Both resets go through the silent write path.
    pub async fn apply_cell_edit(
        &mut self,
        row: usize,
        edit: CellEdit,
    ) -> Result<EditOutcome, HandlerError> {
        let update = match edit.to_update() {
            Ok(Some(update)) => update,
            Ok(None) => return Ok(EditOutcome::Ignored),
            Err(e) => {
                if let Err(reset) = self.reset_rejected_cell(row, &edit).await {
                    warn!(error = %reset, "could not reset rejected cell");
                }
                return Err(e.into());
            }
        };

        let column = edit.column_index();
        match update {
            FieldUpdate::Order { order_id, field } => {
                let refresh_orders = matches!(field, OrderField::DishId(_));
                let stored = order_cell_text(&field);
                debug!(order_id, column = field.column(), "updating order");
                self.repo.update_order_field(order_id, field).await?;
                info!(order_id, "order updated");
                if refresh_orders {
                    self.refresh_order_grid().await?;
                } else {
                    self.show_stored(GridKind::Orders, row, column, &stored);
                }
            }
            FieldUpdate::Dish { dish_id, field } => {
                if let DishField::ImagePath(Some(path)) = &field
                    && !Path::new(path).is_file()
                {
                    warn!(dish_id, path = %path, "image edit rejected: no such file");
                    self.menu_grid
                        .set_text_silently(row, MenuColumn::ImagePath.index(), "")?;
                    return Err(HandlerError::ImageNotFound(path.clone()));
                }

                let refresh_completions = matches!(field, DishField::Name(_));
                let refresh_orders =
                    matches!(field, DishField::DishId(_) | DishField::ImagePath(_));
                let stored = dish_cell_text(&field);
                debug!(dish_id, column = field.column(), "updating dish");
                self.repo.update_dish_field(dish_id, field).await?;
                info!(dish_id, "dish updated");
                self.show_stored(GridKind::Menu, row, column, &stored);
                if refresh_completions {
                    self.refresh_completions().await?;
                }
                if refresh_orders {
                    self.refresh_order_grid().await?;
                }
            }
        }
        Ok(EditOutcome::Written)
    }

    /// Replaces the typed text of a written cell with the stored value.
    fn show_stored(&mut self, kind: GridKind, row: usize, column: usize, stored: &str) {
        if let Err(e) = self.grid_mut(kind).set_text_silently(row, column, stored) {
            debug!(error = %e, "written cell is not on screen");
        }
    }

    async fn reset_rejected_cell(&mut self, row: usize, edit: &CellEdit) -> Result<(), HandlerError> {
        match edit {
            CellEdit::Order { column, .. } => {
                self.order_grid.set_text_silently(row, column.index(), "")?;
            }
            CellEdit::Menu {
                dish_id, column, ..
            } => {
                let dish = self.repo.get_dish(*dish_id).await?;
                let stored = match column {
                    MenuColumn::Id => dish.id.to_string(),
                    MenuColumn::Name => dish.name,
                    MenuColumn::Price => grid::price_text(dish.price),
                    MenuColumn::ImagePath => dish.image_path.unwrap_or_default(),
                };
                self.menu_grid.set_text_silently(row, column.index(), &stored)?;
            }
        }
        Ok(())
    }

    /// Deletes every selected row of the selection's target grid and
    /// returns how many rows were removed.
    ///
    /// Rows are processed from the bottom up, one statement each. Rows
    /// outside the grid are skipped. The target grid is reloaded even when a
    /// delete fails part way.
    pub async fn delete_selected(&mut self, selection: &Selection) -> Result<usize, HandlerError> {
        let Some((kind, rows)) = selection.target() else {
            return Ok(0);
        };
        let grid = self.grid(kind);
        let ids: Vec<i64> = rows
            .iter()
            .rev()
            .filter_map(|&row| grid.row_id(row))
            .collect();

        let result = self.delete_ids(kind, &ids).await;

        match kind {
            GridKind::Orders => self.refresh_order_grid().await?,
            GridKind::Menu => {
                self.refresh_completions().await?;
                self.refresh_menu_grid().await?;
            }
        }
        result
    }

    async fn delete_ids(&self, kind: GridKind, ids: &[i64]) -> Result<usize, HandlerError> {
        for &id in ids {
            match kind {
                GridKind::Orders => self.repo.delete_order(id).await?,
                GridKind::Menu => self.repo.delete_dish(id).await?,
            }
        }
        info!(grid = kind.title(), count = ids.len(), "rows deleted");
        Ok(ids.len())
    }

    /// Writes both grids to their destinations. Nothing is written unless
    /// both destinations are given.
    pub fn export(
        &self,
        menu: Option<&ExportTarget>,
        orders: Option<&ExportTarget>,
    ) -> Result<ExportOutcome, HandlerError> {
        let (Some(menu), Some(orders)) = (menu, orders) else {
            warn!("export skipped: both a menu and an orders destination are required");
            return Ok(ExportOutcome::Skipped);
        };

        let menu = export::export_table(menu, &self.menu_grid.headers(), self.menu_grid.rows())?;
        let orders =
            export::export_table(orders, &self.order_grid.headers(), self.order_grid.rows())?;
        Ok(ExportOutcome::Written { menu, orders })
    }

    /// Opens the image in `row` of `kind` with the default application.
    /// Returns the opened path, or `None` when the cell is empty.
    pub fn open_image(&self, kind: GridKind, row: usize) -> Result<Option<PathBuf>, HandlerError> {
        let column = kind.image_column();
        let cell = self
            .grid(kind)
            .cell(row, column)
            .ok_or(GridError::NoSuchCell {
                grid: kind.title(),
                row,
                column,
            })?
            .trim();
        if cell.is_empty() {
            return Ok(None);
        }

        let path = PathBuf::from(cell);
        opener::open_path(&path).map_err(|source| HandlerError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Some(path))
    }
}
