//! Editable grids mirroring the `Menu` and `Orders` tables.
//!
//! A [`Grid`] holds the rendered text of every cell. User edits go through
//! [`Grid::set_text`], which hands back the [`CellEdit`] the presenter must
//! act on. Programmatic writes (clearing a rejected cell, restoring a stored
//! value) go through [`Grid::set_text_silently`], which blocks change
//! notifications so the edit pipeline is never re-entered.

use std::collections::BTreeSet;
use std::fmt;

use clap::ValueEnum;
use menu_core::{CellEdit, Dish, MenuColumn, OrderColumn, OrderRow};
use rust_decimal::Decimal;
use thiserror::Error;

/// Prices are shown with at least two decimal places.
pub fn price_text(price: Decimal) -> String {
    let mut shown = price;
    if shown.scale() < 2 {
        shown.rescale(2);
    }
    shown.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum GridKind {
    Menu,
    Orders,
}

impl GridKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Menu => "Menu",
            Self::Orders => "Orders",
        }
    }

    /// Column holding the image path that "double-click to open" acts on.
    pub fn image_column(self) -> usize {
        match self {
            Self::Menu => MenuColumn::ImagePath.index(),
            Self::Orders => OrderColumn::DishImage.index(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("{grid} grid has no cell at row {row}, column {column}")]
    NoSuchCell {
        grid: &'static str,
        row: usize,
        column: usize,
    },

    #[error("column '{0}' is read-only")]
    ReadOnlyColumn(&'static str),

    #[error("row {0} has no valid identifier")]
    MissingRowId(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    kind: GridKind,
    rows: Vec<Vec<String>>,
    signals_blocked: bool,
}

impl Grid {
    pub fn new(kind: GridKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
            signals_blocked: false,
        }
    }

    /// Render the menu listing.
    pub fn menu(dishes: &[Dish]) -> Self {
        let mut grid = Self::new(GridKind::Menu);
        grid.rows = dishes
            .iter()
            .map(|dish| {
                vec![
                    dish.id.to_string(),
                    dish.name.clone(),
                    price_text(dish.price),
                    dish.image_path.clone().unwrap_or_default(),
                ]
            })
            .collect();
        grid
    }

    /// Render the orders listing.
    pub fn orders(orders: &[OrderRow]) -> Self {
        let mut grid = Self::new(GridKind::Orders);
        grid.rows = orders
            .iter()
            .map(|order| {
                vec![
                    order.id.to_string(),
                    order.table_number.to_string(),
                    order.dish_id.to_string(),
                    order.quantity.to_string(),
                    order.special_requests.clone().unwrap_or_default(),
                    order.image_path.clone().unwrap_or_default(),
                ]
            })
            .collect();
        grid
    }

    pub fn kind(&self) -> GridKind {
        self.kind
    }

    pub fn headers(&self) -> Vec<&'static str> {
        match self.kind {
            GridKind::Menu => MenuColumn::ALL.iter().map(|c| c.label()).collect(),
            GridKind::Orders => OrderColumn::ALL.iter().map(|c| c.label()).collect(),
        }
    }

    pub fn column_count(&self) -> usize {
        match self.kind {
            GridKind::Menu => MenuColumn::ALL.len(),
            GridKind::Orders => OrderColumn::ALL.len(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Identifier shown in the first column of `row`.
    pub fn row_id(&self, row: usize) -> Option<i64> {
        self.cell(row, 0)?.parse().ok()
    }

    /// Blocks or unblocks change notifications, returning the previous state.
    pub fn block_signals(&mut self, blocked: bool) -> bool {
        std::mem::replace(&mut self.signals_blocked, blocked)
    }

    pub fn signals_blocked(&self) -> bool {
        self.signals_blocked
    }

    /// A user edit of one cell.
    ///
    /// Stores the text and returns the edit the presenter has to dispatch,
    /// or `None` while signals are blocked. Identifier and derived columns
    /// have no editor and are refused.
    pub fn set_text(
        &mut self,
        row: usize,
        column: usize,
        text: &str,
    ) -> Result<Option<CellEdit>, GridError> {
        let edit = self.edit_for(row, column, text)?;
        self.write_cell(row, column, text)?;
        if self.signals_blocked {
            return Ok(None);
        }
        Ok(Some(edit))
    }

    /// A programmatic write that never produces a [`CellEdit`].
    pub fn set_text_silently(
        &mut self,
        row: usize,
        column: usize,
        text: &str,
    ) -> Result<(), GridError> {
        let previous = self.block_signals(true);
        let result = self.write_cell(row, column, text);
        self.block_signals(previous);
        result
    }

    fn write_cell(&mut self, row: usize, column: usize, text: &str) -> Result<(), GridError> {
        let no_such_cell = GridError::NoSuchCell {
            grid: self.kind.title(),
            row,
            column,
        };
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|cells| cells.get_mut(column))
            .ok_or(no_such_cell)?;
        *cell = text.to_string();
        Ok(())
    }

    fn edit_for(&self, row: usize, column: usize, text: &str) -> Result<CellEdit, GridError> {
        let no_such_cell = || GridError::NoSuchCell {
            grid: self.kind.title(),
            row,
            column,
        };
        if row >= self.rows.len() {
            return Err(no_such_cell());
        }
        let value = text.to_string();
        match self.kind {
            GridKind::Orders => {
                let column = OrderColumn::from_index(column).ok_or_else(no_such_cell)?;
                if !column.is_editable() {
                    return Err(GridError::ReadOnlyColumn(column.label()));
                }
                let order_id = self.row_id(row).ok_or(GridError::MissingRowId(row))?;
                Ok(CellEdit::Order {
                    order_id,
                    column,
                    value,
                })
            }
            GridKind::Menu => {
                let column = MenuColumn::from_index(column).ok_or_else(no_such_cell)?;
                if !column.is_editable() {
                    return Err(GridError::ReadOnlyColumn(column.label()));
                }
                let dish_id = self.row_id(row).ok_or(GridError::MissingRowId(row))?;
                Ok(CellEdit::Menu {
                    dish_id,
                    column,
                    value,
                })
            }
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let headers = self.headers();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for cells in &self.rows {
            for (width, cell) in widths.iter_mut().zip(cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        writeln!(f, "{} ({} rows)", self.kind.title(), self.rows.len())?;
        write!(f, "{:>4} ", "#")?;
        for (header, width) in headers.iter().zip(widths.iter().copied()) {
            write!(f, "| {header:<width$} ")?;
        }
        writeln!(f)?;
        for (index, cells) in self.rows.iter().enumerate() {
            write!(f, "{index:>4} ")?;
            for (cell, width) in cells.iter().zip(widths.iter().copied()) {
                write!(f, "| {cell:<width$} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Selected row indices of both grids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub orders: BTreeSet<usize>,
    pub menu: BTreeSet<usize>,
}

impl Selection {
    /// The grid a delete acts on. The orders grid wins when both grids have
    /// a selection.
    pub fn target(&self) -> Option<(GridKind, &BTreeSet<usize>)> {
        if !self.orders.is_empty() {
            Some((GridKind::Orders, &self.orders))
        } else if !self.menu.is_empty() {
            Some((GridKind::Menu, &self.menu))
        } else {
            None
        }
    }
}
