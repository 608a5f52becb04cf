//! Grid cell edits and the column layout of both grids.
//!
//! A [`CellEdit`] is what the presentation layer hands over when the user
//! changes a cell. [`CellEdit::to_update`] validates the new text for the
//! column it landed in and turns it into the single-column store write.

use crate::models::{DishField, OrderField};
use crate::validation::{self, ValidationError};

/// Columns of the orders grid, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderColumn {
    Id,
    TableNumber,
    DishId,
    Quantity,
    SpecialRequests,
    DishImage,
}

impl OrderColumn {
    pub const ALL: [OrderColumn; 6] = [
        Self::Id,
        Self::TableNumber,
        Self::DishId,
        Self::Quantity,
        Self::SpecialRequests,
        Self::DishImage,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "Order ID",
            Self::TableNumber => "Table Number",
            Self::DishId => "Dish ID",
            Self::Quantity => "Quantity",
            Self::SpecialRequests => "Special Requests",
            Self::DishImage => "Dish Image",
        }
    }

    /// Whether the grid opens an editor for this column. The id is the row's
    /// identity and the image comes from the joined dish.
    pub fn is_editable(self) -> bool {
        !matches!(self, Self::Id | Self::DishImage)
    }
}

/// Columns of the menu grid, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuColumn {
    Id,
    Name,
    Price,
    ImagePath,
}

impl MenuColumn {
    pub const ALL: [MenuColumn; 4] = [Self::Id, Self::Name, Self::Price, Self::ImagePath];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Id => "Dish ID",
            Self::Name => "Dish Name",
            Self::Price => "Price",
            Self::ImagePath => "Image Path",
        }
    }

    pub fn is_editable(self) -> bool {
        self != Self::Id
    }
}

/// A user change to one grid cell, tagged with the grid it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEdit {
    Order {
        order_id: i64,
        column: OrderColumn,
        value: String,
    },
    Menu {
        dish_id: i64,
        column: MenuColumn,
        value: String,
    },
}

/// The store write a valid [`CellEdit`] resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Order { order_id: i64, field: OrderField },
    Dish { dish_id: i64, field: DishField },
}

impl CellEdit {
    /// Position of the edited column in its grid.
    pub fn column_index(&self) -> usize {
        match self {
            Self::Order { column, .. } => column.index(),
            Self::Menu { column, .. } => column.index(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Order { value, .. } | Self::Menu { value, .. } => value,
        }
    }

    /// Validates the new text for its column.
    ///
    /// Returns `Ok(None)` for columns that are never written back (the joined
    /// dish image of the orders grid). Whether an image path points at an
    /// existing file is a filesystem question left to the caller.
    pub fn to_update(&self) -> Result<Option<FieldUpdate>, ValidationError> {
        match self {
            Self::Order {
                order_id,
                column,
                value,
            } => {
                let field = match column {
                    OrderColumn::Id => {
                        OrderField::OrderId(validation::parse_non_negative_int("order id", value)?)
                    }
                    OrderColumn::TableNumber => OrderField::TableNumber(
                        validation::parse_non_negative_int("table number", value)?,
                    ),
                    OrderColumn::DishId => {
                        OrderField::DishId(validation::parse_non_negative_int("dish id", value)?)
                    }
                    OrderColumn::Quantity => {
                        OrderField::Quantity(validation::parse_non_negative_int("quantity", value)?)
                    }
                    OrderColumn::SpecialRequests => OrderField::SpecialRequests(value.clone()),
                    OrderColumn::DishImage => return Ok(None),
                };
                Ok(Some(FieldUpdate::Order {
                    order_id: *order_id,
                    field,
                }))
            }
            Self::Menu {
                dish_id,
                column,
                value,
            } => {
                let field = match column {
                    MenuColumn::Id => {
                        DishField::DishId(validation::parse_non_negative_int("dish id", value)?)
                    }
                    MenuColumn::Name => {
                        DishField::Name(validation::require("dish name", value)?.to_string())
                    }
                    MenuColumn::Price => {
                        DishField::Price(validation::parse_non_negative_decimal("price", value)?)
                    }
                    MenuColumn::ImagePath => DishField::ImagePath(Some(value.trim().to_string())),
                };
                Ok(Some(FieldUpdate::Dish {
                    dish_id: *dish_id,
                    field,
                }))
            }
        }
    }
}
