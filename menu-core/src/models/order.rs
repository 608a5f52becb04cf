use serde::{Deserialize, Serialize};

/// A row of the `Orders` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub table_number: i64,
    pub dish_id: i64,
    pub quantity: i64,
    pub special_requests: Option<String>,
}

/// For creating new orders (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub table_number: i64,
    pub dish_id: i64,
    pub quantity: i64,
    pub special_requests: Option<String>,
}

/// An order as listed in the orders grid: the order itself joined with the
/// image path of the dish it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: i64,
    pub table_number: i64,
    pub dish_id: i64,
    pub quantity: i64,
    pub special_requests: Option<String>,
    pub image_path: Option<String>,
}

/// A single-column change to an existing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderField {
    OrderId(i64),
    TableNumber(i64),
    DishId(i64),
    Quantity(i64),
    SpecialRequests(String),
}

impl OrderField {
    /// Name of the `Orders` column this change writes.
    pub fn column(&self) -> &'static str {
        match self {
            Self::OrderId(_) => "order_id",
            Self::TableNumber(_) => "table_number",
            Self::DishId(_) => "dish_id",
            Self::Quantity(_) => "quantity",
            Self::SpecialRequests(_) => "special_requests",
        }
    }
}
