use std::fmt;

use menu_core::validation::{self, ValidationError};

/// Raw text of the add-order form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub table_number: String,
    pub quantity: String,
    /// Free text, completed against the menu's dish names.
    pub dish_name: String,
    pub special_requests: String,
}

/// The order form after its required fields have been checked. Numbers are
/// still text: they are parsed only once the dish has been resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderInput {
    pub table_number: String,
    pub quantity: String,
    pub dish_name: String,
    pub special_requests: Option<String>,
}

impl OrderForm {
    /// Checks that table number, quantity and dish name are filled in.
    pub fn required_fields(&self) -> Result<OrderInput, ValidationError> {
        let table_number = validation::require("table number", &self.table_number)?;
        let quantity = validation::require("quantity", &self.quantity)?;
        let dish_name = validation::require("dish name", &self.dish_name)?;
        let special_requests = self.special_requests.trim();

        Ok(OrderInput {
            table_number: table_number.to_string(),
            quantity: quantity.to_string(),
            dish_name: dish_name.to_string(),
            special_requests: (!special_requests.is_empty()).then(|| special_requests.to_string()),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for OrderForm {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Table:            {}", self.table_number)?;
        writeln!(f, "Quantity:         {}", self.quantity)?;
        writeln!(f, "Dish:             {}", self.dish_name)?;
        write!(f, "Special requests: {}", self.special_requests)
    }
}
