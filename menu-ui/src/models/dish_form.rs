use std::fmt;

use menu_core::NewDish;
use menu_core::validation::{self, ValidationError};

/// Raw text of the add-dish form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DishForm {
    pub name: String,
    pub price: String,
    pub image_path: String,
}

impl DishForm {
    /// Validates that every field is filled in and the price is a
    /// non-negative number.
    ///
    /// Required-field checks run before the price is parsed, so an empty
    /// form reports the first missing field rather than a bad price.
    pub fn validate_for_submit(&self) -> Result<NewDish, ValidationError> {
        let name = validation::require("dish name", &self.name)?;
        let price = validation::require("price", &self.price)?;
        let image_path = validation::require("image path", &self.image_path)?;

        Ok(NewDish {
            name: name.to_string(),
            price: validation::parse_non_negative_decimal("price", price)?,
            image_path: Some(image_path.to_string()),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for DishForm {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Dish name:  {}", self.name)?;
        writeln!(f, "Price:      {}", self.price)?;
        write!(f, "Image path: {}", self.image_path)
    }
}
