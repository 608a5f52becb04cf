use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A row of the `Menu` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    /// Not checked for existence when the dish is created.
    pub image_path: Option<String>,
}

/// For creating new dishes (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDish {
    pub name: String,
    pub price: Decimal,
    pub image_path: Option<String>,
}

/// A single-column change to an existing dish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DishField {
    DishId(i64),
    Name(String),
    Price(Decimal),
    ImagePath(Option<String>),
}

impl DishField {
    /// Name of the `Menu` column this change writes.
    pub fn column(&self) -> &'static str {
        match self {
            Self::DishId(_) => "dish_id",
            Self::Name(_) => "dish_name",
            Self::Price(_) => "price",
            Self::ImagePath(_) => "image_path",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn dish_field_names_match_menu_columns() {
        assert_eq!(DishField::DishId(4).column(), "dish_id");
        assert_eq!(DishField::Name("Soup".into()).column(), "dish_name");
        assert_eq!(DishField::Price(dec!(5.50)).column(), "price");
        assert_eq!(DishField::ImagePath(None).column(), "image_path");
    }
}
