mod dish_form;
mod order_form;

pub use dish_form::DishForm;
pub use order_form::{OrderForm, OrderInput};
