mod dish;
mod order;

pub use dish::{Dish, DishField, NewDish};
pub use order::{NewOrder, Order, OrderField, OrderRow};
