use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Dish, DishField, NewDish, NewOrder, Order, OrderField, OrderRow};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Persistence for the `Menu` and `Orders` tables.
///
/// Every write is a single statement that commits on its own; there are no
/// transactions spanning calls.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    // Dishes
    async fn insert_dish(&self, dish: NewDish) -> Result<Dish, RepositoryError>;
    async fn get_dish(&self, id: i64) -> Result<Dish, RepositoryError>;
    /// Exact, case-sensitive match on `dish_name`.
    async fn find_dish_by_name(&self, name: &str) -> Result<Dish, RepositoryError>;
    async fn update_dish_field(&self, id: i64, field: DishField) -> Result<(), RepositoryError>;
    async fn delete_dish(&self, id: i64) -> Result<(), RepositoryError>;
    async fn list_dishes(&self) -> Result<Vec<Dish>, RepositoryError>;
    async fn list_dish_names(&self) -> Result<Vec<String>, RepositoryError>;

    // Orders
    async fn insert_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;
    async fn get_order(&self, id: i64) -> Result<Order, RepositoryError>;
    async fn update_order_field(&self, id: i64, field: OrderField)
    -> Result<(), RepositoryError>;
    async fn delete_order(&self, id: i64) -> Result<(), RepositoryError>;
    /// Orders joined with the image path of their dish. Orders whose dish no
    /// longer exists are not listed.
    async fn list_orders(&self) -> Result<Vec<OrderRow>, RepositoryError>;
}
