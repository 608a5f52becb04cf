pub mod db;
pub mod edit;
pub mod models;
pub mod validation;

pub use db::repository::{MenuRepository, RepositoryError};
pub use edit::{CellEdit, FieldUpdate, MenuColumn, OrderColumn};
pub use models::*;
pub use validation::ValidationError;
