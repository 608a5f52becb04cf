pub mod app;
pub mod cli;
pub mod config;
pub mod export;
pub mod grid;
pub mod logging;
pub mod models;
pub mod opener;
pub mod shell;

pub use app::{HandlerError, RestaurantApp};
pub use grid::{Grid, GridKind, Selection};
