use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use menu_core::{
    Dish, DishField, MenuRepository, NewDish, NewOrder, Order, OrderField, OrderRow,
    RepositoryError,
};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Row, Type};
use tracing::debug;

use crate::decimal::{get_decimal, storable_f64};

/// SQLite-backed store holding a single connection for the life of the
/// process.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Open `database_url` (e.g. `sqlite:restaurant.db` or `sqlite::memory:`),
    /// creating the file if it is missing.
    ///
    /// Foreign keys are left unenforced: deleting a dish keeps the orders
    /// that point at it.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(false);

        // One connection that never expires, so an in-memory database lives
        // as long as the repository does.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    /// Create the `Menu` and `Orders` tables if they do not exist yet.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
}

fn row_to_dish(row: &SqliteRow) -> Result<Dish, RepositoryError> {
    Ok(Dish {
        id: get(row, "dish_id")?,
        name: get(row, "dish_name")?,
        price: get_decimal(row, "price")?,
        image_path: get(row, "image_path")?,
    })
}

fn row_to_order(row: &SqliteRow) -> Result<Order, RepositoryError> {
    Ok(Order {
        id: get(row, "order_id")?,
        table_number: get(row, "table_number")?,
        dish_id: get(row, "dish_id")?,
        quantity: get(row, "quantity")?,
        special_requests: get(row, "special_requests")?,
    })
}

fn row_to_order_row(row: &SqliteRow) -> Result<OrderRow, RepositoryError> {
    Ok(OrderRow {
        id: get(row, "order_id")?,
        table_number: get(row, "table_number")?,
        dish_id: get(row, "dish_id")?,
        quantity: get(row, "quantity")?,
        special_requests: get(row, "special_requests")?,
        image_path: get(row, "image_path")?,
    })
}

#[async_trait]
impl MenuRepository for SqliteRepository {
    async fn insert_dish(&self, dish: NewDish) -> Result<Dish, RepositoryError> {
        let result = sqlx::query("INSERT INTO Menu (dish_name, price, image_path) VALUES (?, ?, ?)")
            .bind(&dish.name)
            .bind(storable_f64(dish.price)?)
            .bind(&dish.image_path)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let id = result.last_insert_rowid();
        debug!(id, name = %dish.name, "inserted dish");
        self.get_dish(id).await
    }

    async fn get_dish(&self, id: i64) -> Result<Dish, RepositoryError> {
        let row = sqlx::query(
            "SELECT dish_id, dish_name, price, image_path FROM Menu WHERE dish_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_dish(&row)
    }

    async fn find_dish_by_name(&self, name: &str) -> Result<Dish, RepositoryError> {
        let row = sqlx::query(
            "SELECT dish_id, dish_name, price, image_path FROM Menu
             WHERE dish_name = ? ORDER BY dish_id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_dish(&row)
    }

    async fn update_dish_field(&self, id: i64, field: DishField) -> Result<(), RepositoryError> {
        let column = field.column();
        let query = match field {
            DishField::DishId(new_id) => {
                sqlx::query("UPDATE Menu SET dish_id = ? WHERE dish_id = ?").bind(new_id)
            }
            DishField::Name(name) => {
                sqlx::query("UPDATE Menu SET dish_name = ? WHERE dish_id = ?").bind(name)
            }
            DishField::Price(price) => {
                sqlx::query("UPDATE Menu SET price = ? WHERE dish_id = ?").bind(storable_f64(price)?)
            }
            DishField::ImagePath(path) => {
                sqlx::query("UPDATE Menu SET image_path = ? WHERE dish_id = ?").bind(path)
            }
        };

        let result = query.bind(id).execute(&self.pool).await.map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id, column, "updated dish");
        Ok(())
    }

    async fn delete_dish(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM Menu WHERE dish_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>, RepositoryError> {
        let rows = sqlx::query("SELECT dish_id, dish_name, price, image_path FROM Menu ORDER BY dish_id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(row_to_dish).collect()
    }

    async fn list_dish_names(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT dish_name FROM Menu ORDER BY dish_id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO Orders (table_number, dish_id, quantity, special_requests)
             VALUES (?, ?, ?, ?)",
        )
        .bind(order.table_number)
        .bind(order.dish_id)
        .bind(order.quantity)
        .bind(&order.special_requests)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        debug!(id, dish_id = order.dish_id, "inserted order");
        self.get_order(id).await
    }

    async fn get_order(&self, id: i64) -> Result<Order, RepositoryError> {
        let row = sqlx::query(
            "SELECT order_id, table_number, dish_id, quantity, special_requests
             FROM Orders WHERE order_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_order(&row)
    }

    async fn update_order_field(
        &self,
        id: i64,
        field: OrderField,
    ) -> Result<(), RepositoryError> {
        let column = field.column();
        let query = match field {
            OrderField::OrderId(new_id) => {
                sqlx::query("UPDATE Orders SET order_id = ? WHERE order_id = ?").bind(new_id)
            }
            OrderField::TableNumber(table) => {
                sqlx::query("UPDATE Orders SET table_number = ? WHERE order_id = ?").bind(table)
            }
            OrderField::DishId(dish_id) => {
                sqlx::query("UPDATE Orders SET dish_id = ? WHERE order_id = ?").bind(dish_id)
            }
            OrderField::Quantity(quantity) => {
                sqlx::query("UPDATE Orders SET quantity = ? WHERE order_id = ?").bind(quantity)
            }
            OrderField::SpecialRequests(text) => {
                sqlx::query("UPDATE Orders SET special_requests = ? WHERE order_id = ?").bind(text)
            }
        };

        let result = query.bind(id).execute(&self.pool).await.map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        debug!(id, column, "updated order");
        Ok(())
    }

    async fn delete_order(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM Orders WHERE order_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<OrderRow>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT o.order_id, o.table_number, o.dish_id, o.quantity, o.special_requests,
                    m.image_path
             FROM Orders o JOIN Menu m ON o.dish_id = m.dish_id
             ORDER BY o.order_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_order_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::new("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations().await.expect("Failed to run migrations");
        repo
    }

    fn soup() -> NewDish {
        NewDish {
            name: "Soup".to_string(),
            price: dec!(5.50),
            image_path: Some("/img/soup.png".to_string()),
        }
    }

    fn order_for(dish_id: i64, quantity: i64) -> NewOrder {
        NewOrder {
            table_number: 4,
            dish_id,
            quantity,
            special_requests: Some("no salt".to_string()),
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let repo = setup_test_db().await;
        repo.run_migrations()
            .await
            .expect("Second migration run should succeed");

        sqlx::raw_sql(include_str!("../migrations/20250101000000_create_menu_and_orders.sql"))
            .execute(repo.pool())
            .await
            .expect("Schema script should be re-runnable");
    }

    #[tokio::test]
    async fn test_insert_and_get_dish() {
        let repo = setup_test_db().await;

        let created = repo.insert_dish(soup()).await.expect("Should insert dish");

        assert!(created.id > 0);
        assert_eq!(created.name, "Soup");
        assert_eq!(created.price, dec!(5.50));
        assert_eq!(created.image_path.as_deref(), Some("/img/soup.png"));

        let fetched = repo.get_dish(created.id).await.expect("Should fetch dish");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_insert_dish_assigns_fresh_ids() {
        let repo = setup_test_db().await;

        let first = repo.insert_dish(soup()).await.expect("Should insert dish");
        let second = repo.insert_dish(soup()).await.expect("Should insert dish");

        assert_ne!(first.id, second.id);
        assert_eq!(repo.list_dishes().await.expect("Should list").len(), 2);
    }

    #[tokio::test]
    async fn test_get_dish_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_dish(999).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_find_dish_by_name_is_exact() {
        let repo = setup_test_db().await;
        let created = repo.insert_dish(soup()).await.expect("Should insert dish");

        let found = repo.find_dish_by_name("Soup").await.expect("Should find Soup");
        assert_eq!(found.id, created.id);

        assert_eq!(repo.find_dish_by_name("soup").await, Err(RepositoryError::NotFound));
        assert_eq!(repo.find_dish_by_name("Sou").await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_dish_fields() {
        let repo = setup_test_db().await;
        let created = repo.insert_dish(soup()).await.expect("Should insert dish");

        repo.update_dish_field(created.id, DishField::Name("Broth".to_string()))
            .await
            .expect("Should rename");
        repo.update_dish_field(created.id, DishField::Price(dec!(12.50)))
            .await
            .expect("Should reprice");
        repo.update_dish_field(created.id, DishField::ImagePath(None))
            .await
            .expect("Should clear image");

        let fetched = repo.get_dish(created.id).await.expect("Should fetch dish");
        assert_eq!(
            fetched,
            Dish {
                id: created.id,
                name: "Broth".to_string(),
                price: dec!(12.50),
                image_path: None,
            }
        );
    }

    #[tokio::test]
    async fn test_renumber_dish() {
        let repo = setup_test_db().await;
        let created = repo.insert_dish(soup()).await.expect("Should insert dish");

        repo.update_dish_field(created.id, DishField::DishId(40))
            .await
            .expect("Should renumber");

        assert_eq!(repo.get_dish(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.get_dish(40).await.expect("Should fetch renumbered").name, "Soup");
    }

    #[tokio::test]
    async fn test_unreadable_price_is_never_written() {
        let repo = setup_test_db().await;
        let created = repo.insert_dish(soup()).await.expect("Should insert dish");

        let huge = NewDish {
            price: Decimal::MAX,
            ..soup()
        };
        assert!(matches!(repo.insert_dish(huge).await, Err(RepositoryError::Database(_))));
        assert!(matches!(
            repo.update_dish_field(created.id, DishField::Price(Decimal::MAX)).await,
            Err(RepositoryError::Database(_))
        ));

        let dishes = repo.list_dishes().await.expect("Menu should stay readable");
        assert_eq!(dishes, vec![created]);
    }

    #[tokio::test]
    async fn test_update_dish_not_found() {
        let repo = setup_test_db().await;

        let result = repo.update_dish_field(42, DishField::Price(dec!(1))).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_dish_names_in_insert_order() {
        let repo = setup_test_db().await;
        repo.insert_dish(soup()).await.expect("Should insert dish");
        repo.insert_dish(NewDish {
            name: "Salad".to_string(),
            price: dec!(4.00),
            image_path: None,
        })
        .await
        .expect("Should insert dish");

        let names = repo.list_dish_names().await.expect("Should list names");

        assert_eq!(names, vec!["Soup".to_string(), "Salad".to_string()]);
    }

    #[tokio::test]
    async fn test_insert_and_get_order() {
        let repo = setup_test_db().await;
        let dish = repo.insert_dish(soup()).await.expect("Should insert dish");

        let created = repo
            .insert_order(order_for(dish.id, 2))
            .await
            .expect("Should insert order");

        assert!(created.id > 0);
        assert_eq!(created.table_number, 4);
        assert_eq!(created.dish_id, dish.id);
        assert_eq!(created.quantity, 2);
        assert_eq!(created.special_requests.as_deref(), Some("no salt"));
    }

    #[tokio::test]
    async fn test_update_order_fields() {
        let repo = setup_test_db().await;
        let dish = repo.insert_dish(soup()).await.expect("Should insert dish");
        let created = repo
            .insert_order(order_for(dish.id, 2))
            .await
            .expect("Should insert order");

        repo.update_order_field(created.id, OrderField::Quantity(5))
            .await
            .expect("Should update quantity");
        repo.update_order_field(created.id, OrderField::TableNumber(9))
            .await
            .expect("Should update table");
        repo.update_order_field(created.id, OrderField::SpecialRequests("extra hot".to_string()))
            .await
            .expect("Should update notes");

        let fetched = repo.get_order(created.id).await.expect("Should fetch order");
        assert_eq!(fetched.quantity, 5);
        assert_eq!(fetched.table_number, 9);
        assert_eq!(fetched.special_requests.as_deref(), Some("extra hot"));
    }

    #[tokio::test]
    async fn test_update_order_id_moves_the_row() {
        let repo = setup_test_db().await;
        let dish = repo.insert_dish(soup()).await.expect("Should insert dish");
        let created = repo
            .insert_order(order_for(dish.id, 1))
            .await
            .expect("Should insert order");

        repo.update_order_field(created.id, OrderField::OrderId(100))
            .await
            .expect("Should renumber");

        assert_eq!(repo.get_order(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.get_order(100).await.expect("Should fetch").quantity, 1);
    }

    #[tokio::test]
    async fn test_delete_order() {
        let repo = setup_test_db().await;
        let dish = repo.insert_dish(soup()).await.expect("Should insert dish");
        let created = repo
            .insert_order(order_for(dish.id, 1))
            .await
            .expect("Should insert order");

        repo.delete_order(created.id).await.expect("Should delete order");

        assert_eq!(repo.get_order(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_order(created.id).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_orders_joins_dish_image() {
        let repo = setup_test_db().await;
        let dish = repo.insert_dish(soup()).await.expect("Should insert dish");
        repo.insert_order(order_for(dish.id, 3))
            .await
            .expect("Should insert order");

        let rows = repo.list_orders().await.expect("Should list orders");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dish_id, dish.id);
        assert_eq!(rows[0].quantity, 3);
        assert_eq!(rows[0].image_path.as_deref(), Some("/img/soup.png"));
    }

    #[tokio::test]
    async fn test_deleting_dish_leaves_orphaned_orders() {
        let repo = setup_test_db().await;
        let dish = repo.insert_dish(soup()).await.expect("Should insert dish");
        let order = repo
            .insert_order(order_for(dish.id, 1))
            .await
            .expect("Should insert order");

        repo.delete_dish(dish.id).await.expect("Should delete dish");

        // Still stored, but no longer part of the joined listing.
        assert_eq!(repo.get_order(order.id).await.expect("Should fetch").dish_id, dish.id);
        assert!(repo.list_orders().await.expect("Should list").is_empty());
    }
}
