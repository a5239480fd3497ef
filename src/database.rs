// src/database.rs
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Creates the products table when it is missing. Schema migration
/// tooling is out of scope; the table shape is stable.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS products (
             product_id  TEXT PRIMARY KEY,
             name        TEXT NOT NULL,
             description TEXT NOT NULL DEFAULT '',
             price       NUMERIC NOT NULL,
             stock       BIGINT NOT NULL,
             category    TEXT NOT NULL DEFAULT '',
             sku         TEXT NOT NULL DEFAULT '',
             active      BOOLEAN NOT NULL DEFAULT TRUE,
             created_at  TIMESTAMPTZ NOT NULL,
             updated_at  TIMESTAMPTZ
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
