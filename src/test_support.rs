// src/test_support.rs

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Pool SQLite em memória com o schema aplicado. Uma conexão só: cada
/// conexão `:memory:` nova seria um banco vazio diferente.
pub async fn pool_de_prueba() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("opções de conexão de teste")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("pool em memória");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("migrações no banco de teste");

    pool
}
