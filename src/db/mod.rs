//! Database module for SQLite persistence using SeaORM

pub mod entities;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;

/// Initialize database connection and create tables
pub async fn init_database(db_path: &Path) -> Result<DatabaseConnection, DbErr> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    tracing::info!("Connecting to database: {}", db_url);

    let db = Database::connect(&db_url).await?;

    // The restrict constraint on orders.product_id is the authoritative
    // referential-integrity guard; it only works with this pragma on.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await?;

    create_tables(&db).await?;

    Ok(db)
}

/// Create all tables if they don't exist
async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Catalog records. Prices are integer minor currency units; features is a
    // JSON array string; timestamps are unix seconds.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            price INTEGER NOT NULL,
            original_price INTEGER,
            category TEXT NOT NULL,
            image_url TEXT,
            features TEXT NOT NULL DEFAULT '[]',
            rating REAL NOT NULL DEFAULT 5.0,
            reviews_count INTEGER NOT NULL DEFAULT 0,
            is_featured INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)"#.to_string(),
    ))
    .await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_products_active ON products(is_active)"#.to_string(),
    ))
    .await?;

    // Orders table
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_name TEXT NOT NULL,
            customer_phone TEXT NOT NULL,
            customer_email TEXT,
            customer_address TEXT,
            order_type TEXT NOT NULL,
            product_id INTEGER,
            custom_description TEXT,
            quantity INTEGER NOT NULL DEFAULT 1,
            total_price INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'pending',
            notes TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE RESTRICT
        )
        "#
        .to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_orders_product ON orders(product_id)"#.to_string(),
    ))
    .await?;
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status)"#.to_string(),
    ))
    .await?;

    tracing::info!("Database tables initialized");
    Ok(())
}

/// Current time as unix seconds, the timestamp convention used in all rows.
pub(crate) fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
