//! CRUD walkthrough against an in-memory database
//!
//! Run with: cargo run --example crud -p liteorm

use liteorm::prelude::*;
use liteorm::{Database, DatabaseConfig, Table, qb};
use std::time::Duration;

const USERS: Table = Table::new("users").with_primary_key("id");

#[derive(Debug)]
#[allow(dead_code)]
struct User {
    id: i64,
    email: String,
    status: String,
}

impl FromRow for User {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            email: row.get("email")?,
            status: row.get("status")?,
        })
    }
}

fn main() -> OrmResult<()> {
    let conn = rusqlite::Connection::open_in_memory()?;
    let db = Database::with_config(
        &conn,
        DatabaseConfig::new()
            .statement_cache(32)
            .slow_threshold(Duration::from_millis(50)),
    );

    db.exec(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'active',
            age INTEGER
        )",
    )?;

    // ============================================
    // Insert
    // ============================================
    for (email, age) in [("alice@x", 31), ("bob@x", 17), ("carol@x", 45)] {
        let row = USERS.insert([("email", Value::from(email)), ("age", Value::from(age))]).run(&db)?;
        println!("inserted: {row:?}");
    }

    let again = USERS
        .insert([("email", "alice@x")])
        .if_not_exists([("email", "alice@x")])
        .run(&db)?;
    println!("duplicate insert skipped: {}", again.is_none());

    // ============================================
    // Select
    // ============================================
    let adults: Vec<User> = USERS
        .select()
        .where_cmp("age", ">=", 18)
        .order_by_asc("email")
        .fetch_all(&db)?;
    println!("adults: {adults:#?}");

    let in_band = USERS
        .select()
        .and_where(Conditions::new().with("age", OpBag::new().between(20, 40)))
        .count(&db)?;
    println!("aged 20-40: {in_band}");

    // ============================================
    // Update / Delete
    // ============================================
    let archived = qb::update("users", [("status", "archived")])
        .where_cmp("age", "<", 18)
        .or_where_cmp("email", "LIKE", "carol%")
        .run(&db)?;
    println!("archived: {archived}");

    let mut alice = USERS
        .select()
        .and_where([("email", "alice@x")])
        .first_or_fail(&db)?;
    alice.update(&db, [("age", 32)])?;
    println!("alice is now {}", alice.get::<i64>("age")?);

    db.transaction(|db| {
        qb::delete("users").and_where([("status", "archived")]).run(db)?;
        Ok(())
    })?;
    println!("remaining: {}", qb::select("users").count(&db)?);

    let stats = db.cache_stats();
    println!(
        "statement cache: {} hits, {} misses, {}/{} entries",
        stats.hits, stats.misses, stats.len, stats.capacity
    );

    Ok(())
}
