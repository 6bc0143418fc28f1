use std::{future::Future, str::FromStr, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info, warn};

use super::{AnquetteRepository, Schema, StoreError, StoreResult, UserRepository};
use crate::anquettes::dto::{Anquette, AnquetteRequest};
use crate::config::DatabaseConfig;
use crate::users::dto::{User, UserRequest};

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        tg_id       INTEGER NOT NULL UNIQUE,
        tg_username TEXT,
        anquette_id INTEGER
    )
"#;

const CREATE_ANQUETTES: &str = r#"
    CREATE TABLE IF NOT EXISTS anquettes (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        age         INTEGER NOT NULL,
        city        TEXT,
        gender      TEXT,
        preferences TEXT,
        description TEXT NOT NULL
    )
"#;

/// SQLite-backed store. Every call is one autocommit statement run under
/// `query_timeout`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }

    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&cfg.url)
            .with_context(|| format!("parse DATABASE_URL `{}`", cfg.url))?
            .create_if_missing(true);
        let mut pool = SqlitePoolOptions::new().max_connections(cfg.max_connections);
        if is_memory_url(&cfg.url) {
            // Every connection to `:memory:` is its own empty database, so
            // keep exactly one alive for the life of the pool.
            if cfg.max_connections > 1 {
                warn!(
                    requested = cfg.max_connections,
                    "in-memory database; pool limited to one connection"
                );
            }
            pool = pool
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool
            .connect_with(options)
            .await
            .context("connect to database")?;
        Ok(Self::new(pool, cfg.query_timeout()))
    }

    async fn deadline<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(res) => res.map_err(classify),
            Err(_) => Err(StoreError::Timeout(self.query_timeout)),
        }
    }
}

fn classify(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::ConstraintViolation(db.message().to_string())
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Database(other),
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn expect_affected(rows: u64) -> StoreResult<()> {
    if rows == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl Schema for SqliteStore {
    async fn create_schema(&self) -> StoreResult<()> {
        self.deadline(sqlx::query(CREATE_USERS).execute(&self.pool))
            .await?;
        self.deadline(sqlx::query(CREATE_ANQUETTES).execute(&self.pool))
            .await?;
        info!("database tables initialized");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn insert_user(&self, u: &UserRequest) -> StoreResult<i64> {
        let id = self
            .deadline(
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO users (tg_id, tg_username, anquette_id)
                    VALUES (?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(u.tg_id)
                .bind(&u.tg_username)
                .bind(u.anquette_id)
                .fetch_one(&self.pool),
            )
            .await?;
        debug!(id, tg_id = u.tg_id, "user row inserted");
        Ok(id)
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        self.deadline(
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, tg_id, tg_username, anquette_id
                FROM users
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update_user(&self, id: i64, u: &UserRequest) -> StoreResult<()> {
        let res = self
            .deadline(
                sqlx::query(
                    r#"
                    UPDATE users
                       SET tg_id = ?, tg_username = ?, anquette_id = ?
                     WHERE id = ?
                    "#,
                )
                .bind(u.tg_id)
                .bind(&u.tg_username)
                .bind(u.anquette_id)
                .bind(id)
                .execute(&self.pool),
            )
            .await?;
        expect_affected(res.rows_affected())
    }
}

#[async_trait]
impl AnquetteRepository for SqliteStore {
    async fn insert_anquette(&self, a: &AnquetteRequest) -> StoreResult<i64> {
        let id = self
            .deadline(
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO anquettes (name, age, city, gender, preferences, description)
                    VALUES (?, ?, ?, ?, ?, ?)
                    RETURNING id
                    "#,
                )
                .bind(&a.name)
                .bind(a.age)
                .bind(&a.city)
                .bind(&a.gender)
                .bind(&a.preferences)
                .bind(&a.description)
                .fetch_one(&self.pool),
            )
            .await?;
        debug!(id, "anquette row inserted");
        Ok(id)
    }

    async fn get_anquette(&self, id: i64) -> StoreResult<Anquette> {
        self.deadline(
            sqlx::query_as::<_, Anquette>(
                r#"
                SELECT id, name, age, city, gender, preferences, description
                FROM anquettes
                WHERE id = ?
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update_anquette(&self, id: i64, a: &AnquetteRequest) -> StoreResult<()> {
        let res = self
            .deadline(
                sqlx::query(
                    r#"
                    UPDATE anquettes
                       SET name = ?, age = ?, city = ?, gender = ?, preferences = ?, description = ?
                     WHERE id = ?
                    "#,
                )
                .bind(&a.name)
                .bind(a.age)
                .bind(&a.city)
                .bind(&a.gender)
                .bind(&a.preferences)
                .bind(&a.description)
                .bind(id)
                .execute(&self.pool),
            )
            .await?;
        expect_affected(res.rows_affected())
    }

    async fn delete_anquette(&self, id: i64) -> StoreResult<()> {
        let res = self
            .deadline(
                sqlx::query("DELETE FROM anquettes WHERE id = ?")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        expect_affected(res.rows_affected())
    }
}
