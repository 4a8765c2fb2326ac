use std::{fs, path::Path};

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    auth::{hash_password, new_id},
    config::Config,
    models::{BookingRow, AUTH_TYPE_CREDENTIALS, ROLE_ADMIN},
};

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn ensure_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let path = if let Some(path) = db_url.strip_prefix("sqlite://") {
        Some(path)
    } else if let Some(path) = db_url.strip_prefix("sqlite:") {
        Some(path)
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(());
    };

    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    let path = path.strip_prefix("file:").unwrap_or(path);
    let db_path = Path::new(path);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Single booking with its owner's name/email joined in.
pub async fn fetch_booking(
    pool: &SqlitePool,
    booking_id: &str,
) -> Result<Option<BookingRow>, sqlx::Error> {
    sqlx::query_as::<_, BookingRow>(
        r#"SELECT b.*, u.full_name AS user_name, u.email AS user_email
           FROM bookings b
           LEFT JOIN users u ON b.user_id = u.id
           WHERE b.id = ?
           LIMIT 1"#,
    )
    .bind(booking_id)
    .fetch_optional(pool)
    .await
}

/// Provisions the back-office admin account on first start.
pub async fn seed_admin(pool: &SqlitePool, config: &Config) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, (String,)>("SELECT id FROM users WHERE role = ? LIMIT 1")
        .bind(ROLE_ADMIN)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    if config.admin_password == "admin" {
        log::warn!(
            "ADMIN_PASSWORD not set. Using default password 'admin'. Set ADMIN_PASSWORD in production."
        );
    }

    let password_hash = hash_password(&config.admin_password)
        .map_err(|_| sqlx::Error::Protocol("password hash failed".into()))?;
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"INSERT INTO users (id, full_name, email, password_hash, auth_type, role, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(new_id())
    .bind(&config.admin_name)
    .bind(&config.admin_email)
    .bind(password_hash)
    .bind(AUTH_TYPE_CREDENTIALS)
    .bind(ROLE_ADMIN)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    log::info!("Seeded admin account {}", config.admin_email);
    Ok(())
}
