//! Database operations for the review store
//!
//! Handles SQLite initialization, persistence of review items and the
//! simulated current date used as the review clock.

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::models::ReviewItem;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;

const SELECT_ITEMS: &str = "SELECT id, last_reviewed, next_review, ease_factor, interval_days, consecutive_correct
     FROM review_items";

/// Opens (or creates) the SQLite database at `path` with the required tables
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    tracing::debug!(path = %path.display(), "Opened review database");
    Ok(conn)
}

/// In-memory database with the same schema
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Creates tables for review items and app state.
/// Sets the current date to now if not already initialized.
fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_items (
            id TEXT PRIMARY KEY,
            last_reviewed INTEGER NOT NULL,
            next_review INTEGER NOT NULL,
            ease_factor REAL NOT NULL DEFAULT 2.5,
            interval_days INTEGER NOT NULL DEFAULT 0,
            consecutive_correct INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    // Simulated clock so spaced repetition can be exercised without waiting
    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![Utc::now().timestamp().to_string()],
    )?;

    Ok(())
}

fn from_timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(Error::InvalidTimestamp(secs))
}

/// Retrieves the simulated current date
pub fn get_current_date(conn: &Connection) -> Result<DateTime<Utc>> {
    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;

    let secs = value.parse::<i64>().map_err(|_| {
        Error::CorruptState(format!("current_date '{value}' is not a unix timestamp"))
    })?;
    from_timestamp(secs)
}

/// Overrides the simulated current date
pub fn set_current_date(date: DateTime<Utc>, conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![date.timestamp().to_string()],
    )?;
    Ok(())
}

/// Advances the simulated date by 24 hours and returns the new date
pub fn advance_day(conn: &Connection) -> Result<DateTime<Utc>> {
    let next_day = get_current_date(conn)? + Duration::days(1);
    set_current_date(next_day, conn)?;
    tracing::info!(date = %next_day, "Advanced current date");
    Ok(next_day)
}

/// Row as stored: timestamps are unix seconds
struct StoredItem {
    id: String,
    last_reviewed: i64,
    next_review: i64,
    ease_factor: f64,
    interval: u32,
    consecutive_correct: u32,
}

impl StoredItem {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            last_reviewed: row.get(1)?,
            next_review: row.get(2)?,
            ease_factor: row.get(3)?,
            interval: row.get(4)?,
            consecutive_correct: row.get(5)?,
        })
    }

    fn into_item(self) -> Result<ReviewItem> {
        Ok(ReviewItem {
            id: self.id,
            last_reviewed: from_timestamp(self.last_reviewed)?,
            next_review: from_timestamp(self.next_review)?,
            ease_factor: self.ease_factor,
            interval: self.interval,
            consecutive_correct: self.consecutive_correct,
        })
    }
}

fn query_items(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<ReviewItem>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, StoredItem::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(StoredItem::into_item).collect()
}

/// Adds a fresh review item due at the simulated current date
///
/// If an item with the same id exists it's left untouched and returned as stored.
pub fn add_item(id: &str, config: &SchedulerConfig, conn: &Connection) -> Result<ReviewItem> {
    let item = ReviewItem::new(id, get_current_date(conn)?, config);

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO review_items
            (id, last_reviewed, next_review, ease_factor, interval_days, consecutive_correct)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.id,
            item.last_reviewed.timestamp(),
            item.next_review.timestamp(),
            item.ease_factor,
            item.interval,
            item.consecutive_correct
        ],
    )?;

    if inserted == 0 {
        tracing::debug!(id, "Review item already exists");
        return get_item(id, conn)?.ok_or_else(|| Error::NotFound(id.to_string()));
    }

    tracing::info!(id, "Added review item");
    Ok(item)
}

pub fn get_item(id: &str, conn: &Connection) -> Result<Option<ReviewItem>> {
    let stored = conn
        .query_row(
            &format!("{SELECT_ITEMS} WHERE id = ?1"),
            params![id],
            StoredItem::from_row,
        )
        .optional()?;

    stored.map(StoredItem::into_item).transpose()
}

/// Writes back an item's review state after scheduling
pub fn update_item(item: &ReviewItem, conn: &Connection) -> Result<()> {
    let updated = conn.execute(
        "UPDATE review_items
         SET last_reviewed = ?1, next_review = ?2, ease_factor = ?3,
             interval_days = ?4, consecutive_correct = ?5
         WHERE id = ?6",
        params![
            item.last_reviewed.timestamp(),
            item.next_review.timestamp(),
            item.ease_factor,
            item.interval,
            item.consecutive_correct,
            item.id
        ],
    )?;

    if updated == 0 {
        return Err(Error::NotFound(item.id.clone()));
    }

    tracing::info!(
        id = %item.id,
        interval = item.interval,
        ease_factor = item.ease_factor,
        "Updated review item"
    );
    Ok(())
}

/// Inserts or replaces an item as-is, keeping its review history
pub fn upsert_item(item: &ReviewItem, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO review_items
            (id, last_reviewed, next_review, ease_factor, interval_days, consecutive_correct)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.id,
            item.last_reviewed.timestamp(),
            item.next_review.timestamp(),
            item.ease_factor,
            item.interval,
            item.consecutive_correct
        ],
    )?;
    Ok(())
}

/// Returns true if the item existed
pub fn remove_item(id: &str, conn: &Connection) -> Result<bool> {
    let removed = conn.execute("DELETE FROM review_items WHERE id = ?1", params![id])?;
    if removed > 0 {
        tracing::info!(id, "Removed review item");
    }
    Ok(removed > 0)
}

pub fn load_all_items(conn: &Connection) -> Result<Vec<ReviewItem>> {
    let items = query_items(conn, &format!("{SELECT_ITEMS} ORDER BY id"), [])?;
    tracing::debug!(count = items.len(), "Loaded review items");
    Ok(items)
}

/// Retrieves items due at the simulated current date
///
/// Returns items where next_review <= current_date, oldest first.
pub fn get_due_items(conn: &Connection) -> Result<Vec<ReviewItem>> {
    let now = get_current_date(conn)?.timestamp();
    query_items(
        conn,
        &format!("{SELECT_ITEMS} WHERE next_review <= ?1 ORDER BY next_review ASC"),
        params![now],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quality, schedule_next_review};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn setup() -> Connection {
        let conn = open_in_memory().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 9, 1, 6, 0, 0).unwrap();
        set_current_date(start, &conn).unwrap();
        conn
    }

    #[test]
    fn test_add_and_get_item() {
        let conn = setup();
        let config = SchedulerConfig::default();

        let added = add_item("merci", &config, &conn).unwrap();
        let loaded = get_item("merci", &conn).unwrap().unwrap();

        assert_eq!(added, loaded);
        assert_eq!(loaded.interval, 0);
        assert_eq!(loaded.next_review, get_current_date(&conn).unwrap());
        assert!(get_item("absent", &conn).unwrap().is_none());
    }

    #[test]
    fn test_add_duplicate_keeps_existing() {
        let conn = setup();
        let config = SchedulerConfig::default();

        let item = add_item("danke", &config, &conn).unwrap();
        let reviewed = schedule_next_review(
            &item,
            true,
            Quality::PERFECT,
            get_current_date(&conn).unwrap(),
            &config,
        );
        update_item(&reviewed, &conn).unwrap();

        let again = add_item("danke", &config, &conn).unwrap();
        assert_eq!(again, reviewed);
        assert_eq!(load_all_items(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_update_unknown_item_fails() {
        let conn = setup();
        let item = ReviewItem::new("ghost", Utc::now(), &SchedulerConfig::default());

        assert!(matches!(update_item(&item, &conn), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_due_items_follow_simulated_clock() {
        let conn = setup();
        let config = SchedulerConfig::default();
        let now = get_current_date(&conn).unwrap();

        let a = add_item("a", &config, &conn).unwrap();
        add_item("b", &config, &conn).unwrap();
        update_item(&schedule_next_review(&a, true, Quality::PERFECT, now, &config), &conn).unwrap();

        let due: Vec<String> = get_due_items(&conn).unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(due, vec!["b"]);

        advance_day(&conn).unwrap();
        assert_eq!(get_due_items(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_advance_day_adds_exactly_one_day() {
        let conn = setup();
        let before = get_current_date(&conn).unwrap();
        let after = advance_day(&conn).unwrap();

        assert_eq!((after - before).num_seconds(), 86_400);
        assert_eq!(get_current_date(&conn).unwrap(), after);
    }

    #[test]
    fn test_corrupt_current_date_is_error() {
        let conn = setup();
        conn.execute(
            "UPDATE app_state SET value = 'yesterday' WHERE key = 'current_date'",
            (),
        )
        .unwrap();

        assert!(matches!(get_current_date(&conn), Err(Error::CorruptState(_))));
        assert!(matches!(get_due_items(&conn), Err(Error::CorruptState(_))));
    }

    #[test]
    fn test_remove_and_upsert() {
        let conn = setup();
        let config = SchedulerConfig::default();
        let item = add_item("ciao", &config, &conn).unwrap();

        assert!(remove_item("ciao", &conn).unwrap());
        assert!(!remove_item("ciao", &conn).unwrap());

        upsert_item(&item, &conn).unwrap();
        assert_eq!(get_item("ciao", &conn).unwrap(), Some(item));
    }

    #[test]
    fn test_file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reviews.sqlite3");
        let config = SchedulerConfig::default();

        {
            let conn = init_database(&path).unwrap();
            add_item("obrigado", &config, &conn).unwrap();
        }

        let conn = init_database(&path).unwrap();
        let items = load_all_items(&conn).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "obrigado");
    }
}
