//! SQLite connection setup and schema management
use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS session (
    id TEXT PRIMARY KEY,
    user_id TEXT,
    title TEXT NOT NULL,
    titled INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS message (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES session(id),
    content TEXT NOT NULL,
    author TEXT NOT NULL,
    metadata TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS message_session_idx ON message(session_id);

CREATE TABLE IF NOT EXISTS travel_search (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES session(id),
    search_type TEXT NOT NULL,
    query TEXT NOT NULL,
    results TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS travel_search_session_idx ON travel_search(session_id);
";

/// Create all tables. Safe to run repeatedly.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)
}

/// Upgrade a database created before sessions tracked whether a
/// title had been generated.
pub fn migrate_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    initialize_db(conn)?;
    let has_titled = conn
        .prepare("SELECT 1 FROM pragma_table_info('session') WHERE name = 'titled'")?
        .exists([])?;
    if !has_titled {
        conn.execute_batch("ALTER TABLE session ADD COLUMN titled INTEGER NOT NULL DEFAULT 0;")?;
    }
    Ok(())
}

/// Open the database at `db_path` and make sure the schema exists.
pub async fn async_db(db_path: &str) -> Result<Connection, Error> {
    let db = Connection::open(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// An in-memory database with the schema applied.
pub async fn memory_db() -> Result<Connection, Error> {
    let db = Connection::open_in_memory().await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let db = memory_db().await.unwrap();
        let tables = db
            .call(|conn| {
                initialize_db(conn)?;
                migrate_db(conn)?;
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .filter_map(Result::ok)
                    .collect::<Vec<_>>();
                Ok(names)
            })
            .await
            .unwrap();

        assert_eq!(tables, vec!["message", "session", "travel_search"]);
    }
}
