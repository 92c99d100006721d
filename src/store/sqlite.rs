use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use super::{Collection, ScheduleStore, StoreResult};

/// SQLite-backed document store: one row per `(collection, key)`.
pub struct SqliteScheduleStore {
    connection: Mutex<Connection>,
}

impl SqliteScheduleStore {
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> StoreResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> StoreResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (collection, key)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn get_document(&self, collection: Collection, key: &str) -> StoreResult<Option<String>> {
        let conn = self.connection.lock();
        let body = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
                params![collection.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    fn put_document(&self, collection: Collection, key: &str, json: String) -> StoreResult<()> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT OR REPLACE INTO documents (collection, key, body) VALUES (?1, ?2, ?3)",
            params![collection.as_str(), key, json],
        )?;
        Ok(())
    }

    fn remove_document(&self, collection: Collection, key: &str) -> StoreResult<bool> {
        let conn = self.connection.lock();
        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection.as_str(), key],
        )?;
        Ok(removed > 0)
    }

    fn document_keys(&self, collection: Collection) -> StoreResult<Vec<String>> {
        let conn = self.connection.lock();
        let mut stmt =
            conn.prepare("SELECT key FROM documents WHERE collection = ?1 ORDER BY key ASC")?;
        let rows = stmt.query_map(params![collection.as_str()], |row| row.get::<_, String>(0))?;

        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }
}
