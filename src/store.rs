use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::Path;

pub const DB_FILE: &str = "classdesk.sqlite3";

// Collection keys. One JSON array per key, except CURRENT_USER which
// holds a single object.
pub const STUDENTS: &str = "students";
pub const SEAT_PLANS: &str = "seatPlans";
pub const CANDIDATES: &str = "candidates";
pub const VOTES: &str = "votes";
pub const RESULTS: &str = "results";
pub const BOOK_LENDINGS: &str = "bookLendings";
pub const EXAM_REMINDERS: &str = "examReminders";
pub const DICTIONARY: &str = "dictionary";
pub const BUDGET_ENTRIES: &str = "budgetEntries";
pub const CAREER_GOALS: &str = "careerGoals";
pub const CONTACTS: &str = "contacts";
pub const CURRENT_USER: &str = "currentUser";

pub fn open_store(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS collections(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    Ok(conn)
}

fn read_raw(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM collections WHERE key = ?", [key], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(v)
}

fn write_raw(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO collections(key, value, updated_at)
         VALUES(?, ?, ?)
         ON CONFLICT(key) DO UPDATE SET
           value = excluded.value,
           updated_at = excluded.updated_at",
        (key, value, Utc::now().to_rfc3339()),
    )?;
    Ok(())
}

fn delete_raw(conn: &Connection, key: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM collections WHERE key = ?", [key])?;
    Ok(())
}

/// A named, typed list persisted as one JSON array. Mutations always
/// replace the whole value; callers load, derive a new list, and write
/// it back.
pub struct Collection<T> {
    key: &'static str,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Loads the committed list. A missing key or a value that fails
    /// to parse both yield the empty list; stale or hand-edited data
    /// is never an error.
    pub fn load(&self, conn: &Connection) -> anyhow::Result<Vec<T>> {
        let Some(raw) = read_raw(conn, self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                log::warn!("discarding unparseable value for {}: {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    pub fn replace(&self, conn: &Connection, items: &[T]) -> anyhow::Result<()> {
        let raw = serde_json::to_string(items)?;
        write_raw(conn, self.key, &raw)
    }
}

/// Single-object variant used for the session key.
pub fn load_object<T: DeserializeOwned>(conn: &Connection, key: &str) -> anyhow::Result<Option<T>> {
    let Some(raw) = read_raw(conn, key)? else {
        return Ok(None);
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            log::warn!("discarding unparseable value for {}: {}", key, e);
            Ok(None)
        }
    }
}

pub fn replace_object<T: Serialize>(conn: &Connection, key: &str, value: &T) -> anyhow::Result<()> {
    write_raw(conn, key, &serde_json::to_string(value)?)
}

pub fn clear_object(conn: &Connection, key: &str) -> anyhow::Result<()> {
    delete_raw(conn, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_workspace() -> std::path::PathBuf {
        let p = std::env::temp_dir().join(format!(
            "classdesk-store-{}",
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::create_dir_all(&p).expect("create temp workspace");
        p
    }

    #[test]
    fn missing_key_loads_default() {
        let ws = temp_workspace();
        let conn = open_store(&ws).expect("open store");
        let col: Collection<String> = Collection::new("nothingHere");
        assert!(col.load(&conn).expect("load").is_empty());
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn replace_then_load_roundtrips() {
        let ws = temp_workspace();
        let conn = open_store(&ws).expect("open store");
        let col: Collection<String> = Collection::new("words");
        col.replace(&conn, &["alpha".to_string(), "beta".to_string()])
            .expect("replace");
        assert_eq!(col.load(&conn).expect("load"), vec!["alpha", "beta"]);
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn unparseable_value_is_swallowed() {
        let ws = temp_workspace();
        let conn = open_store(&ws).expect("open store");
        write_raw(&conn, "words", "not json at all").expect("write raw");
        let col: Collection<String> = Collection::new("words");
        assert!(col.load(&conn).expect("load").is_empty());
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn object_key_lifecycle() {
        let ws = temp_workspace();
        let conn = open_store(&ws).expect("open store");
        assert!(load_object::<String>(&conn, CURRENT_USER)
            .expect("load")
            .is_none());
        replace_object(&conn, CURRENT_USER, &"anisa".to_string()).expect("replace");
        assert_eq!(
            load_object::<String>(&conn, CURRENT_USER).expect("load"),
            Some("anisa".to_string())
        );
        clear_object(&conn, CURRENT_USER).expect("clear");
        assert!(load_object::<String>(&conn, CURRENT_USER)
            .expect("load")
            .is_none());
        let _ = std::fs::remove_dir_all(ws);
    }
}
