//! SQLite-backed contact and shortcut tables

use crate::{Contact, ContactMatch, LaunchTarget, MatchKind, Result, StoreError};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id INTEGER PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        mobile_no VARCHAR(255) NOT NULL,
        email VARCHAR(255) NULL
    );
    CREATE TABLE IF NOT EXISTS sys_command (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        path VARCHAR(1000) NOT NULL
    );
    CREATE TABLE IF NOT EXISTS web_command (
        id INTEGER PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        url VARCHAR(1000) NOT NULL
    );
"#;

/// SQLite's own `LOWER()` only folds ASCII.
const UNICODE_LOWER: &str = "unicode_lower";

/// Default database location: `<data dir>/jarvis/jarvis.db`.
pub fn default_db_path() -> Result<PathBuf> {
    let dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
    Ok(dir.join("jarvis").join("jarvis.db"))
}

/// Handle on the assistant database. Opened once per session and passed to
/// whoever needs it; nothing holds it globally.
pub struct ContactStore {
    conn: Connection,
}

impl ContactStore {
    /// Open (creating if needed) the database file and its tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        info!("opened contact store at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.create_scalar_function(
            UNICODE_LOWER,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Close the underlying connection, reporting any error.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    pub fn insert_contact(&self, name: &str, phone: &str, email: Option<&str>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO contacts (name, mobile_no, email) VALUES (?1, ?2, ?3)",
            params![name, phone, email],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All contacts whose name contains `fragment` (case-insensitive), name
    /// prefix matches first, then store order within each class.
    pub fn find_matches(&self, fragment: &str) -> Result<Vec<ContactMatch>> {
        let needle = escape_like(&fragment.trim().to_lowercase());
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, mobile_no, email,
                   CASE WHEN unicode_lower(name) LIKE ?1 || '%' ESCAPE '\' THEN 0 ELSE 1 END AS rank
            FROM contacts
            WHERE unicode_lower(name) LIKE '%' || ?1 || '%' ESCAPE '\'
            ORDER BY rank ASC, id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![needle], |row| {
            let rank: i64 = row.get(4)?;
            Ok(ContactMatch {
                contact: Contact {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    phone: row.get(2)?,
                    email: row.get(3)?,
                },
                kind: if rank == 0 {
                    MatchKind::Prefix
                } else {
                    MatchKind::Substring
                },
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        debug!(fragment, hits = out.len(), "contact search");
        Ok(out)
    }

    pub fn count(&self) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// First `limit` contacts in store order.
    pub fn sample(&self, limit: usize) -> Result<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, mobile_no, email FROM contacts ORDER BY id LIMIT ?1")?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(Contact {
                id: row.get(0)?,
                name: row.get(1)?,
                phone: row.get(2)?,
                email: row.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn add_app_shortcut(&self, name: &str, path: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sys_command (name, path) VALUES (?1, ?2)",
            params![name.trim().to_lowercase(), path],
        )?;
        Ok(())
    }

    pub fn add_web_shortcut(&self, name: &str, url: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO web_command (name, url) VALUES (?1, ?2)",
            params![name.trim().to_lowercase(), url],
        )?;
        Ok(())
    }

    /// Look a name up as an application shortcut first, then as a web shortcut.
    pub fn find_shortcut(&self, name: &str) -> Result<Option<LaunchTarget>> {
        let name = name.trim().to_lowercase();
        let app: Option<String> = self
            .conn
            .query_row(
                "SELECT path FROM sys_command WHERE unicode_lower(name) = ?1 ORDER BY id LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(path) = app {
            return Ok(Some(LaunchTarget::App(path)));
        }

        let web: Option<String> = self
            .conn
            .query_row(
                "SELECT url FROM web_command WHERE unicode_lower(name) = ?1 ORDER BY id LIMIT 1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(web.map(LaunchTarget::Web))
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
