//! SQLite-backed contact repository with named tables.
//!
//! Every CRUD call acts on the repository's current table. Table names are
//! validated before they reach statement text and are always double-quoted
//! once they get there.

use rusqlite::{params, Connection, OptionalExtension};

use crate::entry::Entry;
use crate::error::{RepoError, RepoResult};
use crate::validate::{quote_ident, Patterns};

pub const DEFAULT_TABLE: &str = "default_table";

#[derive(Clone, Debug)]
pub struct RepoConfig {
    pub default_table: String,
    pub patterns: Patterns,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            default_table: DEFAULT_TABLE.to_string(),
            patterns: Patterns::default(),
        }
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            username TEXT UNIQUE NOT NULL,
            email TEXT UNIQUE NOT NULL
        )
        "#,
        table = quote_ident(table)
    )
}

fn map_entry_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
    })
}

/// Returns the catalog's spelling of `table`, matching case-insensitively
/// the way SQLite resolves identifiers.
fn db_find_table(conn: &Connection, table: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        params![table],
        |row| row.get(0),
    )
    .optional()
}

fn db_list_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
        ORDER BY rowid
        "#,
    )?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(names)
}

fn db_insert_entry(conn: &Connection, table: &str, entry: &Entry) -> rusqlite::Result<i64> {
    conn.execute(
        &format!(
            "INSERT INTO {} (name, username, email) VALUES (?1, ?2, ?3)",
            quote_ident(table)
        ),
        params![entry.name, entry.username, entry.email],
    )?;
    Ok(conn.last_insert_rowid())
}

fn db_list_entries(conn: &Connection, table: &str) -> rusqlite::Result<Vec<Entry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, username, email FROM {} ORDER BY id",
        quote_ident(table)
    ))?;
    let entries = stmt
        .query_map([], map_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

fn db_load_entry(conn: &Connection, table: &str, username: &str) -> rusqlite::Result<Option<Entry>> {
    conn.query_row(
        &format!(
            "SELECT id, name, username, email FROM {} WHERE username = ?1",
            quote_ident(table)
        ),
        params![username],
        map_entry_row,
    )
    .optional()
}

fn db_update_entry(
    conn: &Connection,
    table: &str,
    username: &str,
    updated: &Entry,
) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "UPDATE {} SET name = ?1, username = ?2, email = ?3 WHERE username = ?4",
            quote_ident(table)
        ),
        params![updated.name, updated.username, updated.email, username],
    )
}

fn db_delete_entry(conn: &Connection, table: &str, username: &str) -> rusqlite::Result<usize> {
    conn.execute(
        &format!("DELETE FROM {} WHERE username = ?1", quote_ident(table)),
        params![username],
    )
}

/// Owns the storage handle and the current-table pointer.
///
/// Table switches take `&mut self` and CRUD takes `&self`, so a repository
/// shared between threads has to sit behind a `Mutex`, which keeps a switch
/// from landing in the middle of a CRUD call.
pub struct SqliteRepository {
    conn: Connection,
    config: RepoConfig,
    current_table: String,
}

impl SqliteRepository {
    pub fn new(conn: Connection, config: RepoConfig) -> RepoResult<Self> {
        config.patterns.validate_table_name(&config.default_table)?;
        let current_table = config.default_table.clone();
        Ok(Self {
            conn,
            config,
            current_table,
        })
    }

    /// Builds a repository with the stock configuration and creates the
    /// default table.
    pub fn open(conn: Connection) -> RepoResult<Self> {
        let repo = Self::new(conn, RepoConfig::default())?;
        repo.initialize()?;
        Ok(repo)
    }

    /// Creates the default table if it does not exist yet.
    pub fn initialize(&self) -> RepoResult<()> {
        self.conn
            .execute_batch(&create_table_sql(&self.config.default_table))?;
        log::debug!("default table `{}` ready", self.config.default_table);
        Ok(())
    }

    /// Runs `f` inside a transaction, committing when it returns `Ok` and
    /// rolling back otherwise.
    pub fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| E::from(RepoError::Storage(e)))?;
        let out = f(self)?;
        tx.commit().map_err(|e| E::from(RepoError::Storage(e)))?;
        Ok(out)
    }

    pub fn current_table(&self) -> &str {
        &self.current_table
    }

    pub fn default_table(&self) -> &str {
        &self.config.default_table
    }

    pub fn patterns(&self) -> &Patterns {
        &self.config.patterns
    }

    fn is_default(&self, table: &str) -> bool {
        table.eq_ignore_ascii_case(&self.config.default_table)
    }

    fn find_table(&self, table: &str) -> RepoResult<Option<String>> {
        self.config.patterns.validate_table_name(table)?;
        Ok(db_find_table(&self.conn, table)?)
    }

    pub fn new_table(&mut self, table: &str) -> RepoResult<()> {
        if self.find_table(table)?.is_some() {
            return Err(RepoError::TableExists);
        }

        self.conn.execute_batch(&create_table_sql(table))?;
        log::debug!("created table `{table}`");
        self.current_table = table.to_string();
        Ok(())
    }

    pub fn switch_table(&mut self, table: &str) -> RepoResult<()> {
        let name = self
            .find_table(table)?
            .ok_or(RepoError::TableDoesNotExist)?;
        log::debug!("switching table `{}` -> `{name}`", self.current_table);
        self.current_table = name;
        Ok(())
    }

    pub fn table_exists(&self, table: &str) -> RepoResult<bool> {
        Ok(self.find_table(table)?.is_some())
    }

    /// Like `table_exists`, but reports absence as `TableDoesNotExist`.
    pub fn ensure_table_exists(&self, table: &str) -> RepoResult<()> {
        if self.table_exists(table)? {
            Ok(())
        } else {
            Err(RepoError::TableDoesNotExist)
        }
    }

    /// Deletes every row in the current table and returns how many went.
    pub fn clear_table(&self) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {}", quote_ident(&self.current_table)), [])?;
        log::debug!("cleared {removed} rows from `{}`", self.current_table);
        Ok(removed)
    }

    pub fn delete_table(&mut self, table: &str) -> RepoResult<()> {
        if self.is_default(table) {
            return Err(RepoError::TableCannotBeDeleted);
        }

        let name = self
            .find_table(table)?
            .ok_or(RepoError::TableDoesNotExist)?;
        self.conn
            .execute_batch(&format!("DROP TABLE {}", quote_ident(&name)))?;
        log::debug!("dropped table `{name}`");

        if self.current_table.eq_ignore_ascii_case(&name) {
            self.current_table = self.config.default_table.clone();
        }
        Ok(())
    }

    /// All table names in creation order, default table first.
    pub fn list_tables(&self) -> RepoResult<Vec<String>> {
        let (mut tables, rest): (Vec<String>, Vec<String>) = db_list_tables(&self.conn)?
            .into_iter()
            .partition(|name| self.is_default(name));
        tables.extend(rest);
        Ok(tables)
    }

    pub fn insert(&self, entry: &Entry) -> RepoResult<Entry> {
        self.config.patterns.validate_entry(entry)?;

        let id = db_insert_entry(&self.conn, &self.current_table, entry)
            .map_err(RepoError::from_write)?;
        log::debug!("inserted `{}` into `{}` id={id}", entry.username, self.current_table);

        Ok(Entry {
            id,
            ..entry.clone()
        })
    }

    pub fn all(&self) -> RepoResult<Vec<Entry>> {
        Ok(db_list_entries(&self.conn, &self.current_table)?)
    }

    pub fn get_by_username(&self, username: &str) -> RepoResult<Entry> {
        self.config.patterns.validate_username(username)?;

        db_load_entry(&self.conn, &self.current_table, username)?.ok_or(RepoError::NotFound)
    }

    /// Replaces name, username and email of the row keyed by `username`.
    /// The row keeps its id.
    pub fn update(&self, username: &str, updated: &Entry) -> RepoResult<Entry> {
        self.config.patterns.validate_username(username)?;
        self.config.patterns.validate_entry(updated)?;

        let changed = db_update_entry(&self.conn, &self.current_table, username, updated)
            .map_err(RepoError::from_write)?;
        if changed == 0 {
            return Err(RepoError::UpdateFailed);
        }

        db_load_entry(&self.conn, &self.current_table, &updated.username)?
            .ok_or(RepoError::UpdateFailed)
    }

    pub fn delete(&self, username: &str) -> RepoResult<()> {
        self.config.patterns.validate_username(username)?;

        let removed = db_delete_entry(&self.conn, &self.current_table, username)?;
        if removed == 0 {
            return Err(RepoError::DeleteFailed);
        }
        log::debug!("deleted `{username}` from `{}`", self.current_table);
        Ok(())
    }
}
