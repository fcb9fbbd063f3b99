use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::{Database, DbError, Result};

/// Leaf under every versioned document that conditional writes compare against.
pub const VERSION_FIELD: &str = "version";

/// One entry of [`DocumentStore::update_many_if_version`].
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedUpdate {
    pub path: String,
    pub fields: Map<String, Value>,
    pub expected: u64,
}

/// Keyed document store. Every call is independent; nothing spans calls.
pub trait DocumentStore: Send + Sync + 'static {
    /// Read the value at `path`, reassembling any subtree below it.
    fn get(&self, path: &str) -> Result<Option<Value>>;

    /// Replace the subtree at `path`. Writing `null` removes it.
    fn set(&self, path: &str, value: &Value) -> Result<()>;

    /// Replace each named child of `path`, leaving other children alone.
    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<()>;

    /// Like [`DocumentStore::update`], but only if `path/version` still equals
    /// `expected`. Writes `version = expected + 1` and returns it.
    fn update_if_version(&self, path: &str, fields: &Map<String, Value>, expected: u64)
    -> Result<u64>;

    /// Apply several conditional updates in one call. Each entry stands or
    /// falls on its own; the outer error is reserved for store failures.
    fn update_many_if_version(&self, updates: &[VersionedUpdate]) -> Result<Vec<Result<u64>>> {
        Ok(updates
            .iter()
            .map(|u| self.update_if_version(&u.path, &u.fields, u.expected))
            .collect())
    }

    /// Delete the subtree at `path`.
    fn remove(&self, path: &str) -> Result<()>;
}

impl DocumentStore for Database {
    fn get(&self, path: &str) -> Result<Option<Value>> {
        let path = canonical(path)?;
        self.with_conn(|conn| read_subtree(conn, &path))
    }

    fn set(&self, path: &str, value: &Value) -> Result<()> {
        let path = canonical(path)?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            write_subtree(&tx, &path, value)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn update(&self, path: &str, fields: &Map<String, Value>) -> Result<()> {
        let path = canonical(path)?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            write_fields(&tx, &path, fields)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn update_if_version(
        &self,
        path: &str,
        fields: &Map<String, Value>,
        expected: u64,
    ) -> Result<u64> {
        let path = canonical(path)?;
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let next = conditional_update(&tx, &path, fields, expected)?;
            tx.commit()?;
            Ok(next)
        })
    }

    fn update_many_if_version(&self, updates: &[VersionedUpdate]) -> Result<Vec<Result<u64>>> {
        self.with_conn_mut(|conn| {
            let mut tx = conn.transaction()?;
            let mut results = Vec::with_capacity(updates.len());
            for update in updates {
                let sp = tx.savepoint()?;
                let result = canonical(&update.path).and_then(|path| {
                    conditional_update(&sp, &path, &update.fields, update.expected)
                });
                match result {
                    Ok(next) => {
                        sp.commit()?;
                        results.push(Ok(next));
                    }
                    // Dropping the savepoint rolls this entry back.
                    Err(e @ (DbError::NotFound(_)
                    | DbError::VersionConflict { .. }
                    | DbError::InvalidPath(_))) => results.push(Err(e)),
                    Err(e) => return Err(e),
                }
            }
            tx.commit()?;
            Ok(results)
        })
    }

    fn remove(&self, path: &str) -> Result<()> {
        let path = canonical(path)?;
        self.with_conn(|conn| delete_subtree(conn, &path))
    }
}

fn conditional_update(
    conn: &Connection,
    path: &str,
    fields: &Map<String, Value>,
    expected: u64,
) -> Result<u64> {
    if !subtree_exists(conn, path)? {
        return Err(DbError::NotFound(path.to_string()));
    }

    let found = read_version(conn, path)?;
    if found != expected {
        return Err(DbError::VersionConflict {
            path: path.to_string(),
            expected,
            found,
        });
    }

    let next = expected + 1;
    let mut fields = fields.clone();
    fields.insert(VERSION_FIELD.to_string(), Value::from(next));
    write_fields(conn, path, &fields)?;
    Ok(next)
}

/// Validate a path and strip surrounding slashes.
fn canonical(path: &str) -> Result<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(str::is_empty) {
        return Err(DbError::InvalidPath(path.to_string()));
    }
    Ok(trimmed.to_string())
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains('/') {
        return Err(DbError::InvalidPath(key.to_string()));
    }
    Ok(())
}

/// Half-open key range holding every descendant of `path`.
/// `'0'` is the character right after `'/'`.
fn descendant_range(path: &str) -> (String, String) {
    (format!("{path}/"), format!("{path}0"))
}

fn read_subtree(conn: &Connection, path: &str) -> Result<Option<Value>> {
    let (lower, upper) = descendant_range(path);
    let mut stmt = conn.prepare(
        "SELECT path, value FROM documents
         WHERE path = ?1 OR (path >= ?2 AND path < ?3)
         ORDER BY path",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![path, lower, upper], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if rows.is_empty() {
        return Ok(None);
    }

    let mut root = Map::new();
    for (full_path, raw) in rows {
        let value: Value = serde_json::from_str(&raw)?;
        if full_path == path {
            return Ok(Some(value));
        }
        let segments: Vec<&str> = full_path[lower.len()..].split('/').collect();
        insert_at(&mut root, &segments, value);
    }
    Ok(Some(Value::Object(root)))
}

fn insert_at(root: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for segment in parents {
        let slot = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        node = next;
    }
    node.insert(last.to_string(), value);
}

fn write_fields(conn: &Connection, path: &str, fields: &Map<String, Value>) -> Result<()> {
    for (key, value) in fields {
        check_key(key)?;
        write_subtree(conn, &format!("{path}/{key}"), value)?;
    }
    Ok(())
}

fn write_subtree(conn: &Connection, path: &str, value: &Value) -> Result<()> {
    delete_subtree(conn, path)?;
    delete_ancestor_leaves(conn, path)?;

    let mut leaves = Vec::new();
    flatten(path, value, &mut leaves)?;

    let mut stmt = conn.prepare(
        "INSERT INTO documents (path, value, updated_at) VALUES (?1, ?2, datetime('now'))",
    )?;
    for (leaf_path, raw) in &leaves {
        stmt.execute(rusqlite::params![leaf_path, raw])?;
    }
    Ok(())
}

/// One `(path, json)` row per non-object value. Nulls vanish.
fn flatten(path: &str, value: &Value, out: &mut Vec<(String, String)>) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, child) in map {
                check_key(key)?;
                flatten(&format!("{path}/{key}"), child, out)?;
            }
        }
        leaf => out.push((path.to_string(), serde_json::to_string(leaf)?)),
    }
    Ok(())
}

fn delete_subtree(conn: &Connection, path: &str) -> Result<()> {
    let (lower, upper) = descendant_range(path);
    conn.execute(
        "DELETE FROM documents WHERE path = ?1 OR (path >= ?2 AND path < ?3)",
        rusqlite::params![path, lower, upper],
    )?;
    Ok(())
}

/// A leaf sitting where an ancestor object now needs to be is replaced.
fn delete_ancestor_leaves(conn: &Connection, path: &str) -> Result<()> {
    let mut stmt = conn.prepare("DELETE FROM documents WHERE path = ?1")?;
    for (idx, _) in path.match_indices('/') {
        stmt.execute([&path[..idx]])?;
    }
    Ok(())
}

fn subtree_exists(conn: &Connection, path: &str) -> Result<bool> {
    let (lower, upper) = descendant_range(path);
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM documents WHERE path = ?1 OR (path >= ?2 AND path < ?3)",
        rusqlite::params![path, lower, upper],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn read_version(conn: &Connection, path: &str) -> Result<u64> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM documents WHERE path = ?1",
            [format!("{path}/{VERSION_FIELD}")],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(0),
    }
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
