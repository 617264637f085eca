//! libSQL backend — async `Database` trait implementation.
//!
//! One connection, reused for all operations. `libsql::Connection` is
//! `Send + Sync` and safe for concurrent async use, so there is no
//! check-then-reconnect dance here.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::Database;
use crate::todos::model::{Todo, TodoDraft};
use crate::users::model::{NewUser, User};

const TODO_COLUMNS: &str = "id, title, description, completed, created_at, updated_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, is_active, created_at, updated_at, last_login_at";

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    // RFC 3339 first (our canonical write format)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    // SQLite datetime() output with fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    // SQLite datetime() output without fractional seconds
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn parse_optional_datetime(s: &Option<String>) -> Option<DateTime<Utc>> {
    s.as_ref().map(|s| parse_datetime(s))
}

/// Map a libsql Row to a Todo.
///
/// Column order matches TODO_COLUMNS:
/// 0:id, 1:title, 2:description, 3:completed, 4:created_at, 5:updated_at
fn row_to_todo(row: &libsql::Row) -> Result<Todo, DatabaseError> {
    let created: Option<String> = row.get(4).ok();
    let updated: Option<String> = row.get(5).ok();
    Ok(Todo {
        id: row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("todo id column: {e}")))?,
        title: row
            .get(1)
            .map_err(|e| DatabaseError::Query(format!("todo title column: {e}")))?,
        description: row
            .get(2)
            .map_err(|e| DatabaseError::Query(format!("todo description column: {e}")))?,
        completed: row
            .get::<i64>(3)
            .map_err(|e| DatabaseError::Query(format!("todo completed column: {e}")))?
            != 0,
        created_at: parse_optional_datetime(&created),
        updated_at: parse_optional_datetime(&updated),
    })
}

/// Map a libsql Row to a User.
///
/// Column order matches USER_COLUMNS:
/// 0:id, 1:username, 2:email, 3:password_hash, 4:first_name, 5:last_name,
/// 6:is_active, 7:created_at, 8:updated_at, 9:last_login_at
fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    let created: Option<String> = row.get(7).ok();
    let updated: Option<String> = row.get(8).ok();
    let last_login: Option<String> = row.get(9).ok();
    Ok(User {
        id: row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("user id column: {e}")))?,
        username: row
            .get(1)
            .map_err(|e| DatabaseError::Query(format!("user username column: {e}")))?,
        email: row
            .get(2)
            .map_err(|e| DatabaseError::Query(format!("user email column: {e}")))?,
        password_hash: row
            .get(3)
            .map_err(|e| DatabaseError::Query(format!("user password_hash column: {e}")))?,
        first_name: row
            .get(4)
            .map_err(|e| DatabaseError::Query(format!("user first_name column: {e}")))?,
        last_name: row
            .get(5)
            .map_err(|e| DatabaseError::Query(format!("user last_name column: {e}")))?,
        is_active: row
            .get::<i64>(6)
            .map_err(|e| DatabaseError::Query(format!("user is_active column: {e}")))?
            != 0,
        created_at: parse_optional_datetime(&created),
        updated_at: parse_optional_datetime(&updated),
        last_login_at: parse_optional_datetime(&last_login),
    })
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Todos ───────────────────────────────────────────────────────

    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_todos: {e}")))?;

        let mut todos = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            todos.push(row_to_todo(&row)?);
        }
        Ok(todos)
    }

    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_todo: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_todo(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_todo row: {e}"))),
        }
    }

    async fn create_todo(&self, draft: &TodoDraft) -> Result<Todo, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO todos (title, description, completed, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.title.as_str(),
                draft.description.as_str(),
                draft.completed as i64,
                now.as_str(),
                now.as_str()
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("create_todo: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!(id, "Todo created");

        // Read back so the response reflects exactly what was stored.
        self.get_todo(id)
            .await?
            .ok_or_else(|| DatabaseError::Query(format!("create_todo: inserted row {id} missing")))
    }

    async fn update_todo(&self, id: i64, draft: &TodoDraft) -> Result<Option<Todo>, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let affected = conn
            .execute(
                "UPDATE todos SET title = ?1, description = ?2, completed = ?3, updated_at = ?4 WHERE id = ?5",
                params![
                    draft.title.as_str(),
                    draft.description.as_str(),
                    draft.completed as i64,
                    now.as_str(),
                    id
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("update_todo: {e}")))?;

        if affected == 0 {
            return Ok(None);
        }
        debug!(id, "Todo updated");
        self.get_todo(id).await
    }

    async fn delete_todo(&self, id: i64) -> Result<bool, DatabaseError> {
        let conn = self.conn();
        let affected = conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_todo: {e}")))?;
        if affected > 0 {
            debug!(id, "Todo deleted");
        }
        Ok(affected > 0)
    }

    // ── Users ───────────────────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_users: {e}")))?;

        let mut users = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("find_user_by_username: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_user(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!(
                "find_user_by_username row: {e}"
            ))),
        }
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let result = conn
            .execute(
                "INSERT INTO users (username, email, password_hash, first_name, last_name, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7)",
                params![
                    new_user.username.as_str(),
                    new_user.email.as_str(),
                    new_user.password_hash.as_str(),
                    new_user.first_name.as_str(),
                    new_user.last_name.as_str(),
                    now.as_str(),
                    now.as_str()
                ],
            )
            .await;

        match result {
            Ok(_) => {}
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                return Err(DatabaseError::Constraint(format!(
                    "Username '{}' is already taken",
                    new_user.username
                )));
            }
            Err(e) => return Err(DatabaseError::Query(format!("create_user: {e}"))),
        }

        let id = conn.last_insert_rowid();
        info!(id, username = %new_user.username, "User created");

        let mut rows = conn
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_user read-back: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_user(&row),
            _ => Err(DatabaseError::Query(format!(
                "create_user: inserted row {id} missing"
            ))),
        }
    }

    async fn touch_last_login(&self, id: i64) -> Result<(), DatabaseError> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
            params![now.as_str(), id],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("touch_last_login: {e}")))?;
        debug!(id, "Last login updated");
        Ok(())
    }
}
