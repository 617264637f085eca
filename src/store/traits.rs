//! Backend-agnostic `Database` trait — single async interface for all
//! persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::todos::model::{Todo, TodoDraft};
use crate::users::model::{NewUser, User};

/// Persistence operations for todos and user accounts.
///
/// Update and delete report "zero rows affected" as `None`/`false`; callers
/// translate that into a not-found response.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Todos ───────────────────────────────────────────────────────

    /// All todos, newest first.
    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError>;

    /// Get a todo by id.
    async fn get_todo(&self, id: i64) -> Result<Option<Todo>, DatabaseError>;

    /// Insert a new todo and read back the created row, including the
    /// store-assigned id and timestamps.
    async fn create_todo(&self, draft: &TodoDraft) -> Result<Todo, DatabaseError>;

    /// Overwrite a todo's fields and bump `updated_at`. Returns the
    /// refreshed row, or `None` if no row matched the id.
    async fn update_todo(&self, id: i64, draft: &TodoDraft) -> Result<Option<Todo>, DatabaseError>;

    /// Delete a todo by id. Returns whether a row was deleted.
    async fn delete_todo(&self, id: i64) -> Result<bool, DatabaseError>;

    // ── Users ───────────────────────────────────────────────────────

    /// All users, newest first.
    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    /// Look up a user by username.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Insert a new user and read back the created row. A duplicate
    /// username surfaces as [`DatabaseError::Constraint`].
    async fn create_user(&self, new_user: &NewUser) -> Result<User, DatabaseError>;

    /// Set `last_login_at` to now.
    async fn touch_last_login(&self, id: i64) -> Result<(), DatabaseError>;
}
