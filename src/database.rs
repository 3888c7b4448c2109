//! Persistence port and the backends implementing it.
#[cfg(test)]
mod failing;
mod memory;
mod postgres;

#[cfg(test)]
pub use failing::FailingStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRef;

use crate::AppState;
use crate::model::{Id, NewNote, NewUser, Note, NoteRecord, User, ValidationError};

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "notes";
pub const DEFAULT_POOL_SIZE: u32 = 10;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`Store`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("cannot cast \"{value}\" to an identifier")]
    Cast { value: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Operations the service needs from its persistence engine.
///
/// Every read goes to the backend, nothing is cached between calls.
#[async_trait]
pub trait Store: Send + Sync {
    /// Establish the connection, or reuse the one already established.
    async fn connect(&self) -> Result<()>;

    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn create_note(&self, note: NewNote) -> Result<NoteRecord>;

    /// First user created with `name`, if any.
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Notes of `owner` in insertion order, owners resolved.
    ///
    /// `content_filter` keeps only notes whose content contains it,
    /// ignoring case.
    async fn find_notes_by_owner(
        &self,
        owner: &Id,
        content_filter: Option<&str>,
    ) -> Result<Vec<Note>>;

    /// Fails with [`StoreError::Cast`] when `id` is not a valid [`Id`].
    async fn find_note_by_id(&self, id: &str) -> Result<Option<Note>>;

    async fn update_note_content(&self, id: &str, content: &str) -> Result<()>;

    async fn delete_note(&self, id: &str) -> Result<()>;
}

/// Shared store handle passed to Axum.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn Store>,
}

impl Database {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Lazily connected PostgreSQL store.
    pub fn postgres(url: impl Into<String>, pool_size: u32) -> Self {
        Self::new(Arc::new(PgStore::new(url, pool_size)))
    }

    /// Process-local store, lost on exit.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }
}

impl std::ops::Deref for Database {
    type Target = dyn Store;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}

/// Turn a raw path segment into an [`Id`] the way stores expect it.
pub(crate) fn cast_id(raw: &str) -> Result<Id> {
    Id::parse(raw).ok_or_else(|| StoreError::Cast {
        value: raw.to_owned(),
    })
}
