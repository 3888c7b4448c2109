//! Store whose connection and queries can be cut at will.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{MemoryStore, Result, Store, StoreError};
use crate::model::{Id, NewNote, NewUser, Note, NoteRecord, User};

/// [`MemoryStore`] behind two switches: one failing `connect`, one failing
/// every other operation.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    connect_down: AtomicBool,
    queries_down: AtomicBool,
    connects: AtomicUsize,
}

impl FailingStore {
    pub fn set_connect_down(&self, down: bool) {
        self.connect_down.store(down, Ordering::SeqCst);
    }

    pub fn set_queries_down(&self, down: bool) {
        self.queries_down.store(down, Ordering::SeqCst);
    }

    /// Number of `connect` calls so far, failed ones included.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.queries_down.load(Ordering::SeqCst) {
            return Err(StoreError::Sql(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn connect(&self) -> Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if self.connect_down.load(Ordering::SeqCst) {
            return Err(StoreError::Sql(sqlx::Error::PoolTimedOut));
        }
        self.inner.connect().await
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.check()?;
        self.inner.create_user(user).await
    }

    async fn create_note(&self, note: NewNote) -> Result<NoteRecord> {
        self.check()?;
        self.inner.create_note(note).await
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        self.check()?;
        self.inner.find_user_by_name(name).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.check()?;
        self.inner.list_users().await
    }

    async fn find_notes_by_owner(
        &self,
        owner: &Id,
        content_filter: Option<&str>,
    ) -> Result<Vec<Note>> {
        self.check()?;
        self.inner.find_notes_by_owner(owner, content_filter).await
    }

    async fn find_note_by_id(&self, id: &str) -> Result<Option<Note>> {
        self.check()?;
        self.inner.find_note_by_id(id).await
    }

    async fn update_note_content(&self, id: &str, content: &str) -> Result<()> {
        self.check()?;
        self.inner.update_note_content(id, content).await
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        self.check()?;
        self.inner.delete_note(id).await
    }
}
