//! In-process implementation of [`Store`].

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Result, Store, cast_id};
use crate::model::{Id, NewNote, NewUser, Note, NoteRecord, User};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    notes: Vec<NoteRecord>,
}

impl Collections {
    fn populate(&self, note: &NoteRecord) -> Note {
        Note {
            id: note.id.clone(),
            content: note.content.clone(),
            owner: self.users.iter().find(|u| u.id == note.owner).cloned(),
        }
    }
}

/// Store keeping both collections in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    /// Drop a user without touching their notes.
    #[cfg(test)]
    pub(crate) async fn remove_user(&self, id: &Id) {
        self.collections.write().await.users.retain(|u| &u.id != id);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = User {
            id: Id::generate(),
            name: user.name,
        };
        self.collections.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn create_note(&self, note: NewNote) -> Result<NoteRecord> {
        let note = NoteRecord {
            id: Id::generate(),
            content: note.content,
            owner: note.owner,
        };
        self.collections.write().await.notes.push(note.clone());
        Ok(note)
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let collections = self.collections.read().await;
        Ok(collections.users.iter().find(|u| u.name == name).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.collections.read().await.users.clone())
    }

    async fn find_notes_by_owner(
        &self,
        owner: &Id,
        content_filter: Option<&str>,
    ) -> Result<Vec<Note>> {
        let needle = content_filter.map(str::to_lowercase);
        let collections = self.collections.read().await;

        Ok(collections
            .notes
            .iter()
            .filter(|n| &n.owner == owner)
            .filter(|n| match &needle {
                Some(needle) => n.content.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(|n| collections.populate(n))
            .collect())
    }

    async fn find_note_by_id(&self, id: &str) -> Result<Option<Note>> {
        let id = cast_id(id)?;
        let collections = self.collections.read().await;

        Ok(collections
            .notes
            .iter()
            .find(|n| n.id == id)
            .map(|n| collections.populate(n)))
    }

    async fn update_note_content(&self, id: &str, content: &str) -> Result<()> {
        let id = cast_id(id)?;
        let mut collections = self.collections.write().await;

        if let Some(note) = collections.notes.iter_mut().find(|n| n.id == id) {
            note.content = content.to_owned();
        }
        Ok(())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        let id = cast_id(id)?;
        self.collections.write().await.notes.retain(|n| n.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;

    async fn seeded() -> (MemoryStore, User) {
        let store = MemoryStore::default();
        let alice = store
            .create_user(NewUser::new(Some("alice".into())).unwrap())
            .await
            .unwrap();

        for content in ["Buy MILK", "call mom", "milkshake recipe"] {
            store
                .create_note(NewNote::new(Some(content.into()), alice.id.clone()).unwrap())
                .await
                .unwrap();
        }

        (store, alice)
    }

    #[tokio::test]
    async fn test_find_notes_by_owner() {
        let (store, alice) = seeded().await;

        let notes = store.find_notes_by_owner(&alice.id, None).await.unwrap();
        let contents: Vec<_> = notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["Buy MILK", "call mom", "milkshake recipe"]);
        assert!(notes.iter().all(|n| n.owner.as_ref() == Some(&alice)));

        let notes = store
            .find_notes_by_owner(&alice.id, Some("Milk"))
            .await
            .unwrap();
        let contents: Vec<_> = notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["Buy MILK", "milkshake recipe"]);

        // Literal match, no pattern syntax.
        let notes = store
            .find_notes_by_owner(&alice.id, Some("m.lk"))
            .await
            .unwrap();
        assert!(notes.is_empty());

        let nobody = Id::generate();
        assert!(store.find_notes_by_owner(&nobody, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_resolve_to_first() {
        let store = MemoryStore::default();
        let first = store
            .create_user(NewUser::new(Some("bob".into())).unwrap())
            .await
            .unwrap();
        store
            .create_user(NewUser::new(Some("bob".into())).unwrap())
            .await
            .unwrap();

        let found = store.find_user_by_name("bob").await.unwrap();
        assert_eq!(found, Some(first));
        assert_eq!(store.list_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_id_is_a_cast_failure() {
        let (store, _) = seeded().await;

        let err = store.find_note_by_id("not-an-id").await.unwrap_err();
        assert!(matches!(err, StoreError::Cast { ref value } if value == "not-an-id"));
        assert!(
            store
                .find_note_by_id(Id::generate().as_str())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_dangling_owner() {
        let (store, alice) = seeded().await;
        let note = store
            .find_notes_by_owner(&alice.id, None)
            .await
            .unwrap()
            .remove(0);

        store.remove_user(&alice.id).await;

        let note = store.find_note_by_id(note.id.as_str()).await.unwrap().unwrap();
        assert_eq!(note.owner, None);
    }
}
