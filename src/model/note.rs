use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Id, User, ValidationError, required_string};

/// Note as saved on database, owner left as a reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    #[serde(rename = "_id")]
    pub id: Id,
    pub content: String,
    #[serde(rename = "userId")]
    pub owner: Id,
}

/// Note with its owner reference resolved to the full [`User`].
///
/// `owner` is `None` when the referenced user no longer exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: Id,
    pub content: String,
    #[serde(rename = "userId")]
    pub owner: Option<User>,
}

impl Note {
    /// Whether `user` is the resolved owner of this note.
    ///
    /// A dangling owner reference never matches anyone.
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.id == user.id)
    }
}

/// Insertion payload for a [`Note`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub content: String,
    pub owner: Id,
}

impl NewNote {
    pub fn new(content: Option<Value>, owner: Id) -> Result<Self, ValidationError> {
        Ok(Self {
            content: required_string("content", content)?,
            owner,
        })
    }
}
