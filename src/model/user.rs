use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Id, ValidationError, required_string};

/// User as saved on database.
///
/// `name` is how requests address a user. Nothing prevents two users from
/// sharing a name; lookups resolve to the first one created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
}

/// Insertion payload for a [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
}

impl NewUser {
    pub fn new(name: Option<Value>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_string("name", name)?,
        })
    }
}
