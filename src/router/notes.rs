//! List, search and create the notes of one user.

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Created, JsonBody, Reply};
use crate::database::{self, Database};
use crate::model::{NewNote, Note, ValidationError};

pub const USER_NOT_FOUND: &str = "Could NOT find the user.";
pub const LIST_FAILED: &str = "An error occured";
pub const CREATE_FAILED: &str = "An error occured.";

/// Path segment served by the users listing for `GET` only.
const USERS_SEGMENT: &str = "users";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Body {
    pub content: Option<Value>,
}

/// `GET /{user}?search=`.
pub async fn list(
    State(db): State<Database>,
    Path(user): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Reply<Vec<Note>> {
    Reply::caught(find(&db, &user, &query).await, LIST_FAILED)
}

/// The `search` parameter, if given once and not empty.
///
/// A repeated parameter cannot be matched as text.
fn search_term(query: &[(String, String)]) -> Result<Option<&str>, ValidationError> {
    let values: Vec<&str> = query
        .iter()
        .filter(|(key, _)| key == "search")
        .map(|(_, value)| value.as_str())
        .collect();

    match values.as_slice() {
        [] => Ok(None),
        [term] => Ok(Some(*term).filter(|term| !term.is_empty())),
        _ => Err(ValidationError::Cast {
            path: "content",
            value: values.join(","),
        }),
    }
}

async fn find(
    db: &Database,
    user: &str,
    query: &[(String, String)],
) -> database::Result<Reply<Vec<Note>>> {
    db.connect().await?;

    let Some(owner) = db.find_user_by_name(user).await? else {
        return Ok(Reply::message(USER_NOT_FOUND));
    };

    let notes = db.find_notes_by_owner(&owner.id, search_term(query)?).await?;
    Ok(Reply::Data(notes))
}

/// `POST /{user}`.
pub async fn create(
    State(db): State<Database>,
    Path(user): Path<String>,
    JsonBody(body): JsonBody<Body>,
) -> Reply<Created> {
    Reply::caught(insert(&db, &user, body.content).await, CREATE_FAILED)
}

/// `POST /users`, which `/{user}` would have served.
pub async fn create_for_users_segment(
    State(db): State<Database>,
    JsonBody(body): JsonBody<Body>,
) -> Reply<Created> {
    Reply::caught(
        insert(&db, USERS_SEGMENT, body.content).await,
        CREATE_FAILED,
    )
}

async fn insert(
    db: &Database,
    user: &str,
    content: Option<Value>,
) -> database::Result<Reply<Created>> {
    db.connect().await?;

    let Some(owner) = db.find_user_by_name(user).await? else {
        return Ok(Reply::message(USER_NOT_FOUND));
    };

    let note = db.create_note(NewNote::new(content, owner.id)?).await?;
    tracing::info!(note_id = %note.id, user_id = %note.owner, "note created");

    Ok(Reply::Data(Created {
        id: note.id,
        message: format!("Successfully created a new note for {user}."),
    }))
}
