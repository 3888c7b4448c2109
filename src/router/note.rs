//! Read, update and delete a single note through its owner.
//!
//! Each handler resolves the user by name, then the note by id, then
//! compares the note's resolved owner with that user. `PUT` writes the new
//! content as soon as the note is found, before the owner comparison; `DELETE`
//! only removes the note once the comparison passed.

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{JsonBody, Reply};
use crate::database::{self, Database};
use crate::model::{Note, User, cast_string};

pub const USER_NOT_FOUND: &str = "Benutzer kann nicht gefunden werden.";
/// `PUT` has always answered with this spelling.
pub const UPDATE_USER_NOT_FOUND: &str = "Benutzer kann nicht gefunden werde.";
pub const NOTE_NOT_FOUND: &str = "Notiz kann nicht gefunden werden.";
pub const NOT_OWNER: &str = "Diese Notiz gehört nicht diesem Nutzer.";
pub const AN_ERROR_OCCURED: &str = "Ein Fehler ist aufgetreten.";
pub const NOTE_UPDATED: &str = "Notiz wurde geändert!";
pub const NOTE_DELETED: &str = "Notiz wurde gelöscht!";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub new_content: Option<Value>,
}

/// Why `user` may not act on `note`, if anything.
fn denial(note: &Note, user: &User) -> Option<&'static str> {
    if note.owner.is_none() {
        Some(NOTE_NOT_FOUND)
    } else if !note.is_owned_by(user) {
        Some(NOT_OWNER)
    } else {
        None
    }
}

/// `GET /{user}/{note_id}`.
pub async fn get(
    State(db): State<Database>,
    Path((user, note_id)): Path<(String, String)>,
) -> Reply<Note> {
    Reply::caught(fetch(&db, &user, &note_id).await, AN_ERROR_OCCURED)
}

async fn fetch(
    db: &Database,
    user: &str,
    note_id: &str,
) -> database::Result<Reply<Note>> {
    db.connect().await?;

    let Some(user) = db.find_user_by_name(user).await? else {
        return Ok(Reply::message(USER_NOT_FOUND));
    };
    let Some(note) = db.find_note_by_id(note_id).await? else {
        return Ok(Reply::message(NOTE_NOT_FOUND));
    };

    Ok(match denial(&note, &user) {
        Some(message) => Reply::message(message),
        None => Reply::Data(note),
    })
}

/// `PUT /{user}/{note_id}`.
pub async fn update(
    State(db): State<Database>,
    Path((user, note_id)): Path<(String, String)>,
    JsonBody(body): JsonBody<Body>,
) -> Reply<&'static str> {
    Reply::caught(
        replace(&db, &user, &note_id, body.new_content).await,
        AN_ERROR_OCCURED,
    )
}

async fn replace(
    db: &Database,
    user: &str,
    note_id: &str,
    new_content: Option<Value>,
) -> database::Result<Reply<&'static str>> {
    db.connect().await?;

    let Some(user) = db.find_user_by_name(user).await? else {
        return Ok(Reply::message(UPDATE_USER_NOT_FOUND));
    };
    let Some(note) = db.find_note_by_id(note_id).await? else {
        return Ok(Reply::message(NOTE_NOT_FOUND));
    };

    // Without `newContent` the note is left as is.
    if let Some(content) = cast_string("content", new_content)? {
        db.update_note_content(note.id.as_str(), &content).await?;
        tracing::info!(note_id = %note.id, requested_by = %user.id, "note updated");
    }

    Ok(match denial(&note, &user) {
        Some(message) => Reply::message(message),
        None => Reply::Data(NOTE_UPDATED),
    })
}

/// `DELETE /{user}/{note_id}`.
pub async fn delete(
    State(db): State<Database>,
    Path((user, note_id)): Path<(String, String)>,
) -> Reply<&'static str> {
    Reply::caught(remove(&db, &user, &note_id).await, AN_ERROR_OCCURED)
}

async fn remove(
    db: &Database,
    user: &str,
    note_id: &str,
) -> database::Result<Reply<&'static str>> {
    db.connect().await?;

    let Some(user) = db.find_user_by_name(user).await? else {
        return Ok(Reply::message(USER_NOT_FOUND));
    };
    let Some(note) = db.find_note_by_id(note_id).await? else {
        return Ok(Reply::message(NOTE_NOT_FOUND));
    };

    if let Some(message) = denial(&note, &user) {
        return Ok(Reply::message(message));
    }

    db.delete_note(note.id.as_str()).await?;
    tracing::info!(note_id = %note.id, user_id = %user.id, "note deleted");

    Ok(Reply::Data(NOTE_DELETED))
}
