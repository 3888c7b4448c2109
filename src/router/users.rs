//! Create and list users.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Created, JsonBody, Reply};
use crate::database::{self, Database};
use crate::model::{NewUser, User};

pub const USER_CREATED: &str = "Successfully created a new user.";
pub const USER_NOT_CREATED: &str = "Could NOT create a new user.";
pub const AN_ERROR_OCCURED: &str = "An error occured.";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Body {
    pub username: Option<Value>,
}

/// `POST /`.
pub async fn create(
    State(db): State<Database>,
    JsonBody(body): JsonBody<Body>,
) -> Reply<Created> {
    match insert(&db, body.username).await {
        Ok(user) => Reply::Data(Created {
            id: user.id,
            message: USER_CREATED.to_owned(),
        }),
        Err(err) => Reply::failure(USER_NOT_CREATED, err),
    }
}

async fn insert(db: &Database, username: Option<Value>) -> database::Result<User> {
    db.connect().await?;
    let user = db.create_user(NewUser::new(username)?).await?;

    tracing::info!(user_id = %user.id, name = %user.name, "user created");
    Ok(user)
}

/// `GET /users`.
pub async fn list(State(db): State<Database>) -> Reply<Vec<User>> {
    Reply::caught(all(&db).await, AN_ERROR_OCCURED)
}

async fn all(db: &Database) -> database::Result<Reply<Vec<User>>> {
    db.connect().await?;
    Ok(Reply::Data(db.list_users().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::router::tests::{create_note, create_user, get};
    use crate::*;

    #[tokio::test]
    async fn test_create_user() {
        let app = app(router::state());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/",
            json!({ "username": "alice" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Created = serde_json::from_value(json_body(response).await).unwrap();
        assert_eq!(body.message, USER_CREATED);

        let users = get(&app, "/users").await;
        assert_eq!(users, json!([{ "_id": body.id.as_str(), "name": "alice" }]));
    }

    #[tokio::test]
    async fn test_create_user_without_username() {
        let app = app(router::state());

        for body in [json!({}).to_string(), String::new()] {
            let response = make_request(app.clone(), Method::POST, "/", body).await;
            assert_eq!(response.status(), StatusCode::OK);

            let body = json_body(response).await;
            assert_eq!(body["message"], USER_NOT_CREATED);
            assert_eq!(body["error"], "validation failed: Path `name` is required.");
        }

        assert_eq!(get(&app, "/users").await, json!([]));
    }

    #[tokio::test]
    async fn test_username_is_cast_to_text() {
        let app = app(router::state());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/",
            json!({ "username": 123 }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["message"], USER_CREATED);

        for body in [json!({ "username": { "first": "a" } }), json!([])] {
            let response =
                make_request(app.clone(), Method::POST, "/", body.to_string()).await;
            assert_eq!(response.status(), StatusCode::OK);

            let body = json_body(response).await;
            assert_eq!(body["message"], USER_NOT_CREATED);
            assert!(body["error"].as_str().unwrap().starts_with("validation failed"));
        }

        let users = get(&app, "/users").await;
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["name"], "123");
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let app = app(router::state());

        let response =
            make_request(app, Method::POST, "/", "{\"username\":".to_owned()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_users_route_wins_over_user_route() {
        let app = app(router::state());
        create_user(&app, "alice").await;
        create_user(&app, "bob").await;

        let users = get(&app, "/users").await;
        let names: Vec<_> = users
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["alice", "bob"]);

        // Even with a user named `users`, the listing is served.
        create_user(&app, "users").await;
        let users = get(&app, "/users").await;
        assert_eq!(users.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_post_users_creates_a_note() {
        let app = app(router::state());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            json!({ "content": "hi" }).to_string(),
        )
        .await;
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Could NOT find the user." })
        );

        create_user(&app, "users").await;
        let id = create_note(&app, "users", "hi").await;

        let note = get(&app, &format!("/users/{id}")).await;
        assert_eq!(note["content"], "hi");
    }
}
