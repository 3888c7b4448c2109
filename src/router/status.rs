//! Welcome page.

use axum::Json;

use super::Message;

pub const WELCOME: &str = "Welcome to the note-taking app!";

pub async fn handler() -> Json<Message> {
    Json(Message::new(WELCOME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::tests::get;
    use crate::*;

    #[tokio::test]
    async fn test_welcome() {
        let app = app(router::state());

        let body = get(&app, "/").await;
        assert_eq!(body, serde_json::json!({ "message": WELCOME }));
    }
}
