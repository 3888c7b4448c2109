//! PostgreSQL implementation of [`Store`].

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tokio::sync::OnceCell;

use super::{Result, Store, StoreError, cast_id};
use crate::model::{Id, NewNote, NewUser, Note, NoteRecord, User};

/// Store backed by a connection pool created on first use.
pub struct PgStore {
    url: String,
    pool_size: u32,
    pool: OnceCell<PgPool>,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
}

/// Note joined with its owner; owner columns are null on a dangling reference.
#[derive(Debug, FromRow)]
struct NoteRow {
    id: String,
    content: String,
    owner_id: Option<String>,
    owner_name: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: Id::from(row.id),
            name: row.name,
        }
    }
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        let owner = row.owner_id.zip(row.owner_name).map(|(id, name)| User {
            id: Id::from(id),
            name,
        });

        Note {
            id: Id::from(row.id),
            content: row.content,
            owner,
        }
    }
}

const SELECT_NOTE: &str = r#"
    SELECT n.id, n.content, u.id AS owner_id, u.name AS owner_name
    FROM notes n
    LEFT JOIN users u ON u.id = n.user_id
"#;

impl PgStore {
    /// Create a new [`PgStore`]. Nothing is connected until [`Store::connect`].
    pub fn new(url: impl Into<String>, pool_size: u32) -> Self {
        Self {
            url: url.into(),
            pool_size,
            pool: OnceCell::new(),
        }
    }

    async fn pool(&self) -> Result<&PgPool> {
        self.pool
            .get_or_try_init(|| async {
                let pool = PgPoolOptions::new()
                    .max_connections(self.pool_size)
                    .connect(&self.url)
                    .await?;

                // execute migrations scripts on first connection.
                sqlx::migrate!().run(&pool).await?;

                tracing::info!(pool_size = self.pool_size, "postgres connected");
                Ok::<_, StoreError>(pool)
            })
            .await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn connect(&self) -> Result<()> {
        self.pool().await.map(|_| ())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let id = Id::generate();

        sqlx::query(r#"INSERT INTO users (id, name) VALUES ($1, $2)"#)
            .bind(id.as_str())
            .bind(&user.name)
            .execute(self.pool().await?)
            .await?;

        Ok(User {
            id,
            name: user.name,
        })
    }

    async fn create_note(&self, note: NewNote) -> Result<NoteRecord> {
        let id = Id::generate();

        sqlx::query(
            r#"INSERT INTO notes (id, content, user_id) VALUES ($1, $2, $3)"#,
        )
        .bind(id.as_str())
        .bind(&note.content)
        .bind(note.owner.as_str())
        .execute(self.pool().await?)
        .await?;

        Ok(NoteRecord {
            id,
            content: note.content,
            owner: note.owner,
        })
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, name FROM users WHERE name = $1 ORDER BY seq LIMIT 1"#,
        )
        .bind(name)
        .fetch_optional(self.pool().await?)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, name FROM users ORDER BY seq"#,
        )
        .fetch_all(self.pool().await?)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_notes_by_owner(
        &self,
        owner: &Id,
        content_filter: Option<&str>,
    ) -> Result<Vec<Note>> {
        let query = format!(
            r#"{SELECT_NOTE}
            WHERE n.user_id = $1
              AND ($2::TEXT IS NULL OR STRPOS(LOWER(n.content), LOWER($2)) > 0)
            ORDER BY n.seq"#
        );

        let rows = sqlx::query_as::<_, NoteRow>(&query)
            .bind(owner.as_str())
            .bind(content_filter)
            .fetch_all(self.pool().await?)
            .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn find_note_by_id(&self, id: &str) -> Result<Option<Note>> {
        let id = cast_id(id)?;
        let query = format!("{SELECT_NOTE} WHERE n.id = $1");

        let row = sqlx::query_as::<_, NoteRow>(&query)
            .bind(id.as_str())
            .fetch_optional(self.pool().await?)
            .await?;

        Ok(row.map(Note::from))
    }

    async fn update_note_content(&self, id: &str, content: &str) -> Result<()> {
        let id = cast_id(id)?;

        sqlx::query(r#"UPDATE notes SET content = $1 WHERE id = $2"#)
            .bind(content)
            .bind(id.as_str())
            .execute(self.pool().await?)
            .await?;

        Ok(())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        let id = cast_id(id)?;

        sqlx::query(r#"DELETE FROM notes WHERE id = $1"#)
            .bind(id.as_str())
            .execute(self.pool().await?)
            .await?;

        Ok(())
    }
}
