use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

use crate::types::{Book, ReadingStatus};

/// Input for inserting a new book row.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Sparse set of column changes for a book row.
///
/// A `None` field is left untouched by [`BookRepository::update`]; only the
/// present fields become part of the generated SET clause.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub total_pages: Option<i64>,
    pub current_page: Option<i64>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.total_pages.is_none()
            && self.current_page.is_none()
    }
}

/// Result of a reading-progress update.
///
/// Absence and an out-of-range page are ordinary outcomes, not errors; only
/// storage failures surface as `sqlx::Error`.
#[derive(Debug, Clone)]
pub enum ProgressOutcome {
    Updated(Book),
    NotFound,
    OutOfRange,
}

/// SQL operations against the `books` table.
///
/// Owns a handle of the pool built at startup; the sole writer of the
/// `status` column.
#[derive(Clone)]
pub struct BookRepository {
    db: SqlitePool,
}

impl BookRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// All books, newest first.
    pub async fn list(&self) -> Result<Vec<Book>, sqlx::Error> {
        let rows = sqlx::query(
            r#"SELECT id, title, author, description, total_pages, current_page, status,
                      created_at, updated_at
               FROM books ORDER BY created_at DESC, id DESC"#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(map_book).collect())
    }

    /// A single book, or `None` when the id does not exist.
    pub async fn get(&self, id: i64) -> Result<Option<Book>, sqlx::Error> {
        let row = sqlx::query(
            r#"SELECT id, title, author, description, total_pages, current_page, status,
                      created_at, updated_at
               FROM books WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.as_ref().map(map_book))
    }

    /// Inserts a new row, deriving `status` before the write, and returns the
    /// persisted record including the generated id and timestamps.
    pub async fn create(&self, new: NewBook) -> Result<Book, sqlx::Error> {
        let status = ReadingStatus::for_pages(new.current_page, new.total_pages);

        let row = sqlx::query(
            r#"INSERT INTO books (title, author, description, total_pages, current_page, status)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)
               RETURNING id, title, author, description, total_pages, current_page, status,
                         created_at, updated_at"#,
        )
        .bind(&new.title)
        .bind(&new.author)
        .bind(&new.description)
        .bind(new.total_pages)
        .bind(new.current_page)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        Ok(map_book(&row))
    }

    /// Applies only the fields present in `changes` and returns the updated
    /// record, or `None` when the id does not exist (checked before writing).
    ///
    /// When `current_page` is part of the change set, `status` is recomputed
    /// against the new `total_pages` if supplied, else the stored one. An
    /// empty change set is a no-op returning the unchanged record.
    pub async fn update(&self, id: i64, changes: BookChanges) -> Result<Option<Book>, sqlx::Error> {
        let existing = match self.get(id).await? {
            Some(book) => book,
            None => return Ok(None),
        };

        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let status = changes.current_page.map(|page| {
            let total_pages = changes.total_pages.unwrap_or(existing.total_pages);
            ReadingStatus::for_pages(page, total_pages)
        });

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE books SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(title) = &changes.title {
                set.push("title = ").push_bind_unseparated(title);
            }
            if let Some(author) = &changes.author {
                set.push("author = ").push_bind_unseparated(author);
            }
            if let Some(description) = &changes.description {
                set.push("description = ").push_bind_unseparated(description);
            }
            if let Some(total_pages) = changes.total_pages {
                set.push("total_pages = ").push_bind_unseparated(total_pages);
            }
            if let Some(current_page) = changes.current_page {
                set.push("current_page = ").push_bind_unseparated(current_page);
            }
            if let Some(status) = status {
                set.push("status = ").push_bind_unseparated(status);
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        builder.build().execute(&self.db).await?;

        self.get(id).await
    }

    /// Removes the row; `false` when nothing was deleted.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bounds-checked progress update: rejects pages outside
    /// `[0, total_pages]` without touching the row, otherwise recomputes
    /// `status` via [`BookRepository::update`].
    pub async fn update_progress(
        &self,
        id: i64,
        current_page: i64,
    ) -> Result<ProgressOutcome, sqlx::Error> {
        let book = match self.get(id).await? {
            Some(book) => book,
            None => return Ok(ProgressOutcome::NotFound),
        };

        if current_page < 0 || current_page > book.total_pages {
            return Ok(ProgressOutcome::OutOfRange);
        }

        let changes = BookChanges { current_page: Some(current_page), ..Default::default() };
        match self.update(id, changes).await? {
            Some(book) => Ok(ProgressOutcome::Updated(book)),
            None => Ok(ProgressOutcome::NotFound),
        }
    }
}

fn map_book(r: &SqliteRow) -> Book {
    Book {
        id: r.get("id"),
        title: r.get("title"),
        author: r.get("author"),
        description: r.get("description"),
        total_pages: r.get("total_pages"),
        current_page: r.get("current_page"),
        status: r.get("status"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}
