use serde::{Deserialize, Serialize};

/// Reading state of a book, always derived from `(current_page, total_pages)`.
///
/// Stored as TEXT in the `books` table. Never set directly by callers; the
/// repository recomputes it on every write that touches `current_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReadingStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ReadingStatus {
    /// The single source of truth for status derivation.
    ///
    /// Callers guarantee `total_pages > 0`.
    pub fn for_pages(current_page: i64, total_pages: i64) -> Self {
        if current_page == 0 {
            ReadingStatus::NotStarted
        } else if current_page == total_pages {
            ReadingStatus::Completed
        } else {
            ReadingStatus::InProgress
        }
    }
}

/// A persisted book record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub total_pages: i64,
    pub current_page: i64,
    pub status: ReadingStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for `POST /api/books`.
///
/// All fields are optional at the serde level so that missing required fields
/// surface as 400 validation errors instead of body-rejection responses; the
/// handler enforces presence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub total_pages: Option<i64>,
    pub current_page: Option<i64>,
}

/// Payload for `PUT /api/books/{id}` - the create shape with every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub total_pages: Option<i64>,
    pub current_page: Option<i64>,
}

/// Payload for `PATCH /api/books/{id}/progress`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProgressRequest {
    pub current_page: Option<i64>,
}
