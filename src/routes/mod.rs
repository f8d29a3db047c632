//! HTTP route handlers for the Leseliste API.
//!
//! - `books`: CRUD and reading-progress endpoints for the book resource
//! - `health`: health check and system status endpoints

pub mod books;
pub mod health;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::state::AppState;

/// Static verb/path mapping for the book resource, mounted under `/api/books`.
pub fn api_router() -> Router<AppState> {
    Router::new().nest(
        "/api/books",
        Router::new()
            .route("/", get(books::list_books).post(books::create_book))
            .route(
                "/{id}",
                get(books::get_book).put(books::update_book).delete(books::delete_book),
            )
            .route("/{id}/progress", patch(books::update_progress)),
    )
}
