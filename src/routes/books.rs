use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::{
        validation::{validate_non_negative, validate_positive, validate_required_text},
        AppError, AppResult, OptionExt,
    },
    repository::{BookChanges, NewBook, ProgressOutcome},
    state::AppState,
    types::{CreateBookRequest, UpdateBookRequest, UpdateProgressRequest},
};

pub async fn list_books(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let books = state.books.list().await?;
    Ok(Json(json!({
        "message": "Books retrieved successfully",
        "data": books,
    })))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_book_id(&id)?;
    let book = state.books.get(id).await?.ok_or_not_found("Book")?;
    Ok(Json(json!({
        "message": "Book retrieved successfully",
        "data": book,
    })))
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(req): Json<CreateBookRequest>,
) -> AppResult<Response> {
    let title = req.title.unwrap_or_default();
    validate_required_text(&title, "title")?;
    let author = req.author.unwrap_or_default();
    validate_required_text(&author, "author")?;
    let total_pages = req.total_pages.unwrap_or(0);
    validate_positive(total_pages, "total_pages")?;
    let current_page = req.current_page.unwrap_or(0);
    validate_non_negative(current_page, "current_page")?;

    let book = state
        .books
        .create(NewBook {
            title,
            author,
            description: req.description,
            total_pages,
            current_page,
        })
        .await?;

    let body = json!({
        "message": "Book created successfully",
        "data": book,
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookRequest>,
) -> AppResult<impl IntoResponse> {
    let id = parse_book_id(&id)?;

    // Provided fields obey the same rules as at creation
    if let Some(title) = &req.title {
        validate_required_text(title, "title")?;
    }
    if let Some(author) = &req.author {
        validate_required_text(author, "author")?;
    }
    if let Some(total_pages) = req.total_pages {
        validate_positive(total_pages, "total_pages")?;
    }
    if let Some(current_page) = req.current_page {
        validate_non_negative(current_page, "current_page")?;
    }

    let changes = BookChanges {
        title: req.title,
        author: req.author,
        description: req.description,
        total_pages: req.total_pages,
        current_page: req.current_page,
    };

    let book = state.books.update(id, changes).await?.ok_or_not_found("Book")?;
    Ok(Json(json!({
        "message": "Book updated successfully",
        "data": book,
    })))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_book_id(&id)?;

    if !state.books.delete(id).await? {
        return Err(AppError::NotFound("Book not found".to_string()));
    }

    Ok(Json(json!({
        "message": "Book deleted successfully",
    })))
}

pub async fn update_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProgressRequest>,
) -> AppResult<impl IntoResponse> {
    let id = parse_book_id(&id)?;

    let current_page = req.current_page.ok_or_else(|| AppError::ValidationError {
        field: "current_page".to_string(),
        message: "Current page is required".to_string(),
    })?;
    validate_non_negative(current_page, "current_page")?;

    match state.books.update_progress(id, current_page).await? {
        ProgressOutcome::Updated(book) => Ok(Json(json!({
            "message": "Reading progress updated successfully",
            "data": book,
        }))),
        ProgressOutcome::NotFound | ProgressOutcome::OutOfRange => {
            Err(AppError::NotFound("Book not found or invalid page number".to_string()))
        }
    }
}

fn parse_book_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>().map_err(|_| AppError::BadRequest("Invalid book ID".to_string()))
}
