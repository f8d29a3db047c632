#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt; // for .collect()
    use serde_json::{json, Value};
    use sqlx::migrate::MigrateDatabase;
    use sqlx::sqlite::SqlitePoolOptions;
    use tempfile::NamedTempFile;
    use tower::ServiceExt;

    use crate::error::AppError;
    use crate::routes;
    use crate::state::AppState;

    async fn setup_test_app() -> (Router, NamedTempFile) {
        // Create temporary database; the handle keeps the file alive for the test
        let temp_db = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite:{}", temp_db.path().display());

        sqlx::Sqlite::create_database(&db_url).await.unwrap();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&db_url)
            .await
            .unwrap();

        // Initialize schema
        crate::db::init_db(&pool).await.unwrap();

        let state = AppState::new(pool, crate::config::AppConfig::default());

        let app = Router::new()
            .merge(routes::api_router())
            .fallback(|| async {
                AppError::NotFound("The resource you are looking for is not found".to_string())
            })
            .with_state(state);

        (app, temp_db)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(payload) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
            None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    async fn create_book(app: &Router, title: &str, total_pages: i64, current_page: i64) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/books",
            Some(json!({
                "title": title,
                "author": "Franz Kafka",
                "total_pages": total_pages,
                "current_page": current_page,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }

    #[tokio::test]
    async fn test_create_book() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/books",
            Some(json!({
                "title": "Der Prozess",
                "author": "Franz Kafka",
                "description": "Roman",
                "total_pages": 240,
                "current_page": 0,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Book created successfully");
        let data = &body["data"];
        assert!(data["id"].as_i64().unwrap() > 0);
        assert_eq!(data["title"], "Der Prozess");
        assert_eq!(data["author"], "Franz Kafka");
        assert_eq!(data["description"], "Roman");
        assert_eq!(data["total_pages"], 240);
        assert_eq!(data["current_page"], 0);
        assert_eq!(data["status"], "not_started");
        assert!(!data["created_at"].as_str().unwrap().is_empty());
        assert!(!data["updated_at"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_book_defaults_current_page() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/books",
            Some(json!({
                "title": "Die Verwandlung",
                "author": "Franz Kafka",
                "total_pages": 74,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["current_page"], 0);
        assert_eq!(body["data"]["status"], "not_started");
    }

    #[tokio::test]
    async fn test_create_book_derives_status() {
        let (app, _db) = setup_test_app().await;

        let started = create_book(&app, "Halbgelesen", 100, 50).await;
        assert_eq!(started["status"], "in_progress");

        let finished = create_book(&app, "Ausgelesen", 100, 100).await;
        assert_eq!(finished["status"], "completed");
    }

    #[tokio::test]
    async fn test_create_book_missing_title() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/books",
            Some(json!({ "author": "Franz Kafka", "total_pages": 240 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["field"], "title");
    }

    #[tokio::test]
    async fn test_create_book_invalid_total_pages() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/books",
            Some(json!({ "title": "X", "author": "Y", "total_pages": 0 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["field"], "total_pages");
    }

    #[tokio::test]
    async fn test_create_book_negative_current_page() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/books",
            Some(json!({ "title": "X", "author": "Y", "total_pages": 10, "current_page": -1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["field"], "current_page");
    }

    #[tokio::test]
    async fn test_list_books_empty() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(&app, "GET", "/api/books", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Books retrieved successfully");
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_list_books_newest_first() {
        let (app, _db) = setup_test_app().await;

        create_book(&app, "Erstes Buch", 100, 0).await;
        create_book(&app, "Zweites Buch", 100, 0).await;

        let (status, body) = send(&app, "GET", "/api/books", None).await;

        assert_eq!(status, StatusCode::OK);
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["title"], "Zweites Buch");
        assert_eq!(items[1]["title"], "Erstes Buch");
    }

    #[tokio::test]
    async fn test_get_book_roundtrip() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "Das Schloss", 350, 20).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, "GET", &format!("/api/books/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Book retrieved successfully");
        assert_eq!(body["data"], created);
    }

    #[tokio::test]
    async fn test_get_book_non_numeric_id() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(&app, "GET", "/api/books/abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid book ID");
    }

    #[tokio::test]
    async fn test_get_book_not_found() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(&app, "GET", "/api/books/9999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Book not found");
    }

    #[tokio::test]
    async fn test_update_book_partial() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "Amerika", 300, 0).await;
        let id = created["id"].as_i64().unwrap();

        // Only current_page changes; everything else must stay untouched
        let (status, body) =
            send(&app, "PUT", &format!("/api/books/{}", id), Some(json!({ "current_page": 150 })))
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Book updated successfully");
        let data = &body["data"];
        assert_eq!(data["title"], "Amerika");
        assert_eq!(data["author"], "Franz Kafka");
        assert_eq!(data["total_pages"], 300);
        assert_eq!(data["current_page"], 150);
        assert_eq!(data["status"], "in_progress");

        // Now only the title changes; progress stays
        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/books/{}", id),
            Some(json!({ "title": "Der Verschollene" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Der Verschollene");
        assert_eq!(body["data"]["current_page"], 150);
        assert_eq!(body["data"]["status"], "in_progress");
    }

    #[tokio::test]
    async fn test_update_book_recomputes_status_with_new_total() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "Erzählungen", 100, 100).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["status"], "completed");

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/books/{}", id),
            Some(json!({ "total_pages": 200, "current_page": 100 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_pages"], 200);
        assert_eq!(body["data"]["status"], "in_progress");
    }

    #[tokio::test]
    async fn test_update_book_empty_body_is_noop() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "Betrachtung", 99, 3).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, "PUT", &format!("/api/books/{}", id), Some(json!({}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], created);
    }

    #[tokio::test]
    async fn test_update_book_not_found() {
        let (app, _db) = setup_test_app().await;

        let (status, _) = send(&app, "PUT", "/api/books/9999", Some(json!({ "title": "Neu" }))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_book_blank_title() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "Ein Landarzt", 60, 0).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) =
            send(&app, "PUT", &format!("/api/books/{}", id), Some(json!({ "title": "   " }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["field"], "title");
    }

    #[tokio::test]
    async fn test_delete_book() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "In der Strafkolonie", 80, 0).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, "DELETE", &format!("/api/books/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Book deleted successfully");

        let (status, _) = send(&app, "GET", &format!("/api/books/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_book_not_found() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(&app, "DELETE", "/api/books/9999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Book not found");
    }

    #[tokio::test]
    async fn test_progress_scenario() {
        let (app, _db) = setup_test_app().await;

        // Create at page 0 of 100
        let created = create_book(&app, "A", 100, 0).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["status"], "not_started");

        // Read to the end
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/books/{}/progress", id),
            Some(json!({ "current_page": 100 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Reading progress updated successfully");
        assert_eq!(body["data"]["current_page"], 100);
        assert_eq!(body["data"]["status"], "completed");

        // Beyond the last page is rejected and leaves the record unchanged
        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/books/{}/progress", id),
            Some(json!({ "current_page": 150 })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Book not found or invalid page number");

        let (_, body) = send(&app, "GET", &format!("/api/books/{}", id), None).await;
        assert_eq!(body["data"]["current_page"], 100);
        assert_eq!(body["data"]["status"], "completed");
    }

    #[tokio::test]
    async fn test_progress_back_to_zero() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "Nochmal von vorn", 100, 42).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/books/{}/progress", id),
            Some(json!({ "current_page": 0 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "not_started");
    }

    #[tokio::test]
    async fn test_progress_negative_page() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "B", 100, 0).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/books/{}/progress", id),
            Some(json!({ "current_page": -5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["field"], "current_page");
    }

    #[tokio::test]
    async fn test_progress_missing_current_page() {
        let (app, _db) = setup_test_app().await;

        let created = create_book(&app, "C", 100, 0).await;
        let id = created["id"].as_i64().unwrap();

        let (status, body) =
            send(&app, "PATCH", &format!("/api/books/{}/progress", id), Some(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_progress_book_not_found() {
        let (app, _db) = setup_test_app().await;

        let (status, body) =
            send(&app, "PATCH", "/api/books/9999/progress", Some(json!({ "current_page": 1 }))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Book not found or invalid page number");
    }

    #[tokio::test]
    async fn test_unmatched_route_returns_json_404() {
        let (app, _db) = setup_test_app().await;

        let (status, body) = send(&app, "GET", "/api/unknown", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "The resource you are looking for is not found");
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
