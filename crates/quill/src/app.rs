use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    context::{provider_scope, PROVIDER_HEADER},
    handlers::{
        authors::{create_author, delete_author, get_author, list_authors, update_author},
        categories::{
            create_category, delete_category, get_category, list_categories, update_category,
        },
        comments::{create_comment, delete_comment, get_comment, list_comments, update_comment},
        database::database_info,
        health::{healthz, livez},
        notifications::{
            create_notification, delete_notification, get_notification, list_notifications,
            mark_all_read, update_notification,
        },
        posts::{create_post, delete_post, get_post, list_posts, update_post},
        subcategories::{
            create_subcategory, delete_subcategory, get_subcategory, list_subcategories,
            update_subcategory,
        },
        users::{create_user, delete_user, get_user, list_users, update_user},
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(PROVIDER_HEADER)]);

    let api_routes = Router::new()
        .route("/database", get(database_info))
        // Category routes
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route(
            "/categories/{category_id}/subcategories",
            get(list_subcategories).post(create_subcategory),
        )
        .route(
            "/categories/{category_id}/subcategories/{subcategory_id}",
            get(get_subcategory)
                .patch(update_subcategory)
                .delete(delete_subcategory),
        )
        // Author routes
        .route("/authors", get(list_authors).post(create_author))
        .route(
            "/authors/{id}",
            get(get_author).patch(update_author).delete(delete_author),
        )
        .route(
            "/authors/{author_id}/posts",
            get(list_posts).post(create_post),
        )
        .route(
            "/authors/{author_id}/posts/{post_id}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        // Comment routes
        .route(
            "/authors/{author_id}/posts/{post_id}/comments",
            get(list_comments).post(create_comment),
        )
        .route(
            "/authors/{author_id}/posts/{post_id}/comments/{comment_id}",
            get(get_comment)
                .patch(update_comment)
                .delete(delete_comment),
        )
        // User routes
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route(
            "/users/{user_id}/notifications",
            get(list_notifications).post(create_notification),
        )
        .route(
            "/users/{user_id}/notifications/read-all",
            post(mark_all_read),
        )
        .route(
            "/users/{user_id}/notifications/{notification_id}",
            get(get_notification)
                .patch(update_notification)
                .delete(delete_notification),
        )
        .layer(cors);

    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), provider_scope))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, response::Response};
    use http_body_util::BodyExt;
    use quill_core::provider::Provider;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn request(method: &str, uri: &str, provider: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(provider) = provider {
            builder = builder.header(PROVIDER_HEADER, provider);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_livez() {
        let (_, state) = AppState::for_tests(Provider::Relational).await;
        let app = create_app(state);

        let response = app
            .oneshot(request("GET", "/livez", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_reports_selected_provider() {
        let (_, state) = AppState::for_tests(Provider::Relational).await;
        let app = create_app(state);

        let response = app
            .oneshot(request("GET", "/healthz", Some("dynamodb"), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "status": "ok", "provider": "WIDE_COLUMN" })
        );
    }

    #[tokio::test]
    async fn test_database_info() {
        let (_, state) = AppState::for_tests(Provider::Relational).await;
        let app = create_app(state);

        let relational = app
            .clone()
            .oneshot(request("GET", "/api/database", None, None))
            .await
            .unwrap();
        assert_eq!(
            json_body(relational).await,
            json!({
                "provider": "RELATIONAL",
                "description": "Relational store (SQLite)",
                "isRelational": true,
                "isWideColumn": false,
            })
        );

        let wide_column = app
            .oneshot(request("GET", "/api/database", Some("WIDE_COLUMN"), None))
            .await
            .unwrap();
        assert_eq!(
            json_body(wide_column).await,
            json!({
                "provider": "WIDE_COLUMN",
                "description": "Wide-column store (DynamoDB)",
                "isRelational": false,
                "isWideColumn": true,
                "wideColumnEnvironment": "LOCAL",
                "endpoint": "http://localhost:8000",
            })
        );
    }

    #[tokio::test]
    async fn test_subcategory_lifecycle_on_both_providers() {
        for provider in ["RELATIONAL", "WIDE_COLUMN"] {
            let (_, state) = AppState::for_tests(Provider::Relational).await;
            let app = create_app(state);
            let hint = Some(provider);

            let response = app
                .clone()
                .oneshot(request("POST", "/api/categories", hint, Some(json!({ "name": "Rust" }))))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            let category_id = json_body(response).await["id"].as_str().unwrap().to_string();

            let base = format!("/api/categories/{category_id}/subcategories");
            let response = app
                .clone()
                .oneshot(request(
                    "POST",
                    &base,
                    hint,
                    Some(json!({ "subcategoryId": "sub-1", "name": "Async", "description": "Futures" })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);

            let response = app
                .clone()
                .oneshot(request(
                    "PATCH",
                    &format!("{base}/sub-1"),
                    hint,
                    Some(json!({ "name": "Async Rust" })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let response = app
                .clone()
                .oneshot(request("GET", &base, hint, None))
                .await
                .unwrap();
            let listed = json_body(response).await;
            assert_eq!(listed.as_array().unwrap().len(), 1);
            assert_eq!(listed[0]["name"], "Async Rust");
            assert_eq!(listed[0]["slug"], "async");
            assert_eq!(listed[0]["description"], "Futures");
            assert_eq!(listed[0]["categoryId"], category_id.as_str());

            let response = app
                .clone()
                .oneshot(request("DELETE", &format!("{base}/sub-1"), hint, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);

            let response = app
                .oneshot(request("GET", &format!("{base}/sub-1"), hint, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_providers_are_isolated() {
        let (_, state) = AppState::for_tests(Provider::Relational).await;
        let app = create_app(state);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/authors",
                Some("WIDE_COLUMN"),
                Some(json!({ "name": "Ferris", "email": "ferris@example.com" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let author_id = json_body(response).await["id"].as_str().unwrap().to_string();

        let uri = format!("/api/authors/{author_id}");
        let response = app
            .clone()
            .oneshot(request("GET", &uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request("GET", &uri, Some("wide_column"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_post_publish_stamps_published_at() {
        let (_, state) = AppState::for_tests(Provider::WideColumn).await;
        let app = create_app(state);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/authors",
                None,
                Some(json!({ "name": "Ferris", "email": "ferris@example.com" })),
            ))
            .await
            .unwrap();
        let author_id = json_body(response).await["id"].as_str().unwrap().to_string();

        let posts = format!("/api/authors/{author_id}/posts");
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &posts,
                None,
                Some(json!({ "title": "Hello", "tags": ["rust"] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["status"], "draft");
        assert!(created["publishedAt"].is_null());
        let post_id = created["postId"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("{posts}/{post_id}"),
                None,
                Some(json!({ "status": "published", "tags": [] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json_body(response).await;
        assert_eq!(updated["status"], "published");
        assert!(updated["publishedAt"].is_string());
        assert_eq!(updated["tags"], json!([]));
        assert_eq!(updated["title"], "Hello");
    }

    #[tokio::test]
    async fn test_post_for_missing_author_is_404() {
        let (_, state) = AppState::for_tests(Provider::Relational).await;
        let app = create_app(state);

        let response = app
            .oneshot(request(
                "POST",
                "/api/authors/ghost/posts",
                None,
                Some(json!({ "title": "Hello" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_throttled_backend_returns_429() {
        let (backend, state) = AppState::for_tests(Provider::WideColumn).await;
        let app = create_app(state);
        backend.fail_next("ThrottlingException");

        let response = app
            .oneshot(request("GET", "/api/categories/cat-1", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }

    #[tokio::test]
    async fn test_category_pagination() {
        let (_, state) = AppState::for_tests(Provider::Relational).await;
        let app = create_app(state);
        for name in ["A", "B", "C"] {
            app.clone()
                .oneshot(request("POST", "/api/categories", None, Some(json!({ "name": name }))))
                .await
                .unwrap();
        }

        let response = app
            .clone()
            .oneshot(request("GET", "/api/categories?limit=2", None, None))
            .await
            .unwrap();
        let first = json_body(response).await;
        assert_eq!(first["items"].as_array().unwrap().len(), 2);
        let next = first["next"].as_str().unwrap();

        let response = app
            .oneshot(request("GET", &format!("/api/categories?limit=2&after={next}"), None, None))
            .await
            .unwrap();
        let second = json_body(response).await;
        assert_eq!(second["items"].as_array().unwrap().len(), 1);
        assert!(second.get("next").is_none());
    }

    async fn create_json(app: &Router, uri: &str, hint: Option<&str>, body: Value) -> Value {
        let response = app
            .clone()
            .oneshot(request("POST", uri, hint, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
        json_body(response).await
    }

    async fn status_of(app: &Router, method: &str, uri: &str, hint: Option<&str>, body: Option<Value>) -> StatusCode {
        app.clone()
            .oneshot(request(method, uri, hint, body))
            .await
            .unwrap()
            .status()
    }

    async fn new_author_post(app: &Router, hint: Option<&str>, email: &str) -> (String, String) {
        let author = create_json(
            app,
            "/api/authors",
            hint,
            json!({ "name": "Ferris", "email": email }),
        )
        .await;
        let author_id = author["id"].as_str().unwrap().to_string();
        let post = create_json(
            app,
            &format!("/api/authors/{author_id}/posts"),
            hint,
            json!({ "postId": "hello", "title": "Hello" }),
        )
        .await;
        (author_id, post["postId"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_404() {
        for provider in ["RELATIONAL", "WIDE_COLUMN"] {
            let (_, state) = AppState::for_tests(Provider::Relational).await;
            let app = create_app(state);
            let hint = Some(provider);
            let (author_id, _) = new_author_post(&app, hint, "a@example.com").await;

            let uri = format!("/api/authors/{author_id}/posts/nope/comments");
            let body = json!({ "authorName": "Reader", "content": "Hi" });

            assert_eq!(status_of(&app, "POST", &uri, hint, Some(body)).await, StatusCode::NOT_FOUND);
            assert_eq!(status_of(&app, "GET", &uri, hint, None).await, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_post_ids_are_generated_per_author() {
        for provider in ["RELATIONAL", "WIDE_COLUMN"] {
            let (_, state) = AppState::for_tests(Provider::Relational).await;
            let app = create_app(state);
            let hint = Some(provider);

            let (_, first) = new_author_post(&app, hint, "a@example.com").await;
            let (_, second) = new_author_post(&app, hint, "b@example.com").await;

            assert_ne!(first, "hello");
            assert_ne!(first, second, "{provider}");
        }
    }

    #[tokio::test]
    async fn test_comments_stay_with_their_post() {
        for provider in ["RELATIONAL", "WIDE_COLUMN"] {
            let (_, state) = AppState::for_tests(Provider::Relational).await;
            let app = create_app(state);
            let hint = Some(provider);
            let (author_a, post_a) = new_author_post(&app, hint, "a@example.com").await;
            let (author_b, post_b) = new_author_post(&app, hint, "b@example.com").await;

            let comments_a = format!("/api/authors/{author_a}/posts/{post_a}/comments");
            let comment = create_json(
                &app,
                &comments_a,
                hint,
                json!({ "authorName": "Reader", "content": "On A" }),
            )
            .await;
            let comment_id = comment["commentId"].as_str().unwrap();

            // Author B's path to author A's post does not exist.
            let crossed = format!("/api/authors/{author_b}/posts/{post_a}/comments");
            assert_eq!(status_of(&app, "GET", &crossed, hint, None).await, StatusCode::NOT_FOUND);
            assert_eq!(
                status_of(&app, "GET", &format!("{crossed}/{comment_id}"), hint, None).await,
                StatusCode::NOT_FOUND
            );

            let comments_b = format!("/api/authors/{author_b}/posts/{post_b}/comments");
            let response = app
                .clone()
                .oneshot(request("GET", &comments_b, hint, None))
                .await
                .unwrap();
            assert_eq!(json_body(response).await, json!([]), "{provider}");

            let response = app
                .clone()
                .oneshot(request("GET", &comments_a, hint, None))
                .await
                .unwrap();
            let listed = json_body(response).await;
            assert_eq!(listed.as_array().unwrap().len(), 1);
            assert_eq!(listed[0]["content"], "On A");
        }
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        for provider in ["RELATIONAL", "WIDE_COLUMN"] {
            let (_, state) = AppState::for_tests(Provider::Relational).await;
            let app = create_app(state);
            let hint = Some(provider);
            let (author_id, post_id) = new_author_post(&app, hint, "a@example.com").await;
            let base = format!("/api/authors/{author_id}/posts/{post_id}/comments");

            let created = create_json(
                &app,
                &base,
                hint,
                json!({ "authorName": "Reader", "content": "Nice" }),
            )
            .await;
            assert_eq!(created["approved"], false);
            let uri = format!("{base}/{}", created["commentId"].as_str().unwrap());

            let response = app
                .clone()
                .oneshot(request("PATCH", &uri, hint, Some(json!({ "approved": true }))))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let updated = json_body(response).await;
            assert_eq!(updated["approved"], true);
            assert_eq!(updated["content"], "Nice");

            assert_eq!(status_of(&app, "DELETE", &uri, hint, None).await, StatusCode::NO_CONTENT);
            assert_eq!(status_of(&app, "GET", &uri, hint, None).await, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        for provider in ["RELATIONAL", "WIDE_COLUMN"] {
            let (_, state) = AppState::for_tests(Provider::Relational).await;
            let app = create_app(state);
            let hint = Some(provider);

            let user = create_json(
                &app,
                "/api/users",
                hint,
                json!({
                    "username": "ferris",
                    "email": "ferris@example.com",
                    "name": "Ferris",
                    "socialLinks": { "github": "ferris" },
                }),
            )
            .await;
            assert_eq!(user["role"], "AUTHOR");
            assert_eq!(user["isActive"], true);
            let uri = format!("/api/users/{}", user["id"].as_str().unwrap());

            let response = app
                .clone()
                .oneshot(request(
                    "PATCH",
                    &uri,
                    hint,
                    Some(json!({ "role": "EDITOR", "bio": "Crab" })),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let updated = json_body(response).await;
            assert_eq!(updated["role"], "EDITOR");
            assert_eq!(updated["bio"], "Crab");
            assert_eq!(updated["socialLinks"], json!({ "github": "ferris" }));

            let response = app
                .clone()
                .oneshot(request("GET", "/api/users", hint, None))
                .await
                .unwrap();
            assert_eq!(json_body(response).await["items"].as_array().unwrap().len(), 1);

            assert_eq!(status_of(&app, "DELETE", &uri, hint, None).await, StatusCode::NO_CONTENT);
            assert_eq!(status_of(&app, "GET", &uri, hint, None).await, StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_notifications_read_all() {
        for provider in ["RELATIONAL", "WIDE_COLUMN"] {
            let (_, state) = AppState::for_tests(Provider::Relational).await;
            let app = create_app(state);
            let hint = Some(provider);

            let user = create_json(
                &app,
                "/api/users",
                hint,
                json!({ "username": "ferris", "email": "ferris@example.com", "name": "Ferris" }),
            )
            .await;
            let base = format!("/api/users/{}/notifications", user["id"].as_str().unwrap());

            let mut ids = Vec::new();
            for title in ["One", "Two", "Three"] {
                let created = create_json(
                    &app,
                    &base,
                    hint,
                    json!({ "type": "NEW_COMMENT", "title": title, "message": "Someone replied" }),
                )
                .await;
                assert_eq!(created["isRead"], false);
                ids.push(created["notificationId"].as_str().unwrap().to_string());
            }

            let response = app
                .clone()
                .oneshot(request(
                    "PATCH",
                    &format!("{base}/{}", ids[0]),
                    hint,
                    Some(json!({ "isRead": true })),
                ))
                .await
                .unwrap();
            assert_eq!(json_body(response).await["isRead"], true);

            let response = app
                .clone()
                .oneshot(request("GET", &format!("{base}?unreadOnly=true"), hint, None))
                .await
                .unwrap();
            assert_eq!(json_body(response).await.as_array().unwrap().len(), 2, "{provider}");

            let response = app
                .clone()
                .oneshot(request("POST", &format!("{base}/read-all"), hint, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await, json!({ "updated": 2 }));

            let response = app
                .clone()
                .oneshot(request("GET", &format!("{base}?unreadOnly=true"), hint, None))
                .await
                .unwrap();
            assert_eq!(json_body(response).await, json!([]));

            let response = app
                .clone()
                .oneshot(request("GET", &base, hint, None))
                .await
                .unwrap();
            assert_eq!(json_body(response).await.as_array().unwrap().len(), 3);
        }
    }

    #[tokio::test]
    async fn test_notification_for_missing_user_is_404() {
        let (_, state) = AppState::for_tests(Provider::WideColumn).await;
        let app = create_app(state);

        let status = status_of(
            &app,
            "POST",
            "/api/users/ghost/notifications",
            None,
            Some(json!({ "type": "SYSTEM", "title": "Hi", "message": "Welcome" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
