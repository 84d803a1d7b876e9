use std::net::SocketAddr;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::state::AppState;
use crate::{auth, children, folders, notes};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(children::router())
        .merge(folders::router())
        .merge(notes::router())
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "NoteNext API is running" }))
}

async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.store.ping().await?;
    Ok("ok")
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bearer, call, Family};
    use axum::http::{Method, StatusCode};

    async fn setup() -> (Router, AppState, Family) {
        let state = AppState::fake();
        let family = Family::create(state.store.as_ref()).await;
        (build_app(state.clone()), state, family)
    }

    #[tokio::test]
    async fn root_and_health_respond() {
        let (app, _, _) = setup().await;
        let (status, body) = call(&app, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "NoteNext API is running");

        let (status, _) = call(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn signup_login_and_me() {
        let (app, _, _) = setup().await;
        let (status, user) = call(
            &app,
            Method::POST,
            "/signup",
            None,
            Some(json!({"username": "priya", "password": "password123", "role": "parent", "email": "priya@email.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["role"], "parent");
        assert!(user.get("password_hash").is_none());

        let (status, login) = call(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({"username": "priya", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login["user"]["username"], "priya");
        assert_eq!(login["user"]["role"], "parent");
        assert_eq!(login["token_type"], "bearer");

        let token = format!("Bearer {}", login["access_token"].as_str().unwrap());
        let (status, me) = call(&app, Method::GET, "/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], user["id"]);

        let (status, child) = call(
            &app,
            Method::POST,
            "/signup",
            Some(&token),
            Some(json!({"username": "rohit", "password": "password123", "role": "child"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(child["parent_id"], user["id"]);

        let (status, kids) = call(&app, Method::GET, "/children", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(kids, json!([{"id": child["id"], "username": "rohit"}]));
    }

    #[tokio::test]
    async fn login_failures_look_identical() {
        let (app, _, _) = setup().await;
        call(
            &app,
            Method::POST,
            "/signup",
            None,
            Some(json!({"username": "alice", "password": "password123", "role": "parent", "email": "alice@example.com"})),
        )
        .await;

        let wrong = call(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({"username": "alice", "password": "wrong"})),
        )
        .await;
        let unknown = call(
            &app,
            Method::POST,
            "/login",
            None,
            Some(json!({"username": "nonexistent", "password": "x"})),
        )
        .await;
        assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.1["error"], "invalid_credentials");
    }

    #[tokio::test]
    async fn child_signup_without_parent_bearer_is_rejected() {
        let (app, state, family) = setup().await;
        let body = json!({"username": "sneaky", "password": "password123", "role": "child"});

        let (status, err) = call(&app, Method::POST, "/signup", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(err["error"], "unauthorized");

        let kid = bearer(&state, &family.kid_a);
        let (status, _) = call(&app, Method::POST, "/signup", Some(&kid), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, err) = call(
            &app,
            Method::POST,
            "/signup",
            None,
            Some(json!({"username": "x", "password": "password123", "role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "invalid_role");
    }

    #[tokio::test]
    async fn malformed_requests_get_structured_errors() {
        let (app, state, family) = setup().await;
        let kid = bearer(&state, &family.kid_a);

        let (status, err) = call(
            &app,
            Method::POST,
            "/signup",
            None,
            Some(json!({"username": "x", "password": "password123"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "invalid_role");

        let (status, err) = call(
            &app,
            Method::POST,
            "/notes",
            Some(&kid),
            Some(json!({"content": "no title"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "validation");
        assert!(err["detail"].as_str().unwrap().contains("title"));

        let (status, err) = call(&app, Method::DELETE, "/notes/not-a-uuid", Some(&kid), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "validation");

        let (status, err) = call(&app, Method::GET, "/notes?is_todo=maybe", Some(&kid), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "validation");

        let (status, err) = call(
            &app,
            Method::POST,
            "/folders",
            Some(&kid),
            Some(json!({"title": "wrong field"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"], "validation");
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let (app, _, _) = setup().await;
        for uri in ["/children", "/folders", "/notes", "/me"] {
            let (status, _) = call(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }
        let (status, _) = call(&app, Method::GET, "/notes", Some("Bearer nope"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn note_round_trip_and_double_delete() {
        let (app, state, family) = setup().await;
        let kid = bearer(&state, &family.kid_a);

        let (status, created) = call(
            &app,
            Method::POST,
            "/notes",
            Some(&kid),
            Some(json!({"title": "Homework", "content": "Math p.12", "tags": "math", "is_todo": true, "folder_id": null})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) = call(&app, Method::GET, "/notes", Some(&kid), None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        let note = &list[0];
        assert_eq!(note["id"], created["id"]);
        assert_eq!(note["title"], "Homework");
        assert_eq!(note["content"], "Math p.12");
        assert_eq!(note["tags"], "math");
        assert_eq!(note["is_todo"], true);
        assert_eq!(note["folder_id"], Value::Null);

        let uri = format!("/notes/{}", created["id"].as_str().unwrap());
        let (status, _) = call(&app, Method::DELETE, &uri, Some(&kid), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, err) = call(&app, Method::DELETE, &uri, Some(&kid), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["error"], "not_found");
    }

    #[tokio::test]
    async fn parent_reads_child_notes_with_explicit_child_id() {
        let (app, state, family) = setup().await;
        let kid = bearer(&state, &family.kid_a);
        let mom = bearer(&state, &family.parent);

        call(
            &app,
            Method::POST,
            "/notes",
            Some(&kid),
            Some(json!({"title": "Gift List", "content": "Buy gifts", "tags": "family"})),
        )
        .await;

        let (status, _) = call(&app, Method::GET, "/notes", Some(&mom), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/notes?child_id={}", family.kid_a.user_id);
        let (status, notes) = call(&app, Method::GET, &uri, Some(&mom), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(notes.as_array().unwrap().len(), 1);

        let stranger = uuid::Uuid::new_v4();
        let uri = format!("/notes?child_id={stranger}");
        let (status, err) = call(&app, Method::GET, &uri, Some(&mom), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(err["error"], "forbidden");

        let (status, _) = call(
            &app,
            Method::POST,
            "/notes",
            Some(&mom),
            Some(json!({"title": "From mom", "content": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn folders_flow_and_foreign_folder_reference() {
        let (app, state, family) = setup().await;
        let a = bearer(&state, &family.kid_a);
        let b = bearer(&state, &family.kid_b);

        let (status, folder) = call(&app, Method::POST, "/folders", Some(&a), Some(json!({"name": "School"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = call(&app, Method::POST, "/folders", Some(&a), Some(json!({"name": "School"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, mine) = call(&app, Method::GET, "/folders", Some(&a), None).await;
        assert_eq!(mine, json!([{"id": folder["id"], "name": "School"}]));
        let (_, theirs) = call(&app, Method::GET, "/folders", Some(&b), None).await;
        assert_eq!(theirs, json!([]));

        let (status, err) = call(
            &app,
            Method::POST,
            "/notes",
            Some(&b),
            Some(json!({"title": "Sneaky", "content": "", "folder_id": folder["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err["error"], "invalid_reference");

        let (status, note) = call(
            &app,
            Method::POST,
            "/notes",
            Some(&a),
            Some(json!({"title": "Essay", "content": "draft", "folder_id": folder["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/notes?folder_id={}", folder["id"].as_str().unwrap());
        let (status, _) = call(&app, Method::GET, &uri, Some(&b), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let folder_uri = format!("/folders/{}", folder["id"].as_str().unwrap());
        let (status, _) = call(&app, Method::DELETE, &folder_uri, Some(&b), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app, Method::DELETE, &folder_uri, Some(&a), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, notes) = call(&app, Method::GET, "/notes", Some(&a), None).await;
        assert_eq!(notes[0]["id"], note["id"]);
        assert_eq!(notes[0]["folder_id"], Value::Null);
    }

    #[tokio::test]
    async fn owner_updates_note_and_filters_todos() {
        let (app, state, family) = setup().await;
        let a = bearer(&state, &family.kid_a);
        let b = bearer(&state, &family.kid_b);

        let (_, todo) = call(
            &app,
            Method::POST,
            "/notes",
            Some(&a),
            Some(json!({"title": "Chores", "content": "", "is_todo": true})),
        )
        .await;
        call(
            &app,
            Method::POST,
            "/notes",
            Some(&a),
            Some(json!({"title": "Diary", "content": "today"})),
        )
        .await;

        let (_, todos) = call(&app, Method::GET, "/notes?is_todo=true", Some(&a), None).await;
        assert_eq!(todos.as_array().unwrap().len(), 1);
        assert_eq!(todos[0]["title"], "Chores");

        let uri = format!("/notes/{}", todo["id"].as_str().unwrap());
        let (status, _) = call(&app, Method::PUT, &uri, Some(&b), Some(json!({"is_completed": true}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = call(&app, Method::PUT, &uri, Some(&a), Some(json!({"is_completed": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["is_completed"], true);
        assert_eq!(updated["title"], "Chores");
    }
}
