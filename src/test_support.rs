//! Fixtures shared by unit tests.

use axum::{
    body::Body,
    extract::FromRef,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{jwt::JwtKeys, repo_types::NewUser, AuthUser, Role};
use crate::state::AppState;
use crate::store::Store;

// Never verified: fixture users only authenticate through minted tokens.
const FIXTURE_HASH: &str = "fixture-hash";

pub async fn parent(store: &dyn Store, username: &str) -> AuthUser {
    let user = store
        .create_user(NewUser {
            username: username.into(),
            password_hash: FIXTURE_HASH.into(),
            role: Role::Parent,
            email: Some(format!("{username}@example.com")),
            parent_id: None,
        })
        .await
        .expect("create parent");
    AuthUser {
        user_id: user.id,
        role: Role::Parent,
    }
}

pub async fn child(store: &dyn Store, username: &str, parent: &AuthUser) -> AuthUser {
    let user = store
        .create_user(NewUser {
            username: username.into(),
            password_hash: FIXTURE_HASH.into(),
            role: Role::Child,
            email: None,
            parent_id: Some(parent.user_id),
        })
        .await
        .expect("create child");
    AuthUser {
        user_id: user.id,
        role: Role::Child,
    }
}

/// One parent with two children.
pub struct Family {
    pub parent: AuthUser,
    pub kid_a: AuthUser,
    pub kid_b: AuthUser,
}

impl Family {
    pub async fn create(store: &dyn Store) -> Self {
        let parent = parent(store, "mom").await;
        let kid_a = child(store, "arun", &parent).await;
        let kid_b = child(store, "kavita", &parent).await;
        Self { parent, kid_a, kid_b }
    }
}

pub fn bearer(state: &AppState, user: &AuthUser) -> String {
    let token = JwtKeys::from_ref(state)
        .sign_access(user.user_id, user.role)
        .expect("sign access");
    format!("Bearer {token}")
}

/// Send one request through the router; returns status and JSON body (Null if empty).
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        req = req.header(header::AUTHORIZATION, auth);
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("build request");

    let resp = app.clone().oneshot(req).await.expect("router is infallible");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}
