// Mock REST API shared between the integration tests and the mock-api binary

use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

const POST_COUNT: u32 = 100;
const USER_COUNT: u32 = 10;

/// Request counters keyed by route, so tests can assert on retries
#[derive(Clone, Default)]
pub struct AppState {
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

#[allow(dead_code)]
impl AppState {
    pub async fn hits(&self, key: &str) -> usize {
        self.hits.lock().await.get(key).copied().unwrap_or(0)
    }

    /// Count a hit and return the new total
    async fn hit(&self, key: String) -> usize {
        let mut hits = self.hits.lock().await;
        let count = hits.entry(key).or_insert(0);
        *count += 1;
        *count
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        // JSONPlaceholder-style resources
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post)
                .put(update_post)
                .patch(patch_post)
                .delete(delete_post),
        )
        .route("/posts/:id/comments", get(post_comments))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/", get(user_profile))
        .route("/users/:id/posts", get(user_posts))
        // Pinterest-style search
        .route("/search/pins/", get(search_pins))
        // Failure modes
        .route("/status/:code", get(fixed_status).post(fixed_status))
        .route("/flaky/:failures", get(flaky))
        .route("/retry-after", get(retry_after))
        .route("/text", get(plain_text))
        .route("/empty", get(empty_body))
        .route("/slow/:ms", get(slow).post(slow))
        .route("/headers", get(echo_headers))
        // Downloads
        .route("/files/:size", get(file))
        .route("/broken-file", get(broken_file))
        .route("/trickle/:chunks/:gap_ms", get(trickle))
        .with_state(state)
}

/// Deterministic file content of `size` bytes
#[allow(dead_code)]
pub fn file_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

fn post_json(id: u32) -> Value {
    json!({
        "userId": (id - 1) / 10 + 1,
        "id": id,
        "title": format!("post title {}", id),
        "body": format!("post body {}", id),
    })
}

fn user_json(id: u32) -> Value {
    json!({
        "id": id,
        "name": format!("User {}", id),
        "username": format!("user{}", id),
        "email": format!("user{}@example.com", id),
    })
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
}

async fn list_posts() -> Json<Value> {
    Json(Value::Array((1..=POST_COUNT).map(post_json).collect()))
}

async fn get_post(Path(id): Path<u32>) -> Response {
    if (1..=POST_COUNT).contains(&id) {
        Json(post_json(id)).into_response()
    } else {
        not_found()
    }
}

async fn create_post(Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(POST_COUNT + 1);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_post(Path(id): Path<u32>, Json(mut body): Json<Value>) -> Response {
    if !(1..=POST_COUNT).contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response();
    }
    body["id"] = json!(id);
    Json(body).into_response()
}

async fn patch_post(Path(id): Path<u32>, Json(fields): Json<Value>) -> Response {
    if !(1..=POST_COUNT).contains(&id) {
        return not_found();
    }
    let mut post = post_json(id);
    if let (Some(post), Some(fields)) = (post.as_object_mut(), fields.as_object()) {
        for (k, v) in fields {
            post.insert(k.clone(), v.clone());
        }
    }
    Json(post).into_response()
}

async fn delete_post(Path(_id): Path<u32>) -> Json<Value> {
    Json(json!({}))
}

async fn post_comments(Path(id): Path<u32>) -> Json<Value> {
    let comments = (1..=5)
        .map(|n| {
            json!({
                "postId": id,
                "id": (id - 1) * 5 + n,
                "email": format!("commenter{}@example.com", n),
                "body": "comment body",
            })
        })
        .collect();
    Json(Value::Array(comments))
}

async fn list_users() -> Json<Value> {
    Json(Value::Array((1..=USER_COUNT).map(user_json).collect()))
}

async fn get_user(Path(id): Path<u32>) -> Response {
    if (1..=USER_COUNT).contains(&id) {
        Json(user_json(id)).into_response()
    } else {
        not_found()
    }
}

async fn user_posts(Path(id): Path<u32>) -> Json<Value> {
    let posts = (1..=POST_COUNT)
        .map(post_json)
        .filter(|p| p["userId"] == json!(id))
        .collect();
    Json(Value::Array(posts))
}

async fn user_profile(Path(username): Path<String>) -> Json<Value> {
    Json(json!({ "username": username, "follower_count": 42 }))
}

async fn search_pins(Query(query): Query<SearchQuery>) -> Json<Value> {
    let q = query.q.unwrap_or_default();
    Json(json!({
        "query": q,
        "results": [
            { "id": "1", "title": format!("{} one", q) },
            { "id": "2", "title": format!("{} two", q) },
        ],
    }))
}

async fn fixed_status(State(state): State<AppState>, Path(code): Path<u16>) -> Response {
    state.hit(format!("/status/{}", code)).await;
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({ "status": code }))).into_response()
}

/// Fails with 503 for the first `failures` requests, then succeeds
async fn flaky(State(state): State<AppState>, Path(failures): Path<usize>) -> Response {
    let hit = state.hit(format!("/flaky/{}", failures)).await;
    if hit <= failures {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "attempt": hit }))).into_response()
    } else {
        Json(json!({ "attempt": hit })).into_response()
    }
}

/// 429 with `Retry-After: 1` on the first request
async fn retry_after(State(state): State<AppState>) -> Response {
    let hit = state.hit("/retry-after".to_string()).await;
    if hit == 1 {
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "1")],
            Json(json!({})),
        )
            .into_response()
    } else {
        Json(json!({ "attempt": hit })).into_response()
    }
}

async fn plain_text() -> Response {
    (
        [(header::CONTENT_TYPE, "text/html")],
        format!("<html><body>{}</body></html>", "maintenance ".repeat(100)),
    )
        .into_response()
}

async fn empty_body() -> StatusCode {
    StatusCode::OK
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
    Json(json!({ "slept_ms": ms }))
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let map: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), json!(v))))
        .collect();
    Json(Value::Object(map))
}

async fn file(Path(size): Path<usize>) -> Response {
    (
        [(header::CONTENT_TYPE, "image/jpeg")],
        file_bytes(size),
    )
        .into_response()
}

/// Sends one chunk, then fails the stream
async fn broken_file() -> Response {
    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
        Ok(file_bytes(4096)),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset mid-transfer",
        )),
    ];
    Response::builder()
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Sends `chunks` chunks of 2 KiB, each after a `gap_ms` pause
async fn trickle(Path((chunks, gap_ms)): Path<(usize, u64)>) -> Response {
    let stream = futures::stream::unfold(0usize, move |sent| async move {
        if sent == chunks {
            return None;
        }
        tokio::time::sleep(std::time::Duration::from_millis(gap_ms)).await;
        Some((Ok::<_, std::io::Error>(file_bytes(2048)), sent + 1))
    });
    Response::builder()
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
