//! End-to-end checks of the session/gateway contract against a stub backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{DefaultBodyLimit, Multipart, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use memvault_core::auth::{self, Credential, ExpiryState, SessionStore};
use memvault_core::models::Mood;
use memvault_core::upload::{UploadFile, MAX_UPLOAD_BYTES};
use memvault_core::{ApiClient, ApiError, Gateway, Vault};

#[derive(Default)]
struct Stub {
    hits: AtomicUsize,
    google_accounts: Mutex<HashMap<String, String>>,
    uploads: Mutex<Vec<(String, String, usize)>>,
    notes: Mutex<Vec<Value>>,
    diaries: Mutex<Vec<Value>>,
}

type Shared = Arc<Stub>;

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "Token tidak valid" }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer tok-"))
        .unwrap_or(false)
}

async fn count_hits(State(stub): State<Shared>, req: Request, next: Next) -> Response {
    stub.hits.fetch_add(1, Ordering::SeqCst);
    next.run(req).await
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({
            "token": "tok-rina",
            "user": { "id": "u-1", "username": body["username"] }
        }))
        .into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "msg": "Password salah" }))).into_response()
    }
}

async fn google(State(stub): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let mut accounts = stub.google_accounts.lock().unwrap();
    let next_id = format!("g-{}", accounts.len() + 1);
    let id = accounts.entry(email).or_insert(next_id).clone();
    Json(json!({
        "token": format!("tok-{}", id),
        "user": { "id": id, "username": body["username"], "avatar": body["avatar"] }
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        (StatusCode::BAD_REQUEST, Json(json!({ "msg": "Username sudah dipakai" }))).into_response()
    } else {
        (StatusCode::CREATED, Json(json!({ "msg": "ok" }))).into_response()
    }
}

async fn reset_password(Path(token): Path<String>, Json(body): Json<Value>) -> Response {
    if token == "good-token" && body["newPassword"].is_string() {
        Json(json!({ "msg": "ok" })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "msg": "Link expired" }))).into_response()
    }
}

async fn list_files(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": [
        { "id": "f1", "originalName": "pantai.jpg", "filename": "1-pantai.jpg",
          "path": "uploads/1-pantai.jpg", "type": "PHOTO", "createdAt": "2024-05-01T10:00:00.000Z" },
        { "id": "f2", "originalName": "lagu.mp3", "filename": "2-lagu.mp3",
          "path": "uploads/2-lagu.mp3", "type": "AUDIO", "createdAt": "2024-05-02T10:00:00.000Z" }
    ]}))
    .into_response()
}

async fn upload(State(stub): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        stub.uploads.lock().unwrap().push((name, file_name, len));
    }
    (StatusCode::CREATED, Json(json!({ "msg": "ok" }))).into_response()
}

async fn file_detail(State(stub): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id != "f2" {
        return (StatusCode::NOT_FOUND, Json(json!({ "msg": "File tidak ditemukan" }))).into_response();
    }
    let notes = stub.notes.lock().unwrap().clone();
    Json(json!({ "data": {
        "id": "f2", "originalName": "lagu.mp3", "filename": "2-lagu.mp3", "type": "AUDIO",
        "memory": { "id": "m1", "content": "Lagu waktu SMA", "mood": "Nostalgia" },
        "notes": notes
    }}))
    .into_response()
}

async fn save_diary(State(stub): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    stub.diaries.lock().unwrap().push(body);
    Json(json!({ "msg": "ok" })).into_response()
}

async fn add_note(State(stub): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut notes = stub.notes.lock().unwrap();
    let id = format!("n{}", notes.len() + 1);
    notes.push(json!({ "id": id, "timestamp": body["timestamp"], "content": body["content"] }));
    Json(json!({ "msg": "ok" })).into_response()
}

async fn delete_note(State(stub): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    stub.notes.lock().unwrap().retain(|n| n["id"] != id.as_str());
    Json(json!({ "msg": "deleted" })).into_response()
}

async fn start_stub() -> (String, Shared) {
    let stub: Shared = Arc::new(Stub::default());
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/google", post(google))
        .route("/api/auth/register", post(register))
        .route("/api/auth/forgot-password", post(|| async { Json(json!({ "msg": "sent" })) }))
        .route("/api/auth/reset-password/{token}", post(reset_password))
        .route("/api/files", get(list_files).post(upload))
        .route("/api/memories", post(save_diary))
        .route("/api/memories/note", post(add_note))
        .route("/api/memories/note/{id}", delete(delete_note))
        .route("/api/memories/{id}", get(file_detail))
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(middleware::from_fn_with_state(stub.clone(), count_hits))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), stub)
}

fn vault_for(base: &str, store: &SessionStore) -> (ApiClient, Vault) {
    let api = ApiClient::new(base).unwrap();
    let vault = Vault::new(Gateway::new(api.clone()), store.clone());
    (api, vault)
}

#[tokio::test]
async fn test_signed_out_calls_never_reach_backend() {
    let (base, stub) = start_stub().await;
    let store = SessionStore::in_memory();
    let (_, vault) = vault_for(&base, &store);

    assert!(matches!(vault.list_files().await, Err(ApiError::Unauthenticated)));
    assert!(matches!(vault.fetch_file("f2").await, Err(ApiError::Unauthenticated)));
    assert!(matches!(
        vault.save_diary("f2", "x", Mood::Happy).await,
        Err(ApiError::Unauthenticated)
    ));
    assert!(matches!(vault.add_note("f2", 1.0, "hi").await, Err(ApiError::Unauthenticated)));
    assert!(matches!(vault.delete_note("n1").await, Err(ApiError::Unauthenticated)));
    let small = UploadFile::from_bytes("a.jpg", vec![1, 2, 3]).unwrap();
    assert!(matches!(vault.upload_file(small).await, Err(ApiError::Unauthenticated)));

    assert_eq!(stub.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_password_exchange_populates_store() {
    let (base, stub) = start_stub().await;
    let store = SessionStore::in_memory();
    let (api, _) = vault_for(&base, &store);

    let session = auth::sign_in(&api, &store, Credential::password("rina", "secret"))
        .await
        .unwrap();
    assert_eq!(session.token, "tok-rina");

    let held = store.get().unwrap();
    assert_eq!(held.token, "tok-rina");
    assert_eq!(held.user_id, "u-1");
    assert_eq!(held.display_name, "rina");
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let (base, stub) = start_stub().await;
    let api = ApiClient::new(&base).unwrap();

    let err = auth::exchange(&api, Credential::password("rina", "nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials));
    // exactly one attempt, no retries
    assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_external_identity_exchange_is_idempotent() {
    let (base, stub) = start_stub().await;
    let api = ApiClient::new(&base).unwrap();

    let first = auth::exchange(
        &api,
        Credential::external("rina@example.com", "Rina", Some("https://lh3.googleusercontent.com/a".into())),
    )
    .await
    .unwrap();
    let second = auth::exchange(&api, Credential::external("rina@example.com", "Rina A.", None))
        .await
        .unwrap();

    assert_eq!(first.user_id, second.user_id);
    assert_eq!(second.display_name, "Rina A.");
    assert_eq!(stub.google_accounts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_network_failure_when_backend_down() {
    // Bind then drop a listener to get a port nobody is serving
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = ApiClient::new(&format!("http://{}", addr)).unwrap();
    let err = auth::exchange(&api, Credential::password("rina", "secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NetworkFailure(_)));
}

#[tokio::test]
async fn test_rejected_token_is_unauthenticated() {
    let (base, _stub) = start_stub().await;
    let store = SessionStore::in_memory();
    let (_, vault) = vault_for(&base, &store);

    store
        .set(auth::Session::new("u-1".into(), "rina".into(), "expired".into()))
        .unwrap();
    let err = vault.list_files().await.unwrap_err();
    assert!(err.is_unauthenticated());
    // the gateway reports; clearing is the caller's job
    assert!(store.get().is_some());
    auth::sign_out(&store).unwrap();
    assert!(store.get().is_none());
}

#[tokio::test]
async fn test_vault_operations_round_trip() {
    let (base, stub) = start_stub().await;
    let store = SessionStore::in_memory();
    let (api, vault) = vault_for(&base, &store);
    auth::sign_in(&api, &store, Credential::password("rina", "secret"))
        .await
        .unwrap();

    let files = vault.list_files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(store.get().unwrap().expiry, ExpiryState::Verified);

    vault.add_note("f2", 5.9, "reff").await.unwrap();
    vault.add_note("f2", 2.2, "intro").await.unwrap();
    let detail = vault.fetch_file("f2").await.unwrap();
    let timestamps: Vec<f64> = detail.notes.iter().map(|n| n.timestamp).collect();
    assert_eq!(timestamps, vec![5.0, 2.0]);
    assert_eq!(detail.memory.as_ref().unwrap().mood, Mood::Nostalgia);

    vault.delete_note("n1").await.unwrap();
    let detail = vault.fetch_file("f2").await.unwrap();
    assert_eq!(detail.notes.len(), 1);
    assert_eq!(detail.notes[0].content, "intro");

    vault.save_diary("f2", "Lagu waktu SMA", Mood::Excited).await.unwrap();
    let diaries = stub.diaries.lock().unwrap().clone();
    assert_eq!(diaries[0]["fileId"], "f2");
    assert_eq!(diaries[0]["mood"], "Excited");

    match vault.fetch_file("missing").await {
        Err(ApiError::ServerError { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "File tidak ditemukan");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_upload_size_limit_and_field_name() {
    let (base, stub) = start_stub().await;
    let store = SessionStore::in_memory();
    let (api, vault) = vault_for(&base, &store);
    auth::sign_in(&api, &store, Credential::password("rina", "secret"))
        .await
        .unwrap();
    let hits_after_login = stub.hits.load(Ordering::SeqCst);

    let oversized = UploadFile {
        file_name: "big.wav".into(),
        mime: "audio/wav",
        bytes: vec![0u8; MAX_UPLOAD_BYTES as usize + 1],
    };
    assert!(matches!(
        vault.upload_file(oversized).await,
        Err(ApiError::ValidationFailure(_))
    ));
    assert_eq!(stub.hits.load(Ordering::SeqCst), hits_after_login);

    let exact = UploadFile::from_bytes("exact.wav", vec![0u8; MAX_UPLOAD_BYTES as usize]).unwrap();
    vault.upload_file(exact).await.unwrap();

    let uploads = stub.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "file");
    assert_eq!(uploads[0].1, "exact.wav");
    assert_eq!(uploads[0].2, MAX_UPLOAD_BYTES as usize);
}

#[tokio::test]
async fn test_account_maintenance() {
    let (base, _stub) = start_stub().await;
    let api = ApiClient::new(&base).unwrap();

    api.register("budi", None, "pw").await.unwrap();
    match api.register("taken", Some("t@example.com"), "pw").await {
        Err(ApiError::ServerError { message, .. }) => assert_eq!(message, "Username sudah dipakai"),
        other => panic!("unexpected result: {other:?}"),
    }

    api.forgot_password("rina@example.com").await.unwrap();
    api.reset_password("good-token", "new-pw").await.unwrap();
    match api.reset_password("stale", "new-pw").await {
        Err(ApiError::ServerError { message, .. }) => assert_eq!(message, "Link expired"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        api.reset_password("", "new-pw").await,
        Err(ApiError::ValidationFailure(_))
    ));
}
