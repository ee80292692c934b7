use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AddressBookEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddressBook {
    pub user_id: String,
    pub source: Source,
    pub entries: Vec<AddressBookEntry>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InviteeType {
    Email,
    Phone,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InviteSent {
    pub user_id: String,
    pub invitee_id: String,
    pub invitee_type: InviteeType,
    pub sent_at: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InviteAccepted {
    pub user_id: String,
    pub invitee_id: String,
    pub invitee_type: InviteeType,
    pub accepted_at: Option<String>,
    pub new_user_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entries<T> {
    pub entries: Vec<T>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientKey {
    pub user_id: String,
    pub client_key: String,
}

/// Acknowledgement returned by every write endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ack {
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Store {
    pub address_books: HashMap<String, AddressBook>,
    pub client_keys: HashMap<String, String>,
    pub users: Vec<User>,
    pub invites_sent: Vec<InviteSent>,
    pub invites_accepted: Vec<InviteAccepted>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    secret_key: Arc<str>,
    db: Db,
}

/// Router serving the API under `/v0`. Every route requires
/// `Authorization: Bearer <secret_key>`.
pub fn app(secret_key: &str) -> Router {
    let state = AppState {
        secret_key: Arc::from(secret_key),
        db: Db::default(),
    };
    let api = Router::new()
        .route("/test", get(auth_test))
        .route("/address-book", post(post_address_book))
        .route("/address-book/{user_id}", get(get_address_book))
        .route("/client-key/{user_id}", get(get_client_key))
        .route("/invite/sent", post(post_invites_sent))
        .route("/invite/accepted", post(post_invites_accepted))
        .route("/users", get(get_users).post(post_users))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state);
    Router::new().nest("/v0", api)
}

pub async fn run(listener: TcpListener, secret_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(secret_key)).await
}

async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected = format!("Bearer {}", state.secret_key);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        warn!(path = %request.uri().path(), "rejected request with invalid bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

async fn auth_test() -> Json<Message> {
    Json(Message {
        message: "authenticated".to_string(),
    })
}

async fn get_address_book(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AddressBook>, StatusCode> {
    let store = state.db.read().await;
    store
        .address_books
        .get(&user_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn post_address_book(
    State(state): State<AppState>,
    Json(upload): Json<AddressBook>,
) -> (StatusCode, Json<Ack>) {
    let count = upload.entries.len();
    info!(user_id = %upload.user_id, count, "stored address book");
    state
        .db
        .write()
        .await
        .address_books
        .insert(upload.user_id.clone(), upload);
    (StatusCode::CREATED, Json(Ack { count }))
}

async fn get_client_key(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<ClientKey> {
    let mut store = state.db.write().await;
    let client_key = store
        .client_keys
        .entry(user_id.clone())
        .or_insert_with(|| Uuid::new_v4().to_string())
        .clone();
    Json(ClientKey {
        user_id,
        client_key,
    })
}

async fn post_invites_sent(
    State(state): State<AppState>,
    Json(input): Json<Entries<InviteSent>>,
) -> (StatusCode, Json<Ack>) {
    let count = input.entries.len();
    info!(count, "recorded sent invites");
    state.db.write().await.invites_sent.extend(input.entries);
    (StatusCode::CREATED, Json(Ack { count }))
}

async fn post_invites_accepted(
    State(state): State<AppState>,
    Json(input): Json<Entries<InviteAccepted>>,
) -> (StatusCode, Json<Ack>) {
    let count = input.entries.len();
    info!(count, "recorded accepted invites");
    state.db.write().await.invites_accepted.extend(input.entries);
    (StatusCode::CREATED, Json(Ack { count }))
}

async fn get_users(State(state): State<AppState>) -> Json<Entries<User>> {
    let store = state.db.read().await;
    Json(Entries {
        entries: store.users.clone(),
    })
}

/// Upsert by `user_id`.
async fn post_users(
    State(state): State<AppState>,
    Json(input): Json<Entries<User>>,
) -> (StatusCode, Json<Ack>) {
    let count = input.entries.len();
    let mut store = state.db.write().await;
    for user in input.entries {
        match store.users.iter().position(|u| u.user_id == user.user_id) {
            Some(index) => store.users[index] = user,
            None => store.users.push(user),
        }
    }
    info!(count, total = store.users.len(), "stored users");
    (StatusCode::CREATED, Json(Ack { count }))
}
