#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use useradmin::api::ApiClient;
use useradmin::guard::{Navigator, Route};
use useradmin::records::RecordsManager;
use useradmin::session::{MemoryStorage, SessionStore};
use useradmin::User;

pub const EMAIL: &str = "a@b.com";
pub const PASSWORD: &str = "secret1";
pub const TOKEN: &str = "T1";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    Bare,
    Wrapped,
    Unexpected,
    // 200 with an HTML page, as a misconfigured proxy would send
    Html,
}

struct BackendState {
    users: Vec<User>,
    passwords: HashMap<u64, String>,
    next_id: u64,
    requests: Vec<Recorded>,
    list_shape: ListShape,
    force_unauthorized: bool,
    soft_login_failure: bool,
    users_failure: Option<(u16, Value)>,
}

/// In-process stand-in for the REST backend, listening on a free port
pub struct MockBackend {
    pub base_url: String,
    state: Arc<Mutex<BackendState>>,
}

impl MockBackend {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = Arc::new(Mutex::new(BackendState {
            users: Vec::new(),
            passwords: HashMap::new(),
            next_id: 1,
            requests: Vec::new(),
            list_shape: ListShape::Bare,
            force_unauthorized: false,
            soft_login_failure: false,
            users_failure: None,
        }));

        let app = Router::new().fallback(dispatch).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url, state })
    }

    pub fn seed_user(&self, name: &str, email: &str, password: &str) -> u64 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.users.push(User { id, name: name.into(), email: email.into() });
        state.passwords.insert(id, password.into());
        id
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path.starts_with(prefix)).collect()
    }

    pub fn password_of(&self, id: u64) -> Option<String> {
        self.state.lock().unwrap().passwords.get(&id).cloned()
    }

    pub fn set_list_shape(&self, shape: ListShape) {
        self.state.lock().unwrap().list_shape = shape;
    }

    pub fn set_force_unauthorized(&self, on: bool) {
        self.state.lock().unwrap().force_unauthorized = on;
    }

    pub fn set_soft_login_failure(&self, on: bool) {
        self.state.lock().unwrap().soft_login_failure = on;
    }

    pub fn fail_users_with(&self, status: u16, body: Value) {
        self.state.lock().unwrap().users_failure = Some((status, body));
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn dispatch(
    State(state): State<Arc<Mutex<BackendState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut state = state.lock().unwrap();
    state.requests.push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if path == "/login" && method == Method::POST {
        let ok = body["email"] == EMAIL && body["password"] == PASSWORD;
        if ok {
            return reply(StatusCode::OK, json!({
                "success": true,
                "token": TOKEN,
                "user": {"id": 1, "name": "A", "email": EMAIL},
                "message": "Login successful"
            }));
        }
        if state.soft_login_failure {
            return reply(StatusCode::OK, json!({"success": false, "message": "Wrong password"}));
        }
        return reply(StatusCode::UNAUTHORIZED, json!({"success": false, "message": "Invalid credentials"}));
    }

    if path == "/register" && method == Method::POST {
        let email = body["email"].as_str().unwrap_or_default().to_string();
        if state.users.iter().any(|u| u.email == email) {
            return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({
                "message": "The given data was invalid.",
                "errors": {"email": ["The email has already been taken."]}
            }));
        }
        let id = state.next_id;
        state.next_id += 1;
        let name = body["name"].as_str().unwrap_or_default().to_string();
        state.users.push(User { id, name, email });
        return reply(StatusCode::CREATED, json!({"message": "User registered"}));
    }

    if !path.starts_with("/v1/users") {
        return reply(StatusCode::NOT_FOUND, json!({"message": "Not Found"}));
    }

    let expected = format!("Bearer {}", TOKEN);
    if state.force_unauthorized || authorization.as_deref() != Some(expected.as_str()) {
        return reply(StatusCode::UNAUTHORIZED, json!({"message": "Unauthenticated."}));
    }
    if let Some((status, failure)) = state.users_failure.clone() {
        return reply(StatusCode::from_u16(status).unwrap(), failure);
    }

    let id: Option<u64> = path.strip_prefix("/v1/users/").and_then(|s| s.parse().ok());

    match (method, id) {
        (Method::GET, None) => {
            let users = json!(state.users);
            match state.list_shape {
                ListShape::Bare => reply(StatusCode::OK, users),
                ListShape::Wrapped => reply(StatusCode::OK, json!({"data": users})),
                ListShape::Unexpected => reply(StatusCode::OK, json!({"users": users})),
                ListShape::Html => (
                    StatusCode::OK,
                    [(axum::http::header::CONTENT_TYPE, "text/html")],
                    "<html><body>Gateway</body></html>",
                )
                    .into_response(),
            }
        }
        (Method::POST, None) => {
            let email = body["email"].as_str().unwrap_or_default().to_string();
            if state.users.iter().any(|u| u.email == email) {
                return reply(StatusCode::UNPROCESSABLE_ENTITY, json!({
                    "message": "The given data was invalid.",
                    "errors": {"email": ["The email has already been taken.", "Second message"]}
                }));
            }
            let id = state.next_id;
            state.next_id += 1;
            let user = User {
                id,
                name: body["name"].as_str().unwrap_or_default().to_string(),
                email,
            };
            state.users.push(user.clone());
            let password = body["password"].as_str().unwrap_or_default().to_string();
            state.passwords.insert(id, password);
            reply(StatusCode::CREATED, json!(user))
        }
        (Method::PUT, Some(id)) => {
            let new_password = body.get("password").and_then(Value::as_str).map(str::to_string);
            let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
                return reply(StatusCode::NOT_FOUND, json!({"message": "User not found"}));
            };
            if let Some(name) = body["name"].as_str() {
                user.name = name.to_string();
            }
            if let Some(email) = body["email"].as_str() {
                user.email = email.to_string();
            }
            let updated = user.clone();
            if let Some(password) = new_password {
                state.passwords.insert(id, password);
            }
            reply(StatusCode::OK, json!(updated))
        }
        (Method::DELETE, Some(id)) => {
            let before = state.users.len();
            state.users.retain(|u| u.id != id);
            if state.users.len() == before {
                return reply(StatusCode::NOT_FOUND, json!({"message": "User not found"}));
            }
            state.passwords.remove(&id);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => reply(StatusCode::METHOD_NOT_ALLOWED, json!({"error": "Method not allowed"})),
    }
}

/// Records every redirect instead of acting on it
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<Route> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, route: Route) {
        self.redirects.lock().unwrap().push(route);
    }
}

pub struct Harness {
    pub backend: MockBackend,
    pub storage: Arc<MemoryStorage>,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub records: RecordsManager,
}

impl Harness {
    pub async fn start() -> Result<Self> {
        let backend = MockBackend::start().await?;
        let storage = Arc::new(MemoryStorage::new());
        let client = ApiClient::new(&backend.base_url)?;
        let session = Arc::new(SessionStore::new(client, storage.clone()));
        let navigator = Arc::new(RecordingNavigator::default());
        let records = RecordsManager::new(session.clone(), navigator.clone());

        Ok(Self { backend, storage, session, navigator, records })
    }

    pub async fn logged_in() -> Result<Self> {
        let harness = Self::start().await?;
        harness.session.login(EMAIL, PASSWORD).await?;
        Ok(harness)
    }
}

/// A base URL nothing is listening on
pub fn unreachable_url() -> String {
    let port = portpicker::pick_unused_port().expect("free port");
    format!("http://127.0.0.1:{}", port)
}
