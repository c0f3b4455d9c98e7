//! In-process mock of the FileMaker Data API.
//!
//! Records every request so tests can count session creations/closes and
//! inspect bodies. Stores records per layout and answers finds with simple
//! `==value` equality matching.

#![allow(dead_code)]

use std::{
    collections::HashSet,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use client::{Client, ClientConfig, UserFields};
use serde_json::{Map, Value, json};

const PREFIX: &str = "/fmi/data/vLatest/databases/Wallet/";

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub auth: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct Inner {
    requests: Vec<Recorded>,
    records: Vec<(String, String, Map<String, Value>)>,
    open_sessions: HashSet<String>,
    next_token: u64,
    next_record: u64,
    capacity_exceeded: bool,
    find_reply: Option<(StatusCode, Value)>,
    find_delay: Option<Duration>,
    session_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockServer {
    pub async fn spawn() -> Self {
        let state = MockState::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            server_url: format!("http://{}", self.addr),
            database: "Wallet".to_string(),
            username: "svc".to_string(),
            password: "secret".to_string(),
            ..ClientConfig::default()
        }
    }

    pub fn client(&self) -> Client {
        Client::new(self.config()).unwrap()
    }

    pub fn basic_client(&self) -> Client {
        let mut config = self.config();
        config.fields.user = UserFields::basic();
        Client::new(config).unwrap()
    }
}

impl MockState {
    /// Inserts a record and returns its id.
    pub fn insert(&self, layout: &str, fields: Value) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_record += 1;
        let id = inner.next_record.to_string();
        let Value::Object(fields) = fields else {
            panic!("record fields must be an object");
        };
        inner.records.push((layout.to_string(), id.clone(), fields));
        id
    }

    pub fn record(&self, layout: &str, id: &str) -> Option<Map<String, Value>> {
        let inner = self.inner.lock().unwrap();
        inner
            .records
            .iter()
            .find(|(l, i, _)| l == layout && i == id)
            .map(|(_, _, fields)| fields.clone())
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method, path_suffix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|req| req.method == method && req.path.ends_with(path_suffix))
            .count()
    }

    pub fn sessions_created(&self) -> usize {
        self.count(Method::POST, "/sessions")
    }

    pub fn sessions_closed(&self) -> usize {
        self.requests()
            .iter()
            .filter(|req| req.method == Method::DELETE && req.path.contains("/sessions/"))
            .count()
    }

    pub fn open_sessions(&self) -> usize {
        self.inner.lock().unwrap().open_sessions.len()
    }

    pub fn last_body(&self, method: Method, path_suffix: &str) -> Option<Value> {
        self.requests()
            .into_iter()
            .rev()
            .find(|req| req.method == method && req.path.ends_with(path_suffix))
            .map(|req| req.body)
    }

    pub fn set_capacity_exceeded(&self, value: bool) {
        self.inner.lock().unwrap().capacity_exceeded = value;
    }

    pub fn set_find_reply(&self, status: StatusCode, body: Value) {
        self.inner.lock().unwrap().find_reply = Some((status, body));
    }

    pub fn set_find_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().find_delay = Some(delay);
    }

    pub fn set_session_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().session_delay = Some(delay);
    }

    /// Server-side expiry of every open session.
    pub fn expire_sessions(&self) {
        self.inner.lock().unwrap().open_sessions.clear();
    }
}

fn reply(status: StatusCode, response: Value, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "response": response, "messages": [{ "code": code, "message": message }] })),
    )
        .into_response()
}

fn ok(response: Value) -> Response {
    reply(StatusCode::OK, response, "0", "OK")
}

fn as_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => if *flag { "1" } else { "0" }.to_string(),
        _ => String::new(),
    }
}

fn matches(fields: &Map<String, Value>, query: &Map<String, Value>) -> bool {
    query.iter().all(|(name, operand)| {
        let operand = operand.as_str().unwrap_or_default();
        let stored = as_text(fields.get(name));
        match operand.strip_prefix("==") {
            Some(expected) => stored.eq_ignore_ascii_case(expected),
            None if operand == "=" => stored.is_empty(),
            None => stored.contains(operand),
        }
    })
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let (delay, session_delay) = {
        let mut inner = state.inner.lock().unwrap();
        inner.requests.push(Recorded {
            method: method.clone(),
            path: path.clone(),
            auth: auth.clone(),
            body: body.clone(),
        });
        (inner.find_delay, inner.session_delay)
    };

    let Some(rest) = path.strip_prefix(PREFIX) else {
        return (StatusCode::NOT_FOUND, "unknown database").into_response();
    };
    let parts: Vec<&str> = rest.split('/').collect();

    if parts[0] == "sessions" {
        if let Some(delay) = session_delay
            && method == Method::POST
        {
            tokio::time::sleep(delay).await;
        }
        return session(&state, &method, &parts, auth.as_deref());
    }

    // Slow finds are checked after the wait, so a session closed or expired
    // meanwhile is rejected.
    if let Some(delay) = delay
        && method == Method::POST
        && path.ends_with("/_find")
    {
        tokio::time::sleep(delay).await;
    }

    let token = auth
        .as_deref()
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default();
    if !state.inner.lock().unwrap().open_sessions.contains(token) {
        return reply(StatusCode::UNAUTHORIZED, json!({}), "952", "Invalid FileMaker Data API token (*)");
    }

    match (method.clone(), parts.as_slice()) {
        (Method::POST, ["layouts", layout, "_find"]) => find(&state, layout, &body),
        (Method::POST, ["layouts", layout, "records"]) => {
            let id = state.insert(layout, body["fieldData"].clone());
            ok(json!({ "recordId": id, "modId": "0" }))
        }
        (Method::GET, ["layouts", layout, "records", id]) => match state.record(layout, id) {
            Some(fields) => ok(json!({
                "dataInfo": { "foundCount": 1, "returnedCount": 1 },
                "data": [{ "fieldData": fields, "recordId": id, "modId": "0" }]
            })),
            None => missing_record(),
        },
        (Method::PATCH, ["layouts", layout, "records", id]) => {
            let mut inner = state.inner.lock().unwrap();
            let Some((_, _, fields)) = inner
                .records
                .iter_mut()
                .find(|(l, i, _)| l == layout && i == id)
            else {
                return missing_record();
            };
            if let Some(update) = body["fieldData"].as_object() {
                for (name, value) in update {
                    fields.insert(name.clone(), value.clone());
                }
            }
            ok(json!({ "modId": "1" }))
        }
        (Method::DELETE, ["layouts", layout, "records", id]) => {
            let mut inner = state.inner.lock().unwrap();
            let before = inner.records.len();
            inner.records.retain(|(l, i, _)| !(l == layout && i == id));
            if inner.records.len() == before {
                return missing_record();
            }
            ok(json!({}))
        }
        _ => (StatusCode::NOT_FOUND, "unknown route").into_response(),
    }
}

fn missing_record() -> Response {
    reply(StatusCode::INTERNAL_SERVER_ERROR, json!({}), "101", "Record is missing")
}

fn session(state: &MockState, method: &Method, parts: &[&str], auth: Option<&str>) -> Response {
    let mut inner = state.inner.lock().unwrap();
    match (method, parts) {
        (&Method::POST, ["sessions"]) => {
            if auth != Some("Basic c3ZjOnNlY3JldA==") {
                return reply(StatusCode::UNAUTHORIZED, json!({}), "212", "Invalid user account and/or password");
            }
            if inner.capacity_exceeded {
                return reply(StatusCode::OK, json!({}), "812", "Exceed host's capacity");
            }
            inner.next_token += 1;
            let token = format!("token-{}", inner.next_token);
            inner.open_sessions.insert(token.clone());
            ok(json!({ "token": token }))
        }
        (&Method::DELETE, ["sessions", token]) => {
            inner.open_sessions.remove(*token);
            ok(json!({}))
        }
        _ => (StatusCode::NOT_FOUND, "unknown session route").into_response(),
    }
}

fn find(state: &MockState, layout: &str, body: &Value) -> Response {
    let inner = state.inner.lock().unwrap();
    if let Some((status, body)) = &inner.find_reply {
        return (*status, Json(body.clone())).into_response();
    }

    let query = body["query"][0].as_object().cloned().unwrap_or_default();
    let limit = body["limit"].as_u64().unwrap_or(100) as usize;
    let found: Vec<Value> = inner
        .records
        .iter()
        .filter(|(l, _, fields)| l == layout && matches(fields, &query))
        .map(|(_, id, fields)| json!({ "fieldData": fields, "recordId": id, "modId": "0" }))
        .collect();

    if found.is_empty() {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({}), "401", "No records match the request");
    }
    let data: Vec<Value> = found.iter().take(limit).cloned().collect();
    ok(json!({
        "dataInfo": { "foundCount": found.len(), "returnedCount": data.len() },
        "data": data
    }))
}
