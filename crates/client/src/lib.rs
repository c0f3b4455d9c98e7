//! Client for the WalletWatch FileMaker Data API backend.
//!
//! Every operation runs inside [`Client::with_session`]: the session token is
//! reused when one exists, otherwise one is opened for the operation and closed
//! as soon as it settles. The backend caps concurrent sessions per account, so
//! sessions are never held longer than needed.

use std::{future::Future, sync::Arc};

use api_types::{
    envelope::DataApiResponse,
    session::SessionToken,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

pub use categories::{Category, CategoryDraft, DEFAULT_COLOR, DEFAULT_ICON, default_icon};
pub use config::{
    CategoryFields, ClientConfig, DATABASE_PLACEHOLDER, ExpenseFields, Fields, Layouts,
    SESSION_CLOSE_TIMEOUT, UserFields,
};
pub use error::ClientError;
pub use expenses::{Expense, ExpenseDraft, ExpenseKind};
pub use money::Amount;
pub use request::{FIND_LIMIT_DEFAULT, FIND_LIMIT_SINGLE, RequestFactory};
pub use session::{Lease, SessionStore};
pub use users::{ExpenseLimit, LimitKind, LimitPeriod, NewUser, PayDay, Theme, User};

mod categories;
mod config;
pub mod dates;
mod error;
mod expenses;
mod fields;
mod money;
mod ops;
mod request;
mod session;
mod users;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    requests: RequestFactory,
    store: SessionStore,
}

impl Client {
    /// Return a builder for `Client`.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        self.requests.config()
    }

    pub fn requests(&self) -> &RequestFactory {
        &self.requests
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Runs `operation` with a valid token.
    ///
    /// A session opened here is closed (best-effort) once the operation
    /// settles, whether it succeeded or not; a session that already existed
    /// is left alone. The operation's result is returned unchanged.
    pub async fn with_session<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let lease = self
            .store
            .acquire_or_create(|| self.open_session_detached())
            .await?;
        let guard = LeaseGuard::new(self.clone(), lease);

        let result = operation(guard.token.clone()).await;
        if matches!(result, Err(ClientError::AuthenticationFailed)) {
            // Expired or revoked; the next operation starts from an empty slot.
            self.store.invalidate(&guard.token).await;
        }
        guard.release().await;
        result
    }

    /// Opens a fresh caller-managed session, discarding any stored token.
    ///
    /// The session stays open until [`Client::logout`].
    pub async fn authenticate(&self) -> Result<String> {
        self.store.clear().await;
        match self.open_session().await {
            Ok(token) => {
                self.store.set(token.clone()).await;
                Ok(token)
            }
            Err(err) => {
                if matches!(err, ClientError::CapacityExceeded) {
                    self.store.clear().await;
                }
                Err(err)
            }
        }
    }

    /// Closes the current session, if any. Never fails.
    ///
    /// A session still used by a running operation is only detached here;
    /// that operation closes it when it settles.
    pub async fn logout(&self) {
        match self.store.take().await {
            Some(token) => {
                self.close_session(&token).await;
                tracing::info!("logged out");
            }
            None => tracing::debug!("logout without a session to close"),
        }
    }

    /// Opens a session on a task of its own, so a session the server grants
    /// after the caller was cancelled is still closed.
    async fn open_session_detached(&self) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        let client = self.clone();
        tokio::spawn(async move {
            let opened = client.open_session().await;
            if let Err(Ok(token)) = tx.send(opened) {
                tracing::warn!("session opened for a cancelled operation, closing it");
                client.close_session(&token).await;
            }
        });
        rx.await.map_err(|_| {
            ClientError::InvalidResponse("session task ended without a reply".to_string())
        })?
    }

    async fn open_session(&self) -> Result<String> {
        let request = self.requests.session_request()?;
        let (status, body) = self.send(request).await?;
        let reply = serde_json::from_slice::<DataApiResponse<SessionToken>>(&body).ok();

        if status != StatusCode::OK {
            return Err(ClientError::from_reply(status, reply.as_ref()));
        }
        let Some(reply) = reply else {
            return Err(ClientError::InvalidResponse(
                "session reply is not a data api envelope".to_string(),
            ));
        };

        if let Some(token) = reply
            .response
            .as_ref()
            .and_then(|session| session.token.clone())
            .filter(|token| !token.is_empty())
        {
            tracing::info!("opened data api session");
            return Ok(token);
        }

        let err = match reply.first_message() {
            Some(message) => ClientError::from_message(message),
            None => ClientError::InvalidResponse("session reply without token".to_string()),
        };
        if matches!(err, ClientError::CapacityExceeded) {
            tracing::warn!("data api session capacity exceeded");
        }
        Err(err)
    }

    /// `DELETE .../sessions/{token}`; failures are logged and dropped since
    /// the server expires idle sessions on its own.
    async fn close_session(&self, token: &str) {
        let request = self
            .requests
            .session_url(token)
            .and_then(|url| self.requests.create_request(url, Method::DELETE, None, Some(token)));
        let mut request = match request {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!("failed to build session close request: {err}");
                return;
            }
        };
        *request.timeout_mut() = Some(SESSION_CLOSE_TIMEOUT);

        match self.http.execute(request).await {
            Ok(res) if res.status().is_success() => tracing::info!("closed data api session"),
            Ok(res) => tracing::warn!(status = %res.status(), "session close rejected"),
            Err(err) => tracing::warn!("session close failed: {err}"),
        }
    }

    async fn release(&self, lease: Lease) {
        if let Some(token) = self.store.release(&lease).await {
            self.close_session(&token).await;
        }
    }

    pub(crate) async fn send(&self, request: reqwest::Request) -> Result<(StatusCode, Vec<u8>)> {
        let res = self.http.execute(request).await?;
        let status = res.status();
        let body = res.bytes().await?;
        Ok((status, body.to_vec()))
    }

    pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Option<DataApiResponse<T>> {
        serde_json::from_slice(body).ok()
    }
}

/// Gives the lease back when the operation ends, even if it was cancelled.
struct LeaseGuard {
    client: Client,
    token: String,
    lease: Option<Lease>,
}

impl LeaseGuard {
    fn new(client: Client, lease: Lease) -> Self {
        Self {
            client,
            token: lease.token().to_string(),
            lease: Some(lease),
        }
    }

    async fn release(mut self) {
        if let Some(lease) = self.lease.take() {
            self.client.release(lease).await;
        }
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        let Some(lease) = self.lease.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let client = self.client.clone();
                handle.spawn(async move { client.release(lease).await });
            }
            Err(_) => tracing::warn!("session lease dropped outside a runtime; left to expire"),
        }
    }
}

#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    store: Option<SessionStore>,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares a session store between clients (or lets tests inspect it).
    pub fn store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Client> {
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .build()
                .map_err(|err| ClientError::Configuration(format!("failed to build http client: {err}")))?,
        };

        Ok(Client {
            http,
            requests: RequestFactory::new(Arc::new(self.config)),
            store: self.store.unwrap_or_default(),
        })
    }
}
