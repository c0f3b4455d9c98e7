//! Pure construction of Data API requests.
//!
//! Nothing here touches the network or the session store; the caller passes
//! the token explicitly.

use std::{collections::BTreeMap, sync::Arc};

use api_types::record::{FindRequest, RecordBody};
use base64::Engine;
use reqwest::{
    Method, Request, Url,
    header::{self, HeaderValue},
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    ClientError, Result,
    config::{ClientConfig, DATA_API_PATH, DATABASE_PLACEHOLDER},
};

/// `limit` of single-record lookups (login, email check).
pub const FIND_LIMIT_SINGLE: u32 = 1;
/// Default `limit` of list finds.
pub const FIND_LIMIT_DEFAULT: u32 = 100;

#[derive(Clone, Debug)]
pub struct RequestFactory {
    config: Arc<ClientConfig>,
}

impl RequestFactory {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{server_url}/fmi/data/vLatest/databases/{database}/{endpoint}`.
    pub fn build_url(&self, endpoint: &str) -> Result<Url> {
        let database = self.config.database.trim();
        if database.is_empty() || database == DATABASE_PLACEHOLDER {
            return Err(ClientError::Configuration(
                "database name is not configured".to_string(),
            ));
        }

        let raw = format!(
            "{}/{}/{}/{}",
            self.config.server_url.trim_end_matches('/'),
            DATA_API_PATH,
            database,
            endpoint.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|err| ClientError::InvalidUrl(format!("{raw}: {err}")))
    }

    pub fn sessions_url(&self) -> Result<Url> {
        self.build_url("sessions")
    }

    pub fn session_url(&self, token: &str) -> Result<Url> {
        self.build_url(&format!("sessions/{token}"))
    }

    pub fn find_url(&self, layout: &str) -> Result<Url> {
        self.build_url(&format!("layouts/{layout}/_find"))
    }

    pub fn records_url(&self, layout: &str) -> Result<Url> {
        self.build_url(&format!("layouts/{layout}/records"))
    }

    pub fn record_url(&self, layout: &str, record_id: &str) -> Result<Url> {
        self.build_url(&format!("layouts/{layout}/records/{record_id}"))
    }

    /// JSON request with an optional Bearer token.
    pub fn create_request(
        &self,
        url: Url,
        method: Method,
        body: Option<Vec<u8>>,
        token: Option<&str>,
    ) -> Result<Request> {
        let mut request = Request::new(method, url);
        request.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        if let Some(token) = token {
            let mut auth = HeaderValue::try_from(format!("Bearer {token}")).map_err(|err| {
                tracing::warn!("session token is not a valid header value: {err}");
                ClientError::AuthenticationFailed
            })?;
            auth.set_sensitive(true);
            request.headers_mut().insert(header::AUTHORIZATION, auth);
        }

        if let Some(body) = body {
            *request.body_mut() = Some(body.into());
        }
        Ok(request)
    }

    /// `POST .../sessions` with the service account as Basic-Auth.
    pub fn session_request(&self) -> Result<Request> {
        let url = self.sessions_url()?;
        let mut request = self.create_request(url, Method::POST, Some(b"{}".to_vec()), None)?;

        // Basic authorization is "Basic `secret`" where `secret` is the base64
        // of "username:password".
        let secret = format!("{}:{}", self.config.username, self.config.password);
        let secret = format!("Basic {}", base64::prelude::BASE64_STANDARD.encode(secret));
        let mut auth = HeaderValue::try_from(secret)
            .map_err(|err| ClientError::Configuration(format!("invalid service credentials: {err}")))?;
        auth.set_sensitive(true);
        request.headers_mut().insert(header::AUTHORIZATION, auth);
        Ok(request)
    }

    /// `{query: [fields], limit}`; values already carry their operator.
    pub fn find_query(fields: &BTreeMap<String, String>, limit: u32) -> Result<Vec<u8>> {
        let request = FindRequest {
            query: vec![fields.clone()],
            limit,
        };
        Ok(serde_json::to_vec(&request)?)
    }

    /// Like [`Self::find_query`], normalizing typed values to `"==value"`.
    ///
    /// The find endpoint only accepts strings; booleans become `1`/`0` and
    /// `null` matches an empty field.
    pub fn find_query_with_fields(fields: &BTreeMap<String, Value>, limit: u32) -> Result<Vec<u8>> {
        let normalized = fields
            .iter()
            .map(|(name, value)| Ok((name.clone(), find_operand(name, value)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        Self::find_query(&normalized, limit)
    }

    /// `{fieldData: field_data}`.
    pub fn record_body<T: Serialize>(field_data: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&RecordBody { field_data })?)
    }
}

fn find_operand(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(format!("=={text}")),
        Value::Number(number) => Ok(format!("=={number}")),
        Value::Bool(true) => Ok("==1".to_string()),
        Value::Bool(false) => Ok("==0".to_string()),
        Value::Null => Ok("=".to_string()),
        Value::Array(_) | Value::Object(_) => Err(ClientError::Encoding(format!(
            "find value for '{name}' must be a scalar"
        ))),
    }
}
