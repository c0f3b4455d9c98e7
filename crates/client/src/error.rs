//! Errors surfaced by the client.
//!
//! Callers never see raw JSON: every server reply is mapped to one of the
//! variants below by [`ClientError::from_reply`]. Use
//! [`ClientError::user_message`] for text that can be shown to a user.

use api_types::envelope::{
    CODE_CAPACITY_EXCEEDED, CODE_INVALID_ACCOUNT, CODE_INVALID_TOKEN, DataApiResponse, Message,
};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("user not found")]
    UserNotFound,
    #[error("email already exists")]
    EmailAlreadyExists,
    #[error("network error: {message}")]
    Network {
        message: String,
        status: Option<u16>,
    },
    #[error("http error: {0}")]
    Http(u16),
    #[error("api error {code}: {message}")]
    Api { code: String, message: String },
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("server capacity exceeded")]
    CapacityExceeded,
    #[error("invalid input: {0}")]
    Validation(String),
}

impl ClientError {
    /// Maps a parsed backend message to an error kind.
    pub fn from_message(message: &Message) -> Self {
        match message.code.as_str() {
            CODE_CAPACITY_EXCEEDED => Self::CapacityExceeded,
            CODE_INVALID_TOKEN | CODE_INVALID_ACCOUNT => Self::AuthenticationFailed,
            _ => Self::Api {
                code: message.code.clone(),
                message: message.message.clone(),
            },
        }
    }

    /// Maps a failed reply: the first message wins, then the HTTP status.
    pub fn from_reply<T>(status: StatusCode, reply: Option<&DataApiResponse<T>>) -> Self {
        if let Some(message) = reply.and_then(DataApiResponse::first_message) {
            return Self::from_message(message);
        }
        match status {
            StatusCode::UNAUTHORIZED => Self::AuthenticationFailed,
            other => Self::Http(other.as_u16()),
        }
    }

    /// Text meant for end users; never contains raw codes.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) | Self::Configuration(_) => {
                "The app is not configured correctly. Please contact support."
            }
            Self::InvalidResponse(_) | Self::Http(_) | Self::Api { .. } => {
                "The server returned an unexpected response. Please try again."
            }
            Self::AuthenticationFailed => "Could not authenticate with the server. Please try again.",
            Self::UserNotFound => "Incorrect email or password.",
            Self::EmailAlreadyExists => "An account with this email already exists.",
            Self::Network { .. } => "Could not reach the server. Check your connection and try again.",
            Self::Encoding(_) => "Could not prepare the request. Please try again.",
            Self::CapacityExceeded => "The server is busy right now. Please try again in a moment.",
            Self::Validation(_) => "Some of the values you entered are not valid.",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::InvalidUrl(err.to_string());
        }
        Self::Network {
            message: err.to_string(),
            status: err.status().map(|status| status.as_u16()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}
