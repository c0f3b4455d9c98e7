//! Domain operations and the record-level calls they are built on.
//!
//! The record helpers take an explicit token and never touch the session
//! store; the public operations wrap them in [`Client::with_session`].

use api_types::{
    envelope::{CODE_NO_RECORDS, CODE_OK, DataApiResponse},
    record::{Record, RecordSet, RecordWritten},
};
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::{Client, ClientError, RequestFactory, Result};

mod categories;
mod expenses;
mod profile;
mod users;

impl Client {
    /// `POST .../_find`. `Ok(None)` when nothing matched (code 401).
    pub(crate) async fn find_records(
        &self,
        token: &str,
        layout: &str,
        body: Vec<u8>,
    ) -> Result<Option<RecordSet>> {
        let url = self.requests.find_url(layout)?;
        let request = self
            .requests
            .create_request(url, Method::POST, Some(body), Some(token))?;
        let (status, body) = self.send(request).await?;
        let reply = Self::decode::<RecordSet>(&body);

        if reply
            .as_ref()
            .is_some_and(|reply| reply.has_code(CODE_NO_RECORDS))
        {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::from_reply(status, reply.as_ref()));
        }
        let reply = reply.ok_or_else(|| {
            ClientError::InvalidResponse(format!("find on '{layout}' returned no envelope"))
        })?;
        Ok(Some(reply.response.unwrap_or_default()))
    }

    /// `GET .../records/{id}`.
    pub(crate) async fn get_record(&self, token: &str, layout: &str, record_id: &str) -> Result<Record> {
        let url = self.requests.record_url(layout, record_id)?;
        let request = self
            .requests
            .create_request(url, Method::GET, None, Some(token))?;
        let (status, body) = self.send(request).await?;
        let reply = Self::decode::<RecordSet>(&body);

        if !status.is_success() {
            return Err(ClientError::from_reply(status, reply.as_ref()));
        }
        reply
            .and_then(|reply| reply.response)
            .and_then(|set| set.data.into_iter().next())
            .ok_or_else(|| {
                ClientError::InvalidResponse(format!("record {record_id} missing from reply"))
            })
    }

    /// `POST .../records`. Returns the new record id when the server sent one.
    pub(crate) async fn create_record<T: Serialize>(
        &self,
        token: &str,
        layout: &str,
        field_data: &T,
    ) -> Result<Option<String>> {
        let url = self.requests.records_url(layout)?;
        let body = RequestFactory::record_body(field_data)?;
        let written = self.write(url, Method::POST, Some(body), token).await?;
        Ok(written.record_id)
    }

    /// `PATCH .../records/{id}`.
    pub(crate) async fn update_record<T: Serialize>(
        &self,
        token: &str,
        layout: &str,
        record_id: &str,
        field_data: &T,
    ) -> Result<()> {
        let url = self.requests.record_url(layout, record_id)?;
        let body = RequestFactory::record_body(field_data)?;
        self.write(url, Method::PATCH, Some(body), token).await?;
        Ok(())
    }

    /// `DELETE .../records/{id}`.
    pub(crate) async fn delete_record(&self, token: &str, layout: &str, record_id: &str) -> Result<()> {
        let url = self.requests.record_url(layout, record_id)?;
        self.write(url, Method::DELETE, None, token).await?;
        Ok(())
    }

    async fn write(
        &self,
        url: reqwest::Url,
        method: Method,
        body: Option<Vec<u8>>,
        token: &str,
    ) -> Result<RecordWritten> {
        let request = self
            .requests
            .create_request(url, method, body, Some(token))?;
        let (status, body) = self.send(request).await?;
        write_outcome(status, Self::decode::<RecordWritten>(&body))
    }
}

/// 200/201 with a record id, an OK code or no messages at all is success.
fn write_outcome(
    status: StatusCode,
    reply: Option<DataApiResponse<RecordWritten>>,
) -> Result<RecordWritten> {
    let Some(reply) = reply else {
        return match status {
            StatusCode::OK | StatusCode::CREATED => Ok(RecordWritten::default()),
            other => Err(ClientError::from_reply::<RecordWritten>(other, None)),
        };
    };

    if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
        return Err(ClientError::from_reply(status, Some(&reply)));
    }

    let has_record_id = reply
        .response
        .as_ref()
        .is_some_and(|written| written.record_id.is_some());
    match reply.first_message() {
        Some(message) if message.code != CODE_OK && !has_record_id => {
            Err(ClientError::from_message(message))
        }
        _ => Ok(reply.response.unwrap_or_default()),
    }
}
