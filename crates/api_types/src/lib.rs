//! Wire types for the FileMaker Data API.
//!
//! Every reply from the server is wrapped in the same envelope:
//!
//! ```json
//! { "response": { ... }, "messages": [ { "code": "0", "message": "OK" } ] }
//! ```
//!
//! The `response` object is empty (or missing) when the call failed, so all the
//! payload types below tolerate missing keys.

use serde::{Deserialize, Serialize};

/// Field data of a single record, keyed by FileMaker field name.
pub type FieldData = serde_json::Map<String, serde_json::Value>;

pub mod envelope {
    use super::*;

    /// Message code the server uses for a successful call.
    pub const CODE_OK: &str = "0";
    /// "No records match the request".
    pub const CODE_NO_RECORDS: &str = "401";
    /// "Maximum number of host/session connections reached".
    pub const CODE_CAPACITY_EXCEEDED: &str = "812";
    /// "Invalid FileMaker Data API token".
    pub const CODE_INVALID_TOKEN: &str = "952";
    /// "Invalid user account and/or password".
    pub const CODE_INVALID_ACCOUNT: &str = "212";

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Message {
        pub code: String,
        #[serde(default)]
        pub message: String,
    }

    /// The `{response, messages}` envelope.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DataApiResponse<T> {
        pub response: Option<T>,
        #[serde(default = "Vec::new")]
        pub messages: Vec<Message>,
    }

    impl<T> DataApiResponse<T> {
        pub fn first_message(&self) -> Option<&Message> {
            self.messages.first()
        }

        /// Returns `true` if the first message carries `code`.
        pub fn has_code(&self, code: &str) -> bool {
            self.first_message().is_some_and(|msg| msg.code == code)
        }
    }
}

pub mod session {
    use super::*;

    /// Body of `POST .../sessions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SessionToken {
        #[serde(default)]
        pub token: Option<String>,
    }
}

pub mod record {
    use std::collections::BTreeMap;

    use super::*;

    /// Body of `POST .../layouts/{layout}/_find`.
    ///
    /// Each map in `query` is one find request; values carry the comparison
    /// operator as a prefix (`"==value"`).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FindRequest {
        pub query: Vec<BTreeMap<String, String>>,
        pub limit: u32,
    }

    /// Body of record create/update calls.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecordBody<T> {
        #[serde(rename = "fieldData")]
        pub field_data: T,
    }

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DataInfo {
        #[serde(default)]
        pub database: String,
        #[serde(default)]
        pub layout: String,
        #[serde(default)]
        pub table: String,
        #[serde(default)]
        pub total_record_count: u64,
        #[serde(default)]
        pub found_count: u64,
        #[serde(default)]
        pub returned_count: u64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Record {
        #[serde(default)]
        pub field_data: FieldData,
        pub record_id: String,
        #[serde(default)]
        pub mod_id: Option<String>,
    }

    /// Response of find and get-record calls.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordSet {
        #[serde(default)]
        pub data_info: Option<DataInfo>,
        #[serde(default)]
        pub data: Vec<Record>,
    }

    impl RecordSet {
        /// `foundCount` when the server sent it, otherwise the number of rows.
        pub fn found_count(&self) -> u64 {
            self.data_info
                .as_ref()
                .map(|info| info.found_count)
                .unwrap_or(self.data.len() as u64)
        }
    }

    /// Response of create/update/delete calls.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordWritten {
        #[serde(default)]
        pub record_id: Option<String>,
        #[serde(default)]
        pub mod_id: Option<String>,
    }
}
