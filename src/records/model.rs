//! Record shapes and the request/response mapping.

use serde::{Deserialize, Serialize};

use crate::records::error::RequestError;

/// Minimum length of a record name, in characters.
pub const MIN_NAME_LEN: usize = 3;

/// A persisted record.
///
/// The stored encoding uses `ID` / `Name` keys so records written by
/// earlier deployments stay readable. Lowercase keys are accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
}

impl Record {
    /// Project the record onto its wire representation.
    pub fn to_response(&self) -> RecordResponse {
        RecordResponse {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// A validated record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    /// Left unset by request parsing; the gateway assigns one.
    pub id: Option<String>,
    pub name: String,
}

/// Body of `POST /records`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateRecordRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body returned for a single record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordResponse {
    pub id: String,
    pub name: String,
}

/// Body returned for any failed request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl CreateRecordRequest {
    /// Check field rules and turn the request into a draft.
    pub fn validate(self) -> Result<RecordDraft, RequestError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(RequestError::Validation {
                    field: "name",
                    reason: "is required".into(),
                })
            }
        };

        if name.chars().count() < MIN_NAME_LEN {
            return Err(RequestError::Validation {
                field: "name",
                reason: format!("must be at least {} characters", MIN_NAME_LEN),
            });
        }

        Ok(RecordDraft { id: None, name })
    }
}

/// Decode and validate a create request body.
pub fn parse_create_request(body: &[u8]) -> Result<RecordDraft, RequestError> {
    let request: CreateRecordRequest = serde_json::from_slice(body).map_err(RequestError::Decode)?;
    request.validate()
}
