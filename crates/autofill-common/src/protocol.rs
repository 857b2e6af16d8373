//! Messages exchanged with the extension host.
//!
//! Requests arrive tagged by `action` and get exactly one response each.
//! Notifications flow the other way and expect no reply.

use crate::field::ClassifiedField;
use crate::fill::{FillError, FillRequest, FillResult, FilledField};
use crate::site::SiteId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    Ping,
    ScanPage,
    FillForm(FillFormRequest),
}

/// Actions this side understands.
const KNOWN_ACTIONS: &[&str] = &["ping", "scanPage", "fillForm"];

impl Request {
    /// Decode one request, telling an unrecognized `action` apart from a malformed body.
    pub fn from_json(text: &str) -> Result<Request, ProtocolError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .ok_or(ProtocolError::MissingAction)?;
        if !KNOWN_ACTIONS.contains(&action) {
            return Err(ProtocolError::UnknownAction(action.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillFormRequest {
    pub data: FillRequest,
    /// Fields to fill. When absent the most recent scan is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<ClassifiedField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Pong(PongResponse),
    Scan(ScanResponse),
    Fill(FillResult),
    Error(ErrorResponse),
}

impl Response {
    pub fn pong() -> Self {
        Response::Pong(PongResponse {
            status: "ok".to_string(),
            message: "Form detector is ready".to_string(),
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(ErrorResponse {
            error: message.into(),
        })
    }
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::UnknownAction(_) | ProtocolError::MissingAction => {
                Response::error("Unknown action")
            }
            other => Response::error(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PongResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub fields: Vec<ClassifiedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Fire-and-forget messages emitted towards the background collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    FormDetected(FormDetected),
    FillComplete(FillComplete),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDetected {
    pub fields: Vec<ClassifiedField>,
    pub site: SiteId,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillComplete {
    pub filled_fields: Vec<FilledField>,
    pub errors: Vec<FillError>,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Message has no action")]
    MissingAction,
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}
