//! Schema validation of raw generator records.
//!
//! A record is `{"type": "...", "data": {...}}`. [`SchemaValidator::validate`] accepts it only
//! when `type` is a known [`NodeKind`] and `data` matches that kind's field set exactly
//! (missing fields, unknown fields and bad enum literals are rejected). `error` records are
//! always accepted and normalized into [`ErrorData`] so they can be shown as diagnostics.
//!
//! [`SchemaValidator::validate_batch`] never stops at the first bad record: rejected records
//! are reported with their index and the rest of the batch is still validated.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::model::{
    CodeData, DecisionData, ErrorData, InformationData, NodeData, NodeKind, PromptData, TaskData,
};

/// Message used when an `error` record carries no usable `message`.
pub const FALLBACK_ERROR_MESSAGE: &str = "generator reported an error";

/// Why a record was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no string `type` field")]
    MissingType,

    #[error("unknown node type '{0}'")]
    UnknownType(String),

    #[error("record of type '{0}' has no `data` field")]
    MissingData(NodeKind),

    /// `data` does not match the shape registered for the kind (serde message names the field).
    #[error("invalid data for type '{kind}': {message}")]
    InvalidData { kind: NodeKind, message: String },
}

/// Per-record validation failure; non-fatal for the batch.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("record {index} rejected: {reason}")]
pub struct ValidationRejected {
    /// Position of the record in the streamed batch.
    pub index: usize,
    pub reason: RejectReason,
}

/// Result of validating a batch: accepted payloads in stream order plus rejections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchValidation {
    pub accepted: Vec<NodeData>,
    pub rejected: Vec<ValidationRejected>,
}

/// Validates generator records against the node-kind schemas.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validates one record; returns the typed payload or the reason it was rejected.
    pub fn validate(&self, record: &Value) -> Result<NodeData, RejectReason> {
        let obj = record.as_object().ok_or(RejectReason::NotAnObject)?;
        let type_name = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(RejectReason::MissingType)?;
        let kind: NodeKind = type_name
            .parse()
            .map_err(|_| RejectReason::UnknownType(type_name.to_string()))?;
        let data = obj.get("data");

        match kind {
            NodeKind::Error => Ok(NodeData::Error(normalize_error(data))),
            NodeKind::Prompt => strict::<PromptData>(kind, data).map(NodeData::Prompt),
            NodeKind::Task => strict::<TaskData>(kind, data).map(NodeData::Task),
            NodeKind::Decision => strict::<DecisionData>(kind, data).map(NodeData::Decision),
            NodeKind::Information => {
                strict::<InformationData>(kind, data).map(NodeData::Information)
            }
            NodeKind::Code => strict::<CodeData>(kind, data).map(NodeData::Code),
        }
    }

    /// Validates every record; one failure never aborts the rest.
    pub fn validate_batch(&self, records: &[Value]) -> BatchValidation {
        let mut out = BatchValidation::default();
        for (index, record) in records.iter().enumerate() {
            match self.validate(record) {
                Ok(data) => out.accepted.push(data),
                Err(reason) => out.rejected.push(ValidationRejected { index, reason }),
            }
        }
        out
    }
}

fn strict<T: DeserializeOwned>(kind: NodeKind, data: Option<&Value>) -> Result<T, RejectReason> {
    let data = data.ok_or(RejectReason::MissingData(kind))?;
    serde_json::from_value(data.clone()).map_err(|e| RejectReason::InvalidData {
        kind,
        message: e.to_string(),
    })
}

/// Error records are never rejected: missing or non-string fields fall back, and
/// otherwise-unusable data is preserved as text in `details`.
fn normalize_error(data: Option<&Value>) -> ErrorData {
    let field = |name: &str| {
        data.and_then(|d| d.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let message = field("message").unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
    let details = field("details").unwrap_or_else(|| match data {
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    });
    ErrorData { message, details }
}
