use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod artifact;
pub mod execution;

pub use artifact::{
    accumulate, ArtifactKind, ArtifactMatch, Metadata, MetadataValue, SearchCriteria,
};
pub use execution::{duration_millis, ExecutionRequest, ExecutionResult, DEFAULT_TIMEOUT};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    Error,
}

/// JSON envelope printed by every command: either `data` or `message` is set.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CommandResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CommandResponse {
    pub fn ok<T: Serialize>(data: &T) -> Result<Self> {
        Ok(Self {
            status: ResponseStatus::Ok,
            data: Some(serde_json::to_value(data)?),
            message: None,
            hint: None,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            message: Some(message.into()),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
