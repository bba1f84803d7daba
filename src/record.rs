//! Raw session records as they arrive from the (external) XML decoder.
//!
//! Fields stay stringly-typed on purpose: these mirror the attributes of the legacy recording
//! formats, and turning them into typed events is the job of [`crate::annotate::CommandParser`]
//! and [`crate::chat::ChatMessage::from_record`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{ReplayError, ReplayResult};

/// A seconds value that may be encoded as a JSON number or a decimal string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSeconds {
    /// Numeric seconds.
    Number(f64),
    /// Decimal seconds as text, e.g. `"12.345"`.
    Text(String),
}

impl RawSeconds {
    /// Parse to floating-point seconds.
    pub fn to_secs(&self) -> ReplayResult<f64> {
        match self {
            Self::Number(v) => Ok(*v),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| ReplayError::validation(format!("invalid seconds '{s}': {e}"))),
        }
    }
}

impl Default for RawSeconds {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

/// One annotation command from a whiteboard recording.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationRecord {
    /// Command id; draw commands are later referenced by removals through this id.
    pub id: String,
    /// Vendor kind code (`"2"` free line, `"3"` remove, `"4"` text, `"6"` rectangle, `"8"` line).
    #[serde(rename = "type")]
    pub kind: String,
    /// Seconds since session start.
    pub timestamp: RawSeconds,
    /// Owning document id.
    #[serde(alias = "documentid")]
    pub document_id: String,
    /// Owning page id.
    #[serde(alias = "pageid")]
    pub page_id: String,
    /// Color list; only the first comma-separated entry is used.
    pub color: String,
    /// Stroke width.
    #[serde(alias = "linesize")]
    pub line_size: String,
    /// Encoded point list, e.g. `"(10,20),(30.5,40)"`.
    #[serde(alias = "p")]
    pub points: String,
    /// Target id when this command removes a previous one; empty otherwise.
    pub removed: String,
    /// Trailing text payload (text annotations).
    #[serde(alias = "tail")]
    pub text: String,
}

/// One chat message from a transcript.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatRecord {
    /// Seconds since session start.
    pub timestamp: RawSeconds,
    /// Stable sender id.
    #[serde(alias = "senderId", alias = "senderid")]
    pub sender_id: String,
    /// Display name.
    #[serde(alias = "sender")]
    pub sender_name: String,
    /// Message body, possibly containing legacy HTML fragments.
    pub content: String,
}

/// Load a JSON array of annotation records.
pub fn load_annotation_records(path: &Path) -> ReplayResult<Vec<AnnotationRecord>> {
    load_json(path)
}

/// Load a JSON array of chat records.
pub fn load_chat_records(path: &Path) -> ReplayResult<Vec<ChatRecord>> {
    load_json(path)
}

pub(crate) fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> ReplayResult<T> {
    use anyhow::Context as _;
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ReplayError::serde(format!("'{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../tests/unit/record.rs"]
mod tests;
