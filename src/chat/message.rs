use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::core::Timestamp;
use crate::foundation::error::ReplayResult;
use crate::record::ChatRecord;

static SPACE_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:&nbsp;)|(?:\n +)|(?:<img[^>]+/>)").expect("space-like regex is valid")
});

static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<SPAN[^>]+>(.+)</SPAN>").expect("span regex is valid")
});

/// Normalize legacy HTML fragments in a chat body.
///
/// `&nbsp;`, a newline followed by indentation and `<img …/>` tags each become one space, and a
/// `<SPAN …>inner</SPAN>` wrapper is replaced by `inner`.
pub fn clean_text(raw: &str) -> String {
    let spaced = SPACE_LIKE_RE.replace_all(raw, " ");
    SPAN_RE.replace_all(&spaced, "$1").into_owned()
}

/// One chat message, immutable once parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    /// Stable sender id, used for color assignment.
    pub sender_id: String,
    /// Display name.
    pub sender_name: String,
    /// Cleaned message body.
    pub text: String,
    /// When the message was sent.
    pub timestamp: Timestamp,
}

impl ChatMessage {
    /// Build a message from a raw record, cleaning the body.
    pub fn from_record(rec: &ChatRecord) -> ReplayResult<Self> {
        let timestamp = Timestamp::new(rec.timestamp.to_secs()?)?;
        Ok(Self {
            sender_id: rec.sender_id.clone(),
            sender_name: rec.sender_name.clone(),
            text: clean_text(&rec.content),
            timestamp,
        })
    }

    /// The text as it appears on screen: `[sender] body`.
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.sender_name, self.text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chat/message.rs"]
mod tests;
