use std::collections::HashMap;

use crate::chat::message::ChatMessage;
use crate::foundation::core::Rgb8;
use crate::foundation::math::Fnv1a64;

/// Immutable `sender_id → color` table, built once per session before rendering.
///
/// Colors are derived from a stable hash of the sender id, so the same transcript gets the same
/// colors on every run and every machine.
#[derive(Clone, Debug, PartialEq)]
pub struct SenderPalette {
    colors: HashMap<String, Rgb8>,
    fallback: Rgb8,
}

impl SenderPalette {
    /// Assign a color to every distinct sender in `messages`.
    pub fn build<'a>(messages: impl IntoIterator<Item = &'a ChatMessage>, fallback: Rgb8) -> Self {
        let mut colors = HashMap::new();
        for msg in messages {
            colors
                .entry(msg.sender_id.clone())
                .or_insert_with(|| color_for(&msg.sender_id));
        }
        Self { colors, fallback }
    }

    /// Color of `sender_id`, or the fallback for senders outside the transcript.
    pub fn color(&self, sender_id: &str) -> Rgb8 {
        self.colors.get(sender_id).copied().unwrap_or(self.fallback)
    }

    /// Number of distinct senders.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// `true` when no sender is known.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn color_for(sender_id: &str) -> Rgb8 {
    let mut h = Fnv1a64::new_default();
    h.write_str(sender_id);
    let v = h.finish();
    Rgb8::new((v >> 40) as u8, (v >> 24) as u8, (v >> 8) as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/chat/palette.rs"]
mod tests;
