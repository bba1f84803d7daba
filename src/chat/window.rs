use std::collections::VecDeque;

use crate::chat::message::ChatMessage;
use crate::foundation::error::{ReplayError, ReplayResult};

/// How many of the oldest messages must go so the rest fit in `budget`.
///
/// `messages` is ordered oldest first. Layout is simulated newest first, accumulating
/// `height_fn` per message; the first message that pushes the total past `budget` is evicted
/// together with everything older than it.
pub fn foresee_eviction_count<T, I, F>(messages: I, budget: f64, mut height_fn: F) -> usize
where
    I: IntoIterator<Item = T>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
    F: FnMut(T) -> f64,
{
    let iter = messages.into_iter();
    let mut remaining = iter.len();
    let mut used = 0.0;
    for msg in iter.rev() {
        used += height_fn(msg);
        if used > budget {
            break;
        }
        remaining -= 1;
    }
    remaining
}

/// Bounded, ordered collection of the chat messages currently on screen.
#[derive(Clone, Debug)]
pub struct ChatWindow {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
}

impl ChatWindow {
    /// Empty window holding at most `capacity` messages.
    pub fn new(capacity: usize) -> ReplayResult<Self> {
        if capacity == 0 {
            return Err(ReplayError::validation("chat window capacity must be > 0"));
        }
        Ok(Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        })
    }

    /// Maximum number of messages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Messages on screen.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// `true` when nothing is on screen.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages oldest first.
    pub fn messages(&self) -> impl DoubleEndedIterator<Item = &ChatMessage> + ExactSizeIterator {
        self.messages.iter()
    }

    /// Append `message`, evicting the oldest one first when full.
    pub fn admit(&mut self, message: ChatMessage) -> Option<ChatMessage> {
        let evicted = if self.messages.len() >= self.capacity {
            self.messages.pop_front()
        } else {
            None
        };
        self.messages.push_back(message);
        evicted
    }

    /// Evict from the front until the simulated layout fits `budget`. Returns the evicted count.
    pub fn foresee_and_evict<F>(&mut self, budget: f64, height_fn: F) -> usize
    where
        F: FnMut(&ChatMessage) -> f64,
    {
        let count = foresee_eviction_count(self.messages.iter(), budget, height_fn);
        self.messages.drain(..count);
        count
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chat/window.rs"]
mod tests;
