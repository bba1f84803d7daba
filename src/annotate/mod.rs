//! Whiteboard annotation replay over a source video.

/// Record decoding into draw/remove events.
pub mod command;
/// Per-frame replay loop.
pub mod engine;
/// Per-page visible annotation set.
pub mod page;

pub use command::{
    AnnotationEvent, Command, CommandParser, DiscardReason, DrawKind, DrawObject, Parsed,
    RemoveDirective,
};
pub use engine::{AnnotateOpts, AnnotationReplayEngine, ReplayStats};
pub use page::PageAnnotationState;
