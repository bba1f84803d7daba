//! Chat transcript replay: a bounded message window rendered onto a blank canvas.

/// Frame-synthesis loop.
pub mod engine;
/// Message layout shared by look-ahead eviction and rendering.
pub mod layout;
/// Parsed chat messages and text cleanup.
pub mod message;
/// Per-sender colors.
pub mod palette;
/// Bounded message window with look-ahead eviction.
pub mod window;

pub use engine::{ChatRenderOpts, ChatReplayEngine, ChatStats};
pub use layout::ChatLayout;
pub use message::ChatMessage;
pub use palette::SenderPalette;
pub use window::{ChatWindow, foresee_eviction_count};
