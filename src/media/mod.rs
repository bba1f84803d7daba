//! Source video frames and metadata.

/// `ffmpeg`/`ffprobe` backed decoding and probing.
pub mod ffmpeg;
/// Frame source trait and in-memory sources.
pub mod source;
