//! Frames and drawing surfaces.

/// `vello_cpu` drawing surface.
pub mod cpu;
/// Frame pixel buffers.
pub mod frame;
/// Drawing-surface and text-measurement traits.
pub mod surface;
/// Font loading and Parley text layout.
pub mod text;
