//! Drawing for Canvas Runner.
//!
//! Everything here is host-agnostic: the scene is drawn through the
//! [`DrawSurface`] trait, backed by [`PixelCanvas`] in the app and by
//! [`RecordingSurface`] in tests.

pub mod pixel_canvas;
pub mod recording;
pub mod scene;
pub mod surface;

pub use pixel_canvas::PixelCanvas;
pub use recording::{DrawCommand, RecordingSurface};
pub use scene::{render, render_backdrop, render_sprite, sprite_extent};
pub use surface::DrawSurface;
