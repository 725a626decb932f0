//! Framebuffer and (optionally) the window that shows it.

mod pixel_buffer;
#[cfg(feature = "display")]
mod window;

pub use pixel_buffer::PixelBuffer;
#[cfg(feature = "display")]
pub use window::{Display, InputEvent, RenderTarget};

pub const DEFAULT_WIDTH: usize = 640;
pub const DEFAULT_HEIGHT: usize = 480;
