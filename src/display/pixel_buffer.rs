use std::borrow::Cow;

use crate::color::{ChannelOrder, Color};
use crate::error::{Error, Result};
use crate::grid::{Dimensions, Grid};

// ============================================================================
// PixelBuffer
// ============================================================================

/// Straight-alpha RGBA framebuffer. The renderer composites into this and the
/// display layer uploads it.
pub type PixelBuffer = Grid<Color>;

impl Grid<Color> {
    /// Opaque black buffer of the given size
    pub fn with_size(width: usize, height: usize) -> Result<Self> {
        Self::new(Dimensions::new(width, height), Color::BLACK)
    }

    /// Clear to a solid color
    #[inline]
    pub fn clear(&mut self, color: Color) {
        self.fill(color);
    }

    /// Alpha-over a single pixel (bounds checked, out of range is ignored)
    #[inline]
    pub fn composite_at(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(px) = self.get_mut(x as usize, y as usize) {
            px.add_alpha_over(color);
        }
    }

    /// Scale RGB toward black: `factor` 1.0 keeps, 0.0 blacks out. Alpha is kept.
    pub fn fade(&mut self, factor: f64) {
        let factor = factor.clamp(0.0, 1.0);
        if factor == 1.0 {
            return;
        }
        for px in self.iter_mut() {
            px.r = (f64::from(px.r) * factor) as u8;
            px.g = (f64::from(px.g) * factor) as u8;
            px.b = (f64::from(px.b) * factor) as u8;
        }
    }

    /// Raw RGBA bytes, row-major, no copy
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.as_slice())
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(self.as_mut_slice())
    }

    /// Pixel bytes in the requested channel order. RGBA borrows the storage,
    /// other orders are repacked.
    pub fn formatted_bytes(&self, order: ChannelOrder) -> Cow<'_, [u8]> {
        if order == ChannelOrder::Rgba {
            return Cow::Borrowed(self.as_bytes());
        }
        let mut out = Vec::with_capacity(self.len() * order.len());
        for px in self.iter() {
            px.extend_formatted(order, &mut out);
        }
        Cow::Owned(out)
    }

    /// Rebuild a buffer from bytes produced by [`formatted_bytes`](Self::formatted_bytes).
    /// Three-channel orders restore alpha as 255.
    pub fn from_bytes(dims: Dimensions, order: ChannelOrder, bytes: &[u8]) -> Result<Self> {
        let expected = dims.area() * order.len();
        if bytes.len() != expected {
            return Err(Error::ByteLength {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(order.len())
            .map(|chunk| Color::from_formatted(order, chunk))
            .collect();
        Self::from_vec(dims, pixels)
    }
}
