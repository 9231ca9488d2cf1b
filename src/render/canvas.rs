//! Persistent paint plus a per-frame scratch layer with drop shadow

use super::RenderConfig;
use crate::color::Color;
use crate::display::PixelBuffer;

/// Peak shadow alpha before blurring
const SHADOW_ALPHA: u8 = 96;

/// Accumulated painting.
///
/// Each frame is drawn into a transparent layer, which is then composited
/// onto the paint (over its blurred, offset shadow when enabled).
#[derive(Debug, Clone)]
pub struct Canvas {
    paint: PixelBuffer,
    layer: PixelBuffer,
    config: RenderConfig,
}

impl Canvas {
    pub fn new(width: u32, height: u32, config: &RenderConfig) -> Self {
        let mut canvas = Self {
            paint: PixelBuffer::with_size(width, height),
            layer: PixelBuffer::with_size(width, height),
            config: *config,
        };
        canvas.clear();
        canvas
    }

    pub fn width(&self) -> u32 {
        self.paint.width()
    }

    pub fn height(&self) -> u32 {
        self.paint.height()
    }

    /// The accumulated painting
    pub fn paint(&self) -> &PixelBuffer {
        &self.paint
    }

    /// Wipe back to the background color
    pub fn clear(&mut self) {
        let bg = self.config.background;
        self.paint.clear_rgba(bg.r, bg.g, bg.b, bg.a);
        self.layer.clear_rgba(0, 0, 0, 0);
    }

    /// Fresh transparent layer for this frame's drawing
    pub fn begin_layer(&mut self) -> &mut PixelBuffer {
        self.layer.clear_rgba(0, 0, 0, 0);
        &mut self.layer
    }

    /// Merge the current layer into the paint, shadowed in `shadow_color`
    pub fn commit_layer(&mut self, shadow_color: Color) {
        if self.config.shadow {
            let mut shadow = self.layer.silhouette(shadow_color.r, shadow_color.g, shadow_color.b, SHADOW_ALPHA);
            shadow.box_blur(self.config.shadow_radius);
            let [dx, dy] = self.config.shadow_offset;
            self.paint.composite(&shadow, dx, dy);
        }
        self.paint.composite(&self.layer, 0, 0);
    }
}
