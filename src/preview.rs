//! Tool icons: a sample blob grown in isolation

use crate::color::Color;
use crate::display::PixelBuffer;
use crate::geometry::Point;
use crate::growth::Blob;
use crate::render::Renderer;
use crate::tool::{branch_count, Tool};
use rand::Rng;

/// Grow a throwaway blob at the center of a `size`x`size` white icon,
/// drawing it after every one of `generations` growth steps.
/// The result depends only on the tool and the RNG state.
pub fn render_preview<R: Rng + ?Sized>(tool: &Tool, size: u32, generations: u32, rng: &mut R) -> PixelBuffer {
    let mut icon = PixelBuffer::with_size(size, size);
    icon.clear(Color::WHITE.r, Color::WHITE.g, Color::WHITE.b);

    let half = size as f64 / 2.0;
    let mut blob = Blob::new(Point::new(half, half), branch_count(tool, rng));
    let renderer = Renderer::default();

    for _ in 0..generations {
        blob.grow(tool, 1.0, generations, rng);
        renderer.render_blob(&blob, tool, 1.0, &mut icon, rng);
    }
    icon
}
