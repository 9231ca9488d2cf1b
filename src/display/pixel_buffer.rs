
// ============================================================================
// Utility Functions
// ============================================================================

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    dest[0] = a; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

/// Source-over blend of one color into an ABGR pixel.
/// Handles translucent destinations so scratch layers composite correctly;
/// for opaque destinations this is the classic lerp.
#[inline]
fn blend_over(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    if a == 0 {
        return;
    }
    if a == 255 {
        write_pixel(dest, r, g, b, 255);
        return;
    }

    let sa = a as u32;
    let inv = 255 - sa;
    let da = (dest[0] as u32 * inv + 127) / 255;
    let out_a = sa + da;
    if out_a == 0 {
        return;
    }
    let half = out_a / 2;
    let mix = |src: u8, dst: u8| ((src as u32 * sa + dst as u32 * da + half) / out_a) as u8;

    dest[1] = mix(b, dest[1]);
    dest[2] = mix(g, dest[2]);
    dest[3] = mix(r, dest[3]);
    dest[0] = out_a.min(255) as u8;
}

#[inline]
fn scale_alpha(a: u8, coverage: f32) -> u8 {
    (a as f32 * coverage.clamp(0.0, 1.0)).round() as u8
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering.
/// Paint accumulates here; the window uploads it as a streaming texture.
#[derive(Clone)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Create a fully transparent buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    /// Clear to an opaque solid color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        self.clear_rgba(r, g, b, 255);
    }

    /// Clear to a solid color with custom alpha (0 for scratch layers)
    pub fn clear_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            write_pixel(chunk, r, g, b, a);
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel_rgba(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b, a);
        }
    }

    /// Read all 4 channels of a pixel (bounds checked)
    /// Returns (r, g, b, a) or None if out of bounds
    #[inline]
    pub fn get_pixel_rgba(&self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
                self.pixels[idx],     // A
            ))
        } else {
            None
        }
    }

    /// Read a pixel's color channels (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        self.get_pixel_rgba(x, y).map(|(r, g, b, _)| (r, g, b))
    }

    /// Set pixel with source-over alpha blending
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            blend_over(&mut self.pixels[idx..idx + 4], r, g, b, a);
        }
    }

    /// Draw a horizontal line with alpha blending
    pub fn hline_blend(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if y < 0 || y >= self.height as i32 || a == 0 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        // Compute starting index once, then increment by 4 per pixel
        let mut idx = self.pixel_index(start as u32, y as u32);
        let count = (end - start + 1) as usize;
        for _ in 0..count {
            blend_over(&mut self.pixels[idx..idx + 4], r, g, b, a);
            idx += 4;
        }
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    /// Fill an axis-aligned ellipse with alpha blending using horizontal spans.
    /// Sub-pixel ellipses collapse to a single blended pixel.
    pub fn fill_ellipse_blend(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, r: u8, g: u8, b: u8, a: u8) {
        if !(cx.is_finite() && cy.is_finite() && rx.is_finite() && ry.is_finite()) || a == 0 {
            return;
        }
        let rx = rx.abs();
        let ry = ry.abs();
        if rx < 0.5 || ry < 0.5 {
            self.blend_pixel(cx.floor() as i32, cy.floor() as i32, r, g, b, a);
            return;
        }

        let y_start = ((cy - ry).floor() as i32).max(0);
        let y_end = ((cy + ry).ceil() as i32).min(self.height as i32 - 1);

        for y in y_start..=y_end {
            // Sample at pixel centers
            let dy = (y as f32 + 0.5 - cy) / ry;
            if dy.abs() > 1.0 {
                continue;
            }
            let half = rx * (1.0 - dy * dy).sqrt();
            let x1 = (cx - half).round() as i32;
            let x2 = (cx + half).round() as i32 - 1;
            if x2 >= x1 {
                self.hline_blend(x1, x2, y, r, g, b, a);
            }
        }
    }

    /// Outline an axis-aligned ellipse with anti-aliased segments
    pub fn stroke_ellipse_blend(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, r: u8, g: u8, b: u8, a: u8) {
        if !(cx.is_finite() && cy.is_finite() && rx.is_finite() && ry.is_finite()) || a == 0 {
            return;
        }
        let rx = rx.abs();
        let ry = ry.abs();
        if rx < 0.5 && ry < 0.5 {
            self.blend_pixel(cx.floor() as i32, cy.floor() as i32, r, g, b, a);
            return;
        }

        // Roughly one segment per 3px of circumference
        let circumference = std::f32::consts::TAU * ((rx * rx + ry * ry) / 2.0).sqrt();
        let segments = ((circumference / 3.0) as usize).clamp(8, 96);
        let outline: Vec<(f32, f32)> = (0..segments)
            .map(|i| {
                let t = i as f32 / segments as f32 * std::f32::consts::TAU;
                (cx + rx * t.cos(), cy + ry * t.sin())
            })
            .collect();
        self.polyline_closed_aa(&outline, r, g, b, a);
    }

    /// Fill a polygon with alpha blending using the scanline algorithm
    pub fn fill_polygon_blend(&mut self, vertices: &[(f32, f32)], r: u8, g: u8, b: u8, a: u8) {
        if vertices.len() < 3 || a == 0 {
            return;
        }

        let mut min_y = f32::MAX;
        let mut max_y = f32::MIN;
        for (_, y) in vertices {
            if !y.is_finite() {
                return;
            }
            min_y = min_y.min(*y);
            max_y = max_y.max(*y);
        }

        let min_y = (min_y as i32).max(0);
        let max_y = (max_y as i32).min(self.height as i32 - 1);

        // Preallocate intersection buffer (reused per scanline)
        let mut intersections = Vec::with_capacity(vertices.len());
        let n = vertices.len();

        for y in min_y..=max_y {
            intersections.clear();
            let yf = y as f32 + 0.5;

            for i in 0..n {
                let (x1, y1) = vertices[i];
                let (x2, y2) = vertices[(i + 1) % n];

                if (y1 <= yf && y2 > yf) || (y2 <= yf && y1 > yf) {
                    let x = x1 + (yf - y1) / (y2 - y1) * (x2 - x1);
                    intersections.push(x.round() as i32);
                }
            }

            intersections.sort_unstable();
            for pair in intersections.chunks_exact(2) {
                if pair[1] > pair[0] {
                    self.hline_blend(pair[0], pair[1] - 1, y, r, g, b, a);
                }
            }
        }
    }

    /// Closed anti-aliased polyline (last vertex joins the first)
    pub fn polyline_closed_aa(&mut self, vertices: &[(f32, f32)], r: u8, g: u8, b: u8, a: u8) {
        let n = vertices.len();
        if n < 2 {
            return;
        }
        for i in 0..n {
            let (x0, y0) = vertices[i];
            let (x1, y1) = vertices[(i + 1) % n];
            self.line_aa(x0, y0, x1, y1, r, g, b, a);
        }
    }

    // ========================================================================
    // Anti-aliased Drawing
    // Composes: blend_pixel
    // ========================================================================

    /// Anti-aliased line using Xiaolin Wu's algorithm.
    /// Accepts f32 endpoints for subpixel precision; `a` scales the coverage.
    pub fn line_aa(
        &mut self,
        mut x0: f32,
        mut y0: f32,
        mut x1: f32,
        mut y1: f32,
        r: u8,
        g: u8,
        b: u8,
        a: u8,
    ) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) || a == 0 {
            return;
        }

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            std::mem::swap(&mut x0, &mut y0);
            std::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
            std::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = y1 - y0;
        let gradient = if dx.abs() < 0.001 { 1.0 } else { dy / dx };

        let plot = |buf: &mut Self, px: i32, py: i32, coverage: f32| {
            let alpha = scale_alpha(a, coverage);
            if steep {
                buf.blend_pixel(py, px, r, g, b, alpha);
            } else {
                buf.blend_pixel(px, py, r, g, b, alpha);
            }
        };

        // First endpoint
        let xend = x0.round();
        let yend = y0 + gradient * (xend - x0);
        let xgap = 1.0 - (x0 + 0.5).fract();
        let xpxl1 = xend as i32;
        let ypxl1 = yend.floor() as i32;
        let fpart = yend - yend.floor();
        plot(self, xpxl1, ypxl1, (1.0 - fpart) * xgap);
        plot(self, xpxl1, ypxl1 + 1, fpart * xgap);
        let mut intery = yend + gradient;

        // Second endpoint
        let xend = x1.round();
        let yend = y1 + gradient * (xend - x1);
        let xgap = (x1 + 0.5).fract();
        let xpxl2 = xend as i32;
        let ypxl2 = yend.floor() as i32;
        let fpart = yend - yend.floor();
        if xpxl2 != xpxl1 {
            plot(self, xpxl2, ypxl2, (1.0 - fpart) * xgap);
            plot(self, xpxl2, ypxl2 + 1, fpart * xgap);
        }

        // Main line body
        for x in (xpxl1 + 1)..xpxl2 {
            let fpart = intery - intery.floor();
            let ipart = intery.floor() as i32;
            plot(self, x, ipart, 1.0 - fpart);
            plot(self, x, ipart + 1, fpart);
            intery += gradient;
        }
    }

    // ========================================================================
    // Buffer Operations
    // ========================================================================

    /// Composite a source buffer onto this one at (dst_x, dst_y) using
    /// per-pixel source alpha (source-over).
    /// Skips fully transparent pixels; fast-copies fully opaque ones.
    pub fn composite(&mut self, src: &PixelBuffer, dst_x: i32, dst_y: i32) {
        let src_w = src.width() as i32;
        let src_h = src.height() as i32;
        let dst_w = self.width as i32;
        let dst_h = self.height as i32;

        for sy in 0..src_h {
            let dy = dst_y + sy;
            if dy < 0 || dy >= dst_h {
                continue;
            }

            for sx in 0..src_w {
                let dx = dst_x + sx;
                if dx < 0 || dx >= dst_w {
                    continue;
                }

                let si = src.pixel_index(sx as u32, sy as u32);
                let sa = src.pixels[si];
                if sa == 0 {
                    continue;
                }

                let di = self.pixel_index(dx as u32, dy as u32);
                blend_over(
                    &mut self.pixels[di..di + 4],
                    src.pixels[si + 3],
                    src.pixels[si + 2],
                    src.pixels[si + 1],
                    sa,
                );
            }
        }
    }

    /// Tinted silhouette of this buffer's alpha: every covered pixel becomes
    /// `(r, g, b)` with its coverage scaled by `a`.
    pub fn silhouette(&self, r: u8, g: u8, b: u8, a: u8) -> PixelBuffer {
        let mut out = PixelBuffer::with_size(self.width, self.height);
        for (dst, src) in out.pixels.chunks_exact_mut(4).zip(self.pixels.chunks_exact(4)) {
            if src[0] != 0 {
                write_pixel(dst, r, g, b, ((src[0] as u32 * a as u32 + 127) / 255) as u8);
            }
        }
        out
    }

    /// Separable box blur using a sliding window.
    /// O(width*height) regardless of radius. Clamps at edges.
    ///
    /// Color is weighted by alpha, so transparent neighbours thin the
    /// coverage without pulling the tint toward black.
    pub fn box_blur(&mut self, radius: u32) {
        if radius == 0 || self.width == 0 || self.height == 0 {
            return;
        }
        let w = self.width as i32;
        let h = self.height as i32;
        let r = radius as i32;
        let stride = self.width as usize;
        let area = (2 * radius as u64 + 1).pow(2);

        // Premultiplied, alpha scaled by 255 to share the color channels' range
        let premul: Vec<u64> = self
            .pixels
            .chunks_exact(4)
            .flat_map(|px| {
                let a = px[0] as u64;
                [a * 255, px[1] as u64 * a, px[2] as u64 * a, px[3] as u64 * a]
            })
            .collect();
        let mut temp = vec![0u64; premul.len()];

        // --- Horizontal pass: window sums of premul → temp ---
        for y in 0..h {
            let row = y as usize * stride;
            let mut sums = [0u64; 4];
            for i in -r..=r {
                let idx = (row + i.clamp(0, w - 1) as usize) * 4;
                for c in 0..4 {
                    sums[c] += premul[idx + c];
                }
            }
            for x in 0..w {
                let idx = (row + x as usize) * 4;
                temp[idx..idx + 4].copy_from_slice(&sums);
                let leave = (row + (x - r).clamp(0, w - 1) as usize) * 4;
                let enter = (row + (x + r + 1).clamp(0, w - 1) as usize) * 4;
                for c in 0..4 {
                    sums[c] = sums[c] + premul[enter + c] - premul[leave + c];
                }
            }
        }

        // --- Vertical pass: temp → self.pixels, back to straight alpha ---
        for x in 0..w {
            let col = x as usize;
            let mut sums = [0u64; 4];
            for i in -r..=r {
                let idx = (i.clamp(0, h - 1) as usize * stride + col) * 4;
                for c in 0..4 {
                    sums[c] += temp[idx + c];
                }
            }
            for y in 0..h {
                let idx = (y as usize * stride + col) * 4;
                let weight = sums[0];
                let dest = &mut self.pixels[idx..idx + 4];
                if weight == 0 {
                    dest.fill(0);
                } else {
                    let straight = |sum: u64| ((sum * 255 + weight / 2) / weight).min(255) as u8;
                    dest[0] = ((weight + 255 * area / 2) / (255 * area)).min(255) as u8;
                    dest[1] = straight(sums[1]);
                    dest[2] = straight(sums[2]);
                    dest[3] = straight(sums[3]);
                }
                let leave = ((y - r).clamp(0, h - 1) as usize * stride + col) * 4;
                let enter = ((y + r + 1).clamp(0, h - 1) as usize * stride + col) * 4;
                for c in 0..4 {
                    sums[c] = sums[c] + temp[enter + c] - temp[leave + c];
                }
            }
        }
    }

    /// Raw ABGR bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Straight RGBA bytes, row-major, for export as an opaque bitmap
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len());
        for px in self.pixels.chunks_exact(4) {
            out.extend_from_slice(&[px[3], px[2], px[1], px[0]]);
        }
        out
    }

    /// Number of pixels with any coverage
    pub fn covered_pixels(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[0] != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent() {
        let buf = PixelBuffer::with_size(8, 8);
        assert_eq!(buf.covered_pixels(), 0);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((0, 0, 0, 0)));
        assert_eq!(buf.get_pixel_rgba(8, 0), None);
    }

    #[test]
    fn test_blend_over_opaque_destination() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.clear(0, 0, 0);
        buf.blend_pixel(0, 0, 255, 255, 255, 128);
        let (r, g, b, a) = buf.get_pixel_rgba(0, 0).unwrap();
        assert_eq!(a, 255);
        assert!((127..=129).contains(&r) && r == g && g == b);
    }

    #[test]
    fn test_blend_over_transparent_destination_keeps_color() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.blend_pixel(0, 0, 200, 10, 20, 100);
        assert_eq!(buf.get_pixel_rgba(0, 0), Some((200, 10, 20, 100)));
    }

    #[test]
    fn test_fill_ellipse_covers_center_not_corners() {
        let mut buf = PixelBuffer::with_size(20, 20);
        buf.fill_ellipse_blend(10.0, 10.0, 6.0, 3.0, 255, 0, 0, 255);
        assert_eq!(buf.get_pixel(10, 10), Some((255, 0, 0)));
        assert_eq!(buf.get_pixel_rgba(10, 16).map(|p| p.3), Some(0));
        assert_eq!(buf.get_pixel_rgba(0, 0).map(|p| p.3), Some(0));
    }

    #[test]
    fn test_degenerate_shapes_do_not_panic() {
        let mut buf = PixelBuffer::with_size(10, 10);
        buf.fill_ellipse_blend(f32::NAN, 1.0, 3.0, 3.0, 1, 2, 3, 255);
        buf.line_aa(1.0, 1.0, 1.0, 1.0, 1, 2, 3, 255);
        buf.line_aa(-100.0, -100.0, 100.0, 100.0, 1, 2, 3, 255);
        buf.fill_polygon_blend(&[(0.0, 0.0), (5.0, 5.0)], 1, 2, 3, 255);
        buf.stroke_ellipse_blend(5.0, 5.0, 0.1, 0.1, 1, 2, 3, 255);
        assert!(buf.covered_pixels() > 0);
    }

    #[test]
    fn test_fill_polygon_blend() {
        let mut buf = PixelBuffer::with_size(10, 10);
        buf.fill_polygon_blend(&[(1.0, 1.0), (9.0, 1.0), (9.0, 9.0), (1.0, 9.0)], 0, 255, 0, 255);
        assert_eq!(buf.get_pixel(5, 5), Some((0, 255, 0)));
        assert_eq!(buf.get_pixel_rgba(0, 5).map(|p| p.3), Some(0));
    }

    #[test]
    fn test_composite_and_silhouette() {
        let mut layer = PixelBuffer::with_size(4, 4);
        layer.set_pixel_rgba(1, 1, 255, 0, 0, 255);
        let shadow = layer.silhouette(0, 0, 0, 128);
        assert_eq!(shadow.get_pixel_rgba(1, 1), Some((0, 0, 0, 128)));
        assert_eq!(shadow.get_pixel_rgba(0, 0), Some((0, 0, 0, 0)));

        let mut canvas = PixelBuffer::with_size(4, 4);
        canvas.clear(255, 255, 255);
        canvas.composite(&layer, 1, 0);
        assert_eq!(canvas.get_pixel(2, 1), Some((255, 0, 0)));
        assert_eq!(canvas.get_pixel(1, 1), Some((255, 255, 255)));
    }

    #[test]
    fn test_box_blur_spreads_alpha() {
        let mut buf = PixelBuffer::with_size(9, 9);
        buf.set_pixel_rgba(4, 4, 0, 0, 0, 255);
        buf.box_blur(1);
        let (_, _, _, center) = buf.get_pixel_rgba(4, 4).unwrap();
        let (_, _, _, near) = buf.get_pixel_rgba(5, 5).unwrap();
        let (_, _, _, far) = buf.get_pixel_rgba(0, 0).unwrap();
        assert!(center > 0 && near > 0);
        assert_eq!(far, 0);
    }

    #[test]
    fn test_box_blur_keeps_tint_at_edges() {
        let mut buf = PixelBuffer::with_size(9, 9);
        for y in 3..6 {
            for x in 3..6 {
                buf.set_pixel_rgba(x, y, 255, 0, 0, 96);
            }
        }
        buf.box_blur(2);
        let (r, g, b, a) = buf.get_pixel_rgba(1, 4).unwrap();
        assert!(a > 0 && a < 96);
        assert_eq!((r, g, b), (255, 0, 0));
        assert_eq!(buf.get_pixel_rgba(8, 8), Some((0, 0, 0, 0)));
    }

    #[test]
    fn test_to_rgba_order() {
        let mut buf = PixelBuffer::with_size(1, 1);
        buf.set_pixel_rgba(0, 0, 1, 2, 3, 4);
        assert_eq!(buf.to_rgba(), vec![1, 2, 3, 4]);
    }
}
