use crate::util::lerp_color;

/// A color stop for radial gradients: (offset in [0, 1], color)
pub type GradientStop = (f32, (u8, u8, u8));

// ============================================================================
// Utility Functions
// ============================================================================

/// Write ABGR pixel to slice (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel(dest: &mut [u8], r: u8, g: u8, b: u8) {
    dest[0] = 255; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

/// Color at offset `t` along a list of stops sorted by offset.
/// Clamps to the first and last stop outside their range.
fn gradient_at(stops: &[GradientStop], t: f32) -> (u8, u8, u8) {
    let (first_offset, first_color) = stops[0];
    if t <= first_offset {
        return first_color;
    }
    for pair in stops.windows(2) {
        let (a, color_a) = pair[0];
        let (b, color_b) = pair[1];
        if t <= b {
            let span = b - a;
            let f = if span > 0.0 { (t - a) / span } else { 1.0 };
            return lerp_color(color_a, color_b, f);
        }
    }
    stops[stops.len() - 1].1
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering
/// This is the canvas the particle field paints into
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with custom resolution
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

    /// Clear to a solid color
    /// Optimized: uses u32 fill for maximum speed
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        // Create ABGR u32 pattern
        let pixel = u32::from_ne_bytes([255, b, g, r]);

        // Safety: pixels.len() is always divisible by 4 (width * height * 4).
        // We use write_unaligned to avoid assuming alignment of Vec<u8>.
        let ptr = self.pixels.as_mut_ptr() as *mut u32;
        let len = self.pixels.len() / 4;

        for i in 0..len {
            // Safety: i < len ensures we stay within bounds
            unsafe {
                ptr.add(i).write_unaligned(pixel);
            }
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Draw a horizontal line
    /// Optimized: computes starting index once, then increments by 4
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let mut idx = self.pixel_index(start as u32, y as u32);
        let count = (end - start + 1) as usize;
        for _ in 0..count {
            write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
            idx += 4;
        }
    }

    /// Pixel columns whose centers fall inside the circle on row `y`,
    /// or None if the row misses it
    #[inline]
    fn circle_span(cx: f32, cy: f32, radius: f32, y: i32) -> Option<(i32, i32)> {
        let dy = y as f32 + 0.5 - cy;
        let h_sq = radius * radius - dy * dy;
        if h_sq < 0.0 {
            return None;
        }
        let half = h_sq.sqrt();
        let x1 = (cx - half - 0.5).ceil() as i32;
        let x2 = (cx + half - 0.5).floor() as i32;
        (x1 <= x2).then_some((x1, x2))
    }

    /// Solid circle at a subpixel center. A pixel is covered when its
    /// center lies inside the circle.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, r: u8, g: u8, b: u8) {
        if radius <= 0.0 {
            return;
        }
        let y_start = ((cy - radius).floor() as i32).max(0);
        let y_end = ((cy + radius).ceil() as i32).min(self.height as i32 - 1);

        for y in y_start..=y_end {
            if let Some((x1, x2)) = Self::circle_span(cx, cy, radius, y) {
                self.hline(x1, x2, y, r, g, b);
            }
        }
    }

    /// Circle filled with a radial gradient from its center (offset 0) to
    /// its rim (offset 1). Pixels are written opaque, so overlapping glows
    /// replace each other instead of accumulating.
    pub fn fill_circle_radial(&mut self, cx: f32, cy: f32, radius: f32, stops: &[GradientStop]) {
        if radius <= 0.0 || stops.is_empty() {
            return;
        }
        let y_start = ((cy - radius).floor() as i32).max(0);
        let y_end = ((cy + radius).ceil() as i32).min(self.height as i32 - 1);
        let inv_radius = 1.0 / radius;

        for y in y_start..=y_end {
            let Some((x1, x2)) = Self::circle_span(cx, cy, radius, y) else {
                continue;
            };
            let dy = y as f32 + 0.5 - cy;
            let start = x1.max(0);
            let end = x2.min(self.width as i32 - 1);
            for x in start..=end {
                let dx = x as f32 + 0.5 - cx;
                let t = (dx * dx + dy * dy).sqrt() * inv_radius;
                let (r, g, b) = gradient_at(stops, t);
                let idx = self.pixel_index(x as u32, y as u32);
                write_pixel(&mut self.pixels[idx..idx + 4], r, g, b);
            }
        }
    }

    /// Fade the entire buffer (multiply all colors by factor)
    /// factor: 0.0 = black, 1.0 = unchanged
    pub fn fade(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        let factor_u16 = (factor * 256.0) as u16;

        for chunk in self.pixels.chunks_exact_mut(4) {
            // Skip alpha (chunk[0]), fade RGB using bit shift instead of division
            chunk[1] = ((chunk[1] as u16 * factor_u16) >> 8) as u8;
            chunk[2] = ((chunk[2] as u16 * factor_u16) >> 8) as u8;
            chunk[3] = ((chunk[3] as u16 * factor_u16) >> 8) as u8;
        }
    }

    /// Composite black at `opacity` over the whole buffer
    pub fn darken(&mut self, opacity: f32) {
        self.fade(1.0 - opacity.clamp(0.0, 1.0));
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}
