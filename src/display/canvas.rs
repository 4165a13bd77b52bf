use super::{Color, BYTES_PER_PIXEL, CANVAS_HEIGHT, CANVAS_WIDTH};

// ============================================================================
// Utility Functions
// ============================================================================

/// Write RGB pixel to slice (RGB888, row-major)
#[inline]
fn write_pixel(dest: &mut [u8], color: Color) {
    dest[0] = color.r;
    dest[1] = color.g;
    dest[2] = color.b;
}

// ============================================================================
// Canvas
// ============================================================================

/// RGB888 pixel buffer for one eye, one frame
/// Every write is clipped, so drawing code may pass any coordinate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Create a canvas at panel resolution (240x240), cleared to black
    pub fn new() -> Self {
        Self::with_size(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    /// Create a canvas with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
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

    /// Center pixel, the origin every eye feature is laid out from
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        (self.width as i32 / 2, self.height as i32 / 2)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// Clear to a solid color
    pub fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            write_pixel(px, color);
        }
    }

    /// Set a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + BYTES_PER_PIXEL], color);
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some(Color::rgb(
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
            ))
        } else {
            None
        }
    }

    /// Draw a horizontal span, both ends inclusive and in any order
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let from = self.pixel_index(start as u32, y as u32);
        let to = self.pixel_index(end as u32, y as u32) + BYTES_PER_PIXEL;
        for px in self.pixels[from..to].chunks_exact_mut(BYTES_PER_PIXEL) {
            write_pixel(px, color);
        }
    }

    /// Draw a vertical span, both ends inclusive and in any order
    pub fn vline(&mut self, x: i32, y1: i32, y2: i32, color: Color) {
        if x < 0 || x >= self.width as i32 {
            return;
        }
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        for y in y1.max(0)..=y2.min(self.height as i32 - 1) {
            self.set_pixel(x, y, color);
        }
    }

    /// Fill a rectangle region (clipped)
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        if w == 0 {
            return;
        }
        for row in y..y.saturating_add(h as i32) {
            self.hline(x, x.saturating_add(w as i32 - 1), row, color);
        }
    }

    /// Copy all pixels from another canvas of the same size
    pub fn copy_from(&mut self, src: &Canvas) {
        if self.width == src.width && self.height == src.height {
            self.pixels.copy_from_slice(&src.pixels);
        }
    }

    /// Raw RGB888 bytes, row-major
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Total byte size (width * height * 3)
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}
