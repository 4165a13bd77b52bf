//! Shape rasterizer
//!
//! Every primitive walks a bounding box and applies a per-pixel membership
//! test, writing through `Canvas::set_pixel`/`hline` so clipping is free.
//! Degenerate geometry (negative radius, zero axis) draws nothing.

use super::{Canvas, Color, BYTES_PER_PIXEL};
use crate::particles::Particle;
use crate::util::Rng;

/// Flame blob color bands, from the hot core outwards
const FLAME_CORE: Color = Color::rgb(255, 240, 170);
const FLAME_MID: Color = Color::rgb(255, 130, 10);
const FLAME_EDGE: Color = Color::rgb(170, 30, 70);

impl Canvas {
    // ========================================================================
    // Circles and ellipses
    // ========================================================================

    /// Filled circle: dx² + dy² <= r²
    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        if radius < 0 {
            return;
        }
        let r_sq = i64::from(radius) * i64::from(radius);
        for y in cy - radius..=cy + radius {
            let dy = i64::from(y - cy);
            for x in cx - radius..=cx + radius {
                let dx = i64::from(x - cx);
                if dx * dx + dy * dy <= r_sq {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Annulus: inner² < dist² <= outer²
    pub fn ring(&mut self, cx: i32, cy: i32, inner: i32, outer: i32, color: Color) {
        if outer < 0 || inner >= outer {
            return;
        }
        let outer_sq = i64::from(outer) * i64::from(outer);
        let inner_sq = if inner < 0 {
            -1
        } else {
            i64::from(inner) * i64::from(inner)
        };
        for y in cy - outer..=cy + outer {
            let dy = i64::from(y - cy);
            for x in cx - outer..=cx + outer {
                let dx = i64::from(x - cx);
                let dist_sq = dx * dx + dy * dy;
                if dist_sq <= outer_sq && dist_sq > inner_sq {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Filled axis-aligned ellipse: (dx/rx)² + (dy/ry)² <= 1
    pub fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Color) {
        if rx <= 0 || ry <= 0 {
            return;
        }
        let (rx_f, ry_f) = (rx as f32, ry as f32);
        for y in cy - ry..=cy + ry {
            let ny = (y - cy) as f32 / ry_f;
            for x in cx - rx..=cx + rx {
                let nx = (x - cx) as f32 / rx_f;
                if nx * nx + ny * ny <= 1.0 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    // ========================================================================
    // Highlights
    // ========================================================================

    /// Four-pointed star: one triangle per axis direction, each `size / 2`
    /// wide on either side at the center and narrowing to a point `size / 2`
    /// away. The triangles overlap; same color, so order does not matter.
    /// Together they cover |dx| + |dy| <= size / 2.
    pub fn star_highlight(&mut self, cx: i32, cy: i32, size: i32, color: Color) {
        if size < 0 {
            return;
        }
        let half = size / 2;
        for t in 0..=half {
            let w = half - t;
            self.hline(cx - w, cx + w, cy - t, color); // up
            self.hline(cx - w, cx + w, cy + t, color); // down
            self.vline(cx - t, cy - w, cy + w, color); // left
            self.vline(cx + t, cy - w, cy + w, color); // right
        }
    }

    // ========================================================================
    // Post effects
    // ========================================================================

    /// Whole-frame camera shake: one random offset in [-intensity, intensity]²
    /// per call, resampled from a snapshot. Samples falling outside the
    /// canvas leave the destination pixel as it was.
    pub fn screen_shake(&mut self, intensity: i32, rng: &mut Rng) {
        if intensity <= 0 {
            return;
        }
        let ox = rng.range_i32(-intensity, intensity);
        let oy = rng.range_i32(-intensity, intensity);
        if ox == 0 && oy == 0 {
            return;
        }

        let snapshot = self.as_bytes().to_vec();
        let width = self.width() as i32;
        let height = self.height() as i32;
        let pixels = self.as_bytes_mut();
        for y in 0..height {
            let sy = y + oy;
            if sy < 0 || sy >= height {
                continue;
            }
            for x in 0..width {
                let sx = x + ox;
                if sx < 0 || sx >= width {
                    continue;
                }
                let dst = (y * width + x) as usize * BYTES_PER_PIXEL;
                let src = (sy * width + sx) as usize * BYTES_PER_PIXEL;
                pixels[dst..dst + BYTES_PER_PIXEL]
                    .copy_from_slice(&snapshot[src..src + BYTES_PER_PIXEL]);
            }
        }
    }

    /// Radial flame blob for one particle.
    /// radius = size * life * flicker; color band chosen by normalized
    /// distance, then shaded by (1 - d) * life * flicker.
    pub fn particle_blob(&mut self, particle: &Particle) {
        let radius = particle.size * particle.life * particle.flicker;
        if radius <= 0.0 {
            return;
        }
        let reach = radius.ceil() as i32;
        let (px, py) = (particle.x, particle.y);
        for y in py - reach..=py + reach {
            let dy = (y - py) as f32;
            for x in px - reach..=px + reach {
                let dx = (x - px) as f32;
                let d = (dx * dx + dy * dy).sqrt() / radius;
                if d > 1.0 {
                    continue;
                }
                let band = if d < 0.3 {
                    FLAME_CORE
                } else if d <= 0.7 {
                    FLAME_MID
                } else {
                    FLAME_EDGE
                };
                let shade = (1.0 - d) * particle.life * particle.flicker;
                self.set_pixel(x, y, band.scaled(shade));
            }
        }
    }
}
