use super::{
    palette, BaseLook, EyelidPreset, EyelidStyle, ExpressionState, HighlightStyle, TearTrail,
    EYE_RADIUS, HIGHLIGHT_OFFSET, HIGHLIGHT_RADIUS, IRIS_RING_WIDTH,
};
use crate::display::{Canvas, PanelSet, PanelSide};
use crate::particles::ParticleSystem;
use crate::util::Rng;

/// Flames rise from just below the eye center
const FLAME_ANCHOR_DY: i32 = 30;

/// Eyebrow bar geometry, relative to the eye center
const BROW_Y: i32 = -92;
const BROW_HALF_LENGTH: i32 = 70;
const BROW_HALF_THICKNESS: i32 = 7;
/// Rows dropped per column towards the nose
const BROW_SLOPE: f32 = 0.35;

/// Renders `ExpressionState`s onto canvases.
/// Owns the per-eye flame pools and the shake generator, so consecutive
/// frames animate continuously.
#[derive(Debug, Clone)]
pub struct Composer {
    flames: PanelSet<ParticleSystem>,
    shake_rng: Rng,
}

impl Composer {
    pub fn new(particle_count: usize, seed: u64) -> Self {
        // decorrelate the two eyes so their flames do not move in lockstep
        let flames = PanelSet::from_fn(|side| {
            let salt = (u64::from(side.id()) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
            ParticleSystem::new(particle_count, seed ^ salt)
        });
        Self {
            flames,
            shake_rng: Rng::new(seed.wrapping_add(0x5EED)),
        }
    }

    pub fn particles(&self, side: PanelSide) -> &ParticleSystem {
        &self.flames[side]
    }

    /// Draw one eye. Layers, bottom to top: background, eye white, pupil,
    /// iris ring, highlight, eyelid, tear, eyebrow, flames; shake last.
    pub fn compose(
        &mut self,
        canvas: &mut Canvas,
        state: &ExpressionState,
        side: PanelSide,
        frame_index: u64,
    ) {
        let (cx, cy) = canvas.center();
        canvas.clear(state.background());

        match state.look {
            BaseLook::Open => {
                draw_open_eye(canvas, state);
                if let Some(tear) = &state.tear {
                    draw_tear_trail(canvas, tear, side);
                }
            }
            BaseLook::Closed { half_height } => {
                canvas.fill_ellipse(cx, cy, EYE_RADIUS, half_height, palette::EYELID);
            }
        }

        if state.eyebrow {
            draw_eyebrow(canvas, side);
        }
        if state.particles {
            self.flames[side].tick(canvas, (cx, cy + FLAME_ANCHOR_DY), frame_index);
        }
        canvas.screen_shake(state.shake_px(), &mut self.shake_rng);
    }
}

fn draw_open_eye(canvas: &mut Canvas, state: &ExpressionState) {
    let (cx, cy) = canvas.center();
    canvas.fill_circle(cx, cy, EYE_RADIUS, palette::EYE_WHITE);

    let (px, py) = (cx + state.pupil_offset.0, cy + state.pupil_offset.1);
    let pupil = state.pupil_radius();
    canvas.fill_circle(px, py, pupil, palette::PUPIL);
    canvas.ring(px, py, pupil, pupil + IRIS_RING_WIDTH, state.iris());

    if state.show_highlight {
        let (hx, hy) = (px + HIGHLIGHT_OFFSET.0, py + HIGHLIGHT_OFFSET.1);
        match state.highlight {
            HighlightStyle::Circle => {
                canvas.fill_circle(hx, hy, HIGHLIGHT_RADIUS, palette::HIGHLIGHT);
            }
            HighlightStyle::Star => {
                canvas.star_highlight(hx, hy, HIGHLIGHT_RADIUS * 2, palette::HIGHLIGHT);
            }
        }
    }

    if state.eyelid > 0.0 {
        match state.eyelid_style {
            EyelidStyle::Sweep => draw_sweep_lid(canvas, state.eyelid),
            EyelidStyle::Ellipse(preset) => draw_elliptic_lids(canvas, state.eyelid, &preset),
        }
    }
}

/// Lid descending from the top of the eye disk; coverage 1.0 hides the disk
fn draw_sweep_lid(canvas: &mut Canvas, coverage: f32) {
    let (cx, cy) = canvas.center();
    let top = cy - EYE_RADIUS;
    let rows = (coverage.clamp(0.0, 1.0) * (2 * EYE_RADIUS) as f32).round() as i32;
    let r_sq = f64::from(EYE_RADIUS * EYE_RADIUS);
    for y in top..top + rows {
        let dy = f64::from(y - cy);
        let half = (r_sq - dy * dy).max(0.0).sqrt().floor() as i32;
        canvas.hline(cx - half, cx + half, y, palette::EYELID);
    }
}

/// Upper and lower lids closing towards the middle, plus a bridging band
/// once the combined coverage passes the preset's threshold
fn draw_elliptic_lids(canvas: &mut Canvas, coverage: f32, preset: &EyelidPreset) {
    let (cx, cy) = canvas.center();
    let coverage = coverage.clamp(0.0, 1.0);
    let rx = EYE_RADIUS + preset.overhang;
    let ry = EYE_RADIUS;
    let lid_rows = |share: f32| (coverage * share * ry as f32 * preset.height_scale) as i32;

    let in_lid = |dx: i32, depth: i32, rows: i32| {
        let nx = dx as f32 / rx as f32;
        let ny = depth as f32 / rows as f32 - preset.curve_bias;
        preset.x_weight * nx * nx + preset.curve_weight * ny * ny <= 1.0
    };

    let upper = lid_rows(preset.upper_share);
    let top = cy - ry;
    for depth in 0..upper {
        for dx in -rx..=rx {
            if in_lid(dx, depth, upper) {
                canvas.set_pixel(cx + dx, top + depth, palette::EYELID);
            }
        }
    }

    let lower = lid_rows(preset.lower_share);
    let bottom = cy + ry;
    for depth in 0..lower {
        for dx in -rx..=rx {
            if in_lid(dx, depth, lower) {
                canvas.set_pixel(cx + dx, bottom - depth, palette::EYELID);
            }
        }
    }

    if coverage > preset.bridge_threshold && preset.bridge_threshold < 1.0 {
        let joined = (coverage - preset.bridge_threshold) / (1.0 - preset.bridge_threshold);
        let half = (joined * preset.bridge_height as f32) as i32 / 2;
        for y in cy - half..=cy + half {
            canvas.hline(cx - rx, cx + rx, y, palette::EYELID);
        }
    }
}

/// Teardrop: a disk with a point rising `2 * size` above its center
fn draw_tear(canvas: &mut Canvas, x: i32, y: i32, size: i32) {
    if size <= 0 {
        return;
    }
    canvas.fill_circle(x, y, size, palette::TEAR);
    for t in 0..=2 * size {
        let half = size - t / 2;
        canvas.hline(x - half, x + half, y - t, palette::TEAR);
    }
}

fn draw_tear_trail(canvas: &mut Canvas, tear: &TearTrail, side: PanelSide) {
    let (cx, _) = canvas.center();
    let x = cx + side.mirror() * tear.x_offset;
    if tear.spacing > 0 {
        let mut y = tear.start_y;
        while y < tear.head_y {
            draw_tear(canvas, x, y, tear.trail_size);
            y += tear.spacing;
        }
    }
    draw_tear(canvas, x, tear.head_y, tear.head_size);
}

/// Thick bar above the pupil, dropping towards the nose
fn draw_eyebrow(canvas: &mut Canvas, side: PanelSide) {
    let (cx, cy) = canvas.center();
    let toward_nose = -side.mirror() as f32;
    for dx in -BROW_HALF_LENGTH..=BROW_HALF_LENGTH {
        let y = cy + BROW_Y + (dx as f32 * BROW_SLOPE * toward_nose).round() as i32;
        canvas.vline(
            cx + dx,
            y - BROW_HALF_THICKNESS,
            y + BROW_HALF_THICKNESS,
            palette::BROW,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Color;

    fn render(state: &ExpressionState, side: PanelSide) -> Canvas {
        let mut canvas = Canvas::new();
        let mut composer = Composer::new(12, 42);
        composer.compose(&mut canvas, state, side, 0);
        canvas
    }

    fn count(canvas: &Canvas, color: Color) -> usize {
        canvas
            .as_bytes()
            .chunks_exact(3)
            .filter(|px| *px == [color.r, color.g, color.b])
            .count()
    }

    #[test]
    fn test_calm_star_eye_layout() {
        let state = ExpressionState::calm().with_highlight(HighlightStyle::Star);
        let canvas = render(&state, PanelSide::Left);
        // pupil at the center, white just inside the rim, background outside
        assert_eq!(canvas.get_pixel(120, 120), Some(palette::PUPIL));
        assert_eq!(canvas.get_pixel(1, 120), Some(palette::EYE_WHITE));
        assert_eq!(canvas.get_pixel(0, 0), Some(palette::BACKGROUND));
        // iris ring sits between the pupil edge and pupil + ring width
        assert_eq!(canvas.get_pixel(120 + 75 + 6, 120), Some(palette::CALM_IRIS));
        assert_eq!(canvas.get_pixel(120 + 75 + 13, 120), Some(palette::EYE_WHITE));
        // star highlight centered up-left of the pupil
        assert_eq!(canvas.get_pixel(90, 90), Some(palette::HIGHLIGHT));
    }

    #[test]
    fn test_circle_and_star_highlights_differ() {
        let circle = render(
            &ExpressionState::calm().with_highlight(HighlightStyle::Circle),
            PanelSide::Left,
        );
        let star = render(
            &ExpressionState::calm().with_highlight(HighlightStyle::Star),
            PanelSide::Left,
        );
        assert_eq!(circle.get_pixel(104, 104), Some(palette::HIGHLIGHT));
        assert_eq!(star.get_pixel(104, 104), Some(palette::PUPIL));
    }

    #[test]
    fn test_pupil_offset_moves_pupil_and_highlight() {
        let state = ExpressionState::calm().with_pupil(10, 5).without_highlight();
        let canvas = render(&state, PanelSide::Right);
        assert_eq!(canvas.get_pixel(130 + 74, 125), Some(palette::PUPIL));
        assert_eq!(canvas.get_pixel(130 - 80, 125), Some(palette::CALM_IRIS));
        // highlight would sit at (100, 95); hidden, so the pupil shows through
        assert_eq!(canvas.get_pixel(100, 95), Some(palette::PUPIL));
    }

    #[test]
    fn test_full_sweep_lid_hides_eye() {
        let state = ExpressionState::calm().with_eyelid(1.0, EyelidStyle::Sweep);
        let canvas = render(&state, PanelSide::Left);
        assert_eq!(count(&canvas, palette::EYE_WHITE), 0);
        assert_eq!(canvas.get_pixel(120, 120), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(0, 0), Some(palette::BACKGROUND));
    }

    #[test]
    fn test_half_sweep_lid_covers_top_only() {
        let state = ExpressionState::calm()
            .with_eyelid(0.125, EyelidStyle::Sweep)
            .without_highlight();
        let canvas = render(&state, PanelSide::Left);
        // 0.125 of the 240-row disk is 30 rows
        assert_eq!(canvas.get_pixel(120, 10), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(120, 29), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(120, 30), Some(palette::EYE_WHITE));
        assert_eq!(canvas.get_pixel(120, 40), Some(palette::CALM_IRIS));
        assert_eq!(canvas.get_pixel(120, 120), Some(palette::PUPIL));
    }

    #[test]
    fn test_elliptic_lids_meet_when_closed() {
        let state = ExpressionState::calm().with_eyelid(1.0, EyelidStyle::Ellipse(EyelidPreset::BLINK));
        let canvas = render(&state, PanelSide::Left);
        assert_eq!(canvas.get_pixel(120, 120), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(120, 5), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(120, 235), Some(palette::EYELID));
    }

    #[test]
    fn test_light_squint_leaves_center_open() {
        let state = ExpressionState::calm()
            .with_eyelid(0.3, EyelidStyle::Ellipse(EyelidPreset::SQUINT))
            .without_highlight();
        let canvas = render(&state, PanelSide::Left);
        assert_eq!(canvas.get_pixel(120, 120), Some(palette::PUPIL));
        assert_eq!(canvas.get_pixel(120, 2), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(120, 237), Some(palette::EYELID));
    }

    #[test]
    fn test_zero_coverage_draws_no_lid() {
        let state = ExpressionState::calm().with_eyelid(0.0, EyelidStyle::Ellipse(EyelidPreset::BLINK));
        let canvas = render(&state, PanelSide::Left);
        assert_eq!(count(&canvas, palette::EYELID), 0);
    }

    #[test]
    fn test_closed_look_is_a_slit() {
        let canvas = render(&ExpressionState::closed(4), PanelSide::Left);
        assert_eq!(canvas.get_pixel(120, 120), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(1, 120), Some(palette::EYELID));
        assert_eq!(canvas.get_pixel(120, 125), Some(palette::BACKGROUND));
        assert_eq!(count(&canvas, palette::EYE_WHITE), 0);
    }

    #[test]
    fn test_eyebrow_is_mirrored_between_eyes() {
        let state = ExpressionState::calm().without_highlight().with_eyebrow(true);
        let left = render(&state, PanelSide::Left);
        let right = render(&state, PanelSide::Right);
        assert!(count(&left, palette::BROW) > 0);
        for y in 0..240 {
            for x in 1..240 {
                assert_eq!(left.get_pixel(x, y), right.get_pixel(240 - x, y), "({}, {})", x, y);
            }
        }
        // inner end (towards the nose) sits lower than the outer end
        assert_eq!(left.get_pixel(185, 120 - 92 + 23), Some(palette::BROW));
        assert_ne!(left.get_pixel(55, 120 - 92 + 23), Some(palette::BROW));
    }

    #[test]
    fn test_tear_trail_sides() {
        let tear = TearTrail {
            x_offset: 25,
            start_y: 190,
            head_y: 214,
            spacing: 12,
            head_size: 6,
            trail_size: 3,
        };
        let state = ExpressionState::calm().without_highlight().with_tear(tear);
        let left = render(&state, PanelSide::Left);
        let right = render(&state, PanelSide::Right);
        assert_eq!(left.get_pixel(95, 214), Some(palette::TEAR));
        assert_eq!(right.get_pixel(145, 214), Some(palette::TEAR));
        assert_eq!(left.get_pixel(95, 190), Some(palette::TEAR));
        assert_ne!(left.get_pixel(145, 214), Some(palette::TEAR));
    }

    #[test]
    fn test_full_anger_reddens_iris_and_backdrop() {
        let state = ExpressionState::calm().without_highlight().with_anger(1.0);
        let canvas = render(&state, PanelSide::Left);
        assert!(count(&canvas, palette::ANGRY_IRIS) > 0);
        assert_eq!(count(&canvas, palette::CALM_IRIS), 0);
        assert_eq!(canvas.get_pixel(0, 0), Some(palette::ANGER_BACKDROP));
    }

    #[test]
    fn test_particles_only_when_enabled() {
        let state = ExpressionState::calm().without_highlight();
        let plain = render(&state, PanelSide::Left);
        let flaming = render(&state.with_particles(true), PanelSide::Left);
        assert_ne!(plain, flaming);

        let mut composer = Composer::new(12, 1);
        let mut canvas = Canvas::new();
        composer.compose(&mut canvas, &state, PanelSide::Left, 0);
        assert!(composer.particles(PanelSide::Left).particles().iter().all(|p| !p.is_alive()));
    }

    #[test]
    fn test_same_seed_same_frames() {
        let state = ExpressionState::calm()
            .with_anger(1.0)
            .with_eyebrow(true)
            .with_particles(true);
        let mut a = Composer::new(12, 9);
        let mut b = Composer::new(12, 9);
        for frame in 0..5 {
            for side in PanelSide::ALL {
                let mut ca = Canvas::new();
                let mut cb = Canvas::new();
                a.compose(&mut ca, &state, side, frame);
                b.compose(&mut cb, &state, side, frame);
                assert_eq!(ca, cb);
            }
        }
    }
}
