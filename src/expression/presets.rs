//! Stock expressions
//!
//! Each builder returns a `Stage` ready for the sequencer. Timings and
//! shapes are fixed; the highlight style, eyelid coefficients and the
//! pause after each stage come from `PresetOptions`.

use super::{EyelidPreset, EyelidStyle, ExpressionState, HighlightStyle, TearTrail};
use crate::display::CANVAS_HEIGHT;
use crate::sequencer::Stage;
use crate::util::Easing;

/// Knobs shared by all presets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetOptions {
    /// Highlight used by the happy and idle looks
    pub highlight: HighlightStyle,
    /// Elliptic lids for the idle blink; happy blinks with a sweeping lid
    pub blink: EyelidPreset,
    pub squint: EyelidPreset,
    /// Extra hold on the last frame of every stage
    pub stage_pause_ms: u64,
}

impl Default for PresetOptions {
    fn default() -> Self {
        Self {
            highlight: HighlightStyle::Star,
            blink: EyelidPreset::BLINK,
            squint: EyelidPreset::SQUINT,
            stage_pause_ms: 1000,
        }
    }
}

/// Frame delay for tweened transitions
const TWEEN_DELAY_MS: u64 = 80;

/// Happy: jittering pupil, sweeping blink every 40 frames with the highlight kept
const HAPPY_FRAMES: usize = 80;
const HAPPY_DELAY_MS: u64 = 80;
const HAPPY_JITTER: [(i32, i32); 6] = [(0, 0), (-1, -1), (1, -1), (-1, 1), (1, 1), (0, 0)];
const JITTER_STEP: usize = 3;
const BLINK_CURVE: [f32; 5] = [0.3, 0.7, 1.0, 0.7, 0.3];
const BLINK_DELAY_MS: u64 = 60;

/// Idle: look around
const IDLE_CYCLES: usize = 2;
const IDLE_TARGETS: [(i32, i32); 7] = [(0, 0), (-8, -5), (8, -5), (0, 8), (-12, 0), (12, 0), (0, 0)];
const IDLE_FRAMES_PER_TARGET: usize = 20;
const IDLE_EASE_FRAMES: usize = 10;
const IDLE_DELAY_MS: u64 = 70;
const IDLE_BLINK_FRAME: usize = 15;
const IDLE_BLINK_HOLD_MS: u64 = 100;

/// Sad: drooping gaze and a falling tear
const SAD_PUPIL_DY: i32 = 12;
const DROOP_FRAMES: usize = 8;
const TEAR_START_DY: i32 = 60;
const TEAR_STEP: i32 = 6;
const TEAR_FLOOR_MARGIN: i32 = 12;
const TEAR_DELAY_MS: u64 = 150;
const SAD_HOLD_FRAMES: usize = 30;
const SAD_HOLD_MS: u64 = 100;

/// Angry: build-up, glare, squint, slam shut, reopen
const ANGER_RAMP_FRAMES: usize = 15;
const ANGER_HOLD_FRAMES: usize = 20;
const SQUINT_FRAMES: usize = 20;
const ANGER_HOLD_MS: u64 = 100;
const SLIT_FRAMES: usize = 4;
const SLIT_HALF_HEIGHT: i32 = 4;
const SLIT_DELAY_MS: u64 = 150;
const REOPEN_FRAMES: usize = 15;

/// Append `frames` tweened states from `from` (exclusive) to `to` (inclusive)
pub fn tween(
    stage: &mut Stage,
    from: &ExpressionState,
    to: &ExpressionState,
    frames: usize,
    delay_ms: u64,
    easing: Easing,
) {
    for k in 1..=frames {
        let t = easing.apply(k as f32 / frames as f32);
        stage.push(from.lerp(to, t), delay_ms);
    }
}

pub fn happy(opts: &PresetOptions) -> Stage {
    let mut stage = Stage::new("happy");
    let base = ExpressionState::calm().with_highlight(opts.highlight);
    for i in 0..HAPPY_FRAMES {
        let (dx, dy) = HAPPY_JITTER[(i / JITTER_STEP) % HAPPY_JITTER.len()];
        let state = base.with_pupil(dx, dy);
        stage.push(state, HAPPY_DELAY_MS);

        if i % 40 == 35 {
            for coverage in BLINK_CURVE {
                let blink = state.with_eyelid(coverage, EyelidStyle::Sweep);
                stage.push(blink, BLINK_DELAY_MS);
            }
        }
    }
    stage.pause(opts.stage_pause_ms);
    stage
}

pub fn idle(opts: &PresetOptions) -> Stage {
    let mut stage = Stage::new("idle");
    let base = ExpressionState::calm().with_highlight(opts.highlight);
    let mut gaze = (0, 0);
    for _ in 0..IDLE_CYCLES {
        for (m, &target) in IDLE_TARGETS.iter().enumerate() {
            let from = base.with_pupil(gaze.0, gaze.1);
            let to = base.with_pupil(target.0, target.1);
            for f in 0..IDLE_FRAMES_PER_TARGET {
                let progress = ((f + 1) as f32 / IDLE_EASE_FRAMES as f32).min(1.0);
                let state = from.lerp(&to, Easing::Smooth.apply(progress));
                stage.push(state, IDLE_DELAY_MS);

                if f == IDLE_BLINK_FRAME && m % 4 == 1 {
                    let shut = state.with_eyelid(1.0, EyelidStyle::Ellipse(opts.blink));
                    stage.push(shut, IDLE_BLINK_HOLD_MS);
                }
            }
            gaze = target;
        }
    }
    stage.pause(opts.stage_pause_ms);
    stage
}

pub fn sad(opts: &PresetOptions) -> Stage {
    let mut stage = Stage::new("sad");
    let calm = ExpressionState::calm();
    let droop = calm.with_pupil(0, SAD_PUPIL_DY);
    tween(&mut stage, &calm, &droop, DROOP_FRAMES, TWEEN_DELAY_MS, Easing::Smooth);

    let cy = CANVAS_HEIGHT as i32 / 2;
    let start_y = cy + TEAR_START_DY;
    let floor = CANVAS_HEIGHT as i32 - TEAR_FLOOR_MARGIN;
    let mut tear = TearTrail {
        x_offset: 25,
        start_y,
        head_y: start_y,
        spacing: 12,
        head_size: 6,
        trail_size: 3,
    };
    while tear.head_y < floor {
        stage.push(droop.with_tear(tear), TEAR_DELAY_MS);
        tear.head_y += TEAR_STEP;
    }
    tear.head_y -= TEAR_STEP;
    stage.hold(droop.with_tear(tear), SAD_HOLD_FRAMES, SAD_HOLD_MS);
    stage.pause(opts.stage_pause_ms);
    stage
}

pub fn angry(opts: &PresetOptions) -> Stage {
    let mut stage = Stage::new("angry");
    let calm = ExpressionState::calm().without_highlight().with_eyebrow(true);
    let furious = calm.with_anger(1.0).with_particles(true);
    tween(
        &mut stage,
        &calm.with_particles(true),
        &furious,
        ANGER_RAMP_FRAMES,
        TWEEN_DELAY_MS,
        Easing::EaseInOutQuad,
    );
    stage.hold(furious, ANGER_HOLD_FRAMES, ANGER_HOLD_MS);

    let squint_style = EyelidStyle::Ellipse(opts.squint);
    for i in 0..SQUINT_FRAMES {
        let coverage = 0.4 + 0.2 * (i as f32 * 0.3).sin();
        stage.push(furious.with_eyelid(coverage, squint_style), TWEEN_DELAY_MS);
    }

    let slit = ExpressionState::closed(SLIT_HALF_HEIGHT)
        .with_anger(1.0)
        .with_eyebrow(true)
        .with_particles(true);
    stage.hold(slit, SLIT_FRAMES, SLIT_DELAY_MS);

    let shut = furious.with_eyelid(1.0, squint_style);
    let open = ExpressionState::calm().with_eyelid(0.0, squint_style);
    tween(&mut stage, &shut, &open, REOPEN_FRAMES, TWEEN_DELAY_MS, Easing::Smooth);
    stage.pause(opts.stage_pause_ms);
    stage
}

/// One full cycle: happy, idle, sad, angry
pub fn cycle(opts: &PresetOptions) -> Vec<Stage> {
    vec![happy(opts), idle(opts), sad(opts), angry(opts)]
}
