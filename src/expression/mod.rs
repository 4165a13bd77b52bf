//! Declarative eye expressions
//!
//! An `ExpressionState` is a plain value describing one frame of one eye.
//! The `Composer` turns it into pixels; `presets` strings states together
//! into the stock happy / idle / sad / angry animations.

mod composer;
pub mod presets;

pub use composer::Composer;

use crate::display::Color;
use crate::util::lerp;
use serde::{Deserialize, Serialize};

/// Eye geometry, in pixels, for a 240x240 panel
pub const EYE_RADIUS: i32 = 120;
pub const PUPIL_RADIUS: i32 = 75;
pub const IRIS_RING_WIDTH: i32 = 12;
pub const HIGHLIGHT_RADIUS: i32 = 20;
pub const HIGHLIGHT_OFFSET: (i32, i32) = (-30, -30);
/// Maximum screen-shake amplitude at full anger
pub const MAX_SHAKE_PX: f32 = 6.0;

/// Fixed palette
pub mod palette {
    use crate::display::Color;

    pub const BACKGROUND: Color = Color::rgb(0, 0, 0);
    /// Background tint reached at full anger
    pub const ANGER_BACKDROP: Color = Color::rgb(70, 0, 0);
    pub const EYE_WHITE: Color = Color::rgb(255, 255, 255);
    pub const PUPIL: Color = Color::rgb(0, 0, 0);
    pub const CALM_IRIS: Color = Color::rgb(0, 150, 200);
    pub const ANGRY_IRIS: Color = Color::rgb(255, 80, 80);
    pub const HIGHLIGHT: Color = Color::rgb(255, 255, 255);
    pub const EYELID: Color = Color::rgb(255, 200, 0);
    pub const BROW: Color = Color::rgb(90, 40, 0);
    pub const TEAR: Color = Color::rgb(135, 206, 250);
}

/// Overall silhouette of the eye
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseLook {
    #[default]
    Open,
    /// Fully shut: a thin horizontal lid ellipse of the given half height
    Closed { half_height: i32 },
}

/// Shape of the specular highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HighlightStyle {
    #[default]
    Circle,
    Star,
}

/// Coefficients for the two-lid elliptical eyelid.
/// Blinking and squinting use different sets; both are plain config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyelidPreset {
    /// Fraction of total coverage carried by the upper lid
    pub upper_share: f32,
    /// Fraction of total coverage carried by the lower lid
    pub lower_share: f32,
    /// Lid height per unit of coverage, in eye radii
    pub height_scale: f32,
    /// Vertical offset of the lid curve inside its band
    pub curve_bias: f32,
    /// Vertical weight of the lid curve (higher = flatter lid edge)
    pub curve_weight: f32,
    /// Horizontal weight of the lid curve (higher = narrower lid)
    pub x_weight: f32,
    /// Combined coverage above which a central band joins the lids
    pub bridge_threshold: f32,
    /// Height of the joining band at full coverage
    pub bridge_height: i32,
    /// Extra horizontal reach past the eye radius
    pub overhang: i32,
}

impl EyelidPreset {
    /// Soft, rounded blink
    pub const BLINK: EyelidPreset = EyelidPreset {
        upper_share: 0.6,
        lower_share: 0.4,
        height_scale: 1.8,
        curve_bias: 0.3,
        curve_weight: 2.0,
        x_weight: 1.0,
        bridge_threshold: 0.8,
        bridge_height: 20,
        overhang: 10,
    };

    /// Tighter, sharper squint used while angry
    pub const SQUINT: EyelidPreset = EyelidPreset {
        upper_share: 0.55,
        lower_share: 0.45,
        height_scale: 1.9,
        curve_bias: 0.2,
        curve_weight: 2.5,
        x_weight: 1.2,
        bridge_threshold: 0.6,
        bridge_height: 15,
        overhang: 10,
    };
}

impl Default for EyelidPreset {
    fn default() -> Self {
        Self::BLINK
    }
}

/// How eyelid coverage is drawn
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EyelidStyle {
    /// Single lid sweeping down from the top of the eye disk
    #[default]
    Sweep,
    /// Upper and lower elliptical lids meeting in the middle
    Ellipse(EyelidPreset),
}

/// A falling tear with an optional trail of smaller drops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TearTrail {
    /// Horizontal distance from the eye center, mirrored per side
    pub x_offset: i32,
    /// Canvas row the trail starts from
    pub start_y: i32,
    /// Canvas row of the leading drop
    pub head_y: i32,
    /// Row distance between trail drops (0 = no trail)
    pub spacing: i32,
    pub head_size: i32,
    pub trail_size: i32,
}

/// Everything needed to draw one eye for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpressionState {
    pub look: BaseLook,
    pub pupil_offset: (i32, i32),
    /// Iris color at zero anger
    pub iris_color: Color,
    pub show_highlight: bool,
    pub highlight: HighlightStyle,
    /// Eyelid coverage in [0, 1]
    pub eyelid: f32,
    pub eyelid_style: EyelidStyle,
    /// Anger level in [0, 1]; drives iris blend, pupil shrink, backdrop and shake
    pub anger: f32,
    pub eyebrow: bool,
    pub particles: bool,
    pub tear: Option<TearTrail>,
}

impl ExpressionState {
    /// Neutral open eye with a circular highlight
    pub fn calm() -> Self {
        Self {
            look: BaseLook::Open,
            pupil_offset: (0, 0),
            iris_color: palette::CALM_IRIS,
            show_highlight: true,
            highlight: HighlightStyle::Circle,
            eyelid: 0.0,
            eyelid_style: EyelidStyle::Sweep,
            anger: 0.0,
            eyebrow: false,
            particles: false,
            tear: None,
        }
    }

    /// Shut eye drawn as a lid slit
    pub fn closed(half_height: i32) -> Self {
        Self {
            look: BaseLook::Closed { half_height },
            show_highlight: false,
            ..Self::calm()
        }
    }

    pub fn with_pupil(mut self, dx: i32, dy: i32) -> Self {
        self.pupil_offset = (dx, dy);
        self
    }

    pub fn with_highlight(mut self, style: HighlightStyle) -> Self {
        self.show_highlight = true;
        self.highlight = style;
        self
    }

    pub fn without_highlight(mut self) -> Self {
        self.show_highlight = false;
        self
    }

    pub fn with_eyelid(mut self, coverage: f32, style: EyelidStyle) -> Self {
        self.eyelid = coverage.clamp(0.0, 1.0);
        self.eyelid_style = style;
        self
    }

    pub fn with_anger(mut self, anger: f32) -> Self {
        self.anger = anger.clamp(0.0, 1.0);
        self
    }

    pub fn with_eyebrow(mut self, on: bool) -> Self {
        self.eyebrow = on;
        self
    }

    pub fn with_particles(mut self, on: bool) -> Self {
        self.particles = on;
        self
    }

    pub fn with_tear(mut self, tear: TearTrail) -> Self {
        self.tear = Some(tear);
        self
    }

    /// Pupil radius, shrinking to 70% at full anger
    pub fn pupil_radius(&self) -> i32 {
        let anger = self.anger.clamp(0.0, 1.0);
        (PUPIL_RADIUS as f32 * (0.7 + 0.3 * (1.0 - anger))).round() as i32
    }

    /// Iris color blended from the calm color towards red by anger
    pub fn iris(&self) -> Color {
        self.iris_color.lerp(palette::ANGRY_IRIS, self.anger)
    }

    /// Backdrop outside the eye disk
    pub fn background(&self) -> Color {
        if self.anger > 0.0 {
            palette::BACKGROUND.lerp(palette::ANGER_BACKDROP, self.anger)
        } else {
            palette::BACKGROUND
        }
    }

    /// Screen-shake amplitude in pixels
    pub fn shake_px(&self) -> i32 {
        (self.anger.clamp(0.0, 1.0) * MAX_SHAKE_PX).round() as i32
    }

    /// Tween towards `to`. Continuous fields interpolate; discrete fields
    /// (look, highlight, flags, styles, tear) are taken from `to`.
    pub fn lerp(&self, to: &ExpressionState, t: f32) -> ExpressionState {
        let mix_i = |a: i32, b: i32| lerp(a as f32, b as f32, t).round() as i32;
        ExpressionState {
            pupil_offset: (
                mix_i(self.pupil_offset.0, to.pupil_offset.0),
                mix_i(self.pupil_offset.1, to.pupil_offset.1),
            ),
            iris_color: self.iris_color.lerp(to.iris_color, t),
            eyelid: lerp(self.eyelid, to.eyelid, t),
            anger: lerp(self.anger, to.anger, t),
            ..*to
        }
    }
}

impl Default for ExpressionState {
    fn default() -> Self {
        Self::calm()
    }
}
