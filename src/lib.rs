//! Procedural cartoon eyes for a pair of small LCD panels.
//!
//! `display` holds the RGB canvas and shape rasterizer, `expression`
//! turns declarative eye states into pixels, `driver` converts and ships
//! frames to the panels, and `sequencer` plays timed stages on both eyes.

pub mod config;
pub mod display;
pub mod driver;
pub mod expression;
pub mod particles;
pub mod sequencer;
pub mod util;

pub use config::{ConfigError, EyeConfig};
pub use display::{Canvas, Color, PanelSet, PanelSide};
pub use driver::{ColorDepth, DriverError, PanelDriver};
pub use expression::{Composer, ExpressionState};
pub use sequencer::{AnimationSequencer, RunOutcome, Stage, StopSignal};
