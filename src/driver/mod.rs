//! Panel Driver
//!
//! Session lifecycle, native pixel formats and per-panel frame writes.
//! Backends implement `PanelDriver`; the sequencer only ever talks to the
//! trait.

pub mod convert;
#[cfg(feature = "sdl-preview")]
mod preview;
mod sim;
mod stream;

#[cfg(feature = "sdl-preview")]
pub use preview::PreviewWindow;
pub use sim::SimulatedPanels;
pub use stream::{MemorySink, PanelSink, StreamPanels};

use crate::display::{Canvas, Color, PanelSide, BYTES_PER_PIXEL, CANVAS_HEIGHT, CANVAS_WIDTH};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Brightness range accepted by `set_brightness`
pub const MAX_BRIGHTNESS: u8 = 10;
pub const DEFAULT_BRIGHTNESS: u8 = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Panels already initialized")]
    AlreadyInitialized,
    #[error("Panels not initialized")]
    NotInitialized,
    #[error("Brightness {0} out of range (max 10)")]
    InvalidBrightness(u8),
    #[error("Frame buffer is {actual} bytes, expected {expected}")]
    InvalidBufferSize { expected: usize, actual: usize },
    #[error("Panel backend failed: {0}")]
    BackendFailure(String),
}

/// Native color depth of the panels, selected at init
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorDepth {
    /// 12-bit, two pixels packed into three bytes
    #[default]
    Rgb444,
    /// 18-bit, one left-aligned byte per channel
    Rgb666,
}

impl ColorDepth {
    /// Controller pixel-format (COLMOD) code
    pub const fn colmod(self) -> u8 {
        match self {
            ColorDepth::Rgb444 => 0x03,
            ColorDepth::Rgb666 => 0x06,
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            ColorDepth::Rgb444 => 12,
            ColorDepth::Rgb666 => 18,
        }
    }

    /// Parse a bit count as given on the command line
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            12 => Some(ColorDepth::Rgb444),
            18 => Some(ColorDepth::Rgb666),
            _ => None,
        }
    }

    /// Bytes of native payload for `pixels` pixels
    pub fn native_len(self, pixels: usize) -> usize {
        match self {
            ColorDepth::Rgb444 => pixels.div_ceil(2) * 3,
            ColorDepth::Rgb666 => pixels * 3,
        }
    }
}

/// Byte size of one 24-bit panel frame; every buffer handed to
/// `write_frame` must be exactly this long
pub const fn frame_buffer_size() -> usize {
    CANVAS_WIDTH as usize * CANVAS_HEIGHT as usize * BYTES_PER_PIXEL
}

/// Check a buffer against the frame size contract
pub fn check_frame_len(actual: usize) -> Result<(), DriverError> {
    let expected = frame_buffer_size();
    if actual == expected {
        Ok(())
    } else {
        Err(DriverError::InvalidBufferSize { expected, actual })
    }
}

/// A converted frame and the panel it is meant for
#[derive(Debug, Clone, Copy)]
pub struct FrameTarget<'a> {
    pub side: PanelSide,
    pub bytes: &'a [u8],
}

/// Outcome of a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// The frame went out, but the user asked to close; shut down cleanly
    ShutdownRequested,
}

/// Lifecycle state shared by every backend.
/// Uninitialized -> Active via `init`, back via `release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSession {
    active: bool,
    depth: ColorDepth,
    brightness: u8,
}

impl DriverSession {
    pub fn new() -> Self {
        Self {
            active: false,
            depth: ColorDepth::default(),
            brightness: DEFAULT_BRIGHTNESS,
        }
    }

    pub fn init(&mut self, depth: ColorDepth) -> Result<(), DriverError> {
        if self.active {
            warn!("Panels already initialized");
            return Err(DriverError::AlreadyInitialized);
        }
        self.active = true;
        self.depth = depth;
        info!("Panels initialized ({}-bit color)", depth.bits());
        Ok(())
    }

    pub fn release(&mut self) -> Result<(), DriverError> {
        if !self.active {
            warn!("Panels already closed or never opened");
            return Err(DriverError::NotInitialized);
        }
        self.active = false;
        info!("Panels released");
        Ok(())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn ensure_active(&self) -> Result<(), DriverError> {
        if self.active {
            Ok(())
        } else {
            Err(DriverError::NotInitialized)
        }
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn set_brightness(&mut self, level: u8) -> Result<(), DriverError> {
        if level > MAX_BRIGHTNESS {
            return Err(DriverError::InvalidBrightness(level));
        }
        self.brightness = level;
        debug!("Brightness set to {}", level);
        Ok(())
    }
}

impl Default for DriverSession {
    fn default() -> Self {
        Self::new()
    }
}

/// A pair of eye panels
pub trait PanelDriver {
    fn init(&mut self, depth: ColorDepth) -> Result<(), DriverError>;

    fn release(&mut self) -> Result<(), DriverError>;

    fn is_active(&self) -> bool;

    /// Depth chosen at the last successful init
    fn color_depth(&self) -> ColorDepth;

    /// Accepts 0..=10; anything else fails and leaves the level unchanged
    fn set_brightness(&mut self, level: u8) -> Result<(), DriverError>;

    fn buffer_size(&self) -> usize {
        frame_buffer_size()
    }

    /// Map a 24-bit RGB frame into the panel's native encoding.
    /// Both buffers must be `buffer_size()` bytes.
    fn convert_from_24bit(&self, dst: &mut [u8], src: &[u8]) -> Result<(), DriverError>;

    /// Transmit an already converted frame
    fn write_frame(&mut self, target: FrameTarget<'_>) -> Result<FrameStatus, DriverError>;

    /// Fill one panel with a solid color
    fn fill_color(&mut self, side: PanelSide, color: Color) -> Result<FrameStatus, DriverError> {
        let mut canvas = Canvas::new();
        canvas.clear(color);
        let mut native = vec![0; self.buffer_size()];
        self.convert_from_24bit(&mut native, canvas.as_bytes())?;
        self.write_frame(FrameTarget {
            side,
            bytes: &native,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_is_one_rgb_frame() {
        assert_eq!(frame_buffer_size(), 172_800);
        assert_eq!(SimulatedPanels::new().buffer_size(), 240 * 240 * 3);
    }

    #[test]
    fn test_double_init_keeps_depth_and_brightness() {
        let mut session = DriverSession::new();
        session.init(ColorDepth::Rgb666).unwrap();
        session.set_brightness(3).unwrap();
        assert_eq!(
            session.init(ColorDepth::Rgb444),
            Err(DriverError::AlreadyInitialized)
        );
        assert!(session.is_active());
        assert_eq!(session.depth(), ColorDepth::Rgb666);
        assert_eq!(session.brightness(), 3);
    }

    #[test]
    fn test_double_release_fails() {
        let mut session = DriverSession::new();
        assert_eq!(session.release(), Err(DriverError::NotInitialized));
        session.init(ColorDepth::Rgb444).unwrap();
        session.release().unwrap();
        assert_eq!(session.release(), Err(DriverError::NotInitialized));
        assert!(!session.is_active());
    }

    #[test]
    fn test_reinit_after_release() {
        let mut session = DriverSession::new();
        session.init(ColorDepth::Rgb444).unwrap();
        session.release().unwrap();
        session.init(ColorDepth::Rgb666).unwrap();
        assert_eq!(session.depth(), ColorDepth::Rgb666);
    }

    #[test]
    fn test_brightness_bounds() {
        let mut session = DriverSession::new();
        assert_eq!(session.brightness(), DEFAULT_BRIGHTNESS);
        assert_eq!(
            session.set_brightness(11),
            Err(DriverError::InvalidBrightness(11))
        );
        assert_eq!(session.brightness(), DEFAULT_BRIGHTNESS);
        assert!(session.set_brightness(0).is_ok());
        assert!(session.set_brightness(10).is_ok());
        assert_eq!(session.brightness(), 10);
    }

    #[test]
    fn test_color_depth_codes() {
        assert_eq!(ColorDepth::Rgb444.colmod(), 0x03);
        assert_eq!(ColorDepth::Rgb666.colmod(), 0x06);
        assert_eq!(ColorDepth::from_bits(12), Some(ColorDepth::Rgb444));
        assert_eq!(ColorDepth::from_bits(18), Some(ColorDepth::Rgb666));
        assert_eq!(ColorDepth::from_bits(16), None);
    }

    #[test]
    fn test_native_len() {
        assert_eq!(ColorDepth::Rgb666.native_len(57_600), 172_800);
        assert_eq!(ColorDepth::Rgb444.native_len(57_600), 86_400);
        assert_eq!(ColorDepth::Rgb444.native_len(3), 6);
    }

    #[test]
    fn test_check_frame_len() {
        assert!(check_frame_len(172_800).is_ok());
        assert_eq!(
            check_frame_len(10),
            Err(DriverError::InvalidBufferSize {
                expected: 172_800,
                actual: 10
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DriverError::InvalidBrightness(12).to_string(),
            "Brightness 12 out of range (max 10)"
        );
    }
}
