use super::convert::copy_rgb888;
use super::{
    check_frame_len, ColorDepth, DriverError, DriverSession, FrameStatus, FrameTarget, PanelDriver,
};
use crate::display::{PanelSet, PanelSide};
use log::{debug, warn};

#[cfg(feature = "sdl-preview")]
use super::PreviewWindow;

/// In-process panels. Frames are converted by plain copy and kept in
/// memory; with the `sdl-preview` feature they can also be shown in a
/// window whose close button requests a shutdown.
pub struct SimulatedPanels {
    session: DriverSession,
    last_frames: PanelSet<Option<Vec<u8>>>,
    writes: PanelSet<u64>,
    write_order: Vec<PanelSide>,
    /// Writes after this many successful ones fail with `BackendFailure`
    fail_after: Option<u64>,
    /// The write that brings the total to this count reports a shutdown
    shutdown_after: Option<u64>,
    #[cfg(feature = "sdl-preview")]
    preview_scale: Option<u32>,
    #[cfg(feature = "sdl-preview")]
    preview: Option<PreviewWindow>,
}

impl SimulatedPanels {
    pub fn new() -> Self {
        Self {
            session: DriverSession::new(),
            last_frames: PanelSet::default(),
            writes: PanelSet::default(),
            write_order: Vec::new(),
            fail_after: None,
            shutdown_after: None,
            #[cfg(feature = "sdl-preview")]
            preview_scale: None,
            #[cfg(feature = "sdl-preview")]
            preview: None,
        }
    }

    /// Open a preview window on init
    #[cfg(feature = "sdl-preview")]
    pub fn with_preview(mut self, scale: u32) -> Self {
        self.preview_scale = Some(scale);
        self
    }

    /// Make every write after the first `writes` fail
    pub fn fail_after_writes(mut self, writes: u64) -> Self {
        self.fail_after = Some(writes);
        self
    }

    /// Report a shutdown request on the `writes`-th write, as if the
    /// preview window had been closed
    pub fn shutdown_after_writes(mut self, writes: u64) -> Self {
        self.shutdown_after = Some(writes);
        self
    }

    pub fn session(&self) -> &DriverSession {
        &self.session
    }

    /// Most recent frame written to `side`
    pub fn last_frame(&self, side: PanelSide) -> Option<&[u8]> {
        self.last_frames[side].as_deref()
    }

    pub fn write_count(&self, side: PanelSide) -> u64 {
        self.writes[side]
    }

    pub fn total_writes(&self) -> u64 {
        self.writes.left + self.writes.right
    }

    /// Panel of every successful write, oldest first
    pub fn write_order(&self) -> &[PanelSide] {
        &self.write_order
    }

    #[cfg(feature = "sdl-preview")]
    fn present(&mut self, side: PanelSide, bytes: &[u8]) -> Result<bool, DriverError> {
        match self.preview.as_mut() {
            Some(window) => {
                window.show(side, bytes).map_err(DriverError::BackendFailure)?;
                Ok(window.quit_requested())
            },
            None => Ok(false),
        }
    }

    #[cfg(not(feature = "sdl-preview"))]
    fn present(&mut self, _side: PanelSide, _bytes: &[u8]) -> Result<bool, DriverError> {
        Ok(false)
    }
}

impl Default for SimulatedPanels {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelDriver for SimulatedPanels {
    fn init(&mut self, depth: ColorDepth) -> Result<(), DriverError> {
        if self.session.is_active() {
            return self.session.init(depth);
        }
        #[cfg(feature = "sdl-preview")]
        if let Some(scale) = self.preview_scale {
            let window = PreviewWindow::open("LCD Eyes (simulated)", scale)
                .map_err(DriverError::BackendFailure)?;
            self.preview = Some(window);
        }
        self.session.init(depth)
    }

    fn release(&mut self) -> Result<(), DriverError> {
        self.session.release()?;
        #[cfg(feature = "sdl-preview")]
        {
            self.preview = None;
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.session.is_active()
    }

    fn color_depth(&self) -> ColorDepth {
        self.session.depth()
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DriverError> {
        self.session.set_brightness(level)
    }

    fn convert_from_24bit(&self, dst: &mut [u8], src: &[u8]) -> Result<(), DriverError> {
        check_frame_len(src.len())?;
        check_frame_len(dst.len())?;
        copy_rgb888(src, dst)
    }

    fn write_frame(&mut self, target: FrameTarget<'_>) -> Result<FrameStatus, DriverError> {
        self.session.ensure_active()?;
        check_frame_len(target.bytes.len())?;
        if let Some(limit) = self.fail_after {
            if self.total_writes() >= limit {
                return Err(DriverError::BackendFailure(format!(
                    "simulated failure writing {:?} panel",
                    target.side
                )));
            }
        }

        let quit = self.present(target.side, target.bytes)?;
        let side = target.side;
        match &mut self.last_frames[side] {
            Some(frame) => frame.copy_from_slice(target.bytes),
            slot => *slot = Some(target.bytes.to_vec()),
        }
        self.writes[side] += 1;
        self.write_order.push(side);
        debug!("Wrote {:?} panel ({} bytes)", side, target.bytes.len());

        let shutdown = quit || self.shutdown_after == Some(self.total_writes());
        if shutdown {
            warn!("Shutdown requested at the panel window");
            Ok(FrameStatus::ShutdownRequested)
        } else {
            Ok(FrameStatus::Presented)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Color;
    use crate::driver::frame_buffer_size;

    fn frame(fill: u8) -> Vec<u8> {
        vec![fill; frame_buffer_size()]
    }

    #[test]
    fn test_write_before_init_fails() {
        let mut panels = SimulatedPanels::new();
        let bytes = frame(0);
        let target = FrameTarget {
            side: PanelSide::Left,
            bytes: &bytes,
        };
        assert_eq!(panels.write_frame(target), Err(DriverError::NotInitialized));
    }

    #[test]
    fn test_release_then_write_fails() {
        let mut panels = SimulatedPanels::new();
        panels.init(ColorDepth::Rgb444).unwrap();
        panels.release().unwrap();
        let bytes = frame(0);
        let target = FrameTarget {
            side: PanelSide::Right,
            bytes: &bytes,
        };
        assert_eq!(panels.write_frame(target), Err(DriverError::NotInitialized));
        assert_eq!(panels.total_writes(), 0);
    }

    #[test]
    fn test_double_init_reports_already_initialized() {
        let mut panels = SimulatedPanels::new();
        panels.init(ColorDepth::Rgb666).unwrap();
        panels.set_brightness(2).unwrap();
        assert_eq!(
            panels.init(ColorDepth::Rgb444),
            Err(DriverError::AlreadyInitialized)
        );
        assert_eq!(panels.color_depth(), ColorDepth::Rgb666);
        assert_eq!(panels.session().brightness(), 2);
    }

    #[test]
    fn test_double_release_reports_not_initialized() {
        let mut panels = SimulatedPanels::new();
        panels.init(ColorDepth::Rgb444).unwrap();
        panels.release().unwrap();
        assert_eq!(panels.release(), Err(DriverError::NotInitialized));
    }

    #[test]
    fn test_brightness_range() {
        let mut panels = SimulatedPanels::new();
        assert_eq!(
            panels.set_brightness(11),
            Err(DriverError::InvalidBrightness(11))
        );
        assert!(panels.set_brightness(0).is_ok());
        assert!(panels.set_brightness(10).is_ok());
    }

    #[test]
    fn test_convert_is_identity_and_checks_sizes() {
        let panels = SimulatedPanels::new();
        let src = frame(0x5A);
        let mut dst = frame(0);
        panels.convert_from_24bit(&mut dst, &src).unwrap();
        assert_eq!(dst, src);

        let mut short = vec![0; 100];
        assert_eq!(
            panels.convert_from_24bit(&mut short, &src),
            Err(DriverError::InvalidBufferSize {
                expected: 172_800,
                actual: 100
            })
        );
    }

    #[test]
    fn test_wrong_size_write_is_an_error() {
        let mut panels = SimulatedPanels::new();
        panels.init(ColorDepth::Rgb444).unwrap();
        let bytes = vec![0; 42];
        let target = FrameTarget {
            side: PanelSide::Left,
            bytes: &bytes,
        };
        assert!(matches!(
            panels.write_frame(target),
            Err(DriverError::InvalidBufferSize { actual: 42, .. })
        ));
    }

    #[test]
    fn test_writes_are_recorded_per_side() {
        let mut panels = SimulatedPanels::new();
        panels.init(ColorDepth::Rgb444).unwrap();
        let left = frame(1);
        let right = frame(2);
        for (side, bytes) in [(PanelSide::Left, &left), (PanelSide::Right, &right)] {
            let status = panels.write_frame(FrameTarget { side, bytes }).unwrap();
            assert_eq!(status, FrameStatus::Presented);
        }
        assert_eq!(panels.last_frame(PanelSide::Left), Some(left.as_slice()));
        assert_eq!(panels.last_frame(PanelSide::Right), Some(right.as_slice()));
        assert_eq!(panels.write_order(), &[PanelSide::Left, PanelSide::Right]);
        assert_eq!(panels.write_count(PanelSide::Left), 1);
    }

    #[test]
    fn test_fill_color() {
        let mut panels = SimulatedPanels::new();
        panels.init(ColorDepth::Rgb444).unwrap();
        panels.fill_color(PanelSide::Right, Color::rgb(9, 8, 7)).unwrap();
        let frame = panels.last_frame(PanelSide::Right).unwrap();
        assert_eq!(&frame[..3], &[9, 8, 7]);
        assert!(panels.last_frame(PanelSide::Left).is_none());
    }

    #[test]
    fn test_injected_failure_and_shutdown() {
        let bytes = frame(0);
        let mut panels = SimulatedPanels::new().fail_after_writes(1);
        panels.init(ColorDepth::Rgb444).unwrap();
        let target = FrameTarget {
            side: PanelSide::Left,
            bytes: &bytes,
        };
        assert!(panels.write_frame(target).is_ok());
        assert!(matches!(
            panels.write_frame(target),
            Err(DriverError::BackendFailure(_))
        ));

        let mut panels = SimulatedPanels::new().shutdown_after_writes(2);
        panels.init(ColorDepth::Rgb444).unwrap();
        assert_eq!(panels.write_frame(target), Ok(FrameStatus::Presented));
        assert_eq!(
            panels.write_frame(target),
            Ok(FrameStatus::ShutdownRequested)
        );
    }
}
