use super::convert::convert;
use super::{
    check_frame_len, ColorDepth, DriverError, DriverSession, FrameStatus, FrameTarget, PanelDriver,
};
use crate::display::{PanelSide, CANVAS_HEIGHT, CANVAS_WIDTH};
use log::debug;

/// Transport carrying native pixel data to the physical panels
pub trait PanelSink {
    /// Send one frame's native payload to `side`
    fn send(&mut self, side: PanelSide, payload: &[u8]) -> Result<(), DriverError>;

    /// Forward a brightness change; transports without backlight control ignore it
    fn set_brightness(&mut self, _level: u8) -> Result<(), DriverError> {
        Ok(())
    }
}

/// Sink that keeps every payload in memory, for tests and offline capture
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub frames: Vec<(PanelSide, Vec<u8>)>,
    pub brightness: Option<u8>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PanelSink for MemorySink {
    fn send(&mut self, side: PanelSide, payload: &[u8]) -> Result<(), DriverError> {
        self.frames.push((side, payload.to_vec()));
        Ok(())
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DriverError> {
        self.brightness = Some(level);
        Ok(())
    }
}

/// Panels behind a byte transport. Conversion performs the real depth
/// reduction; only the native payload is handed to the sink.
#[derive(Debug)]
pub struct StreamPanels<S: PanelSink> {
    session: DriverSession,
    sink: S,
}

impl<S: PanelSink> StreamPanels<S> {
    pub fn new(sink: S) -> Self {
        Self {
            session: DriverSession::new(),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Bytes actually transmitted per frame at the current depth
    pub fn payload_len(&self) -> usize {
        let pixels = CANVAS_WIDTH as usize * CANVAS_HEIGHT as usize;
        self.session.depth().native_len(pixels)
    }
}

impl<S: PanelSink> PanelDriver for StreamPanels<S> {
    fn init(&mut self, depth: ColorDepth) -> Result<(), DriverError> {
        self.session.init(depth)
    }

    fn release(&mut self) -> Result<(), DriverError> {
        self.session.release()
    }

    fn is_active(&self) -> bool {
        self.session.is_active()
    }

    fn color_depth(&self) -> ColorDepth {
        self.session.depth()
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DriverError> {
        let previous = self.session.brightness();
        self.session.set_brightness(level)?;
        if let Err(e) = self.sink.set_brightness(level) {
            // the panel kept its old level
            self.session.set_brightness(previous)?;
            return Err(e);
        }
        Ok(())
    }

    fn convert_from_24bit(&self, dst: &mut [u8], src: &[u8]) -> Result<(), DriverError> {
        check_frame_len(src.len())?;
        check_frame_len(dst.len())?;
        let payload = convert(self.session.depth(), src, dst)?;
        debug!("Converted frame to {}-bit ({} bytes)", self.session.depth().bits(), payload);
        Ok(())
    }

    fn write_frame(&mut self, target: FrameTarget<'_>) -> Result<FrameStatus, DriverError> {
        self.session.ensure_active()?;
        check_frame_len(target.bytes.len())?;
        let payload = &target.bytes[..self.payload_len()];
        self.sink.send(target.side, payload)?;
        debug!("Sent {:?} panel ({} bytes)", target.side, payload.len());
        Ok(FrameStatus::Presented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Canvas, Color};

    fn active(depth: ColorDepth) -> StreamPanels<MemorySink> {
        let mut panels = StreamPanels::new(MemorySink::new());
        panels.init(depth).unwrap();
        panels
    }

    fn send_color(panels: &mut StreamPanels<MemorySink>, side: PanelSide, color: Color) {
        let mut canvas = Canvas::new();
        canvas.clear(color);
        let mut native = vec![0; panels.buffer_size()];
        panels.convert_from_24bit(&mut native, canvas.as_bytes()).unwrap();
        panels
            .write_frame(FrameTarget {
                side,
                bytes: &native,
            })
            .unwrap();
    }

    #[test]
    fn test_rgb444_payload_is_packed() {
        let mut panels = active(ColorDepth::Rgb444);
        send_color(&mut panels, PanelSide::Left, Color::rgb(0xF0, 0x80, 0x10));
        let sink = panels.into_sink();
        assert_eq!(sink.frames.len(), 1);
        let (side, payload) = &sink.frames[0];
        assert_eq!(*side, PanelSide::Left);
        assert_eq!(payload.len(), 86_400);
        assert_eq!(&payload[..3], &[0xF8, 0x1F, 0x81]);
    }

    #[test]
    fn test_rgb666_payload_is_masked() {
        let mut panels = active(ColorDepth::Rgb666);
        send_color(&mut panels, PanelSide::Right, Color::rgb(0xFF, 0x03, 0x81));
        let (_, payload) = &panels.sink().frames[0];
        assert_eq!(payload.len(), 172_800);
        assert_eq!(&payload[..3], &[0xFC, 0x00, 0x80]);
    }

    #[test]
    fn test_brightness_reaches_sink_only_when_valid() {
        let mut panels = StreamPanels::new(MemorySink::new());
        assert!(panels.set_brightness(11).is_err());
        assert_eq!(panels.sink().brightness, None);
        panels.set_brightness(4).unwrap();
        assert_eq!(panels.sink().brightness, Some(4));
    }

    /// Transport whose backlight channel is down
    struct DeadBacklight;

    impl PanelSink for DeadBacklight {
        fn send(&mut self, _side: PanelSide, _payload: &[u8]) -> Result<(), DriverError> {
            Ok(())
        }

        fn set_brightness(&mut self, _level: u8) -> Result<(), DriverError> {
            Err(DriverError::BackendFailure("backlight offline".into()))
        }
    }

    #[test]
    fn test_failed_sink_brightness_keeps_previous_level() {
        let mut panels = StreamPanels::new(DeadBacklight);
        panels.init(ColorDepth::Rgb444).unwrap();
        let before = panels.session.brightness();
        assert!(matches!(
            panels.set_brightness(2),
            Err(DriverError::BackendFailure(_))
        ));
        assert_eq!(panels.session.brightness(), before);
    }

    #[test]
    fn test_write_requires_active_session() {
        let mut panels = StreamPanels::new(MemorySink::new());
        let bytes = vec![0; panels.buffer_size()];
        let target = FrameTarget {
            side: PanelSide::Left,
            bytes: &bytes,
        };
        assert_eq!(panels.write_frame(target), Err(DriverError::NotInitialized));
        assert!(panels.sink().frames.is_empty());
    }

    #[test]
    fn test_mismatched_buffers_rejected() {
        let panels = active(ColorDepth::Rgb444);
        let src = vec![0; 10];
        let mut dst = vec![0; panels.buffer_size()];
        assert!(matches!(
            panels.convert_from_24bit(&mut dst, &src),
            Err(DriverError::InvalidBufferSize { actual: 10, .. })
        ));
    }
}
