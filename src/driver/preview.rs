use crate::display::{PanelSide, BYTES_PER_PIXEL, CANVAS_HEIGHT, CANVAS_WIDTH};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

const STAGING_WIDTH: u32 = CANVAS_WIDTH * 2;

/// Development window showing both simulated panels side by side
pub struct PreviewWindow {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    event_pump: EventPump,
    /// Left eye in the left half, right eye in the right half (RGB24)
    staging: Vec<u8>,
}

impl PreviewWindow {
    /// Open the window at `scale` times panel resolution
    pub fn open(title: &str, scale: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let scale = scale.max(1);
        let window = video_subsystem
            .window(title, STAGING_WIDTH * scale, CANVAS_HEIGHT * scale)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|e| e.to_string())?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok(Self {
            canvas,
            texture_creator,
            event_pump,
            staging: vec![0; STAGING_WIDTH as usize * CANVAS_HEIGHT as usize * BYTES_PER_PIXEL],
        })
    }

    /// Copy one panel's RGB888 frame into its half and present
    pub fn show(&mut self, side: PanelSide, frame: &[u8]) -> Result<(), String> {
        let row_len = CANVAS_WIDTH as usize * BYTES_PER_PIXEL;
        let staging_row = row_len * 2;
        let x_offset = match side {
            PanelSide::Left => 0,
            PanelSide::Right => row_len,
        };
        for (row, src) in frame.chunks_exact(row_len).enumerate() {
            let start = row * staging_row + x_offset;
            self.staging[start..start + row_len].copy_from_slice(src);
        }

        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, STAGING_WIDTH, CANVAS_HEIGHT)
            .map_err(|e| e.to_string())?;
        texture
            .update(None, &self.staging, staging_row)
            .map_err(|e| e.to_string())?;
        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    /// Drain pending events; true if the window was closed or Escape pressed
    pub fn quit_requested(&mut self) -> bool {
        let mut quit = false;
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => quit = true,
                _ => {},
            }
        }
        quit
    }
}
