mod pixel_buffer;

pub use pixel_buffer::{GradientStop, PixelBuffer};

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::error::{Error, Result};
use crate::scheduler::Surface;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
    /// Fingers currently down, in the order they touched
    fingers: Vec<i64>,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    MouseMove { x: i32, y: i32 },
    /// Movement of the first finger still touching, in pixels
    TouchMove { x: f32, y: f32 },
    Resized { width: u32, height: u32 },
}

impl Display {
    /// Create a resizable window with custom resolution and VSync settings
    /// vsync=true: frames are paced by the monitor refresh
    /// vsync=false: uncapped framerate for performance testing
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(Error::Display)?;
        let video_subsystem = sdl_context.video().map_err(Error::Display)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build()?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(Error::Display)?;

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
                fingers: Vec::new(),
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) -> Result<()> {
        target
            .texture
            .update(None, buffer.as_bytes(), (buffer.width() * 4) as usize)
            .map_err(|e| Error::SurfaceLost(e.to_string()))?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(Error::SurfaceLost)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::MouseMotion { x, y, .. } => events.push(InputEvent::MouseMove { x, y }),
                Event::FingerDown { finger_id, .. } => {
                    if !self.fingers.contains(&finger_id) {
                        self.fingers.push(finger_id);
                    }
                },
                Event::FingerUp { finger_id, .. } => {
                    self.fingers.retain(|&f| f != finger_id);
                },
                Event::FingerMotion {
                    finger_id, x, y, ..
                } => {
                    // only the primary finger steers
                    if self.fingers.first() == Some(&finger_id) {
                        events.push(InputEvent::TouchMove {
                            x: x * self.width as f32,
                            y: y * self.height as f32,
                        });
                    }
                },
                Event::Window {
                    win_event: WindowEvent::SizeChanged(w, h),
                    ..
                } if w > 0 && h > 0 => {
                    self.width = w as u32;
                    self.height = h as u32;
                    events.push(InputEvent::Resized {
                        width: self.width,
                        height: self.height,
                    });
                },
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create render target with custom resolution
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let texture =
            texture_creator.create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Window, streaming texture and pixel buffer: the surface the field draws on
pub struct Screen<'a> {
    display: Display,
    texture_creator: &'a TextureCreator<WindowContext>,
    target: RenderTarget<'a>,
    buffer: PixelBuffer,
}

impl<'a> Screen<'a> {
    pub fn new(display: Display, texture_creator: &'a TextureCreator<WindowContext>) -> Result<Self> {
        let (width, height) = (display.width(), display.height());
        let target = RenderTarget::with_size(texture_creator, width, height)?;
        let mut buffer = PixelBuffer::with_size(width, height);
        buffer.clear(0, 0, 0);
        Ok(Self {
            display,
            texture_creator,
            target,
            buffer,
        })
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.display.poll_events()
    }

    /// Recreate the texture and pixel buffer at the new size.
    /// The buffer starts black; trails from before the resize are lost.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.target.size() == (width, height) {
            return Ok(());
        }
        self.target = RenderTarget::with_size(self.texture_creator, width, height)?;
        self.buffer = PixelBuffer::with_size(width, height);
        self.buffer.clear(0, 0, 0);
        log::info!("Surface resized to {}x{}", width, height);
        Ok(())
    }
}

impl Surface for Screen<'_> {
    fn canvas(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    fn present(&mut self) -> Result<()> {
        self.display.present(&mut self.target, &self.buffer)
    }
}
