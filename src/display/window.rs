//! SDL2 window that uploads a [`PixelBuffer`] every frame.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use super::PixelBuffer;
use crate::error::{Error, Result};
use crate::grid::Dimensions;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    dims: Dimensions,
}

/// Streaming texture matching the framebuffer size
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    dims: Dimensions,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    /// Wheel notch at pixel `(x, y)`; positive `delta` scrolls up
    Wheel { x: i32, y: i32, delta: f32 },
    /// Pointer motion while the left button is held
    Drag { dx: i32, dy: i32 },
}

impl Display {
    /// Open a centred window. `vsync` locks presentation to the monitor refresh.
    pub fn new(
        title: &str,
        dims: Dimensions,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(Error::display)?;
        let video_subsystem = sdl_context.video().map_err(Error::display)?;

        let window = video_subsystem
            .window(title, dims.width as u32, dims.height as u32)
            .position_centered()
            .build()
            .map_err(|e| Error::display(e.to_string()))?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| Error::display(e.to_string()))?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(Error::display)?;

        tracing::info!(width = dims.width, height = dims.height, vsync, "window opened");
        Ok((
            Self {
                canvas,
                event_pump,
                dims,
            },
            texture_creator,
        ))
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    /// Upload `buffer` and flip
    pub fn present(&mut self, target: &mut RenderTarget, buffer: &PixelBuffer) -> Result<()> {
        if buffer.dims() != target.dims {
            return Err(Error::display(format!(
                "buffer is {}x{} but render target is {}x{}",
                buffer.width(),
                buffer.height(),
                target.dims.width,
                target.dims.height
            )));
        }
        target
            .texture
            .update(None, buffer.as_bytes(), buffer.width() * 4)
            .map_err(|e| Error::display(e.to_string()))?;

        self.canvas
            .copy(&target.texture, None, None)
            .map_err(Error::display)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let mut wheel = 0.0;

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                Event::MouseWheel { y, .. } => wheel += y as f32,
                Event::MouseMotion {
                    mousestate,
                    xrel,
                    yrel,
                    ..
                } if mousestate.left() => events.push(InputEvent::Drag { dx: xrel, dy: yrel }),
                _ => {},
            }
        }

        if wheel != 0.0 {
            let mouse = self.event_pump.mouse_state();
            events.push(InputEvent::Wheel {
                x: mouse.x(),
                y: mouse.y(),
                delta: wheel,
            });
        }
        events
    }
}

impl<'a> RenderTarget<'a> {
    pub fn new(texture_creator: &'a TextureCreator<WindowContext>, dims: Dimensions) -> Result<Self> {
        // RGBA32 is byte order R, G, B, A regardless of endianness, matching `Color`
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA32, dims.width as u32, dims.height as u32)
            .map_err(|e| Error::display(e.to_string()))?;
        Ok(Self { texture, dims })
    }
}
