//! SDL2 window the painting is shown in
//!
//! The left mouse button is the brush. Everything else the loop cares about
//! arrives as a key press or a quit request.

use super::PixelBuffer;
use crate::geometry::Point;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
}

/// Streaming texture the canvas is uploaded into
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    BrushDown(Point),
    /// Pointer motion; only meaningful while the brush is down
    BrushMove(Point),
    BrushUp,
}

impl Display {
    /// Open a centered window.
    /// vsync=true: locked to monitor refresh (typically 60fps)
    /// vsync=false: uncapped framerate
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video = sdl_context.video()?;

        let window = video
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut builder = window.into_canvas().accelerated();
        if vsync {
            builder = builder.present_vsync();
        }
        let canvas = builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((Self { canvas, event_pump }, texture_creator))
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.canvas.window_mut().set_title(title).map_err(|e| e.to_string())
    }

    /// Upload `paint` and flip
    pub fn present(&mut self, target: &mut RenderTarget, paint: &PixelBuffer) -> Result<(), String> {
        target
            .texture
            .update(None, paint.as_bytes(), (paint.width() * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        self.event_pump.poll_iter().filter_map(|e| translate(&e)).collect()
    }
}

impl<'a> RenderTarget<'a> {
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self { texture })
    }
}

fn translate(event: &Event) -> Option<InputEvent> {
    let at = |x: i32, y: i32| Point::new(x as f64, y as f64);
    match *event {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::KeyDown {
            keycode: Some(k),
            repeat: false,
            ..
        } => Some(InputEvent::KeyDown(k)),
        Event::MouseButtonDown {
            x,
            y,
            mouse_btn: MouseButton::Left,
            ..
        } => Some(InputEvent::BrushDown(at(x, y))),
        Event::MouseButtonUp {
            mouse_btn: MouseButton::Left,
            ..
        } => Some(InputEvent::BrushUp),
        Event::MouseMotion { x, y, .. } => Some(InputEvent::BrushMove(at(x, y))),
        // A stroke never outlives the window losing the pointer
        Event::Window {
            win_event: WindowEvent::FocusLost | WindowEvent::Leave,
            ..
        } => Some(InputEvent::BrushUp),
        _ => None,
    }
}
