//! Display-backed surfaces and SDL presentation plumbing
//!
//! A [`Screen`] composes a presentable [`Surface`] with the staging needed
//! to upload it to a streaming texture. Window, canvas and input live in
//! [`Display`]; the texture in [`RenderTarget`]. Presentation cadence is
//! the caller's business.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

use crate::format::PixelFormat;
use crate::palette::{NativePalette, PaletteManager};
use crate::surface::{Surface, TargetKind};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

pub struct RenderTarget<'a> {
    texture: Texture<'a>,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
    KeyUp(Keycode),
}

impl Display {
    /// Create a display window with VSync enabled.
    pub fn new(title: &str) -> Result<(Self, TextureCreator<WindowContext>), String> {
        Self::with_options(title, DEFAULT_WIDTH, DEFAULT_HEIGHT, true)
    }

    /// Create a display window with custom resolution and VSync settings.
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>), String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(|e| e.to_string())?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
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

    /// Upload pixel bytes to the target texture and flip the canvas.
    pub fn present(
        &mut self,
        target: &mut RenderTarget,
        bytes: &[u8],
        pitch: usize,
    ) -> Result<(), String> {
        target
            .texture
            .update(None, bytes, pitch)
            .map_err(|e| e.to_string())?;

        self.canvas.copy(&target.texture, None, None)?;
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
                Event::KeyUp {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyUp(k)),
                _ => {},
            }
        }
        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create a streaming texture sized and formatted for a screen
    /// surface. Paletted screens stream through an RGBA staging buffer,
    /// so their texture is RGBA as well.
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<Self, String> {
        let pixel_format = match format.bytes_per_pixel {
            2 => PixelFormatEnum::RGB565,
            _ => PixelFormatEnum::ABGR8888,
        };
        let texture = texture_creator
            .create_texture_streaming(pixel_format, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self { texture })
    }
}

/// A surface backed by a presentable display target.
///
/// Behaves exactly like any other surface for pixel operations; the blit
/// engine sees its presentable tag and composites into it instead of raw
/// copying.
pub struct Screen {
    surface: Surface,
    staging: Vec<u8>,
}

impl Screen {
    /// Create a 4-byte-per-pixel screen surface.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_format(width, height, PixelFormat::rgba8888())
    }

    /// Create a screen surface with an explicit format.
    pub fn with_format(width: i32, height: i32, format: PixelFormat) -> Self {
        Self {
            surface: Surface::with_target(width, height, format, TargetKind::Presentable),
            staging: Vec::new(),
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Upload the surface to the render target and flip.
    ///
    /// Direct-color surfaces upload their storage as is; paletted
    /// surfaces are first expanded to RGBA through their attached palette
    /// (attaching the session's current palette if needed).
    pub fn present(
        &mut self,
        display: &mut Display,
        target: &mut RenderTarget,
        palettes: &PaletteManager,
    ) -> Result<(), String> {
        let w = self.surface.width() as usize;
        match self.surface.format().bytes_per_pixel {
            1 => {
                self.surface.ensure_palette(palettes);
                let palette = self
                    .surface
                    .attached_palette()
                    .ok_or_else(|| "paletted screen has no palette attached".to_string())?;
                let staging = &mut self.staging;
                self.surface
                    .with_storage(|data| expand_indexed(data, &palette, staging));
                display.present(target, &self.staging, w * 4)
            },
            2 => self
                .surface
                .with_storage(|data| display.present(target, data, w * 2)),
            _ => self
                .surface
                .with_storage(|data| display.present(target, data, w * 4)),
        }
    }
}

/// Expand palette indices to RGBA bytes for texture upload.
pub(crate) fn expand_indexed(indexed: &[u8], palette: &NativePalette, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(indexed.len() * 4);
    for &index in indexed {
        let (r, g, b) = palette.rgb(index);
        out.extend_from_slice(&[r, g, b, 255]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    #[test]
    fn test_screen_surface_is_presentable() {
        let screen = Screen::new(4, 4);
        assert_eq!(screen.surface().target(), TargetKind::Presentable);
        assert_eq!(screen.surface().color_depth(), 32);
    }

    #[test]
    fn test_screen_pixels_behave_like_any_surface() {
        let mut screen = Screen::new(4, 4);
        screen.surface_mut().put_pixel(1, 1, 0x55);
        assert_eq!(screen.surface().get_pixel(1, 1), 0x55);
        assert_eq!(screen.surface().get_pixel(4, 0), -1);
    }

    #[test]
    fn test_expand_indexed_resolves_through_palette() {
        let mut pal = Palette::new();
        pal.set_entry(2, 63, 0, 32);
        let mut mgr = PaletteManager::new();
        mgr.set_current(pal);
        let native = mgr.to_native();

        let mut out = Vec::new();
        expand_indexed(&[0, 2], &native, &mut out);
        assert_eq!(out, vec![0, 0, 0, 255, 255, 0, 130, 255]);
    }
}
