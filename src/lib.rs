//! retroblit — software 2D surfaces with legacy blit semantics
//!
//! A pixel-format-agnostic surface abstraction (8-bit paletted, 16-bit
//! RGB565, 32-bit RGBA) with clipping, palette handling, a family of blit
//! operations (plain, masked, stretched, mirrored, alpha-lit) and
//! scanline primitive rasterization, plus an SDL2-presented screen
//! surface. The transparency and palette conventions follow the classic
//! immediate-mode APIs: palette index 0 and bright pink RGB(255, 0, 255)
//! are "no paint".
//!
//! Everything is synchronous and single-threaded; surfaces may alias
//! storage through sub-region views and callers serialize access.

pub mod format;
pub mod palette;
pub mod raster;
pub mod screen;
pub mod surface;

mod blit;

pub use format::PixelFormat;
pub use palette::{NativePalette, Palette, PaletteManager, PALETTE_COUNT};
pub use raster::FloodFill;
pub use screen::{Display, InputEvent, RenderTarget, Screen, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use surface::{ClipRect, Surface, TargetKind};
