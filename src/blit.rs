//! The blit family: plain, masked, stretched, flipped and lit copies
//!
//! Every operation takes the session palette state first (indexed sources
//! are lazily given a native palette before composition), then the source
//! surface and coordinates. Copies between surfaces that alias the same
//! storage (a parent and its sub-region view) are safe: the source
//! rectangle is snapshotted before any destination write.
//!
//! Destination semantics follow the target tag set at surface creation:
//! presentable destinations always composite through format conversion,
//! memory destinations take a raw value copy when the storage widths
//! match.

use crate::format::PixelFormat;
use crate::palette::{NativePalette, PaletteManager};
use crate::surface::{get_raw, put_raw, Surface, TargetKind};

/// A fully clipped copy region.
#[derive(Debug, Clone, Copy)]
struct CopySpan {
    sx: i32,
    sy: i32,
    dx: i32,
    dy: i32,
    w: i32,
    h: i32,
}

/// Clip a copy request against the source bounds and the destination's
/// write window, shifting the opposite origin as edges are trimmed.
fn clip_span(
    dst: &Surface,
    src: &Surface,
    mut sx: i32,
    mut sy: i32,
    mut dx: i32,
    mut dy: i32,
    mut w: i32,
    mut h: i32,
) -> Option<CopySpan> {
    if sx < 0 {
        dx -= sx;
        w += sx;
        sx = 0;
    }
    if sy < 0 {
        dy -= sy;
        h += sy;
        sy = 0;
    }
    w = w.min(src.width() - sx);
    h = h.min(src.height() - sy);

    let (cx0, cy0, cx1, cy1) = dst.write_bounds();
    if dx < cx0 {
        sx += cx0 - dx;
        w -= cx0 - dx;
        dx = cx0;
    }
    if dy < cy0 {
        sy += cy0 - dy;
        h -= cy0 - dy;
        dy = cy0;
    }
    w = w.min(cx1 - dx);
    h = h.min(cy1 - dy);

    if w <= 0 || h <= 0 {
        None
    } else {
        Some(CopySpan { sx, sy, dx, dy, w, h })
    }
}

/// A tightly packed copy of a source rectangle, taken before the
/// destination is written so that aliasing surfaces stay consistent.
struct Snapshot {
    w: i32,
    bpp: usize,
    bytes: Vec<u8>,
}

impl Snapshot {
    fn take(src: &Surface, sx: i32, sy: i32, w: i32, h: i32) -> Self {
        let bpp = src.format().bytes_per_pixel as usize;
        let row_bytes = w as usize * bpp;
        let mut bytes = Vec::with_capacity(row_bytes * h as usize);
        src.with_storage(|data| {
            for j in 0..h {
                let off = src.row_offset(sy + j) + sx as usize * bpp;
                bytes.extend_from_slice(&data[off..off + row_bytes]);
            }
        });
        Self { w, bpp, bytes }
    }

    #[inline]
    fn get(&self, x: i32, y: i32) -> u32 {
        let off = (y as usize * self.w as usize + x as usize) * self.bpp;
        get_raw(&self.bytes, off, self.bpp)
    }

    #[inline]
    fn row(&self, y: i32) -> &[u8] {
        let row_bytes = self.w as usize * self.bpp;
        let off = y as usize * row_bytes;
        &self.bytes[off..off + row_bytes]
    }
}

/// Per-blit pixel value converter, with palettes resolved up front.
///
/// Identical formats (including indexed-to-indexed, where indices share
/// the palette convention) pass values through unchanged. Anything else
/// resolves to channels and repacks: indexed sources read through their
/// attached palette, indexed destinations take the nearest palette match.
struct Converter {
    identity: bool,
    src_format: PixelFormat,
    dst_format: PixelFormat,
    src_pal: Option<NativePalette>,
    dst_pal: Option<NativePalette>,
}

impl Converter {
    fn new(src: &Surface, dst: &Surface) -> Self {
        Self {
            identity: src.format() == dst.format(),
            src_format: src.format(),
            dst_format: dst.format(),
            src_pal: if src.format().is_indexed() {
                src.attached_palette()
            } else {
                None
            },
            dst_pal: if dst.format().is_indexed() {
                dst.attached_palette()
            } else {
                None
            },
        }
    }

    fn convert(&self, color: u32) -> u32 {
        if self.identity {
            return color;
        }
        let (a, r, g, b) = if self.src_format.is_indexed() {
            let (r, g, b) = match &self.src_pal {
                Some(p) => p.rgb(color as u8),
                None => (0, 0, 0),
            };
            (0xFF, r, g, b)
        } else {
            self.src_format.color_to_argb(color)
        };
        if self.dst_format.is_indexed() {
            nearest_index(self.dst_pal.as_ref(), r, g, b) as u32
        } else {
            self.dst_format.argb_to_color(a, r, g, b)
        }
    }
}

/// Closest palette entry by Manhattan distance. A destination without an
/// attached palette maps everything to index 0.
fn nearest_index(pal: Option<&NativePalette>, r: u8, g: u8, b: u8) -> u8 {
    let Some(pal) = pal else { return 0 };
    let mut best = 0u8;
    let mut best_dist = i32::MAX;
    for idx in 0..=255u8 {
        let (pr, pg, pb) = pal.rgb(idx);
        let dist = (r as i32 - pr as i32).abs()
            + (g as i32 - pg as i32).abs()
            + (b as i32 - pb as i32).abs();
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }
    best
}

/// Row-by-row raw value copy; storage widths must already match.
fn copy_raw(dst: &mut Surface, src: &Surface, span: CopySpan) {
    let snap = Snapshot::take(src, span.sx, span.sy, span.w, span.h);
    let bpp = snap.bpp;
    let row_bytes = span.w as usize * bpp;
    let dst_rows: Vec<usize> = (0..span.h)
        .map(|j| dst.row_offset(span.dy + j) + span.dx as usize * bpp)
        .collect();
    dst.with_storage_mut(|data| {
        for (j, &off) in dst_rows.iter().enumerate() {
            data[off..off + row_bytes].copy_from_slice(snap.row(j as i32));
        }
    });
}

/// Per-pixel copy with optional transparency key and format conversion.
fn copy_pixels(dst: &mut Surface, src: &Surface, span: CopySpan, key: Option<u32>, conv: &Converter) {
    let snap = Snapshot::take(src, span.sx, span.sy, span.w, span.h);
    let bpp = dst.format().bytes_per_pixel as usize;
    let dst_rows: Vec<usize> = (0..span.h)
        .map(|j| dst.row_offset(span.dy + j) + span.dx as usize * bpp)
        .collect();
    dst.with_storage_mut(|data| {
        for (j, &base) in dst_rows.iter().enumerate() {
            for i in 0..span.w {
                let c = snap.get(i, j as i32);
                if key.map_or(false, |k| k == c) {
                    continue;
                }
                put_raw(data, base + i as usize * bpp, bpp, conv.convert(c));
            }
        }
    });
}

/// Nearest-neighbor resample of a source rectangle into a destination
/// rectangle. Produces exactly `dw` columns and `dh` rows of samples;
/// writes are suppressed outside the destination's write window and for
/// samples falling outside the source surface.
fn stretch_pixels(
    dst: &mut Surface,
    src: &Surface,
    sx: i32,
    sy: i32,
    sw: i32,
    sh: i32,
    dx: i32,
    dy: i32,
    dw: i32,
    dh: i32,
    key: Option<u32>,
) {
    if sw <= 0 || sh <= 0 || dw <= 0 || dh <= 0 {
        return;
    }
    let sx0 = sx.max(0);
    let sy0 = sy.max(0);
    let sx1 = (sx + sw).min(src.width());
    let sy1 = (sy + sh).min(src.height());
    if sx0 >= sx1 || sy0 >= sy1 {
        return;
    }
    let snap = Snapshot::take(src, sx0, sy0, sx1 - sx0, sy1 - sy0);
    let conv = Converter::new(src, dst);
    let (cx0, cy0, cx1, cy1) = dst.write_bounds();
    let bpp = dst.format().bytes_per_pixel as usize;

    // Destination column -> (byte offset within the row, snapshot column)
    let cols: Vec<Option<(usize, i32)>> = (0..dw)
        .map(|i| {
            let xp = dx + i;
            let xs = sx + (i as i64 * sw as i64 / dw as i64) as i32;
            if xp >= cx0 && xp < cx1 && xs >= sx0 && xs < sx1 {
                Some((xp as usize * bpp, xs - sx0))
            } else {
                None
            }
        })
        .collect();
    // Destination row -> (row byte offset, snapshot row)
    let rows: Vec<(usize, i32)> = (0..dh)
        .filter_map(|j| {
            let yp = dy + j;
            let ys = sy + (j as i64 * sh as i64 / dh as i64) as i32;
            if yp >= cy0 && yp < cy1 && ys >= sy0 && ys < sy1 {
                Some((dst.row_offset(yp), ys - sy0))
            } else {
                None
            }
        })
        .collect();

    dst.with_storage_mut(|data| {
        for &(base, ys) in &rows {
            for col in &cols {
                let Some((col_off, xs)) = *col else { continue };
                let c = snap.get(xs, ys);
                if key.map_or(false, |k| k == c) {
                    continue;
                }
                put_raw(data, base + col_off, bpp, conv.convert(c));
            }
        }
    });
}

impl Surface {
    /// Copy a source rectangle onto this surface at the given origin.
    ///
    /// A presentable destination composites through format conversion; an
    /// off-screen destination takes a raw value copy when the storage
    /// widths match, carrying an indexed source's palette onto an indexed
    /// destination that has none of its own.
    pub fn blit_from(
        &mut self,
        palettes: &PaletteManager,
        src: &Surface,
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
        width: i32,
        height: i32,
    ) {
        src.ensure_palette(palettes);
        let Some(span) = clip_span(self, src, src_x, src_y, dst_x, dst_y, width, height) else {
            return;
        };
        let same_width = self.format().bytes_per_pixel == src.format().bytes_per_pixel;
        if self.target() == TargetKind::Memory && same_width {
            copy_raw(self, src, span);
            if src.format().is_indexed()
                && self.format().is_indexed()
                && self.attached_palette().is_none()
            {
                self.set_attached_palette(src.attached_palette());
            }
        } else {
            let conv = Converter::new(src, self);
            copy_pixels(self, src, span, None, &conv);
        }
    }

    /// Like [`blit_from`](Self::blit_from), but source pixels equal to the
    /// source's transparent color are not written.
    pub fn masked_from(
        &mut self,
        palettes: &PaletteManager,
        src: &Surface,
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
        width: i32,
        height: i32,
    ) {
        src.ensure_palette(palettes);
        let Some(span) = clip_span(self, src, src_x, src_y, dst_x, dst_y, width, height) else {
            return;
        };
        let conv = Converter::new(src, self);
        copy_pixels(self, src, span, Some(src.mask_color()), &conv);
    }

    /// Resample a source rectangle into a destination rectangle,
    /// nearest neighbor.
    pub fn stretch_from(
        &mut self,
        palettes: &PaletteManager,
        src: &Surface,
        src_x: i32,
        src_y: i32,
        src_w: i32,
        src_h: i32,
        dst_x: i32,
        dst_y: i32,
        dst_w: i32,
        dst_h: i32,
    ) {
        src.ensure_palette(palettes);
        stretch_pixels(
            self, src, src_x, src_y, src_w, src_h, dst_x, dst_y, dst_w, dst_h, None,
        );
    }

    /// Like [`stretch_from`](Self::stretch_from), but transparent source
    /// pixels are not written.
    pub fn masked_stretch_from(
        &mut self,
        palettes: &PaletteManager,
        src: &Surface,
        src_x: i32,
        src_y: i32,
        src_w: i32,
        src_h: i32,
        dst_x: i32,
        dst_y: i32,
        dst_w: i32,
        dst_h: i32,
    ) {
        src.ensure_palette(palettes);
        let key = src.mask_color();
        stretch_pixels(
            self, src, src_x, src_y, src_w, src_h, dst_x, dst_y, dst_w, dst_h,
            Some(key),
        );
    }

    /// Draw a whole sprite at a point, keyed on the transparent color.
    pub fn draw_sprite(&mut self, palettes: &PaletteManager, sprite: &Surface, x: i32, y: i32) {
        self.masked_from(palettes, sprite, 0, 0, x, y, sprite.width(), sprite.height());
    }

    /// Scale a whole sprite into a destination rectangle, keyed on the
    /// transparent color.
    pub fn stretch_sprite(
        &mut self,
        palettes: &PaletteManager,
        sprite: &Surface,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) {
        self.masked_stretch_from(
            palettes,
            sprite,
            0,
            0,
            sprite.width(),
            sprite.height(),
            x,
            y,
            width,
            height,
        );
    }

    /// Draw a whole sprite at a point without transparency keying,
    /// converting between formats as needed.
    pub fn draw_trans_sprite(
        &mut self,
        palettes: &PaletteManager,
        sprite: &Surface,
        x: i32,
        y: i32,
    ) {
        sprite.ensure_palette(palettes);
        let Some(span) =
            clip_span(self, sprite, 0, 0, x, y, sprite.width(), sprite.height())
        else {
            return;
        };
        let conv = Converter::new(sprite, self);
        copy_pixels(self, sprite, span, None, &conv);
    }

    /// Draw a sprite mirrored horizontally: destination columns sample the
    /// source right to left. Keyed on the transparent color.
    pub fn draw_sprite_h_flip(
        &mut self,
        palettes: &PaletteManager,
        sprite: &Surface,
        x: i32,
        y: i32,
    ) {
        sprite.ensure_palette(palettes);
        let snap = Snapshot::take(sprite, 0, 0, sprite.width(), sprite.height());
        let conv = Converter::new(sprite, self);
        let key = sprite.mask_color();
        let (cx0, cy0, cx1, cy1) = self.write_bounds();
        let bpp = self.format().bytes_per_pixel as usize;
        let rows: Vec<(usize, i32)> = (0..sprite.height())
            .filter_map(|j| {
                let yp = y + j;
                if yp >= cy0 && yp < cy1 {
                    Some((self.row_offset(yp), j))
                } else {
                    None
                }
            })
            .collect();
        let w = snap.w;
        self.with_storage_mut(|data| {
            for &(base, j) in &rows {
                for i in 0..w {
                    let xp = x + i;
                    if xp < cx0 || xp >= cx1 {
                        continue;
                    }
                    let c = snap.get(w - 1 - i, j);
                    if c == key {
                        continue;
                    }
                    put_raw(data, base + xp as usize * bpp, bpp, conv.convert(c));
                }
            }
        });
    }

    /// Vertical sprite mirroring is not implemented.
    pub fn draw_sprite_v_flip(
        &mut self,
        _palettes: &PaletteManager,
        _sprite: &Surface,
        _x: i32,
        _y: i32,
    ) {
        panic!("draw_sprite_v_flip is not implemented");
    }

    /// Combined horizontal+vertical sprite mirroring is not implemented.
    pub fn draw_sprite_vh_flip(
        &mut self,
        _palettes: &PaletteManager,
        _sprite: &Surface,
        _x: i32,
        _y: i32,
    ) {
        panic!("draw_sprite_vh_flip is not implemented");
    }

    /// Sprite rotation is not implemented.
    pub fn rotate_sprite(&mut self, _sprite: &Surface, _x: i32, _y: i32, _angle: f64) {
        panic!("rotate_sprite is not implemented");
    }

    /// Sprite rotation about a pivot point is not implemented.
    pub fn pivot_sprite(
        &mut self,
        _sprite: &Surface,
        _x: i32,
        _y: i32,
        _cx: i32,
        _cy: i32,
        _angle: f64,
    ) {
        panic!("pivot_sprite is not implemented");
    }

    /// Alpha-blend a sprite onto this surface at the given intensity.
    ///
    /// Both surfaces must use 4-byte storage. `intensity` 0 leaves the
    /// destination unchanged, 255 copies the sprite. Pixels whose RGB
    /// equals the bright-pink key are skipped, as are destination
    /// coordinates outside either surface; a negative destination column
    /// suppresses the write without stopping the row scan. The sprite's
    /// own alpha channel does not attenuate the blend.
    pub fn draw_lit_sprite(&mut self, sprite: &Surface, x: i32, y: i32, intensity: u8) {
        assert!(
            sprite.format().bytes_per_pixel == 4 && self.format().bytes_per_pixel == 4,
            "draw_lit_sprite requires 4-byte source and destination"
        );
        let alpha = intensity as f64 / 255.0;
        let snap = Snapshot::take(sprite, 0, 0, sprite.width(), sprite.height());
        let src_format = sprite.format();
        let dst_format = self.format();
        let dst_w = self.width();
        let rows: Vec<(usize, i32)> = (0..sprite.height())
            .filter_map(|j| {
                let yp = y + j;
                if yp < 0 || yp >= self.height() {
                    None
                } else {
                    Some((self.row_offset(yp), j))
                }
            })
            .collect();
        let w = snap.w;
        self.with_storage_mut(|data| {
            for &(base, j) in &rows {
                for i in 0..w {
                    let xp = x + i;
                    if xp < 0 {
                        continue;
                    }
                    if xp >= dst_w {
                        break;
                    }
                    let (_src_alpha, sr, sg, sb) = src_format.color_to_argb(snap.get(i, j));
                    if sr == 255 && sg == 0 && sb == 255 {
                        continue;
                    }
                    let off = base + xp as usize * 4;
                    let (dr, dg, db) = dst_format.color_to_rgb(get_raw(data, off, 4));
                    let r = (sr as f64 * alpha + dr as f64 * (1.0 - alpha)).round() as u8;
                    let g = (sg as f64 * alpha + dg as f64 * (1.0 - alpha)).round() as u8;
                    let b = (sb as f64 * alpha + db as f64 * (1.0 - alpha)).round() as u8;
                    put_raw(data, off, 4, dst_format.rgb_to_color(r, g, b));
                }
            }
        });
    }
}
