//! Scanline primitive rasterization
//!
//! Lines, rectangles, triangle outlines and span-filled circles, drawn
//! directly into a surface through the clip-aware writers. Flood filling
//! is delegated to an external algorithm behind the [`FloodFill`] trait.

use crate::surface::Surface;

/// External flood-fill algorithm. The rasterizer only forwards the seed
/// point and replacement color; the algorithm owns the fill semantics.
pub trait FloodFill {
    fn fill(&mut self, surface: &mut Surface, x: i32, y: i32, color: u32);
}

impl Surface {
    /// Draw a line between two points, Bresenham. The pixel set is the
    /// same for swapped endpoints.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u32) {
        // Canonical endpoint order: the error accumulation is not mirror
        // symmetric on its own, so rasterize every line in one direction.
        let ((x1, y1), (x2, y2)) = if (x1, y1) <= (x2, y2) {
            ((x1, y1), (x2, y2))
        } else {
            ((x2, y2), (x1, y1))
        };
        let dx = (x2 - x1).abs();
        let dy = -((y2 - y1).abs());
        let sx = if x1 < x2 { 1i32 } else { -1i32 };
        let sy = if y1 < y2 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = x1;
        let mut y = y1;

        loop {
            self.put_pixel_clipped(x, y, color);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a rectangle outline. Corners may be passed in any order;
    /// the right and bottom edges are exclusive.
    pub fn rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u32) {
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        if x2 - x1 <= 0 || y2 - y1 <= 0 {
            return;
        }
        self.hline(x1, x2 - 1, y1, color);
        self.hline(x1, x2 - 1, y2 - 1, color);
        self.vline(x1, y1, y2 - 1, color);
        self.vline(x2 - 1, y1, y2 - 1, color);
    }

    /// Fill a rectangle. Corners may be passed in any order; the right
    /// and bottom edges are exclusive.
    pub fn rect_fill(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: u32) {
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        for y in y1..y2 {
            self.hline(x1, x2 - 1, y, color);
        }
    }

    /// Draw a triangle outline as three lines between the vertices in the
    /// order given. Wireframe only.
    pub fn triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: u32,
    ) {
        self.line(x1, y1, x2, y2, color);
        self.line(x2, y2, x3, y3, color);
        self.line(x3, y3, x1, y1, color);
    }

    /// Fill a circle using the span-based midpoint algorithm.
    ///
    /// Each step emits horizontal spans mirrored across the center row;
    /// when the decision variable crosses zero the conjugate span pair is
    /// emitted as well, which is what fills the disk. Overlapping spans
    /// repaint the same color, so the overdraw is idempotent.
    pub fn circle_fill(&mut self, x: i32, y: i32, radius: i32, color: u32) {
        let mut cx = 0;
        let mut cy = radius;
        let mut df = 1 - radius;
        let mut d_e = 3;
        let mut d_se = -2 * radius + 5;

        loop {
            self.hline(x - cy, x + cy, y - cx, color);
            if cx != 0 {
                self.hline(x - cy, x + cy, y + cx, color);
            }

            if df < 0 {
                df += d_e;
                d_e += 2;
                d_se += 2;
            } else {
                if cx != cy {
                    self.hline(x - cx, x + cx, y - cy, color);
                    if cy != 0 {
                        self.hline(x - cx, x + cx, y + cy, color);
                    }
                }
                df += d_se;
                d_e += 2;
                d_se += 4;
                cy -= 1;
            }

            cx += 1;
            if cx > cy {
                break;
            }
        }
    }

    /// Flood fill starting at a seed point, delegated to an external
    /// algorithm.
    pub fn flood_fill(&mut self, x: i32, y: i32, color: u32, algo: &mut dyn FloodFill) {
        algo.fill(self, x, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_set(surf: &Surface, color: i32) -> Vec<(i32, i32)> {
        let mut set = Vec::new();
        for y in 0..surf.height() {
            for x in 0..surf.width() {
                if surf.get_pixel(x, y) == color {
                    set.push((x, y));
                }
            }
        }
        set
    }

    #[test]
    fn test_line_is_symmetric_under_endpoint_swap() {
        let mut a = Surface::with_depth(32, 10, 6);
        a.line(0, 0, 9, 4, 1);
        let mut b = Surface::with_depth(32, 10, 6);
        b.line(9, 4, 0, 0, 1);
        assert_eq!(pixel_set(&a, 1), pixel_set(&b, 1));
    }

    #[test]
    fn test_line_endpoints_are_drawn() {
        let mut surf = Surface::with_depth(32, 8, 8);
        surf.line(1, 2, 6, 5, 3);
        assert_eq!(surf.get_pixel(1, 2), 3);
        assert_eq!(surf.get_pixel(6, 5), 3);
    }

    #[test]
    fn test_rect_normalizes_reversed_corners() {
        let mut a = Surface::with_depth(32, 8, 8);
        a.rect_fill(6, 6, 2, 2, 5);
        let mut b = Surface::with_depth(32, 8, 8);
        b.rect_fill(2, 2, 6, 6, 5);
        assert_eq!(pixel_set(&a, 5), pixel_set(&b, 5));
        // Right/bottom exclusive
        assert_eq!(a.get_pixel(5, 5), 5);
        assert_eq!(a.get_pixel(6, 6), 0);
        assert_eq!(a.get_pixel(2, 2), 5);
    }

    #[test]
    fn test_rect_outline_edges() {
        let mut surf = Surface::with_depth(32, 8, 8);
        surf.rect(1, 1, 5, 5, 9);
        assert_eq!(surf.get_pixel(1, 1), 9);
        assert_eq!(surf.get_pixel(4, 1), 9);
        assert_eq!(surf.get_pixel(1, 4), 9);
        assert_eq!(surf.get_pixel(4, 4), 9);
        // Interior and the exclusive edges stay clear
        assert_eq!(surf.get_pixel(2, 2), 0);
        assert_eq!(surf.get_pixel(5, 5), 0);
    }

    #[test]
    fn test_triangle_draws_vertices() {
        let mut surf = Surface::with_depth(32, 12, 12);
        surf.triangle(1, 1, 9, 2, 4, 8, 6);
        assert_eq!(surf.get_pixel(1, 1), 6);
        assert_eq!(surf.get_pixel(9, 2), 6);
        assert_eq!(surf.get_pixel(4, 8), 6);
        // Wireframe: the centroid is untouched
        assert_eq!(surf.get_pixel(5, 4), 0);
    }

    #[test]
    fn test_circle_fill_is_axis_symmetric() {
        let mut surf = Surface::with_depth(32, 11, 11);
        surf.circle_fill(5, 5, 3, 2);
        for y in 0..11 {
            for x in 0..11 {
                let c = surf.get_pixel(x, y);
                let dx = x - 5;
                let dy = y - 5;
                assert_eq!(c, surf.get_pixel(5 - dx, y), "mirror x at {},{}", x, y);
                assert_eq!(c, surf.get_pixel(x, 5 - dy), "mirror y at {},{}", x, y);
                assert_eq!(c, surf.get_pixel(5 - dx, 5 - dy), "mirror xy at {},{}", x, y);
            }
        }
    }

    #[test]
    fn test_circle_fill_single_pixel_at_radius_zero() {
        let mut surf = Surface::with_depth(32, 5, 5);
        surf.circle_fill(2, 2, 0, 4);
        assert_eq!(pixel_set(&surf, 4), vec![(2, 2)]);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // 32-bit 10x10: clear, single pixel, sentinel, filled circle
        let c0 = 0x0000_0010;
        let c1 = 0x0000_0020;
        let c2 = 0x0000_0030;
        let mut surf = Surface::with_depth(32, 10, 10);
        surf.clear(c0 as u32);
        surf.put_pixel(5, 5, c1 as u32);
        assert_eq!(surf.get_pixel(5, 5), c1);
        assert_eq!(surf.get_pixel(-1, 0), -1);
        surf.circle_fill(5, 5, 3, c2 as u32);
        assert_eq!(surf.get_pixel(5, 2), c2);
        assert_eq!(surf.get_pixel(0, 0), c0);
    }

    struct RecordingFill {
        calls: Vec<(i32, i32, u32, i32, i32)>,
    }

    impl FloodFill for RecordingFill {
        fn fill(&mut self, surface: &mut Surface, x: i32, y: i32, color: u32) {
            self.calls
                .push((x, y, color, surface.width(), surface.height()));
        }
    }

    #[test]
    fn test_flood_fill_forwards_arguments() {
        let mut surf = Surface::with_depth(8, 6, 4);
        let mut algo = RecordingFill { calls: Vec::new() };
        surf.flood_fill(3, 2, 17, &mut algo);
        assert_eq!(algo.calls, vec![(3, 2, 17, 6, 4)]);
    }
}
