use crate::draw::buffer::PixelBuffer;
use crate::draw::model::Color;

/// Widths at or above this are rasterized as a capsule instead of stamping a
/// disc at every Bresenham step.
pub const WIDE_STROKE_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn from_points(a: (i32, i32), b: (i32, i32), pad: i32) -> Self {
        let min_x = a.0.min(b.0).saturating_sub(pad);
        let max_x = a.0.max(b.0).saturating_add(pad);
        let min_y = a.1.min(b.1).saturating_sub(pad);
        let max_y = a.1.max(b.1).saturating_add(pad);
        Self {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).saturating_add(1).max(1),
            height: max_y.saturating_sub(min_y).saturating_add(1).max(1),
        }
    }

    pub fn union(self, other: DirtyRect) -> DirtyRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());
        DirtyRect {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x).max(1),
            height: max_y.saturating_sub(min_y).max(1),
        }
    }

    pub fn clamp(self, width: u32, height: u32) -> Option<DirtyRect> {
        let max_w = i32::try_from(width).unwrap_or(i32::MAX);
        let max_h = i32::try_from(height).unwrap_or(i32::MAX);
        let x0 = self.x.clamp(0, max_w);
        let y0 = self.y.clamp(0, max_h);
        let x1 = self.right().clamp(0, max_w);
        let y1 = self.bottom().clamp(0, max_h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// A stroke of width `w` through integer point `p` is centred on the middle
/// of pixel `p` for odd widths and on its top-left corner for even widths,
/// so it covers exactly `w` rows or columns. Returns the offset added to a
/// pixel index before measuring its distance from the centre line.
fn centre_shift(stroke_width: u32) -> f32 {
    if stroke_width % 2 == 1 {
        0.0
    } else {
        0.5
    }
}

fn half_width_sq(stroke_width: u32) -> f32 {
    let half = stroke_width as f32 / 2.0;
    half * half
}

/// Bounds a round-capped segment of `stroke_width` can touch.
pub fn segment_dirty_bounds(start: (i32, i32), end: (i32, i32), stroke_width: u32) -> DirtyRect {
    let pad = i32::try_from(stroke_width / 2).unwrap_or(i32::MAX).saturating_add(1);
    DirtyRect::from_points(start, end, pad)
}

/// Draws a round-capped segment in physical coordinates, clipped to the
/// buffer. Returns the clipped area that may have changed.
pub fn draw_segment(
    buffer: &mut PixelBuffer,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
) -> Option<DirtyRect> {
    let stroke_width = stroke_width.max(1);
    let margin = i64::from(stroke_width) + 2;
    let (start, end) = clip_to_margin(start, end, buffer.size(), margin)?;
    let dirty = segment_dirty_bounds(start, end, stroke_width).clamp(buffer.width(), buffer.height())?;
    if stroke_width >= WIDE_STROKE_THRESHOLD {
        draw_segment_capsule(buffer, start, end, color, stroke_width, dirty);
    } else {
        draw_segment_dense_stamped(buffer, start, end, color, stroke_width);
    }
    Some(dirty)
}

/// Cuts the segment down to the buffer grown by `margin` on every side
/// (Liang-Barsky). Segments already inside come back untouched.
fn clip_to_margin(
    start: (i32, i32),
    end: (i32, i32),
    size: (u32, u32),
    margin: i64,
) -> Option<((i32, i32), (i32, i32))> {
    let min = -margin;
    let max_x = i64::from(size.0) + margin;
    let max_y = i64::from(size.1) + margin;
    let inside = |(x, y): (i32, i32)| {
        let (x, y) = (i64::from(x), i64::from(y));
        (min..=max_x).contains(&x) && (min..=max_y).contains(&y)
    };
    if inside(start) && inside(end) {
        return Some((start, end));
    }

    let (x0, y0) = (f64::from(start.0), f64::from(start.1));
    let dx = f64::from(end.0) - x0;
    let dy = f64::from(end.1) - y0;
    let (min, max_x, max_y) = (min as f64, max_x as f64, max_y as f64);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - min),
        (dx, max_x - x0),
        (-dy, y0 - min),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| ((x0 + dx * t).round() as i32, (y0 + dy * t).round() as i32);
    Some((at(t0), at(t1)))
}

fn draw_segment_dense_stamped(
    buffer: &mut PixelBuffer,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
) {
    let mut x0 = start.0;
    let mut y0 = start.1;
    let x1 = end.0;
    let y1 = end.1;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        draw_brush(buffer, (x0, y0), color, stroke_width);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_segment_capsule(
    buffer: &mut PixelBuffer,
    start: (i32, i32),
    end: (i32, i32),
    color: Color,
    stroke_width: u32,
    clip: DirtyRect,
) {
    let shift = centre_shift(stroke_width);
    let limit = half_width_sq(stroke_width);
    for y in clip.y..(clip.y + clip.height) {
        for x in clip.x..(clip.x + clip.width) {
            let sample = (x as f32 + shift, y as f32 + shift);
            if point_segment_distance_sq(sample, start, end) <= limit {
                set_pixel_clipped(buffer, x, y, color);
            }
        }
    }
}

fn point_segment_distance_sq(point: (f32, f32), start: (i32, i32), end: (i32, i32)) -> f32 {
    let (px, py) = point;
    let x0 = start.0 as f32;
    let y0 = start.1 as f32;
    let vx = end.0 as f32 - x0;
    let vy = end.1 as f32 - y0;
    let wx = px - x0;
    let wy = py - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}

/// Stamps a filled disc `stroke_width` pixels across at `center`.
pub fn draw_brush(buffer: &mut PixelBuffer, center: (i32, i32), color: Color, stroke_width: u32) {
    let shift = centre_shift(stroke_width);
    let limit = half_width_sq(stroke_width);
    let reach = i32::try_from(stroke_width / 2).unwrap_or(i32::MAX);
    for y in center.1.saturating_sub(reach)..=center.1.saturating_add(reach) {
        for x in center.0.saturating_sub(reach)..=center.0.saturating_add(reach) {
            let dx = (x - center.0) as f32 + shift;
            let dy = (y - center.1) as f32 + shift;
            if dx * dx + dy * dy <= limit {
                set_pixel_clipped(buffer, x, y, color);
            }
        }
    }
}

fn set_pixel_clipped(buffer: &mut PixelBuffer, x: i32, y: i32, color: Color) {
    let (x, y) = (x as i64, y as i64);
    if buffer.contains(x, y) {
        // Bounds were just checked.
        let _ = buffer.write_pixel(x, y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = Color::WHITE;

    fn painted(buffer: &PixelBuffer) -> usize {
        buffer.pixels().chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    #[test]
    fn one_pixel_line_covers_every_step() {
        let mut buffer = PixelBuffer::allocate(8, 8);
        draw_segment(&mut buffer, (0, 0), (7, 7), WHITE, 1);
        assert_eq!(painted(&buffer), 8);
        for i in 0..8 {
            assert_eq!(buffer.read_pixel(i, i), Ok(WHITE));
        }
    }

    #[test]
    fn zero_length_segment_leaves_round_dot() {
        let mut buffer = PixelBuffer::allocate(9, 9);
        draw_segment(&mut buffer, (4, 4), (4, 4), WHITE, 5);
        assert_eq!(buffer.read_pixel(4, 2), Ok(WHITE));
        assert_eq!(buffer.read_pixel(2, 2), Ok(Color::TRANSPARENT));
        assert_eq!(painted(&buffer), 21);
    }

    #[test]
    fn capsule_path_covers_radius_and_round_caps() {
        let mut capsule = PixelBuffer::allocate(32, 32);
        draw_segment(&mut capsule, (8, 16), (24, 16), WHITE, WIDE_STROKE_THRESHOLD + 1);
        for x in 8..=24 {
            for dy in -5..=5 {
                assert_eq!(capsule.read_pixel(x, 16 + dy), Ok(WHITE));
            }
            assert_eq!(capsule.read_pixel(x, 22), Ok(Color::TRANSPARENT));
        }
        // Round caps extend past the end points.
        assert_eq!(capsule.read_pixel(3, 16), Ok(WHITE));
        assert_eq!(capsule.read_pixel(3, 11), Ok(Color::TRANSPARENT));
    }

    #[test]
    fn segments_are_clipped_at_buffer_edges() {
        let mut buffer = PixelBuffer::allocate(4, 4);
        let dirty = draw_segment(&mut buffer, (-10, 1), (10, 1), WHITE, 3);
        assert_eq!(
            dirty,
            Some(DirtyRect {
                x: 0,
                y: 0,
                width: 4,
                height: 4
            })
        );
        assert_eq!(painted(&buffer), 12);
    }

    #[test]
    fn fully_offscreen_segment_reports_nothing() {
        let mut buffer = PixelBuffer::allocate(4, 4);
        assert_eq!(draw_segment(&mut buffer, (20, 20), (30, 30), WHITE, 3), None);
        assert!(buffer.is_blank());
    }

    #[test]
    fn dirty_bounds_union_covers_both_segments() {
        let a = segment_dirty_bounds((0, 0), (4, 0), 3);
        let b = segment_dirty_bounds((10, 10), (12, 12), 3);
        let merged = a.union(b);
        assert_eq!(merged.x, -2);
        assert_eq!(merged.y, -2);
        assert_eq!(merged.x + merged.width, 15);
        assert_eq!(merged.y + merged.height, 15);
    }

    fn painted_rows_in_column(buffer: &PixelBuffer, x: i64) -> Vec<i64> {
        (0..buffer.height() as i64)
            .filter(|&y| buffer.read_pixel(x, y).map(|c| c.a != 0).unwrap_or(false))
            .collect()
    }

    #[test]
    fn stroke_of_width_n_covers_n_rows() {
        for width in 1..=WIDE_STROKE_THRESHOLD + 3 {
            let mut buffer = PixelBuffer::allocate(40, 40);
            draw_segment(&mut buffer, (5, 20), (34, 20), WHITE, width);
            let rows = painted_rows_in_column(&buffer, 20);
            assert_eq!(rows.len(), width as usize, "width {width}");
            assert!(rows.windows(2).all(|pair| pair[1] == pair[0] + 1));
        }
    }

    #[test]
    fn even_widths_differ_from_the_odd_width_below() {
        let mut narrow = PixelBuffer::allocate(20, 20);
        let mut wide = PixelBuffer::allocate(20, 20);
        draw_segment(&mut narrow, (2, 10), (17, 10), WHITE, 1);
        draw_segment(&mut wide, (2, 10), (17, 10), WHITE, 2);
        assert_eq!(painted_rows_in_column(&narrow, 8), vec![10]);
        assert_eq!(painted_rows_in_column(&wide, 8), vec![9, 10]);
        assert!(painted(&wide) >= 2 * painted(&narrow));
    }

    #[test]
    fn far_away_end_point_is_clipped_not_walked() {
        let mut buffer = PixelBuffer::allocate(16, 16);
        let dirty = draw_segment(&mut buffer, (2, 2), (i32::MAX, 2), WHITE, 3);
        assert_eq!(
            dirty,
            Some(DirtyRect {
                x: 0,
                y: 0,
                width: 16,
                height: 5
            })
        );
        for x in 2..16 {
            assert_eq!(buffer.read_pixel(x, 2), Ok(WHITE));
        }

        let mut buffer = PixelBuffer::allocate(16, 16);
        assert!(draw_segment(&mut buffer, (i32::MIN, i32::MIN), (i32::MAX, i32::MAX), WHITE, 1).is_some());
        assert_eq!(buffer.read_pixel(8, 8), Ok(WHITE));
        assert_eq!(draw_segment(&mut buffer, (i32::MIN, 40), (i32::MAX, 40), WHITE, 1), None);
    }

    #[test]
    fn dirty_rect_math_saturates() {
        let rect = DirtyRect::from_points((-100, 0), (i32::MAX, 0), 4);
        assert_eq!(rect.x, -104);
        assert_eq!(rect.width, i32::MAX);
        let corner = DirtyRect::from_points((i32::MIN, i32::MIN), (i32::MIN, i32::MIN), 2);
        assert_eq!((corner.x, corner.width), (i32::MIN, 3));
        assert_eq!(
            rect.clamp(8, 8),
            Some(DirtyRect {
                x: 0,
                y: 0,
                width: 8,
                height: 5
            })
        );
        assert_eq!(rect.union(DirtyRect::from_points((0, 0), (1, 1), 0)).x, -104);
    }
}
