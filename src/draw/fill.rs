use crate::draw::buffer::{DrawError, PixelBuffer};
use crate::draw::model::Color;

/// 4-connected flood fill from `(seed_x, seed_y)` replacing every pixel that
/// exactly matches the seed colour. Returns the number of pixels written.
///
/// Each matching pixel is overwritten before its neighbours are queued, so
/// the match test itself keeps a pixel from being visited twice and no
/// separate visited set is needed. Colour comparison is exact RGBA equality;
/// anti-aliased edges stop the fill.
pub fn flood_fill(
    buffer: &mut PixelBuffer,
    seed_x: i64,
    seed_y: i64,
    fill: Color,
) -> Result<usize, DrawError> {
    let target = buffer.read_pixel(seed_x, seed_y)?;
    if target == fill {
        return Ok(0);
    }

    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let target = target.to_rgba_array();
    let replacement = fill.to_rgba_array();
    let pixels = buffer.pixels_mut();

    let mut written = 0usize;
    let mut stack: Vec<(usize, usize)> = vec![(seed_x as usize, seed_y as usize)];
    while let Some((x, y)) = stack.pop() {
        let idx = (y * width + x) * 4;
        if pixels[idx..idx + 4] != target {
            continue;
        }
        pixels[idx..idx + 4].copy_from_slice(&replacement);
        written += 1;

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < width {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < height {
            stack.push((x, y + 1));
        }
    }

    tracing::debug!(seed_x, seed_y, written, "flood fill finished");
    Ok(written)
}
