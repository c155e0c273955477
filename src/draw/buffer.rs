use crate::draw::model::{Color, Point};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },
    SizeMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "pixel ({x}, {y}) outside {width}x{height} buffer"),
            DrawError::SizeMismatch { expected, found } => write!(
                f,
                "snapshot is {}x{} but buffer is {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for DrawError {}

/// Immutable copy of a buffer's pixels, used as a history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Box<[u8]>,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy of this snapshot re-laid onto a `width`x`height` grid, origin
    /// aligned. Rows and columns past the new size are dropped; new area is
    /// transparent.
    pub fn reframed(&self, width: u32, height: u32) -> Snapshot {
        let mut pixels = vec![0u8; byte_len(width, height)];
        copy_origin_aligned(
            &self.pixels,
            (self.width, self.height),
            &mut pixels,
            (width, height),
        );
        Snapshot {
            width,
            height,
            pixels: pixels.into_boxed_slice(),
        }
    }
}

/// RGBA8 pixel grid in physical pixels, plus the logical to physical scale
/// (device pixel ratio) it was allocated for.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    scale: f32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer at scale 1.
    pub fn allocate(width: u32, height: u32) -> Self {
        Self::with_scale(width, height, 1.0)
    }

    pub fn with_scale(width: u32, height: u32, scale: f32) -> Self {
        Self {
            width,
            height,
            scale: sanitize_scale(scale),
            pixels: vec![0u8; byte_len(width, height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = sanitize_scale(scale);
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub fn read_pixel(&self, x: i64, y: i64) -> Result<Color, DrawError> {
        let idx = self.index_of(x, y)?;
        Ok(Color::from_rgba_array([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]))
    }

    pub fn write_pixel(&mut self, x: i64, y: i64, color: Color) -> Result<(), DrawError> {
        let idx = self.index_of(x, y)?;
        self.pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
        Ok(())
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone().into_boxed_slice(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), DrawError> {
        if snapshot.size() != self.size() {
            return Err(DrawError::SizeMismatch {
                expected: self.size(),
                found: snapshot.size(),
            });
        }
        self.pixels.copy_from_slice(&snapshot.pixels);
        Ok(())
    }

    /// True when every pixel has zero alpha, whatever its RGB.
    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Reallocates to `width`x`height`, keeping existing content at the same
    /// physical coordinates. A shrink clips, a grow pads with transparent.
    pub fn reallocate_preserving(&mut self, width: u32, height: u32) {
        let mut pixels = vec![0u8; byte_len(width, height)];
        copy_origin_aligned(&self.pixels, self.size(), &mut pixels, (width, height));
        self.pixels = pixels;
        self.width = width;
        self.height = height;
    }

    /// Maps a logical sample to physical coordinates. The result may lie
    /// outside the buffer; callers clip.
    pub fn to_physical(&self, point: Point) -> (i32, i32) {
        (
            (point.x * self.scale).floor() as i32,
            (point.y * self.scale).floor() as i32,
        )
    }

    /// Logical length scaled to physical pixels, never below one.
    pub fn physical_length(&self, logical: u32) -> u32 {
        ((logical as f32 * self.scale).round() as u32).max(1)
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn index_of(&self, x: i64, y: i64) -> Result<usize, DrawError> {
        if !self.contains(x, y) {
            return Err(DrawError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(((y as usize) * self.width as usize + x as usize) * 4)
    }
}

fn sanitize_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

pub(crate) fn byte_len(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4)
}

fn copy_origin_aligned(src: &[u8], src_size: (u32, u32), dst: &mut [u8], dst_size: (u32, u32)) {
    let cols = src_size.0.min(dst_size.0) as usize;
    let rows = src_size.1.min(dst_size.1) as usize;
    let src_stride = src_size.0 as usize * 4;
    let dst_stride = dst_size.0 as usize * 4;
    for row in 0..rows {
        let src_start = row * src_stride;
        let dst_start = row * dst_stride;
        dst[dst_start..dst_start + cols * 4].copy_from_slice(&src[src_start..src_start + cols * 4]);
    }
}
