use crate::draw::buffer::PixelBuffer;
use crate::draw::model::{Color, Point, Tool, ToolState};
use crate::draw::render::{draw_segment, DirtyRect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveStroke {
    pub tool: Tool,
    pub color: Color,
    /// Width in logical units, tool multiplier already applied.
    pub logical_width: u32,
    pub physical_width: u32,
    pub last: Point,
    pub segments: usize,
    /// Everything this stroke has touched so far.
    pub dirty: Option<DirtyRect>,
}

/// Freehand painting. Consecutive pointer samples are joined with round
/// capped segments so sparse sampling still gives a continuous line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeEngine {
    active: Option<ActiveStroke>,
}

impl StrokeEngine {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveStroke> {
        self.active.as_ref()
    }

    /// Sets the path origin without touching the buffer. Returns false for
    /// tools that do not stroke.
    pub fn begin_stroke(&mut self, tools: ToolState, start: Point, buffer: &PixelBuffer) -> bool {
        if !tools.tool.is_freehand() {
            return false;
        }
        let logical_width = tools.effective_width();
        self.active = Some(ActiveStroke {
            tool: tools.tool,
            color: tools.effective_color(),
            logical_width,
            physical_width: buffer.physical_length(logical_width),
            last: start,
            segments: 0,
            dirty: None,
        });
        true
    }

    /// Draws from the last sample to `point` and advances the path.
    pub fn extend_stroke(&mut self, buffer: &mut PixelBuffer, point: Point) -> Option<DirtyRect> {
        let stroke = self.active.as_mut()?;
        let start = buffer.to_physical(stroke.last);
        let end = buffer.to_physical(point);
        let dirty = draw_segment(buffer, start, end, stroke.color, stroke.physical_width);
        stroke.last = point;
        stroke.segments += 1;
        stroke.dirty = match (stroke.dirty, dirty) {
            (Some(total), Some(segment)) => Some(total.union(segment)),
            (total, segment) => total.or(segment),
        };
        dirty
    }

    pub fn end_stroke(&mut self) -> Option<ActiveStroke> {
        self.active.take()
    }

    /// Re-derives the physical width after the buffer's scale changed.
    pub fn rescale(&mut self, buffer: &PixelBuffer) {
        if let Some(stroke) = self.active.as_mut() {
            stroke.physical_width = buffer.physical_length(stroke.logical_width);
        }
    }
}
