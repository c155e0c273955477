use crate::draw::annotations::{bounding_box_of_non_transparent, Annotation, Rect, ResultOverlay, VariableTable};
use crate::draw::buffer::{PixelBuffer, Snapshot};
use crate::draw::dispatcher::RecognitionDispatcher;
use crate::draw::fill::flood_fill;
use crate::draw::history::HistoryStack;
use crate::draw::messages::{RecognitionEvent, RequestId, RunError, RunNotice, RUN_FAILED_MESSAGE};
use crate::draw::model::{Point, Tool, ToolState};
use crate::draw::recognizer::{encode_png_data_url, RecognizeRequest};
use crate::draw::render::DirtyRect;
use crate::draw::settings::SurfaceSettings;
use crate::draw::stroke::StrokeEngine;
use crate::draw::viewport::{physical_size, ResizeOutcome, ViewportResizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    StrokeStarted,
    Filled { pixels: usize },
    Ignored,
}

/// The drawing canvas: pixels, history, the stroke in progress and the
/// recognition overlay. All mutation goes through `&mut self`, so an undo
/// can never land between two halves of a stroke segment.
#[derive(Debug, Clone)]
pub struct DrawingSurface {
    buffer: PixelBuffer,
    history: HistoryStack,
    strokes: StrokeEngine,
    resizer: ViewportResizer,
    overlay: ResultOverlay,
    last_applied: Option<RequestId>,
    result_bounds: Option<Rect>,
}

impl DrawingSurface {
    pub fn new(
        logical_width: f32,
        logical_height: f32,
        device_pixel_ratio: f32,
        history_limit: Option<usize>,
    ) -> Self {
        let (width, height) = physical_size(logical_width, logical_height, device_pixel_ratio);
        Self::from_buffer(
            PixelBuffer::with_scale(width, height, device_pixel_ratio),
            history_limit,
        )
    }

    pub fn from_settings(
        settings: &SurfaceSettings,
        logical_width: f32,
        logical_height: f32,
        device_pixel_ratio: f32,
    ) -> Self {
        Self::new(
            logical_width,
            logical_height,
            device_pixel_ratio,
            settings.history_limit,
        )
    }

    pub fn from_buffer(buffer: PixelBuffer, history_limit: Option<usize>) -> Self {
        Self {
            buffer,
            history: HistoryStack::with_limit(history_limit),
            strokes: StrokeEngine::default(),
            resizer: ViewportResizer::default(),
            overlay: ResultOverlay::default(),
            last_applied: None,
            result_bounds: None,
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn variables(&self) -> &VariableTable {
        self.overlay.variables()
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.overlay.annotations()
    }

    pub fn is_drawing(&self) -> bool {
        self.strokes.is_active()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.is_blank()
    }

    /// Ink bounds captured when the most recently applied run was sent, for
    /// placing its annotations.
    pub fn last_result_bounds(&self) -> Option<Rect> {
        self.result_bounds
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        bounding_box_of_non_transparent(&self.buffer)
    }

    pub fn pointer_down(&mut self, point: Point, tools: ToolState) -> PointerAction {
        self.finish_stroke();

        if tools.tool == Tool::Fill {
            let (x, y) = self.buffer.to_physical(point);
            if !self.buffer.contains(x as i64, y as i64) {
                tracing::debug!(x, y, "fill seed outside canvas ignored");
                return PointerAction::Ignored;
            }
            self.history.push_undo(self.buffer.to_snapshot());
            return match flood_fill(&mut self.buffer, x as i64, y as i64, tools.color) {
                Ok(pixels) => PointerAction::Filled { pixels },
                Err(err) => {
                    tracing::error!(%err, "flood fill rejected an in-bounds seed");
                    PointerAction::Ignored
                }
            };
        }

        self.history.push_undo(self.buffer.to_snapshot());
        self.strokes.begin_stroke(tools, point, &self.buffer);
        tracing::debug!(tool = ?tools.tool, x = point.x, y = point.y, "stroke started");
        PointerAction::StrokeStarted
    }

    pub fn pointer_move(&mut self, point: Point) -> Option<DirtyRect> {
        self.strokes.extend_stroke(&mut self.buffer, point)
    }

    pub fn pointer_up(&mut self) -> bool {
        self.finish_stroke()
    }

    /// Pointer left the canvas; treated like a release.
    pub fn pointer_leave(&mut self) -> bool {
        self.finish_stroke()
    }

    pub fn undo(&mut self) -> bool {
        self.finish_stroke();
        let Some(previous) = self.history.undo(self.buffer.to_snapshot()) else {
            return false;
        };
        self.restore_snapshot(&previous);
        tracing::debug!(
            undo = self.history.undo_len(),
            redo = self.history.redo_len(),
            "undo applied"
        );
        true
    }

    pub fn redo(&mut self) -> bool {
        self.finish_stroke();
        let Some(next) = self.history.redo(self.buffer.to_snapshot()) else {
            return false;
        };
        self.restore_snapshot(&next);
        tracing::debug!(
            undo = self.history.undo_len(),
            redo = self.history.redo_len(),
            "redo applied"
        );
        true
    }

    pub fn resize(
        &mut self,
        logical_width: f32,
        logical_height: f32,
        device_pixel_ratio: f32,
    ) -> ResizeOutcome {
        let outcome = self.resizer.on_external_resize(
            &mut self.buffer,
            logical_width,
            logical_height,
            device_pixel_ratio,
        );
        self.strokes.rescale(&self.buffer);
        outcome
    }

    /// Blank canvas, empty history, no variables or annotations.
    pub fn reset(&mut self) {
        self.strokes.end_stroke();
        self.buffer.clear();
        self.history.clear_all();
        self.overlay.clear();
        self.last_applied = None;
        self.result_bounds = None;
        tracing::info!("canvas reset");
    }

    /// Ships the current canvas and variables to the recognizer. Blank
    /// canvases are rejected before anything is sent.
    pub fn run(&mut self, dispatcher: &mut RecognitionDispatcher) -> Result<RequestId, RunError> {
        if self.buffer.is_blank() {
            tracing::info!("run skipped: canvas is blank");
            return Err(RunError::BlankCanvas);
        }
        let bounds = self.bounding_box();
        let image = encode_png_data_url(&self.buffer)
            .map_err(|err| RunError::Dispatch(format!("{err:#}")))?;
        let request = RecognizeRequest {
            image,
            variables: self.overlay.variables().clone(),
        };
        let id = dispatcher
            .dispatch(request, bounds)
            .map_err(|err| RunError::Dispatch(format!("{err:#}")))?;
        tracing::info!(request_id = id.0, ?bounds, "recognition run started");
        Ok(id)
    }

    /// Applies every event that has arrived so far.
    pub fn pump_recognition(&mut self, dispatcher: &mut RecognitionDispatcher) -> Vec<RunNotice> {
        dispatcher
            .try_events()
            .into_iter()
            .map(|event| self.apply_event(event))
            .collect()
    }

    /// Results land on whatever tables exist now, not the ones at dispatch
    /// time. Failures leave both tables untouched.
    pub fn apply_event(&mut self, event: RecognitionEvent) -> RunNotice {
        match event {
            RecognitionEvent::Completed {
                id,
                bounds,
                results,
            } => {
                if self.last_applied.is_some_and(|last| last > id) {
                    tracing::warn!(
                        request_id = id.0,
                        "recognition response arrived after a newer one"
                    );
                }
                self.overlay.apply_results(&results);
                self.result_bounds = bounds;
                self.last_applied = Some(self.last_applied.map_or(id, |last| last.max(id)));
                tracing::info!(request_id = id.0, entries = results.len(), "recognition applied");
                RunNotice::Applied {
                    id,
                    entries: results.len(),
                }
            }
            RecognitionEvent::Failed { id, message } => {
                tracing::warn!(request_id = id.0, %message, "recognition failed");
                RunNotice::Failed {
                    id,
                    message: RUN_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    fn finish_stroke(&mut self) -> bool {
        match self.strokes.end_stroke() {
            Some(stroke) => {
                tracing::debug!(
                    tool = ?stroke.tool,
                    segments = stroke.segments,
                    dirty = ?stroke.dirty,
                    "stroke finished"
                );
                true
            }
            None => false,
        }
    }

    fn restore_snapshot(&mut self, snapshot: &Snapshot) {
        let reframed;
        let snapshot = if snapshot.size() != self.buffer.size() {
            tracing::warn!(
                snapshot_width = snapshot.width(),
                snapshot_height = snapshot.height(),
                width = self.buffer.width(),
                height = self.buffer.height(),
                "history entry predates a resize, reframing"
            );
            reframed = snapshot.reframed(self.buffer.width(), self.buffer.height());
            &reframed
        } else {
            snapshot
        };
        if let Err(err) = self.buffer.restore(snapshot) {
            tracing::error!(%err, "history restore failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Color;

    const RED: Color = Color::rgb(255, 0, 0);

    fn surface(width: f32, height: f32) -> DrawingSurface {
        DrawingSurface::new(width, height, 1.0, None)
    }

    fn pencil() -> ToolState {
        ToolState::default().with_color(RED).with_width(1)
    }

    #[test]
    fn pointer_down_pushes_history_and_clears_redo() {
        let mut surface = surface(10.0, 10.0);
        surface.pointer_down(Point::new(1.0, 1.0), pencil());
        surface.pointer_move(Point::new(4.0, 1.0));
        surface.pointer_up();
        assert!(surface.undo());
        assert!(surface.can_redo());

        surface.pointer_down(Point::new(2.0, 2.0), pencil());
        assert!(!surface.can_redo());
        assert_eq!(surface.history().undo_len(), 1);
    }

    #[test]
    fn fill_click_outside_canvas_leaves_history_alone() {
        let mut surface = surface(4.0, 4.0);
        let action = surface.pointer_down(Point::new(9.0, 1.0), pencil().with_tool(Tool::Fill));
        assert_eq!(action, PointerAction::Ignored);
        assert!(!surface.can_undo());
    }

    #[test]
    fn fill_click_floods_and_can_be_undone() {
        let mut surface = surface(4.0, 4.0);
        let action = surface.pointer_down(Point::new(1.5, 2.5), pencil().with_tool(Tool::Fill));
        assert_eq!(action, PointerAction::Filled { pixels: 16 });
        assert!(!surface.is_drawing());
        assert_eq!(surface.buffer().read_pixel(3, 3), Ok(RED));

        assert!(surface.undo());
        assert!(surface.is_blank());
    }

    #[test]
    fn undo_ends_an_active_stroke() {
        let mut surface = surface(10.0, 10.0);
        surface.pointer_down(Point::new(1.0, 1.0), pencil());
        surface.pointer_move(Point::new(5.0, 1.0));
        assert!(surface.undo());
        assert!(!surface.is_drawing());
        assert_eq!(surface.pointer_move(Point::new(9.0, 9.0)), None);
        assert!(surface.is_blank());
    }

    #[test]
    fn undo_after_resize_reframes_history() {
        let mut surface = surface(4.0, 4.0);
        surface.pointer_down(Point::new(0.0, 0.0), pencil());
        surface.pointer_move(Point::new(3.0, 0.0));
        surface.pointer_up();
        surface.pointer_down(Point::new(0.0, 3.0), pencil());
        surface.pointer_move(Point::new(3.0, 3.0));
        surface.pointer_up();

        assert!(surface.resize(8.0, 8.0, 1.0).reallocated());
        assert!(surface.undo());
        assert_eq!(surface.buffer().size(), (8, 8));
        assert_eq!(surface.buffer().read_pixel(3, 0), Ok(RED));
        assert_eq!(surface.buffer().read_pixel(3, 3), Ok(Color::TRANSPARENT));
    }

    #[test]
    fn reset_clears_everything() {
        let mut surface = surface(6.0, 6.0);
        surface.pointer_down(Point::new(1.0, 1.0), pencil());
        surface.pointer_move(Point::new(4.0, 4.0));
        surface.apply_event(RecognitionEvent::Completed {
            id: RequestId(1),
            bounds: None,
            results: vec![crate::draw::annotations::RecognitionResult::new("x", "2", true)],
        });

        surface.reset();
        assert_eq!(surface.last_result_bounds(), None);
        assert!(surface.is_blank());
        assert!(!surface.is_drawing());
        assert!(!surface.can_undo());
        assert!(!surface.can_redo());
        assert!(surface.variables().is_empty());
        assert!(surface.annotations().is_empty());
    }

    #[test]
    fn failed_event_does_not_touch_tables() {
        let mut surface = surface(2.0, 2.0);
        let notice = surface.apply_event(RecognitionEvent::Failed {
            id: RequestId(3),
            message: "timeout".into(),
        });
        assert_eq!(
            notice,
            RunNotice::Failed {
                id: RequestId(3),
                message: RUN_FAILED_MESSAGE.to_string()
            }
        );
        assert!(surface.variables().is_empty());
        assert!(surface.annotations().is_empty());
    }

    #[test]
    fn applied_run_keeps_its_ink_bounds() {
        let mut surface = surface(6.0, 6.0);
        assert_eq!(surface.last_result_bounds(), None);
        let bounds = Rect {
            min_x: 1,
            min_y: 2,
            max_x: 4,
            max_y: 5,
        };
        surface.apply_event(RecognitionEvent::Completed {
            id: RequestId(1),
            bounds: Some(bounds),
            results: Vec::new(),
        });
        assert_eq!(surface.last_result_bounds(), Some(bounds));

        surface.apply_event(RecognitionEvent::Failed {
            id: RequestId(2),
            message: "timeout".into(),
        });
        assert_eq!(surface.last_result_bounds(), Some(bounds));
    }

    #[test]
    fn pointer_far_outside_the_canvas_is_clipped() {
        let mut surface = surface(10.0, 10.0);
        surface.pointer_down(Point::new(2.0, 2.0), pencil());
        assert!(surface.pointer_move(Point::new(f32::MAX, 2.0)).is_some());
        surface.pointer_move(Point::new(f32::MIN, f32::MIN));
        surface.pointer_up();
        assert_eq!(surface.buffer().read_pixel(9, 2), Ok(RED));
    }
}
