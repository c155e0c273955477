use crate::draw::buffer::PixelBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Unchanged,
    Reallocated { from: (u32, u32), to: (u32, u32) },
}

impl ResizeOutcome {
    pub fn reallocated(self) -> bool {
        matches!(self, ResizeOutcome::Reallocated { .. })
    }
}

/// Physical size for a logical container at a device pixel ratio. Fractional
/// results truncate, as a canvas backing store does.
pub fn physical_size(logical_width: f32, logical_height: f32, device_pixel_ratio: f32) -> (u32, u32) {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let scale = |logical: f32| -> u32 {
        if logical.is_finite() && logical > 0.0 {
            (logical * dpr) as u32
        } else {
            0
        }
    };
    (scale(logical_width), scale(logical_height))
}

/// Keeps the backing buffer in step with the container it is shown in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportResizer {
    reallocations: u64,
}

impl ViewportResizer {
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    /// Entry point for the host's resize observer. The scale factor always
    /// follows `device_pixel_ratio`; the pixel grid is only reallocated when
    /// the physical size actually changes, so repeated events are harmless.
    pub fn on_external_resize(
        &mut self,
        buffer: &mut PixelBuffer,
        logical_width: f32,
        logical_height: f32,
        device_pixel_ratio: f32,
    ) -> ResizeOutcome {
        buffer.set_scale(device_pixel_ratio);
        let target = physical_size(logical_width, logical_height, device_pixel_ratio);
        let current = buffer.size();
        if target == current {
            return ResizeOutcome::Unchanged;
        }

        buffer.reallocate_preserving(target.0, target.1);
        self.reallocations += 1;
        tracing::debug!(
            from_width = current.0,
            from_height = current.1,
            to_width = target.0,
            to_height = target.1,
            device_pixel_ratio,
            "canvas buffer reallocated"
        );
        ResizeOutcome::Reallocated {
            from: current,
            to: target,
        }
    }
}
