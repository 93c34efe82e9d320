use serde::{Deserialize, Serialize};

/// A platform-independent pointer event.
///
/// Platform layers translate their native mouse events into these; the
/// tracker never sees raw window events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Any button pressed over the surface.
    Down,
    /// Any button released.
    Up,
    /// Pointer moved to absolute surface coordinates.
    Move { x: f32, y: f32 },
}

/// Drag flag plus the last pointer coordinates captured while dragging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionState {
    pub is_down: bool,
    pub angle_x: f32,
    pub angle_y: f32,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one pointer event. Returns true when the angles changed.
    pub fn apply(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down => {
                self.is_down = true;
                false
            }
            PointerEvent::Up => {
                self.is_down = false;
                false
            }
            PointerEvent::Move { x, y } if self.is_down => {
                let changed = self.angle_x != x || self.angle_y != y;
                self.angle_x = x;
                self.angle_y = y;
                if changed {
                    tracing::trace!(x, y, "drag angles updated");
                }
                changed
            }
            PointerEvent::Move { .. } => false,
        }
    }
}
