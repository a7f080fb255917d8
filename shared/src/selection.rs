//! Drag state machine for the selected-time marker
//!
//! Pointer input is reduced to a pure `(state, event) -> (state, output)`
//! step. The controller applies the output; nothing here touches time.

use crate::pointer::StripGeometry;

/// Whether the user currently holds the marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging)
    }
}

/// Pointer input on the strip, x in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(f64),
    Move(f64),
    Release,
}

/// What the controller should do with the selected instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutput {
    /// Nothing changes
    None,
    /// Move the selection to this reference-scale hour
    SeekHour(f64),
    /// Round the selection to the nearest hour
    Snap,
}

/// Advance the drag machine by one pointer event
pub fn step(state: DragState, event: PointerEvent, geometry: &StripGeometry) -> (DragState, DragOutput) {
    match (state, event) {
        (_, PointerEvent::Press(x)) => (DragState::Dragging, DragOutput::SeekHour(geometry.hour_at(x))),
        (DragState::Dragging, PointerEvent::Move(x)) => {
            (DragState::Dragging, DragOutput::SeekHour(geometry.hour_at(x)))
        }
        (DragState::Dragging, PointerEvent::Release) => (DragState::Idle, DragOutput::Snap),
        (DragState::Idle, PointerEvent::Move(_)) | (DragState::Idle, PointerEvent::Release) => {
            (DragState::Idle, DragOutput::None)
        }
    }
}
