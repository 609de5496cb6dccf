//! Pointer input state

use bgz_core::Vec2;

/// Pointer snapshot handed to every task for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer position in surface pixels; `None` when the pointer is
    /// outside the surface
    pub pointer: Option<Vec2>,
    /// Clicks since the previous frame, in arrival order
    pub clicks: Vec<Vec2>,
}

impl FrameInput {
    pub fn with_pointer(x: f32, y: f32) -> Self {
        Self {
            pointer: Some(Vec2::new(x, y)),
            clicks: Vec::new(),
        }
    }
}

/// Collects pointer events between frames
#[derive(Debug, Default)]
pub struct PointerState {
    position: Option<Vec2>,
    clicks: Vec<Vec2>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process pointer movement (coordinates relative to the surface)
    pub fn process_pointer_move(&mut self, x: f32, y: f32) {
        self.position = Some(Vec2::new(x, y));
    }

    /// Process the pointer leaving the surface
    pub fn process_pointer_leave(&mut self) {
        self.position = None;
    }

    /// Process a click (coordinates relative to the surface)
    pub fn process_click(&mut self, x: f32, y: f32) {
        self.clicks.push(Vec2::new(x, y));
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Snapshot for the coming frame
    pub fn snapshot(&self) -> FrameInput {
        FrameInput {
            pointer: self.position,
            clicks: self.clicks.clone(),
        }
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.clicks.clear();
    }
}
