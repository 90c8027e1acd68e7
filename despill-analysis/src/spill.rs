//! Simulated spill storage
//!
//! `push` moves a register's whole value set into a new frame on top of the
//! stack; `pop` restores the top frame into a register. The stack belongs to
//! one dataflow run and is passed explicitly to the driver, so independent
//! runs never share frames unless the caller hands over the same stack.

use crate::registry::Values;

/// LIFO store of vacated register value sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpillStack {
    frames: Vec<Values>,
}

impl SpillStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame
    pub fn push(&mut self, frame: Values) {
        self.frames.push(frame);
    }

    /// Pop the top frame, or `None` on underflow
    pub fn pop(&mut self) -> Option<Values> {
        self.frames.pop()
    }

    /// Top frame without removing it
    pub fn peek(&self) -> Option<&Values> {
        self.frames.last()
    }

    /// Number of frames
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every frame; required between independent runs
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames from bottom to top
    pub fn frames(&self) -> &[Values] {
        &self.frames
    }
}
