//! The window of visible indices painted to the frame.

use super::navigation::NavigationState;

/// `[top, top + height)` over the visible index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportWindow {
    pub top: usize,
    pub height: usize,
}

impl ViewportWindow {
    /// The window currently described by `state` on a frame of `height` rows.
    pub fn of(state: &NavigationState, height: usize) -> Self {
        Self {
            top: state.viewport_top,
            height,
        }
    }

    /// First index past the window.
    pub fn bottom(&self) -> usize {
        self.top + self.height
    }

    /// Frame row of the selection, if it is inside the window.
    pub fn selected_row(&self, state: &NavigationState) -> Option<usize> {
        state
            .selected
            .checked_sub(self.top)
            .filter(|&row| row < self.height)
    }

    /// Move `viewport_top` just far enough that the selection is inside a
    /// frame of `height` rows.  A zero-row frame only keeps the top from
    /// passing the selection.
    pub fn clamp(state: &mut NavigationState, height: usize) {
        if state.selected < state.viewport_top {
            state.viewport_top = state.selected;
        } else if height > 0 && state.selected >= state.viewport_top + height {
            state.viewport_top = state.selected + 1 - height;
        }
    }
}
