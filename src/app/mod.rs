//! Application orchestration: state, event loop, and input handling.

pub mod dispatch;
pub mod event;
pub mod handler;
pub mod state;
