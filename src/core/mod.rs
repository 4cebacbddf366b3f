//! Core algorithms – the file tree, its traversal, and navigation state.
//!
//! Nothing in this module depends on any TUI or rendering crate.

pub mod fs;
pub mod model;
pub mod navigation;
pub mod traversal;
pub mod tree;
pub mod viewport;
