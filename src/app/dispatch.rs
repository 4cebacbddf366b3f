//! Key event → tree action resolution.
//!
//! The dispatcher is built once from a [`KeyBindingConfig`].  Arrow keys are
//! always wired; everything else comes from the named binding table.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::config::{self, ConfigError, KeyBinding, KeyBindingConfig};
use crate::core::tree::DiffType;

/// Actions the tree view understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ToggleCollapseDir,
    ToggleCollapseAll,
    ToggleAttributes,
    ToggleHidden(DiffType),
    PageUp,
    PageDown,
}

/// Named bindings the tree view resolves at setup, in match order.
pub const BINDING_TABLE: &[(&str, TreeAction)] = &[
    (config::TOGGLE_COLLAPSE_DIR, TreeAction::ToggleCollapseDir),
    (config::TOGGLE_COLLAPSE_ALL_DIR, TreeAction::ToggleCollapseAll),
    (config::TOGGLE_ATTRIBUTES, TreeAction::ToggleAttributes),
    (config::TOGGLE_ADDED, TreeAction::ToggleHidden(DiffType::Added)),
    (config::TOGGLE_REMOVED, TreeAction::ToggleHidden(DiffType::Removed)),
    (config::TOGGLE_MODIFIED, TreeAction::ToggleHidden(DiffType::Modified)),
    (config::TOGGLE_UNMODIFIED, TreeAction::ToggleHidden(DiffType::Unmodified)),
    (config::PAGE_UP, TreeAction::PageUp),
    (config::PAGE_DOWN, TreeAction::PageDown),
];

#[derive(Debug, Clone)]
pub struct InputDispatcher {
    bindings: Vec<(KeyBinding, TreeAction)>,
}

impl InputDispatcher {
    /// Resolve every entry of [`BINDING_TABLE`].  The first binding that
    /// fails to resolve fails the whole build.
    pub fn build<C: KeyBindingConfig + ?Sized>(config: &C) -> Result<Self, ConfigError> {
        let bindings = BINDING_TABLE
            .iter()
            .map(|&(name, action)| Ok((config.get_key_binding(name)?, action)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { bindings })
    }

    /// Every action triggered by `event`: the arrow key action first, then
    /// each matching binding in table order.  Overlapping bindings all fire.
    pub fn dispatch(&self, event: KeyEvent) -> Vec<TreeAction> {
        if event.kind != KeyEventKind::Press {
            return Vec::new();
        }

        let mut actions = Vec::new();
        match event.code {
            KeyCode::Up => actions.push(TreeAction::MoveUp),
            KeyCode::Down => actions.push(TreeAction::MoveDown),
            KeyCode::Left => actions.push(TreeAction::MoveLeft),
            KeyCode::Right => actions.push(TreeAction::MoveRight),
            _ => {}
        }
        actions.extend(
            self.bindings
                .iter()
                .filter(|(binding, _)| binding.matches(event))
                .map(|&(_, action)| action),
        );
        actions
    }
}
