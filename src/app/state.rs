//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use crate::config::{self, AppConfig, ConfigError, KeyBinding, KeyBindingConfig};
use crate::core::tree::FileTree;
use crate::ui::tree_view::TreeView;

/// Status bar hints, in display order.
const HINTS: &[(&str, &str)] = &[
    (config::TOGGLE_COLLAPSE_DIR, "collapse"),
    (config::TOGGLE_COLLAPSE_ALL_DIR, "collapse all"),
    (config::TOGGLE_ATTRIBUTES, "attributes"),
    (config::TOGGLE_ADDED, "added"),
    (config::TOGGLE_REMOVED, "removed"),
    (config::TOGGLE_MODIFIED, "modified"),
    (config::TOGGLE_UNMODIFIED, "unmodified"),
    (config::NEXT_LAYER, "next layer"),
    (config::PREV_LAYER, "prev layer"),
    (config::QUIT, "quit"),
];

/// Top-level application state.
pub struct AppState {
    /// The tree pane.
    pub view: TreeView<FileTree>,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    pub quit: KeyBinding,
    pub next_layer: KeyBinding,
    pub prev_layer: KeyBinding,
    /// `(key, label)` pairs for the status bar.
    pub hints: Vec<(String, &'static str)>,
}

impl AppState {
    pub fn new(tree: FileTree, config: &AppConfig) -> Result<Self, ConfigError> {
        let view = TreeView::setup(tree, config)?.show_attributes(config.show_attributes);
        let hints = HINTS
            .iter()
            .map(|&(name, label)| Ok((config.get_key_binding(name)?.short_display(), label)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            view,
            should_quit: false,
            status_message: None,
            quit: config.get_key_binding(config::QUIT)?,
            next_layer: config.get_key_binding(config::NEXT_LAYER)?,
            prev_layer: config.get_key_binding(config::PREV_LAYER)?,
            hints,
        })
    }

    /// `Layer i/n  <layer dir>  <selected path>` for the header line.
    pub fn header_text(&self) -> String {
        let tree = self.view.tree();
        let mut header = match tree.layer_index() {
            Some(index) => format!("Layer {}/{}", index + 1, tree.layer_count()),
            None => "No layers".to_string(),
        };
        if let Some(root) = tree.layer_root() {
            header.push_str(&format!("  {}", root.display()));
        }
        if let Some(path) = self.view.state().selected_path(tree) {
            header.push_str(&format!("  │ {}", path.display()));
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{layer_stack, nested_tree};

    #[test]
    fn header_shows_the_layer_and_selection() {
        let tree = FileTree::from_layers(layer_stack(), 0).unwrap();
        let state = AppState::new(tree, &AppConfig::default()).unwrap();
        assert_eq!(state.header_text(), "Layer 1/2  base  │ /");
    }

    #[test]
    fn hand_built_trees_have_no_layer_header() {
        let state = AppState::new(nested_tree(), &AppConfig::default()).unwrap();
        assert!(state.header_text().starts_with("No layers"));
    }

    #[test]
    fn hints_follow_the_configured_keys() {
        let config = AppConfig::parse("keybinding.quit = Ctrl+x\n");
        let state = AppState::new(nested_tree(), &config).unwrap();
        assert_eq!(state.hints[0], ("Space".to_string(), "collapse"));
        assert_eq!(state.hints.last().unwrap(), &("Ctrl+x".to_string(), "quit"));
    }

    #[test]
    fn missing_global_binding_is_an_error() {
        let mut config = AppConfig::default();
        config.bindings.remove(config::NEXT_LAYER);
        assert!(AppState::new(nested_tree(), &config).is_err());
    }
}
