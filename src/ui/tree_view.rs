//! The interactive tree pane: owns the tree model, the navigation state and
//! the input dispatcher, and paints the current viewport.

use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

use crate::app::dispatch::{InputDispatcher, TreeAction};
use crate::config::{ConfigError, KeyBindingConfig};
use crate::core::{model::TreeModel, navigation::NavigationState, viewport::ViewportWindow};

use super::theme::Theme;

/// The attribute column is only requested on frames wider than this.
pub const ATTRIBUTE_MIN_WIDTH: u16 = 80;

pub struct TreeView<M> {
    tree: M,
    nav: NavigationState,
    dispatcher: InputDispatcher,
    show_attributes: bool,
    /// Inner area the view was last laid out in.
    area: Rect,
}

impl<M: TreeModel> TreeView<M> {
    /// Select layer 0 and resolve every key binding.  Fails on the first
    /// binding that cannot be resolved.
    pub fn setup<C: KeyBindingConfig + ?Sized>(mut tree: M, config: &C) -> Result<Self, ConfigError> {
        tree.set_layer_index(0);
        let dispatcher = InputDispatcher::build(config)?;
        Ok(Self {
            tree,
            nav: NavigationState::new(),
            dispatcher,
            show_attributes: true,
            area: Rect::default(),
        })
    }

    pub fn show_attributes(mut self, show: bool) -> Self {
        self.show_attributes = show;
        self
    }

    pub fn tree(&self) -> &M {
        &self.tree
    }

    pub fn state(&self) -> &NavigationState {
        &self.nav
    }

    pub fn frame_height(&self) -> usize {
        self.area.height as usize
    }

    /// Record the inner area for the next paint and keep the selection in it.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
        let height = self.frame_height();
        ViewportWindow::clamp(&mut self.nav, height);
    }

    /// Run every action bound to `key`.  Returns `true` if any of them
    /// changed something.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let mut handled = false;
        for action in self.dispatcher.dispatch(key) {
            handled |= self.apply(action);
        }
        handled
    }

    pub fn apply(&mut self, action: TreeAction) -> bool {
        let height = self.frame_height();
        let handled = match action {
            TreeAction::MoveUp => self.nav.move_up(),
            TreeAction::MoveDown => self.nav.move_down(&self.tree, height),
            TreeAction::MoveLeft => self.nav.move_left(&self.tree),
            TreeAction::MoveRight => self.nav.move_right(&mut self.tree, height),
            TreeAction::ToggleCollapseDir => self.nav.collapse_dir(&mut self.tree),
            TreeAction::ToggleCollapseAll => {
                self.nav.collapse_or_expand_all(&mut self.tree, height)
            }
            TreeAction::ToggleAttributes => {
                self.show_attributes = !self.show_attributes;
                true
            }
            TreeAction::ToggleHidden(kind) => {
                self.nav.toggle_hidden_file_type(&mut self.tree, kind, height)
            }
            TreeAction::PageUp => self.nav.page_up(height),
            TreeAction::PageDown => self.nav.page_down(&self.tree, height),
        };
        tracing::debug!(?action, handled, selected = self.nav.selected, "tree action");
        handled
    }

    /// Switch the tree to another layer and pull the selection into range.
    pub fn set_layer_index(&mut self, index: usize) -> bool {
        let changed = self.tree.set_layer_index(index);
        if changed {
            self.nav.resync(&self.tree, self.frame_height());
        }
        changed
    }
}

impl<M: TreeModel> Widget for &TreeView<M> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = area.height as usize;
        let width = area.width as usize;
        let window = ViewportWindow::of(&self.nav, height);
        let selected_row = window.selected_row(&self.nav);
        let show_attributes = area.width > ATTRIBUTE_MIN_WIDTH && self.show_attributes;

        let text = self
            .tree
            .string_between(window.top, window.bottom(), show_attributes);

        for (row, line) in text.split('\n').enumerate() {
            if row >= height {
                break;
            }
            let y = area.y + row as u16;
            if Some(row) == selected_row {
                buf.set_stringn(area.x, y, format!("{line:<width$}"), width, Theme::selected_style());
            } else {
                buf.set_stringn(area.x, y, line, width, Theme::line_style());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::config::{self, AppConfig};
    use crate::core::tree::{DiffType, FileTree};
    use crate::test_support::{nested_tree, scenario_tree, wide_tree};

    fn view(tree: FileTree, height: u16) -> TreeView<FileTree> {
        let mut view = TreeView::setup(tree, &AppConfig::default()).unwrap();
        view.set_area(Rect::new(0, 0, 40, height));
        view
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol())
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    #[test]
    fn arrow_keys_drive_the_scenario() {
        let mut view = view(scenario_tree(), 2);
        assert!(view.handle_key(press(KeyCode::Down)));
        assert!(view.handle_key(press(KeyCode::Right)));
        assert_eq!((view.state().selected, view.state().viewport_top), (2, 1));
        assert!(view.handle_key(press(KeyCode::Left)));
        assert!(view.handle_key(press(KeyCode::Up)));
        assert_eq!((view.state().selected, view.state().viewport_top), (0, 0));
    }

    #[test]
    fn unbound_keys_do_nothing() {
        let mut view = view(nested_tree(), 4);
        assert!(!view.handle_key(press(KeyCode::Char('z'))));
        assert_eq!(view.state(), &NavigationState::new());
    }

    #[test]
    fn space_collapses_the_selected_directory() {
        let mut view = view(nested_tree(), 4);
        view.handle_key(press(KeyCode::Down));
        assert!(view.handle_key(press(KeyCode::Char(' '))));
        assert_eq!(view.tree().visible_size(), 5);
    }

    #[test]
    fn setup_fails_on_a_missing_binding() {
        let mut config = AppConfig::default();
        config.bindings.remove(config::TOGGLE_UNMODIFIED);
        assert!(TreeView::setup(nested_tree(), &config).is_err());
    }

    #[test]
    fn shrinking_the_frame_keeps_the_selection_visible() {
        let mut view = view(wide_tree(20), 10);
        for _ in 0..8 {
            view.apply(TreeAction::MoveDown);
        }
        view.set_area(Rect::new(0, 0, 40, 3));
        assert_eq!((view.state().selected, view.state().viewport_top), (8, 6));
    }

    #[test]
    fn paints_the_window_and_highlights_the_selection() {
        let mut view = view(nested_tree(), 3);
        view.apply(TreeAction::PageDown);
        view.apply(TreeAction::MoveUp);
        assert_eq!((view.state().selected, view.state().viewport_top), (2, 2));

        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        (&view).render(area, &mut buf);

        assert_eq!(row_text(&buf, 0), "│   ├── a1");
        assert_eq!(row_text(&buf, 1), "│   └── a2");
        assert_eq!(row_text(&buf, 2), "├── ▼ b");
        assert_eq!(buf[(30, 0)].bg, Theme::SELECTED_BG);
        assert_ne!(buf[(0, 1)].bg, Theme::SELECTED_BG);
    }

    #[test]
    fn attributes_need_a_wide_frame() {
        let mut tree = scenario_tree();
        tree.nodes[4].diff = DiffType::Added;
        let mut view = view(tree, 3);

        let narrow = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(narrow);
        (&view).render(narrow, &mut buf);
        assert_eq!(row_text(&buf, 2), "└── b");

        let wide = Rect::new(0, 0, 100, 3);
        view.set_area(wide);
        let mut buf = Buffer::empty(wide);
        (&view).render(wide, &mut buf);
        assert!(row_text(&buf, 2).starts_with('+'));

        view.apply(TreeAction::ToggleAttributes);
        let mut buf = Buffer::empty(wide);
        (&view).render(wide, &mut buf);
        assert_eq!(row_text(&buf, 2), "└── b");
    }

    #[test]
    fn zero_height_frame_keeps_the_viewport_at_or_above_the_selection() {
        let mut tree = nested_tree();
        for path in ["/a", "/a/a1", "/a/a2"] {
            let id = tree.find(std::path::Path::new(path)).unwrap();
            tree.nodes[id].diff = DiffType::Added;
        }
        let mut view = view(tree, 2);
        for _ in 0..7 {
            view.apply(TreeAction::MoveDown);
        }
        assert_eq!((view.state().selected, view.state().viewport_top), (7, 6));

        view.set_area(Rect::new(0, 0, 40, 0));
        view.apply(TreeAction::ToggleHidden(DiffType::Added));
        assert_eq!((view.state().selected, view.state().viewport_top), (4, 4));

        view.apply(TreeAction::ToggleHidden(DiffType::Added));
        assert!(view.apply(TreeAction::MoveDown));
        assert_eq!((view.state().selected, view.state().viewport_top), (5, 5));
        for action in [TreeAction::PageDown, TreeAction::MoveUp, TreeAction::PageUp] {
            view.apply(action);
            assert!(view.state().viewport_top <= view.state().selected);
        }
    }

    #[test]
    fn hiding_a_kind_under_the_selection_clamps_it() {
        let mut tree = wide_tree(5);
        for node in tree.nodes.iter_mut().skip(1) {
            node.diff = DiffType::Added;
        }
        let mut view = view(tree, 3);
        view.apply(TreeAction::PageDown);
        view.apply(TreeAction::PageDown);
        assert_eq!(view.state().selected, 5);

        view.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(view.tree().visible_size(), 0);
        assert_eq!((view.state().selected, view.state().viewport_top), (0, 0));
    }
}
