//! Input handling: maps key events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::AppState;

/// Process a key event.  Global bindings (quit, layer switching) win over
/// the tree view's own bindings.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    if state.quit.matches(key) {
        state.should_quit = true;
    } else if state.next_layer.matches(key) {
        step_layer(state, true);
    } else if state.prev_layer.matches(key) {
        step_layer(state, false);
    } else if state.view.handle_key(key) {
        state.status_message = None;
    }
}

fn step_layer(state: &mut AppState, forward: bool) {
    let tree = state.view.tree();
    let Some(current) = tree.layer_index() else {
        state.status_message = Some("No layers loaded".into());
        return;
    };

    let target = if forward {
        Some(current + 1).filter(|&i| i < tree.layer_count())
    } else {
        current.checked_sub(1)
    };
    let Some(target) = target else {
        state.status_message = Some(if forward {
            "Already at the top layer".into()
        } else {
            "Already at the bottom layer".into()
        });
        return;
    };

    if state.view.set_layer_index(target) {
        tracing::info!(layer = target, "layer selected");
        state.status_message = None;
    } else {
        state.status_message = Some(format!("Unable to load layer {}", target + 1));
    }
}
