//! User configuration: named key bindings and view settings.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/layer-tree/config.toml` (default
//! `~/.config/layer-tree/config.toml`).  Bindings are looked up by name once,
//! at startup; a name that cannot be resolved stops the program.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

// ───────────────────────────────────────── binding names ─────

pub const TOGGLE_COLLAPSE_DIR: &str = "keybinding.toggle-collapse-dir";
pub const TOGGLE_COLLAPSE_ALL_DIR: &str = "keybinding.toggle-collapse-all-dir";
pub const TOGGLE_ATTRIBUTES: &str = "keybinding.toggle-filetree-attributes";
pub const TOGGLE_ADDED: &str = "keybinding.toggle-added-files";
pub const TOGGLE_REMOVED: &str = "keybinding.toggle-removed-files";
pub const TOGGLE_MODIFIED: &str = "keybinding.toggle-modified-files";
pub const TOGGLE_UNMODIFIED: &str = "keybinding.toggle-unmodified-files";
pub const PAGE_UP: &str = "keybinding.page-up";
pub const PAGE_DOWN: &str = "keybinding.page-down";
pub const QUIT: &str = "keybinding.quit";
pub const NEXT_LAYER: &str = "keybinding.next-layer";
pub const PREV_LAYER: &str = "keybinding.prev-layer";

/// Every binding name, in the order they are written to the config file.
pub const BINDING_NAMES: &[&str] = &[
    TOGGLE_COLLAPSE_DIR,
    TOGGLE_COLLAPSE_ALL_DIR,
    TOGGLE_ATTRIBUTES,
    TOGGLE_ADDED,
    TOGGLE_REMOVED,
    TOGGLE_MODIFIED,
    TOGGLE_UNMODIFIED,
    PAGE_UP,
    PAGE_DOWN,
    QUIT,
    NEXT_LAYER,
    PREV_LAYER,
];

const SHOW_ATTRIBUTES: &str = "filetree.show-attributes";
const COLLAPSE_DIR: &str = "filetree.collapse-dir";

// ───────────────────────────────────────── errors ────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("setup error during {0}: no such key binding")]
    UnknownBinding(String),
    #[error("setup error during {name}: cannot parse key {value:?}")]
    InvalidKey { name: String, value: String },
    #[error("unable to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ───────────────────────────────────────── key bind ──────────

/// A single key: key code plus modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this key match a key event?  Only CTRL/ALT/SHIFT modifiers
    /// are compared (platform-specific modifiers like SUPER are ignored).
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT;
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// User-friendly display string (e.g. `"Ctrl+a"`, `"PgDn"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::PageUp => "PgUp".into(),
            KeyCode::PageDown => "PgDn".into(),
            KeyCode::Backspace => "Bksp".into(),
            KeyCode::Delete => "Del".into(),
            other => key_name(other),
        });
        s
    }

    /// Serialise to config-file format (e.g. `"Ctrl+Space"`, `"q"`).
    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Char(' ') => "Space".into(),
            KeyCode::Char(c) => c.to_string(),
            other => key_name(other),
        });
        s
    }

    /// Parse a key string like `"Ctrl+a"`, `"Ctrl+Space"`, `"]"`, `"PageUp"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let s = s.trim();
        // A bare "+" is a key, not a separator.
        let (mods, key_part) = match s.rsplit_once('+') {
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };

        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            f if f.starts_with('f') && f.len() > 1 => KeyCode::F(f[1..].parse().ok()?),
            _ => {
                let mut chars = key_part.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Backspace => "Backspace".into(),
        KeyCode::Delete => "Delete".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── key binding ───────

/// A resolved, named binding: any one of its keys triggers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub name: String,
    pub keys: Vec<KeyBind>,
}

impl KeyBinding {
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.keys.iter().any(|key| key.matches(event))
    }

    /// Short display of the first key only (for the status bar).
    pub fn short_display(&self) -> String {
        self.keys.first().map_or_else(|| "?".into(), KeyBind::display)
    }
}

/// Source of named key bindings.
pub trait KeyBindingConfig {
    fn get_key_binding(&self, name: &str) -> Result<KeyBinding, ConfigError>;
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: key bindings and view settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<String, Vec<KeyBind>>,
    /// Binding values from the config file that could not be parsed.
    pub invalid: HashMap<String, String>,
    /// Show the diff/size column when the frame is wide enough.
    pub show_attributes: bool,
    /// Start every directory collapsed.
    pub collapse_dirs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            invalid: HashMap::new(),
            show_attributes: true,
            collapse_dirs: false,
        }
    }
}

impl KeyBindingConfig for AppConfig {
    fn get_key_binding(&self, name: &str) -> Result<KeyBinding, ConfigError> {
        if let Some(value) = self.invalid.get(name) {
            return Err(ConfigError::InvalidKey {
                name: name.to_string(),
                value: value.clone(),
            });
        }
        let keys = self
            .bindings
            .get(name)
            .ok_or_else(|| ConfigError::UnknownBinding(name.to_string()))?;
        Ok(KeyBinding {
            name: name.to_string(),
            keys: keys.clone(),
        })
    }
}

impl AppConfig {
    /// Hard-coded default bindings.
    pub fn default_bindings() -> HashMap<String, Vec<KeyBind>> {
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;

        [
            (TOGGLE_COLLAPSE_DIR, KeyBind::new(Char(' '), n)),
            (TOGGLE_COLLAPSE_ALL_DIR, KeyBind::new(Char(' '), ctrl)),
            (TOGGLE_ATTRIBUTES, KeyBind::new(Char('b'), ctrl)),
            (TOGGLE_ADDED, KeyBind::new(Char('a'), ctrl)),
            (TOGGLE_REMOVED, KeyBind::new(Char('r'), ctrl)),
            (TOGGLE_MODIFIED, KeyBind::new(Char('n'), ctrl)),
            (TOGGLE_UNMODIFIED, KeyBind::new(Char('u'), ctrl)),
            (PAGE_UP, KeyBind::new(PageUp, n)),
            (PAGE_DOWN, KeyBind::new(PageDown, n)),
            (QUIT, KeyBind::new(Char('q'), n)),
            (NEXT_LAYER, KeyBind::new(Char(']'), n)),
            (PREV_LAYER, KeyBind::new(Char('['), n)),
        ]
        .into_iter()
        .map(|(name, key)| (name.to_string(), vec![key]))
        .collect()
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path`, or from the default location when `path` is
    /// `None`.  A missing default file means defaults; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (config_path(), false),
        };
        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Self::parse(&contents))
    }

    /// Parse config-file text on top of the defaults.
    pub fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                SHOW_ATTRIBUTES => {
                    config.show_attributes = value == "true";
                    continue;
                }
                COLLAPSE_DIR => {
                    config.collapse_dirs = value == "true";
                    continue;
                }
                _ => {}
            }

            if !BINDING_NAMES.contains(&key) {
                tracing::warn!(key, "ignoring unknown config key");
                continue;
            }

            let parsed: Option<Vec<KeyBind>> = value
                .split(',')
                .map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            match parsed {
                Some(keys) if !keys.is_empty() => {
                    config.bindings.insert(key.to_string(), keys);
                }
                _ => {
                    config.invalid.insert(key.to_string(), value.to_string());
                }
            }
        }

        config
    }

    pub fn serialise(&self) -> String {
        let mut lines = vec![
            "# layer-tree configuration".to_string(),
            String::new(),
            format!("{SHOW_ATTRIBUTES} = {}", self.show_attributes),
            format!("{COLLAPSE_DIR} = {}", self.collapse_dirs),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: name = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab,".to_string(),
            "#   Backspace, Delete, Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &name in BINDING_NAMES {
            if let Some(keys) = self.bindings.get(name) {
                let keys: Vec<String> = keys.iter().map(|k| k.to_config_string()).collect();
                lines.push(format!("{name} = {}", keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/layer-tree/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join(env!("CARGO_PKG_NAME")).join("config.toml")
}
