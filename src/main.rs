//! Browse a stack of filesystem layers as a diff tree.
//!
//! Each positional argument is a layer directory, bottom first.  Layer `i`
//! is shown as the overlay of layers `0..=i`, marked up against the overlay
//! of the layers beneath it.

mod app;
mod config;
mod core;
mod ui;

#[cfg(test)]
mod test_support;

use std::fs::File;
use std::io::{self, stderr, Stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    state::AppState,
};
use crate::config::AppConfig;
use crate::core::{
    fs::{LayerStack, WalkConfig},
    tree::FileTree,
};
use crate::ui::{layout::AppLayout, theme::Theme};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Browse a stack of filesystem layers as a diff tree")]
struct Cli {
    /// Layer directories, bottom layer first.
    #[arg(required_unless_present = "print_config")]
    layers: Vec<PathBuf>,

    /// Config file to read instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show hidden (dot) files.
    #[arg(long)]
    hidden: bool,

    /// Do not apply `.gitignore` rules while scanning layers.
    #[arg(long = "no-ignore")]
    no_ignore: bool,

    /// Start with every directory collapsed.
    #[arg(long)]
    collapsed: bool,

    /// Write logs to this file (the terminal is taken by the UI).
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration and exit.
    #[arg(long)]
    print_config: bool,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("unable to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr) // never pollute stdout
                .init();
        }
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ──────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let layout = AppLayout::from_area(frame.area());

    let header = Paragraph::new(state.header_text()).style(Theme::header_style());
    frame.render_widget(header, layout.header_area);

    let title = state
        .view
        .tree()
        .layer_root()
        .map_or_else(|| "tree".to_string(), |root| root.display().to_string());
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    let inner = block.inner(layout.tree_area);
    frame.render_widget(block, layout.tree_area);

    state.view.set_area(inner);
    frame.render_widget(&state.view, inner);

    let status = match &state.status_message {
        Some(message) => Line::from(message.as_str()),
        None => Line::from(
            state
                .hints
                .iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(format!(" {key} "), Theme::hint_key_style()),
                        Span::raw(format!("{label} ")),
                    ]
                })
                .collect::<Vec<_>>(),
        ),
    };
    frame.render_widget(
        Paragraph::new(status).style(Theme::status_bar_style()),
        layout.status_area,
    );
}

async fn run(terminal: &mut Terminal<CrosstermBackend<Stderr>>, state: &mut AppState) -> Result<()> {
    let mut events = spawn_event_reader(Duration::from_millis(250));

    loop {
        terminal.draw(|frame| draw(frame, state))?;

        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Key(key) => handler::handle_key(state, key),
            // The next draw lays out against the new size.
            AppEvent::Resize(_, _) | AppEvent::Tick => {}
        }

        if state.should_quit {
            break;
        }
    }
    Ok(())
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    let config = AppConfig::load(cli.config.as_deref())?;
    if cli.print_config {
        print!("{}", config.serialise());
        return Ok(());
    }

    // ── build the tree before touching the terminal ───────────
    let walk_config = WalkConfig {
        respect_gitignore: !cli.no_ignore,
        show_hidden: cli.hidden,
        collapse_dirs: cli.collapsed || config.collapse_dirs,
    };
    let stack = LayerStack::scan(&cli.layers, walk_config)?;
    tracing::info!(layers = stack.len(), "scanned layer stack");
    let tree = FileTree::from_layers(stack, 0)?;
    let mut state = AppState::new(tree, &config)?;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    execute!(stderr(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state).await;

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
