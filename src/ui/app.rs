use super::{AppEvent, EventHandler, TerminalManager};
use crate::audio::AudioBackend;
use crate::playback::status::base_name;
use crate::playback::{
    Flow, InputRouter, Key, PlaybackState, Phase, PlaylistController, StatusPresenter,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(250);

pub struct App<B: AudioBackend> {
    directory: PathBuf,
    terminal: TerminalManager,
    event_handler: EventHandler,
    controller: PlaylistController<B>,
    router: InputRouter,

    // UI State
    list_state: ListState,
    should_quit: bool,
}

impl<B: AudioBackend> App<B> {
    pub fn new(
        directory: PathBuf,
        controller: PlaylistController<B>,
        router: InputRouter,
    ) -> Result<Self> {
        let terminal = TerminalManager::new()?;
        let event_handler = EventHandler::new();

        let mut list_state = ListState::default();
        if !controller.state().playlist.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            directory,
            terminal,
            event_handler,
            controller,
            router,
            list_state,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let _reader = self.event_handler.spawn_input_reader(TICK_RATE);

        // Main event loop
        while !self.should_quit {
            self.render()?;

            match self.event_handler.next_event().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }

        if let Err(e) = self.controller.stop() {
            warn!("Failed to stop playback on exit: {}", e);
        }
        info!("Shutting down");
        Ok(())
    }

    fn handle_event(&mut self, event: AppEvent) {
        let before = self.controller.state().current_index;

        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => {
                if let Err(e) = self.controller.poll_track_end() {
                    warn!("Auto-advance failed: {}", e);
                }
            }
            AppEvent::Resize => {}
        }

        if let Some(index) = followed_selection(before, self.controller.state()) {
            self.list_state.select(Some(index));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // The file list gets first pick, like a focused widget would
        match key.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Enter => self.play_selected(),
            _ => match self.router.handle_key(Key::from(key), &mut self.controller) {
                Ok(Flow::Quit) => self.should_quit = true,
                Ok(Flow::Continue) => {}
                Err(e) => warn!("{}", e),
            },
        }
    }

    fn play_selected(&mut self) {
        if let Some(selected) = self.list_state.selected() {
            if let Err(e) = self.controller.jump_to(selected) {
                warn!("{}", e);
            }
        }
    }

    fn move_selection(&mut self, delta: i32) {
        let len = self.controller.state().playlist.len();
        if len == 0 {
            return;
        }

        let current = self.list_state.selected().unwrap_or(0);
        let new_index = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (current + delta as usize).min(len - 1)
        };

        self.list_state.select(Some(new_index));
    }

    fn render(&mut self) -> Result<()> {
        let directory = &self.directory;
        let controller = &self.controller;
        let list_state = &mut self.list_state;

        self.terminal
            .draw(|f| Self::render_ui(f, directory, controller, list_state))
    }

    fn render_ui(
        f: &mut Frame,
        directory: &Path,
        controller: &PlaylistController<B>,
        list_state: &mut ListState,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // File list
                Constraint::Length(3), // Controls
                Constraint::Length(3), // Status
            ])
            .split(f.area());

        Self::render_header(f, chunks[0], directory);
        Self::render_file_list(f, chunks[1], controller, list_state);
        Self::render_controls(f, chunks[2], controller);
        Self::render_status(f, chunks[3], controller);
    }

    fn render_header(f: &mut Frame, area: Rect, directory: &Path) {
        let text = format!(" OpenUMP {} | {}", env!("CARGO_PKG_VERSION"), directory.display());
        let title = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(title, area);
    }

    fn render_file_list(
        f: &mut Frame,
        area: Rect,
        controller: &PlaylistController<B>,
        list_state: &mut ListState,
    ) {
        let state = controller.state();
        let has_current = state.current_file.is_some();

        let items: Vec<ListItem> = state
            .playlist
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let is_current = has_current && i == state.current_index;
                let prefix = if is_current { "♪ " } else { "  " };

                let style = if is_current {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(format!("{}{}", prefix, base_name(path))).style(style)
            })
            .collect();

        let title = format!("Files ({})", state.playlist.len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(Color::White).bg(Color::Red))
            .highlight_symbol("► ");

        f.render_stateful_widget(list, area, list_state);
    }

    fn render_controls(f: &mut Frame, area: Rect, controller: &PlaylistController<B>) {
        let state = controller.state();
        let labels = [
            "Play/Pause [p]".to_string(),
            "Stop [s]".to_string(),
            format!("{} [r]", StatusPresenter::repeat_label(state)),
            format!("{} [m]", StatusPresenter::shuffle_label(state)),
            "Prev/Next [b/n]".to_string(),
            "Vol [-/+]".to_string(),
            "Seek [←/→]".to_string(),
            "Quit [q]".to_string(),
        ];

        let controls = Paragraph::new(labels.join("  "))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title("Controls"));

        f.render_widget(controls, area);
    }

    fn render_status(f: &mut Frame, area: Rect, controller: &PlaylistController<B>) {
        let status = StatusPresenter::summarize(controller.state(), controller.is_playing());

        let color = match status.phase {
            Phase::Playing => Color::Green,
            Phase::Paused => Color::Yellow,
            Phase::Stopped => Color::White,
        };

        let widget = Paragraph::new(format!(" Status: {} ", status))
            .alignment(Alignment::Center)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL));

        f.render_widget(widget, area);
    }
}

/// When playback moved to another entry, the highlight follows it so Enter
/// acts on what is actually playing.
fn followed_selection(before: usize, state: &PlaybackState) -> Option<usize> {
    if state.current_file.is_some() && state.current_index != before {
        Some(state.current_index)
    } else {
        None
    }
}
