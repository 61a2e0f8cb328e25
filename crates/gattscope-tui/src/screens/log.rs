//! Log screen — a scrollback of notifications and session transitions.

use std::time::Instant;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use gattscope_core::{InstanceId, SessionState};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::theme;

/// Oldest entries are dropped past this point.
const MAX_ENTRIES: usize = 500;

struct LogEntry {
    at: Instant,
    level: NotificationLevel,
    message: String,
}

pub struct LogScreen {
    focused: bool,
    started: Instant,
    entries: Vec<LogEntry>,
    /// Rows scrolled up from the tail; 0 follows new entries.
    scrollback: usize,
    /// Previous device snapshot, for deriving connect/disconnect events.
    known_devices: Vec<(InstanceId, String)>,
}

impl LogScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            started: Instant::now(),
            entries: Vec::new(),
            scrollback: 0,
            known_devices: Vec::new(),
        }
    }

    /// Derive connect/disconnect events from consecutive device snapshots.
    fn diff_devices(&mut self, devices: &[std::sync::Arc<gattscope_core::Device>]) {
        let current: Vec<(InstanceId, String)> = devices
            .iter()
            .map(|d| (d.instance_id.clone(), d.display_name().to_owned()))
            .collect();

        let previous = std::mem::take(&mut self.known_devices);
        for (id, name) in &current {
            if !previous.iter().any(|(known, _)| known == id) {
                self.push(NotificationLevel::Info, format!("Connected: {name} ({id})"));
            }
        }
        for (id, name) in &previous {
            if !current.iter().any(|(now, _)| now == id) {
                self.push(NotificationLevel::Warning, format!("Disconnected: {name} ({id})"));
            }
        }
        self.known_devices = current;
    }

    fn push(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.entries.push(LogEntry {
            at: Instant::now(),
            level,
            message: message.into(),
        });
        if self.entries.len() > MAX_ENTRIES {
            let excess = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(..excess);
        }
    }

    fn uptime_stamp(&self, entry: &LogEntry) -> String {
        let elapsed = entry.at.duration_since(self.started).as_secs();
        format!("{:02}:{:02}:{:02}", elapsed / 3600, (elapsed / 60) % 60, elapsed % 60)
    }

    fn level_span(level: NotificationLevel) -> Span<'static> {
        match level {
            NotificationLevel::Info => Span::styled(
                "info ",
                ratatui::style::Style::default().fg(theme::FROST_CYAN),
            ),
            NotificationLevel::Success => Span::styled(
                "ok   ",
                ratatui::style::Style::default().fg(theme::AURORA_GREEN),
            ),
            NotificationLevel::Warning => Span::styled(
                "warn ",
                ratatui::style::Style::default().fg(theme::AURORA_YELLOW),
            ),
            NotificationLevel::Error => Span::styled(
                "error",
                ratatui::style::Style::default().fg(theme::AURORA_RED),
            ),
        }
    }
}

impl Component for LogScreen {
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => {
                self.scrollback = (self.scrollback + 1).min(self.entries.len().saturating_sub(1));
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scrollback = self.scrollback.saturating_sub(1);
            }
            KeyCode::Char('g') => {
                self.scrollback = self.entries.len().saturating_sub(1);
            }
            KeyCode::Char('G') => {
                self.scrollback = 0;
            }
            KeyCode::Char('c') => {
                self.entries.clear();
                self.scrollback = 0;
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Notify(Notification { message, level }) => {
                self.push(*level, message.clone());
            }
            Action::DevicesUpdated(devices) => {
                self.diff_devices(devices);
            }
            Action::SessionChanged(state) => match state {
                SessionState::Running => self.push(NotificationLevel::Info, "Session running"),
                SessionState::Stopped => self.push(NotificationLevel::Info, "Session stopped"),
                SessionState::Failed { message } => {
                    self.push(NotificationLevel::Error, format!("Session failed: {message}"));
                }
                SessionState::Idle => {}
            },
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

        let block = Block::default()
            .title(" Event Log ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(layout[0]);
        frame.render_widget(block, layout[0]);

        let height = usize::from(inner.height);
        let tail = self.entries.len().saturating_sub(self.scrollback);
        let start = tail.saturating_sub(height);
        let lines: Vec<Line> = self.entries[start..tail]
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(self.uptime_stamp(entry), theme::muted()),
                    Span::raw(" "),
                    Self::level_span(entry.level),
                    Span::raw(" "),
                    Span::styled(entry.message.clone(), theme::row()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        let hints = Line::from(vec![
            Span::styled(" ↑↓ ", theme::key_hint_key()),
            Span::styled("scroll  ", theme::key_hint()),
            Span::styled("g/G ", theme::key_hint_key()),
            Span::styled("top/bottom  ", theme::key_hint()),
            Span::styled("c ", theme::key_hint_key()),
            Span::styled("clear", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Log"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn notifications_append_entries() {
        let mut screen = LogScreen::new();
        screen
            .update(&Action::Notify(Notification::success("wrote 2 bytes")))
            .unwrap();
        screen
            .update(&Action::Notify(Notification::error("not writable")))
            .unwrap();
        assert_eq!(screen.entries.len(), 2);
        assert_eq!(screen.entries[1].message, "not writable");
    }

    #[test]
    fn session_failure_is_logged_as_error() {
        let mut screen = LogScreen::new();
        screen
            .update(&Action::SessionChanged(SessionState::Failed {
                message: "driver gone".into(),
            }))
            .unwrap();
        assert_eq!(screen.entries.len(), 1);
        assert_eq!(screen.entries[0].level, NotificationLevel::Error);
    }

    #[test]
    fn scrollback_clamps_to_history() {
        let mut screen = LogScreen::new();
        for i in 0..5 {
            screen.push(NotificationLevel::Info, format!("entry {i}"));
        }
        let up = KeyEvent::new(KeyCode::Up, crossterm::event::KeyModifiers::NONE);
        for _ in 0..20 {
            screen.handle_key_event(up).unwrap();
        }
        assert_eq!(screen.scrollback, 4);
        screen
            .handle_key_event(KeyEvent::new(
                KeyCode::Char('G'),
                crossterm::event::KeyModifiers::NONE,
            ))
            .unwrap();
        assert_eq!(screen.scrollback, 0);
    }

    #[test]
    fn device_snapshots_become_connection_events() {
        let mut screen = LogScreen::new();
        let dev = |id: &str, name: &str| {
            std::sync::Arc::new(gattscope_core::Device {
                instance_id: InstanceId::from(id),
                address: gattscope_core::BleAddress::new("AA:00:00:00:00:02"),
                name: Some(name.to_owned()),
                security: gattscope_core::ConnectionSecurity::Open,
                connection: gattscope_core::ConnectionParams::default(),
                rssi: None,
            })
        };

        screen.diff_devices(&[dev("a0.d1", "HRM")]);
        assert_eq!(screen.entries.len(), 1);
        assert!(screen.entries[0].message.starts_with("Connected: HRM"));

        // Same snapshot again: nothing new
        screen.diff_devices(&[dev("a0.d1", "HRM")]);
        assert_eq!(screen.entries.len(), 1);

        screen.diff_devices(&[]);
        assert_eq!(screen.entries.len(), 2);
        assert!(screen.entries[1].message.starts_with("Disconnected: HRM"));
        assert_eq!(screen.entries[1].level, NotificationLevel::Warning);
    }

    #[test]
    fn history_is_capped() {
        let mut screen = LogScreen::new();
        for i in 0..(MAX_ENTRIES + 10) {
            screen.push(NotificationLevel::Info, format!("entry {i}"));
        }
        assert_eq!(screen.entries.len(), MAX_ENTRIES);
        assert_eq!(screen.entries[0].message, "entry 10");
    }
}
