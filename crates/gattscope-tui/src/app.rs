//! Application loop: events in, actions dispatched, frames out.
//!
//! Keys become [`Action`]s, the data bridge turns store snapshots into
//! [`Action`]s, and every action is broadcast to all screens before the
//! app applies its own side effects (session calls, dialogs, toasts).

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use indexmap::IndexMap;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use gattscope_core::{Command, CommandResult, Session, SessionState};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::config::Config;
use crate::data_bridge::run_data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Toast display duration before auto-dismiss.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

pub struct App {
    session: Session,
    config: Config,
    screens: IndexMap<ScreenId, Box<dyn Component>>,
    active_screen: ScreenId,
    session_state: SessionState,
    running: bool,
    help_visible: bool,
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    bridge_cancel: CancellationToken,
}

impl App {
    pub fn new(session: Session, config: Config) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: IndexMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();
        Self {
            session,
            config,
            screens,
            active_screen: ScreenId::Inspector,
            session_state: SessionState::Idle,
            running: true,
            help_visible: false,
            pending_confirm: None,
            notification: None,
            action_tx,
            action_rx,
            bridge_cancel: CancellationToken::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }

        tokio::spawn(run_data_bridge(
            self.session.clone(),
            self.action_tx.clone(),
            self.bridge_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(self.config.tick_rate_ms),
            Duration::from_millis(self.config.render_rate_ms),
        );

        while self.running {
            let Some(event) = events.next().await else {
                // Event reader gone; nothing can drive the UI anymore.
                break;
            };
            match event {
                Event::Key(key) => self.handle_key(key),
                Event::Mouse(mouse) => {
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        if let Some(action) = screen.handle_mouse_event(mouse)? {
                            let _ = self.action_tx.send(action);
                        }
                    }
                }
                Event::Resize(w, h) => {
                    let _ = self.action_tx.send(Action::Resize(w, h));
                }
                Event::Tick => {
                    let _ = self.action_tx.send(Action::Tick);
                }
                Event::Render => {
                    tui.draw(|frame| self.render(frame))?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(action)?;
            }
        }

        self.bridge_cancel.cancel();
        events.stop();
        tui.exit()?;
        info!("app loop finished");
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl-C always quits, even from a text input.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            let _ = self.action_tx.send(Action::Quit);
            return;
        }

        if self.help_visible {
            let _ = self.action_tx.send(Action::ToggleHelp);
            return;
        }

        if self.pending_confirm.is_some() {
            let action = match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => Action::ConfirmYes,
                _ => Action::ConfirmNo,
            };
            let _ = self.action_tx.send(action);
            return;
        }

        let capturing = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.wants_input());
        if !capturing {
            let global = match key.code {
                KeyCode::Char('q') => Some(Action::Quit),
                KeyCode::Char('?') => Some(Action::ToggleHelp),
                KeyCode::Tab => Some(Action::SwitchScreen(self.active_screen.next())),
                KeyCode::BackTab => Some(Action::SwitchScreen(self.active_screen.prev())),
                KeyCode::Char(c @ '1'..='9') => c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(ScreenId::from_number)
                    .map(Action::SwitchScreen),
                _ => None,
            };
            if let Some(action) = global {
                let _ = self.action_tx.send(action);
                return;
            }
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            match screen.handle_key_event(key) {
                Ok(Some(action)) => {
                    let _ = self.action_tx.send(action);
                }
                Ok(None) => {}
                Err(e) => error!(error = %e, "screen key handler failed"),
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: Action) -> Result<()> {
        // Screens see every action before the app applies its own effects.
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(&action)? {
                let _ = self.action_tx.send(follow_up);
            }
        }

        match action {
            Action::Quit => {
                self.running = false;
            }
            Action::Tick => {
                if let Some((_, shown_at)) = &self.notification {
                    if shown_at.elapsed() >= NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
            }
            Action::Render | Action::Resize(..) => {}
            Action::SwitchScreen(id) => {
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    screen.set_focused(false);
                }
                self.active_screen = id;
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    screen.set_focused(true);
                }
            }
            Action::SessionChanged(state) => {
                if let SessionState::Failed { message } = &state {
                    let _ = self.action_tx.send(Action::Notify(Notification::error(
                        format!("Session failed: {message}"),
                    )));
                }
                self.session_state = state;
            }
            Action::SelectAttribute(id) => {
                self.session.select(id);
            }
            Action::SetAttributeExpanded(id, expanded) => {
                if !self.session.set_expanded(&id, expanded) {
                    warn!(id = %id, "expansion change on unknown attribute");
                }
            }
            Action::RequestRead(id) => {
                let cmd = if id.is_descriptor() {
                    Command::ReadDescriptor { id }
                } else {
                    Command::ReadCharacteristic { id }
                };
                self.dispatch_command(cmd);
            }
            Action::RequestWrite(id, value) => {
                let cmd = if id.is_descriptor() {
                    Command::WriteDescriptor { id, value }
                } else {
                    Command::WriteCharacteristic { id, value }
                };
                self.dispatch_command(cmd);
            }
            Action::RequestDisconnect(device) => {
                self.dispatch_command(Command::Disconnect { device });
            }
            Action::RequestPair(device) => {
                self.dispatch_command(Command::Pair { device });
            }
            Action::RequestConnectionParams(device, params) => {
                self.dispatch_command(Command::UpdateConnectionParams { device, params });
            }
            Action::RequestToggleAdvertising => {
                self.dispatch_command(Command::ToggleAdvertising);
            }
            Action::RequestAdvertisingName(name) => {
                self.dispatch_command(Command::SetAdvertisingName { name });
            }
            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm);
            }
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    match confirm {
                        ConfirmAction::Disconnect { device, .. } => {
                            let _ = self.action_tx.send(Action::RequestDisconnect(device));
                        }
                    }
                }
            }
            Action::ConfirmNo => {
                self.pending_confirm = None;
            }
            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }
            Action::Notify(notification) => {
                self.notification = Some((notification, Instant::now()));
            }
            Action::DismissNotification => {
                self.notification = None;
            }
            // Remaining data events were already broadcast to the screens.
            Action::TreeUpdated(_)
            | Action::DevicesUpdated(_)
            | Action::AdapterUpdated(_)
            | Action::SelectionChanged(_) => {}
        }
        Ok(())
    }

    /// Run a command against the session off the UI loop and report the
    /// outcome as a toast.
    fn dispatch_command(&self, cmd: Command) {
        let session = self.session.clone();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let label = cmd.label();
            debug!(command = label, "dispatching");
            let notification = match session.execute(cmd).await {
                Ok(CommandResult::Value(value)) => Notification::success(format!(
                    "Read {} byte{}",
                    value.len(),
                    if value.len() == 1 { "" } else { "s" }
                )),
                Ok(CommandResult::Ack) => {
                    Notification::success(format!("Completed: {label}"))
                }
                Ok(CommandResult::Advertising(on)) => Notification::success(format!(
                    "Advertising {}",
                    if on { "enabled" } else { "disabled" }
                )),
                Err(e) => Notification::error(format!("Failed to {label}: {e}")),
            };
            let _ = action_tx.send(Action::Notify(notification));
        });
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let layout = Layout::vertical([
            Constraint::Length(1), // tabs
            Constraint::Min(1),    // content
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

        self.render_tabs(frame, layout[0]);
        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[1]);
        }
        self.render_status_bar(frame, layout[2]);

        if let Some((notification, _)) = &self.notification {
            Self::render_notification(frame, layout[1], notification);
        }
        if let Some(confirm) = &self.pending_confirm {
            Self::render_confirm(frame, frame.area(), confirm);
        }
        if self.help_visible {
            Self::render_help(frame, frame.area());
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(" gattscope ", theme::title_style())];
        for id in ScreenId::ALL {
            let style = if id == self.active_screen {
                theme::tab_active()
            } else {
                theme::tab_inactive()
            };
            spans.push(Span::styled(format!(" {} {} ", id.number(), id.label()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (state_label, state_color) = match &self.session_state {
            SessionState::Idle => ("idle", theme::BORDER_GRAY),
            SessionState::Running => ("running", theme::AURORA_GREEN),
            SessionState::Stopped => ("stopped", theme::AURORA_YELLOW),
            SessionState::Failed { .. } => ("failed", theme::AURORA_RED),
        };
        let line = Line::from(vec![
            Span::styled(" ● ", ratatui::style::Style::default().fg(state_color)),
            Span::styled(state_label, theme::muted()),
            Span::raw("  "),
            Span::styled("Tab ", theme::key_hint_key()),
            Span::styled("screens  ", theme::key_hint()),
            Span::styled("? ", theme::key_hint_key()),
            Span::styled("help  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_notification(frame: &mut Frame, content: Rect, notification: &Notification) {
        let color = match notification.level {
            NotificationLevel::Info => theme::FROST_CYAN,
            NotificationLevel::Success => theme::AURORA_GREEN,
            NotificationLevel::Warning => theme::AURORA_YELLOW,
            NotificationLevel::Error => theme::AURORA_RED,
        };
        #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
        let width =
            (notification.message.chars().count() as u16 + 4).min(content.width.saturating_sub(2));
        let area = Rect::new(
            content.x + content.width.saturating_sub(width + 1),
            content.y + 1,
            width,
            3,
        );
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(ratatui::style::Style::default().fg(color));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {}", notification.message),
                theme::row(),
            ))),
            inner,
        );
    }

    fn render_confirm(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let message = confirm.to_string();
        #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
        let width = (message.chars().count() as u16 + 8)
            .max(30)
            .min(area.width.saturating_sub(4));
        let height = 5u16.min(area.height.saturating_sub(2));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let dialog = Rect::new(x, y, width, height);

        frame.render_widget(Clear, dialog);
        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);
        let lines = vec![
            Line::from(Span::styled(format!(" {message}"), theme::row())),
            Line::from(""),
            Line::from(vec![
                Span::styled(" y ", theme::key_hint_key()),
                Span::styled("yes  ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("no", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_help(frame: &mut Frame, area: Rect) {
        let entries: &[(&str, &str)] = &[
            ("↑/↓, j/k", "Move selection through the visible tree"),
            ("→/←, l/h", "Expand / collapse (or step into / out)"),
            ("Enter", "Toggle expansion of the selected node"),
            ("r", "Read the selected characteristic or descriptor"),
            ("w", "Write the selected characteristic or descriptor"),
            ("d", "Disconnect the selected device"),
            ("p", "Pair with the selected device"),
            ("u", "Update connection parameters"),
            ("a", "Toggle local advertising"),
            ("A", "Set the advertising name"),
            ("1-2, Tab", "Switch screens"),
            ("?", "Toggle this help"),
            ("q, Ctrl-C", "Quit"),
        ];

        #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
        let height = (entries.len() as u16 + 4).min(area.height.saturating_sub(2));
        let width = 64u16.min(area.width.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let dialog = Rect::new(x, y, width, height);

        frame.render_widget(Clear, dialog);
        let block = Block::default()
            .title(" Help ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let mut lines = vec![Line::from("")];
        for (keys, description) in entries {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
                Span::styled((*description).to_owned(), theme::key_hint()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Press any key to close",
            theme::muted(),
        )));
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
