//! Inspector screen — the attribute tree and a detail pane for the
//! selected node.
//!
//! Navigation keys mirror the store-backed controller in
//! `gattscope-core::nav`: up/down walk the visible pre-order, right
//! expands (or descends when already expanded), left collapses (or
//! climbs to the parent from a leaf). All selection and expansion
//! changes round-trip through the session store, so the rendered tree
//! always reflects the published snapshot.

use std::cell::Cell;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tokio::sync::mpsc::UnboundedSender;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use gattscope_core::{
    AdapterState, AttributeKind, AttributeNode, AttributeTree, ConnectionParams, Device,
    InstanceId, NavRequest, expand_selection, next_selection,
};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::{hex, props};

// ── Dialogs ──────────────────────────────────────────────────────────

/// Connection-parameter form fields, in tab order.
const PARAM_LABELS: [&str; 4] = [
    "Min interval (1.25ms units)",
    "Max interval (1.25ms units)",
    "Latency (events)",
    "Timeout (10ms units)",
];

enum Dialog {
    /// Hex value editor for a characteristic or descriptor.
    Write {
        target: InstanceId,
        input: Input,
        error: Option<String>,
    },
    /// Connection parameter editor for a device.
    ConnParams {
        device: InstanceId,
        fields: [Input; 4],
        active: usize,
        error: Option<String>,
    },
    /// Advertising name editor for the local adapter.
    AdvertisingName { input: Input },
}

// ── Component ────────────────────────────────────────────────────────

pub struct InspectorScreen {
    focused: bool,
    action_tx: Option<UnboundedSender<Action>>,
    tree: Arc<AttributeTree>,
    devices: Arc<Vec<Arc<Device>>>,
    adapter: Option<Arc<AdapterState>>,
    selected: Option<InstanceId>,
    dialog: Option<Dialog>,
    /// First visible row shown in the tree pane.
    scroll: Cell<usize>,
    /// Last tree-pane rect, for mouse hit-testing.
    tree_area: Cell<Rect>,
}

impl InspectorScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            action_tx: None,
            tree: Arc::new(AttributeTree::default()),
            devices: Arc::new(Vec::new()),
            adapter: None,
            selected: None,
            dialog: None,
            scroll: Cell::new(0),
            tree_area: Cell::new(Rect::default()),
        }
    }

    fn selected_node(&self) -> Option<&AttributeNode> {
        self.tree.find(self.selected.as_ref()?)
    }

    /// The device record owning the current selection, if any.
    fn selected_device(&self) -> Option<Arc<Device>> {
        let id = self.selected.as_ref()?;
        let device_id = id.device()?;
        self.devices
            .iter()
            .find(|d| d.instance_id == device_id)
            .cloned()
    }

    fn nav_action(request: NavRequest) -> Action {
        match request {
            NavRequest::Select(id) => Action::SelectAttribute(Some(id)),
            NavRequest::SetExpanded(id, expanded) => Action::SetAttributeExpanded(id, expanded),
        }
    }

    /// Enter toggles expansion of the selected container.
    fn toggle_action(&self) -> Option<Action> {
        let node = self.selected_node()?;
        if !node.kind.is_container() || node.children.is_empty() {
            return None;
        }
        Some(Action::SetAttributeExpanded(
            node.instance_id.clone(),
            !node.expanded,
        ))
    }

    fn read_action(&self) -> Option<Action> {
        let node = self.selected_node()?;
        match node.kind {
            AttributeKind::Characteristic | AttributeKind::Descriptor => {
                Some(Action::RequestRead(node.instance_id.clone()))
            }
            _ => None,
        }
    }

    fn open_write_dialog(&mut self) -> Option<Action> {
        let node = self.selected_node()?;
        let writable = match node.kind {
            AttributeKind::Descriptor => true,
            AttributeKind::Characteristic => {
                node.properties.is_some_and(gattscope_core::CharacteristicProperties::writable)
            }
            _ => false,
        };
        if !writable {
            return Some(Action::Notify(Notification::warning(
                "Selected attribute is not writable",
            )));
        }
        let current = node
            .value
            .as_deref()
            .map_or_else(String::new, hex::format_hex);
        self.dialog = Some(Dialog::Write {
            target: node.instance_id.clone(),
            input: Input::new(current),
            error: None,
        });
        None
    }

    fn open_conn_params_dialog(&mut self) -> Option<Action> {
        let device = self.selected_device()?;
        let p = device.connection;
        self.dialog = Some(Dialog::ConnParams {
            device: device.instance_id.clone(),
            fields: [
                Input::new(p.min_interval.to_string()),
                Input::new(p.max_interval.to_string()),
                Input::new(p.latency.to_string()),
                Input::new(p.supervision_timeout.to_string()),
            ],
            active: 0,
            error: None,
        });
        None
    }

    fn open_advertising_dialog(&mut self) {
        let name = self
            .adapter
            .as_ref()
            .map_or_else(String::new, |a| a.name.clone());
        self.dialog = Some(Dialog::AdvertisingName {
            input: Input::new(name),
        });
    }

    fn disconnect_confirm(&self) -> Option<Action> {
        let device = self.selected_device()?;
        Some(Action::ShowConfirm(ConfirmAction::Disconnect {
            device: device.instance_id.clone(),
            name: device.display_name().to_owned(),
        }))
    }

    /// Dialog key handling. Returns the action to dispatch, if any.
    #[allow(clippy::too_many_lines)]
    fn handle_dialog_key(&mut self, key: KeyEvent) -> Option<Action> {
        let dialog = self.dialog.as_mut()?;
        match dialog {
            Dialog::Write {
                target,
                input,
                error,
            } => match key.code {
                KeyCode::Esc => {
                    self.dialog = None;
                    None
                }
                KeyCode::Enter => match hex::parse_hex(input.value()) {
                    Ok(value) => {
                        let action = Action::RequestWrite(target.clone(), value);
                        self.dialog = None;
                        Some(action)
                    }
                    Err(e) => {
                        *error = Some(e.to_string());
                        None
                    }
                },
                _ => {
                    input.handle_event(&crossterm::event::Event::Key(key));
                    *error = None;
                    None
                }
            },
            Dialog::ConnParams {
                device,
                fields,
                active,
                error,
            } => match key.code {
                KeyCode::Esc => {
                    self.dialog = None;
                    None
                }
                KeyCode::Tab | KeyCode::Down => {
                    *active = (*active + 1) % fields.len();
                    None
                }
                KeyCode::BackTab | KeyCode::Up => {
                    *active = (*active + fields.len() - 1) % fields.len();
                    None
                }
                KeyCode::Enter => {
                    let parsed: Result<Vec<u16>, _> =
                        fields.iter().map(|f| f.value().trim().parse()).collect();
                    match parsed {
                        Ok(values) => {
                            let params = ConnectionParams {
                                min_interval: values[0],
                                max_interval: values[1],
                                latency: values[2],
                                supervision_timeout: values[3],
                            };
                            let action =
                                Action::RequestConnectionParams(device.clone(), params);
                            self.dialog = None;
                            Some(action)
                        }
                        Err(_) => {
                            *error = Some("All fields must be integers 0-65535".to_owned());
                            None
                        }
                    }
                }
                _ => {
                    fields[*active].handle_event(&crossterm::event::Event::Key(key));
                    *error = None;
                    None
                }
            },
            Dialog::AdvertisingName { input } => match key.code {
                KeyCode::Esc => {
                    self.dialog = None;
                    None
                }
                KeyCode::Enter => {
                    let name = input.value().trim().to_owned();
                    self.dialog = None;
                    if name.is_empty() {
                        Some(Action::Notify(Notification::warning(
                            "Advertising name cannot be empty",
                        )))
                    } else {
                        Some(Action::RequestAdvertisingName(name))
                    }
                }
                _ => {
                    input.handle_event(&crossterm::event::Event::Key(key));
                    None
                }
            },
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render_tree(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Attributes ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.tree_area.set(inner);

        let visible: Vec<&AttributeNode> = self.tree.visible().collect();
        let height = usize::from(inner.height);

        // Keep the selection inside the viewport
        let selected_row = self
            .selected
            .as_ref()
            .and_then(|id| visible.iter().position(|n| &n.instance_id == id));
        let mut offset = self.scroll.get().min(visible.len().saturating_sub(1));
        if let Some(row) = selected_row {
            if row < offset {
                offset = row;
            } else if height > 0 && row >= offset + height {
                offset = row + 1 - height;
            }
        }
        self.scroll.set(offset);

        let lines: Vec<Line> = visible
            .iter()
            .skip(offset)
            .take(height)
            .map(|node| self.tree_row(node))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn tree_row(&self, node: &AttributeNode) -> Line<'static> {
        let depth = node.instance_id.depth().saturating_sub(2);
        let indent = "  ".repeat(depth);
        let marker = if !node.kind.is_container() || node.children.is_empty() {
            "  "
        } else if node.expanded {
            "▾ "
        } else {
            "▸ "
        };

        let selected = self.selected.as_ref() == Some(&node.instance_id);
        let name_style = if selected {
            theme::row_selected()
        } else {
            theme::row()
        };

        let mut spans = vec![
            Span::raw(indent),
            Span::styled(marker.to_owned(), theme::kind(node.kind)),
            Span::styled(node.name.clone(), name_style),
        ];
        if let Some(p) = node.properties {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(props::props_badge(p), theme::muted()));
        }
        if let Some(value) = &node.value {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(hex::display_value(value), theme::muted()));
        }
        Line::from(spans)
    }

    #[allow(clippy::too_many_lines)]
    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Details ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(node) = self.selected_node() else {
            let hint = Paragraph::new(Line::from(Span::styled(
                " Select an attribute with ↑/↓",
                theme::muted(),
            )));
            frame.render_widget(hint, inner);
            return;
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Name:       ", theme::muted()),
                Span::styled(node.name.clone(), theme::row()),
            ]),
            Line::from(vec![
                Span::styled("Kind:       ", theme::muted()),
                Span::styled(node.kind.label(), theme::kind(node.kind)),
            ]),
            Line::from(vec![
                Span::styled("Instance:   ", theme::muted()),
                Span::styled(node.instance_id.to_string(), theme::row()),
            ]),
        ];
        if let Some(uuid) = &node.uuid {
            lines.push(Line::from(vec![
                Span::styled("UUID:       ", theme::muted()),
                Span::styled(uuid.to_string(), theme::row()),
            ]));
        }
        if let Some(p) = node.properties {
            lines.push(props::props_line(p));
        }
        if let Some(value) = &node.value {
            lines.push(Line::from(vec![
                Span::styled("Value:      ", theme::muted()),
                Span::styled(hex::display_value(value), theme::row()),
            ]));
        }

        match node.kind {
            AttributeKind::Adapter => {
                if let Some(adapter) = &self.adapter {
                    lines.push(Line::from(""));
                    lines.push(Line::from(vec![
                        Span::styled("Address:    ", theme::muted()),
                        Span::styled(adapter.address.to_string(), theme::row()),
                    ]));
                    lines.push(Line::from(vec![
                        Span::styled("Advertising: ", theme::muted()),
                        if adapter.advertising {
                            Span::styled("on", ratatui::style::Style::default().fg(theme::AURORA_GREEN))
                        } else {
                            Span::styled("off", theme::muted())
                        },
                    ]));
                }
            }
            AttributeKind::Device => {
                if let Some(device) = self.selected_device() {
                    let (min_ms, max_ms) = device.connection.interval_ms();
                    lines.push(Line::from(""));
                    lines.push(Line::from(vec![
                        Span::styled("Address:    ", theme::muted()),
                        Span::styled(device.address.to_string(), theme::row()),
                    ]));
                    lines.push(Line::from(vec![
                        Span::styled("Security:   ", theme::muted()),
                        Span::styled(format!("{:?}", device.security), theme::row()),
                    ]));
                    lines.push(Line::from(vec![
                        Span::styled("Interval:   ", theme::muted()),
                        Span::styled(format!("{min_ms:.2}-{max_ms:.2} ms"), theme::row()),
                    ]));
                    if let Some(rssi) = device.rssi {
                        lines.push(Line::from(vec![
                            Span::styled("RSSI:       ", theme::muted()),
                            Span::styled(format!("{rssi} dBm"), theme::row()),
                        ]));
                    }
                }
            }
            _ => {}
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" ↑↓←→ ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("⏎ ", theme::key_hint_key()),
            Span::styled("expand/collapse  ", theme::key_hint()),
        ];
        match self.selected_node().map(|n| n.kind) {
            Some(AttributeKind::Characteristic | AttributeKind::Descriptor) => {
                spans.push(Span::styled("r ", theme::key_hint_key()));
                spans.push(Span::styled("read  ", theme::key_hint()));
                spans.push(Span::styled("w ", theme::key_hint_key()));
                spans.push(Span::styled("write  ", theme::key_hint()));
            }
            Some(AttributeKind::Adapter) => {
                spans.push(Span::styled("a ", theme::key_hint_key()));
                spans.push(Span::styled("advertising  ", theme::key_hint()));
                spans.push(Span::styled("A ", theme::key_hint_key()));
                spans.push(Span::styled("adv name  ", theme::key_hint()));
            }
            _ => {}
        }
        if self.selected_device().is_some() {
            spans.push(Span::styled("d ", theme::key_hint_key()));
            spans.push(Span::styled("disconnect  ", theme::key_hint()));
            spans.push(Span::styled("p ", theme::key_hint_key()));
            spans.push(Span::styled("pair  ", theme::key_hint()));
            spans.push(Span::styled("u ", theme::key_hint_key()));
            spans.push(Span::styled("conn params  ", theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_dialog(&self, frame: &mut Frame, area: Rect) {
        let Some(dialog) = &self.dialog else { return };

        let (title, body_lines): (&str, Vec<Line>) = match dialog {
            Dialog::Write { input, error, .. } => {
                let mut lines = vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("  Hex value: ", theme::muted()),
                        Span::styled(input.value().to_owned(), theme::row()),
                        Span::styled("█", theme::row()),
                    ]),
                    Line::from(""),
                ];
                if let Some(err) = error {
                    lines.push(Line::from(Span::styled(
                        format!("  {err}"),
                        ratatui::style::Style::default().fg(theme::AURORA_RED),
                    )));
                }
                lines.push(Line::from(vec![
                    Span::styled("  ⏎ ", theme::key_hint_key()),
                    Span::styled("write  ", theme::key_hint()),
                    Span::styled("Esc ", theme::key_hint_key()),
                    Span::styled("cancel", theme::key_hint()),
                ]));
                (" Write Value ", lines)
            }
            Dialog::ConnParams { fields, active, error, .. } => {
                let mut lines = vec![Line::from("")];
                for (i, (label, field)) in PARAM_LABELS.iter().zip(fields.iter()).enumerate() {
                    let marker = if i == *active { "▸ " } else { "  " };
                    lines.push(Line::from(vec![
                        Span::styled(format!("{marker}{label:<28}"), theme::muted()),
                        Span::styled(field.value().to_owned(), theme::row()),
                        if i == *active {
                            Span::styled("█", theme::row())
                        } else {
                            Span::raw("")
                        },
                    ]));
                }
                lines.push(Line::from(""));
                if let Some(err) = error {
                    lines.push(Line::from(Span::styled(
                        format!("  {err}"),
                        ratatui::style::Style::default().fg(theme::AURORA_RED),
                    )));
                }
                lines.push(Line::from(vec![
                    Span::styled("  Tab ", theme::key_hint_key()),
                    Span::styled("next field  ", theme::key_hint()),
                    Span::styled("⏎ ", theme::key_hint_key()),
                    Span::styled("apply  ", theme::key_hint()),
                    Span::styled("Esc ", theme::key_hint_key()),
                    Span::styled("cancel", theme::key_hint()),
                ]));
                (" Connection Parameters ", lines)
            }
            Dialog::AdvertisingName { input } => {
                let lines = vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("  Name: ", theme::muted()),
                        Span::styled(input.value().to_owned(), theme::row()),
                        Span::styled("█", theme::row()),
                    ]),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("  ⏎ ", theme::key_hint_key()),
                        Span::styled("apply  ", theme::key_hint()),
                        Span::styled("Esc ", theme::key_hint_key()),
                        Span::styled("cancel", theme::key_hint()),
                    ]),
                ];
                (" Advertising Setup ", lines)
            }
        };

        #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
        let height = (body_lines.len() as u16 + 2).min(area.height.saturating_sub(2));
        let width = 56u16.min(area.width.saturating_sub(4));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let dialog_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, dialog_area);
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);
        frame.render_widget(Paragraph::new(body_lines), inner);
    }
}

impl Component for InspectorScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.dialog.is_some() {
            return Ok(self.handle_dialog_key(key));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                next_selection(&self.tree, self.selected.as_ref(), false).map(Self::nav_action)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                next_selection(&self.tree, self.selected.as_ref(), true).map(Self::nav_action)
            }
            KeyCode::Char('l') | KeyCode::Right => {
                expand_selection(&self.tree, self.selected.as_ref(), true).map(Self::nav_action)
            }
            KeyCode::Char('h') | KeyCode::Left => {
                expand_selection(&self.tree, self.selected.as_ref(), false).map(Self::nav_action)
            }
            KeyCode::Enter => self.toggle_action(),
            KeyCode::Char('r') => self.read_action(),
            KeyCode::Char('w') => self.open_write_dialog(),
            KeyCode::Char('d') => self.disconnect_confirm(),
            KeyCode::Char('p') => self
                .selected_device()
                .map(|d| Action::RequestPair(d.instance_id.clone())),
            KeyCode::Char('u') => self.open_conn_params_dialog(),
            KeyCode::Char('a') => Some(Action::RequestToggleAdvertising),
            KeyCode::Char('A') => {
                self.open_advertising_dialog();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.dialog.is_some() {
            return Ok(None);
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            let area = self.tree_area.get();
            if mouse.column >= area.x
                && mouse.column < area.x + area.width
                && mouse.row >= area.y
                && mouse.row < area.y + area.height
            {
                let row = usize::from(mouse.row - area.y) + self.scroll.get();
                let id = self
                    .tree
                    .visible()
                    .nth(row)
                    .map(|node| node.instance_id.clone());
                if let Some(id) = id {
                    return Ok(Some(Action::SelectAttribute(Some(id))));
                }
            }
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::TreeUpdated(tree) => {
                self.tree = Arc::clone(tree);
            }
            Action::DevicesUpdated(devices) => {
                self.devices = Arc::clone(devices);
            }
            Action::AdapterUpdated(adapter) => {
                self.adapter.clone_from(adapter);
            }
            Action::SelectionChanged(selected) => {
                self.selected.clone_from(selected);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(1),    // panes
            Constraint::Length(1), // hints
        ])
        .split(area);

        let panes =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(layout[0]);

        self.render_tree(frame, panes[0]);
        self.render_detail(frame, panes[1]);
        self.render_hints(frame, layout[1]);
        self.render_dialog(frame, area);
    }

    fn wants_input(&self) -> bool {
        self.dialog.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        "Inspector"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::{KeyModifiers, MouseEventKind};
    use gattscope_core::DataStore;
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Inspector preloaded with a small enumerated store.
    fn screen_with_store() -> (InspectorScreen, Arc<DataStore>) {
        let store = Arc::new(DataStore::new());
        let adapter = AdapterState::new(
            "a0",
            "Test Adapter",
            gattscope_core::BleAddress::new("AA:00:00:00:00:01"),
        );
        store.set_adapter_state(adapter);
        store.connect_device(Device {
            instance_id: InstanceId::from("a0.d1"),
            address: gattscope_core::BleAddress::new("AA:00:00:00:00:02"),
            name: Some("Peripheral".into()),
            security: gattscope_core::ConnectionSecurity::Open,
            connection: ConnectionParams::default(),
            rssi: Some(-40),
        });

        let mut screen = InspectorScreen::new();
        screen
            .update(&Action::TreeUpdated(store.tree_snapshot()))
            .unwrap();
        screen
            .update(&Action::DevicesUpdated(store.devices_snapshot()))
            .unwrap();
        screen
            .update(&Action::AdapterUpdated(store.adapter_snapshot()))
            .unwrap();
        (screen, store)
    }

    #[test]
    fn down_with_no_selection_selects_first_root() {
        let (mut screen, _store) = screen_with_store();
        let action = screen.handle_key_event(key(KeyCode::Down)).unwrap();
        match action {
            Some(Action::SelectAttribute(Some(id))) => {
                assert_eq!(id.as_str(), "a0.local");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn up_with_no_selection_selects_last_visible() {
        let (mut screen, _store) = screen_with_store();
        let action = screen.handle_key_event(key(KeyCode::Up)).unwrap();
        match action {
            Some(Action::SelectAttribute(Some(id))) => {
                assert_eq!(id.as_str(), "a0.d1");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn disconnect_requires_a_device_selection() {
        let (mut screen, store) = screen_with_store();

        // Adapter selected: no device to disconnect from.
        screen
            .update(&Action::SelectionChanged(Some(InstanceId::from("a0.local"))))
            .unwrap();
        assert!(screen.handle_key_event(key(KeyCode::Char('d'))).unwrap().is_none());

        screen
            .update(&Action::SelectionChanged(Some(InstanceId::from("a0.d1"))))
            .unwrap();
        let action = screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        assert!(matches!(action, Some(Action::ShowConfirm(_))));
        drop(store);
    }

    #[test]
    fn write_dialog_parses_hex_on_enter() {
        let (mut screen, store) = screen_with_store();
        store.add_service(gattscope_core::Service {
            instance_id: InstanceId::from("a0.d1.s1"),
            uuid: gattscope_core::model::uuids::from_assigned_number(0x180F),
        });
        store.add_characteristic(gattscope_core::Characteristic {
            instance_id: InstanceId::from("a0.d1.s1.c1"),
            uuid: gattscope_core::model::uuids::from_assigned_number(0x2A19),
            properties: gattscope_core::CharacteristicProperties {
                read: true,
                write: true,
                ..gattscope_core::CharacteristicProperties::default()
            },
            value: Some(vec![0x10]),
        });
        screen
            .update(&Action::TreeUpdated(store.tree_snapshot()))
            .unwrap();
        screen
            .update(&Action::SelectionChanged(Some(InstanceId::from("a0.d1.s1.c1"))))
            .unwrap();

        assert!(screen.handle_key_event(key(KeyCode::Char('w'))).unwrap().is_none());
        assert!(screen.dialog.is_some());

        // Replace the prefilled value and submit
        for _ in 0..8 {
            screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        }
        screen.handle_key_event(key(KeyCode::Char('2'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('a'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::RequestWrite(id, value)) => {
                assert_eq!(id.as_str(), "a0.d1.s1.c1");
                assert_eq!(value, vec![0x2A]);
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(screen.dialog.is_none());
    }

    #[test]
    fn write_dialog_keeps_error_until_valid() {
        let (mut screen, store) = screen_with_store();
        store.add_service(gattscope_core::Service {
            instance_id: InstanceId::from("a0.d1.s1"),
            uuid: gattscope_core::model::uuids::from_assigned_number(0x180F),
        });
        store.add_characteristic(gattscope_core::Characteristic {
            instance_id: InstanceId::from("a0.d1.s1.c1"),
            uuid: gattscope_core::model::uuids::from_assigned_number(0x2A19),
            properties: gattscope_core::CharacteristicProperties {
                write: true,
                ..gattscope_core::CharacteristicProperties::default()
            },
            value: None,
        });
        screen
            .update(&Action::TreeUpdated(store.tree_snapshot()))
            .unwrap();
        screen
            .update(&Action::SelectionChanged(Some(InstanceId::from("a0.d1.s1.c1"))))
            .unwrap();
        screen.handle_key_event(key(KeyCode::Char('w'))).unwrap();

        // Odd number of digits: stays open with an error
        screen.handle_key_event(key(KeyCode::Char('f'))).unwrap();
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        match &screen.dialog {
            Some(Dialog::Write { error, .. }) => assert!(error.is_some()),
            other => panic!("expected write dialog, got {}", other.is_some()),
        }
    }

    #[test]
    fn mouse_click_selects_visible_row() {
        let (mut screen, _store) = screen_with_store();
        screen.tree_area.set(Rect::new(1, 1, 40, 10));
        let action = screen
            .handle_mouse_event(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 5,
                row: 2,
                modifiers: KeyModifiers::NONE,
            })
            .unwrap();
        match action {
            Some(Action::SelectAttribute(Some(id))) => assert_eq!(id.as_str(), "a0.d1"),
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
