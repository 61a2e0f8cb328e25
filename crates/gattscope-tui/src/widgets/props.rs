//! Characteristic property rendering helpers.

use gattscope_core::CharacteristicProperties;
use ratatui::text::{Line, Span};

use crate::theme;

/// Comma-separated property names: `"Read, Notify"`.
pub fn props_label(props: CharacteristicProperties) -> String {
    let mut parts = Vec::new();
    if props.read {
        parts.push("Read");
    }
    if props.write {
        parts.push("Write");
    }
    if props.write_without_response {
        parts.push("Write w/o response");
    }
    if props.notify {
        parts.push("Notify");
    }
    if props.indicate {
        parts.push("Indicate");
    }
    if parts.is_empty() {
        "None".to_owned()
    } else {
        parts.join(", ")
    }
}

/// Compact badge string for the tree row: `[RW]`, `[RN]`, `[--]`.
pub fn props_badge(props: CharacteristicProperties) -> String {
    let r = if props.read { 'R' } else { '-' };
    let w = if props.writable() { 'W' } else { '-' };
    let n = if props.notify || props.indicate {
        'N'
    } else {
        '-'
    };
    format!("[{r}{w}{n}]")
}

/// Styled detail-pane line: `Properties: Read, Notify`.
pub fn props_line(props: CharacteristicProperties) -> Line<'static> {
    Line::from(vec![
        Span::styled("Properties: ", theme::muted()),
        Span::styled(props_label(props), theme::row()),
    ])
}
