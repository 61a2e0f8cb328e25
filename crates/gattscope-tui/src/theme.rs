//! Aurora palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ICE_BLUE: Color = Color::Rgb(136, 192, 208); // #88c0d0
pub const FROST_CYAN: Color = Color::Rgb(143, 188, 187); // #8fbcbb
pub const AURORA_GREEN: Color = Color::Rgb(163, 190, 140); // #a3be8c
pub const AURORA_YELLOW: Color = Color::Rgb(235, 203, 139); // #ebcb8b
pub const AURORA_RED: Color = Color::Rgb(191, 97, 106); // #bf616a
pub const AURORA_PURPLE: Color = Color::Rgb(180, 142, 173); // #b48ead

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(216, 222, 233); // #d8dee9
pub const BORDER_GRAY: Color = Color::Rgb(76, 86, 106); // #4c566a
pub const BG_HIGHLIGHT: Color = Color::Rgb(59, 66, 82); // #3b4252
pub const BG_DARK: Color = Color::Rgb(46, 52, 64); // #2e3440

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(ICE_BLUE).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(ICE_BLUE)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Normal row text.
pub fn row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted row.
pub fn row_selected() -> Style {
    Style::default()
        .fg(ICE_BLUE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Secondary text (values, addresses, UUIDs).
pub fn muted() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Active tab in the tab bar.
pub fn tab_active() -> Style {
    Style::default().fg(ICE_BLUE).add_modifier(Modifier::BOLD)
}

/// Inactive tab in the tab bar.
pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(ICE_BLUE).add_modifier(Modifier::BOLD)
}

/// Style for an attribute node kind marker.
pub fn kind(kind: gattscope_core::AttributeKind) -> Style {
    use gattscope_core::AttributeKind as K;
    let color = match kind {
        K::Adapter => AURORA_PURPLE,
        K::Device => ICE_BLUE,
        K::Service => FROST_CYAN,
        K::Characteristic => AURORA_GREEN,
        K::Descriptor => AURORA_YELLOW,
    };
    Style::default().fg(color)
}
