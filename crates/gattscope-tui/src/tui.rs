//! Terminal session lifecycle.
//!
//! Built on ratatui's `try_init`/`try_restore` pair, plus mouse capture
//! (the inspector tree is clickable). The panic hook restores the
//! terminal before the report prints, so a crash never leaves the shell
//! in raw mode.

use std::io::stdout;

use color_eyre::eyre::{Result, eyre};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::{DefaultTerminal, Frame};

/// One terminal session: `None` outside `enter()`..`exit()`.
pub struct Tui {
    terminal: Option<DefaultTerminal>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        Ok(Self { terminal: None })
    }

    /// Take over the terminal: raw mode, alternate screen, mouse capture.
    pub fn enter(&mut self) -> Result<()> {
        let terminal = ratatui::try_init()?;
        execute!(stdout(), EnableMouseCapture)?;
        self.terminal = Some(terminal);
        Ok(())
    }

    /// Give the terminal back. Safe to call more than once.
    pub fn exit(&mut self) -> Result<()> {
        if self.terminal.take().is_some() {
            let _ = execute!(stdout(), DisableMouseCapture);
            ratatui::try_restore()?;
        }
        Ok(())
    }

    /// Draw one frame. Fails outside an active session.
    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        let terminal = self
            .terminal
            .as_mut()
            .ok_or_else(|| eyre!("draw outside a terminal session"))?;
        terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

/// Install the color-eyre error and panic hooks.
///
/// Call before `Tui::enter`, so failures during startup report cleanly
/// too.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    let panic_hook = panic_hook.into_panic_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        panic_hook(info);
    }));
    Ok(())
}
