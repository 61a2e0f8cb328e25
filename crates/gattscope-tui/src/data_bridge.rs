//! Data bridge — connects [`Session`] streams to TUI actions.
//!
//! Runs as a background task: subscribes to the store's snapshot streams
//! and the session state, forwarding every change as an [`Action`]
//! through the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gattscope_core::Session;

use crate::action::Action;

/// Spawn the data bridge connecting [`Session`] reactive streams to the TUI.
///
/// Sends initial snapshots so screens have data immediately, then loops
/// forwarding every store change and session-state transition as an
/// [`Action`]. Shuts down cleanly on cancellation.
pub async fn run_data_bridge(
    session: Session,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut tree = session.tree();
    let mut devices = session.devices();
    let mut adapter = session.adapter();
    let mut selection = session.selection();
    let mut state = session.states();

    // Push initial snapshots so screens have data immediately
    let _ = action_tx.send(Action::TreeUpdated(tree.current().clone()));
    let _ = action_tx.send(Action::DevicesUpdated(devices.current().clone()));
    let _ = action_tx.send(Action::AdapterUpdated(adapter.current().clone()));
    let _ = action_tx.send(Action::SessionChanged(state.current().clone()));

    // Stream loop — forward every change until cancelled
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(t) = tree.changed() => {
                let _ = action_tx.send(Action::TreeUpdated(t));
            }
            Some(d) = devices.changed() => {
                let _ = action_tx.send(Action::DevicesUpdated(d));
            }
            Some(a) = adapter.changed() => {
                let _ = action_tx.send(Action::AdapterUpdated(a));
            }
            Some(s) = selection.changed() => {
                let _ = action_tx.send(Action::SelectionChanged(s));
            }
            Some(s) = state.changed() => {
                let _ = action_tx.send(Action::SessionChanged(s));
            }
        }
    }

    debug!("data bridge shut down");
}
