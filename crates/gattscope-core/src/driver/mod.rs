// ── Driver seam ──
//
// The BLE transport (adapter access, GATT enumeration, device I/O) is
// implemented outside this crate. A driver receives a context holding
// the store and the command channel, populates the store as it
// discovers state, and answers commands until cancelled.

pub mod sim;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::error::CoreError;
use crate::store::DataStore;

/// Answers one command back to the requester. Dropping it without
/// responding surfaces as [`CoreError::ChannelClosed`] on the caller.
pub struct CommandResponder {
    tx: oneshot::Sender<Result<CommandResult, CoreError>>,
}

impl CommandResponder {
    pub fn respond(self, result: Result<CommandResult, CoreError>) {
        // The caller may have given up waiting; that is fine.
        let _ = self.tx.send(result);
    }
}

/// Everything a driver needs for one session.
pub struct DriverContext {
    store: Arc<DataStore>,
    commands: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
}

impl DriverContext {
    pub(crate) fn new(
        store: Arc<DataStore>,
        commands: mpsc::Receiver<CommandEnvelope>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            store,
            commands,
            cancel,
        }
    }

    /// The session's data store. Drivers are the only writers of
    /// device and attribute lifecycle state.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.store
    }

    /// Receive the next command, or `None` once the session is
    /// cancelled or the sender side is gone.
    pub async fn next_command(&mut self) -> Option<(Command, CommandResponder)> {
        tokio::select! {
            () = self.cancel.cancelled() => None,
            envelope = self.commands.recv() => {
                let envelope = envelope?;
                Some((envelope.command, CommandResponder {
                    tx: envelope.response_tx,
                }))
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A BLE transport backend.
pub trait BleDriver: Send + 'static {
    /// Driver name, for logs.
    fn name(&self) -> &'static str;

    /// Run the driver until the context is cancelled or the command
    /// channel closes. The driver owns all store lifecycle mutations
    /// for the duration of the session.
    fn run(
        self: Box<Self>,
        ctx: DriverContext,
    ) -> Pin<Box<dyn Future<Output = Result<(), CoreError>> + Send>>;
}
