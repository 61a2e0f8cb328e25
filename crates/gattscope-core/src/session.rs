// ── Session abstraction ──
//
// Full lifecycle management for one inspection session: owns the
// store, runs the attached driver as a background task, routes
// commands to it, and exposes the store's reactive streams.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::driver::{BleDriver, DriverContext};
use crate::error::CoreError;
use crate::model::{AdapterState, Device, InstanceId};
use crate::store::DataStore;
use crate::stream::SnapshotStream;
use crate::tree::AttributeTree;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── SessionState ─────────────────────────────────────────────────

/// Driver lifecycle state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No driver attached yet.
    Idle,
    /// Driver attached and servicing commands.
    Running,
    /// Driver finished or the session was shut down.
    Stopped,
    /// Driver exited with an error.
    Failed { message: String },
}

// ── Session ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<SessionInner>`. Create one, attach a
/// [`BleDriver`], then read snapshots, subscribe to streams and
/// execute commands.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<DataStore>,
    state: watch::Sender<SessionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    /// Consumed by the driver task on attach. `None` afterwards.
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    driver_task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an idle session. Call [`attach()`](Self::attach) to
    /// start a driver.
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(SessionInner {
                store: Arc::new(DataStore::new()),
                state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                driver_task: Mutex::new(None),
            }),
        }
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Driver lifecycle ─────────────────────────────────────────

    /// Attach a driver and start it as a background task.
    ///
    /// A session runs exactly one driver; attaching a second returns
    /// [`CoreError::AlreadyAttached`].
    pub async fn attach<D: BleDriver>(&self, driver: D) -> Result<(), CoreError> {
        let Some(command_rx) = self.inner.command_rx.lock().await.take() else {
            return Err(CoreError::AlreadyAttached);
        };

        let ctx = DriverContext::new(
            Arc::clone(&self.inner.store),
            command_rx,
            self.inner.cancel.child_token(),
        );
        let driver: Box<dyn BleDriver> = Box::new(driver);
        let name = driver.name();
        info!(driver = name, "driver attached");

        // send_replace updates the value even with zero subscribers.
        self.inner.state.send_replace(SessionState::Running);
        let state = self.inner.state.clone();
        let handle = tokio::spawn(async move {
            match driver.run(ctx).await {
                Ok(()) => {
                    debug!(driver = name, "driver finished");
                    state.send_replace(SessionState::Stopped);
                }
                Err(err) => {
                    warn!(driver = name, error = %err, "driver failed");
                    state.send_replace(SessionState::Failed {
                        message: err.to_string(),
                    });
                }
            }
        });
        *self.inner.driver_task.lock().await = Some(handle);
        Ok(())
    }

    /// Stop the driver and wait for it to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.driver_task.lock().await.take() {
            let _ = handle.await;
        }
        self.inner.state.send_replace(SessionState::Stopped);
        debug!("session shut down");
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the attached driver.
    ///
    /// Sends the command through the internal channel to the driver
    /// task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.state.borrow() != SessionState::Running {
            return Err(CoreError::NotRunning);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ChannelClosed)?;

        rx.await.map_err(|_| CoreError::ChannelClosed)?
    }

    // ── Local state (no driver round-trip) ───────────────────────

    /// Set or clear the selected attribute.
    pub fn select(&self, id: Option<InstanceId>) {
        self.inner.store.select(id);
    }

    /// Expand or collapse a container attribute.
    pub fn set_expanded(&self, id: &InstanceId, expanded: bool) -> bool {
        self.inner.store.set_attribute_expanded(id, expanded)
    }

    // ── Snapshots ────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn tree_snapshot(&self) -> Arc<AttributeTree> {
        self.inner.store.tree_snapshot()
    }

    pub fn devices_snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.inner.store.devices_snapshot()
    }

    pub fn adapter_snapshot(&self) -> Option<Arc<AdapterState>> {
        self.inner.store.adapter_snapshot()
    }

    pub fn selected(&self) -> Option<InstanceId> {
        self.inner.store.selected()
    }

    // ── Reactive streams ─────────────────────────────────────────

    pub fn states(&self) -> SnapshotStream<SessionState> {
        SnapshotStream::new(self.inner.state.subscribe())
    }

    pub fn tree(&self) -> SnapshotStream<Arc<AttributeTree>> {
        self.inner.store.subscribe_tree()
    }

    pub fn devices(&self) -> SnapshotStream<Arc<Vec<Arc<Device>>>> {
        self.inner.store.subscribe_devices()
    }

    pub fn adapter(&self) -> SnapshotStream<Option<Arc<AdapterState>>> {
        self.inner.store.subscribe_adapter()
    }

    pub fn selection(&self) -> SnapshotStream<Option<InstanceId>> {
        self.inner.store.subscribe_selection()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::driver::sim::SimulatedDriver;

    async fn wait_for_tree(session: &Session) -> Arc<AttributeTree> {
        let mut stream = session.tree();
        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                let snap = stream.latest();
                if !snap.is_empty() {
                    return snap;
                }
                stream.changed().await.unwrap();
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn execute_before_attach_is_not_running() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);
        let err = session.execute(Command::ToggleAdvertising).await.unwrap_err();
        assert!(matches!(err, CoreError::NotRunning));
    }

    #[tokio::test]
    async fn attach_runs_driver_and_routes_commands() {
        let session = Session::new();
        session.attach(SimulatedDriver::new()).await.unwrap();
        assert_eq!(session.state(), SessionState::Running);

        let tree = wait_for_tree(&session).await;
        assert_eq!(tree.roots.len(), 3);

        let result = session.execute(Command::ToggleAdvertising).await.unwrap();
        assert_eq!(result, CommandResult::Advertising(true));

        session.shutdown().await;
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn state_updates_reach_subscribers_taken_after_attach() {
        // No stream exists while the state transitions happen; a late
        // subscriber must still observe the current state.
        let session = Session::new();
        session.attach(SimulatedDriver::new()).await.unwrap();

        let states = session.states();
        assert_eq!(*states.current(), SessionState::Running);

        wait_for_tree(&session).await;
        let result = session.execute(Command::ToggleAdvertising).await.unwrap();
        assert_eq!(result, CommandResult::Advertising(true));

        session.shutdown().await;
        assert_eq!(session.states().latest(), SessionState::Stopped);
    }

    #[tokio::test]
    async fn second_attach_is_rejected() {
        let session = Session::new();
        session.attach(SimulatedDriver::new()).await.unwrap();
        let err = session.attach(SimulatedDriver::new()).await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyAttached));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn execute_after_shutdown_is_not_running() {
        let session = Session::new();
        session.attach(SimulatedDriver::new()).await.unwrap();
        session.shutdown().await;
        let err = session.execute(Command::ToggleAdvertising).await.unwrap_err();
        assert!(matches!(err, CoreError::NotRunning));
    }
}
