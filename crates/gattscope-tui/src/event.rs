//! Terminal input pump.
//!
//! A background task merges crossterm's event stream with the tick and
//! render clocks into one channel the app loop consumes. Resize events
//! are coalesced: a drag-resize produces a burst of geometry changes,
//! but only the latest one matters and only right before the frame that
//! uses it, so the pump holds the most recent size and flushes it ahead
//! of the next `Render`.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// Everything that can wake the app loop.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Latest terminal geometry (cols, rows). Coalesced: delivered at
    /// most once per render frame.
    Resize(u16, u16),
    /// Housekeeping clock (toast expiry and the like).
    Tick,
    /// Frame clock.
    Render,
}

/// Handle to the background input pump.
pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(tick_rate: Duration, render_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let pump = Pump {
            tx,
            cancel: cancel.clone(),
            tick_rate,
            render_rate,
        };
        tokio::spawn(pump.run());
        Self { rx, cancel }
    }

    /// Next event, or `None` once the pump has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Pump {
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
    tick_rate: Duration,
    render_rate: Duration,
}

impl Pump {
    async fn run(self) {
        let mut terminal_events = EventStream::new();

        // Skip missed ticks instead of bursting to catch up.
        let mut tick = interval(self.tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut render = interval(self.render_rate);
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            let alive = tokio::select! {
                () = self.cancel.cancelled() => break,

                _ = tick.tick() => self.emit(Event::Tick),

                _ = render.tick() => {
                    // Flush the newest geometry before the frame that
                    // will lay out against it.
                    match pending_resize.take() {
                        Some((w, h)) => {
                            self.emit(Event::Resize(w, h)) && self.emit(Event::Render)
                        }
                        None => self.emit(Event::Render),
                    }
                }

                Some(Ok(event)) = terminal_events.next() => match event {
                    // Repeats drive held-key tree navigation; releases
                    // carry nothing we act on.
                    CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                        self.emit(Event::Key(key))
                    }
                    CrosstermEvent::Mouse(mouse) => self.emit(Event::Mouse(mouse)),
                    CrosstermEvent::Resize(w, h) => {
                        pending_resize = Some((w, h));
                        true
                    }
                    _ => true,
                },
            };

            if !alive {
                break;
            }
        }
    }

    /// False once the app side has dropped the receiver.
    fn emit(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }
}
