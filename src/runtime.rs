use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use tracing::warn;

use crate::loader::LoadError;
use crate::question::Question;

/// Unified event type consumed by the app
#[derive(Clone, Debug)]
pub enum QuizEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// One second elapsed on the countdown armed for `generation`
    Tick { generation: u64 },
    /// A quiz set fetch finished
    Loaded {
        request: u64,
        outcome: Result<Vec<Question>, LoadError>,
    },
    /// Terminal input can no longer be read
    InputClosed,
}

/// Source of app events
pub trait QuizEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError>;
}

/// Event source fed through an mpsc channel. Terminal input, countdowns and
/// loaders all post into the sending half.
pub struct ChannelEventSource {
    rx: Receiver<QuizEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<QuizEvent>) -> Self {
        Self { rx }
    }
}

impl QuizEventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<QuizEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forward crossterm key, left-click and resize events into `tx`
pub fn spawn_terminal_reader(tx: Sender<QuizEvent>) {
    std::thread::spawn(move || forward_terminal_events(event::read, &tx));
}

/// Pump `read` into `tx` until reading fails or the app hangs up. A read
/// failure is reported as `InputClosed`.
pub fn forward_terminal_events<F>(mut read: F, tx: &Sender<QuizEvent>)
where
    F: FnMut() -> io::Result<CtEvent>,
{
    loop {
        let ev = match read() {
            Ok(CtEvent::Key(key)) => QuizEvent::Key(key),
            Ok(CtEvent::Mouse(m)) if m.kind == MouseEventKind::Down(MouseButton::Left) => {
                QuizEvent::Mouse(m)
            }
            Ok(CtEvent::Resize(_, _)) => QuizEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "terminal input stopped");
                let _ = tx.send(QuizEvent::InputClosed);
                return;
            }
        };
        if tx.send(ev).is_err() {
            return;
        }
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that hands the app one event at a time
pub struct Runner<E: QuizEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: QuizEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the ticker interval; None when nothing arrived
    pub fn step(&self) -> Option<QuizEvent> {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
