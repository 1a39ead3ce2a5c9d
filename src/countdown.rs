use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::runtime::QuizEvent;

/// Per-question countdown. Posts `QuizEvent::Tick` every period until it is
/// cancelled or dropped; dropping stops and joins the ticking thread.
#[derive(Debug)]
pub struct Countdown {
    generation: u64,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    pub fn start(generation: u64, period: Duration, tx: Sender<QuizEvent>) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::spawn(move || {
            let mut next = Instant::now() + period;
            loop {
                // unpark may arrive early or spuriously; sleep out the rest
                let now = Instant::now();
                if now < next {
                    thread::park_timeout(next - now);
                }
                if flag.load(Ordering::Acquire) {
                    break;
                }
                if Instant::now() < next {
                    continue;
                }
                next += period;
                trace!(generation, "tick");
                if tx.send(QuizEvent::Tick { generation }).is_err() {
                    break;
                }
            }
        });

        Self {
            generation,
            cancelled,
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel();
    }
}
