//! Repeat scheduling for `repeatDelay` bindings.
//!
//! Each ticker runs `on_tick` after an initial delay and then on every interval until it is
//! stopped, replaced, its parent token is cancelled, it reaches its tick limit, or `on_tick`
//! returns `false`.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

struct TickerEntry {
    token: CancellationToken,
    generation: u64,
}

#[derive(Clone, Default)]
pub struct Ticker {
    entries: Arc<Mutex<HashMap<String, TickerEntry>>>,
    generations: Arc<AtomicU64>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a ticker is active for the given id.
    pub fn is_active(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Start or replace the ticker for `id`. Must be called within a tokio runtime.
    pub fn start<F>(&self, id: String, parent: &CancellationToken, initial: Duration, interval: Duration, limit: u32, mut on_tick: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.stop(&id);
        if limit == 0 {
            return;
        }

        let token = parent.child_token();
        let cancel = token.clone();
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let entries = Arc::clone(&self.entries);
        let id_for_task = id.clone();

        let fut = async move {
            trace!(ticker = %id_for_task, initial_ms = initial.as_millis() as u64, interval_ms = interval.as_millis() as u64, "ticker started");

            tokio::select! {
                _ = time::sleep(initial) => {}
                _ = cancel.cancelled() => {
                    trace!(ticker = %id_for_task, "ticker cancelled before first tick");
                    return;
                }
            }

            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut fired = 0u32;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        trace!(ticker = %id_for_task, fired, "ticker cancelled");
                        return;
                    }
                    _ = ticker.tick() => {
                        fired += 1;
                        if !on_tick() || fired >= limit {
                            break;
                        }
                    }
                }
            }

            // Finished on its own; forget the entry unless it has been replaced meanwhile.
            let mut entries = entries.lock();
            if entries.get(&id_for_task).is_some_and(|entry| entry.generation == generation) {
                entries.remove(&id_for_task);
            }
            trace!(ticker = %id_for_task, fired, "ticker exhausted");
        };

        self.entries.lock().insert(id, TickerEntry { token, generation });
        tokio::spawn(fut);
    }

    /// Stop a ticker if present.
    pub fn stop(&self, id: &str) {
        if let Some(entry) = self.entries.lock().remove(id) {
            entry.token.cancel();
            trace!(ticker = %id, "ticker stopped");
        }
    }

    /// Stop every ticker.
    pub fn clear(&self) {
        let entries: Vec<TickerEntry> = self.entries.lock().drain().map(|(_, entry)| entry).collect();
        for entry in entries {
            entry.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counting() -> (Arc<AtomicUsize>, impl FnMut() -> bool + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = Arc::clone(&count);
        (count, move || {
            tick_count.fetch_add(1, Ordering::SeqCst);
            true
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_initial_delay_then_every_interval() {
        let ticker = Ticker::new();
        let root = CancellationToken::new();
        let (count, on_tick) = counting();
        ticker.start("poll".into(), &root, Duration::from_millis(100), Duration::from_millis(100), 10, on_tick);

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        time::sleep(Duration::from_millis(260)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(ticker.is_active("poll"));

        ticker.stop("poll");
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!ticker.is_active("poll"));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_the_limit_and_on_parent_cancel() {
        let ticker = Ticker::new();
        let root = CancellationToken::new();
        let (limited, on_tick) = counting();
        ticker.start("limited".into(), &root, Duration::ZERO, Duration::from_millis(10), 2, on_tick);
        let (cancelled, on_tick) = counting();
        ticker.start("cancelled".into(), &root, Duration::from_millis(10), Duration::from_millis(10), 100, on_tick);

        time::sleep(Duration::from_millis(55)).await;
        assert_eq!(limited.load(Ordering::SeqCst), 2);
        assert!(!ticker.is_active("limited"));

        root.cancel();
        let seen = cancelled.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cancelled.load(Ordering::SeqCst), seen);
    }
}
