//! Pending sample FIFO shared between the bus side and the control plane.
//!
//! All queue state lives behind a single mutex. The refill producer is taken
//! out of the queue and run with the lock released, so it may feed or query
//! the queue itself. Its output is appended before the operation that
//! triggered it returns.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::sample::Sample;

/// Producer invoked whenever the queue runs empty
pub type Refill = Box<dyn FnMut() -> Vec<Sample> + Send>;

#[derive(Default)]
struct Inner {
    samples: VecDeque<Sample>,
    refill: Option<Refill>,
    buffered: Option<Arc<[Sample]>>,
    // Bumped whenever the refill is replaced or dropped
    generation: u64,
    // Bumped on every clear
    epoch: u64,
}

/// A refill taken out of the queue to run unlocked
struct PendingRefill {
    producer: Refill,
    generation: u64,
    epoch: u64,
}

impl Inner {
    fn append(&mut self, samples: &[Sample], repeat: usize) {
        for _ in 0..repeat {
            self.samples.extend(samples.iter().copied());
        }
    }

    fn replace_refill(&mut self, refill: Option<Refill>) {
        self.generation = self.generation.wrapping_add(1);
        self.refill = refill;
    }

    fn feed_immediate(&mut self, samples: &[Sample], repeat: i32) {
        self.replace_refill(None);
        self.append(samples, repeat.max(0) as usize);
    }

    fn install_refill(&mut self, producer: Refill) -> Option<PendingRefill> {
        self.replace_refill(Some(producer));
        self.take_refill_if_empty()
    }

    fn take_refill_if_empty(&mut self) -> Option<PendingRefill> {
        if !self.samples.is_empty() {
            return None;
        }
        let producer = self.refill.take()?;
        Some(PendingRefill {
            producer,
            generation: self.generation,
            epoch: self.epoch,
        })
    }
}

/// Logically unbounded FIFO of samples waiting to be latched into the data registers
#[derive(Clone, Default)]
pub struct SampleQueue {
    inner: Arc<Mutex<Inner>>,
}

impl SampleQueue {
    pub fn new() -> Self {
        SampleQueue::default()
    }

    // Every mutation leaves `Inner` consistent, so a panic elsewhere does not
    // invalidate it.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_refill(&self, pending: PendingRefill) {
        let PendingRefill {
            mut producer,
            generation,
            epoch,
        } = pending;
        let samples = producer();

        let mut inner = self.lock();
        // A clear while the producer ran discards its output
        if inner.epoch == epoch {
            log::trace!("Queue emptied, refilled with {} samples", samples.len());
            inner.samples.extend(samples);
        }
        // Only restore the producer if nothing replaced it meanwhile
        if inner.generation == generation {
            inner.refill = Some(producer);
        }
    }

    /// Drop any refill, then append `samples` `repeat` times
    pub fn feed_immediate(&self, samples: &[Sample], repeat: i32) {
        self.lock().feed_immediate(samples, repeat);
    }

    /// Install `producer` as the refill. It runs right away if the queue is
    /// already empty, and afterwards on every pop that empties the queue.
    pub fn install_refill<F>(&self, producer: F)
    where
        F: FnMut() -> Vec<Sample> + Send + 'static,
    {
        let pending = self.lock().install_refill(Box::new(producer));
        if let Some(pending) = pending {
            self.run_refill(pending);
        }
    }

    /// Record `samples` as the buffered source and feed them, all under one
    /// lock. `repeat <= 0` streams them, anything else queues `repeat` copies.
    pub fn feed_buffered(&self, samples: Arc<[Sample]>, repeat: i32) {
        let pending = {
            let mut inner = self.lock();
            inner.buffered = Some(samples.clone());
            if repeat <= 0 {
                inner.install_refill(Box::new(move || samples.to_vec()))
            } else {
                inner.feed_immediate(&samples, repeat);
                None
            }
        };
        if let Some(pending) = pending {
            self.run_refill(pending);
        }
    }

    /// Remove the head sample
    pub fn pop_one(&self) -> Option<Sample> {
        self.pop_with(|_| ())
    }

    /// Remove the head sample and hand it to `consume`. If that empties the
    /// queue the refill runs after `consume` returns.
    pub fn pop_with<F: FnOnce(Sample)>(&self, consume: F) -> Option<Sample> {
        let (sample, pending) = {
            let mut inner = self.lock();
            let sample = inner.samples.pop_front()?;
            (sample, inner.take_refill_if_empty())
        };

        consume(sample);
        if let Some(pending) = pending {
            self.run_refill(pending);
        }
        Some(sample)
    }

    pub fn depth(&self) -> usize {
        self.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth() == 0
    }

    pub fn has_refill(&self) -> bool {
        self.lock().refill.is_some()
    }

    /// Samples most recently loaded from a sample source
    pub fn buffered(&self) -> Option<Arc<[Sample]>> {
        self.lock().buffered.clone()
    }

    /// Drop pending samples, the refill and the buffered source
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.replace_refill(None);
        inner.epoch = inner.epoch.wrapping_add(1);
        inner.samples.clear();
        inner.buffered = None;
    }
}

impl fmt::Debug for SampleQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("SampleQueue")
            .field("depth", &inner.samples.len())
            .field("refill", &inner.refill.is_some())
            .field("buffered", &inner.buffered.as_ref().map(|b| b.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    fn sample(v: i16) -> Sample {
        Sample::new(v, v, v)
    }

    #[test]
    fn pops_in_fifo_order() {
        let queue = SampleQueue::new();
        queue.feed_immediate(&[sample(1), sample(2)], 2);
        assert_eq!(queue.depth(), 4);

        let popped: Vec<_> = std::iter::from_fn(|| queue.pop_one()).collect();
        assert_eq!(popped, vec![sample(1), sample(2), sample(1), sample(2)]);
        assert!(queue.is_empty());
        assert_eq!(queue.pop_one(), None);
    }

    #[test]
    fn non_positive_repeat_appends_nothing() {
        let queue = SampleQueue::new();
        queue.feed_immediate(&[sample(1)], 0);
        queue.feed_immediate(&[sample(1)], -3);
        assert!(queue.is_empty());
    }

    #[test]
    fn refill_runs_on_install_when_empty() {
        let queue = SampleQueue::new();
        queue.install_refill(|| vec![sample(7)]);
        assert_eq!(queue.depth(), 1);
        assert!(queue.has_refill());
    }

    #[test]
    fn refill_waits_for_empty_transition() {
        let calls = Arc::new(AtomicUsize::new(0));
        let queue = SampleQueue::new();
        queue.feed_immediate(&[sample(1), sample(2)], 1);

        let counter = calls.clone();
        queue.install_refill(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec![sample(9)]
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(queue.pop_one(), Some(sample(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(queue.pop_one(), Some(sample(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(queue.depth(), 1);

        assert_eq!(queue.pop_one(), Some(sample(9)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_refill_does_not_fire_again_without_transition() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let queue = SampleQueue::new();
        queue.install_refill(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(queue.pop_one(), None);
        assert_eq!(queue.pop_one(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn feed_immediate_drops_refill() {
        let queue = SampleQueue::new();
        queue.install_refill(|| vec![sample(1)]);
        queue.feed_immediate(&[sample(2)], 1);
        assert!(!queue.has_refill());

        assert_eq!(queue.pop_one(), Some(sample(1)));
        assert_eq!(queue.pop_one(), Some(sample(2)));
        assert_eq!(queue.pop_one(), None);
    }

    #[test]
    fn clear_resets_everything() {
        let queue = SampleQueue::new();
        queue.feed_buffered(Arc::from(vec![sample(3)]), 0);
        queue.clear();

        assert!(queue.is_empty());
        assert!(!queue.has_refill());
        assert!(queue.buffered().is_none());
    }

    #[test]
    fn clones_share_state() {
        let queue = SampleQueue::new();
        let other = queue.clone();
        other.feed_immediate(&[sample(5)], 3);
        assert_eq!(queue.depth(), 3);
    }

    // Runs `f` on a worker thread and fails instead of hanging if it never returns
    fn within_timeout<F: FnOnce() + Send + 'static>(f: F) {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            f();
            let _ = tx.send(());
        });
        rx.recv_timeout(Duration::from_secs(5))
            .expect("queue operation did not return");
    }

    #[test]
    fn refill_may_feed_the_queue_itself() {
        let queue = SampleQueue::new();
        let handle = queue.clone();
        let inner = queue.clone();
        within_timeout(move || {
            handle.install_refill(move || {
                inner.feed_immediate(&[sample(1)], 1);
                Vec::new()
            });
        });

        assert_eq!(queue.depth(), 1);
        // feed_immediate inside the producer cancelled streaming
        assert!(!queue.has_refill());
        assert_eq!(queue.pop_one(), Some(sample(1)));
        assert_eq!(queue.pop_one(), None);
    }

    #[test]
    fn refill_may_query_and_reinstall() {
        let queue = SampleQueue::new();
        queue.feed_immediate(&[sample(1)], 1);

        let inner = queue.clone();
        queue.install_refill(move || {
            assert_eq!(inner.depth(), 0);
            let _ = format!("{inner:?}");
            vec![sample(2)]
        });

        let handle = queue.clone();
        within_timeout(move || {
            assert_eq!(handle.pop_one(), Some(sample(1)));
        });
        assert_eq!(queue.depth(), 1);
        assert!(queue.has_refill());

        let inner = queue.clone();
        queue.feed_immediate(&[], 1);
        queue.install_refill(move || {
            inner.install_refill(|| vec![sample(4)]);
            vec![sample(3)]
        });
        let handle = queue.clone();
        within_timeout(move || {
            assert_eq!(handle.pop_one(), Some(sample(2)));
        });
        // The nested install filled the empty queue first, then the outer output landed
        let popped: Vec<_> = (0..2).filter_map(|_| queue.pop_one()).collect();
        assert_eq!(popped, vec![sample(4), sample(3)]);
        // The nested producer replaced the outer one
        assert_eq!(queue.pop_one(), Some(sample(4)));
    }

    #[test]
    fn refill_runs_after_consumer() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let queue = SampleQueue::new();
        queue.feed_immediate(&[sample(1)], 1);

        let log = events.clone();
        queue.install_refill(move || {
            log.lock().unwrap().push("refill");
            vec![sample(2)]
        });

        let log = events.clone();
        let popped = queue.pop_with(|s| {
            assert_eq!(s, sample(1));
            log.lock().unwrap().push("latched");
        });

        assert_eq!(popped, Some(sample(1)));
        assert_eq!(*events.lock().unwrap(), vec!["latched", "refill"]);
        assert_eq!(queue.depth(), 1);
    }

    #[test]
    fn clear_while_refilling_discards_output() {
        let queue = SampleQueue::new();
        let inner = queue.clone();
        queue.install_refill(move || {
            inner.clear();
            vec![sample(1)]
        });

        assert!(queue.is_empty());
        assert!(!queue.has_refill());
    }

    #[test]
    fn feed_buffered_records_source() {
        let queue = SampleQueue::new();
        queue.feed_buffered(Arc::from(vec![sample(1), sample(2)]), 2);
        assert_eq!(queue.depth(), 4);
        assert_eq!(queue.buffered().unwrap().len(), 2);
        assert!(!queue.has_refill());

        queue.feed_buffered(Arc::from(vec![sample(3)]), 0);
        assert!(queue.has_refill());
        assert_eq!(&*queue.buffered().unwrap(), &[sample(3)]);
    }
}
