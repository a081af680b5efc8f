//! Control-plane access to the model's sample queue.
//!
//! A [SampleFeeder] is handed to simulation scripting running beside the bus
//! transport. A positive `repeat` queues that many copies right away and
//! cancels any streaming; `repeat <= 0` arms continuous playback, re-queueing
//! the same data every time the device drains it.

use std::path::Path;
use std::sync::Arc;

use crate::error::Error;
use crate::fifo::SampleQueue;
use crate::loader;
use crate::sample::Sample;

#[derive(Clone, Debug)]
pub struct SampleFeeder {
    queue: SampleQueue,
}

impl SampleFeeder {
    pub(crate) fn new(queue: SampleQueue) -> Self {
        SampleFeeder { queue }
    }

    /// Feed a single reading
    pub fn feed_sample(&self, x: i16, y: i16, z: i16, repeat: i32) {
        let sample = Sample::new(x, y, z);
        log::debug!("Feeding sample {sample} with repeat {repeat}");
        if repeat <= 0 {
            self.queue.install_refill(move || vec![sample]);
        } else {
            self.queue.feed_immediate(&[sample], repeat);
        }
    }

    /// Feed an ordered sequence of readings
    pub fn feed_samples<S: Into<Arc<[Sample]>>>(&self, samples: S, repeat: i32) {
        let samples: Arc<[Sample]> = samples.into();
        log::debug!("Feeding {} samples with repeat {repeat}", samples.len());
        if repeat <= 0 {
            self.queue.install_refill(move || samples.to_vec());
        } else {
            self.queue.feed_immediate(&samples, repeat);
        }
    }

    /// Parse the sample file at `path` and feed its contents.
    ///
    /// A malformed file is logged and returned as an error; the queue, the
    /// installed refill and the previously buffered samples are left as they were.
    pub fn feed_samples_from_file<P: AsRef<Path>>(&self, path: P, repeat: i32) -> Result<(), Error> {
        let path = path.as_ref();
        let samples: Arc<[Sample]> = match loader::load_samples(path) {
            Ok(samples) => samples.into(),
            Err(e) => {
                log::error!("Failed to load samples from {}: {e}", path.display());
                return Err(e);
            }
        };

        log::debug!("Feeding {} samples from {} with repeat {repeat}", samples.len(), path.display());
        self.queue.feed_buffered(samples, repeat);
        Ok(())
    }

    /// Samples most recently loaded through [SampleFeeder::feed_samples_from_file]
    pub fn buffered_samples(&self) -> Option<Arc<[Sample]>> {
        self.queue.buffered()
    }

    /// Number of samples waiting, uncapped
    pub fn pending(&self) -> usize {
        self.queue.depth()
    }

    pub fn is_streaming(&self) -> bool {
        self.queue.has_refill()
    }

    /// Drop everything queued and stop any streaming
    pub fn clear(&self) {
        self.queue.clear();
    }
}
