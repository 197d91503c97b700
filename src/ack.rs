//! Batched acknowledgment tracking for processed messages.
//!
//! Sources that deliver messages in bulk want acknowledgments back in
//! bulk: the tracker accumulates per-message acks and hands the whole
//! batch to a callback either when `batch_size` acks are pending or when
//! `timeout` has elapsed since the oldest pending one. Each batch reaches
//! the callback exactly once and is cleared afterwards.
//!
//! The tracker has no thread or timer of its own; it belongs to whatever
//! loop drives the source. That loop calls [`BatchedAckTracker::ack`] as
//! messages complete and [`BatchedAckTracker::flush_expired`] on its tick,
//! using [`BatchedAckTracker::deadline`] to know when the next tick is
//! due. This component shares no code with the call-binding layer.

use std::time::{Duration, Instant};

/// Invoked once per full batch with every pending acknowledgment
pub type OnBatchAcked<R> = Box<dyn FnMut(Vec<R>)>;

pub struct BatchedAckTracker<R> {
    source: String,
    timeout: Duration,
    batch_size: usize,
    pending: Vec<R>,
    /// Arrival time of the oldest pending ack; None while the batch is empty
    oldest: Option<Instant>,
    on_batch_acked: OnBatchAcked<R>,
}

impl<R> BatchedAckTracker<R> {
    /// `batch_size` must be at least 1; a zero size would make every ack
    /// flush immediately, which callers express with `batch_size = 1`.
    pub fn new(
        source: impl Into<String>,
        timeout: Duration,
        batch_size: usize,
        on_batch_acked: OnBatchAcked<R>,
    ) -> Self {
        assert!(batch_size > 0, "batch_size must be at least 1");
        BatchedAckTracker {
            source: source.into(),
            timeout,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            oldest: None,
            on_batch_acked,
        }
    }

    /// Name of the source this tracker acknowledges for
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// When the currently pending batch must be flushed even if it never
    /// fills up. None while nothing is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.oldest.map(|oldest| oldest + self.timeout)
    }

    /// Record one acknowledgment; flushes if this fills the batch
    pub fn ack(&mut self, record: R) {
        if self.pending.is_empty() {
            self.oldest = Some(Instant::now());
        }
        self.pending.push(record);

        if self.pending.len() >= self.batch_size {
            self.flush();
        }
    }

    /// Flush a partial batch whose oldest ack has waited `timeout` or
    /// longer. Returns whether a flush happened.
    pub fn flush_expired(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.flush();
                true
            }
            _ => false,
        }
    }

    fn flush(&mut self) {
        let batch = std::mem::take(&mut self.pending);
        self.oldest = None;
        (self.on_batch_acked)(batch);
    }
}

impl<R> Drop for BatchedAckTracker<R> {
    /// Whatever is still pending when the source goes away is handed over
    /// as a final short batch
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            self.flush();
        }
    }
}
