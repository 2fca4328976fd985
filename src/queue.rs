use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer::SampleBuffer;
use crate::config::QueueConfig;
use crate::error::Error;
use crate::factory;
use crate::format::{AudioFormat, PacketDescriptor};
use crate::time::{SampleDuration, Timestamp};

/// Time ordered queue of sample buffers with two views over the same data:
///
/// - `pending`, a FIFO drained by the playback consumer
/// - `archive`, every buffer ever enqueued, looked up and evicted by time
///
/// Each view has its own lock and they only change together in
/// [`enqueue`](Self::enqueue) and [`remove_all`](Self::remove_all).
///
/// Producers are serialised on the cursor lock, which is held while the new
/// buffer is built. More than one producer is safe, but their batches land in
/// whatever order they win the lock. Consumers never touch the cursor lock.
///
/// Lock order is cursor, archive, pending.
pub struct SampleBufferQueue {
    format: Arc<AudioFormat>,
    cursor: Mutex<Timestamp>,
    archive: Mutex<Vec<Arc<SampleBuffer>>>,
    pending: Mutex<VecDeque<Arc<SampleBuffer>>>,
}

static_assertions::assert_impl_all!(SampleBufferQueue: Send, Sync);

impl SampleBufferQueue {
    pub fn new(format: AudioFormat) -> Result<Self, Error> {
        SampleBufferQueue::with_config(QueueConfig::new(format))
    }

    pub fn with_config(config: QueueConfig) -> Result<Self, Error> {
        config.format.validate()?;

        log::debug!(
            "creating sample queue: {} {}Hz x{}",
            config.format.encoding,
            config.format.sample_rate,
            config.format.channels,
        );

        let mut archive = Vec::new();
        archive.try_reserve(config.initial_capacity)?;

        let mut pending = VecDeque::new();
        pending.try_reserve(config.initial_capacity)?;

        Ok(SampleBufferQueue {
            format: Arc::new(config.format),
            cursor: Mutex::new(Timestamp::ZERO),
            archive: Mutex::new(archive),
            pending: Mutex::new(pending),
        })
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Presentation timestamp the next enqueued buffer will get
    pub fn cursor(&self) -> Timestamp {
        *self.cursor.lock()
    }

    /// Builds a buffer from one packet batch and appends it to both views.
    ///
    /// Empty input is a no-op. On error nothing is mutated and the cursor
    /// stays where it was.
    pub fn enqueue(&self, raw: &[u8], packets: &[PacketDescriptor]) -> Result<(), Error> {
        let mut cursor = self.cursor.lock();

        let buffer = match factory::construct(raw, packets, *cursor, &self.format) {
            Ok(Some(buffer)) => Arc::new(buffer),
            Ok(None) => {
                log::trace!("empty packet batch at {}, nothing to enqueue", *cursor);
                return Ok(());
            }
            Err(e) => {
                log::warn!("dropping packet batch at {}: {e}", *cursor);
                return Err(e);
            }
        };

        let mut archive = self.archive.lock();
        let mut pending = self.pending.lock();

        // reserve up front so the pushes below can't fail halfway
        archive.try_reserve(1)?;
        pending.try_reserve(1)?;

        *cursor = buffer.span().end();
        archive.push(Arc::clone(&buffer));
        pending.push_back(Arc::clone(&buffer));

        log::debug!(
            "enqueued {} frames at {}, {} pending",
            buffer.frame_count(),
            buffer.presentation_timestamp(),
            pending.len(),
        );

        Ok(())
    }

    /// Oldest buffer not yet dequeued
    pub fn peek(&self) -> Option<Arc<SampleBuffer>> {
        let buffer = self.pending.lock().front().cloned();

        if let Some(buffer) = &buffer {
            log::trace!("peeked buffer at {}", buffer.presentation_timestamp());
        }

        buffer
    }

    pub fn dequeue(&self) -> Option<Arc<SampleBuffer>> {
        let buffer = self.pending.lock().pop_front();

        if let Some(buffer) = &buffer {
            log::trace!("dequeued buffer at {}", buffer.presentation_timestamp());
        }

        buffer
    }

    pub fn remove_first(&self) {
        let _ = self.dequeue();
    }

    /// True when nothing is pending. Says nothing about the archive.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn archived_len(&self) -> usize {
        self.archive.lock().len()
    }

    /// Total playback time still waiting in the FIFO
    pub fn pending_duration(&self) -> SampleDuration {
        self.pending.lock()
            .iter()
            .fold(SampleDuration::zero(), |total, buffer| total + buffer.duration())
    }

    /// Archived buffer whose span contains `time`, whether or not it has
    /// been dequeued.
    pub fn buffer_at(&self, time: Timestamp) -> Option<Arc<SampleBuffer>> {
        let archive = self.archive.lock();

        // archive is time ordered with non overlapping spans, so span ends
        // are non decreasing
        let idx = archive.partition_point(|buffer| buffer.span().end() <= time);

        let buffer = archive.get(idx)
            .filter(|buffer| buffer.contains(time))
            .cloned();

        log::trace!("lookup at {time}: {}", if buffer.is_some() { "hit" } else { "miss" });

        buffer
    }

    /// Evicts every archived buffer whose span contains `time`. Pending
    /// buffers stay dequeueable. Returns how many were removed.
    pub fn remove_at(&self, time: Timestamp) -> usize {
        let mut archive = self.archive.lock();
        let before = archive.len();

        archive.retain(|buffer| !buffer.contains(time));

        let removed = before - archive.len();
        if removed > 0 {
            log::debug!("removed {removed} archived buffer(s) at {time}");
        }

        removed
    }

    /// Clears both views and rewinds the cursor to zero.
    pub fn remove_all(&self) {
        let mut cursor = self.cursor.lock();
        let mut archive = self.archive.lock();
        let mut pending = self.pending.lock();

        log::debug!("clearing sample queue: {} archived, {} pending", archive.len(), pending.len());

        archive.clear();
        pending.clear();
        *cursor = Timestamp::ZERO;
    }
}
