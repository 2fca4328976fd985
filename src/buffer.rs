use std::borrow::Cow;
use std::collections::TryReserveError;
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;

use bytemuck::Pod;

use crate::format::{AudioFormat, PacketDescriptor};
use crate::time::{SampleDuration, Span, Timestamp};

/// Independently owned copy of a batch of raw audio bytes, sized exactly to
/// its contents.
pub struct ByteBuffer {
    alloc: Box<[u8]>,
}

impl ByteBuffer {
    /// Returns `Ok(None)` for empty input, there is nothing to own.
    pub fn copy_from(bytes: &[u8]) -> Result<Option<Self>, TryReserveError> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let mut alloc = Vec::new();
        alloc.try_reserve_exact(bytes.len())?;
        alloc.extend_from_slice(bytes);

        Ok(Some(ByteBuffer { alloc: alloc.into_boxed_slice() }))
    }

    pub fn len(&self) -> usize {
        self.alloc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alloc.is_empty()
    }
}

impl Debug for ByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.len())
            .finish()
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.alloc
    }
}

/// Self describing unit of queued audio: raw bytes plus the format, packet
/// layout and timeline position needed to play them.
///
/// Immutable once built. The queue hands out `Arc<SampleBuffer>` so both of
/// its views can share one copy of the data.
#[derive(Debug)]
pub struct SampleBuffer {
    data: ByteBuffer,
    format: Arc<AudioFormat>,
    packets: Vec<PacketDescriptor>,
    frames: u64,
    span: Span,
}

impl SampleBuffer {
    pub(crate) fn new(
        data: ByteBuffer,
        format: Arc<AudioFormat>,
        packets: Vec<PacketDescriptor>,
        frames: u64,
        span: Span,
    ) -> Self {
        SampleBuffer { data, format, packets, frames, span }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    /// Empty when the data is a single undivided block.
    pub fn packets(&self) -> &[PacketDescriptor] {
        &self.packets
    }

    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    pub fn packet_data(&self, index: usize) -> Option<&[u8]> {
        let packet = self.packets.get(index)?;
        let start = usize::try_from(packet.offset).ok()?;
        let end = usize::try_from(packet.end()?).ok()?;
        self.data.get(start..end)
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn presentation_timestamp(&self) -> Timestamp {
        self.span.start()
    }

    pub fn duration(&self) -> SampleDuration {
        self.span.duration()
    }

    pub fn contains(&self, time: Timestamp) -> bool {
        self.span.contains(time)
    }

    /// Typed view of a pcm payload. Borrows when the allocation happens to be
    /// aligned for `T`, copies otherwise. `None` if the data isn't a whole
    /// number of `T`.
    pub fn samples<T: Pod>(&self) -> Option<Cow<'_, [T]>> {
        let size = std::mem::size_of::<T>();
        if size == 0 || self.data.len() % size != 0 {
            return None;
        }

        match bytemuck::try_cast_slice::<u8, T>(&self.data[..]) {
            Ok(samples) => Some(Cow::Borrowed(samples)),
            Err(_) => Some(Cow::Owned(bytemuck::allocation::pod_collect_to_vec(&self.data[..]))),
        }
    }
}
