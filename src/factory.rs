//! Builds sample buffers from raw packet bytes.
//!
//! Construction takes the presentation timestamp as an argument rather than
//! reading it from the queue, so it can run (and be tested) on its own.

use std::sync::Arc;

use crate::buffer::{ByteBuffer, SampleBuffer};
use crate::error::{ConstructionStatus, Error};
use crate::format::{AudioFormat, PacketDescriptor};
use crate::time::{SampleDuration, Span, Timestamp};

/// Copies `raw` into a new buffer stamped at `timestamp`.
///
/// Empty input produces `Ok(None)`: there is no buffer to build, and that is
/// not an error. With no `packets` the bytes are treated as one undivided
/// block and the frame count is derived from the format.
pub fn construct(
    raw: &[u8],
    packets: &[PacketDescriptor],
    timestamp: Timestamp,
    format: &Arc<AudioFormat>,
) -> Result<Option<SampleBuffer>, Error> {
    let Some(data) = ByteBuffer::copy_from(raw)? else {
        return Ok(None);
    };

    let frames = frame_count(data.len(), packets, format)?;

    let span = Span::new(timestamp, SampleDuration::from_frames(frames))
        .ok_or(ConstructionStatus::TimestampOverflow)?;

    let mut layout = Vec::new();
    layout.try_reserve_exact(packets.len())?;
    layout.extend_from_slice(packets);

    Ok(Some(SampleBuffer::new(data, Arc::clone(format), layout, frames, span)))
}

fn frame_count(
    len: usize,
    packets: &[PacketDescriptor],
    format: &AudioFormat,
) -> Result<u64, ConstructionStatus> {
    if packets.is_empty() {
        return block_frame_count(len, format);
    }

    let len = len as u64;
    let mut total = 0u64;

    for (index, packet) in packets.iter().enumerate() {
        if packet.end().map_or(true, |end| end > len) {
            log::warn!("packet {index} at offset {} (length {}) exceeds {len} bytes of raw data",
                packet.offset, packet.length);
            return Err(ConstructionStatus::PacketOutOfBounds);
        }

        let frames = match packet.frames {
            0 => format.frames_per_packet,
            frames => frames,
        };

        if frames == 0 {
            log::warn!("packet {index} has no frame count and {} packets are variable length",
                format.encoding);
            return Err(ConstructionStatus::UnknownFrameCount);
        }

        total = total.checked_add(u64::from(frames))
            .ok_or(ConstructionStatus::TimestampOverflow)?;
    }

    Ok(total)
}

fn block_frame_count(len: usize, format: &AudioFormat) -> Result<u64, ConstructionStatus> {
    let len = len as u64;

    if format.is_pcm() {
        let frame_size = u64::from(format.bytes_per_frame());

        if frame_size == 0 {
            return Err(ConstructionStatus::UnknownFrameCount);
        }

        if len % frame_size != 0 {
            return Err(ConstructionStatus::PartialFrame);
        }

        return Ok(len / frame_size);
    }

    // constant bitrate encodings: every packet is the same size and length
    let packet_size = u64::from(format.bytes_per_packet);
    let packet_frames = u64::from(format.frames_per_packet);

    if packet_size == 0 || packet_frames == 0 {
        return Err(ConstructionStatus::UnknownFrameCount);
    }

    if len % packet_size != 0 {
        return Err(ConstructionStatus::PartialFrame);
    }

    (len / packet_size).checked_mul(packet_frames)
        .ok_or(ConstructionStatus::TimestampOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Encoding;

    fn stereo_f32() -> Arc<AudioFormat> {
        Arc::new(AudioFormat::pcm_f32(44100, 2))
    }

    #[test]
    fn empty_input_builds_nothing() {
        let buffer = construct(&[], &[], Timestamp::ZERO, &stereo_f32()).unwrap();
        assert!(buffer.is_none());
    }

    #[test]
    fn pcm_block_derives_frames_from_length() {
        let raw = vec![0u8; 4410 * 8];
        let ts = Timestamp::from_frames(123);

        let buffer = construct(&raw, &[], ts, &stereo_f32()).unwrap().unwrap();

        assert_eq!(buffer.frame_count(), 4410);
        assert_eq!(buffer.presentation_timestamp(), ts);
        assert_eq!(buffer.duration(), SampleDuration::from_frames(4410));
        assert_eq!(buffer.data().len(), raw.len());
        assert_eq!(buffer.packet_count(), 0);
    }

    #[test]
    fn pcm_block_rejects_partial_frame() {
        let err = construct(&[0u8; 12], &[], Timestamp::ZERO, &stereo_f32()).unwrap_err();
        assert_eq!(err.code(), Some(ConstructionStatus::PartialFrame.code()));
    }

    #[test]
    fn descriptors_sum_frames() {
        let format = Arc::new(AudioFormat::compressed(Encoding::Opus, 48000, 2, 960));
        let packets = [
            PacketDescriptor::new(0, 40, 0),
            PacketDescriptor::new(40, 60, 480),
            PacketDescriptor::new(100, 20, 0),
        ];

        let buffer = construct(&[0u8; 120], &packets, Timestamp::ZERO, &format).unwrap().unwrap();

        assert_eq!(buffer.frame_count(), 960 + 480 + 960);
        assert_eq!(buffer.packets(), &packets);
        assert_eq!(buffer.packet_data(1).map(<[u8]>::len), Some(60));
    }

    #[test]
    fn descriptor_out_of_bounds() {
        let format = Arc::new(AudioFormat::compressed(Encoding::Aac, 44100, 2, 1024));
        let packets = [PacketDescriptor::new(0, 50, 0), PacketDescriptor::new(50, 51, 0)];

        let err = construct(&[0u8; 100], &packets, Timestamp::ZERO, &format).unwrap_err();

        assert!(matches!(err, Error::Construction { status: ConstructionStatus::PacketOutOfBounds, .. }));
    }

    #[test]
    fn variable_packets_need_frame_counts() {
        let format = Arc::new(AudioFormat::compressed(Encoding::Flac, 44100, 2, 0));

        let err = construct(&[0u8; 100], &[], Timestamp::ZERO, &format).unwrap_err();
        assert!(matches!(err, Error::Construction { status: ConstructionStatus::UnknownFrameCount, .. }));

        let err = construct(&[0u8; 100], &[PacketDescriptor::new(0, 100, 0)], Timestamp::ZERO, &format)
            .unwrap_err();
        assert!(matches!(err, Error::Construction { status: ConstructionStatus::UnknownFrameCount, .. }));
    }

    #[test]
    fn constant_bitrate_block() {
        let mut format = AudioFormat::compressed(Encoding::Other(0x696d_6134), 44100, 2, 64);
        format.bytes_per_packet = 68;
        let format = Arc::new(format);

        let buffer = construct(&[0u8; 68 * 3], &[], Timestamp::ZERO, &format).unwrap().unwrap();
        assert_eq!(buffer.frame_count(), 64 * 3);
    }

    #[test]
    fn timestamp_overflow_is_an_error() {
        let ts = Timestamp::from_frames(u64::MAX - 1);
        let err = construct(&[0u8; 16], &[], ts, &stereo_f32()).unwrap_err();

        assert_eq!(err.code(), Some(ConstructionStatus::TimestampOverflow.code()));
    }
}
