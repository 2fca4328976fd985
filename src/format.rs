use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::error::{Error, FormatError};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    #[display(fmt = "lpcm")]
    LinearPcm,
    #[display(fmt = "opus")]
    Opus,
    #[display(fmt = "aac")]
    Aac,
    #[display(fmt = "flac")]
    Flac,
    /// Four character code of an encoding we don't know about
    #[display(fmt = "{:08x}", _0)]
    Other(u32),
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FormatFlags: u32 {
        const FLOAT = 1 << 0;
        const BIG_ENDIAN = 1 << 1;
        const SIGNED_INTEGER = 1 << 2;
        const PACKED = 1 << 3;
        const NON_INTERLEAVED = 1 << 5;
    }
}

/// Describes every buffer produced by one queue. Never changes once the
/// queue has been built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    #[serde(default)]
    pub bits_per_channel: u16,
    pub encoding: Encoding,
    #[serde(default)]
    pub flags: FormatFlags,
    /// Zero for variable bitrate encodings.
    #[serde(default)]
    pub bytes_per_packet: u32,
    /// Zero when packets carry a variable number of frames.
    #[serde(default)]
    pub frames_per_packet: u32,
}

impl AudioFormat {
    pub fn pcm_f32(sample_rate: u32, channels: u16) -> Self {
        AudioFormat::pcm(sample_rate, channels, 32, FormatFlags::FLOAT)
    }

    pub fn pcm_i16(sample_rate: u32, channels: u16) -> Self {
        AudioFormat::pcm(sample_rate, channels, 16, FormatFlags::SIGNED_INTEGER)
    }

    fn pcm(sample_rate: u32, channels: u16, bits: u16, flags: FormatFlags) -> Self {
        AudioFormat {
            sample_rate,
            channels,
            bits_per_channel: bits,
            encoding: Encoding::LinearPcm,
            flags: flags | FormatFlags::PACKED,
            bytes_per_packet: u32::from(bits / 8) * u32::from(channels),
            frames_per_packet: 1,
        }
    }

    pub fn compressed(encoding: Encoding, sample_rate: u32, channels: u16, frames_per_packet: u32) -> Self {
        AudioFormat {
            sample_rate,
            channels,
            bits_per_channel: 0,
            encoding,
            flags: FormatFlags::empty(),
            bytes_per_packet: 0,
            frames_per_packet,
        }
    }

    pub fn is_pcm(&self) -> bool {
        self.encoding == Encoding::LinearPcm
    }

    /// Size of one interleaved frame, or zero if the encoding doesn't have
    /// fixed size frames.
    pub fn bytes_per_frame(&self) -> u32 {
        if !self.is_pcm() {
            return 0;
        }

        u32::from(self.bits_per_channel / 8) * u32::from(self.channels)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate.into());
        }

        if self.channels == 0 {
            return Err(FormatError::ZeroChannels.into());
        }

        if self.is_pcm() && (self.bits_per_channel == 0 || self.bits_per_channel % 8 != 0) {
            return Err(FormatError::BitDepth(self.bits_per_channel).into());
        }

        Ok(())
    }
}

/// Locates one encoded packet inside a batch of raw bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct PacketDescriptor {
    pub offset: u64,
    pub length: u32,
    /// Zero means the format's constant `frames_per_packet` applies.
    pub frames: u32,
}

static_assertions::assert_eq_size!(PacketDescriptor, [u8; 16]);

impl PacketDescriptor {
    pub fn new(offset: u64, length: u32, frames: u32) -> Self {
        PacketDescriptor { offset, length, frames }
    }

    /// Reads a table of native endian descriptors as handed over by a demuxer.
    pub fn from_bytes(bytes: &[u8]) -> Option<Vec<PacketDescriptor>> {
        if bytes.len() % std::mem::size_of::<PacketDescriptor>() != 0 {
            return None;
        }

        Some(bytemuck::allocation::pod_collect_to_vec(bytes))
    }

    pub fn end(&self) -> Option<u64> {
        self.offset.checked_add(u64::from(self.length))
    }
}
