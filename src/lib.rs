//! Thread safe, time ordered queue of audio sample buffers, staged between a
//! decoder and a playback consumer.

pub mod buffer;
pub mod config;
pub mod error;
pub mod factory;
pub mod format;
pub mod queue;
pub mod time;

pub use buffer::SampleBuffer;
pub use config::QueueConfig;
pub use error::{ConstructionStatus, Error, FormatError, Result};
pub use format::{AudioFormat, Encoding, FormatFlags, PacketDescriptor};
pub use queue::SampleBufferQueue;
pub use time::{SampleDuration, Span, Timestamp};
