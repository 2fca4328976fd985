use std::collections::TryReserveError;

use derive_more::{Display, From};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display(fmt = "failed to allocate sample buffer: {}", _0)]
    Allocation(TryReserveError),
    #[display(fmt = "failed to construct sample buffer: {} (code {})", status, code)]
    #[from(ignore)]
    Construction { status: ConstructionStatus, code: i32 },
    #[display(fmt = "invalid audio format: {}", _0)]
    InvalidFormat(FormatError),
    #[display(fmt = "invalid queue config: {}", _0)]
    Config(toml::de::Error),
}

impl Error {
    /// Raw failure code of a construction error
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Construction { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<ConstructionStatus> for Error {
    fn from(status: ConstructionStatus) -> Self {
        Error::Construction { status, code: status.code() }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Allocation(e) => Some(e),
            Error::Config(e) => Some(e),
            Error::Construction { .. } | Error::InvalidFormat(_) => None,
        }
    }
}

/// Reasons attaching format and timing metadata to a buffer can fail.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ConstructionStatus {
    #[display(fmt = "packet descriptor exceeds raw data")]
    PacketOutOfBounds = -12701,
    #[display(fmt = "raw data is not a whole number of frames")]
    PartialFrame = -12702,
    #[display(fmt = "frame count cannot be derived from format")]
    UnknownFrameCount = -12703,
    #[display(fmt = "presentation timestamp overflow")]
    TimestampOverflow = -12704,
}

impl ConstructionStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    #[display(fmt = "sample rate is zero")]
    ZeroSampleRate,
    #[display(fmt = "channel count is zero")]
    ZeroChannels,
    #[display(fmt = "unsupported pcm bit depth {}", _0)]
    BitDepth(u16),
}
