use serde::Deserialize;

use crate::error::Error;
use crate::format::AudioFormat;

const DEFAULT_INITIAL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueueConfig {
    pub format: AudioFormat,
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

impl QueueConfig {
    pub fn new(format: AudioFormat) -> Self {
        QueueConfig {
            format,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: QueueConfig = toml::from_str(s)?;
        config.format.validate()?;
        Ok(config)
    }
}
