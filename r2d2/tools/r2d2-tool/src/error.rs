use thiserror::Error;

use crate::config::ConfigError;
use crate::generator::RenderError;
use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("wav output: {0}")]
    Wav(#[from] hound::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("stream ended without a verified message")]
    NoMessage,
    #[error("loopback of {keys} decoded {decoded:?}, expected {expected:?}")]
    LoopbackMismatch { keys: String, expected: Vec<u8>, decoded: Option<Vec<u8>> },
}

pub type Result<T> = std::result::Result<T, Error>;
