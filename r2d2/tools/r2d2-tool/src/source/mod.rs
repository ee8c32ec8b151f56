use thiserror::Error;

pub mod buffer;
pub mod wav;

pub use buffer::SampleBuffer;
pub use wav::WavSource;

#[derive(Error, Debug)]
pub enum SourceError {
    /// A single read failed; later reads may succeed.
    #[error("read failed: {0}")]
    Transient(String),
    #[error("end of stream")]
    Exhausted,
    #[error(transparent)]
    Wav(#[from] hound::Error),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

/// Mono audio, normalized to [-1.0, 1.0].
pub trait AudioSource {
    fn sample_rate(&self) -> u32;

    /// Up to `count` samples. Fewer are returned at the end of the stream
    /// or just before a failed read; `SourceError::Exhausted` once nothing
    /// is left.
    fn read(&mut self, count: usize) -> Result<Vec<f32>, SourceError>;
}
