use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::info;

use super::{AudioSource, SourceError};

/// WAV stream, downmixed to mono.
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    channels: usize,
    format: SampleFormat,
    scale: f32,
    // Error hit after some samples of the previous block were already returned.
    pending: Option<SourceError>,
}

impl WavSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        Ok(Self::new(WavReader::open(path)?))
    }
}

impl<R: Read> WavSource<R> {
    pub fn from_reader(reader: R) -> Result<Self, SourceError> {
        Ok(Self::new(WavReader::new(reader)?))
    }

    fn new(reader: WavReader<R>) -> Self {
        let spec = reader.spec();
        info!(sample_rate = spec.sample_rate, channels = spec.channels, bits = spec.bits_per_sample, format = ?spec.sample_format, "wav input");

        let scale = match spec.sample_format {
            SampleFormat::Int => 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32,
            SampleFormat::Float => 1.0,
        };

        Self {
            reader,
            channels: spec.channels.max(1) as usize,
            format: spec.sample_format,
            scale,
            pending: None,
        }
    }

    /// Appends up to `count` interleaved samples, stopping at the first error.
    fn read_interleaved(&mut self, count: usize, interleaved: &mut Vec<f32>) -> Result<(), hound::Error> {
        match self.format {
            SampleFormat::Int => {
                let scale = self.scale;
                for sample in self.reader.samples::<i32>().take(count) {
                    interleaved.push(sample? as f32 * scale);
                }
            },
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(count) {
                    interleaved.push(sample?);
                }
            },
        }
        Ok(())
    }
}

/// A data chunk shorter than its header claims ends the stream. Anything else
/// costs one sample and the read can be retried.
fn classify_error(error: hound::Error) -> SourceError {
    match error {
        hound::Error::IoError(e) if e.kind() == io::ErrorKind::UnexpectedEof => SourceError::Exhausted,
        other => SourceError::Transient(other.to_string()),
    }
}

impl<R: Read> AudioSource for WavSource<R> {
    fn sample_rate(&self) -> u32 {
        self.reader.spec().sample_rate
    }

    fn read(&mut self, count: usize) -> Result<Vec<f32>, SourceError> {
        if let Some(error) = self.pending.take() {
            return Err(error);
        }

        let mut interleaved = Vec::with_capacity(count * self.channels);
        if let Err(e) = self.read_interleaved(count * self.channels, &mut interleaved) {
            let error = classify_error(e);
            if interleaved.is_empty() {
                return Err(error);
            }
            self.pending = Some(error);
        }

        if interleaved.is_empty() {
            return Err(SourceError::Exhausted);
        }

        if self.channels == 1 {
            return Ok(interleaved);
        }

        Ok(interleaved
            .chunks(self.channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect())
    }
}

/// Writes mono samples as 16-bit PCM.
pub fn write_wav<P: AsRef<Path>>(path: P, sample_rate: u32, samples: &[f32]) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()
}
