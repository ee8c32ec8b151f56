use super::{AudioSource, SourceError};

/// Samples held in memory.
pub struct SampleBuffer {
    sample_rate: u32,
    samples: Vec<f32>,
    position: usize,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            samples,
            position: 0,
        }
    }
}

impl AudioSource for SampleBuffer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, count: usize) -> Result<Vec<f32>, SourceError> {
        if self.position >= self.samples.len() {
            return Err(SourceError::Exhausted);
        }

        let end = (self.position + count).min(self.samples.len());
        let samples = self.samples[self.position..end].to_vec();
        self.position = end;

        Ok(samples)
    }
}
