use thiserror::Error;

use crate::config::GeneratorConfig;
use crate::detector::key_frequencies;

use self::dual_tone::DualToneGenerator;

pub mod dual_tone;

pub trait ToneGenerator {
    fn output(&self) -> f32;
    fn advance(&mut self);
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no DTMF key for {0:?}")]
    UnknownKey(char),
}

fn duration_samples(seconds: f64, sample_rate: u32) -> usize {
    (seconds * sample_rate as f64).round() as usize
}

/// Renders keypad symbols as audio: leading silence, then each key as a
/// tone followed by a gap, then trailing silence.
pub fn render(keys: &str, config: &GeneratorConfig) -> Result<Vec<f32>, RenderError> {
    let sample_rate = config.sample_rate;
    let tone_length = duration_samples(config.tone_duration, sample_rate);
    let gap_length = duration_samples(config.gap_duration, sample_rate);
    let silence_length = duration_samples(config.silence_duration, sample_rate);

    let mut samples = vec![0.0; silence_length];

    for key in keys.chars() {
        let (low, high) = key_frequencies(key).ok_or(RenderError::UnknownKey(key))?;

        let mut generator = DualToneGenerator::new(low, high, sample_rate, config.amplitude);
        samples.extend((0..tone_length).map(|_| {
            generator.advance();
            generator.output()
        }));
        samples.resize(samples.len() + gap_length, 0.0);
    }

    samples.resize(samples.len() + silence_length, 0.0);

    Ok(samples)
}
