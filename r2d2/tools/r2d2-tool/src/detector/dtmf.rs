use tracing::{trace, Level};

use crate::config::{ConfigError, DetectorConfig};

use super::goertzel::FilterBank;
use super::{Symbol, FREQUENCIES_HIGH, FREQUENCIES_LOW, KEY_MAP};

/// Reduces one block of samples to at most one DTMF key.
pub struct ToneClassifier {
    tones_low: FilterBank<4>,
    tones_high: FilterBank<4>,
    config: DetectorConfig,
}

impl ToneClassifier {
    pub fn new(sample_rate: u32, config: &DetectorConfig) -> Result<Self, ConfigError> {
        let block_length = config.block_length(sample_rate)?;

        Ok(Self {
            tones_low: FilterBank::new(sample_rate, block_length, FREQUENCIES_LOW),
            tones_high: FilterBank::new(sample_rate, block_length, FREQUENCIES_HIGH),
            config: config.clone(),
        })
    }

    pub fn block_length(&self) -> usize {
        self.tones_low.block_length()
    }

    pub fn classify(&mut self, samples: &[f32]) -> Symbol {
        self.tones_low.reset();
        self.tones_high.reset();

        for &x_n in samples {
            self.tones_low.process_sample(x_n);
            self.tones_high.process_sample(x_n);
        }

        self.tones_low.compute_relative_magnitude();
        self.tones_high.compute_relative_magnitude();

        let low_powers = self.tones_low.magnitudes();
        let high_powers = self.tones_high.magnitudes();

        let row = select_candidate(&low_powers, self.config.low_threshold, self.config.detect_factor);
        let column = select_candidate(&high_powers, self.config.high_threshold, self.config.detect_factor);

        let symbol = match (row, column) {
            (Some(row), Some(column)) => Symbol::Key(KEY_MAP[row][column]),
            _ => Symbol::Blank,
        };

        trace!(?low_powers, ?high_powers, ?row, ?column, %symbol, "classified block");

        if tracing::enabled!(Level::TRACE) {
            let low_phases = self.tones_low.compute_responses().map(|response| response.arg());
            let high_phases = self.tones_high.compute_responses().map(|response| response.arg());
            trace!(?low_phases, ?high_phases, "filter phases");
        }

        symbol
    }
}

/// Index of the bucket that passes both the absolute threshold and the
/// above-average test. When several pass, the last one in frequency order
/// wins, regardless of which is strongest.
pub(crate) fn select_candidate(powers: &[f32], threshold: f64, detect_factor: f64) -> Option<usize> {
    if powers.is_empty() {
        return None;
    }

    let average = powers.iter().map(|&p| p as f64).sum::<f64>() / powers.len() as f64;

    powers.iter()
        .map(|&p| p as f64)
        .enumerate()
        .filter(|&(_, p)| p > threshold && p > average * detect_factor)
        .map(|(n, _)| n)
        .last()
}
