use std::f32::consts::TAU;

use num_complex::Complex;
use tracing::debug;

pub struct FrequencyBucket {
    target_frequency: f32,
    k: usize,
    coeff: f32,
    sine: f32,
    cosine: f32,
    q1: f32,
    q2: f32,
    magnitude_squared: f32,
}

impl FrequencyBucket {
    fn new(target_frequency: f32, sample_rate: u32, block_length: usize) -> Self {
        let n = block_length as f32;
        // Nearest bin.
        let k = (0.5 + (n * target_frequency) / sample_rate as f32) as usize;
        let omega = TAU * k as f32 / n;
        let sine = omega.sin();
        let cosine = omega.cos();

        Self {
            target_frequency,
            k,
            coeff: 2.0 * cosine,
            sine,
            cosine,
            q1: 0.0,
            q2: 0.0,
            magnitude_squared: 0.0,
        }
    }

    #[cfg(test)]
    pub fn bin(&self) -> usize {
        self.k
    }

    #[cfg(test)]
    pub fn coeff(&self) -> f32 {
        self.coeff
    }

    fn reset(&mut self) {
        self.q1 = 0.0;
        self.q2 = 0.0;
    }

    fn iterate(&mut self, x_n: f32) {
        let q0 = self.coeff * self.q1 - self.q2 + x_n;
        self.q2 = self.q1;
        self.q1 = q0;
    }

    /// Relative (unnormalized) energy. Only good for comparing buckets.
    fn relative_magnitude(&self) -> f32 {
        self.q1 * self.q1 + self.q2 * self.q2 - self.q1 * self.q2 * self.coeff
    }

    fn response(&self) -> Complex<f32> {
        Complex::new(self.q1 - self.q2 * self.cosine, self.q2 * self.sine)
    }
}

/// A group of Goertzel filters sharing one sample rate and block length.
///
/// Call `reset()` before each block, `process_sample()` for every sample in
/// the block, then `compute_relative_magnitude()` once the block is complete.
pub struct FilterBank<const N: usize> {
    block_length: usize,
    buckets: [FrequencyBucket; N],
}

impl<const N: usize> FilterBank<N> {
    pub fn new(sample_rate: u32, block_length: usize, frequencies: [f32; N]) -> Self {
        let buckets = frequencies.map(|frequency| FrequencyBucket::new(frequency, sample_rate, block_length));

        for bucket in &buckets {
            debug!(sample_rate, block_length, frequency = bucket.target_frequency, k = bucket.k, coeff = bucket.coeff, "goertzel bucket");
        }

        Self {
            block_length,
            buckets,
        }
    }

    pub fn block_length(&self) -> usize {
        self.block_length
    }

    #[cfg(test)]
    pub fn buckets(&self) -> &[FrequencyBucket; N] {
        &self.buckets
    }

    pub fn reset(&mut self) {
        for bucket in &mut self.buckets {
            bucket.reset();
        }
    }

    pub fn process_sample(&mut self, x_n: f32) {
        for bucket in &mut self.buckets {
            bucket.iterate(x_n);
        }
    }

    pub fn compute_relative_magnitude(&mut self) {
        for bucket in &mut self.buckets {
            bucket.magnitude_squared = bucket.relative_magnitude();
        }
    }

    /// Magnitudes from the last `compute_relative_magnitude()`, in frequency order.
    pub fn magnitudes(&self) -> [f32; N] {
        let mut magnitudes = [0.0; N];
        for (magnitude, bucket) in magnitudes.iter_mut().zip(&self.buckets) {
            *magnitude = bucket.magnitude_squared;
        }
        magnitudes
    }

    /// Complex response of each filter for the current block.
    pub fn compute_responses(&self) -> [Complex<f32>; N] {
        let mut responses = [Complex::new(0.0, 0.0); N];
        for (response, bucket) in responses.iter_mut().zip(&self.buckets) {
            *response = bucket.response();
        }
        responses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOW: [f32; 4] = [697.0, 770.0, 852.0, 941.0];
    const HIGH: [f32; 4] = [1209.0, 1336.0, 1477.0, 1633.0];

    fn feed_sine<const N: usize>(bank: &mut FilterBank<N>, sampling_rate_hz: f32, frequency_hz: f32, amplitude: f32) {

        bank.reset();
        for iteration in 0..bank.block_length() {
            let w = (TAU * frequency_hz / sampling_rate_hz) * iteration as f32;
            bank.process_sample(w.sin() * amplitude);
        }
        bank.compute_relative_magnitude();
    }

    #[test]
    fn bins_and_coefficients() {
        let bank = FilterBank::new(8000, 200, LOW);
        let bins: Vec<usize> = bank.buckets().iter().map(|b| b.bin()).collect();
        assert_eq!(bins, [17, 19, 21, 24]);

        let bank = FilterBank::new(8000, 200, HIGH);
        let bins: Vec<usize> = bank.buckets().iter().map(|b| b.bin()).collect();
        assert_eq!(bins, [30, 33, 37, 41]);

        for bucket in bank.buckets() {
            let omega = TAU * bucket.bin() as f32 / 200.0;
            assert!((bucket.coeff() - 2.0 * omega.cos()).abs() < 1e-6);
        }
    }

    #[test]
    fn monitored_tone_dominates() {
        for (sample_rate, block_length) in [(8000, 200), (8000, 205), (8000, 400), (44100, 1102), (48000, 1200)] {
            for group in [LOW, HIGH] {
                let mut bank = FilterBank::new(sample_rate, block_length, group);

                for (n, &frequency) in group.iter().enumerate() {
                    feed_sine(&mut bank, sample_rate as f32, frequency, 0.5);
                    let magnitudes = bank.magnitudes();

                    for (m, &other) in magnitudes.iter().enumerate() {
                        if m != n {
                            assert!(magnitudes[n] >= other * 2.5,
                                "{frequency} Hz at {sample_rate}/{block_length}: {magnitudes:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn silence_has_no_energy() {
        let mut bank = FilterBank::new(8000, 200, LOW);
        bank.reset();
        for _ in 0..200 {
            bank.process_sample(0.0);
        }
        bank.compute_relative_magnitude();
        assert_eq!(bank.magnitudes(), [0.0; 4]);
    }

    #[test]
    fn reset_between_blocks() {
        let mut bank = FilterBank::new(8000, 200, LOW);
        feed_sine(&mut bank, 8000.0, 697.0, 0.5);
        let first = bank.magnitudes();

        // Same block again after a reset gives the same answer, not an accumulation.
        feed_sine(&mut bank, 8000.0, 697.0, 0.5);
        assert_eq!(bank.magnitudes(), first);
    }

    #[test]
    fn response_matches_relative_magnitude() {
        let mut bank = FilterBank::new(8000, 200, HIGH);
        feed_sine(&mut bank, 8000.0, 1336.0, 0.3);

        let magnitudes = bank.magnitudes();
        let responses = bank.compute_responses();
        let largest = magnitudes.iter().cloned().fold(0.0f32, f32::max);
        for (magnitude, response) in magnitudes.iter().zip(responses) {
            let norm_sqr = response.norm_sqr();
            assert!((norm_sqr - magnitude).abs() <= largest * 1e-3,
                "{norm_sqr} vs {magnitude}");
        }
    }
}
