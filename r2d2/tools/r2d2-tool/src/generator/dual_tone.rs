use std::f32::consts::TAU;

use super::ToneGenerator;

pub struct DualToneGenerator {
    phase_0: f32,
    phase_advance_0: f32,
    phase_1: f32,
    phase_advance_1: f32,
    amplitude: f32,
    output: f32,
}

impl DualToneGenerator {
    pub fn new(freq_1_hz: f32, freq_2_hz: f32, sample_rate: u32, amplitude: f32) -> Self {
        let sample_rate = sample_rate as f32;

        Self {
            phase_0: 0.0,
            phase_advance_0: TAU * freq_1_hz / sample_rate,
            phase_1: 0.0,
            phase_advance_1: TAU * freq_2_hz / sample_rate,
            amplitude,
            output: 0.0,
        }
    }
}

impl ToneGenerator for DualToneGenerator {
    fn output(&self) -> f32 {
        self.output
    }

    fn advance(&mut self) {
        self.output = (self.phase_0.sin() + self.phase_1.sin()) * 0.5 * self.amplitude;
        self.phase_0 = (self.phase_0 + self.phase_advance_0) % TAU;
        self.phase_1 = (self.phase_1 + self.phase_advance_1) % TAU;
    }
}
