use std::fmt;

pub mod goertzel;
pub mod dtmf;

pub const FREQUENCIES_LOW:  [f32; 4] = [ 697.0,  770.0,  852.0,  941.0];
pub const FREQUENCIES_HIGH: [f32; 4] = [1209.0, 1336.0, 1477.0, 1633.0];

/// Rows are indexed by low-group frequency, columns by high-group frequency.
pub const KEY_MAP: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Outcome of classifying one block of audio.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Symbol {
    Blank,
    Key(char),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Blank => Ok(()),
            Symbol::Key(key) => write!(f, "{key}"),
        }
    }
}

/// Low and high frequency (Hz) for a keypad symbol.
pub fn key_frequencies(key: char) -> Option<(f32, f32)> {
    for (row, keys) in KEY_MAP.iter().enumerate() {
        if let Some(column) = keys.iter().position(|&k| k == key) {
            return Some((FREQUENCIES_LOW[row], FREQUENCIES_HIGH[column]));
        }
    }
    None
}
