use crc::{Crc, CRC_8_SMBUS};
use thiserror::Error;

/// CRC-8, polynomial 0x07, zero init, no reflection, no final XOR.
pub const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

#[derive(Error, Debug, PartialEq)]
pub enum PayloadError {
    #[error("malformed message: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("message has no checksum byte")]
    Empty,
    #[error("checksum mismatch: computed {computed:#04x}, read {read:#04x}")]
    Checksum { computed: u8, read: u8 },
}

/// `*` and `#` stand in for the hex digits `e` and `f`.
pub fn dtmf_to_hex(message: &str) -> String {
    message.chars()
        .map(|c| match c {
            '*' => 'e',
            '#' => 'f',
            c => c,
        })
        .collect()
}

pub fn hex_to_dtmf(hex: &str) -> String {
    hex.chars()
        .map(|c| match c {
            'e' | 'E' => '*',
            'f' | 'F' => '#',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

pub fn checksum(bytes: &[u8]) -> u8 {
    CRC8.checksum(bytes)
}

/// Decodes a framed message and verifies its trailing checksum byte,
/// returning the payload without the checksum.
pub fn decode(message: &str) -> Result<Vec<u8>, PayloadError> {
    let mut bytes = hex::decode(dtmf_to_hex(message))?;
    let read = bytes.pop().ok_or(PayloadError::Empty)?;

    let computed = checksum(&bytes);
    if computed != read {
        return Err(PayloadError::Checksum { computed, read });
    }

    Ok(bytes)
}

/// Keypad symbols for `payload` followed by its checksum.
pub fn encode(payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(payload.len() + 1);
    bytes.extend_from_slice(payload);
    bytes.push(checksum(payload));

    hex_to_dtmf(&hex::encode(bytes))
}
