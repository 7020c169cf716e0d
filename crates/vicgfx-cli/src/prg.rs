//! Load-address framing used by C64 program files.

use vicgfx::VicError;

/// Size of the little-endian load address in front of the payload.
pub const HEADER_SIZE: usize = 2;

/// Prepends `address` to `payload`.
pub fn with_load_address(address: u16, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&address.to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// Splits a file into its load address and payload.
pub fn strip_load_address(bytes: &[u8]) -> Result<(u16, &[u8]), VicError> {
    if bytes.len() < HEADER_SIZE {
        return Err(VicError::TruncatedData {
            what: "load address",
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    let address = u16::from_le_bytes([bytes[0], bytes[1]]);
    Ok((address, &bytes[HEADER_SIZE..]))
}

/// Parses `$4000`, `0x4000` or plain decimal.
pub fn parse_address(value: &str) -> Result<u16, String> {
    let value = value.trim();
    let parsed = if let Some(hex) = value.strip_prefix('$') {
        u16::from_str_radix(hex, 16)
    } else if let Some(hex) = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        u16::from_str_radix(hex, 16)
    } else {
        value.parse()
    };
    parsed.map_err(|e| format!("invalid load address '{value}': {e}"))
}
