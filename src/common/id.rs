//! Random identifiers and hex formatting for backup names.

const HEX_CHARS_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Append the lowercase hex encoding of `data` to `out`.
pub fn hex_encode_to_string(data: &[u8], out: &mut String) {
    out.reserve(data.len() * 2);
    for &byte in data {
        out.push(HEX_CHARS_LOWER[(byte >> 4) as usize] as char);
        out.push(HEX_CHARS_LOWER[(byte & 0x0f) as usize] as char);
    }
}

/// Lowercase hex encoding of `data`.
pub fn hex_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    hex_encode_to_string(data, &mut out);
    out
}

/// `len` lowercase hex characters of fresh randomness.
///
/// Each call draws from the thread-local generator, so concurrent callers
/// never share a sequence.
pub fn random_hex(len: usize) -> String {
    let mut out = String::with_capacity(len + 16);
    while out.len() < len {
        let word: u64 = rand::random();
        hex_encode_to_string(&word.to_le_bytes(), &mut out);
    }
    out.truncate(len);
    out
}
