//! build/encode — кодеки, обратные к page/stream.
//!
//! Минимальность длины не обязательна для читателя, но писатель всегда
//! выдаёт минимальную форму.

use ethereum_types::U256;

use crate::consts::VARINT_THRESHOLD;

/// Минимальные big-endian байты u64 (как минимум один байт).
pub(crate) fn be_bytes_u64(n: u64) -> Vec<u8> {
    let raw = n.to_be_bytes();
    let skip = raw.iter().position(|&b| b != 0).unwrap_or(raw.len() - 1);
    raw[skip..].to_vec()
}

/// Минимальные big-endian байты U256 (как минимум один байт).
pub(crate) fn be_bytes_u256(v: &U256) -> Vec<u8> {
    let raw = v.to_big_endian();
    let skip = raw.iter().position(|&b| b != 0).unwrap_or(raw.len() - 1);
    raw[skip..].to_vec()
}

/// Varint u64: < 224 — один байт; иначе [224 + (len-1)] + BE-байты.
pub fn encode_u64_var(n: u64, out: &mut Vec<u8>) {
    if n < VARINT_THRESHOLD as u64 {
        out.push(n as u8);
        return;
    }
    let bytes = be_bytes_u64(n);
    out.push(VARINT_THRESHOLD + (bytes.len() - 1) as u8);
    out.extend_from_slice(&bytes);
}

/// Varint U256 — та же схема; len ≤ 32, поэтому префикс ≤ 255.
pub fn encode_u256_var(v: &U256, out: &mut Vec<u8>) {
    if *v < U256::from(VARINT_THRESHOLD) {
        out.push(v.low_u64() as u8);
        return;
    }
    let bytes = be_bytes_u256(v);
    out.push(VARINT_THRESHOLD + (bytes.len() - 1) as u8);
    out.extend_from_slice(&bytes);
}

/// Фиксированные 32 байта big-endian.
pub fn encode_u256_fixed(v: &U256, out: &mut Vec<u8>) {
    out.extend_from_slice(&v.to_big_endian());
}

/// Длина varint-формы U256 в байтах (для выбора самой короткой формы).
pub(crate) fn u256_var_len(v: &U256) -> usize {
    if *v < U256::from(VARINT_THRESHOLD) {
        1
    } else {
        1 + be_bytes_u256(v).len()
    }
}
