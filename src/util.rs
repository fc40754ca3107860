//! util — разбор и печать hex-аргументов CLI.
//!
//! Содержит:
//! - parse_address / parse_h256: строгий разбор фиксированной длины;
//! - parse_u256: hex с префиксом 0x или десятичное число;
//! - addr_hex / u256_hex: каноничная печать для вывода и JSON.

use anyhow::{anyhow, Result};
use ethereum_types::{Address, H256, U256};

fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// 20-байтный адрес из hex-строки (префикс 0x не обязателен).
pub fn parse_address(s: &str) -> Result<Address> {
    let raw = hex::decode(strip_0x(s.trim())).map_err(|e| anyhow!("bad address hex: {}", e))?;
    if raw.len() != 20 {
        return Err(anyhow!("address must be 20 bytes, got {}", raw.len()));
    }
    Ok(Address::from_slice(&raw))
}

/// 32-байтный хэш из hex-строки.
pub fn parse_h256(s: &str) -> Result<H256> {
    let raw = hex::decode(strip_0x(s.trim())).map_err(|e| anyhow!("bad hash hex: {}", e))?;
    if raw.len() != 32 {
        return Err(anyhow!("hash must be 32 bytes, got {}", raw.len()));
    }
    Ok(H256::from_slice(&raw))
}

/// U256: "0x..." — hex, иначе десятичное.
pub fn parse_u256(s: &str) -> Result<U256> {
    let t = s.trim();
    if t.starts_with("0x") || t.starts_with("0X") {
        U256::from_str_radix(&t[2..], 16).map_err(|e| anyhow!("bad u256 hex: {}", e))
    } else {
        U256::from_dec_str(t).map_err(|e| anyhow!("bad u256 decimal: {}", e))
    }
}

/// Полный hex адреса (Display у H160 сокращает середину).
pub fn addr_hex(a: &Address) -> String {
    format!("0x{}", hex::encode(a.as_bytes()))
}

pub fn h256_hex(h: &H256) -> String {
    format!("0x{}", hex::encode(h.as_bytes()))
}

pub fn u256_hex(v: &U256) -> String {
    format!("{:#x}", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_roundtrip() {
        let a = parse_address("0x00000000000000000000000000000000000000ff").unwrap();
        assert_eq!(a.as_bytes()[19], 0xFF);
        assert_eq!(addr_hex(&a), "0x00000000000000000000000000000000000000ff");
        assert!(parse_address("0xabcd").is_err());
        assert!(parse_address("zz").is_err());
    }

    #[test]
    fn u256_hex_and_decimal() {
        assert_eq!(parse_u256("42").unwrap(), U256::from(42));
        assert_eq!(parse_u256("0x2a").unwrap(), U256::from(42));
        assert!(parse_u256("0xzz").is_err());
        assert!(parse_u256("4 2").is_err());
    }

    #[test]
    fn h256_strict_length() {
        let h = parse_h256(&format!("0x{}", "11".repeat(32))).unwrap();
        assert_eq!(h.as_bytes()[0], 0x11);
        assert!(parse_h256("0x1111").is_err());
    }
}
