// tests/varint_roundtrip.rs
//
// Законы кодирования:
// - read(encode(n)) == n для u64-varint, U256-varint и фиксированных 32 байт;
// - граница 224: 223 — один байт, 224 — два;
// - неминимальная форма допустима на чтении.

use ethereum_types::U256;

use ChronoDB::build::encode::{encode_u256_fixed, encode_u256_var, encode_u64_var};
use ChronoDB::page::ByteStream;

fn stream(buf: &[u8]) -> ByteStream<'_> {
    ByteStream::new(buf, 0, buf.len() - 1)
}

#[test]
fn u64_exact_values() {
    let cases = [
        0u64,
        1,
        5,
        223,
        224,
        225,
        255,
        256,
        65535,
        65536,
        0xDEAD_BEEF,
        u64::MAX - 1,
        u64::MAX,
    ];
    for n in cases {
        let mut buf = Vec::new();
        encode_u64_var(n, &mut buf);
        let got = stream(&buf).read_u64_var().expect("decode");
        assert_eq!(got, n, "u64 {n}");
    }
}

#[test]
fn u64_encoded_length() {
    let mut buf = Vec::new();
    encode_u64_var(223, &mut buf);
    assert_eq!(buf.len(), 1);

    buf.clear();
    encode_u64_var(224, &mut buf);
    assert_eq!(buf.len(), 2);

    buf.clear();
    encode_u64_var(u64::MAX, &mut buf);
    assert_eq!(buf.len(), 9); // префикс + 8 байт
}

#[test]
fn u64_random_sweep() {
    let mut rng = oorandom::Rand64::new(0x5EED_0001);
    for _ in 0..20_000 {
        let n = rng.rand_u64();
        let mut buf = Vec::new();
        encode_u64_var(n, &mut buf);
        assert_eq!(stream(&buf).read_u64_var().unwrap(), n);
    }
}

fn rand_u256(rng: &mut oorandom::Rand64) -> U256 {
    // Случайная ширина, чтобы покрыть все длины кодирования.
    let limbs = (rng.rand_u64() % 4 + 1) as usize;
    let mut v = U256::zero();
    for _ in 0..limbs {
        v = (v << 64) | U256::from(rng.rand_u64());
    }
    v
}

#[test]
fn u256_var_roundtrip() {
    let mut fixed_cases = vec![
        U256::zero(),
        U256::one(),
        U256::from(223),
        U256::from(224),
        U256::from(u64::MAX),
        U256::MAX,
        U256::MAX - U256::one(),
    ];
    for k in 0..256 {
        fixed_cases.push(U256::one() << k);
    }

    let mut rng = oorandom::Rand64::new(0x5EED_0002);
    for _ in 0..5_000 {
        fixed_cases.push(rand_u256(&mut rng));
    }

    for v in fixed_cases {
        let mut buf = Vec::new();
        encode_u256_var(&v, &mut buf);
        assert_eq!(stream(&buf).read_u256_var().unwrap(), v, "u256 {v}");
    }
}

#[test]
fn u256_fixed_roundtrip() {
    let mut rng = oorandom::Rand64::new(0x5EED_0003);
    for _ in 0..2_000 {
        let v = rand_u256(&mut rng);
        let mut buf = Vec::new();
        encode_u256_fixed(&v, &mut buf);
        assert_eq!(buf.len(), 32);
        assert_eq!(stream(&buf).read_u256_fixed().unwrap(), v);
    }
}

#[test]
fn non_minimal_encoding_is_accepted() {
    // 5, закодированная как [224+2][0x00][0x00][0x05]: читатель не требует
    // минимальной длины.
    let buf = [226u8, 0x00, 0x00, 0x05];
    assert_eq!(stream(&buf).read_u64_var().unwrap(), 5);
    assert_eq!(stream(&buf).read_u256_var().unwrap(), U256::from(5));
}
