// tests/query_storage.rs
//
// Запросы слотов: инкарнация берётся из найденного аккаунта, нулевая
// инкарнация отсекает storage сразу. Плюс крайние формы кодирования:
// дельта слота, 32-байтный слот, инвертированное значение.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use ethereum_types::{Address, H256, U256};

use ChronoDB::build::FileBuilder;
use ChronoDB::{Account, Db};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("chronodb-sto-{prefix}-{pid}-{t}-{id}.hist"))
}

fn addr(n: u8) -> Address {
    let mut b = [0u8; 20];
    b[19] = n;
    Address::from(b)
}

fn acct(nonce: u64, incarnation: u64) -> Account {
    Account {
        nonce,
        incarnation,
        balance: U256::zero(),
        code_hash: H256::zero(),
    }
}

#[test]
fn stored_slot_at_and_after_its_block() -> Result<()> {
    let path = unique_path("basic");
    let mut b = FileBuilder::new(9, 100, 200)?;
    b.add_account(100, addr(1), acct(1, 1));
    b.add_storage(120, addr(1), 1, U256::from(5), U256::from(42));
    b.write_to(&path)?;

    let db = Db::open(&path)?;

    // До записи слота значения нет.
    let (found, v) = db.query_storage(110, addr(1), U256::from(5));
    assert!(!found);
    assert_eq!(v, U256::zero());

    // На блоке записи и после — значение действует.
    for blk in [120u64, 150, 200] {
        let (found, v) = db.query_storage(blk, addr(1), U256::from(5));
        assert!(found, "block {blk}");
        assert_eq!(v, U256::from(42), "block {blk}");
    }

    // Чужой слот — not-found.
    let (found, _) = db.query_storage(150, addr(1), U256::from(6));
    assert!(!found);

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn incarnation_zero_short_circuits() -> Result<()> {
    let path = unique_path("inc0");
    let mut b = FileBuilder::new(9, 100, 200)?;
    // Аккаунт без storage (incarnation = 0).
    b.add_account(100, addr(1), acct(3, 0));
    b.write_to(&path)?;

    let db = Db::open(&path)?;
    let (found, v) = db.query_storage(150, addr(1), U256::from(5));
    assert!(!found);
    assert_eq!(v, U256::zero());

    // Нет и самого аккаунта — тоже (false, 0).
    let (found, v) = db.query_storage(150, addr(9), U256::from(5));
    assert!(!found);
    assert_eq!(v, U256::zero());

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn slot_encoding_edge_forms() -> Result<()> {
    let path = unique_path("forms");
    let huge_slot = U256::MAX - U256::from(17);
    let inverted_friendly = !U256::from(5u8); // NOT-форма короче прямой
    let mut b = FileBuilder::new(9, 100, 200)?;
    b.add_account(100, addr(1), acct(1, 1));
    // Дельта-цепочка слотов в одном блоке: 100, 101, 103.
    b.add_storage(120, addr(1), 1, U256::from(100), U256::from(1));
    b.add_storage(120, addr(1), 1, U256::from(101), U256::from(2));
    b.add_storage(120, addr(1), 1, U256::from(103), U256::from(3));
    // 32-байтный слот и большие значения.
    b.add_storage(130, addr(1), 1, huge_slot, U256::from(u128::MAX));
    b.add_storage(130, addr(1), 1, U256::from(7), inverted_friendly);
    b.write_to(&path)?;

    let db = Db::open(&path)?;
    for (slot, expect) in [
        (U256::from(100), U256::from(1)),
        (U256::from(101), U256::from(2)),
        (U256::from(103), U256::from(3)),
    ] {
        let (found, v) = db.query_storage(150, addr(1), slot);
        assert!(found, "slot {slot}");
        assert_eq!(v, expect, "slot {slot}");
    }

    let (found, v) = db.query_storage(150, addr(1), huge_slot);
    assert!(found);
    assert_eq!(v, U256::from(u128::MAX));

    let (found, v) = db.query_storage(150, addr(1), U256::from(7));
    assert!(found);
    assert_eq!(v, inverted_friendly);

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn incarnation_follows_account_history() -> Result<()> {
    let path = unique_path("reincarnate");
    let mut b = FileBuilder::new(9, 100, 200)?;
    // Аккаунт жил в инкарнации 1, был пересоздан в инкарнации 2 на блоке 150.
    b.add_account(100, addr(1), acct(1, 1));
    b.add_account(150, addr(1), acct(1, 2));
    b.add_storage(110, addr(1), 1, U256::from(7), U256::from(111));
    b.add_storage(160, addr(1), 2, U256::from(7), U256::from(222));
    b.write_to(&path)?;

    let db = Db::open(&path)?;

    // В первой жизни слот читается из инкарнации 1.
    let (found, v) = db.query_storage(120, addr(1), U256::from(7));
    assert!(found);
    assert_eq!(v, U256::from(111));

    // После пересоздания, но до новой записи слота: инкарнация уже 2,
    // старое значение инкарнации 1 недостижимо.
    let (found, v) = db.query_storage(155, addr(1), U256::from(7));
    assert!(!found);
    assert_eq!(v, U256::zero());

    // Новая жизнь — новое значение.
    let (found, v) = db.query_storage(170, addr(1), U256::from(7));
    assert!(found);
    assert_eq!(v, U256::from(222));

    // Аккаунтная история согласована со слотами.
    let (found, acc) = db.query_account(120, addr(1));
    assert!(found);
    assert_eq!(acc.incarnation, 1);
    let (found, acc) = db.query_account(170, addr(1));
    assert!(found);
    assert_eq!(acc.incarnation, 2);

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn high_incarnation_via_varint() -> Result<()> {
    let path = unique_path("highinc");
    let mut b = FileBuilder::new(9, 100, 200)?;
    // Инкарнация 5 не влезает в инлайн-биты аккаунта и уходит в varint;
    // storage-записи наследуют её из контекста.
    b.add_account(100, addr(1), acct(1, 5));
    b.add_storage(120, addr(1), 5, U256::from(1), U256::from(10));
    b.add_storage(120, addr(1), 5, U256::from(2), U256::from(20));
    b.write_to(&path)?;

    let db = Db::open(&path)?;
    let (found, acc) = db.query_account(150, addr(1));
    assert!(found);
    assert_eq!(acc.incarnation, 5);

    for (slot, expect) in [(1u64, 10u64), (2, 20)] {
        let (found, v) = db.query_storage(150, addr(1), U256::from(slot));
        assert!(found, "slot {slot}");
        assert_eq!(v, U256::from(expect), "slot {slot}");
    }

    fs::remove_file(&path)?;
    Ok(())
}
