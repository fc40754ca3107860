// tests/header_validate.rs
//
// Валидация заголовка при open:
// - неизвестная версия, кривой page_shift, регион за пределами файла,
//   states_end < states_start, усечённый заголовок — всё фатально;
// - корректный файл с пустым регионом открывается, запросы дают not-found.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use ethereum_types::Address;

use ChronoDB::consts::{FILE_VERSION, HEADER_SIZE};
use ChronoDB::meta::FileHeader;
use ChronoDB::Db;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("chronodb-hdr-{prefix}-{pid}-{t}-{id}.hist"))
}

fn base_header() -> FileHeader {
    FileHeader {
        version: FILE_VERSION,
        states_start: 512,
        states_end: 512 + 2 * 512,
        page_shift: 9,
        block_first: 100,
        block_last: 200,
        count_accounts: 0,
        count_storages: 0,
    }
}

fn write_file(path: &PathBuf, header: &FileHeader, total_len: usize) -> Result<()> {
    let mut bytes = vec![0u8; total_len];
    bytes[..HEADER_SIZE].copy_from_slice(&header.encode());
    fs::write(path, &bytes)?;
    Ok(())
}

#[test]
fn accepts_wellformed_empty_region() -> Result<()> {
    let path = unique_path("empty-region");
    let mut h = base_header();
    h.states_end = h.states_start; // ни одной страницы
    write_file(&path, &h, h.states_start as usize)?;

    let db = Db::open(&path)?;
    assert_eq!(db.size(), h.states_end);

    // Пустой регион: любой запрос — not-found.
    let (found, _) = db.query_account(150, Address::zero());
    assert!(!found);

    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn rejects_unknown_version() -> Result<()> {
    let path = unique_path("version");
    let mut h = base_header();
    h.version = FILE_VERSION + 1;
    write_file(&path, &h, h.states_end as usize)?;
    assert!(Db::open(&path).is_err());
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn rejects_page_shift_out_of_range() -> Result<()> {
    for shift in [7u8, 25] {
        let path = unique_path("shift");
        let mut h = base_header();
        h.page_shift = shift;
        // states_start выравниваем под заведомо большой размер страницы
        h.states_start = 1 << 25;
        h.states_end = h.states_start;
        write_file(&path, &h, HEADER_SIZE)?;
        assert!(Db::open(&path).is_err(), "page_shift {} must be rejected", shift);
        fs::remove_file(&path)?;
    }
    Ok(())
}

#[test]
fn rejects_region_beyond_file() -> Result<()> {
    let path = unique_path("beyond");
    let h = base_header();
    // Файл короче, чем заявленный states_end.
    write_file(&path, &h, h.states_end as usize - 1)?;
    assert!(Db::open(&path).is_err());
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn rejects_inverted_region() -> Result<()> {
    let path = unique_path("inverted");
    let mut h = base_header();
    h.states_end = h.states_start - 512;
    write_file(&path, &h, h.states_start as usize)?;
    assert!(Db::open(&path).is_err());
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn rejects_unaligned_region_length() -> Result<()> {
    let path = unique_path("unaligned");
    let mut h = base_header();
    h.states_end = h.states_start + 300; // не кратно 512
    write_file(&path, &h, h.states_end as usize)?;
    assert!(Db::open(&path).is_err());
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn rejects_truncated_header() -> Result<()> {
    let path = unique_path("truncated");
    fs::write(&path, vec![0u8; HEADER_SIZE - 1])?;
    assert!(Db::open(&path).is_err());
    fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn rejects_missing_file() {
    let path = unique_path("missing");
    assert!(Db::open(&path).is_err());
}
