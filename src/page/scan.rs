//! page/scan — проход по записям одной страницы с компаратором.
//!
//! Два режима:
//! - `all = false` (L1): вердикт по первой записи страницы.
//! - `all = true` (L2): идём, пока ключ больше записи, запоминая последнюю
//!   «меньшую» запись; она и есть nearest-not-greater кандидат.

use std::cmp::Ordering;

use super::decode::{decode_entry, DecodeCtx};
use super::entry::{compare_general, Entry, SearchKey};
use super::stream::{ByteStream, ScanStop};

/// Результат скана страницы.
#[derive(Debug)]
pub enum ScanOutcome {
    /// Точное совпадение всех компонент ключа.
    Eq(Entry),
    /// Ключ больше записи; для `all = true` — лучший кандидат ≤ ключа.
    Gt(Entry),
    /// Ключ меньше первой подходящей записи.
    Lt,
    /// Пустая страница, конец диапазона или синтаксическая ошибка.
    NotFound,
}

/// Сканировать диапазон страницы [start, end] (включительно).
pub fn scan_page(data: &[u8], start: usize, end: usize, key: &SearchKey, all: bool) -> ScanOutcome {
    let mut stream = ByteStream::new(data, start, end);
    let mut ctx = DecodeCtx::default();
    let mut saved: Option<Entry> = None;

    loop {
        let entry = match decode_entry(&mut stream, &mut ctx) {
            Ok(Some(e)) => e,
            Ok(None) => break, // паддинг конца страницы
            Err(ScanStop::OutOfRange) => break,
            Err(ScanStop::Syntax) => {
                log::warn!("syntax error in state page at [{start}..{end}]");
                break;
            }
        };

        match compare_general(key, &entry) {
            Ordering::Equal => return ScanOutcome::Eq(entry),
            Ordering::Greater => {
                if !all {
                    return ScanOutcome::Gt(entry);
                }
                saved = Some(entry);
            }
            Ordering::Less => {
                if !all {
                    return ScanOutcome::Lt;
                }
                return match saved {
                    Some(s) => ScanOutcome::Gt(s),
                    None => ScanOutcome::Lt,
                };
            }
        }
    }

    match saved {
        Some(s) => ScanOutcome::Gt(s),
        None => ScanOutcome::NotFound,
    }
}
