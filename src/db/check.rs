//! db/check — полный инструментальный обход файла.
//!
//! Для каждой страницы декодируются все записи; проверяются:
//! - отсутствие синтаксических ошибок и обрывов посреди записи;
//! - глобальный порядок (адрес, вид, инкарнация, слот, блок) без дублей;
//! - совпадение фактических количеств записей со статистикой заголовка.
//!
//! Результат — отчёт со списком проблем; пустой список означает, что
//! каждый запрос по этому файлу детерминированно разрешим.

use std::cmp::Ordering;

use serde::Serialize;

use crate::page::{compare_general, decode_entry, ByteStream, DecodeCtx, Entry, ScanStop, SearchKey};

use super::core::Db;

/// Отчёт полной проверки файла.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub pages: u64,
    pub entries: u64,
    pub accounts: u64,
    pub storages: u64,
    pub issues: Vec<String>,
}

impl CheckReport {
    pub fn ok(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Ключ идентичности записи — для сравнения соседних записей между собой.
fn key_of(e: &Entry) -> SearchKey {
    SearchKey {
        has_block: e.has_block,
        block: e.block,
        has_address: e.has_address,
        address: e.address,
        has_incarnation: e.has_storage,
        incarnation: e.incarnation,
        has_slot: e.has_storage,
        slot: e.slot,
    }
}

impl Db {
    /// Обойти все страницы и проверить инварианты формата.
    pub fn check(&self) -> CheckReport {
        let data = self.data();
        let page_size = self.header.page_size();

        let mut report = CheckReport {
            pages: 0,
            entries: 0,
            accounts: 0,
            storages: 0,
            issues: Vec::new(),
        };

        let mut prev: Option<Entry> = None;
        let mut page_start = self.header.states_start;
        while page_start < self.header.states_end {
            let page_end = page_start + page_size - 1;
            report.pages += 1;

            let mut stream = ByteStream::new(data, page_start as usize, page_end as usize);
            let mut ctx = DecodeCtx::default();
            loop {
                let entry = match decode_entry(&mut stream, &mut ctx) {
                    Ok(Some(e)) => e,
                    Ok(None) => break,
                    Err(ScanStop::OutOfRange) => {
                        report
                            .issues
                            .push(format!("page {}: entry truncated at page end", report.pages - 1));
                        break;
                    }
                    Err(ScanStop::Syntax) => {
                        report
                            .issues
                            .push(format!("page {}: unknown opcode", report.pages - 1));
                        break;
                    }
                };

                report.entries += 1;
                if entry.has_account {
                    report.accounts += 1;
                } else {
                    report.storages += 1;
                }

                if !entry.has_block || !entry.has_address {
                    report.issues.push(format!(
                        "page {}: entry #{} emitted without block/address context",
                        report.pages - 1,
                        report.entries - 1
                    ));
                }
                if entry.has_block
                    && (entry.block < self.header.block_first || entry.block > self.header.block_last)
                {
                    report.issues.push(format!(
                        "page {}: entry #{} block {} outside [{}..{}]",
                        report.pages - 1,
                        report.entries - 1,
                        entry.block,
                        self.header.block_first,
                        self.header.block_last
                    ));
                }

                if let Some(p) = &prev {
                    match compare_general(&key_of(p), &entry) {
                        Ordering::Less => {}
                        Ordering::Equal => report.issues.push(format!(
                            "page {}: duplicate entry key at #{}",
                            report.pages - 1,
                            report.entries - 1
                        )),
                        Ordering::Greater => report.issues.push(format!(
                            "page {}: entry #{} out of order",
                            report.pages - 1,
                            report.entries - 1
                        )),
                    }
                }
                prev = Some(entry);
            }

            page_start += page_size;
        }

        if report.accounts != self.header.count_accounts {
            report.issues.push(format!(
                "account count mismatch: header says {}, file has {}",
                self.header.count_accounts, report.accounts
            ));
        }
        if report.storages != self.header.count_storages {
            report.issues.push(format!(
                "storage count mismatch: header says {}, file has {}",
                self.header.count_storages, report.storages
            ));
        }

        report
    }
}
