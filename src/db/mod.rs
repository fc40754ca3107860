//! db — high-level API хэндла базы.
//!
//! Разделение по подмодулям:
//! - core: структура Db поверх mmap, size/stats
//! - open: открытие и валидация заголовка
//! - search: двухуровневый поиск (L1 по страницам + L2 nearest-not-greater)
//! - query: публичные query_account / query_storage
//! - check: полный обход файла (инструментальная проверка)

pub mod check;
pub mod core;
pub mod open;
pub mod query;
pub mod search;

pub use check::CheckReport;
pub use core::Db;
