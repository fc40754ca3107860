#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod meta;
pub mod metrics;
pub mod util;

// Страничный декодер (папка с mod.rs)
pub mod page; // src/page/{mod,stream,entry,decode,scan}.rs

// High-level API
pub mod db; // src/db/{mod,core,open,search,query,check}.rs

// Построение файлов (фикстуры/инструменты)
pub mod build; // src/build/{mod,encode}.rs

// CLI
pub mod cli;

// Удобные реэкспорты
pub use db::{CheckReport, Db};
pub use meta::FileHeader;
pub use metrics::MetricsSnapshot;
pub use page::{Account, Entry, SearchKey};
