//! page — декодирование страниц файла состояний.
//!
//! Слои снизу вверх: stream (байтовые примитивы) → decode (опкоды и
//! контекст) → scan (проход с компаратором). Типы записей и составной
//! порядок ключа — в entry.

pub mod decode;
pub mod entry;
pub mod scan;
pub mod stream;

pub use decode::{decode_entry, DecodeCtx};
pub use entry::{compare_general, Account, Entry, SearchKey};
pub use scan::{scan_page, ScanOutcome};
pub use stream::{ByteStream, ScanStop, StreamResult};
