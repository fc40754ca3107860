//! db/core — хэндл открытого файла состояний.
//!
//! Db владеет read-only маппингом на весь файл; регион страниц разделяется
//! между запросами без мутаций, единственное изменяемое состояние —
//! атомарные счётчики метрик. Drop хэндла освобождает маппинг.

use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::meta::FileHeader;
use crate::metrics::{DbMetrics, MetricsSnapshot};

pub struct Db {
    pub(crate) path: PathBuf,
    pub(crate) mmap: Mmap,
    pub(crate) header: FileHeader,
    pub(crate) metrics: DbMetrics,
}

impl Db {
    /// Путь открытого файла.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Проверенный заголовок файла.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Размер содержимого (states_end), байт.
    #[inline]
    pub fn size(&self) -> u64 {
        self.header.states_end
    }

    /// Снимок счётчиков запросов.
    pub fn stats(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    #[inline]
    pub(crate) fn data(&self) -> &[u8] {
        &self.mmap
    }
}
