//! Lightweight per-handle metrics for ChronoDB.
//!
//! Потокобезопасные атомарные счётчики запросов:
//! - queries — публичные query_account/query_storage
//! - query_pages_l1 — сканы страниц в бинарном поиске (L1)
//! - query_pages_l2 — финальные nearest-not-greater сканы (L2)
//!
//! Счётчики привязаны к хэндлу Db (а не глобальные): stats(handle)
//! обязан отражать ровно этот файл.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct DbMetrics {
    queries: AtomicU64,
    query_pages_l1: AtomicU64,
    query_pages_l2: AtomicU64,
}

impl DbMetrics {
    #[inline]
    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_page_l1(&self) {
        self.query_pages_l1.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_page_l2(&self) {
        self.query_pages_l2.fetch_add(1, Ordering::Relaxed);
    }

    /// Согласованный снимок счётчиков.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries: self.queries.load(Ordering::Relaxed),
            query_pages_l1: self.query_pages_l1.load(Ordering::Relaxed),
            query_pages_l2: self.query_pages_l2.load(Ordering::Relaxed),
        }
    }

    /// Сбросить счётчики в 0 (для бенчей и тестов).
    pub fn reset(&self) {
        self.queries.store(0, Ordering::Relaxed);
        self.query_pages_l1.store(0, Ordering::Relaxed);
        self.query_pages_l2.store(0, Ordering::Relaxed);
    }
}

/// Снимок метрик; сериализуется в JSON для CLI.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    pub queries: u64,
    pub query_pages_l1: u64,
    pub query_pages_l2: u64,
}
