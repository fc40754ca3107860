//! db/search — двухуровневый поиск по региону страниц.
//!
//! L1: бинарный поиск по страницам, вердикт — по первой записи страницы.
//! L2: полный скан выжившей страницы за nearest-not-greater кандидатом.
//!
//! Тонкие места (менять нельзя без бенчмарков):
//! - середина округляется вверх: mid = high - ((high - low) >> 1);
//! - если страница середины упирается в low, пропускается ОНА, а не
//!   последняя — первая оставшаяся страница с высокой вероятностью всё
//!   равно будет пересканирована в L2;
//! - ветка GT ставит low на начало текущей страницы, не за неё: цель может
//!   лежать внутри этой же страницы (nearest-not-greater по блоку);
//! - GT из L2 обязан пройти перепроверку идентичности: компаратор
//!   гарантирует только «не больше» по блоку.

use crate::page::{scan_page, Entry, ScanOutcome, SearchKey};

use super::core::Db;

impl Db {
    /// Найти запись по ключу или None.
    pub(crate) fn lookup(&self, key: &SearchKey) -> Option<Entry> {
        let data = self.data();
        let page_size = self.header.page_size();
        let page_mask = self.header.page_mask();

        let mut low = self.header.states_start;
        let mut high = self.header.states_end.checked_sub(1)?;

        // L1: сужаем [low, high] до одной страницы.
        loop {
            if low > high {
                return None;
            }

            let mid = high - ((high - low) >> 1);
            let mut page_start = mid & !page_mask;
            let mut page_end = page_start | page_mask;

            if page_start <= low {
                if page_end >= high {
                    break; // остался диапазон внутри одной страницы — в L2
                }
                page_start += page_size;
                page_end = page_start | page_mask;
            }
            if page_end > high {
                page_end = high;
            }

            self.metrics.record_page_l1();
            match scan_page(data, page_start as usize, page_end as usize, key, false) {
                ScanOutcome::Eq(e) => return Some(e),
                ScanOutcome::Lt => high = page_start - 1,
                ScanOutcome::Gt(_) => low = page_start,
                ScanOutcome::NotFound => return None,
            }
        }

        // L2: nearest-not-greater внутри выжившего диапазона.
        self.metrics.record_page_l2();
        match scan_page(data, low as usize, high as usize, key, true) {
            ScanOutcome::Eq(e) => Some(e),
            ScanOutcome::Gt(e) => {
                if key.matches_identity(&e) {
                    Some(e)
                } else {
                    None
                }
            }
            ScanOutcome::Lt | ScanOutcome::NotFound => None,
        }
    }
}
