//! db/open — открытие файла состояний (read-only).

use anyhow::{anyhow, Context, Result};
use log::info;
use memmap2::MmapOptions;
use std::fs::OpenOptions;
use std::path::Path;

use crate::consts::HEADER_SIZE;
use crate::meta::read_header;
use crate::metrics::DbMetrics;

use super::core::Db;

impl Db {
    /// Открыть файл состояний: маппинг всего файла + валидация заголовка.
    /// Файл неизменяем; параллельные читатели не требуют блокировок.
    pub fn open(path: &Path) -> Result<Self> {
        let f = OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("open state file {}", path.display()))?;

        let file_size = f
            .metadata()
            .with_context(|| format!("stat state file {}", path.display()))?
            .len();
        if file_size < HEADER_SIZE as u64 {
            return Err(anyhow!(
                "state file {} too small: {} bytes",
                path.display(),
                file_size
            ));
        }

        let mmap = unsafe {
            MmapOptions::new()
                .len(file_size as usize)
                .map(&f)
                .with_context(|| format!("mmap state file {}", path.display()))?
        };

        let header = read_header(&mmap, file_size)
            .with_context(|| format!("validate header of {}", path.display()))?;

        info!(
            "opened {}: blocks [{}..{}], {} pages of {} B, {} accounts / {} storage slots",
            path.display(),
            header.block_first,
            header.block_last,
            (header.states_end - header.states_start) >> header.page_shift,
            header.page_size(),
            header.count_accounts,
            header.count_storages
        );

        Ok(Db {
            path: path.to_path_buf(),
            mmap,
            header,
            metrics: DbMetrics::default(),
        })
    }
}
