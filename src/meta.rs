// src/meta.rs — заголовок файла состояний (LE)
//
// Формат заголовка (64 байта, все поля u64):
// u64 version         = 202202111 (точное совпадение)
// u64 states_start    (смещение первой страницы, выровнено по странице)
// u64 states_end      (смещение за последней страницей)
// u64 page_shift      (8..=24; размер страницы = 1 << page_shift)
// u64 block_first     (первый покрытый блок, включительно)
// u64 block_last      (последний покрытый блок, включительно)
// u64 count_accounts  (информационная статистика)
// u64 count_storages  (информационная статистика)
//
// Политика:
// - Любое несовпадение версии/границ — фатальная ошибка open.
// - (states_end - states_start) кратно размеру страницы.

use anyhow::{anyhow, Result};
use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{
    FILE_VERSION, HDR_OFF_BLOCK_FIRST, HDR_OFF_BLOCK_LAST, HDR_OFF_COUNT_ACCOUNTS,
    HDR_OFF_COUNT_STORAGES, HDR_OFF_PAGE_SHIFT, HDR_OFF_STATES_END, HDR_OFF_STATES_START,
    HDR_OFF_VERSION, HEADER_SIZE, PAGE_SHIFT_MAX, PAGE_SHIFT_MIN,
};

#[derive(Debug, Clone)]
pub struct FileHeader {
    pub version: u64, // == FILE_VERSION
    pub states_start: u64,
    pub states_end: u64,
    pub page_shift: u8,
    pub block_first: u64,
    pub block_last: u64,
    pub count_accounts: u64,
    pub count_storages: u64,
}

impl FileHeader {
    #[inline]
    pub fn page_size(&self) -> u64 {
        1u64 << self.page_shift
    }

    #[inline]
    pub fn page_mask(&self) -> u64 {
        self.page_size() - 1
    }

    /// Сериализовать заголовок (используется построителем файлов).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        LittleEndian::write_u64(&mut buf[HDR_OFF_VERSION..], self.version);
        LittleEndian::write_u64(&mut buf[HDR_OFF_STATES_START..], self.states_start);
        LittleEndian::write_u64(&mut buf[HDR_OFF_STATES_END..], self.states_end);
        LittleEndian::write_u64(&mut buf[HDR_OFF_PAGE_SHIFT..], self.page_shift as u64);
        LittleEndian::write_u64(&mut buf[HDR_OFF_BLOCK_FIRST..], self.block_first);
        LittleEndian::write_u64(&mut buf[HDR_OFF_BLOCK_LAST..], self.block_last);
        LittleEndian::write_u64(&mut buf[HDR_OFF_COUNT_ACCOUNTS..], self.count_accounts);
        LittleEndian::write_u64(&mut buf[HDR_OFF_COUNT_STORAGES..], self.count_storages);
        buf
    }
}

/// Прочитать и проверить заголовок. `file_size` — фактический размер файла.
pub fn read_header(data: &[u8], file_size: u64) -> Result<FileHeader> {
    if data.len() < HEADER_SIZE {
        return Err(anyhow!(
            "file too small for header: {} < {}",
            data.len(),
            HEADER_SIZE
        ));
    }

    let version = LittleEndian::read_u64(&data[HDR_OFF_VERSION..]);
    if version != FILE_VERSION {
        return Err(anyhow!(
            "unsupported file version {} (expected {})",
            version,
            FILE_VERSION
        ));
    }

    let states_start = LittleEndian::read_u64(&data[HDR_OFF_STATES_START..]);
    let states_end = LittleEndian::read_u64(&data[HDR_OFF_STATES_END..]);
    let page_shift_raw = LittleEndian::read_u64(&data[HDR_OFF_PAGE_SHIFT..]);

    if page_shift_raw < PAGE_SHIFT_MIN as u64 || page_shift_raw > PAGE_SHIFT_MAX as u64 {
        return Err(anyhow!(
            "page_shift {} out of range [{}..{}]",
            page_shift_raw,
            PAGE_SHIFT_MIN,
            PAGE_SHIFT_MAX
        ));
    }
    let page_shift = page_shift_raw as u8;
    let page_size = 1u64 << page_shift;

    if states_end < states_start {
        return Err(anyhow!(
            "states_end {} before states_start {}",
            states_end,
            states_start
        ));
    }
    if states_end > file_size {
        return Err(anyhow!(
            "states_end {} beyond file size {}",
            states_end,
            file_size
        ));
    }
    if states_start < HEADER_SIZE as u64 {
        return Err(anyhow!(
            "states_start {} overlaps header ({} bytes)",
            states_start,
            HEADER_SIZE
        ));
    }
    if states_start & (page_size - 1) != 0 {
        return Err(anyhow!(
            "states_start {} not aligned to page size {}",
            states_start,
            page_size
        ));
    }
    if (states_end - states_start) % page_size != 0 {
        return Err(anyhow!(
            "state region [{}..{}] is not a multiple of page size {}",
            states_start,
            states_end,
            page_size
        ));
    }

    Ok(FileHeader {
        version,
        states_start,
        states_end,
        page_shift,
        block_first: LittleEndian::read_u64(&data[HDR_OFF_BLOCK_FIRST..]),
        block_last: LittleEndian::read_u64(&data[HDR_OFF_BLOCK_LAST..]),
        count_accounts: LittleEndian::read_u64(&data[HDR_OFF_COUNT_ACCOUNTS..]),
        count_storages: LittleEndian::read_u64(&data[HDR_OFF_COUNT_STORAGES..]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileHeader {
        FileHeader {
            version: FILE_VERSION,
            states_start: 512,
            states_end: 512 + 4 * 512,
            page_shift: 9,
            block_first: 100,
            block_last: 200,
            count_accounts: 7,
            count_storages: 11,
        }
    }

    #[test]
    fn encode_read_roundtrip() {
        let h = sample();
        let buf = h.encode();
        let back = read_header(&buf, h.states_end).expect("must read");
        assert_eq!(back.states_start, h.states_start);
        assert_eq!(back.states_end, h.states_end);
        assert_eq!(back.page_shift, h.page_shift);
        assert_eq!(back.block_first, 100);
        assert_eq!(back.block_last, 200);
        assert_eq!(back.count_accounts, 7);
        assert_eq!(back.count_storages, 11);
    }

    #[test]
    fn rejects_bad_version() {
        let mut h = sample();
        h.version = FILE_VERSION + 1;
        let buf = h.encode();
        assert!(read_header(&buf, h.states_end).is_err());
    }

    #[test]
    fn rejects_bad_page_shift() {
        for shift in [7u8, 25] {
            let mut h = sample();
            h.page_shift = shift;
            h.states_start = 1 << 12;
            h.states_end = h.states_start;
            let buf = h.encode();
            assert!(read_header(&buf, 1 << 13).is_err(), "shift {}", shift);
        }
    }

    #[test]
    fn rejects_region_beyond_file() {
        let h = sample();
        let buf = h.encode();
        assert!(read_header(&buf, h.states_end - 1).is_err());
    }
}
