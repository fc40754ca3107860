//! page/entry — логические записи, поисковый ключ и составной компаратор.
//!
//! Порядок ключа смешанный: поля идентичности (адрес, инкарнация, слот)
//! сравниваются на равенство, хвостовой blockNumber — nearest-not-greater.
//! Компаратор возвращает только EQ/LT/GT; проверка идентичности после
//! GT — отдельный шаг (см. db/search).

use std::cmp::Ordering;

use ethereum_types::{Address, H256, U256};

/// Аккаунт на момент блока. Нулевой code_hash означает «пусто».
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Account {
    pub nonce: u64,
    pub incarnation: u64,
    pub balance: U256,
    pub code_hash: H256,
}

/// Декодированная запись страницы. Флаги присутствия отражают,
/// какие контекстные опкоды встретились с начала страницы.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    pub has_block: bool,
    pub block: u64,

    pub has_address: bool,
    pub address: Address,

    pub has_account: bool,
    pub account: Account,

    pub has_storage: bool,
    pub incarnation: u64,
    pub slot: U256,
    pub value: U256,
}

/// Поисковый ключ с флагами присутствия компонент.
#[derive(Debug, Clone, Default)]
pub struct SearchKey {
    pub has_block: bool,
    pub block: u64,

    pub has_address: bool,
    pub address: Address,

    pub has_incarnation: bool,
    pub incarnation: u64,

    pub has_slot: bool,
    pub slot: U256,
}

impl SearchKey {
    /// Ключ для запроса аккаунта: {block, address}.
    pub fn account(block: u64, address: Address) -> Self {
        Self {
            has_block: true,
            block,
            has_address: true,
            address,
            ..Default::default()
        }
    }

    /// Ключ для запроса слота: {block, address, incarnation, slot}.
    pub fn storage(block: u64, address: Address, incarnation: u64, slot: U256) -> Self {
        Self {
            has_block: true,
            block,
            has_address: true,
            address,
            has_incarnation: true,
            incarnation,
            has_slot: true,
            slot,
        }
    }

    /// Совпадение по компонентам идентичности (всё, кроме блока).
    /// Обязательная перепроверка после GT из L2: GT гарантирует только
    /// nearest-not-greater по блоку.
    pub fn matches_identity(&self, e: &Entry) -> bool {
        if self.has_address != e.has_address {
            return false;
        }
        if self.has_address && self.address != e.address {
            return false;
        }
        if self.has_incarnation != e.has_storage {
            return false;
        }
        if self.has_incarnation && self.incarnation != e.incarnation {
            return false;
        }
        if self.has_slot != e.has_storage {
            return false;
        }
        if self.has_slot && self.slot != e.slot {
            return false;
        }
        true
    }
}

/// Составное сравнение ключа с записью; Greater означает «ключ больше».
/// Решает первый не-равный компонент, в порядке:
/// адрес-флаг, адрес, инкарнация-флаг, инкарнация, слот-флаг, слот,
/// блок-флаг, блок. Флаг false < true.
pub fn compare_general(key: &SearchKey, e: &Entry) -> Ordering {
    let c = key.has_address.cmp(&e.has_address);
    if c != Ordering::Equal {
        return c;
    }
    if key.has_address {
        let c = key.address.as_bytes().cmp(e.address.as_bytes());
        if c != Ordering::Equal {
            return c;
        }
    }

    // Для ключа наличие инкарнации/слота сопоставляется с тем,
    // является ли запись storage-записью.
    let c = key.has_incarnation.cmp(&e.has_storage);
    if c != Ordering::Equal {
        return c;
    }
    if key.has_incarnation {
        let c = key.incarnation.cmp(&e.incarnation);
        if c != Ordering::Equal {
            return c;
        }
    }

    let c = key.has_slot.cmp(&e.has_storage);
    if c != Ordering::Equal {
        return c;
    }
    if key.has_slot {
        let c = key.slot.cmp(&e.slot);
        if c != Ordering::Equal {
            return c;
        }
    }

    let c = key.has_block.cmp(&e.has_block);
    if c != Ordering::Equal {
        return c;
    }
    if key.has_block {
        let c = key.block.cmp(&e.block);
        if c != Ordering::Equal {
            return c;
        }
    }

    Ordering::Equal
}
