//! db/query — публичные точечные запросы.
//!
//! query_account: «какой был аккаунт по адресу на блоке N».
//! query_storage: «какое было значение слота на блоке N» — сначала
//! резолвится аккаунт, его инкарнация входит в ключ слота.
//!
//! Блоки вне [block_first, block_last] не экстраполируются: ответ
//! not-found, намеренно неотличимый от «ключа нет».

use ethereum_types::{Address, U256};

use crate::page::{Account, SearchKey};

use super::core::Db;

impl Db {
    /// Состояние аккаунта `address` на блоке `block`.
    /// (false, default) — аккаунта не было или блок вне диапазона файла.
    pub fn query_account(&self, block: u64, address: Address) -> (bool, Account) {
        self.metrics.record_query();

        if block < self.header.block_first || block > self.header.block_last {
            return (false, Account::default());
        }

        match self.account_at(block, address) {
            Some(acc) => (true, acc),
            None => (false, Account::default()),
        }
    }

    /// Значение слота `slot` аккаунта `address` на блоке `block`.
    /// Инкарнация берётся из найденного аккаунта; инкарнация 0 означает
    /// «аккаунт без storage» и сразу даёт (false, 0).
    pub fn query_storage(&self, block: u64, address: Address, slot: U256) -> (bool, U256) {
        self.metrics.record_query();

        if block < self.header.block_first || block > self.header.block_last {
            return (false, U256::zero());
        }

        let incarnation = match self.account_at(block, address) {
            Some(acc) if acc.incarnation != 0 => acc.incarnation,
            _ => return (false, U256::zero()),
        };

        let key = SearchKey::storage(block, address, incarnation, slot);
        match self.lookup(&key) {
            Some(e) if e.has_storage => (true, e.value),
            _ => (false, U256::zero()),
        }
    }

    fn account_at(&self, block: u64, address: Address) -> Option<Account> {
        let key = SearchKey::account(block, address);
        let e = self.lookup(&key)?;
        e.has_account.then(|| e.account)
    }
}
