//! build — сборка файла состояний с нуля.
//!
//! Это НЕ запись в открытую базу (формат неизменяем после сборки) и не
//! ETL: на вход идут уже готовые записи. Используется тестами, командой
//! `chronodb build` и внешними генераторами фикстур.
//!
//! Внутри: сортировка записей в составном порядке ключа, пострачничная
//! укладка (запись никогда не пересекает границу страницы; контекст
//! кодера сбрасывается на каждой странице, как и у декодера) и заголовок.

pub mod encode;

use anyhow::{anyhow, Context, Result};
use ethereum_types::{Address, H256, U256};
use std::fs;
use std::path::Path;

use crate::consts::{
    ACC_FIELD_VAR, ACC_FLAG_BALANCE, ACC_FLAG_CODEHASH, ACC_INCARNATION_SHIFT, ACC_NONCE_SHIFT,
    HEADER_SIZE, OP_ACCOUNT_MIN, OP_ADDRESS, OP_INCARNATION, OP_PAGE_END, OP_STORAGE_MIN,
    PAGE_SHIFT_MAX, PAGE_SHIFT_MIN, STO_DELTA_BIT, STO_SLOT_FIXED, STO_SLOT_INLINE_MAX,
    STO_SLOT_SHIFT, STO_SLOT_VAR, STO_VALUE_INLINE_MAX, STO_VALUE_VAR, STO_VALUE_VAR_NOT,
};
use crate::meta::FileHeader;
use crate::page::Account;

use self::encode::{
    be_bytes_u256, be_bytes_u64, encode_u256_fixed, encode_u256_var, encode_u64_var, u256_var_len,
};

#[derive(Debug, Clone)]
enum Payload {
    Account(Account),
    Storage {
        incarnation: u64,
        slot: U256,
        value: U256,
    },
}

#[derive(Debug, Clone)]
struct Rec {
    address: Address,
    block: u64,
    payload: Payload,
}

impl Rec {
    /// Ключ сортировки: (адрес, вид, инкарнация, слот, блок);
    /// account-записи адреса идут раньше его storage-записей.
    fn sort_key(&self) -> (Address, u8, u64, U256, u64) {
        match &self.payload {
            Payload::Account(_) => (self.address, 0, 0, U256::zero(), self.block),
            Payload::Storage {
                incarnation, slot, ..
            } => (self.address, 1, *incarnation, *slot, self.block),
        }
    }
}

/// Построитель файла состояний.
pub struct FileBuilder {
    page_shift: u8,
    block_first: u64,
    block_last: u64,
    recs: Vec<Rec>,
}

impl FileBuilder {
    pub fn new(page_shift: u8, block_first: u64, block_last: u64) -> Result<Self> {
        if !(PAGE_SHIFT_MIN..=PAGE_SHIFT_MAX).contains(&page_shift) {
            return Err(anyhow!(
                "page_shift {} out of range [{}..{}]",
                page_shift,
                PAGE_SHIFT_MIN,
                PAGE_SHIFT_MAX
            ));
        }
        if block_first > block_last {
            return Err(anyhow!(
                "block range [{}..{}] is empty",
                block_first,
                block_last
            ));
        }
        Ok(Self {
            page_shift,
            block_first,
            block_last,
            recs: Vec::new(),
        })
    }

    pub fn add_account(&mut self, block: u64, address: Address, account: Account) {
        self.recs.push(Rec {
            address,
            block,
            payload: Payload::Account(account),
        });
    }

    pub fn add_storage(
        &mut self,
        block: u64,
        address: Address,
        incarnation: u64,
        slot: U256,
        value: U256,
    ) {
        self.recs.push(Rec {
            address,
            block,
            payload: Payload::Storage {
                incarnation,
                slot,
                value,
            },
        });
    }

    /// Собрать файл в память.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let page_size = 1usize << self.page_shift;

        let mut count_accounts = 0u64;
        let mut count_storages = 0u64;
        for rec in &self.recs {
            if rec.block < self.block_first || rec.block > self.block_last {
                return Err(anyhow!(
                    "entry block {} outside [{}..{}]",
                    rec.block,
                    self.block_first,
                    self.block_last
                ));
            }
            match &rec.payload {
                Payload::Account(_) => count_accounts += 1,
                Payload::Storage { incarnation, .. } => {
                    if *incarnation == 0 {
                        return Err(anyhow!("storage incarnation must be >= 1"));
                    }
                    count_storages += 1;
                }
            }
        }

        let mut recs = self.recs.clone();
        recs.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        for pair in recs.windows(2) {
            if pair[0].sort_key() == pair[1].sort_key() {
                return Err(anyhow!(
                    "duplicate entry for address {} at block {}",
                    pair[0].address,
                    pair[0].block
                ));
            }
        }

        // Укладка по страницам: запись либо влезает целиком (с местом под
        // терминатор), либо уезжает на новую страницу с чистым контекстом.
        let mut pages: Vec<Vec<u8>> = Vec::new();
        let mut page: Vec<u8> = Vec::with_capacity(page_size);
        let mut ctx = EncCtx::default();

        for rec in &recs {
            let mut trial_ctx = ctx.clone();
            let mut buf = Vec::new();
            encode_record(rec, &mut trial_ctx, &mut buf);

            if page.len() + buf.len() + 1 > page_size {
                if page.is_empty() {
                    return Err(anyhow!("entry does not fit page of {} bytes", page_size));
                }
                close_page(&mut page, page_size);
                pages.push(std::mem::take(&mut page));

                ctx = EncCtx::default();
                buf.clear();
                encode_record(rec, &mut ctx, &mut buf);
                if buf.len() + 1 > page_size {
                    return Err(anyhow!("entry does not fit page of {} bytes", page_size));
                }
            } else {
                ctx = trial_ctx;
            }
            page.extend_from_slice(&buf);
        }
        if !page.is_empty() {
            close_page(&mut page, page_size);
            pages.push(page);
        }

        // Первая страница начинается на ближайшей странично-выровненной
        // границе после заголовка.
        let states_start = align_up(HEADER_SIZE as u64, page_size as u64);
        let states_end = states_start + (pages.len() * page_size) as u64;

        let header = FileHeader {
            version: crate::consts::FILE_VERSION,
            states_start,
            states_end,
            page_shift: self.page_shift,
            block_first: self.block_first,
            block_last: self.block_last,
            count_accounts,
            count_storages,
        };

        let mut out = Vec::with_capacity(states_end as usize);
        out.extend_from_slice(&header.encode());
        out.resize(states_start as usize, 0);
        for p in &pages {
            out.extend_from_slice(p);
        }
        Ok(out)
    }

    /// Собрать и записать файл на диск.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, &bytes).with_context(|| format!("write state file {}", path.display()))?;
        log::info!(
            "built {}: {} bytes, {} entries",
            path.display(),
            bytes.len(),
            self.recs.len()
        );
        Ok(())
    }
}

#[inline]
fn align_up(n: u64, a: u64) -> u64 {
    (n + a - 1) & !(a - 1)
}

fn close_page(page: &mut Vec<u8>, page_size: usize) {
    page.push(OP_PAGE_END);
    page.resize(page_size, 0);
}

/// Контекст кодера — зеркало DecodeCtx.
#[derive(Debug, Clone, Default)]
struct EncCtx {
    has_block: bool,
    block: u64,
    has_address: bool,
    address: Address,
    incarnation: u64,
    prev_slot: U256,
}

fn emit_address(address: &Address, ctx: &mut EncCtx, out: &mut Vec<u8>) {
    out.push(OP_ADDRESS);
    out.extend_from_slice(address.as_bytes());
    ctx.address = *address;
    ctx.has_address = true;
    ctx.incarnation = 0;
}

fn encode_record(rec: &Rec, ctx: &mut EncCtx, out: &mut Vec<u8>) {
    if !ctx.has_block || ctx.block != rec.block {
        let bytes = be_bytes_u64(rec.block);
        out.push(bytes.len() as u8); // опкод 1..8
        out.extend_from_slice(&bytes);
        ctx.block = rec.block;
        ctx.has_block = true;
    }
    if !ctx.has_address || ctx.address != rec.address {
        emit_address(&rec.address, ctx, out);
    }

    match &rec.payload {
        Payload::Account(acc) => encode_account(acc, ctx, out),
        Payload::Storage {
            incarnation,
            slot,
            value,
        } => encode_storage(*incarnation, slot, value, ctx, out),
    }
}

fn encode_account(acc: &Account, ctx: &mut EncCtx, out: &mut Vec<u8>) {
    let mut flags = 0u8;
    let mut tail = Vec::new();

    if !acc.balance.is_zero() {
        flags |= ACC_FLAG_BALANCE;
        encode_u256_var(&acc.balance, &mut tail);
    }
    if acc.code_hash != H256::zero() {
        flags |= ACC_FLAG_CODEHASH;
        tail.extend_from_slice(acc.code_hash.as_bytes());
    }
    if acc.nonce < ACC_FIELD_VAR as u64 {
        flags |= (acc.nonce as u8) << ACC_NONCE_SHIFT;
    } else {
        flags |= ACC_FIELD_VAR << ACC_NONCE_SHIFT;
        encode_u64_var(acc.nonce, &mut tail);
    }
    if acc.incarnation < ACC_FIELD_VAR as u64 {
        flags |= (acc.incarnation as u8) << ACC_INCARNATION_SHIFT;
    } else {
        flags |= ACC_FIELD_VAR << ACC_INCARNATION_SHIFT;
        encode_u64_var(acc.incarnation, &mut tail);
    }

    out.push(OP_ACCOUNT_MIN + flags);
    out.extend_from_slice(&tail);
    ctx.incarnation = acc.incarnation;
}

fn encode_storage(incarnation: u64, slot: &U256, value: &U256, ctx: &mut EncCtx, out: &mut Vec<u8>) {
    // Инкарнация: контекстная (0 трактуется как 1) плюс одноразовый
    // аддитивный override. Уменьшение выражается повторным опкодом адреса,
    // который сбрасывает контекст к базе 1.
    let effective = if ctx.incarnation == 0 { 1 } else { ctx.incarnation };
    if incarnation != effective {
        if incarnation > effective {
            out.push(OP_INCARNATION);
            encode_u64_var(incarnation - effective, out);
        } else {
            let address = ctx.address;
            emit_address(&address, ctx, out);
            if incarnation != 1 {
                out.push(OP_INCARNATION);
                encode_u64_var(incarnation - 1, out);
            }
        }
    }

    // Слот: литерал 0..8, дельта от prev_slot+1, varint или 32 байта.
    let mut slot_tail = Vec::new();
    let (slot_class, delta_bit) = if *slot <= U256::from(STO_SLOT_INLINE_MAX) {
        (slot.low_u64() as u8, 0u8)
    } else if *slot > ctx.prev_slot
        && (*slot - ctx.prev_slot - U256::one()) <= U256::from(STO_SLOT_INLINE_MAX)
    {
        (
            (*slot - ctx.prev_slot - U256::one()).low_u64() as u8,
            STO_DELTA_BIT,
        )
    } else if be_bytes_u256(slot).len() >= 32 {
        encode_u256_fixed(slot, &mut slot_tail);
        (STO_SLOT_FIXED, 0u8)
    } else {
        encode_u256_var(slot, &mut slot_tail);
        (STO_SLOT_VAR, 0u8)
    };

    // Значение: литерал 0..5; иначе varint, при выгоде — инвертированный.
    let mut value_tail = Vec::new();
    let value_class = if *value <= U256::from(STO_VALUE_INLINE_MAX) {
        value.low_u64() as u8
    } else {
        let inverted = !*value;
        if u256_var_len(&inverted) < u256_var_len(value) {
            encode_u256_var(&inverted, &mut value_tail);
            STO_VALUE_VAR_NOT
        } else {
            encode_u256_var(value, &mut value_tail);
            STO_VALUE_VAR
        }
    };

    out.push(OP_STORAGE_MIN + (slot_class << STO_SLOT_SHIFT) + delta_bit + value_class);
    out.extend_from_slice(&slot_tail);
    out.extend_from_slice(&value_tail);
    ctx.prev_slot = *slot;
}
