//! page/decode — декодер записей одной страницы.
//!
//! Контекстные регистры (блок, адрес, инкарнация, prev_slot) живут только
//! в пределах страницы и в начале страницы пусты, поэтому каждая страница
//! декодируется независимо. Записи опускают совпадающие с контекстом поля;
//! вместо них в потоке идут опкоды обновления контекста.

use ethereum_types::{Address, H256, U256};

use crate::consts::{
    ACC_FIELD_MASK, ACC_FIELD_VAR, ACC_FLAG_BALANCE, ACC_FLAG_CODEHASH, ACC_INCARNATION_SHIFT,
    ACC_NONCE_SHIFT, OP_ACCOUNT_MAX, OP_ACCOUNT_MIN, OP_ADDRESS, OP_BLOCK_MAX, OP_BLOCK_MIN,
    OP_INCARNATION, OP_PAGE_END, OP_STORAGE_MAX, OP_STORAGE_MIN, STO_DELTA_BIT, STO_SLOT_SHIFT,
    STO_SLOT_VAR, STO_VALUE_MASK, STO_VALUE_VAR, STO_VALUE_VAR_NOT,
};

use super::entry::{Account, Entry};
use super::stream::{ByteStream, ScanStop, StreamResult};

/// Контекст декодера. Сбрасывается в начале каждой страницы.
#[derive(Debug, Default)]
pub struct DecodeCtx {
    pub has_block: bool,
    pub block: u64,
    pub has_address: bool,
    pub address: Address,
    pub incarnation: u64,
    pub prev_slot: U256,
    /// Одноразовый аддитивный override инкарнации (опкод 250);
    /// гасится ближайшей storage-записью.
    pub incarnation_delta: u64,
}

/// Декодировать следующую запись. `Ok(None)` — паддинг конца страницы.
pub fn decode_entry<'a>(
    stream: &mut ByteStream<'a>,
    ctx: &mut DecodeCtx,
) -> StreamResult<Option<Entry>> {
    loop {
        let op = stream.get_byte()?;
        match op {
            OP_PAGE_END => return Ok(None),

            OP_BLOCK_MIN..=OP_BLOCK_MAX => {
                ctx.block = stream.read_u64_be(op as usize)?;
                ctx.has_block = true;
            }

            OP_ADDRESS => {
                let raw = stream.get_bytes(20)?;
                ctx.address = Address::from_slice(raw);
                ctx.has_address = true;
                ctx.incarnation = 0;
            }

            OP_ACCOUNT_MIN..=OP_ACCOUNT_MAX => {
                return decode_account(stream, ctx, op - OP_ACCOUNT_MIN).map(Some);
            }

            OP_STORAGE_MIN..=OP_STORAGE_MAX => {
                return decode_storage(stream, ctx, op - OP_STORAGE_MIN).map(Some);
            }

            OP_INCARNATION => {
                ctx.incarnation_delta = stream.read_u64_var()?;
            }

            _ => return Err(ScanStop::Syntax),
        }
    }
}

fn decode_account<'a>(
    stream: &mut ByteStream<'a>,
    ctx: &mut DecodeCtx,
    flags: u8,
) -> StreamResult<Entry> {
    let balance = if flags & ACC_FLAG_BALANCE != 0 {
        stream.read_u256_var()?
    } else {
        U256::zero()
    };

    let code_hash = if flags & ACC_FLAG_CODEHASH != 0 {
        H256::from_slice(stream.get_bytes(32)?)
    } else {
        H256::zero()
    };

    let nonce_bits = (flags >> ACC_NONCE_SHIFT) & ACC_FIELD_MASK;
    let nonce = if nonce_bits == ACC_FIELD_VAR {
        stream.read_u64_var()?
    } else {
        nonce_bits as u64
    };

    let inc_bits = (flags >> ACC_INCARNATION_SHIFT) & ACC_FIELD_MASK;
    let incarnation = if inc_bits == ACC_FIELD_VAR {
        stream.read_u64_var()?
    } else {
        inc_bits as u64
    };

    // Storage-записи этого адреса дальше по странице наследуют инкарнацию.
    ctx.incarnation = incarnation;

    Ok(Entry {
        has_block: ctx.has_block,
        block: ctx.block,
        has_address: ctx.has_address,
        address: ctx.address,
        has_account: true,
        account: Account {
            nonce,
            incarnation,
            balance,
            code_hash,
        },
        ..Default::default()
    })
}

fn decode_storage<'a>(
    stream: &mut ByteStream<'a>,
    ctx: &mut DecodeCtx,
    flags: u8,
) -> StreamResult<Entry> {
    let slot_class = flags >> STO_SLOT_SHIFT;
    let mut slot = if slot_class < STO_SLOT_VAR {
        U256::from(slot_class)
    } else if slot_class == STO_SLOT_VAR {
        stream.read_u256_var()?
    } else {
        stream.read_u256_fixed()?
    };

    if flags & STO_DELTA_BIT != 0 {
        // Дельта считается от prev_slot + 1, не от prev_slot.
        let (base, _) = ctx.prev_slot.overflowing_add(U256::one());
        let (sum, _) = slot.overflowing_add(base);
        slot = sum;
    }

    let value_class = flags & STO_VALUE_MASK;
    let value = if value_class < STO_VALUE_VAR {
        U256::from(value_class)
    } else {
        let v = stream.read_u256_var()?;
        // Инверсия применяется только к varint-классу, не к литералам.
        if value_class == STO_VALUE_VAR_NOT {
            !v
        } else {
            v
        }
    };

    let base_incarnation = if ctx.incarnation == 0 { 1 } else { ctx.incarnation };
    let incarnation = base_incarnation.wrapping_add(ctx.incarnation_delta);
    ctx.incarnation_delta = 0;
    ctx.prev_slot = slot;

    Ok(Entry {
        has_block: ctx.has_block,
        block: ctx.block,
        has_address: ctx.has_address,
        address: ctx.address,
        has_storage: true,
        incarnation,
        slot,
        value,
        ..Default::default()
    })
}
