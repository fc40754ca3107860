// Заголовок файла состояний (LE, все поля 64-битные)
pub const FILE_VERSION: u64 = 202202111;
pub const HEADER_SIZE: usize = 64;

// Offsets inside the header
pub const HDR_OFF_VERSION: usize = 0;
pub const HDR_OFF_STATES_START: usize = 8;
pub const HDR_OFF_STATES_END: usize = 16;
pub const HDR_OFF_PAGE_SHIFT: usize = 24;
pub const HDR_OFF_BLOCK_FIRST: usize = 32;
pub const HDR_OFF_BLOCK_LAST: usize = 40;
pub const HDR_OFF_COUNT_ACCOUNTS: usize = 48;
pub const HDR_OFF_COUNT_STORAGES: usize = 56;

// Страницы: размер = 1 << page_shift
pub const PAGE_SHIFT_MIN: u8 = 8;
pub const PAGE_SHIFT_MAX: u8 = 24;

// Varint: значения < 224 кодируются одним байтом; иначе
// [224 + (len-1)][big-endian bytes].
pub const VARINT_THRESHOLD: u8 = 224;

// ---- Опкоды записей внутри страницы ----

// 0 — паддинг до конца страницы
pub const OP_PAGE_END: u8 = 0;

// 1..8 — установить текущий blockNumber: B big-endian байт
pub const OP_BLOCK_MIN: u8 = 1;
pub const OP_BLOCK_MAX: u8 = 8;

// 9 — установить текущий адрес (20 байт), сбросить инкарнацию в 0
pub const OP_ADDRESS: u8 = 9;

// 10..73 — account-запись; младшие 6 бит (op - 10) — флаги
pub const OP_ACCOUNT_MIN: u8 = 10;
pub const OP_ACCOUNT_MAX: u8 = 73;

// 74..249 — storage-запись; (op - 74) — флаги слота/значения
pub const OP_STORAGE_MIN: u8 = 74;
pub const OP_STORAGE_MAX: u8 = 249;

// 250 — аддитивный override инкарнации для следующей storage-записи
pub const OP_INCARNATION: u8 = 250;

// ---- Флаги account-записи (F = op - OP_ACCOUNT_MIN, 6 бит) ----
pub const ACC_FLAG_BALANCE: u8 = 0x01; // баланс следует как U256-var, иначе 0
pub const ACC_FLAG_CODEHASH: u8 = 0x02; // 32 байта codeHash, иначе ZERO
pub const ACC_NONCE_SHIFT: u8 = 2; // биты 2..3: 0..2 литерал, 3 => U64-var
pub const ACC_INCARNATION_SHIFT: u8 = 4; // биты 4..5: 0..2 литерал, 3 => U64-var
pub const ACC_FIELD_MASK: u8 = 0x03;
pub const ACC_FIELD_VAR: u8 = 0x03;

// ---- Флаги storage-записи (F = op - OP_STORAGE_MIN) ----
pub const STO_SLOT_SHIFT: u8 = 4; // F>>4: 0..8 литерал, 9 => U256-var, 10.. => 32 байта
pub const STO_SLOT_INLINE_MAX: u8 = 8;
pub const STO_SLOT_VAR: u8 = 9;
pub const STO_SLOT_FIXED: u8 = 10;
pub const STO_DELTA_BIT: u8 = 0x08; // слот кодируется как дельта от prevSlot + 1
pub const STO_VALUE_MASK: u8 = 0x07; // 0..5 литерал, 6 => U256-var, 7 => U256-var с NOT
pub const STO_VALUE_INLINE_MAX: u8 = 5;
pub const STO_VALUE_VAR: u8 = 6;
pub const STO_VALUE_VAR_NOT: u8 = 7;
