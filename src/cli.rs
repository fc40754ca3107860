// src/cli.rs

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::build::FileBuilder;
use crate::db::Db;
use crate::page::Account;
use crate::util::{addr_hex, h256_hex, parse_address, parse_h256, parse_u256, u256_hex};

#[derive(Parser, Debug)]
#[command(
    name = "chronodb",
    version,
    about = "Read-only Ethereum state history DB: point-in-time account and storage queries",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Напечатать проверенный заголовок файла
    Header {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Аккаунт по адресу на блоке
    Account {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        block: u64,
        #[arg(long)]
        address: String,
        #[arg(long)]
        json: bool,
    },
    /// Значение storage-слота на блоке
    Storage {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        block: u64,
        #[arg(long)]
        address: String,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        json: bool,
    },
    /// Полный обход файла с проверкой инвариантов формата
    Check {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Собрать файл состояний из JSON-описания
    Build {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        spec: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Header { path, json } => cmd_header(path, json),
        Cmd::Account {
            path,
            block,
            address,
            json,
        } => cmd_account(path, block, &address, json),
        Cmd::Storage {
            path,
            block,
            address,
            slot,
            json,
        } => cmd_storage(path, block, &address, &slot, json),
        Cmd::Check { path, json } => cmd_check(path, json),
        Cmd::Build { path, spec } => cmd_build(path, spec),
    }
}

// ----------------- header -----------------

#[derive(Serialize)]
struct HeaderOut {
    version: u64,
    states_start: u64,
    states_end: u64,
    page_shift: u8,
    page_size: u64,
    block_first: u64,
    block_last: u64,
    count_accounts: u64,
    count_storages: u64,
}

pub fn cmd_header(path: PathBuf, json: bool) -> Result<()> {
    let db = Db::open(&path)?;
    let h = db.header();
    let out = HeaderOut {
        version: h.version,
        states_start: h.states_start,
        states_end: h.states_end,
        page_shift: h.page_shift,
        page_size: h.page_size(),
        block_first: h.block_first,
        block_last: h.block_last,
        count_accounts: h.count_accounts,
        count_storages: h.count_storages,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("version:        {}", out.version);
        println!("states:         [{} .. {})", out.states_start, out.states_end);
        println!("page size:      {} B (shift {})", out.page_size, out.page_shift);
        println!("blocks:         [{} .. {}]", out.block_first, out.block_last);
        println!("accounts:       {}", out.count_accounts);
        println!("storage slots:  {}", out.count_storages);
    }
    Ok(())
}

// ----------------- queries -----------------

#[derive(Serialize)]
struct AccountOut {
    found: bool,
    block: u64,
    address: String,
    nonce: u64,
    incarnation: u64,
    balance: String,
    code_hash: String,
}

pub fn cmd_account(path: PathBuf, block: u64, address: &str, json: bool) -> Result<()> {
    let address = parse_address(address)?;
    let db = Db::open(&path)?;
    let (found, acc) = db.query_account(block, address);
    log::debug!("query stats: {:?}", db.stats());

    let out = AccountOut {
        found,
        block,
        address: addr_hex(&address),
        nonce: acc.nonce,
        incarnation: acc.incarnation,
        balance: u256_hex(&acc.balance),
        code_hash: h256_hex(&acc.code_hash),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if found {
        println!(
            "account {} @ block {}: nonce={} incarnation={} balance={} code_hash={}",
            out.address, block, out.nonce, out.incarnation, out.balance, out.code_hash
        );
    } else {
        println!("account {} @ block {}: not found", out.address, block);
    }
    Ok(())
}

#[derive(Serialize)]
struct StorageOut {
    found: bool,
    block: u64,
    address: String,
    slot: String,
    value: String,
}

pub fn cmd_storage(path: PathBuf, block: u64, address: &str, slot: &str, json: bool) -> Result<()> {
    let address = parse_address(address)?;
    let slot = parse_u256(slot)?;
    let db = Db::open(&path)?;
    let (found, value) = db.query_storage(block, address, slot);
    log::debug!("query stats: {:?}", db.stats());

    let out = StorageOut {
        found,
        block,
        address: addr_hex(&address),
        slot: u256_hex(&slot),
        value: u256_hex(&value),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if found {
        println!(
            "storage {} slot {} @ block {}: {}",
            out.address, out.slot, block, out.value
        );
    } else {
        println!("storage {} slot {} @ block {}: not found", out.address, out.slot, block);
    }
    Ok(())
}

// ----------------- check -----------------

pub fn cmd_check(path: PathBuf, json: bool) -> Result<()> {
    let db = Db::open(&path)?;
    let report = db.check();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "pages={} entries={} accounts={} storages={}",
            report.pages, report.entries, report.accounts, report.storages
        );
        for issue in &report.issues {
            println!("ISSUE: {}", issue);
        }
    }
    if !report.ok() {
        return Err(anyhow!("check failed: {} issue(s)", report.issues.len()));
    }
    Ok(())
}

// ----------------- build -----------------

#[derive(Debug, Deserialize)]
struct BuildSpec {
    page_shift: u8,
    block_first: u64,
    block_last: u64,
    #[serde(default)]
    accounts: Vec<AccountSpec>,
    #[serde(default)]
    storages: Vec<StorageSpec>,
}

#[derive(Debug, Deserialize)]
struct AccountSpec {
    block: u64,
    address: String,
    #[serde(default)]
    nonce: u64,
    #[serde(default)]
    incarnation: u64,
    balance: Option<String>,
    code_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StorageSpec {
    block: u64,
    address: String,
    incarnation: u64,
    slot: String,
    value: String,
}

pub fn cmd_build(path: PathBuf, spec_path: PathBuf) -> Result<()> {
    let raw = fs::read_to_string(&spec_path)
        .with_context(|| format!("read build spec {}", spec_path.display()))?;
    let spec: BuildSpec = serde_json::from_str(&raw)
        .with_context(|| format!("parse build spec {}", spec_path.display()))?;

    let mut builder = FileBuilder::new(spec.page_shift, spec.block_first, spec.block_last)?;

    for a in &spec.accounts {
        let account = Account {
            nonce: a.nonce,
            incarnation: a.incarnation,
            balance: a.balance.as_deref().map(parse_u256).transpose()?.unwrap_or_default(),
            code_hash: a
                .code_hash
                .as_deref()
                .map(parse_h256)
                .transpose()?
                .unwrap_or_default(),
        };
        builder.add_account(a.block, parse_address(&a.address)?, account);
    }
    for s in &spec.storages {
        builder.add_storage(
            s.block,
            parse_address(&s.address)?,
            s.incarnation,
            parse_u256(&s.slot)?,
            parse_u256(&s.value)?,
        );
    }

    builder.write_to(&path)?;
    println!(
        "built {} ({} accounts, {} storage slots)",
        path.display(),
        spec.accounts.len(),
        spec.storages.len()
    );
    Ok(())
}
