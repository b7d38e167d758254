pub mod key;
pub mod parse_script;
pub mod sighash;
pub mod verify;

use crate::error::Result;
use coinscript_primitives::Ecc;
use coinscript_tx::{Transaction, TxCache};
use serde::Serialize;
use std::path::Path;

/// State shared by the subcommands.
pub struct Context {
    pub testnet: bool,
    pub cache: TxCache,
    pub ecc: Ecc,
}

impl Context {
    pub fn new(testnet: bool, cache_path: Option<&Path>) -> Result<Self> {
        let cache = match cache_path {
            Some(path) => TxCache::load(path)?,
            None => TxCache::new(),
        };

        tracing::debug!(testnet, cached_txs = cache.len(), "Initialized context");

        Ok(Self {
            testnet,
            cache,
            ecc: Ecc::new(),
        })
    }

    fn parse_tx(&self, raw: &str) -> Result<Transaction> {
        Ok(Transaction::from_hex(strip_0x(raw), self.testnet)?)
    }
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn strip_0x(input: &str) -> &str {
    input.strip_prefix("0x").unwrap_or(input)
}
