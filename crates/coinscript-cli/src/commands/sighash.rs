use super::Context;
use crate::error::Result;
use coinscript_tx::InputDigest;
use serde::Serialize;

/// Print the signature digest of a transaction input.
#[derive(Debug, clap::Args)]
pub struct SighashCmd {
    /// Raw transaction hex.
    #[arg(index = 1)]
    pub tx: String,

    /// Index of the input.
    #[arg(long, default_value_t = 0)]
    pub input: usize,
}

#[derive(Debug, Serialize)]
pub struct SighashReport {
    pub input: usize,
    pub algorithm: &'static str,
    pub sighash: String,
}

impl SighashCmd {
    pub fn run(&self, ctx: &Context) -> Result<SighashReport> {
        let tx = ctx.parse_tx(&self.tx)?;
        let InputDigest { z, uses_witness } = tx.input_digest(&ctx.cache, self.input)?;

        Ok(SighashReport {
            input: self.input,
            algorithm: if uses_witness { "bip143" } else { "legacy" },
            sighash: hex::encode(z),
        })
    }
}
