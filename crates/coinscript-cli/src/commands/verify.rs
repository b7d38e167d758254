use super::Context;
use crate::error::Result;
use serde::Serialize;

/// Verify every input of a transaction.
#[derive(Debug, clap::Args)]
pub struct VerifyCmd {
    /// Raw transaction hex.
    #[arg(index = 1)]
    pub tx: String,
}

#[derive(Debug, Serialize)]
pub struct InputReport {
    pub index: usize,
    pub prevout: String,
    pub script_type: &'static str,
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub txid: String,
    pub fee: i64,
    pub inputs: Vec<InputReport>,
    pub valid: bool,
}

impl VerifyCmd {
    pub fn run(&self, ctx: &Context) -> Result<VerifyReport> {
        let tx = ctx.parse_tx(&self.tx)?;
        let fetcher = &ctx.cache;

        let fee = tx.fee(fetcher)?;

        let mut inputs = Vec::with_capacity(tx.inputs.len());
        for (index, input) in tx.inputs.iter().enumerate() {
            let script_pubkey = input.script_pubkey(fetcher, ctx.testnet)?;
            let valid = tx.verify_input(fetcher, &ctx.ecc, index)?;
            inputs.push(InputReport {
                index,
                prevout: format!("{}:{}", input.prev_tx, input.prev_index),
                script_type: script_pubkey.script_type().script_type(),
                valid,
            });
        }

        // Same outcome as `Transaction::verify`, without evaluating twice.
        let valid = fee >= 0 && inputs.iter().all(|input| input.valid);

        let txid = tx.id()?.to_string();
        tracing::info!(%txid, fee, valid, "Verified transaction");

        Ok(VerifyReport {
            txid,
            fee,
            inputs,
            valid,
        })
    }
}
