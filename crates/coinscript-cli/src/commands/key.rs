use super::{Context, strip_0x};
use crate::error::Result;
use coinscript_primitives::PrivateKey;
use serde::Serialize;

/// Derive the public key, WIF and address of a secret key.
#[derive(Debug, clap::Args)]
pub struct KeyCmd {
    /// Secret key as 32-byte hex.
    #[arg(index = 1)]
    pub secret: String,

    /// Use the uncompressed SEC encoding.
    #[arg(long)]
    pub uncompressed: bool,
}

#[derive(Debug, Serialize)]
pub struct KeyReport {
    pub sec: String,
    pub wif: String,
    pub address: String,
}

impl KeyCmd {
    pub fn run(&self, ctx: &Context) -> Result<KeyReport> {
        let compressed = !self.uncompressed;
        let key = PrivateKey::from_slice(&hex::decode(strip_0x(&self.secret))?)?;
        let point = ctx.ecc.public_key(&key);

        Ok(KeyReport {
            sec: hex::encode(point.sec(compressed)),
            wif: key.wif(compressed, ctx.testnet),
            address: point.address(compressed, ctx.testnet),
        })
    }
}
