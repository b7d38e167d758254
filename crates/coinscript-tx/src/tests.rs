
use crate::{FetchError, Transaction, TxFetcher, TxId, TxOut};
use coinscript_script::Script;
use std::collections::HashMap;

pub(crate) fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("coinscript_tx=debug,coinscript_script=debug")
        .with_test_writer()
        .try_init();
}

/// 452c629d67e41baec3ac6f04fe744b4b9617f8f859c63b3002f8684e7a4fee03
pub(crate) const LEGACY_TX: &str = "0100000001813f79011acb80925dfe69b3def355fe914bd1d96a3f5f71bf8303c6a989c7d1000000006b483045022100ed81ff192e75a3fd2304004dcadb746fa5e24c5031ccfcf21320b0277457c98f02207a986d955c6e0cb35d446a89d3f56100f4d7f67801c31967743a9c8e10615bed01210349fc4e631e3624a545de3f89f5d8684c7b8138bd94bdd531d2e213bf016b278afeffffff02a135ef01000000001976a914bc3b654dca7e56b04dca18f2566cdaf02e8d9ada88ac99c39800000000001976a9141c4bc762dd5423e332166702cb75f40df79fea1288ac19430600";

/// Unsigned transaction of the BIP143 native P2WPKH example.
pub(crate) const BIP143_P2WPKH_TX: &str = "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2f0167faa815988ac11000000";

/// Unsigned transaction of the BIP143 P2SH-P2WPKH example.
pub(crate) const BIP143_P2SH_P2WPKH_TX: &str = "0100000001db6b1b20aa0fd7b23880be2ecbd4a98130974cf4748fb66092ac4d3ceb1a54770100000000feffffff02b8b4eb0b000000001976a914a457b684d7f0d539a46a45bbc043f35b59d0d96388ac0008af2f000000001976a914fd270b1ee6abcaea97fea7ad0402e8bd8ad6d77c88ac92040000";

/// Signed transaction of the BIP143 P2SH-P2WPKH example.
pub(crate) const SIGNED_P2SH_P2WPKH_TX: &str = "01000000000101db6b1b20aa0fd7b23880be2ecbd4a98130974cf4748fb66092ac4d3ceb1a5477010000001716001479091972186c449eb1ded22b78e40d009bdf0089feffffff02b8b4eb0b000000001976a914a457b684d7f0d539a46a45bbc043f35b59d0d96388ac0008af2f000000001976a914fd270b1ee6abcaea97fea7ad0402e8bd8ad6d77c88ac02473044022047ac8e878352d3ebbde1c94ce3a10d057c24175747116f8288e5d794d12d482f0220217f36a485cae903c713331d877c1f64677e3622ad4010726870540656fe9dcb012103ad1d8e89212f0b92c74d23bb710c00662ad1470198ac48c43f7d6f93a2a2687392040000";

/// Serves stand-in previous transactions that only carry the outputs being
/// spent. Their ids are not checked.
#[derive(Debug, Default)]
pub(crate) struct PrevOuts(HashMap<TxId, Transaction>);

impl PrevOuts {
    pub(crate) fn with(mut self, tx_id: &str, index: u32, amount: i64, script_pubkey: Script) -> Self {
        let tx_id: TxId = tx_id.parse().unwrap();
        let tx = self
            .0
            .entry(tx_id)
            .or_insert_with(|| Transaction::new(1, vec![], vec![], 0, false));
        let index = index as usize;
        if tx.outputs.len() <= index {
            tx.outputs.resize(index + 1, TxOut::new(0, Script::default()));
        }
        tx.outputs[index] = TxOut::new(amount, script_pubkey);
        self
    }

    pub(crate) fn with_hex(self, tx_id: &str, index: u32, amount: i64, script_pubkey: &str) -> Self {
        let script_pubkey = Script::from_raw(&hex::decode(script_pubkey).unwrap()).unwrap();
        self.with(tx_id, index, amount, script_pubkey)
    }
}

impl TxFetcher for PrevOuts {
    fn fetch(&self, tx_id: &TxId, _testnet: bool) -> Result<Transaction, FetchError> {
        self.0.get(tx_id).cloned().ok_or(FetchError::NotFound(*tx_id))
    }
}

/// Spent output of [`LEGACY_TX`].
pub(crate) fn legacy_prevouts() -> PrevOuts {
    PrevOuts::default().with_hex(
        "d1c789a9c60383bf715f3f6ad9d14b91fe55f3deb369fe5d9280cb1a01793f81",
        0,
        42505594,
        "76a914a802fc56c704ce87c42d7c92eb75e7896bdc41ae88ac",
    )
}

/// Spent output of the BIP143 P2SH-P2WPKH example.
pub(crate) fn p2sh_p2wpkh_prevouts() -> PrevOuts {
    PrevOuts::default().with_hex(
        "77541aeb3c4dac9260b68f74f44c973081a9d4cb2ebe8038b2d70faa201b6bdb",
        1,
        1_000_000_000,
        "a9144733f37cf4db86fbc2efed2500b4f4e49f31202387",
    )
}
