use crate::fetcher::FetchError;
use crate::transaction::TxId;
use coinscript_primitives::{CodecError, EccError};
use coinscript_script::EvalError;

/// Transaction error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed transaction: {0}")]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Script(#[from] coinscript_script::Error),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Ecc(#[from] EccError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("input index {index} out of range, transaction has {len} inputs")]
    InputIndexOutOfRange { index: usize, len: usize },
    #[error("output {tx_id}:{index} does not exist, transaction has {len} outputs")]
    OutputIndexOutOfRange { tx_id: TxId, index: u32, len: usize },
    #[error("redeem or witness script is missing or malformed")]
    MalformedRedeemOrWitnessScript,
    #[error("invalid segwit marker {marker:#04x} and flag {flag:#04x}")]
    InvalidSegwitMarker { marker: u8, flag: u8 },
    #[error("{trailing} bytes left after the transaction")]
    TrailingBytes { trailing: usize },
    #[error("transaction amounts overflow")]
    AmountOverflow,
    #[error("signing {0} inputs is not supported")]
    UnsupportedSigning(&'static str),
}
