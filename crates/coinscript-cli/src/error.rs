use coinscript_primitives::EccError;
use coinscript_tx::FetchError;

pub type Result<T> = std::result::Result<T, Error>;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tx(#[from] coinscript_tx::Error),
    #[error("invalid script: {0}")]
    Script(#[from] coinscript_script::Error),
    #[error("transaction cache: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Ecc(#[from] EccError),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
}
