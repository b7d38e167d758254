//! Access to previous transactions.

use crate::error::Error;
use crate::transaction::{Transaction, TxId};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Fetch error type.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transaction {0} not found")]
    NotFound(TxId),
    #[error("transaction stored as {expected} has id {actual}")]
    TxIdMismatch { expected: String, actual: TxId },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("malformed transaction {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: Box<Error>,
    },
}

/// Source of the transactions spent by the inputs being verified.
pub trait TxFetcher {
    /// Returns the transaction with id `tx_id`.
    fn fetch(&self, tx_id: &TxId, testnet: bool) -> Result<Transaction, FetchError>;
}

impl<T: TxFetcher + ?Sized> TxFetcher for &T {
    fn fetch(&self, tx_id: &TxId, testnet: bool) -> Result<Transaction, FetchError> {
        (**self).fetch(tx_id, testnet)
    }
}

/// In-memory transaction store, optionally backed by a JSON file mapping ids to
/// raw transaction hex.
#[derive(Debug, Clone, Default)]
pub struct TxCache {
    txs: HashMap<TxId, Transaction>,
}

impl TxCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn contains(&self, tx_id: &TxId) -> bool {
        self.txs.contains_key(tx_id)
    }

    /// Stores `tx` under its computed id.
    pub fn insert(&mut self, tx: Transaction) -> Result<TxId, Error> {
        let tx_id = tx.id()?;
        self.txs.insert(tx_id, tx);
        Ok(tx_id)
    }

    /// Parses and stores a raw transaction.
    pub fn insert_raw(&mut self, raw: &str) -> Result<TxId, Error> {
        self.insert(Transaction::from_hex(raw, false)?)
    }

    /// Reads a cache file, checking every entry against its key.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let entries: BTreeMap<String, String> =
            serde_json::from_reader(BufReader::new(File::open(path)?))?;

        let mut txs = HashMap::with_capacity(entries.len());
        for (key, raw) in entries {
            let tx = Transaction::from_hex(&raw, false).map_err(|err| FetchError::Parse {
                key: key.clone(),
                source: Box::new(err),
            })?;
            let tx_id = tx.id().map_err(|err| FetchError::Parse {
                key: key.clone(),
                source: Box::new(err),
            })?;
            if tx_id.to_string() != key.to_lowercase() {
                return Err(FetchError::TxIdMismatch {
                    expected: key,
                    actual: tx_id,
                });
            }
            txs.insert(tx_id, tx);
        }

        tracing::debug!(path = %path.display(), entries = txs.len(), "Loaded transaction cache");

        Ok(Self { txs })
    }

    /// Writes every transaction to `path` in the format read by [`Self::load`].
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<(), FetchError> {
        let path = path.as_ref();

        let mut entries = BTreeMap::new();
        for (tx_id, tx) in &self.txs {
            let raw = tx.serialize().map_err(|err| FetchError::Parse {
                key: tx_id.to_string(),
                source: Box::new(err),
            })?;
            entries.insert(tx_id.to_string(), hex::encode(raw));
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &entries)?;
        writer.flush()?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "Dumped transaction cache");

        Ok(())
    }
}

impl TxFetcher for TxCache {
    fn fetch(&self, tx_id: &TxId, testnet: bool) -> Result<Transaction, FetchError> {
        let mut tx = self
            .txs
            .get(tx_id)
            .cloned()
            .ok_or(FetchError::NotFound(*tx_id))?;
        tx.testnet = testnet;
        Ok(tx)
    }
}
