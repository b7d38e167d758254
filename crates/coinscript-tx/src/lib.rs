//! Transactions, their signature digests and input verification.
//!
//! The spent outputs are looked up through a [`TxFetcher`], typically a
//! [`TxCache`] filled from raw transactions or a cache file.

mod error;
mod fetcher;
mod sighash;
mod transaction;
mod verify;

#[cfg(test)]
mod tests;

pub use self::error::Error;
pub use self::fetcher::{FetchError, TxCache, TxFetcher};
pub use self::sighash::{Bip143Hashes, SIGHASH_ALL};
pub use self::transaction::{Transaction, TxId, TxIn, TxOut};
pub use self::verify::InputDigest;
