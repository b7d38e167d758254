//! Primitives shared by the script interpreter and the transaction model.
//!
//! Everything in this crate sits at the boundary of the validation core: hashing,
//! the wire codec helpers, the ECDSA capability and Base58Check encodings. The
//! heavy lifting is delegated to [`bitcoin`].

pub mod address;
pub mod codec;
pub mod ecc;
pub mod hash;

pub use self::codec::{ByteReader, CodecError};
pub use self::ecc::{Ecc, EccError, Point, PrivateKey, Signature};

/// 32-byte double-SHA256 digest handed to signature checks.
pub type SigHash = [u8; 32];
