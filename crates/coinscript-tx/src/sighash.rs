//! Legacy and BIP143 signature digests.

use crate::error::Error;
use crate::fetcher::TxFetcher;
use crate::transaction::Transaction;
use coinscript_primitives::codec::encode_varint;
use coinscript_primitives::hash::hash256;
use coinscript_primitives::SigHash;
use coinscript_script::{Script, ScriptType};
use std::cell::OnceCell;

/// The only sighash type produced and assumed by this crate.
pub const SIGHASH_ALL: u32 = 1;

/// Transaction-wide BIP143 hashes, shared by every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bip143Hashes {
    pub hash_prevouts: [u8; 32],
    pub hash_sequence: [u8; 32],
    pub hash_outputs: [u8; 32],
}

/// Write-once storage for the BIP143 hashes.
#[derive(Debug, Clone, Default)]
pub(crate) struct SigHashCache {
    prevouts_and_sequence: OnceCell<([u8; 32], [u8; 32])>,
    outputs: OnceCell<[u8; 32]>,
}

impl Transaction {
    /// Legacy SIGHASH_ALL digest of `input_index`.
    ///
    /// Every script_sig is emptied except the signed input's, which is replaced
    /// by `redeem_script` or, without one, the locking script of the spent
    /// output.
    pub fn sig_hash(
        &self,
        fetcher: &impl TxFetcher,
        input_index: usize,
        redeem_script: Option<&Script>,
    ) -> Result<SigHash, Error> {
        let signed_input = self.input(input_index)?;
        let script_code = match redeem_script {
            Some(redeem_script) => redeem_script.clone(),
            None => signed_input.script_pubkey(fetcher, self.testnet)?,
        };
        let empty = Script::default();

        let mut preimage = self.version.to_le_bytes().to_vec();
        preimage.extend(encode_varint(self.inputs.len() as u64));
        for (index, input) in self.inputs.iter().enumerate() {
            let script_sig = if index == input_index {
                &script_code
            } else {
                &empty
            };
            input.write_with_script(&mut preimage, script_sig)?;
        }
        preimage.extend(encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            output.write(&mut preimage)?;
        }
        preimage.extend(self.locktime.to_le_bytes());
        preimage.extend(SIGHASH_ALL.to_le_bytes());

        Ok(hash256(&preimage))
    }

    /// BIP143 SIGHASH_ALL digest of `input_index`.
    ///
    /// The script code is the witness script when given, otherwise the P2PKH
    /// script over the key hash of the P2WPKH `redeem_script` or of the spent
    /// output's locking script.
    pub fn sig_hash_bip143(
        &self,
        fetcher: &impl TxFetcher,
        input_index: usize,
        redeem_script: Option<&Script>,
        witness_script: Option<&Script>,
    ) -> Result<SigHash, Error> {
        let input = self.input(input_index)?;
        let (hash_prevouts, hash_sequence) = self.hash_prevouts_and_sequence();

        let script_code = match (witness_script, redeem_script) {
            (Some(witness_script), _) => witness_script.serialize()?,
            (None, Some(redeem_script)) => p2pkh_script_code(redeem_script)?,
            (None, None) => p2pkh_script_code(&input.script_pubkey(fetcher, self.testnet)?)?,
        };

        let mut preimage = self.version.to_le_bytes().to_vec();
        preimage.extend(hash_prevouts);
        preimage.extend(hash_sequence);
        input.write_outpoint(&mut preimage);
        preimage.extend(script_code);
        preimage.extend(input.value(fetcher, self.testnet)?.to_le_bytes());
        preimage.extend(input.sequence.to_le_bytes());
        preimage.extend(self.hash_outputs()?);
        preimage.extend(self.locktime.to_le_bytes());
        preimage.extend(SIGHASH_ALL.to_le_bytes());

        Ok(hash256(&preimage))
    }

    /// Computes and caches all BIP143 hashes, so that clones of this
    /// transaction can produce digests without writing to the cache.
    pub fn bip143_hashes(&self) -> Result<Bip143Hashes, Error> {
        let (hash_prevouts, hash_sequence) = self.hash_prevouts_and_sequence();
        Ok(Bip143Hashes {
            hash_prevouts,
            hash_sequence,
            hash_outputs: self.hash_outputs()?,
        })
    }

    fn hash_prevouts_and_sequence(&self) -> ([u8; 32], [u8; 32]) {
        *self.cache.prevouts_and_sequence.get_or_init(|| {
            let mut prevouts = Vec::with_capacity(self.inputs.len() * 36);
            let mut sequences = Vec::with_capacity(self.inputs.len() * 4);
            for input in &self.inputs {
                input.write_outpoint(&mut prevouts);
                sequences.extend(input.sequence.to_le_bytes());
            }
            (hash256(&prevouts), hash256(&sequences))
        })
    }

    fn hash_outputs(&self) -> Result<[u8; 32], Error> {
        if let Some(hash) = self.cache.outputs.get() {
            return Ok(*hash);
        }

        let mut outputs = Vec::new();
        for output in &self.outputs {
            output.write(&mut outputs)?;
        }
        let hash = hash256(&outputs);
        let _ = self.cache.outputs.set(hash);
        Ok(hash)
    }
}

/// `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG` over the key hash of a
/// P2WPKH program.
fn p2pkh_script_code(program: &Script) -> Result<Vec<u8>, Error> {
    match program.script_type() {
        ScriptType::WitnessV0KeyHash(h160) => Ok(Script::p2pkh(&h160).serialize()?),
        _ => Err(Error::MalformedRedeemOrWitnessScript),
    }
}
