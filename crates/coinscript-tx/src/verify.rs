//! Per-input script verification and signing.

use crate::error::Error;
use crate::fetcher::TxFetcher;
use crate::sighash::SIGHASH_ALL;
use crate::transaction::{Transaction, TxIn};
use coinscript_primitives::{Ecc, PrivateKey, SigHash};
use coinscript_script::{Command, Interpreter, LockTimeContext, Script};

/// Digest an input's signatures commit to, and whether its witness takes part
/// in evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDigest {
    pub z: SigHash,
    pub uses_witness: bool,
}

impl Transaction {
    /// Chooses the digest algorithm and script code for `input_index` from the
    /// shape of the spent output and, for P2SH, of the redeem script.
    pub fn input_digest(
        &self,
        fetcher: &impl TxFetcher,
        input_index: usize,
    ) -> Result<InputDigest, Error> {
        let input = self.input(input_index)?;
        let script_pubkey = input.script_pubkey(fetcher, self.testnet)?;
        self.select_digest(fetcher, input_index, input, &script_pubkey)
    }

    fn select_digest(
        &self,
        fetcher: &impl TxFetcher,
        input_index: usize,
        input: &TxIn,
        script_pubkey: &Script,
    ) -> Result<InputDigest, Error> {
        let legacy = |z| InputDigest {
            z,
            uses_witness: false,
        };
        let segwit = |z| InputDigest {
            z,
            uses_witness: true,
        };

        if script_pubkey.is_p2sh() {
            let redeem_script = redeem_script(input)?;

            if redeem_script.is_p2wpkh() {
                tracing::debug!(input_index, "P2SH-P2WPKH input, using BIP143 digest");
                let z = self.sig_hash_bip143(fetcher, input_index, Some(&redeem_script), None)?;
                Ok(segwit(z))
            } else if redeem_script.is_p2wsh() {
                tracing::debug!(input_index, "P2SH-P2WSH input, using BIP143 digest");
                let witness_script = witness_script(input)?;
                let z = self.sig_hash_bip143(fetcher, input_index, None, Some(&witness_script))?;
                Ok(segwit(z))
            } else {
                tracing::debug!(input_index, "P2SH input, using legacy digest");
                let z = self.sig_hash(fetcher, input_index, Some(&redeem_script))?;
                Ok(legacy(z))
            }
        } else if script_pubkey.is_p2wpkh() {
            tracing::debug!(input_index, "P2WPKH input, using BIP143 digest");
            let z = self.sig_hash_bip143(fetcher, input_index, None, None)?;
            Ok(segwit(z))
        } else if script_pubkey.is_p2wsh() {
            tracing::debug!(input_index, "P2WSH input, using BIP143 digest");
            let witness_script = witness_script(input)?;
            let z = self.sig_hash_bip143(fetcher, input_index, None, Some(&witness_script))?;
            Ok(segwit(z))
        } else {
            tracing::debug!(input_index, "Legacy input, using legacy digest");
            let z = self.sig_hash(fetcher, input_index, None)?;
            Ok(legacy(z))
        }
    }

    /// Runs the unlocking script followed by the spent output's locking script.
    ///
    /// `Ok(false)` means the scripts ran and rejected the spend.
    pub fn verify_input(
        &self,
        fetcher: &impl TxFetcher,
        ecc: &Ecc,
        input_index: usize,
    ) -> Result<bool, Error> {
        let input = self.input(input_index)?;
        let script_pubkey = input.script_pubkey(fetcher, self.testnet)?;
        let InputDigest { z, uses_witness } =
            self.select_digest(fetcher, input_index, input, &script_pubkey)?;

        let witness: &[Vec<u8>] = if uses_witness { &input.witness } else { &[] };
        let combined = &input.script_sig + &script_pubkey;

        let interpreter = Interpreter::new(ecc).with_lock_time(LockTimeContext {
            tx_version: self.version,
            locktime: self.locktime,
            sequence: input.sequence,
        });
        let valid = interpreter.evaluate(&combined, &z, witness)?;

        if !valid {
            tracing::debug!(input_index, "Input failed verification");
        }

        Ok(valid)
    }

    /// Verifies the fee and every input.
    pub fn verify(&self, fetcher: &impl TxFetcher, ecc: &Ecc) -> Result<bool, Error> {
        match self.fee(fetcher) {
            Ok(fee) if fee < 0 => {
                tracing::debug!(fee, "Transaction spends more than its inputs");
                return Ok(false);
            }
            Ok(_) => {}
            Err(Error::AmountOverflow) => {
                tracing::debug!("Transaction amounts overflow");
                return Ok(false);
            }
            Err(err) => return Err(err),
        }

        for input_index in 0..self.inputs.len() {
            if !self.verify_input(fetcher, ecc, input_index)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Signs a P2PKH input with `key` and returns whether it now verifies.
    pub fn sign_input(
        &mut self,
        fetcher: &impl TxFetcher,
        ecc: &Ecc,
        input_index: usize,
        key: &PrivateKey,
        compressed: bool,
    ) -> Result<bool, Error> {
        let script_pubkey = self
            .input(input_index)?
            .script_pubkey(fetcher, self.testnet)?;
        if !script_pubkey.is_p2pkh() {
            return Err(Error::UnsupportedSigning(
                script_pubkey.script_type().script_type(),
            ));
        }

        let z = self.sig_hash(fetcher, input_index, None)?;
        let mut sig = ecc.sign(key, &z).der();
        sig.push(SIGHASH_ALL as u8);
        let sec = ecc.public_key(key).sec(compressed);

        self.inputs[input_index].script_sig =
            Script::new(vec![Command::Data(sig), Command::Data(sec)]);

        self.verify_input(fetcher, ecc, input_index)
    }
}

/// The last element of a P2SH script_sig, parsed.
fn redeem_script(input: &TxIn) -> Result<Script, Error> {
    match input.script_sig.cmds().last() {
        Some(Command::Data(raw)) => parse_embedded(raw),
        _ => Err(Error::MalformedRedeemOrWitnessScript),
    }
}

/// The last witness item, parsed.
fn witness_script(input: &TxIn) -> Result<Script, Error> {
    let raw = input
        .witness
        .last()
        .ok_or(Error::MalformedRedeemOrWitnessScript)?;
    parse_embedded(raw)
}

fn parse_embedded(raw: &[u8]) -> Result<Script, Error> {
    Script::from_raw(raw).map_err(|err| {
        tracing::debug!(?err, "Embedded script does not parse");
        Error::MalformedRedeemOrWitnessScript
    })
}
