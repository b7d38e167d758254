//! Transaction model and wire format.

use crate::error::Error;
use crate::fetcher::TxFetcher;
use crate::sighash::SigHashCache;
use coinscript_primitives::codec::{encode_varint, reversed, write_var_bytes};
use coinscript_primitives::{ByteReader, hash};
use coinscript_script::opcodes::all::{OP_PUSHBYTES_0, OP_PUSHNUM_1, OP_PUSHNUM_16};
use coinscript_script::{Command, SEQUENCE_FINAL, Script};
use std::fmt;
use std::str::FromStr;

/// Transaction id in display (big-endian) byte order.
///
/// On the wire the bytes are reversed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TxId([u8; 32]);

impl TxId {
    /// Previous output id of a coinbase input.
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn from_byte_array(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_wire_bytes(bytes: [u8; 32]) -> Self {
        Self(reversed(bytes))
    }

    pub fn to_wire_bytes(self) -> [u8; 32] {
        reversed(self.0)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({self})")
    }
}

impl FromStr for TxId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prev_tx: TxId,
    pub prev_index: u32,
    pub script_sig: Script,
    pub sequence: u32,
    /// Witness stack, empty for legacy inputs.
    pub witness: Vec<Vec<u8>>,
}

impl TxIn {
    /// Spends `prev_tx:prev_index` with an empty script_sig and a final sequence.
    pub fn new(prev_tx: TxId, prev_index: u32) -> Self {
        Self {
            prev_tx,
            prev_index,
            script_sig: Script::default(),
            sequence: SEQUENCE_FINAL,
            witness: Vec::new(),
        }
    }

    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, Error> {
        let prev_tx = TxId::from_wire_bytes(reader.read_array()?);
        let prev_index = reader.read_u32_le()?;
        let script_sig = Script::parse(reader)?;
        let sequence = reader.read_u32_le()?;
        Ok(Self {
            prev_tx,
            prev_index,
            script_sig,
            sequence,
            witness: Vec::new(),
        })
    }

    pub(crate) fn write_outpoint(&self, out: &mut Vec<u8>) {
        out.extend(self.prev_tx.to_wire_bytes());
        out.extend(self.prev_index.to_le_bytes());
    }

    /// Writes the input with `script_sig` in place of its own.
    pub(crate) fn write_with_script(&self, out: &mut Vec<u8>, script_sig: &Script) -> Result<(), Error> {
        self.write_outpoint(out);
        out.extend(script_sig.serialize()?);
        out.extend(self.sequence.to_le_bytes());
        Ok(())
    }

    fn write_witness(&self, out: &mut Vec<u8>) {
        out.extend(encode_varint(self.witness.len() as u64));
        for item in &self.witness {
            write_var_bytes(out, item);
        }
    }

    /// Fetches the transaction this input spends from.
    pub fn fetch_tx(&self, fetcher: &impl TxFetcher, testnet: bool) -> Result<Transaction, Error> {
        Ok(fetcher.fetch(&self.prev_tx, testnet)?)
    }

    /// Fetches the output this input spends.
    pub fn prev_output(&self, fetcher: &impl TxFetcher, testnet: bool) -> Result<TxOut, Error> {
        let mut tx = self.fetch_tx(fetcher, testnet)?;
        let len = tx.outputs.len();
        let index = self.prev_index as usize;
        if index >= len {
            return Err(Error::OutputIndexOutOfRange {
                tx_id: self.prev_tx,
                index: self.prev_index,
                len,
            });
        }
        Ok(tx.outputs.swap_remove(index))
    }

    /// Amount of the spent output in satoshis.
    pub fn value(&self, fetcher: &impl TxFetcher, testnet: bool) -> Result<i64, Error> {
        self.prev_output(fetcher, testnet).map(|output| output.amount)
    }

    /// Locking script of the spent output.
    pub fn script_pubkey(&self, fetcher: &impl TxFetcher, testnet: bool) -> Result<Script, Error> {
        self.prev_output(fetcher, testnet)
            .map(|output| output.script_pubkey)
    }
}

/// Transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in satoshis.
    pub amount: i64,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(amount: i64, script_pubkey: Script) -> Self {
        Self {
            amount,
            script_pubkey,
        }
    }

    fn parse(reader: &mut ByteReader<'_>) -> Result<Self, Error> {
        let amount = reader.read_i64_le()?;
        let script_pubkey = Script::parse(reader)?;
        Ok(Self {
            amount,
            script_pubkey,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        out.extend(self.amount.to_le_bytes());
        out.extend(self.script_pubkey.serialize()?);
        Ok(())
    }
}

/// A transaction with its lazily filled BIP143 digest cache.
///
/// The cache is written through `&self`, so a `Transaction` is not `Sync`.
/// Changing inputs or outputs after the first BIP143 digest leaves the cached
/// hashes stale.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub locktime: u32,
    /// Serialize with the BIP144 marker, flag and witnesses.
    pub segwit: bool,
    pub testnet: bool,
    pub(crate) cache: SigHashCache,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.inputs == other.inputs
            && self.outputs == other.outputs
            && self.locktime == other.locktime
            && self.segwit == other.segwit
            && self.testnet == other.testnet
    }
}

impl Eq for Transaction {}

impl Transaction {
    pub fn new(
        version: i32,
        inputs: Vec<TxIn>,
        outputs: Vec<TxOut>,
        locktime: u32,
        testnet: bool,
    ) -> Self {
        let segwit = inputs.iter().any(|input| !input.witness.is_empty());
        Self {
            version,
            inputs,
            outputs,
            locktime,
            segwit,
            testnet,
            cache: SigHashCache::default(),
        }
    }

    /// Reads a transaction in either the legacy or the segwit layout.
    pub fn parse(reader: &mut ByteReader<'_>, testnet: bool) -> Result<Self, Error> {
        let version = reader.read_i32_le()?;

        // A legacy transaction can't have zero inputs, so a zero byte here is
        // the segwit marker.
        let segwit = reader.peek(0) == Some(0);
        if segwit {
            let marker = reader.read_u8()?;
            let flag = reader.read_u8()?;
            if flag != 1 {
                return Err(Error::InvalidSegwitMarker { marker, flag });
            }
        }

        let input_count = reader.read_varint()?;
        let mut inputs = Vec::new();
        for _ in 0..input_count {
            inputs.push(TxIn::parse(reader)?);
        }

        let output_count = reader.read_varint()?;
        let mut outputs = Vec::new();
        for _ in 0..output_count {
            outputs.push(TxOut::parse(reader)?);
        }

        if segwit {
            for input in &mut inputs {
                let item_count = reader.read_varint()?;
                for _ in 0..item_count {
                    let len = usize::try_from(reader.read_varint()?).unwrap_or(usize::MAX);
                    input.witness.push(reader.read_bytes(len)?.to_vec());
                }
            }
        }

        let locktime = reader.read_u32_le()?;

        Ok(Self {
            version,
            inputs,
            outputs,
            locktime,
            segwit,
            testnet,
            cache: SigHashCache::default(),
        })
    }

    /// Parses a transaction that must span all of `data`.
    pub fn from_bytes(data: &[u8], testnet: bool) -> Result<Self, Error> {
        let mut reader = ByteReader::new(data);
        let tx = Self::parse(&mut reader, testnet)?;
        if !reader.is_empty() {
            return Err(Error::TrailingBytes {
                trailing: reader.remaining(),
            });
        }
        Ok(tx)
    }

    pub fn from_hex(raw: &str, testnet: bool) -> Result<Self, Error> {
        Self::from_bytes(&hex::decode(raw.trim())?, testnet)
    }

    /// Serialization without witness data, which the id commits to.
    pub fn serialize_legacy(&self) -> Result<Vec<u8>, Error> {
        let mut out = self.version.to_le_bytes().to_vec();
        self.write_inputs_and_outputs(&mut out)?;
        out.extend(self.locktime.to_le_bytes());
        Ok(out)
    }

    /// BIP144 serialization with marker, flag and witnesses.
    pub fn serialize_segwit(&self) -> Result<Vec<u8>, Error> {
        let mut out = self.version.to_le_bytes().to_vec();
        out.extend([0x00, 0x01]);
        self.write_inputs_and_outputs(&mut out)?;
        for input in &self.inputs {
            input.write_witness(&mut out);
        }
        out.extend(self.locktime.to_le_bytes());
        Ok(out)
    }

    /// Serializes in the layout the transaction was parsed or built with.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        if self.segwit {
            self.serialize_segwit()
        } else {
            self.serialize_legacy()
        }
    }

    fn write_inputs_and_outputs(&self, out: &mut Vec<u8>) -> Result<(), Error> {
        out.extend(encode_varint(self.inputs.len() as u64));
        for input in &self.inputs {
            input.write_with_script(out, &input.script_sig)?;
        }
        out.extend(encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            output.write(out)?;
        }
        Ok(())
    }

    /// Double SHA256 of the legacy serialization in wire order.
    pub fn hash(&self) -> Result<[u8; 32], Error> {
        Ok(hash::hash256(&self.serialize_legacy()?))
    }

    pub fn id(&self) -> Result<TxId, Error> {
        self.hash().map(TxId::from_wire_bytes)
    }

    pub fn input(&self, index: usize) -> Result<&TxIn, Error> {
        self.inputs.get(index).ok_or(Error::InputIndexOutOfRange {
            index,
            len: self.inputs.len(),
        })
    }

    /// Sum of spent amounts minus sum of output amounts, in satoshis.
    ///
    /// Amounts come straight off the wire, so any sum leaving the `i64` range
    /// is reported as [`Error::AmountOverflow`].
    pub fn fee(&self, fetcher: &impl TxFetcher) -> Result<i64, Error> {
        let mut total_in = 0i64;
        for input in &self.inputs {
            total_in = total_in
                .checked_add(input.value(fetcher, self.testnet)?)
                .ok_or(Error::AmountOverflow)?;
        }

        let total_out = self
            .outputs
            .iter()
            .try_fold(0i64, |total, output| total.checked_add(output.amount))
            .ok_or(Error::AmountOverflow)?;

        total_in
            .checked_sub(total_out)
            .ok_or(Error::AmountOverflow)
    }

    pub fn is_coinbase(&self) -> bool {
        match self.inputs.as_slice() {
            [input] => input.prev_tx == TxId::ZERO && input.prev_index == 0xffff_ffff,
            _ => false,
        }
    }

    /// Block height committed to by a BIP34 coinbase.
    pub fn coinbase_height(&self) -> Option<u64> {
        if !self.is_coinbase() {
            return None;
        }

        match self.inputs[0].script_sig.cmds().first()? {
            Command::Data(height) if height.len() <= 8 => Some(
                height
                    .iter()
                    .rev()
                    .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)),
            ),
            Command::Op(op) if *op == OP_PUSHBYTES_0 => Some(0),
            Command::Op(op) if (OP_PUSHNUM_1.to_u8()..=OP_PUSHNUM_16.to_u8()).contains(&op.to_u8()) => {
                Some(u64::from(op.to_u8() - OP_PUSHNUM_1.to_u8()) + 1)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Ok(id) => writeln!(f, "tx: {id}")?,
            Err(_) => writeln!(f, "tx: <unserializable>")?,
        }
        writeln!(f, "version: {}", self.version)?;
        writeln!(f, "tx_ins:")?;
        for input in &self.inputs {
            writeln!(f, "{}:{}", input.prev_tx, input.prev_index)?;
        }
        writeln!(f, "tx_outs:")?;
        for output in &self.outputs {
            writeln!(f, "{}:{}", output.amount, output.script_pubkey)?;
        }
        write!(f, "locktime: {}", self.locktime)
    }
}
