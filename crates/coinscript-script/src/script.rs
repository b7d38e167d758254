//! Script model: an ordered list of opcodes and data pushes.

use crate::constants::{MAX_DIRECT_PUSH, MAX_SCRIPT_ELEMENT_SIZE};
use crate::error::{Error, EvalError};
use crate::interpreter::Interpreter;
use crate::solver::{self, ScriptType};
use bitcoin::opcodes::Opcode;
use bitcoin::opcodes::all::{
    OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160, OP_PUSHBYTES_0, OP_PUSHDATA1,
    OP_PUSHDATA2,
};
use coinscript_primitives::codec::encode_varint;
use coinscript_primitives::{ByteReader, CodecError, Ecc, SigHash, address};
use std::fmt;
use std::ops::Add;

/// A single script instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Op(Opcode),
    Data(Vec<u8>),
}

impl Command {
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Self::Data(data) => Some(data),
            Self::Op(_) => None,
        }
    }

    pub fn is_op(&self, opcode: Opcode) -> bool {
        matches!(self, Self::Op(op) if *op == opcode)
    }
}

impl From<Opcode> for Command {
    fn from(op: Opcode) -> Self {
        Self::Op(op)
    }
}

impl From<Vec<u8>> for Command {
    fn from(data: Vec<u8>) -> Self {
        Self::Data(data)
    }
}

impl From<&[u8]> for Command {
    fn from(data: &[u8]) -> Self {
        Self::Data(data.to_vec())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op(op) => write!(f, "{op}"),
            Self::Data(data) if data.is_empty() => write!(f, "{OP_PUSHBYTES_0}"),
            Self::Data(data) => f.write_str(&hex::encode(data)),
        }
    }
}

/// Locking or unlocking script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    cmds: Vec<Command>,
}

impl From<Vec<Command>> for Script {
    fn from(cmds: Vec<Command>) -> Self {
        Self { cmds }
    }
}

impl FromIterator<Command> for Script {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        Self {
            cmds: iter.into_iter().collect(),
        }
    }
}

impl Script {
    pub fn new(cmds: Vec<Command>) -> Self {
        Self { cmds }
    }

    pub fn cmds(&self) -> &[Command] {
        &self.cmds
    }

    pub fn into_cmds(self) -> Vec<Command> {
        self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG`
    pub fn p2pkh(h160: &[u8; 20]) -> Self {
        Self::new(vec![
            OP_DUP.into(),
            OP_HASH160.into(),
            h160.to_vec().into(),
            OP_EQUALVERIFY.into(),
            OP_CHECKSIG.into(),
        ])
    }

    /// `OP_HASH160 <h160> OP_EQUAL`
    pub fn p2sh(h160: &[u8; 20]) -> Self {
        Self::new(vec![OP_HASH160.into(), h160.to_vec().into(), OP_EQUAL.into()])
    }

    /// `OP_0 <h160>`
    pub fn p2wpkh(h160: &[u8; 20]) -> Self {
        Self::new(vec![OP_PUSHBYTES_0.into(), h160.to_vec().into()])
    }

    /// `OP_0 <sha256>`
    pub fn p2wsh(sha256: &[u8; 32]) -> Self {
        Self::new(vec![OP_PUSHBYTES_0.into(), sha256.to_vec().into()])
    }

    /// Reads a varint length-prefixed script.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, Error> {
        let declared = reader.read_varint()?;
        let declared = usize::try_from(declared).unwrap_or(usize::MAX);
        let body = reader.read_bytes(declared)?;

        Self::from_raw(body).map_err(|err| match err {
            Error::Truncated(CodecError::UnexpectedEof { offset, needed, .. }) => {
                Error::LengthMismatch {
                    declared,
                    consumed: offset + needed,
                }
            }
            err => err,
        })
    }

    /// Parses a length-prefixed script from the front of `data`, returning it with
    /// the number of bytes consumed.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), Error> {
        let mut reader = ByteReader::new(data);
        let script = Self::parse(&mut reader)?;
        Ok((script, reader.position()))
    }

    /// Parses a script body without the length prefix.
    pub fn from_raw(raw: &[u8]) -> Result<Self, Error> {
        let mut reader = ByteReader::new(raw);
        let mut cmds = Vec::new();

        while !reader.is_empty() {
            let byte = reader.read_u8()?;
            let len = match byte {
                1..=75 => usize::from(byte),
                76 => usize::from(reader.read_u8()?),
                77 => usize::from(reader.read_u16_le()?),
                _ => {
                    cmds.push(Command::Op(Opcode::from(byte)));
                    continue;
                }
            };
            if len > MAX_SCRIPT_ELEMENT_SIZE {
                return Err(Error::TooLongCommand(len));
            }
            cmds.push(Command::Data(reader.read_bytes(len)?.to_vec()));
        }

        Ok(Self { cmds })
    }

    /// Script body without the length prefix, using minimal push encodings.
    pub fn raw_serialize(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();

        for cmd in &self.cmds {
            match cmd {
                Command::Op(op) => out.push(op.to_u8()),
                Command::Data(data) => {
                    match data.len() {
                        len @ 0..=MAX_DIRECT_PUSH => out.push(len as u8),
                        len @ 76..=0xff => {
                            out.push(OP_PUSHDATA1.to_u8());
                            out.push(len as u8);
                        }
                        len @ 0x100..=MAX_SCRIPT_ELEMENT_SIZE => {
                            out.push(OP_PUSHDATA2.to_u8());
                            out.extend_from_slice(&(len as u16).to_le_bytes());
                        }
                        len => return Err(Error::TooLongCommand(len)),
                    }
                    out.extend_from_slice(data);
                }
            }
        }

        Ok(out)
    }

    /// Wire encoding: varint length followed by the raw body.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let raw = self.raw_serialize()?;
        let mut out = encode_varint(raw.len() as u64);
        out.extend(raw);
        Ok(out)
    }

    /// Runs the script with the given signature digest and witness.
    pub fn evaluate(&self, ecc: &Ecc, z: &SigHash, witness: &[Vec<u8>]) -> Result<bool, EvalError> {
        Interpreter::new(ecc).evaluate(self, z, witness)
    }

    pub fn script_type(&self) -> ScriptType {
        solver::solve(self)
    }

    pub fn is_p2pkh(&self) -> bool {
        solver::is_p2pkh(&self.cmds)
    }

    pub fn is_p2sh(&self) -> bool {
        solver::is_p2sh(&self.cmds)
    }

    pub fn is_p2wpkh(&self) -> bool {
        solver::is_p2wpkh(&self.cmds)
    }

    pub fn is_p2wsh(&self) -> bool {
        solver::is_p2wsh(&self.cmds)
    }

    /// Base58Check address of a P2PKH or P2SH script.
    pub fn address(&self, testnet: bool) -> Option<String> {
        match self.script_type() {
            ScriptType::PubKeyHash(h160) => Some(address::p2pkh_address(&h160, testnet)),
            ScriptType::ScriptHash(h160) => Some(address::p2sh_address(&h160, testnet)),
            _ => None,
        }
    }
}

impl Add for &Script {
    type Output = Script;

    fn add(self, other: &Script) -> Script {
        self.cmds.iter().chain(other.cmds.iter()).cloned().collect()
    }
}

impl Add for Script {
    type Output = Script;

    fn add(mut self, other: Script) -> Script {
        self.cmds.extend(other.cmds);
        self
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.cmds.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{cmd}")?;
        }
        Ok(())
    }
}
