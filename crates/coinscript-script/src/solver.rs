//! Standard locking script templates.

use crate::constants::{WITNESS_V0_KEYHASH_SIZE, WITNESS_V0_SCRIPTHASH_SIZE};
use crate::script::{Command, Script};
use bitcoin::opcodes::all::{
    OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160, OP_PUSHBYTES_0,
};

/// Locking script types the verifier knows how to dispatch.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ScriptType {
    NonStandard,
    PubKeyHash([u8; 20]),
    ScriptHash([u8; 20]),
    WitnessV0KeyHash([u8; 20]),
    WitnessV0ScriptHash([u8; 32]),
}

impl ScriptType {
    /// Returns the script type name as used in Bitcoin Core RPC responses.
    pub fn script_type(&self) -> &'static str {
        match self {
            Self::NonStandard => "nonstandard",
            Self::PubKeyHash(_) => "pubkeyhash",
            Self::ScriptHash(_) => "scripthash",
            Self::WitnessV0KeyHash(_) => "witness_v0_keyhash",
            Self::WitnessV0ScriptHash(_) => "witness_v0_scripthash",
        }
    }
}

pub fn solve(script: &Script) -> ScriptType {
    let cmds = script.cmds();
    match cmds {
        [_, _, Command::Data(hash), _, _] if is_p2pkh(cmds) => as_array(hash)
            .map(ScriptType::PubKeyHash)
            .unwrap_or(ScriptType::NonStandard),
        [_, Command::Data(hash), _] if is_p2sh(cmds) => as_array(hash)
            .map(ScriptType::ScriptHash)
            .unwrap_or(ScriptType::NonStandard),
        [_, Command::Data(program)] if is_p2wpkh(cmds) => as_array(program)
            .map(ScriptType::WitnessV0KeyHash)
            .unwrap_or(ScriptType::NonStandard),
        [_, Command::Data(program)] if is_p2wsh(cmds) => as_array(program)
            .map(ScriptType::WitnessV0ScriptHash)
            .unwrap_or(ScriptType::NonStandard),
        _ => ScriptType::NonStandard,
    }
}

fn as_array<const N: usize>(data: &[u8]) -> Option<[u8; N]> {
    data.try_into().ok()
}

fn is_data_of_len(cmd: &Command, len: usize) -> bool {
    matches!(cmd, Command::Data(data) if data.len() == len)
}

/// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`
pub fn is_p2pkh(cmds: &[Command]) -> bool {
    match cmds {
        [dup, hash160, h160, equalverify, checksig] => {
            dup.is_op(OP_DUP)
                && hash160.is_op(OP_HASH160)
                && is_data_of_len(h160, 20)
                && equalverify.is_op(OP_EQUALVERIFY)
                && checksig.is_op(OP_CHECKSIG)
        }
        _ => false,
    }
}

/// `OP_HASH160 <20 bytes> OP_EQUAL`
pub fn is_p2sh(cmds: &[Command]) -> bool {
    match cmds {
        [hash160, h160, equal] => {
            hash160.is_op(OP_HASH160) && is_data_of_len(h160, 20) && equal.is_op(OP_EQUAL)
        }
        _ => false,
    }
}

/// `OP_0 <20 bytes>`
pub fn is_p2wpkh(cmds: &[Command]) -> bool {
    is_witness_v0(cmds, WITNESS_V0_KEYHASH_SIZE)
}

/// `OP_0 <32 bytes>`
pub fn is_p2wsh(cmds: &[Command]) -> bool {
    is_witness_v0(cmds, WITNESS_V0_SCRIPTHASH_SIZE)
}

fn is_witness_v0(cmds: &[Command], program_len: usize) -> bool {
    match cmds {
        [version, program] => version.is_op(OP_PUSHBYTES_0) && is_data_of_len(program, program_len),
        _ => false,
    }
}
