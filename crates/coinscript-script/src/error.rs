use crate::constants::{MAX_SCRIPT_ELEMENT_SIZE, MAX_STACK_SIZE};
use crate::num::NumError;
use crate::stack::StackError;
use bitcoin::opcodes::Opcode;
use coinscript_primitives::CodecError;

/// Script (de)serialization error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("script truncated: {0}")]
    Truncated(#[from] CodecError),
    #[error("script declares {declared} bytes but its commands span {consumed}")]
    LengthMismatch { declared: usize, consumed: usize },
    #[error("push of {0} bytes exceeds MAX_SCRIPT_ELEMENT_SIZE ({MAX_SCRIPT_ELEMENT_SIZE})")]
    TooLongCommand(usize),
}

/// Engine-level evaluation error.
///
/// A script that merely fails evaluates to `Ok(false)`; this type is reserved for
/// inputs the interpreter cannot run at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("embedded redeem or witness script is malformed: {0}")]
    EmbeddedScript(#[source] Error),
}

/// Reason a script evaluated to false.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum OpError {
    #[error(transparent)]
    Stack(#[from] StackError),
    #[error(transparent)]
    Num(#[from] NumError),
    #[error("{0} failed")]
    Verify(Opcode),
    #[error("OP_RETURN executed")]
    OpReturn,
    #[error("attempt to execute disabled opcode {0}")]
    DisabledOpcode(Opcode),
    #[error("{0} is reserved or unassigned")]
    BadOpcode(Opcode),
    #[error("unbalanced conditional")]
    UnbalancedConditional,
    #[error("invalid alt stack operation")]
    InvalidAltStackOperation,
    // Stack and altstack combined depth is over the limit.
    #[error("exceeds stack limit ({MAX_STACK_SIZE})")]
    StackSize,
    #[error("invalid number of pubkeys {0}")]
    PubkeyCount(i64),
    #[error("invalid number of signatures {0}")]
    SigCount(i64),

    // CHECKLOCKTIMEVERIFY and CHECKSEQUENCEVERIFY
    #[error("negative lock time")]
    NegativeLocktime,
    #[error("required lock time has not been reached")]
    UnsatisfiedLocktime,

    // Inline template rewriting.
    #[error("redeem script does not match the script hash")]
    ScriptHashMismatch,
    #[error("witness program witness empty")]
    WitnessProgramWitnessEmpty,
    #[error("witness script does not match the witness program")]
    WitnessProgramMismatch,
}
