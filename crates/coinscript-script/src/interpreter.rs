//! Stack machine executing scripts.
//!
//! Evaluation drains a queue of commands. Data pushes may rewrite the rest of
//! the queue: a pending `OP_HASH160 <h160> OP_EQUAL` turns the pushed bytes into
//! a redeem script (BIP16), and a stack shaped like a version 0 witness program
//! pulls in the witness.

mod dispatch;
mod flow;
mod locktime;
mod ops;
mod sig;

use crate::constants::{MAX_STACK_SIZE, WITNESS_V0_KEYHASH_SIZE, WITNESS_V0_SCRIPTHASH_SIZE};
use crate::error::{EvalError, OpError};
use crate::num::NumError;
use crate::script::{Command, Script};
use crate::solver;
use crate::stack::{Stack, StackError, cast_to_bool};
use bitcoin::opcodes::all::{OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};
use coinscript_primitives::hash::sha256;
use coinscript_primitives::{Ecc, SigHash};
use dispatch::OpHandler;
use std::collections::VecDeque;

pub use self::locktime::LockTimeContext;

type OpResult = Result<(), OpError>;

/// Why `run` stopped early.
enum Halt {
    /// The script is invalid.
    Failed(OpError),
    /// The script could not be run at all.
    Engine(EvalError),
}

impl From<OpError> for Halt {
    fn from(err: OpError) -> Self {
        Self::Failed(err)
    }
}

impl From<StackError> for Halt {
    fn from(err: StackError) -> Self {
        Self::Failed(err.into())
    }
}

impl From<NumError> for Halt {
    fn from(err: NumError) -> Self {
        Self::Failed(err.into())
    }
}

/// What the signature opcodes check against.
pub(crate) struct SigContext<'a> {
    ecc: &'a Ecc,
    z: &'a SigHash,
}

/// Final state of a script execution.
#[derive(Debug)]
pub struct Execution {
    /// Main stack at the point execution stopped.
    pub stack: Stack,
    /// Set when an opcode failed.
    pub failure: Option<OpError>,
}

impl Execution {
    /// A script succeeds when it runs to completion leaving a true value on top.
    pub fn success(&self) -> bool {
        self.failure.is_none() && self.stack.last().is_ok_and(|top| cast_to_bool(top))
    }
}

/// Script interpreter bound to a curve context.
#[derive(Debug)]
pub struct Interpreter<'a> {
    ecc: &'a Ecc,
    lock_time: Option<LockTimeContext>,
}

impl<'a> Interpreter<'a> {
    pub fn new(ecc: &'a Ecc) -> Self {
        Self {
            ecc,
            lock_time: None,
        }
    }

    /// Enforces `OP_CHECKLOCKTIMEVERIFY` and `OP_CHECKSEQUENCEVERIFY` against the
    /// spending input. Without a context both behave as `OP_NOP`.
    pub fn with_lock_time(mut self, lock_time: LockTimeContext) -> Self {
        self.lock_time = Some(lock_time);
        self
    }

    /// Evaluates `script` and reports whether it succeeded.
    ///
    /// `Ok(false)` means the script is invalid; `Err` is returned only when an
    /// embedded redeem or witness script cannot be parsed.
    pub fn evaluate(
        &self,
        script: &Script,
        z: &SigHash,
        witness: &[Vec<u8>],
    ) -> Result<bool, EvalError> {
        self.execute(script, z, witness)
            .map(|execution| execution.success())
    }

    /// Evaluates `script`, returning the final stack and the failure reason if
    /// any.
    pub fn execute(
        &self,
        script: &Script,
        z: &SigHash,
        witness: &[Vec<u8>],
    ) -> Result<Execution, EvalError> {
        let mut stack = Stack::new();

        let failure = match self.run(script, z, witness, &mut stack) {
            Ok(()) => None,
            Err(Halt::Failed(reason)) => {
                tracing::debug!(%reason, %stack, "Script evaluation failed");
                Some(reason)
            }
            Err(Halt::Engine(err)) => return Err(err),
        };

        Ok(Execution { stack, failure })
    }

    fn run(
        &self,
        script: &Script,
        z: &SigHash,
        witness: &[Vec<u8>],
        stack: &mut Stack,
    ) -> Result<(), Halt> {
        let sig_context = SigContext { ecc: self.ecc, z };
        let mut queue: VecDeque<Command> = script.cmds().iter().cloned().collect();
        let mut alt_stack = Stack::new();

        while let Some(cmd) = queue.pop_front() {
            tracing::trace!(%cmd, depth = stack.len(), "Executing command");

            match cmd {
                Command::Data(data) => {
                    stack.push(data);
                    splice_redeem_script(stack, &mut queue)?;
                    splice_witness_program(stack, &mut queue, witness)?;
                }
                Command::Op(op) => match dispatch::handler(op) {
                    OpHandler::Constant(n) => {
                        stack.push_num(n);
                    }
                    OpHandler::Nop => {}
                    OpHandler::Stack(f) => f(stack)?,
                    OpHandler::StackAndQueue(f) => f(stack, &mut queue)?,
                    OpHandler::StackAndAlt(f) => f(stack, &mut alt_stack)?,
                    OpHandler::StackAndDigest(f) => f(stack, &sig_context)?,
                    OpHandler::StackAndLockTime(f) => f(stack, self.lock_time.as_ref())?,
                    OpHandler::Invalid(err) => return Err(err.into()),
                },
            }

            if stack.len() + alt_stack.len() > MAX_STACK_SIZE {
                return Err(OpError::StackSize.into());
            }
        }

        Ok(())
    }
}

/// BIP16: when the only commands left are `OP_HASH160 <h160> OP_EQUAL`, the
/// element just pushed is a redeem script. Check its hash and run it in place.
fn splice_redeem_script(stack: &mut Stack, queue: &mut VecDeque<Command>) -> Result<(), Halt> {
    if !solver::is_p2sh(queue.make_contiguous()) {
        return Ok(());
    }

    let expected = match queue.get(1) {
        Some(Command::Data(h160)) => h160.clone(),
        _ => return Ok(()),
    };
    queue.clear();

    let redeem_script = stack.last()?.clone();

    ops::op_hash160(stack)?;
    stack.push(expected);
    ops::op_equal(stack)?;
    if !stack.pop_bool()? {
        return Err(OpError::ScriptHashMismatch.into());
    }

    let redeem_script =
        Script::from_raw(&redeem_script).map_err(|err| Halt::Engine(EvalError::EmbeddedScript(err)))?;
    for cmd in redeem_script.into_cmds().into_iter().rev() {
        queue.push_front(cmd);
    }

    Ok(())
}

/// A stack of exactly `[<empty>, program]` is a version 0 witness program. The
/// stack is replaced by the witness, followed by the script the program commits
/// to.
fn splice_witness_program(
    stack: &mut Stack,
    queue: &mut VecDeque<Command>,
    witness: &[Vec<u8>],
) -> Result<(), Halt> {
    let program = match stack.as_slice() {
        [version, program] if version.is_empty() => program.clone(),
        _ => return Ok(()),
    };

    match program.len() {
        WITNESS_V0_KEYHASH_SIZE => {
            stack.clear();
            queue.extend(witness.iter().cloned().map(Command::Data));
            queue.extend([
                OP_DUP.into(),
                OP_HASH160.into(),
                Command::Data(program),
                OP_EQUALVERIFY.into(),
                OP_CHECKSIG.into(),
            ]);
        }
        WITNESS_V0_SCRIPTHASH_SIZE => {
            stack.clear();
            let (witness_script, items) = witness
                .split_last()
                .ok_or(OpError::WitnessProgramWitnessEmpty)?;
            if sha256(witness_script)[..] != program[..] {
                return Err(OpError::WitnessProgramMismatch.into());
            }
            let witness_script = Script::from_raw(witness_script)
                .map_err(|err| Halt::Engine(EvalError::EmbeddedScript(err)))?;
            queue.extend(items.iter().cloned().map(Command::Data));
            queue.extend(witness_script.into_cmds());
        }
        _ => {}
    }

    Ok(())
}
