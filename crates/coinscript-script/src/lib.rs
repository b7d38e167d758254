//! Bitcoin script model and interpreter.
//!
//! A [`Script`] is a list of opcodes and data pushes. Evaluation runs the
//! combined unlocking and locking script on a single stack and recognises the
//! P2SH, P2WPKH and P2WSH templates inline.

mod constants;
mod error;
mod interpreter;
mod num;
mod script;
mod solver;
mod stack;


pub use self::constants::{LOCKTIME_THRESHOLD, MAX_SCRIPT_ELEMENT_SIZE, SEQUENCE_FINAL};
pub use self::error::{Error, EvalError, OpError};
pub use self::interpreter::{Execution, Interpreter, LockTimeContext};
pub use self::num::{NumError, ScriptNum, decode_num, encode_num};
pub use self::script::{Command, Script};
pub use self::solver::ScriptType;
pub use self::stack::{Stack, StackError, cast_to_bool};
pub use bitcoin::opcodes;
