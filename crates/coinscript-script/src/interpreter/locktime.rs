use super::OpResult;
use crate::constants::{
    LOCKTIME_THRESHOLD, SEQUENCE_FINAL, SEQUENCE_LOCKTIME_DISABLE_FLAG, SEQUENCE_LOCKTIME_MASK,
    SEQUENCE_LOCKTIME_TYPE_FLAG,
};
use crate::error::OpError;
use crate::num::ScriptNum;
use crate::stack::Stack;

/// Fields of the spending transaction the lock time opcodes compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockTimeContext {
    pub tx_version: i32,
    pub locktime: u32,
    /// Sequence of the input being verified.
    pub sequence: u32,
}

/// Reads the lock time operand, leaving it on the stack.
fn peek_lock_time(stack: &Stack) -> Result<i64, OpError> {
    let n = stack.peek_num(ScriptNum::LOCKTIME_NUM_SIZE)?;
    if n.is_negative() {
        return Err(OpError::NegativeLocktime);
    }
    Ok(n.value())
}

/// BIP65
pub(super) fn op_checklocktimeverify(stack: &mut Stack, ctx: Option<&LockTimeContext>) -> OpResult {
    let Some(ctx) = ctx else {
        return Ok(());
    };

    let lock_time = peek_lock_time(stack)?;
    let tx_lock_time = i64::from(ctx.locktime);

    // Heights and timestamps are not comparable.
    let same_kind = (lock_time < LOCKTIME_THRESHOLD) == (tx_lock_time < LOCKTIME_THRESHOLD);

    // A final input disables the transaction lock time, which would bypass
    // the check.
    if !same_kind || lock_time > tx_lock_time || ctx.sequence == SEQUENCE_FINAL {
        return Err(OpError::UnsatisfiedLocktime);
    }

    Ok(())
}

/// BIP112
pub(super) fn op_checksequenceverify(stack: &mut Stack, ctx: Option<&LockTimeContext>) -> OpResult {
    let Some(ctx) = ctx else {
        return Ok(());
    };

    let sequence = peek_lock_time(stack)?;

    // With the disable flag set the opcode behaves as a NOP.
    if sequence & i64::from(SEQUENCE_LOCKTIME_DISABLE_FLAG) != 0 {
        return Ok(());
    }

    if ctx.tx_version < 2 || ctx.sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
        return Err(OpError::UnsatisfiedLocktime);
    }

    let mask = i64::from(SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK);
    let required = sequence & mask;
    let actual = i64::from(ctx.sequence) & mask;

    let type_flag = i64::from(SEQUENCE_LOCKTIME_TYPE_FLAG);
    let same_kind = (required < type_flag) == (actual < type_flag);

    if !same_kind || required > actual {
        return Err(OpError::UnsatisfiedLocktime);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: LockTimeContext = LockTimeContext {
        tx_version: 2,
        locktime: 500,
        sequence: 10,
    };

    fn stack_with(n: i64) -> Stack {
        let mut stack = Stack::new();
        stack.push_num(n);
        stack
    }

    #[test]
    fn test_cltv_compares_against_transaction_lock_time() {
        assert!(op_checklocktimeverify(&mut stack_with(500), Some(&CONTEXT)).is_ok());
        assert_eq!(
            op_checklocktimeverify(&mut stack_with(501), Some(&CONTEXT)),
            Err(OpError::UnsatisfiedLocktime)
        );
        // Timestamp against a height lock time.
        assert_eq!(
            op_checklocktimeverify(&mut stack_with(LOCKTIME_THRESHOLD), Some(&CONTEXT)),
            Err(OpError::UnsatisfiedLocktime)
        );
        assert_eq!(
            op_checklocktimeverify(&mut stack_with(-1), Some(&CONTEXT)),
            Err(OpError::NegativeLocktime)
        );

        let final_input = LockTimeContext {
            sequence: SEQUENCE_FINAL,
            ..CONTEXT
        };
        assert_eq!(
            op_checklocktimeverify(&mut stack_with(100), Some(&final_input)),
            Err(OpError::UnsatisfiedLocktime)
        );
    }

    #[test]
    fn test_cltv_operand_stays_on_stack() {
        let mut stack = stack_with(100);
        op_checklocktimeverify(&mut stack, Some(&CONTEXT)).unwrap();
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_csv_relative_lock() {
        assert!(op_checksequenceverify(&mut stack_with(10), Some(&CONTEXT)).is_ok());
        assert_eq!(
            op_checksequenceverify(&mut stack_with(11), Some(&CONTEXT)),
            Err(OpError::UnsatisfiedLocktime)
        );

        let version_one = LockTimeContext {
            tx_version: 1,
            ..CONTEXT
        };
        assert_eq!(
            op_checksequenceverify(&mut stack_with(10), Some(&version_one)),
            Err(OpError::UnsatisfiedLocktime)
        );

        // Disabled operand passes regardless of the input.
        let disabled = i64::from(SEQUENCE_LOCKTIME_DISABLE_FLAG);
        assert!(op_checksequenceverify(&mut stack_with(disabled), Some(&version_one)).is_ok());
    }

    #[test]
    fn test_without_context_is_nop() {
        let mut stack = Stack::new();
        assert!(op_checklocktimeverify(&mut stack, None).is_ok());
        assert!(op_checksequenceverify(&mut stack, None).is_ok());
    }
}
