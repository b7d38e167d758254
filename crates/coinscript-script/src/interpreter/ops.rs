use super::OpResult;
use crate::error::OpError;
use crate::num::{NumError, ScriptNum};
use crate::stack::{Stack, StackError};
use bitcoin::opcodes::Opcode;
use bitcoin::opcodes::all::OP_EQUALVERIFY;
use coinscript_primitives::hash;

/// Pops the top element and fails with `op` unless it is true.
pub(super) fn verify(stack: &mut Stack, op: Opcode) -> OpResult {
    if stack.pop_bool()? {
        Ok(())
    } else {
        Err(OpError::Verify(op))
    }
}

pub(super) fn op_toaltstack(stack: &mut Stack, alt_stack: &mut Stack) -> OpResult {
    alt_stack.push(stack.pop()?);
    Ok(())
}

pub(super) fn op_fromaltstack(stack: &mut Stack, alt_stack: &mut Stack) -> OpResult {
    let item = alt_stack
        .pop()
        .map_err(|_| OpError::InvalidAltStackOperation)?;
    stack.push(item);
    Ok(())
}

pub(super) fn op_ifdup(stack: &mut Stack) -> OpResult {
    if stack.peek_bool()? {
        stack.dup(1)?;
    }
    Ok(())
}

pub(super) fn op_depth(stack: &mut Stack) -> OpResult {
    let depth = stack.len() as i64;
    stack.push_num(depth);
    Ok(())
}

/// Pops `n` and returns the position it names, counted from the top.
fn pop_depth(stack: &mut Stack) -> Result<usize, StackError> {
    let n = stack.pop_num()?.value();
    usize::try_from(n).map_err(|_| StackError::InvalidOperation)
}

/// `[xn ... x2 x1 x0 n] -> [xn ... x2 x1 x0 xn]`
pub(super) fn op_pick(stack: &mut Stack) -> OpResult {
    let n = pop_depth(stack)?;
    let item = stack.top(n)?.clone();
    stack.push(item);
    Ok(())
}

/// `[xn ... x2 x1 x0 n] -> [... x2 x1 x0 xn]`
pub(super) fn op_roll(stack: &mut Stack) -> OpResult {
    let n = pop_depth(stack)?;
    let item = stack.remove(n)?;
    stack.push(item);
    Ok(())
}

pub(super) fn op_size(stack: &mut Stack) -> OpResult {
    let size = stack.last()?.len() as i64;
    stack.push_num(size);
    Ok(())
}

pub(super) fn op_equal(stack: &mut Stack) -> OpResult {
    let a = stack.pop()?;
    let b = stack.pop()?;
    stack.push_bool(a == b);
    Ok(())
}

pub(super) fn op_equalverify(stack: &mut Stack) -> OpResult {
    op_equal(stack)?;
    verify(stack, OP_EQUALVERIFY)
}

/// Replaces the top number with `f(top)`.
pub(super) fn unary(
    stack: &mut Stack,
    f: impl FnOnce(ScriptNum) -> Result<ScriptNum, NumError>,
) -> OpResult {
    let n = stack.pop_num()?;
    stack.push_num(f(n)?);
    Ok(())
}

/// Replaces the top two numbers `[a b]` with `f(a, b)`.
pub(super) fn binary(
    stack: &mut Stack,
    f: impl FnOnce(ScriptNum, ScriptNum) -> Result<ScriptNum, NumError>,
) -> OpResult {
    let b = stack.pop_num()?;
    let a = stack.pop_num()?;
    stack.push_num(f(a, b)?);
    Ok(())
}

/// `[x min max] -> [min <= x < max]`
pub(super) fn op_within(stack: &mut Stack) -> OpResult {
    let max = stack.pop_num()?;
    let min = stack.pop_num()?;
    let x = stack.pop_num()?;
    stack.push_bool(min <= x && x < max);
    Ok(())
}

fn digest<const N: usize>(stack: &mut Stack, f: fn(&[u8]) -> [u8; N]) -> OpResult {
    let item = stack.pop()?;
    stack.push(f(&item).to_vec());
    Ok(())
}

pub(super) fn op_ripemd160(stack: &mut Stack) -> OpResult {
    digest(stack, hash::ripemd160)
}

pub(super) fn op_sha1(stack: &mut Stack) -> OpResult {
    digest(stack, hash::sha1)
}

pub(super) fn op_sha256(stack: &mut Stack) -> OpResult {
    digest(stack, hash::sha256)
}

pub(super) fn op_hash160(stack: &mut Stack) -> OpResult {
    digest(stack, hash::hash160)
}

pub(super) fn op_hash256(stack: &mut Stack) -> OpResult {
    digest(stack, hash::hash256)
}
