use super::{LockTimeContext, OpResult, SigContext, flow, locktime, ops, sig};
use crate::error::OpError;
use crate::num::ScriptNum;
use crate::script::Command;
use crate::stack::Stack;
use bitcoin::opcodes::Opcode;
use bitcoin::opcodes::all::*;
use std::collections::VecDeque;

type StackFn = fn(&mut Stack) -> OpResult;
type QueueFn = fn(&mut Stack, &mut VecDeque<Command>) -> OpResult;
type AltFn = fn(&mut Stack, &mut Stack) -> OpResult;
type DigestFn = fn(&mut Stack, &SigContext<'_>) -> OpResult;
type LockTimeFn = fn(&mut Stack, Option<&LockTimeContext>) -> OpResult;

/// How an opcode is executed, grouped by the state it needs.
pub(super) enum OpHandler {
    /// Pushes a small number.
    Constant(i64),
    Nop,
    Stack(StackFn),
    /// Flow control consumes the commands that follow it.
    StackAndQueue(QueueFn),
    StackAndAlt(AltFn),
    StackAndDigest(DigestFn),
    StackAndLockTime(LockTimeFn),
    /// Executing the opcode fails the script.
    Invalid(OpError),
}

pub(super) fn handler(op: Opcode) -> OpHandler {
    match op {
        // Constants
        OP_PUSHBYTES_0 => OpHandler::Constant(0),
        OP_PUSHNUM_NEG1 => OpHandler::Constant(-1),
        OP_PUSHNUM_1 | OP_PUSHNUM_2 | OP_PUSHNUM_3 | OP_PUSHNUM_4 | OP_PUSHNUM_5
        | OP_PUSHNUM_6 | OP_PUSHNUM_7 | OP_PUSHNUM_8 | OP_PUSHNUM_9 | OP_PUSHNUM_10
        | OP_PUSHNUM_11 | OP_PUSHNUM_12 | OP_PUSHNUM_13 | OP_PUSHNUM_14 | OP_PUSHNUM_15
        | OP_PUSHNUM_16 => {
            OpHandler::Constant(i64::from(op.to_u8() - OP_PUSHNUM_1.to_u8()) + 1)
        }

        // Flow control
        OP_NOP | OP_NOP1 | OP_NOP4 | OP_NOP5 | OP_NOP6 | OP_NOP7 | OP_NOP8 | OP_NOP9
        | OP_NOP10 | OP_CODESEPARATOR => OpHandler::Nop,
        OP_IF => OpHandler::StackAndQueue(flow::op_if),
        OP_NOTIF => OpHandler::StackAndQueue(flow::op_notif),
        // Matching OP_ELSE and OP_ENDIF are consumed by the OP_IF that owns them.
        OP_ELSE | OP_ENDIF => OpHandler::Invalid(OpError::UnbalancedConditional),
        OP_VERIFY => OpHandler::Stack(|stack| ops::verify(stack, OP_VERIFY)),
        OP_RETURN => OpHandler::Invalid(OpError::OpReturn),

        // Stack
        OP_TOALTSTACK => OpHandler::StackAndAlt(ops::op_toaltstack),
        OP_FROMALTSTACK => OpHandler::StackAndAlt(ops::op_fromaltstack),
        OP_2DROP => OpHandler::Stack(|stack| Ok(stack.drop(2)?)),
        OP_2DUP => OpHandler::Stack(|stack| Ok(stack.dup(2)?)),
        OP_3DUP => OpHandler::Stack(|stack| Ok(stack.dup(3)?)),
        OP_2OVER => OpHandler::Stack(|stack| Ok(stack.over(2)?)),
        OP_2ROT => OpHandler::Stack(|stack| Ok(stack.rot(2)?)),
        OP_2SWAP => OpHandler::Stack(|stack| Ok(stack.swap(2)?)),
        OP_IFDUP => OpHandler::Stack(ops::op_ifdup),
        OP_DEPTH => OpHandler::Stack(ops::op_depth),
        OP_DROP => OpHandler::Stack(|stack| Ok(stack.drop(1)?)),
        OP_DUP => OpHandler::Stack(|stack| Ok(stack.dup(1)?)),
        OP_NIP => OpHandler::Stack(|stack| Ok(stack.nip()?)),
        OP_OVER => OpHandler::Stack(|stack| Ok(stack.over(1)?)),
        OP_PICK => OpHandler::Stack(ops::op_pick),
        OP_ROLL => OpHandler::Stack(ops::op_roll),
        OP_ROT => OpHandler::Stack(|stack| Ok(stack.rot(1)?)),
        OP_SWAP => OpHandler::Stack(|stack| Ok(stack.swap(1)?)),
        OP_TUCK => OpHandler::Stack(|stack| Ok(stack.tuck()?)),
        OP_SIZE => OpHandler::Stack(ops::op_size),

        // Bitwise logic
        OP_EQUAL => OpHandler::Stack(ops::op_equal),
        OP_EQUALVERIFY => OpHandler::Stack(ops::op_equalverify),

        // Arithmetic
        OP_1ADD => OpHandler::Stack(|stack| ops::unary(stack, |n| n + ScriptNum::from(1))),
        OP_1SUB => OpHandler::Stack(|stack| ops::unary(stack, |n| n - ScriptNum::from(1))),
        OP_NEGATE => OpHandler::Stack(|stack| ops::unary(stack, |n| -n)),
        OP_ABS => OpHandler::Stack(|stack| ops::unary(stack, |n| n.abs())),
        OP_NOT => OpHandler::Stack(|stack| ops::unary(stack, |n| Ok(n.is_zero().into()))),
        OP_0NOTEQUAL => {
            OpHandler::Stack(|stack| ops::unary(stack, |n| Ok((!n.is_zero()).into())))
        }
        OP_ADD => OpHandler::Stack(|stack| ops::binary(stack, |a, b| a + b)),
        OP_SUB => OpHandler::Stack(|stack| ops::binary(stack, |a, b| a - b)),
        OP_BOOLAND => OpHandler::Stack(|stack| {
            ops::binary(stack, |a, b| Ok((!a.is_zero() && !b.is_zero()).into()))
        }),
        OP_BOOLOR => OpHandler::Stack(|stack| {
            ops::binary(stack, |a, b| Ok((!a.is_zero() || !b.is_zero()).into()))
        }),
        OP_NUMEQUAL => OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok((a == b).into()))),
        OP_NUMEQUALVERIFY => OpHandler::Stack(|stack| {
            ops::binary(stack, |a, b| Ok((a == b).into()))?;
            ops::verify(stack, OP_NUMEQUALVERIFY)
        }),
        OP_NUMNOTEQUAL => {
            OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok((a != b).into())))
        }
        OP_LESSTHAN => OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok((a < b).into()))),
        OP_GREATERTHAN => {
            OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok((a > b).into())))
        }
        OP_LESSTHANOREQUAL => {
            OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok((a <= b).into())))
        }
        OP_GREATERTHANOREQUAL => {
            OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok((a >= b).into())))
        }
        OP_MIN => OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok(a.min(b)))),
        OP_MAX => OpHandler::Stack(|stack| ops::binary(stack, |a, b| Ok(a.max(b)))),
        OP_WITHIN => OpHandler::Stack(ops::op_within),

        // Crypto
        OP_RIPEMD160 => OpHandler::Stack(ops::op_ripemd160),
        OP_SHA1 => OpHandler::Stack(ops::op_sha1),
        OP_SHA256 => OpHandler::Stack(ops::op_sha256),
        OP_HASH160 => OpHandler::Stack(ops::op_hash160),
        OP_HASH256 => OpHandler::Stack(ops::op_hash256),
        OP_CHECKSIG => OpHandler::StackAndDigest(sig::op_checksig),
        OP_CHECKSIGVERIFY => OpHandler::StackAndDigest(sig::op_checksigverify),
        OP_CHECKMULTISIG => OpHandler::StackAndDigest(sig::op_checkmultisig),
        OP_CHECKMULTISIGVERIFY => OpHandler::StackAndDigest(sig::op_checkmultisigverify),

        // Locktime
        OP_CLTV => OpHandler::StackAndLockTime(locktime::op_checklocktimeverify),
        OP_CSV => OpHandler::StackAndLockTime(locktime::op_checksequenceverify),

        OP_CAT | OP_SUBSTR | OP_LEFT | OP_RIGHT | OP_INVERT | OP_AND | OP_OR | OP_XOR
        | OP_2MUL | OP_2DIV | OP_MUL | OP_DIV | OP_MOD | OP_LSHIFT | OP_RSHIFT => {
            OpHandler::Invalid(OpError::DisabledOpcode(op))
        }

        // Push opcodes never reach here as `Command::Op` from parsed scripts, the
        // rest are reserved or unassigned.
        _ => OpHandler::Invalid(OpError::BadOpcode(op)),
    }
}
