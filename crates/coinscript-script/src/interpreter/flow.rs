use super::OpResult;
use crate::error::OpError;
use crate::script::Command;
use crate::stack::Stack;
use bitcoin::opcodes::all::{OP_ELSE, OP_ENDIF, OP_IF, OP_NOTIF};
use std::collections::VecDeque;

pub(super) fn op_if(stack: &mut Stack, queue: &mut VecDeque<Command>) -> OpResult {
    branch(stack, queue, false)
}

pub(super) fn op_notif(stack: &mut Stack, queue: &mut VecDeque<Command>) -> OpResult {
    branch(stack, queue, true)
}

fn branch(stack: &mut Stack, queue: &mut VecDeque<Command>, negate: bool) -> OpResult {
    let condition = stack.pop_bool()? != negate;
    let (taken, skipped) = split_branches(queue)?;
    let chosen = if condition { taken } else { skipped };
    tracing::trace!(condition, len = chosen.len(), "Taking branch");
    for cmd in chosen.into_iter().rev() {
        queue.push_front(cmd);
    }
    Ok(())
}

/// Drains the queue up to the matching `OP_ENDIF`.
///
/// Commands are routed to the first branch until an `OP_ELSE` at the same
/// nesting depth flips the target; a further `OP_ELSE` flips it back. Nested
/// conditionals are copied into whichever branch holds them.
fn split_branches(queue: &mut VecDeque<Command>) -> Result<(Vec<Command>, Vec<Command>), OpError> {
    let mut taken = Vec::new();
    let mut skipped = Vec::new();
    let mut in_taken = true;
    let mut depth = 1usize;

    while let Some(cmd) = queue.pop_front() {
        if cmd.is_op(OP_IF) || cmd.is_op(OP_NOTIF) {
            depth += 1;
        } else if cmd.is_op(OP_ELSE) && depth == 1 {
            in_taken = !in_taken;
            continue;
        } else if cmd.is_op(OP_ENDIF) {
            depth -= 1;
            if depth == 0 {
                return Ok((taken, skipped));
            }
        }

        if in_taken {
            taken.push(cmd);
        } else {
            skipped.push(cmd);
        }
    }

    Err(OpError::UnbalancedConditional)
}
