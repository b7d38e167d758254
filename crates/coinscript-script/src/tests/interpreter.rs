use crate::error::OpError;
use crate::interpreter::Interpreter;
use crate::script::{Command, Script};
use crate::stack::{Stack, StackError};
use bitcoin::opcodes::all::*;
use coinscript_primitives::Ecc;

struct EvalResult {
    /// Success flag of the evaluation.
    success: bool,
    /// Failure reason reported by the interpreter.
    failure: Option<OpError>,
    /// Stack at the point execution stopped.
    expected_stack: Stack,
}

impl EvalResult {
    fn ok(success: bool, stack: Stack) -> Self {
        Self {
            success,
            failure: None,
            expected_stack: stack,
        }
    }

    fn err(err: impl Into<OpError>, stack: Stack) -> Self {
        Self {
            success: false,
            failure: Some(err.into()),
            expected_stack: stack,
        }
    }
}

fn basic_test(script: &Script, eval_result: EvalResult) {
    let EvalResult {
        success,
        failure,
        expected_stack,
    } = eval_result;

    let ecc = Ecc::new();
    let execution = Interpreter::new(&ecc)
        .execute(script, &[0u8; 32], &[])
        .expect("No embedded scripts in interpreter tests");

    assert_eq!(execution.failure, failure);
    assert_eq!(execution.stack, expected_stack);
    assert_eq!(execution.success(), success);
}

fn from_cmds(cmds: Vec<Command>) -> Script {
    Script::new(cmds)
}

fn data(bytes: &[u8]) -> Command {
    Command::Data(bytes.to_vec())
}

fn stack(items: Vec<Vec<u8>>) -> Stack {
    Stack::from(items)
}

#[test]
fn test_equal() {
    let script = from_cmds(vec![data(&[0x4]), data(&[0x4]), OP_EQUAL.into()]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![1]])));
}

#[test]
fn test_equal_false() {
    let script = from_cmds(vec![data(&[0x4]), data(&[0x3]), OP_EQUAL.into()]);
    basic_test(&script, EvalResult::ok(false, stack(vec![vec![]])));
}

#[test]
fn test_equal_invalid_stack() {
    let script = from_cmds(vec![data(&[0x4]), OP_EQUAL.into()]);
    basic_test(
        &script,
        EvalResult::err(StackError::InvalidOperation, stack(vec![])),
    );
}

#[test]
fn test_equalverify_failed() {
    let script = from_cmds(vec![data(&[0x4]), data(&[0x3]), OP_EQUALVERIFY.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::Verify(OP_EQUALVERIFY), stack(vec![])),
    );
}

#[test]
fn test_empty_script_fails() {
    basic_test(&Script::default(), EvalResult::ok(false, stack(vec![])));
}

#[test]
fn test_small_numbers() {
    let script = from_cmds(vec![
        OP_PUSHBYTES_0.into(),
        OP_PUSHNUM_NEG1.into(),
        OP_PUSHNUM_1.into(),
        OP_PUSHNUM_16.into(),
    ]);
    basic_test(
        &script,
        EvalResult::ok(true, stack(vec![vec![], vec![0x81], vec![1], vec![16]])),
    );
}

#[test]
fn test_arithmetic() {
    // 2 3 ADD 5 NUMEQUAL
    let script = from_cmds(vec![
        OP_PUSHNUM_2.into(),
        OP_PUSHNUM_3.into(),
        OP_ADD.into(),
        OP_PUSHNUM_5.into(),
        OP_NUMEQUAL.into(),
    ]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![1]])));

    // 1 NEGATE 1ADD leaves zero, which is false.
    let script = from_cmds(vec![OP_PUSHNUM_1.into(), OP_NEGATE.into(), OP_1ADD.into()]);
    basic_test(&script, EvalResult::ok(false, stack(vec![vec![]])));

    // 1 2 MAX 3 MIN -> 2
    let script = from_cmds(vec![
        OP_PUSHNUM_1.into(),
        OP_PUSHNUM_2.into(),
        OP_MAX.into(),
        OP_PUSHNUM_3.into(),
        OP_MIN.into(),
    ]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![2]])));
}

#[test]
fn test_negative_zero_is_false() {
    let script = from_cmds(vec![data(&[0x00, 0x80])]);
    basic_test(&script, EvalResult::ok(false, stack(vec![vec![0x00, 0x80]])));
}

#[test]
fn test_if_else_endif() {
    // 1 IF 2 ELSE 3 ENDIF
    let branches = |condition: Command| {
        from_cmds(vec![
            condition,
            OP_IF.into(),
            OP_PUSHNUM_2.into(),
            OP_ELSE.into(),
            OP_PUSHNUM_3.into(),
            OP_ENDIF.into(),
        ])
    };
    basic_test(
        &branches(OP_PUSHNUM_1.into()),
        EvalResult::ok(true, stack(vec![vec![2]])),
    );
    basic_test(
        &branches(OP_PUSHBYTES_0.into()),
        EvalResult::ok(true, stack(vec![vec![3]])),
    );
}

#[test]
fn test_nested_if() {
    // 1 0 IF 5 ELSE IF 6 ENDIF ENDIF
    let script = from_cmds(vec![
        OP_PUSHNUM_1.into(),
        OP_PUSHBYTES_0.into(),
        OP_IF.into(),
        OP_PUSHNUM_5.into(),
        OP_ELSE.into(),
        OP_IF.into(),
        OP_PUSHNUM_6.into(),
        OP_ENDIF.into(),
        OP_ENDIF.into(),
    ]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![6]])));
}

#[test]
fn test_notif() {
    let script = from_cmds(vec![
        OP_PUSHBYTES_0.into(),
        OP_NOTIF.into(),
        OP_PUSHNUM_7.into(),
        OP_ENDIF.into(),
    ]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![7]])));
}

#[test]
fn test_unbalanced_conditional() {
    let script = from_cmds(vec![OP_PUSHNUM_1.into(), OP_IF.into(), OP_PUSHNUM_2.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::UnbalancedConditional, stack(vec![])),
    );

    let script = from_cmds(vec![OP_PUSHNUM_1.into(), OP_ENDIF.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::UnbalancedConditional, stack(vec![vec![1]])),
    );
}

#[test]
fn test_op_return() {
    let script = from_cmds(vec![OP_PUSHNUM_1.into(), OP_RETURN.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::OpReturn, stack(vec![vec![1]])),
    );
}

#[test]
fn test_disabled_opcode() {
    let script = from_cmds(vec![OP_PUSHNUM_2.into(), OP_PUSHNUM_3.into(), OP_MUL.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::DisabledOpcode(OP_MUL), stack(vec![vec![2], vec![3]])),
    );
}

#[test]
fn test_reserved_opcode() {
    let script = from_cmds(vec![OP_PUSHNUM_1.into(), OP_RESERVED.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::BadOpcode(OP_RESERVED), stack(vec![vec![1]])),
    );
}

#[test]
fn test_nops_leave_stack_untouched() {
    let script = from_cmds(vec![
        OP_PUSHNUM_1.into(),
        OP_NOP.into(),
        OP_NOP10.into(),
        OP_CODESEPARATOR.into(),
        // Without a lock time context these are NOPs too.
        OP_CLTV.into(),
        OP_CSV.into(),
    ]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![1]])));
}

#[test]
fn test_alt_stack() {
    // 1 TOALTSTACK 2 FROMALTSTACK
    let script = from_cmds(vec![
        OP_PUSHNUM_1.into(),
        OP_TOALTSTACK.into(),
        OP_PUSHNUM_2.into(),
        OP_FROMALTSTACK.into(),
    ]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![2], vec![1]])));

    let script = from_cmds(vec![OP_FROMALTSTACK.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::InvalidAltStackOperation, stack(vec![])),
    );
}

#[test]
fn test_stack_ops() {
    // 1 2 3 ROT -> 2 3 1
    let script = from_cmds(vec![
        OP_PUSHNUM_1.into(),
        OP_PUSHNUM_2.into(),
        OP_PUSHNUM_3.into(),
        OP_ROT.into(),
    ]);
    basic_test(
        &script,
        EvalResult::ok(true, stack(vec![vec![2], vec![3], vec![1]])),
    );

    // [1 2] SWAP [2 1] OVER [2 1 2] TUCK [2 2 1 2]
    let script = from_cmds(vec![
        OP_PUSHNUM_1.into(),
        OP_PUSHNUM_2.into(),
        OP_SWAP.into(),
        OP_OVER.into(),
        OP_TUCK.into(),
    ]);
    basic_test(
        &script,
        EvalResult::ok(true, stack(vec![vec![2], vec![2], vec![1], vec![2]])),
    );

    // <aabb> SIZE DEPTH
    let script = from_cmds(vec![data(&[0xaa, 0xbb]), OP_SIZE.into(), OP_DEPTH.into()]);
    basic_test(
        &script,
        EvalResult::ok(true, stack(vec![vec![0xaa, 0xbb], vec![2], vec![2]])),
    );
}

#[test]
fn test_hash_ops() {
    let script = from_cmds(vec![data(b""), OP_SHA256.into()]);
    let expected = coinscript_primitives::hash::sha256(b"").to_vec();
    basic_test(&script, EvalResult::ok(true, stack(vec![expected])));

    let script = from_cmds(vec![data(b""), OP_HASH160.into(), OP_SIZE.into()]);
    let expected = coinscript_primitives::hash::hash160(b"").to_vec();
    basic_test(&script, EvalResult::ok(true, stack(vec![expected, vec![20]])));
}

#[test]
fn test_stack_size_limit() {
    let mut cmds: Vec<Command> = vec![OP_PUSHNUM_1.into()];
    cmds.extend(std::iter::repeat_n(Command::from(OP_DUP), 999));
    basic_test(
        &from_cmds(cmds.clone()),
        EvalResult::ok(true, stack(vec![vec![1]; 1000])),
    );

    cmds.push(OP_DUP.into());
    basic_test(
        &from_cmds(cmds),
        EvalResult::err(OpError::StackSize, stack(vec![vec![1]; 1001])),
    );
}

#[test]
fn test_checksig_with_malformed_inputs_is_false() {
    let script = from_cmds(vec![data(&[0x30, 0x01, 0x01]), data(&[0x02; 33]), OP_CHECKSIG.into()]);
    basic_test(&script, EvalResult::ok(false, stack(vec![vec![]])));

    let script = from_cmds(vec![
        data(&[0x30, 0x01, 0x01]),
        data(&[0x02; 33]),
        OP_CHECKSIGVERIFY.into(),
    ]);
    basic_test(
        &script,
        EvalResult::err(OpError::Verify(OP_CHECKSIGVERIFY), stack(vec![])),
    );
}

#[test]
fn test_checkmultisig_counts() {
    // 0 0 0 CHECKMULTISIG: no keys, no signatures, succeeds trivially.
    let script = from_cmds(vec![
        OP_PUSHBYTES_0.into(),
        OP_PUSHBYTES_0.into(),
        OP_PUSHBYTES_0.into(),
        OP_CHECKMULTISIG.into(),
    ]);
    basic_test(&script, EvalResult::ok(true, stack(vec![vec![1]])));

    // 21 keys is over the limit.
    let script = from_cmds(vec![data(&[21]), OP_CHECKMULTISIG.into()]);
    basic_test(
        &script,
        EvalResult::err(OpError::PubkeyCount(21), stack(vec![])),
    );

    // More signatures than keys.
    let script = from_cmds(vec![
        OP_PUSHNUM_2.into(),
        data(&[0x02; 33]),
        OP_PUSHNUM_1.into(),
        OP_CHECKMULTISIG.into(),
    ]);
    basic_test(&script, EvalResult::err(OpError::SigCount(2), stack(vec![])));

    // The dummy element is required.
    let script = from_cmds(vec![
        OP_PUSHBYTES_0.into(),
        OP_PUSHBYTES_0.into(),
        OP_CHECKMULTISIG.into(),
    ]);
    basic_test(
        &script,
        EvalResult::err(StackError::InvalidOperation, stack(vec![])),
    );
}
