use super::{OpResult, SigContext};
use crate::constants::MAX_PUBKEYS_PER_MULTISIG;
use crate::error::OpError;
use crate::stack::Stack;
use bitcoin::opcodes::all::{OP_CHECKMULTISIGVERIFY, OP_CHECKSIGVERIFY};
use coinscript_primitives::{Point, Signature};

impl SigContext<'_> {
    fn parse_signature(&self, sig: &[u8]) -> Option<Signature> {
        // The trailing byte is the sighash type, the digest already commits to it.
        let (_sighash_type, der) = sig.split_last()?;
        self.ecc
            .parse_signature(der)
            .inspect_err(|err| tracing::debug!(?err, "Malformed signature"))
            .ok()
    }

    fn parse_point(&self, sec: &[u8]) -> Option<Point> {
        self.ecc
            .parse_point(sec)
            .inspect_err(|err| tracing::debug!(?err, "Malformed public key"))
            .ok()
    }

    fn check(&self, sig: &[u8], sec: &[u8]) -> bool {
        match (self.parse_signature(sig), self.parse_point(sec)) {
            (Some(sig), Some(point)) => self.ecc.verify(&point, self.z, &sig),
            _ => false,
        }
    }
}

pub(super) fn op_checksig(stack: &mut Stack, ctx: &SigContext<'_>) -> OpResult {
    let success = eval_checksig(stack, ctx)?;
    stack.push_bool(success);
    Ok(())
}

pub(super) fn op_checksigverify(stack: &mut Stack, ctx: &SigContext<'_>) -> OpResult {
    if eval_checksig(stack, ctx)? {
        Ok(())
    } else {
        Err(OpError::Verify(OP_CHECKSIGVERIFY))
    }
}

// ([sig] [pubkey] -- bool)
fn eval_checksig(stack: &mut Stack, ctx: &SigContext<'_>) -> Result<bool, OpError> {
    let sec = stack.pop()?;
    let sig = stack.pop()?;
    Ok(ctx.check(&sig, &sec))
}

enum MultiSigOp {
    CheckMultiSig,
    CheckMultiSigVerify,
}

pub(super) fn op_checkmultisig(stack: &mut Stack, ctx: &SigContext<'_>) -> OpResult {
    handle_checkmultisig(stack, ctx, MultiSigOp::CheckMultiSig)
}

pub(super) fn op_checkmultisigverify(stack: &mut Stack, ctx: &SigContext<'_>) -> OpResult {
    handle_checkmultisig(stack, ctx, MultiSigOp::CheckMultiSigVerify)
}

fn handle_checkmultisig(
    stack: &mut Stack,
    ctx: &SigContext<'_>,
    multisig_op: MultiSigOp,
) -> OpResult {
    let success = eval_checkmultisig(stack, ctx)?;

    match multisig_op {
        MultiSigOp::CheckMultiSig => {
            stack.push_bool(success);
        }
        MultiSigOp::CheckMultiSigVerify if !success => {
            return Err(OpError::Verify(OP_CHECKMULTISIGVERIFY));
        }
        _ => {}
    }

    Ok(())
}

/// Every signature must verify against a distinct public key. Keys may be
/// matched in any order.
fn eval_checkmultisig(stack: &mut Stack, ctx: &SigContext<'_>) -> Result<bool, OpError> {
    // (dummy [sig ...] num_of_signatures [pubkey ...] num_of_pubkeys -- bool)

    let keys_count = stack.pop_num()?.value();
    if !(0..=MAX_PUBKEYS_PER_MULTISIG).contains(&keys_count) {
        return Err(OpError::PubkeyCount(keys_count));
    }

    let mut keys = Vec::with_capacity(keys_count as usize);
    for _ in 0..keys_count {
        keys.push(stack.pop()?);
    }

    let sigs_count = stack.pop_num()?.value();
    if !(0..=keys_count).contains(&sigs_count) {
        return Err(OpError::SigCount(sigs_count));
    }

    let mut sigs = Vec::with_capacity(sigs_count as usize);
    for _ in 0..sigs_count {
        sigs.push(stack.pop()?);
    }

    // One more element than described is consumed, its value is ignored.
    let _dummy = stack.pop()?;

    let mut points: Vec<Point> = keys.iter().filter_map(|sec| ctx.parse_point(sec)).collect();

    for sig in &sigs {
        let Some(sig) = ctx.parse_signature(sig) else {
            return Ok(false);
        };
        match points
            .iter()
            .position(|point| ctx.ecc.verify(point, ctx.z, &sig))
        {
            Some(index) => {
                points.swap_remove(index);
            }
            None => return Ok(false),
        }
    }

    Ok(true)
}
