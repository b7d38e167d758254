/// Maximum number of bytes pushable to the stack.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// Largest push written with a single length byte.
pub const MAX_DIRECT_PUSH: usize = 75;

/// The maximum combined height of stack and alt stack during script execution.
pub const MAX_STACK_SIZE: usize = 1000;

/// Maximum number of public keys per multisig.
pub const MAX_PUBKEYS_PER_MULTISIG: i64 = 20;

pub const WITNESS_V0_KEYHASH_SIZE: usize = 20;
pub const WITNESS_V0_SCRIPTHASH_SIZE: usize = 32;

/// Lock times below this are block heights, above it unix timestamps.
pub const LOCKTIME_THRESHOLD: i64 = 500_000_000;

/// Sequence value that opts an input out of lock time enforcement.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Below flags apply in the context of BIP 68.
/// If this flag set, the sequence is NOT interpreted as a relative lock-time.
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

/// If set, the relative lock-time has units of 512 seconds, otherwise blocks.
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;
