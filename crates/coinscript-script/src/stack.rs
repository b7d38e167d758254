use crate::num::{NumError, ScriptNum};
use std::fmt::Display;
use std::ops::{Deref, DerefMut};

/// Stack error type.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum StackError {
    #[error("invalid stack operation")]
    InvalidOperation,
    #[error(transparent)]
    Num(#[from] NumError),
}

type Result<T> = std::result::Result<T, StackError>;

/// Main and alt stack of a script evaluation, with the element shuffling
/// primitives the opcodes are built from.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Stack {
    data: Vec<Vec<u8>>,
}

impl From<Vec<Vec<u8>>> for Stack {
    fn from(data: Vec<Vec<u8>>) -> Self {
        Self { data }
    }
}

impl Deref for Stack {
    type Target = Vec<Vec<u8>>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Stack {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if item.is_empty() {
                write!(f, "<empty>")?;
            } else {
                write!(f, "{}", hex::encode(item))?;
            }
        }
        write!(f, "]")
    }
}

impl Stack {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<Vec<u8>> {
        self.data
    }

    // Ensure there are at least `n` elements on the stack.
    #[inline]
    pub fn require(&self, len: usize) -> Result<()> {
        if self.data.len() < len {
            return Err(StackError::InvalidOperation);
        }
        Ok(())
    }

    #[inline]
    pub fn last(&self) -> Result<&Vec<u8>> {
        self.data.last().ok_or(StackError::InvalidOperation)
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Vec<u8>> {
        self.data.pop().ok_or(StackError::InvalidOperation)
    }

    /// Pops an arithmetic operand of at most [`ScriptNum::MAX_NUM_SIZE`] bytes.
    #[inline]
    pub fn pop_num(&mut self) -> Result<ScriptNum> {
        ScriptNum::from_bytes(&self.pop()?, false, None).map_err(Into::into)
    }

    /// Decodes the top element without removing it.
    #[inline]
    pub fn peek_num(&self, max_size: usize) -> Result<ScriptNum> {
        ScriptNum::from_bytes(self.last()?, false, Some(max_size)).map_err(Into::into)
    }

    #[inline]
    pub fn push(&mut self, value: Vec<u8>) -> &mut Self {
        self.data.push(value);
        self
    }

    /// Returns the element at the specified position from the top of the stack.
    ///
    /// `self.top(0)` is equivalent to `self.last()`.
    #[inline]
    pub fn top(&self, i: usize) -> Result<&Vec<u8>> {
        let pos = i + 1;
        self.require(pos)?;
        Ok(&self.data[self.data.len() - pos])
    }

    #[inline]
    pub fn peek_bool(&self) -> Result<bool> {
        Ok(cast_to_bool(self.last()?))
    }

    #[inline]
    pub fn pop_bool(&mut self) -> Result<bool> {
        Ok(cast_to_bool(&self.pop()?))
    }

    /// Removes the element `i` positions below the top.
    #[inline]
    pub fn remove(&mut self, i: usize) -> Result<Vec<u8>> {
        let pos = i + 1;
        self.require(pos)?;
        let to_remove = self.data.len() - pos;
        Ok(self.data.remove(to_remove))
    }

    /// Removes the top `n` stack items.
    #[inline]
    pub fn drop(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        self.data.truncate(self.data.len() - n);
        Ok(())
    }

    /// Duplicates the top N items on the stack.
    ///
    /// dup(1): [x1 x2] -> [x1 x2 x2]
    /// dup(2): [x1 x2] -> [x1 x2 x1 x2]
    #[inline]
    pub fn dup(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        let len = self.data.len();
        self.data.extend_from_within(len - n..);
        Ok(())
    }

    /// Copies N items N items back to the top of the stack.
    ///
    /// over(1): [... x1 x2 x3] -> [... x1 x2 x3 x2]
    /// over(2): [... x1 x2 x3 x4] -> [... x1 x2 x3 x4 x1 x2]
    #[inline]
    pub fn over(&mut self, n: usize) -> Result<()> {
        let count = n * 2;
        self.require(count)?;
        let len = self.data.len();
        self.data.extend_from_within(len - count..len - count + n);
        Ok(())
    }

    /// Rotates the top 3N items on the stack to the left N times.
    ///
    /// - rot(1): [x1 x2 x3] -> [x2 x3 x1]
    /// - rot(2): [x1 x2 x3 x4 x5 x6] -> [x3 x4 x5 x6 x1 x2]
    #[inline]
    pub fn rot(&mut self, n: usize) -> Result<()> {
        let count = n * 3;
        self.require(count)?;
        let len = self.data.len();
        self.data[len - count..].rotate_left(n);
        Ok(())
    }

    // Swaps the top N items on the stack with those below them.
    //
    // - swap(1): [x1 x2] -> [x2 x1]
    // - swap(2): [x1 x2 x3 x4] -> [x3 x4 x1 x2]
    #[inline]
    pub fn swap(&mut self, n: usize) -> Result<()> {
        let count = n * 2;
        self.require(count)?;
        let len = self.data.len();
        self.data[len - count..].rotate_left(n);
        Ok(())
    }

    /// Removes the second-to-top stack item.
    ///
    /// nip: [x1 x2 x3] -> [x1 x3]
    #[inline]
    pub fn nip(&mut self) -> Result<()> {
        self.remove(1).map(|_| ())
    }

    // Copies the top item and inserts it before the second-to-top item.
    //
    // [... x1 x2] -> [... x2 x1 x2]
    #[inline]
    pub fn tuck(&mut self) -> Result<()> {
        self.require(2)?;
        let len = self.data.len();
        let top = self.data[len - 1].clone();
        self.data.insert(len - 2, top);
        Ok(())
    }

    #[inline]
    pub fn push_num(&mut self, num: impl Into<ScriptNum>) -> &mut Self {
        self.push(num.into().to_bytes());
        self
    }

    /// Pushes `1` or the empty byte string.
    #[inline]
    pub fn push_bool(&mut self, boolean: bool) -> &mut Self {
        self.push_num(i64::from(boolean))
    }
}

/// Script truthiness: any non-zero byte, ignoring a sign bit in the last byte
/// so that negative zero is false.
pub fn cast_to_bool(data: &[u8]) -> bool {
    match data.split_last() {
        Some((&last, rest)) => rest.iter().any(|&x| x != 0) || (last != 0 && last != 0x80),
        None => false,
    }
}
