//! Fixed-width bit vectors with masking semantics.
//!
//! Every value is interpreted modulo 2^width. Construction and every derived
//! operation re-mask to the stated result width, so two vectors compare equal
//! exactly when their low `width` bits and widths agree.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest supported vector: one machine word.
pub const MAX_WIDTH: u32 = u64::BITS;

/// Masks `value` to its low `width` bits.
pub fn mask(value: u64, width: u32) -> u64 {
    if width >= MAX_WIDTH {
        value
    } else {
        value & ((1u64 << width) - 1)
    }
}

/// An immutable fixed-width unsigned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBitVector", into = "RawBitVector")]
pub struct BitVector {
    value: u64,
    width: u32,
}

/// Unvalidated wire form of a [`BitVector`].
#[derive(Serialize, Deserialize)]
struct RawBitVector {
    value: u64,
    width: u32,
}

impl TryFrom<RawBitVector> for BitVector {
    type Error = SimError;

    fn try_from(raw: RawBitVector) -> Result<Self, Self::Error> {
        BitVector::new(raw.value, raw.width)
    }
}

impl From<BitVector> for RawBitVector {
    fn from(bv: BitVector) -> Self {
        Self {
            value: bv.value,
            width: bv.width,
        }
    }
}

impl BitVector {
    /// Creates a vector, masking `value` to `width` bits.
    ///
    /// Fails if `width` is zero or wider than [`MAX_WIDTH`].
    pub fn new(value: u64, width: u32) -> Result<Self, SimError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(SimError::InvalidWidth(width));
        }
        Ok(Self::masked(value, width))
    }

    /// Creates a 1-bit vector.
    pub fn bit(bit: bool) -> Self {
        Self::masked(bit as u64, 1)
    }

    /// Creates an all-zeros vector.
    pub fn zero(width: u32) -> Result<Self, SimError> {
        Self::new(0, width)
    }

    /// Width is already known valid (derived from existing vectors).
    pub(crate) fn masked(value: u64, width: u32) -> Self {
        debug_assert!(width >= 1 && width <= MAX_WIDTH);
        Self {
            value: mask(value, width),
            width,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// True if every bit is 0.
    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// True if every bit is 1.
    pub fn is_ones(&self) -> bool {
        self.value == mask(u64::MAX, self.width)
    }

    pub fn and(&self, other: &Self) -> Self {
        let width = self.width.min(other.width);
        Self::masked(self.value & other.value, width)
    }

    pub fn or(&self, other: &Self) -> Self {
        let width = self.width.min(other.width);
        Self::masked(self.value | other.value, width)
    }

    pub fn xor(&self, other: &Self) -> Self {
        let width = self.width.min(other.width);
        Self::masked(self.value ^ other.value, width)
    }

    pub fn not(&self) -> Self {
        Self::masked(!self.value, self.width)
    }

    /// Addition at `max(w1, w2)` bits. There is no carry-out: a sum that
    /// overflows the wider operand wraps.
    pub fn add(&self, other: &Self) -> Self {
        let width = self.width.max(other.width);
        Self::masked(self.value.wrapping_add(other.value), width)
    }

    /// Wrapping subtraction; operands must share a width.
    pub fn sub(&self, other: &Self) -> Result<Self, SimError> {
        if self.width != other.width {
            return Err(SimError::WidthMismatch {
                op: "sub",
                left: self.width,
                right: other.width,
            });
        }
        Ok(Self::masked(self.value.wrapping_sub(other.value), self.width))
    }

    /// Unsigned comparison producing a 1-bit result.
    pub fn compare(&self, other: &Self, op: CmpOp) -> Self {
        let (a, b) = (self.value, other.value);
        let result = match op {
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Ge => a >= b,
            CmpOp::Gt => a > b,
        };
        Self::bit(result)
    }

    /// Binary digits, most significant first, padded to `width`.
    pub fn to_binary_string(&self) -> String {
        format!("{:0width$b}", self.value, width = self.width as usize)
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'d{}", self.width, self.value)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}
