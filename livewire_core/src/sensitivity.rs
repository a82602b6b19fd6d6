//! Per-operator sensitivity rules.
//!
//! Each rule computes an operator's result from concrete operand values and
//! reports which operands actually determined it. An operand left out of the
//! selection is a don't-care for this value combination: flipping it could
//! not have changed the result.
//!
//! The rules are value-only. [`crate::wire`] maps the selection onto the
//! operand wires to build provenance edges.

use crate::bitvec::{mask, BitVector, CmpOp};
use crate::error::SimError;

/// Which operands of a binary operator were sensitizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    /// Only the left operand determined the result
    Left,

    /// Only the right operand determined the result
    Right,

    /// Both operands contributed
    Both,
}

/// A binary operator result plus its sensitizing operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensitized {
    pub value: BitVector,
    pub operands: Operands,
}

impl Sensitized {
    fn both(value: BitVector) -> Self {
        Self {
            value,
            operands: Operands::Both,
        }
    }
}

/// Picks the operand that alone forces the result, if exactly one does.
fn controlling(a_controls: bool, b_controls: bool) -> Operands {
    match (a_controls, b_controls) {
        (true, false) => Operands::Left,
        (false, true) => Operands::Right,
        // Neither controls, or both do: conservatively keep both
        _ => Operands::Both,
    }
}

/// An all-zeros operand forces the AND result on its own.
fn and_controls(a: &BitVector, b: &BitVector, width: u32) -> Operands {
    controlling(mask(a.value(), width) == 0, mask(b.value(), width) == 0)
}

/// An all-ones operand forces the OR result on its own.
fn or_controls(a: &BitVector, b: &BitVector, width: u32) -> Operands {
    let ones = mask(u64::MAX, width);
    controlling(mask(a.value(), width) == ones, mask(b.value(), width) == ones)
}

pub fn and(a: &BitVector, b: &BitVector) -> Sensitized {
    let value = a.and(b);
    Sensitized {
        value,
        operands: and_controls(a, b, value.width()),
    }
}

/// NAND inverts the AND result but depends on the same operands.
pub fn nand(a: &BitVector, b: &BitVector) -> Sensitized {
    let inner = and(a, b);
    Sensitized {
        value: inner.value.not(),
        operands: inner.operands,
    }
}

pub fn or(a: &BitVector, b: &BitVector) -> Sensitized {
    let value = a.or(b);
    Sensitized {
        value,
        operands: or_controls(a, b, value.width()),
    }
}

pub fn nor(a: &BitVector, b: &BitVector) -> Sensitized {
    let inner = or(a, b);
    Sensitized {
        value: inner.value.not(),
        operands: inner.operands,
    }
}

pub fn xor(a: &BitVector, b: &BitVector) -> Sensitized {
    Sensitized::both(a.xor(b))
}

pub fn xnor(a: &BitVector, b: &BitVector) -> Sensitized {
    Sensitized::both(a.xor(b).not())
}

pub fn add(a: &BitVector, b: &BitVector) -> Sensitized {
    Sensitized::both(a.add(b))
}

pub fn sub(a: &BitVector, b: &BitVector) -> Result<Sensitized, SimError> {
    Ok(Sensitized::both(a.sub(b)?))
}

pub fn compare(a: &BitVector, b: &BitVector, op: CmpOp) -> Sensitized {
    Sensitized::both(a.compare(b, op))
}

/// Outcome of a mux selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuxChoice {
    /// Index into the candidate list (0 = the on-zero candidate)
    pub index: usize,

    /// Value of the selected candidate
    pub value: BitVector,

    /// Whether the select signal determined the result
    pub select_live: bool,
}

/// Selects `candidates[select]`.
///
/// The select is a don't-care when every candidate carries the same value.
/// Returns `None` if `select` addresses a candidate that does not exist.
pub fn mux(select: &BitVector, candidates: &[BitVector]) -> Option<MuxChoice> {
    let index = usize::try_from(select.value()).ok()?;
    let value = *candidates.get(index)?;
    let select_live = candidates.iter().any(|c| *c != value);
    Some(MuxChoice {
        index,
        value,
        select_live,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn b(v: u64) -> BitVector {
        BitVector::bit(v != 0)
    }

    #[test]
    fn test_and_one_bit_table() {
        assert_eq!(and(&b(0), &b(0)).operands, Operands::Both);
        assert_eq!(and(&b(0), &b(1)).operands, Operands::Left);
        assert_eq!(and(&b(1), &b(0)).operands, Operands::Right);
        assert_eq!(and(&b(1), &b(1)).operands, Operands::Both);
        assert_eq!(and(&b(1), &b(0)).value, b(0));
    }

    #[test]
    fn test_or_one_bit_table() {
        assert_eq!(or(&b(0), &b(0)).operands, Operands::Both);
        assert_eq!(or(&b(0), &b(1)).operands, Operands::Right);
        assert_eq!(or(&b(1), &b(0)).operands, Operands::Left);
        assert_eq!(or(&b(1), &b(1)).operands, Operands::Both);
    }

    #[test]
    fn test_nand_nor_follow_and_or() {
        let r = nand(&b(0), &b(1));
        assert_eq!(r.value, b(1));
        assert_eq!(r.operands, Operands::Left);

        let r = nor(&b(0), &b(1));
        assert_eq!(r.value, b(0));
        assert_eq!(r.operands, Operands::Right);
    }

    #[test]
    fn test_multibit_and_only_all_zero_controls() {
        let zero = BitVector::new(0, 4).unwrap();
        let partial = BitVector::new(0b0100, 4).unwrap();
        let other = BitVector::new(0b0010, 4).unwrap();
        assert_eq!(and(&zero, &partial).operands, Operands::Left);
        // Both nonzero: each set bit of one depends on the other
        assert_eq!(and(&partial, &other).operands, Operands::Both);
    }

    #[test]
    fn test_multibit_and_masks_to_result_width() {
        // 0x10 truncated to 4 bits is zero, so it controls alone
        let wide = BitVector::new(0x10, 8).unwrap();
        let narrow = BitVector::new(0x3, 4).unwrap();
        let r = and(&wide, &narrow);
        assert_eq!(r.value.width(), 4);
        assert_eq!(r.operands, Operands::Left);
    }

    #[test]
    fn test_xor_add_compare_always_both() {
        for (x, y) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            assert_eq!(xor(&b(x), &b(y)).operands, Operands::Both);
            assert_eq!(add(&b(x), &b(y)).operands, Operands::Both);
            assert_eq!(compare(&b(x), &b(y), CmpOp::Eq).operands, Operands::Both);
        }
    }

    #[test]
    fn test_mux_select_dont_care_when_candidates_equal() {
        let choice = mux(&b(0), &[b(1), b(1)]).unwrap();
        assert_eq!(choice.index, 0);
        assert!(!choice.select_live);

        let choice = mux(&b(0), &[b(1), b(0)]).unwrap();
        assert!(choice.select_live);
        assert_eq!(choice.value, b(1));
    }

    #[test]
    fn test_mux_out_of_range() {
        let sel = BitVector::new(3, 2).unwrap();
        assert!(mux(&sel, &[b(0), b(1), b(0)]).is_none());
    }

    proptest! {
        #[test]
        fn prop_or_is_and_complement(x in any::<bool>(), y in any::<bool>()) {
            let a = and(&BitVector::bit(x), &BitVector::bit(y));
            let o = or(&BitVector::bit(!x), &BitVector::bit(!y));
            prop_assert_eq!(a.operands, o.operands);
            prop_assert_eq!(a.value.not(), o.value);
        }

        #[test]
        fn prop_dropped_operand_is_dont_care(
            a in any::<u64>(),
            b in any::<u64>(),
            c in any::<u64>(),
            w in 1u32..=16,
        ) {
            let x = BitVector::new(a, w).unwrap();
            let y = BitVector::new(b, w).unwrap();
            let z = BitVector::new(c, w).unwrap();
            let rules: [fn(&BitVector, &BitVector) -> Sensitized; 4] = [and, or, nand, nor];
            for rule in rules {
                let r = rule(&x, &y);
                match r.operands {
                    Operands::Left => prop_assert_eq!(rule(&x, &z).value, r.value),
                    Operands::Right => prop_assert_eq!(rule(&z, &y).value, r.value),
                    Operands::Both => {}
                }
            }
        }
    }
}
