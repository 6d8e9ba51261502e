use std::fmt;

use serde::{Deserialize, Serialize};

/// A four-state scalar value: `0`, `1`, `X` (unknown) or `Z` (high
/// impedance).
///
/// This is the single-bit building block of the value kernel. All logic
/// tables live here so bit-vector operations and the evaluator agree on
/// X/Z propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarVal {
    Zero,
    One,
    X,
    Z,
}

impl ScalarVal {
    /// Converts a bool, losing nothing.
    pub fn from_bool(b: bool) -> Self {
        if b { Self::One } else { Self::Zero }
    }

    /// True for `1`. X and Z are not true.
    pub fn is_one(self) -> bool {
        self == Self::One
    }

    pub fn is_zero(self) -> bool {
        self == Self::Zero
    }

    /// True for X or Z.
    pub fn is_xz(self) -> bool {
        matches!(self, Self::X | Self::Z)
    }

    /// Boolean view: `1` is true, everything else (including X/Z) is
    /// false. This is the conversion `evaluate_bool` uses.
    pub fn to_bool(self) -> bool {
        self.is_one()
    }

    /// Logic view: Z degrades to X, 0/1 stay themselves.
    pub fn to_logic(self) -> Self {
        match self {
            Self::Z => Self::X,
            v => v,
        }
    }

    /// Logical negation. X/Z negate to X.
    pub fn not(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
            Self::X | Self::Z => Self::X,
        }
    }

    pub fn and(self, other: Self) -> Self {
        match (self.to_logic(), other.to_logic()) {
            (Self::Zero, _) | (_, Self::Zero) => Self::Zero,
            (Self::One, Self::One) => Self::One,
            _ => Self::X,
        }
    }

    pub fn or(self, other: Self) -> Self {
        match (self.to_logic(), other.to_logic()) {
            (Self::One, _) | (_, Self::One) => Self::One,
            (Self::Zero, Self::Zero) => Self::Zero,
            _ => Self::X,
        }
    }

    pub fn xor(self, other: Self) -> Self {
        match (self.to_logic(), other.to_logic()) {
            (Self::X, _) | (_, Self::X) => Self::X,
            (a, b) => Self::from_bool(a != b),
        }
    }
}

impl fmt::Display for ScalarVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Zero => '0',
            Self::One => '1',
            Self::X => 'x',
            Self::Z => 'z',
        };
        write!(f, "{c}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_dominates_zero() {
        assert_eq!(ScalarVal::Zero.and(ScalarVal::X), ScalarVal::Zero);
        assert_eq!(ScalarVal::Z.and(ScalarVal::Zero), ScalarVal::Zero);
        assert_eq!(ScalarVal::One.and(ScalarVal::Z), ScalarVal::X);
    }

    #[test]
    fn or_dominates_one() {
        assert_eq!(ScalarVal::One.or(ScalarVal::X), ScalarVal::One);
        assert_eq!(ScalarVal::Zero.or(ScalarVal::Z), ScalarVal::X);
    }

    #[test]
    fn xor_poisons_on_unknown() {
        assert_eq!(ScalarVal::One.xor(ScalarVal::Z), ScalarVal::X);
        assert_eq!(ScalarVal::One.xor(ScalarVal::Zero), ScalarVal::One);
    }
}
