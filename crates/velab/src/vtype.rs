//! The value-type lattice of elaborated expressions.
//!
//! Verilog's expression types reduce to a small set of facts: is it a
//! bit vector, is it signed, does it have an explicit size, how many
//! bits. [`VlValueType`] encodes those facts once, and everything that
//! reasons about typing — operator promotion, `set_reqsize` width
//! propagation, case unification, formal/actual matching — goes
//! through this one type, so two parts of the elaborator can never
//! disagree about what "the type of `a + b`" means.
//!
//! ```
//! use velab::VlValueType;
//!
//! let t = VlValueType::new(true, true, 8); // signed, sized, 8 bits
//! assert!(t.is_bitvector_type() && t.is_signed());
//!
//! // `integer` behaves as a signed, sized, 32-bit vector.
//! let int = VlValueType::int_type();
//! assert!(int.is_bitvector_type());
//! assert_eq!(int.size(), 32);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bit width of the predefined `integer` type.
pub const SIZE_INTEGER: u32 = 32;
/// Bit width of the predefined `real` type.
pub const SIZE_REAL: u32 = 64;
/// Bit width of the predefined `time` type.
pub const SIZE_TIME: u32 = 64;

/// The value type of an elaborated expression: signedness, sizedness
/// and bit width, plus the sentinel predefined types.
///
/// The sentinels (`Int`, `Real`, `Time`, `NoType`) are distinct
/// variants rather than pre-filled `BitVector` values because identity
/// matters to the language: a `function integer f` and a
/// `function signed [31:0] f` have the same width and signedness but
/// are *not* interchangeable in formal/actual type checks. The query
/// methods flatten the sentinels back into the facts consumers
/// actually size with — `Int` and `Time` count as bit-vector types
/// (32-bit signed and 64-bit unsigned respectively), `Real` does not,
/// and `NoType` answers "no" to everything, which is what makes it a
/// safe default for untyped parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VlValueType {
    /// No type specified.
    #[default]
    NoType,
    /// The predefined `integer` type: signed, sized, 32 bits.
    Int,
    /// The predefined `real` type.
    Real,
    /// The predefined `time` type: unsigned, sized, 64 bits.
    Time,
    /// An explicit bit-vector type.
    BitVector { signed: bool, sized: bool, size: u32 },
}

impl VlValueType {
    pub fn new(signed: bool, sized: bool, size: u32) -> Self {
        Self::BitVector { signed, sized, size }
    }

    pub fn int_type() -> Self {
        Self::Int
    }

    pub fn real_type() -> Self {
        Self::Real
    }

    pub fn time_type() -> Self {
        Self::Time
    }

    pub fn no_type() -> Self {
        Self::NoType
    }

    pub fn is_no_type(self) -> bool {
        self == Self::NoType
    }

    pub fn is_int_type(self) -> bool {
        self == Self::Int
    }

    pub fn is_real_type(self) -> bool {
        self == Self::Real
    }

    pub fn is_time_type(self) -> bool {
        self == Self::Time
    }

    /// True for explicit bit vectors and for `Int`/`Time`, which behave
    /// as 32- and 64-bit vectors.
    pub fn is_bitvector_type(self) -> bool {
        matches!(self, Self::Int | Self::Time | Self::BitVector { .. })
    }

    pub fn is_signed(self) -> bool {
        match self {
            Self::Int | Self::Real => true,
            Self::Time | Self::NoType => false,
            Self::BitVector { signed, .. } => signed,
        }
    }

    pub fn is_sized(self) -> bool {
        match self {
            Self::Int | Self::Real | Self::Time => true,
            Self::NoType => false,
            Self::BitVector { sized, .. } => sized,
        }
    }

    pub fn size(self) -> u32 {
        match self {
            Self::NoType => 0,
            Self::Int => SIZE_INTEGER,
            Self::Real => SIZE_REAL,
            Self::Time => SIZE_TIME,
            Self::BitVector { size, .. } => size,
        }
    }
}

impl fmt::Display for VlValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoType => write!(f, "NO TYPE"),
            Self::Int => write!(f, "INT TYPE"),
            Self::Real => write!(f, "REAL TYPE"),
            Self::Time => write!(f, "TIME TYPE"),
            Self::BitVector { signed, sized, size } => {
                let sign = if *signed { "SIGNED" } else { "UNSIGNED" };
                let sz = if *sized { "SIZED" } else { "UNSIZED" };
                write!(f, "{sign} {sz} {size} BITS TYPE")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_behave_like_their_vector_forms() {
        assert!(VlValueType::Int.is_bitvector_type());
        assert!(VlValueType::Int.is_signed());
        assert_eq!(VlValueType::Int.size(), 32);

        assert!(VlValueType::Time.is_bitvector_type());
        assert!(!VlValueType::Time.is_signed());
        assert_eq!(VlValueType::Time.size(), 64);

        assert!(!VlValueType::Real.is_bitvector_type());
        assert_eq!(VlValueType::Real.size(), 64);
    }

    #[test]
    fn no_type_is_empty() {
        let t = VlValueType::no_type();
        assert!(t.is_no_type());
        assert!(!t.is_bitvector_type());
        assert_eq!(t.size(), 0);
    }
}
