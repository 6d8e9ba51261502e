use std::fmt;

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::{
    bitvector::BitVector,
    scalar::ScalarVal,
    vtype::{SIZE_TIME, VlValueType},
};

/// A value produced by constant-expression evaluation.
///
/// The variants mirror the value classes of the language: 32-bit signed
/// integers, reals, 64-bit times, four-state bit vectors, string
/// constants, and an error marker used as a placeholder when a
/// subexpression failed but elaboration continues.
///
/// All arithmetic lives here so the evaluator and the generators share a
/// single definition of promotion, X/Z propagation and
/// division-by-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VlValue {
    Int(i32),
    Real(f64),
    Time(u64),
    BitVector(BitVector),
    Str(String),
    Error,
}

impl VlValue {
    pub fn scalar(val: ScalarVal) -> Self {
        Self::BitVector(BitVector::from_scalar(val))
    }

    pub fn value_type(&self) -> VlValueType {
        match self {
            Self::Int(_) => VlValueType::int_type(),
            Self::Real(_) => VlValueType::real_type(),
            Self::Time(_) => VlValueType::time_type(),
            Self::BitVector(bv) => bv.value_type(),
            Self::Str(s) => VlValueType::new(false, true, (s.len().max(1) * 8) as u32),
            Self::Error => VlValueType::no_type(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    /// True when the value can be viewed as a plain `int`.
    pub fn is_int_compat(&self) -> bool {
        self.to_int().is_some()
    }

    /// True when the value can be viewed as a bit vector.
    pub fn is_bitvector_compat(&self) -> bool {
        !matches!(self, Self::Real(_) | Self::Error)
    }

    /// 32-bit signed view. `None` for reals, errors, X/Z vectors and
    /// out-of-range values.
    pub fn to_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Time(t) => i32::try_from(*t).ok(),
            Self::BitVector(bv) => bv.to_i32(),
            Self::Real(_) | Self::Str(_) | Self::Error => None,
        }
    }

    pub fn to_real(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(f64::from(*v)),
            Self::Real(v) => Some(*v),
            Self::Time(t) => Some(*t as f64),
            Self::BitVector(bv) => {
                if bv.has_xz() {
                    None
                } else if bv.is_signed() {
                    bv.to_bigint().to_f64()
                } else {
                    bv.to_biguint().to_f64()
                }
            }
            Self::Str(_) | Self::Error => None,
        }
    }

    pub fn to_time(&self) -> Option<u64> {
        match self {
            Self::Time(t) => Some(*t),
            Self::Int(v) if *v >= 0 => Some(*v as u64),
            Self::BitVector(bv) => {
                if bv.has_xz() {
                    None
                } else {
                    bv.to_biguint().try_into().ok()
                }
            }
            _ => None,
        }
    }

    /// Bit-vector view; every non-real value has one. Times become
    /// 64-bit unsigned vectors, strings become 8-bits-per-char vectors.
    pub fn to_bitvector(&self) -> Option<BitVector> {
        match self {
            Self::Int(v) => Some(BitVector::from_i32(*v)),
            Self::Time(t) => {
                let mut bv = BitVector::from_u64(*t);
                debug_assert_eq!(bv.width(), SIZE_TIME);
                bv.set_signed(false);
                Some(bv)
            }
            Self::BitVector(bv) => Some(bv.clone()),
            Self::Str(s) => Some(BitVector::from_string(s)),
            Self::Real(_) | Self::Error => None,
        }
    }

    pub fn to_scalar(&self) -> ScalarVal {
        match self {
            Self::Int(v) => ScalarVal::from_bool(*v & 1 != 0),
            Self::Real(v) => ScalarVal::from_bool(*v != 0.0),
            Self::Time(t) => ScalarVal::from_bool(*t & 1 != 0),
            Self::BitVector(bv) => {
                if bv.width() == 0 {
                    ScalarVal::X
                } else {
                    bv.bit(0)
                }
            }
            Self::Str(_) | Self::Error => ScalarVal::X,
        }
    }

    /// Boolean view: nonzero and known. Any value converts.
    pub fn to_bool(&self) -> bool {
        match self {
            Self::Int(v) => *v != 0,
            Self::Real(v) => *v != 0.0,
            Self::Time(t) => *t != 0,
            Self::BitVector(bv) => bv.to_bool(),
            Self::Str(s) => !s.is_empty(),
            Self::Error => false,
        }
    }

    fn real_pair(&self, rhs: &Self) -> Option<(f64, f64)> {
        if self.is_real() || rhs.is_real() {
            Some((self.to_real()?, rhs.to_real()?))
        } else {
            None
        }
    }

    fn bv_pair(&self, rhs: &Self) -> Option<(BitVector, BitVector)> {
        Some((self.to_bitvector()?, rhs.to_bitvector()?))
    }

    fn arith(
        &self,
        rhs: &Self,
        real_op: fn(f64, f64) -> Option<f64>,
        bv_op: fn(&BitVector, &BitVector) -> BitVector,
    ) -> Self {
        if self.is_error() || rhs.is_error() {
            return Self::Error;
        }
        if self.is_real() || rhs.is_real() {
            return match self.real_pair(rhs).and_then(|(a, b)| real_op(a, b)) {
                Some(v) => Self::Real(v),
                None => Self::Error,
            };
        }
        match self.bv_pair(rhs) {
            Some((a, b)) => Self::BitVector(bv_op(&a, &b)),
            None => Self::Error,
        }
    }

    pub fn add(&self, rhs: &Self) -> Self {
        self.arith(rhs, |a, b| Some(a + b), BitVector::add)
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        self.arith(rhs, |a, b| Some(a - b), BitVector::sub)
    }

    pub fn mul(&self, rhs: &Self) -> Self {
        self.arith(rhs, |a, b| Some(a * b), BitVector::mul)
    }

    pub fn div(&self, rhs: &Self) -> Self {
        self.arith(
            rhs,
            |a, b| if b == 0.0 { None } else { Some(a / b) },
            BitVector::div,
        )
    }

    pub fn rem(&self, rhs: &Self) -> Self {
        self.arith(
            rhs,
            |a, b| if b == 0.0 { None } else { Some(a % b) },
            BitVector::rem,
        )
    }

    pub fn pow(&self, rhs: &Self) -> Self {
        self.arith(rhs, |a, b| Some(a.powf(b)), BitVector::pow)
    }

    pub fn neg(&self) -> Self {
        match self {
            Self::Real(v) => Self::Real(-v),
            Self::Error => Self::Error,
            _ => match self.to_bitvector() {
                Some(bv) => Self::BitVector(bv.neg()),
                None => Self::Error,
            },
        }
    }

    fn bitwise(&self, rhs: &Self, op: fn(&BitVector, &BitVector) -> BitVector) -> Self {
        if self.is_real() || rhs.is_real() {
            // Bitwise operators are undefined on reals; the generators
            // reject them before evaluation, so this is a backstop.
            return Self::Error;
        }
        match self.bv_pair(rhs) {
            Some((a, b)) => Self::BitVector(op(&a, &b)),
            None => Self::Error,
        }
    }

    pub fn bit_and(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, BitVector::bit_and)
    }

    pub fn bit_or(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, BitVector::bit_or)
    }

    pub fn bit_xor(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, BitVector::bit_xor)
    }

    pub fn bit_xnor(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, BitVector::bit_xnor)
    }

    pub fn bit_not(&self) -> Self {
        match self.to_bitvector() {
            Some(bv) => Self::BitVector(bv.bit_not()),
            None => Self::Error,
        }
    }

    fn relational(
        &self,
        rhs: &Self,
        real_op: fn(f64, f64) -> bool,
        bv_op: fn(&BitVector, &BitVector) -> ScalarVal,
    ) -> Self {
        if self.is_error() || rhs.is_error() {
            return Self::Error;
        }
        if self.is_real() || rhs.is_real() {
            return match self.real_pair(rhs) {
                Some((a, b)) => Self::scalar(ScalarVal::from_bool(real_op(a, b))),
                None => Self::scalar(ScalarVal::X),
            };
        }
        match self.bv_pair(rhs) {
            Some((a, b)) => Self::scalar(bv_op(&a, &b)),
            None => Self::Error,
        }
    }

    pub fn lt(&self, rhs: &Self) -> Self {
        self.relational(rhs, |a, b| a < b, BitVector::lt)
    }

    pub fn le(&self, rhs: &Self) -> Self {
        self.relational(rhs, |a, b| a <= b, BitVector::le)
    }

    pub fn gt(&self, rhs: &Self) -> Self {
        self.relational(rhs, |a, b| a > b, BitVector::gt)
    }

    pub fn ge(&self, rhs: &Self) -> Self {
        self.relational(rhs, |a, b| a >= b, BitVector::ge)
    }

    pub fn log_eq(&self, rhs: &Self) -> Self {
        self.relational(rhs, |a, b| a == b, BitVector::log_eq)
    }

    pub fn log_neq(&self, rhs: &Self) -> Self {
        match self.log_eq(rhs) {
            Self::BitVector(bv) => Self::scalar(bv.to_scalar().not()),
            other => other,
        }
    }

    /// `===`: exact four-state comparison, never X.
    pub fn case_eq(&self, rhs: &Self) -> Self {
        if self.is_real() || rhs.is_real() {
            return match self.real_pair(rhs) {
                Some((a, b)) => Self::scalar(ScalarVal::from_bool(a == b)),
                None => Self::Error,
            };
        }
        match self.bv_pair(rhs) {
            Some((a, b)) => Self::scalar(a.case_eq(&b)),
            None => Self::Error,
        }
    }

    pub fn case_neq(&self, rhs: &Self) -> Self {
        match self.case_eq(rhs) {
            Self::BitVector(bv) => Self::scalar(bv.to_scalar().not()),
            other => other,
        }
    }

    pub fn log_not(&self) -> Self {
        if self.is_error() {
            return Self::Error;
        }
        if let Self::BitVector(bv) = self
            && bv.has_xz()
        {
            return Self::scalar(ScalarVal::X);
        }
        Self::scalar(ScalarVal::from_bool(!self.to_bool()))
    }

    pub fn log_and(&self, rhs: &Self) -> Self {
        if self.is_error() || rhs.is_error() {
            return Self::Error;
        }
        Self::scalar(self.to_scalar_logic().and(rhs.to_scalar_logic()))
    }

    pub fn log_or(&self, rhs: &Self) -> Self {
        if self.is_error() || rhs.is_error() {
            return Self::Error;
        }
        Self::scalar(self.to_scalar_logic().or(rhs.to_scalar_logic()))
    }

    /// Truth value as a four-state scalar: 1/0 when known, X otherwise.
    fn to_scalar_logic(&self) -> ScalarVal {
        match self {
            Self::BitVector(bv) => {
                if bv.to_bool() {
                    ScalarVal::One
                } else if bv.has_xz() {
                    ScalarVal::X
                } else {
                    ScalarVal::Zero
                }
            }
            _ => ScalarVal::from_bool(self.to_bool()),
        }
    }

    fn reduction(&self, op: fn(&BitVector) -> ScalarVal, invert: bool) -> Self {
        match self.to_bitvector() {
            Some(bv) => {
                let s = op(&bv);
                Self::scalar(if invert { s.not() } else { s })
            }
            None => Self::Error,
        }
    }

    pub fn reduce_and(&self) -> Self {
        self.reduction(BitVector::reduce_and, false)
    }

    pub fn reduce_nand(&self) -> Self {
        self.reduction(BitVector::reduce_and, true)
    }

    pub fn reduce_or(&self) -> Self {
        self.reduction(BitVector::reduce_or, false)
    }

    pub fn reduce_nor(&self) -> Self {
        self.reduction(BitVector::reduce_or, true)
    }

    pub fn reduce_xor(&self) -> Self {
        self.reduction(BitVector::reduce_xor, false)
    }

    pub fn reduce_xnor(&self) -> Self {
        self.reduction(BitVector::reduce_xor, true)
    }

    pub fn shift_left(&self, rhs: &Self) -> Self {
        match (self.to_bitvector(), rhs.to_bitvector()) {
            (Some(a), Some(b)) => Self::BitVector(a.shift_left(&b)),
            _ => Self::Error,
        }
    }

    pub fn shift_right(&self, rhs: &Self, arith: bool) -> Self {
        match (self.to_bitvector(), rhs.to_bitvector()) {
            (Some(a), Some(b)) => Self::BitVector(a.shift_right(&b, arith)),
            _ => Self::Error,
        }
    }

    /// Coerces into the given type, the conversion applied when binding
    /// actuals to constant-function formals.
    pub fn coerce(&self, vtype: VlValueType) -> Self {
        match vtype {
            VlValueType::NoType => self.clone(),
            VlValueType::Real => match self.to_real() {
                Some(v) => Self::Real(v),
                None => Self::Error,
            },
            VlValueType::Int => match self.to_int() {
                Some(v) => Self::Int(v),
                None => match self.to_bitvector() {
                    // X/Z-laden vectors stay vectors at integer shape.
                    Some(bv) => Self::BitVector(bv.coerce(VlValueType::int_type())),
                    None => Self::Error,
                },
            },
            VlValueType::Time => match self.to_time() {
                Some(v) => Self::Time(v),
                None => Self::Error,
            },
            VlValueType::BitVector { .. } => match self.to_bitvector() {
                Some(bv) => Self::BitVector(bv.coerce(vtype)),
                None => Self::Error,
            },
        }
    }
}

impl fmt::Display for VlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::BitVector(bv) => write!(f, "{bv}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Error => write!(f, "<error>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_dominates_promotion() {
        let v = VlValue::Int(3).add(&VlValue::Real(0.5));
        assert_eq!(v, VlValue::Real(3.5));
    }

    #[test]
    fn int_arithmetic_stays_32_bit() {
        let v = VlValue::Int(1).add(&VlValue::Int(2));
        let VlValue::BitVector(bv) = v else {
            panic!("expected a bit vector");
        };
        assert_eq!(bv.width(), 32);
        assert!(bv.is_signed());
        assert_eq!(bv.to_i32(), Some(3));
    }

    #[test]
    fn division_by_zero_yields_all_x() {
        let v = VlValue::Int(7).div(&VlValue::Int(0));
        let VlValue::BitVector(bv) = v else {
            panic!("expected a bit vector");
        };
        assert_eq!(bv, BitVector::all_x(32));
    }

    #[test]
    fn time_coerces_to_unsigned_vector() {
        let v = VlValue::Time(5).add(&VlValue::Int(1));
        let VlValue::BitVector(bv) = v else {
            panic!("expected a bit vector");
        };
        assert_eq!(bv.width(), 64);
        assert!(!bv.is_signed());
        assert_eq!(bv.to_u32(), Some(6));
    }

    #[test]
    fn evaluating_twice_is_stable() {
        let a = VlValue::Int(6).mul(&VlValue::Int(7));
        let b = VlValue::Int(6).mul(&VlValue::Int(7));
        assert_eq!(a, b);
    }

    #[test]
    fn logical_ops_honor_unknowns() {
        let x = VlValue::BitVector(BitVector::all_x(1));
        assert_eq!(x.log_and(&VlValue::Int(0)), VlValue::scalar(ScalarVal::Zero));
        assert_eq!(x.log_or(&VlValue::Int(1)), VlValue::scalar(ScalarVal::One));
        assert_eq!(x.log_or(&VlValue::Int(0)), VlValue::scalar(ScalarVal::X));
    }

    #[test]
    fn error_is_contagious() {
        assert!(VlValue::Error.add(&VlValue::Int(1)).is_error());
        assert!(VlValue::Int(1).mul(&VlValue::Error).is_error());
    }
}
