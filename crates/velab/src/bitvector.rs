use std::{cmp::Ordering, fmt};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::{scalar::ScalarVal, vtype::VlValueType};

type Words = SmallVec<[u64; 2]>;

const WORD_BITS: u32 = 64;

fn word_count(width: u32) -> usize {
    width.div_ceil(WORD_BITS) as usize
}

fn top_mask(width: u32) -> u64 {
    let rem = width % WORD_BITS;
    if rem == 0 { u64::MAX } else { (1u64 << rem) - 1 }
}

/// Four-state bit vector.
///
/// Each bit is encoded across two planes, VPI style: `(a, b)` =
/// `(0,0)` → 0, `(1,0)` → 1, `(0,1)` → Z, `(1,1)` → X. Bits above
/// `width` are kept zero in both planes so whole-word comparisons work.
///
/// Arithmetic follows the Verilog rules shared by the evaluator and the
/// expression generators: any X/Z operand bit poisons the whole result
/// of an arithmetic or relational operation, while bitwise operations
/// propagate per bit. Division and modulo by zero yield all-X of the
/// result width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitVector {
    width: u32,
    signed: bool,
    sized: bool,
    a: Words,
    b: Words,
}

impl BitVector {
    /// All-zero vector of the given width.
    pub fn zero(width: u32) -> Self {
        Self {
            width,
            signed: false,
            sized: true,
            a: smallvec![0; word_count(width)],
            b: smallvec![0; word_count(width)],
        }
    }

    /// All-X vector of the given width.
    pub fn all_x(width: u32) -> Self {
        let mut v = Self::zero(width);
        for w in v.a.iter_mut().chain(v.b.iter_mut()) {
            *w = u64::MAX;
        }
        v.mask_top();
        v
    }

    /// All-Z vector of the given width.
    pub fn all_z(width: u32) -> Self {
        let mut v = Self::zero(width);
        for w in v.b.iter_mut() {
            *w = u64::MAX;
        }
        v.mask_top();
        v
    }

    pub fn from_scalar(val: ScalarVal) -> Self {
        let mut v = Self::zero(1);
        v.set_bit(0, val);
        v
    }

    /// 32-bit unsigned vector.
    pub fn from_u32(value: u32) -> Self {
        let mut v = Self::zero(32);
        v.a[0] = u64::from(value);
        v
    }

    /// 32-bit signed vector (the shape of an `integer` value).
    pub fn from_i32(value: i32) -> Self {
        let mut v = Self::zero(32);
        v.a[0] = u64::from(value as u32);
        v.signed = true;
        v
    }

    /// 64-bit unsigned vector (the shape of a `time` value).
    pub fn from_u64(value: u64) -> Self {
        let mut v = Self::zero(64);
        v.a[0] = value;
        v
    }

    /// String constant: 8 bits per byte, first character in the most
    /// significant position.
    pub fn from_string(s: &str) -> Self {
        let bytes = s.as_bytes();
        let width = (bytes.len().max(1) * 8) as u32;
        let mut v = Self::zero(width);
        for (i, byte) in bytes.iter().rev().enumerate() {
            let bit = (i * 8) as u32;
            let word = (bit / WORD_BITS) as usize;
            let shift = bit % WORD_BITS;
            v.a[word] |= u64::from(*byte) << shift;
        }
        v
    }

    /// Decodes a based literal: `digits` in the given radix, with
    /// `x`/`z`/`?` digit characters and `_` separators. An explicit
    /// size of zero and malformed digits are rejected.
    ///
    /// Unsized literals get the minimum width that represents the
    /// digits: one digit-width per character for radix 2/8/16, the
    /// value's bit length for radix 10.
    pub fn from_literal(radix: u32, digits: &str, size: Option<u32>, signed: bool) -> Result<Self, String> {
        if size == Some(0) {
            return Err("zero-width constant".to_owned());
        }
        let digits: Vec<char> = digits
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if digits.is_empty() {
            return Err("empty constant".to_owned());
        }

        let bits_per_digit = match radix {
            2 => 1,
            8 => 3,
            16 => 4,
            10 => 0,
            _ => return Err(format!("unsupported radix {radix}")),
        };

        let mut v = if bits_per_digit == 0 {
            // Decimal: either a plain number or a single x/z digit.
            if digits.len() == 1 && matches!(digits[0], 'x' | 'z' | '?') {
                let width = size.unwrap_or(1);
                let mut v = Self::zero(width);
                let fill = if digits[0] == 'x' { ScalarVal::X } else { ScalarVal::Z };
                for i in 0..width {
                    v.set_bit(i, fill);
                }
                v
            } else {
                let text: String = digits.iter().collect();
                let value: BigUint = text.parse().map_err(|_| format!("bad decimal constant \"{text}\""))?;
                let width = size.unwrap_or_else(|| (value.bits() as u32).max(1));
                Self::from_biguint(&value, width, false)
            }
        } else {
            let natural_width = (digits.len() as u32) * bits_per_digit;
            let mut v = Self::zero(natural_width);
            let mut pos = 0;
            for c in digits.iter().rev() {
                let bits: Vec<ScalarVal> = match c {
                    'x' => vec![ScalarVal::X; bits_per_digit as usize],
                    'z' | '?' => vec![ScalarVal::Z; bits_per_digit as usize],
                    _ => {
                        let d = c.to_digit(radix).ok_or_else(|| format!("bad digit '{c}'"))?;
                        (0..bits_per_digit).map(|i| ScalarVal::from_bool((d >> i) & 1 != 0)).collect()
                    }
                };
                for (i, bit) in bits.into_iter().enumerate() {
                    v.set_bit(pos + i as u32, bit);
                }
                pos += bits_per_digit;
            }
            match size {
                // An X/Z top digit extends with X/Z, so coerce as
                // unsigned-with-fill does the right thing via msb.
                Some(size) => v.coerce_width(size),
                None => v,
            }
        };
        v.signed = signed;
        v.sized = size.is_some();
        Ok(v)
    }

    /// Builds a vector from a magnitude, truncated or zero-extended to
    /// `width`.
    pub fn from_biguint(value: &BigUint, width: u32, signed: bool) -> Self {
        let mut v = Self::zero(width);
        v.signed = signed;
        for (i, digit) in value.iter_u64_digits().enumerate() {
            if i >= v.a.len() {
                break;
            }
            v.a[i] = digit;
        }
        v.mask_top();
        v
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub fn is_sized(&self) -> bool {
        self.sized
    }

    pub fn set_signed(&mut self, signed: bool) {
        self.signed = signed;
    }

    pub fn set_sized(&mut self, sized: bool) {
        self.sized = sized;
    }

    pub fn value_type(&self) -> VlValueType {
        VlValueType::new(self.signed, self.sized, self.width)
    }

    /// True when no bit is X or Z.
    pub fn is_all_known(&self) -> bool {
        self.b.iter().all(|w| *w == 0)
    }

    pub fn has_xz(&self) -> bool {
        !self.is_all_known()
    }

    pub fn is_zero(&self) -> bool {
        self.is_all_known() && self.a.iter().all(|w| *w == 0)
    }

    pub fn bit(&self, pos: u32) -> ScalarVal {
        debug_assert!(pos < self.width);
        let word = (pos / WORD_BITS) as usize;
        let shift = pos % WORD_BITS;
        let a = (self.a[word] >> shift) & 1;
        let b = (self.b[word] >> shift) & 1;
        match (a, b) {
            (0, 0) => ScalarVal::Zero,
            (1, 0) => ScalarVal::One,
            (0, 1) => ScalarVal::Z,
            _ => ScalarVal::X,
        }
    }

    pub fn set_bit(&mut self, pos: u32, val: ScalarVal) {
        debug_assert!(pos < self.width);
        let word = (pos / WORD_BITS) as usize;
        let shift = pos % WORD_BITS;
        let (a, b) = match val {
            ScalarVal::Zero => (0u64, 0u64),
            ScalarVal::One => (1, 0),
            ScalarVal::Z => (0, 1),
            ScalarVal::X => (1, 1),
        };
        self.a[word] = (self.a[word] & !(1 << shift)) | (a << shift);
        self.b[word] = (self.b[word] & !(1 << shift)) | (b << shift);
    }

    /// Most significant bit (the sign bit for signed vectors).
    pub fn msb(&self) -> ScalarVal {
        self.bit(self.width - 1)
    }

    /// Contiguous slice `[msb_off .. lsb_off]` in offset space (0 =
    /// LSB). `msb_off >= lsb_off` is required.
    pub fn part(&self, msb_off: u32, lsb_off: u32) -> Self {
        debug_assert!(msb_off >= lsb_off && msb_off < self.width);
        let width = msb_off - lsb_off + 1;
        let mut out = Self::zero(width);
        for i in 0..width {
            out.set_bit(i, self.bit(lsb_off + i));
        }
        out
    }

    /// Reinterprets as unsigned magnitude, treating X/Z bits as zero.
    /// Callers check `is_all_known` first when that matters.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::new(
            self.a
                .iter()
                .zip(self.b.iter())
                .flat_map(|(a, b)| {
                    let w = a & !b;
                    [(w & 0xffff_ffff) as u32, (w >> 32) as u32]
                })
                .collect(),
        )
    }

    /// Signed interpretation (two's complement when the sign bit is
    /// set).
    pub fn to_bigint(&self) -> BigInt {
        let mag = self.to_biguint();
        if self.signed && self.width > 0 && self.msb().is_one() {
            let modulus = BigUint::from(1u8) << self.width;
            BigInt::from_biguint(Sign::Minus, modulus - mag)
        } else {
            BigInt::from(mag)
        }
    }

    /// 32-bit signed view. `None` when any bit is X/Z or the value does
    /// not fit.
    pub fn to_i32(&self) -> Option<i32> {
        if self.has_xz() {
            return None;
        }
        self.to_bigint().to_i32()
    }

    pub fn to_u32(&self) -> Option<u32> {
        if self.has_xz() {
            return None;
        }
        self.to_biguint().to_u32()
    }

    /// Scalar view: 0 if all bits 0, X if any bit X/Z, else 1.
    pub fn to_scalar(&self) -> ScalarVal {
        if self.has_xz() {
            ScalarVal::X
        } else if self.is_zero() {
            ScalarVal::Zero
        } else {
            ScalarVal::One
        }
    }

    /// Boolean view: true iff some bit is a definite 1.
    pub fn to_bool(&self) -> bool {
        self.a
            .iter()
            .zip(self.b.iter())
            .any(|(a, b)| (a & !b) != 0)
    }

    fn mask_top(&mut self) {
        if let Some(last) = self.a.last_mut() {
            *last &= top_mask(self.width);
        }
        if let Some(last) = self.b.last_mut() {
            *last &= top_mask(self.width);
        }
    }

    /// Resizes to `width`: truncates from the top, or extends with zero
    /// (unsigned), sign bit (signed) or the X/Z fill of an X/Z sign
    /// bit.
    pub fn coerce_width(&self, width: u32) -> Self {
        if width == self.width {
            return self.clone();
        }
        let mut out = Self::zero(width);
        out.signed = self.signed;
        out.sized = self.sized;
        let fill = if self.width == 0 {
            ScalarVal::Zero
        } else {
            match self.msb() {
                ScalarVal::One if self.signed => ScalarVal::One,
                ScalarVal::X => ScalarVal::X,
                ScalarVal::Z => ScalarVal::Z,
                _ => ScalarVal::Zero,
            }
        };
        for i in 0..width {
            let v = if i < self.width { self.bit(i) } else { fill };
            out.set_bit(i, v);
        }
        out
    }

    /// Applies a required type: width plus signedness.
    pub fn coerce(&self, vtype: VlValueType) -> Self {
        let mut out = self.coerce_width(vtype.size());
        out.signed = vtype.is_signed();
        out.sized = vtype.is_sized();
        out
    }

    /// Promoted shape for a binary operation: widest width, signed only
    /// when both sides are signed.
    fn promote(lhs: &Self, rhs: &Self) -> (u32, bool) {
        (lhs.width.max(rhs.width), lhs.signed && rhs.signed)
    }

    fn binary_known(lhs: &Self, rhs: &Self) -> Option<(u32, bool, Self, Self)> {
        let (width, signed) = Self::promote(lhs, rhs);
        if lhs.has_xz() || rhs.has_xz() {
            None
        } else {
            let mut l = lhs.coerce_width(width);
            let mut r = rhs.coerce_width(width);
            l.signed = signed;
            r.signed = signed;
            Some((width, signed, l, r))
        }
    }

    fn from_arith_result(value: BigInt, width: u32, signed: bool) -> Self {
        let modulus = BigInt::from(1u8) << width;
        let mut v = value % &modulus;
        if v.sign() == Sign::Minus {
            v += &modulus;
        }
        let mag = v.to_biguint().unwrap_or_default();
        Self::from_biguint(&mag, width, signed)
    }

    pub fn add(&self, rhs: &Self) -> Self {
        match Self::binary_known(self, rhs) {
            None => Self::all_x(Self::promote(self, rhs).0),
            Some((w, s, l, r)) => Self::from_arith_result(l.to_bigint() + r.to_bigint(), w, s),
        }
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        match Self::binary_known(self, rhs) {
            None => Self::all_x(Self::promote(self, rhs).0),
            Some((w, s, l, r)) => Self::from_arith_result(l.to_bigint() - r.to_bigint(), w, s),
        }
    }

    pub fn mul(&self, rhs: &Self) -> Self {
        match Self::binary_known(self, rhs) {
            None => Self::all_x(Self::promote(self, rhs).0),
            Some((w, s, l, r)) => Self::from_arith_result(l.to_bigint() * r.to_bigint(), w, s),
        }
    }

    pub fn div(&self, rhs: &Self) -> Self {
        match Self::binary_known(self, rhs) {
            None => Self::all_x(Self::promote(self, rhs).0),
            Some((w, s, l, r)) => {
                if r.is_zero() {
                    Self::all_x(w)
                } else {
                    // Verilog division truncates toward zero, as BigInt's does.
                    Self::from_arith_result(l.to_bigint() / r.to_bigint(), w, s)
                }
            }
        }
    }

    pub fn rem(&self, rhs: &Self) -> Self {
        match Self::binary_known(self, rhs) {
            None => Self::all_x(Self::promote(self, rhs).0),
            Some((w, s, l, r)) => {
                if r.is_zero() {
                    Self::all_x(w)
                } else {
                    Self::from_arith_result(l.to_bigint() % r.to_bigint(), w, s)
                }
            }
        }
    }

    pub fn pow(&self, rhs: &Self) -> Self {
        match Self::binary_known(self, rhs) {
            None => Self::all_x(Self::promote(self, rhs).0),
            Some((w, s, l, r)) => {
                let exp = r.to_bigint();
                if exp.sign() == Sign::Minus {
                    // Negative exponent truncates to zero for |base| > 1;
                    // keep it simple and produce X for base 0.
                    if l.is_zero() {
                        return Self::all_x(w);
                    }
                    return Self::from_arith_result(BigInt::zero(), w, s);
                }
                let Some(exp) = exp.to_u32() else {
                    return Self::all_x(w);
                };
                Self::from_arith_result(l.to_bigint().pow(exp), w, s)
            }
        }
    }

    pub fn neg(&self) -> Self {
        if self.has_xz() {
            return Self::all_x(self.width);
        }
        Self::from_arith_result(-self.to_bigint(), self.width, self.signed)
    }

    fn bitwise(&self, rhs: &Self, op: fn(ScalarVal, ScalarVal) -> ScalarVal) -> Self {
        let (width, signed) = Self::promote(self, rhs);
        let l = self.coerce_width(width);
        let r = rhs.coerce_width(width);
        let mut out = Self::zero(width);
        out.signed = signed;
        for i in 0..width {
            out.set_bit(i, op(l.bit(i), r.bit(i)));
        }
        out
    }

    pub fn bit_and(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, ScalarVal::and)
    }

    pub fn bit_or(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, ScalarVal::or)
    }

    pub fn bit_xor(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, ScalarVal::xor)
    }

    pub fn bit_xnor(&self, rhs: &Self) -> Self {
        self.bitwise(rhs, |a, b| a.xor(b).not())
    }

    pub fn bit_not(&self) -> Self {
        let mut out = Self::zero(self.width);
        out.signed = self.signed;
        for i in 0..self.width {
            out.set_bit(i, self.bit(i).not());
        }
        out
    }

    pub fn reduce_and(&self) -> ScalarVal {
        (0..self.width).fold(ScalarVal::One, |acc, i| acc.and(self.bit(i)))
    }

    pub fn reduce_or(&self) -> ScalarVal {
        (0..self.width).fold(ScalarVal::Zero, |acc, i| acc.or(self.bit(i)))
    }

    pub fn reduce_xor(&self) -> ScalarVal {
        (0..self.width).fold(ScalarVal::Zero, |acc, i| acc.xor(self.bit(i)))
    }

    pub fn shift_left(&self, count: &Self) -> Self {
        let Some(n) = count.to_u32() else {
            return Self::all_x(self.width);
        };
        let mut out = Self::zero(self.width);
        out.signed = self.signed;
        for i in 0..self.width {
            if i >= n {
                out.set_bit(i, self.bit(i - n));
            }
        }
        out
    }

    /// Logical shift right; `arith` additionally fills with the sign bit
    /// when the vector is signed.
    pub fn shift_right(&self, count: &Self, arith: bool) -> Self {
        let Some(n) = count.to_u32() else {
            return Self::all_x(self.width);
        };
        let fill = if arith && self.signed && self.width > 0 {
            self.msb()
        } else {
            ScalarVal::Zero
        };
        let mut out = Self::zero(self.width);
        out.signed = self.signed;
        for i in 0..self.width {
            let src = i.checked_add(n);
            let v = match src {
                Some(s) if s < self.width => self.bit(s),
                _ => fill,
            };
            out.set_bit(i, v);
        }
        out
    }

    fn compare(&self, rhs: &Self) -> Option<Ordering> {
        let (_, signed, l, r) = Self::binary_known(self, rhs)?;
        if signed {
            Some(l.to_bigint().cmp(&r.to_bigint()))
        } else {
            Some(l.to_biguint().cmp(&r.to_biguint()))
        }
    }

    pub fn lt(&self, rhs: &Self) -> ScalarVal {
        match self.compare(rhs) {
            None => ScalarVal::X,
            Some(ord) => ScalarVal::from_bool(ord == Ordering::Less),
        }
    }

    pub fn le(&self, rhs: &Self) -> ScalarVal {
        match self.compare(rhs) {
            None => ScalarVal::X,
            Some(ord) => ScalarVal::from_bool(ord != Ordering::Greater),
        }
    }

    pub fn gt(&self, rhs: &Self) -> ScalarVal {
        rhs.lt(self)
    }

    pub fn ge(&self, rhs: &Self) -> ScalarVal {
        rhs.le(self)
    }

    /// Logical equality `==`: X when any compared bit is X/Z.
    pub fn log_eq(&self, rhs: &Self) -> ScalarVal {
        if self.has_xz() || rhs.has_xz() {
            return ScalarVal::X;
        }
        let (width, _) = Self::promote(self, rhs);
        let l = self.coerce_width(width);
        let r = rhs.coerce_width(width);
        ScalarVal::from_bool(l.a == r.a)
    }

    /// Case equality `===`: exact four-state match, always 0 or 1.
    pub fn case_eq(&self, rhs: &Self) -> ScalarVal {
        let (width, _) = Self::promote(self, rhs);
        let l = self.coerce_width(width);
        let r = rhs.coerce_width(width);
        ScalarVal::from_bool(l.a == r.a && l.b == r.b)
    }

    pub fn concat(parts: &[Self]) -> Self {
        let width: u32 = parts.iter().map(Self::width).sum();
        let mut out = Self::zero(width);
        // Concatenation operands are unsigned; first part lands in the
        // most significant position.
        let mut pos = width;
        for part in parts {
            pos -= part.width;
            for i in 0..part.width {
                out.set_bit(pos + i, part.bit(i));
            }
        }
        out
    }

    pub fn repeat(&self, count: u32) -> Self {
        let parts = vec![self.clone(); count as usize];
        Self::concat(&parts)
    }
}

impl fmt::Display for BitVector {
    /// Renders as a sized binary literal, the exact format diagnostics
    /// use.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{}b", self.width, if self.signed { "s" } else { "" })?;
        for i in (0..self.width).rev() {
            write!(f, "{}", self.bit(i))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bv(width: u32, value: u32) -> BitVector {
        BitVector::from_u32(value).coerce_width(width)
    }

    #[test]
    fn add_wraps_at_width() {
        let a = bv(8, 0xff);
        let b = bv(8, 1);
        let sum = a.add(&b);
        assert_eq!(sum.to_u32(), Some(0));
        assert_eq!(sum.width(), 8);
    }

    #[test]
    fn division_by_zero_is_all_x() {
        let a = bv(8, 42);
        let q = a.div(&bv(8, 0));
        assert!(q.has_xz());
        assert_eq!(q, BitVector::all_x(8));
    }

    #[test]
    fn xz_poisons_arithmetic() {
        let a = BitVector::all_z(4);
        let b = bv(4, 3);
        assert_eq!(a.add(&b), BitVector::all_x(4));
        assert_eq!(a.lt(&b), ScalarVal::X);
    }

    #[test]
    fn bitwise_is_per_bit() {
        let mut a = bv(4, 0b1100);
        a.set_bit(0, ScalarVal::X);
        let b = bv(4, 0b1010);
        let and = a.bit_and(&b);
        // bit0: X & 0 = 0, bit1: 0 & 1 = 0, bit2: 1 & 0 = 0, bit3: 1 & 1 = 1
        assert_eq!(and.bit(0), ScalarVal::Zero);
        assert_eq!(and.bit(3), ScalarVal::One);
    }

    #[test]
    fn signed_comparison_uses_twos_complement() {
        let mut minus_one = bv(4, 0xf);
        minus_one.set_signed(true);
        let mut one = bv(4, 1);
        one.set_signed(true);
        assert_eq!(minus_one.lt(&one), ScalarVal::One);
        // Unsigned view flips the answer.
        let minus_unsigned = bv(4, 0xf);
        assert_eq!(minus_unsigned.lt(&bv(4, 1)), ScalarVal::Zero);
    }

    #[test]
    fn case_eq_distinguishes_xz() {
        let x = BitVector::all_x(2);
        let z = BitVector::all_z(2);
        assert_eq!(x.case_eq(&x.clone()), ScalarVal::One);
        assert_eq!(x.case_eq(&z), ScalarVal::Zero);
        assert_eq!(x.log_eq(&x.clone()), ScalarVal::X);
    }

    #[test]
    fn concat_orders_msb_first() {
        let hi = bv(4, 0xa);
        let lo = bv(4, 0x5);
        let cat = BitVector::concat(&[hi, lo]);
        assert_eq!(cat.width(), 8);
        assert_eq!(cat.to_u32(), Some(0xa5));
    }

    #[test]
    fn string_constant_packs_bytes() {
        let v = BitVector::from_string("AB");
        assert_eq!(v.width(), 16);
        assert_eq!(v.to_u32(), Some(0x4142));
    }

    #[test]
    fn arithmetic_shift_fills_with_sign() {
        let mut v = bv(8, 0x80);
        v.set_signed(true);
        let shifted = v.shift_right(&bv(32, 2), true);
        assert_eq!(shifted.to_u32(), Some(0xe0));
        let logical = v.shift_right(&bv(32, 2), false);
        assert_eq!(logical.to_u32(), Some(0x20));
    }

    #[test]
    fn literal_decoding() {
        // 8'hfe
        let v = BitVector::from_literal(16, "fe", Some(8), false).unwrap();
        assert_eq!(v.to_u32(), Some(0xfe));
        assert_eq!(v.width(), 8);
        assert!(v.is_sized());

        // 'hff: unsized hex gets four bits per digit.
        let v = BitVector::from_literal(16, "ff", None, false).unwrap();
        assert_eq!(v.width(), 8);
        assert!(!v.is_sized());

        // 'd13: unsized decimal gets the value's bit length.
        let v = BitVector::from_literal(10, "13", None, false).unwrap();
        assert_eq!(v.width(), 4);
        assert_eq!(v.to_u32(), Some(13));

        // Underscores separate, x fills.
        let v = BitVector::from_literal(2, "1_0xz", Some(4), false).unwrap();
        assert_eq!(v.bit(3), ScalarVal::One);
        assert_eq!(v.bit(1), ScalarVal::X);
        assert_eq!(v.bit(0), ScalarVal::Z);
    }

    #[test]
    fn zero_width_literal_is_rejected() {
        assert!(BitVector::from_literal(2, "0", Some(0), false).is_err());
        assert!(BitVector::from_literal(16, "", None, false).is_err());
    }

    #[test]
    fn xz_top_digit_extends_sized_literals() {
        // 8'bx1: the x top digit widens as x.
        let v = BitVector::from_literal(2, "x1", Some(8), false).unwrap();
        assert_eq!(v.bit(0), ScalarVal::One);
        assert_eq!(v.bit(1), ScalarVal::X);
        assert_eq!(v.bit(7), ScalarVal::X);
    }

    #[test]
    fn sign_extension_on_widening() {
        let mut v = bv(4, 0b1010);
        v.set_signed(true);
        let wide = v.coerce_width(8);
        assert_eq!(wide.to_u32(), Some(0b1111_1010));
    }
}
