//! Language-level enumerations shared by the parse tree and the
//! elaborated database: operator kinds, constant kinds, net types,
//! primitive kinds, directions, strengths.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Operator kind of an operator expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum OpType {
    // unary
    Minus,
    Plus,
    Not,
    BitNeg,
    UnaryAnd,
    UnaryNand,
    UnaryOr,
    UnaryNor,
    UnaryXor,
    UnaryXNor,
    // binary
    Sub,
    Div,
    Mod,
    Eq,
    Neq,
    CaseEq,
    CaseNeq,
    Gt,
    Ge,
    Lt,
    Le,
    LShift,
    RShift,
    Add,
    Mult,
    LogAnd,
    LogOr,
    BitAnd,
    BitOr,
    BitXor,
    BitXNor,
    ArithLShift,
    ArithRShift,
    Power,
    // ternary and n-ary
    Condition,
    Concat,
    MultiConcat,
    EventOr,
    MinTypMax,
    // special
    Null,
    List,
    Posedge,
    Negedge,
}

impl OpType {
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Self::Minus
                | Self::Plus
                | Self::Not
                | Self::BitNeg
                | Self::UnaryAnd
                | Self::UnaryNand
                | Self::UnaryOr
                | Self::UnaryNor
                | Self::UnaryXor
                | Self::UnaryXNor
                | Self::Posedge
                | Self::Negedge
        )
    }

    /// Edge descriptors are only legal inside event expressions.
    pub fn is_edge(self) -> bool {
        matches!(self, Self::Posedge | Self::Negedge)
    }
}

/// Kind of a constant expression, with the signed based-literal
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ConstType {
    Dec,
    Real,
    Binary,
    Oct,
    Hex,
    String,
    Int,
    SignedDec,
    SignedBinary,
    SignedOct,
    SignedHex,
}

impl ConstType {
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Int | Self::SignedDec | Self::SignedBinary | Self::SignedOct | Self::SignedHex
        )
    }

    /// Radix of a based literal; `None` for real/string/plain-int.
    pub fn radix(self) -> Option<u32> {
        match self {
            Self::Binary | Self::SignedBinary => Some(2),
            Self::Oct | Self::SignedOct => Some(8),
            Self::Dec | Self::SignedDec => Some(10),
            Self::Hex | Self::SignedHex => Some(16),
            Self::Real | Self::String | Self::Int => None,
        }
    }
}

/// Net kind of a net declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum NetType {
    #[default]
    Wire,
    Wand,
    Wor,
    Tri,
    Tri0,
    Tri1,
    TriReg,
    TriAnd,
    TriOr,
    Supply1,
    Supply0,
    None,
}

/// Variable kind of a variable declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum VarType {
    #[default]
    None,
    Integer,
    Real,
    Time,
    Realtime,
}

/// Auxiliary type on an IO declaration (`output reg q`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum AuxType {
    #[default]
    None,
    Net,
    Reg,
    Var,
}

/// `vectored`/`scalared` marker on a net declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum VsType {
    #[default]
    None,
    Vectored,
    Scalared,
}

/// Port / IO direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
    Inout,
    MixedIO,
    #[default]
    NoDirection,
}

/// Gate-level primitive kinds, plus `Udp` and `Cell` for user-defined
/// primitives and library cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum PrimType {
    And,
    Nand,
    Nor,
    Or,
    Xor,
    Xnor,
    Buf,
    Not,
    Bufif0,
    Bufif1,
    Notif0,
    Notif1,
    Nmos,
    Pmos,
    Cmos,
    Rnmos,
    Rpmos,
    Rcmos,
    Rtran,
    Rtranif0,
    Rtranif1,
    Tran,
    Tranif0,
    Tranif1,
    Pullup,
    Pulldown,
    Udp,
    Cell,
}

/// Terminal profile of a primitive kind: how many terminals are legal
/// and how they split into outputs, inouts and inputs.
///
/// The language fixes this table per gate kind — `and` takes one output
/// followed by any number of inputs, `buf` fans out (any number of
/// outputs followed by exactly one input), the `tran` family is all
/// inout, and so on. The elaborator checks every instance's terminal
/// count against `min..=max` and then classifies each terminal through
/// [`terminal_dir`](Self::terminal_dir), so the direction logic lives
/// in exactly one place instead of being re-derived per instance path
/// (gate, UDP and cell instances all funnel through it).
///
/// Exactly one of `outputs` / `inputs` may be `None`, meaning "all
/// terminals not claimed by the other two classes". That encoding keeps
/// the variadic kinds (`min..` with no upper bound) in the same struct
/// as the fixed-arity ones: for an `and` with n terminals the inputs
/// count resolves to `n - 1`, for a `buf` the outputs count resolves to
/// `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortProfile {
    /// Fewest terminals an instance may have.
    pub min: u32,
    /// Most terminals an instance may have; `u32::MAX` for the variadic
    /// kinds.
    pub max: u32,
    /// Output-terminal count; `None` means "all remaining terminals"
    /// (the `buf`/`not` fan-out case).
    pub outputs: Option<u32>,
    /// Inout-terminal count. Only the bidirectional switch kinds
    /// (`tran` and friends) have any.
    pub inouts: u32,
    /// Input-terminal count; `None` means "all remaining terminals"
    /// (the `and`/`or`/UDP case).
    pub inputs: Option<u32>,
}

impl PrimType {
    pub fn port_profile(self) -> PortProfile {
        use PrimType as P;
        match self {
            P::And | P::Nand | P::Or | P::Nor | P::Xor | P::Xnor => PortProfile {
                min: 3,
                max: u32::MAX,
                outputs: Some(1),
                inouts: 0,
                inputs: None,
            },
            P::Buf | P::Not => PortProfile {
                min: 2,
                max: u32::MAX,
                outputs: None,
                inouts: 0,
                inputs: Some(1),
            },
            P::Bufif0 | P::Bufif1 | P::Notif0 | P::Notif1 | P::Nmos | P::Pmos | P::Rnmos | P::Rpmos => PortProfile {
                min: 3,
                max: 3,
                outputs: Some(1),
                inouts: 0,
                inputs: Some(2),
            },
            P::Cmos | P::Rcmos => PortProfile {
                min: 4,
                max: 4,
                outputs: Some(1),
                inouts: 0,
                inputs: Some(3),
            },
            P::Tran | P::Rtran => PortProfile {
                min: 2,
                max: 2,
                outputs: Some(0),
                inouts: 2,
                inputs: Some(0),
            },
            P::Tranif0 | P::Tranif1 | P::Rtranif0 | P::Rtranif1 => PortProfile {
                min: 3,
                max: 3,
                outputs: Some(0),
                inouts: 2,
                inputs: Some(1),
            },
            P::Pullup | P::Pulldown => PortProfile {
                min: 1,
                max: 1,
                outputs: Some(1),
                inouts: 0,
                inputs: Some(0),
            },
            P::Udp | P::Cell => PortProfile {
                min: 1,
                max: u32::MAX,
                outputs: Some(1),
                inouts: 0,
                inputs: None,
            },
        }
    }
}

impl PortProfile {
    /// Direction of terminal `pos` in an instance with `n` terminals.
    ///
    /// The ordering convention is the language's, not an arbitrary
    /// one: a primitive's terminal list always runs **outputs first,
    /// then inouts, then inputs** (`and (o, a, b)` drives `o` from `a`
    /// and `b`; `tranif1 (t1, t2, en)` has its control last). The
    /// classification therefore only needs the position and the total
    /// count — no per-kind special cases.
    ///
    /// # Arguments
    /// * `pos` - Zero-based terminal position within the instance.
    /// * `n` - Total terminal count of the instance. Needed because a
    ///   variadic class ("all remaining") can only be sized once the
    ///   instance's arity is known.
    ///
    /// The caller is expected to have validated `min <= n <= max`
    /// first; for an out-of-profile `n` the split is meaningless.
    pub fn terminal_dir(&self, pos: u32, n: u32) -> Direction {
        // Resolve the variadic class: whichever of outputs/inputs is
        // `None` absorbs everything the fixed classes do not claim.
        let outputs = self.outputs.unwrap_or(n - self.inputs.unwrap_or(0) - self.inouts);
        if pos < outputs {
            Direction::Output
        } else if pos < outputs + self.inouts {
            Direction::Inout
        } else {
            Direction::Input
        }
    }
}

/// Drive / charge strength value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum Strength {
    #[default]
    NoStrength,
    SupplyDrive,
    StrongDrive,
    PullDrive,
    WeakDrive,
    LargeCharge,
    MediumCharge,
    SmallCharge,
    HiZ,
}

/// Flavor of a case statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum CaseType {
    #[default]
    Exact,
    X,
    Z,
}

/// Flavor of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ProcessKind {
    Initial,
    Always,
}

/// Bit-/part-select mode on a primary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum RangeMode {
    #[default]
    No,
    /// `[a:b]`
    Const,
    /// `[a +: b]`
    Plus,
    /// `[a -: b]`
    Minus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_matches_the_gate_table() {
        let p = PrimType::And.port_profile();
        assert_eq!((p.min, p.max), (3, u32::MAX));
        assert_eq!(p.terminal_dir(0, 5), Direction::Output);
        assert_eq!(p.terminal_dir(4, 5), Direction::Input);

        let p = PrimType::Buf.port_profile();
        // buf: n-1 outputs then one input
        assert_eq!(p.terminal_dir(0, 3), Direction::Output);
        assert_eq!(p.terminal_dir(1, 3), Direction::Output);
        assert_eq!(p.terminal_dir(2, 3), Direction::Input);

        let p = PrimType::Tranif0.port_profile();
        assert_eq!(p.terminal_dir(0, 3), Direction::Inout);
        assert_eq!(p.terminal_dir(1, 3), Direction::Inout);
        assert_eq!(p.terminal_dir(2, 3), Direction::Input);

        let p = PrimType::Pullup.port_profile();
        assert_eq!((p.min, p.max), (1, 1));
        assert_eq!(p.terminal_dir(0, 1), Direction::Output);
    }
}
