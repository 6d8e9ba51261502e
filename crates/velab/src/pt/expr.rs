use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    lang::{ConstType, OpType, RangeMode},
    pt::NameBranch,
    region::FileRegion,
};

/// An expression in the parse tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtExpr {
    #[serde(default)]
    pub region: FileRegion,
    pub kind: PtExprKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PtExprKind {
    /// Operator application, including concatenation, the ternary
    /// operator and edge descriptors. `Null` wraps a parenthesised
    /// expression.
    Opr {
        op: OpType,
        operands: Vec<PtExpr>,
    },
    /// A literal. Based literals keep their digit text (`"fe"` for
    /// `8'hfe`); plain integers use `uint`; reals use `real`; strings
    /// use `str`.
    Const {
        ctype: ConstType,
        #[serde(default)]
        size: Option<u32>,
        #[serde(default)]
        uint: u32,
        #[serde(default)]
        str: String,
        #[serde(default)]
        real: f64,
    },
    /// A user function call, possibly through a hierarchical name.
    FuncCall {
        name: String,
        #[serde(default)]
        branches: Vec<NameBranch>,
        #[serde(default)]
        args: Vec<PtExpr>,
    },
    /// A system function call (`$clog2`, ...). Arguments may be empty
    /// slots.
    SysFuncCall {
        name: String,
        #[serde(default)]
        args: Vec<Option<PtExpr>>,
    },
    /// A name reference, with optional hierarchy, array indices and
    /// bit-/part-select.
    Primary {
        name: String,
        #[serde(default)]
        branches: Vec<NameBranch>,
        #[serde(default)]
        indices: Vec<PtExpr>,
        #[serde(default)]
        range_mode: RangeMode,
        #[serde(default)]
        left: Option<Box<PtExpr>>,
        #[serde(default)]
        right: Option<Box<PtExpr>>,
    },
}

impl PtExpr {
    pub fn new(region: FileRegion, kind: PtExprKind) -> Self {
        Self { region, kind }
    }

    /// Plain decimal integer literal (`17`).
    pub fn int(value: u32) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Const {
                ctype: ConstType::Int,
                size: None,
                uint: value,
                str: String::new(),
                real: 0.0,
            },
        )
    }

    /// Based literal, e.g. `based(Some(8), ConstType::Hex, "fe")` for
    /// `8'hfe`.
    pub fn based(size: Option<u32>, ctype: ConstType, digits: impl Into<String>) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Const {
                ctype,
                size,
                uint: 0,
                str: digits.into(),
                real: 0.0,
            },
        )
    }

    pub fn real(value: f64) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Const {
                ctype: ConstType::Real,
                size: None,
                uint: 0,
                str: String::new(),
                real: value,
            },
        )
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Const {
                ctype: ConstType::String,
                size: None,
                uint: 0,
                str: value.into(),
                real: 0.0,
            },
        )
    }

    /// Simple name reference.
    pub fn primary(name: impl Into<String>) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Primary {
                name: name.into(),
                branches: vec![],
                indices: vec![],
                range_mode: RangeMode::No,
                left: None,
                right: None,
            },
        )
    }

    /// Bit-select `name[index]`.
    pub fn bit_select(name: impl Into<String>, index: Self) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Primary {
                name: name.into(),
                branches: vec![],
                indices: vec![index],
                range_mode: RangeMode::No,
                left: None,
                right: None,
            },
        )
    }

    /// Part-select `name[left:right]`.
    pub fn part_select(name: impl Into<String>, left: Self, right: Self) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Primary {
                name: name.into(),
                branches: vec![],
                indices: vec![],
                range_mode: RangeMode::Const,
                left: Some(Box::new(left)),
                right: Some(Box::new(right)),
            },
        )
    }

    pub fn unary(op: OpType, operand: Self) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Opr {
                op,
                operands: vec![operand],
            },
        )
    }

    pub fn binary(op: OpType, lhs: Self, rhs: Self) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Opr {
                op,
                operands: vec![lhs, rhs],
            },
        )
    }

    pub fn ternary(cond: Self, then_expr: Self, else_expr: Self) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Opr {
                op: OpType::Condition,
                operands: vec![cond, then_expr, else_expr],
            },
        )
    }

    pub fn concat(operands: Vec<Self>) -> Self {
        Self::new(FileRegion::default(), PtExprKind::Opr {
            op: OpType::Concat,
            operands,
        })
    }

    /// Parenthesised expression.
    pub fn paren(inner: Self) -> Self {
        Self::unary(OpType::Null, inner)
    }

    pub fn func_call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::FuncCall {
                name: name.into(),
                branches: vec![],
                args,
            },
        )
    }

    pub fn sys_func_call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::SysFuncCall {
                name: name.into(),
                args: args.into_iter().map(Some).collect(),
            },
        )
    }

    /// Hierarchical name reference (`branches.name`).
    pub fn hier_primary(branches: Vec<NameBranch>, name: impl Into<String>) -> Self {
        Self::new(
            FileRegion::default(),
            PtExprKind::Primary {
                name: name.into(),
                branches,
                indices: vec![],
                range_mode: RangeMode::No,
                left: None,
                right: None,
            },
        )
    }

    pub fn at(mut self, region: FileRegion) -> Self {
        self.region = region;
        self
    }

    /// The operand count of an operator expression, 0 otherwise.
    pub fn operand_num(&self) -> usize {
        match &self.kind {
            PtExprKind::Opr { operands, .. } => operands.len(),
            _ => 0,
        }
    }

    /// Renders the expression back into source-like text for
    /// diagnostics.
    pub fn decompile(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PtExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PtExprKind::Opr { op, operands } => match op {
                OpType::Null => write!(f, "({})", operands[0]),
                OpType::Condition => write!(f, "{} ? {} : {}", operands[0], operands[1], operands[2]),
                OpType::Concat | OpType::EventOr | OpType::List => {
                    write!(f, "{{")?;
                    for (i, opr) in operands.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{opr}")?;
                    }
                    write!(f, "}}")
                }
                OpType::MultiConcat => {
                    write!(f, "{{{}{{", operands[0])?;
                    for (i, opr) in operands[1..].iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{opr}")?;
                    }
                    write!(f, "}}}}")
                }
                op if op.is_unary() => write!(f, "{}({})", op_symbol(*op), operands[0]),
                op => write!(f, "{} {} {}", operands[0], op_symbol(*op), operands[1]),
            },
            PtExprKind::Const {
                ctype,
                size,
                uint,
                str,
                real,
            } => match ctype {
                ConstType::Int => write!(f, "{uint}"),
                ConstType::Real => write!(f, "{real}"),
                ConstType::String => write!(f, "\"{str}\""),
                _ => {
                    if let Some(size) = size {
                        write!(f, "{size}")?;
                    }
                    let base = match ctype.radix() {
                        Some(2) => "'b",
                        Some(8) => "'o",
                        Some(16) => "'h",
                        _ => "'d",
                    };
                    let sign = if ctype.is_signed() { "s" } else { "" };
                    write!(f, "'{sign}{}{str}", &base[1..])
                }
            },
            PtExprKind::FuncCall { name, branches, args } => {
                write_hier(f, branches, name)?;
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            PtExprKind::SysFuncCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match arg {
                        Some(a) => write!(f, "{a}")?,
                        None => {}
                    }
                }
                write!(f, ")")
            }
            PtExprKind::Primary {
                name,
                branches,
                indices,
                range_mode,
                left,
                right,
            } => {
                write_hier(f, branches, name)?;
                for index in indices {
                    write!(f, "[{index}]")?;
                }
                match (range_mode, left, right) {
                    (RangeMode::Const, Some(l), Some(r)) => write!(f, "[{l}:{r}]"),
                    (RangeMode::Plus, Some(l), Some(r)) => write!(f, "[{l} +: {r}]"),
                    (RangeMode::Minus, Some(l), Some(r)) => write!(f, "[{l} -: {r}]"),
                    _ => Ok(()),
                }
            }
        }
    }
}

fn write_hier(f: &mut fmt::Formatter<'_>, branches: &[NameBranch], name: &str) -> fmt::Result {
    for branch in branches {
        write!(f, "{}", branch.name)?;
        if let Some(index) = branch.index {
            write!(f, "[{index}]")?;
        }
        write!(f, ".")?;
    }
    write!(f, "{name}")
}

fn op_symbol(op: OpType) -> &'static str {
    match op {
        OpType::Minus | OpType::Sub => "-",
        OpType::Plus | OpType::Add => "+",
        OpType::Not => "!",
        OpType::BitNeg => "~",
        OpType::UnaryAnd | OpType::BitAnd => "&",
        OpType::UnaryNand => "~&",
        OpType::UnaryOr | OpType::BitOr => "|",
        OpType::UnaryNor => "~|",
        OpType::UnaryXor | OpType::BitXor => "^",
        OpType::UnaryXNor | OpType::BitXNor => "~^",
        OpType::Div => "/",
        OpType::Mod => "%",
        OpType::Eq => "==",
        OpType::Neq => "!=",
        OpType::CaseEq => "===",
        OpType::CaseNeq => "!==",
        OpType::Gt => ">",
        OpType::Ge => ">=",
        OpType::Lt => "<",
        OpType::Le => "<=",
        OpType::LShift => "<<",
        OpType::RShift => ">>",
        OpType::ArithLShift => "<<<",
        OpType::ArithRShift => ">>>",
        OpType::Mult => "*",
        OpType::LogAnd => "&&",
        OpType::LogOr => "||",
        OpType::Power => "**",
        OpType::Posedge => "posedge ",
        OpType::Negedge => "negedge ",
        OpType::MinTypMax => ":",
        _ => "?",
    }
}
