//! Elaborated expression nodes.
//!
//! Unlike their parse-tree counterparts, these nodes are *resolved*:
//! every name is a typed id into the database, every select knows
//! whether its indices were constant, and every node carries the type
//! facts sizing computed. Nodes reference each other by [`ExprId`]
//! rather than by ownership, which keeps the enum `Copy`-cheap to walk
//! and lets one node (an LHS element, say) be referenced from two
//! places without cloning a subtree.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    lang::OpType,
    region::FileRegion,
    value::VlValue,
    vl::{DeclArrayId, DeclId, ExprId, GenvarId, ParamId, TaskFuncId},
    vtype::VlValueType,
};

/// An elaborated delay: one to three value expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlDelay {
    pub region: FileRegion,
    pub values: SmallVec<[ExprId; 3]>,
}

/// The object a primary refers to.
///
/// Split out from [`VlExprKind`] because several node shapes (plain
/// primary, bit-select base, LHS element) need "which declared thing
/// is this" and should agree on the answer's representation. Genvar
/// references survive only in generate machinery — an ordinary
/// expression position folds a genvar read into a constant at
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimaryObj {
    Decl(DeclId),
    /// An element of a declaration array, with one index expression per
    /// dimension.
    ArrayElem {
        array: DeclArrayId,
        indices: Vec<ExprId>,
        /// Packed offset when every index was constant and in range.
        const_offset: Option<u32>,
    },
    Param(ParamId),
    Genvar(GenvarId),
}

/// An elaborated expression node.
///
/// `vtype` is the self-determined type computed at construction;
/// `req_type` is filled in by `set_reqsize` when a context imposes a
/// width. `width()`/`is_signed()` read the required type when present.
///
/// # Design Rationale
///
/// Keeping both types instead of overwriting one is deliberate. The
/// self-determined type is still needed *after* sizing — it is what
/// decides how the node extends into the required width (a naturally
/// signed node sign-extends, an unsigned one zero-extends) — and
/// keeping it also makes `set_reqsize` idempotent: re-running a sizing
/// pass can never compound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlExpr {
    pub region: FileRegion,
    pub vtype: VlValueType,
    pub req_type: Option<VlValueType>,
    pub kind: VlExprKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VlExprKind {
    /// A literal with its decoded value.
    Const(VlValue),
    Primary(PrimaryObj),
    /// `base[index]`; `const_index` is set when the index evaluated to
    /// a constant.
    BitSelect {
        base: ExprId,
        index: Option<ExprId>,
        const_index: Option<i32>,
    },
    /// Constant part-select `base[left:right]`.
    PartSelect {
        base: ExprId,
        left: i32,
        right: i32,
    },
    /// Variable part-select `base[base_expr +: width]` /
    /// `base[base_expr -: width]`.
    PlusPartSelect {
        base: ExprId,
        base_expr: ExprId,
        width: u32,
    },
    MinusPartSelect {
        base: ExprId,
        base_expr: ExprId,
        width: u32,
    },
    Unary {
        op: OpType,
        opr: ExprId,
    },
    Binary {
        op: OpType,
        lhs: ExprId,
        rhs: ExprId,
    },
    Ternary {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    Concat {
        parts: Vec<ExprId>,
    },
    MultiConcat {
        rep: u32,
        rep_expr: ExprId,
        parts: Vec<ExprId>,
    },
    FuncCall {
        func: TaskFuncId,
        args: Vec<ExprId>,
    },
    SysFuncCall {
        name: String,
        args: Vec<Option<ExprId>>,
    },
    /// A flattened left-hand side: the concatenation parts in source
    /// order and the primitive elements LSB-first.
    Lhs {
        parts: Vec<ExprId>,
        elems: Vec<ExprId>,
    },
}

impl VlExpr {
    /// The effective type: required if a context fixed one, else the
    /// self-determined type.
    pub fn effective_type(&self) -> VlValueType {
        self.req_type.unwrap_or(self.vtype)
    }

    pub fn width(&self) -> u32 {
        self.effective_type().size()
    }

    pub fn is_signed(&self) -> bool {
        self.effective_type().is_signed()
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, VlExprKind::Const(_))
    }

    /// The decoded value of a constant node.
    pub fn const_value(&self) -> Option<&VlValue> {
        match &self.kind {
            VlExprKind::Const(v) => Some(v),
            _ => None,
        }
    }
}
