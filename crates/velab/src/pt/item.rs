use serde::{Deserialize, Serialize};

use crate::{
    lang::{PrimType, ProcessKind, VarType},
    pt::{NameBranch, PtAttrInst, PtConnection, PtDeclHead, PtDelay, PtExpr, PtId, PtIoHead, PtRange, PtStmt, PtStrength},
    region::FileRegion,
};

/// A module item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PtItem {
    /// One `assign` item; a single head may carry several assignments.
    ContAssign {
        #[serde(default)]
        region: FileRegion,
        #[serde(default)]
        strength: Option<PtStrength>,
        #[serde(default)]
        delay: Option<PtDelay>,
        assigns: Vec<PtContAssign>,
    },
    /// `initial` / `always` process.
    Process {
        #[serde(default)]
        region: FileRegion,
        kind: ProcessKind,
        body: PtStmt,
        #[serde(default)]
        attrs: Vec<PtAttrInst>,
    },
    /// A module/UDP/cell instantiation header: `defname #(...) u1 (...), u2 (...);`.
    /// Which of the three it is gets decided at elaboration time by
    /// catalog lookup.
    MuHeader {
        #[serde(default)]
        region: FileRegion,
        def_name: String,
        #[serde(default)]
        param_cons: Vec<PtConnection>,
        #[serde(default)]
        strength: Option<PtStrength>,
        #[serde(default)]
        delay: Option<PtDelay>,
        insts: Vec<PtInst>,
        #[serde(default)]
        attrs: Vec<PtAttrInst>,
    },
    /// A gate-primitive header: `and #d (o, a, b), (o2, c, d);`.
    GateHeader {
        #[serde(default)]
        region: FileRegion,
        prim_type: PrimType,
        #[serde(default)]
        strength: Option<PtStrength>,
        #[serde(default)]
        delay: Option<PtDelay>,
        insts: Vec<PtInst>,
        #[serde(default)]
        attrs: Vec<PtAttrInst>,
    },
    DefParam {
        #[serde(default)]
        region: FileRegion,
        items: Vec<PtDefParam>,
    },
    Task(PtTaskFunc),
    Function(PtTaskFunc),
    /// `generate ... endgenerate` region.
    Generate {
        #[serde(default)]
        region: FileRegion,
        declheads: Vec<PtDeclHead>,
        items: Vec<PtItem>,
    },
    /// A named or anonymous generate block.
    GenBlock(GenBody),
    GenIf {
        #[serde(default)]
        region: FileRegion,
        cond: PtExpr,
        then_body: GenBody,
        #[serde(default)]
        else_body: Option<GenBody>,
    },
    GenCase {
        #[serde(default)]
        region: FileRegion,
        expr: PtExpr,
        items: Vec<PtGenCaseItem>,
    },
    GenFor {
        #[serde(default)]
        region: FileRegion,
        genvar: String,
        init_expr: PtExpr,
        cond: PtExpr,
        next_expr: PtExpr,
        /// The loop body block; the LRM requires it to be named.
        body: GenBody,
    },
    /// A specify block. Recorded as an opaque item; path delays and
    /// timing checks are not elaborated.
    Specify {
        #[serde(default)]
        region: FileRegion,
    },
}

impl PtItem {
    pub fn region(&self) -> FileRegion {
        match self {
            Self::ContAssign { region, .. }
            | Self::Process { region, .. }
            | Self::MuHeader { region, .. }
            | Self::GateHeader { region, .. }
            | Self::DefParam { region, .. }
            | Self::Generate { region, .. }
            | Self::GenIf { region, .. }
            | Self::GenCase { region, .. }
            | Self::GenFor { region, .. }
            | Self::Specify { region } => *region,
            Self::Task(tf) | Self::Function(tf) => tf.region,
            Self::GenBlock(body) => body.region,
        }
    }
}

/// One `lhs = rhs` pair of a continuous-assign item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtContAssign {
    #[serde(default)]
    pub region: FileRegion,
    pub lhs: PtExpr,
    pub rhs: PtExpr,
}

impl PtContAssign {
    pub fn new(lhs: PtExpr, rhs: PtExpr) -> Self {
        Self {
            region: lhs.region.cover(rhs.region),
            lhs,
            rhs,
        }
    }
}

/// One instance under an instantiation header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtInst {
    #[serde(default)]
    pub region: FileRegion,
    #[serde(default)]
    pub name: Option<String>,
    /// Present for instance arrays: `u [3:0] (...)`.
    #[serde(default)]
    pub range: Option<PtRange>,
    #[serde(default)]
    pub ports: Vec<PtConnection>,
}

/// One `defparam path.name = expr` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtDefParam {
    #[serde(default)]
    pub region: FileRegion,
    #[serde(default)]
    pub branches: Vec<NameBranch>,
    pub name: String,
    pub rhs: PtExpr,
}

/// A task or function definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtTaskFunc {
    #[serde(default)]
    pub id: PtId,
    #[serde(default)]
    pub region: FileRegion,
    pub name: String,
    #[serde(default)]
    pub automatic: bool,
    /// Function return signedness/range; tasks leave these empty.
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub range: Option<PtRange>,
    /// `function integer f` and friends.
    #[serde(default)]
    pub var_type: VarType,
    #[serde(default)]
    pub ioheads: Vec<PtIoHead>,
    #[serde(default)]
    pub declheads: Vec<PtDeclHead>,
    pub body: PtStmt,
    #[serde(default)]
    pub attrs: Vec<PtAttrInst>,
}

/// The body of a generate block or arm: local declarations plus items,
/// with an optional block name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenBody {
    #[serde(default)]
    pub region: FileRegion,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub declheads: Vec<PtDeclHead>,
    #[serde(default)]
    pub items: Vec<PtItem>,
}

impl GenBody {
    pub fn new(name: Option<String>, declheads: Vec<PtDeclHead>, items: Vec<PtItem>) -> Self {
        Self {
            region: FileRegion::default(),
            name,
            declheads,
            items,
        }
    }
}

/// One arm of a generate-case; an empty label list is the default arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtGenCaseItem {
    #[serde(default)]
    pub region: FileRegion,
    #[serde(default)]
    pub labels: Vec<PtExpr>,
    pub body: GenBody,
}
