use serde::{Deserialize, Serialize};

use crate::{
    lang::{AuxType, Direction, NetType, VarType, VsType},
    pt::{PtDelay, PtExpr, PtStrength},
    region::FileRegion,
};

/// A range written in the source, `[left:right]`, still unevaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtRange {
    #[serde(default)]
    pub region: FileRegion,
    pub left: PtExpr,
    pub right: PtExpr,
}

impl PtRange {
    pub fn new(left: PtExpr, right: PtExpr) -> Self {
        Self {
            region: left.region.cover(right.region),
            left,
            right,
        }
    }
}

/// Kind of a declaration head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    Param,
    LocalParam,
    SpecParam,
    Net,
    Reg,
    Var(VarType),
    Genvar,
    Event,
}

/// A declaration head: the common part of `wire [7:0] a, b;` that the
/// per-name items share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtDeclHead {
    #[serde(default)]
    pub region: FileRegion,
    pub kind: DeclKind,
    #[serde(default)]
    pub net_type: NetType,
    #[serde(default)]
    pub vs_type: VsType,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub range: Option<PtRange>,
    #[serde(default)]
    pub strength: Option<PtStrength>,
    #[serde(default)]
    pub delay: Option<PtDelay>,
    pub items: Vec<PtDeclItem>,
    #[serde(default)]
    pub attrs: Vec<super::PtAttrInst>,
}

impl PtDeclHead {
    pub fn new(kind: DeclKind, items: Vec<PtDeclItem>) -> Self {
        Self {
            region: FileRegion::default(),
            kind,
            net_type: NetType::default(),
            vs_type: VsType::default(),
            signed: false,
            range: None,
            strength: None,
            delay: None,
            items,
            attrs: vec![],
        }
    }

    pub fn with_range(mut self, left: PtExpr, right: PtExpr) -> Self {
        self.range = Some(PtRange::new(left, right));
        self
    }

    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    pub fn net_type(mut self, net_type: NetType) -> Self {
        self.net_type = net_type;
        self
    }
}

/// One declared name under a head, with optional array dimensions and
/// initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtDeclItem {
    #[serde(default)]
    pub region: FileRegion,
    pub name: String,
    #[serde(default)]
    pub dims: Vec<PtRange>,
    #[serde(default)]
    pub init: Option<PtExpr>,
}

impl PtDeclItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            region: FileRegion::default(),
            name: name.into(),
            dims: vec![],
            init: None,
        }
    }

    pub fn with_init(name: impl Into<String>, init: PtExpr) -> Self {
        Self {
            region: FileRegion::default(),
            name: name.into(),
            dims: vec![],
            init: Some(init),
        }
    }

    pub fn array(name: impl Into<String>, dims: Vec<PtRange>) -> Self {
        Self {
            region: FileRegion::default(),
            name: name.into(),
            dims,
            init: None,
        }
    }
}

/// An IO declaration head (`input [3:0] a, b;`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtIoHead {
    #[serde(default)]
    pub region: FileRegion,
    pub dir: Direction,
    #[serde(default)]
    pub aux_type: AuxType,
    #[serde(default)]
    pub net_type: NetType,
    #[serde(default)]
    pub var_type: VarType,
    #[serde(default)]
    pub signed: bool,
    #[serde(default)]
    pub range: Option<PtRange>,
    pub items: Vec<PtIoItem>,
    #[serde(default)]
    pub attrs: Vec<super::PtAttrInst>,
}

impl PtIoHead {
    pub fn new(dir: Direction, items: Vec<PtIoItem>) -> Self {
        Self {
            region: FileRegion::default(),
            dir,
            aux_type: AuxType::default(),
            net_type: NetType::default(),
            var_type: VarType::default(),
            signed: false,
            range: None,
            items,
            attrs: vec![],
        }
    }

    pub fn with_range(mut self, left: PtExpr, right: PtExpr) -> Self {
        self.range = Some(PtRange::new(left, right));
        self
    }

    pub fn aux(mut self, aux_type: AuxType) -> Self {
        self.aux_type = aux_type;
        self
    }
}

/// One declared IO name, with optional initializer (only legal with an
/// aux var type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtIoItem {
    #[serde(default)]
    pub region: FileRegion,
    pub name: String,
    #[serde(default)]
    pub init: Option<PtExpr>,
}

impl PtIoItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            region: FileRegion::default(),
            name: name.into(),
            init: None,
        }
    }
}
