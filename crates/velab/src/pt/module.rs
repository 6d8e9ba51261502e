use serde::{Deserialize, Serialize};

use crate::{
    lang::{Direction, NetType},
    pt::{PtAttrInst, PtDeclHead, PtExpr, PtId, PtIoHead, PtItem},
    region::FileRegion,
};

/// A module definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtModule {
    #[serde(default)]
    pub id: PtId,
    #[serde(default)]
    pub region: FileRegion,
    pub name: String,
    #[serde(default)]
    pub ports: Vec<PtPort>,
    /// Parameter ports from `#(parameter ...)` in the header.
    #[serde(default)]
    pub paramports: Vec<PtDeclHead>,
    #[serde(default)]
    pub ioheads: Vec<PtIoHead>,
    #[serde(default)]
    pub declheads: Vec<PtDeclHead>,
    #[serde(default)]
    pub items: Vec<PtItem>,
    /// The `` `default_nettype `` in force for this module; `None`
    /// forbids implicit nets.
    #[serde(default)]
    pub default_nettype: NetType,
    #[serde(default)]
    pub attrs: Vec<PtAttrInst>,
}

impl PtModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PtId::default(),
            region: FileRegion::default(),
            name: name.into(),
            ports: vec![],
            paramports: vec![],
            ioheads: vec![],
            declheads: vec![],
            items: vec![],
            default_nettype: NetType::Wire,
            attrs: vec![],
        }
    }
}

/// One port of a module header. `refs` are the inner port expressions
/// (primaries, possibly selected); `dirs` carries the direction the
/// parser reconciled per reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtPort {
    #[serde(default)]
    pub region: FileRegion,
    /// External port name for named connection (`.clk(...)`); defaults
    /// to the single reference's name.
    #[serde(default)]
    pub ext_name: Option<String>,
    pub refs: Vec<PtExpr>,
    #[serde(default)]
    pub dirs: Vec<Direction>,
}

impl PtPort {
    /// A plain `module m(a)` port.
    pub fn simple(name: impl Into<String>, dir: Direction) -> Self {
        let name = name.into();
        Self {
            region: FileRegion::default(),
            ext_name: Some(name.clone()),
            refs: vec![PtExpr::primary(name)],
            dirs: vec![dir],
        }
    }
}

/// A user-defined primitive definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtUdp {
    #[serde(default)]
    pub region: FileRegion,
    pub name: String,
    /// Port names, output first.
    pub ports: Vec<String>,
    #[serde(default)]
    pub is_seq: bool,
    /// Initial value of the sequential state, if declared.
    #[serde(default)]
    pub init: Option<PtExpr>,
    pub entries: Vec<PtUdpEntry>,
}

/// One row of a UDP table: input symbols, current-state symbol for
/// sequential UDPs, and the output symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtUdpEntry {
    #[serde(default)]
    pub region: FileRegion,
    pub inputs: String,
    #[serde(default)]
    pub current: Option<char>,
    pub output: char,
}
