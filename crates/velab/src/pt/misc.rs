use serde::{Deserialize, Serialize};

use crate::{lang::Strength, pt::PtExpr, region::FileRegion};

/// A delay specification, one to three values (`#(rise, fall, turnoff)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtDelay {
    #[serde(default)]
    pub region: FileRegion,
    pub values: Vec<PtExpr>,
}

impl PtDelay {
    pub fn new(values: Vec<PtExpr>) -> Self {
        Self {
            region: FileRegion::default(),
            values,
        }
    }
}

/// A drive-strength pair `(strong0, weak1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtStrength {
    #[serde(default)]
    pub region: FileRegion,
    pub drive0: Strength,
    pub drive1: Strength,
}

/// A port or parameter connection, ordered (`name` empty) or named
/// (`.name(expr)`). The expression slot may be empty for unconnected
/// ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtConnection {
    #[serde(default)]
    pub region: FileRegion,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub expr: Option<PtExpr>,
}

impl PtConnection {
    pub fn ordered(expr: PtExpr) -> Self {
        Self {
            region: expr.region,
            name: None,
            expr: Some(expr),
        }
    }

    pub fn named(name: impl Into<String>, expr: Option<PtExpr>) -> Self {
        Self {
            region: FileRegion::default(),
            name: Some(name.into()),
            expr,
        }
    }
}

/// A statement control: `#delay stmt`, `@(events) stmt` or
/// `repeat (n) @(events)` on a nonblocking assign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PtControl {
    Delay(PtDelay),
    /// Event control; an empty list means `@*`.
    Event(Vec<PtExpr>),
    Repeat { expr: PtExpr, events: Vec<PtExpr> },
}

/// One attribute instance `(* key = value, ... *)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtAttrInst {
    #[serde(default)]
    pub region: FileRegion,
    pub specs: Vec<PtAttrSpec>,
}

/// One `key = value` (value optional) inside an attribute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtAttrSpec {
    #[serde(default)]
    pub region: FileRegion,
    pub name: String,
    #[serde(default)]
    pub expr: Option<PtExpr>,
}
