use serde::{Deserialize, Serialize};

use crate::{
    lang::CaseType,
    pt::{NameBranch, PtControl, PtDeclHead, PtExpr},
    region::FileRegion,
};

/// A statement in the parse tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtStmt {
    #[serde(default)]
    pub region: FileRegion,
    pub kind: PtStmtKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PtStmtKind {
    Null,
    /// `begin ... end` (sequential) or `fork ... join` (parallel).
    /// Named blocks may carry local declarations.
    Block {
        #[serde(default)]
        parallel: bool,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        declheads: Vec<PtDeclHead>,
        stmts: Vec<PtStmt>,
    },
    If {
        cond: PtExpr,
        then_stmt: Box<PtStmt>,
        #[serde(default)]
        else_stmt: Option<Box<PtStmt>>,
    },
    Case {
        #[serde(default)]
        case_type: CaseType,
        expr: PtExpr,
        items: Vec<PtCaseItemStmt>,
    },
    For {
        init: Box<PtStmt>,
        cond: PtExpr,
        next: Box<PtStmt>,
        body: Box<PtStmt>,
    },
    While {
        cond: PtExpr,
        body: Box<PtStmt>,
    },
    Repeat {
        expr: PtExpr,
        body: Box<PtStmt>,
    },
    Wait {
        cond: PtExpr,
        body: Box<PtStmt>,
    },
    Forever {
        body: Box<PtStmt>,
    },
    /// Blocking assignment, with optional intra-assignment control.
    Assign {
        lhs: PtExpr,
        rhs: PtExpr,
        #[serde(default)]
        control: Option<PtControl>,
    },
    /// Nonblocking assignment (`<=`).
    NbAssign {
        lhs: PtExpr,
        rhs: PtExpr,
        #[serde(default)]
        control: Option<PtControl>,
    },
    /// Procedural continuous assignment (`assign lhs = rhs` inside a
    /// process).
    PcAssign {
        lhs: PtExpr,
        rhs: PtExpr,
    },
    Deassign {
        lhs: PtExpr,
    },
    Force {
        lhs: PtExpr,
        rhs: PtExpr,
    },
    Release {
        lhs: PtExpr,
    },
    /// Task enable, possibly hierarchical.
    Enable {
        #[serde(default)]
        branches: Vec<NameBranch>,
        name: String,
        #[serde(default)]
        args: Vec<PtExpr>,
    },
    /// System task enable (`$display`, ...). Slots may be empty.
    SysEnable {
        name: String,
        #[serde(default)]
        args: Vec<Option<PtExpr>>,
    },
    Disable {
        #[serde(default)]
        branches: Vec<NameBranch>,
        name: String,
    },
    /// Named-event trigger (`-> ev`).
    EventTrigger {
        #[serde(default)]
        branches: Vec<NameBranch>,
        name: String,
    },
    /// `#delay body` or `@(events) body`.
    Ctrl {
        control: PtControl,
        body: Box<PtStmt>,
    },
}

/// One arm of a case statement; an empty label list is the `default`
/// arm. The body may be missing (`label: ;`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PtCaseItemStmt {
    #[serde(default)]
    pub region: FileRegion,
    #[serde(default)]
    pub labels: Vec<PtExpr>,
    #[serde(default)]
    pub body: Option<PtStmt>,
}

impl PtStmt {
    pub fn new(region: FileRegion, kind: PtStmtKind) -> Self {
        Self { region, kind }
    }

    pub fn null() -> Self {
        Self::new(FileRegion::default(), PtStmtKind::Null)
    }

    pub fn assign(lhs: PtExpr, rhs: PtExpr) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::Assign {
            lhs,
            rhs,
            control: None,
        })
    }

    pub fn nb_assign(lhs: PtExpr, rhs: PtExpr) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::NbAssign {
            lhs,
            rhs,
            control: None,
        })
    }

    pub fn seq_block(stmts: Vec<Self>) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::Block {
            parallel: false,
            name: None,
            declheads: vec![],
            stmts,
        })
    }

    pub fn named_block(name: impl Into<String>, stmts: Vec<Self>) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::Block {
            parallel: false,
            name: Some(name.into()),
            declheads: vec![],
            stmts,
        })
    }

    pub fn if_stmt(cond: PtExpr, then_stmt: Self) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::If {
            cond,
            then_stmt: Box::new(then_stmt),
            else_stmt: None,
        })
    }

    pub fn if_else(cond: PtExpr, then_stmt: Self, else_stmt: Self) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::If {
            cond,
            then_stmt: Box::new(then_stmt),
            else_stmt: Some(Box::new(else_stmt)),
        })
    }

    pub fn for_stmt(init: Self, cond: PtExpr, next: Self, body: Self) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::For {
            init: Box::new(init),
            cond,
            next: Box::new(next),
            body: Box::new(body),
        })
    }

    pub fn while_stmt(cond: PtExpr, body: Self) -> Self {
        Self::new(FileRegion::default(), PtStmtKind::While {
            cond,
            body: Box::new(body),
        })
    }

    pub fn at(mut self, region: FileRegion) -> Self {
        self.region = region;
        self
    }
}
