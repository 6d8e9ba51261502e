//! Elaborated statement nodes.
//!
//! One tagged sum covers every procedural statement kind, arena-held
//! and referenced by [`StmtId`] like expressions are. Statements do
//! not execute here — there is no simulator in this crate — so the
//! nodes record *structure* (which scope a block opened, which task a
//! call resolved to, which declaration an event trigger fires) for
//! consumers that walk the database afterwards.

use serde::{Deserialize, Serialize};

use crate::{
    lang::{CaseType, ProcessKind},
    region::FileRegion,
    vl::{DeclId, ExprId, ScopeId, StmtId, TaskFuncId, VlDelay},
};

/// An elaborated statement control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VlControl {
    Delay(VlDelay),
    /// Event control; empty list is `@*`.
    Event(Vec<ExprId>),
    Repeat { expr: ExprId, events: Vec<ExprId> },
}

/// One arm of an elaborated case statement.
///
/// Elaboration normalizes arm order: the default arm (no labels) sits
/// last regardless of where it was written, so a consumer can scan
/// arms in order and treat "ran out of labelled arms" and "hit the
/// default" uniformly. All label expressions have already been
/// size-fit to the case's unified comparison type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlCaseItem {
    pub region: FileRegion,
    pub labels: Vec<ExprId>,
    /// `None` for an empty arm body (`label: ;`), which is legal and
    /// distinct from a missing arm.
    pub body: Option<StmtId>,
}

/// An elaborated statement node.
///
/// `process_kind` is denormalized onto every node on purpose: the
/// common consumer question "is this inside an `initial` or an
/// `always`" would otherwise need a parent walk the arena does not
/// keep edges for. It is `None` inside task/function bodies, which
/// belong to whichever process eventually calls them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlStmt {
    pub region: FileRegion,
    /// The process this statement ultimately belongs to, when known.
    pub process_kind: Option<ProcessKind>,
    pub kind: VlStmtKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VlStmtKind {
    Null,
    Block {
        /// The scope the block introduced (named and anonymous blocks
        /// both get one).
        scope: Option<ScopeId>,
        parallel: bool,
        stmts: Vec<StmtId>,
    },
    If {
        cond: ExprId,
        then_stmt: StmtId,
        else_stmt: Option<StmtId>,
    },
    Case {
        case_type: CaseType,
        cond: ExprId,
        items: Vec<VlCaseItem>,
    },
    For {
        init: StmtId,
        cond: ExprId,
        next: StmtId,
        body: StmtId,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    Repeat {
        expr: ExprId,
        body: StmtId,
    },
    Wait {
        cond: ExprId,
        body: StmtId,
    },
    Forever {
        body: StmtId,
    },
    Assign {
        lhs: ExprId,
        rhs: ExprId,
        nonblocking: bool,
        control: Option<VlControl>,
    },
    PcAssign {
        lhs: ExprId,
        rhs: ExprId,
    },
    Deassign {
        lhs: ExprId,
    },
    Force {
        lhs: ExprId,
        rhs: ExprId,
    },
    Release {
        lhs: ExprId,
    },
    Enable {
        task: TaskFuncId,
        args: Vec<ExprId>,
    },
    SysEnable {
        name: String,
        args: Vec<Option<ExprId>>,
    },
    Disable {
        target: ScopeId,
    },
    EventTrigger {
        event: DeclId,
    },
    Ctrl {
        control: VlControl,
        body: StmtId,
    },
}
