//! The attribute store.
//!
//! Attribute instances (`(* key = value *)`) can precede nearly any
//! construct, so storing them inline would mean an attribute slot on
//! every entity struct, almost always empty. The store inverts that:
//! attributes live in one side table keyed by the object they attach
//! to, entities stay lean, and `find_attr` is the single query path.
//! This also means attaching attributes to an object after the fact
//! (an instantiation decorating a definition's module) needs no
//! mutable access to the object itself.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    region::FileRegion,
    value::VlValue,
    vl::{ContAssignId, DeclArrayId, DeclId, ExprId, ModuleId, ParamId, PrimId, ProcessId, ScopeId, StmtId, TaskFuncId},
};

/// Reference to any VL object an attribute instance can attach to.
///
/// A plain tagged union over typed ids rather than a trait object: it
/// stays `Copy`, hashes cheaply as a map key, and adding an
/// attachable kind is one variant, not a new vtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VlObjRef {
    Scope(ScopeId),
    Module(ModuleId),
    Decl(DeclId),
    DeclArray(DeclArrayId),
    Param(ParamId),
    Expr(ExprId),
    Stmt(StmtId),
    Prim(PrimId),
    Process(ProcessId),
    TaskFunc(TaskFuncId),
    ContAssign(ContAssignId),
}

/// One elaborated attribute: `(* key = value *)`.
///
/// The value is the *evaluated* constant, not the expression — by the
/// time a consumer reads attributes, elaboration is over and the
/// scopes the expression would need may mean nothing to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VlAttribute {
    pub name: String,
    /// Constant value of the attribute expression; attributes without a
    /// value get `Int(1)` per the language rules.
    pub value: VlValue,
    pub def_side: bool,
    pub region: FileRegion,
}

/// Store mapping `(object, def_side)` to its attribute list.
///
/// `def_side` is part of the key because one object can legitimately
/// carry two independent attribute sets: the ones written at its
/// *definition* (`(* keep *) module m ...`) and the ones written at
/// its *instantiation* (`(* dont_touch *) m u0 (...)`). Consumers ask
/// for the side they care about; merging the two would lose who said
/// what.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AttrStore {
    map: AHashMap<(VlObjRef, bool), Vec<VlAttribute>>,
}

impl AttrStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reg_attr(&mut self, obj: VlObjRef, def_side: bool, attrs: Vec<VlAttribute>) {
        if attrs.is_empty() {
            return;
        }
        self.map.entry((obj, def_side)).or_default().extend(attrs);
    }

    pub fn find_attr(&self, obj: VlObjRef, def_side: bool) -> &[VlAttribute] {
        self.map.get(&(obj, def_side)).map_or(&[], Vec::as_slice)
    }
}
