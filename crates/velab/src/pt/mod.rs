//! The parse-tree (PT) data model.
//!
//! Lexing and parsing live outside this crate: a front end (or a test,
//! or the CLI's fixture reader) builds these plain data types and hands
//! a [`PtSource`] to the elaborator, which only ever reads them. The
//! recursion markers the elaborator needs (`in_use` on modules and
//! functions) are held by the driver in id sets, so the tree itself
//! stays immutable.

mod decl;
mod expr;
mod item;
mod misc;
mod module;
mod stmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

pub use self::{
    decl::{DeclKind, PtDeclHead, PtDeclItem, PtIoHead, PtIoItem, PtRange},
    expr::{PtExpr, PtExprKind},
    item::{GenBody, PtContAssign, PtDefParam, PtGenCaseItem, PtInst, PtItem, PtTaskFunc},
    misc::{PtAttrInst, PtAttrSpec, PtConnection, PtControl, PtDelay, PtStrength},
    module::{PtModule, PtPort, PtUdp, PtUdpEntry},
    stmt::{PtCaseItemStmt, PtStmt, PtStmtKind},
};
use crate::region::{FileId, FileRegion};

/// Stable identifier of a PT module or task/function definition.
///
/// Assigned by [`PtSource`] at registration; the driver keys its
/// `in_use` recursion sets on these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PtId(pub(crate) u32);

/// One step of a hierarchical name: a scope name with an optional
/// index (`u[3].w` has a branch `u` with index 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameBranch {
    pub name: String,
    #[serde(default)]
    pub index: Option<i32>,
}

impl NameBranch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    pub fn indexed(name: impl Into<String>, index: i32) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }
}

/// The read-only forest the elaborator works from: every module and UDP
/// definition of a design, plus the file table regions point into.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PtSource {
    files: Vec<String>,
    modules: Vec<PtModule>,
    udps: Vec<PtUdp>,
    #[serde(skip)]
    module_index: AHashMap<String, usize>,
    #[serde(skip)]
    udp_index: AHashMap<String, usize>,
    #[serde(skip)]
    next_id: u32,
}

impl PtSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file name and returns its id for building regions.
    pub fn add_file(&mut self, name: impl Into<String>) -> FileId {
        let id = FileId::new(self.files.len());
        self.files.push(name.into());
        id
    }

    pub fn file_name(&self, id: FileId) -> &str {
        self.files.get(id.index()).map_or("<unknown>", String::as_str)
    }

    /// Registers a module definition. Ids are assigned to the module
    /// and to every task/function definition inside it; after this call
    /// the module is frozen.
    pub fn add_module(&mut self, mut module: PtModule) {
        module.id = self.fresh_id();
        let mut items = module.items.iter_mut().collect::<Vec<_>>();
        while let Some(item) = items.pop() {
            match item {
                PtItem::Task(tf) | PtItem::Function(tf) => tf.id = self.fresh_id(),
                PtItem::Generate { items: sub, .. } => items.extend(sub.iter_mut()),
                PtItem::GenBlock(body) => items.extend(body.items.iter_mut()),
                PtItem::GenIf {
                    then_body, else_body, ..
                } => {
                    items.extend(then_body.items.iter_mut());
                    if let Some(body) = else_body {
                        items.extend(body.items.iter_mut());
                    }
                }
                PtItem::GenCase { items: cases, .. } => {
                    for case in cases {
                        items.extend(case.body.items.iter_mut());
                    }
                }
                PtItem::GenFor { body, .. } => items.extend(body.items.iter_mut()),
                _ => {}
            }
        }
        self.module_index.insert(module.name.clone(), self.modules.len());
        self.modules.push(module);
    }

    pub fn add_udp(&mut self, udp: PtUdp) {
        self.udp_index.insert(udp.name.clone(), self.udps.len());
        self.udps.push(udp);
    }

    /// Rebuilds the name indexes and assigns missing ids. Needed after
    /// deserializing a fixture, where the skip fields come back empty.
    pub fn reindex(&mut self) {
        self.module_index.clear();
        self.udp_index.clear();
        let modules = std::mem::take(&mut self.modules);
        for module in modules {
            self.add_module(module);
        }
        let udps = std::mem::take(&mut self.udps);
        for udp in udps {
            self.add_udp(udp);
        }
    }

    pub fn find_moduledef(&self, name: &str) -> Option<&PtModule> {
        self.module_index.get(name).map(|&i| &self.modules[i])
    }

    pub fn find_udp(&self, name: &str) -> Option<&PtUdp> {
        self.udp_index.get(name).map(|&i| &self.udps[i])
    }

    pub fn modules(&self) -> impl Iterator<Item = &PtModule> {
        self.modules.iter()
    }

    pub fn udps(&self) -> impl Iterator<Item = &PtUdp> {
        self.udps.iter()
    }

    /// Modules no other module instantiates; these seed elaboration.
    ///
    /// When every module is instantiated somewhere (a cycle), the first
    /// registered module seeds instead, so elaboration still runs and
    /// reports the cycle.
    pub fn top_modules(&self) -> Vec<&PtModule> {
        let mut instantiated = ahash::AHashSet::new();
        for module in &self.modules {
            collect_instantiated(&module.items, &mut instantiated);
        }
        let tops: Vec<&PtModule> = self
            .modules
            .iter()
            .filter(|m| !instantiated.contains(m.name.as_str()))
            .collect();
        if tops.is_empty() {
            self.modules.first().into_iter().collect()
        } else {
            tops
        }
    }

    fn fresh_id(&mut self) -> PtId {
        self.next_id += 1;
        PtId(self.next_id)
    }

    /// Decomposes into raw parts; used when folding several fixture
    /// files into one source.
    pub fn into_parts(self) -> (Vec<String>, Vec<PtModule>, Vec<PtUdp>) {
        (self.files, self.modules, self.udps)
    }
}

fn collect_instantiated<'a>(items: &'a [PtItem], out: &mut ahash::AHashSet<&'a str>) {
    for item in items {
        match item {
            PtItem::MuHeader { def_name, .. } => {
                out.insert(def_name.as_str());
            }
            PtItem::Generate { items: sub, .. } => collect_instantiated(sub, out),
            PtItem::GenBlock(body) => collect_instantiated(&body.items, out),
            PtItem::GenIf {
                then_body, else_body, ..
            } => {
                collect_instantiated(&then_body.items, out);
                if let Some(body) = else_body {
                    collect_instantiated(&body.items, out);
                }
            }
            PtItem::GenCase { items: cases, .. } => {
                for case in cases {
                    collect_instantiated(&case.body.items, out);
                }
            }
            PtItem::GenFor { body, .. } => collect_instantiated(&body.items, out),
            _ => {}
        }
    }
}

/// Shorthand used by builders and tests: a region at line 0 of file 0.
pub fn no_region() -> FileRegion {
    FileRegion::default()
}
