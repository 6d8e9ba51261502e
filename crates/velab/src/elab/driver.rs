//! The elaboration driver: phase ordering, deferred work, recursion
//! detection, and diagnostics routing.
//!
//! Elaboration cannot be a single tree walk because the information it
//! needs appears out of source order: a declaration's range may read a
//! parameter that an instantiating module overrides, a continuous
//! assign may reference a net declared further down, an instance's
//! ports only exist once the child module's own declarations have
//! expanded. The driver untangles this with *phases* — every piece of
//! work is classified by what it may depend on, and a piece of phase-k
//! work may only assume that all work of earlier phases is complete:
//!
//! 1. **Phase 1 — scope shaping.** Scopes, parameters, genvars,
//!    generate expansion, instance creation, parameter-override
//!    binding. Runs synchronously down the instance tree (see
//!    `phase1_module_item`) so the `in_use` marks can catch cycles.
//! 2. **Defparam settlement.** Applied after phase 1 and before
//!    phase 2: defparam targets and right sides only need parameters
//!    (all created in phase 1), and applying them here means every
//!    parameter is final before anything reads one for sizing — the
//!    fixed point is reached without ever re-running phase-2 work.
//! 3. **Phase 2 — declarations.** Nets, regs, variables, IO
//!    reconciliation, ports. Every range evaluated here sees frozen
//!    parameter values.
//! 4. **Phase 3 — bodies.** Statements, continuous assigns, primitive
//!    terminals, instance port connections, initializers. Every name
//!    these can mention exists by now.
//!
//! Within a phase, deferral is a plain FIFO of typed stubs; a stub may
//! enqueue more work for its own phase or a later one, never an
//! earlier one. Nothing here is concurrent — the determinism of the
//! output database falls directly out of this single-threaded,
//! phase-ordered walk.

use std::collections::VecDeque;

use ahash::AHashSet;

use crate::{
    clib::CellLibrary,
    diag::{DiagSink, Diagnostic, Severity},
    elab::{ElbError, ParamCon},
    pt::{PtDeclHead, PtDefParam, PtId, PtInst, PtItem, PtModule, PtSource, PtTaskFunc},
    region::FileRegion,
    systf::SystfRegistry,
    value::VlValue,
    vl::{
        ModuleArrayId, ModuleId, PrimArrayId, PrimId, ScopeId, ScopeKind, TaskFuncId, VlDb, VlScope, VlUdpDefn,
    },
};

/// Compile options of the elaborator.
#[derive(Debug, Clone)]
pub struct ElabOptions {
    /// Accept an IO declaration without a range when the inner
    /// declaration has one.
    pub allow_empty_io_range: bool,
}

impl Default for ElabOptions {
    fn default() -> Self {
        Self {
            allow_empty_io_range: true,
        }
    }
}

/// Deferred phase-1 work: shaping the scope tree of one module
/// instance.
///
/// Only *top* modules go through this queue. Child instances are
/// elaborated by direct recursion from the instantiating item instead,
/// because cycle detection relies on the `in_use` mark of every module
/// on the current instantiation path still being set when a cyclic
/// instance is encountered — a queued child would run after its
/// parent's mark was already cleared.
pub(crate) enum Phase1Stub<'a> {
    ModuleItem {
        module: ModuleId,
        pt: &'a PtModule,
        /// Parameter overrides captured (and evaluated) at the
        /// instantiation site.
        cons: Vec<ParamCon>,
    },
}

/// Deferred phase-2 work: expanding declarations once every parameter
/// feeding their ranges is frozen.
///
/// One variant per scope shape that owns declarations — module bodies,
/// task/function bodies, and the bare head lists of generate blocks
/// and named statement blocks (whose scopes phase 1 already created).
pub(crate) enum Phase2Stub<'a> {
    ModuleDecls { module: ModuleId, pt: &'a PtModule },
    TaskFuncDecls { tf: TaskFuncId, pt: &'a PtTaskFunc },
    ScopeDecls { scope: ScopeId, declheads: &'a [PtDeclHead] },
}

/// Deferred phase-3 work: bodies and connections.
///
/// Everything here may reference arbitrary declarations, so none of it
/// can run before phase 2 finished for *every* scope — an instance's
/// `ModulePorts` stub, for example, reads the child's elaborated port
/// list while elaborating connection expressions in the parent.
pub(crate) enum Phase3Stub<'a> {
    Item { scope: ScopeId, pt: &'a PtItem },
    TaskFuncBody { tf: TaskFuncId, pt: &'a PtTaskFunc },
    PrimTerminals { prim: PrimId, pt_inst: &'a PtInst },
    PrimArrayTerminals { array: PrimArrayId, pt_inst: &'a PtInst },
    ModulePorts { module: ModuleId, pt_inst: &'a PtInst },
    ModuleArrayPorts { array: ModuleArrayId, pt_inst: &'a PtInst },
    /// A net initializer, expanded into an implicit continuous assign.
    NetInit {
        scope: ScopeId,
        decl: crate::vl::DeclId,
        pt_expr: &'a crate::pt::PtExpr,
    },
    /// A variable initializer, stored on the declaration.
    DeclInit {
        scope: ScopeId,
        decl: crate::vl::DeclId,
        pt_expr: &'a crate::pt::PtExpr,
    },
}

/// A queued defparam, waiting for settlement between phase 1 and
/// phase 2.
pub(crate) struct DefParamStub<'a> {
    pub scope: ScopeId,
    pub pt: &'a PtDefParam,
}

/// The elaboration driver.
///
/// Owns the growing [`VlDb`], the four stub queues, and the `in_use`
/// sets that detect cyclic module instantiation and self-recursive
/// constant functions. The generators are implemented as `impl` blocks
/// on this type, one file per concern: expressions in `expr_gen`,
/// declarations in `decl_gen`, statements in `stmt_gen`, items in
/// `item_gen`, whole modules in `module_gen`, constant evaluation in
/// `eval`.
///
/// # Design Rationale
///
/// All mutable state flows through this one handle — there is no
/// global anywhere in the crate. That is what makes elaboration
/// re-runnable: building a second database from the same parse tree
/// just means constructing a second `Elaborator`, and the two runs
/// cannot observe each other. It is also why the recursion marks live
/// here as id sets rather than as flags on the parse tree: the tree
/// stays genuinely immutable and shareable.
///
/// The `'a` lifetime ties the driver to the parse tree it borrows;
/// stubs hold `&'a` references into that tree, while the produced
/// [`VlDb`] copies out everything it needs (names, regions, values)
/// and therefore outlives the borrow.
pub struct Elaborator<'a> {
    pub(crate) pt: &'a PtSource,
    pub(crate) db: VlDb,
    pub(crate) opts: ElabOptions,
    pub(crate) sink: &'a mut dyn DiagSink,
    pub(crate) cell_lib: Option<&'a dyn CellLibrary>,
    pub(crate) systf: &'a dyn SystfRegistry,

    pub(crate) module_in_use: AHashSet<PtId>,
    pub(crate) func_in_use: AHashSet<PtId>,
    /// Scopes pre-created by the phase-1 statement walk, keyed by the
    /// address of the PT block statement they came from (the PT never
    /// moves once registered).
    pub(crate) stmt_scopes: ahash::AHashMap<usize, ScopeId>,
    /// Every parameter's default expression in creation order, for the
    /// re-evaluation passes that keep `value == eval(effective_rhs)`
    /// once overrides and defparams have landed.
    pub(crate) param_inits: Vec<(crate::vl::ParamId, &'a crate::pt::PtExpr)>,

    phase1: VecDeque<Phase1Stub<'a>>,
    phase2: VecDeque<Phase2Stub<'a>>,
    phase3: VecDeque<Phase3Stub<'a>>,
    defparams: VecDeque<DefParamStub<'a>>,

    error_count: usize,
}

/// Elaborates a whole design into a fresh database.
///
/// This is the crate's single entry point. It never panics on bad
/// input and never aborts early: every failure becomes a diagnostic on
/// `sink` and the offending unit is skipped, so the returned database
/// holds everything that *did* elaborate. Callers that need a pass/fail
/// answer count errors on their sink (the bundled
/// [`CollectSink`](crate::CollectSink) does this).
///
/// # Arguments
/// * `pt` - The design's parse tree. Borrowed read-only for the
///   duration of the call; the returned database does not reference it.
/// * `opts` - Compile options (IO-range leniency and friends).
/// * `cell_lib` - Library for `celldefine` primitives; `None` is fine
///   for designs without library cells (unknown definition names then
///   report `InstanceNotFound`).
/// * `systf` - Registry consulted for `$`-task and `$`-function calls.
/// * `sink` - Receiver for every diagnostic the run produces.
pub fn elaborate(
    pt: &PtSource,
    opts: &ElabOptions,
    cell_lib: Option<&dyn CellLibrary>,
    systf: &dyn SystfRegistry,
    sink: &mut dyn DiagSink,
) -> VlDb {
    let mut elab = Elaborator {
        pt,
        db: VlDb::new(),
        opts: opts.clone(),
        sink,
        cell_lib,
        systf,
        module_in_use: AHashSet::new(),
        func_in_use: AHashSet::new(),
        stmt_scopes: ahash::AHashMap::new(),
        param_inits: vec![],
        phase1: VecDeque::new(),
        phase2: VecDeque::new(),
        phase3: VecDeque::new(),
        defparams: VecDeque::new(),
        error_count: 0,
    };
    elab.run();
    elab.db
}

impl<'a> Elaborator<'a> {
    fn run(&mut self) {
        // The root scope every top module hangs off.
        let toplevel = self.db.add_scope(VlScope {
            parent: None,
            kind: ScopeKind::Toplevel,
            name: String::new(),
            region: FileRegion::default(),
        });
        self.db.set_toplevel(toplevel);

        // UDP definitions are global; register them before any instance
        // can refer to one.
        for pt_udp in self.pt.udps() {
            let table = pt_udp
                .entries
                .iter()
                .map(|e| match e.current {
                    Some(c) => format!("{} : {} : {}", e.inputs, c, e.output),
                    None => format!("{} : {}", e.inputs, e.output),
                })
                .collect();
            let init_val = pt_udp.init.as_ref().map(|expr| {
                if matches!(expr.kind, crate::pt::PtExprKind::Const { .. }) {
                    crate::eval::eval_const(expr).unwrap_or(VlValue::Error)
                } else {
                    VlValue::Error
                }
            });
            let id = self.db.add_udp_defn(VlUdpDefn {
                name: pt_udp.name.clone(),
                port_num: pt_udp.ports.len() as u32,
                is_seq: pt_udp.is_seq,
                init_val,
                table,
                region: pt_udp.region,
            });
            self.db.reg_udp(&pt_udp.name, id);
        }

        for pt_module in self.pt.top_modules() {
            self.phase1_topmodule(toplevel, pt_module);
        }

        // Phase 1: scope shaping, parameter binding. Stubs may enqueue
        // further phase-1 work (child instances), so run to exhaustion.
        while let Some(stub) = self.phase1.pop_front() {
            match stub {
                Phase1Stub::ModuleItem { module, pt, cons } => {
                    self.phase1_module_item(module, pt, cons);
                }
            }
        }

        // Defparam settlement: all parameters exist now, none has been
        // used for sizing yet, so every applied value lands before any
        // size-dependent declaration expands.
        let had_defparams = !self.defparams.is_empty();
        while let Some(stub) = self.defparams.pop_front() {
            if let Err(err) = self.apply_defparam(stub.scope, stub.pt) {
                self.put_error(&err);
            }
        }
        if had_defparams {
            // Parameters whose defaults read a defparam'd parameter
            // settle to their final values here.
            self.reeval_params(None);
        }

        // Phase 2: declarations, IO reconciliation, ports.
        while let Some(stub) = self.phase2.pop_front() {
            match stub {
                Phase2Stub::ModuleDecls { module, pt } => self.phase2_module_item(module, pt),
                Phase2Stub::TaskFuncDecls { tf, pt } => self.phase2_taskfunc(tf, pt),
                Phase2Stub::ScopeDecls { scope, declheads } => self.instantiate_decl(scope, declheads),
            }
        }

        // Phase 3: bodies, terminals, connections.
        while let Some(stub) = self.phase3.pop_front() {
            match stub {
                Phase3Stub::Item { scope, pt } => self.phase3_item(scope, pt),
                Phase3Stub::TaskFuncBody { tf, pt } => self.phase3_taskfunc(tf, pt),
                Phase3Stub::PrimTerminals { prim, pt_inst } => self.phase3_prim_terminals(prim, pt_inst),
                Phase3Stub::PrimArrayTerminals { array, pt_inst } => {
                    self.phase3_primarray_terminals(array, pt_inst);
                }
                Phase3Stub::ModulePorts { module, pt_inst } => self.phase3_module_ports(module, pt_inst),
                Phase3Stub::ModuleArrayPorts { array, pt_inst } => {
                    self.phase3_modulearray_ports(array, pt_inst);
                }
                Phase3Stub::NetInit { scope, decl, pt_expr } => self.phase3_net_init(scope, decl, pt_expr),
                Phase3Stub::DeclInit { scope, decl, pt_expr } => self.phase3_decl_init(scope, decl, pt_expr),
            }
        }
    }

    pub(crate) fn add_phase1stub(&mut self, stub: Phase1Stub<'a>) {
        self.phase1.push_back(stub);
    }

    pub(crate) fn add_phase2stub(&mut self, stub: Phase2Stub<'a>) {
        self.phase2.push_back(stub);
    }

    pub(crate) fn add_phase3stub(&mut self, stub: Phase3Stub<'a>) {
        self.phase3.push_back(stub);
    }

    pub(crate) fn add_defparamstub(&mut self, scope: ScopeId, pt: &'a PtDefParam) {
        self.defparams.push_back(DefParamStub { scope, pt });
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Routes an elaboration error to the sink; the caller then skips
    /// the offending unit and elaboration continues.
    ///
    /// This is the catch half of the propagation policy: generators
    /// fail by returning `Err`, and whichever caller sits at the
    /// smallest unit that can be meaningfully skipped (an item, a
    /// statement, an instance within a header) reports the error here
    /// and moves on. One bad expression therefore never voids its
    /// containing module.
    pub(crate) fn put_error(&mut self, err: &ElbError) {
        self.error_count += 1;
        let diag = Diagnostic {
            severity: Severity::Error,
            path: self.pt.file_name(err.region.file).to_owned(),
            region: err.region,
            code: err.code(),
            message: err.message.clone(),
        };
        self.sink.diag(&diag);
    }

    pub(crate) fn warning(&mut self, region: FileRegion, message: impl Into<String>) {
        let diag = Diagnostic {
            severity: Severity::Warning,
            path: self.pt.file_name(region.file).to_owned(),
            region,
            code: "ELAB",
            message: message.into(),
        };
        self.sink.diag(&diag);
    }

    pub(crate) fn info(&mut self, region: FileRegion, message: impl Into<String>) {
        let diag = Diagnostic {
            severity: Severity::Info,
            path: self.pt.file_name(region.file).to_owned(),
            region,
            code: "ELAB",
            message: message.into(),
        };
        self.sink.diag(&diag);
    }

    /// Translates attribute instances and records them against a VL
    /// object.
    ///
    /// Attribute values are constant expressions evaluated in the
    /// scope the attribute appears in; an attribute written without a
    /// value means `1` per the language rules. Translation happens
    /// once per attachment — the parse-tree nodes are never consulted
    /// again after this, so a PT attribute shared by several objects
    /// (a definition instantiated many times) is evaluated once per
    /// instance, with each instance's parameter values.
    pub(crate) fn instantiate_attrs(
        &mut self,
        scope: ScopeId,
        obj: crate::vl::VlObjRef,
        def_side: bool,
        attrs: &[crate::pt::PtAttrInst],
    ) {
        if attrs.is_empty() {
            return;
        }
        let mut list = vec![];
        for inst in attrs {
            for spec in &inst.specs {
                let value = match &spec.expr {
                    Some(expr) => match self.evaluate_expr(scope, expr) {
                        Ok(v) => v,
                        Err(err) => {
                            self.put_error(&err);
                            VlValue::Error
                        }
                    },
                    None => VlValue::Int(1),
                };
                list.push(crate::vl::VlAttribute {
                    name: spec.name.clone(),
                    value,
                    def_side,
                    region: spec.region,
                });
            }
        }
        self.db.attrs.reg_attr(obj, def_side, list);
    }

    /// Creates a scope and files it in the internal-scope tag list of
    /// its parent.
    ///
    /// Claiming the scope's *name* in the parent's dictionary is left
    /// to the caller, because not every scope is nameable: anonymous
    /// blocks and generate-for iterations get scopes for diagnostics
    /// and ownership but must not shadow anything, while module scopes
    /// are registered through their module handle instead.
    pub(crate) fn new_scope(
        &mut self,
        parent: ScopeId,
        kind: ScopeKind,
        name: &str,
        region: FileRegion,
    ) -> ScopeId {
        let scope = self.db.add_scope(VlScope {
            parent: Some(parent),
            kind,
            name: name.to_owned(),
            region,
        });
        self.db
            .reg_tag(parent, crate::vl::VlTag::InternalScope, crate::vl::ObjHandle::Scope(scope));
        scope
    }
}
