//! StmtGen: elaborates task/function definitions and statement bodies.
//!
//! Statements elaborate in phase 3, but their *scopes* cannot wait
//! that long: a hierarchical name like `top.u0.blk.tmp` must resolve
//! into a named block even though the block's body has not been built
//! yet. So statement handling is split — `phase1_stmt` walks the
//! statement tree early and creates every block scope (anonymous ones
//! included, so diagnostics can name them), remembering which scope
//! belongs to which parse-tree block by node address; `instantiate_stmt`
//! later recovers the same scope instead of creating a second one. The
//! address map is sound because the parse tree is immutable and never
//! moves while the elaborator holds its borrow.
//!
//! Task/function definitions live here too, since a body is most of
//! what they are: phase 1 creates the entity, its scope and its return
//! type; phase 2 expands formals, locals and the function's self-named
//! result variable; phase 3 builds the body statement.

use crate::{
    elab::{
        Elaborator, ElbEnv, ElbError, ElbResult,
        driver::{Phase2Stub, Phase3Stub},
    },
    lang::{NetType, ProcessKind, VarType},
    pt::{PtControl, PtStmt, PtStmtKind, PtTaskFunc},
    vl::{
        DeclObjKind, ExprId, ObjHandle, ScopeId, ScopeKind, StmtId, TaskFuncId, VlControl, VlDecl, VlStmt, VlStmtKind,
        VlTag, VlTaskFunc,
    },
    vtype::VlValueType,
};

impl<'a> Elaborator<'a> {
    /// Phase 1 for a task or function definition: create its scope and
    /// entity, defer declarations and body.
    pub(crate) fn phase1_taskfunc(&mut self, scope: ScopeId, pt: &'a PtTaskFunc, is_task: bool) {
        // The entity is allocated before its scope so the scope kind
        // can carry the id; the scope link lands right after.
        let tf = self.db.add_taskfunc(VlTaskFunc {
            scope,
            name: pt.name.clone(),
            is_task,
            automatic: pt.automatic,
            ret_type: VlValueType::no_type(),
            ios: vec![],
            result_var: None,
            body: None,
            is_constant_function: false,
            region: pt.region,
        });
        let kind = if is_task { ScopeKind::Task(tf) } else { ScopeKind::Function(tf) };
        let tf_scope = self.new_scope(scope, kind, &pt.name, pt.region);
        self.db.taskfunc_mut(tf).scope = tf_scope;
        if !is_task {
            let ret_type = self.function_ret_type(tf_scope, pt);
            self.db.taskfunc_mut(tf).ret_type = ret_type;
        }

        let handle = ObjHandle::TaskFunc(tf);
        if !self.db.reg_obj(scope, &pt.name, handle) {
            self.put_error(&ElbError::duplicate_name(pt.region, &pt.name));
            return;
        }
        self.db
            .reg_tag(scope, if is_task { VlTag::Task } else { VlTag::Function }, handle);
        self.instantiate_attrs(scope, crate::vl::VlObjRef::TaskFunc(tf), true, &pt.attrs);

        // Parameters and genvars declared inside the task/function.
        self.phase1_decl(tf_scope, &pt.declheads, false);
        self.phase1_stmt(tf_scope, &pt.body);

        self.add_phase2stub(Phase2Stub::TaskFuncDecls { tf, pt });
        self.add_phase3stub(Phase3Stub::TaskFuncBody { tf, pt });
    }

    fn function_ret_type(&mut self, tf_scope: ScopeId, pt: &'a PtTaskFunc) -> VlValueType {
        match pt.var_type {
            VarType::Integer => VlValueType::int_type(),
            VarType::Real | VarType::Realtime => VlValueType::real_type(),
            VarType::Time => VlValueType::time_type(),
            VarType::None => match &pt.range {
                Some(range) => match self.instantiate_range(tf_scope, range) {
                    Ok(r) => VlValueType::new(pt.signed, true, r.size()),
                    Err(err) => {
                        self.put_error(&err);
                        VlValueType::new(pt.signed, false, 1)
                    }
                },
                None => VlValueType::new(pt.signed, false, 1),
            },
        }
    }

    /// Phase 2 for a task or function: formals, local declarations, and
    /// the function's self-named result variable.
    pub(crate) fn phase2_taskfunc(&mut self, tf: TaskFuncId, pt: &'a PtTaskFunc) {
        let scope = self.db.taskfunc(tf).scope;
        let default_nettype = self.scope_default_nettype(scope);
        self.instantiate_iodecl(scope, &pt.ioheads, Some(tf), default_nettype);
        self.instantiate_decl(scope, &pt.declheads);

        if !self.db.taskfunc(tf).is_task {
            let ret_type = self.db.taskfunc(tf).ret_type;
            let (kind, range) = match ret_type {
                VlValueType::Int => (DeclObjKind::Integer, None),
                VlValueType::Real => (DeclObjKind::Real, None),
                VlValueType::Time => (DeclObjKind::Time, None),
                _ => (
                    DeclObjKind::Reg,
                    ret_type
                        .is_sized()
                        .then(|| crate::range::VlRange::new(ret_type.size() as i32 - 1, 0)),
                ),
            };
            let decl = self.db.add_decl(VlDecl {
                scope,
                name: pt.name.clone(),
                kind,
                signed: ret_type.is_signed(),
                range,
                vs_type: crate::lang::VsType::None,
                strength: None,
                delay: None,
                init: None,
                io_dir: None,
                region: pt.region,
            });
            let handle = ObjHandle::Decl(decl);
            self.db.reg_obj(scope, &pt.name, handle);
            self.db.reg_tag(scope, kind.tag(), handle);
            self.db.taskfunc_mut(tf).result_var = Some(decl);
        }
    }

    /// Phase 3 for a task or function: the body statement.
    pub(crate) fn phase3_taskfunc(&mut self, tf: TaskFuncId, pt: &'a PtTaskFunc) {
        let scope = self.db.taskfunc(tf).scope;
        match self.instantiate_stmt(scope, None, ElbEnv::new(), &pt.body) {
            Ok(body) => self.db.taskfunc_mut(tf).body = Some(body),
            Err(err) => self.put_error(&err),
        }
    }

    /// Builds the constant-function rendition of a function definition,
    /// synchronously: scope, formals and result variable, no body
    /// statement (the evaluator interprets the PT body directly).
    ///
    /// Kept out of the scope's name dictionary; the lazily built
    /// constant clone lives only in the constant-function table.
    pub(crate) fn instantiate_constant_function(
        &mut self,
        module_scope: ScopeId,
        pt: &'a PtTaskFunc,
    ) -> ElbResult<TaskFuncId> {
        let tf = self.db.add_taskfunc(VlTaskFunc {
            scope: module_scope,
            name: pt.name.clone(),
            is_task: false,
            automatic: pt.automatic,
            ret_type: VlValueType::no_type(),
            ios: vec![],
            result_var: None,
            body: None,
            is_constant_function: false,
            region: pt.region,
        });
        let tf_scope = self.new_scope(module_scope, ScopeKind::Function(tf), &pt.name, pt.region);
        self.db.taskfunc_mut(tf).scope = tf_scope;
        let ret_type = self.function_ret_type(tf_scope, pt);
        self.db.taskfunc_mut(tf).ret_type = ret_type;

        self.phase1_decl(tf_scope, &pt.declheads, false);
        self.instantiate_iodecl(tf_scope, &pt.ioheads, Some(tf), NetType::Wire);
        self.instantiate_decl(tf_scope, &pt.declheads);
        Ok(tf)
    }

    /// Phase 1 statement walk: pre-creates the scope of every block so
    /// hierarchical names can reach into them before bodies elaborate.
    ///
    /// Only blocks introduce scopes; every other compound statement
    /// just recurses into its children under the current scope. Named
    /// blocks additionally claim their name in the parent and queue
    /// their declaration heads for phase 2, so a block-local `reg`
    /// exists before any phase-3 body (this one's or a hierarchical
    /// referrer's) looks it up.
    pub(crate) fn phase1_stmt(&mut self, scope: ScopeId, pt_stmt: &'a PtStmt) {
        match &pt_stmt.kind {
            PtStmtKind::Block {
                name,
                declheads,
                stmts,
                ..
            } => {
                let block_scope = match name {
                    Some(name) => {
                        let block_scope =
                            self.new_scope(scope, ScopeKind::Block { anonymous: false }, name, pt_stmt.region);
                        if !self.db.reg_obj(scope, name, ObjHandle::Scope(block_scope)) {
                            self.put_error(&ElbError::duplicate_name(pt_stmt.region, name));
                        }
                        block_scope
                    }
                    None => self.new_scope(scope, ScopeKind::Block { anonymous: true }, "", pt_stmt.region),
                };
                self.remember_stmt_scope(pt_stmt, block_scope);
                if !declheads.is_empty() {
                    self.phase1_decl(block_scope, declheads, false);
                    self.add_phase2stub(Phase2Stub::ScopeDecls {
                        scope: block_scope,
                        declheads,
                    });
                }
                for stmt in stmts {
                    self.phase1_stmt(block_scope, stmt);
                }
            }
            PtStmtKind::If {
                then_stmt, else_stmt, ..
            } => {
                self.phase1_stmt(scope, then_stmt);
                if let Some(e) = else_stmt {
                    self.phase1_stmt(scope, e);
                }
            }
            PtStmtKind::Case { items, .. } => {
                for item in items {
                    if let Some(body) = &item.body {
                        self.phase1_stmt(scope, body);
                    }
                }
            }
            PtStmtKind::For { init, next, body, .. } => {
                self.phase1_stmt(scope, init);
                self.phase1_stmt(scope, next);
                self.phase1_stmt(scope, body);
            }
            PtStmtKind::While { body, .. }
            | PtStmtKind::Repeat { body, .. }
            | PtStmtKind::Wait { body, .. }
            | PtStmtKind::Forever { body }
            | PtStmtKind::Ctrl { body, .. } => self.phase1_stmt(scope, body),
            _ => {}
        }
    }

    /// Elaborates one statement.
    ///
    /// # Arguments
    /// * `scope` - The scope the statement's names resolve in; block
    ///   statements switch to their own pre-created scope for their
    ///   children.
    /// * `process` - The kind of the enclosing process, stamped onto
    ///   every built node so consumers can tell `initial` bodies from
    ///   `always` bodies without re-walking; `None` inside
    ///   task/function bodies, which belong to whichever process calls
    ///   them.
    /// * `env` - Expression restrictions in force; assignment targets
    ///   derive their own LHS envs locally, everything else flows
    ///   through.
    ///
    /// Inside blocks, a failing child statement is reported and
    /// dropped rather than propagated, so one bad statement does not
    /// erase its whole block.
    pub(crate) fn instantiate_stmt(
        &mut self,
        scope: ScopeId,
        process: Option<ProcessKind>,
        env: ElbEnv,
        pt_stmt: &'a PtStmt,
    ) -> ElbResult<StmtId> {
        let region = pt_stmt.region;
        let kind = match &pt_stmt.kind {
            PtStmtKind::Null => VlStmtKind::Null,
            PtStmtKind::Block {
                parallel,
                name,
                stmts,
                ..
            } => {
                // The scope was created in phase 1; fall back to a
                // fresh one for blocks phase 1 never saw (constant
                // functions, recovery paths).
                let block_scope = match self.lookup_stmt_scope(pt_stmt) {
                    Some(s) => s,
                    None => self.new_scope(
                        scope,
                        ScopeKind::Block {
                            anonymous: name.is_none(),
                        },
                        name.as_deref().unwrap_or(""),
                        region,
                    ),
                };
                let mut list = Vec::with_capacity(stmts.len());
                for stmt in stmts {
                    match self.instantiate_stmt(block_scope, process, env, stmt) {
                        Ok(id) => list.push(id),
                        Err(err) => self.put_error(&err),
                    }
                }
                VlStmtKind::Block {
                    scope: Some(block_scope),
                    parallel: *parallel,
                    stmts: list,
                }
            }
            PtStmtKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                let cond = self.instantiate_expr(scope, env, cond)?;
                let then_stmt = self.instantiate_stmt(scope, process, env, then_stmt)?;
                let else_stmt = match else_stmt {
                    Some(e) => Some(self.instantiate_stmt(scope, process, env, e)?),
                    None => None,
                };
                VlStmtKind::If {
                    cond,
                    then_stmt,
                    else_stmt,
                }
            }
            PtStmtKind::Case {
                case_type,
                expr,
                items,
            } => return self.instantiate_case(scope, process, env, pt_stmt, *case_type, expr, items),
            PtStmtKind::For { init, cond, next, body } => {
                let cond = self.instantiate_expr(scope, env, cond)?;
                let init = self.instantiate_stmt(scope, process, env, init)?;
                let next = self.instantiate_stmt(scope, process, env, next)?;
                let body = self.instantiate_stmt(scope, process, env, body)?;
                VlStmtKind::For { init, cond, next, body }
            }
            PtStmtKind::While { cond, body } => {
                let cond = self.instantiate_expr(scope, env, cond)?;
                let body = self.instantiate_stmt(scope, process, env, body)?;
                VlStmtKind::While { cond, body }
            }
            PtStmtKind::Repeat { expr, body } => {
                let expr = self.instantiate_expr(scope, env, expr)?;
                let body = self.instantiate_stmt(scope, process, env, body)?;
                VlStmtKind::Repeat { expr, body }
            }
            PtStmtKind::Wait { cond, body } => {
                let cond = self.instantiate_expr(scope, env, cond)?;
                let body = self.instantiate_stmt(scope, process, env, body)?;
                VlStmtKind::Wait { cond, body }
            }
            PtStmtKind::Forever { body } => {
                let body = self.instantiate_stmt(scope, process, env, body)?;
                VlStmtKind::Forever { body }
            }
            PtStmtKind::Assign { lhs, rhs, control } | PtStmtKind::NbAssign { lhs, rhs, control } => {
                let nonblocking = matches!(pt_stmt.kind, PtStmtKind::NbAssign { .. });
                let lhs_id = self.instantiate_lhs(scope, ElbEnv::lhs(), lhs)?;
                let lhs_type = self.db.expr(lhs_id).effective_type();
                let rhs_id = self.instantiate_rhs(scope, env, rhs, lhs_type)?;
                let control = match control {
                    Some(ctrl) => Some(self.instantiate_control(scope, env, ctrl)?),
                    None => None,
                };
                VlStmtKind::Assign {
                    lhs: lhs_id,
                    rhs: rhs_id,
                    nonblocking,
                    control,
                }
            }
            PtStmtKind::PcAssign { lhs, rhs } => {
                let lhs_id = self.instantiate_lhs(scope, ElbEnv::pca_lhs(), lhs)?;
                let lhs_type = self.db.expr(lhs_id).effective_type();
                let rhs_id = self.instantiate_rhs(scope, env, rhs, lhs_type)?;
                VlStmtKind::PcAssign {
                    lhs: lhs_id,
                    rhs: rhs_id,
                }
            }
            PtStmtKind::Deassign { lhs } => VlStmtKind::Deassign {
                lhs: self.instantiate_lhs(scope, ElbEnv::pca_lhs(), lhs)?,
            },
            PtStmtKind::Force { lhs, rhs } => {
                let lhs_id = self.instantiate_lhs(scope, ElbEnv::force_lhs(), lhs)?;
                let lhs_type = self.db.expr(lhs_id).effective_type();
                let rhs_id = self.instantiate_rhs(scope, env, rhs, lhs_type)?;
                VlStmtKind::Force {
                    lhs: lhs_id,
                    rhs: rhs_id,
                }
            }
            PtStmtKind::Release { lhs } => VlStmtKind::Release {
                lhs: self.instantiate_lhs(scope, ElbEnv::force_lhs(), lhs)?,
            },
            PtStmtKind::Enable { branches, name, args } => {
                return self.instantiate_enable(scope, process, env, pt_stmt, branches, name, args);
            }
            PtStmtKind::SysEnable { name, args } => {
                let Some(systf) = self.systf.find_user_systf(name) else {
                    return Err(ElbError::new(
                        region,
                        crate::elab::ElbErrorKind::NoSuchSysFunction,
                        format!("{name}: no such system task."),
                    ));
                };
                if let Some(arg_num) = systf.arg_num
                    && args.len() != arg_num as usize
                {
                    return Err(ElbError::new(
                        region,
                        crate::elab::ElbErrorKind::NArgMismatch,
                        format!("{name}: number of arguments mismatch."),
                    ));
                }
                let mut list = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        Some(pt_arg) => list.push(Some(self.instantiate_arg(scope, env, pt_arg)?)),
                        None => list.push(None),
                    }
                }
                VlStmtKind::SysEnable {
                    name: name.clone(),
                    args: list,
                }
            }
            PtStmtKind::Disable { branches, name } => {
                let handle = if branches.is_empty() {
                    self.db.find_obj_up(scope, name).map(|(_, h)| h)
                } else {
                    self.db.find_hierarchical(scope, branches, name)
                };
                let Some(handle) = handle else {
                    return Err(ElbError::not_found(region, name));
                };
                let Some(target) = self.db.handle_scope(handle) else {
                    return Err(ElbError::new(
                        region,
                        crate::elab::ElbErrorKind::IllegalObject,
                        format!("{name}: not a block or task."),
                    ));
                };
                VlStmtKind::Disable { target }
            }
            PtStmtKind::EventTrigger { branches, name } => {
                let event = self.instantiate_namedevent(scope, branches, name, region)?;
                VlStmtKind::EventTrigger { event }
            }
            PtStmtKind::Ctrl { control, body } => {
                let control = self.instantiate_control(scope, env, control)?;
                let body = self.instantiate_stmt(scope, process, env, body)?;
                VlStmtKind::Ctrl { control, body }
            }
        };

        Ok(self.db.add_stmt(VlStmt {
            region,
            process_kind: process,
            kind,
        }))
    }

    /// Case elaboration: default arm moves to the tail, and the
    /// condition plus every label are size-fit to the widest type,
    /// signed only when some operand is signed.
    ///
    /// The unification exists because case comparison is effectively a
    /// chain of `===` against each label: comparing at mismatched
    /// widths would zero-extend some operands and sign-extend others
    /// depending on writing order, so one type is computed over the
    /// condition *and* every label first, then pushed into all of them
    /// with `set_reqsize`. Reals are rejected outright — four-state
    /// case equality has no meaning for them. Moving `default` to the
    /// tail (after checking there is at most one) gives consumers the
    /// invariant "labelless arm, if any, is last" for free.
    #[expect(clippy::too_many_arguments, reason = "the case shape arrives pre-destructured")]
    fn instantiate_case(
        &mut self,
        scope: ScopeId,
        process: Option<ProcessKind>,
        env: ElbEnv,
        pt_stmt: &'a PtStmt,
        case_type: crate::lang::CaseType,
        pt_cond: &'a crate::pt::PtExpr,
        pt_items: &'a [crate::pt::PtCaseItemStmt],
    ) -> ElbResult<StmtId> {
        let cond = self.instantiate_expr(scope, env, pt_cond)?;

        // At most one default arm, reordered to the tail.
        let mut ordered: Vec<&crate::pt::PtCaseItemStmt> = vec![];
        let mut default_item = None;
        for item in pt_items {
            if item.labels.is_empty() {
                if default_item.is_some() {
                    return Err(ElbError::new(
                        item.region,
                        crate::elab::ElbErrorKind::EvalError,
                        "multiple default labels in one case statement.",
                    ));
                }
                default_item = Some(item);
            } else {
                ordered.push(item);
            }
        }
        if let Some(item) = default_item {
            ordered.push(item);
        }

        let mut items = Vec::with_capacity(ordered.len());
        let mut label_exprs = vec![];
        for item in ordered {
            let body = match &item.body {
                Some(body) => Some(self.instantiate_stmt(scope, process, env, body)?),
                None => None,
            };
            let mut labels = Vec::with_capacity(item.labels.len());
            for pt_label in &item.labels {
                let label = self.instantiate_expr(scope, env, pt_label)?;
                labels.push(label);
                label_exprs.push(label);
            }
            items.push(crate::vl::VlCaseItem {
                region: item.region,
                labels,
                body,
            });
        }

        // Width unification over the condition and every label.
        let cond_type = self.db.expr(cond).vtype;
        if cond_type.is_real_type() {
            return Err(ElbError::new(
                pt_cond.region,
                crate::elab::ElbErrorKind::IllegalRealType,
                "case expression shall not be real-type.",
            ));
        }
        let mut signed = cond_type.is_signed();
        let mut size = cond_type.size();
        for &label in &label_exprs {
            let label_type = self.db.expr(label).vtype;
            if label_type.is_real_type() {
                return Err(ElbError::new(
                    self.db.expr(label).region,
                    crate::elab::ElbErrorKind::IllegalRealType,
                    "case-item expression shall not be real-type.",
                ));
            }
            signed |= label_type.is_signed();
            size = size.max(label_type.size());
        }
        let unified = VlValueType::new(signed, true, size);
        self.set_reqsize(cond, unified);
        for &label in &label_exprs {
            self.set_reqsize(label, unified);
        }

        Ok(self.db.add_stmt(VlStmt {
            region: pt_stmt.region,
            process_kind: process,
            kind: VlStmtKind::Case {
                case_type,
                cond,
                items,
            },
        }))
    }

    fn instantiate_enable(
        &mut self,
        scope: ScopeId,
        process: Option<ProcessKind>,
        env: ElbEnv,
        pt_stmt: &'a PtStmt,
        branches: &'a [crate::pt::NameBranch],
        name: &str,
        args: &'a [crate::pt::PtExpr],
    ) -> ElbResult<StmtId> {
        let handle = if branches.is_empty() {
            self.db.find_obj_up(scope, name).map(|(_, h)| h)
        } else {
            self.db.find_hierarchical(scope, branches, name)
        };
        let Some(handle) = handle else {
            return Err(ElbError::not_found(pt_stmt.region, name));
        };
        let Some(task) = handle.as_taskfunc() else {
            return Err(ElbError::new(
                pt_stmt.region,
                crate::elab::ElbErrorKind::IllegalObject,
                format!("{name}: not a task."),
            ));
        };
        if !self.db.taskfunc(task).is_task {
            return Err(ElbError::new(
                pt_stmt.region,
                crate::elab::ElbErrorKind::IllegalObject,
                format!("{name}: not a task."),
            ));
        }

        let formals: Vec<(crate::lang::Direction, VlValueType)> = self
            .db
            .taskfunc(task)
            .ios
            .iter()
            .map(|io| (io.dir, self.db.decl(io.decl).value_type()))
            .collect();
        if formals.len() != args.len() {
            return Err(ElbError::new(
                pt_stmt.region,
                crate::elab::ElbErrorKind::NArgMismatch,
                format!("{name}: number of arguments mismatch."),
            ));
        }

        let mut list = Vec::with_capacity(args.len());
        for ((dir, formal_type), arg) in formals.iter().zip(args) {
            // Output and inout actuals are assignment targets.
            let expr = if *dir == crate::lang::Direction::Input {
                let e = self.instantiate_expr(scope, env, arg)?;
                if formal_type.is_bitvector_type() && self.db.expr(e).vtype.is_bitvector_type() {
                    self.set_reqsize(e, *formal_type);
                }
                e
            } else {
                self.instantiate_lhs(scope, ElbEnv::lhs(), arg)?
            };
            list.push(expr);
        }

        Ok(self.db.add_stmt(VlStmt {
            region: pt_stmt.region,
            process_kind: process,
            kind: VlStmtKind::Enable { task, args: list },
        }))
    }

    fn instantiate_control(&mut self, scope: ScopeId, env: ElbEnv, ctrl: &'a PtControl) -> ElbResult<VlControl> {
        match ctrl {
            PtControl::Delay(pt_delay) => Ok(VlControl::Delay(self.instantiate_delay(scope, pt_delay)?)),
            PtControl::Event(events) => Ok(VlControl::Event(self.instantiate_event_list(scope, env, events)?)),
            PtControl::Repeat { expr, events } => {
                let expr = self.instantiate_expr(scope, env, expr)?;
                let events = self.instantiate_event_list(scope, env, events)?;
                Ok(VlControl::Repeat { expr, events })
            }
        }
    }

    fn instantiate_event_list(
        &mut self,
        scope: ScopeId,
        env: ElbEnv,
        events: &'a [crate::pt::PtExpr],
    ) -> ElbResult<Vec<ExprId>> {
        let mut list = Vec::with_capacity(events.len());
        for event in events {
            list.push(self.instantiate_event_expr(scope, env.event(), event)?);
        }
        Ok(list)
    }

    fn remember_stmt_scope(&mut self, pt_stmt: &'a PtStmt, scope: ScopeId) {
        self.stmt_scopes.insert(std::ptr::from_ref(pt_stmt) as usize, scope);
    }

    fn lookup_stmt_scope(&self, pt_stmt: &'a PtStmt) -> Option<ScopeId> {
        self.stmt_scopes.get(&(std::ptr::from_ref(pt_stmt) as usize)).copied()
    }

    /// The `` `default_nettype `` in force for the module enclosing a
    /// scope.
    pub(crate) fn scope_default_nettype(&self, scope: ScopeId) -> NetType {
        self.db
            .parent_module(scope)
            .and_then(|m| self.pt.find_moduledef(&self.db.module(m).def_name))
            .map_or(NetType::Wire, |pt| pt.default_nettype)
    }
}
