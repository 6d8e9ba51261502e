//! ItemGen: elaborates module items — continuous assigns, processes,
//! module/UDP/gate/cell instances and instance arrays, defparams and
//! generate constructs.
//!
//! The item walk is where phase discipline is decided: each item kind
//! either runs now (generate constructs, whose conditions are constant
//! and whose whole point is to shape scopes; instance headers, which
//! must recurse while the cycle marks are live) or queues itself for a
//! later phase (bodies and terminal connections, which may reference
//! declarations that do not exist yet). Defparams take a third path —
//! their own queue, settled between phases 1 and 2, because they
//! mutate parameters that phase 2 will read.
//!
//! Instantiation headers deliberately do not know what they
//! instantiate until looked up: `defname u (...)` may hit a module, a
//! UDP or a library cell, with different legality rules each way (only
//! modules take parameter assignments, only cells take named pin
//! connections). The lookup order — module catalog, then UDP
//! definitions, then cell library — matches the original tool's.

use crate::{
    elab::{Elaborator, ElbEnv, ElbError, ElbResult, ParamCon, driver::Phase3Stub},
    lang::{Direction, PrimType, Strength},
    pt::{GenBody, PtConnection, PtDefParam, PtExpr, PtInst, PtItem},
    region::FileRegion,
    value::VlValue,
    vl::{
        ObjHandle, ParamId, PrimId, PrimaryObj, ScopeId, ScopeKind, UdpDefnId, VlContAssign, VlDefParam, VlExprKind,
        VlObjRef, VlParameter, VlPrimArray, VlPrimTerm, VlPrimitive, VlProcess, VlSpecBlock, VlTag,
    },
    vtype::VlValueType,
};

/// Iteration ceiling for generate-for loops; hitting it means the loop
/// condition never went false.
const GEN_FOR_FUEL: u32 = 1 << 16;

impl<'a> Elaborator<'a> {
    /// Phase 1 over an item list: shape scopes, create instances,
    /// expand generates, queue everything else.
    ///
    /// Processes get a `phase1_stmt` walk before being queued so the
    /// scopes of their named blocks exist early enough for
    /// hierarchical references from elsewhere in the design to land on
    /// them.
    pub(crate) fn phase1_items(&mut self, scope: ScopeId, items: &'a [PtItem]) {
        for item in items {
            match item {
                PtItem::ContAssign { .. } => {
                    self.add_phase3stub(Phase3Stub::Item { scope, pt: item });
                }
                PtItem::Process { body, .. } => {
                    self.phase1_stmt(scope, body);
                    self.add_phase3stub(Phase3Stub::Item { scope, pt: item });
                }
                PtItem::MuHeader { .. } => self.phase1_muheader(scope, item),
                PtItem::GateHeader {
                    region,
                    prim_type,
                    strength,
                    delay,
                    insts,
                    attrs,
                } => {
                    for inst in insts {
                        if let Err(err) =
                            self.phase1_prim_inst(scope, *region, *prim_type, None, None, strength, delay, inst, attrs)
                        {
                            self.put_error(&err);
                        }
                    }
                }
                PtItem::DefParam { items, .. } => {
                    for defparam in items {
                        self.add_defparamstub(scope, defparam);
                    }
                }
                PtItem::Task(tf) => self.phase1_taskfunc(scope, tf, true),
                PtItem::Function(tf) => self.phase1_taskfunc(scope, tf, false),
                PtItem::Generate {
                    declheads, items, ..
                } => {
                    self.phase1_decl(scope, declheads, false);
                    if !declheads.is_empty() {
                        self.add_phase2stub(crate::elab::driver::Phase2Stub::ScopeDecls { scope, declheads });
                    }
                    self.phase1_items(scope, items);
                }
                PtItem::GenBlock(body) => self.phase1_genbody(scope, body),
                PtItem::GenIf {
                    cond,
                    then_body,
                    else_body,
                    ..
                } => match self.evaluate_bool(scope, cond) {
                    Ok(true) => self.phase1_genbody(scope, then_body),
                    Ok(false) => {
                        if let Some(body) = else_body {
                            self.phase1_genbody(scope, body);
                        }
                    }
                    Err(err) => self.put_error(&err),
                },
                PtItem::GenCase { region, expr, items } => {
                    if let Err(err) = self.phase1_gencase(scope, *region, expr, items) {
                        self.put_error(&err);
                    }
                }
                PtItem::GenFor {
                    region,
                    genvar,
                    init_expr,
                    cond,
                    next_expr,
                    body,
                } => {
                    if let Err(err) = self.phase1_genfor(scope, *region, genvar, init_expr, cond, next_expr, body) {
                        self.put_error(&err);
                    }
                }
                PtItem::Specify { region } => {
                    // Recorded as an opaque block; path delays and
                    // timing checks are not elaborated.
                    self.db.add_spec_block(VlSpecBlock {
                        scope,
                        region: *region,
                    });
                }
            }
        }
    }

    /// A generate block: a fresh sub-scope holding the body's
    /// declarations and items. Unnamed arms of gen-if/case elaborate
    /// directly into the parent.
    fn phase1_genbody(&mut self, scope: ScopeId, body: &'a GenBody) {
        let target = match &body.name {
            Some(name) => {
                let block = self.new_scope(scope, ScopeKind::GenBlock, name, body.region);
                if !self.db.reg_obj(scope, name, ObjHandle::Scope(block)) {
                    self.put_error(&ElbError::duplicate_name(body.region, name));
                }
                block
            }
            None => scope,
        };
        self.phase1_decl(target, &body.declheads, false);
        if !body.declheads.is_empty() {
            self.add_phase2stub(crate::elab::driver::Phase2Stub::ScopeDecls {
                scope: target,
                declheads: &body.declheads,
            });
        }
        self.phase1_items(target, &body.items);
    }

    /// gen-case: the selector and every label are constants; exactly
    /// one label across all arms may match.
    fn phase1_gencase(
        &mut self,
        scope: ScopeId,
        region: FileRegion,
        pt_expr: &'a PtExpr,
        items: &'a [crate::pt::PtGenCaseItem],
    ) -> ElbResult<()> {
        let selector = self.evaluate_expr(scope, pt_expr)?;
        let mut matched: Option<&'a GenBody> = None;
        let mut default_body: Option<&'a GenBody> = None;
        for item in items {
            if item.labels.is_empty() {
                default_body = Some(&item.body);
                continue;
            }
            for label in &item.labels {
                let value = self.evaluate_expr(scope, label)?;
                if selector.case_eq(&value).to_bool() {
                    if matched.is_some() {
                        return Err(ElbError::duplicate_gencase_labels(region));
                    }
                    matched = Some(&item.body);
                }
            }
        }
        if let Some(body) = matched.or(default_body) {
            self.phase1_genbody(scope, body);
        }
        Ok(())
    }

    /// gen-for: expand the loop at elaboration time, one indexed child
    /// scope per iteration.
    ///
    /// The loop itself drives the genvar's single mutable value, but
    /// each iteration scope gets a hidden localparam *shadowing* the
    /// genvar with that iteration's value. The shadow is what keeps
    /// `wire [i:0] w;` honest: the wire's range is evaluated in
    /// phase 2, long after the loop finished and the genvar holds its
    /// final value, and the upward name search finds the frozen shadow
    /// before it can reach the stale genvar.
    ///
    /// The `in_use` flag on the genvar rejects a nested generate-for
    /// reusing the variable of an enclosing one; it is set strictly
    /// around the expansion and cleared on every exit path, including
    /// errors.
    #[expect(clippy::too_many_arguments, reason = "the loop header arrives pre-destructured")]
    fn phase1_genfor(
        &mut self,
        scope: ScopeId,
        region: FileRegion,
        genvar_name: &str,
        init_expr: &'a PtExpr,
        cond: &'a PtExpr,
        next_expr: &'a PtExpr,
        body: &'a GenBody,
    ) -> ElbResult<()> {
        let Some((_, handle)) = self.db.find_obj_up(scope, genvar_name) else {
            return Err(ElbError::genvar_not_found(region, genvar_name));
        };
        let ObjHandle::Genvar(genvar) = handle else {
            return Err(ElbError::not_a_genvar(region, genvar_name));
        };
        if self.db.genvar(genvar).in_use {
            return Err(ElbError::genvar_in_use(region, genvar_name));
        }
        let Some(block_name) = body.name.as_deref() else {
            return Err(ElbError::eval_error(region, "generate-for requires a named block."));
        };

        let init = self.evaluate_int(scope, init_expr)?;
        if init < 0 {
            return Err(ElbError::genvar_negative(region, genvar_name));
        }

        self.db.genvar_mut(genvar).in_use = true;
        self.db.genvar_mut(genvar).value = init;

        let gf_root = self.db.add_gf_root(crate::vl::GfRoot {
            parent: scope,
            name: block_name.to_owned(),
            iter_scopes: vec![],
            region: body.region,
        });
        if !self.db.reg_obj(scope, block_name, ObjHandle::GfRoot(gf_root)) {
            self.db.genvar_mut(genvar).in_use = false;
            return Err(ElbError::duplicate_name(body.region, block_name));
        }

        let mut fuel = GEN_FOR_FUEL;
        let result = loop {
            match self.evaluate_bool(scope, cond) {
                Err(err) => break Err(err),
                Ok(false) => break Ok(()),
                Ok(true) => {}
            }
            let value = self.db.genvar(genvar).value;
            if value < 0 {
                break Err(ElbError::genvar_negative(region, genvar_name));
            }

            let iter_name = format!("{block_name}[{value}]");
            let iter_scope = self.new_scope(scope, ScopeKind::GenIter(value), &iter_name, body.region);
            self.db.gf_root_mut(gf_root).iter_scopes.push((value, iter_scope));

            // Freeze the loop value inside the iteration scope: a
            // hidden localparam shadows the genvar, so declarations
            // expanded later still see this iteration's value.
            let frozen = self.db.add_param(VlParameter {
                scope: iter_scope,
                name: genvar_name.to_owned(),
                is_local: true,
                declared_type: VlValueType::int_type(),
                value: VlValue::Int(value),
                expr_text: value.to_string(),
                overridden: false,
                region: body.region,
            });
            self.db.reg_obj(iter_scope, genvar_name, ObjHandle::Param(frozen));

            self.phase1_decl(iter_scope, &body.declheads, false);
            if !body.declheads.is_empty() {
                self.add_phase2stub(crate::elab::driver::Phase2Stub::ScopeDecls {
                    scope: iter_scope,
                    declheads: &body.declheads,
                });
            }
            self.phase1_items(iter_scope, &body.items);

            match self.evaluate_int(scope, next_expr) {
                Err(err) => break Err(err),
                Ok(next) => self.db.genvar_mut(genvar).value = next,
            }
            fuel -= 1;
            if fuel == 0 {
                break Err(ElbError::eval_error(region, "generate-for loop did not terminate."));
            }
        };

        self.db.genvar_mut(genvar).in_use = false;
        result
    }

    /// A module/UDP/cell instantiation header; the definition catalog
    /// decides which of the three it is.
    fn phase1_muheader(&mut self, scope: ScopeId, item: &'a PtItem) {
        let PtItem::MuHeader {
            region,
            def_name,
            param_cons,
            strength,
            delay,
            insts,
            attrs,
        } = item
        else {
            unreachable!("phase1_muheader on a non-header");
        };

        if self.pt.find_moduledef(def_name).is_some() {
            self.phase1_module_instances(scope, item);
            return;
        }

        if let Some(udp) = self.db.find_udp_defn(def_name) {
            if !param_cons.is_empty() {
                self.put_error(&ElbError::udp_with_paramassign(*region));
                return;
            }
            for inst in insts {
                if let Err(err) =
                    self.phase1_prim_inst(scope, *region, PrimType::Udp, Some(udp), None, strength, delay, inst, attrs)
                {
                    self.put_error(&err);
                }
            }
            return;
        }

        if let Some(cell_lib) = self.cell_lib
            && cell_lib.find_cell(def_name).is_some()
        {
            if !param_cons.is_empty() {
                self.put_error(&ElbError::cell_with_paramassign(*region));
                return;
            }
            for inst in insts {
                if let Err(err) = self.phase1_prim_inst(
                    scope,
                    *region,
                    PrimType::Cell,
                    None,
                    Some(def_name.as_str()),
                    strength,
                    delay,
                    inst,
                    attrs,
                ) {
                    self.put_error(&err);
                }
            }
            return;
        }

        self.put_error(&ElbError::instance_not_found(*region, def_name));
    }

    /// Evaluates the parameter-connection list of an instantiation
    /// header in the instantiating scope.
    pub(crate) fn instantiate_param_cons(&mut self, scope: ScopeId, param_cons: &'a [PtConnection]) -> Vec<ParamCon> {
        let mut cons = Vec::with_capacity(param_cons.len());
        for con in param_cons {
            let (value, expr_text) = match &con.expr {
                Some(expr) => {
                    let value = match self.evaluate_expr(scope, expr) {
                        Ok(v) => v,
                        Err(err) => {
                            self.put_error(&err);
                            VlValue::Error
                        }
                    };
                    (value, expr.decompile())
                }
                None => (VlValue::Error, String::new()),
            };
            cons.push(ParamCon {
                region: con.region,
                name: con.name.clone(),
                value,
                expr_text,
            });
        }
        cons
    }

    /// One gate/UDP/cell instance (or instance array).
    #[expect(clippy::too_many_arguments, reason = "primitive headers carry many independent facts")]
    fn phase1_prim_inst(
        &mut self,
        scope: ScopeId,
        _region: FileRegion,
        prim_type: PrimType,
        udp: Option<UdpDefnId>,
        cell_name: Option<&str>,
        strength: &'a Option<crate::pt::PtStrength>,
        delay: &'a Option<crate::pt::PtDelay>,
        inst: &'a PtInst,
        attrs: &'a [crate::pt::PtAttrInst],
    ) -> ElbResult<()> {
        // Arity against the port profile (or the UDP's declared port
        // count).
        let nterm = inst.ports.len() as u32;
        let profile = prim_type.port_profile();
        let arity_ok = match udp {
            Some(udp) => nterm == self.db.udp_defn(udp).port_num,
            None => nterm >= profile.min && nterm <= profile.max,
        };
        if !arity_ok {
            return Err(ElbError::udp_port_num_mismatch(inst.region));
        }
        if udp.is_some() && inst.ports.iter().any(|p| p.name.is_some()) {
            return Err(ElbError::named_port_in_udp_instance(inst.region));
        }

        let strength = strength.map(|s| (s.drive0, s.drive1));
        let delay = match delay {
            Some(pt_delay) => Some(self.instantiate_delay(scope, pt_delay)?),
            None => None,
        };

        let terminals: Vec<VlPrimTerm> = (0..nterm)
            .map(|i| VlPrimTerm {
                dir: profile.terminal_dir(i, nterm),
                expr: None,
            })
            .collect();

        match &inst.range {
            Some(pt_range) => {
                let range = self.instantiate_range(scope, pt_range)?;
                let mut prims = Vec::with_capacity(range.size() as usize);
                for offset in 0..range.size() {
                    let index = range.index(offset);
                    let prim = self.db.add_prim(VlPrimitive {
                        scope,
                        name: inst.name.as_ref().map(|n| format!("{n}[{index}]")),
                        prim_type,
                        udp,
                        cell_name: cell_name.map(str::to_owned),
                        strength,
                        delay: delay.clone(),
                        terminals: terminals.clone(),
                        region: inst.region,
                    });
                    prims.push(prim);
                }
                let array = self.db.add_prim_array(VlPrimArray {
                    scope,
                    name: inst.name.clone(),
                    prim_type,
                    range,
                    prims,
                    region: inst.region,
                });
                let handle = ObjHandle::PrimArray(array);
                if let Some(name) = &inst.name
                    && !self.db.reg_obj(scope, name, handle)
                {
                    return Err(ElbError::duplicate_name(inst.region, name));
                }
                self.db.reg_tag(scope, VlTag::PrimArray, handle);
                self.add_phase3stub(Phase3Stub::PrimArrayTerminals { array, pt_inst: inst });
            }
            None => {
                let prim = self.db.add_prim(VlPrimitive {
                    scope,
                    name: inst.name.clone(),
                    prim_type,
                    udp,
                    cell_name: cell_name.map(str::to_owned),
                    strength,
                    delay,
                    terminals,
                    region: inst.region,
                });
                let handle = ObjHandle::Prim(prim);
                if let Some(name) = &inst.name
                    && !self.db.reg_obj(scope, name, handle)
                {
                    return Err(ElbError::duplicate_name(inst.region, name));
                }
                self.db.reg_tag(scope, VlTag::Primitive, handle);
                self.instantiate_attrs(scope, VlObjRef::Prim(prim), false, attrs);
                self.add_phase3stub(Phase3Stub::PrimTerminals { prim, pt_inst: inst });
            }
        }
        Ok(())
    }

    /// Phase 3 for a queued item: continuous assigns and processes.
    pub(crate) fn phase3_item(&mut self, scope: ScopeId, pt_item: &'a PtItem) {
        match pt_item {
            PtItem::ContAssign {
                strength,
                delay,
                assigns,
                ..
            } => {
                let strength = strength.map(|s| (s.drive0, s.drive1));
                let delay = match delay {
                    Some(pt_delay) => match self.instantiate_delay(scope, pt_delay) {
                        Ok(d) => Some(d),
                        Err(err) => {
                            self.put_error(&err);
                            None
                        }
                    },
                    None => None,
                };
                for assign in assigns {
                    match self.instantiate_cont_assign(scope, assign, strength, delay.clone()) {
                        Ok(()) => {}
                        Err(err) => self.put_error(&err),
                    }
                }
            }
            PtItem::Process { kind, body, attrs, .. } => {
                match self.instantiate_stmt(scope, Some(*kind), ElbEnv::new(), body) {
                    Ok(stmt) => {
                        let id = self.db.add_process(VlProcess {
                            scope,
                            kind: *kind,
                            body: stmt,
                            region: pt_item.region(),
                        });
                        self.instantiate_attrs(scope, VlObjRef::Process(id), false, attrs);
                    }
                    Err(err) => self.put_error(&err),
                }
            }
            _ => unreachable!("phase3_item on an unexpected item"),
        }
    }

    fn instantiate_cont_assign(
        &mut self,
        scope: ScopeId,
        assign: &'a crate::pt::PtContAssign,
        strength: Option<(Strength, Strength)>,
        delay: Option<crate::vl::VlDelay>,
    ) -> ElbResult<()> {
        let lhs = self.instantiate_lhs(scope, ElbEnv::net_lhs(), &assign.lhs)?;
        let lhs_type = self.db.expr(lhs).effective_type();
        let rhs = self.instantiate_rhs(scope, ElbEnv::new(), &assign.rhs, lhs_type)?;
        self.db.add_cont_assign(VlContAssign {
            scope,
            lhs,
            rhs,
            strength,
            delay,
            region: assign.region,
        });
        Ok(())
    }

    /// Phase 3: a net initializer becomes an implicit continuous
    /// assign.
    pub(crate) fn phase3_net_init(&mut self, scope: ScopeId, decl: crate::vl::DeclId, pt_expr: &'a PtExpr) {
        let vtype = self.db.decl(decl).value_type();
        let region = self.db.decl(decl).region;
        let lhs = self.new_expr(region, vtype, VlExprKind::Primary(PrimaryObj::Decl(decl)));
        match self.instantiate_rhs(scope, ElbEnv::new(), pt_expr, vtype) {
            Ok(rhs) => {
                self.db.add_cont_assign(VlContAssign {
                    scope,
                    lhs,
                    rhs,
                    strength: None,
                    delay: None,
                    region,
                });
            }
            Err(err) => self.put_error(&err),
        }
    }

    /// Phase 3: a variable initializer is stored on the declaration.
    pub(crate) fn phase3_decl_init(&mut self, scope: ScopeId, decl: crate::vl::DeclId, pt_expr: &'a PtExpr) {
        let vtype = self.db.decl(decl).value_type();
        match self.instantiate_rhs(scope, ElbEnv::new(), pt_expr, vtype) {
            Ok(rhs) => self.db.decl_mut(decl).init = Some(rhs),
            Err(err) => self.put_error(&err),
        }
    }

    /// Phase 3: terminal connections of a single primitive.
    pub(crate) fn phase3_prim_terminals(&mut self, prim: PrimId, pt_inst: &'a PtInst) {
        if let Err(err) = self.connect_prim_terminals(prim, pt_inst) {
            self.put_error(&err);
        }
    }

    /// Phase 3: terminal connections of every element of a primitive
    /// array; each element sees the same connection expressions.
    pub(crate) fn phase3_primarray_terminals(&mut self, array: crate::vl::PrimArrayId, pt_inst: &'a PtInst) {
        let prims = self.db.prim_array(array).prims.clone();
        for prim in prims {
            if let Err(err) = self.connect_prim_terminals(prim, pt_inst) {
                self.put_error(&err);
                break;
            }
        }
    }

    fn connect_prim_terminals(&mut self, prim: PrimId, pt_inst: &'a PtInst) -> ElbResult<()> {
        let scope = self.db.prim(prim).scope;
        let is_cell = self.db.prim(prim).prim_type == PrimType::Cell;

        for (pos, con) in pt_inst.ports.iter().enumerate() {
            // Cells accept named pin connections; everything else is
            // positional (UDP named connections were rejected in
            // phase 1).
            let term_pos = match (&con.name, is_cell) {
                (Some(pin), true) => {
                    let cell_name = self.db.prim(prim).cell_name.clone().unwrap_or_default();
                    let cell = self
                        .cell_lib
                        .and_then(|lib| lib.find_cell(&cell_name))
                        .ok_or_else(|| ElbError::instance_not_found(con.region, &cell_name))?;
                    cell.pin_pos(pin).ok_or_else(|| ElbError::illegal_pin_name(con.region, pin))?
                }
                (Some(_), false) => {
                    return Err(ElbError::named_port_in_udp_instance(con.region));
                }
                (None, _) => pos,
            };
            if term_pos >= self.db.prim(prim).terminals.len() {
                return Err(ElbError::udp_port_num_mismatch(pt_inst.region));
            }

            let Some(expr) = &con.expr else {
                return Err(ElbError::empty_port_expression(con.region));
            };
            let dir = self.db.prim(prim).terminals[term_pos].dir;
            let expr_id = if dir == Direction::Input {
                self.instantiate_expr(scope, ElbEnv::new(), expr)?
            } else {
                self.instantiate_lhs(scope, ElbEnv::net_lhs(), expr)?
            };
            if self.db.expr(expr_id).vtype.is_real_type() {
                return Err(ElbError::real_type_in_port_list(con.region));
            }
            self.db.prim_mut(prim).terminals[term_pos].expr = Some(expr_id);
        }
        Ok(())
    }

    /// Applies one queued defparam.
    ///
    /// The target path resolves hierarchically from the module the
    /// defparam item was written in. The target must be a parameter
    /// and must not be a localparam — the two failures get distinct
    /// kinds (`NotAParameter` / `IsALocalparam`) because the second is
    /// a deliberate language restriction users trip over, not a typo.
    ///
    /// A path that crosses a module array *without* an index applies to
    /// every element; the language leaves this case underspecified, so
    /// the broad reading is taken and a warning names the array so the
    /// user can add an index if they meant one element.
    pub(crate) fn apply_defparam(&mut self, scope: ScopeId, pt: &'a PtDefParam) -> ElbResult<()> {
        let targets = self.resolve_defparam_targets(scope, pt)?;
        let value = self.evaluate_expr(scope, &pt.rhs)?;
        for target in targets {
            let param = self.db.param(target);
            if param.is_local {
                return Err(ElbError::is_a_localparam(pt.region, &pt.name));
            }
            let declared = param.declared_type;
            let coerced = if declared.is_no_type() {
                value.clone()
            } else {
                value.coerce(declared)
            };
            let p = self.db.param_mut(target);
            p.value = coerced.clone();
            p.expr_text = pt.rhs.decompile();
            p.overridden = true;
            self.db.add_defparam(VlDefParam {
                scope,
                target,
                value: coerced,
                region: pt.region,
            });
        }
        Ok(())
    }

    fn resolve_defparam_targets(&mut self, scope: ScopeId, pt: &'a PtDefParam) -> ElbResult<Vec<ParamId>> {
        let mut scopes = vec![scope];
        for (i, branch) in pt.branches.iter().enumerate() {
            let mut next = vec![];
            for &current in &scopes {
                // The head branch searches upward; later branches only
                // descend.
                let handle = if i == 0 {
                    match self.db.find_obj_up(current, &branch.name) {
                        Some((_, h)) => Some(h),
                        None => self
                            .db
                            .toplevel()
                            .and_then(|top| self.db.find_obj(top, &branch.name)),
                    }
                } else {
                    self.db.find_obj(current, &branch.name)
                };
                let Some(handle) = handle else {
                    return Err(ElbError::not_found(pt.region, &branch.name));
                };
                match (handle, branch.index) {
                    (ObjHandle::ModuleArray(id), None) => {
                        // An unindexed array path targets every
                        // element.
                        self.warning(
                            pt.region,
                            format!(
                                "defparam crosses instance array \"{}\"; applied to every element.",
                                branch.name
                            ),
                        );
                        for &module in &self.db.module_array(id).modules {
                            next.push(self.db.module(module).scope);
                        }
                    }
                    (ObjHandle::ModuleArray(id), Some(index)) => {
                        let array = self.db.module_array(id);
                        let offset = array
                            .range
                            .calc_offset(index)
                            .ok_or_else(|| ElbError::not_found(pt.region, &branch.name))?;
                        let module = array.modules[offset as usize];
                        next.push(self.db.module(module).scope);
                    }
                    (ObjHandle::GfRoot(id), Some(index)) => {
                        let iter = self
                            .db
                            .gf_root(id)
                            .find_iter(index)
                            .ok_or_else(|| ElbError::not_found(pt.region, &branch.name))?;
                        next.push(iter);
                    }
                    (handle, None) => {
                        let target = self
                            .db
                            .handle_scope(handle)
                            .ok_or_else(|| ElbError::not_found(pt.region, &branch.name))?;
                        next.push(target);
                    }
                    (_, Some(_)) => {
                        return Err(ElbError::not_found(pt.region, &branch.name));
                    }
                }
            }
            scopes = next;
        }

        let mut targets = vec![];
        for target_scope in scopes {
            let Some(handle) = self.db.find_obj(target_scope, &pt.name) else {
                return Err(ElbError::not_found(pt.region, &pt.name));
            };
            let Some(param) = handle.as_param() else {
                return Err(ElbError::not_a_parameter_target(pt.region, &pt.name));
            };
            targets.push(param);
        }
        Ok(targets)
    }
}
