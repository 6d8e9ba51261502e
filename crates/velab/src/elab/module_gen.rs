//! ModuleGen: whole-module-instance elaboration — creation, parameter
//! override binding, ports, and instance connections.
//!
//! A module *definition* is elaborated once per *instance*, because
//! parameter overrides make each instance a different concrete shape:
//! `sub #(8) u0` and `sub #(16) u1` share a parse tree but own
//! distinct scopes, parameters and (differently sized) declarations.
//! Ports are split across the phases the same way everything else is:
//! the inner side (`low_conn`, which internal declaration each port
//! wires to) is built in the module's own phase 2, while the outer
//! side (`high_conn`, what the instantiating module connects) waits
//! for phase 3 so both modules' declarations exist when the two widths
//! are compared.

use crate::{
    elab::{
        Elaborator, ElbEnv, ElbError, ElbResult, ParamCon,
        driver::{Phase1Stub, Phase2Stub, Phase3Stub},
    },
    lang::{Direction, RangeMode},
    pt::{DeclKind, PtExpr, PtExprKind, PtInst, PtItem, PtModule},
    vl::{
        ModuleArrayId, ModuleId, ObjHandle, ScopeId, ScopeKind, VlExprKind, VlModule, VlModuleArray, VlObjRef,
        VlParamAssign, VlPort, VlScope, VlTag,
    },
};

impl<'a> Elaborator<'a> {
    /// Creates the skeleton of a top module and queues its phase-1
    /// body.
    pub(crate) fn phase1_topmodule(&mut self, toplevel: ScopeId, pt_module: &'a PtModule) {
        self.info(
            pt_module.region,
            format!("instantiating top module \"{}\".", pt_module.name),
        );

        let module = self.new_module(toplevel, pt_module, &pt_module.name, None);
        self.db.reg_topmodule(module);
        self.instantiate_attrs(toplevel, VlObjRef::Module(module), true, &pt_module.attrs);

        let full_name = self.db.full_name(self.db.module(module).scope);
        self.info(pt_module.region, format!("module \"{full_name}\" has been created."));

        self.add_phase1stub(Phase1Stub::ModuleItem {
            module,
            pt: pt_module,
            cons: vec![],
        });
    }

    /// Creates a module instance: its scope, its entity, its
    /// (still unconnected) port slots.
    pub(crate) fn new_module(
        &mut self,
        parent: ScopeId,
        pt_module: &'a PtModule,
        inst_name: &str,
        array_index: Option<i32>,
    ) -> ModuleId {
        let module_placeholder = ModuleId::new(self.db.module_len());
        let scope = self.db.add_scope(VlScope {
            parent: Some(parent),
            kind: ScopeKind::Module(module_placeholder),
            name: inst_name.to_owned(),
            region: pt_module.region,
        });
        let ports = pt_module
            .ports
            .iter()
            .map(|p| VlPort {
                region: p.region,
                ext_name: p.ext_name.clone(),
                dir: Direction::NoDirection,
                low_conn: None,
                high_conn: None,
            })
            .collect();
        let module = self.db.add_module(VlModule {
            scope,
            def_name: pt_module.name.clone(),
            name: inst_name.to_owned(),
            region: pt_module.region,
            ports,
            array_index,
        });
        debug_assert_eq!(module, module_placeholder);
        module
    }

    /// Phase 1 of a module instance: parameter ports, parameter and
    /// genvar declarations, override binding, then the item list.
    /// Child instances recurse through here synchronously, which is
    /// what lets the `in_use` mark catch instantiation cycles.
    pub(crate) fn phase1_module_item(&mut self, module: ModuleId, pt_module: &'a PtModule, cons: Vec<ParamCon>) {
        self.module_in_use.insert(pt_module.id);
        let scope = self.db.module(module).scope;

        let has_paramportdecl = !pt_module.paramports.is_empty();
        if has_paramportdecl {
            self.phase1_decl(scope, &pt_module.paramports, false);
        }
        self.phase1_decl(scope, &pt_module.declheads, false);

        self.bind_param_overrides(module, pt_module, &cons, has_paramportdecl);
        if !cons.is_empty() {
            // Defaults that read an overridden parameter settle now,
            // before anything in this module evaluates them.
            self.reeval_params(Some(scope));
        }

        self.phase1_items(scope, &pt_module.items);

        self.add_phase2stub(Phase2Stub::ModuleDecls { module, pt: pt_module });
        self.module_in_use.remove(&pt_module.id);
    }

    /// Binds a parameter-connection list against the module's
    /// parameters, by name or by parameter-port position.
    ///
    /// The binding order for an *ordered* list is the declared
    /// parameter-port order — the `#(parameter ...)` header list when
    /// the module has one, otherwise the body `parameter` declarations
    /// in source order — and more connections than bindable names is
    /// `TooManyParam`. A *named* list resolves each name directly, so
    /// it can also reach body parameters of a module with a header
    /// list; localparams are invisible either way and report `NoParam`
    /// rather than silently binding.
    ///
    /// Override values were evaluated at the instantiation site (in
    /// the parent's scope, with the parent's parameters); here they
    /// are only coerced to the target's declared type and recorded as
    /// `VlParamAssign` entries for the query surface.
    fn bind_param_overrides(
        &mut self,
        module: ModuleId,
        pt_module: &'a PtModule,
        cons: &[ParamCon],
        has_paramportdecl: bool,
    ) {
        if cons.is_empty() {
            return;
        }
        let scope = self.db.module(module).scope;
        let named = cons[0].name.is_some();

        // The names to bind, in connection order.
        let mut names: Vec<String> = vec![];
        if named {
            for con in cons {
                names.push(con.name.clone().unwrap_or_default());
            }
        } else {
            let heads = if has_paramportdecl {
                &pt_module.paramports
            } else {
                &pt_module.declheads
            };
            for head in heads {
                if head.kind == DeclKind::Param {
                    for item in &head.items {
                        names.push(item.name.clone());
                    }
                }
            }
            if names.len() < cons.len() {
                self.put_error(&ElbError::too_many_param(cons[0].region));
                return;
            }
        }

        for (con, name) in cons.iter().zip(&names) {
            let handle = self.db.find_obj(scope, name);
            let Some(ObjHandle::Param(param)) = handle else {
                self.put_error(&ElbError::no_param(con.region, name));
                continue;
            };
            if self.db.param(param).is_local {
                self.put_error(&ElbError::no_param(con.region, name));
                continue;
            }
            let declared = self.db.param(param).declared_type;
            let value = if declared.is_no_type() {
                con.value.clone()
            } else {
                con.value.coerce(declared)
            };
            {
                let p = self.db.param_mut(param);
                p.value = value.clone();
                p.expr_text = con.expr_text.clone();
                p.overridden = true;
            }
            self.db.add_param_assign(VlParamAssign {
                module,
                param,
                value,
                named,
                region: con.region,
            });
        }
    }

    /// Phase 1 of a module-instantiation header whose definition is a
    /// module: create the instance (or array) and recurse into its
    /// body.
    pub(crate) fn phase1_module_instances(&mut self, scope: ScopeId, item: &'a PtItem) {
        let PtItem::MuHeader {
            def_name,
            param_cons,
            insts,
            attrs,
            ..
        } = item
        else {
            unreachable!("phase1_module_instances on a non-header");
        };
        let pt_def = self
            .pt
            .find_moduledef(def_name)
            .expect("caller checked the module catalog");

        let cons = self.instantiate_param_cons(scope, param_cons);

        for inst in insts {
            let Some(inst_name) = inst.name.as_deref() else {
                self.put_error(&ElbError::noname_module(inst.region));
                continue;
            };

            // An instance of a module whose phase 1 is still on the
            // stack is a cycle.
            if self.module_in_use.contains(&pt_def.id) {
                self.put_error(&ElbError::cyclic_dependency(inst.region, def_name));
                continue;
            }

            match &inst.range {
                Some(pt_range) => {
                    let range = match self.instantiate_range(scope, pt_range) {
                        Ok(r) => r,
                        Err(err) => {
                            self.put_error(&err);
                            continue;
                        }
                    };
                    // Elements are stored LSB-relative so an index
                    // resolves through `calc_offset`.
                    let mut modules = Vec::with_capacity(range.size() as usize);
                    for offset in 0..range.size() {
                        let index = range.index(offset);
                        let child = self.new_module(
                            scope,
                            pt_def,
                            &format!("{inst_name}[{index}]"),
                            Some(index),
                        );
                        modules.push(child);
                        self.phase1_module_item(child, pt_def, cons.clone());
                    }
                    let array = self.db.add_module_array(VlModuleArray {
                        parent: scope,
                        def_name: def_name.clone(),
                        name: inst_name.to_owned(),
                        range,
                        modules,
                        region: inst.region,
                    });
                    let handle = ObjHandle::ModuleArray(array);
                    if !self.db.reg_obj(scope, inst_name, handle) {
                        self.put_error(&ElbError::duplicate_name(inst.region, inst_name));
                        continue;
                    }
                    self.db.reg_tag(scope, VlTag::ModuleArray, handle);
                    self.add_phase3stub(Phase3Stub::ModuleArrayPorts { array, pt_inst: inst });
                }
                None => {
                    let child = self.new_module(scope, pt_def, inst_name, None);
                    let handle = ObjHandle::Module(child);
                    if !self.db.reg_obj(scope, inst_name, handle) {
                        self.put_error(&ElbError::duplicate_name(inst.region, inst_name));
                        continue;
                    }
                    self.db.reg_tag(scope, VlTag::Module, handle);
                    self.instantiate_attrs(scope, VlObjRef::Module(child), false, attrs);
                    self.phase1_module_item(child, pt_def, cons.clone());
                    self.add_phase3stub(Phase3Stub::ModulePorts {
                        module: child,
                        pt_inst: inst,
                    });
                }
            }
        }
    }

    /// Phase 2 of a module: declarations, IO reconciliation, port
    /// internals. Every parameter feeding a range here is final.
    pub(crate) fn phase2_module_item(&mut self, module: ModuleId, pt_module: &'a PtModule) {
        let scope = self.db.module(module).scope;
        self.instantiate_decl(scope, &pt_module.declheads);
        self.instantiate_iodecl(scope, &pt_module.ioheads, None, pt_module.default_nettype);
        self.instantiate_port(module, pt_module);
    }

    /// Builds every port's inner connection and direction.
    fn instantiate_port(&mut self, module: ModuleId, pt_module: &'a PtModule) {
        let scope = self.db.module(module).scope;
        for (index, pt_port) in pt_module.ports.iter().enumerate() {
            let mut dir = Direction::NoDirection;
            let low_conn = match pt_port.refs.len() {
                0 => None,
                1 => {
                    dir = pt_port.dirs.first().copied().unwrap_or(Direction::NoDirection);
                    match self.instantiate_portref(scope, &pt_port.refs[0]) {
                        Ok(expr) => Some(expr),
                        Err(err) => {
                            self.put_error(&err);
                            None
                        }
                    }
                }
                n => {
                    // A concatenated port: directions mix into MixedIO.
                    let mut parts = Vec::with_capacity(n);
                    let mut elems = Vec::with_capacity(n);
                    let mut failed = false;
                    for (i, pt_ref) in pt_port.refs.iter().enumerate() {
                        match self.instantiate_portref(scope, pt_ref) {
                            Ok(expr) => {
                                parts.push(expr);
                                elems.push(expr);
                                let dir1 = pt_port.dirs.get(i).copied().unwrap_or(Direction::NoDirection);
                                if dir == Direction::NoDirection {
                                    dir = dir1;
                                } else if dir != dir1 {
                                    dir = Direction::MixedIO;
                                }
                            }
                            Err(err) => {
                                self.put_error(&err);
                                failed = true;
                                break;
                            }
                        }
                    }
                    if failed {
                        None
                    } else {
                        elems.reverse();
                        let width: u32 = parts.iter().map(|&p| self.db.expr(p).width()).sum();
                        Some(self.new_expr(
                            pt_port.region,
                            crate::vtype::VlValueType::new(false, true, width),
                            VlExprKind::Lhs { parts, elems },
                        ))
                    }
                }
            };
            let port = &mut self.db.module_mut(module).ports[index];
            port.dir = dir;
            port.low_conn = low_conn;
        }
    }

    /// One port reference: a declared name with an optional constant
    /// bit- or part-select. Out-of-range static selects warn but do not
    /// fail.
    fn instantiate_portref(&mut self, scope: ScopeId, pt_expr: &'a PtExpr) -> ElbResult<crate::vl::ExprId> {
        let PtExprKind::Primary {
            name,
            indices,
            range_mode,
            left,
            right,
            ..
        } = &pt_expr.kind
        else {
            return Err(ElbError::illegal_port(pt_expr.region, &pt_expr.decompile()));
        };

        let Some(handle) = self.db.find_obj(scope, name) else {
            return Err(ElbError::not_found(pt_expr.region, name));
        };
        let decl = match handle {
            ObjHandle::Decl(id) => id,
            ObjHandle::DeclArray(_) => return Err(ElbError::port_array(pt_expr.region, name)),
            _ => return Err(ElbError::illegal_port(pt_expr.region, name)),
        };

        let vtype = self.db.decl(decl).value_type();
        let primary = self.new_expr(pt_expr.region, vtype, VlExprKind::Primary(crate::vl::PrimaryObj::Decl(decl)));

        if let Some(index) = indices.first() {
            let index_val = self.evaluate_int(scope, index)?;
            if self.db.decl(decl).calc_bit_offset(index_val).is_none() {
                self.warning(index.region, "Index is out of range.");
            }
            return Ok(self.new_expr(
                pt_expr.region,
                crate::vtype::VlValueType::new(false, true, 1),
                VlExprKind::BitSelect {
                    base: primary,
                    index: None,
                    const_index: Some(index_val),
                },
            ));
        }
        if *range_mode == RangeMode::Const
            && let (Some(pt_left), Some(pt_right)) = (left.as_deref(), right.as_deref())
        {
            let (left_val, right_val) = self.evaluate_range(scope, pt_left, pt_right)?;
            if self.db.decl(decl).calc_bit_offset(left_val).is_none() {
                self.warning(pt_left.region, "Left index is out of range.");
            }
            if self.db.decl(decl).calc_bit_offset(right_val).is_none() {
                self.warning(pt_right.region, "Right index is out of range.");
            }
            let width = left_val.abs_diff(right_val) + 1;
            return Ok(self.new_expr(
                pt_expr.region,
                crate::vtype::VlValueType::new(false, true, width),
                VlExprKind::PartSelect {
                    base: primary,
                    left: left_val,
                    right: right_val,
                },
            ));
        }
        Ok(primary)
    }

    /// Phase 3: binds an instance's port connections (the high side).
    pub(crate) fn phase3_module_ports(&mut self, module: ModuleId, pt_inst: &'a PtInst) {
        let parent = self
            .db
            .scope(self.db.module(module).scope)
            .parent
            .expect("instances always have a parent scope");
        if let Err(err) = self.connect_ports(parent, module, pt_inst, false) {
            self.put_error(&err);
        }
    }

    /// Phase 3: binds port connections for every element of a module
    /// array; each element sees the same connection expressions, with
    /// size mismatches downgraded to warnings.
    pub(crate) fn phase3_modulearray_ports(&mut self, array: ModuleArrayId, pt_inst: &'a PtInst) {
        let parent = self.db.module_array(array).parent;
        let modules = self.db.module_array(array).modules.clone();
        for module in modules {
            if let Err(err) = self.connect_ports(parent, module, pt_inst, true) {
                self.put_error(&err);
                break;
            }
        }
    }

    /// Binds one instance's connection list to one module's ports.
    ///
    /// Connections are positional unless the first carries a name;
    /// named connections resolve against the ports' external names.
    /// An empty slot (`.clk()`, or a skipped position) is a legal
    /// unconnected port, not an error. Input connections elaborate as
    /// plain expressions sized to the port's inner width; output and
    /// inout connections are assignment targets and go through the LHS
    /// path, where an undeclared name may become an implicit net in
    /// the *parent*.
    ///
    /// `lenient` is set for module-array elements, where a width
    /// mismatch is expected usage (the language lets one connection
    /// feed every element) and is reported as a warning instead of
    /// `PortSizeMismatch`.
    fn connect_ports(&mut self, parent: ScopeId, module: ModuleId, pt_inst: &'a PtInst, lenient: bool) -> ElbResult<()> {
        let port_count = self.db.module(module).ports.len();
        let named = pt_inst.ports.first().is_some_and(|c| c.name.is_some());

        if !named && pt_inst.ports.len() > port_count {
            return Err(ElbError::too_many_items_in_port_list(pt_inst.region));
        }

        for (pos, con) in pt_inst.ports.iter().enumerate() {
            let index = match &con.name {
                Some(port_name) => {
                    let module_ref = self.db.module(module);
                    match module_ref
                        .ports
                        .iter()
                        .position(|p| p.ext_name.as_deref() == Some(port_name.as_str()))
                    {
                        Some(i) => i,
                        None => return Err(ElbError::illegal_port_name(con.region, port_name)),
                    }
                }
                None => pos,
            };

            let Some(expr) = &con.expr else {
                // An unconnected port is not an error.
                continue;
            };

            let dir = self.db.module(module).ports[index].dir;
            let env = match dir {
                Direction::Input => ElbEnv::new(),
                _ => ElbEnv::net_lhs(),
            };
            let high_conn = if dir == Direction::Input {
                self.instantiate_expr(parent, env, expr)?
            } else {
                self.instantiate_lhs(parent, env, expr)?
            };
            if self.db.expr(high_conn).vtype.is_real_type() {
                return Err(ElbError::real_type_in_port_list(con.region));
            }

            // Width agreement between the two sides of the port.
            if let Some(low_conn) = self.db.module(module).ports[index].low_conn {
                let low_width = self.db.expr(low_conn).width();
                let high_width = self.db.expr(high_conn).width();
                if low_width != high_width {
                    if lenient {
                        self.warning(
                            con.region,
                            format!("port #{index} size mismatch ({high_width} vs {low_width})."),
                        );
                    } else {
                        let name = self.db.module(module).def_name.clone();
                        self.put_error(&ElbError::port_size_mismatch(con.region, &name, index));
                        continue;
                    }
                }
                let low_type = self.db.expr(low_conn).effective_type();
                if dir == Direction::Input {
                    self.set_reqsize(high_conn, low_type);
                }
            }

            self.db.module_mut(module).ports[index].high_conn = Some(high_conn);
        }
        Ok(())
    }
}
