//! DeclGen: expands parameter/genvar heads in phase 1 and
//! net/reg/variable/event heads (plus IO reconciliation) in phase 2.
//!
//! The phase split mirrors the dependency structure, not the source
//! grammar: parameters and genvars must exist *before* generate
//! constructs evaluate and overrides bind (phase 1), while everything
//! with a sized range must wait until every parameter that could feed
//! that range is final (phase 2). A single `wire [W-1:0] w;` head
//! therefore passes through this module twice — skipped by
//! `phase1_decl`, expanded by `instantiate_decl` — which is cheaper
//! and simpler than splitting head lists upfront.

use crate::{
    elab::{Elaborator, ElbError, ElbResult, driver::Phase3Stub},
    lang::{AuxType, NetType, VarType},
    pt::{DeclKind, PtDeclHead, PtIoHead, PtRange},
    range::{RangeArray, VlRange},
    value::VlValue,
    vl::{DeclObjKind, ObjHandle, ScopeId, TaskFuncId, VlDecl, VlDeclArray, VlGenvar, VlIoDecl, VlObjRef, VlParameter, VlTag},
    vtype::VlValueType,
};

impl<'a> Elaborator<'a> {
    /// Evaluates a declared `[left:right]` into a range.
    pub(crate) fn instantiate_range(&mut self, scope: ScopeId, pt_range: &PtRange) -> ElbResult<VlRange> {
        let (left, right) = self.evaluate_range(scope, &pt_range.left, &pt_range.right)?;
        Ok(VlRange::with_text(
            left,
            right,
            pt_range.left.decompile(),
            pt_range.right.decompile(),
        ))
    }

    fn instantiate_opt_range(&mut self, scope: ScopeId, pt_range: Option<&PtRange>) -> ElbResult<Option<VlRange>> {
        pt_range.map(|r| self.instantiate_range(scope, r)).transpose()
    }

    /// Phase 1: builds parameters and genvars out of a head list.
    /// Other declaration kinds wait for phase 2.
    ///
    /// `local` forces every parameter of the list to localparam
    /// status regardless of its keyword; `localparam` and `specparam`
    /// heads are local no matter what. Locality matters later twice —
    /// localparams are invisible to parameter-port binding and
    /// rejected as defparam targets.
    pub(crate) fn phase1_decl(&mut self, scope: ScopeId, declheads: &'a [PtDeclHead], local: bool) {
        for head in declheads {
            match head.kind {
                DeclKind::Param | DeclKind::LocalParam | DeclKind::SpecParam => {
                    let is_local = local || head.kind != DeclKind::Param;
                    if let Err(err) = self.instantiate_param_head(scope, head, is_local) {
                        self.put_error(&err);
                    }
                }
                DeclKind::Genvar => {
                    for item in &head.items {
                        let id = self.db.add_genvar(VlGenvar {
                            scope,
                            name: item.name.clone(),
                            value: 0,
                            in_use: false,
                            region: item.region,
                        });
                        let handle = ObjHandle::Genvar(id);
                        if !self.db.reg_obj(scope, &item.name, handle) {
                            self.put_error(&ElbError::duplicate_name(item.region, &item.name));
                            continue;
                        }
                        self.db.reg_tag(scope, VlTag::Genvar, handle);
                    }
                }
                _ => {}
            }
        }
    }

    fn instantiate_param_head(&mut self, scope: ScopeId, head: &'a PtDeclHead, is_local: bool) -> ElbResult<()> {
        let range = self.instantiate_opt_range(scope, head.range.as_ref())?;
        let declared_type = match (&range, head.signed) {
            (Some(r), _) => VlValueType::new(head.signed, true, r.size()),
            (None, true) => VlValueType::new(true, false, 1),
            (None, false) => VlValueType::no_type(),
        };

        for item in &head.items {
            let (value, expr_text) = match &item.init {
                Some(init) => {
                    let value = match self.evaluate_expr(scope, init) {
                        Ok(v) => v,
                        Err(err) => {
                            self.put_error(&err);
                            VlValue::Error
                        }
                    };
                    (value, init.decompile())
                }
                None => {
                    self.put_error(&ElbError::eval_error(
                        item.region,
                        format!("{}: parameter requires a default value.", item.name),
                    ));
                    (VlValue::Error, String::new())
                }
            };
            let value = if declared_type.is_no_type() {
                value
            } else {
                value.coerce(declared_type)
            };

            let id = self.db.add_param(VlParameter {
                scope,
                name: item.name.clone(),
                is_local,
                declared_type,
                value,
                expr_text,
                overridden: false,
                region: item.region,
            });
            let handle = ObjHandle::Param(id);
            if !self.db.reg_obj(scope, &item.name, handle) {
                self.put_error(&ElbError::duplicate_name(item.region, &item.name));
                continue;
            }
            self.db.reg_tag(scope, VlTag::Parameter, handle);
            self.instantiate_attrs(scope, VlObjRef::Param(id), true, &head.attrs);
            if let Some(init) = &item.init {
                self.param_inits.push((id, init));
            }
        }
        Ok(())
    }

    /// Re-evaluates parameter defaults so overridden values flow into
    /// dependent parameters. `scope` limits the pass to one scope's
    /// parameters (after override binding); `None` re-runs everything
    /// (after defparam settlement). Overridden parameters keep their
    /// assigned value; evaluation failures keep the previous value
    /// (they were already reported at creation).
    pub(crate) fn reeval_params(&mut self, scope: Option<crate::vl::ScopeId>) {
        let entries: Vec<(crate::vl::ParamId, &'a crate::pt::PtExpr)> = self
            .param_inits
            .iter()
            .filter(|(id, _)| {
                let p = self.db.param(*id);
                !p.overridden && scope.is_none_or(|s| p.scope == s)
            })
            .copied()
            .collect();
        for (id, init) in entries {
            let param_scope = self.db.param(id).scope;
            if let Ok(value) = self.evaluate_expr(param_scope, init) {
                let declared = self.db.param(id).declared_type;
                let value = if declared.is_no_type() { value } else { value.coerce(declared) };
                self.db.param_mut(id).value = value;
            }
        }
    }

    /// Phase 2: expands the non-parameter declaration heads of a scope.
    pub(crate) fn instantiate_decl(&mut self, scope: ScopeId, declheads: &'a [PtDeclHead]) {
        for head in declheads {
            let kind = match head.kind {
                DeclKind::Net => DeclObjKind::Net(head.net_type),
                DeclKind::Reg => DeclObjKind::Reg,
                DeclKind::Var(VarType::Integer) => DeclObjKind::Integer,
                DeclKind::Var(VarType::Real) => DeclObjKind::Real,
                DeclKind::Var(VarType::Time) => DeclObjKind::Time,
                DeclKind::Var(VarType::Realtime) => DeclObjKind::Realtime,
                DeclKind::Var(VarType::None) => DeclObjKind::Reg,
                DeclKind::Event => DeclObjKind::NamedEvent,
                DeclKind::Param | DeclKind::LocalParam | DeclKind::SpecParam | DeclKind::Genvar => continue,
            };
            if let Err(err) = self.instantiate_decl_head(scope, head, kind) {
                self.put_error(&err);
            }
        }
    }

    fn instantiate_decl_head(&mut self, scope: ScopeId, head: &'a PtDeclHead, kind: DeclObjKind) -> ElbResult<()> {
        let range = self.instantiate_opt_range(scope, head.range.as_ref())?;
        let strength = head.strength.map(|s| (s.drive0, s.drive1));
        let delay = match &head.delay {
            Some(pt_delay) => match self.instantiate_delay(scope, pt_delay) {
                Ok(d) => Some(d),
                Err(err) => {
                    self.put_error(&err);
                    None
                }
            },
            None => None,
        };

        for item in &head.items {
            if item.dims.is_empty() {
                let id = self.db.add_decl(VlDecl {
                    scope,
                    name: item.name.clone(),
                    kind,
                    signed: head.signed,
                    range: range.clone(),
                    vs_type: head.vs_type,
                    strength,
                    delay: delay.clone(),
                    init: None,
                    io_dir: None,
                    region: item.region,
                });
                let handle = ObjHandle::Decl(id);
                if !self.db.reg_obj(scope, &item.name, handle) {
                    self.put_error(&ElbError::duplicate_name(item.region, &item.name));
                    continue;
                }
                self.db.reg_tag(scope, kind.tag(), handle);
                self.instantiate_attrs(scope, VlObjRef::Decl(id), true, &head.attrs);

                if let Some(init) = &item.init {
                    // Net initializers become continuous assigns and
                    // variable initializers become stored init
                    // expressions; both wait for phase 3 so every name
                    // they reference exists.
                    match kind {
                        DeclObjKind::Net(_) => {
                            self.add_phase3stub(Phase3Stub::NetInit { scope, decl: id, pt_expr: init });
                        }
                        DeclObjKind::NamedEvent => {
                            self.put_error(&ElbError::eval_error(
                                item.region,
                                format!("{}: named event shall not have an initial value.", item.name),
                            ));
                        }
                        _ => {
                            self.add_phase3stub(Phase3Stub::DeclInit { scope, decl: id, pt_expr: init });
                        }
                    }
                }
            } else {
                let mut dims = Vec::with_capacity(item.dims.len());
                for dim in &item.dims {
                    dims.push(self.instantiate_range(scope, dim)?);
                }
                let id = self.db.add_decl_array(VlDeclArray {
                    scope,
                    name: item.name.clone(),
                    kind,
                    signed: head.signed,
                    range: range.clone(),
                    dims: RangeArray::new(dims),
                    region: item.region,
                });
                let handle = ObjHandle::DeclArray(id);
                if !self.db.reg_obj(scope, &item.name, handle) {
                    self.put_error(&ElbError::duplicate_name(item.region, &item.name));
                    continue;
                }
                let tag = match kind.tag() {
                    VlTag::Net => VlTag::NetArray,
                    VlTag::Reg => VlTag::RegArray,
                    VlTag::Variables => VlTag::VariablesArray,
                    _ => VlTag::NamedEventArray,
                };
                self.db.reg_tag(scope, tag, handle);
                self.instantiate_attrs(scope, VlObjRef::DeclArray(id), true, &head.attrs);
            }
        }
        Ok(())
    }

    /// Phase 2: expands IO heads, reconciling each IO name with the
    /// inner declaration of the same name when one exists, creating an
    /// implicit net otherwise.
    ///
    /// Reconciliation follows the language's three-way rule, checked in
    /// `instantiate_io_item`:
    ///
    /// * both the IO and the inner declaration carry ranges — the bit
    ///   widths must agree, else `ConflictIoRange`;
    /// * the IO has no range but the inner declaration does — accepted
    ///   only under the `allow_empty_io_range` compile option, since
    ///   strict 1364 wants both spelled out;
    /// * the IO carries an aux type (`output reg q`) *and* a separate
    ///   declaration of the same name exists — that is a duplicate
    ///   declaration, not a reconciliation.
    ///
    /// When `tf` is given the IOs are appended to that task/function's
    /// formal list in declaration order — the order is semantic, since
    /// calls bind actuals positionally against it.
    pub(crate) fn instantiate_iodecl(
        &mut self,
        scope: ScopeId,
        ioheads: &'a [PtIoHead],
        tf: Option<TaskFuncId>,
        default_nettype: NetType,
    ) {
        for head in ioheads {
            for item in &head.items {
                match self.instantiate_io_item(scope, head, item, default_nettype) {
                    Ok(decl) => {
                        if let Some(tf) = tf {
                            self.db.taskfunc_mut(tf).ios.push(VlIoDecl { dir: head.dir, decl });
                        }
                    }
                    Err(err) => self.put_error(&err),
                }
            }
        }
    }

    fn instantiate_io_item(
        &mut self,
        scope: ScopeId,
        head: &'a PtIoHead,
        item: &'a crate::pt::PtIoItem,
        default_nettype: NetType,
    ) -> ElbResult<crate::vl::DeclId> {
        let io_range = self.instantiate_opt_range(scope, head.range.as_ref())?;

        match self.db.find_obj(scope, &item.name) {
            Some(ObjHandle::Decl(id)) => {
                if head.aux_type != AuxType::None {
                    // `output reg q;` plus a separate `reg q;` is a
                    // duplicate declaration.
                    let prev = self.db.decl(id).region;
                    return Err(ElbError::duplicate_type(item.region, &item.name, prev));
                }
                let decl_range = self.db.decl(id).range.clone();
                match (&io_range, &decl_range) {
                    (Some(io), Some(inner)) => {
                        if io.size() != inner.size() {
                            return Err(ElbError::conflict_io_range(item.region, &item.name));
                        }
                    }
                    (None, Some(_)) => {
                        if !self.opts.allow_empty_io_range {
                            return Err(ElbError::conflict_io_range(item.region, &item.name));
                        }
                    }
                    (Some(_), None) => {
                        return Err(ElbError::conflict_io_range(item.region, &item.name));
                    }
                    (None, None) => {}
                }
                self.db.decl_mut(id).io_dir = Some(head.dir);
                Ok(id)
            }
            Some(ObjHandle::DeclArray(_)) => Err(ElbError::array_io(item.region, &item.name)),
            Some(_) => Err(ElbError::illegal_io(item.region, &item.name)),
            None => {
                // No inner declaration: the IO itself declares the
                // object.
                let kind = match head.aux_type {
                    AuxType::Reg => DeclObjKind::Reg,
                    AuxType::Var => match head.var_type {
                        VarType::Integer => DeclObjKind::Integer,
                        VarType::Real => DeclObjKind::Real,
                        VarType::Time => DeclObjKind::Time,
                        VarType::Realtime => DeclObjKind::Realtime,
                        VarType::None => DeclObjKind::Reg,
                    },
                    AuxType::Net => DeclObjKind::Net(head.net_type),
                    AuxType::None => {
                        if default_nettype == NetType::None {
                            return Err(ElbError::no_impnet(item.region, &item.name));
                        }
                        if item.init.is_some() {
                            return Err(ElbError::impnet_with_init(item.region, &item.name));
                        }
                        DeclObjKind::Net(default_nettype)
                    }
                };
                let id = self.db.add_decl(VlDecl {
                    scope,
                    name: item.name.clone(),
                    kind,
                    signed: head.signed,
                    range: io_range,
                    vs_type: crate::lang::VsType::None,
                    strength: None,
                    delay: None,
                    init: None,
                    io_dir: Some(head.dir),
                    region: item.region,
                });
                let handle = ObjHandle::Decl(id);
                if !self.db.reg_obj(scope, &item.name, handle) {
                    return Err(ElbError::duplicate_name(item.region, &item.name));
                }
                self.db.reg_tag(scope, kind.tag(), handle);
                self.instantiate_attrs(scope, VlObjRef::Decl(id), true, &head.attrs);
                if let Some(init) = &item.init
                    && head.aux_type != AuxType::None
                {
                    self.add_phase3stub(Phase3Stub::DeclInit { scope, decl: id, pt_expr: init });
                }
                Ok(id)
            }
        }
    }
}
