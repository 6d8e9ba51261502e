//! ExprGen: builds elaborated expressions from PT expressions,
//! resolving names, computing value types and propagating required
//! widths.
//!
//! Construction is bottom-up and typing is two-step. Every node gets a
//! *self-determined* type when it is built (operator rules over its
//! operands' types); afterwards the surrounding context may impose a
//! *required* type through [`set_reqsize`](Elaborator::set_reqsize) —
//! an assignment pushes its LHS width into the RHS, a case statement
//! pushes the unified comparison type into the condition and every
//! label. Keeping the two types separate (instead of overwriting)
//! means sizing is idempotent and a node can always answer both "what
//! am I naturally" and "what does my context need".
//!
//! All the context restrictions (constant, event, LHS, ...) arrive in
//! the [`ElbEnv`] parameter rather than being rediscovered here; this
//! module's job is to *enforce* them with the right typed error at the
//! right node.

use smallvec::SmallVec;

use crate::{
    elab::{Elaborator, ElbEnv, ElbError, ElbResult},
    eval::eval_const,
    lang::{NetType, OpType, RangeMode},
    pt::{PtDelay, PtExpr, PtExprKind},
    region::FileRegion,
    vl::{
        DeclId, DeclObjKind, ExprId, ObjHandle, PrimaryObj, ScopeId, VlDecl, VlDelay, VlExpr, VlExprKind, VlTag,
    },
    vtype::VlValueType,
};

impl<'a> Elaborator<'a> {
    /// Builds an elaborated expression for `pt_expr` under `env`.
    ///
    /// This is the general entry point; the restricted flavors
    /// (`instantiate_event_expr`, `instantiate_lhs`,
    /// `instantiate_arg`) wrap it with their own root dispatch and
    /// fall back to it for operands. The source region of every built
    /// node is the PT node's, so diagnostics raised much later (during
    /// sizing, during dumping) still point at the original text.
    ///
    /// # Arguments
    /// * `scope` - The scope names resolve in; lookups go local, then
    ///   up the parent chain, then (for hierarchical names) down again.
    /// * `env` - The context restrictions in force; see [`ElbEnv`].
    /// * `pt_expr` - The parse-tree expression to elaborate.
    pub fn instantiate_expr(&mut self, scope: ScopeId, env: ElbEnv, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        // Unwrap '(' expression ')'; the env is preserved so a
        // parenthesised event expression stays an event expression.
        let mut pt_expr = pt_expr;
        while let PtExprKind::Opr {
            op: OpType::Null,
            operands,
        } = &pt_expr.kind
        {
            pt_expr = &operands[0];
        }

        match &pt_expr.kind {
            PtExprKind::Opr { op, operands } => self.instantiate_opr(scope, env, pt_expr, *op, operands),
            PtExprKind::Const { .. } => self.new_constant(pt_expr),
            PtExprKind::FuncCall { .. } => self.instantiate_funccall(scope, env, pt_expr),
            PtExprKind::SysFuncCall { .. } => {
                if env.inside_constant_function {
                    return Err(ElbError::sysfunccall_in_cf(pt_expr));
                }
                if env.is_constant() {
                    return Err(ElbError::sysfunccall_in_ce(pt_expr));
                }
                self.instantiate_sysfunccall(scope, env, pt_expr)
            }
            PtExprKind::Primary { .. } => self.instantiate_primary(scope, env, pt_expr),
        }
    }

    /// Builds a constant expression (attribute values, defparam right
    /// sides).
    pub fn instantiate_constant_expr(&mut self, scope: ScopeId, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        self.instantiate_expr(scope, ElbEnv::constant(), pt_expr)
    }

    /// Builds an event expression: edge descriptors and named events
    /// are legal at the root, constants and calls are not.
    ///
    /// The parenthesisation unwrap runs here too and keeps the same
    /// env, so an edge descriptor survives any depth of parentheses:
    /// `@((posedge clk))` is exactly `@(posedge clk)`. Anything that is
    /// not an edge, an event-or list or a primary falls back to
    /// ordinary operator handling — `@(a ^ b)` is a legal (value
    /// change) event expression.
    pub fn instantiate_event_expr(&mut self, scope: ScopeId, env: ElbEnv, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        let mut pt_expr = pt_expr;
        while let PtExprKind::Opr {
            op: OpType::Null,
            operands,
        } = &pt_expr.kind
        {
            pt_expr = &operands[0];
        }

        match &pt_expr.kind {
            PtExprKind::Opr { op, operands } => match op {
                OpType::Posedge | OpType::Negedge => {
                    let opr = self.instantiate_expr(scope, env, &operands[0])?;
                    Ok(self.new_expr(pt_expr.region, VlValueType::no_type(), VlExprKind::Unary {
                        op: *op,
                        opr,
                    }))
                }
                OpType::EventOr | OpType::List => {
                    let mut parts = Vec::with_capacity(operands.len());
                    for operand in operands {
                        parts.push(self.instantiate_event_expr(scope, env, operand)?);
                    }
                    Ok(self.new_expr(pt_expr.region, VlValueType::no_type(), VlExprKind::Concat { parts }))
                }
                _ => self.instantiate_opr(scope, env, pt_expr, *op, operands),
            },
            PtExprKind::Primary { .. } => {
                // Ordinary identifiers plus named events.
                self.instantiate_primary(scope, env.event(), pt_expr)
            }
            PtExprKind::Const { .. } => Err(ElbError::illegal_constant_in_event_expression(pt_expr)),
            PtExprKind::FuncCall { .. } => Err(ElbError::illegal_funccall_in_event_expression(pt_expr)),
            PtExprKind::SysFuncCall { .. } => Err(ElbError::illegal_sysfunccall_in_event_expression(pt_expr)),
        }
    }

    /// Builds a system-task/function argument; primaries get the
    /// relaxed env that accepts scope and array names.
    pub fn instantiate_arg(&mut self, scope: ScopeId, env: ElbEnv, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        let mut pt_expr = pt_expr;
        while let PtExprKind::Opr {
            op: OpType::Null,
            operands,
        } = &pt_expr.kind
        {
            pt_expr = &operands[0];
        }
        if matches!(pt_expr.kind, PtExprKind::Primary { .. }) {
            return self.instantiate_primary(scope, env.system_tf_arg(), pt_expr);
        }
        self.instantiate_expr(scope, env, pt_expr)
    }

    /// Builds a left-hand side. The result is either a single primitive
    /// LHS element or an `Lhs` concatenation whose `elems` list the
    /// primitive elements LSB-first.
    ///
    /// The flattened `elems` list exists because a consumer assigning
    /// through the LHS works bit-position-first: the RHS value's low
    /// bits land in the *rightmost* (last-written) element of a
    /// concatenation, per the language's assignment rules. Since
    /// operands appear in the parse tree MSB-first, the walk below
    /// runs backwards so nested concatenations still produce one flat
    /// LSB-first element order without a second pass.
    pub fn instantiate_lhs(&mut self, scope: ScopeId, env: ElbEnv, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        match &pt_expr.kind {
            PtExprKind::Opr { op, operands } => {
                if *op != OpType::Concat {
                    return Err(ElbError::illegal_operator_in_lhs(pt_expr));
                }
                let mut elems = vec![];
                let mut parts = vec![ExprId::new(0); operands.len()];
                // Operands appear MSB first, so walk them backwards to
                // collect the primitive elements LSB-first.
                for i in (0..operands.len()).rev() {
                    parts[i] = self.instantiate_lhs_sub(scope, env, &operands[i], &mut elems)?;
                }
                let width: u32 = parts.iter().map(|&p| self.db.expr(p).width()).sum();
                Ok(self.new_expr(
                    pt_expr.region,
                    VlValueType::new(false, true, width),
                    VlExprKind::Lhs { parts, elems },
                ))
            }
            PtExprKind::Primary { .. } => self.instantiate_primary(scope, env, pt_expr),
            PtExprKind::Const { .. } => Err(ElbError::illegal_constant_in_lhs(pt_expr)),
            PtExprKind::FuncCall { .. } => Err(ElbError::illegal_funccall_in_lhs(pt_expr)),
            PtExprKind::SysFuncCall { .. } => Err(ElbError::illegal_sysfunccall_in_lhs(pt_expr)),
        }
    }

    fn instantiate_lhs_sub(
        &mut self,
        scope: ScopeId,
        env: ElbEnv,
        pt_expr: &'a PtExpr,
        elems: &mut Vec<ExprId>,
    ) -> ElbResult<ExprId> {
        match &pt_expr.kind {
            PtExprKind::Opr { op, operands } => {
                if *op != OpType::Concat {
                    return Err(ElbError::illegal_operator_in_lhs(pt_expr));
                }
                let mut parts = vec![ExprId::new(0); operands.len()];
                for i in (0..operands.len()).rev() {
                    parts[i] = self.instantiate_lhs_sub(scope, env, &operands[i], elems)?;
                }
                let width: u32 = parts.iter().map(|&p| self.db.expr(p).width()).sum();
                Ok(self.new_expr(
                    pt_expr.region,
                    VlValueType::new(false, true, width),
                    VlExprKind::Concat { parts },
                ))
            }
            PtExprKind::Primary { .. } => {
                let expr = self.instantiate_primary(scope, env, pt_expr)?;
                elems.push(expr);
                Ok(expr)
            }
            PtExprKind::Const { .. } => Err(ElbError::illegal_constant_in_lhs(pt_expr)),
            PtExprKind::FuncCall { .. } => Err(ElbError::illegal_funccall_in_lhs(pt_expr)),
            PtExprKind::SysFuncCall { .. } => Err(ElbError::illegal_sysfunccall_in_lhs(pt_expr)),
        }
    }

    /// Builds a right-hand side sized against the LHS type.
    ///
    /// Assignment is a context-determined position: `reg [3:0] r =
    /// 2'b11 + 2'b01` must compute at four bits, not two, or the carry
    /// is lost. The RHS is therefore built normally and then
    /// `set_reqsize` pushes the LHS type down into its
    /// context-determined operands. Only bit-vector-to-bit-vector
    /// sizing applies — a real RHS keeps its own type and converts at
    /// assignment instead.
    pub fn instantiate_rhs(
        &mut self,
        scope: ScopeId,
        env: ElbEnv,
        pt_expr: &'a PtExpr,
        lhs_type: VlValueType,
    ) -> ElbResult<ExprId> {
        let expr = self.instantiate_expr(scope, env, pt_expr)?;
        if lhs_type.is_bitvector_type() && self.db.expr(expr).vtype.is_bitvector_type() {
            self.set_reqsize(expr, lhs_type);
        }
        Ok(expr)
    }

    /// Elaborates a delay header of up to three values.
    pub fn instantiate_delay(&mut self, scope: ScopeId, pt_delay: &'a PtDelay) -> ElbResult<VlDelay> {
        debug_assert!(!pt_delay.values.is_empty() && pt_delay.values.len() <= 3);
        let env = ElbEnv::new();
        let mut values = SmallVec::new();
        for pt_value in pt_delay.values.iter().take(3) {
            values.push(self.instantiate_expr(scope, env, pt_value)?);
        }
        Ok(VlDelay {
            region: pt_delay.region,
            values,
        })
    }

    /// Resolves an event-trigger target to a named event declaration.
    pub fn instantiate_namedevent(
        &mut self,
        scope: ScopeId,
        branches: &[crate::pt::NameBranch],
        name: &str,
        region: FileRegion,
    ) -> ElbResult<DeclId> {
        let handle = if branches.is_empty() {
            self.db.find_obj_up(scope, name).map(|(_, h)| h)
        } else {
            self.db.find_hierarchical(scope, branches, name)
        };
        let Some(handle) = handle else {
            return Err(ElbError::not_found(region, name));
        };
        match handle {
            ObjHandle::Decl(id) if self.db.decl(id).kind == DeclObjKind::NamedEvent => Ok(id),
            _ => Err(ElbError::new(
                region,
                crate::elab::ElbErrorKind::NotANamedEvent,
                format!("{name}: not a named event."),
            )),
        }
    }

    pub(crate) fn new_expr(&mut self, region: FileRegion, vtype: VlValueType, kind: VlExprKind) -> ExprId {
        self.db.add_expr(VlExpr {
            region,
            vtype,
            req_type: None,
            kind,
        })
    }

    fn new_constant(&mut self, pt_expr: &PtExpr) -> ElbResult<ExprId> {
        let value = eval_const(pt_expr)?;
        let vtype = value.value_type();
        Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::Const(value)))
    }

    fn instantiate_opr(
        &mut self,
        scope: ScopeId,
        env: ElbEnv,
        pt_expr: &'a PtExpr,
        op: OpType,
        operands: &'a [PtExpr],
    ) -> ElbResult<ExprId> {
        use OpType as O;
        match op {
            O::Posedge | O::Negedge => {
                // Edge descriptors only make sense in an event context,
                // where instantiate_event_expr handles them.
                return Err(ElbError::illegal_edge_descriptor(pt_expr));
            }
            O::MinTypMax => {
                let pos = if operands.len() == 3 { 1 } else { 0 };
                return self.instantiate_expr(scope, env, &operands[pos]);
            }
            _ => {}
        }

        if op.is_unary() {
            let opr = self.instantiate_expr(scope, env, &operands[0])?;
            let opr_type = self.db.expr(opr).vtype;
            let vtype = match op {
                O::Minus | O::Plus => opr_type,
                O::BitNeg => {
                    if opr_type.is_real_type() {
                        return Err(ElbError::illegal_real_type(pt_expr));
                    }
                    opr_type
                }
                // Reductions and logical not are one unsigned bit.
                _ => {
                    if opr_type.is_real_type() {
                        return Err(ElbError::illegal_real_type(pt_expr));
                    }
                    VlValueType::new(false, true, 1)
                }
            };
            return Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::Unary { op, opr }));
        }

        match op {
            O::Condition => {
                let cond = self.instantiate_expr(scope, env, &operands[0])?;
                let then_expr = self.instantiate_expr(scope, env, &operands[1])?;
                let else_expr = self.instantiate_expr(scope, env, &operands[2])?;
                let vtype = promote_types(self.db.expr(then_expr).vtype, self.db.expr(else_expr).vtype);
                Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::Ternary {
                    cond,
                    then_expr,
                    else_expr,
                }))
            }
            O::Concat => {
                let mut parts = Vec::with_capacity(operands.len());
                let mut width = 0u32;
                for operand in operands {
                    let part = self.instantiate_expr(scope, env, operand)?;
                    if self.db.expr(part).vtype.is_real_type() {
                        return Err(ElbError::illegal_real_type(pt_expr));
                    }
                    width += self.db.expr(part).width();
                    parts.push(part);
                }
                // Concatenation operands become unsigned; the result is
                // always sized.
                Ok(self.new_expr(
                    pt_expr.region,
                    VlValueType::new(false, true, width),
                    VlExprKind::Concat { parts },
                ))
            }
            O::MultiConcat => {
                let rep = self.evaluate_int(scope, &operands[0])?;
                if rep < 0 {
                    return Err(ElbError::eval_error(pt_expr.region, "negative repeat count."));
                }
                let rep_expr = self.instantiate_constant_expr(scope, &operands[0])?;
                let mut parts = Vec::with_capacity(operands.len() - 1);
                let mut inner_width = 0u32;
                for operand in &operands[1..] {
                    let part = self.instantiate_expr(scope, env, operand)?;
                    if self.db.expr(part).vtype.is_real_type() {
                        return Err(ElbError::illegal_real_type(pt_expr));
                    }
                    inner_width += self.db.expr(part).width();
                    parts.push(part);
                }
                Ok(self.new_expr(
                    pt_expr.region,
                    VlValueType::new(false, true, inner_width * rep as u32),
                    VlExprKind::MultiConcat {
                        rep: rep as u32,
                        rep_expr,
                        parts,
                    },
                ))
            }
            O::EventOr | O::List => Err(ElbError::illegal_edge_descriptor(pt_expr)),
            _ => {
                let lhs = self.instantiate_expr(scope, env, &operands[0])?;
                let rhs = self.instantiate_expr(scope, env, &operands[1])?;
                let lhs_type = self.db.expr(lhs).vtype;
                let rhs_type = self.db.expr(rhs).vtype;
                let vtype = match op {
                    // Context-determined arithmetic.
                    O::Add | O::Sub | O::Mult | O::Div | O::Power => promote_types(lhs_type, rhs_type),
                    O::Mod | O::BitAnd | O::BitOr | O::BitXor | O::BitXNor => {
                        if lhs_type.is_real_type() || rhs_type.is_real_type() {
                            return Err(ElbError::illegal_real_type(pt_expr));
                        }
                        promote_types(lhs_type, rhs_type)
                    }
                    // Relational / equality: one unsigned bit, with the
                    // operands balanced against each other.
                    O::Eq | O::Neq | O::CaseEq | O::CaseNeq | O::Gt | O::Ge | O::Lt | O::Le => {
                        if !lhs_type.is_real_type() && !rhs_type.is_real_type() {
                            let opr_type = promote_types(lhs_type, rhs_type);
                            self.set_reqsize(lhs, opr_type);
                            self.set_reqsize(rhs, opr_type);
                        }
                        VlValueType::new(false, true, 1)
                    }
                    O::LogAnd | O::LogOr => VlValueType::new(false, true, 1),
                    // Shifts take the left operand's type; the count is
                    // self-determined.
                    O::LShift | O::RShift | O::ArithLShift | O::ArithRShift => {
                        if lhs_type.is_real_type() || rhs_type.is_real_type() {
                            return Err(ElbError::illegal_real_type(pt_expr));
                        }
                        lhs_type
                    }
                    _ => {
                        return Err(ElbError::eval_error(
                            pt_expr.region,
                            format!("unexpected operator {op}."),
                        ));
                    }
                };
                Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::Binary { op, lhs, rhs }))
            }
        }
    }

    fn instantiate_funccall(&mut self, scope: ScopeId, env: ElbEnv, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        let PtExprKind::FuncCall { name, branches, args } = &pt_expr.kind else {
            unreachable!("instantiate_funccall on a non-funccall");
        };

        let func = if env.is_constant() {
            if !branches.is_empty() {
                return Err(ElbError::hname_in_ce(pt_expr));
            }
            let (tf, _) = self.find_constant_function(scope, name, pt_expr)?;
            tf
        } else {
            let handle = if branches.is_empty() {
                self.db.find_obj_up(scope, name).map(|(_, h)| h)
            } else {
                self.db.find_hierarchical(scope, branches, name)
            };
            let Some(handle) = handle else {
                return Err(ElbError::no_such_function(pt_expr));
            };
            let Some(tf) = handle.as_taskfunc() else {
                return Err(ElbError::not_a_function(pt_expr));
            };
            if self.db.taskfunc(tf).is_task {
                return Err(ElbError::not_a_function(pt_expr));
            }
            tf
        };

        let formals: Vec<VlValueType> = self
            .db
            .taskfunc(func)
            .ios
            .iter()
            .map(|io| self.db.decl(io.decl).value_type())
            .collect();
        if formals.len() != args.len() {
            return Err(ElbError::n_of_arguments_mismatch(pt_expr));
        }

        let mut arg_list = Vec::with_capacity(args.len());
        for (formal_type, arg) in formals.iter().zip(args) {
            let expr = self.instantiate_expr(scope, env, arg)?;
            if self.db.expr(expr).vtype != *formal_type {
                // Constants still coerce; anything else is a mismatch.
                if !self.db.expr(expr).is_const() || !formal_type.is_bitvector_type() {
                    return Err(ElbError::illegal_argument_type(pt_expr));
                }
                self.set_reqsize(expr, *formal_type);
            }
            arg_list.push(expr);
        }

        let vtype = self.db.taskfunc(func).ret_type;
        Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::FuncCall {
            func,
            args: arg_list,
        }))
    }

    fn instantiate_sysfunccall(&mut self, scope: ScopeId, env: ElbEnv, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        let PtExprKind::SysFuncCall { name, args } = &pt_expr.kind else {
            unreachable!("instantiate_sysfunccall on a non-sysfunccall");
        };

        let Some(systf) = self.systf.find_user_systf(name) else {
            return Err(ElbError::no_such_sysfunction(pt_expr));
        };
        if systf.kind != crate::systf::SystfKind::Function {
            return Err(ElbError::not_a_function(pt_expr));
        }
        let ret_type = systf.ret_type;
        if let Some(arg_num) = systf.arg_num
            && args.len() != arg_num as usize
        {
            return Err(ElbError::n_of_arguments_mismatch(pt_expr));
        }

        let mut arg_list = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Some(pt_arg) => arg_list.push(Some(self.instantiate_arg(scope, env, pt_arg)?)),
                // Unlike user functions, empty argument slots are
                // allowed.
                None => arg_list.push(None),
            }
        }

        // $signed/$unsigned return their operand's shape with the
        // signedness flipped; the registry marks them with NoType.
        let vtype = if ret_type.is_no_type() {
            match (name.as_str(), arg_list.first()) {
                ("$signed", Some(Some(arg))) => {
                    let t = self.db.expr(*arg).vtype;
                    VlValueType::new(true, t.is_sized(), t.size())
                }
                ("$unsigned", Some(Some(arg))) => {
                    let t = self.db.expr(*arg).vtype;
                    VlValueType::new(false, t.is_sized(), t.size())
                }
                _ => ret_type,
            }
        } else {
            ret_type
        };

        Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::SysFuncCall {
            name: name.clone(),
            args: arg_list,
        }))
    }

    fn instantiate_primary(&mut self, scope: ScopeId, env: ElbEnv, pt_expr: &'a PtExpr) -> ElbResult<ExprId> {
        let PtExprKind::Primary {
            name,
            branches,
            indices,
            range_mode,
            left,
            right,
        } = &pt_expr.kind
        else {
            unreachable!("instantiate_primary on a non-primary");
        };

        // Resolve the name.
        let handle = if branches.is_empty() {
            match self.db.find_obj_up(scope, name) {
                Some((_, h)) => Some(h),
                None if env.net_lhs => Some(self.instantiate_implicit_net(scope, name, pt_expr)?),
                None => None,
            }
        } else {
            if env.is_constant() {
                return Err(ElbError::hname_in_ce(pt_expr));
            }
            if env.inside_constant_function {
                return Err(ElbError::hname_in_cf(pt_expr));
            }
            self.db.find_hierarchical(scope, branches, name)
        };
        let Some(handle) = handle else {
            return Err(ElbError::not_found_expr(pt_expr));
        };

        let has_select = !indices.is_empty() || *range_mode != RangeMode::No;

        match handle {
            ObjHandle::Param(id) => {
                if env.lhs {
                    return Err(ElbError::illegal_object(pt_expr));
                }
                let param = self.db.param(id);
                let vtype = param.value_type();
                let base = self.new_expr(pt_expr.region, vtype, VlExprKind::Primary(PrimaryObj::Param(id)));
                self.apply_select(scope, env, pt_expr, base, indices, *range_mode, left, right)
            }
            ObjHandle::Genvar(id) => {
                if env.lhs {
                    return Err(ElbError::illegal_object(pt_expr));
                }
                // A genvar reads as its current loop value.
                let value = self.db.genvar(id).value;
                Ok(self.new_expr(
                    pt_expr.region,
                    VlValueType::int_type(),
                    VlExprKind::Const(crate::value::VlValue::Int(value)),
                ))
            }
            ObjHandle::Decl(id) => {
                let decl = self.db.decl(id);
                let kind = decl.kind;
                let vtype = decl.value_type();
                if kind == DeclObjKind::NamedEvent {
                    if has_select {
                        return Err(ElbError::select_for_namedevent(pt_expr));
                    }
                    if !env.named_event_ok {
                        return Err(ElbError::illegal_object(pt_expr));
                    }
                    return Ok(self.new_expr(
                        pt_expr.region,
                        VlValueType::no_type(),
                        VlExprKind::Primary(PrimaryObj::Decl(id)),
                    ));
                }
                if env.is_constant_like() {
                    // Only parameters and genvars are constants.
                    return Err(ElbError::not_a_parameter(pt_expr));
                }
                let base = self.new_expr(pt_expr.region, vtype, VlExprKind::Primary(PrimaryObj::Decl(id)));
                self.apply_select(scope, env, pt_expr, base, indices, *range_mode, left, right)
            }
            ObjHandle::DeclArray(id) => {
                if env.is_constant_like() {
                    return Err(ElbError::not_a_parameter(pt_expr));
                }
                if env.pca {
                    return Err(ElbError::array_in_pca(pt_expr));
                }
                if env.force {
                    return Err(ElbError::array_in_force(pt_expr));
                }
                let array = self.db.decl_array(id);
                let dim = array.dims.dim();
                let vtype = array.value_type();
                if env.system_tf_arg && indices.is_empty() {
                    // A whole memory may be passed to a system task.
                    return Ok(self.new_expr(
                        pt_expr.region,
                        vtype,
                        VlExprKind::Primary(PrimaryObj::ArrayElem {
                            array: id,
                            indices: vec![],
                            const_offset: None,
                        }),
                    ));
                }
                let (elem_indices, bit_index) = match indices.len() {
                    n if n == dim => (indices.as_slice(), None),
                    n if n == dim + 1 => (&indices[..dim], Some(&indices[dim])),
                    _ => return Err(ElbError::dimension_mismatch(pt_expr)),
                };

                let mut index_exprs = Vec::with_capacity(elem_indices.len());
                let mut index_vals = Vec::with_capacity(elem_indices.len());
                for index in elem_indices {
                    let expr = self.instantiate_expr(scope, env.without_lhs(), index)?;
                    index_vals.push(self.evaluate_int_if_const(scope, index)?);
                    index_exprs.push(expr);
                }
                let const_offset = index_vals
                    .iter()
                    .copied()
                    .collect::<Option<Vec<i32>>>()
                    .and_then(|vals| self.db.decl_array(id).dims.calc_offset(&vals));
                let base = self.new_expr(
                    pt_expr.region,
                    vtype,
                    VlExprKind::Primary(PrimaryObj::ArrayElem {
                        array: id,
                        indices: index_exprs,
                        const_offset,
                    }),
                );
                match bit_index {
                    Some(index) => self.apply_bit_select(scope, env, pt_expr, base, index),
                    None => self.apply_range_select(scope, pt_expr, base, *range_mode, left, right),
                }
            }
            ObjHandle::Scope(_) | ObjHandle::Module(_) | ObjHandle::ModuleArray(_) | ObjHandle::GfRoot(_) => {
                if env.system_tf_arg && !has_select {
                    // Scope references are legal system-tf arguments;
                    // model them as zero-width constants carrying the
                    // name.
                    return Ok(self.new_expr(
                        pt_expr.region,
                        VlValueType::no_type(),
                        VlExprKind::Const(crate::value::VlValue::Str(name.clone())),
                    ));
                }
                if env.is_constant_like() {
                    return Err(ElbError::illegal_object_cf(pt_expr));
                }
                Err(ElbError::illegal_object(pt_expr))
            }
            ObjHandle::TaskFunc(_) | ObjHandle::Prim(_) | ObjHandle::PrimArray(_) => {
                Err(ElbError::illegal_object(pt_expr))
            }
        }
    }

    /// Creates an implicit net for an undeclared continuous-assign LHS
    /// name, honoring the module's `default_nettype`.
    ///
    /// The net is created in the *module* scope, not the scope the
    /// expression happens to elaborate in — an implicit net inside a
    /// generate block is still a module-level net, which is why the
    /// walk goes through `parent_module` first. A `default_nettype` of
    /// `none` turns the whole feature off and the reference reports
    /// `NoImpnet` instead.
    fn instantiate_implicit_net(&mut self, scope: ScopeId, name: &str, pt_expr: &PtExpr) -> ElbResult<ObjHandle> {
        let module = self
            .db
            .parent_module(scope)
            .ok_or_else(|| ElbError::not_found_expr(pt_expr))?;
        let module_scope = self.db.module(module).scope;
        let def_name = self.db.module(module).def_name.clone();
        let net_type = self
            .pt
            .find_moduledef(&def_name)
            .map_or(NetType::Wire, |m| m.default_nettype);
        if net_type == NetType::None {
            return Err(ElbError::new(
                pt_expr.region,
                crate::elab::ElbErrorKind::NoImpnet,
                format!("{name}: implicit net declaration is inhibited because `default_nettype is \"none\"."),
            ));
        }
        let decl = self.db.add_decl(VlDecl {
            scope: module_scope,
            name: name.to_owned(),
            kind: DeclObjKind::Net(net_type),
            signed: false,
            range: None,
            vs_type: crate::lang::VsType::None,
            strength: None,
            delay: None,
            init: None,
            io_dir: None,
            region: pt_expr.region,
        });
        let handle = ObjHandle::Decl(decl);
        self.db.reg_obj(module_scope, name, handle);
        self.db.reg_tag(module_scope, VlTag::Net, handle);
        Ok(handle)
    }

    #[expect(clippy::too_many_arguments, reason = "select application carries the whole primary shape")]
    fn apply_select(
        &mut self,
        scope: ScopeId,
        env: ElbEnv,
        pt_expr: &'a PtExpr,
        base: ExprId,
        indices: &'a [PtExpr],
        range_mode: RangeMode,
        left: &'a Option<Box<PtExpr>>,
        right: &'a Option<Box<PtExpr>>,
    ) -> ElbResult<ExprId> {
        let has_select = !indices.is_empty() || range_mode != RangeMode::No;
        if !has_select {
            return Ok(base);
        }
        if self.db.expr(base).vtype.is_real_type() {
            return Err(ElbError::select_on_real(pt_expr));
        }
        if env.pca {
            return Err(ElbError::select_in_pca(pt_expr));
        }
        if env.force {
            return Err(ElbError::select_in_force(pt_expr));
        }
        if indices.len() > 1 {
            return Err(ElbError::dimension_mismatch(pt_expr));
        }
        let mut expr = base;
        if let Some(index) = indices.first() {
            expr = self.apply_bit_select(scope, env, pt_expr, expr, index)?;
        }
        self.apply_range_select(scope, pt_expr, expr, range_mode, left, right)
    }

    fn apply_bit_select(
        &mut self,
        scope: ScopeId,
        env: ElbEnv,
        pt_expr: &'a PtExpr,
        base: ExprId,
        index: &'a PtExpr,
    ) -> ElbResult<ExprId> {
        let vtype = VlValueType::new(false, true, 1);
        match self.evaluate_int_if_const(scope, index)? {
            Some(value) => Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::BitSelect {
                base,
                index: None,
                const_index: Some(value),
            })),
            None => {
                if env.is_constant_like() {
                    return Err(ElbError::not_constant(index));
                }
                let index_expr = self.instantiate_expr(scope, env.without_lhs(), index)?;
                Ok(self.new_expr(pt_expr.region, vtype, VlExprKind::BitSelect {
                    base,
                    index: Some(index_expr),
                    const_index: None,
                }))
            }
        }
    }

    fn apply_range_select(
        &mut self,
        scope: ScopeId,
        pt_expr: &'a PtExpr,
        base: ExprId,
        range_mode: RangeMode,
        left: &'a Option<Box<PtExpr>>,
        right: &'a Option<Box<PtExpr>>,
    ) -> ElbResult<ExprId> {
        let (Some(left), Some(right)) = (left.as_deref(), right.as_deref()) else {
            return Ok(base);
        };
        match range_mode {
            RangeMode::No => Ok(base),
            RangeMode::Const => {
                let (left_val, right_val) = self.evaluate_range(scope, left, right)?;
                // The select must run the same direction as the
                // declared range.
                if let Some(decl_range) = self.base_decl_range(base)
                    && decl_range.is_big_endian() != (left_val >= right_val)
                    && decl_range.size() > 1
                {
                    return Err(ElbError::range_order(pt_expr));
                }
                let width = left_val.abs_diff(right_val) + 1;
                Ok(self.new_expr(
                    pt_expr.region,
                    VlValueType::new(false, true, width),
                    VlExprKind::PartSelect {
                        base,
                        left: left_val,
                        right: right_val,
                    },
                ))
            }
            RangeMode::Plus | RangeMode::Minus => {
                let width = self.evaluate_int(scope, right)?;
                if width <= 0 {
                    return Err(ElbError::eval_error(right.region, "part-select width must be positive."));
                }
                let base_expr = self.instantiate_expr(scope, ElbEnv::new(), left)?;
                let vtype = VlValueType::new(false, true, width as u32);
                let kind = if range_mode == RangeMode::Plus {
                    VlExprKind::PlusPartSelect {
                        base,
                        base_expr,
                        width: width as u32,
                    }
                } else {
                    VlExprKind::MinusPartSelect {
                        base,
                        base_expr,
                        width: width as u32,
                    }
                };
                Ok(self.new_expr(pt_expr.region, vtype, kind))
            }
        }
    }

    /// The declared range behind a primary base, for range-order
    /// checking.
    fn base_decl_range(&self, base: ExprId) -> Option<&crate::range::VlRange> {
        match &self.db.expr(base).kind {
            VlExprKind::Primary(PrimaryObj::Decl(id)) => self.db.decl(*id).range.as_ref(),
            VlExprKind::Primary(PrimaryObj::ArrayElem { array, .. }) => self.db.decl_array(*array).range.as_ref(),
            _ => None,
        }
    }

    /// Recursively applies a required type: context-determined operands
    /// inherit it, self-determined operands keep their own size.
    ///
    /// The split follows the language's operator doctrine:
    ///
    /// * **Context-determined** (the required type flows in):
    ///   arithmetic and bitwise binaries, arithmetic unaries, both
    ///   arms of `?:`, the *left* operand of a shift, and every leaf
    ///   (constants, primaries, selects, calls) which simply records
    ///   the type it must extend to.
    /// * **Self-determined** (the walk stops): reduction and logical
    ///   operators, relational/equality results (their operands were
    ///   already balanced against each other at construction), shift
    ///   counts, and concatenations — a concat's width is the sum of
    ///   its parts by definition and may not be stretched from
    ///   outside.
    ///
    /// Non-bit-vector required types are ignored entirely; there is no
    /// width to propagate into or out of a real.
    pub fn set_reqsize(&mut self, expr: ExprId, vtype: VlValueType) {
        if !vtype.is_bitvector_type() {
            return;
        }
        let kind = self.db.expr(expr).kind.clone();
        match kind {
            VlExprKind::Const(_) | VlExprKind::Primary(_) | VlExprKind::FuncCall { .. } | VlExprKind::SysFuncCall { .. } => {
                self.db.expr_mut(expr).req_type = Some(vtype);
            }
            VlExprKind::BitSelect { .. }
            | VlExprKind::PartSelect { .. }
            | VlExprKind::PlusPartSelect { .. }
            | VlExprKind::MinusPartSelect { .. } => {
                self.db.expr_mut(expr).req_type = Some(vtype);
            }
            VlExprKind::Unary { op, opr } => match op {
                OpType::Minus | OpType::Plus | OpType::BitNeg => {
                    self.db.expr_mut(expr).req_type = Some(vtype);
                    self.set_reqsize(opr, vtype);
                }
                // Reductions and logical not are self-determined.
                _ => {}
            },
            VlExprKind::Binary { op, lhs, rhs } => match op {
                OpType::Add
                | OpType::Sub
                | OpType::Mult
                | OpType::Div
                | OpType::Mod
                | OpType::Power
                | OpType::BitAnd
                | OpType::BitOr
                | OpType::BitXor
                | OpType::BitXNor => {
                    self.db.expr_mut(expr).req_type = Some(vtype);
                    self.set_reqsize(lhs, vtype);
                    self.set_reqsize(rhs, vtype);
                }
                OpType::LShift | OpType::RShift | OpType::ArithLShift | OpType::ArithRShift => {
                    self.db.expr_mut(expr).req_type = Some(vtype);
                    self.set_reqsize(lhs, vtype);
                }
                // Relational, equality and logical results are one bit;
                // their operands were balanced at construction.
                _ => {}
            },
            VlExprKind::Ternary {
                then_expr, else_expr, ..
            } => {
                self.db.expr_mut(expr).req_type = Some(vtype);
                self.set_reqsize(then_expr, vtype);
                self.set_reqsize(else_expr, vtype);
            }
            // Concatenations and LHSs are self-determined.
            VlExprKind::Concat { .. } | VlExprKind::MultiConcat { .. } | VlExprKind::Lhs { .. } => {}
        }
    }
}

/// The promoted type of a context-determined binary operation: real
/// dominates, else widest width with signedness only when both sides
/// are signed.
///
/// The signedness rule is the asymmetric one the language mandates —
/// one unsigned operand makes the whole operation unsigned — and it is
/// shared with the value kernel's promotion so that what the generator
/// types and what the evaluator computes can never disagree.
fn promote_types(lhs: VlValueType, rhs: VlValueType) -> VlValueType {
    if lhs.is_real_type() || rhs.is_real_type() {
        return VlValueType::real_type();
    }
    let signed = lhs.is_signed() && rhs.is_signed();
    let sized = lhs.is_sized() || rhs.is_sized();
    VlValueType::new(signed, sized, lhs.size().max(rhs.size()))
}

impl ElbEnv {
    /// Index expressions inside an LHS are read contexts.
    pub(crate) fn without_lhs(self) -> Self {
        Self {
            lhs: false,
            pca: false,
            force: false,
            net_lhs: false,
            ..self
        }
    }
}
