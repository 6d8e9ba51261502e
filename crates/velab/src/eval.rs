//! The constant-expression evaluator.
//!
//! Interprets a PT expression in a scope and yields a [`VlValue`].
//! Only parameters, genvars and constant functions may be referenced;
//! anything else raises a typed error the caller either reports or, for
//! the `*_if_const` probes, treats as "not a constant".

use ahash::AHashMap;

use crate::{
    bitvector::BitVector,
    elab::{Elaborator, ElbError, ElbErrorKind, ElbResult},
    lang::{ConstType, OpType},
    pt::{PtExpr, PtExprKind, PtStmt, PtStmtKind, PtTaskFunc},
    scalar::ScalarVal,
    value::VlValue,
    vl::{ObjHandle, ScopeId, TaskFuncId},
};

/// Local frame of a constant function being interpreted: the formals,
/// the local variables, and the self-named result slot.
struct ConstFuncFrame {
    locals: AHashMap<String, VlValue>,
}

impl<'a> Elaborator<'a> {
    /// Evaluates a constant expression.
    pub fn evaluate_expr(&mut self, scope: ScopeId, pt_expr: &PtExpr) -> ElbResult<VlValue> {
        self.eval_expr(scope, pt_expr, None)
    }

    /// Evaluates a constant expression and converts to `int`.
    pub fn evaluate_int(&mut self, scope: ScopeId, pt_expr: &PtExpr) -> ElbResult<i32> {
        let value = self.evaluate_expr(scope, pt_expr)?;
        value
            .to_int()
            .ok_or_else(|| ElbError::new(pt_expr.region, ElbErrorKind::EvalIntError, "int value required."))
    }

    /// Evaluates to `int` when the expression is constant; `Ok(None)`
    /// when it is not. Non-conversion errors still propagate.
    pub fn evaluate_int_if_const(&mut self, scope: ScopeId, pt_expr: &PtExpr) -> ElbResult<Option<i32>> {
        match self.evaluate_expr(scope, pt_expr) {
            Ok(value) => value
                .to_int()
                .map(Some)
                .ok_or_else(|| ElbError::new(pt_expr.region, ElbErrorKind::EvalIntError, "int value required.")),
            Err(err) if err.kind.is_const_error() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Evaluates a constant expression and converts to bool; any value
    /// type converts.
    pub fn evaluate_bool(&mut self, scope: ScopeId, pt_expr: &PtExpr) -> ElbResult<bool> {
        Ok(self.evaluate_expr(scope, pt_expr)?.to_bool())
    }

    /// Evaluates a constant expression and converts to a four-state
    /// scalar; any value type converts.
    pub fn evaluate_scalar(&mut self, scope: ScopeId, pt_expr: &PtExpr) -> ElbResult<ScalarVal> {
        Ok(self.evaluate_expr(scope, pt_expr)?.to_scalar())
    }

    /// Evaluates a constant expression and converts to a bit vector.
    pub fn evaluate_bitvector(&mut self, scope: ScopeId, pt_expr: &PtExpr) -> ElbResult<BitVector> {
        let value = self.evaluate_expr(scope, pt_expr)?;
        value.to_bitvector().ok_or_else(|| ElbError::bv_required(pt_expr.region))
    }

    /// Evaluates a `[left:right]` pair.
    pub fn evaluate_range(&mut self, scope: ScopeId, left: &PtExpr, right: &PtExpr) -> ElbResult<(i32, i32)> {
        let left_val = self.evaluate_int(scope, left)?;
        let right_val = self.evaluate_int(scope, right)?;
        Ok((left_val, right_val))
    }

    fn eval_expr(&mut self, scope: ScopeId, pt_expr: &PtExpr, frame: Option<&ConstFuncFrame>) -> ElbResult<VlValue> {
        match &pt_expr.kind {
            PtExprKind::Opr { op, operands } => self.eval_opr(scope, pt_expr, *op, operands, frame),
            PtExprKind::Const { .. } => eval_const(pt_expr),
            PtExprKind::FuncCall { .. } => self.eval_funccall(scope, pt_expr, frame),
            PtExprKind::SysFuncCall { .. } => Err(ElbError::sysfunccall_in_ce(pt_expr)),
            PtExprKind::Primary { .. } => self.eval_primary(scope, pt_expr, frame),
        }
    }

    fn eval_opr(
        &mut self,
        scope: ScopeId,
        pt_expr: &PtExpr,
        op: OpType,
        operands: &[PtExpr],
        frame: Option<&ConstFuncFrame>,
    ) -> ElbResult<VlValue> {
        // Short-circuit forms first; their right operand must not be
        // evaluated when the left decides.
        match op {
            OpType::Null | OpType::MinTypMax => {
                // Parenthesisation; min:typ:max takes the typical value.
                let pos = if op == OpType::MinTypMax && operands.len() == 3 { 1 } else { 0 };
                return self.eval_expr(scope, &operands[pos], frame);
            }
            OpType::LogAnd => {
                let lhs = self.eval_expr(scope, &operands[0], frame)?;
                if !lhs.to_bool() && !lhs.to_scalar().is_xz() {
                    return Ok(VlValue::scalar(ScalarVal::Zero));
                }
                let rhs = self.eval_expr(scope, &operands[1], frame)?;
                return Ok(lhs.log_and(&rhs));
            }
            OpType::LogOr => {
                let lhs = self.eval_expr(scope, &operands[0], frame)?;
                if lhs.to_bool() {
                    return Ok(VlValue::scalar(ScalarVal::One));
                }
                let rhs = self.eval_expr(scope, &operands[1], frame)?;
                return Ok(lhs.log_or(&rhs));
            }
            OpType::Condition => {
                // Both arms are evaluated for type agreement, then one
                // is picked.
                let cond = self.eval_expr(scope, &operands[0], frame)?;
                let then_val = self.eval_expr(scope, &operands[1], frame)?;
                let else_val = self.eval_expr(scope, &operands[2], frame)?;
                return Ok(if cond.to_bool() { then_val } else { else_val });
            }
            OpType::Posedge | OpType::Negedge => {
                return Err(ElbError::illegal_edge_descriptor(pt_expr));
            }
            _ => {}
        }

        let mut values = Vec::with_capacity(operands.len());
        for operand in operands {
            values.push(self.eval_expr(scope, operand, frame)?);
        }

        let result = match (op, values.as_slice()) {
            (OpType::Minus, [v]) => v.neg(),
            (OpType::Plus, [v]) => v.clone(),
            (OpType::Not, [v]) => v.log_not(),
            (OpType::BitNeg, [v]) => v.bit_not(),
            (OpType::UnaryAnd, [v]) => v.reduce_and(),
            (OpType::UnaryNand, [v]) => v.reduce_nand(),
            (OpType::UnaryOr, [v]) => v.reduce_or(),
            (OpType::UnaryNor, [v]) => v.reduce_nor(),
            (OpType::UnaryXor, [v]) => v.reduce_xor(),
            (OpType::UnaryXNor, [v]) => v.reduce_xnor(),
            (OpType::Add, [a, b]) => a.add(b),
            (OpType::Sub, [a, b]) => a.sub(b),
            (OpType::Mult, [a, b]) => a.mul(b),
            (OpType::Div, [a, b]) => a.div(b),
            (OpType::Mod, [a, b]) => a.rem(b),
            (OpType::Power, [a, b]) => a.pow(b),
            (OpType::BitAnd, [a, b]) => a.bit_and(b),
            (OpType::BitOr, [a, b]) => a.bit_or(b),
            (OpType::BitXor, [a, b]) => a.bit_xor(b),
            (OpType::BitXNor, [a, b]) => a.bit_xnor(b),
            (OpType::Eq, [a, b]) => a.log_eq(b),
            (OpType::Neq, [a, b]) => a.log_neq(b),
            (OpType::CaseEq, [a, b]) => a.case_eq(b),
            (OpType::CaseNeq, [a, b]) => a.case_neq(b),
            (OpType::Lt, [a, b]) => a.lt(b),
            (OpType::Le, [a, b]) => a.le(b),
            (OpType::Gt, [a, b]) => a.gt(b),
            (OpType::Ge, [a, b]) => a.ge(b),
            (OpType::LShift | OpType::ArithLShift, [a, b]) => a.shift_left(b),
            (OpType::RShift, [a, b]) => a.shift_right(b, false),
            (OpType::ArithRShift, [a, b]) => a.shift_right(b, true),
            (OpType::Concat, _) => concat_values(&values, pt_expr)?,
            (OpType::MultiConcat, _) => {
                let rep = values[0]
                    .to_int()
                    .ok_or_else(|| ElbError::new(pt_expr.region, ElbErrorKind::EvalIntError, "int value required."))?;
                if rep < 0 {
                    return Err(ElbError::eval_error(pt_expr.region, "negative repeat count."));
                }
                let inner = concat_values(&values[1..], pt_expr)?;
                match inner.to_bitvector() {
                    Some(bv) => VlValue::BitVector(bv.repeat(rep as u32)),
                    None => return Err(ElbError::bv_required(pt_expr.region)),
                }
            }
            _ => {
                return Err(ElbError::eval_error(
                    pt_expr.region,
                    format!("unexpected operator {op} in constant expression."),
                ));
            }
        };
        Ok(result)
    }

    fn eval_primary(&mut self, scope: ScopeId, pt_expr: &PtExpr, frame: Option<&ConstFuncFrame>) -> ElbResult<VlValue> {
        let PtExprKind::Primary {
            name,
            branches,
            indices,
            range_mode,
            left,
            right,
        } = &pt_expr.kind
        else {
            unreachable!("eval_primary on a non-primary");
        };

        if !branches.is_empty() {
            return Err(ElbError::hname_in_ce(pt_expr));
        }

        // Function locals shadow everything outside the frame.
        let base = if let Some(value) = frame.and_then(|f| f.locals.get(name)) {
            value.clone()
        } else {
            let Some((_, handle)) = self.db.find_obj_up(scope, name) else {
                return Err(ElbError::not_found_expr(pt_expr));
            };
            match handle {
                ObjHandle::Param(id) => self.db.param(id).value.clone(),
                ObjHandle::Genvar(id) => VlValue::Int(self.db.genvar(id).value),
                ObjHandle::Decl(_) | ObjHandle::DeclArray(_) => {
                    return Err(ElbError::not_constant(pt_expr));
                }
                _ => return Err(ElbError::not_a_parameter(pt_expr)),
            }
        };

        // Apply bit-/part-selects on the evaluated value.
        let mut value = base;
        for index in indices {
            let i = self.eval_index(scope, index, frame)?;
            value = select_bit(&value, i, pt_expr)?;
        }
        match (left, right) {
            (Some(l), Some(r)) => {
                use crate::lang::RangeMode;
                match range_mode {
                    RangeMode::Const => {
                        let lv = self.eval_index(scope, l, frame)?;
                        let rv = self.eval_index(scope, r, frame)?;
                        value = select_part(&value, lv, rv, pt_expr)?;
                    }
                    RangeMode::Plus | RangeMode::Minus => {
                        let base_i = self.eval_index(scope, l, frame)?;
                        let width = self.eval_index(scope, r, frame)?;
                        let (lv, rv) = if *range_mode == crate::lang::RangeMode::Plus {
                            (base_i + width - 1, base_i)
                        } else {
                            (base_i, base_i - width + 1)
                        };
                        value = select_part(&value, lv, rv, pt_expr)?;
                    }
                    RangeMode::No => {}
                }
            }
            _ => {}
        }
        Ok(value)
    }

    fn eval_index(&mut self, scope: ScopeId, pt_expr: &PtExpr, frame: Option<&ConstFuncFrame>) -> ElbResult<i32> {
        let value = self.eval_expr(scope, pt_expr, frame)?;
        value
            .to_int()
            .ok_or_else(|| ElbError::new(pt_expr.region, ElbErrorKind::EvalIntError, "int value required."))
    }

    /// Calls a constant function: lazily elaborates it, binds actuals
    /// to formals with type coercion, interprets the body and reads the
    /// self-named result.
    fn eval_funccall(&mut self, scope: ScopeId, pt_expr: &PtExpr, frame: Option<&ConstFuncFrame>) -> ElbResult<VlValue> {
        let PtExprKind::FuncCall { name, branches, args } = &pt_expr.kind else {
            unreachable!("eval_funccall on a non-funccall");
        };
        if !branches.is_empty() {
            return Err(ElbError::hname_in_ce(pt_expr));
        }

        let (tf, pt_func) = self.find_constant_function(scope, name, pt_expr)?;

        let func = self.db.taskfunc(tf);
        if func.ios.len() != args.len() {
            return Err(ElbError::n_of_arguments_mismatch(pt_expr));
        }
        let formals: Vec<(String, crate::vtype::VlValueType)> = func
            .ios
            .iter()
            .map(|io| {
                let decl = self.db.decl(io.decl);
                (decl.name.clone(), decl.value_type())
            })
            .collect();
        let func_scope = func.scope;
        let ret_name = func.name.clone();
        let ret_type = func.ret_type;

        // Bind actuals, coercing each to its formal's declared type.
        let mut locals = AHashMap::new();
        for ((formal_name, formal_type), arg) in formals.iter().zip(args) {
            let value = self.eval_expr(scope, arg, frame)?.coerce(*formal_type);
            locals.insert(formal_name.clone(), value);
        }
        locals.insert(ret_name.clone(), VlValue::Error);

        let mut callee_frame = ConstFuncFrame { locals };
        self.func_in_use.insert(pt_func.id);
        let result = self.exec_stmt(func_scope, &pt_func.body, &mut callee_frame);
        self.func_in_use.remove(&pt_func.id);
        result?;

        let result = callee_frame.locals.remove(&ret_name).unwrap_or(VlValue::Error);
        // The result reads through the function's typed result
        // variable.
        Ok(if ret_type.is_no_type() {
            result
        } else {
            result.coerce(ret_type)
        })
    }

    /// Looks up (or lazily builds) the constant-function rendition of
    /// `name` in the module enclosing `scope`.
    pub(crate) fn find_constant_function(
        &mut self,
        scope: ScopeId,
        name: &str,
        pt_expr: &PtExpr,
    ) -> ElbResult<(TaskFuncId, &'a PtTaskFunc)> {
        let module = self
            .db
            .parent_module(scope)
            .ok_or_else(|| ElbError::no_such_function(pt_expr))?;
        let module_scope = self.db.module(module).scope;
        let def_name = self.db.module(module).def_name.clone();

        // Constant functions live directly under the module; functions
        // inside generate scopes do not qualify.
        let pt_module = self
            .pt
            .find_moduledef(&def_name)
            .ok_or_else(|| ElbError::no_such_function(pt_expr))?;
        let pt_func = pt_module
            .items
            .iter()
            .find_map(|item| match item {
                crate::pt::PtItem::Function(tf) if tf.name == name => Some(tf),
                _ => None,
            })
            .ok_or_else(|| ElbError::no_such_function(pt_expr))?;

        if self.func_in_use.contains(&pt_func.id) {
            return Err(ElbError::uses_itself(pt_expr));
        }

        if let Some(&tf) = self.db.constant_funcs.get(&(module_scope, name.to_owned())) {
            return Ok((tf, pt_func));
        }

        self.func_in_use.insert(pt_func.id);
        let built = self.instantiate_constant_function(module_scope, pt_func);
        self.func_in_use.remove(&pt_func.id);
        let tf = built?;
        self.check_constant_function_body(&pt_func.body, pt_expr)?;
        self.db.taskfunc_mut(tf).is_constant_function = true;
        self.db
            .constant_funcs
            .insert((module_scope, name.to_owned()), tf);
        Ok((tf, pt_func))
    }

    /// Rejects bodies that disqualify a function from constant use:
    /// system calls, hierarchical references, event controls.
    fn check_constant_function_body(&self, stmt: &PtStmt, at: &PtExpr) -> ElbResult<()> {
        match &stmt.kind {
            PtStmtKind::SysEnable { .. } => Err(ElbError::sysfunccall_in_cf(at)),
            PtStmtKind::Enable { .. }
            | PtStmtKind::Disable { .. }
            | PtStmtKind::EventTrigger { .. }
            | PtStmtKind::Ctrl { .. }
            | PtStmtKind::Wait { .. }
            | PtStmtKind::PcAssign { .. }
            | PtStmtKind::Deassign { .. }
            | PtStmtKind::Force { .. }
            | PtStmtKind::Release { .. }
            | PtStmtKind::NbAssign { .. } => Err(ElbError::new(
                stmt.region,
                ElbErrorKind::IllegalObjectCf,
                "statement not allowed inside a constant function.",
            )),
            PtStmtKind::Block { stmts, .. } => {
                for s in stmts {
                    self.check_constant_function_body(s, at)?;
                }
                Ok(())
            }
            PtStmtKind::If {
                then_stmt, else_stmt, ..
            } => {
                self.check_constant_function_body(then_stmt, at)?;
                if let Some(e) = else_stmt {
                    self.check_constant_function_body(e, at)?;
                }
                Ok(())
            }
            PtStmtKind::Case { items, .. } => {
                for item in items {
                    if let Some(body) = &item.body {
                        self.check_constant_function_body(body, at)?;
                    }
                }
                Ok(())
            }
            PtStmtKind::For { init, next, body, .. } => {
                self.check_constant_function_body(init, at)?;
                self.check_constant_function_body(next, at)?;
                self.check_constant_function_body(body, at)
            }
            PtStmtKind::While { body, .. } | PtStmtKind::Repeat { body, .. } | PtStmtKind::Forever { body } => {
                self.check_constant_function_body(body, at)
            }
            PtStmtKind::Null | PtStmtKind::Assign { .. } => Ok(()),
        }
    }

    /// Interprets one statement of a constant-function body.
    fn exec_stmt(&mut self, scope: ScopeId, stmt: &PtStmt, frame: &mut ConstFuncFrame) -> ElbResult<()> {
        match &stmt.kind {
            PtStmtKind::Null => Ok(()),
            PtStmtKind::Assign { lhs, rhs, .. } => {
                let value = self.eval_expr(scope, rhs, Some(frame))?;
                self.exec_assign(scope, lhs, value, frame)
            }
            PtStmtKind::Block { stmts, .. } => {
                for s in stmts {
                    self.exec_stmt(scope, s, frame)?;
                }
                Ok(())
            }
            PtStmtKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                if self.eval_expr(scope, cond, Some(frame))?.to_bool() {
                    self.exec_stmt(scope, then_stmt, frame)
                } else if let Some(e) = else_stmt {
                    self.exec_stmt(scope, e, frame)
                } else {
                    Ok(())
                }
            }
            PtStmtKind::Case { expr, items, .. } => {
                let selector = self.eval_expr(scope, expr, Some(frame))?;
                let mut default = None;
                for item in items {
                    if item.labels.is_empty() {
                        default = item.body.as_ref();
                        continue;
                    }
                    for label in &item.labels {
                        let lv = self.eval_expr(scope, label, Some(frame))?;
                        if selector.case_eq(&lv).to_bool() {
                            return match &item.body {
                                Some(body) => self.exec_stmt(scope, body, frame),
                                None => Ok(()),
                            };
                        }
                    }
                }
                match default {
                    Some(body) => self.exec_stmt(scope, body, frame),
                    None => Ok(()),
                }
            }
            PtStmtKind::For { init, cond, next, body } => {
                self.exec_stmt(scope, init, frame)?;
                let mut fuel = CONST_FUNC_FUEL;
                while self.eval_expr(scope, cond, Some(frame))?.to_bool() {
                    self.exec_stmt(scope, body, frame)?;
                    self.exec_stmt(scope, next, frame)?;
                    fuel -= 1;
                    if fuel == 0 {
                        return Err(ElbError::eval_error(stmt.region, "constant function did not terminate."));
                    }
                }
                Ok(())
            }
            PtStmtKind::While { cond, body } => {
                let mut fuel = CONST_FUNC_FUEL;
                while self.eval_expr(scope, cond, Some(frame))?.to_bool() {
                    self.exec_stmt(scope, body, frame)?;
                    fuel -= 1;
                    if fuel == 0 {
                        return Err(ElbError::eval_error(stmt.region, "constant function did not terminate."));
                    }
                }
                Ok(())
            }
            PtStmtKind::Repeat { expr, body } => {
                let count = self.eval_expr(scope, expr, Some(frame))?;
                let count = count
                    .to_int()
                    .ok_or_else(|| ElbError::new(expr.region, ElbErrorKind::EvalIntError, "int value required."))?;
                for _ in 0..count.max(0) {
                    self.exec_stmt(scope, body, frame)?;
                }
                Ok(())
            }
            _ => Err(ElbError::new(
                stmt.region,
                ElbErrorKind::IllegalObjectCf,
                "statement not allowed inside a constant function.",
            )),
        }
    }

    /// Assigns into the frame, handling whole-name and bit-select
    /// targets.
    fn exec_assign(&mut self, scope: ScopeId, lhs: &PtExpr, value: VlValue, frame: &mut ConstFuncFrame) -> ElbResult<()> {
        let PtExprKind::Primary { name, branches, indices, .. } = &lhs.kind else {
            return Err(ElbError::new(
                lhs.region,
                ElbErrorKind::IllegalObjectCf,
                "unsupported left-hand side inside a constant function.",
            ));
        };
        if !branches.is_empty() {
            return Err(ElbError::hname_in_cf(lhs));
        }
        if !frame.locals.contains_key(name) {
            return Err(ElbError::new(
                lhs.region,
                ElbErrorKind::IllegalObjectCf,
                format!("{name}: not a variable of this constant function."),
            ));
        }
        if indices.is_empty() {
            frame.locals.insert(name.clone(), value);
            return Ok(());
        }
        // Single bit-select write.
        if indices.len() != 1 {
            return Err(ElbError::dimension_mismatch(lhs));
        }
        let i = self.eval_index(scope, &indices[0], Some(frame))?;
        let current = frame.locals.get(name).cloned().unwrap_or(VlValue::Error);
        let Some(mut bv) = current.to_bitvector() else {
            return Err(ElbError::bv_required(lhs.region));
        };
        if i < 0 || (i as u32) >= bv.width() {
            return Err(ElbError::eval_error(lhs.region, "bit-select out of range."));
        }
        bv.set_bit(i as u32, value.to_scalar());
        frame.locals.insert(name.clone(), VlValue::BitVector(bv));
        Ok(())
    }
}

/// Iteration ceiling for loops inside constant functions; hitting it is
/// reported as non-termination.
const CONST_FUNC_FUEL: u32 = 1 << 20;

/// Decodes a PT constant into a value.
pub(crate) fn eval_const(pt_expr: &PtExpr) -> ElbResult<VlValue> {
    let PtExprKind::Const {
        ctype,
        size,
        uint,
        str,
        real,
    } = &pt_expr.kind
    else {
        unreachable!("eval_const on a non-constant");
    };
    match ctype {
        ConstType::Int => Ok(VlValue::Int(*uint as i32)),
        ConstType::Real => Ok(VlValue::Real(*real)),
        ConstType::String => Ok(VlValue::Str(str.clone())),
        _ => {
            let radix = ctype.radix().unwrap_or(10);
            let digits = if str.is_empty() { uint.to_string() } else { str.clone() };
            BitVector::from_literal(radix, &digits, *size, ctype.is_signed())
                .map(VlValue::BitVector)
                .map_err(|msg| ElbError::eval_error(pt_expr.region, msg))
        }
    }
}

fn concat_values(values: &[VlValue], pt_expr: &PtExpr) -> ElbResult<VlValue> {
    let mut parts = Vec::with_capacity(values.len());
    for value in values {
        if value.is_real() {
            return Err(ElbError::illegal_real_type(pt_expr));
        }
        parts.push(value.to_bitvector().ok_or_else(|| ElbError::bv_required(pt_expr.region))?);
    }
    Ok(VlValue::BitVector(BitVector::concat(&parts)))
}

fn select_bit(value: &VlValue, index: i32, pt_expr: &PtExpr) -> ElbResult<VlValue> {
    if value.is_real() {
        return Err(ElbError::select_on_real(pt_expr));
    }
    let bv = value.to_bitvector().ok_or_else(|| ElbError::bv_required(pt_expr.region))?;
    if index < 0 || (index as u32) >= bv.width() {
        return Ok(VlValue::scalar(ScalarVal::X));
    }
    Ok(VlValue::scalar(bv.bit(index as u32)))
}

fn select_part(value: &VlValue, left: i32, right: i32, pt_expr: &PtExpr) -> ElbResult<VlValue> {
    if value.is_real() {
        return Err(ElbError::select_on_real(pt_expr));
    }
    let bv = value.to_bitvector().ok_or_else(|| ElbError::bv_required(pt_expr.region))?;
    let (msb, lsb) = if left >= right { (left, right) } else { (right, left) };
    if lsb < 0 || (msb as u32) >= bv.width() {
        return Ok(VlValue::BitVector(BitVector::all_x(left.abs_diff(right) + 1)));
    }
    Ok(VlValue::BitVector(bv.part(msb as u32, lsb as u32)))
}
