use indexmap::IndexMap;
use serde::Serialize;

use crate::vl::{ScopeId, VlDb, VlExprKind, VlTag};

/// A serializable snapshot node of the elaborated database.
///
/// The CLI prints the tree as JSON under `--dump`; tests use it for
/// structural comparison of two elaboration runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumpNode {
    pub kind: &'static str,
    pub name: String,
    /// Scalar facts about the node, in insertion order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub facts: IndexMap<&'static str, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DumpNode>,
}

impl DumpNode {
    fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            facts: IndexMap::new(),
            children: vec![],
        }
    }

    fn fact(&mut self, key: &'static str, value: impl ToString) {
        self.facts.insert(key, value.to_string());
    }
}

/// Dumps every top module of an elaborated design.
pub fn dump_design(db: &VlDb) -> DumpNode {
    let mut root = DumpNode::new("design", "");
    for &module in db.topmodule_list() {
        root.children.push(dump_scope(db, db.module(module).scope));
    }
    root
}

fn dump_scope(db: &VlDb, scope: ScopeId) -> DumpNode {
    let sc = db.scope(scope);
    let mut node = DumpNode::new("scope", db.full_name(scope));
    node.fact("kind", format!("{:?}", sc.kind));

    for param in db.find_param_list(scope) {
        let p = db.param(param);
        let mut child = DumpNode::new(if p.is_local { "localparam" } else { "parameter" }, &p.name);
        child.fact("value", &p.value);
        child.fact("type", p.value_type());
        node.children.push(child);
    }

    for tag in [VlTag::Net, VlTag::Reg, VlTag::Variables, VlTag::NamedEvent] {
        for decl in db.find_decl_list(scope, tag) {
            let d = db.decl(decl);
            let mut child = DumpNode::new("decl", &d.name);
            child.fact("kind", format!("{:?}", d.kind));
            child.fact("type", d.value_type());
            if let Some(range) = &d.range {
                child.fact("range", range);
            }
            if let Some(dir) = d.io_dir {
                child.fact("dir", dir);
            }
            if let Some(init) = d.init {
                child.fact("init", dump_expr(db, init));
            }
            node.children.push(child);
        }
        let array_tag = match tag {
            VlTag::Net => VlTag::NetArray,
            VlTag::Reg => VlTag::RegArray,
            VlTag::Variables => VlTag::VariablesArray,
            _ => VlTag::NamedEventArray,
        };
        for array in db.find_declarray_list(scope, array_tag) {
            let a = db.decl_array(array);
            let mut child = DumpNode::new("declarray", &a.name);
            child.fact("dims", a.dims.dim());
            child.fact("elems", a.dims.elem_size());
            node.children.push(child);
        }
    }

    for assign in db.find_contassign_list(scope) {
        let c = db.cont_assign(assign);
        let mut child = DumpNode::new("contassign", "");
        child.fact("lhs", dump_expr(db, c.lhs));
        child.fact("rhs", dump_expr(db, c.rhs));
        node.children.push(child);
    }

    for process in db.find_process_list(scope) {
        let p = db.process(process);
        let mut child = DumpNode::new("process", "");
        child.fact("kind", p.kind);
        node.children.push(child);
    }

    for prim in db.find_primitive_list(scope) {
        let p = db.prim(prim);
        let mut child = DumpNode::new("primitive", p.name.clone().unwrap_or_default());
        child.fact("prim", p.prim_type);
        child.fact("terminals", p.terminals.len());
        node.children.push(child);
    }

    for func in db.find_function_list(scope) {
        let f = db.taskfunc(func);
        let mut child = DumpNode::new("function", &f.name);
        child.fact("type", f.ret_type);
        node.children.push(child);
    }

    for task in db.find_task_list(scope) {
        node.children.push(DumpNode::new("task", &db.taskfunc(task).name));
    }

    for array in db.find_modulearray_list(scope) {
        let a = db.module_array(array);
        let mut child = DumpNode::new("modulearray", &a.name);
        child.fact("range", &a.range);
        for &m in &a.modules {
            child.children.push(dump_scope(db, db.module(m).scope));
        }
        node.children.push(child);
    }

    for module in db.find_module_list(scope) {
        node.children.push(dump_scope(db, db.module(module).scope));
    }

    for inner in db.find_internalscope_list(scope) {
        node.children.push(dump_scope(db, inner));
    }

    node
}

/// Compact one-line rendering of an expression for the dump tree.
fn dump_expr(db: &VlDb, expr: crate::vl::ExprId) -> String {
    let e = db.expr(expr);
    match &e.kind {
        VlExprKind::Const(v) => v.to_string(),
        VlExprKind::Primary(obj) => primary_name(db, obj),
        VlExprKind::BitSelect {
            base, const_index, ..
        } => match const_index {
            Some(i) => format!("{}[{i}]", dump_expr(db, *base)),
            None => format!("{}[?]", dump_expr(db, *base)),
        },
        VlExprKind::PartSelect { base, left, right } => {
            format!("{}[{left}:{right}]", dump_expr(db, *base))
        }
        VlExprKind::PlusPartSelect { base, width, .. } => format!("{}[+:{width}]", dump_expr(db, *base)),
        VlExprKind::MinusPartSelect { base, width, .. } => format!("{}[-:{width}]", dump_expr(db, *base)),
        VlExprKind::Unary { op, opr } => format!("{op}({})", dump_expr(db, *opr)),
        VlExprKind::Binary { op, lhs, rhs } => {
            format!("({} {op} {})", dump_expr(db, *lhs), dump_expr(db, *rhs))
        }
        VlExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        } => format!(
            "({} ? {} : {})",
            dump_expr(db, *cond),
            dump_expr(db, *then_expr),
            dump_expr(db, *else_expr)
        ),
        VlExprKind::Concat { parts } | VlExprKind::Lhs { parts, .. } => {
            let inner: Vec<_> = parts.iter().map(|p| dump_expr(db, *p)).collect();
            format!("{{{}}}", inner.join(", "))
        }
        VlExprKind::MultiConcat { rep, parts, .. } => {
            let inner: Vec<_> = parts.iter().map(|p| dump_expr(db, *p)).collect();
            format!("{{{rep}{{{}}}}}", inner.join(", "))
        }
        VlExprKind::FuncCall { func, args } => {
            let inner: Vec<_> = args.iter().map(|a| dump_expr(db, *a)).collect();
            format!("{}({})", db.taskfunc(*func).name, inner.join(", "))
        }
        VlExprKind::SysFuncCall { name, args } => {
            let inner: Vec<_> = args
                .iter()
                .map(|a| a.map_or(String::new(), |a| dump_expr(db, a)))
                .collect();
            format!("{name}({})", inner.join(", "))
        }
    }
}

fn primary_name(db: &VlDb, obj: &crate::vl::PrimaryObj) -> String {
    use crate::vl::PrimaryObj as P;
    match obj {
        P::Decl(id) => db.decl(*id).name.clone(),
        P::ArrayElem { array, .. } => format!("{}[...]", db.decl_array(*array).name),
        P::Param(id) => db.param(*id).name.clone(),
        P::Genvar(id) => db.genvar(*id).name.clone(),
    }
}
