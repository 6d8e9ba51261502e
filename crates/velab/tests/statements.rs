//! Statement elaboration: case width unification, blocks and their
//! scopes, assignments, event controls, LHS restrictions.

use pretty_assertions::assert_eq;
use velab::{
    CollectSink, ConstType, ElabOptions, OpType, ProcessKind, SimpleSystfRegistry,
    pt::{
        DeclKind, PtCaseItemStmt, PtControl, PtDeclHead, PtDeclItem, PtExpr, PtItem, PtModule, PtSource, PtStmt,
        PtStmtKind,
    },
    vl::{ObjHandle, ScopeId, VlDb, VlStmtKind},
};

/// Builds a one-file source from `modules` and elaborates it,
/// collecting every diagnostic.
fn elaborate_modules(modules: Vec<PtModule>) -> (VlDb, CollectSink) {
    let mut source = PtSource::new();
    source.add_file("test.v");
    for module in modules {
        source.add_module(module);
    }
    let mut sink = CollectSink::new();
    let systf = SimpleSystfRegistry::new();
    let db = velab::elaborate(&source, &ElabOptions::default(), None, &systf, &mut sink);
    (db, sink)
}

/// The scope of the sole top module, which these tests revolve around.
fn top_scope(db: &VlDb) -> ScopeId {
    let &module = db.topmodule_list().first().expect("design has a top module");
    db.module(module).scope
}

fn always_module(body: PtStmt) -> PtModule {
    let mut m = PtModule::new("m");
    m.declheads.push(
        PtDeclHead::new(DeclKind::Reg, vec![PtDeclItem::new("r")]).with_range(PtExpr::int(3), PtExpr::int(0)),
    );
    m.items.push(PtItem::Process {
        region: Default::default(),
        kind: ProcessKind::Always,
        body,
        attrs: vec![],
    });
    m
}

/// Case labels `4'b0001`, `3'b010` and signed `1'sb1` unify to a
/// signed 4-bit type applied to the condition and every label.
#[test]
fn case_unifies_width_and_sign() {
    let case = PtStmt::new(Default::default(), PtStmtKind::Case {
        case_type: Default::default(),
        expr: PtExpr::primary("r"),
        items: vec![
            PtCaseItemStmt {
                region: Default::default(),
                labels: vec![PtExpr::based(Some(4), ConstType::Binary, "0001")],
                body: Some(PtStmt::null()),
            },
            PtCaseItemStmt {
                region: Default::default(),
                labels: vec![PtExpr::based(Some(3), ConstType::Binary, "010")],
                body: Some(PtStmt::null()),
            },
            PtCaseItemStmt {
                region: Default::default(),
                labels: vec![PtExpr::based(Some(1), ConstType::SignedBinary, "1")],
                body: Some(PtStmt::null()),
            },
            PtCaseItemStmt {
                region: Default::default(),
                labels: vec![],
                body: Some(PtStmt::null()),
            },
        ],
    });

    let (db, sink) = elaborate_modules(vec![always_module(case)]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let processes = db.find_process_list(scope);
    assert_eq!(processes.len(), 1);
    let body = db.process(processes[0]).body;
    let VlStmtKind::Case { cond, items, .. } = &db.stmt(body).kind else {
        panic!("expected a case statement");
    };

    let unified = db.expr(*cond).effective_type();
    assert!(unified.is_signed());
    assert_eq!(unified.size(), 4);
    for item in items {
        for &label in &item.labels {
            let t = db.expr(label).effective_type();
            assert_eq!((t.is_signed(), t.size()), (true, 4));
        }
    }
    // The default arm was moved to the tail.
    assert!(items.last().is_some_and(|i| i.labels.is_empty()));
}

/// A real-typed case condition is rejected.
#[test]
fn case_rejects_real_condition() {
    let case = PtStmt::new(Default::default(), PtStmtKind::Case {
        case_type: Default::default(),
        expr: PtExpr::real(1.5),
        items: vec![PtCaseItemStmt {
            region: Default::default(),
            labels: vec![PtExpr::int(1)],
            body: Some(PtStmt::null()),
        }],
    });

    let (_db, sink) = elaborate_modules(vec![always_module(case)]);
    assert!(sink.contains("real-type"), "diagnostics: {:?}", sink.messages);
}

/// Two default arms in one case are rejected.
#[test]
fn case_rejects_two_defaults() {
    let default_arm = PtCaseItemStmt {
        region: Default::default(),
        labels: vec![],
        body: Some(PtStmt::null()),
    };
    let case = PtStmt::new(Default::default(), PtStmtKind::Case {
        case_type: Default::default(),
        expr: PtExpr::primary("r"),
        items: vec![default_arm.clone(), default_arm],
    });

    let (_db, sink) = elaborate_modules(vec![always_module(case)]);
    assert!(sink.contains("multiple default"), "diagnostics: {:?}", sink.messages);
}

/// Named blocks create scopes reachable by name; their declarations
/// live inside.
#[test]
fn named_block_scopes_its_decls() {
    let block = PtStmt::new(Default::default(), PtStmtKind::Block {
        parallel: false,
        name: Some("work".to_owned()),
        declheads: vec![PtDeclHead::new(DeclKind::Reg, vec![PtDeclItem::new("tmp")])],
        stmts: vec![PtStmt::assign(PtExpr::primary("tmp"), PtExpr::int(1))],
    });

    let (db, sink) = elaborate_modules(vec![always_module(block)]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let Some(ObjHandle::Scope(block_scope)) = db.find_obj(scope, "work") else {
        panic!("named block scope missing");
    };
    assert!(matches!(db.find_obj(block_scope, "tmp"), Some(ObjHandle::Decl(_))));
    // The name is invisible at module level.
    assert!(db.find_obj(scope, "tmp").is_none());
}

/// The RHS of an assignment is size-fit to its LHS.
#[test]
fn assignment_sizes_rhs_to_lhs() {
    let assign = PtStmt::assign(
        PtExpr::primary("r"),
        PtExpr::binary(
            OpType::Add,
            PtExpr::based(Some(2), ConstType::Binary, "11"),
            PtExpr::based(Some(2), ConstType::Binary, "01"),
        ),
    );

    let (db, sink) = elaborate_modules(vec![always_module(assign)]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let body = db.process(db.find_process_list(scope)[0]).body;
    let VlStmtKind::Assign { lhs, rhs, nonblocking, .. } = &db.stmt(body).kind else {
        panic!("expected an assignment");
    };
    assert!(!nonblocking);
    assert_eq!(db.expr(*lhs).width(), 4);
    assert_eq!(db.expr(*rhs).width(), 4, "RHS is widened to the LHS width");
}

/// Event controls accept edge descriptors, plain expressions reject
/// them.
#[test]
fn edge_descriptors_only_in_event_context() {
    let good = PtStmt::new(Default::default(), PtStmtKind::Ctrl {
        control: PtControl::Event(vec![PtExpr::unary(OpType::Posedge, PtExpr::primary("r"))]),
        body: Box::new(PtStmt::assign(PtExpr::primary("r"), PtExpr::int(0))),
    });
    let (_db, sink) = elaborate_modules(vec![always_module(good)]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let bad = PtStmt::assign(
        PtExpr::primary("r"),
        PtExpr::unary(OpType::Posedge, PtExpr::primary("r")),
    );
    let (_db, sink) = elaborate_modules(vec![always_module(bad)]);
    assert!(sink.contains("edge descriptor"), "diagnostics: {:?}", sink.messages);
}

/// A parenthesised event expression keeps its event context.
#[test]
fn parenthesised_event_expression_keeps_env() {
    let stmt = PtStmt::new(Default::default(), PtStmtKind::Ctrl {
        control: PtControl::Event(vec![PtExpr::paren(PtExpr::unary(OpType::Posedge, PtExpr::primary("r")))]),
        body: Box::new(PtStmt::null()),
    });
    let (_db, sink) = elaborate_modules(vec![always_module(stmt)]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);
}

/// Constants cannot head a left-hand side.
#[test]
fn constant_lhs_is_rejected() {
    let stmt = PtStmt::assign(PtExpr::int(1), PtExpr::int(0));
    let (_db, sink) = elaborate_modules(vec![always_module(stmt)]);
    assert!(
        sink.contains("constant shall not be used in left-hand side"),
        "diagnostics: {:?}",
        sink.messages
    );
}

/// Bit- and part-selects are not allowed on the LHS of a procedural
/// continuous assignment.
#[test]
fn pca_rejects_selects() {
    let stmt = PtStmt::new(Default::default(), PtStmtKind::PcAssign {
        lhs: PtExpr::bit_select("r", PtExpr::int(0)),
        rhs: PtExpr::int(1),
    });
    let (_db, sink) = elaborate_modules(vec![always_module(stmt)]);
    assert!(
        sink.contains("assign/deassign"),
        "diagnostics: {:?}",
        sink.messages
    );
}

/// Task enables match arity against the task's formals.
#[test]
fn task_enable_checks_arity() {
    let mut m = PtModule::new("m");
    m.declheads.push(
        PtDeclHead::new(DeclKind::Reg, vec![PtDeclItem::new("r")]).with_range(PtExpr::int(3), PtExpr::int(0)),
    );
    m.items.push(PtItem::Task(velab::pt::PtTaskFunc {
        id: Default::default(),
        region: Default::default(),
        name: "t".to_owned(),
        automatic: false,
        signed: false,
        range: None,
        var_type: Default::default(),
        ioheads: vec![
            velab::pt::PtIoHead::new(velab::Direction::Input, vec![velab::pt::PtIoItem::new("a")])
                .with_range(PtExpr::int(3), PtExpr::int(0)),
        ],
        declheads: vec![],
        body: PtStmt::null(),
        attrs: vec![],
    }));
    m.items.push(PtItem::Process {
        region: Default::default(),
        kind: ProcessKind::Initial,
        body: PtStmt::new(Default::default(), PtStmtKind::Enable {
            branches: vec![],
            name: "t".to_owned(),
            args: vec![PtExpr::primary("r"), PtExpr::int(1)],
        }),
        attrs: vec![],
    });

    let (_db, sink) = elaborate_modules(vec![m]);
    assert!(
        sink.contains("number of arguments mismatch"),
        "diagnostics: {:?}",
        sink.messages
    );
}
