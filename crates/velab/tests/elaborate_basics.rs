//! End-to-end elaboration of small designs: parameters feeding ranges,
//! constant functions, implicit nets, continuous assigns.

use pretty_assertions::assert_eq;
use velab::{
    CollectSink, ConstType, Direction, ElabOptions, OpType, SimpleSystfRegistry,
    pt::{
        DeclKind, PtContAssign, PtDeclHead, PtDeclItem, PtExpr, PtIoHead, PtIoItem, PtItem, PtModule, PtPort,
        PtSource, PtStmt, PtTaskFunc,
    },
    vl::{ObjHandle, ScopeId, VlDb, VlTag},
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

/// `module m; parameter P = 1 + 2; wire [P-1:0] w; endmodule`
#[test]
fn parameter_feeds_wire_range() {
    let mut m = PtModule::new("m");
    m.declheads.push(PtDeclHead::new(
        DeclKind::Param,
        vec![PtDeclItem::with_init(
            "P",
            PtExpr::binary(OpType::Add, PtExpr::int(1), PtExpr::int(2)),
        )],
    ));
    m.declheads.push(
        PtDeclHead::new(DeclKind::Net, vec![PtDeclItem::new("w")]).with_range(
            PtExpr::binary(OpType::Sub, PtExpr::primary("P"), PtExpr::int(1)),
            PtExpr::int(0),
        ),
    );

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let Some(ObjHandle::Param(p)) = db.find_obj(scope, "P") else {
        panic!("P did not elaborate to a parameter");
    };
    assert_eq!(db.param(p).value.to_int(), Some(3));

    let Some(ObjHandle::Decl(w)) = db.find_obj(scope, "w") else {
        panic!("w did not elaborate to a declaration");
    };
    let range = db.decl(w).range.as_ref().expect("w has a range");
    assert_eq!(range.size(), 3);
    assert!(range.is_big_endian());
    assert_eq!(db.decl(w).value_type().size(), 3);
}

fn constant_function_module() -> PtModule {
    // function [7:0] f; input [7:0] x; f = x + 1; endfunction
    let mut m = PtModule::new("m");
    m.items.push(PtItem::Function(PtTaskFunc {
        id: Default::default(),
        region: Default::default(),
        name: "f".to_owned(),
        automatic: false,
        signed: false,
        range: Some(velab::pt::PtRange::new(PtExpr::int(7), PtExpr::int(0))),
        var_type: Default::default(),
        ioheads: vec![
            PtIoHead::new(Direction::Input, vec![PtIoItem::new("x")])
                .with_range(PtExpr::int(7), PtExpr::int(0)),
        ],
        declheads: vec![],
        body: PtStmt::assign(
            PtExpr::primary("f"),
            PtExpr::binary(OpType::Add, PtExpr::primary("x"), PtExpr::int(1)),
        ),
        attrs: vec![],
    }));
    m
}

/// `wire [7:0] w = f(8'hFE);` elaborates the implicit continuous
/// assign, calling `f` as an ordinary function.
#[test]
fn function_call_in_net_initializer() {
    let mut m = constant_function_module();
    m.declheads.push(
        PtDeclHead::new(
            DeclKind::Net,
            vec![PtDeclItem::with_init(
                "w",
                PtExpr::func_call("f", vec![PtExpr::based(Some(8), ConstType::Hex, "fe")]),
            )],
        )
        .with_range(PtExpr::int(7), PtExpr::int(0)),
    );

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let assigns = db.find_contassign_list(scope);
    assert_eq!(assigns.len(), 1, "the initializer becomes one continuous assign");
    let ca = db.cont_assign(assigns[0]);
    assert_eq!(db.expr(ca.lhs).width(), 8);
    assert_eq!(db.expr(ca.rhs).width(), 8);
}

/// Evaluating `f` as a constant function: `localparam [7:0] C =
/// f(8'hFE);` yields `8'hFF`.
#[test]
fn constant_function_evaluates() {
    let mut m = constant_function_module();
    m.declheads.push(
        PtDeclHead::new(
            DeclKind::LocalParam,
            vec![PtDeclItem::with_init(
                "C",
                PtExpr::func_call("f", vec![PtExpr::based(Some(8), ConstType::Hex, "fe")]),
            )],
        )
        .with_range(PtExpr::int(7), PtExpr::int(0)),
    );

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let Some(ObjHandle::Param(c)) = db.find_obj(scope, "C") else {
        panic!("C did not elaborate to a parameter");
    };
    assert_eq!(db.param(c).value.to_int(), Some(0xff));
    assert!(db.param(c).is_local);
}

/// Evaluating the same constant expression twice yields equal values.
#[test]
fn constant_evaluation_is_stable() {
    let mut m = constant_function_module();
    for name in ["C1", "C2"] {
        m.declheads.push(PtDeclHead::new(
            DeclKind::LocalParam,
            vec![PtDeclItem::with_init(
                name,
                PtExpr::func_call("f", vec![PtExpr::based(Some(8), ConstType::Hex, "0f")]),
            )],
        ));
    }

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0);
    let scope = top_scope(&db);
    let Some(ObjHandle::Param(c1)) = db.find_obj(scope, "C1") else {
        panic!("C1 missing");
    };
    let Some(ObjHandle::Param(c2)) = db.find_obj(scope, "C2") else {
        panic!("C2 missing");
    };
    assert_eq!(db.param(c1).value, db.param(c2).value);
}

/// An undeclared continuous-assign LHS becomes an implicit net of the
/// default net type.
#[test]
fn implicit_net_on_assign_lhs() {
    let mut m = PtModule::new("m");
    m.declheads.push(
        PtDeclHead::new(DeclKind::Net, vec![PtDeclItem::new("a")]).with_range(PtExpr::int(3), PtExpr::int(0)),
    );
    m.items.push(PtItem::ContAssign {
        region: Default::default(),
        strength: None,
        delay: None,
        assigns: vec![PtContAssign::new(PtExpr::primary("y"), PtExpr::primary("a"))],
    });

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);
    let scope = top_scope(&db);
    assert!(matches!(db.find_obj(scope, "y"), Some(ObjHandle::Decl(_))));
    let nets = db.find_decl_list(scope, VlTag::Net);
    assert_eq!(nets.len(), 2);
}

/// `` `default_nettype none `` turns the same design into an error.
#[test]
fn implicit_net_rejected_under_nettype_none() {
    let mut m = PtModule::new("m");
    m.default_nettype = velab::NetType::None;
    m.items.push(PtItem::ContAssign {
        region: Default::default(),
        strength: None,
        delay: None,
        assigns: vec![PtContAssign::new(PtExpr::primary("y"), PtExpr::int(1))],
    });

    let (_db, sink) = elaborate_modules(vec![m]);
    assert!(sink.error_count() > 0);
    assert!(sink.contains("implicit net"), "diagnostics: {:?}", sink.messages);
}

/// IO declarations reconcile with inner declarations; ports carry the
/// reconciled direction.
#[test]
fn io_decl_reconciles_with_inner_decl() {
    let mut m = PtModule::new("m");
    m.ports.push(PtPort::simple("q", Direction::Output));
    m.ports.push(PtPort::simple("d", Direction::Input));
    m.ioheads.push(
        PtIoHead::new(Direction::Output, vec![PtIoItem::new("q")]).with_range(PtExpr::int(1), PtExpr::int(0)),
    );
    m.ioheads.push(PtIoHead::new(Direction::Input, vec![PtIoItem::new("d")]));
    m.declheads.push(
        PtDeclHead::new(DeclKind::Reg, vec![PtDeclItem::new("q")]).with_range(PtExpr::int(1), PtExpr::int(0)),
    );

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let Some(ObjHandle::Decl(q)) = db.find_obj(scope, "q") else {
        panic!("q missing");
    };
    assert_eq!(db.decl(q).io_dir, Some(Direction::Output));
    assert_eq!(db.decl(q).value_type().size(), 2);

    let &module = db.topmodule_list().first().unwrap();
    let ports = &db.module(module).ports;
    assert_eq!(ports.len(), 2);
    assert_eq!(ports[0].dir, Direction::Output);
    assert_eq!(ports[1].dir, Direction::Input);
    assert!(ports[0].low_conn.is_some());
}

/// Conflicting IO and inner ranges are rejected.
#[test]
fn conflicting_io_range_is_an_error() {
    let mut m = PtModule::new("m");
    m.ports.push(PtPort::simple("q", Direction::Output));
    m.ioheads.push(
        PtIoHead::new(Direction::Output, vec![PtIoItem::new("q")]).with_range(PtExpr::int(3), PtExpr::int(0)),
    );
    m.declheads.push(
        PtDeclHead::new(DeclKind::Reg, vec![PtDeclItem::new("q")]).with_range(PtExpr::int(1), PtExpr::int(0)),
    );

    let (_db, sink) = elaborate_modules(vec![m]);
    assert!(sink.contains("conflicting range"), "diagnostics: {:?}", sink.messages);
}
