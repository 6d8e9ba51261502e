//! Module instantiation: parameter overrides, defparams, instance
//! arrays, cycles, hierarchical lookup.

use pretty_assertions::assert_eq;
use velab::{
    CollectSink, ElabOptions, OpType, SimpleSystfRegistry,
    pt::{
        DeclKind, NameBranch, PtConnection, PtDeclHead, PtDeclItem, PtDefParam, PtExpr, PtInst, PtItem, PtModule,
        PtRange, PtSource,
    },
    vl::{ObjHandle, ScopeId, VlDb},
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

fn inner_with_param() -> PtModule {
    // module sub; parameter W = 4; wire [W-1:0] d; endmodule
    let mut sub = PtModule::new("sub");
    sub.declheads.push(PtDeclHead::new(
        DeclKind::Param,
        vec![PtDeclItem::with_init("W", PtExpr::int(4))],
    ));
    sub.declheads.push(
        PtDeclHead::new(DeclKind::Net, vec![PtDeclItem::new("d")]).with_range(
            PtExpr::binary(OpType::Sub, PtExpr::primary("W"), PtExpr::int(1)),
            PtExpr::int(0),
        ),
    );
    sub
}

fn instance(def: &str, name: &str, param_cons: Vec<PtConnection>) -> PtItem {
    PtItem::MuHeader {
        region: Default::default(),
        def_name: def.to_owned(),
        param_cons,
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: Some(name.to_owned()),
            range: None,
            ports: vec![],
        }],
        attrs: vec![],
    }
}

/// Ordered and named parameter overrides rebind the child's parameter
/// before its declarations are sized.
#[test]
fn parameter_overrides_resize_child_decls() {
    let mut top = PtModule::new("top");
    top.items.push(instance("sub", "u0", vec![PtConnection::ordered(PtExpr::int(8))]));
    top.items
        .push(instance("sub", "u1", vec![PtConnection::named("W", Some(PtExpr::int(16)))]));
    top.items.push(instance("sub", "u2", vec![]));

    let (db, sink) = elaborate_modules(vec![top, inner_with_param()]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    for (inst, width) in [("u0", 8), ("u1", 16), ("u2", 4)] {
        let Some(ObjHandle::Module(m)) = db.find_obj(scope, inst) else {
            panic!("{inst} missing");
        };
        let child = db.module(m).scope;
        let Some(ObjHandle::Decl(d)) = db.find_obj(child, "d") else {
            panic!("{inst}.d missing");
        };
        assert_eq!(db.decl(d).value_type().size(), width, "width of {inst}.d");
    }

    // Overrides are recorded as parameter assignments.
    let u0 = match db.find_obj(scope, "u0") {
        Some(ObjHandle::Module(m)) => m,
        _ => unreachable!(),
    };
    let assigns = db.find_paramassign_list(db.module(u0).scope);
    assert_eq!(assigns.len(), 1);
    assert_eq!(db.param_assign(assigns[0]).value.to_int(), Some(8));
}

/// A localparam computed from an overridden parameter settles to the
/// final value.
#[test]
fn dependent_localparam_follows_override() {
    let mut sub = inner_with_param();
    sub.declheads.push(PtDeclHead::new(
        DeclKind::LocalParam,
        vec![PtDeclItem::with_init(
            "W2",
            PtExpr::binary(OpType::Mult, PtExpr::primary("W"), PtExpr::int(2)),
        )],
    ));

    let mut top = PtModule::new("top");
    top.items.push(instance("sub", "u0", vec![PtConnection::ordered(PtExpr::int(8))]));

    let (db, sink) = elaborate_modules(vec![top, sub]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let Some(ObjHandle::Module(m)) = db.find_obj(scope, "u0") else {
        panic!("u0 missing");
    };
    let Some(ObjHandle::Param(w2)) = db.find_obj(db.module(m).scope, "W2") else {
        panic!("W2 missing");
    };
    assert_eq!(db.param(w2).value.to_int(), Some(16));
}

/// Binding more ordered values than the child has parameter ports
/// fails.
#[test]
fn too_many_ordered_overrides() {
    let mut top = PtModule::new("top");
    top.items.push(instance(
        "sub",
        "u0",
        vec![
            PtConnection::ordered(PtExpr::int(8)),
            PtConnection::ordered(PtExpr::int(9)),
        ],
    ));

    let (_db, sink) = elaborate_modules(vec![top, inner_with_param()]);
    assert!(sink.contains("too many parameter"), "diagnostics: {:?}", sink.messages);
}

/// `defparam top.u0.W = 5` retargets the child parameter before its
/// declarations expand.
#[test]
fn defparam_overrides_child_parameter() {
    let mut top = PtModule::new("top");
    top.items.push(instance("sub", "u0", vec![]));
    top.items.push(PtItem::DefParam {
        region: Default::default(),
        items: vec![PtDefParam {
            region: Default::default(),
            branches: vec![NameBranch::new("u0")],
            name: "W".to_owned(),
            rhs: PtExpr::int(5),
        }],
    });

    let (db, sink) = elaborate_modules(vec![top, inner_with_param()]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let Some(ObjHandle::Module(m)) = db.find_obj(scope, "u0") else {
        panic!("u0 missing");
    };
    let child = db.module(m).scope;
    let Some(ObjHandle::Decl(d)) = db.find_obj(child, "d") else {
        panic!("u0.d missing");
    };
    assert_eq!(db.decl(d).value_type().size(), 5);
    assert_eq!(db.find_defparam_list(scope).len(), 1);
}

/// A defparam targeting a localparam fails with the dedicated message.
#[test]
fn defparam_rejects_localparam() {
    let mut sub = PtModule::new("sub");
    sub.declheads.push(PtDeclHead::new(
        DeclKind::LocalParam,
        vec![PtDeclItem::with_init("L", PtExpr::int(4))],
    ));

    let mut top = PtModule::new("top");
    top.items.push(instance("sub", "u0", vec![]));
    top.items.push(PtItem::DefParam {
        region: Default::default(),
        items: vec![PtDefParam {
            region: Default::default(),
            branches: vec![NameBranch::new("u0")],
            name: "L".to_owned(),
            rhs: PtExpr::int(5),
        }],
    });

    let (db, sink) = elaborate_modules(vec![top, sub]);
    assert!(
        sink.contains("defparam shall not override a localparam"),
        "diagnostics: {:?}",
        sink.messages
    );
    // The localparam keeps its declared value.
    let scope = top_scope(&db);
    let Some(ObjHandle::Module(m)) = db.find_obj(scope, "u0") else {
        panic!("u0 missing");
    };
    let Some(ObjHandle::Param(l)) = db.find_obj(db.module(m).scope, "L") else {
        panic!("L missing");
    };
    assert_eq!(db.param(l).value.to_int(), Some(4));
}

/// Mutual instantiation (`a` instantiates `b` instantiates `a`) is a
/// cyclic-dependency error, and elaboration still terminates.
#[test]
fn cyclic_instantiation_is_detected() {
    let mut a = PtModule::new("a");
    a.items.push(instance("b", "u_b", vec![]));
    let mut b = PtModule::new("b");
    b.items.push(instance("a", "u_a", vec![]));

    let (_db, sink) = elaborate_modules(vec![a, b]);
    assert!(sink.contains("cyclic"), "diagnostics: {:?}", sink.messages);
}

/// An instance array creates one child per index, each reachable
/// through the array handle.
#[test]
fn instance_arrays_elaborate_each_element() {
    let mut top = PtModule::new("top");
    top.items.push(PtItem::MuHeader {
        region: Default::default(),
        def_name: "sub".to_owned(),
        param_cons: vec![],
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: Some("u".to_owned()),
            range: Some(PtRange::new(PtExpr::int(3), PtExpr::int(0))),
            ports: vec![],
        }],
        attrs: vec![],
    });

    let (db, sink) = elaborate_modules(vec![top, inner_with_param()]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let arrays = db.find_modulearray_list(scope);
    assert_eq!(arrays.len(), 1);
    let array = db.module_array(arrays[0]);
    assert_eq!(array.range.size(), 4);
    assert_eq!(array.modules.len(), 4);

    // Hierarchical resolution indexes into the array.
    let found = db.find_hierarchical(scope, &[NameBranch::indexed("u", 2)], "d");
    assert!(matches!(found, Some(ObjHandle::Decl(_))));
}

/// An unknown definition name is an instance-not-found error.
#[test]
fn unknown_definition_is_reported() {
    let mut top = PtModule::new("top");
    top.items.push(instance("nosuch", "u0", vec![]));

    let (_db, sink) = elaborate_modules(vec![top]);
    assert!(sink.contains("no such module"), "diagnostics: {:?}", sink.messages);
}

/// Hierarchical names resolve downward through named scopes.
#[test]
fn hierarchical_lookup_descends() {
    let mut sub = inner_with_param();
    sub.items.push(PtItem::GenBlock(velab::pt::GenBody::new(
        Some("inner".to_owned()),
        vec![PtDeclHead::new(DeclKind::Reg, vec![PtDeclItem::new("r")])],
        vec![],
    )));
    let mut top = PtModule::new("top");
    top.items.push(instance("sub", "u0", vec![]));

    let (db, sink) = elaborate_modules(vec![top, sub]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let hit = db.find_hierarchical(
        scope,
        &[NameBranch::new("u0"), NameBranch::new("inner")],
        "r",
    );
    assert!(matches!(hit, Some(ObjHandle::Decl(_))));
    let miss = db.find_hierarchical(scope, &[NameBranch::new("u0")], "nothing");
    assert!(miss.is_none());

    let tags = db.find_module_list(scope);
    assert_eq!(tags.len(), 1);
}
