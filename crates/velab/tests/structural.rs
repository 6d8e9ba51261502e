//! Whole-database properties: elaboration determinism and the dump
//! tree.

use pretty_assertions::assert_eq;
use velab::{
    CollectSink, ElabOptions, OpType, SimpleSystfRegistry,
    pt::{
        DeclKind, GenBody, PtConnection, PtDeclHead, PtDeclItem, PtExpr, PtInst, PtItem, PtModule, PtSource,
    },
    vl::{VlDb, dump_design},
};

/// Elaborates a prepared source, collecting every diagnostic.
fn elaborate_source(source: &PtSource) -> (VlDb, CollectSink) {
    let mut sink = CollectSink::new();
    let systf = SimpleSystfRegistry::new();
    let db = velab::elaborate(source, &ElabOptions::default(), None, &systf, &mut sink);
    (db, sink)
}

fn sample_design() -> PtSource {
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

    let mut top = PtModule::new("top");
    top.declheads.push(PtDeclHead::new(
        DeclKind::Genvar,
        vec![PtDeclItem::new("i")],
    ));
    top.items.push(PtItem::MuHeader {
        region: Default::default(),
        def_name: "sub".to_owned(),
        param_cons: vec![PtConnection::ordered(PtExpr::int(8))],
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: Some("u0".to_owned()),
            range: None,
            ports: vec![],
        }],
        attrs: vec![],
    });
    top.items.push(PtItem::GenFor {
        region: Default::default(),
        genvar: "i".to_owned(),
        init_expr: PtExpr::int(0),
        cond: PtExpr::binary(OpType::Lt, PtExpr::primary("i"), PtExpr::int(2)),
        next_expr: PtExpr::binary(OpType::Add, PtExpr::primary("i"), PtExpr::int(1)),
        body: GenBody::new(
            Some("g".to_owned()),
            vec![
                PtDeclHead::new(DeclKind::Net, vec![PtDeclItem::new("w")])
                    .with_range(PtExpr::primary("i"), PtExpr::int(0)),
            ],
            vec![],
        ),
    });

    let mut source = PtSource::new();
    source.add_file("test.v");
    source.add_module(top);
    source.add_module(sub);
    source
}

/// Elaborating the same parse tree twice into fresh databases yields
/// structurally equal results.
#[test]
fn elaboration_is_deterministic() {
    let source = sample_design();
    let (db1, sink1) = elaborate_source(&source);
    let (db2, sink2) = elaborate_source(&source);
    assert_eq!(sink1.error_count(), 0, "diagnostics: {:?}", sink1.messages);
    assert_eq!(sink2.error_count(), 0);
    assert_eq!(dump_design(&db1), dump_design(&db2));
}

/// The dump tree serializes to JSON and names the hierarchy.
#[test]
fn dump_tree_serializes() {
    let source = sample_design();
    let (db, _sink) = elaborate_source(&source);
    let tree = dump_design(&db);
    assert_eq!(tree.kind, "design");
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].name, "top");

    let json = serde_json::to_string(&tree).expect("dump is serializable");
    assert!(json.contains("\"top\""));
    assert!(json.contains("u0"));
}
