//! Generate-construct elaboration: for-loops with indexed scopes,
//! if/case arms, genvar misuse.

use pretty_assertions::assert_eq;
use velab::{
    CollectSink, ElabOptions, OpType, SimpleSystfRegistry,
    pt::{DeclKind, GenBody, PtDeclHead, PtDeclItem, PtExpr, PtItem, PtModule, PtSource},
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

fn genvar_decl(name: &str) -> PtDeclHead {
    PtDeclHead::new(DeclKind::Genvar, vec![PtDeclItem::new(name)])
}

/// `generate for (i = 0; i < 3; i = i + 1) begin : g wire [i:0] w; end`
/// produces scopes `g[0]`, `g[1]`, `g[2]` with `w` of widths 1, 2, 3.
#[test]
fn gen_for_produces_indexed_scopes() {
    let mut m = PtModule::new("m");
    m.declheads.push(genvar_decl("i"));
    m.items.push(PtItem::GenFor {
        region: Default::default(),
        genvar: "i".to_owned(),
        init_expr: PtExpr::int(0),
        cond: PtExpr::binary(OpType::Lt, PtExpr::primary("i"), PtExpr::int(3)),
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

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let Some(ObjHandle::GfRoot(root)) = db.find_obj(scope, "g") else {
        panic!("g did not elaborate to a generate-for root");
    };
    for value in 0..3 {
        let iter = db
            .gf_root(root)
            .find_iter(value)
            .unwrap_or_else(|| panic!("missing iteration scope g[{value}]"));
        let Some(ObjHandle::Decl(w)) = db.find_obj(iter, "w") else {
            panic!("w missing in g[{value}]");
        };
        assert_eq!(db.decl(w).value_type().size(), (value + 1) as u32, "width of g[{value}].w");
    }
    assert!(db.gf_root(root).find_iter(3).is_none());
}

/// A generate-for whose initial value is negative fails.
#[test]
fn gen_for_rejects_negative_init() {
    let mut m = PtModule::new("m");
    m.declheads.push(genvar_decl("i"));
    m.items.push(PtItem::GenFor {
        region: Default::default(),
        genvar: "i".to_owned(),
        init_expr: PtExpr::unary(OpType::Minus, PtExpr::int(1)),
        cond: PtExpr::binary(OpType::Lt, PtExpr::primary("i"), PtExpr::int(3)),
        next_expr: PtExpr::binary(OpType::Add, PtExpr::primary("i"), PtExpr::int(1)),
        body: GenBody::new(Some("g".to_owned()), vec![], vec![]),
    });

    let (_db, sink) = elaborate_modules(vec![m]);
    assert!(sink.contains("shall not be negative"), "diagnostics: {:?}", sink.messages);
}

/// The loop variable of a generate-for must be a genvar.
#[test]
fn gen_for_requires_a_genvar() {
    let mut m = PtModule::new("m");
    m.declheads.push(PtDeclHead::new(
        DeclKind::Param,
        vec![PtDeclItem::with_init("i", PtExpr::int(0))],
    ));
    m.items.push(PtItem::GenFor {
        region: Default::default(),
        genvar: "i".to_owned(),
        init_expr: PtExpr::int(0),
        cond: PtExpr::binary(OpType::Lt, PtExpr::primary("i"), PtExpr::int(1)),
        next_expr: PtExpr::binary(OpType::Add, PtExpr::primary("i"), PtExpr::int(1)),
        body: GenBody::new(Some("g".to_owned()), vec![], vec![]),
    });

    let (_db, sink) = elaborate_modules(vec![m]);
    assert!(sink.contains("not a genvar"), "diagnostics: {:?}", sink.messages);
}

/// gen-if keeps only the selected arm.
#[test]
fn gen_if_keeps_selected_arm() {
    let mut m = PtModule::new("m");
    m.declheads.push(PtDeclHead::new(
        DeclKind::Param,
        vec![PtDeclItem::with_init("SEL", PtExpr::int(1))],
    ));
    m.items.push(PtItem::GenIf {
        region: Default::default(),
        cond: PtExpr::primary("SEL"),
        then_body: GenBody::new(
            Some("yes".to_owned()),
            vec![PtDeclHead::new(DeclKind::Net, vec![PtDeclItem::new("w")])],
            vec![],
        ),
        else_body: Some(GenBody::new(
            Some("no".to_owned()),
            vec![PtDeclHead::new(DeclKind::Net, vec![PtDeclItem::new("w")])],
            vec![],
        )),
    });

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);
    let scope = top_scope(&db);
    assert!(db.find_obj(scope, "yes").is_some());
    assert!(db.find_obj(scope, "no").is_none());
}

/// gen-case selects exactly one arm; duplicate matches are an error.
#[test]
fn gen_case_selects_one_arm() {
    let arm = |name: &str| {
        GenBody::new(
            Some(name.to_owned()),
            vec![PtDeclHead::new(DeclKind::Net, vec![PtDeclItem::new("w")])],
            vec![],
        )
    };

    let mut m = PtModule::new("m");
    m.declheads.push(PtDeclHead::new(
        DeclKind::Param,
        vec![PtDeclItem::with_init("MODE", PtExpr::int(2))],
    ));
    m.items.push(PtItem::GenCase {
        region: Default::default(),
        expr: PtExpr::primary("MODE"),
        items: vec![
            velab::pt::PtGenCaseItem {
                region: Default::default(),
                labels: vec![PtExpr::int(1)],
                body: arm("one"),
            },
            velab::pt::PtGenCaseItem {
                region: Default::default(),
                labels: vec![PtExpr::int(2), PtExpr::int(3)],
                body: arm("two"),
            },
            velab::pt::PtGenCaseItem {
                region: Default::default(),
                labels: vec![],
                body: arm("dflt"),
            },
        ],
    });

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);
    let scope = top_scope(&db);
    assert!(db.find_obj(scope, "one").is_none());
    assert!(db.find_obj(scope, "two").is_some());
    assert!(db.find_obj(scope, "dflt").is_none());
}

/// Two arms matching the same selector value is an error.
#[test]
fn gen_case_rejects_duplicate_matches() {
    let mut m = PtModule::new("m");
    m.items.push(PtItem::GenCase {
        region: Default::default(),
        expr: PtExpr::int(1),
        items: vec![
            velab::pt::PtGenCaseItem {
                region: Default::default(),
                labels: vec![PtExpr::int(1)],
                body: GenBody::new(Some("a".to_owned()), vec![], vec![]),
            },
            velab::pt::PtGenCaseItem {
                region: Default::default(),
                labels: vec![PtExpr::int(1)],
                body: GenBody::new(Some("b".to_owned()), vec![], vec![]),
            },
        ],
    });

    let (_db, sink) = elaborate_modules(vec![m]);
    assert!(
        sink.contains("more than one generate-case label"),
        "diagnostics: {:?}",
        sink.messages
    );
}

/// Generate-block declarations land in the module's internal scopes.
#[test]
fn named_gen_block_owns_its_decls() {
    let mut m = PtModule::new("m");
    m.items.push(PtItem::GenBlock(GenBody::new(
        Some("blk".to_owned()),
        vec![PtDeclHead::new(DeclKind::Reg, vec![PtDeclItem::new("r")])],
        vec![],
    )));

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);
    let scope = top_scope(&db);
    let Some(ObjHandle::Scope(blk)) = db.find_obj(scope, "blk") else {
        panic!("blk missing");
    };
    assert_eq!(db.find_decl_list(blk, VlTag::Reg).len(), 1);
    assert!(db.find_internalscope_list(scope).contains(&blk));
}
