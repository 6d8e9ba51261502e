//! Gate and UDP primitive instances: terminal profiles, arrays, arity
//! errors.

use pretty_assertions::assert_eq;
use velab::{
    CollectSink, Direction, ElabOptions, PrimType, SimpleSystfRegistry,
    pt::{
        DeclKind, PtConnection, PtDeclHead, PtDeclItem, PtExpr, PtInst, PtItem, PtModule, PtRange, PtSource, PtUdp,
        PtUdpEntry,
    },
    vl::{ScopeId, VlDb},
};

/// Elaborates a prepared source, collecting every diagnostic. The UDP
/// tests build their own [`PtSource`] so definitions register before
/// the instantiating module.
fn elaborate_source(source: &PtSource) -> (VlDb, CollectSink) {
    let mut sink = CollectSink::new();
    let systf = SimpleSystfRegistry::new();
    let db = velab::elaborate(source, &ElabOptions::default(), None, &systf, &mut sink);
    (db, sink)
}

/// Builds a one-file source from `modules` and elaborates it.
fn elaborate_modules(modules: Vec<PtModule>) -> (VlDb, CollectSink) {
    let mut source = PtSource::new();
    source.add_file("test.v");
    for module in modules {
        source.add_module(module);
    }
    elaborate_source(&source)
}

/// The scope of the sole top module, which these tests revolve around.
fn top_scope(db: &VlDb) -> ScopeId {
    let &module = db.topmodule_list().first().expect("design has a top module");
    db.module(module).scope
}

fn wires(names: &[&str]) -> PtDeclHead {
    PtDeclHead::new(DeclKind::Net, names.iter().map(|n| PtDeclItem::new(*n)).collect())
}

fn gate(prim_type: PrimType, name: Option<&str>, terms: &[&str]) -> PtItem {
    PtItem::GateHeader {
        region: Default::default(),
        prim_type,
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: name.map(str::to_owned),
            range: None,
            ports: terms.iter().map(|t| PtConnection::ordered(PtExpr::primary(*t))).collect(),
        }],
        attrs: vec![],
    }
}

/// `and g (o, a, b)` gets one output terminal and two inputs.
#[test]
fn and_gate_terminal_directions() {
    let mut m = PtModule::new("m");
    m.declheads.push(wires(&["o", "a", "b"]));
    m.items.push(gate(PrimType::And, Some("g"), &["o", "a", "b"]));

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let prims = db.find_primitive_list(scope);
    assert_eq!(prims.len(), 1);
    let prim = db.prim(prims[0]);
    assert_eq!(prim.prim_type, PrimType::And);
    let dirs: Vec<Direction> = prim.terminals.iter().map(|t| t.dir).collect();
    assert_eq!(dirs, vec![Direction::Output, Direction::Input, Direction::Input]);
    assert!(prim.terminals.iter().all(|t| t.expr.is_some()));
}

/// A two-terminal `and` violates the port profile.
#[test]
fn and_gate_rejects_two_terminals() {
    let mut m = PtModule::new("m");
    m.declheads.push(wires(&["o", "a"]));
    m.items.push(gate(PrimType::And, None, &["o", "a"]));

    let (_db, sink) = elaborate_modules(vec![m]);
    assert!(sink.contains("ports mismatch"), "diagnostics: {:?}", sink.messages);
}

/// `buf` fans out: n-1 outputs, one input (the last terminal).
#[test]
fn buf_gate_has_trailing_input() {
    let mut m = PtModule::new("m");
    m.declheads.push(wires(&["o1", "o2", "a"]));
    m.items.push(gate(PrimType::Buf, None, &["o1", "o2", "a"]));

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);
    let scope = top_scope(&db);
    let prim = db.prim(db.find_primitive_list(scope)[0]);
    let dirs: Vec<Direction> = prim.terminals.iter().map(|t| t.dir).collect();
    assert_eq!(dirs, vec![Direction::Output, Direction::Output, Direction::Input]);
}

/// A gate instance array creates one primitive per index.
#[test]
fn gate_arrays_expand() {
    let mut m = PtModule::new("m");
    m.declheads.push(wires(&["o", "a", "b"]));
    m.items.push(PtItem::GateHeader {
        region: Default::default(),
        prim_type: PrimType::Nand,
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: Some("g".to_owned()),
            range: Some(PtRange::new(PtExpr::int(1), PtExpr::int(0))),
            ports: ["o", "a", "b"].iter().map(|t| PtConnection::ordered(PtExpr::primary(*t))).collect(),
        }],
        attrs: vec![],
    });

    let (db, sink) = elaborate_modules(vec![m]);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);
    let scope = top_scope(&db);
    let arrays = db.find_primarray_list(scope);
    assert_eq!(arrays.len(), 1);
    assert_eq!(db.prim_array(arrays[0]).prims.len(), 2);
}

fn udp_and2() -> PtUdp {
    PtUdp {
        region: Default::default(),
        name: "and2".to_owned(),
        ports: vec!["o".to_owned(), "a".to_owned(), "b".to_owned()],
        is_seq: false,
        init: None,
        entries: vec![
            PtUdpEntry {
                region: Default::default(),
                inputs: "11".to_owned(),
                current: None,
                output: '1',
            },
            PtUdpEntry {
                region: Default::default(),
                inputs: "0?".to_owned(),
                current: None,
                output: '0',
            },
            PtUdpEntry {
                region: Default::default(),
                inputs: "?0".to_owned(),
                current: None,
                output: '0',
            },
        ],
    }
}

/// UDP instances resolve against registered definitions and enforce the
/// declared port count.
#[test]
fn udp_instances_check_port_count() {
    let mut m = PtModule::new("m");
    m.declheads.push(wires(&["o", "a", "b"]));
    m.items.push(PtItem::MuHeader {
        region: Default::default(),
        def_name: "and2".to_owned(),
        param_cons: vec![],
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: Some("u".to_owned()),
            range: None,
            ports: ["o", "a", "b"].iter().map(|t| PtConnection::ordered(PtExpr::primary(*t))).collect(),
        }],
        attrs: vec![],
    });

    let mut source = PtSource::new();
    source.add_file("test.v");
    source.add_udp(udp_and2());
    source.add_module(m);

    let (db, sink) = elaborate_source(&source);
    assert_eq!(sink.error_count(), 0, "diagnostics: {:?}", sink.messages);

    let scope = top_scope(&db);
    let prims = db.find_primitive_list(scope);
    assert_eq!(prims.len(), 1);
    let prim = db.prim(prims[0]);
    assert_eq!(prim.prim_type, PrimType::Udp);
    let udp = prim.udp.expect("UDP instance links to its definition");
    assert_eq!(db.udp_defn(udp).port_num, 3);
    assert_eq!(db.udp_defn(udp).table.len(), 3);
}

/// A UDP instance with the wrong terminal count is rejected.
#[test]
fn udp_instance_arity_mismatch() {
    let mut m = PtModule::new("m");
    m.declheads.push(wires(&["o", "a"]));
    m.items.push(PtItem::MuHeader {
        region: Default::default(),
        def_name: "and2".to_owned(),
        param_cons: vec![],
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: None,
            range: None,
            ports: ["o", "a"].iter().map(|t| PtConnection::ordered(PtExpr::primary(*t))).collect(),
        }],
        attrs: vec![],
    });

    let mut source = PtSource::new();
    source.add_file("test.v");
    source.add_udp(udp_and2());
    source.add_module(m);

    let (_db, sink) = elaborate_source(&source);
    assert!(sink.contains("ports mismatch"), "diagnostics: {:?}", sink.messages);
}

/// UDP instances reject parameter assignments.
#[test]
fn udp_rejects_parameter_assignments() {
    let mut m = PtModule::new("m");
    m.declheads.push(wires(&["o", "a", "b"]));
    m.items.push(PtItem::MuHeader {
        region: Default::default(),
        def_name: "and2".to_owned(),
        param_cons: vec![PtConnection::ordered(PtExpr::int(1))],
        strength: None,
        delay: None,
        insts: vec![PtInst {
            region: Default::default(),
            name: None,
            range: None,
            ports: ["o", "a", "b"].iter().map(|t| PtConnection::ordered(PtExpr::primary(*t))).collect(),
        }],
        attrs: vec![],
    });

    let mut source = PtSource::new();
    source.add_file("test.v");
    source.add_udp(udp_and2());
    source.add_module(m);

    let (_db, sink) = elaborate_source(&source);
    assert!(
        sink.contains("shall not have parameter assignments"),
        "diagnostics: {:?}",
        sink.messages
    );
}
