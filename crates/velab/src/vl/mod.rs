//! The elaborated design database (VL).
//!
//! Everything the elaborator produces lives in the arenas of
//! [`VlDb`](db::VlDb) and is referenced by the typed ids defined here.
//! Ownership is strictly downward (scopes own their members through the
//! db); parent and cross links are plain ids, so no cycles and no
//! reference counting.

mod attr;
mod db;
mod dump;
mod expr;
mod stmt;

use serde::{Deserialize, Serialize};

pub use self::{
    attr::{AttrStore, VlAttribute, VlObjRef},
    db::{ObjHandle, VlDb, VlTag},
    dump::{DumpNode, dump_design},
    expr::{PrimaryObj, VlDelay, VlExpr, VlExprKind},
    stmt::{VlCaseItem, VlControl, VlStmt, VlStmtKind},
};
use crate::{
    lang::{Direction, NetType, PrimType, ProcessKind, Strength, VsType},
    range::{RangeArray, VlRange},
    region::FileRegion,
    vtype::VlValueType,
    value::VlValue,
};

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(u32::try_from(index).expect("arena overflow"))
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Id of a [`VlScope`].
    ScopeId
);
define_id!(
    /// Id of a [`VlModule`].
    ModuleId
);
define_id!(
    /// Id of a [`VlModuleArray`].
    ModuleArrayId
);
define_id!(
    /// Id of a [`VlDecl`].
    DeclId
);
define_id!(
    /// Id of a [`VlDeclArray`].
    DeclArrayId
);
define_id!(
    /// Id of a [`VlParameter`].
    ParamId
);
define_id!(
    /// Id of a [`VlGenvar`].
    GenvarId
);
define_id!(
    /// Id of a [`VlPrimitive`].
    PrimId
);
define_id!(
    /// Id of a [`VlPrimArray`].
    PrimArrayId
);
define_id!(
    /// Id of a [`VlContAssign`].
    ContAssignId
);
define_id!(
    /// Id of a [`VlParamAssign`].
    ParamAssignId
);
define_id!(
    /// Id of a [`VlDefParam`].
    DefParamId
);
define_id!(
    /// Id of a [`VlProcess`].
    ProcessId
);
define_id!(
    /// Id of a [`VlTaskFunc`].
    TaskFuncId
);
define_id!(
    /// Id of a [`VlStmt`].
    StmtId
);
define_id!(
    /// Id of a [`VlExpr`].
    ExprId
);
define_id!(
    /// Id of a [`VlUdpDefn`].
    UdpDefnId
);
define_id!(
    /// Id of a [`GfRoot`].
    GfRootId
);
define_id!(
    /// Id of a [`VlSpecBlock`].
    SpecBlockId
);

/// What a scope is: the root, a module body, a statement block, a
/// generate block, one generate-for iteration, or a task/function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    Toplevel,
    Module(ModuleId),
    /// Named or anonymous begin/fork block.
    Block { anonymous: bool },
    GenBlock,
    /// One iteration of a generate-for, carrying the genvar value it
    /// was expanded with.
    GenIter(i32),
    Task(TaskFuncId),
    Function(TaskFuncId),
}

/// A named region owning declarations and sub-scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlScope {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    pub name: String,
    pub region: FileRegion,
}

/// An elaborated module instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlModule {
    /// The scope that is this module's body.
    pub scope: ScopeId,
    /// Definition name in the PT catalog.
    pub def_name: String,
    /// Instance name (equals `def_name` for top modules).
    pub name: String,
    pub region: FileRegion,
    pub ports: Vec<VlPort>,
    /// Index within its module array, if any.
    pub array_index: Option<i32>,
}

/// One elaborated port of a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlPort {
    pub region: FileRegion,
    pub ext_name: Option<String>,
    pub dir: Direction,
    /// Connection to the module's internals.
    pub low_conn: Option<ExprId>,
    /// Connection supplied by the instantiating module.
    pub high_conn: Option<ExprId>,
}

/// An array of module instances (`m u [3:0] (...)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlModuleArray {
    pub parent: ScopeId,
    pub def_name: String,
    pub name: String,
    pub range: VlRange,
    pub modules: Vec<ModuleId>,
    pub region: FileRegion,
}

/// Object kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclObjKind {
    Net(NetType),
    Reg,
    Integer,
    Real,
    Time,
    Realtime,
    NamedEvent,
}

impl DeclObjKind {
    /// The tag this kind files under in the tag dictionary.
    pub fn tag(self) -> VlTag {
        match self {
            Self::Net(_) => VlTag::Net,
            Self::Reg => VlTag::Reg,
            Self::Integer | Self::Real | Self::Time | Self::Realtime => VlTag::Variables,
            Self::NamedEvent => VlTag::NamedEvent,
        }
    }

    pub fn value_type(self, signed: bool, range: Option<&VlRange>) -> VlValueType {
        match self {
            Self::Net(_) | Self::Reg => match range {
                Some(r) => VlValueType::new(signed, true, r.size()),
                None => VlValueType::new(signed, false, 1),
            },
            Self::Integer => VlValueType::int_type(),
            Self::Real | Self::Realtime => VlValueType::real_type(),
            Self::Time => VlValueType::time_type(),
            Self::NamedEvent => VlValueType::no_type(),
        }
    }
}

/// A single declaration: net, reg, variable or named event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlDecl {
    pub scope: ScopeId,
    pub name: String,
    pub kind: DeclObjKind,
    pub signed: bool,
    pub range: Option<VlRange>,
    pub vs_type: VsType,
    pub strength: Option<(Strength, Strength)>,
    pub delay: Option<VlDelay>,
    pub init: Option<ExprId>,
    /// Direction when this declaration doubles as an IO.
    pub io_dir: Option<Direction>,
    pub region: FileRegion,
}

impl VlDecl {
    pub fn value_type(&self) -> VlValueType {
        self.kind.value_type(self.signed, self.range.as_ref())
    }

    /// LSB-relative bit offset of `index` inside the declared range;
    /// scalar declarations accept only index 0... the declared range
    /// governs everything else.
    pub fn calc_bit_offset(&self, index: i32) -> Option<u32> {
        match &self.range {
            Some(range) => range.calc_offset(index),
            None => (index == 0).then_some(0),
        }
    }
}

/// An array of declarations (memory): base declaration info plus the
/// dimension list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlDeclArray {
    pub scope: ScopeId,
    pub name: String,
    pub kind: DeclObjKind,
    pub signed: bool,
    pub range: Option<VlRange>,
    pub dims: RangeArray,
    pub region: FileRegion,
}

impl VlDeclArray {
    pub fn value_type(&self) -> VlValueType {
        self.kind.value_type(self.signed, self.range.as_ref())
    }
}

/// A parameter or localparam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlParameter {
    pub scope: ScopeId,
    pub name: String,
    pub is_local: bool,
    /// Declared type; `NoType` when neither range nor keyword type was
    /// written, in which case the value's own type wins.
    pub declared_type: VlValueType,
    pub value: VlValue,
    /// Text of the expression the current value came from.
    pub expr_text: String,
    /// Set once an override or defparam lands; a second defparam is an
    /// error.
    pub overridden: bool,
    pub region: FileRegion,
}

impl VlParameter {
    /// The parameter's effective type: declared if any, else the
    /// value's.
    pub fn value_type(&self) -> VlValueType {
        if self.declared_type.is_no_type() {
            self.value.value_type()
        } else {
            self.declared_type
        }
    }
}

/// A generate-for loop variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlGenvar {
    pub scope: ScopeId,
    pub name: String,
    pub value: i32,
    pub in_use: bool,
    pub region: FileRegion,
}

/// One terminal of a primitive instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlPrimTerm {
    pub dir: Direction,
    pub expr: Option<ExprId>,
}

/// A gate, UDP or cell primitive instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlPrimitive {
    pub scope: ScopeId,
    pub name: Option<String>,
    pub prim_type: PrimType,
    pub udp: Option<UdpDefnId>,
    /// Library cell name for `PrimType::Cell`.
    pub cell_name: Option<String>,
    pub strength: Option<(Strength, Strength)>,
    pub delay: Option<VlDelay>,
    pub terminals: Vec<VlPrimTerm>,
    pub region: FileRegion,
}

/// An array of primitive instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlPrimArray {
    pub scope: ScopeId,
    pub name: Option<String>,
    pub prim_type: PrimType,
    pub range: VlRange,
    pub prims: Vec<PrimId>,
    pub region: FileRegion,
}

/// A continuous assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlContAssign {
    pub scope: ScopeId,
    pub lhs: ExprId,
    pub rhs: ExprId,
    pub strength: Option<(Strength, Strength)>,
    pub delay: Option<VlDelay>,
    pub region: FileRegion,
}

/// A parameter-port override applied at instantiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlParamAssign {
    pub module: ModuleId,
    pub param: ParamId,
    pub value: VlValue,
    /// Named (`.P(3)`) vs ordered binding.
    pub named: bool,
    pub region: FileRegion,
}

/// An applied defparam.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlDefParam {
    /// The module the defparam item appeared in.
    pub scope: ScopeId,
    pub target: ParamId,
    pub value: VlValue,
    pub region: FileRegion,
}

/// An `initial` or `always` process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlProcess {
    pub scope: ScopeId,
    pub kind: ProcessKind,
    pub body: StmtId,
    pub region: FileRegion,
}

/// One IO of a task or function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlIoDecl {
    pub dir: Direction,
    pub decl: DeclId,
}

/// An elaborated task or function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlTaskFunc {
    /// The scope that is the task/function body.
    pub scope: ScopeId,
    pub name: String,
    pub is_task: bool,
    pub automatic: bool,
    /// Function result type; `NoType` for tasks.
    pub ret_type: VlValueType,
    pub ios: Vec<VlIoDecl>,
    /// The function's self-named result variable.
    pub result_var: Option<DeclId>,
    pub body: Option<StmtId>,
    /// Set when the function was validated as a constant function.
    pub is_constant_function: bool,
    pub region: FileRegion,
}

/// An elaborated UDP definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlUdpDefn {
    pub name: String,
    pub port_num: u32,
    pub is_seq: bool,
    pub init_val: Option<VlValue>,
    /// Table rows as symbol strings, one per entry.
    pub table: Vec<String>,
    pub region: FileRegion,
}

/// The per-parent index a generate-for leaves behind: genvar value →
/// iteration scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GfRoot {
    pub parent: ScopeId,
    pub name: String,
    pub iter_scopes: Vec<(i32, ScopeId)>,
    pub region: FileRegion,
}

impl GfRoot {
    pub fn find_iter(&self, value: i32) -> Option<ScopeId> {
        self.iter_scopes
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, s)| *s)
    }
}

/// An opaque specify block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlSpecBlock {
    pub scope: ScopeId,
    pub region: FileRegion,
}
