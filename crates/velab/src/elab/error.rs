//! The elaboration error taxonomy.
//!
//! Every failure a generator can produce shares one surface:
//! [`ElbError`], carrying a source region, a typed [`ElbErrorKind`],
//! and a rendered message. Generators fail by returning
//! `Err(ElbError)`; the driver catches at the smallest unit that can
//! be meaningfully skipped, reports through the diagnostics sink, and
//! continues on unaffected subtrees. Nothing in the crate panics on
//! bad input.
//!
//! The constructors below exist so each error is *worded* in exactly
//! one place — a generator writes `ElbError::select_in_pca(pt_expr)`
//! and the message, the kind and the region anchoring all come out
//! consistent. Expression-anchored constructors prefix the message
//! with the decompiled expression text, which is what turns a bare
//! "not found." into "top.u0.w: not found." in the user's output.

use std::fmt;

use strum::IntoStaticStr;

use crate::{pt::PtExpr, region::FileRegion};

/// Result alias for everything that can fail during elaboration.
pub type ElbResult<T> = Result<T, ElbError>;

/// The cause of an elaboration failure.
///
/// The kind is machine-readable on purpose: most callers only ever
/// render the message, but a few need to *dispatch* on the cause. The
/// `Const*` variants double as the marker that a non-constant
/// construct appeared in a constant context, which the
/// `evaluate_*_if_const` probes test with
/// [`is_const_error`](ElbErrorKind::is_const_error) to distinguish "this
/// is simply not a constant, fall back to the variable form" from a
/// genuine error (a name that does not exist is broken either way and
/// must propagate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum ElbErrorKind {
    // conversion failures
    IntRequired,
    BvRequired,
    // constant-context violations
    HnameInCe,
    HnameInCf,
    SysFuncCallInCe,
    SysFuncCallInCf,
    NotAParameter,
    UsesItself,
    NotAConstantFunction,
    IllegalObjectCf,
    NotConstant,
    // evaluator-level failures
    EvalError,
    EvalIntError,
    // lookup and object-kind failures
    NotFound,
    IllegalObject,
    NotANamedEvent,
    // select failures
    DimensionMismatch,
    RangeOrder,
    SelectOnReal,
    SelectForNamedEvent,
    SelectInPca,
    SelectInForce,
    ArrayInPca,
    ArrayInForce,
    // port failures
    IllegalPort,
    PortArray,
    PortSizeMismatch,
    RealInPort,
    NamedPortInUdp,
    UdpPortNumMismatch,
    IllegalPortName,
    IllegalPinName,
    EmptyPortExpr,
    // IO-declaration failures
    IllegalIO,
    DuplicateType,
    ArrayIO,
    ConflictIoRange,
    NoImpnet,
    ImpnetWithInit,
    // module / instance failures
    TooManyParam,
    NoParam,
    IsALocalparam,
    CyclicDependency,
    InstanceNotFound,
    NonameModule,
    UdpWithParamAssign,
    CellWithParamAssign,
    TooManyItemsInPortList,
    DuplicateGenCaseLabels,
    GenvarNotFound,
    NotAGenvar,
    GenvarInUse,
    GenvarNegative,
    // LHS failures
    IllegalOperatorInLhs,
    IllegalConstantInLhs,
    IllegalFuncCallInLhs,
    IllegalSysFuncCallInLhs,
    // event-expression failures
    IllegalConstantInEventExpr,
    IllegalFuncCallInEventExpr,
    IllegalSysFuncCallInEventExpr,
    IllegalEdgeDescriptor,
    IllegalRealType,
    // call failures
    NoSuchFunction,
    NoSuchSysFunction,
    NotAFunction,
    NArgMismatch,
    IllegalArgumentType,
    // name clash
    DuplicateName,
}

impl ElbErrorKind {
    /// True for the violations of a constant context; callers that try
    /// `evaluate_int_if_const` treat these as "not constant" rather
    /// than as hard errors.
    pub fn is_const_error(self) -> bool {
        matches!(
            self,
            Self::HnameInCe
                | Self::HnameInCf
                | Self::SysFuncCallInCe
                | Self::SysFuncCallInCf
                | Self::NotAParameter
                | Self::UsesItself
                | Self::NotAConstantFunction
                | Self::IllegalObjectCf
                | Self::NotConstant
        )
    }
}

/// An elaboration error: where, what, and the rendered message.
///
/// The region is captured at construction from the parse-tree node
/// that triggered the failure, so by the time the error reaches the
/// diagnostics sink it no longer needs the parse tree — errors can be
/// stored, compared in tests, and rendered late.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElbError {
    pub region: FileRegion,
    pub kind: ElbErrorKind,
    pub message: String,
}

impl ElbError {
    pub fn new(region: FileRegion, kind: ElbErrorKind, message: impl Into<String>) -> Self {
        Self {
            region,
            kind,
            message: message.into(),
        }
    }

    /// Diagnostic category shared by all elaboration errors, the
    /// `CODE` slot of the `file:line:col: CODE: message` output line.
    pub fn code(&self) -> &'static str {
        "ELABXXX"
    }

    fn expr_error(expr: &PtExpr, kind: ElbErrorKind, msg: impl fmt::Display) -> Self {
        Self::new(expr.region, kind, format!("{}: {msg}", expr.decompile()))
    }

    pub fn int_required(region: FileRegion) -> Self {
        Self::new(region, ElbErrorKind::IntRequired, "int value required.")
    }

    pub fn bv_required(region: FileRegion) -> Self {
        Self::new(region, ElbErrorKind::BvRequired, "bit-vector value required.")
    }

    pub fn not_found(region: FileRegion, name: &str) -> Self {
        Self::new(region, ElbErrorKind::NotFound, format!("{name}: not found."))
    }

    pub fn not_found_expr(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NotFound, "not found.")
    }

    pub fn illegal_object(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::IllegalObject, "illegal object type.")
    }

    pub fn illegal_object_cf(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalObjectCf,
            "illegal object type inside constant function.",
        )
    }

    pub fn not_a_namedevent(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NotANamedEvent, "not a named event.")
    }

    pub fn hname_in_ce(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::HnameInCe,
            "hierarchical name shall not be used in constant expression.",
        )
    }

    pub fn hname_in_cf(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::HnameInCf,
            "hierarchical name shall not be used inside constant function.",
        )
    }

    pub fn sysfunccall_in_ce(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::SysFuncCallInCe,
            "system-function call shall not be used in constant expression.",
        )
    }

    pub fn sysfunccall_in_cf(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::SysFuncCallInCf,
            "system-function call shall not be used inside constant function.",
        )
    }

    pub fn not_a_parameter(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NotAParameter, "not a parameter.")
    }

    pub fn uses_itself(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::UsesItself, "uses itself.")
    }

    pub fn not_a_constant_function(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NotAConstantFunction, "not a constant function.")
    }

    pub fn not_constant(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NotConstant, "not a constant.")
    }

    pub fn eval_error(region: FileRegion, msg: impl Into<String>) -> Self {
        Self::new(region, ElbErrorKind::EvalError, msg)
    }

    pub fn dimension_mismatch(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::DimensionMismatch, "dimension mismatch.")
    }

    pub fn range_order(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::RangeOrder,
            "range order conflicts with the declared range.",
        )
    }

    pub fn select_on_real(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::SelectOnReal,
            "bit-select/part-select for real-type object.",
        )
    }

    pub fn select_for_namedevent(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::SelectForNamedEvent,
            "bit-select/part-select for a named event.",
        )
    }

    pub fn select_in_pca(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::SelectInPca,
            "bit-select/part-select in assign/deassign statement.",
        )
    }

    pub fn select_in_force(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::SelectInForce,
            "bit-select/part-select in force/release statement.",
        )
    }

    pub fn array_in_pca(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::ArrayInPca,
            "array element in assign/deassign statement.",
        )
    }

    pub fn array_in_force(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::ArrayInForce,
            "array element in force/release statement.",
        )
    }

    pub fn illegal_operator_in_lhs(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalOperatorInLhs,
            "illegal operator in left-hand side.",
        )
    }

    pub fn illegal_constant_in_lhs(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalConstantInLhs,
            "constant shall not be used in left-hand side.",
        )
    }

    pub fn illegal_funccall_in_lhs(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalFuncCallInLhs,
            "function call shall not be used in left-hand side.",
        )
    }

    pub fn illegal_sysfunccall_in_lhs(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalSysFuncCallInLhs,
            "system-function call shall not be used in left-hand side.",
        )
    }

    pub fn illegal_constant_in_event_expression(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalConstantInEventExpr,
            "constant shall not be used in event expression.",
        )
    }

    pub fn illegal_funccall_in_event_expression(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalFuncCallInEventExpr,
            "function call shall not be used in event expression.",
        )
    }

    pub fn illegal_sysfunccall_in_event_expression(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalSysFuncCallInEventExpr,
            "system-function call shall not be used in event expression.",
        )
    }

    pub fn illegal_edge_descriptor(expr: &PtExpr) -> Self {
        Self::expr_error(
            expr,
            ElbErrorKind::IllegalEdgeDescriptor,
            "edge descriptor shall not be used here.",
        )
    }

    pub fn illegal_real_type(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::IllegalRealType, "real-type operand is not allowed.")
    }

    pub fn no_such_function(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NoSuchFunction, "no such function.")
    }

    pub fn no_such_sysfunction(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NoSuchSysFunction, "no such system function.")
    }

    pub fn not_a_function(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NotAFunction, "not a function.")
    }

    pub fn n_of_arguments_mismatch(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::NArgMismatch, "number of arguments mismatch.")
    }

    pub fn illegal_argument_type(expr: &PtExpr) -> Self {
        Self::expr_error(expr, ElbErrorKind::IllegalArgumentType, "argument type mismatch.")
    }

    pub fn duplicate_name(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::DuplicateName,
            format!("{name}: already declared in this scope."),
        )
    }

    pub fn too_many_param(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::TooManyParam,
            "too many parameter-port assignments.",
        )
    }

    pub fn no_param(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::NoParam,
            format!("{name}: no such parameter."),
        )
    }

    pub fn not_a_parameter_target(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::NotAParameter,
            format!("{name}: not a parameter."),
        )
    }

    pub fn is_a_localparam(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::IsALocalparam,
            format!("{name}: defparam shall not override a localparam."),
        )
    }

    pub fn cyclic_dependency(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::CyclicDependency,
            format!("{name}: instantiation is cyclic."),
        )
    }

    pub fn instance_not_found(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::InstanceNotFound,
            format!("{name}: no such module or UDP or cell."),
        )
    }

    pub fn noname_module(region: FileRegion) -> Self {
        Self::new(region, ElbErrorKind::NonameModule, "module instance requires a name.")
    }

    pub fn udp_with_paramassign(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::UdpWithParamAssign,
            "UDP instance shall not have parameter assignments.",
        )
    }

    pub fn cell_with_paramassign(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::CellWithParamAssign,
            "cell instance shall not have parameter assignments.",
        )
    }

    pub fn too_many_items_in_port_list(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::TooManyItemsInPortList,
            "too many items in the port list.",
        )
    }

    pub fn illegal_port_name(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::IllegalPortName,
            format!("{name}: no such port."),
        )
    }

    pub fn illegal_pin_name(region: FileRegion, name: &str) -> Self {
        Self::new(region, ElbErrorKind::IllegalPinName, format!("{name}: no such pin."))
    }

    pub fn empty_port_expression(region: FileRegion) -> Self {
        Self::new(region, ElbErrorKind::EmptyPortExpr, "empty port expression.")
    }

    pub fn named_port_in_udp_instance(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::NamedPortInUdp,
            "UDP instance shall not have named port connections.",
        )
    }

    pub fn udp_port_num_mismatch(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::UdpPortNumMismatch,
            "number of ports mismatch.",
        )
    }

    pub fn real_type_in_port_list(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::RealInPort,
            "real-type expression shall not be connected to a port.",
        )
    }

    pub fn port_size_mismatch(region: FileRegion, name: &str, index: usize) -> Self {
        Self::new(
            region,
            ElbErrorKind::PortSizeMismatch,
            format!("{name}: port #{index} size mismatch."),
        )
    }

    pub fn illegal_port(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::IllegalPort,
            format!("{name}: illegal port reference."),
        )
    }

    pub fn port_array(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::PortArray,
            format!("{name}: array shall not be used as a port reference."),
        )
    }

    pub fn duplicate_gencase_labels(region: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::DuplicateGenCaseLabels,
            "more than one generate-case label matches.",
        )
    }

    pub fn genvar_not_found(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::GenvarNotFound,
            format!("{name}: genvar not found."),
        )
    }

    pub fn not_a_genvar(region: FileRegion, name: &str) -> Self {
        Self::new(region, ElbErrorKind::NotAGenvar, format!("{name}: not a genvar."))
    }

    pub fn genvar_in_use(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::GenvarInUse,
            format!("{name}: already in use in another generate-for loop."),
        )
    }

    pub fn genvar_negative(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::GenvarNegative,
            format!("{name}: genvar value shall not be negative."),
        )
    }

    pub fn no_impnet(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::NoImpnet,
            format!("{name}: implicit net declaration is inhibited because `default_nettype is \"none\"."),
        )
    }

    pub fn impnet_with_init(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::ImpnetWithInit,
            format!("{name}: implicit net declaration shall not have an initial value."),
        )
    }

    pub fn duplicate_type(region: FileRegion, name: &str, prev: FileRegion) -> Self {
        Self::new(
            region,
            ElbErrorKind::DuplicateType,
            format!(
                "{name}: duplicate declaration (previously declared at line {}).",
                prev.line
            ),
        )
    }

    pub fn array_io(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::ArrayIO,
            format!("{name}: array shall not be used in an IO declaration."),
        )
    }

    pub fn illegal_io(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::IllegalIO,
            format!("{name}: illegal object for an IO declaration."),
        )
    }

    pub fn conflict_io_range(region: FileRegion, name: &str) -> Self {
        Self::new(
            region,
            ElbErrorKind::ConflictIoRange,
            format!("{name}: conflicting range between the IO declaration and the declaration."),
        )
    }
}

impl fmt::Display for ElbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for ElbError {}
