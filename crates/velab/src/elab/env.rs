//! The expression-generation environment.
//!
//! Verilog restricts what may appear in an expression depending on
//! *where* the expression sits: a constant expression may only read
//! parameters and genvars, an event expression is the one place an
//! edge descriptor is legal, a left-hand side rejects constants and
//! calls outright, and `assign`/`force` left sides additionally forbid
//! selects and array elements. Rather than threading a dozen booleans
//! through every generator call (or worse, re-checking context by
//! walking back up the tree), all of these context facts travel
//! together in one copyable [`ElbEnv`] value.

/// The mode bits expression generation runs under.
///
/// A fresh `ElbEnv` is the plain-expression environment; the
/// constructors derive the restricted environments the generators
/// need. Everything is `Copy`, so deriving one env from another never
/// aliases state — handing a sub-expression a tweaked env cannot leak
/// the tweak back into the caller's context. That property is what
/// makes the parenthesisation unwrap safe: stripping `( ... )` keeps
/// the *same* env value, so `@((posedge clk))` elaborates exactly like
/// `@(posedge clk)`.
///
/// # Design Rationale
///
/// The flags are deliberately independent rather than an enum of
/// blessed combinations, because real contexts compose: the index
/// inside a left-hand-side select is a *read* context
/// (`without_lhs` strips the LHS bits while keeping the rest), and a
/// system-task argument inside a constant
/// function carries both `system_tf_arg` and
/// `inside_constant_function`. The constructors below cover the
/// combinations the generators actually start from; derivation methods
/// (`event`, `system_tf_arg`) layer on top of whichever env is already
/// in hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElbEnv {
    /// Constant-expression context: only parameters, genvars and
    /// constant functions may appear. Violations surface as the
    /// `Const*` error kinds so probing callers can tell "not constant"
    /// from a hard error.
    pub constant: bool,
    /// Inside the body of a constant function. Separate from
    /// `constant` because the diagnostics differ (`...in constant
    /// expression` vs `...inside constant function`) and because a
    /// constant function's locals are legal references where a plain
    /// constant expression allows none.
    pub inside_constant_function: bool,
    /// Event-expression context: edge descriptors and named events are
    /// allowed.
    pub event_expr: bool,
    /// Left-hand-side context: only primaries, selects and
    /// concatenations of those.
    pub lhs: bool,
    /// LHS of a procedural continuous assignment
    /// (`assign`/`deassign`): whole objects only, no selects, no array
    /// elements.
    pub pca: bool,
    /// LHS of `force`/`release`: same whole-object restriction as
    /// `pca`, reported with its own error kinds.
    pub force: bool,
    /// LHS of a continuous assignment, where an undeclared name
    /// becomes an implicit net of the module's default net type
    /// instead of a `NotFound` error.
    pub net_lhs: bool,
    /// Argument of a system task/function; bare identifiers may name
    /// scopes and whole arrays (`$dumpvars(0, top.u)`), which are
    /// illegal objects everywhere else.
    pub system_tf_arg: bool,
    /// Real-typed operands are acceptable here.
    pub allow_real: bool,
    /// A bare named event is a valid primary here (event controls and
    /// event triggers).
    pub named_event_ok: bool,
}

impl ElbEnv {
    /// The ordinary expression environment: anything goes except
    /// event-only and LHS-only constructs.
    pub fn new() -> Self {
        Self {
            allow_real: true,
            ..Self::default()
        }
    }

    /// Constant-expression environment (parameter defaults, range
    /// bounds, generate conditions, attribute values).
    pub fn constant() -> Self {
        Self {
            constant: true,
            allow_real: true,
            ..Self::default()
        }
    }

    /// Environment inside a constant function body.
    pub fn constant_function() -> Self {
        Self {
            inside_constant_function: true,
            allow_real: true,
            ..Self::default()
        }
    }

    /// Event-expression environment derived from `self`. Layered
    /// rather than built fresh so an event expression inside a
    /// constant-function body keeps the constant restrictions too.
    pub fn event(self) -> Self {
        Self {
            event_expr: true,
            named_event_ok: true,
            ..self
        }
    }

    /// System-tf argument environment derived from `self`.
    pub fn system_tf_arg(self) -> Self {
        Self {
            system_tf_arg: true,
            ..self
        }
    }

    /// Ordinary left-hand side (procedural or continuous assignment).
    pub fn lhs() -> Self {
        Self {
            lhs: true,
            allow_real: true,
            ..Self::default()
        }
    }

    /// LHS of assign/deassign: no selects, no array elements.
    pub fn pca_lhs() -> Self {
        Self {
            lhs: true,
            pca: true,
            ..Self::default()
        }
    }

    /// LHS of force/release: no selects, no array elements.
    pub fn force_lhs() -> Self {
        Self {
            lhs: true,
            force: true,
            ..Self::default()
        }
    }

    /// Net LHS of a continuous assignment: an ordinary LHS that may
    /// additionally create implicit nets.
    pub fn net_lhs() -> Self {
        Self {
            net_lhs: true,
            ..Self::lhs()
        }
    }

    pub fn is_constant(self) -> bool {
        self.constant
    }

    /// Any constant-ish restriction applies (constant expression or
    /// constant-function body).
    pub fn is_constant_like(self) -> bool {
        self.constant || self.inside_constant_function
    }
}
