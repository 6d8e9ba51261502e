//! The system-task/function registry interface.
//!
//! `$`-calls are external collaborators: elaboration neither defines
//! nor executes them, it only needs to answer "does `$clog2` exist,
//! is it a function, how many arguments, what does it return". Those
//! four facts are exactly what a [`VlUserSystf`] descriptor carries,
//! and [`SystfRegistry`] is the lookup seam a host environment
//! implements to plug in its own `$`-vocabulary. Keeping this a trait
//! (rather than a baked-in table) is what lets a simulator register
//! PLI tasks without touching the elaborator.
//!
//! [`SimpleSystfRegistry`] ships the standard core so tests and the
//! CLI work out of the box:
//!
//! ```
//! use velab::{SimpleSystfRegistry, SystfRegistry};
//!
//! let registry = SimpleSystfRegistry::new();
//! let clog2 = registry.find_user_systf("$clog2").unwrap();
//! assert_eq!(clog2.arg_num, Some(1));
//! assert!(registry.find_user_systf("$no_such_call").is_none());
//! ```

use crate::vtype::VlValueType;

/// Kind of a registered system task/function.
///
/// The distinction matters to the generators: a function may appear in
/// an expression and a task may be enabled as a statement, and using
/// one where the other belongs is a typed error rather than a lookup
/// miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystfKind {
    Task,
    Function,
}

/// Descriptor of a system task or function (`$display`, `$clog2`, ...).
///
/// The registry is opaque to elaboration except for what is checked
/// here: the kind, the declared arity when there is one, and the
/// result type of functions. Arity is an `Option` because the printf
/// family genuinely takes any number of arguments — `None` disables
/// the check rather than encoding a fake maximum.
///
/// A `ret_type` of `NoType` on a *function* marks the
/// operand-shaped calls (`$signed`/`$unsigned`), whose result type the
/// expression generator derives from the argument instead.
#[derive(Debug, Clone)]
pub struct VlUserSystf {
    pub name: String,
    pub kind: SystfKind,
    /// Fixed argument count; `None` accepts any arity (`$display`).
    pub arg_num: Option<u32>,
    /// Result type for functions; tasks leave `NoType`.
    pub ret_type: VlValueType,
}

impl VlUserSystf {
    pub fn function(name: impl Into<String>, arg_num: Option<u32>, ret_type: VlValueType) -> Self {
        Self {
            name: name.into(),
            kind: SystfKind::Function,
            arg_num,
            ret_type,
        }
    }

    pub fn task(name: impl Into<String>, arg_num: Option<u32>) -> Self {
        Self {
            name: name.into(),
            kind: SystfKind::Task,
            arg_num,
            ret_type: VlValueType::no_type(),
        }
    }
}

/// Lookup interface the elaborator uses for `$`-calls.
///
/// Implementations only ever see the call *name*; argument checking
/// and result typing happen in the expression generator against the
/// returned descriptor. A miss is not an implementation error — the
/// elaborator turns it into the `NoSuchSysFunction` diagnostic at the
/// call site.
pub trait SystfRegistry {
    fn find_user_systf(&self, name: &str) -> Option<&VlUserSystf>;
}

/// A registry backed by a plain list, preloaded with the common
/// standard tasks and functions.
///
/// Linear search is deliberate: registries hold a few dozen entries
/// and are consulted once per `$`-call during elaboration, so a map
/// would buy nothing. Hosts with larger vocabularies implement
/// [`SystfRegistry`] themselves.
#[derive(Debug)]
pub struct SimpleSystfRegistry {
    entries: Vec<VlUserSystf>,
}

impl Default for SimpleSystfRegistry {
    fn default() -> Self {
        let int_type = VlValueType::int_type();
        Self {
            entries: vec![
                VlUserSystf::task("$display", None),
                VlUserSystf::task("$write", None),
                VlUserSystf::task("$monitor", None),
                VlUserSystf::task("$finish", None),
                VlUserSystf::task("$stop", None),
                VlUserSystf::function("$time", Some(0), VlValueType::time_type()),
                VlUserSystf::function("$realtime", Some(0), VlValueType::real_type()),
                VlUserSystf::function("$random", None, int_type),
                VlUserSystf::function("$clog2", Some(1), int_type),
                VlUserSystf::function("$signed", Some(1), VlValueType::no_type()),
                VlUserSystf::function("$unsigned", Some(1), VlValueType::no_type()),
            ],
        }
    }
}

impl SimpleSystfRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, systf: VlUserSystf) {
        self.entries.push(systf);
    }
}

impl SystfRegistry for SimpleSystfRegistry {
    fn find_user_systf(&self, name: &str) -> Option<&VlUserSystf> {
        self.entries.iter().find(|e| e.name == name)
    }
}
