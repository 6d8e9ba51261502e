use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::{
    pt::NameBranch,
    vl::{
        AttrStore, ContAssignId, DeclArrayId, DeclId, DefParamId, ExprId, GenvarId, GfRoot, GfRootId, ModuleArrayId,
        ModuleId, ParamAssignId, ParamId, PrimArrayId, PrimId, ProcessId, ScopeId, ScopeKind, SpecBlockId, StmtId,
        TaskFuncId, UdpDefnId, VlContAssign, VlDecl, VlDeclArray, VlDefParam, VlExpr, VlGenvar, VlModule,
        VlModuleArray, VlParamAssign, VlParameter, VlPrimArray, VlPrimitive, VlProcess, VlScope, VlSpecBlock, VlStmt,
        VlTaskFunc, VlUdpDefn,
    },
};

/// Handle to any nameable object, the value type of the per-scope name
/// dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjHandle {
    Scope(ScopeId),
    Module(ModuleId),
    ModuleArray(ModuleArrayId),
    Decl(DeclId),
    DeclArray(DeclArrayId),
    Param(ParamId),
    Genvar(GenvarId),
    TaskFunc(TaskFuncId),
    Prim(PrimId),
    PrimArray(PrimArrayId),
    /// The index left behind by a generate-for loop.
    GfRoot(GfRootId),
}

impl ObjHandle {
    pub fn as_decl(self) -> Option<DeclId> {
        match self {
            Self::Decl(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_param(self) -> Option<ParamId> {
        match self {
            Self::Param(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_taskfunc(self) -> Option<TaskFuncId> {
        match self {
            Self::TaskFunc(id) => Some(id),
            _ => None,
        }
    }
}

/// Kind tag for the per-scope member enumeration dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
pub enum VlTag {
    InternalScope,
    Module,
    ModuleArray,
    Net,
    Reg,
    Variables,
    NamedEvent,
    NetArray,
    RegArray,
    VariablesArray,
    NamedEventArray,
    Parameter,
    Genvar,
    Task,
    Function,
    ContAssign,
    ParamAssign,
    DefParam,
    Primitive,
    PrimArray,
    Process,
    SpecBlock,
}

/// The elaborated design database: arenas for every entity kind plus
/// the name dictionary, the tag dictionary and the attribute store.
///
/// Queried live through the `find_*` surface; structural snapshots go
/// through [`dump_design`](crate::vl::dump_design).
#[derive(Debug, Default)]
pub struct VlDb {
    pub(crate) scopes: Vec<VlScope>,
    pub(crate) modules: Vec<VlModule>,
    pub(crate) module_arrays: Vec<VlModuleArray>,
    pub(crate) decls: Vec<VlDecl>,
    pub(crate) decl_arrays: Vec<VlDeclArray>,
    pub(crate) params: Vec<VlParameter>,
    pub(crate) genvars: Vec<VlGenvar>,
    pub(crate) prims: Vec<VlPrimitive>,
    pub(crate) prim_arrays: Vec<VlPrimArray>,
    pub(crate) cont_assigns: Vec<VlContAssign>,
    pub(crate) param_assigns: Vec<VlParamAssign>,
    pub(crate) defparams: Vec<VlDefParam>,
    pub(crate) processes: Vec<VlProcess>,
    pub(crate) taskfuncs: Vec<VlTaskFunc>,
    pub(crate) stmts: Vec<VlStmt>,
    pub(crate) exprs: Vec<VlExpr>,
    pub(crate) udp_defns: Vec<VlUdpDefn>,
    pub(crate) gf_roots: Vec<GfRoot>,
    pub(crate) spec_blocks: Vec<VlSpecBlock>,

    /// `name -> handle` per scope. Distinct kinds never share a name
    /// within one scope.
    obj_dict: AHashMap<ScopeId, AHashMap<String, ObjHandle>>,
    /// `(scope, tag) -> members`, for O(matches) enumeration.
    tag_dict: AHashMap<(ScopeId, VlTag), Vec<ObjHandle>>,
    /// UDP definitions by name.
    udp_dict: AHashMap<String, UdpDefnId>,
    /// Lazily built constant functions, keyed by defining module scope.
    pub(crate) constant_funcs: AHashMap<(ScopeId, String), TaskFuncId>,
    pub(crate) toplevel: Option<ScopeId>,
    pub(crate) top_modules: Vec<ModuleId>,
    pub attrs: AttrStore,
}

macro_rules! arena_access {
    ($add:ident, $get:ident, $get_mut:ident, $field:ident, $id:ty, $entity:ty) => {
        pub(crate) fn $add(&mut self, entity: $entity) -> $id {
            let id = <$id>::new(self.$field.len());
            self.$field.push(entity);
            id
        }

        pub fn $get(&self, id: $id) -> &$entity {
            &self.$field[id.index()]
        }

        pub(crate) fn $get_mut(&mut self, id: $id) -> &mut $entity {
            &mut self.$field[id.index()]
        }
    };
}

impl VlDb {
    pub fn new() -> Self {
        Self::default()
    }

    arena_access!(add_scope, scope, scope_mut, scopes, ScopeId, VlScope);
    arena_access!(add_module, module, module_mut, modules, ModuleId, VlModule);
    arena_access!(add_module_array, module_array, module_array_mut, module_arrays, ModuleArrayId, VlModuleArray);
    arena_access!(add_decl, decl, decl_mut, decls, DeclId, VlDecl);
    arena_access!(add_decl_array, decl_array, decl_array_mut, decl_arrays, DeclArrayId, VlDeclArray);
    arena_access!(add_param, param, param_mut, params, ParamId, VlParameter);
    arena_access!(add_genvar, genvar, genvar_mut, genvars, GenvarId, VlGenvar);
    arena_access!(add_prim, prim, prim_mut, prims, PrimId, VlPrimitive);
    arena_access!(add_prim_array, prim_array, prim_array_mut, prim_arrays, PrimArrayId, VlPrimArray);
    arena_access!(add_cont_assign, cont_assign, cont_assign_mut, cont_assigns, ContAssignId, VlContAssign);
    arena_access!(add_param_assign, param_assign, param_assign_mut, param_assigns, ParamAssignId, VlParamAssign);
    arena_access!(add_defparam, defparam, defparam_mut, defparams, DefParamId, VlDefParam);
    arena_access!(add_process, process, process_mut, processes, ProcessId, VlProcess);
    arena_access!(add_taskfunc, taskfunc, taskfunc_mut, taskfuncs, TaskFuncId, VlTaskFunc);
    arena_access!(add_stmt, stmt, stmt_mut, stmts, StmtId, VlStmt);
    arena_access!(add_expr, expr, expr_mut, exprs, ExprId, VlExpr);
    arena_access!(add_udp_defn, udp_defn, udp_defn_mut, udp_defns, UdpDefnId, VlUdpDefn);
    arena_access!(add_gf_root, gf_root, gf_root_mut, gf_roots, GfRootId, GfRoot);
    arena_access!(add_spec_block, spec_block, spec_block_mut, spec_blocks, SpecBlockId, VlSpecBlock);

    /// Registers a nameable object in its scope's dictionary. Returns
    /// false when the name is already taken (the caller reports the
    /// error).
    pub(crate) fn reg_obj(&mut self, scope: ScopeId, name: &str, handle: ObjHandle) -> bool {
        let names = self.obj_dict.entry(scope).or_default();
        if names.contains_key(name) {
            return false;
        }
        names.insert(name.to_owned(), handle);
        true
    }

    pub(crate) fn reg_tag(&mut self, scope: ScopeId, tag: VlTag, handle: ObjHandle) {
        self.tag_dict.entry((scope, tag)).or_default().push(handle);
    }

    pub(crate) fn reg_udp(&mut self, name: &str, id: UdpDefnId) {
        self.udp_dict.insert(name.to_owned(), id);
    }

    pub(crate) fn set_toplevel(&mut self, scope: ScopeId) {
        self.toplevel = Some(scope);
    }

    pub(crate) fn reg_topmodule(&mut self, module: ModuleId) {
        self.top_modules.push(module);
    }

    /// Local-only name lookup.
    pub fn find_obj(&self, scope: ScopeId, name: &str) -> Option<ObjHandle> {
        self.obj_dict.get(&scope).and_then(|names| names.get(name)).copied()
    }

    /// Local then upward lookup along the parent chain.
    pub fn find_obj_up(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, ObjHandle)> {
        let mut current = Some(scope);
        while let Some(s) = current {
            if let Some(handle) = self.find_obj(s, name) {
                return Some((s, handle));
            }
            current = self.scope(s).parent;
        }
        None
    }

    /// Hierarchical lookup per the language rules: the head branch is
    /// searched locally then upward (and among top modules); the
    /// remaining branches descend through child scopes, indexing into
    /// module arrays and generate-for scopes where an index is given.
    pub fn find_hierarchical(&self, base: ScopeId, branches: &[NameBranch], tail: &str) -> Option<ObjHandle> {
        if branches.is_empty() {
            return self.find_obj_up(base, tail).map(|(_, h)| h);
        }

        let head = &branches[0];
        let mut handle = match self.find_obj_up(base, &head.name) {
            Some((_, h)) => h,
            None => {
                // Fall back to a root search among top modules.
                let toplevel = self.toplevel?;
                self.find_obj(toplevel, &head.name)?
            }
        };
        handle = self.apply_branch_index(handle, head.index)?;

        for branch in &branches[1..] {
            let scope = self.handle_scope(handle)?;
            handle = self.find_obj(scope, &branch.name)?;
            handle = self.apply_branch_index(handle, branch.index)?;
        }

        let scope = self.handle_scope(handle)?;
        self.find_obj(scope, tail)
    }

    /// Resolves an index against a branch handle: module arrays and
    /// generate-for roots consume one, everything else refuses it.
    fn apply_branch_index(&self, handle: ObjHandle, index: Option<i32>) -> Option<ObjHandle> {
        match (handle, index) {
            (h, None) => Some(h),
            (ObjHandle::ModuleArray(id), Some(i)) => {
                let array = self.module_array(id);
                let offset = array.range.calc_offset(i)?;
                array.modules.get(offset as usize).copied().map(ObjHandle::Module)
            }
            (ObjHandle::GfRoot(id), Some(i)) => self.gf_root(id).find_iter(i).map(ObjHandle::Scope),
            _ => None,
        }
    }

    /// The scope a handle opens into, if it is scope-like.
    pub fn handle_scope(&self, handle: ObjHandle) -> Option<ScopeId> {
        match handle {
            ObjHandle::Scope(id) => Some(id),
            ObjHandle::Module(id) => Some(self.module(id).scope),
            ObjHandle::TaskFunc(id) => Some(self.taskfunc(id).scope),
            _ => None,
        }
    }

    /// The module instance a scope ultimately belongs to.
    pub fn parent_module(&self, scope: ScopeId) -> Option<ModuleId> {
        let mut current = Some(scope);
        while let Some(s) = current {
            if let ScopeKind::Module(m) = self.scope(s).kind {
                return Some(m);
            }
            current = self.scope(s).parent;
        }
        None
    }

    /// Dotted path of a scope from the root.
    pub fn full_name(&self, scope: ScopeId) -> String {
        let mut parts = vec![];
        let mut current = Some(scope);
        while let Some(s) = current {
            let sc = self.scope(s);
            if !sc.name.is_empty() {
                parts.push(sc.name.clone());
            }
            current = sc.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    pub fn toplevel(&self) -> Option<ScopeId> {
        self.toplevel
    }

    pub(crate) fn module_len(&self) -> usize {
        self.modules.len()
    }

    /// Attributes attached to an object, definition-side or
    /// instantiation-side.
    pub fn find_attr(&self, obj: crate::vl::VlObjRef, def_side: bool) -> &[crate::vl::VlAttribute] {
        self.attrs.find_attr(obj, def_side)
    }

    /// The top-level module instances, in elaboration order.
    pub fn topmodule_list(&self) -> &[ModuleId] {
        &self.top_modules
    }

    pub fn find_udp_defn(&self, name: &str) -> Option<UdpDefnId> {
        self.udp_dict.get(name).copied()
    }

    fn tag_list(&self, scope: ScopeId, tag: VlTag) -> &[ObjHandle] {
        self.tag_dict.get(&(scope, tag)).map_or(&[], Vec::as_slice)
    }

    pub fn find_internalscope_list(&self, scope: ScopeId) -> Vec<ScopeId> {
        self.tag_list(scope, VlTag::InternalScope)
            .iter()
            .filter_map(|h| match h {
                ObjHandle::Scope(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn find_decl_list(&self, scope: ScopeId, tag: VlTag) -> Vec<DeclId> {
        self.tag_list(scope, tag)
            .iter()
            .filter_map(|h| h.as_decl())
            .collect()
    }

    pub fn find_declarray_list(&self, scope: ScopeId, tag: VlTag) -> Vec<DeclArrayId> {
        self.tag_list(scope, tag)
            .iter()
            .filter_map(|h| match h {
                ObjHandle::DeclArray(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn find_module_list(&self, scope: ScopeId) -> Vec<ModuleId> {
        self.tag_list(scope, VlTag::Module)
            .iter()
            .filter_map(|h| match h {
                ObjHandle::Module(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn find_modulearray_list(&self, scope: ScopeId) -> Vec<ModuleArrayId> {
        self.tag_list(scope, VlTag::ModuleArray)
            .iter()
            .filter_map(|h| match h {
                ObjHandle::ModuleArray(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn find_primitive_list(&self, scope: ScopeId) -> Vec<PrimId> {
        self.tag_list(scope, VlTag::Primitive)
            .iter()
            .filter_map(|h| match h {
                ObjHandle::Prim(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn find_primarray_list(&self, scope: ScopeId) -> Vec<PrimArrayId> {
        self.tag_list(scope, VlTag::PrimArray)
            .iter()
            .filter_map(|h| match h {
                ObjHandle::PrimArray(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn find_task_list(&self, scope: ScopeId) -> Vec<TaskFuncId> {
        self.tag_list(scope, VlTag::Task)
            .iter()
            .filter_map(|h| h.as_taskfunc())
            .collect()
    }

    pub fn find_function_list(&self, scope: ScopeId) -> Vec<TaskFuncId> {
        self.tag_list(scope, VlTag::Function)
            .iter()
            .filter_map(|h| h.as_taskfunc())
            .collect()
    }

    pub fn find_paramassign_list(&self, scope: ScopeId) -> Vec<ParamAssignId> {
        self.param_assigns
            .iter()
            .enumerate()
            .filter(|(_, pa)| self.module(pa.module).scope == scope)
            .map(|(i, _)| ParamAssignId::new(i))
            .collect()
    }

    pub fn find_param_list(&self, scope: ScopeId) -> Vec<ParamId> {
        self.tag_list(scope, VlTag::Parameter)
            .iter()
            .filter_map(|h| h.as_param())
            .collect()
    }

    pub fn find_contassign_list(&self, scope: ScopeId) -> Vec<ContAssignId> {
        self.scoped_list(scope, &self.cont_assigns, |c| c.scope, ContAssignId::new)
    }

    pub fn find_defparam_list(&self, scope: ScopeId) -> Vec<DefParamId> {
        self.scoped_list(scope, &self.defparams, |d| d.scope, DefParamId::new)
    }

    pub fn find_process_list(&self, scope: ScopeId) -> Vec<ProcessId> {
        self.scoped_list(scope, &self.processes, |p| p.scope, ProcessId::new)
    }

    fn scoped_list<T, I>(&self, scope: ScopeId, arena: &[T], get_scope: fn(&T) -> ScopeId, mk: fn(usize) -> I) -> Vec<I> {
        arena
            .iter()
            .enumerate()
            .filter(|(_, e)| get_scope(e) == scope)
            .map(|(i, _)| mk(i))
            .collect()
    }
}
