//! Fluent Control-Flow Builder
//!
//! `FlowBuilder` owns the whole tree under construction: an arena of scopes
//! indexed by `ScopeId`, one arena per construct kind, the parameters, the
//! return label and the flat registry of user labels.
//!
//! Callers never touch the arena directly. They obtain the top-level scope
//! with [`FlowBuilder::body`] and chain calls through the [`Block`] trait;
//! nested constructs hand out typed child handles that own their parent
//! handle and give it back from `end()`.
//!
//! Every scope keeps two relations apart:
//! - the *syntactic parent* is the handle that receives control on `end()`
//! - the *lookup parent* (`ScopeData::lookup`) is the scope consulted for
//!   visible symbols, loop targets and rethrow legality
//!
//! # Example
//!
//! ```rust,ignore
//! let mut flow = FlowBuilder::new(&[], Type::Int)?;
//! flow.body()
//!     .assign("x", Type::Int, Expr::int(0))?
//!     .loop_while(Expr::param("x", Type::Int).lt(Expr::int(3)))?
//!     .assign("x", Type::Int, Expr::param("x", Type::Int).add(Expr::int(1)))?
//!     .end()
//!     .return_value(Type::Int, Expr::param("x", Type::Int))?;
//! let artifact = flow.assemble()?;
//! ```

mod assemble;
mod conditional;
mod exception;
mod looping;
mod resource;
mod scope;
mod switch;

pub use conditional::Branch;
pub use exception::TryScope;
pub use looping::LoopBody;
pub use resource::ResourceBody;
pub use scope::{Block, Body, Handle};
pub use switch::{CaseBody, CaseBuilder, SwitchBuilder};

use crate::config::BuilderOptions;
use crate::error::{BuildError, BuildResult};
use crate::ir::{Expr, LabelId, LabelTarget, Node, Symbol, SymbolId, Type};
use crate::rewrite::{Fragment, Rewriter, SymbolScope};
use conditional::Conditional;
use exception::TryRegion;
use looping::{Iteration, LoopData};
use resource::ResourceRegion;
use rustc_hash::FxHashMap;
use switch::Switch;
use tracing::trace;

/// Scope identifier (index into the builder's scope arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A construct spliced into a scope, indexing its kind's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Construct {
    Conditional(usize),
    Loop(usize),
    Iteration(usize),
    Switch(usize),
    Try(usize),
    Resource(usize),
}

/// One statement of a scope
#[derive(Debug, Clone)]
pub(crate) enum Stmt {
    /// Finished leaf node
    Node(Node),
    /// Jump to a user label, resolved by name at assembly
    Goto(String),
    /// Root of a nested construct
    Construct(Construct),
}

#[derive(Debug, Clone)]
pub(crate) struct ScopeData {
    /// Statements in order
    pub(crate) stmts: Vec<Stmt>,
    /// Symbols owned by this scope
    pub(crate) locals: Vec<Symbol>,
    /// Symbols visible here but owned by the surrounding construct
    /// (parameters, catch bindings, resources)
    pub(crate) implicit: Vec<Symbol>,
    /// Lookup parent (None only for the top scope)
    pub(crate) lookup: Option<ScopeId>,
    /// Scopes whose lookup parent is this one
    pub(crate) children: Vec<ScopeId>,
    /// Loop this scope is the body of
    pub(crate) loop_of: Option<usize>,
    /// Set only on catch bodies
    pub(crate) catch_body: bool,
}

impl ScopeData {
    fn new(lookup: Option<ScopeId>, loop_of: Option<usize>, catch_body: bool) -> Self {
        Self {
            stmts: Vec::new(),
            locals: Vec::new(),
            implicit: Vec::new(),
            lookup,
            children: Vec::new(),
            loop_of,
            catch_body,
        }
    }

    fn owns_name(&self, name: &str) -> Option<&Symbol> {
        self.locals
            .iter()
            .chain(self.implicit.iter())
            .find(|s| s.is_named(name))
    }

    fn owns(&self, symbol: &Symbol) -> bool {
        self.locals
            .iter()
            .chain(self.implicit.iter())
            .any(|s| s.id == symbol.id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stmts.is_empty() && self.locals.is_empty()
    }
}

/// Root of a procedure under construction
#[derive(Debug, Clone)]
pub struct FlowBuilder {
    options: BuilderOptions,
    params: Vec<Symbol>,
    return_label: LabelTarget,
    /// Flat registry of user labels, keyed by name
    labels: FxHashMap<String, LabelTarget>,
    scopes: Vec<ScopeData>,
    conditionals: Vec<Conditional>,
    loops: Vec<LoopData>,
    iterations: Vec<Iteration>,
    switches: Vec<Switch>,
    tries: Vec<TryRegion>,
    resources: Vec<ResourceRegion>,
    next_symbol: u32,
    next_label: u32,
}

impl FlowBuilder {
    /// Top-level scope of every builder
    pub const TOP: ScopeId = ScopeId(0);

    /// Create a builder with default options
    pub fn new(params: &[(&str, Type)], return_type: Type) -> BuildResult<Self> {
        Self::with_options(BuilderOptions::default(), params, return_type)
    }

    /// Create a builder with the given options. Parameter names must be
    /// distinct.
    pub fn with_options(
        options: BuilderOptions,
        params: &[(&str, Type)],
        return_type: Type,
    ) -> BuildResult<Self> {
        let mut flow = FlowBuilder {
            options,
            params: Vec::with_capacity(params.len()),
            return_label: LabelTarget::typed(LabelId(0), return_type),
            labels: FxHashMap::default(),
            scopes: vec![ScopeData::new(None, None, false)],
            conditionals: Vec::new(),
            loops: Vec::new(),
            iterations: Vec::new(),
            switches: Vec::new(),
            tries: Vec::new(),
            resources: Vec::new(),
            next_symbol: 0,
            next_label: 1,
        };
        for (name, ty) in params {
            let symbol = flow.bind(Self::TOP, name, ty.clone(), true)?;
            flow.params.push(symbol);
        }
        trace!(
            name = %flow.options.name,
            params = flow.params.len(),
            "created flow builder"
        );
        Ok(flow)
    }

    /// Handle onto the top-level scope
    pub fn body(&mut self) -> Body<'_> {
        Body::new(self, Self::TOP)
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Parameters, in declaration order
    pub fn params(&self) -> &[Symbol] {
        &self.params
    }

    /// Fixed return type
    pub fn return_type(&self) -> &Type {
        &self.return_label.ty
    }

    /// Label every return jumps to
    pub fn return_label(&self) -> &LabelTarget {
        &self.return_label
    }

    /// Look up a registered user label
    pub fn label(&self, name: &str) -> Option<&LabelTarget> {
        self.labels.get(name)
    }

    /// Number of scopes allocated so far
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Does `id` name a scope allocated by this builder?
    pub fn has_scope(&self, id: ScopeId) -> bool {
        id.index() < self.scopes.len()
    }

    // ------------------------------------------------------------------
    // Arena
    // ------------------------------------------------------------------

    pub(crate) fn scope(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id.index()]
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut ScopeData {
        &mut self.scopes[id.index()]
    }

    /// Allocate a scope and register it under its lookup parent
    pub(crate) fn new_scope(
        &mut self,
        lookup: Option<ScopeId>,
        loop_of: Option<usize>,
        catch_body: bool,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData::new(lookup, loop_of, catch_body));
        if let Some(parent) = lookup {
            self.scope_mut(parent).children.push(id);
        }
        id
    }

    pub(crate) fn push(&mut self, scope: ScopeId, stmt: Stmt) {
        self.scope_mut(scope).stmts.push(stmt);
    }

    pub(crate) fn fresh_symbol(&mut self, name: Option<&str>, ty: Type) -> Symbol {
        let id = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        match name {
            Some(name) => Symbol::named(id, name, ty),
            None => Symbol::anonymous(id, ty),
        }
    }

    pub(crate) fn fresh_label(&mut self) -> LabelTarget {
        let id = LabelId(self.next_label);
        self.next_label += 1;
        LabelTarget::system(id)
    }

    // ------------------------------------------------------------------
    // Lookup chain
    // ------------------------------------------------------------------

    /// `scope` followed by its lookup ancestors
    pub(crate) fn chain(&self, scope: ScopeId) -> impl Iterator<Item = &ScopeData> + '_ {
        std::iter::successors(Some(self.scope(scope)), move |data| {
            data.lookup.map(|parent| self.scope(parent))
        })
    }

    /// Resolve a visible symbol by name
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        if !self.has_scope(scope) {
            return None;
        }
        self.chain(scope).find_map(|data| data.owns_name(name))
    }

    /// Is this exact symbol visible from `scope`?
    pub fn is_visible(&self, scope: ScopeId, symbol: &Symbol) -> bool {
        self.has_scope(scope) && self.chain(scope).any(|data| data.owns(symbol))
    }

    fn declared_below(&self, scope: ScopeId, name: &str) -> bool {
        self.scope(scope).children.iter().any(|&child| {
            self.scope(child).owns_name(name).is_some() || self.declared_below(child, name)
        })
    }

    /// Innermost loop enclosing `scope`
    pub(crate) fn enclosing_loop(&self, scope: ScopeId) -> Option<&LoopData> {
        self.chain(scope)
            .find_map(|data| data.loop_of)
            .map(|index| &self.loops[index])
    }

    pub(crate) fn rethrow_allowed(&self, scope: ScopeId) -> bool {
        self.chain(scope).any(|data| data.catch_body)
    }

    /// Captures are a builder-wide setting; every chain bottoms out here.
    pub(crate) fn captures_allowed(&self) -> bool {
        self.options.allow_captures
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Register a named symbol in `scope`. Fails if the name is visible
    /// from `scope` or already declared in any scope below it.
    pub(crate) fn bind(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: Type,
        implicit: bool,
    ) -> BuildResult<Symbol> {
        if self.lookup(scope, name).is_some() || self.declared_below(scope, name) {
            return Err(BuildError::NameConflict {
                name: name.to_string(),
            });
        }
        let symbol = self.fresh_symbol(Some(name), ty);
        let data = self.scope_mut(scope);
        if implicit {
            data.implicit.push(symbol.clone());
        } else {
            data.locals.push(symbol.clone());
        }
        trace!(scope = scope.0, symbol = %symbol, "bound symbol");
        Ok(symbol)
    }

    /// Rewrite a fragment against the symbols visible from `scope`
    pub(crate) fn rewrite(&self, scope: ScopeId, fragment: Fragment) -> BuildResult<Expr> {
        let view = ScopeView { flow: self, scope };
        let mut rewriter = Rewriter::new(&view);
        let expr = rewriter.rewrite(fragment)?;
        if !rewriter.captures().is_empty() {
            trace!(
                scope = scope.0,
                captures = rewriter.captures().len(),
                "fragment captures external symbols"
            );
        }
        Ok(expr)
    }
}

/// Check that `value` may be stored where `expected` is required
pub(crate) fn expect_type(expected: &Type, value: &Expr) -> BuildResult<()> {
    if value.is_null() && expected.is_reference() {
        return Ok(());
    }
    let found = value.ty();
    if expected.accepts(&found) {
        Ok(())
    } else {
        Err(BuildError::TypeMismatch {
            expected: expected.clone(),
            found,
        })
    }
}

/// The builder seen from one scope
struct ScopeView<'a> {
    flow: &'a FlowBuilder,
    scope: ScopeId,
}

impl SymbolScope for ScopeView<'_> {
    fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.flow.lookup(self.scope, name)
    }

    fn is_visible(&self, symbol: &Symbol) -> bool {
        self.flow.is_visible(self.scope, symbol)
    }

    fn captures_allowed(&self) -> bool {
        self.flow.captures_allowed()
    }
}
