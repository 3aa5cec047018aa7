//! Fragment rewriting and capture validation
//!
//! A fragment is an already-typed expression whose placeholders name the
//! symbols it wants to read. Rewriting binds every placeholder to the symbol
//! of the same name visible in the target scope, and checks that any symbol
//! the fragment already references is visible there too. A reference to a
//! symbol that is not visible is an external capture.

use crate::error::{BuildError, BuildResult};
use crate::ir::{Expr, Placeholder, Symbol, Type};
use rustc_hash::FxHashMap;

/// Read-only view of the symbols visible from one scope
pub trait SymbolScope {
    /// Resolve a visible symbol by name
    fn resolve(&self, name: &str) -> Option<&Symbol>;

    /// Is this exact symbol (by identity) visible?
    fn is_visible(&self, symbol: &Symbol) -> bool;

    /// May fragments reference symbols that are not visible?
    fn captures_allowed(&self) -> bool;
}

/// An opaque, already-typed sub-expression plus the placeholders it binds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Placeholders to bind, in order
    pub params: Vec<Placeholder>,
    /// Expression body
    pub body: Expr,
}

impl Fragment {
    /// Fragment with an explicit placeholder list
    pub fn new(params: Vec<Placeholder>, body: Expr) -> Self {
        Self { params, body }
    }

    /// Fragment binding every placeholder that appears in `body`, in order
    /// of first appearance
    pub fn infer(body: Expr) -> Self {
        let mut params = Vec::new();
        collect_placeholders(&body, &mut params);
        Self { params, body }
    }

    /// Type of the fragment's value
    pub fn ty(&self) -> Type {
        self.body.ty()
    }
}

impl From<Expr> for Fragment {
    fn from(body: Expr) -> Self {
        Fragment::infer(body)
    }
}

fn collect_placeholders(expr: &Expr, out: &mut Vec<Placeholder>) {
    if let Expr::Param(placeholder) = expr {
        if !out.iter().any(|p| p.name == placeholder.name) {
            out.push(placeholder.clone());
        }
    }
    for child in expr.children() {
        collect_placeholders(child, out);
    }
}

/// Binds fragments against a scope
pub struct Rewriter<'s, S: SymbolScope + ?Sized> {
    scope: &'s S,
    /// Placeholder name -> bound symbol
    bindings: FxHashMap<String, Symbol>,
    /// External symbols referenced so far, in first-reference order
    captures: Vec<Symbol>,
}

impl<'s, S: SymbolScope + ?Sized> Rewriter<'s, S> {
    pub fn new(scope: &'s S) -> Self {
        Self {
            scope,
            bindings: FxHashMap::default(),
            captures: Vec::new(),
        }
    }

    /// Rewrite `fragment` into a fully bound expression
    pub fn rewrite(&mut self, fragment: Fragment) -> BuildResult<Expr> {
        for placeholder in &fragment.params {
            self.bind(placeholder)?;
        }
        self.rewrite_expr(fragment.body)
    }

    /// External symbols the rewritten fragments referenced
    pub fn captures(&self) -> &[Symbol] {
        &self.captures
    }

    fn bind(&mut self, placeholder: &Placeholder) -> BuildResult<()> {
        let symbol = self.scope.resolve(&placeholder.name).ok_or_else(|| {
            BuildError::UnboundPlaceholder {
                name: placeholder.name.clone(),
            }
        })?;
        if symbol.ty != placeholder.ty {
            return Err(BuildError::PlaceholderTypeMismatch {
                name: placeholder.name.clone(),
                expected: placeholder.ty.clone(),
                found: symbol.ty.clone(),
            });
        }
        self.bindings
            .insert(placeholder.name.clone(), symbol.clone());
        Ok(())
    }

    fn rewrite_expr(&mut self, expr: Expr) -> BuildResult<Expr> {
        Ok(match expr {
            Expr::Const(value) => Expr::Const(value),
            Expr::Param(placeholder) => {
                let symbol = self.bindings.get(&placeholder.name).ok_or_else(|| {
                    BuildError::UnboundPlaceholder {
                        name: placeholder.name.clone(),
                    }
                })?;
                if symbol.ty != placeholder.ty {
                    return Err(BuildError::PlaceholderTypeMismatch {
                        name: placeholder.name,
                        expected: placeholder.ty,
                        found: symbol.ty.clone(),
                    });
                }
                Expr::Var(symbol.clone())
            }
            Expr::Var(symbol) => {
                self.check_capture(&symbol)?;
                Expr::Var(symbol)
            }
            Expr::Unary { op, operand } => Expr::Unary {
                op,
                operand: Box::new(self.rewrite_expr(*operand)?),
            },
            Expr::Binary { op, left, right } => Expr::Binary {
                op,
                left: Box::new(self.rewrite_expr(*left)?),
                right: Box::new(self.rewrite_expr(*right)?),
            },
            Expr::Convert { operand, ty } => Expr::Convert {
                operand: Box::new(self.rewrite_expr(*operand)?),
                ty,
            },
            Expr::Intrinsic { op, args } => Expr::Intrinsic {
                op,
                args: self.rewrite_all(args)?,
            },
            Expr::Call { function, args, ty } => Expr::Call {
                function,
                args: self.rewrite_all(args)?,
                ty,
            },
            Expr::New { ty, args } => Expr::New {
                ty,
                args: self.rewrite_all(args)?,
            },
            Expr::List { elem, items } => Expr::List {
                elem,
                items: self.rewrite_all(items)?,
            },
        })
    }

    fn rewrite_all(&mut self, exprs: Vec<Expr>) -> BuildResult<Vec<Expr>> {
        exprs.into_iter().map(|e| self.rewrite_expr(e)).collect()
    }

    fn check_capture(&mut self, symbol: &Symbol) -> BuildResult<()> {
        if self.scope.is_visible(symbol) {
            return Ok(());
        }
        if !self.scope.captures_allowed() {
            return Err(BuildError::UnauthorizedCapture {
                name: symbol.to_string(),
            });
        }
        if !self.captures.iter().any(|c| c.id == symbol.id) {
            self.captures.push(symbol.clone());
        }
        Ok(())
    }
}
