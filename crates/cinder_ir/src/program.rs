use cinder_type::{Store, span::Span, types::TypeId};

use crate::{Expr, ExprId, LocalId, registry::DestructorRegistry};

/// Top-level IR program: the function table plus the destructor registry.
#[derive(Debug, Clone)]
pub struct IrProgram {
  pub functions: Store<Function>,
  pub destructors: DestructorRegistry,
}

impl IrProgram {
  pub fn new() -> Self {
    Self {
      functions: Store::new(),
      destructors: DestructorRegistry::new(),
    }
  }
}

impl Default for IrProgram {
  fn default() -> Self {
    Self::new()
  }
}

/// A single function lowered to the primitive IR.
#[derive(Debug, Clone)]
pub struct Function {
  pub name: String,
  /// Formal parameters, in declaration order. Each is also in `locals`.
  pub params: Vec<LocalId>,
  /// All named symbols of the function, in source order.
  pub locals: Store<LocalData>,
  /// Jump targets referenced by `Goto`/`Branch`/`Label` nodes.
  pub labels: Store<LabelData>,
  /// Expression arena for the body.
  pub exprs: Store<Expr>,
  /// Ordered statement list. `None` marks a prototype without a body.
  pub body: Option<Vec<ExprId>>,
  pub return_type: TypeId,
  /// Set on functions that destroy their single record argument.
  pub is_destructor: bool,
  pub span: Span,
}

impl Function {
  pub fn local_type(
    &self,
    local: &LocalId,
  ) -> TypeId {
    self.locals.get(local).ty
  }

  /// Debug name of a local, or `_` when it has none.
  pub fn local_name(
    &self,
    local: &LocalId,
  ) -> &str {
    self.locals.get(local).name.as_deref().unwrap_or("_")
  }

  pub fn is_prototype(&self) -> bool {
    self.body.is_none()
  }
}

/// Metadata for a named symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalData {
  /// Debug name (for diagnostics and pretty printing).
  pub name: Option<String>,
  pub ty: TypeId,
  pub kind: LocalKind,
  pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
  Param,
  Local,
}

/// Metadata for a jump target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelData {
  pub name: String,
}
