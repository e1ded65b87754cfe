use cinder_type::types::TypeId;

use crate::{ExprId, FunctionId, LabelId, LocalId};

/// A primitive-IR expression. Function bodies are flat statement lists over
/// these nodes; operands reference other nodes by id.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  /// Reference to a named symbol (local variable or parameter).
  SymRef(LocalId),

  /// Call expression: a resolved function or a primitive.
  Call(Call),

  /// Jump target marker.
  Label(LabelId),

  /// Unconditional jump.
  Goto(LabelId),

  /// Conditional jump: if condition is true, go to then_label, else else_label.
  Branch {
    condition: ExprId,
    then_label: LabelId,
    else_label: LabelId,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
  pub callee: Callee,
  pub args: Vec<ExprId>,
  /// Result type of the call. `Void` for the statement primitives.
  pub ty: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callee {
  /// Call to a resolved user function.
  Resolved(FunctionId),
  Primitive(Primitive),
}

/// Primitive operations recognized by the middle end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
  /// `move lhs, rhs` - initializing store into a symbol.
  Move,
  /// `assign lhs, rhs` - overwriting store into a symbol.
  Assign,
  /// `return` with zero or one operand. Consumes a returned symbol.
  Return,
  /// Value-producing primitive: default-constructs a value of the call's type.
  Init,
}

impl Call {
  pub fn is_primitive(
    &self,
    primitive: Primitive,
  ) -> bool {
    self.callee == Callee::Primitive(primitive)
  }

  pub fn resolved(&self) -> Option<FunctionId> {
    match self.callee {
      Callee::Resolved(id) => Some(id),
      Callee::Primitive(_) => None,
    }
  }
}

impl Expr {
  pub fn as_sym_ref(&self) -> Option<LocalId> {
    match self {
      Expr::SymRef(local) => Some(*local),
      _ => None,
    }
  }

  pub fn as_call(&self) -> Option<&Call> {
    match self {
      Expr::Call(call) => Some(call),
      _ => None,
    }
  }

  /// True for statements that transfer control: `goto`, `branch`, and the
  /// `return` primitive. Nothing may execute after one of these within a
  /// basic block.
  pub fn is_jump(&self) -> bool {
    match self {
      Expr::Goto(_) | Expr::Branch { .. } => true,
      Expr::Call(call) => call.is_primitive(Primitive::Return),
      _ => false,
    }
  }
}
