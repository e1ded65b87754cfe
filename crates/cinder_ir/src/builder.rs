use cinder_type::{Store, span::Span, types::{TypeId, TypeStore}};

use crate::{
  Call, Callee, Expr, ExprId, Function, FunctionId, LabelData, LabelId, LocalData, LocalId,
  Primitive,
};

/// Builder for constructing a single function in primitive-IR form.
///
/// Stands in for the upstream lowering passes: emits the flat statement
/// list the middle end consumes, one statement at a time.
pub struct FunctionBuilder {
  name: String,
  params: Vec<LocalId>,
  locals: Store<LocalData>,
  labels: Store<LabelData>,
  exprs: Store<Expr>,
  body: Vec<ExprId>,
  return_type: TypeId,
  is_destructor: bool,
  void_ty: TypeId,
}

impl FunctionBuilder {
  pub fn new(
    name: &str,
    return_type: TypeId,
    types: &TypeStore,
  ) -> Self {
    Self {
      name: name.to_string(),
      params: Vec::new(),
      locals: Store::new(),
      labels: Store::new(),
      exprs: Store::new(),
      body: Vec::new(),
      return_type,
      is_destructor: false,
      void_ty: types.void(),
    }
  }

  /// Flag this function as a destructor of its single record argument.
  pub fn destructor(mut self) -> Self {
    self.is_destructor = true;
    self
  }

  pub fn param(
    &mut self,
    name: &str,
    ty: TypeId,
  ) -> LocalId {
    let id = self.locals.alloc(LocalData {
      name: Some(name.to_string()),
      ty,
      kind: crate::LocalKind::Param,
      span: Span::default(),
    });
    self.params.push(id);
    id
  }

  pub fn local(
    &mut self,
    name: &str,
    ty: TypeId,
  ) -> LocalId {
    self.locals.alloc(LocalData {
      name: Some(name.to_string()),
      ty,
      kind: crate::LocalKind::Local,
      span: Span::default(),
    })
  }

  /// Allocate a jump target. Place it into the body with [`place_label`].
  ///
  /// [`place_label`]: FunctionBuilder::place_label
  pub fn label(
    &mut self,
    name: &str,
  ) -> LabelId {
    self.labels.alloc(LabelData {
      name: name.to_string(),
    })
  }

  pub fn place_label(
    &mut self,
    label: LabelId,
  ) {
    let expr = self.exprs.alloc(Expr::Label(label));
    self.body.push(expr);
  }

  /// Allocate a symbol-reference operand.
  pub fn sym(
    &mut self,
    local: LocalId,
  ) -> ExprId {
    self.exprs.alloc(Expr::SymRef(local))
  }

  /// Allocate a call operand to a resolved function.
  pub fn call(
    &mut self,
    callee: FunctionId,
    args: Vec<ExprId>,
    ty: TypeId,
  ) -> ExprId {
    self.exprs.alloc(Expr::Call(Call {
      callee: Callee::Resolved(callee),
      args,
      ty,
    }))
  }

  /// Allocate an `init` primitive operand producing a value of `ty`.
  pub fn init(
    &mut self,
    ty: TypeId,
  ) -> ExprId {
    self.exprs.alloc(Expr::Call(Call {
      callee: Callee::Primitive(Primitive::Init),
      args: Vec::new(),
      ty,
    }))
  }

  /// Emit a previously allocated call expression as a statement.
  pub fn emit(
    &mut self,
    stmt: ExprId,
  ) {
    self.body.push(stmt);
  }

  pub fn emit_move(
    &mut self,
    lhs: LocalId,
    rhs: ExprId,
  ) {
    self.emit_store(Primitive::Move, lhs, rhs);
  }

  pub fn emit_assign(
    &mut self,
    lhs: LocalId,
    rhs: ExprId,
  ) {
    self.emit_store(Primitive::Assign, lhs, rhs);
  }

  fn emit_store(
    &mut self,
    primitive: Primitive,
    lhs: LocalId,
    rhs: ExprId,
  ) {
    let lhs = self.exprs.alloc(Expr::SymRef(lhs));
    let stmt = self.exprs.alloc(Expr::Call(Call {
      callee: Callee::Primitive(primitive),
      args: vec![lhs, rhs],
      ty: self.void_ty,
    }));
    self.body.push(stmt);
  }

  /// Emit a call statement to a resolved function.
  pub fn emit_call(
    &mut self,
    callee: FunctionId,
    args: Vec<ExprId>,
    ty: TypeId,
  ) {
    let stmt = self.call(callee, args, ty);
    self.body.push(stmt);
  }

  pub fn emit_return(&mut self) {
    let stmt = self.exprs.alloc(Expr::Call(Call {
      callee: Callee::Primitive(Primitive::Return),
      args: Vec::new(),
      ty: self.void_ty,
    }));
    self.body.push(stmt);
  }

  pub fn emit_return_value(
    &mut self,
    value: ExprId,
  ) {
    let stmt = self.exprs.alloc(Expr::Call(Call {
      callee: Callee::Primitive(Primitive::Return),
      args: vec![value],
      ty: self.void_ty,
    }));
    self.body.push(stmt);
  }

  pub fn emit_goto(
    &mut self,
    label: LabelId,
  ) {
    let stmt = self.exprs.alloc(Expr::Goto(label));
    self.body.push(stmt);
  }

  pub fn emit_branch(
    &mut self,
    condition: ExprId,
    then_label: LabelId,
    else_label: LabelId,
  ) {
    let stmt = self.exprs.alloc(Expr::Branch {
      condition,
      then_label,
      else_label,
    });
    self.body.push(stmt);
  }

  pub fn finish(self) -> Function {
    Function {
      name: self.name,
      params: self.params,
      locals: self.locals,
      labels: self.labels,
      exprs: self.exprs,
      body: Some(self.body),
      return_type: self.return_type,
      is_destructor: self.is_destructor,
      span: Span::default(),
    }
  }

  /// Finish as a bodiless prototype (skipped by the middle-end passes).
  pub fn finish_prototype(self) -> Function {
    Function {
      name: self.name,
      params: self.params,
      locals: self.locals,
      labels: self.labels,
      exprs: self.exprs,
      body: None,
      return_type: self.return_type,
      is_destructor: self.is_destructor,
      span: Span::default(),
    }
  }
}
