#![allow(dead_code)]

use cinder_amm::insert_auto_copy_auto_destroy;
use cinder_config::CinderConfig;
use cinder_diagnostics::diagnostic_report::Diagnostic;
use cinder_ir::{
  Call, Callee, Expr, ExprId, Function, FunctionBuilder, FunctionId, IrProgram, LocalId, Primitive,
};
use cinder_type::types::{TypeId, TypeStore};

/// Shared test program: a record `R` with a class-typed field (so it owns
/// heap data), an extern record `E`, a destructor and a constructor for
/// `R`, and the destructor registry wired up.
pub struct Fixture {
  pub program: IrProgram,
  pub types: TypeStore,
  pub record: TypeId,
  pub extern_record: TypeId,
  pub class: TypeId,
  pub dtor: FunctionId,
  pub ctor: FunctionId,
}

pub fn fixture() -> Fixture {
  let mut types = TypeStore::new();
  let class = types.class("Payload", vec![], false);
  let record = types.record("R", vec![class], false);
  let extern_record = types.record("E", vec![], true);

  let mut program = IrProgram::new();

  let dtor = {
    let mut b = FunctionBuilder::new("R_destroy", types.void(), &types).destructor();
    b.param("this", record);
    program.functions.alloc(b.finish_prototype())
  };

  let ctor = {
    let b = FunctionBuilder::new("R_new", record, &types);
    program.functions.alloc(b.finish_prototype())
  };

  program.destructors.register(record, dtor);

  Fixture {
    program,
    types,
    record,
    extern_record,
    class,
    dtor,
    ctor,
  }
}

/// Run the pass with the default configuration (ownership warning off).
pub fn run(fx: &mut Fixture) -> Vec<Diagnostic> {
  insert_auto_copy_auto_destroy(&mut fx.program, &fx.types, &CinderConfig::default())
}

/// Run the pass with the ownership warning enabled.
pub fn run_with_warn(fx: &mut Fixture) -> Vec<Diagnostic> {
  let config = CinderConfig::default().with_warn_ownership();
  insert_auto_copy_auto_destroy(&mut fx.program, &fx.types, &config)
}

/// The symbols passed to `destructor` calls in body order.
pub fn destructor_calls(
  func: &Function,
  destructor: FunctionId,
) -> Vec<LocalId> {
  let body = func.body.as_ref().expect("function has a body");
  body
    .iter()
    .filter_map(|stmt| match func.exprs.get(stmt) {
      Expr::Call(Call {
        callee: Callee::Resolved(callee),
        args,
        ..
      }) if *callee == destructor => func.exprs.get(&args[0]).as_sym_ref(),
      _ => None,
    })
    .collect()
}

pub fn body_len(func: &Function) -> usize {
  func.body.as_ref().expect("function has a body").len()
}

/// True if the statement at `index` is a call to `destructor`.
pub fn is_destructor_call_at(
  func: &Function,
  index: usize,
  destructor: FunctionId,
) -> bool {
  let body = func.body.as_ref().expect("function has a body");
  matches!(
    func.exprs.get(&body[index]),
    Expr::Call(Call {
      callee: Callee::Resolved(callee),
      ..
    }) if *callee == destructor
  )
}

/// Position of a label statement in the body, by label name.
pub fn label_position(
  func: &Function,
  name: &str,
) -> usize {
  let body = func.body.as_ref().expect("function has a body");
  body
    .iter()
    .position(|stmt| match func.exprs.get(stmt) {
      Expr::Label(label) => func.labels.get(label).name == name,
      _ => false,
    })
    .unwrap_or_else(|| panic!("no label '{}' in body", name))
}

/// Jumps end basic blocks: inside the body, a jump may only be followed by
/// a label (which opens the next block) or the end of the body.
pub fn assert_no_stmt_after_jump(func: &Function) {
  let body = func.body.as_ref().expect("function has a body");
  for window in body.windows(2) {
    if func.exprs.get(&window[0]).is_jump() {
      assert!(
        matches!(func.exprs.get(&window[1]), Expr::Label(_)),
        "statement follows a jump inside a block in '{}'",
        func.name
      );
    }
  }
}

/// Statement ids of a function body (for structural comparisons).
pub fn body_stmts(func: &Function) -> Vec<ExprId> {
  func.body.as_ref().expect("function has a body").clone()
}

/// True if the statement at `index` is a `return` primitive.
pub fn is_return_at(
  func: &Function,
  index: usize,
) -> bool {
  let body = func.body.as_ref().expect("function has a body");
  matches!(
    func.exprs.get(&body[index]),
    Expr::Call(call) if call.is_primitive(Primitive::Return)
  )
}
