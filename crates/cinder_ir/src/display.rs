use std::fmt::Write;

use cinder_type::types::TypeStore;

use crate::{Call, Callee, Expr, ExprId, Function, FunctionId, IrProgram, LocalKind, Primitive};

/// Pretty printer for IR programs. Output is deterministic and stable, for
/// golden tests and `--dump`-style debugging.
pub struct IrPrinter<'a> {
  program: &'a IrProgram,
  types: &'a TypeStore,
  output: String,
}

impl<'a> IrPrinter<'a> {
  pub fn new(
    program: &'a IrProgram,
    types: &'a TypeStore,
  ) -> Self {
    Self {
      program,
      types,
      output: String::new(),
    }
  }

  pub fn print(mut self) -> String {
    for id in self.program.functions.ids() {
      self.print_function(self.program.functions.get(&id));
      self.output.push('\n');
    }
    self.output
  }

  fn print_function(
    &mut self,
    func: &Function,
  ) {
    let params: Vec<_> = func
      .params
      .iter()
      .map(|p| {
        format!(
          "{}: {}",
          func.local_name(p),
          self.types.format_type_name(&func.local_type(p))
        )
      })
      .collect();

    let ret = self.types.format_type_name(&func.return_type);
    let flags = if func.is_destructor { " [destructor]" } else { "" };

    let Some(body) = &func.body else {
      writeln!(self.output, "fn {}({}): {}{};", func.name, params.join(", "), ret, flags).unwrap();
      return;
    };

    writeln!(self.output, "fn {}({}): {}{} {{", func.name, params.join(", "), ret, flags).unwrap();

    if !func.locals.is_empty() {
      writeln!(self.output, "  locals:").unwrap();
      for (id, local) in func.locals.iter() {
        let marker = match local.kind {
          LocalKind::Param => " [param]",
          LocalKind::Local => "",
        };
        writeln!(
          self.output,
          "    %{}: {}{}",
          func.local_name(&id),
          self.types.format_type_name(&local.ty),
          marker
        )
        .unwrap();
      }
      writeln!(self.output).unwrap();
    }

    for &stmt in body {
      match func.exprs.get(&stmt) {
        Expr::Label(label) => {
          writeln!(self.output, "  {}:", func.labels.get(label).name).unwrap();
        },
        _ => {
          let rendered = self.render_expr(func, &stmt);
          writeln!(self.output, "    {}", rendered).unwrap();
        },
      }
    }

    writeln!(self.output, "}}").unwrap();
  }

  fn render_expr(
    &self,
    func: &Function,
    expr: &ExprId,
  ) -> String {
    match func.exprs.get(expr) {
      Expr::SymRef(local) => format!("%{}", func.local_name(local)),
      Expr::Call(call) => self.render_call(func, call),
      Expr::Label(label) => format!("{}:", func.labels.get(label).name),
      Expr::Goto(label) => format!("goto {}", func.labels.get(label).name),
      Expr::Branch {
        condition,
        then_label,
        else_label,
      } => {
        format!(
          "branch {}, {}, {}",
          self.render_expr(func, condition),
          func.labels.get(then_label).name,
          func.labels.get(else_label).name
        )
      },
    }
  }

  fn render_call(
    &self,
    func: &Function,
    call: &Call,
  ) -> String {
    let arg = |index: usize| self.render_expr(func, &call.args[index]);

    match call.callee {
      Callee::Primitive(Primitive::Move) => format!("move {}, {}", arg(0), arg(1)),
      Callee::Primitive(Primitive::Assign) => format!("assign {}, {}", arg(0), arg(1)),
      Callee::Primitive(Primitive::Return) => {
        if call.args.is_empty() {
          "return".to_string()
        } else {
          format!("return {}", arg(0))
        }
      },
      Callee::Primitive(Primitive::Init) => {
        format!("init {}", self.types.format_type_name(&call.ty))
      },
      Callee::Resolved(callee) => {
        let args: Vec<_> = (0..call.args.len()).map(arg).collect();
        format!(
          "call @{}({})",
          self.program.functions.get(&callee).name,
          args.join(", ")
        )
      },
    }
  }
}

/// Print a whole program.
pub fn print_ir(
  program: &IrProgram,
  types: &TypeStore,
) -> String {
  IrPrinter::new(program, types).print()
}

/// Print a single function.
pub fn format_function(
  program: &IrProgram,
  id: &FunctionId,
  types: &TypeStore,
) -> String {
  let mut printer = IrPrinter::new(program, types);
  printer.print_function(program.functions.get(id));
  printer.output
}
