use std::collections::HashMap;

use crate::{Expr, ExprId, Function, LabelId};

/// A basic block: a maximal run of statements with a single entry and a
/// single exit. Blocks reference each other by dense index; successor and
/// predecessor edges never form pointer cycles.
#[derive(Debug, Clone)]
pub struct BasicBlock {
  /// Name of the label opening this block, if any.
  pub label: Option<String>,
  /// Statements in this block, in execution order (ids into the
  /// function's expression arena).
  pub stmts: Vec<ExprId>,
  pub preds: Vec<usize>,
  pub succs: Vec<usize>,
}

impl BasicBlock {
  fn new(label: Option<String>) -> Self {
    Self {
      label,
      stmts: Vec::new(),
      preds: Vec::new(),
      succs: Vec::new(),
    }
  }
}

/// Partition a function body into basic blocks and wire the edges.
///
/// Blocks are cut at `Label` statements and after jumps. A statement
/// following a jump without an intervening label opens a block with no
/// predecessors. Prototypes produce an empty list.
pub fn build_basic_blocks(func: &Function) -> Vec<BasicBlock> {
  let Some(body) = &func.body else {
    return Vec::new();
  };

  let mut blocks: Vec<BasicBlock> = Vec::new();
  let mut label_block: HashMap<LabelId, usize> = HashMap::new();
  let mut current: Option<usize> = None;

  for &stmt in body {
    match func.exprs.get(&stmt) {
      Expr::Label(label) => {
        let index = blocks.len();
        blocks.push(BasicBlock::new(Some(func.labels.get(label).name.clone())));
        label_block.insert(*label, index);
        blocks[index].stmts.push(stmt);
        current = Some(index);
      },
      expr => {
        let index = match current {
          Some(index) => index,
          None => {
            blocks.push(BasicBlock::new(None));
            blocks.len() - 1
          },
        };
        blocks[index].stmts.push(stmt);
        if expr.is_jump() {
          current = None;
        } else {
          current = Some(index);
        }
      },
    }
  }

  wire_edges(func, &mut blocks, &label_block);
  blocks
}

fn wire_edges(
  func: &Function,
  blocks: &mut [BasicBlock],
  label_block: &HashMap<LabelId, usize>,
) {
  let block_of = |label: &LabelId| -> usize {
    *label_block
      .get(label)
      .unwrap_or_else(|| panic!("jump to unplaced label '{}'", func.labels.get(label).name))
  };

  let mut edges: Vec<(usize, usize)> = Vec::new();
  for (index, block) in blocks.iter().enumerate() {
    let last = block.stmts.last().map(|stmt| func.exprs.get(stmt));

    match last {
      Some(Expr::Goto(label)) => {
        edges.push((index, block_of(label)));
      },
      Some(Expr::Branch {
        then_label,
        else_label,
        ..
      }) => {
        edges.push((index, block_of(then_label)));
        edges.push((index, block_of(else_label)));
      },
      Some(expr) if expr.is_jump() => {
        // A return: control leaves the function.
      },
      _ => {
        // Fall through to the next block, if there is one.
        if index + 1 < blocks.len() {
          edges.push((index, index + 1));
        }
      },
    }
  }

  for (from, to) in edges {
    blocks[from].succs.push(to);
    blocks[to].preds.push(from);
  }
}
