use crate::BitVec;

/// IN/OUT sets produced by [`forward_flow`], one per basic block.
#[derive(Debug, Clone)]
pub struct FlowResult {
  pub ins: Vec<BitVec>,
  pub outs: Vec<BitVec>,
}

/// Iterative forward dataflow analysis with intersection confluence.
///
/// `IN[i]` is the intersection of `OUT[p]` over the predecessors of block
/// `i`; blocks with no predecessors (the entry block and anything
/// unreachable) get an empty IN. The transfer function is
/// `OUT[i] = (IN[i] - KILL[i]) | GEN[i]` - GEN dominates KILL so a value
/// killed and then regenerated within one block survives on exit.
///
/// Non-entry OUT sets start at top (all ones) and only shrink, so the sweep
/// reaches a fixed point even on cyclic graphs.
pub fn forward_flow(
  preds: &[Vec<usize>],
  gens: &[BitVec],
  kills: &[BitVec],
  width: usize,
) -> FlowResult {
  let nblocks = preds.len();
  assert_eq!(gens.len(), nblocks, "one GEN set per block");
  assert_eq!(kills.len(), nblocks, "one KILL set per block");

  let mut ins: Vec<BitVec> = (0..nblocks).map(|_| BitVec::new(width)).collect();
  let mut outs: Vec<BitVec> = (0..nblocks).map(|_| BitVec::ones(width)).collect();

  let mut changed = true;
  while changed {
    changed = false;

    for i in 0..nblocks {
      if !preds[i].is_empty() {
        let mut new_in = BitVec::ones(width);
        for &p in &preds[i] {
          new_in.intersect_with(&outs[p]);
        }
        if new_in != ins[i] {
          ins[i] = new_in;
        }
      }

      let mut new_out = ins[i].clone();
      new_out.subtract(&kills[i]);
      new_out.union_with(&gens[i]);
      if new_out != outs[i] {
        outs[i] = new_out;
        changed = true;
      }
    }
  }

  FlowResult { ins, outs }
}
