pub mod bitvec;
pub mod forward;

pub use bitvec::BitVec;
pub use forward::{FlowResult, forward_flow};
