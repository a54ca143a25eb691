use crate::callback::{Callback, Edge};

/// Tallies blocks, transactions, and edges and prints a one-line report in
/// `wrapup()`. Deliberately thin — real analysis callbacks are out of scope
/// but the registry needs at least one non-`help` entry that
/// integration tests can exercise end to end.
#[derive(Default)]
pub struct SummaryCallback {
  pub(crate) blocks: u64,
  pub(crate) transactions: u64,
  pub(crate) edges: u64,
  pub(crate) total_output_value: u128,
}

impl Callback for SummaryCallback {
  fn name(&self) -> &'static str {
    "summary"
  }

  fn start_block(&mut self, block: crate::callback::BlockInfo, _chain_size: u64) {
    let _ = block;
    self.blocks += 1;
  }

  fn start_tx(&mut self, _p: u64, _tx_hash: Option<crate::hash::Hash256>) {
    self.transactions += 1;
  }

  fn end_output(
    &mut self,
    _p: u64,
    value: u64,
    _tx_hash: Option<crate::hash::Hash256>,
    _output_index: u64,
    _script: &[u8],
  ) {
    self.total_output_value += value as u128;
  }

  fn edge(&mut self, edge: Edge) {
    let _ = edge;
    self.edges += 1;
  }

  fn wrapup(&mut self) {
    println!(
      "blocks={} transactions={} edges={} total_output_value={}",
      self.blocks, self.transactions, self.edges, self.total_output_value
    );
  }
}
