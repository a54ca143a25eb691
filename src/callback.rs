//! The pluggable analysis callback. The core ships no real
//! analysis — only the dispatch boundary and a couple of illustrative
//! implementations in `callbacks/` used by tests.

use crate::hash::Hash256;

/// Minimal description of a block, enough for `start`/`startBlock` without
/// handing out a borrow of the whole pool.
#[derive(Clone, Copy, Debug)]
pub struct BlockInfo {
  pub height: i64,
  pub hash: Hash256,
}

/// One materialized spend: the join of an upstream output with a downstream
/// input across two transactions.
pub struct Edge<'a> {
  pub value: u64,
  pub up_tx_hash: Hash256,
  pub up_output_index: u64,
  pub up_output_script: &'a [u8],
  pub down_tx_hash: Hash256,
  pub down_input_index: u64,
  pub down_input_script: &'a [u8],
}

/// Dynamic-dispatch analysis callback, driven by the four-pass engine
/// All methods take the cursor position at which the event
/// fires, expressed as a byte offset within the current block's payload.
pub trait Callback {
  fn name(&self) -> &'static str;

  fn init(&mut self, argv: &[String]) -> Result<(), String> {
    let _ = argv;
    Ok(())
  }

  /// Whether this callback needs transaction hashes. When `false`, the
  /// traverser elides the skim phase entirely and no tx-index entries are
  /// written.
  fn need_tx_hash(&self) -> bool {
    true
  }

  fn start_lc(&mut self) {}

  fn wrapup(&mut self) {}

  fn start(&mut self, first_block: BlockInfo, tip: BlockInfo) {
    let _ = (first_block, tip);
  }

  fn start_map(&mut self, name: &str) {
    let _ = name;
  }

  fn end_map(&mut self, name: &str) {
    let _ = name;
  }

  fn start_block(&mut self, block: BlockInfo, chain_size: u64) {
    let _ = (block, chain_size);
  }

  fn end_block(&mut self, block: BlockInfo) {
    let _ = block;
  }

  fn start_tx(&mut self, p: u64, tx_hash: Option<Hash256>) {
    let _ = (p, tx_hash);
  }

  fn end_tx(&mut self, p: u64) {
    let _ = p;
  }

  fn start_inputs(&mut self, p: u64) {
    let _ = p;
  }

  fn end_inputs(&mut self, p: u64) {
    let _ = p;
  }

  fn start_input(&mut self, p: u64) {
    let _ = p;
  }

  fn end_input(&mut self, p: u64) {
    let _ = p;
  }

  fn start_outputs(&mut self, p: u64) {
    let _ = p;
  }

  fn end_outputs(&mut self, p: u64) {
    let _ = p;
  }

  fn start_output(&mut self, p: u64) {
    let _ = p;
  }

  fn end_output(
    &mut self,
    p: u64,
    value: u64,
    tx_hash: Option<Hash256>,
    output_index: u64,
    script: &[u8],
  ) {
    let _ = (p, value, tx_hash, output_index, script);
  }

  fn edge(&mut self, edge: Edge) {
    let _ = edge;
  }
}
