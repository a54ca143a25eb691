//! The two large hash-keyed maps: header-hash→block-record and
//! tx-hash→pointer to that tx's outputs region.
//!
//! Both are pre-sized from the total on-disk byte count before Pass 1/Pass 4
//! run. Degrading these ratios
//! would cause rehash storms mid-Pass-4 on a mature chain with hundreds of
//! millions of transaction outputs. `rustc_hash::FxHashMap` is used for both,
//! following `examples/other_examples/manifests/BTCDecoded-blvm-bench`'s use
//! of the same crate for its UTXO/outpoint index: keys here are already
//! uniformly-distributed 32-byte hashes, so a DoS-resistant hasher buys
//! nothing and costs throughput on a hot path walked once per transaction.

use {crate::hash::Hash256, crate::pool::BlockId, rustc_hash::FxHashMap};

/// Empirically observed bytes-per-block and bytes-per-transaction ratios on a
/// mature Bitcoin-family chain, used only to pre-size the maps. Preserved
/// empirically; degrading them defeats the point of pre-sizing.
const BYTES_PER_BLOCK_ESTIMATE: u64 = 140_000;
const BYTES_PER_TX_ESTIMATE: u64 = 350;
const SAFETY_FACTOR: f64 = 1.5;

/// Pointer to the byte offset at which a transaction's outputs region
/// begins, i.e. just past its input list.
/// Stored as `(file_id, absolute offset in that file)` rather than a raw
/// pointer into a mapped region, so the pointer stays valid independent of
/// any one `memmap2::Mmap`'s lifetime — the caller re-derives the slice from
/// the locator by file id when resolving an edge (a safe
/// re-implementation is slightly larger due to explicit error handling").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxOutputsPointer {
  pub file_id: u32,
  pub offset: u64,
}

pub struct IndexStore {
  pub block_index: FxHashMap<Hash256, BlockId>,
  pub tx_index: FxHashMap<Hash256, TxOutputsPointer>,
}

impl IndexStore {
  pub fn new() -> Self {
    IndexStore {
      block_index: FxHashMap::default(),
      tx_index: FxHashMap::default(),
    }
  }

  /// Pre-size both maps from the total byte count of the discovered block
  /// files, before Pass 1 starts writing to `block_index` and before Pass 4
  /// starts writing to `tx_index`.
  pub fn with_capacity_for_total_bytes(total_bytes: u64) -> Self {
    let expected_blocks =
      ((total_bytes as f64 / BYTES_PER_BLOCK_ESTIMATE as f64) * SAFETY_FACTOR) as usize;
    let expected_txs =
      ((total_bytes as f64 / BYTES_PER_TX_ESTIMATE as f64) * SAFETY_FACTOR) as usize;
    IndexStore {
      block_index: FxHashMap::with_capacity_and_hasher(expected_blocks, Default::default()),
      tx_index: FxHashMap::with_capacity_and_hasher(expected_txs, Default::default()),
    }
  }

  pub fn insert_block(&mut self, hash: Hash256, id: BlockId) {
    // Duplicate header hashes overwrite; acceptable for valid chain data
    // during header scanning.
    self.block_index.insert(hash, id);
  }

  pub fn find_block(&self, hash: &Hash256) -> Option<BlockId> {
    self.block_index.get(hash).copied()
  }

  pub fn insert_tx_outputs(&mut self, tx_hash: Hash256, pointer: TxOutputsPointer) {
    self.tx_index.insert(tx_hash, pointer);
  }

  pub fn find_tx_outputs(&self, tx_hash: &Hash256) -> Option<TxOutputsPointer> {
    self.tx_index.get(tx_hash).copied()
  }
}

impl Default for IndexStore {
  fn default() -> Self {
    Self::new()
  }
}
