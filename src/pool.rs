//! Append-only block-record pool.
//!
//! Blocks are represented by stable indices into a single pool vector
//! and make `prev`/`next` integer indices." The pool never shrinks; every
//! access is `pool[i]`. This sidesteps the cyclic `prev`/`next` references
//! the original's raw pointers express directly.

use std::path::PathBuf;

/// Index into `BlockPool`. `NONE` plays the role of a null pointer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct BlockId(pub u32);

impl BlockId {
  pub const NONE: BlockId = BlockId(u32::MAX);

  pub fn is_none(self) -> bool {
    self == Self::NONE
  }
}

/// One discovered block.
#[derive(Debug)]
pub struct BlockRecord {
  pub header_hash: crate::hash::Hash256,
  pub file_id: u32,
  /// Byte offset of the payload (post-magic, post-size) within its file.
  pub offset: u64,
  pub payload_size: u32,
  /// -1 = unknown, >= 0 = confirmed distance from genesis.
  pub height: i64,
  pub prev: BlockId,
  pub next: BlockId,
}

impl BlockRecord {
  fn new(header_hash: crate::hash::Hash256, file_id: u32, offset: u64, payload_size: u32) -> Self {
    BlockRecord {
      header_hash,
      file_id,
      offset,
      payload_size,
      height: -1,
      prev: BlockId::NONE,
      next: BlockId::NONE,
    }
  }
}

/// Owns every `BlockRecord` for the run, plus the null sentinel.
pub struct BlockPool {
  records: Vec<BlockRecord>,
  pub null_id: BlockId,
  pub file_names: Vec<PathBuf>,
}

impl BlockPool {
  pub fn new() -> Self {
    let mut records = Vec::new();
    records.push(BlockRecord {
      header_hash: crate::hash::Hash256::NULL,
      file_id: u32::MAX,
      offset: 0,
      payload_size: 0,
      height: 0,
      prev: BlockId::NONE,
      next: BlockId::NONE,
    });
    BlockPool {
      records,
      null_id: BlockId(0),
      file_names: Vec::new(),
    }
  }

  pub fn with_capacity(expected_blocks: usize) -> Self {
    let mut pool = Self::new();
    pool.records.reserve(expected_blocks);
    pool
  }

  pub fn register_file(&mut self, name: PathBuf) -> u32 {
    self.file_names.push(name);
    (self.file_names.len() - 1) as u32
  }

  pub fn allocate(
    &mut self,
    header_hash: crate::hash::Hash256,
    file_id: u32,
    offset: u64,
    payload_size: u32,
  ) -> BlockId {
    let id = BlockId(self.records.len() as u32);
    self.records.push(BlockRecord::new(header_hash, file_id, offset, payload_size));
    id
  }

  pub fn get(&self, id: BlockId) -> &BlockRecord {
    &self.records[id.0 as usize]
  }

  pub fn get_mut(&mut self, id: BlockId) -> &mut BlockRecord {
    &mut self.records[id.0 as usize]
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.len() <= 1
  }

  pub fn file_path(&self, file_id: u32) -> &PathBuf {
    &self.file_names[file_id as usize]
  }
}

impl Default for BlockPool {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn null_sentinel_has_height_zero() {
    let pool = BlockPool::new();
    assert_eq!(pool.get(pool.null_id).height, 0);
    assert!(pool.get(pool.null_id).header_hash.is_null());
  }

  #[test]
  fn allocate_assigns_increasing_ids() {
    let mut pool = BlockPool::new();
    let file_id = pool.register_file(PathBuf::from("blk00000.dat"));
    let a = pool.allocate(crate::hash::double_sha256(b"a"), file_id, 8, 100);
    let b = pool.allocate(crate::hash::double_sha256(b"b"), file_id, 200, 50);
    assert_ne!(a, b);
    assert_eq!(pool.get(a).offset, 8);
    assert_eq!(pool.get(b).payload_size, 50);
  }
}
