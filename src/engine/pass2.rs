//! Pass 2: chain linker.
//!
//! Every block file stays memory-mapped for the engine's whole lifetime
//! (see `locator`), so "seek to b.offset and read the first 36 bytes" is a
//! plain slice index into the existing mapping, not a fresh syscall — the
//! fatal "seek failure" I/O case cannot occur here;
//! offsets were already bounds-checked when Pass 1 allocated the record.

use crate::{
  engine::Engine,
  hash::Hash256,
  pool::BlockId,
};

pub fn run(engine: &mut Engine) {
  let total = engine.pool.len();
  for raw_id in 1..total {
    let id = BlockId(raw_id as u32);
    if engine.pool.get(id).height != -1 {
      continue; // resolved by an earlier climb
    }
    climb(engine, id);
  }

  log::info!(
    "pass2: max_height={} tip={:?}",
    engine.max_height,
    engine.pool.get(engine.tip).header_hash
  );
}

/// Walks upward from `start` until a record with known height is found,
/// then walks back down assigning heights and clearing the provisional
/// `next` links Pass 3 will recompute authoritatively.
fn climb(engine: &mut Engine, start: BlockId) {
  let mut path = Vec::new();
  let mut cur = start;

  loop {
    if engine.pool.get(cur).height != -1 {
      break; // cur is the anchor
    }

    if engine.pool.get(cur).prev.is_none() {
      match resolve_parent(engine, cur) {
        Some(parent_id) => engine.pool.get_mut(cur).prev = parent_id,
        None => {
          log::warn!(
            "pass2: orphan branch — block {:?} claims an unseen parent, leaving it and {} descendant(s) at height -1",
            engine.pool.get(cur).header_hash,
            path.len()
          );
          return; // abandon this branch; path stays at height -1
        }
      }
    }

    let parent = engine.pool.get(cur).prev;
    engine.pool.get_mut(parent).next = cur;
    path.push(cur);
    cur = parent;
  }

  let anchor = cur;
  let mut height = engine.pool.get(anchor).height;
  for &node in path.iter().rev() {
    height += 1;
    engine.pool.get_mut(node).height = height;
    if height > engine.max_height {
      engine.max_height = height;
      engine.tip = node;
    }
  }

  for &node in &path {
    engine.pool.get_mut(node).next = BlockId::NONE;
  }
}

/// Reads the first 36 bytes (version + prev-hash) of `id`'s header on
/// demand and looks the parent up in the block index.
fn resolve_parent(engine: &Engine, id: BlockId) -> Option<BlockId> {
  let record = engine.pool.get(id);
  let bytes = engine.locator.payload(record.file_id, record.offset, 36);
  let prev_hash = Hash256::from_slice(&bytes[4..36]);
  engine.index.find_block(&prev_hash)
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    crate::{hash::double_sha256, index_store::IndexStore, locator::BlockFileLocator, network::NetworkProfile, pool::BlockPool},
  };

  /// Writes a fake on-disk 36-byte header prefix (version + prev-hash) at
  /// `offset`, so `resolve_parent`'s mmap slice read has real bytes to find.
  fn write_header_prefix(buf: &mut Vec<u8>, offset: usize, prev_hash: Hash256) {
    if buf.len() < offset + 36 {
      buf.resize(offset + 36, 0);
    }
    buf[offset..offset + 4].copy_from_slice(&1u32.to_le_bytes());
    buf[offset + 4..offset + 36].copy_from_slice(prev_hash.as_bytes());
  }

  fn fixture() -> (Engine, BlockId, BlockId) {
    let tmp = tempfile::TempDir::new().unwrap();

    let genesis_hash = double_sha256(b"genesis");
    let child_hash = double_sha256(b"child");

    let mut file_bytes = vec![0u8; 300];
    write_header_prefix(&mut file_bytes, 100, genesis_hash);
    write_header_prefix(&mut file_bytes, 200, double_sha256(b"unseen-parent"));
    std::fs::write(tmp.path().join("blk0001.dat"), &file_bytes).unwrap();

    let locator = BlockFileLocator::discover(tmp.path()).unwrap();
    let mut pool = BlockPool::new();
    let mut index = IndexStore::new();
    index.insert_block(Hash256::NULL, pool.null_id);

    let file_id = pool.register_file(tmp.path().join("blocks/blk0001.dat"));

    let genesis = pool.allocate(genesis_hash, file_id, 0, 81);
    pool.get_mut(genesis).prev = pool.null_id;
    index.insert_block(genesis_hash, genesis);

    // child's parent link is unresolved at allocation time, simulating
    // out-of-order discovery: the parent hasn't been scanned yet when this
    let child = pool.allocate(child_hash, file_id, 100, 81);
    index.insert_block(child_hash, child);

    let engine = Engine {
      profile: NetworkProfile::bitcoin(),
      locator,
      pool,
      index,
      max_height: 0,
      tip: BlockId::NONE,
    };
    (engine, genesis, child)
  }

  #[test]
  fn linear_chain_gets_ascending_heights() {
    let (mut engine, genesis, child) = fixture();
    run(&mut engine);

    assert_eq!(engine.pool.get(genesis).height, 1);
    assert_eq!(engine.pool.get(child).height, 2);
    assert_eq!(engine.pool.get(child).prev, genesis);
    assert_eq!(engine.max_height, 2);
    assert_eq!(engine.tip, child);
  }

  #[test]
  fn orphan_branch_stays_at_height_minus_one() {
    let (mut engine, genesis, _child) = fixture();

    let orphan_hash = double_sha256(b"orphan");
    let orphan = engine.pool.allocate(orphan_hash, 0, 200, 81);
    // prev-hash bytes on disk at offset 200 point nowhere in the index.
    run(&mut engine);

    assert_eq!(engine.pool.get(orphan).height, -1);
    assert_eq!(engine.pool.get(genesis).height, 1);
  }
}
