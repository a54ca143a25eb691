//! Pass 3: forward wirer.
//!
//! Starting at the tip found by Pass 2, walk `prev` and set `prev.next =
//! current` at every step, halting once `prev` is the null sentinel.

use crate::{engine::Engine, pool::BlockId};

pub fn run(engine: &mut Engine) {
  if engine.tip.is_none() {
    return; // no blocks discovered a main chain (e.g. every branch was an orphan)
  }

  let mut cur = engine.tip;
  loop {
    let prev = engine.pool.get(cur).prev;
    engine.pool.get_mut(prev).next = cur;
    if prev == engine.pool.null_id {
      break;
    }
    cur = prev;
  }
}

/// Forward-walks from the null sentinel, for tests and for Pass 4's driver.
pub fn iter_main_chain(engine: &Engine) -> Vec<BlockId> {
  let mut out = Vec::new();
  let mut cur = engine.pool.get(engine.pool.null_id).next;
  while !cur.is_none() {
    out.push(cur);
    cur = engine.pool.get(cur).next;
  }
  out
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    crate::{engine::pass2, hash::{double_sha256, Hash256}, index_store::IndexStore, locator::BlockFileLocator, network::NetworkProfile, pool::BlockPool},
  };

  fn linear_engine(n: usize) -> Engine {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(tmp.path().join("blk0001.dat"), [0u8; 8]).unwrap();
    let locator = BlockFileLocator::discover(tmp.path()).unwrap();

    let mut pool = BlockPool::new();
    let mut index = IndexStore::new();
    index.insert_block(Hash256::NULL, pool.null_id);
    let file_id = pool.register_file(tmp.path().join("blk0001.dat"));

    let mut prev = pool.null_id;
    for i in 0..n {
      let hash = double_sha256(format!("block-{i}").as_bytes());
      let id = pool.allocate(hash, file_id, i as u64, 1);
      pool.get_mut(id).prev = prev;
      index.insert_block(hash, id);
      prev = id;
    }

    let mut engine = Engine {
      profile: NetworkProfile::bitcoin(),
      locator,
      pool,
      index,
      max_height: 0,
      tip: BlockId::NONE,
    };
    pass2::run(&mut engine);
    engine
  }

  #[test]
  fn forward_walk_visits_max_height_plus_one_records() {
    let mut engine = linear_engine(5);
    run(&mut engine);
    let chain = iter_main_chain(&engine);
    assert_eq!(chain.len() as i64, engine.max_height + 1);
    assert_eq!(*chain.last().unwrap(), engine.tip);
  }

  #[test]
  fn empty_chain_produces_empty_walk() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(tmp.path().join("blk0001.dat"), [0u8; 1]).unwrap();
    let locator = BlockFileLocator::discover(tmp.path()).unwrap();
    let mut engine = Engine {
      profile: NetworkProfile::bitcoin(),
      locator,
      pool: BlockPool::new(),
      index: IndexStore::new(),
      max_height: 0,
      tip: BlockId::NONE,
    };
    run(&mut engine);
    assert!(iter_main_chain(&engine).is_empty());
  }
}
