//! The four-pass pipeline driver.
//!
//! The tx index, block index, callback pointer, and null/tip records are
//! packaged as a single `Engine` value created in `main` and threaded
//! explicitly through each pass's driver function, rather than kept as
//! process-wide globals.

mod pass1;
mod pass2;
mod pass3;
mod pass4;

use {
  crate::{
    callback::Callback,
    error::{self, Result},
    index_store::IndexStore,
    locator::BlockFileLocator,
    network::NetworkProfile,
    pool::{BlockId, BlockPool},
  },
  snafu::prelude::*,
};

pub struct Engine {
  pub profile: NetworkProfile,
  pub locator: BlockFileLocator,
  pub pool: BlockPool,
  pub index: IndexStore,
  pub max_height: i64,
  pub tip: BlockId,
}

impl Engine {
  pub fn open(profile: NetworkProfile, data_dir: &std::path::Path) -> Result<Self> {
    let locator = BlockFileLocator::discover(data_dir).context(error::LocatorSnafu)?;
    let mut index = IndexStore::with_capacity_for_total_bytes(locator.total_bytes());
    let pool = BlockPool::with_capacity(estimate_block_count(locator.total_bytes()));
    // Genesis's on-disk prev-hash is all zero; register the sentinel so Pass
    // 2 resolves it as a normal parent lookup instead of an orphan.
    index.insert_block(crate::hash::Hash256::NULL, pool.null_id);
    Ok(Engine {
      profile,
      locator,
      pool,
      index,
      max_height: 0,
      tip: BlockId::NONE,
    })
  }

  /// Runs all four passes in order and delivers every lifecycle event to
  /// `callback`. Control flow is strictly staged: each pass completes in full before the next starts.
  pub fn run(&mut self, callback: &mut dyn Callback, height_limit: Option<u32>) -> Result<()> {
    pass1::run(self)?;
    pass2::run(self);
    pass3::run(self);
    pass4::run(self, callback, height_limit)?;
    Ok(())
  }
}

fn estimate_block_count(total_bytes: u64) -> usize {
  const BYTES_PER_BLOCK_ESTIMATE: u64 = 140_000;
  ((total_bytes as f64 / BYTES_PER_BLOCK_ESTIMATE as f64) * 1.5) as usize
}
