//! Fatal error surface. Only the "Fatal I/O", "Fatal invariant",
//! and "User" rows of the error table construct a value here — the
//! "Recoverable structural" and "Tolerable boundary" rows are handled inline
//! with `log::warn!`/`log::debug!` and never reach this type.
//!
//! Grounded on `dog`'s `SnafuError` usage (`src/chain.rs`, `src/outgoing.rs`):
//! a typed internal error enum via `snafu`, converted to `anyhow::Error` only
//! at the process boundary in `main.rs`.

use snafu::prelude::*;

#[derive(Debug, Snafu)]
pub enum Error {
  #[snafu(display("block file discovery failed: {source}"))]
  Locator { source: crate::locator::LocatorError },

  #[snafu(display("upstream transaction {tx_hash} not found in tx index (input {input_index} of block file {file_id} offset {offset})"))]
  UpstreamTxMissing {
    tx_hash: crate::hash::Hash256,
    input_index: u64,
    file_id: u32,
    offset: u64,
  },

  #[snafu(display("truncated block body in file {file_id} at offset {offset}: {source}"))]
  TruncatedBlockBody {
    file_id: u32,
    offset: u64,
    source: crate::byte_reader::ReadError,
  },

  #[snafu(display("no blocks discovered under {data_dir}"))]
  NoBlocksDiscovered { data_dir: String },

  #[snafu(display("unknown callback {name:?}; run with `help` to list registered callbacks"))]
  UnknownCallback { name: String },

  #[snafu(display("unknown network profile {name:?}"))]
  UnknownNetwork { name: String },

  #[snafu(display("callback initialization failed: {message}"))]
  CallbackInit { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
