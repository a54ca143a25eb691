//! Pass 4: chain traverser — the two-phase transaction parser.
//!
//! Grounded on `parser.cpp`'s `parseTX<skip>` / `parseInputs<skip>` /
//! `parseOutputs<skip, fullContext>` template family. Rust has no free
//! non-type-generic dispatch on a bool without four monomorphized copies, so
//! `skip`/`full_context` are plain runtime arguments here — correctness, not
//! micro-specialization, is what matters for a batch tool run once per file.

use {
  crate::{
    byte_reader::Reader,
    callback::{BlockInfo, Callback, Edge},
    engine::{pass3, Engine},
    error::{self, Result},
    hash::{double_sha256, Hash256},
    index_store::{IndexStore, TxOutputsPointer},
    locator::BlockFileLocator,
    network::NetworkProfile,
    pool::BlockId,
  },
  snafu::prelude::*,
};

/// What a spending input carries into the full-context outputs re-parse so
/// the exact output it references can be joined into one `edge` event.
struct DownContext<'a> {
  down_tx_hash: Hash256,
  down_input_index: u64,
  down_input_script: &'a [u8],
}

pub fn run(engine: &mut Engine, callback: &mut dyn Callback, height_limit: Option<u32>) -> Result<()> {
  let chain = pass3::iter_main_chain(engine);
  callback.start_lc();

  if chain.is_empty() {
    callback.wrapup();
    return Ok(());
  }

  let chain_size = (engine.max_height + 1) as u64;
  callback.start(block_info(engine, chain[0]), block_info(engine, *chain.last().unwrap()));

  let need_tx_hash = callback.need_tx_hash();
  let progress = crate::progress::ProgressReporter::new(chain_size);
  let mut current_file: Option<u32> = None;
  let mut processed: u64 = 0;

  for id in chain {
    if let Some(limit) = height_limit {
      if processed >= limit as u64 {
        break;
      }
    }

    let (file_id, offset, payload_size, height, header_hash) = {
      let record = engine.pool.get(id);
      (record.file_id, record.offset, record.payload_size, record.height, record.header_hash)
    };

    if current_file != Some(file_id) {
      if let Some(prev_file) = current_file {
        callback.end_map(&file_label(engine, prev_file));
      }
      callback.start_map(&file_label(engine, file_id));
      current_file = Some(file_id);
    }

    let info = BlockInfo { height, hash: header_hash };
    callback.start_block(info, chain_size);

    let payload = engine.locator.payload(file_id, offset, payload_size);
    let mut reader = Reader::new(payload);
    skip_header(&mut reader, &engine.profile).context(error::TruncatedBlockBodySnafu { file_id, offset })?;

    let nb_tx = reader.load_varint().context(error::TruncatedBlockBodySnafu { file_id, offset })?;
    for _ in 0..nb_tx {
      parse_tx(&mut reader, false, need_tx_hash, file_id, offset, &engine.locator, &mut engine.index, callback)?;
    }

    callback.end_block(info);
    progress.tick(payload_size as u64);
    processed += 1;
  }

  if let Some(file_id) = current_file {
    callback.end_map(&file_label(engine, file_id));
  }

  progress.finish();
  callback.wrapup();
  Ok(())
}

fn block_info(engine: &Engine, id: BlockId) -> BlockInfo {
  let record = engine.pool.get(id);
  BlockInfo {
    height: record.height,
    hash: record.header_hash,
  }
}

fn file_label(engine: &Engine, file_id: u32) -> String {
  engine.pool.file_path(file_id).display().to_string()
}

fn skip_header(reader: &mut Reader, profile: &NetworkProfile) -> crate::byte_reader::Result<()> {
  reader.skip_u32()?; // version
  reader.skip_hash256()?; // prev
  reader.skip_hash256()?; // merkle root
  reader.skip_u32()?; // time
  reader.skip_u32()?; // bits
  reader.skip_u32()?; // nonce
  reader.skip_bytes(profile.extra_header_bytes)?;
  Ok(())
}

/// Parses one transaction. On the emit pass (`skip == false`), if the active
/// callback needs transaction hashes, runs a throwaway `skip = true` pass
/// first to find this transaction's exact byte range, hashes that range, and
/// only then re-parses it for real with the resulting `tx_hash` in hand —
/// every `start_tx`/`edge` event for this transaction carries a hash computed
/// before any event fires.
#[allow(clippy::too_many_arguments)]
fn parse_tx(
  reader: &mut Reader<'_>,
  skip: bool,
  need_tx_hash: bool,
  file_id: u32,
  block_offset: u64,
  locator: &BlockFileLocator,
  index: &mut IndexStore,
  callback: &mut dyn Callback,
) -> Result<()> {
  let tx_start = reader.pos();

  let tx_hash = if need_tx_hash && !skip {
    let region = reader.region();
    let mut skim = Reader::at(region, tx_start);
    parse_tx_body(&mut skim, true, None, file_id, block_offset, locator, index, callback)?;
    let tx_end = skim.pos();
    Some(double_sha256(&region[tx_start..tx_end]))
  } else {
    None
  };

  parse_tx_body(reader, skip, tx_hash, file_id, block_offset, locator, index, callback)
}

#[allow(clippy::too_many_arguments)]
fn parse_tx_body(
  reader: &mut Reader<'_>,
  skip: bool,
  tx_hash: Option<Hash256>,
  file_id: u32,
  block_offset: u64,
  locator: &BlockFileLocator,
  index: &mut IndexStore,
  callback: &mut dyn Callback,
) -> Result<()> {
  let offset_of = |r: &Reader<'_>| block_offset + r.pos() as u64;

  if !skip {
    callback.start_tx(offset_of(reader), tx_hash);
  }

  reader.skip_u32().context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?; // version

  parse_inputs(reader, tx_hash, skip, file_id, block_offset, locator, index, callback)?;

  if let (Some(hash), false) = (tx_hash, skip) {
    index.insert_tx_outputs(hash, TxOutputsPointer { file_id, offset: offset_of(reader) });
  }

  parse_outputs(reader, tx_hash, None, None, skip, false, callback, file_id, block_offset)?;

  reader.skip_u32().context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?; // locktime

  if !skip {
    callback.end_tx(offset_of(reader));
  }
  Ok(())
}

#[allow(clippy::too_many_arguments)]
fn parse_inputs(
  reader: &mut Reader<'_>,
  tx_hash: Option<Hash256>,
  skip: bool,
  file_id: u32,
  block_offset: u64,
  locator: &BlockFileLocator,
  index: &mut IndexStore,
  callback: &mut dyn Callback,
) -> Result<()> {
  if !skip {
    callback.start_inputs(block_offset + reader.pos() as u64);
  }

  let nb_inputs = reader
    .load_varint()
    .context(error::TruncatedBlockBodySnafu { file_id, offset: block_offset + reader.pos() as u64 })?;

  for input_index in 0..nb_inputs {
    parse_input(reader, tx_hash, input_index, skip, file_id, block_offset, locator, index, callback)?;
  }

  if !skip {
    callback.end_inputs(block_offset + reader.pos() as u64);
  }
  Ok(())
}

#[allow(clippy::too_many_arguments)]
fn parse_input(
  reader: &mut Reader<'_>,
  tx_hash: Option<Hash256>,
  input_index: u64,
  skip: bool,
  file_id: u32,
  block_offset: u64,
  locator: &BlockFileLocator,
  index: &mut IndexStore,
  callback: &mut dyn Callback,
) -> Result<()> {
  let offset_of = |r: &Reader<'_>| block_offset + r.pos() as u64;

  if !skip {
    callback.start_input(offset_of(reader));
  }

  let up_tx_hash = reader
    .load_hash256()
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?;

  let upstream = if tx_hash.is_some() && !up_tx_hash.is_null() {
    match index.find_tx_outputs(&up_tx_hash) {
      Some(ptr) => Some(ptr),
      None => {
        return error::UpstreamTxMissingSnafu {
          tx_hash: up_tx_hash,
          input_index,
          file_id,
          offset: offset_of(reader),
        }
        .fail();
      }
    }
  } else {
    None
  };

  let up_output_index = reader
    .load_u32()
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })? as u64;
  let script_size = reader
    .load_varint()
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?;
  let input_script = reader
    .load_slice(script_size as usize)
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?;

  if let (Some(ptr), Some(tx_hash)) = (upstream, tx_hash) {
    let down_ctx = DownContext {
      down_tx_hash: tx_hash,
      down_input_index: input_index,
      down_input_script: input_script,
    };
    let upstream_bytes = locator.file_bytes(ptr.file_id);
    let mut upstream_reader = Reader::at(upstream_bytes, ptr.offset as usize);
    parse_outputs(
      &mut upstream_reader,
      Some(up_tx_hash),
      Some(up_output_index),
      Some(&down_ctx),
      false,
      true,
      callback,
      ptr.file_id,
      0,
    )?;
  }

  reader.skip_u32().context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?; // sequence

  if !skip {
    callback.end_input(offset_of(reader));
  }
  Ok(())
}

/// `full_context` parses are re-entrant calls made from `parse_input` into an
/// upstream transaction's outputs region solely to recover one output's value
/// and script; `stop_at_index` lets the walk stop the instant that output is
/// found instead of decoding the rest of the upstream transaction's outputs.
#[allow(clippy::too_many_arguments)]
fn parse_outputs(
  reader: &mut Reader<'_>,
  tx_hash: Option<Hash256>,
  stop_at_index: Option<u64>,
  down_ctx: Option<&DownContext<'_>>,
  skip: bool,
  full_context: bool,
  callback: &mut dyn Callback,
  file_id: u32,
  block_offset: u64,
) -> Result<()> {
  let offset_of = |r: &Reader<'_>| block_offset + r.pos() as u64;

  if !skip && !full_context {
    callback.start_outputs(offset_of(reader));
  }

  let nb_outputs = reader
    .load_varint()
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?;

  for output_index in 0..nb_outputs {
    let is_target = full_context && stop_at_index == Some(output_index);
    parse_output(reader, tx_hash, output_index, down_ctx, is_target, skip, full_context, callback, file_id, block_offset)?;
    if is_target {
      break;
    }
  }

  if !skip && !full_context {
    callback.end_outputs(offset_of(reader));
  }
  Ok(())
}

#[allow(clippy::too_many_arguments)]
fn parse_output(
  reader: &mut Reader<'_>,
  tx_hash: Option<Hash256>,
  output_index: u64,
  down_ctx: Option<&DownContext<'_>>,
  is_target: bool,
  skip: bool,
  full_context: bool,
  callback: &mut dyn Callback,
  file_id: u32,
  block_offset: u64,
) -> Result<()> {
  let offset_of = |r: &Reader<'_>| block_offset + r.pos() as u64;

  if !skip && !full_context {
    callback.start_output(offset_of(reader));
  }

  let value = reader
    .load_u64()
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?;
  let script_size = reader
    .load_varint()
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?;
  let script = reader
    .load_slice(script_size as usize)
    .context(error::TruncatedBlockBodySnafu { file_id, offset: offset_of(reader) })?;

  if !skip && !full_context {
    callback.end_output(offset_of(reader), value, tx_hash, output_index, script);
  }

  if is_target {
    if let Some(ctx) = down_ctx {
      callback.edge(Edge {
        value,
        up_tx_hash: tx_hash.unwrap_or(Hash256::NULL),
        up_output_index: output_index,
        up_output_script: script,
        down_tx_hash: ctx.down_tx_hash,
        down_input_index: ctx.down_input_index,
        down_input_script: ctx.down_input_script,
      });
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    crate::{
      byte_reader::encode_varint, callbacks::summary::SummaryCallback, engine::{pass1, pass2, pass3},
      network::NetworkProfile,
    },
  };

  fn push_varint(buf: &mut Vec<u8>, v: u64) {
    encode_varint(v, buf);
  }

  /// One coinbase-only block: version, prev=NULL, merkle, time, bits, nonce,
  /// nb_tx=1, one transaction with a single null-prevout input and a single
  /// output.
  fn coinbase_block(output_value: u64, output_script: &[u8]) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend_from_slice(&1u32.to_le_bytes()); // version
    b.extend_from_slice(&[0u8; 32]); // prev
    b.extend_from_slice(&[0u8; 32]); // merkle
    b.extend_from_slice(&0u32.to_le_bytes()); // time
    b.extend_from_slice(&0u32.to_le_bytes()); // bits
    b.extend_from_slice(&0u32.to_le_bytes()); // nonce
    push_varint(&mut b, 1); // nb_tx

    b.extend_from_slice(&1u32.to_le_bytes()); // tx version
    push_varint(&mut b, 1); // nb_inputs
    b.extend_from_slice(&[0u8; 32]); // coinbase prevout hash = null
    b.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // prevout index
    push_varint(&mut b, 4);
    b.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]); // coinbase script
    b.extend_from_slice(&0xffff_ffffu32.to_le_bytes()); // sequence
    push_varint(&mut b, 1); // nb_outputs
    b.extend_from_slice(&output_value.to_le_bytes());
    push_varint(&mut b, output_script.len() as u64);
    b.extend_from_slice(output_script);
    b.extend_from_slice(&0u32.to_le_bytes()); // locktime
    b
  }

  fn write_block_record(buf: &mut Vec<u8>, magic: u32, payload: &[u8]) {
    buf.extend_from_slice(&magic.to_le_bytes());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
  }

  fn engine_from_payloads(payloads: &[Vec<u8>]) -> Engine {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("blocks")).unwrap();
    let profile = NetworkProfile::bitcoin();

    let mut file_bytes = Vec::new();
    for payload in payloads {
      write_block_record(&mut file_bytes, profile.magic, payload);
    }
    std::fs::write(tmp.path().join("blocks/blk00000.dat"), &file_bytes).unwrap();

    let mut engine = Engine::open(profile, tmp.path()).unwrap();
    pass1::run(&mut engine).unwrap();
    pass2::run(&mut engine);
    pass3::run(&mut engine);
    engine
  }

  #[test]
  fn single_coinbase_block_tallies_one_tx_and_no_edges() {
    let mut engine = engine_from_payloads(&[coinbase_block(5_000_000_000, b"\xac")]);
    let mut callback = SummaryCallback::default();
    run(&mut engine, &mut callback, None).unwrap();

    assert_eq!(callback.blocks, 1);
    assert_eq!(callback.transactions, 1);
    assert_eq!(callback.edges, 0);
    assert_eq!(callback.total_output_value, 5_000_000_000);
  }

  #[test]
  fn spend_in_second_block_produces_one_edge() {
    let coinbase_script = b"\xac";
    let genesis_payload = coinbase_block(1_000, coinbase_script);
    let genesis_header_hash = double_sha256(&genesis_payload[..NetworkProfile::HEADER_LEN]);
    let upstream_tx_hash = {
      // Recompute the first block's lone tx hash the same way the engine
      // will, so the spending block's input can reference it.
      let mut reader = Reader::new(&genesis_payload);
      skip_header(&mut reader, &NetworkProfile::bitcoin()).unwrap();
      reader.load_varint().unwrap(); // nb_tx
      let tx_start = reader.pos();
      reader.skip_u32().unwrap();
      let nb_inputs = reader.load_varint().unwrap();
      for _ in 0..nb_inputs {
        reader.skip_hash256().unwrap();
        reader.skip_u32().unwrap();
        let sz = reader.load_varint().unwrap();
        reader.skip_bytes(sz as usize).unwrap();
        reader.skip_u32().unwrap();
      }
      let nb_outputs = reader.load_varint().unwrap();
      for _ in 0..nb_outputs {
        reader.skip_u64().unwrap();
        let sz = reader.load_varint().unwrap();
        reader.skip_bytes(sz as usize).unwrap();
      }
      let tx_end = reader.pos();
      double_sha256(&genesis_payload[tx_start..tx_end])
    };

    let mut spend = Vec::new();
    spend.extend_from_slice(&1u32.to_le_bytes());
    spend.extend_from_slice(genesis_header_hash.as_bytes()); // prev = genesis
    spend.extend_from_slice(&[0u8; 32]);
    spend.extend_from_slice(&0u32.to_le_bytes());
    spend.extend_from_slice(&0u32.to_le_bytes());
    spend.extend_from_slice(&1u32.to_le_bytes()); // nonce, distinct from genesis's header
    push_varint(&mut spend, 1); // nb_tx

    spend.extend_from_slice(&1u32.to_le_bytes()); // tx version
    push_varint(&mut spend, 1); // nb_inputs
    spend.extend_from_slice(upstream_tx_hash.as_bytes());
    spend.extend_from_slice(&0u32.to_le_bytes()); // spends output 0
    push_varint(&mut spend, 0);
    spend.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
    push_varint(&mut spend, 1); // nb_outputs
    spend.extend_from_slice(&900u64.to_le_bytes());
    push_varint(&mut spend, 1);
    spend.extend_from_slice(b"\xac");
    spend.extend_from_slice(&0u32.to_le_bytes()); // locktime

    let mut engine = engine_from_payloads(&[genesis_payload, spend]);
    let mut callback = SummaryCallback::default();
    run(&mut engine, &mut callback, None).unwrap();

    assert_eq!(callback.blocks, 2);
    assert_eq!(callback.transactions, 2);
    assert_eq!(callback.edges, 1);
  }
}
