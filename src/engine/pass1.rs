//! Pass 1: block-header scanner.

use crate::{byte_reader::Reader, engine::Engine, error::Result, hash::Hash256};

pub fn run(engine: &mut Engine) -> Result<()> {
  let file_count = engine.locator.files.len();
  for file_index in 0..file_count {
    let file_id = engine.pool.register_file(engine.locator.files[file_index].name.clone());
    debug_assert_eq!(file_id as usize, file_index);
    scan_file(engine, file_id);
  }
  Ok(())
}

fn scan_file(engine: &mut Engine, file_id: u32) {
  let bytes = engine.locator.file_bytes(file_id);
  let mut reader = Reader::new(bytes);
  let mut blocks_in_file = 0u64;

  loop {
    let record_start = reader.pos();
    let magic = match reader.load_u32() {
      Ok(m) => m,
      Err(_) => break, // end of file — a tolerable boundary, not an error
    };
    if magic != engine.profile.magic {
      // Trailing zero padding, or simply no more records.
      log::debug!(
        "{}: stopped scanning at offset {record_start} (magic mismatch, {blocks_in_file} blocks found)",
        engine.locator.files[file_id as usize].name.display()
      );
      break;
    }

    let size = match reader.load_u32() {
      Ok(s) => s,
      Err(_) => break,
    };

    let payload_offset = reader.pos() as u64;
    let header_len = engine.profile.header_hash_input_len();
    if (size as usize) < header_len.max(36) || reader.remaining() < size as usize {
      log::debug!(
        "{}: stopped scanning at offset {record_start} (truncated record)",
        engine.locator.files[file_id as usize].name.display()
      );
      break;
    }

    let payload = reader
      .load_slice(size as usize)
      .expect("bounds already checked above");

    let header_hash = engine.profile.header_hash_fn.hash(&payload[..header_len]);
    let prev_hash = Hash256::from_slice(&payload[4..36]);

    let id = engine.pool.allocate(header_hash, file_id, payload_offset, size);
    if let Some(prev_id) = engine.index.find_block(&prev_hash) {
      engine.pool.get_mut(id).prev = prev_id;
    }
    engine.index.insert_block(header_hash, id);

    blocks_in_file += 1;
  }

  log::info!(
    "pass1: {} — {blocks_in_file} blocks",
    engine.locator.files[file_id as usize].name.display()
  );
}
