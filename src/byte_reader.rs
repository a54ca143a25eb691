//! Little-endian fixed-width and Bitcoin-varint decoding over a moving cursor.
//!
//! Every primitive comes in a `load_*` (returns the value) and `skip_*`
//! (discards it) flavor, mirroring `parser.cpp`'s `LOAD`/`SKIP` macro pair —
//! the skim phase of the transaction parser (§4.6) never needs the decoded
//! value, only the cursor advance, so it uses `skip_*` throughout and
//! allocates nothing.

use {
  byteorder::{ByteOrder, LittleEndian},
  snafu::prelude::*,
};

#[derive(Debug, Snafu)]
pub enum ReadError {
  #[snafu(display("truncated read: wanted {wanted} bytes at offset {offset}, region is {region_len} bytes"))]
  Truncated {
    wanted: usize,
    offset: usize,
    region_len: usize,
  },
}

pub type Result<T> = std::result::Result<T, ReadError>;

/// A bounds-checked cursor into a borrowed byte region.
pub struct Reader<'a> {
  data: &'a [u8],
  pos: usize,
}

impl<'a> Reader<'a> {
  pub fn new(data: &'a [u8]) -> Self {
    Reader { data, pos: 0 }
  }

  pub fn at(data: &'a [u8], pos: usize) -> Self {
    Reader { data, pos }
  }

  pub fn pos(&self) -> usize {
    self.pos
  }

  pub fn set_pos(&mut self, pos: usize) {
    self.pos = pos;
  }

  pub fn remaining(&self) -> usize {
    self.data.len().saturating_sub(self.pos)
  }

  pub fn is_empty(&self) -> bool {
    self.pos >= self.data.len()
  }

  fn require(&self, len: usize) -> Result<()> {
    let past_end = match self.pos.checked_add(len) {
      Some(end) => end > self.data.len(),
      None => true,
    };
    if past_end {
      return Truncated {
        wanted: len,
        offset: self.pos,
        region_len: self.data.len(),
      }
      .fail();
    }
    Ok(())
  }

  pub fn load_u32(&mut self) -> Result<u32> {
    self.require(4)?;
    let v = LittleEndian::read_u32(&self.data[self.pos..self.pos + 4]);
    self.pos += 4;
    Ok(v)
  }

  pub fn skip_u32(&mut self) -> Result<()> {
    self.require(4)?;
    self.pos += 4;
    Ok(())
  }

  pub fn load_u64(&mut self) -> Result<u64> {
    self.require(8)?;
    let v = LittleEndian::read_u64(&self.data[self.pos..self.pos + 8]);
    self.pos += 8;
    Ok(v)
  }

  pub fn skip_u64(&mut self) -> Result<()> {
    self.require(8)?;
    self.pos += 8;
    Ok(())
  }

  /// Bitcoin's compact varint — not the protobuf varint.
  pub fn load_varint(&mut self) -> Result<u64> {
    self.require(1)?;
    let first = self.data[self.pos];
    self.pos += 1;
    match first {
      0..=0xfc => Ok(first as u64),
      0xfd => {
        self.require(2)?;
        let v = LittleEndian::read_u16(&self.data[self.pos..self.pos + 2]) as u64;
        self.pos += 2;
        Ok(v)
      }
      0xfe => {
        self.require(4)?;
        let v = LittleEndian::read_u32(&self.data[self.pos..self.pos + 4]) as u64;
        self.pos += 4;
        Ok(v)
      }
      0xff => {
        self.require(8)?;
        let v = LittleEndian::read_u64(&self.data[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(v)
      }
    }
  }

  pub fn skip_varint(&mut self) -> Result<()> {
    self.load_varint().map(|_| ())
  }

  pub fn load_slice(&mut self, len: usize) -> Result<&'a [u8]> {
    self.require(len)?;
    let slice = &self.data[self.pos..self.pos + len];
    self.pos += len;
    Ok(slice)
  }

  pub fn skip_bytes(&mut self, len: usize) -> Result<()> {
    self.require(len)?;
    self.pos += len;
    Ok(())
  }

  /// The full region this reader was constructed over, regardless of `pos`.
  /// Used to fork a second cursor over the same bytes at an arbitrary
  /// position (the skim phase resets to `start` after finding `end`).
  pub fn region(&self) -> &'a [u8] {
    self.data
  }

  pub fn load_hash256(&mut self) -> Result<crate::hash::Hash256> {
    Ok(crate::hash::Hash256::from_slice(self.load_slice(32)?))
  }

  pub fn skip_hash256(&mut self) -> Result<()> {
    self.skip_bytes(32)
  }
}

/// Canonical varint encoder, used only by tests to round-trip the decoder
/// to check the round-trip law holds for every value in `[0, 2^64)`.
pub fn encode_varint(value: u64, out: &mut Vec<u8>) {
  match value {
    0..=0xfc => out.push(value as u8),
    0xfd..=0xffff => {
      out.push(0xfd);
      out.extend_from_slice(&(value as u16).to_le_bytes());
    }
    0x1_0000..=0xffff_ffff => {
      out.push(0xfe);
      out.extend_from_slice(&(value as u32).to_le_bytes());
    }
    _ => {
      out.push(0xff);
      out.extend_from_slice(&value.to_le_bytes());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn varint_round_trip() {
    let samples: [u64; 9] = [
      0,
      0xfc,
      0xfd,
      0xffff,
      0x1_0000,
      0xffff_ffff,
      0x1_0000_0000,
      u64::MAX - 1,
      u64::MAX,
    ];
    for &value in &samples {
      let mut buf = Vec::new();
      encode_varint(value, &mut buf);
      let mut reader = Reader::new(&buf);
      assert_eq!(reader.load_varint().unwrap(), value);
      assert!(reader.is_empty());
    }
  }

  #[test]
  fn fixed_loads_advance_cursor() {
    let buf = [1u8, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0];
    let mut reader = Reader::new(&buf);
    assert_eq!(reader.load_u32().unwrap(), 1);
    assert_eq!(reader.load_u64().unwrap(), 2);
    assert_eq!(reader.pos(), 12);
  }

  #[test]
  fn truncated_read_is_an_error() {
    let buf = [1u8, 2, 3];
    let mut reader = Reader::new(&buf);
    assert!(reader.load_u32().is_err());
  }

  #[test]
  fn skip_matches_load_advance() {
    let mut buf = Vec::new();
    encode_varint(300, &mut buf);
    buf.extend_from_slice(&[0u8; 20]);

    let mut skim = Reader::new(&buf);
    skim.skip_varint().unwrap();
    skim.skip_bytes(20).unwrap();

    let mut emit = Reader::new(&buf);
    emit.load_varint().unwrap();
    emit.load_slice(20).unwrap();

    assert_eq!(skim.pos(), emit.pos());
  }
}
