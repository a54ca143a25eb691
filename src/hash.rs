//! 32-byte content-addressed hashes used to key both index maps.

use {
  blake2::Blake2b,
  digest::{consts::U32, Digest},
  sha2::Sha256,
  std::fmt::{self, Debug, Display, Formatter},
};

/// A 32-byte opaque hash. Equality and hashing use the raw bytes only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
  pub const LEN: usize = 32;

  /// The distinguished null hash: parent of genesis, `prev` of coinbase inputs.
  pub const NULL: Hash256 = Hash256([0u8; 32]);

  pub fn from_slice(bytes: &[u8]) -> Self {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(bytes);
    Hash256(buf)
  }

  pub fn is_null(&self) -> bool {
    *self == Self::NULL
  }

  pub fn as_bytes(&self) -> &[u8; 32] {
    &self.0
  }
}

impl Debug for Hash256 {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    // Bitcoin-family hashes are conventionally displayed reversed (big-endian).
    for byte in self.0.iter().rev() {
      write!(f, "{byte:02x}")?;
    }
    Ok(())
  }
}

impl Display for Hash256 {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    Debug::fmt(self, f)
  }
}

/// Which primitive a `NetworkProfile` uses to hash an 80-byte block header.
///
/// These are consumed as opaque primitives. The
/// double-SHA-256 case is Bitcoin-family consensus; `Blake2b256` stands in for
/// "some other network's alternative header hash".
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum HeaderHashFn {
  DoubleSha256,
  Blake2b256,
}

impl HeaderHashFn {
  pub fn hash(self, bytes: &[u8]) -> Hash256 {
    match self {
      Self::DoubleSha256 => double_sha256(bytes),
      Self::Blake2b256 => blake2b256(bytes),
    }
  }
}

/// Double SHA-256, the default network hash and the transaction-hash function
/// `tx_hash` is always double-SHA-256 regardless of the
/// active network's header-hash function).
pub fn double_sha256(bytes: &[u8]) -> Hash256 {
  let first = Sha256::digest(bytes);
  let second = Sha256::digest(first);
  Hash256::from_slice(&second)
}

fn blake2b256(bytes: &[u8]) -> Hash256 {
  let mut hasher = Blake2b::<U32>::new();
  hasher.update(bytes);
  Hash256::from_slice(&hasher.finalize())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn null_hash_is_all_zero() {
    assert!(Hash256::NULL.is_null());
    assert_eq!(Hash256::NULL.0, [0u8; 32]);
  }

  #[test]
  fn double_sha256_is_deterministic() {
    let a = double_sha256(b"hello");
    let b = double_sha256(b"hello");
    assert_eq!(a, b);
    assert_ne!(a, double_sha256(b"world"));
  }

  #[test]
  fn display_matches_reversed_hex() {
    let mut bytes = [0u8; 32];
    bytes[31] = 0xab;
    bytes[30] = 0xcd;
    let hash = Hash256(bytes);
    assert_eq!(format!("{hash}"), "abcd".to_string() + &"00".repeat(30));
  }
}
