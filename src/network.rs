//! Runtime network profiles.
//!
//! The original source selects a network via preprocessor conditionals,
//! producing one binary per chain. This crate injects a `NetworkProfile`
//! value at startup instead — generalized from `dog`'s `Chain` enum
//! (`src/chain.rs`), which picks genesis blocks and magic-adjacent constants
//! per Dogecoin variant from a closed `match`. Here the table is open: a
//! profile can be a builtin or loaded from a config file (§6.2 "compile-time
//! or config-time selection").

use crate::hash::HeaderHashFn;

/// One network's on-disk block-file conventions and header semantics.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NetworkProfile {
  pub name: String,
  /// 4-byte record delimiter, stored host-endian for comparison convenience;
  /// on disk it is read little-endian.
  pub magic: u32,
  /// e.g. `.bitcoin`, `.litecoin`, `.darkcoin`.
  pub data_subdir_name: String,
  pub header_hash_fn: HeaderHashFn,
  /// Bytes of augmented header data after the canonical 80, before `nbTX`.
  pub extra_header_bytes: usize,
  /// Whether `extra_header_bytes` are
  /// included in the bytes fed to `header_hash_fn`, or only the canonical 80
  /// are hashed. Left explicit and `false` by default rather than guessed.
  pub hash_header_extra_bytes: bool,
}

impl NetworkProfile {
  pub const HEADER_LEN: usize = 80;

  pub fn header_hash_input_len(&self) -> usize {
    if self.hash_header_extra_bytes {
      Self::HEADER_LEN + self.extra_header_bytes
    } else {
      Self::HEADER_LEN
    }
  }

  pub fn bitcoin() -> Self {
    NetworkProfile {
      name: "bitcoin".into(),
      magic: 0xd9b4_bef9,
      data_subdir_name: ".bitcoin".into(),
      header_hash_fn: HeaderHashFn::DoubleSha256,
      extra_header_bytes: 0,
      hash_header_extra_bytes: false,
    }
  }

  pub fn litecoin() -> Self {
    NetworkProfile {
      name: "litecoin".into(),
      magic: 0xdbb6_c0fb,
      data_subdir_name: ".litecoin".into(),
      header_hash_fn: HeaderHashFn::DoubleSha256,
      extra_header_bytes: 0,
      hash_header_extra_bytes: false,
    }
  }

  pub fn dogecoin() -> Self {
    NetworkProfile {
      name: "dogecoin".into(),
      magic: 0xc0c0_c0c0,
      data_subdir_name: ".dogecoin".into(),
      header_hash_fn: HeaderHashFn::DoubleSha256,
      extra_header_bytes: 0,
      hash_header_extra_bytes: false,
    }
  }

  /// Stands in for a network whose header hash is not double-SHA-256
  /// Stands in for a network whose header hash is not double-SHA-256. Demonstrates the
  /// augmented-header case from §9's open question: its header carries 8
  /// extra bytes that are present on disk but, per the default resolution,
  /// not folded into the hash.
  pub fn darkcoin() -> Self {
    NetworkProfile {
      name: "darkcoin".into(),
      magic: 0xbf0c_6bbd,
      data_subdir_name: ".darkcoin".into(),
      header_hash_fn: HeaderHashFn::Blake2b256,
      extra_header_bytes: 8,
      hash_header_extra_bytes: false,
    }
  }

  pub fn builtin(name: &str) -> Option<Self> {
    match name {
      "bitcoin" => Some(Self::bitcoin()),
      "litecoin" => Some(Self::litecoin()),
      "dogecoin" => Some(Self::dogecoin()),
      "darkcoin" => Some(Self::darkcoin()),
      _ => None,
    }
  }

  pub fn load_from_file(path: &std::path::Path) -> anyhow::Result<Self> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_names_round_trip() {
    for name in ["bitcoin", "litecoin", "dogecoin", "darkcoin"] {
      let profile = NetworkProfile::builtin(name).unwrap();
      assert_eq!(profile.name, name);
    }
  }

  #[test]
  fn unknown_builtin_is_none() {
    assert!(NetworkProfile::builtin("nonexistent").is_none());
  }

  #[test]
  fn header_hash_input_len_respects_flag() {
    let mut profile = NetworkProfile::darkcoin();
    assert_eq!(profile.header_hash_input_len(), 80);
    profile.hash_header_extra_bytes = true;
    assert_eq!(profile.header_hash_input_len(), 88);
  }

  #[test]
  fn profile_serializes_to_json() {
    let profile = NetworkProfile::bitcoin();
    let json = serde_json::to_string(&profile).unwrap();
    let back: NetworkProfile = serde_json::from_str(&json).unwrap();
    assert_eq!(profile, back);
  }
}
