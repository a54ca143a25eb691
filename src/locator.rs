//! Block-file discovery, generalized from `dog`'s
//! `BlkReader::open` fallback-chain idiom (`src/index/updater/blk_reader.rs`):
//! try the preferred layout, fall back, warn and continue on anything short
//! of "no files at all."

use {
  memmap2::{Advice, Mmap},
  snafu::prelude::*,
  std::{fs::File, path::PathBuf},
};

#[derive(Debug, Snafu)]
pub enum LocatorError {
  #[snafu(display("cannot open first block file {path}: {source}"))]
  FirstFileUnopenable {
    path: String,
    source: std::io::Error,
  },
  #[snafu(display("no block files found under {data_dir}"))]
  NoBlocksFound { data_dir: String },
}

pub type Result<T> = std::result::Result<T, LocatorError>;

/// A discovered block file: its mapping, size, and name.
pub struct MappedFile {
  pub name: PathBuf,
  pub size: u64,
  pub mmap: Mmap,
}

/// Owns every `MappedFile` discovered for the run. Block scanners and Pass 4
/// borrow slices from these mappings; nothing here is ever mutated.
pub struct BlockFileLocator {
  pub files: Vec<MappedFile>,
}

impl BlockFileLocator {
  /// Enumerate and map the block-file sequence under `data_dir`, per the two
  /// naming conventions (the `blocks/` subdirectory layout, falling back to the legacy flat layout).
  pub fn discover(data_dir: &std::path::Path) -> Result<Self> {
    let modern_dir = data_dir.join("blocks");
    let (dir, pattern_is_modern) = if modern_dir.is_dir() {
      (modern_dir, true)
    } else {
      (data_dir.to_path_buf(), false)
    };

    let mut files = Vec::new();
    let mut index = if pattern_is_modern { 0usize } else { 1usize };

    loop {
      let name = if pattern_is_modern {
        dir.join(format!("blk{index:05}.dat"))
      } else {
        dir.join(format!("blk{index:04}.dat"))
      };

      match open_and_map(&name) {
        Ok(mapped) => {
          files.push(mapped);
          index += 1;
        }
        Err(e) => {
          if files.is_empty() {
            return FirstFileUnopenable {
              path: name.display().to_string(),
              source: e,
            }
            .fail();
          }
          log::debug!("block file enumeration stopped at {}: {e}", name.display());
          break;
        }
      }
    }

    if files.is_empty() {
      return NoBlocksFound {
        data_dir: data_dir.display().to_string(),
      }
      .fail();
    }

    Ok(BlockFileLocator { files })
  }

  pub fn total_bytes(&self) -> u64 {
    self.files.iter().map(|f| f.size).sum()
  }

  pub fn payload(&self, file_id: u32, offset: u64, len: u32) -> &[u8] {
    let file = &self.files[file_id as usize];
    let start = offset as usize;
    &file.mmap[start..start + len as usize]
  }

  pub fn file_bytes(&self, file_id: u32) -> &[u8] {
    &self.files[file_id as usize].mmap[..]
  }
}

fn open_and_map(path: &std::path::Path) -> std::io::Result<MappedFile> {
  let file = File::open(path)?;
  let size = file.metadata()?.len();
  // SAFETY: the data directory is a quiescent snapshot for the duration of
  // the run — this tool is a batch reader over a quiescent on-disk snapshot;
  // nothing else truncates or rewrites these files while we hold the map.
  let mmap = unsafe { Mmap::map(&file)? };
  if let Err(e) = mmap.advise(Advice::Sequential) {
    log::warn!("madvise(SEQUENTIAL) failed for {}: {e}", path.display());
  }
  Ok(MappedFile {
    name: path.to_path_buf(),
    size,
    mmap,
  })
}
